//! Observability: runtime counters and the sink boundary.
//!
//! Engine code records `MetricsEvent`s through `sink::record` and never
//! touches the counter state directly.

pub(crate) mod metrics;
pub(crate) mod sink;


// re-exports
pub use metrics::{EventOps, EventReport, EventState, TypeCounters, TypeSummary};
pub use sink::{
    GlobalMetricsSink, MetricsEvent, MetricsSink, ScanSpan, metrics_report, metrics_reset_all,
    with_metrics_sink,
};
