//! Metrics sink boundary.
//!
//! Engine logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::{error::ErrorClass, obs::metrics};
use std::{cell::RefCell, sync::Arc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Arc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    DescriptorBuilt {
        type_name: &'static str,
        columns: u64,
    },
    DescriptorCacheHit {
        type_name: &'static str,
    },
    DescriptorFailed {
        type_name: &'static str,
    },
    PlanCompiled {
        type_name: &'static str,
        columns: u64,
        discarded: u64,
    },
    RowsScanned {
        type_name: &'static str,
        rows: u64,
    },
    RelationsCollapsed {
        type_name: &'static str,
        relations: u64,
    },
    ScanFailed {
        type_name: &'static str,
        class: ErrorClass,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

///
/// GlobalMetricsSink
/// Default sink that writes into the process-wide counters.
/// Acts as the concrete sink when no scoped override is installed.
///

pub struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::DescriptorBuilt { type_name, columns } => {
                metrics::with_state_mut(|m| {
                    m.ops.descriptors_built = m.ops.descriptors_built.saturating_add(1);
                    metrics::type_entry(m, type_name).descriptor_columns = columns;
                });
            }

            MetricsEvent::DescriptorCacheHit { .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.descriptor_cache_hits = m.ops.descriptor_cache_hits.saturating_add(1);
                });
            }

            MetricsEvent::DescriptorFailed { .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.descriptor_failures = m.ops.descriptor_failures.saturating_add(1);
                });
            }

            MetricsEvent::PlanCompiled {
                type_name,
                discarded,
                ..
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.plans_compiled = m.ops.plans_compiled.saturating_add(1);
                    m.ops.columns_discarded = m.ops.columns_discarded.saturating_add(discarded);

                    let entry = metrics::type_entry(m, type_name);
                    entry.plans_compiled = entry.plans_compiled.saturating_add(1);
                    entry.columns_discarded = entry.columns_discarded.saturating_add(discarded);
                });
            }

            MetricsEvent::RowsScanned { type_name, rows } => {
                metrics::with_state_mut(|m| {
                    m.ops.rows_scanned = m.ops.rows_scanned.saturating_add(rows);
                    let entry = metrics::type_entry(m, type_name);
                    entry.rows_scanned = entry.rows_scanned.saturating_add(rows);
                });
            }

            MetricsEvent::RelationsCollapsed {
                type_name,
                relations,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.relations_collapsed = m.ops.relations_collapsed.saturating_add(relations);
                    let entry = metrics::type_entry(m, type_name);
                    entry.relations_collapsed = entry.relations_collapsed.saturating_add(relations);
                });
            }

            MetricsEvent::ScanFailed { type_name, .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.scan_failures = m.ops.scan_failures.saturating_add(1);
                    let entry = metrics::type_entry(m, type_name);
                    entry.scan_failures = entry.scan_failures.saturating_add(1);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let installed = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match installed {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current counters.
///
/// `since_ms` filters by the counters' window start (`EventState::since_ms`),
/// not by per-event timestamps.
#[must_use]
pub fn metrics_report(since_ms: Option<u64>) -> metrics::EventReport {
    metrics::report(since_ms)
}

/// Reset all counters.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override on this thread.
pub fn with_metrics_sink<T>(sink: Arc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Arc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let previous = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = previous;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// ScanSpan
/// RAII guard that accumulates row and collapse counts for one scan
/// and emits them once, including on early exit.
///

pub struct ScanSpan {
    type_name: &'static str,
    rows: u64,
    relations: u64,
    finished: bool,
}

impl ScanSpan {
    #[must_use]
    pub const fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            rows: 0,
            relations: 0,
            finished: false,
        }
    }

    /// Count one completed row and the relations collapsed on it.
    pub const fn add_row(&mut self, relations: u64) {
        self.rows = self.rows.saturating_add(1);
        self.relations = self.relations.saturating_add(relations);
    }

    #[must_use]
    pub const fn rows(&self) -> u64 {
        self.rows
    }

    /// Finish the span early (also happens on Drop).
    pub fn finish(mut self) {
        self.finish_inner();
    }

    fn finish_inner(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        if self.rows > 0 {
            record(MetricsEvent::RowsScanned {
                type_name: self.type_name,
                rows: self.rows,
            });
        }
        if self.relations > 0 {
            record(MetricsEvent::RelationsCollapsed {
                type_name: self.type_name,
                relations: self.relations,
            });
        }
    }
}

impl Drop for ScanSpan {
    fn drop(&mut self) {
        self.finish_inner();
    }
}
