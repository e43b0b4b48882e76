use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    collections::BTreeMap,
    sync::LazyLock,
    time::{SystemTime, UNIX_EPOCH},
};

///
/// EventState
/// Ephemeral, in-memory counters for descriptor, plan and scan activity.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub types: BTreeMap<String, TypeCounters>,
    pub since_ms: u64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            types: BTreeMap::new(),
            since_ms: now_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Descriptor registry
    pub descriptors_built: u64,
    pub descriptor_cache_hits: u64,
    pub descriptor_failures: u64,

    // Plans
    pub plans_compiled: u64,
    pub columns_discarded: u64,

    // Rows
    pub rows_scanned: u64,
    pub relations_collapsed: u64,
    pub scan_failures: u64,
}

///
/// TypeCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TypeCounters {
    pub descriptor_columns: u64,
    pub plans_compiled: u64,
    pub columns_discarded: u64,
    pub rows_scanned: u64,
    pub relations_collapsed: u64,
    pub scan_failures: u64,
}

static EVENT_STATE: LazyLock<Mutex<EventState>> =
    LazyLock::new(|| Mutex::new(EventState::default()));

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
        })
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    f(&EVENT_STATE.lock())
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    f(&mut EVENT_STATE.lock())
}

/// Borrow the counters for one record type, creating them on first use.
pub(crate) fn type_entry<'a>(state: &'a mut EventState, type_name: &str) -> &'a mut TypeCounters {
    state.types.entry(type_name.to_string()).or_default()
}

/// Reset all counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// EventReport
/// Point-in-time snapshot of the counters.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    /// Ephemeral runtime counters since `since_ms`.
    pub counters: Option<EventState>,
    /// Per-type counters and averages.
    pub type_counters: Vec<TypeSummary>,
}

///
/// TypeSummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TypeSummary {
    pub type_name: String,
    pub descriptor_columns: u64,
    pub plans_compiled: u64,
    pub rows_scanned: u64,
    pub relations_collapsed: u64,
    pub scan_failures: u64,
    pub avg_rows_per_plan: f64,
}

/// Build a report from the in-memory counters.
///
/// `since_ms` drops the snapshot when the counters were reset before it.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn report(since_ms: Option<u64>) -> EventReport {
    let snap = with_state(Clone::clone);
    if since_ms.is_some_and(|since| snap.since_ms < since) {
        return EventReport::default();
    }

    let mut type_counters: Vec<TypeSummary> = snap
        .types
        .iter()
        .map(|(type_name, counters)| {
            let avg_rows_per_plan = if counters.plans_compiled > 0 {
                counters.rows_scanned as f64 / counters.plans_compiled as f64
            } else {
                0.0
            };

            TypeSummary {
                type_name: type_name.clone(),
                descriptor_columns: counters.descriptor_columns,
                plans_compiled: counters.plans_compiled,
                rows_scanned: counters.rows_scanned,
                relations_collapsed: counters.relations_collapsed,
                scan_failures: counters.scan_failures,
                avg_rows_per_plan,
            }
        })
        .collect();

    type_counters.sort_by(|a, b| match b.rows_scanned.cmp(&a.rows_scanned) {
        Ordering::Equal => a.type_name.cmp(&b.type_name),
        other => other,
    });

    EventReport {
        counters: Some(snap),
        type_counters,
    }
}
