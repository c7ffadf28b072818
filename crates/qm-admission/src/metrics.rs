//! Metric recording.
//!
//! Compiled to no-ops unless the `metrics` feature is enabled.

use crate::domain::errors::ErrorKind;
use crate::domain::value_objects::CounterSnapshot;
use qm_bus::MintPath;
use std::time::Duration;

#[cfg(feature = "metrics")]
pub(crate) fn record_admitted(path: MintPath, units: usize) {
    qm_telemetry::UNITS_ADMITTED
        .with_label_values(&[path.as_str()])
        .inc_by(units as f64);
}

#[cfg(feature = "metrics")]
pub(crate) fn record_rejected(operation: &str, kind: ErrorKind) {
    qm_telemetry::ADMISSIONS_REJECTED
        .with_label_values(&[operation, kind.as_str()])
        .inc();
}

#[cfg(feature = "metrics")]
pub(crate) fn record_capacity(snapshot: &CounterSnapshot, phase_reserved: u64) {
    qm_telemetry::USERS_CAPACITY_REMAINING.set(snapshot.users_mint_limit as f64);
    qm_telemetry::PLATFORM_CAPACITY_REMAINING.set(snapshot.platform_mint_limit as f64);
    qm_telemetry::PHASE_RESERVED_REMAINING.set(phase_reserved as f64);
}

#[cfg(feature = "metrics")]
pub(crate) fn observe_critical_section(elapsed: Duration) {
    qm_telemetry::ADMISSION_DURATION.observe(elapsed.as_secs_f64());
}

#[cfg(not(feature = "metrics"))]
pub(crate) fn record_admitted(_path: MintPath, _units: usize) {}

#[cfg(not(feature = "metrics"))]
pub(crate) fn record_rejected(_operation: &str, _kind: ErrorKind) {}

#[cfg(not(feature = "metrics"))]
pub(crate) fn record_capacity(_snapshot: &CounterSnapshot, _phase_reserved: u64) {}

#[cfg(not(feature = "metrics"))]
pub(crate) fn observe_critical_section(_elapsed: Duration) {}
