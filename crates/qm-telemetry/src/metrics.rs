//! Prometheus metrics for the admission subsystem.
//!
//! All metrics follow the naming convention: `qm_<area>_<metric>_<unit>`
//!
//! - **Counter**: admitted units by path, rejections by operation and kind
//! - **Gauge**: remaining user, platform and phase capacity
//! - **Histogram**: time spent inside the admission critical section

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Units admitted and issued, by admission path
    pub static ref UNITS_ADMITTED: CounterVec = CounterVec::new(
        Opts::new("qm_admission_units_admitted_total", "Units admitted and issued"),
        &["path"]  // single, bulk, admin, admin_bulk
    ).expect("metric creation failed");

    /// Rejected requests, by operation and error kind
    pub static ref ADMISSIONS_REJECTED: CounterVec = CounterVec::new(
        Opts::new("qm_admission_rejected_total", "Requests rejected with zero side effects"),
        &["operation", "kind"]  // kind: validation/authorization/state/quota_exceeded/not_found
    ).expect("metric creation failed");

    /// Remaining non-admin capacity (usersMintLimit)
    pub static ref USERS_CAPACITY_REMAINING: Gauge = Gauge::new(
        "qm_capacity_users_remaining",
        "Remaining capacity for Normal and Premium mints"
    ).expect("metric creation failed");

    /// Remaining admin capacity (platformMintLimit)
    pub static ref PLATFORM_CAPACITY_REMAINING: Gauge = Gauge::new(
        "qm_capacity_platform_remaining",
        "Remaining capacity for Admin mints"
    ).expect("metric creation failed");

    /// Reserved capacity left in the current phase
    pub static ref PHASE_RESERVED_REMAINING: Gauge = Gauge::new(
        "qm_phase_reserved_remaining",
        "Reserved capacity left in the current phase (0 when no phase is active)"
    ).expect("metric creation failed");

    /// Critical section duration
    pub static ref ADMISSION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "qm_admission_critical_section_seconds",
            "Time spent holding the admission lock"
        ).buckets(exponential_buckets(0.000_001, 2.0, 16).unwrap_or_default())
    ).expect("metric creation failed");
}

/// Keeps the registry alive for exporters.
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
///
/// Calling this more than once is harmless.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(UNITS_ADMITTED.clone()),
        Box::new(ADMISSIONS_REJECTED.clone()),
        Box::new(USERS_CAPACITY_REMAINING.clone()),
        Box::new(PLATFORM_CAPACITY_REMAINING.clone()),
        Box::new(PHASE_RESERVED_REMAINING.clone()),
        Box::new(ADMISSION_DURATION.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
