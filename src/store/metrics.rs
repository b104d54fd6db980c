//! Shared metrics recording for store backends.
//!
//! Every unit of store work funnels through the scoped helpers, which record
//! one counter and one latency histogram per operation. Only the `metrics`
//! facade is used; wiring an exporter is the embedding application's call.

use std::time::Instant;

/// Records operation metrics for a completed unit of store work.
///
/// Two metrics are recorded:
/// 1. `store_operations_total` - counter by backend, operation, and status
/// 2. `store_operation_duration_ms` - latency histogram with the same labels
pub(crate) fn record_store_operation(
    backend: &'static str,
    operation: &'static str,
    start: Instant,
    status: &'static str,
) {
    metrics::counter!(
        "store_operations_total",
        "backend" => backend,
        "operation" => operation,
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "store_operation_duration_ms",
        "backend" => backend,
        "operation" => operation,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64() * 1000.0);
}
