//! Business metrics for the lending workflow.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `circuitlend_submissions_total{queue}` - Committed submissions by queue (pending, priority)
//! - `circuitlend_rejections_total{reason}` - Rejected operations by error label
//! - `circuitlend_returns_total` - Returned units
//! - `circuitlend_undos_total{kind}` - Undone actions by kind
//!
//! ## Gauges
//! - `circuitlend_pending_requests` - Requests waiting in the FIFO queue
//! - `circuitlend_priority_requests` - Requests waiting in the priority queue
//!
//! Without an installed recorder every call is a no-op.

use metrics::{counter, describe_counter, describe_gauge, gauge};

use crate::error::LendingError;

/// Initialize and register all lending metric descriptions.
///
/// Call once at startup, after installing a recorder.
pub fn register_lending_metrics() {
    describe_counter!(
        "circuitlend_submissions_total",
        "Total committed borrow submissions by queue (pending, priority)"
    );
    describe_counter!(
        "circuitlend_rejections_total",
        "Total rejected operations by error label"
    );
    describe_counter!(
        "circuitlend_returns_total",
        "Total units returned to stock"
    );
    describe_counter!(
        "circuitlend_undos_total",
        "Total undone actions by kind (cancel_borrow, revert_return)"
    );
    describe_gauge!(
        "circuitlend_pending_requests",
        "Requests currently waiting in the FIFO queue"
    );
    describe_gauge!(
        "circuitlend_priority_requests",
        "Requests currently waiting in the priority queue"
    );

    tracing::info!("Lending metrics registered");
}

/// Records a committed submission and the resulting queue depths
pub fn record_submission(queue: &'static str, pending: usize, priority: usize) {
    counter!("circuitlend_submissions_total", "queue" => queue).increment(1);
    record_queue_depths(pending, priority);
}

/// Updates the queue depth gauges
#[allow(clippy::cast_precision_loss)] // queue depths stay far below 2^52
pub fn record_queue_depths(pending: usize, priority: usize) {
    gauge!("circuitlend_pending_requests").set(pending as f64);
    gauge!("circuitlend_priority_requests").set(priority as f64);
}

/// Records a rejected operation
pub fn record_rejection(error: &LendingError) {
    counter!("circuitlend_rejections_total", "reason" => error.label()).increment(1);
}

/// Records returned units
pub fn record_return(units: usize) {
    counter!("circuitlend_returns_total").increment(units as u64);
}

/// Records an undone action
pub fn record_undo(kind: &'static str) {
    counter!("circuitlend_undos_total", "kind" => kind).increment(1);
}
