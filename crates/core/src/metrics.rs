//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Upstream gateway (requests, latency)
//! - Repository fan-out (dropped records)
//! - Application store (dispatched actions, superseded responses)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Upstream Gateway
// =============================================================================

/// Upstream GET requests by outcome.
pub static UPSTREAM_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "bestiary_upstream_requests_total",
            "Total requests issued to the upstream data source",
        ),
        &["outcome"], // "success", "connection_error", "http_error", "decode_error"
    )
    .unwrap()
});

/// Upstream request duration in seconds.
pub static UPSTREAM_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "bestiary_upstream_request_duration_seconds",
            "Duration of upstream requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["outcome"],
    )
    .unwrap()
});

// =============================================================================
// Repository
// =============================================================================

/// Records left out of a page or category listing because they failed to resolve.
pub static RECORDS_DROPPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "bestiary_records_dropped_total",
        "Records dropped during batched resolution",
    )
    .unwrap()
});

// =============================================================================
// Store
// =============================================================================

/// Actions reduced by the application store, by action name.
pub static STORE_ACTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("bestiary_store_actions_total", "Total store actions reduced"),
        &["action"],
    )
    .unwrap()
});

/// Responses discarded because a newer request of the same kind was issued.
pub static STALE_RESPONSES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "bestiary_stale_responses_total",
            "Responses ignored because they were superseded",
        ),
        &["operation"],
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(UPSTREAM_REQUESTS.clone()),
        Box::new(UPSTREAM_REQUEST_DURATION.clone()),
        Box::new(RECORDS_DROPPED.clone()),
        Box::new(STORE_ACTIONS.clone()),
        Box::new(STALE_RESPONSES.clone()),
    ]
}
