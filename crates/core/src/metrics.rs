//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Seat selection (toggle outcomes)
//! - Booking uploads
//! - Movie catalog requests

use once_cell::sync::Lazy;
use prometheus::{IntCounterVec, Opts};

// =============================================================================
// Seat Selection Metrics
// =============================================================================

/// Seat toggles by result.
pub static SEAT_TOGGLES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("boxoffice_seat_toggles_total", "Total seat toggle requests"),
        &["result"], // "selected", "released", "ignored", "out_of_bounds"
    )
    .unwrap()
});

// =============================================================================
// Booking Metrics
// =============================================================================

/// Booking uploads by result.
pub static BOOKING_UPLOADS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("boxoffice_booking_uploads_total", "Total booking uploads"),
        &["result"], // "success", "error"
    )
    .unwrap()
});

// =============================================================================
// Catalog Metrics
// =============================================================================

/// Movie catalog requests by operation and result.
pub static CATALOG_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "boxoffice_catalog_requests_total",
            "Total movie catalog requests",
        ),
        &["operation", "result"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SEAT_TOGGLES.clone()),
        Box::new(BOOKING_UPLOADS.clone()),
        Box::new(CATALOG_REQUESTS.clone()),
    ]
}
