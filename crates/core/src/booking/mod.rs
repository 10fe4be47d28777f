//! Booking upload at checkout.
//!
//! Uploading is fire-and-forget from the engine's point of view: the
//! result is reported back to the caller, who decides whether to clear
//! the selection.

mod http;
mod types;

pub use http::{BookingConfig, HttpBookingUploader};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Checkout attempted with no seats selected.
    #[error("No seats selected")]
    EmptySelection,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status.
    #[error("Booking rejected: {status} - {message}")]
    Rejected { status: u16, message: String },

    /// Uploader not configured.
    #[error("Booking uploader not configured: {0}")]
    NotConfigured(String),
}

/// Destination for completed bookings.
#[async_trait]
pub trait BookingUploader: Send + Sync {
    /// Upload one booking.
    async fn upload(&self, booking: &BookingData) -> Result<BookingReceipt, BookingError>;
}
