//! Mock booking uploader for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{Notify, RwLock};

use crate::booking::{BookingData, BookingError, BookingReceipt, BookingUploader};

/// Mock implementation of the BookingUploader trait.
///
/// Records every upload and can be told to reject the next one. A
/// held uploader parks each upload until [`MockBookingUploader::release`]
/// is called, which lets tests observe the in-flight state.
#[derive(Debug, Default)]
pub struct MockBookingUploader {
    uploads: Arc<RwLock<Vec<BookingData>>>,
    next_error: Arc<RwLock<Option<BookingError>>>,
    gate: Option<Arc<Notify>>,
}

impl MockBookingUploader {
    /// Create an uploader that accepts everything immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an uploader that waits for [`release`](Self::release) before answering.
    pub fn held() -> Self {
        Self {
            gate: Some(Arc::new(Notify::new())),
            ..Self::default()
        }
    }

    /// Let one parked upload proceed.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    /// Configure the next upload to fail with the given error.
    pub async fn set_next_error(&self, error: BookingError) {
        *self.next_error.write().await = Some(error);
    }

    /// Bookings accepted so far.
    pub async fn uploads(&self) -> Vec<BookingData> {
        self.uploads.read().await.clone()
    }

    /// Number of bookings accepted so far.
    pub async fn upload_count(&self) -> usize {
        self.uploads.read().await.len()
    }
}

#[async_trait]
impl BookingUploader for MockBookingUploader {
    async fn upload(&self, booking: &BookingData) -> Result<BookingReceipt, BookingError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        self.uploads.write().await.push(booking.clone());
        Ok(BookingReceipt {
            booking_id: booking.booking_id,
            uploaded_at: Utc::now(),
        })
    }
}
