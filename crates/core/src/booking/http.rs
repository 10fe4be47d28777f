//! JSON-over-HTTP booking uploader.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::types::{BookingData, BookingReceipt};
use super::{BookingError, BookingUploader};
use crate::metrics::BOOKING_UPLOADS;

/// Booking endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// URL that receives a POST with the booking as JSON.
    pub endpoint: String,
    /// Optional bearer token sent with each upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Request timeout in seconds (default: 15).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    15
}

/// Uploads bookings by POSTing them to a configured endpoint.
pub struct HttpBookingUploader {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpBookingUploader {
    pub fn new(config: BookingConfig) -> Result<Self, BookingError> {
        if config.endpoint.trim().is_empty() {
            return Err(BookingError::NotConfigured(
                "booking endpoint is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint,
            api_token: config.api_token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, booking: &BookingData) -> Result<BookingReceipt, BookingError> {
        let mut request = self.client.post(&self.endpoint).json(booking);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BookingError::Rejected {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(BookingReceipt {
            booking_id: booking.booking_id,
            uploaded_at: Utc::now(),
        })
    }
}

#[async_trait]
impl BookingUploader for HttpBookingUploader {
    async fn upload(&self, booking: &BookingData) -> Result<BookingReceipt, BookingError> {
        debug!(
            "Uploading booking {} ({} seats) to {}",
            booking.booking_id, booking.people_count, self.endpoint
        );

        match self.send(booking).await {
            Ok(receipt) => {
                BOOKING_UPLOADS.with_label_values(&["success"]).inc();
                info!("Booking {} uploaded", booking.booking_id);
                Ok(receipt)
            }
            Err(e) => {
                BOOKING_UPLOADS.with_label_values(&["error"]).inc();
                warn!("Booking {} upload failed: {}", booking.booking_id, e);
                Err(e)
            }
        }
    }
}
