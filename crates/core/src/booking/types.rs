//! Booking payload and upload status types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::BookingError;
use crate::seating::{SeatSelectionEngine, TicketType};

/// Order summary sent to the booking endpoint at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingData {
    pub booking_id: Uuid,
    pub movie_title: String,
    pub show_date: NaiveDate,
    pub show_time: String,
    pub people_count: usize,
    pub ticket_type: TicketType,
    /// Localized ticket type label, as displayed to the user.
    pub ticket_type_label: String,
    /// Seat names in row/column order.
    pub seats: Vec<String>,
    /// Seat names joined with the display separator.
    pub notes: String,
    pub unit_price: u64,
    pub total_price: u64,
}

impl BookingData {
    /// Snapshot the engine's current selection.
    ///
    /// Fails with [`BookingError::EmptySelection`] when nothing is selected.
    pub fn from_engine(
        engine: &SeatSelectionEngine,
        movie_title: impl Into<String>,
        show_date: NaiveDate,
        show_time: impl Into<String>,
    ) -> Result<Self, BookingError> {
        let seats: Vec<String> = engine
            .selected_seats()
            .iter()
            .map(|seat| seat.display_name())
            .collect();
        if seats.is_empty() {
            return Err(BookingError::EmptySelection);
        }

        Ok(Self {
            booking_id: Uuid::new_v4(),
            movie_title: movie_title.into(),
            show_date,
            show_time: show_time.into(),
            people_count: seats.len(),
            ticket_type: engine.ticket_type(),
            ticket_type_label: engine.ticket_type_text().to_string(),
            notes: seats.join(&engine.labels().separator),
            seats,
            unit_price: engine.ticket_price(),
            total_price: engine.total_price(),
        })
    }
}

/// Confirmation of an accepted upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingReceipt {
    pub booking_id: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

/// Progress of the most recent checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading {
        booking_id: Uuid,
    },
    Succeeded {
        receipt: BookingReceipt,
    },
    Failed {
        booking_id: Uuid,
        message: String,
    },
}

impl UploadStatus {
    pub fn is_uploading(&self) -> bool {
        matches!(self, UploadStatus::Uploading { .. })
    }
}
