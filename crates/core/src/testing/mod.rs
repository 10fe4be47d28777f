//! Testing utilities and mock implementations.
//!
//! Mocks for the external service traits (movie catalog, booking upload)
//! plus deterministic helpers for the seat engine, so the whole booking
//! flow can be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use boxoffice_core::testing::{MockMovieCatalog, ScriptedRandom, fixtures};
//!
//! let catalog = MockMovieCatalog::new();
//! catalog.add_movie(fixtures::movie(603, "The Matrix")).await;
//!
//! let engine = SeatSelectionEngine::new(
//!     SeatLayoutConfiguration::standard(),
//!     Box::new(ScriptedRandom::from_pattern(&["X.........", ".........X"])),
//! )?;
//! ```

mod mock_catalog;
mod mock_uploader;
mod recording_observer;
mod scripted_random;

pub use mock_catalog::{MockMovieCatalog, RecordedCatalogQuery};
pub use mock_uploader::MockBookingUploader;
pub use recording_observer::RecordingObserver;
pub use scripted_random::ScriptedRandom;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use crate::booking::BookingData;
    use crate::catalog::Movie;
    use crate::seating::{row_label, TicketType};

    /// Create a test movie with reasonable defaults.
    pub fn movie(id: u32, title: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            overview: format!("A movie about {}.", title.to_lowercase()),
            poster_path: Some(format!("/poster-{}.jpg", id)),
            release_date: Some("1999-03-30".to_string()),
            runtime_minutes: None,
            genres: Vec::new(),
            vote_average: Some(8.2),
        }
    }

    /// Create a test booking for `people` regular tickets in row A.
    pub fn booking(people: usize) -> BookingData {
        let seats: Vec<String> = (0..people)
            .map(|column| format!("{}{}", row_label(0), column + 1))
            .collect();
        BookingData {
            booking_id: Uuid::new_v4(),
            movie_title: "The Matrix".to_string(),
            show_date: NaiveDate::from_ymd_opt(2024, 12, 20).unwrap_or_default(),
            show_time: "19:30".to_string(),
            people_count: people,
            ticket_type: TicketType::Regular,
            ticket_type_label: "一般票".to_string(),
            notes: seats.join("、"),
            seats,
            unit_price: 280,
            total_price: 280 * people as u64,
        }
    }
}
