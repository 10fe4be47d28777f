//! Seat selection: grid state, toggle rules, pricing and notifications.

mod engine;
mod events;
mod grid;
mod random;
mod types;

pub use engine::SeatSelectionEngine;
pub use events::{SeatEvent, SeatObserver, SubscriptionId};
pub use grid::SeatGrid;
pub use random::{RandomSource, ThreadRandom};
pub use types::*;

use thiserror::Error;

/// Errors reported by the seat grid and selection engine.
///
/// None of these are fatal; callers surface them and carry on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SeatError {
    /// Position outside the grid dimensions.
    #[error("Seat ({row}, {column}) is outside the {rows}x{columns} grid")]
    OutOfBounds {
        row: i32,
        column: i32,
        rows: usize,
        columns: usize,
    },

    /// Layout configuration rejected at construction time.
    #[error("Invalid seat layout configuration: {0}")]
    InvalidConfiguration(String),
}
