//! Dense seat grid: the only place seat status is mutated.

use tracing::debug;

use super::random::RandomSource;
use super::types::{Seat, SeatLayoutConfiguration, SeatStatus, ToggleOutcome};
use super::SeatError;

/// Row-major grid of seats with fixed dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatGrid {
    rows: usize,
    columns: usize,
    seats: Vec<Seat>,
}

impl SeatGrid {
    /// Generate a fully populated grid, one independent draw per cell.
    pub fn initialize(
        config: &SeatLayoutConfiguration,
        random: &mut dyn RandomSource,
    ) -> Result<Self, SeatError> {
        config.validate()?;

        let rows = config.number_of_rows;
        let columns = config.seats_per_row;
        let mut seats = Vec::with_capacity(config.capacity());
        for row in 0..rows {
            for column in 0..columns {
                let status = config.occupancy.status_for(random.next_unit());
                seats.push(Seat::new(row, column, status));
            }
        }

        let grid = Self {
            rows,
            columns,
            seats,
        };
        debug!(
            "Generated {}x{} seat grid ({} occupied)",
            rows,
            columns,
            grid.count(SeatStatus::Occupied)
        );
        Ok(grid)
    }

    pub fn number_of_rows(&self) -> usize {
        self.rows
    }

    pub fn seats_per_row(&self) -> usize {
        self.columns
    }

    /// Whether `(row, column)` lies inside the grid.
    pub fn contains(&self, row: i32, column: i32) -> bool {
        self.index(row, column).is_ok()
    }

    /// Seat snapshot at a position.
    pub fn get(&self, row: i32, column: i32) -> Result<Seat, SeatError> {
        let index = self.index(row, column)?;
        Ok(self.seats[index])
    }

    /// Flip a seat between `Available` and `Selected`.
    ///
    /// Occupied seats are left untouched and reported as
    /// [`ToggleOutcome::Unchanged`].
    pub fn toggle(&mut self, row: i32, column: i32) -> Result<ToggleOutcome, SeatError> {
        let index = self.index(row, column)?;
        let seat = &mut self.seats[index];
        let previous = seat.status;

        let next = match previous {
            SeatStatus::Occupied => return Ok(ToggleOutcome::Unchanged { seat: *seat }),
            SeatStatus::Available => SeatStatus::Selected,
            SeatStatus::Selected => SeatStatus::Available,
        };
        seat.status = next;

        Ok(ToggleOutcome::Changed {
            seat: *seat,
            previous,
        })
    }

    /// All seats in row-major order.
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    /// Iterate rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[Seat]> {
        self.seats.chunks(self.columns)
    }

    /// Number of seats currently in `status`.
    pub fn count(&self, status: SeatStatus) -> usize {
        self.seats.iter().filter(|s| s.status == status).count()
    }

    fn index(&self, row: i32, column: i32) -> Result<usize, SeatError> {
        let out_of_bounds = || SeatError::OutOfBounds {
            row,
            column,
            rows: self.rows,
            columns: self.columns,
        };

        let r = usize::try_from(row).map_err(|_| out_of_bounds())?;
        let c = usize::try_from(column).map_err(|_| out_of_bounds())?;
        if r >= self.rows || c >= self.columns {
            return Err(out_of_bounds());
        }
        Ok(r * self.columns + c)
    }
}
