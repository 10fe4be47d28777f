//! Deterministic random source for seat layouts.

use crate::seating::RandomSource;

/// Draw that never falls under a non-trivial occupancy probability.
const AVAILABLE_DRAW: f64 = 0.99;
/// Draw that always falls under a positive occupancy probability.
const OCCUPIED_DRAW: f64 = 0.0;

/// Replays a fixed list of draws, cycling when exhausted.
///
/// Draws are consumed row by row, one per seat, so a grid can be
/// described as a picture with [`ScriptedRandom::from_pattern`].
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    draws: Vec<f64>,
    next: usize,
}

impl ScriptedRandom {
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, next: 0 }
    }

    /// Every seat stays available under the default occupancy policy.
    pub fn all_available() -> Self {
        Self::new(vec![AVAILABLE_DRAW])
    }

    /// Every seat is occupied under the default occupancy policy.
    pub fn all_occupied() -> Self {
        Self::new(vec![OCCUPIED_DRAW])
    }

    /// One string per row: `X` is occupied, anything else available.
    pub fn from_pattern(rows: &[&str]) -> Self {
        let draws = rows
            .iter()
            .flat_map(|row| row.chars())
            .map(|cell| {
                if cell == 'X' {
                    OCCUPIED_DRAW
                } else {
                    AVAILABLE_DRAW
                }
            })
            .collect();
        Self::new(draws)
    }

    /// Number of draws handed out so far.
    pub fn draws_taken(&self) -> usize {
        self.next
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        if self.draws.is_empty() {
            return AVAILABLE_DRAW;
        }
        let draw = self.draws[self.next % self.draws.len()];
        self.next += 1;
        draw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycles_through_draws() {
        let mut random = ScriptedRandom::new(vec![0.1, 0.7]);
        let draws: Vec<f64> = (0..5).map(|_| random.next_unit()).collect();
        assert_eq!(draws, vec![0.1, 0.7, 0.1, 0.7, 0.1]);
        assert_eq!(random.draws_taken(), 5);
    }

    #[test]
    fn test_from_pattern() {
        let mut random = ScriptedRandom::from_pattern(&["X.", ".X"]);
        let draws: Vec<f64> = (0..4).map(|_| random.next_unit()).collect();
        assert_eq!(draws, vec![0.0, 0.99, 0.99, 0.0]);
    }
}
