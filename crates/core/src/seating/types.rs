//! Core seating data types.

use serde::{Deserialize, Serialize};

use super::SeatError;

/// Highest row count that still maps to a single `A`..`Z` row letter.
pub const MAX_ROWS: usize = 26;

/// Widest row a layout may have.
pub const MAX_SEATS_PER_ROW: usize = 100;

/// Surcharge added on top of the base price for [`TicketType::Package`].
pub const DEFAULT_PACKAGE_SURCHARGE: u64 = 120;

// ============================================================================
// Seat Types
// ============================================================================

/// State of a single seat cell.
///
/// Only `Available <-> Selected` is reachable through user action.
/// `Occupied` is assigned by the initial layout draw and stays until the
/// grid is regenerated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    Available,
    Occupied,
    Selected,
}

impl SeatStatus {
    /// Returns the status as a lowercase label (used for logs and metrics).
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatStatus::Available => "available",
            SeatStatus::Occupied => "occupied",
            SeatStatus::Selected => "selected",
        }
    }
}

/// A seat in the grid. Coordinates are 0-based and never change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Seat {
    pub row: usize,
    pub column: usize,
    pub status: SeatStatus,
}

impl Seat {
    pub fn new(row: usize, column: usize, status: SeatStatus) -> Self {
        Self {
            row,
            column,
            status,
        }
    }

    /// Row letter (`A` for row 0).
    pub fn row_label(&self) -> char {
        row_label(self.row)
    }

    /// Human-facing seat name, e.g. `A3` for row 0, column 2.
    pub fn display_name(&self) -> String {
        format!("{}{}", self.row_label(), self.column + 1)
    }
}

/// Row letter for a 0-based row index.
///
/// Rows at or past [`MAX_ROWS`] have no letter and render as `?`.
pub fn row_label(row: usize) -> char {
    match u8::try_from(row) {
        Ok(r) if row < MAX_ROWS => char::from(b'A' + r),
        _ => '?',
    }
}

/// Result of a toggle on a valid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The seat moved between `Available` and `Selected`.
    Changed { seat: Seat, previous: SeatStatus },
    /// The seat is occupied; nothing happened.
    Unchanged { seat: Seat },
}

impl ToggleOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, ToggleOutcome::Changed { .. })
    }

    /// Seat snapshot after the toggle.
    pub fn seat(&self) -> &Seat {
        match self {
            ToggleOutcome::Changed { seat, .. } | ToggleOutcome::Unchanged { seat } => seat,
        }
    }
}

// ============================================================================
// Pricing Types
// ============================================================================

/// Ticket type chosen for the whole selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketType {
    /// Plain ticket at the base price.
    #[default]
    Regular,
    /// Ticket bundled with a concession package.
    Package,
}

impl TicketType {
    /// Unit price for this ticket type, saturating at `u64::MAX`.
    pub fn unit_price(&self, base_price: u64, package_surcharge: u64) -> u64 {
        match self {
            TicketType::Regular => base_price,
            TicketType::Package => base_price.saturating_add(package_surcharge),
        }
    }
}

// ============================================================================
// Layout Configuration
// ============================================================================

/// Which status the occupancy probability refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyTarget {
    /// `probability` is the chance that a seat starts occupied.
    #[default]
    Occupied,
    /// `probability` is the chance that a seat starts available.
    Available,
}

/// How the initial layout decides which seats are taken.
///
/// For every cell a uniform draw `u` in `[0, 1)` is taken; when
/// `u < probability` the cell gets the `target` status, otherwise the
/// other one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OccupancyPolicy {
    #[serde(default = "default_probability")]
    pub probability: f64,
    #[serde(default)]
    pub target: OccupancyTarget,
}

impl Default for OccupancyPolicy {
    fn default() -> Self {
        Self {
            probability: default_probability(),
            target: OccupancyTarget::default(),
        }
    }
}

fn default_probability() -> f64 {
    0.6
}

impl OccupancyPolicy {
    /// Initial status of a cell given one uniform draw.
    pub fn status_for(&self, draw: f64) -> SeatStatus {
        let hit = draw < self.probability;
        match (self.target, hit) {
            (OccupancyTarget::Occupied, true) | (OccupancyTarget::Available, false) => {
                SeatStatus::Occupied
            }
            (OccupancyTarget::Occupied, false) | (OccupancyTarget::Available, true) => {
                SeatStatus::Available
            }
        }
    }
}

/// Dimensions and prices of a seating layout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SeatLayoutConfiguration {
    pub number_of_rows: usize,
    pub seats_per_row: usize,
    pub base_ticket_price: u64,
    #[serde(default = "default_package_surcharge")]
    pub package_surcharge: u64,
    #[serde(default)]
    pub occupancy: OccupancyPolicy,
}

fn default_package_surcharge() -> u64 {
    DEFAULT_PACKAGE_SURCHARGE
}

impl Default for SeatLayoutConfiguration {
    fn default() -> Self {
        Self::standard()
    }
}

impl SeatLayoutConfiguration {
    /// Create a validated configuration with the default surcharge and
    /// occupancy policy.
    pub fn new(
        number_of_rows: usize,
        seats_per_row: usize,
        base_ticket_price: u64,
    ) -> Result<Self, SeatError> {
        let config = Self {
            number_of_rows,
            seats_per_row,
            base_ticket_price,
            package_surcharge: DEFAULT_PACKAGE_SURCHARGE,
            occupancy: OccupancyPolicy::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// The 8 x 10 hall at 280 per ticket.
    pub fn standard() -> Self {
        Self {
            number_of_rows: 8,
            seats_per_row: 10,
            base_ticket_price: 280,
            package_surcharge: DEFAULT_PACKAGE_SURCHARGE,
            occupancy: OccupancyPolicy::default(),
        }
    }

    pub fn with_package_surcharge(mut self, surcharge: u64) -> Self {
        self.package_surcharge = surcharge;
        self
    }

    pub fn with_occupancy(mut self, occupancy: OccupancyPolicy) -> Self {
        self.occupancy = occupancy;
        self
    }

    /// Total number of cells.
    pub fn capacity(&self) -> usize {
        self.number_of_rows.saturating_mul(self.seats_per_row)
    }

    /// Price of every seat in the hall at the dearest ticket type, or
    /// `None` if it does not fit in a `u64`.
    pub fn full_house_price(&self) -> Option<u64> {
        let capacity = u64::try_from(self.capacity()).ok()?;
        self.base_ticket_price
            .checked_add(self.package_surcharge)?
            .checked_mul(capacity)
    }

    /// Unit price for the given ticket type.
    pub fn price_of(&self, ticket_type: TicketType) -> u64 {
        ticket_type.unit_price(self.base_ticket_price, self.package_surcharge)
    }

    /// Check dimensions, price and occupancy probability.
    pub fn validate(&self) -> Result<(), SeatError> {
        if self.number_of_rows == 0 {
            return Err(SeatError::InvalidConfiguration(
                "number_of_rows must be greater than 0".to_string(),
            ));
        }
        if self.number_of_rows > MAX_ROWS {
            return Err(SeatError::InvalidConfiguration(format!(
                "number_of_rows must be at most {}",
                MAX_ROWS
            )));
        }
        if self.seats_per_row == 0 {
            return Err(SeatError::InvalidConfiguration(
                "seats_per_row must be greater than 0".to_string(),
            ));
        }
        if self.seats_per_row > MAX_SEATS_PER_ROW {
            return Err(SeatError::InvalidConfiguration(format!(
                "seats_per_row must be at most {}",
                MAX_SEATS_PER_ROW
            )));
        }
        if self.base_ticket_price == 0 {
            return Err(SeatError::InvalidConfiguration(
                "base_ticket_price must be greater than 0".to_string(),
            ));
        }
        // Every total the engine can report stays below this bound
        if self.full_house_price().is_none() {
            return Err(SeatError::InvalidConfiguration(format!(
                "ticket prices too large: {} + {} for {} seats overflows",
                self.base_ticket_price,
                self.package_surcharge,
                self.capacity()
            )));
        }
        let p = self.occupancy.probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(SeatError::InvalidConfiguration(format!(
                "occupancy probability must be within [0, 1], got {}",
                p
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Display Labels
// ============================================================================

/// Localized strings used by the derived display text.
///
/// Defaults are the Traditional Chinese strings of the box office UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatLabels {
    #[serde(default = "default_selected_prefix")]
    pub selected_prefix: String,
    #[serde(default = "default_none_selected")]
    pub none_selected: String,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default = "default_total_prefix")]
    pub total_prefix: String,
    #[serde(default = "default_regular")]
    pub regular: String,
    #[serde(default = "default_package")]
    pub package: String,
}

impl Default for SeatLabels {
    fn default() -> Self {
        Self {
            selected_prefix: default_selected_prefix(),
            none_selected: default_none_selected(),
            separator: default_separator(),
            total_prefix: default_total_prefix(),
            regular: default_regular(),
            package: default_package(),
        }
    }
}

impl SeatLabels {
    /// Label for a ticket type.
    pub fn ticket_type(&self, ticket_type: TicketType) -> &str {
        match ticket_type {
            TicketType::Regular => &self.regular,
            TicketType::Package => &self.package,
        }
    }
}

fn default_selected_prefix() -> String {
    "已選座位：".to_string()
}

fn default_none_selected() -> String {
    "尚未選擇".to_string()
}

fn default_separator() -> String {
    "、".to_string()
}

fn default_total_prefix() -> String {
    "總金額：$".to_string()
}

fn default_regular() -> String {
    "一般票".to_string()
}

fn default_package() -> String {
    "套餐票".to_string()
}
