//! Seat selection engine: selection tracking, pricing and display text.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::events::{ObserverSet, SeatEvent, SeatObserver, SubscriptionId};
use super::grid::SeatGrid;
use super::random::RandomSource;
use super::types::{
    Seat, SeatLabels, SeatLayoutConfiguration, SeatStatus, TicketType, ToggleOutcome,
};
use super::SeatError;
use crate::metrics::SEAT_TOGGLES;

/// Coordinates the seat grid with ticket type, pricing and observers.
///
/// All mutators take `&mut self` and deliver their notifications before
/// returning, so a toggle and its events are never interleaved with another
/// toggle.
pub struct SeatSelectionEngine {
    config: SeatLayoutConfiguration,
    grid: SeatGrid,
    /// Keyed by `(row, column)`, which is also the display order.
    selected: BTreeMap<(usize, usize), Seat>,
    ticket_type: TicketType,
    labels: SeatLabels,
    observers: ObserverSet,
    random: Box<dyn RandomSource>,
}

impl SeatSelectionEngine {
    /// Create an engine and generate its first layout.
    pub fn new(
        config: SeatLayoutConfiguration,
        mut random: Box<dyn RandomSource>,
    ) -> Result<Self, SeatError> {
        let grid = SeatGrid::initialize(&config, random.as_mut())?;
        Ok(Self {
            config,
            grid,
            selected: BTreeMap::new(),
            ticket_type: TicketType::Regular,
            labels: SeatLabels::default(),
            observers: ObserverSet::default(),
            random,
        })
    }

    /// Replace the display labels.
    pub fn with_labels(mut self, labels: SeatLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Regenerate the layout, clear the selection and reset the ticket type.
    ///
    /// On an invalid configuration the current state is kept.
    pub fn initialize(&mut self, config: SeatLayoutConfiguration) -> Result<(), SeatError> {
        let grid = SeatGrid::initialize(&config, self.random.as_mut())?;
        self.config = config;
        self.grid = grid;
        self.selected.clear();
        self.ticket_type = TicketType::Regular;
        info!(
            "Seat layout initialized: {}x{}, base price {}",
            config.number_of_rows, config.seats_per_row, config.base_ticket_price
        );
        Ok(())
    }

    /// Toggle a seat between available and selected.
    ///
    /// Out-of-bounds positions are reported without notifying anyone.
    /// Occupied seats return [`ToggleOutcome::Unchanged`] and emit nothing.
    pub fn toggle_seat(&mut self, row: i32, column: i32) -> Result<ToggleOutcome, SeatError> {
        let outcome = match self.grid.toggle(row, column) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Rejected seat toggle: {}", e);
                SEAT_TOGGLES.with_label_values(&["out_of_bounds"]).inc();
                return Err(e);
            }
        };

        let seat = *outcome.seat();
        if !outcome.is_changed() {
            debug!("Ignored toggle on occupied seat {}", seat.display_name());
            SEAT_TOGGLES.with_label_values(&["ignored"]).inc();
            return Ok(outcome);
        }

        match seat.status {
            SeatStatus::Selected => {
                self.selected.insert((seat.row, seat.column), seat);
                SEAT_TOGGLES.with_label_values(&["selected"]).inc();
            }
            _ => {
                self.selected.remove(&(seat.row, seat.column));
                SEAT_TOGGLES.with_label_values(&["released"]).inc();
            }
        }
        debug!(
            "Seat {} is now {} ({} selected)",
            seat.display_name(),
            seat.status.as_str(),
            self.selected.len()
        );

        self.observers.emit(SeatEvent::SeatStatusChanged {
            row: seat.row,
            column: seat.column,
            status: seat.status,
        });
        self.observers.emit(SeatEvent::SelectionChanged);

        Ok(outcome)
    }

    /// Switch the ticket type. The selection is not touched.
    pub fn set_ticket_type(&mut self, ticket_type: TicketType) {
        self.ticket_type = ticket_type;
        debug!("Ticket type set to {:?}", ticket_type);
        self.observers.emit(SeatEvent::PriceChanged);
    }

    /// Release every selected seat back to available.
    ///
    /// Returns how many seats were released.
    pub fn clear_selection(&mut self) -> usize {
        let positions: Vec<(usize, usize)> = self.selected.keys().copied().collect();
        self.release_seats(positions)
    }

    /// Release the given seats if they are still selected.
    ///
    /// Positions that are not selected are skipped. Emits one
    /// `SeatStatusChanged` per released seat and a single `SelectionChanged`
    /// when anything was released.
    pub fn release_seats<I>(&mut self, positions: I) -> usize
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut released = 0;

        for (row, column) in positions {
            if !self.selected.contains_key(&(row, column)) {
                continue;
            }
            // Selected positions always come from this grid, so they fit in i32
            let (Ok(r), Ok(c)) = (i32::try_from(row), i32::try_from(column)) else {
                continue;
            };
            if let Ok(ToggleOutcome::Changed { seat, .. }) = self.grid.toggle(r, c) {
                self.selected.remove(&(row, column));
                released += 1;
                self.observers.emit(SeatEvent::SeatStatusChanged {
                    row: seat.row,
                    column: seat.column,
                    status: seat.status,
                });
            }
        }

        if released > 0 {
            info!("Released {} selected seats", released);
            self.observers.emit(SeatEvent::SelectionChanged);
        }
        released
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Register an observer for seat, selection and price notifications.
    pub fn subscribe(&mut self, observer: Arc<dyn SeatObserver>) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // ========================================================================
    // Derived text
    // ========================================================================

    /// Selected seats in row/column order, e.g. `已選座位：A3、A10、B6`.
    pub fn selected_seats_text(&self) -> String {
        if self.selected.is_empty() {
            return format!("{}{}", self.labels.selected_prefix, self.labels.none_selected);
        }
        let names: Vec<String> = self.selected.values().map(Seat::display_name).collect();
        format!(
            "{}{}",
            self.labels.selected_prefix,
            names.join(&self.labels.separator)
        )
    }

    /// Total price with currency prefix, e.g. `總金額：$840`.
    pub fn total_price_text(&self) -> String {
        format!("{}{}", self.labels.total_prefix, self.total_price())
    }

    /// Label for the current ticket type.
    pub fn ticket_type_text(&self) -> &str {
        self.labels.ticket_type(self.ticket_type)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// True iff the position is valid and the seat is available.
    pub fn can_select(&self, row: i32, column: i32) -> bool {
        matches!(
            self.grid.get(row, column),
            Ok(Seat {
                status: SeatStatus::Available,
                ..
            })
        )
    }

    /// Seat status, or `Occupied` for positions outside the grid.
    pub fn status_of(&self, row: i32, column: i32) -> SeatStatus {
        self.grid
            .get(row, column)
            .map(|seat| seat.status)
            .unwrap_or(SeatStatus::Occupied)
    }

    pub fn seat(&self, row: i32, column: i32) -> Result<Seat, SeatError> {
        self.grid.get(row, column)
    }

    pub fn number_of_rows(&self) -> usize {
        self.grid.number_of_rows()
    }

    pub fn seats_per_row(&self) -> usize {
        self.grid.seats_per_row()
    }

    pub fn grid(&self) -> &SeatGrid {
        &self.grid
    }

    pub fn config(&self) -> &SeatLayoutConfiguration {
        &self.config
    }

    pub fn labels(&self) -> &SeatLabels {
        &self.labels
    }

    pub fn ticket_type(&self) -> TicketType {
        self.ticket_type
    }

    /// Selected seats in canonical (row, column) order.
    pub fn selected_seats(&self) -> Vec<Seat> {
        self.selected.values().copied().collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Unit price for a ticket type under the current layout.
    pub fn price_of(&self, ticket_type: TicketType) -> u64 {
        self.config.price_of(ticket_type)
    }

    /// Unit price for the current ticket type.
    pub fn ticket_price(&self) -> u64 {
        self.price_of(self.ticket_type)
    }

    /// Selected count times the unit price. Validated layouts keep this
    /// below [`SeatLayoutConfiguration::full_house_price`].
    pub fn total_price(&self) -> u64 {
        self.ticket_price().saturating_mul(self.selected.len() as u64)
    }
}

impl std::fmt::Debug for SeatSelectionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeatSelectionEngine")
            .field("config", &self.config)
            .field("selected", &self.selected.len())
            .field("ticket_type", &self.ticket_type)
            .field("observers", &self.observers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seating::ThreadRandom;
    use crate::testing::{RecordingObserver, ScriptedRandom};

    fn open_hall() -> SeatSelectionEngine {
        SeatSelectionEngine::new(
            SeatLayoutConfiguration::standard(),
            Box::new(ScriptedRandom::all_available()),
        )
        .unwrap()
    }

    fn observed(engine: &mut SeatSelectionEngine) -> Arc<RecordingObserver> {
        let observer = Arc::new(RecordingObserver::new());
        engine.subscribe(observer.clone());
        observer
    }

    #[test]
    fn test_fresh_engine_state() {
        let engine = open_hall();
        assert_eq!(engine.number_of_rows(), 8);
        assert_eq!(engine.seats_per_row(), 10);
        assert_eq!(engine.ticket_type(), TicketType::Regular);
        assert_eq!(engine.selected_count(), 0);
        assert_eq!(engine.selected_seats_text(), "已選座位：尚未選擇");
        assert_eq!(engine.total_price_text(), "總金額：$0");
        assert_eq!(engine.ticket_type_text(), "一般票");
    }

    #[test]
    fn test_random_layout_never_starts_selected() {
        let engine = SeatSelectionEngine::new(
            SeatLayoutConfiguration::standard(),
            Box::new(ThreadRandom::new()),
        )
        .unwrap();

        for row in 0..8 {
            for column in 0..10 {
                assert_ne!(engine.status_of(row, column), SeatStatus::Selected);
            }
        }
    }

    #[test]
    fn test_new_rejects_invalid_configuration() {
        let config = SeatLayoutConfiguration {
            seats_per_row: 0,
            ..SeatLayoutConfiguration::standard()
        };
        let result = SeatSelectionEngine::new(config, Box::new(ThreadRandom::new()));
        assert!(matches!(result, Err(SeatError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_toggle_emits_status_then_selection() {
        let mut engine = open_hall();
        let observer = observed(&mut engine);

        engine.toggle_seat(2, 3).unwrap();

        assert_eq!(
            observer.events(),
            vec![
                SeatEvent::SeatStatusChanged {
                    row: 2,
                    column: 3,
                    status: SeatStatus::Selected,
                },
                SeatEvent::SelectionChanged,
            ]
        );
    }

    #[test]
    fn test_double_toggle_round_trips() {
        let mut engine = open_hall();
        let observer = observed(&mut engine);

        engine.toggle_seat(4, 4).unwrap();
        engine.toggle_seat(4, 4).unwrap();

        assert_eq!(engine.status_of(4, 4), SeatStatus::Available);
        assert_eq!(engine.selected_count(), 0);
        assert!(engine.selected_seats().is_empty());
        assert_eq!(observer.len(), 4);
        assert_eq!(
            observer.events()[2],
            SeatEvent::SeatStatusChanged {
                row: 4,
                column: 4,
                status: SeatStatus::Available,
            }
        );
    }

    #[test]
    fn test_occupied_toggle_is_silent_noop() {
        let mut engine = SeatSelectionEngine::new(
            SeatLayoutConfiguration::new(2, 2, 100).unwrap(),
            Box::new(ScriptedRandom::from_pattern(&["X.", ".."])),
        )
        .unwrap();
        let observer = observed(&mut engine);

        for _ in 0..3 {
            let outcome = engine.toggle_seat(0, 0).unwrap();
            assert!(!outcome.is_changed());
        }

        assert_eq!(engine.status_of(0, 0), SeatStatus::Occupied);
        assert_eq!(engine.selected_count(), 0);
        assert!(observer.is_empty());
        assert!(!engine.can_select(0, 0));
        assert!(engine.can_select(0, 1));
    }

    #[test]
    fn test_out_of_bounds_toggle_reports_without_notifying() {
        let mut engine = open_hall();
        let observer = observed(&mut engine);

        let low = engine.toggle_seat(-1, 0).unwrap_err();
        let high = engine.toggle_seat(8, 0).unwrap_err();

        assert!(matches!(low, SeatError::OutOfBounds { row: -1, column: 0, .. }));
        assert!(matches!(high, SeatError::OutOfBounds { row: 8, column: 0, .. }));
        assert!(observer.is_empty());
        assert_eq!(engine.selected_count(), 0);
    }

    #[test]
    fn test_status_of_invalid_position_is_occupied() {
        let engine = open_hall();
        assert_eq!(engine.status_of(-1, 0), SeatStatus::Occupied);
        assert_eq!(engine.status_of(0, 10), SeatStatus::Occupied);
        assert!(!engine.can_select(100, 100));
        assert_eq!(engine.status_of(0, 0), SeatStatus::Available);
    }

    #[test]
    fn test_selected_text_uses_canonical_order() {
        let mut engine = open_hall();

        engine.toggle_seat(1, 5).unwrap();
        engine.toggle_seat(0, 2).unwrap();
        engine.toggle_seat(0, 9).unwrap();

        assert_eq!(engine.selected_seats_text(), "已選座位：A3、A10、B6");
        let order: Vec<(usize, usize)> = engine
            .selected_seats()
            .iter()
            .map(|s| (s.row, s.column))
            .collect();
        assert_eq!(order, vec![(0, 2), (0, 9), (1, 5)]);
    }

    #[test]
    fn test_reference_pricing_scenario() {
        let mut engine = open_hall();

        engine.toggle_seat(0, 0).unwrap();
        engine.toggle_seat(3, 7).unwrap();
        engine.toggle_seat(7, 9).unwrap();
        assert_eq!(engine.total_price(), 840);
        assert_eq!(engine.total_price_text(), "總金額：$840");

        let observer = observed(&mut engine);
        engine.set_ticket_type(TicketType::Package);

        assert_eq!(engine.total_price(), 1200);
        assert_eq!(engine.total_price_text(), "總金額：$1200");
        assert_eq!(engine.ticket_type_text(), "套餐票");
        assert_eq!(engine.selected_count(), 3);
        assert_eq!(observer.events(), vec![SeatEvent::PriceChanged]);
    }

    #[test]
    fn test_selected_count_matches_grid() {
        let mut engine = SeatSelectionEngine::new(
            SeatLayoutConfiguration::standard(),
            Box::new(ThreadRandom::seeded(7)),
        )
        .unwrap();

        let taps = [(0, 0), (1, 1), (0, 0), (5, 5), (7, 9), (5, 5), (2, 8), (-3, 2)];
        for (row, column) in taps {
            let _ = engine.toggle_seat(row, column);
            assert_eq!(
                engine.selected_count(),
                engine.grid().count(SeatStatus::Selected)
            );
            assert_eq!(
                engine.total_price(),
                engine.selected_count() as u64 * engine.price_of(engine.ticket_type())
            );
        }
    }

    #[test]
    fn test_initialize_clears_selection_and_ticket_type() {
        let mut engine = open_hall();
        engine.toggle_seat(0, 0).unwrap();
        engine.toggle_seat(0, 1).unwrap();
        engine.set_ticket_type(TicketType::Package);

        engine.initialize(SeatLayoutConfiguration::standard()).unwrap();

        assert_eq!(engine.selected_count(), 0);
        assert_eq!(engine.ticket_type(), TicketType::Regular);
        assert_eq!(engine.grid().count(SeatStatus::Selected), 0);
        assert_eq!(engine.selected_seats_text(), "已選座位：尚未選擇");
    }

    #[test]
    fn test_initialize_twice_clears_even_when_cell_becomes_occupied() {
        let config = SeatLayoutConfiguration::new(1, 2, 100).unwrap();
        // First layout: both open. Second layout: both occupied.
        let random = ScriptedRandom::new(vec![0.99, 0.99, 0.0, 0.0]);
        let mut engine = SeatSelectionEngine::new(config, Box::new(random)).unwrap();

        engine.toggle_seat(0, 1).unwrap();
        engine.initialize(config).unwrap();

        assert_eq!(engine.selected_count(), 0);
        assert_eq!(engine.status_of(0, 1), SeatStatus::Occupied);
        assert_eq!(engine.total_price(), 0);
    }

    #[test]
    fn test_initialize_with_invalid_config_keeps_state() {
        let mut engine = open_hall();
        engine.toggle_seat(1, 1).unwrap();

        let bad = SeatLayoutConfiguration {
            base_ticket_price: 0,
            ..SeatLayoutConfiguration::standard()
        };
        assert!(engine.initialize(bad).is_err());
        assert_eq!(engine.selected_count(), 1);
        assert_eq!(engine.config().base_ticket_price, 280);
    }

    #[test]
    fn test_clear_selection_releases_seats() {
        let mut engine = open_hall();
        engine.toggle_seat(0, 0).unwrap();
        engine.toggle_seat(6, 2).unwrap();
        let observer = observed(&mut engine);

        assert_eq!(engine.clear_selection(), 2);

        assert_eq!(engine.selected_count(), 0);
        assert_eq!(engine.status_of(0, 0), SeatStatus::Available);
        assert_eq!(engine.status_of(6, 2), SeatStatus::Available);
        assert_eq!(observer.count_of("seat_status_changed"), 2);
        assert_eq!(observer.count_of("selection_changed"), 1);

        // Nothing left: no further notifications
        assert_eq!(engine.clear_selection(), 0);
        assert_eq!(observer.len(), 3);
    }

    #[test]
    fn test_release_seats_only_touches_given_positions() {
        let mut engine = open_hall();
        engine.toggle_seat(0, 0).unwrap();
        engine.toggle_seat(0, 1).unwrap();
        let observer = observed(&mut engine);

        // (5, 5) was never selected and is skipped
        assert_eq!(engine.release_seats([(0, 0), (5, 5)]), 1);

        assert_eq!(engine.status_of(0, 0), SeatStatus::Available);
        assert_eq!(engine.status_of(0, 1), SeatStatus::Selected);
        assert_eq!(engine.status_of(5, 5), SeatStatus::Available);
        assert_eq!(engine.selected_seats_text(), "已選座位：A2");
        assert_eq!(
            observer.events(),
            vec![
                SeatEvent::SeatStatusChanged {
                    row: 0,
                    column: 0,
                    status: SeatStatus::Available,
                },
                SeatEvent::SelectionChanged,
            ]
        );

        assert_eq!(engine.release_seats([(0, 0)]), 0);
        assert_eq!(observer.len(), 2);
    }

    #[test]
    fn test_overflowing_prices_are_rejected() {
        let config = SeatLayoutConfiguration {
            base_ticket_price: u64::MAX - 10,
            ..SeatLayoutConfiguration::standard()
        };
        let result = SeatSelectionEngine::new(config, Box::new(ThreadRandom::new()));
        assert!(matches!(result, Err(SeatError::InvalidConfiguration(_))));

        let mut engine = open_hall();
        engine.toggle_seat(0, 0).unwrap();
        let wide = SeatLayoutConfiguration {
            base_ticket_price: u64::MAX / 2 + 1,
            ..SeatLayoutConfiguration::standard()
        };
        assert!(engine.initialize(wide).is_err());
        assert_eq!(engine.total_price(), 280);
    }

    #[test]
    fn test_full_hall_at_largest_safe_price() {
        let base = u64::MAX / 80 - crate::seating::DEFAULT_PACKAGE_SURCHARGE;
        let mut engine = SeatSelectionEngine::new(
            SeatLayoutConfiguration::new(8, 10, base).unwrap(),
            Box::new(ScriptedRandom::all_available()),
        )
        .unwrap();

        for row in 0..8 {
            for column in 0..10 {
                engine.toggle_seat(row, column).unwrap();
            }
        }
        engine.set_ticket_type(TicketType::Package);

        assert_eq!(Some(engine.total_price()), engine.config().full_house_price());
        assert!(engine.total_price_text().ends_with(&engine.total_price().to_string()));
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut engine = open_hall();
        let observer = Arc::new(RecordingObserver::new());
        let id = engine.subscribe(observer.clone());

        assert!(engine.unsubscribe(id));
        engine.toggle_seat(0, 0).unwrap();

        assert!(observer.is_empty());
        assert_eq!(engine.observer_count(), 0);
    }

    #[test]
    fn test_custom_labels() {
        let labels = SeatLabels {
            selected_prefix: "Seats: ".to_string(),
            none_selected: "none".to_string(),
            separator: ", ".to_string(),
            total_prefix: "Total: $".to_string(),
            regular: "Regular".to_string(),
            package: "Combo".to_string(),
        };
        let mut engine = open_hall().with_labels(labels);

        assert_eq!(engine.selected_seats_text(), "Seats: none");
        engine.toggle_seat(0, 1).unwrap();
        engine.toggle_seat(0, 0).unwrap();
        assert_eq!(engine.selected_seats_text(), "Seats: A1, A2");
        assert_eq!(engine.total_price_text(), "Total: $560");
        assert_eq!(engine.ticket_type_text(), "Regular");
    }
}
