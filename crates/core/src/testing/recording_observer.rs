//! Observer that records every seat event it receives.

use std::sync::Mutex;

use crate::seating::{SeatEvent, SeatObserver};

#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<SeatEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far, oldest first.
    pub fn events(&self) -> Vec<SeatEvent> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of received events of the given kind, e.g. `"price_changed"`.
    pub fn count_of(&self, kind: &str) -> usize {
        self.lock().iter().filter(|e| e.kind() == kind).count()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SeatEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SeatObserver for RecordingObserver {
    fn notify(&self, event: &SeatEvent) {
        self.lock().push(event.clone());
    }
}
