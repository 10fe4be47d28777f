//! Change notifications raised by the selection engine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::SeatStatus;

/// Notification emitted after a state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SeatEvent {
    /// A single seat changed status.
    SeatStatusChanged {
        row: usize,
        column: usize,
        status: SeatStatus,
    },
    /// The selection changed; derived text and price must be re-read.
    SelectionChanged,
    /// The unit price changed (ticket type switched).
    PriceChanged,
}

impl SeatEvent {
    /// Event name as used in the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            SeatEvent::SeatStatusChanged { .. } => "seat_status_changed",
            SeatEvent::SelectionChanged => "selection_changed",
            SeatEvent::PriceChanged => "price_changed",
        }
    }
}

/// Receiver of engine notifications.
///
/// Called synchronously from inside the mutating engine call, so
/// implementations must not block.
pub trait SeatObserver: Send + Sync {
    fn notify(&self, event: &SeatEvent);
}

impl<F> SeatObserver for F
where
    F: Fn(&SeatEvent) + Send + Sync,
{
    fn notify(&self, event: &SeatEvent) {
        self(event)
    }
}

impl SeatObserver for broadcast::Sender<SeatEvent> {
    fn notify(&self, event: &SeatEvent) {
        // No receivers is fine
        let _ = self.send(event.clone());
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Ordered list of observers.
#[derive(Default)]
pub(crate) struct ObserverSet {
    next_id: u64,
    observers: Vec<(SubscriptionId, Arc<dyn SeatObserver>)>,
}

impl ObserverSet {
    pub(crate) fn subscribe(&mut self, observer: Arc<dyn SeatObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub(crate) fn emit(&self, event: SeatEvent) {
        for (_, observer) in &self.observers {
            observer.notify(&event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }
}

impl std::fmt::Debug for ObserverSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverSet")
            .field("observers", &self.observers.len())
            .finish()
    }
}
