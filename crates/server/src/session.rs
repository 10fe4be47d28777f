//! Seat selection sessions: one engine per client, shared with its WebSocket.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use boxoffice_core::config::SeatingConfig;
use boxoffice_core::{
    RandomSource, SeatError, SeatEvent, SeatSelectionEngine, SeatStatus, TicketType, UploadStatus,
};

/// What is being booked.
#[derive(Debug, Clone, Serialize)]
pub struct Showing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie_id: Option<u32>,
    pub movie_title: String,
    pub show_date: NaiveDate,
    pub show_time: String,
}

/// A client's seat selection, reachable by ID from every endpoint.
///
/// The engine sits behind an async mutex so toggles from concurrent
/// requests are serialized. Engine notifications are forwarded into a
/// broadcast channel that WebSocket clients subscribe to.
///
/// Lock order: upload status first, then engine.
pub struct SeatSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    /// Unix millis of the last request that looked the session up
    last_active: AtomicI64,
    showing: Showing,
    engine: Mutex<SeatSelectionEngine>,
    events: broadcast::Sender<SeatEvent>,
    upload: RwLock<UploadStatus>,
}

/// Engine guard that also holds the upload status for reading, so no
/// checkout can start until it is dropped.
pub struct IdleEngine<'a> {
    _upload: RwLockReadGuard<'a, UploadStatus>,
    engine: MutexGuard<'a, SeatSelectionEngine>,
}

impl Deref for IdleEngine<'_> {
    type Target = SeatSelectionEngine;

    fn deref(&self) -> &Self::Target {
        &self.engine
    }
}

impl DerefMut for IdleEngine<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.engine
    }
}

impl SeatSession {
    /// Build a session and generate its seat layout.
    pub fn new(
        showing: Showing,
        seating: &SeatingConfig,
        random: Box<dyn RandomSource>,
        event_buffer: usize,
    ) -> Result<Self, SeatError> {
        let mut engine =
            SeatSelectionEngine::new(seating.layout(), random)?.with_labels(seating.labels.clone());
        let (events, _) = broadcast::channel(event_buffer.max(1));
        engine.subscribe(Arc::new(events.clone()));

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_active: AtomicI64::new(now.timestamp_millis()),
            showing,
            engine: Mutex::new(engine),
            events,
            upload: RwLock::new(UploadStatus::Idle),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn showing(&self) -> &Showing {
        &self.showing
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Mark the session as used now.
    pub fn touch(&self) {
        self.last_active.store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.last_active.load(Ordering::Relaxed))
            .unwrap_or(self.created_at)
    }

    /// Exclusive access to the engine.
    pub async fn engine(&self) -> MutexGuard<'_, SeatSelectionEngine> {
        self.engine.lock().await
    }

    /// Exclusive access to the engine for a mutation, or `None` while a
    /// checkout is uploading.
    pub async fn engine_if_idle(&self) -> Option<IdleEngine<'_>> {
        let upload = self.upload.read().await;
        if upload.is_uploading() {
            return None;
        }
        let engine = self.engine.lock().await;
        Some(IdleEngine {
            _upload: upload,
            engine,
        })
    }

    /// Receive every seat, selection and price event from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SeatEvent> {
        self.events.subscribe()
    }

    pub async fn upload_status(&self) -> UploadStatus {
        self.upload.read().await.clone()
    }

    /// Write access to the checkout status, held while starting an upload.
    pub async fn upload_status_mut(&self) -> RwLockWriteGuard<'_, UploadStatus> {
        self.upload.write().await
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let upload = self.upload_status().await;
        let engine = self.engine().await;
        SessionSnapshot::new(self, &engine, upload)
    }
}

/// Everything a client needs to render the seat selection screen.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub showing: Showing,
    pub rows: usize,
    pub seats_per_row: usize,
    /// Seat status per row, row `A` first.
    pub seats: Vec<Vec<SeatStatus>>,
    pub selected_seats: Vec<String>,
    pub selected_seats_text: String,
    pub ticket_type: TicketType,
    pub ticket_type_text: String,
    pub ticket_price: u64,
    pub total_price: u64,
    pub total_price_text: String,
    pub upload: UploadStatus,
}

impl SessionSnapshot {
    pub fn new(session: &SeatSession, engine: &SeatSelectionEngine, upload: UploadStatus) -> Self {
        Self {
            id: session.id,
            created_at: session.created_at,
            showing: session.showing.clone(),
            rows: engine.number_of_rows(),
            seats_per_row: engine.seats_per_row(),
            seats: engine
                .grid()
                .rows()
                .map(|row| row.iter().map(|seat| seat.status).collect())
                .collect(),
            selected_seats: engine
                .selected_seats()
                .iter()
                .map(|seat| seat.display_name())
                .collect(),
            selected_seats_text: engine.selected_seats_text(),
            ticket_type: engine.ticket_type(),
            ticket_type_text: engine.ticket_type_text().to_string(),
            ticket_price: engine.ticket_price(),
            total_price: engine.total_price(),
            total_price_text: engine.total_price_text(),
            upload,
        }
    }
}
