use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use boxoffice_core::{
    BookingUploader, Config, MovieCatalog, RandomSource, SanitizedConfig, SeatError, ThreadRandom,
};

use crate::metrics::{SESSIONS_ACTIVE, SESSIONS_EVICTED_TOTAL};
use crate::session::{SeatSession, Showing};

/// Produces the random source for each new seat layout.
pub type RandomFactory = Arc<dyn Fn() -> Box<dyn RandomSource> + Send + Sync>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Seat(#[from] SeatError),

    #[error("Too many open sessions (limit {0})")]
    LimitReached(usize),
}

/// Shared application state
pub struct AppState {
    config: Config,
    catalog: Option<Arc<dyn MovieCatalog>>,
    uploader: Option<Arc<dyn BookingUploader>>,
    random: RandomFactory,
    sessions: RwLock<HashMap<Uuid, Arc<SeatSession>>>,
}

impl AppState {
    pub fn new(
        config: Config,
        catalog: Option<Arc<dyn MovieCatalog>>,
        uploader: Option<Arc<dyn BookingUploader>>,
    ) -> Self {
        Self {
            config,
            catalog,
            uploader,
            random: Arc::new(|| Box::new(ThreadRandom::new()) as Box<dyn RandomSource>),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the random source used for new seat layouts.
    pub fn with_random_source(mut self, random: RandomFactory) -> Self {
        self.random = random;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    /// Movie catalog, if `[tmdb]` is configured.
    pub fn catalog(&self) -> Option<&Arc<dyn MovieCatalog>> {
        self.catalog.as_ref()
    }

    /// Booking uploader, if `[booking]` is configured.
    pub fn uploader(&self) -> Option<&Arc<dyn BookingUploader>> {
        self.uploader.as_ref()
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Create a session with the configured seating and register it.
    ///
    /// Idle sessions are swept first when the registry is full.
    pub async fn create_session(&self, showing: Showing) -> Result<Arc<SeatSession>, SessionError> {
        let limit = self.config.server.max_sessions;
        if self.session_count().await >= limit {
            self.evict_idle(Utc::now()).await;
        }

        let session = Arc::new(SeatSession::new(
            showing,
            &self.config.seating,
            (self.random)(),
            self.config.server.event_buffer,
        )?);

        let mut sessions = self.sessions.write().await;
        if sessions.len() >= limit {
            return Err(SessionError::LimitReached(limit));
        }
        sessions.insert(session.id(), Arc::clone(&session));
        SESSIONS_ACTIVE.set(sessions.len() as i64);
        Ok(session)
    }

    /// Look a session up and mark it active.
    pub async fn session(&self, id: Uuid) -> Option<Arc<SeatSession>> {
        let session = self.sessions.read().await.get(&id).cloned()?;
        session.touch();
        Some(session)
    }

    pub async fn remove_session(&self, id: Uuid) -> Option<Arc<SeatSession>> {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(&id);
        SESSIONS_ACTIVE.set(sessions.len() as i64);
        removed
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Close sessions idle for at least `server.session_ttl_secs` as of
    /// `now`. Sessions with an upload in flight are kept.
    ///
    /// Returns how many sessions were closed.
    pub async fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let ttl = chrono::Duration::seconds(
            i64::try_from(self.config.server.session_ttl_secs).unwrap_or(i64::MAX),
        );

        let candidates: Vec<Arc<SeatSession>> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|session| now.signed_duration_since(session.last_active()) >= ttl)
            .cloned()
            .collect();

        let mut expired = Vec::new();
        for session in candidates {
            if !session.upload_status().await.is_uploading() {
                expired.push(session.id());
            }
        }
        if expired.is_empty() {
            return 0;
        }

        let mut sessions = self.sessions.write().await;
        let mut evicted = 0;
        for id in expired {
            // Skip sessions used since they were picked
            let still_idle = sessions
                .get(&id)
                .is_some_and(|s| now.signed_duration_since(s.last_active()) >= ttl);
            if still_idle {
                sessions.remove(&id);
                evicted += 1;
            }
        }
        SESSIONS_ACTIVE.set(sessions.len() as i64);
        SESSIONS_EVICTED_TOTAL.inc_by(evicted as u64);
        if evicted > 0 {
            info!("Closed {} idle seat sessions", evicted);
        }
        evicted
    }

    /// Sweep idle sessions every `server.session_sweep_secs` until the
    /// state is dropped.
    pub fn spawn_session_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        self.spawn_sweeper_every(Duration::from_secs(self.config.server.session_sweep_secs))
    }

    fn spawn_sweeper_every(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let state: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let Some(state) = state.upgrade() else {
                    debug!("Session sweeper stopped");
                    break;
                };
                state.evict_idle(Utc::now()).await;
            }
        })
    }
}
