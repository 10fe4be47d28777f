//! Seat selection session API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use boxoffice_core::{
    BookingData, BookingReceipt, Seat, SeatLayoutConfiguration, SeatStatus, TicketType,
    ToggleOutcome, UploadStatus,
};

use super::handlers::{
    booking_error, catalog_error, error_response, seat_error, session_error, ApiError,
};
use super::movies::require_catalog;
use crate::metrics::{CHECKOUTS_TOTAL, SESSIONS_CREATED_TOTAL};
use crate::session::{IdleEngine, SeatSession, SessionSnapshot, Showing};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a session
#[derive(Debug, Deserialize)]
pub struct CreateSessionBody {
    /// Catalog movie; its title is looked up when `movie_title` is absent
    pub movie_id: Option<u32>,
    pub movie_title: Option<String>,
    /// Defaults to today
    pub show_date: Option<NaiveDate>,
    #[serde(default)]
    pub show_time: String,
}

/// Request body for regenerating a layout. Absent fields keep their value.
#[derive(Debug, Default, Deserialize)]
pub struct ResetSessionBody {
    pub rows: Option<usize>,
    pub seats_per_row: Option<usize>,
    pub base_ticket_price: Option<u64>,
    pub package_surcharge: Option<u64>,
}

impl ResetSessionBody {
    fn apply(&self, mut layout: SeatLayoutConfiguration) -> SeatLayoutConfiguration {
        if let Some(rows) = self.rows {
            layout.number_of_rows = rows;
        }
        if let Some(seats_per_row) = self.seats_per_row {
            layout.seats_per_row = seats_per_row;
        }
        if let Some(price) = self.base_ticket_price {
            layout.base_ticket_price = price;
        }
        if let Some(surcharge) = self.package_surcharge {
            layout.package_surcharge = surcharge;
        }
        layout
    }
}

#[derive(Debug, Deserialize)]
pub struct TicketTypeBody {
    pub ticket_type: TicketType,
}

/// Response for a seat toggle
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub changed: bool,
    pub seat: Seat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<SeatStatus>,
    pub selected_seats: Vec<String>,
    pub selected_seats_text: String,
    pub total_price: u64,
    pub total_price_text: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub booking: BookingData,
    pub receipt: BookingReceipt,
    /// Seats returned to available after the upload
    pub released: usize,
}

// ============================================================================
// Helpers
// ============================================================================

async fn find_session(state: &AppState, id: Uuid) -> Result<Arc<SeatSession>, ApiError> {
    state.session(id).await.ok_or_else(|| {
        error_response(StatusCode::NOT_FOUND, format!("Session not found: {}", id))
    })
}

fn checkout_in_progress() -> ApiError {
    error_response(StatusCode::CONFLICT, "Checkout in progress")
}

/// Engine access for a mutation; 409 while a checkout is uploading.
async fn idle_engine(session: &SeatSession) -> Result<IdleEngine<'_>, ApiError> {
    session.engine_if_idle().await.ok_or_else(checkout_in_progress)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/sessions
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateSessionBody>,
) -> Result<(StatusCode, Json<SessionSnapshot>), ApiError> {
    let movie_title = match (body.movie_title, body.movie_id) {
        (Some(title), _) if !title.trim().is_empty() => title,
        (_, Some(movie_id)) => {
            let catalog = require_catalog(&state)?;
            catalog
                .movie_detail(movie_id)
                .await
                .map_err(catalog_error)?
                .title
        }
        _ => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "movie_id or movie_title is required",
            ))
        }
    };

    let showing = Showing {
        movie_id: body.movie_id,
        movie_title,
        show_date: body.show_date.unwrap_or_else(|| Utc::now().date_naive()),
        show_time: body.show_time,
    };

    let session = state.create_session(showing).await.map_err(session_error)?;
    SESSIONS_CREATED_TOTAL.inc();
    info!(
        "Created seat session {} for {:?}",
        session.id(),
        session.showing().movie_title
    );

    Ok((StatusCode::CREATED, Json(session.snapshot().await)))
}

/// GET /api/v1/sessions/{id}
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = find_session(&state, id).await?;
    Ok(Json(session.snapshot().await))
}

/// DELETE /api/v1/sessions/{id}
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    match state.remove_session(id).await {
        Some(_) => {
            info!("Closed seat session {}", id);
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(error_response(
            StatusCode::NOT_FOUND,
            format!("Session not found: {}", id),
        )),
    }
}

/// POST /api/v1/sessions/{id}/reset
///
/// Regenerate the layout; clears the selection and ticket type.
pub async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<ResetSessionBody>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = find_session(&state, id).await?;

    {
        let mut status = session.upload_status_mut().await;
        if status.is_uploading() {
            return Err(checkout_in_progress());
        }
        let mut engine = session.engine().await;
        let layout = body.apply(*engine.config());
        engine.initialize(layout).map_err(seat_error)?;
        *status = UploadStatus::Idle;
    }

    Ok(Json(session.snapshot().await))
}

/// POST /api/v1/sessions/{id}/seats/{row}/{column}/toggle
pub async fn toggle_seat(
    State(state): State<Arc<AppState>>,
    Path((id, row, column)): Path<(Uuid, i32, i32)>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let session = find_session(&state, id).await?;

    let mut engine = idle_engine(&session).await?;
    let outcome = engine.toggle_seat(row, column).map_err(seat_error)?;
    let (changed, seat, previous) = match outcome {
        ToggleOutcome::Changed { seat, previous } => (true, seat, Some(previous)),
        ToggleOutcome::Unchanged { seat } => (false, seat, None),
    };

    Ok(Json(ToggleResponse {
        changed,
        seat,
        previous,
        selected_seats: engine
            .selected_seats()
            .iter()
            .map(|s| s.display_name())
            .collect(),
        selected_seats_text: engine.selected_seats_text(),
        total_price: engine.total_price(),
        total_price_text: engine.total_price_text(),
    }))
}

/// PUT /api/v1/sessions/{id}/ticket-type
pub async fn set_ticket_type(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<TicketTypeBody>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = find_session(&state, id).await?;

    idle_engine(&session).await?.set_ticket_type(body.ticket_type);
    Ok(Json(session.snapshot().await))
}

/// POST /api/v1/sessions/{id}/checkout
///
/// Upload the current selection. On success the booked seats are released;
/// on failure the selection is kept so the user can retry.
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let uploader = state.uploader().cloned().ok_or_else(|| {
        error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Booking upload not configured",
        )
    })?;
    let session = find_session(&state, id).await?;

    let (booking, booked) = {
        let mut status = session.upload_status_mut().await;
        if status.is_uploading() {
            CHECKOUTS_TOTAL.with_label_values(&["in_progress"]).inc();
            return Err(checkout_in_progress());
        }

        let engine = session.engine().await;
        let showing = session.showing();
        let booking = BookingData::from_engine(
            &engine,
            showing.movie_title.clone(),
            showing.show_date,
            showing.show_time.clone(),
        )
        .map_err(|e| {
            CHECKOUTS_TOTAL.with_label_values(&["empty_selection"]).inc();
            booking_error(e)
        })?;

        let booked: Vec<(usize, usize)> = engine
            .selected_seats()
            .iter()
            .map(|seat| (seat.row, seat.column))
            .collect();

        *status = UploadStatus::Uploading {
            booking_id: booking.booking_id,
        };
        (booking, booked)
    };

    let result = uploader.upload(&booking).await;
    let mut status = session.upload_status_mut().await;
    match result {
        Ok(receipt) => {
            let released = session.engine().await.release_seats(booked);
            *status = UploadStatus::Succeeded {
                receipt: receipt.clone(),
            };
            CHECKOUTS_TOTAL.with_label_values(&["success"]).inc();
            info!(
                "Session {} booked {} seats ({})",
                id, booking.people_count, booking.notes
            );
            Ok(Json(CheckoutResponse {
                booking,
                receipt,
                released,
            }))
        }
        Err(e) => {
            warn!("Session {} checkout failed: {}", id, e);
            *status = UploadStatus::Failed {
                booking_id: booking.booking_id,
                message: e.to_string(),
            };
            CHECKOUTS_TOTAL.with_label_values(&["failed"]).inc();
            Err(booking_error(e))
        }
    }
}
