use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use boxoffice_core::{BookingError, CatalogError, SanitizedConfig, SeatError};

use crate::metrics::encode_metrics;
use crate::state::{AppState, SessionError};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub sessions: usize,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        sessions: state.session_count().await,
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// GET /api/v1/metrics
pub async fn get_metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}

// ============================================================================
// Error responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error half of every fallible handler.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub fn seat_error(e: SeatError) -> ApiError {
    let status = match e {
        SeatError::OutOfBounds { .. } => StatusCode::BAD_REQUEST,
        SeatError::InvalidConfiguration(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    error_response(status, e.to_string())
}

pub fn session_error(e: SessionError) -> ApiError {
    match e {
        SessionError::Seat(e) => seat_error(e),
        SessionError::LimitReached(_) => {
            warn!("Rejected new session: {}", e);
            error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
    }
}

pub fn catalog_error(e: CatalogError) -> ApiError {
    let status = match e {
        CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
        CatalogError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
        CatalogError::HttpError(_)
        | CatalogError::ApiError { .. }
        | CatalogError::ParseError(_) => {
            warn!("Movie catalog request failed: {}", e);
            StatusCode::BAD_GATEWAY
        }
    };
    error_response(status, e.to_string())
}

pub fn booking_error(e: BookingError) -> ApiError {
    let status = match e {
        BookingError::EmptySelection => StatusCode::BAD_REQUEST,
        BookingError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
        BookingError::HttpError(_) | BookingError::Rejected { .. } => StatusCode::BAD_GATEWAY,
    };
    error_response(status, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_error_statuses() {
        let (status, body) = seat_error(SeatError::OutOfBounds {
            row: -1,
            column: 0,
            rows: 8,
            columns: 10,
        });
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.error.is_empty());

        let (status, _) = seat_error(SeatError::InvalidConfiguration("rows".to_string()));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_session_error_statuses() {
        let (status, _) = session_error(SessionError::LimitReached(10));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, _) = session_error(SessionError::Seat(SeatError::InvalidConfiguration(
            "rows".to_string(),
        )));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_catalog_error_statuses() {
        let (status, _) = catalog_error(CatalogError::NotFound("movie 1".to_string()));
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = catalog_error(CatalogError::ApiError {
            status: 500,
            message: "boom".to_string(),
        });
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_booking_error_statuses() {
        let (status, _) = booking_error(BookingError::EmptySelection);
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = booking_error(BookingError::Rejected {
            status: 500,
            message: "down".to_string(),
        });
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
