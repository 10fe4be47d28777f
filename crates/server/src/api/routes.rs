use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, middleware::metrics_middleware, movies, sessions, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::get_metrics))
        // Movie catalog
        .route("/movies", get(movies::list_movies))
        .route("/movies/{id}", get(movies::get_movie))
        // Seat selection sessions
        .route("/sessions", post(sessions::create_session))
        .route(
            "/sessions/{id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/sessions/{id}/reset", post(sessions::reset_session))
        .route(
            "/sessions/{id}/seats/{row}/{column}/toggle",
            post(sessions::toggle_seat),
        )
        .route("/sessions/{id}/ticket-type", put(sessions::set_ticket_type))
        .route("/sessions/{id}/checkout", post(sessions::checkout))
        .route("/sessions/{id}/ws", get(ws::session_ws))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
