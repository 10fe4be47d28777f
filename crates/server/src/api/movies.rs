//! Movie listing API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use boxoffice_core::{Movie, MovieCatalog};

use super::handlers::{catalog_error, error_response, ApiError};
use crate::state::AppState;

/// Poster size requested from the image CDN.
const POSTER_SIZE: &str = "w500";

#[derive(Debug, Serialize)]
pub struct MovieResponse {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_text: Option<String>,
}

impl MovieResponse {
    fn new(catalog: &dyn MovieCatalog, movie: Movie) -> Self {
        Self {
            poster_url: catalog.poster_url(&movie, POSTER_SIZE),
            year: movie.year(),
            runtime_text: movie.runtime_text(),
            movie,
        }
    }
}

pub(crate) fn require_catalog(state: &AppState) -> Result<Arc<dyn MovieCatalog>, ApiError> {
    state.catalog().cloned().ok_or_else(|| {
        error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Movie catalog not configured",
        )
    })
}

/// GET /api/v1/movies
///
/// Movies currently in theaters.
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MovieResponse>>, ApiError> {
    let catalog = require_catalog(&state)?;
    let movies = catalog.now_playing().await.map_err(catalog_error)?;

    Ok(Json(
        movies
            .into_iter()
            .map(|movie| MovieResponse::new(catalog.as_ref(), movie))
            .collect(),
    ))
}

/// GET /api/v1/movies/{id}
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<MovieResponse>, ApiError> {
    let catalog = require_catalog(&state)?;
    let movie = catalog.movie_detail(id).await.map_err(catalog_error)?;

    Ok(Json(MovieResponse::new(catalog.as_ref(), movie)))
}
