//! Movie catalog integration.
//!
//! Supplies the now-playing list and movie details shown before seat
//! selection. TMDB is the only backend.

mod tmdb;
mod types;

pub use tmdb::{TmdbClient, TmdbConfig};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the movie catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Source of movie listings.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Movies currently in theaters.
    async fn now_playing(&self) -> Result<Vec<Movie>, CatalogError>;

    /// Full details for one movie.
    async fn movie_detail(&self, id: u32) -> Result<Movie, CatalogError>;

    /// Absolute poster URL for a movie, if it has a poster.
    fn poster_url(&self, movie: &Movie, size: &str) -> Option<String>;
}
