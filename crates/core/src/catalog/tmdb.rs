//! TMDB (The Movie Database) API client.
//!
//! TMDB requires an API key for access.
//! Rate limits are generous (around 40 requests per second).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::Movie;
use super::{CatalogError, MovieCatalog};
use crate::metrics::CATALOG_REQUESTS;

/// TMDB API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// TMDB API key (required).
    pub api_key: String,
    /// Base URL (default: https://api.themoviedb.org/3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Image base URL for posters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base_url: Option<String>,
    /// Response language, e.g. `zh-TW`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Region used for the now-playing list, e.g. `TW`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

/// TMDB API client.
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    image_base_url: String,
    language: Option<String>,
    region: Option<String>,
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig) -> Result<Self, CatalogError> {
        if config.api_key.is_empty() {
            return Err(CatalogError::NotConfigured(
                "TMDB API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| "https://api.themoviedb.org/3".to_string());

        let image_base_url = config
            .image_base_url
            .unwrap_or_else(|| "https://image.tmdb.org/t/p".to_string());

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            image_base_url: image_base_url.trim_end_matches('/').to_string(),
            language: config.language,
            region: config.region,
        })
    }

    /// Movies currently in theaters.
    pub async fn now_playing(&self) -> Result<Vec<Movie>, CatalogError> {
        debug!("TMDB now playing: region={:?}", self.region);

        let result = self.fetch_now_playing().await;
        record("now_playing", &result);
        result
    }

    /// Get a specific movie by TMDB ID.
    pub async fn movie_detail(&self, id: u32) -> Result<Movie, CatalogError> {
        debug!("TMDB get movie: id={}", id);

        let result = self.fetch_movie(id).await;
        record("movie_detail", &result);
        result
    }

    async fn fetch_now_playing(&self) -> Result<Vec<Movie>, CatalogError> {
        let url = format!("{}/movie/now_playing", self.base_url);

        let mut request = self.authorized(self.client.get(&url));
        if let Some(region) = &self.region {
            request = request.query(&[("region", region)]);
        }

        let response = check_status(request.send().await?, "Now playing list").await?;
        let page: TmdbPage<TmdbMovieResult> = response.json().await.map_err(|e| {
            CatalogError::ParseError(format!("Failed to parse now playing response: {}", e))
        })?;

        Ok(page.results.into_iter().map(Movie::from).collect())
    }

    async fn fetch_movie(&self, id: u32) -> Result<Movie, CatalogError> {
        let url = format!("{}/movie/{}", self.base_url, id);

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = check_status(response, &format!("Movie ID {}", id)).await?;
        let movie: TmdbMovieDetails = response.json().await.map_err(|e| {
            CatalogError::ParseError(format!("Failed to parse movie response: {}", e))
        })?;

        Ok(movie.into())
    }

    /// Absolute poster URL, e.g. `https://image.tmdb.org/t/p/w500/abc.jpg`.
    pub fn poster_url(&self, movie: &Movie, size: &str) -> Option<String> {
        movie
            .poster_path
            .as_ref()
            .map(|path| format!("{}/{}{}", self.image_base_url, size, path))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.query(&[("api_key", &self.api_key)]);
        match &self.language {
            Some(language) => request.query(&[("language", language)]),
            None => request,
        }
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    async fn now_playing(&self) -> Result<Vec<Movie>, CatalogError> {
        TmdbClient::now_playing(self).await
    }

    async fn movie_detail(&self, id: u32) -> Result<Movie, CatalogError> {
        TmdbClient::movie_detail(self, id).await
    }

    fn poster_url(&self, movie: &Movie, size: &str) -> Option<String> {
        TmdbClient::poster_url(self, movie, size)
    }
}

/// Map TMDB status codes onto catalog errors.
async fn check_status(response: Response, resource: &str) -> Result<Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status.as_u16() {
        401 => Err(CatalogError::NotConfigured(
            "Invalid TMDB API key".to_string(),
        )),
        404 => Err(CatalogError::NotFound(resource.to_string())),
        429 => Err(CatalogError::RateLimitExceeded),
        code => {
            let body = response.text().await.unwrap_or_default();
            Err(CatalogError::ApiError {
                status: code,
                message: body,
            })
        }
    }
}

fn record<T>(operation: &str, result: &Result<T, CatalogError>) {
    let outcome = if result.is_ok() { "success" } else { "error" };
    CATALOG_REQUESTS
        .with_label_values(&[operation, outcome])
        .inc();
}

// ============================================================================
// TMDB API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct TmdbPage<T> {
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieResult {
    id: u32,
    title: String,
    overview: Option<String>,
    poster_path: Option<String>,
    release_date: Option<String>,
    vote_average: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieDetails {
    id: u32,
    title: String,
    overview: Option<String>,
    poster_path: Option<String>,
    release_date: Option<String>,
    runtime: Option<u32>,
    #[serde(default)]
    genres: Vec<TmdbGenre>,
    vote_average: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct TmdbGenre {
    name: String,
}

// ============================================================================
// Conversions
// ============================================================================

impl From<TmdbMovieResult> for Movie {
    fn from(r: TmdbMovieResult) -> Self {
        Self {
            id: r.id,
            title: r.title,
            overview: r.overview.unwrap_or_default(),
            poster_path: r.poster_path,
            release_date: non_empty(r.release_date),
            runtime_minutes: None, // Not available in list results
            genres: vec![],
            vote_average: r.vote_average,
        }
    }
}

impl From<TmdbMovieDetails> for Movie {
    fn from(d: TmdbMovieDetails) -> Self {
        Self {
            id: d.id,
            title: d.title,
            overview: d.overview.unwrap_or_default(),
            poster_path: d.poster_path,
            release_date: non_empty(d.release_date),
            runtime_minutes: d.runtime.filter(|m| *m > 0),
            genres: d.genres.into_iter().map(|g| g.name).collect(),
            vote_average: d.vote_average,
        }
    }
}

/// TMDB sends `""` for unknown dates.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TmdbConfig {
        TmdbConfig {
            api_key: "key".to_string(),
            base_url: Some("http://localhost:1/3/".to_string()),
            image_base_url: None,
            language: Some("zh-TW".to_string()),
            region: None,
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = TmdbClient::new(TmdbConfig {
            api_key: String::new(),
            ..config()
        });
        assert!(matches!(result, Err(CatalogError::NotConfigured(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = TmdbClient::new(config()).unwrap();
        assert_eq!(client.base_url, "http://localhost:1/3");
    }

    #[test]
    fn test_poster_url() {
        let client = TmdbClient::new(config()).unwrap();
        let movie = Movie {
            id: 603,
            title: "The Matrix".to_string(),
            overview: String::new(),
            poster_path: Some("/poster.jpg".to_string()),
            release_date: None,
            runtime_minutes: None,
            genres: vec![],
            vote_average: None,
        };

        assert_eq!(
            client.poster_url(&movie, "w500").as_deref(),
            Some("https://image.tmdb.org/t/p/w500/poster.jpg")
        );

        let no_poster = Movie {
            poster_path: None,
            ..movie
        };
        assert!(client.poster_url(&no_poster, "w500").is_none());
    }

    #[test]
    fn test_now_playing_page_parsing() {
        let json = r#"{
            "page": 1,
            "results": [
                {"id": 603, "title": "The Matrix", "overview": "A computer hacker...",
                 "poster_path": "/poster.jpg", "release_date": "1999-03-30", "vote_average": 8.2},
                {"id": 604, "title": "Untitled", "overview": null,
                 "poster_path": null, "release_date": ""}
            ],
            "total_pages": 1
        }"#;

        let page: TmdbPage<TmdbMovieResult> = serde_json::from_str(json).unwrap();
        let movies: Vec<Movie> = page.results.into_iter().map(Movie::from).collect();

        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].year(), Some(1999));
        assert!(movies[0].runtime_minutes.is_none()); // Not in list results
        assert_eq!(movies[1].overview, "");
        assert!(movies[1].release_date.is_none());
    }

    #[test]
    fn test_movie_details_conversion() {
        let details = TmdbMovieDetails {
            id: 603,
            title: "The Matrix".to_string(),
            overview: Some("A computer hacker...".to_string()),
            poster_path: Some("/poster.jpg".to_string()),
            release_date: Some("1999-03-30".to_string()),
            runtime: Some(136),
            genres: vec![
                TmdbGenre {
                    name: "Action".to_string(),
                },
                TmdbGenre {
                    name: "Science Fiction".to_string(),
                },
            ],
            vote_average: Some(8.2),
        };

        let movie: Movie = details.into();
        assert_eq!(movie.runtime_minutes, Some(136));
        assert_eq!(movie.genres, vec!["Action", "Science Fiction"]);
        assert_eq!(movie.overview, "A computer hacker...");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_http_error() {
        let client = TmdbClient::new(config()).unwrap();
        let result = client.movie_detail(603).await;
        assert!(matches!(result, Err(CatalogError::HttpError(_))));
    }
}
