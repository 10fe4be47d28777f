//! Mock movie catalog for testing.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::{CatalogError, Movie, MovieCatalog};

/// A recorded catalog query for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCatalogQuery {
    NowPlaying,
    MovieDetail { id: u32 },
}

/// Mock implementation of the MovieCatalog trait.
///
/// Provides controllable behavior for testing:
/// - Return a configurable set of movies
/// - Track queries for assertions
/// - Simulate failures
///
/// # Example
///
/// ```rust,ignore
/// use boxoffice_core::testing::{MockMovieCatalog, fixtures};
///
/// let catalog = MockMovieCatalog::new();
/// catalog.add_movie(fixtures::movie(603, "The Matrix")).await;
///
/// let movies = catalog.now_playing().await?;
/// assert_eq!(movies.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockMovieCatalog {
    /// Movies by ID, listed in ID order.
    movies: Arc<RwLock<BTreeMap<u32, Movie>>>,
    /// Recorded queries.
    queries: Arc<RwLock<Vec<RecordedCatalogQuery>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<CatalogError>>>,
}

impl Default for MockMovieCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMovieCatalog {
    /// Create a new empty mock catalog.
    pub fn new() -> Self {
        Self {
            movies: Arc::new(RwLock::new(BTreeMap::new())),
            queries: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Add a movie.
    pub async fn add_movie(&self, movie: Movie) {
        self.movies.write().await.insert(movie.id, movie);
    }

    /// Replace all movies at once.
    pub async fn set_movies(&self, movies: Vec<Movie>) {
        let mut map = self.movies.write().await;
        map.clear();
        for movie in movies {
            map.insert(movie.id, movie);
        }
    }

    /// Clear all movies.
    pub async fn clear_movies(&self) {
        self.movies.write().await.clear();
    }

    // =========================================================================
    // Query Recording
    // =========================================================================

    /// Get all recorded queries.
    pub async fn recorded_queries(&self) -> Vec<RecordedCatalogQuery> {
        self.queries.read().await.clone()
    }

    /// Get the number of queries performed.
    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: CatalogError) {
        *self.next_error.write().await = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }

    async fn take_error(&self) -> Option<CatalogError> {
        self.next_error.write().await.take()
    }

    async fn record(&self, query: RecordedCatalogQuery) {
        self.queries.write().await.push(query);
    }
}

#[async_trait]
impl MovieCatalog for MockMovieCatalog {
    async fn now_playing(&self) -> Result<Vec<Movie>, CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.record(RecordedCatalogQuery::NowPlaying).await;

        Ok(self.movies.read().await.values().cloned().collect())
    }

    async fn movie_detail(&self, id: u32) -> Result<Movie, CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.record(RecordedCatalogQuery::MovieDetail { id }).await;

        self.movies
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("Movie {} not found", id)))
    }

    fn poster_url(&self, movie: &Movie, size: &str) -> Option<String> {
        movie
            .poster_path
            .as_ref()
            .map(|path| format!("https://images.test/{}{}", size, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_now_playing_lists_movies_in_id_order() {
        let catalog = MockMovieCatalog::new();
        catalog.add_movie(fixtures::movie(603, "The Matrix")).await;
        catalog.add_movie(fixtures::movie(27205, "Inception")).await;
        catalog.add_movie(fixtures::movie(155, "The Dark Knight")).await;

        let movies = catalog.now_playing().await.unwrap();
        let ids: Vec<u32> = movies.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![155, 603, 27205]);
    }

    #[tokio::test]
    async fn test_movie_detail_not_found() {
        let catalog = MockMovieCatalog::new();

        let result = catalog.movie_detail(42).await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_error_injection_is_one_shot() {
        let catalog = MockMovieCatalog::new();
        catalog.add_movie(fixtures::movie(603, "The Matrix")).await;
        catalog.set_next_error(CatalogError::RateLimitExceeded).await;

        let result = catalog.now_playing().await;
        assert!(matches!(result, Err(CatalogError::RateLimitExceeded)));

        let result = catalog.now_playing().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_query_recording() {
        let catalog = MockMovieCatalog::new();
        catalog.add_movie(fixtures::movie(603, "The Matrix")).await;

        catalog.now_playing().await.unwrap();
        catalog.movie_detail(603).await.unwrap();

        assert_eq!(
            catalog.recorded_queries().await,
            vec![
                RecordedCatalogQuery::NowPlaying,
                RecordedCatalogQuery::MovieDetail { id: 603 },
            ]
        );
        assert_eq!(catalog.query_count().await, 2);
    }

    #[test]
    fn test_poster_url() {
        let catalog = MockMovieCatalog::new();
        let movie = fixtures::movie(603, "The Matrix");
        assert_eq!(
            catalog.poster_url(&movie, "w500").as_deref(),
            Some("https://images.test/w500/poster-603.jpg")
        );
    }
}
