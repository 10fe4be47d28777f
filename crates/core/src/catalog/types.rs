//! Movie catalog types.

use serde::{Deserialize, Serialize};

/// A movie as shown in the now-playing list and detail screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    /// TMDB movie ID.
    pub id: u32,
    /// Movie title.
    pub title: String,
    /// Synopsis (empty when the catalog has none).
    #[serde(default)]
    pub overview: String,
    /// Poster path (relative to the image base URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    /// Release date (YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    /// Runtime in minutes. Only present on detail lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_minutes: Option<u32>,
    /// Genre names. Only present on detail lookups.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Average vote (0-10).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f32>,
}

impl Movie {
    /// Get the release year from the release date.
    pub fn year(&self) -> Option<u32> {
        self.release_date
            .as_ref()
            .and_then(|d| d.split('-').next())
            .and_then(|y| y.parse().ok())
    }

    /// Runtime formatted as `2h 16m`.
    pub fn runtime_text(&self) -> Option<String> {
        self.runtime_minutes.map(|m| match (m / 60, m % 60) {
            (0, min) => format!("{}m", min),
            (h, 0) => format!("{}h", h),
            (h, min) => format!("{}h {}m", h, min),
        })
    }
}
