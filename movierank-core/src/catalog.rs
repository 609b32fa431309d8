//! The static list of movie ids the generator draws from.

use std::path::Path;

use ahash::AHashMap;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::types::MovieId;

/// Default MovieLens catalog location, relative to the working directory.
pub const DEFAULT_CATALOG_PATH: &str = "ml-latest-small/movies.csv";

/// Ids used when no catalog can be read: `[1, 1000)`.
pub const DEFAULT_MOVIE_IDS: std::ops::Range<MovieId> = 1..1000;

#[derive(Debug, Deserialize)]
struct MovieRow {
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    #[serde(default)]
    title: Option<String>,
}

/// Movie ids (and titles, when known), loaded once at startup.
#[derive(Debug, Clone)]
pub struct MovieCatalog {
    ids: Vec<MovieId>,
    titles: AHashMap<MovieId, String>,
}

impl MovieCatalog {
    /// Build a catalog from bare ids. Fails on an empty list.
    pub fn from_ids(ids: impl IntoIterator<Item = MovieId>) -> Result<Self, ConfigError> {
        let ids: Vec<MovieId> = ids.into_iter().collect();
        if ids.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        Ok(Self {
            ids,
            titles: AHashMap::new(),
        })
    }

    /// The fallback catalog covering [`DEFAULT_MOVIE_IDS`].
    pub fn default_range() -> Self {
        Self {
            ids: DEFAULT_MOVIE_IDS.collect(),
            titles: AHashMap::new(),
        }
    }

    /// Read a MovieLens `movies.csv` (`movieId,title,genres`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("open movie catalog {}", path.display()))?;

        let mut ids = Vec::new();
        let mut titles = AHashMap::new();
        for row in reader.deserialize::<MovieRow>() {
            let row = row.with_context(|| format!("read movie catalog {}", path.display()))?;
            ids.push(row.movie_id);
            if let Some(title) = row.title {
                titles.insert(row.movie_id, title);
            }
        }
        if ids.is_empty() {
            return Err(ConfigError::EmptyCatalog)
                .with_context(|| format!("movie catalog {}", path.display()));
        }
        Ok(Self { ids, titles })
    }

    /// Read `path`, falling back to [`default_range`](Self::default_range)
    /// with a warning when it cannot be used.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(catalog) => {
                info!(
                    "loaded {} movies from {}",
                    catalog.len(),
                    path.as_ref().display()
                );
                catalog
            }
            Err(err) => {
                warn!(
                    "movie catalog unavailable ({err:#}), using ids {}..{}",
                    DEFAULT_MOVIE_IDS.start, DEFAULT_MOVIE_IDS.end
                );
                Self::default_range()
            }
        }
    }

    pub fn ids(&self) -> &[MovieId] {
        &self.ids
    }

    pub fn title(&self, movie_id: MovieId) -> Option<&str> {
        self.titles.get(&movie_id).map(String::as_str)
    }

    pub fn contains(&self, movie_id: MovieId) -> bool {
        self.ids.contains(&movie_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
