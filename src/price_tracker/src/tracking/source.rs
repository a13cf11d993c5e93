//! Persistence of the ordered tracking list.
//!
//! Two backings are supported:
//! - [`JsonFileSource`]: a pretty-printed JSON array of URLs on disk;
//! - [`TableSource`]: the `tracked_urls` table next to the price history.
//!
//! Both preserve insertion order across restarts.

use std::{
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use diesel::prelude::*;
use indexmap::IndexSet;
use thiserror::Error;

use crate::{
    history::{HistoryStore, StoreError},
    models::TrackedUrl,
    schema::{products::dsl as p, tracked_urls::dsl as tu},
};

/// Failures reading or writing the tracking list.
#[derive(Debug, Error)]
pub enum SourceError {
    /// File could not be read or written.
    #[error("tracking file {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// File is not a JSON array of strings.
    #[error("tracking file {path} is not a JSON list of URLs: {source}")]
    Json {
        /// File involved.
        path: PathBuf,
        /// Parser error.
        source: serde_json::Error,
    },
    /// Table-backed list failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The blocking task running the read or write did not complete.
    #[error("tracking list worker failed: {0}")]
    Worker(String),
}

/// Ordered, durable list of tracked URLs.
///
/// Implementations do blocking I/O; async callers go through
/// [`TrackingSet`](super::TrackingSet), which runs them on the blocking pool.
pub trait TrackingSource: Send + Sync {
    /// Reads the current list, in insertion order.
    fn load(&self) -> Result<IndexSet<String>, SourceError>;

    /// Replaces the stored list with `urls`, keeping their order.
    fn save(&self, urls: &IndexSet<String>) -> Result<(), SourceError>;
}

/// Which backing `PRODUCTS_SOURCE` selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingSourceSpec {
    /// JSON file at the given path.
    File(PathBuf),
    /// The `tracked_urls` table in the history database.
    Table,
}

impl Default for TrackingSourceSpec {
    fn default() -> Self {
        TrackingSourceSpec::File(PathBuf::from("products.json"))
    }
}

impl FromStr for TrackingSourceSpec {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.to_ascii_lowercase().as_str() {
            "db" | "table" | "tracked_urls" => TrackingSourceSpec::Table,
            _ => TrackingSourceSpec::File(PathBuf::from(s)),
        })
    }
}

impl TrackingSourceSpec {
    /// Builds the source this spec names.
    pub fn build(&self, store: &HistoryStore) -> Arc<dyn TrackingSource> {
        match self {
            TrackingSourceSpec::File(path) => Arc::new(JsonFileSource::new(path)),
            TrackingSourceSpec::Table => Arc::new(TableSource::new(store.clone())),
        }
    }
}

/// Tracking list stored as a JSON array in a file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Uses the file at `path`; it need not exist yet.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn io_err(&self, source: io::Error) -> SourceError {
        SourceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TrackingSource for JsonFileSource {
    fn load(&self) -> Result<IndexSet<String>, SourceError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(IndexSet::new()),
            Err(e) => return Err(self.io_err(e)),
        };
        if text.trim().is_empty() {
            return Ok(IndexSet::new());
        }
        let urls: Vec<String> = serde_json::from_str(&text).map_err(|source| SourceError::Json {
            path: self.path.clone(),
            source,
        })?;
        Ok(urls.into_iter().collect())
    }

    fn save(&self, urls: &IndexSet<String>) -> Result<(), SourceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let list: Vec<&String> = urls.iter().collect();
        let body = serde_json::to_string_pretty(&list).map_err(|source| SourceError::Json {
            path: self.path.clone(),
            source,
        })?;

        // write-then-rename so readers never see a half-written list
        let mut tmp_name = self.path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp = self.path.with_file_name(tmp_name);
        fs::write(&tmp, body).map_err(|e| self.io_err(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))?;
        Ok(())
    }
}

/// Tracking list stored in the `tracked_urls` table.
///
/// Every tracked URL references a product row; saving registers bare product
/// rows for URLs that have none yet.
#[derive(Debug, Clone)]
pub struct TableSource {
    store: HistoryStore,
}

impl TableSource {
    /// Uses the database behind `store`.
    pub fn new(store: HistoryStore) -> Self {
        Self { store }
    }
}

impl TrackingSource for TableSource {
    fn load(&self) -> Result<IndexSet<String>, SourceError> {
        let urls = self.store.with_conn(|_, conn| {
            let rows = tu::tracked_urls
                .order(tu::position.asc())
                .select(tu::url)
                .load::<String>(conn)?;
            Ok(rows)
        })?;
        Ok(urls.into_iter().collect())
    }

    fn save(&self, urls: &IndexSet<String>) -> Result<(), SourceError> {
        let rows: Vec<TrackedUrl> = urls
            .iter()
            .enumerate()
            .map(|(i, url)| TrackedUrl {
                url: url.clone(),
                position: i as i32,
            })
            .collect();

        self.store.with_conn(|_, conn| {
            conn.immediate_transaction::<_, StoreError, _>(|conn| {
                diesel::delete(tu::tracked_urls).execute(conn)?;
                for row in &rows {
                    diesel::insert_into(p::products)
                        .values(p::url.eq(&row.url))
                        .on_conflict(p::url)
                        .do_nothing()
                        .execute(conn)?;
                }
                if !rows.is_empty() {
                    diesel::insert_into(tu::tracked_urls).values(&rows).execute(conn)?;
                }
                Ok(())
            })
        })?;
        Ok(())
    }
}
