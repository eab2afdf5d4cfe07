//! Timestamped snapshot artifacts.
//!
//! Each run publishes three sibling artifacts under one run id: the
//! financial collection and the price collection as bincode, and a small
//! JSON manifest with the run's statistics. Artifacts are written to a temp
//! file, fsynced, then renamed into place, so a reader only ever observes a
//! fully written artifact or none at all. Runs never overwrite each other:
//! every run id addresses its own files.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use equity_snap_core::domain::{FinancialSnapshot, PriceSeries};
use equity_snap_core::stats::RunSummary;

/// Financial statement snapshots keyed by symbol.
pub type FinancialCollection = BTreeMap<String, FinancialSnapshot>;

/// Price histories keyed by symbol.
pub type PriceCollection = BTreeMap<String, PriceSeries>;

/// Errors that can occur while persisting or loading snapshot artifacts.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Filesystem error while writing or reading an artifact.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The artifact path involved.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },

    /// A collection could not be serialized.
    #[error("failed to encode {what}: {source}")]
    Encode {
        /// Which artifact was being encoded.
        what: String,
        /// Underlying serialization error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An artifact could not be deserialized.
    #[error("failed to decode {path}: {source}")]
    Decode {
        /// The artifact path involved.
        path: PathBuf,
        /// Underlying deserialization error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, PersistError>;

/// Paths of the artifacts one `persist` call published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPaths {
    pub financials: PathBuf,
    pub prices: PathBuf,
    pub manifest: PathBuf,
}

/// Manifest published alongside the two collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    /// Symbols present in the financial artifact.
    pub financial_symbols: usize,
    /// Symbols present in the price artifact.
    pub price_symbols: usize,
    pub summary: RunSummary,
}

/// Builds a sortable run id (`YYYYMMDD_HHMMSS`) from a timestamp.
#[must_use]
pub fn run_id_for(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y%m%d_%H%M%S").to_string()
}

/// Builds a run id for the current instant.
#[must_use]
pub fn new_run_id() -> String {
    run_id_for(Utc::now())
}

/// Snapshot store rooted at one directory.
pub struct SnapshotStore {
    financials_dir: PathBuf,
    prices_dir: PathBuf,
    manifests_dir: PathBuf,
}

impl SnapshotStore {
    /// Creates a store under `root`. Directories are created lazily on the
    /// first write.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            financials_dir: root.join("stock_financials"),
            prices_dir: root.join("share_prices"),
            manifests_dir: root.join("manifests"),
        }
    }

    /// Persists both collections and the manifest under `run_id`.
    ///
    /// The three artifacts are attempted independently: a failure on one
    /// never prevents the others from being published, and previously
    /// published runs are never touched. The first failure is returned after
    /// every artifact has been attempted.
    ///
    /// # Errors
    ///
    /// Returns the first [`PersistError`] encountered, if any.
    pub fn persist(
        &self,
        run_id: &str,
        financials: &FinancialCollection,
        prices: &PriceCollection,
        summary: &RunSummary,
    ) -> Result<SnapshotPaths> {
        let paths = SnapshotPaths {
            financials: self.financials_dir.join(format!("{run_id}.bin")),
            prices: self.prices_dir.join(format!("{run_id}.bin")),
            manifest: self.manifests_dir.join(format!("{run_id}.json")),
        };

        let mut first_error: Option<PersistError> = None;
        let mut attempt = |what: &'static str, path: &Path, symbols: usize, encoded: Result<Vec<u8>>| {
            match encoded.and_then(|bytes| publish(path, &bytes)) {
                Ok(()) => {
                    tracing::info!(what, path = %path.display(), symbols, "Snapshot artifact written");
                }
                Err(err) => {
                    tracing::error!(what, error = %err, "Failed to persist artifact");
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        };

        attempt(
            "financials",
            &paths.financials,
            financials.len(),
            bincode::serialize(financials).map_err(|e| PersistError::Encode {
                what: "financial collection".to_string(),
                source: Box::new(e),
            }),
        );

        attempt(
            "prices",
            &paths.prices,
            prices.len(),
            bincode::serialize(prices).map_err(|e| PersistError::Encode {
                what: "price collection".to_string(),
                source: Box::new(e),
            }),
        );

        let manifest = RunManifest {
            run_id: run_id.to_string(),
            financial_symbols: financials.len(),
            price_symbols: prices.len(),
            summary: summary.clone(),
        };
        attempt(
            "manifest",
            &paths.manifest,
            manifest.financial_symbols + manifest.price_symbols,
            serde_json::to_vec_pretty(&manifest).map_err(|e| PersistError::Encode {
                what: "run manifest".to_string(),
                source: Box::new(e),
            }),
        );

        match first_error {
            None => Ok(paths),
            Some(err) => Err(err),
        }
    }

    /// Loads the financial collection for `run_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact is missing or cannot be decoded.
    pub fn load_financials(&self, run_id: &str) -> Result<FinancialCollection> {
        read_bincode(&self.financials_dir.join(format!("{run_id}.bin")))
    }

    /// Loads the price collection for `run_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact is missing or cannot be decoded.
    pub fn load_prices(&self, run_id: &str) -> Result<PriceCollection> {
        read_bincode(&self.prices_dir.join(format!("{run_id}.bin")))
    }

    /// Loads the manifest for `run_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is missing or cannot be decoded.
    pub fn load_manifest(&self, run_id: &str) -> Result<RunManifest> {
        let path = self.manifests_dir.join(format!("{run_id}.json"));
        let bytes = std::fs::read(&path).map_err(|source| PersistError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|e| PersistError::Decode {
            path,
            source: Box::new(e),
        })
    }
}

/// Atomically publishes `bytes` at `path`: temp file in the same directory,
/// fsync, rename. The temp file is removed on failure.
fn publish(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|source| PersistError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let tmp = path.with_extension("tmp");
    let result = (|| {
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        std::fs::rename(&tmp, path)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result.map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_bincode<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    bincode::deserialize(&bytes).map_err(|e| PersistError::Decode {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}
