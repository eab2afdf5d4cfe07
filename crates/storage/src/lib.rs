//! Snapshot artifact storage.
//!
//! One run, one run id, three artifacts: financial collection, price
//! collection, manifest. Publishing is atomic per artifact and independent
//! across artifacts.

pub mod snapshot;

pub use snapshot::{
    new_run_id, run_id_for, FinancialCollection, PersistError, PriceCollection, RunManifest,
    SnapshotPaths, SnapshotStore,
};
