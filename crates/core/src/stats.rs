//! Serializable run-outcome summaries, shared between the ingestion engine
//! and the snapshot manifest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome counters for one source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCounts {
    pub success: usize,
    pub empty: usize,
    pub failed: usize,
}

impl SourceCounts {
    /// Fetches attempted against this source so far.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.success + self.empty + self.failed
    }

    /// Attempts that produced no payload (empty plus failed).
    #[must_use]
    pub fn failures(&self) -> usize {
        self.empty + self.failed
    }

    /// Success percentage over attempts so far.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.attempted() == 0 {
            0.0
        } else {
            (self.success as f64 / self.attempted() as f64) * 100.0
        }
    }
}

/// Point-in-time (or end-of-run) summary of an ingestion run, embedded in
/// the snapshot manifest so partial runs stay distinguishable from complete
/// ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub total_symbols: usize,
    pub attempted: usize,
    pub financials: SourceCounts,
    pub prices: SourceCounts,
    /// False when the run stopped before exhausting the universe.
    pub complete: bool,
}
