//! Run statistics.
//!
//! Pure bookkeeping, driven by the orchestrator: one counter triple per
//! source plus overall progress. Counts are monotonic within a run and a
//! fresh tracker is created per run, so mid-run summaries are always
//! consistent with what has actually happened so far.

use chrono::{DateTime, Utc};
use equity_snap_core::domain::SourceKind;
use equity_snap_core::outcome::FetchOutcome;
use equity_snap_core::stats::{RunSummary, SourceCounts};
use std::time::{Duration, Instant};

/// Live statistics for one ingestion run.
#[derive(Debug, Clone)]
pub struct RunStats {
    total_symbols: usize,
    attempted: usize,
    financials: SourceCounts,
    prices: SourceCounts,
    started_at: DateTime<Utc>,
    started_instant: Instant,
    last_checkpoint: usize,
}

impl RunStats {
    /// Creates a fresh tracker for a universe of `total_symbols`.
    #[must_use]
    pub fn new(total_symbols: usize) -> Self {
        Self {
            total_symbols,
            attempted: 0,
            financials: SourceCounts::default(),
            prices: SourceCounts::default(),
            started_at: Utc::now(),
            started_instant: Instant::now(),
            last_checkpoint: 0,
        }
    }

    /// Records the outcome of one source fetch.
    pub fn record<T>(&mut self, source: SourceKind, outcome: &FetchOutcome<T>) {
        let counts = match source {
            SourceKind::Financials => &mut self.financials,
            SourceKind::Prices => &mut self.prices,
        };
        match outcome {
            FetchOutcome::Success(_) => counts.success += 1,
            FetchOutcome::Empty => counts.empty += 1,
            FetchOutcome::Failed(_) => counts.failed += 1,
        }
    }

    /// Marks one symbol as fully processed (both sources attempted).
    pub fn symbol_done(&mut self) {
        self.attempted += 1;
    }

    /// Progress so far: symbols attempted, universe size, elapsed time.
    #[must_use]
    pub fn progress(&self) -> (usize, usize, Duration) {
        (self.attempted, self.total_symbols, self.elapsed())
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_instant.elapsed()
    }

    #[must_use]
    pub fn financials(&self) -> SourceCounts {
        self.financials
    }

    #[must_use]
    pub fn prices(&self) -> SourceCounts {
        self.prices
    }

    /// Point-in-time summary; safe to call mid-run.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            started_at: self.started_at,
            elapsed_secs: self.elapsed().as_secs_f64(),
            total_symbols: self.total_symbols,
            attempted: self.attempted,
            financials: self.financials,
            prices: self.prices,
            complete: self.attempted == self.total_symbols,
        }
    }

    /// Symbol index of the most recent progress checkpoint.
    #[must_use]
    pub fn last_checkpoint(&self) -> usize {
        self.last_checkpoint
    }

    /// Progress checkpoint, emitted every few symbols.
    pub fn log_progress(&mut self) {
        self.last_checkpoint = self.attempted;
        let percent = if self.total_symbols == 0 {
            100.0
        } else {
            (self.attempted as f64 / self.total_symbols as f64) * 100.0
        };
        tracing::info!(
            processed = self.attempted,
            total = self.total_symbols,
            percent = format!("{percent:.1}%"),
            elapsed = format!("{:.0}s", self.elapsed().as_secs_f64()),
            "Ingestion progress"
        );
    }

    /// Mid-run counter summary.
    pub fn log_summary(&self) {
        tracing::info!(
            financial_success = self.financials.success,
            financial_empty = self.financials.empty,
            financial_failed = self.financials.failed,
            price_success = self.prices.success,
            price_empty = self.prices.empty,
            price_failed = self.prices.failed,
            "Run statistics"
        );
    }

    /// End-of-run report with success rates and per-symbol timing.
    pub fn log_final(&self) {
        let elapsed = self.elapsed();
        let per_symbol = if self.attempted == 0 {
            0.0
        } else {
            elapsed.as_secs_f64() / self.attempted as f64
        };
        tracing::info!(
            total = self.total_symbols,
            attempted = self.attempted,
            financial_success = self.financials.success,
            financial_failures = self.financials.failures(),
            financial_rate = format!("{:.1}%", self.financials.success_rate()),
            price_success = self.prices.success,
            price_failures = self.prices.failures(),
            price_rate = format!("{:.1}%", self.prices.success_rate()),
            elapsed = format!("{:.1}s", elapsed.as_secs_f64()),
            per_symbol = format!("{per_symbol:.1}s"),
            complete = self.attempted == self.total_symbols,
            "Ingestion run finished"
        );
    }
}
