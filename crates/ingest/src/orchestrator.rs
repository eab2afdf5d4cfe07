//! Ingestion orchestrator.
//!
//! Drives one full pass over the symbol universe, sequentially: the scraped
//! source penalizes rapid access, so respecting its pacing dominates any win
//! from parallel I/O. For each symbol both sources are fetched through the
//! retry policy; a symbol's failure is contained to its own outcome and the
//! run always continues. Collections only ever hold successful payloads.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use equity_snap_core::domain::{FinancialSnapshot, PriceSeries, SourceKind};
use equity_snap_core::outcome::FetchOutcome;
use equity_snap_core::traits::SourceAdapter;
use equity_snap_core::RetryConfig;

use crate::pacer::RequestPacer;
use crate::retry::retry_fetch;
use crate::stats::RunStats;

/// Progress checkpoint cadence, in symbols.
const PROGRESS_EVERY: usize = 10;

/// Statistics summary cadence, in symbols.
const SUMMARY_EVERY: usize = 50;

/// Everything one run produces.
pub struct IngestOutput {
    pub financials: BTreeMap<String, FinancialSnapshot>,
    pub prices: BTreeMap<String, PriceSeries>,
    pub stats: RunStats,
}

/// Per-run ingestion driver. Owns its pacer and statistics, so concurrent
/// runs (e.g. in tests) never share state.
pub struct Ingestor<F, P> {
    financial_source: F,
    price_source: P,
    pacer: RequestPacer,
    financial_retry: RetryConfig,
    price_retry: RetryConfig,
    abort: Arc<AtomicBool>,
}

impl<F, P> Ingestor<F, P>
where
    F: SourceAdapter<Payload = FinancialSnapshot>,
    P: SourceAdapter<Payload = PriceSeries>,
{
    pub fn new(
        financial_source: F,
        price_source: P,
        pacer: RequestPacer,
        financial_retry: RetryConfig,
        price_retry: RetryConfig,
    ) -> Self {
        Self {
            financial_source,
            price_source,
            pacer,
            financial_retry,
            price_retry,
            abort: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for requesting a stop between symbols (e.g. from a signal
    /// handler). The current symbol finishes; nothing collected is lost.
    #[must_use]
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        self.abort.clone()
    }

    /// Runs the full universe pass and returns both collections plus stats.
    pub async fn ingest(&self, universe: &[String]) -> IngestOutput {
        let mut stats = RunStats::new(universe.len());
        let mut financials = BTreeMap::new();
        let mut prices = BTreeMap::new();

        tracing::info!(symbols = universe.len(), "Starting ingestion run");

        for (index, symbol) in universe.iter().enumerate() {
            if self.abort.load(Ordering::SeqCst) {
                tracing::warn!(
                    processed = index,
                    total = universe.len(),
                    "Abort requested, stopping between symbols"
                );
                break;
            }

            let position = index + 1;
            tracing::debug!(position, total = universe.len(), symbol, "Processing symbol");

            let outcome = self.fetch_financials(symbol).await;
            stats.record(SourceKind::Financials, &outcome);
            match outcome {
                FetchOutcome::Success(snapshot) => {
                    financials.insert(symbol.clone(), snapshot);
                }
                FetchOutcome::Empty => {
                    tracing::debug!(symbol, "No financial data");
                }
                FetchOutcome::Failed(err) => {
                    tracing::error!(symbol, error = %err, "Financial fetch failed");
                }
            }

            let outcome = self.fetch_prices(symbol).await;
            stats.record(SourceKind::Prices, &outcome);
            match outcome {
                FetchOutcome::Success(series) => {
                    prices.insert(symbol.clone(), series);
                }
                FetchOutcome::Empty => {
                    tracing::debug!(symbol, "No price history in window");
                }
                FetchOutcome::Failed(err) => {
                    tracing::error!(symbol, error = %err, "Price fetch failed");
                }
            }

            stats.symbol_done();
            if position % PROGRESS_EVERY == 0 {
                stats.log_progress();
            }
            if position % SUMMARY_EVERY == 0 {
                stats.log_summary();
            }
        }

        stats.log_final();

        IngestOutput {
            financials,
            prices,
            stats,
        }
    }

    async fn fetch_financials(&self, symbol: &str) -> FetchOutcome<FinancialSnapshot> {
        let advice = self.pacer.advise(SourceKind::Financials);
        if !advice.delay.is_zero() {
            tracing::debug!(
                symbol,
                delay_ms = advice.delay.as_millis() as u64,
                "Pacing before financial request"
            );
            tokio::time::sleep(advice.delay).await;
        }
        retry_fetch(&self.financial_retry, symbol, || {
            self.financial_source.fetch(symbol, advice.identity.as_deref())
        })
        .await
    }

    async fn fetch_prices(&self, symbol: &str) -> FetchOutcome<PriceSeries> {
        let advice = self.pacer.advise(SourceKind::Prices);
        if !advice.delay.is_zero() {
            tokio::time::sleep(advice.delay).await;
        }
        retry_fetch(&self.price_retry, symbol, || {
            self.price_source.fetch(symbol, advice.identity.as_deref())
        })
        .await
    }
}
