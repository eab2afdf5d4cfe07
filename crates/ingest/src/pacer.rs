//! Request pacing and identity rotation.
//!
//! The scraped source penalizes rapid automated access, so every request to
//! it waits a randomized interval and presents the next signature from a
//! rotating pool of browser identities. The price source is a managed API
//! and needs neither. The pacer only advises (the orchestrator does the
//! actual waiting) and holds no state beyond the rotation cursor, which
//! lives in the per-run pacer instance.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use equity_snap_core::config::PacingConfig;
use equity_snap_core::domain::SourceKind;
use equity_snap_core::traits::IdentityProvider;
use rand::Rng;

/// Browser signatures presented to the scraped source, cycled per request.
const BROWSER_IDENTITIES: [&str; 8] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/109.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:112.0) Gecko/20100101 Firefox/112.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36 Edg/115.0.0.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 16_4_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.4 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (iPad; CPU OS 16_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.4 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.5735.196 Mobile Safari/537.36",
];

/// Scheduling advice for one request: how long to wait first, and which
/// identity to present.
#[derive(Debug, Clone)]
pub struct PacingAdvice {
    pub delay: Duration,
    pub identity: Option<String>,
}

/// Fixed identity pool cycled via an atomic cursor.
///
/// The cursor starts at a random offset so repeated short runs do not always
/// lead with the same signature.
pub struct RotatingIdentityPool {
    identities: Vec<String>,
    cursor: AtomicUsize,
}

impl RotatingIdentityPool {
    /// Creates a pool from the given identities.
    ///
    /// # Panics
    ///
    /// Panics if `identities` is empty.
    #[must_use]
    pub fn new(identities: Vec<String>) -> Self {
        assert!(!identities.is_empty(), "identity pool must not be empty");
        let start = rand::thread_rng().gen_range(0..identities.len());
        Self {
            identities,
            cursor: AtomicUsize::new(start),
        }
    }

    /// The default pool of browser signatures.
    #[must_use]
    pub fn browser_pool() -> Self {
        Self::new(BROWSER_IDENTITIES.iter().map(|s| s.to_string()).collect())
    }
}

impl IdentityProvider for RotatingIdentityPool {
    fn next_identity(&self) -> String {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.identities.len();
        self.identities[index].clone()
    }
}

/// Per-run rate governor.
pub struct RequestPacer {
    pacing: PacingConfig,
    identities: Arc<dyn IdentityProvider>,
}

impl RequestPacer {
    /// Creates a pacer with the default browser identity pool.
    #[must_use]
    pub fn new(pacing: PacingConfig) -> Self {
        Self::with_identities(pacing, Arc::new(RotatingIdentityPool::browser_pool()))
    }

    /// Creates a pacer with a custom identity provider (used by tests).
    #[must_use]
    pub fn with_identities(pacing: PacingConfig, identities: Arc<dyn IdentityProvider>) -> Self {
        Self { pacing, identities }
    }

    /// Advises delay and identity for the next request to `source`.
    #[must_use]
    pub fn advise(&self, source: SourceKind) -> PacingAdvice {
        match source {
            SourceKind::Financials => {
                let min = self.pacing.min_delay().as_millis() as u64;
                let max = self.pacing.max_delay().as_millis() as u64;
                let delay_ms = if max > min {
                    rand::thread_rng().gen_range(min..=max)
                } else {
                    min
                };
                PacingAdvice {
                    delay: Duration::from_millis(delay_ms),
                    identity: Some(self.identities.next_identity()),
                }
            }
            SourceKind::Prices => PacingAdvice {
                delay: Duration::ZERO,
                identity: None,
            },
        }
    }
}
