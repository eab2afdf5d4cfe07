use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub run: RunConfig,
    pub storage: StorageConfig,
    pub screener: ScreenerConfig,
    pub yahoo: YahooConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Path to the symbol universe file, one symbol per line.
    pub universe_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for snapshot artifacts.
    pub root: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub pacing: PacingConfig,
    pub retry: RetryConfig,
    /// How to treat a well-formed page that yields zero sections.
    pub empty_page_policy: EmptyPagePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YahooConfig {
    pub base_url: String,
    /// Exchange suffix appended to every symbol (NSE listings use ".NS").
    pub symbol_suffix: String,
    /// Size of the historical window, in days.
    pub lookback_days: i64,
    /// Polite request ceiling for the chart API.
    pub requests_per_second: u32,
    pub timeout_secs: u64,
    pub retry: RetryConfig,
}

/// Pre-request delay window for the scraped source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PacingConfig {
    pub min_delay_secs: u64,
    pub max_delay_secs: u64,
}

impl PacingConfig {
    #[must_use]
    pub fn min_delay(&self) -> Duration {
        Duration::from_secs(self.min_delay_secs)
    }

    #[must_use]
    pub fn max_delay(&self) -> Duration {
        Duration::from_secs(self.max_delay_secs)
    }
}

/// Bounded-retry parameters, one record per source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Backoff before the second attempt; doubles per attempt thereafter.
    pub base_delay_ms: u64,
    /// Backoff ceiling.
    pub max_delay_ms: u64,
}

impl RetryConfig {
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    #[must_use]
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

/// Policy for a page that parses to zero sections: the source gives no way to
/// tell a delisted symbol from a silently broken scrape, so the call is made
/// explicit here rather than inferred from response size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyPagePolicy {
    /// Count it as a definitive empty result (default).
    Empty,
    /// Treat it as a failed scrape, eligible for retry.
    Fail,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            run: RunConfig {
                universe_file: "config/universe.txt".to_string(),
            },
            storage: StorageConfig {
                root: "data".to_string(),
            },
            screener: ScreenerConfig {
                base_url: "https://www.screener.in".to_string(),
                timeout_secs: 10,
                pacing: PacingConfig {
                    min_delay_secs: 10,
                    max_delay_secs: 20,
                },
                retry: RetryConfig {
                    max_attempts: 3,
                    base_delay_ms: 5_000,
                    max_delay_ms: 60_000,
                },
                empty_page_policy: EmptyPagePolicy::Empty,
            },
            yahoo: YahooConfig {
                base_url: "https://query2.finance.yahoo.com".to_string(),
                symbol_suffix: ".NS".to_string(),
                lookback_days: 2190,
                requests_per_second: 2,
                timeout_secs: 30,
                retry: RetryConfig {
                    max_attempts: 2,
                    base_delay_ms: 500,
                    max_delay_ms: 5_000,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_coherent() {
        let config = AppConfig::default();

        assert!(config.screener.pacing.min_delay_secs <= config.screener.pacing.max_delay_secs);
        assert!(config.screener.retry.base_delay_ms <= config.screener.retry.max_delay_ms);
        assert!(config.yahoo.retry.base_delay_ms <= config.yahoo.retry.max_delay_ms);
        assert!(config.screener.retry.max_attempts >= 1);
        assert!(config.yahoo.requests_per_second >= 1);
        // Six-year lookback, matching the window the price source is asked for.
        assert_eq!(config.yahoo.lookback_days, 2190);
        assert_eq!(config.screener.empty_page_policy, EmptyPagePolicy::Empty);
    }

    #[test]
    fn test_duration_helpers() {
        let config = AppConfig::default();
        assert_eq!(
            config.screener.pacing.min_delay(),
            Duration::from_secs(config.screener.pacing.min_delay_secs)
        );
        assert_eq!(
            config.screener.retry.base_delay(),
            Duration::from_millis(config.screener.retry.base_delay_ms)
        );
    }

    #[test]
    fn test_empty_page_policy_serde() {
        let policy: EmptyPagePolicy = serde_json::from_str("\"fail\"").unwrap();
        assert_eq!(policy, EmptyPagePolicy::Fail);
        assert_eq!(
            serde_json::to_string(&EmptyPagePolicy::Empty).unwrap(),
            "\"empty\""
        );
    }
}
