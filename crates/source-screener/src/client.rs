//! HTTP adapter for the financial-metrics source.
//!
//! The source is a scraped website, not an API: it throttles rapid access and
//! serves 429/503 when unhappy. The adapter issues one request per call with
//! the identity chosen by the rate governor, validates that the body looks
//! like a company page, and hands interpretation to the page parser. Retries
//! live in the retry policy, never here.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use equity_snap_core::config::{EmptyPagePolicy, ScreenerConfig};
use equity_snap_core::domain::{FinancialSnapshot, SourceKind};
use equity_snap_core::error::FetchError;
use equity_snap_core::outcome::FetchOutcome;
use equity_snap_core::traits::{FinancialPageParser, SourceAdapter};

use crate::parser::ScreenerPageParser;

/// Structural marker a real company page always carries.
const PAGE_MARKER: &str = "<h2";

/// Fallback wait when a throttling response has no `retry-after` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 15;

/// Source adapter for scraped financial statement pages.
pub struct ScreenerClient {
    client: reqwest::Client,
    base_url: String,
    parser: Arc<dyn FinancialPageParser>,
    empty_page_policy: EmptyPagePolicy,
}

impl ScreenerClient {
    /// Creates an adapter with the shipped page parser.
    #[must_use]
    pub fn new(config: &ScreenerConfig) -> Self {
        Self::with_parser(config, Arc::new(ScreenerPageParser::new()))
    }

    /// Creates an adapter with a custom page parser (used by tests).
    #[must_use]
    pub fn with_parser(config: &ScreenerConfig, parser: Arc<dyn FinancialPageParser>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            parser,
            empty_page_policy: config.empty_page_policy,
        }
    }

    fn company_url(&self, symbol: &str) -> String {
        format!("{}/company/{}/consolidated/", self.base_url, symbol)
    }

    /// Applies the configured policy to a page the parser rejected.
    fn unparseable(&self, symbol: &str, reason: String) -> FetchOutcome<FinancialSnapshot> {
        match self.empty_page_policy {
            EmptyPagePolicy::Empty => {
                tracing::warn!(symbol, reason = %reason, "Unparseable company page, recording empty");
                FetchOutcome::Empty
            }
            EmptyPagePolicy::Fail => {
                FetchOutcome::Failed(FetchError::MalformedResponse(reason))
            }
        }
    }
}

#[async_trait]
impl SourceAdapter for ScreenerClient {
    type Payload = FinancialSnapshot;

    fn source(&self) -> SourceKind {
        SourceKind::Financials
    }

    async fn fetch(
        &self,
        symbol: &str,
        identity: Option<&str>,
    ) -> FetchOutcome<FinancialSnapshot> {
        let url = self.company_url(symbol);

        let mut request = self.client.get(&url);
        if let Some(agent) = identity {
            request = request.header(reqwest::header::USER_AGENT, agent);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => return FetchOutcome::Failed(transport_error(&err)),
        };

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            // The source confirms the symbol does not exist.
            tracing::debug!(symbol, "Company page not found");
            return FetchOutcome::Empty;
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return FetchOutcome::Failed(FetchError::rate_limited(retry_after));
        }
        if !status.is_success() {
            return FetchOutcome::Failed(FetchError::api(
                status.as_u16(),
                format!("unexpected status for {url}"),
            ));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return FetchOutcome::Failed(transport_error(&err)),
        };

        if body.is_empty() || !body.contains(PAGE_MARKER) {
            return self.unparseable(symbol, "page carries no section markers".to_string());
        }

        match self.parser.parse(&body) {
            Ok(snapshot) => {
                tracing::debug!(
                    symbol,
                    sections = snapshot.sections.len(),
                    tables = snapshot.table_count(),
                    "Parsed company page"
                );
                FetchOutcome::Success(snapshot)
            }
            Err(reason) => self.unparseable(symbol, reason),
        }
    }
}

fn transport_error(err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(err.to_string())
    } else if err.is_connect() {
        FetchError::Network(format!("connection failed: {err}"))
    } else {
        FetchError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const COMPANY_PAGE: &str = r#"
        <html><body>
        <h2>Profit & Loss</h2>
        <table>
            <tr><th></th><th>Mar 2024</th></tr>
            <tr><td>Sales</td><td>4,567</td></tr>
        </table>
        </body></html>
    "#;

    fn test_config(base_url: String) -> ScreenerConfig {
        ScreenerConfig {
            base_url,
            ..equity_snap_core::AppConfig::default().screener
        }
    }

    async fn fetch_with(
        server: &MockServer,
        policy: EmptyPagePolicy,
        symbol: &str,
    ) -> FetchOutcome<FinancialSnapshot> {
        let mut config = test_config(server.uri());
        config.empty_page_policy = policy;
        ScreenerClient::new(&config).fetch(symbol, None).await
    }

    // ==================== Success Path Tests ====================

    #[tokio::test]
    async fn test_fetch_parses_company_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/company/TCS/consolidated/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(COMPANY_PAGE))
            .mount(&server)
            .await;

        let outcome = fetch_with(&server, EmptyPagePolicy::Empty, "TCS").await;
        let snapshot = outcome.into_payload().expect("expected success");
        assert_eq!(snapshot.sections.len(), 1);
        assert_eq!(snapshot.sections[0].header, "Profit & Loss");
    }

    #[tokio::test]
    async fn test_fetch_presents_chosen_identity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/company/INFY/consolidated/"))
            .and(header("user-agent", "test-agent/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(COMPANY_PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let config = test_config(server.uri());
        let client = ScreenerClient::new(&config);
        let outcome = client.fetch("INFY", Some("test-agent/1.0")).await;
        assert!(outcome.is_success());
    }

    // ==================== Status Mapping Tests ====================

    #[tokio::test]
    async fn test_not_found_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let outcome = fetch_with(&server, EmptyPagePolicy::Empty, "GONE").await;
        assert!(!outcome.is_success());
        assert!(!outcome.is_failed());
    }

    #[tokio::test]
    async fn test_throttling_maps_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
            .mount(&server)
            .await;

        let outcome = fetch_with(&server, EmptyPagePolicy::Empty, "TCS").await;
        match outcome {
            FetchOutcome::Failed(FetchError::RateLimited { retry_after_secs }) => {
                assert_eq!(retry_after_secs, 30);
            }
            other => panic!("expected rate limited, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_service_unavailable_maps_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let outcome = fetch_with(&server, EmptyPagePolicy::Empty, "TCS").await;
        match outcome {
            FetchOutcome::Failed(FetchError::RateLimited { retry_after_secs }) => {
                assert_eq!(retry_after_secs, DEFAULT_RETRY_AFTER_SECS);
            }
            other => panic!("expected rate limited, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_retryable_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let outcome = fetch_with(&server, EmptyPagePolicy::Empty, "TCS").await;
        match outcome {
            FetchOutcome::Failed(err) => assert!(err.is_retryable()),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    // ==================== Empty Page Policy Tests ====================

    #[tokio::test]
    async fn test_garbage_page_is_empty_under_default_policy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html><body>oops</body></html>"),
            )
            .mount(&server)
            .await;

        let outcome = fetch_with(&server, EmptyPagePolicy::Empty, "TCS").await;
        assert!(!outcome.is_success());
        assert!(!outcome.is_failed());
    }

    #[tokio::test]
    async fn test_garbage_page_fails_under_fail_policy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html><body>oops</body></html>"),
            )
            .mount(&server)
            .await;

        let outcome = fetch_with(&server, EmptyPagePolicy::Fail, "TCS").await;
        match outcome {
            FetchOutcome::Failed(FetchError::MalformedResponse(_)) => {}
            other => panic!("expected malformed response, got {other:?}"),
        }
    }
}
