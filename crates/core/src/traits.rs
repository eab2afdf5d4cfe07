use crate::domain::{FinancialSnapshot, SourceKind};
use crate::outcome::FetchOutcome;
use async_trait::async_trait;

/// Uniform contract over the two external data sources.
///
/// Adapters bind one source each and perform no retries; the retry policy
/// wraps them. `identity` is the client signature the rate governor chose for
/// this request; sources that do not rotate identities receive `None`.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// What a successful fetch yields.
    type Payload;

    /// Which source this adapter binds.
    fn source(&self) -> SourceKind;

    /// Fetches data for one symbol.
    async fn fetch(&self, symbol: &str, identity: Option<&str>) -> FetchOutcome<Self::Payload>;
}

/// Capability that turns a raw financial-metrics page body into a snapshot.
///
/// Page layout knowledge lives behind this seam; the adapter only validates
/// transport-level shape and delegates interpretation here.
pub trait FinancialPageParser: Send + Sync {
    /// Parses a page body, or returns a human-readable reason it is unparseable.
    fn parse(&self, body: &str) -> Result<FinancialSnapshot, String>;
}

/// Supplies rotating client identities for the scraped source.
///
/// Injectable so tests can pin a deterministic identity.
pub trait IdentityProvider: Send + Sync {
    /// Returns the identity to present on the next request.
    fn next_identity(&self) -> String;
}
