pub mod config;
pub mod config_loader;
pub mod domain;
pub mod error;
pub mod outcome;
pub mod stats;
pub mod traits;
pub mod universe;

pub use config::{
    AppConfig, EmptyPagePolicy, PacingConfig, RetryConfig, RunConfig, ScreenerConfig,
    StorageConfig, YahooConfig,
};
pub use config_loader::ConfigLoader;
pub use domain::{Cell, DataTable, FinancialSnapshot, PriceBar, PriceSeries, Section, SourceKind};
pub use error::FetchError;
pub use outcome::FetchOutcome;
pub use stats::{RunSummary, SourceCounts};
pub use traits::{FinancialPageParser, IdentityProvider, SourceAdapter};
pub use universe::{load_universe, parse_universe};
