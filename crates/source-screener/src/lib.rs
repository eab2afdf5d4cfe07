//! Financial-metrics source adapter.
//!
//! Binds the scraped company-page source behind the uniform
//! [`SourceAdapter`](equity_snap_core::traits::SourceAdapter) contract:
//! transport and status mapping in [`client`], page interpretation in
//! [`parser`].

pub mod client;
pub mod parser;

pub use client::ScreenerClient;
pub use parser::ScreenerPageParser;
