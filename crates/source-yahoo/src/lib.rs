//! Price-series source adapter.
//!
//! Thin binding to the daily-history chart API behind the uniform
//! [`SourceAdapter`](equity_snap_core::traits::SourceAdapter) contract.

pub mod client;

pub use client::YahooClient;
