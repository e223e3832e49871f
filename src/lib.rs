//! Postgres-backed time-series store for OHLCV market data.
//!
//! Each (ticker, granularity) pair is backed by its own `{ticker}_{granularity}`
//! table keyed by timestamp. [`BarStore`] provisions tables idempotently,
//! bulk-upserts bars, and serves reads through a small in-memory cache.
//! Ticker and owner names pass a strict identifier policy before they ever
//! reach SQL text; all data values are bound parameters.

pub mod config;
pub mod db;
pub mod errors;
pub mod logging;
pub mod models;
pub mod services;
pub mod store;

pub use config::StoreConfig;
pub use errors::StoreError;
pub use models::{Granularity, OhlcvBar, Ticker, Volume, VolumeKind};
pub use services::freshness::needs_refresh;
pub use store::BarStore;
