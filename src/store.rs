use std::sync::Arc;

use chrono::NaiveDateTime;
use dashmap::DashSet;
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::db::{bar_queries, schema_queries};
use crate::errors::StoreError;
use crate::models::{is_safe_identifier, Granularity, OhlcvBar, Ticker};
use crate::services::bar_cache::{BarCache, CacheKey};

/// Postgres-backed store of per-ticker OHLCV tables.
///
/// Tables are created on first reference to a (ticker, granularity) pair and
/// never dropped. A process-local set of already ensured tables
/// short-circuits repeat provisioning; correctness under concurrent callers
/// rests on the database's `IF NOT EXISTS` semantics, not on that set.
pub struct BarStore {
    pool: PgPool,
    table_owner: Option<String>,
    ensured: DashSet<(Ticker, Granularity)>,
    cache: BarCache,
}

impl BarStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            table_owner: None,
            ensured: DashSet::new(),
            cache: BarCache::default(),
        }
    }

    pub fn from_config(pool: PgPool, config: &StoreConfig) -> Self {
        Self {
            pool,
            table_owner: config.table_owner.clone(),
            ensured: DashSet::new(),
            cache: BarCache::new(config.cache_size),
        }
    }

    /// Set the principal that newly created tables are handed to.
    pub fn with_table_owner(mut self, owner: impl Into<String>) -> Result<Self, StoreError> {
        let owner = owner.into();
        if !is_safe_identifier(&owner) {
            return Err(StoreError::constraint(format!(
                "invalid table owner '{}'",
                owner
            )));
        }
        self.table_owner = Some(owner);
        Ok(self)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the backing table for (ticker, granularity) if absent.
    ///
    /// Idempotent and safe to call concurrently. Ownership assignment runs
    /// once at creation; if it fails the table stays usable and the failure
    /// is reported at WARN.
    pub async fn ensure_table(
        &self,
        ticker: &Ticker,
        granularity: Granularity,
    ) -> Result<(), StoreError> {
        let key = (ticker.clone(), granularity);
        if self.ensured.contains(&key) {
            return Ok(());
        }

        let table = ticker.table_name(granularity);
        schema_queries::create_bar_table(&self.pool, &table, granularity.volume_kind()).await?;

        if let Some(owner) = &self.table_owner {
            if let Err(e) = schema_queries::set_table_owner(&self.pool, &table, owner).await {
                warn!("failed to set owner of {} to {}: {}", table, owner, e);
            }
        }

        self.ensured.insert(key);
        Ok(())
    }

    /// Insert-or-update a batch of bars by timestamp.
    ///
    /// The batch lands in one transaction; a timestamp appearing more than
    /// once resolves to its last record. The table is created on first
    /// reference.
    pub async fn upsert_bars(
        &self,
        ticker: &Ticker,
        granularity: Granularity,
        bars: &[OhlcvBar],
    ) -> Result<(), StoreError> {
        self.ensure_table(ticker, granularity).await?;
        let table = ticker.table_name(granularity);
        bar_queries::upsert_bars(&self.pool, &table, granularity.volume_kind(), bars).await?;
        self.cache.invalidate_table(&table);
        debug!("upserted {} bars into {}", bars.len(), table);
        Ok(())
    }

    /// Stored bars covering the instant `at`: the calendar day of `at` for
    /// intraday, its calendar month for daily, the whole set for weekly and
    /// monthly. Read-through cached.
    pub async fn bars_at(
        &self,
        ticker: &Ticker,
        granularity: Granularity,
        at: NaiveDateTime,
    ) -> Result<Vec<OhlcvBar>, StoreError> {
        let table = ticker.table_name(granularity);
        let window = granularity.fetch_window(at);
        let key = CacheKey::new(&table, window);

        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.as_ref().clone());
        }

        self.ensure_table(ticker, granularity).await?;
        let bars =
            bar_queries::fetch_range(&self.pool, &table, granularity.volume_kind(), window).await?;
        let bars = Arc::new(bars);
        self.cache.put(key, Arc::clone(&bars));
        Ok(bars.as_ref().clone())
    }

    /// Stored bars in the half-open window `[start, end)`, oldest first.
    pub async fn bars_in_range(
        &self,
        ticker: &Ticker,
        granularity: Granularity,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<OhlcvBar>, StoreError> {
        self.ensure_table(ticker, granularity).await?;
        let table = ticker.table_name(granularity);
        bar_queries::fetch_range(
            &self.pool,
            &table,
            granularity.volume_kind(),
            Some((start, end)),
        )
        .await
    }

    /// Newest stored bar for (ticker, granularity), if any.
    pub async fn latest_bar(
        &self,
        ticker: &Ticker,
        granularity: Granularity,
    ) -> Result<Option<OhlcvBar>, StoreError> {
        self.ensure_table(ticker, granularity).await?;
        let table = ticker.table_name(granularity);
        bar_queries::fetch_latest(&self.pool, &table, granularity.volume_kind()).await
    }

    /// Whether the backing table exists in the database, bypassing the
    /// process-local registry.
    pub async fn table_exists(
        &self,
        ticker: &Ticker,
        granularity: Granularity,
    ) -> Result<bool, StoreError> {
        schema_queries::table_exists(&self.pool, &ticker.table_name(granularity)).await
    }
}
