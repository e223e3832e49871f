use chrono::NaiveDateTime;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::error;

use crate::errors::StoreError;
use crate::models::{OhlcvBar, Volume, VolumeKind};

const BAR_COLUMNS: &str = r#""timestamp", open, high, low, close, volume"#;

pub(crate) fn upsert_sql(table: &str) -> String {
    format!(
        r#"INSERT INTO {} ({}) VALUES ($1, $2, $3, $4, $5, $6)
           ON CONFLICT ("timestamp") DO UPDATE SET
           (open, high, low, close, volume) =
           (EXCLUDED.open, EXCLUDED.high, EXCLUDED.low, EXCLUDED.close, EXCLUDED.volume)"#,
        table, BAR_COLUMNS
    )
}

/// Write a batch of bars, one row per distinct timestamp, last record wins.
///
/// Rows go in one at a time inside a single transaction: a multi-row VALUES
/// list would make Postgres reject batches that touch the same timestamp
/// twice, and per-row inserts are what give in-batch duplicates their
/// last-wins resolution. All rows become visible together, or none do.
pub async fn upsert_bars(
    pool: &PgPool,
    table: &str,
    volume_kind: VolumeKind,
    bars: &[OhlcvBar],
) -> Result<(), StoreError> {
    if bars.is_empty() {
        return Ok(());
    }

    let sql = upsert_sql(table);
    let mut tx = pool.begin().await.map_err(|e| {
        error!("failed to begin transaction for {}: {}", table, e);
        StoreError::from(e)
    })?;

    for bar in bars {
        let query = sqlx::query(&sql)
            .bind(bar.timestamp)
            .bind(bar.open)
            .bind(bar.high)
            .bind(bar.low)
            .bind(bar.close);
        let query = match volume_kind {
            VolumeKind::Integer => match bar.volume.as_int() {
                Some(v) => query.bind(v),
                None => {
                    return Err(StoreError::constraint(format!(
                        "fractional volume {} cannot be stored in integer column of {}",
                        bar.volume.as_float(),
                        table
                    )))
                }
            },
            VolumeKind::Float => query.bind(bar.volume.as_float()),
        };
        query.execute(&mut *tx).await.map_err(|e| {
            error!(
                "failed to upsert bar at {} into {}: {}",
                bar.timestamp, table, e
            );
            StoreError::from(e)
        })?;
    }

    tx.commit().await.map_err(|e| {
        error!("failed to commit upsert into {}: {}", table, e);
        StoreError::from(e)
    })?;
    Ok(())
}

/// Read bars in a half-open `[start, end)` window, or the whole table when
/// no window is given. Ascending by timestamp.
pub async fn fetch_range(
    pool: &PgPool,
    table: &str,
    volume_kind: VolumeKind,
    window: Option<(NaiveDateTime, NaiveDateTime)>,
) -> Result<Vec<OhlcvBar>, StoreError> {
    let rows = match window {
        Some((start, end)) => {
            let sql = format!(
                r#"SELECT {} FROM {}
                   WHERE "timestamp" >= $1 AND "timestamp" < $2
                   ORDER BY "timestamp" ASC"#,
                BAR_COLUMNS, table
            );
            sqlx::query(&sql)
                .bind(start)
                .bind(end)
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!(
                r#"SELECT {} FROM {} ORDER BY "timestamp" ASC"#,
                BAR_COLUMNS, table
            );
            sqlx::query(&sql).fetch_all(pool).await?
        }
    };

    rows.iter()
        .map(|row| bar_from_row(row, volume_kind).map_err(StoreError::from))
        .collect()
}

/// Newest stored bar, if any.
pub async fn fetch_latest(
    pool: &PgPool,
    table: &str,
    volume_kind: VolumeKind,
) -> Result<Option<OhlcvBar>, StoreError> {
    let sql = format!(
        r#"SELECT {} FROM {} ORDER BY "timestamp" DESC LIMIT 1"#,
        BAR_COLUMNS, table
    );
    let row = sqlx::query(&sql).fetch_optional(pool).await?;
    row.map(|r| bar_from_row(&r, volume_kind).map_err(StoreError::from))
        .transpose()
}

fn bar_from_row(row: &PgRow, volume_kind: VolumeKind) -> Result<OhlcvBar, sqlx::Error> {
    let volume = match volume_kind {
        VolumeKind::Integer => Volume::Int(row.try_get("volume")?),
        VolumeKind::Float => Volume::Float(row.try_get("volume")?),
    };
    Ok(OhlcvBar {
        timestamp: row.try_get("timestamp")?,
        open: row.try_get("open")?,
        high: row.try_get("high")?,
        low: row.try_get("low")?,
        close: row.try_get("close")?,
        volume,
    })
}
