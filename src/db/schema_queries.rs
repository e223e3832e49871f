use sqlx::PgPool;
use tracing::debug;

use crate::errors::StoreError;
use crate::models::VolumeKind;

/// DDL for one per-ticker bar table. `table` must already have passed the
/// identifier policy; data columns are fixed.
pub(crate) fn create_table_sql(table: &str, volume: VolumeKind) -> String {
    format!(
        r#"CREATE TABLE IF NOT EXISTS {} (
            "timestamp" TIMESTAMP PRIMARY KEY,
            open DOUBLE PRECISION,
            high DOUBLE PRECISION,
            low DOUBLE PRECISION,
            close DOUBLE PRECISION,
            volume {}
        )"#,
        table,
        volume.column_type()
    )
}

pub(crate) fn owner_sql(table: &str, owner: &str) -> String {
    format!("ALTER TABLE {} OWNER TO {}", table, owner)
}

/// Create the table if absent. Safe to call repeatedly and concurrently;
/// idempotence rests on `IF NOT EXISTS`.
pub async fn create_bar_table(
    pool: &PgPool,
    table: &str,
    volume: VolumeKind,
) -> Result<(), StoreError> {
    sqlx::query(&create_table_sql(table, volume))
        .execute(pool)
        .await?;
    debug!("ensured table {}", table);
    Ok(())
}

/// Hand the table to the configured owning principal.
pub async fn set_table_owner(pool: &PgPool, table: &str, owner: &str) -> Result<(), StoreError> {
    sqlx::query(&owner_sql(table, owner)).execute(pool).await?;
    Ok(())
}

pub async fn table_exists(pool: &PgPool, table: &str) -> Result<bool, StoreError> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT to_regclass($1) IS NOT NULL")
        .bind(table)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}
