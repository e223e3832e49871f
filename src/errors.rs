use thiserror::Error;

/// Errors surfaced by the store.
///
/// Retry policy is the caller's: connection failures are reported once, never
/// retried internally.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store is unreachable (network, pool or TLS failure).
    #[error("database unreachable: {0}")]
    Connection(#[source] sqlx::Error),
    /// A ticker, granularity or owner identifier failed the naming policy,
    /// or a record does not fit its table's column kinds.
    #[error("constraint violation: {0}")]
    Constraint(String),
    /// Any other error reported by the database.
    #[error("database error: {0}")]
    Db(#[source] sqlx::Error),
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    pub fn constraint(msg: impl Into<String>) -> Self {
        StoreError::Constraint(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        StoreError::Config(msg.into())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => StoreError::Connection(value),
            other => StoreError::Db(other),
        }
    }
}
