use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::errors::StoreError;

/// Sampling interval of a stored price bar.
///
/// Each (ticker, granularity) pair is backed by its own table named
/// `{ticker}_{granularity}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Intraday,
    Daily,
    Weekly,
    Monthly,
}

/// Numeric kind of a granularity's volume column.
///
/// Intraday and daily bars count whole shares; weekly and monthly bars carry
/// aggregated volume, which the upstream feeds report fractionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeKind {
    Integer,
    Float,
}

impl VolumeKind {
    /// Postgres column type backing this kind.
    pub fn column_type(&self) -> &'static str {
        match self {
            VolumeKind::Integer => "BIGINT",
            VolumeKind::Float => "DOUBLE PRECISION",
        }
    }
}

impl Granularity {
    pub const ALL: [Granularity; 4] = [
        Granularity::Intraday,
        Granularity::Daily,
        Granularity::Weekly,
        Granularity::Monthly,
    ];

    pub fn volume_kind(&self) -> VolumeKind {
        match self {
            Granularity::Intraday | Granularity::Daily => VolumeKind::Integer,
            Granularity::Weekly | Granularity::Monthly => VolumeKind::Float,
        }
    }

    /// Table name suffix, also the wire spelling for `FromStr`/`Display`.
    pub fn table_suffix(&self) -> &'static str {
        match self {
            Granularity::Intraday => "intraday",
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }

    /// Half-open window of rows a point-in-time read covers.
    ///
    /// Intraday reads are scoped to the calendar day of `at`, daily reads to
    /// its calendar month. Weekly and monthly sets are small enough to read
    /// whole, so the window is unbounded (`None`).
    pub fn fetch_window(&self, at: NaiveDateTime) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match self {
            Granularity::Intraday => {
                let start = at.date().and_hms_opt(0, 0, 0)?;
                let end = start + chrono::Duration::days(1);
                Some((start, end))
            }
            Granularity::Daily => {
                let start = at.date().with_day(1)?.and_hms_opt(0, 0, 0)?;
                let end = if at.month() == 12 {
                    start.date().with_year(at.year() + 1)?.with_month(1)?
                } else {
                    start.date().with_month(at.month() + 1)?
                }
                .and_hms_opt(0, 0, 0)?;
                Some((start, end))
            }
            Granularity::Weekly | Granularity::Monthly => None,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_suffix())
    }
}

impl FromStr for Granularity {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "intraday" => Ok(Granularity::Intraday),
            "daily" => Ok(Granularity::Daily),
            "weekly" => Ok(Granularity::Weekly),
            "monthly" => Ok(Granularity::Monthly),
            other => Err(StoreError::constraint(format!(
                "unknown granularity '{}' (expected intraday, daily, weekly or monthly)",
                other
            ))),
        }
    }
}
