use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::VolumeKind;

/// Traded volume over a bar's interval.
///
/// Intraday and daily tables store whole-share counts (`BIGINT`); weekly and
/// monthly tables store floating-point volume (`DOUBLE PRECISION`). Integer
/// volume widens losslessly into a float column; a fractional volume headed
/// for an integer column is a caller error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Volume {
    Int(i64),
    Float(f64),
}

impl Volume {
    /// Value to bind for an integer volume column, if representable.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Volume::Int(v) => Some(*v),
            Volume::Float(_) => None,
        }
    }

    /// Value to bind for a float volume column.
    pub fn as_float(&self) -> f64 {
        match self {
            Volume::Int(v) => *v as f64,
            Volume::Float(v) => *v,
        }
    }

    pub fn kind(&self) -> VolumeKind {
        match self {
            Volume::Int(_) => VolumeKind::Integer,
            Volume::Float(_) => VolumeKind::Float,
        }
    }
}

impl From<i64> for Volume {
    fn from(value: i64) -> Self {
        Volume::Int(value)
    }
}

impl From<f64> for Volume {
    fn from(value: f64) -> Self {
        Volume::Float(value)
    }
}

/// One stored price bar, keyed by its opening timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Volume,
}

impl OhlcvBar {
    pub fn new(
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: impl Into<Volume>,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume: volume.into(),
        }
    }
}
