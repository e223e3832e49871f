//! Store policy tests that need no database: symbol naming, the granularity
//! policy, volume handling and the freshness rules.

use chrono::{NaiveDate, NaiveDateTime};
use ohlcv_store::{needs_refresh, Granularity, OhlcvBar, Ticker, Volume, VolumeKind};

fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

// ---------------------------------------------------------------------------
// Naming policy
// ---------------------------------------------------------------------------

#[test]
fn test_table_names_follow_ticker_granularity_convention() {
    let ticker = Ticker::new("AAPL").unwrap();
    assert_eq!(ticker.table_name(Granularity::Intraday), "aapl_intraday");
    assert_eq!(ticker.table_name(Granularity::Daily), "aapl_daily");
    assert_eq!(ticker.table_name(Granularity::Weekly), "aapl_weekly");
    assert_eq!(ticker.table_name(Granularity::Monthly), "aapl_monthly");
}

#[test]
fn test_hostile_symbols_never_reach_sql() {
    for raw in [
        "aapl_daily; DROP TABLE aapl_daily--",
        "aapl\"",
        "aapl'",
        "aapl daily",
        "",
    ] {
        assert!(Ticker::new(raw).is_err(), "accepted {:?}", raw);
    }
}

#[test]
fn test_granularity_parses_from_config_strings() {
    assert_eq!("daily".parse::<Granularity>().unwrap(), Granularity::Daily);
    assert_eq!(
        "INTRADAY".parse::<Granularity>().unwrap(),
        Granularity::Intraday
    );
    assert!("quarterly".parse::<Granularity>().is_err());
}

// ---------------------------------------------------------------------------
// Granularity policy
// ---------------------------------------------------------------------------

#[test]
fn test_volume_column_kind_per_granularity() {
    assert_eq!(Granularity::Intraday.volume_kind(), VolumeKind::Integer);
    assert_eq!(Granularity::Daily.volume_kind(), VolumeKind::Integer);
    assert_eq!(Granularity::Weekly.volume_kind(), VolumeKind::Float);
    assert_eq!(Granularity::Monthly.volume_kind(), VolumeKind::Float);
}

#[test]
fn test_granularity_serializes_lowercase() {
    assert_eq!(
        serde_json::to_string(&Granularity::Weekly).unwrap(),
        "\"weekly\""
    );
    let back: Granularity = serde_json::from_str("\"intraday\"").unwrap();
    assert_eq!(back, Granularity::Intraday);
}

// ---------------------------------------------------------------------------
// Volume handling
// ---------------------------------------------------------------------------

#[test]
fn test_integer_volume_fits_both_column_kinds() {
    let v = Volume::Int(1000);
    assert_eq!(v.as_int(), Some(1000));
    assert_eq!(v.as_float(), 1000.0);
}

#[test]
fn test_fractional_volume_only_fits_float_columns() {
    let v = Volume::Float(1234.5);
    assert_eq!(v.as_int(), None);
    assert_eq!(v.as_float(), 1234.5);
}

#[test]
fn test_bar_construction_accepts_plain_numbers() {
    let bar = OhlcvBar::new(ts(2024, 1, 2), 100.0, 101.0, 99.0, 100.5, 1000i64);
    assert_eq!(bar.volume, Volume::Int(1000));
    let bar = OhlcvBar::new(ts(2024, 1, 2), 100.0, 101.0, 99.0, 100.5, 1000.5f64);
    assert_eq!(bar.volume, Volume::Float(1000.5));
}

// ---------------------------------------------------------------------------
// Freshness
// ---------------------------------------------------------------------------

#[test]
fn test_historical_data_is_final() {
    let newest = ts(2024, 5, 31);
    let now = ts(2024, 6, 14);
    assert!(!needs_refresh(Granularity::Intraday, newest, now));
    assert!(!needs_refresh(Granularity::Daily, newest, now));
}

#[test]
fn test_open_periods_need_refresh() {
    // Daily: today's bar is still forming.
    assert!(needs_refresh(Granularity::Daily, ts(2024, 6, 14), ts(2024, 6, 14)));
    // Weekly: newest bar from a closed week, a new week has opened.
    assert!(needs_refresh(Granularity::Weekly, ts(2024, 6, 7), ts(2024, 6, 10)));
    // Monthly: newest bar from a closed month.
    assert!(needs_refresh(Granularity::Monthly, ts(2024, 5, 31), ts(2024, 6, 3)));
}
