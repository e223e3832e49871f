use chrono::{Datelike, NaiveDateTime};

use crate::models::Granularity;

/// Whether a stored bar set whose newest timestamp is `newest` should be
/// re-pulled from upstream, as of `now`.
///
/// Historical intraday days are final once stored. A daily set whose newest
/// bar is today's is still forming and will change until the session closes.
/// Weekly and monthly sets go stale once a new period opens without them.
pub fn needs_refresh(granularity: Granularity, newest: NaiveDateTime, now: NaiveDateTime) -> bool {
    match granularity {
        Granularity::Intraday => false,
        Granularity::Daily => newest.date() == now.date(),
        Granularity::Weekly => {
            let newest_week = newest.iso_week();
            let now_week = now.iso_week();
            (newest_week.year(), newest_week.week()) < (now_week.year(), now_week.week())
        }
        Granularity::Monthly => (newest.year(), newest.month()) < (now.year(), now.month()),
    }
}
