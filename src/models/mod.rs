mod bar;
mod granularity;
mod ticker;

pub use bar::{OhlcvBar, Volume};
pub use granularity::{Granularity, VolumeKind};
pub use ticker::{is_safe_identifier, Ticker, MAX_TICKER_LEN};
