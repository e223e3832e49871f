use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::StoreError;
use crate::models::Granularity;

/// Longest symbol accepted. Keeps every generated table name well inside
/// Postgres' 63-byte identifier limit once the granularity suffix is added.
pub const MAX_TICKER_LEN: usize = 32;

/// A validated, case-normalized ticker symbol.
///
/// Symbols are lowercased and must match `[a-z][a-z0-9_]*`. Table and owner
/// names are the only strings this crate ever splices into SQL text, so the
/// charset check here is what keeps dynamic table naming injection-free;
/// everything else goes through bound parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn new(raw: &str) -> Result<Self, StoreError> {
        let normalized = raw.trim().to_ascii_lowercase();
        if !is_safe_identifier(&normalized) {
            return Err(StoreError::constraint(format!(
                "invalid ticker symbol '{}': must be 1-{} chars of [a-z0-9_], starting with a letter",
                raw, MAX_TICKER_LEN
            )));
        }
        Ok(Ticker(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Backing table name for this symbol at a granularity.
    pub fn table_name(&self, granularity: Granularity) -> String {
        format!("{}_{}", self.0, granularity.table_suffix())
    }
}

/// Whether `s` is safe to splice into SQL as an identifier: non-empty,
/// bounded, lowercase alphanumeric/underscore, leading letter.
pub fn is_safe_identifier(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_TICKER_LEN {
        return false;
    }
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ticker {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ticker::new(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ticker::new(&value)
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_case_and_whitespace() {
        let ticker = Ticker::new("  AAPL ").unwrap();
        assert_eq!(ticker.as_str(), "aapl");
    }

    #[test]
    fn test_table_names() {
        let ticker = Ticker::new("MSFT").unwrap();
        assert_eq!(ticker.table_name(Granularity::Daily), "msft_daily");
        assert_eq!(ticker.table_name(Granularity::Intraday), "msft_intraday");
    }

    #[test]
    fn test_rejects_sql_metacharacters() {
        for raw in ["aapl; DROP TABLE x", "a'b", "a\"b", "a b", "a-b", "brk.b"] {
            assert!(Ticker::new(raw).is_err(), "accepted {:?}", raw);
        }
    }

    #[test]
    fn test_rejects_empty_and_leading_digit() {
        assert!(Ticker::new("").is_err());
        assert!(Ticker::new("   ").is_err());
        assert!(Ticker::new("3m").is_err());
        assert!(Ticker::new("_x").is_err());
    }

    #[test]
    fn test_rejects_overlong_symbol() {
        let long = "a".repeat(MAX_TICKER_LEN + 1);
        assert!(Ticker::new(&long).is_err());
        let max = "a".repeat(MAX_TICKER_LEN);
        assert!(Ticker::new(&max).is_ok());
    }

    #[test]
    fn test_underscores_and_digits_allowed() {
        assert!(Ticker::new("brk_b").is_ok());
        assert!(Ticker::new("x2024").is_ok());
    }
}
