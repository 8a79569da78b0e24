//! Human-readable order numbers.
//!
//! Format: `ORD-YYYYMMDD-XXXXX` where `XXXXX` is a random uppercase
//! alphanumeric suffix. The suffix alone does not guarantee uniqueness;
//! the `orders.order_number` column carries a unique constraint and
//! callers regenerate on conflict.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Characters used in the random suffix. 0/O and 1/I are kept; suffixes
/// are machine-matched, not transcribed.
const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of the random suffix.
const SUFFIX_LEN: usize = 5;

/// A generated order number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Generate a fresh order number for the given date.
    ///
    /// Collisions are possible; insert under the unique constraint and
    /// retry with a new number on conflict.
    #[must_use]
    pub fn generate(date: NaiveDate) -> Self {
        use rand::Rng;

        let mut rng = rand::rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| {
                let idx = rng.random_range(0..SUFFIX_CHARSET.len());
                SUFFIX_CHARSET[idx] as char
            })
            .collect();

        Self(format!("ORD-{}-{suffix}", date.format("%Y%m%d")))
    }

    /// Validate and wrap an order number received from outside.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let rest = s.strip_prefix("ORD-")?;
        let (date, suffix) = rest.split_at_checked(8)?;
        let suffix = suffix.strip_prefix('-')?;

        if date.len() == 8
            && date.bytes().all(|b| b.is_ascii_digit())
            && suffix.len() == SUFFIX_LEN
            && suffix.bytes().all(|b| SUFFIX_CHARSET.contains(&b))
        {
            Some(Self(s.to_owned()))
        } else {
            None
        }
    }

    /// Returns the order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `OrderNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for OrderNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn test_generate_format() {
        let number = OrderNumber::generate(date());
        let s = number.as_str();

        assert!(s.starts_with("ORD-20250314-"), "got {s}");
        assert_eq!(s.len(), "ORD-20250314-".len() + 5);
        assert!(
            s["ORD-20250314-".len()..]
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        );
    }

    #[test]
    fn test_generate_is_random() {
        // Two draws colliding is possible but vanishingly unlikely (36^5)
        let a = OrderNumber::generate(date());
        let b = OrderNumber::generate(date());
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_accepts_generated() {
        let number = OrderNumber::generate(date());
        assert_eq!(OrderNumber::parse(number.as_str()), Some(number));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(OrderNumber::parse("").is_none());
        assert!(OrderNumber::parse("ORD-2025031-ABCDE").is_none());
        assert!(OrderNumber::parse("ORD-20250314-abcde").is_none());
        assert!(OrderNumber::parse("ORD-20250314-ABCD").is_none());
        assert!(OrderNumber::parse("XYZ-20250314-ABCDE").is_none());
        assert!(OrderNumber::parse("ORD-20250314ABCDE").is_none());
    }
}
