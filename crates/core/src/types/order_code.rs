//! Human-readable order codes.
//!
//! All order paths (draft checkout and direct buy-now) share this single
//! generation scheme: `ORD` + six-digit date (yymmdd) + five random
//! alphanumeric characters, e.g. `ORD260826K3XP9`.
//!
//! Uniqueness is enforced by the database (`orders.code` is unique);
//! callers retry generation on a conflict rather than assuming the random
//! suffix never collides.

use core::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OrderCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum OrderCodeError {
    /// The code does not start with the `ORD` prefix.
    #[error("order code must start with '{prefix}'", prefix = OrderCode::PREFIX)]
    MissingPrefix,
    /// The code has the wrong length.
    #[error("order code must be exactly {len} characters", len = OrderCode::LENGTH)]
    WrongLength,
    /// The date segment is not six ASCII digits.
    #[error("order code date segment must be six digits")]
    InvalidDateSegment,
    /// The random suffix contains non-alphanumeric characters.
    #[error("order code suffix must be alphanumeric")]
    InvalidSuffix,
}

/// A validated order code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OrderCode(String);

impl OrderCode {
    /// Fixed prefix for all order codes.
    pub const PREFIX: &'static str = "ORD";
    /// Length of the date segment (yymmdd).
    pub const DATE_LENGTH: usize = 6;
    /// Length of the random suffix.
    pub const SUFFIX_LENGTH: usize = 5;
    /// Total code length.
    pub const LENGTH: usize = 3 + Self::DATE_LENGTH + Self::SUFFIX_LENGTH;

    /// Generate a new order code for today (UTC).
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_for_date(chrono::Utc::now().date_naive())
    }

    /// Generate a new order code for the given date.
    #[must_use]
    pub fn generate_for_date(date: NaiveDate) -> Self {
        use rand::Rng;
        use rand::distr::Alphanumeric;

        let suffix: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(Self::SUFFIX_LENGTH)
            .map(|b| char::from(b).to_ascii_uppercase())
            .collect();

        Self(format!("{}{}{suffix}", Self::PREFIX, date.format("%y%m%d")))
    }

    /// Parse an `OrderCode` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string does not match the
    /// `ORD` + yymmdd + 5-alphanumeric shape.
    pub fn parse(s: &str) -> Result<Self, OrderCodeError> {
        if s.len() != Self::LENGTH {
            return Err(OrderCodeError::WrongLength);
        }

        let rest = s
            .strip_prefix(Self::PREFIX)
            .ok_or(OrderCodeError::MissingPrefix)?;

        let (date, suffix) = rest.split_at(Self::DATE_LENGTH);

        if !date.chars().all(|c| c.is_ascii_digit()) {
            return Err(OrderCodeError::InvalidDateSegment);
        }

        if !suffix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(OrderCodeError::InvalidSuffix);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the order code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OrderCode {
    type Err = OrderCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for OrderCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderCode {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

// No Decode impl: stored codes come back as String and go through
// `parse`, so repositories can report corrupted rows.
#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderCode {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_shape() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 26).unwrap();
        let code = OrderCode::generate_for_date(date);

        assert_eq!(code.as_str().len(), OrderCode::LENGTH);
        assert!(code.as_str().starts_with("ORD260826"));
        assert!(
            code.as_str()[9..]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() && !c.is_ascii_lowercase())
        );
    }

    #[test]
    fn test_generated_codes_parse() {
        for _ in 0..50 {
            let code = OrderCode::generate();
            assert!(OrderCode::parse(code.as_str()).is_ok());
        }
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert!(matches!(
            OrderCode::parse("ORD123"),
            Err(OrderCodeError::WrongLength)
        ));
        assert!(matches!(
            OrderCode::parse("XYZ260826AB12C"),
            Err(OrderCodeError::MissingPrefix)
        ));
        assert!(matches!(
            OrderCode::parse("ORD26O826AB12C"),
            Err(OrderCodeError::InvalidDateSegment)
        ));
        assert!(matches!(
            OrderCode::parse("ORD260826AB-2C"),
            Err(OrderCodeError::InvalidSuffix)
        ));
    }

    #[test]
    fn test_display_roundtrip() {
        let code = OrderCode::parse("ORD260826K3XP9").unwrap();
        assert_eq!(code.to_string(), "ORD260826K3XP9");
    }
}
