//! Strictly positive quantity type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum QuantityError {
    /// The value is zero or negative.
    #[error("quantity must be greater than zero")]
    NotPositive,
}

/// A strictly positive item count.
///
/// Used for cart item quantities and stock decrements. Zero is not
/// representable: a cart entry that would reach quantity zero is removed
/// instead, and a zero-unit stock decrement is meaningless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(i32);

impl Quantity {
    /// Create a `Quantity` from a raw count.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::NotPositive`] if the count is zero or
    /// negative.
    pub const fn new(count: i32) -> Result<Self, QuantityError> {
        if count <= 0 {
            return Err(QuantityError::NotPositive);
        }
        Ok(Self(count))
    }

    /// Get the underlying count.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Quantity {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i32 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i32 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Quantity {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let count = <i32 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(count))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Quantity {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i32 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_positive() {
        let qty = Quantity::new(3).unwrap();
        assert_eq!(qty.as_i32(), 3);
    }

    #[test]
    fn test_new_rejects_zero_and_negative() {
        assert!(matches!(Quantity::new(0), Err(QuantityError::NotPositive)));
        assert!(matches!(Quantity::new(-5), Err(QuantityError::NotPositive)));
    }

    #[test]
    fn test_ordering() {
        assert!(Quantity::new(1).unwrap() < Quantity::new(2).unwrap());
    }
}
