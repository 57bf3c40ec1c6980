//! Monetary amounts.

use std::iter::Sum;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A decimal money amount.
///
/// Serialized as a string (e.g. `"2.99"`) so no precision is lost on the
/// wire. Amounts keep the scale they were created with; equality compares
/// numeric value, so `20` and `20.00` are equal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates a money amount from a decimal value.
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Creates a money amount from cents (e.g., 299 = 2.99).
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Returns the decimal amount.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is below zero.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Adds two amounts, returning `None` on overflow.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

/// Saturates at the largest representable amount instead of panicking.
impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, m| {
            acc.checked_add(m).unwrap_or(Self(Decimal::MAX))
        })
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
