use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// An amount in minor currency units (cents for USD).
///
/// All quote arithmetic happens on this type. Major-unit values (dollars) are
/// converted with [`Money::from_major`] when they enter the system and with
/// [`Money::to_major`] or `Display` when they leave it.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(pub i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Converts a major-unit amount, rounding to the nearest minor unit with
    /// ties away from zero. Amounts beyond `Decimal` range saturate.
    pub fn from_major(major: Decimal) -> Self {
        match major.checked_mul(Decimal::ONE_HUNDRED) {
            Some(scaled) => Self(round_to_minor(scaled)),
            None if major.is_sign_negative() => Self(i64::MIN),
            None => Self(i64::MAX),
        }
    }

    pub fn to_major(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    pub fn times(self, factor: i64) -> Self {
        Self(self.0.saturating_mul(factor))
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

/// Rounds to an integer with ties away from zero, saturating at the `i64`
/// bounds.
pub fn round_to_minor(value: Decimal) -> i64 {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    rounded.to_i64().unwrap_or(if rounded.is_sign_negative() { i64::MIN } else { i64::MAX })
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = (abs / 100).to_string();
        let cents = abs % 100;

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (index, digit) in whole.chars().enumerate() {
            if index > 0 && (whole.len() - index) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        write!(f, "{sign}{grouped}.{cents:02}")
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{round_to_minor, Money};

    #[test]
    fn converts_major_units_with_half_away_from_zero() {
        assert_eq!(Money::from_major(Decimal::new(7500, 2)), Money(7500));
        assert_eq!(Money::from_major(Decimal::new(12345, 3)), Money(1235));
        assert_eq!(Money::from_major(Decimal::new(-12345, 3)), Money(-1235));
        assert_eq!(Money::from_major(Decimal::new(199, 0)), Money(19_900));
    }

    #[test]
    fn displays_grouped_major_amounts() {
        assert_eq!(Money(0).to_string(), "0.00");
        assert_eq!(Money(5).to_string(), "0.05");
        assert_eq!(Money(7290).to_string(), "72.90");
        assert_eq!(Money(123_456_789).to_string(), "1,234,567.89");
        assert_eq!(Money(-150_050).to_string(), "-1,500.50");
    }

    #[test]
    fn rounding_is_symmetric_around_zero() {
        assert_eq!(round_to_minor(Decimal::new(25, 1)), 3);
        assert_eq!(round_to_minor(Decimal::new(-25, 1)), -3);
        assert_eq!(round_to_minor(Decimal::new(24, 1)), 2);
    }

    #[test]
    fn sums_and_scales() {
        let total: Money = [Money(100), Money(250), Money(-50)].into_iter().sum();
        assert_eq!(total, Money(300));
        assert_eq!(Money(1000).times(12), Money(12_000));
        assert_eq!(Money(i64::MAX).times(2), Money(i64::MAX));
        assert_eq!(Money(1000).to_major(), Decimal::new(1000, 2));
    }

    #[test]
    fn arithmetic_saturates_at_the_bounds() {
        assert_eq!(Money(i64::MAX) + Money(1), Money(i64::MAX));
        assert_eq!(Money(i64::MIN) - Money(1), Money(i64::MIN));
        assert_eq!(-Money(i64::MIN), Money(i64::MAX));
        let total: Money = [Money(i64::MAX / 2 + 1), Money(i64::MAX / 2 + 1)].into_iter().sum();
        assert_eq!(total, Money(i64::MAX));
    }

    #[test]
    fn oversized_major_amounts_saturate() {
        assert_eq!(Money::from_major(Decimal::MAX), Money(i64::MAX));
        assert_eq!(Money::from_major(Decimal::MIN), Money(i64::MIN));
        assert_eq!(Money::from_major(Decimal::from(i64::MAX)), Money(i64::MAX));
    }
}
