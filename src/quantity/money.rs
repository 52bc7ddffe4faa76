use std::{
    fmt::{Debug, Display, Formatter},
    ops::Mul,
};

use serde::{Deserialize, Serialize};

/// Whole US cents. All monetary accumulation happens in exact integer cents;
/// fractional amounts are rounded half away from zero on entry.
#[derive(
    Clone,
    Copy,
    Default,
    Deserialize,
    Eq,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::SubAssign,
    derive_more::Sum,
)]
pub struct Cents(pub i64);

impl Cents {
    pub const ZERO: Self = Self(0);

    /// Round a fractional cent amount to whole cents, half away from zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_fractional(cents: f64) -> Self {
        Self(cents.round() as i64)
    }

    #[must_use]
    pub fn from_dollars(dollars: f64) -> Self {
        Self::from_fractional(dollars * 100.0)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_dollars(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Spread a total evenly over `n` periods, rounding half away from zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn per_period(self, n: u32) -> Self {
        Self::from_fractional(self.0 as f64 / f64::from(n.max(1)))
    }

    #[must_use]
    pub fn clamp_non_negative(self) -> Self {
        self.max(Self::ZERO)
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Display for Cents {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{sign}${}.{:02}", cents / 100, cents % 100)
    }
}

impl Debug for Cents {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Mul<u32> for Cents {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0 * i64::from(rhs))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(Cents::from_fractional(10.5), Cents(11));
        assert_eq!(Cents::from_fractional(10.4), Cents(10));
        assert_eq!(Cents::from_fractional(-10.5), Cents(-11));
        assert_eq!(Cents::from_dollars(5.0), Cents(500));
        assert_eq!(Cents::from_dollars(-0.305), Cents(-31));
    }

    #[test]
    fn test_display() {
        assert_eq!(Cents(19_200).to_string(), "$192.00");
        assert_eq!(Cents(-50).to_string(), "-$0.50");
        assert_eq!(Cents(5).to_string(), "$0.05");
    }

    #[test]
    fn test_per_period() {
        assert_eq!(Cents(230_400).per_period(12), Cents(19_200));
        assert_eq!(Cents(100).per_period(3), Cents(33));
        assert_abs_diff_eq!(Cents(100).per_period(3).to_dollars(), 0.33);
    }
}
