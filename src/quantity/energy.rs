use std::{
    fmt::{Debug, Display, Formatter},
    ops::Mul,
};

use serde::{Deserialize, Serialize};

use crate::quantity::{money::Cents, rate::CentsPerKwh};

/// Kilowatt-hours of household consumption.
#[derive(
    Clone,
    Copy,
    Default,
    Deserialize,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::SubAssign,
    derive_more::Sum,
)]
pub struct KilowattHours(pub f64);

impl KilowattHours {
    pub const ZERO: Self = Self(0.0);

    #[must_use]
    pub const fn abs(mut self) -> Self {
        self.0 = self.0.abs();
        self
    }

    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}

impl Display for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} kWh", self.0)
    }
}

impl Debug for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}kWh", self.0)
    }
}

impl Mul<CentsPerKwh> for KilowattHours {
    type Output = Cents;

    /// Price a consumption slice, rounding to whole cents right away. Every
    /// line item is an integer number of cents before any summation.
    fn mul(self, rhs: CentsPerKwh) -> Self::Output {
        Cents::from_fractional(self.0 * rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_rounds_to_whole_cents() {
        assert_eq!(KilowattHours(1000.0) * CentsPerKwh(14.5), Cents(14500));
        assert_eq!(KilowattHours(3.0) * CentsPerKwh(14.5), Cents(44));
        assert_eq!(KilowattHours(12_000.0) * CentsPerKwh(4.2), Cents(50_400));
    }
}
