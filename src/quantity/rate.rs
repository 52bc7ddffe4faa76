use std::fmt::{Debug, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Energy or delivery price in cents per kilowatt-hour.
#[derive(
    Clone,
    Copy,
    Deserialize,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::From,
    derive_more::FromStr,
)]
pub struct CentsPerKwh(pub f64);

impl CentsPerKwh {
    pub const ZERO: Self = Self(0.0);
}

impl Display for CentsPerKwh {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}¢/kWh", self.0)
    }
}

impl Debug for CentsPerKwh {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
