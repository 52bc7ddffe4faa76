use serde::Serialize;

use crate::quantity::Cents;

/// Cost components of one billed month, all in whole cents. Months fold into
/// a billing-window total by summation.
#[derive(Clone, Copy, Debug, Default, Serialize, derive_more::AddAssign)]
pub struct MonthCosts {
    pub rep_energy: Cents,
    pub rep_fixed: Cents,
    pub tdsp_delivery: Cents,
    pub tdsp_fixed: Cents,
    /// Applied bill credits, zero or negative.
    pub credits: Cents,
    pub minimum_fee: Cents,
    pub minimum_top_up: Cents,
}

impl MonthCosts {
    /// Total after every component.
    #[must_use]
    pub fn total(&self) -> Cents {
        self.rep_energy
            + self.rep_fixed
            + self.tdsp_delivery
            + self.tdsp_fixed
            + self.credits
            + self.minimum_fee
            + self.minimum_top_up
    }
}
