//! Bill credits and minimum-usage rules, applied per month in the
//! contractual order: subtotal → credits → clamp ≥ 0 → minimum rule.

use crate::{
    core::{
        accumulator::MonthCosts,
        extract::{credits::CreditRule, minimum::MinimumRule},
    },
    quantity::{Cents, KilowattHours},
};

/// What the modifiers did to one month.
#[derive(Clone, Copy, Debug, Default)]
pub struct Effects {
    pub credited: bool,
    pub clamped: bool,
    pub fee_charged: bool,
    pub topped_up: bool,
}

/// Apply credits then the minimum rule to one month's costs.
pub fn apply(
    costs: &mut MonthCosts,
    usage: KilowattHours,
    credits: &[CreditRule],
    minimum: Option<&MinimumRule>,
) -> Effects {
    let mut effects = Effects::default();

    let earned: Cents =
        credits.iter().filter(|rule| rule.applies_to(usage)).map(|rule| rule.amount).sum();
    if earned > Cents::ZERO {
        // A credit never drives the month negative; the applied credit is
        // shortened instead so the breakdown still sums exactly.
        let applied = earned.min(costs.total().clamp_non_negative());
        costs.credits = -applied;
        effects.credited = true;
        effects.clamped = applied < earned;
    }

    match minimum {
        Some(MinimumRule::UsageFee { below, fee }) => {
            if usage.0 < below.0 {
                costs.minimum_fee = *fee;
                effects.fee_charged = true;
            }
        }
        Some(MinimumRule::TopUp { floor }) => {
            let subtotal = costs.total();
            if subtotal < *floor {
                costs.minimum_top_up = *floor - subtotal;
                effects.topped_up = true;
            }
        }
        None => {}
    }
    effects
}

/// Modifier effects tallied across the billing window.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tally {
    pub credited: u32,
    pub clamped: u32,
    pub fee_charged: u32,
    pub topped_up: u32,
}

impl Tally {
    pub fn absorb(&mut self, effects: Effects) {
        self.credited += u32::from(effects.credited);
        self.clamped += u32::from(effects.clamped);
        self.fee_charged += u32::from(effects.fee_charged);
        self.topped_up += u32::from(effects.topped_up);
    }

    /// Audit notes for the billing window.
    pub fn notes(&self, months: u32, credits_declared: bool, notes: &mut Vec<String>) {
        if self.credited > 0 {
            notes.push(format!("bill credit earned in {} of {months} months", self.credited));
        } else if credits_declared {
            notes.push("bill credits disclosed but never earned at this usage".to_owned());
        }
        if self.clamped > 0 {
            notes.push(format!("credit shortened to keep {} months non-negative", self.clamped));
        }
        if self.fee_charged > 0 {
            notes.push(format!("minimum-usage fee charged in {} of {months} months", self.fee_charged));
        }
        if self.topped_up > 0 {
            notes.push(format!(
                "bill topped up to the contractual minimum in {} of {months} months",
                self.topped_up,
            ));
        }
    }
}
