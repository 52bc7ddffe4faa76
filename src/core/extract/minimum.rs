use crate::{
    core::{
        rate_structure::RateStructure,
        resolve::{Sanity, resolve},
    },
    prelude::*,
    quantity::{Cents, KilowattHours},
};

/// Per-month floor applied after credits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MinimumRule {
    /// Flat fee charged when the month's usage stays below the threshold.
    UsageFee { below: KilowattHours, fee: Cents },

    /// Top-up raising the month's subtotal to a contractual floor.
    TopUp { floor: Cents },
}

/// Outcome of minimum-rule extraction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MinimumOutcome {
    Rule(MinimumRule),
    NoMinimum,
}

const FEE_ALIASES: &[&str] =
    &["minUsageFeeDollars", "min_usage_fee_dollars", "lowUsageFeeDollars"];
const FEE_THRESHOLD_ALIASES: &[&str] =
    &["minUsageThresholdKwh", "min_usage_threshold_kwh", "minUsageKwh"];
const FLOOR_ALIASES: &[&str] =
    &["minimumMonthlyDollars", "minimum_monthly_dollars", "minimumBillDollars"];

pub fn extract(structure: &RateStructure) -> Result<MinimumOutcome> {
    let fee = resolve(structure.numeric_candidates(FEE_ALIASES), Sanity::MONTHLY_CHARGE_DOLLARS);
    let floor = resolve(structure.numeric_candidates(FLOOR_ALIASES), Sanity::MONTHLY_CHARGE_DOLLARS);
    ensure!(!fee.is_ambiguous(), "ambiguous minimum-usage fee");
    ensure!(!floor.is_ambiguous(), "ambiguous minimum monthly floor");

    match (fee.unique(), floor.unique()) {
        (Some(_), Some(_)) => bail!("both a minimum-usage fee and a monthly floor are declared"),
        (Some(fee), None) => {
            let threshold = resolve(
                structure.numeric_candidates(FEE_THRESHOLD_ALIASES),
                Sanity::USAGE_THRESHOLD_KWH,
            );
            ensure!(!threshold.is_ambiguous(), "ambiguous minimum-usage threshold");
            let below = threshold.unique().context("minimum-usage fee without a usage threshold")?;
            Ok(MinimumOutcome::Rule(MinimumRule::UsageFee {
                below: KilowattHours(below),
                fee: Cents::from_dollars(fee),
            }))
        }
        (None, Some(floor)) => {
            Ok(MinimumOutcome::Rule(MinimumRule::TopUp { floor: Cents::from_dollars(floor) }))
        }
        (None, None) => Ok(MinimumOutcome::NoMinimum),
    }
}
