use crate::core::{
    rate_structure::RateStructure,
    resolve::{Resolution, Sanity, resolve},
};

/// Historical spellings of the flat REP energy rate.
pub const ENERGY_RATE_ALIASES: &[&str] = &[
    "energyRateCents",
    "energy_rate_cents",
    "energyChargeCents",
    "rateCents",
    "centsPerKwh",
    "priceCentsPerKwh",
];

const MONTHLY_CHARGE_ALIASES: &[&str] = &[
    "baseChargeDollars",
    "base_charge_dollars",
    "monthlyFeeDollars",
    "repMonthlyChargeDollars",
    "fixedMonthlyDollars",
];

/// Flat REP energy rate in cents per kilowatt-hour.
#[must_use]
pub fn energy_rate(structure: &RateStructure) -> Resolution {
    resolve(structure.numeric_candidates(ENERGY_RATE_ALIASES), Sanity::ENERGY_RATE_CENTS)
}

/// Recurring REP monthly charge in dollars. `Missing` is a valid outcome
/// (callers assume zero and note it); `Ambiguous` is terminal.
#[must_use]
pub fn monthly_charge(structure: &RateStructure) -> Resolution {
    resolve(structure.numeric_candidates(MONTHLY_CHARGE_ALIASES), Sanity::MONTHLY_CHARGE_DOLLARS)
}
