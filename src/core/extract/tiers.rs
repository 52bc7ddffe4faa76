use serde::Deserialize;
use serde_json::Value;

use crate::{
    core::{
        rate_structure::{RateStructure, as_number},
        resolve::Sanity,
    },
    prelude::*,
    quantity::{CentsPerKwh, KilowattHours},
};

/// One kWh block with its own REP rate. `up_to` is the band's upper bound
/// within a billing month; `None` marks the open final band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TierBand {
    pub up_to: Option<KilowattHours>,
    pub rate: CentsPerKwh,
}

/// Ascending kWh blocks. Thresholds reset every billing period.
#[derive(Clone, Debug, PartialEq)]
pub struct TierSchedule(pub Vec<TierBand>);

pub const TIER_ARRAY_ALIASES: &[&str] =
    &["tiers", "usageTiers", "usage_tiers", "kwhBlocks", "blocks"];

impl TierSchedule {
    /// Parse the first present block array; `Ok(None)` when the structure
    /// carries no block array at all.
    pub fn from_structure(structure: &RateStructure) -> Result<Option<Self>> {
        let Some(array) = structure.array(TIER_ARRAY_ALIASES) else {
            return Ok(None);
        };
        let bands: Vec<TierBand> = array.iter().map(parse_band).collect::<Result<_>>()?;

        let mut previous = 0.0;
        for (index, band) in bands.iter().enumerate() {
            match band.up_to {
                Some(up_to) => {
                    ensure!(up_to.0 > previous, "tier thresholds must ascend strictly");
                    previous = up_to.0;
                }
                None => {
                    ensure!(index == bands.len() - 1, "only the final tier may be open-ended");
                }
            }
        }
        Ok(Some(Self(bands)))
    }

    /// Whether the month total falls inside the declared bands.
    #[must_use]
    pub fn covers(&self, total: KilowattHours) -> bool {
        self.0.last().is_some_and(|band| band.up_to.is_none_or(|up_to| total.0 <= up_to.0))
    }

    /// Split a month total across the bands, in band order. Usage beyond a
    /// bounded final band stays in that band; callers note it via
    /// [`Self::covers`].
    #[must_use]
    pub fn split(&self, total: KilowattHours) -> Vec<(TierBand, KilowattHours)> {
        let mut lower = 0.0;
        let mut slices = Vec::with_capacity(self.0.len());
        for (index, band) in self.0.iter().enumerate() {
            let upper = match band.up_to {
                Some(up_to) if index < self.0.len() - 1 => up_to.0,
                _ => f64::INFINITY,
            };
            let in_band = (total.0.min(upper) - lower).max(0.0);
            if in_band > 0.0 {
                slices.push((*band, KilowattHours(in_band)));
            }
            lower = upper;
        }
        slices
    }
}

#[derive(Deserialize)]
struct RawBand {
    #[serde(
        default,
        rename = "uptoKwh",
        alias = "upto_kwh",
        alias = "maxKwh",
        alias = "thresholdKwh"
    )]
    up_to: Option<Value>,

    #[serde(rename = "rateCents", alias = "rate_cents", alias = "centsPerKwh", alias = "priceCents")]
    rate: Value,
}

fn parse_band(value: &Value) -> Result<TierBand> {
    let raw: RawBand = serde_json::from_value(value.clone()).context("malformed tier block")?;
    let rate = as_number(&raw.rate).context("non-numeric tier rate")?;
    ensure!(Sanity::ENERGY_RATE_CENTS.admits(rate), "tier rate out of range: {rate}");

    let up_to = match &raw.up_to {
        None | Some(Value::Null) => None,
        Some(value) => {
            let up_to = as_number(value).context("non-numeric tier threshold")?;
            ensure!(Sanity::USAGE_THRESHOLD_KWH.admits(up_to), "tier threshold out of range: {up_to}");
            Some(KilowattHours(up_to))
        }
    };
    Ok(TierBand { up_to, rate: CentsPerKwh(rate) })
}
