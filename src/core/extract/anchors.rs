use crate::{
    core::{
        rate_structure::RateStructure,
        resolve::{Resolution, Sanity, resolve},
    },
    prelude::*,
    quantity::{CentsPerKwh, KilowattHours},
};

/// Disclosed average-price anchor: the all-in ¢/kWh an EFL quotes at a
/// monthly reference usage level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriceAnchor {
    pub reference: KilowattHours,
    pub price: CentsPerKwh,
}

const ANCHOR_ALIASES: &[(f64, &[&str])] = &[
    (500.0, &["avgPriceCents500", "avg_price_cents_500", "averagePriceCentsAt500"]),
    (1000.0, &["avgPriceCents1000", "avg_price_cents_1000", "averagePriceCentsAt1000"]),
    (2000.0, &["avgPriceCents2000", "avg_price_cents_2000", "averagePriceCentsAt2000"]),
];

/// Extract the disclosed anchors in ascending reference order, each under
/// the exactly-one discipline. One ambiguous anchor poisons the whole set.
pub fn extract(structure: &RateStructure) -> Result<Vec<PriceAnchor>> {
    let mut anchors = Vec::with_capacity(ANCHOR_ALIASES.len());
    for (reference, aliases) in ANCHOR_ALIASES {
        match resolve(structure.numeric_candidates(aliases), Sanity::ENERGY_RATE_CENTS) {
            Resolution::Missing => {}
            Resolution::Unique(price) => anchors.push(PriceAnchor {
                reference: KilowattHours(*reference),
                price: CentsPerKwh(price),
            }),
            Resolution::Ambiguous(values) => {
                bail!("ambiguous {reference} kWh price anchor: {values:?}")
            }
        }
    }
    Ok(anchors)
}
