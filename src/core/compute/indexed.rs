use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::{
    core::{
        compute::BranchInputs,
        engine::AnchorMethod,
        estimate::{
            Breakdown, Confidence, CostLine, DebugTrace, Estimate, Party, Status, reason,
        },
        extract::anchors::PriceAnchor,
    },
    quantity::{CentsPerKwh, KilowattHours},
};

/// The default stance on indexed/variable plans: their true future cost is
/// unknowable, so the answer is a deterministic refusal.
#[must_use]
pub fn refuse() -> Estimate {
    Estimate::not_computable(reason::NON_DETERMINISTIC_PRICING_INDEXED)
        .with_note("indexed pricing depends on future index values; opt in to an anchor method for a rough estimate")
}

/// Opt-in approximation from disclosed average-price anchors. Always
/// APPROXIMATE at LOW confidence, with the method and raw anchors surfaced
/// for audit.
#[must_use]
pub fn approximate(
    anchors: &[PriceAnchor],
    method: AnchorMethod,
    inputs: &BranchInputs<'_>,
) -> Estimate {
    if anchors.is_empty() {
        return Estimate::not_computable(reason::MISSING_PRICE_ANCHORS)
            .with_note("no disclosed average-price anchors to approximate from");
    }

    let monthly_kwh = KilowattHours(inputs.annual_kwh.0 / 12.0);
    let price = select(anchors, monthly_kwh, method);
    let energy = inputs.annual_kwh * price;

    let breakdown = Breakdown::from_lines(vec![CostLine::new(
        "Indexed energy (all-in average price)",
        Party::Rep,
        energy,
    )]);
    let annual = breakdown.total;

    let anchor_list = anchors
        .iter()
        .map(|anchor| format!("{:.0} kWh → {}", anchor.reference.0, anchor.price))
        .join(", ");
    let mut notes = vec![
        format!("approximated with the {method} anchor method at {price} for {monthly_kwh}/month"),
        format!("disclosed anchors: {anchor_list}"),
        "anchor prices are all-in averages; TDSP delivery is not broken out".to_owned(),
    ];
    if inputs.has_modifiers() {
        notes.push(
            "disclosed credits and minimum rules are already reflected in the anchor averages"
                .to_owned(),
        );
    }

    let debug = inputs.debug.then(|| {
        let mut trace = DebugTrace::new("indexed");
        trace.anchors =
            anchors.iter().map(|anchor| format!("{anchor:?}")).collect();
        trace
    });

    Estimate {
        status: Status::Approximate,
        reason: None,
        confidence: Confidence::Low,
        annual_cost: Some(annual),
        monthly_cost: Some(annual.per_period(inputs.months)),
        breakdown: Some(breakdown),
        notes,
        debug,
    }
}

/// Choose the anchor price for the household's average monthly usage.
fn select(anchors: &[PriceAnchor], monthly_kwh: KilowattHours, method: AnchorMethod) -> CentsPerKwh {
    match method {
        AnchorMethod::Nearest => {
            anchors
                .iter()
                .min_by_key(|anchor| OrderedFloat((anchor.reference.0 - monthly_kwh.0).abs()))
                .map(|anchor| anchor.price)
                .unwrap()
        }
        AnchorMethod::Interpolate => interpolate(anchors, monthly_kwh),
    }
}

/// Piecewise-linear interpolation over the anchors, clamped at both ends.
fn interpolate(anchors: &[PriceAnchor], monthly_kwh: KilowattHours) -> CentsPerKwh {
    let first = anchors.first().unwrap();
    let last = anchors.last().unwrap();
    if monthly_kwh.0 <= first.reference.0 {
        return first.price;
    }
    if monthly_kwh.0 >= last.reference.0 {
        return last.price;
    }
    for (lower, upper) in anchors.iter().tuple_windows() {
        if monthly_kwh.0 <= upper.reference.0 {
            let span = upper.reference.0 - lower.reference.0;
            let weight = (monthly_kwh.0 - lower.reference.0) / span;
            return CentsPerKwh(lower.price.0 + weight * (upper.price.0 - lower.price.0));
        }
    }
    last.price
}
