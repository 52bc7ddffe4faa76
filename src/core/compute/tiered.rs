use crate::core::{
    compute::{BranchInputs, assemble_months, missing_buckets, modifiers},
    estimate::{Estimate, reason},
    extract::tiers::TierSchedule,
    usage::BucketKey,
};
use crate::quantity::Cents;

/// Price a tiered (kWh-block) plan. Thresholds reset every billing period,
/// so per-month totals are mandatory; annual-only usage is rejected.
#[must_use]
pub fn estimate(schedule: &TierSchedule, inputs: &BranchInputs<'_>) -> Estimate {
    let Some(usage) = inputs.usage else {
        return Estimate::not_computable(reason::TIERED_REQUIRES_MONTHLY_TOTALS).with_note(
            "tier thresholds reset every billing period; an annual total cannot be priced",
        );
    };
    let months = match usage.trailing_months(inputs.months) {
        Ok(months) => months,
        Err(shortfall) => {
            return Estimate::not_computable(format!(
                "{}: {shortfall}",
                reason::INSUFFICIENT_USAGE_HISTORY,
            ));
        }
    };

    let mut missing = Vec::new();
    let mut month_costs = Vec::with_capacity(months.len());
    let mut tally = modifiers::Tally::default();
    let mut overflowed = 0_u32;
    for (month, month_usage) in months {
        let Some(total) = month_usage.total() else {
            missing.push(format!("{month}/{}", BucketKey::ALL_TOTAL));
            continue;
        };

        let rep_energy: Cents =
            schedule.split(total).into_iter().map(|(band, kwh)| kwh * band.rate).sum();
        if !schedule.covers(total) {
            overflowed += 1;
        }

        let mut costs = inputs.month_base(total, rep_energy);
        tally.absorb(modifiers::apply(&mut costs, total, &inputs.credits, inputs.minimum.as_ref()));
        month_costs.push((month, costs));
    }
    if !missing.is_empty() {
        return missing_buckets(&missing);
    }

    let mut notes = vec![format!("{} kWh blocks priced per billing month", schedule.0.len())];
    if overflowed > 0 {
        notes.push(format!(
            "usage beyond the final declared block charged at its rate in {overflowed} months",
        ));
    }
    inputs.charge_notes(&mut notes);
    tally.notes(inputs.months, !inputs.credits.is_empty(), &mut notes);
    assemble_months("tiered", &month_costs, inputs, notes)
}
