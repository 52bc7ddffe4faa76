use crate::{
    core::{
        compute::{BranchInputs, assemble_months, missing_buckets, modifiers},
        estimate::{Estimate, reason},
        extract::tou::{LegacyShape, TouSchedule},
        usage::{BucketKey, LEGACY_SUM_EPSILON, WINDOWED_SUM_EPSILON, reconcile},
    },
    quantity::{Cents, KilowattHours},
};

/// Price a time-of-use plan, legacy or windowed, against monthly usage
/// buckets. The only difference between the two is the reconciliation
/// tolerance; both derive their required bucket keys from the schedule.
#[must_use]
pub fn estimate(
    shape: Option<LegacyShape>,
    schedule: &TouSchedule,
    inputs: &BranchInputs<'_>,
) -> Estimate {
    let keys = match schedule.bucket_keys() {
        Ok(keys) => keys,
        Err(error) => {
            return Estimate::not_computable(format!(
                "{}: {error:#}",
                reason::UNSUPPORTED_RATE_STRUCTURE,
            ));
        }
    };
    let epsilon = if shape.is_some() { LEGACY_SUM_EPSILON } else { WINDOWED_SUM_EPSILON };

    let Some(usage) = inputs.usage else {
        return Estimate::not_computable(reason::MISSING_USAGE_BUCKETS)
            .with_note("time-of-use pricing requires monthly usage buckets; none were supplied");
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
    for (month, month_usage) in months {
        let mut parts = KilowattHours::ZERO;
        let mut rep_energy = Cents::ZERO;
        let mut complete = true;

        for (period, key) in schedule.0.iter().zip(&keys) {
            match month_usage.get(*key) {
                Some(kwh) => {
                    parts += kwh;
                    rep_energy += kwh * period.rate;
                }
                None => {
                    missing.push(format!("{month}/{key}"));
                    complete = false;
                }
            }
        }
        let Some(total) = month_usage.total() else {
            missing.push(format!("{month}/{}", BucketKey::ALL_TOTAL));
            continue;
        };
        if !complete {
            continue;
        }

        if let Err(mismatch) = reconcile(month, parts, total, epsilon) {
            return Estimate::not_computable(format!(
                "{}: {mismatch}",
                reason::USAGE_BUCKET_SUM_MISMATCH,
            ));
        }

        let mut costs = inputs.month_base(total, rep_energy);
        tally.absorb(modifiers::apply(&mut costs, total, &inputs.credits, inputs.minimum.as_ref()));
        month_costs.push((month, costs));
    }
    if !missing.is_empty() {
        return missing_buckets(&missing);
    }

    let kind = match shape {
        Some(LegacyShape::DayNightAllDays) => "tou-legacy-day-night",
        Some(LegacyShape::WeekdayWeekendAllDay) => "tou-legacy-weekday-weekend",
        None => "tou-windowed",
    };
    let mut notes = vec![format!("{} time-of-use periods priced against usage buckets", schedule.0.len())];
    inputs.charge_notes(&mut notes);
    tally.notes(inputs.months, !inputs.credits.is_empty(), &mut notes);
    assemble_months(kind, &month_costs, inputs, notes)
}
