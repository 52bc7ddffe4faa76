use crate::{
    core::{
        compute::{BranchInputs, assemble_months, missing_buckets, modifiers},
        estimate::{
            Breakdown, Confidence, CostLine, DebugTrace, Estimate, Party, Status, reason,
        },
        usage::BucketKey,
    },
    quantity::CentsPerKwh,
};

/// Price a flat-rate plan. Without modifiers this is the annual fast path,
/// the only branch that reaches HIGH confidence. With credits or a minimum
/// rule the plan is priced month by month like every other bucketed kind.
#[must_use]
pub fn estimate(rate: CentsPerKwh, inputs: &BranchInputs<'_>) -> Estimate {
    if inputs.has_modifiers() { monthly(rate, inputs) } else { annual(rate, inputs) }
}

fn annual(rate: CentsPerKwh, inputs: &BranchInputs<'_>) -> Estimate {
    let rep_energy = inputs.annual_kwh * rate;
    let rep_fixed = inputs.rep_monthly_cents() * inputs.months;
    let tdsp_delivery = inputs.annual_kwh * inputs.tdsp.per_kwh_delivery;
    let tdsp_fixed = inputs.tdsp.monthly_customer_charge * inputs.months;

    let mut lines = vec![CostLine::new("REP energy", Party::Rep, rep_energy)];
    if !rep_fixed.is_zero() {
        lines.push(CostLine::new("REP monthly charge", Party::Rep, rep_fixed));
    }
    lines.push(CostLine::new("TDSP delivery", Party::Tdsp, tdsp_delivery));
    lines.push(CostLine::new("TDSP customer charge", Party::Tdsp, tdsp_fixed));
    let breakdown = Breakdown::from_lines(lines);
    let annual = breakdown.total;

    let mut notes = vec![format!("flat REP energy rate {rate}")];
    inputs.charge_notes(&mut notes);
    notes.push("no bill credits or minimum-usage rules disclosed".to_owned());

    Estimate {
        status: Status::Ok,
        reason: None,
        confidence: Confidence::High,
        annual_cost: Some(annual),
        monthly_cost: Some(annual.per_period(inputs.months)),
        breakdown: Some(breakdown),
        notes,
        debug: inputs.debug.then(|| DebugTrace::new("fixed")),
    }
}

fn monthly(rate: CentsPerKwh, inputs: &BranchInputs<'_>) -> Estimate {
    let Some(usage) = inputs.usage else {
        return Estimate::not_computable(reason::MISSING_USAGE_BUCKETS).with_note(
            "bill credits and minimum-usage rules require monthly usage buckets; none were supplied",
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
    for (month, month_usage) in months {
        let Some(total) = month_usage.total() else {
            missing.push(format!("{month}/{}", BucketKey::ALL_TOTAL));
            continue;
        };
        let mut costs = inputs.month_base(total, total * rate);
        tally.absorb(modifiers::apply(&mut costs, total, &inputs.credits, inputs.minimum.as_ref()));
        month_costs.push((month, costs));
    }
    if !missing.is_empty() {
        return missing_buckets(&missing);
    }

    let mut notes = vec![format!("flat REP energy rate {rate}, priced month by month")];
    inputs.charge_notes(&mut notes);
    tally.notes(inputs.months, !inputs.credits.is_empty(), &mut notes);
    assemble_months("fixed", &month_costs, inputs, notes)
}
