//! Per-kind cost branches. Each branch folds usage and extracted features
//! into per-month cost records and assembles the final estimate.

pub mod fixed;
pub mod indexed;
pub mod modifiers;
pub mod tiered;
pub mod tou;

use itertools::Itertools;

use crate::{
    core::{
        accumulator::MonthCosts,
        estimate::{Breakdown, Confidence, CostLine, DebugTrace, Estimate, Party, Status, reason},
        extract::{credits::CreditRule, minimum::MinimumRule},
        tdsp::TdspRates,
        usage::{MonthKey, UsageHistory},
    },
    quantity::{Cents, KilowattHours},
};

/// Inputs shared by every cost branch.
pub struct BranchInputs<'a> {
    pub annual_kwh: KilowattHours,
    pub months: u32,
    pub tdsp: TdspRates,
    /// Recurring REP monthly charge; `None` means not disclosed.
    pub rep_monthly: Option<Cents>,
    pub usage: Option<&'a UsageHistory>,
    pub credits: Vec<CreditRule>,
    pub minimum: Option<MinimumRule>,
    pub debug: bool,
}

impl BranchInputs<'_> {
    #[must_use]
    pub fn has_modifiers(&self) -> bool {
        !self.credits.is_empty() || self.minimum.is_some()
    }

    #[must_use]
    pub fn rep_monthly_cents(&self) -> Cents {
        self.rep_monthly.unwrap_or(Cents::ZERO)
    }

    /// Base charges of one month, before modifiers.
    #[must_use]
    pub fn month_base(&self, total: KilowattHours, rep_energy: Cents) -> MonthCosts {
        MonthCosts {
            rep_energy,
            rep_fixed: self.rep_monthly_cents(),
            tdsp_delivery: total * self.tdsp.per_kwh_delivery,
            tdsp_fixed: self.tdsp.monthly_customer_charge,
            ..MonthCosts::default()
        }
    }

    /// Audit notes about which recurring charges were included vs assumed
    /// zero, so the comparison product never re-derives "why this number".
    pub fn charge_notes(&self, notes: &mut Vec<String>) {
        match self.rep_monthly {
            Some(charge) if !charge.is_zero() => {
                notes.push(format!("REP monthly charge {charge} included"));
            }
            Some(_) => notes.push("REP monthly charge disclosed as $0.00".to_owned()),
            None => notes.push("REP monthly charge assumed $0.00 (not disclosed)".to_owned()),
        }
        notes.push(format!(
            "TDSP delivery at {} plus {}/month, tariff effective {}",
            self.tdsp.per_kwh_delivery,
            self.tdsp.monthly_customer_charge,
            self.tdsp.effective_date,
        ));
    }
}

/// `MISSING_USAGE_BUCKETS` with the offending keys enumerated: the first 12,
/// then an ellipsis.
#[must_use]
pub fn missing_buckets(keys: &[String]) -> Estimate {
    let listed = keys.iter().take(12).join(", ");
    let suffix = if keys.len() > 12 { ", …" } else { "" };
    Estimate::not_computable(reason::MISSING_USAGE_BUCKETS)
        .with_note(format!("missing usage buckets: {listed}{suffix}"))
}

/// Fold per-month cost records into the flat breakdown with the REP/TDSP
/// split, at MEDIUM confidence (every bucketed path carries reconciliation
/// risk that the flat fast path does not).
#[must_use]
pub fn assemble_months(
    kind: &str,
    month_costs: &[(MonthKey, MonthCosts)],
    inputs: &BranchInputs<'_>,
    notes: Vec<String>,
) -> Estimate {
    let mut folded = MonthCosts::default();
    for (_, costs) in month_costs {
        folded += *costs;
    }

    let mut lines = vec![CostLine::new("REP energy", Party::Rep, folded.rep_energy)];
    if !folded.rep_fixed.is_zero() {
        lines.push(CostLine::new("REP monthly charge", Party::Rep, folded.rep_fixed));
    }
    if !folded.credits.is_zero() {
        lines.push(CostLine::new("Bill credits", Party::Rep, folded.credits));
    }
    if !folded.minimum_fee.is_zero() {
        lines.push(CostLine::new("Minimum-usage fee", Party::Rep, folded.minimum_fee));
    }
    if !folded.minimum_top_up.is_zero() {
        lines.push(CostLine::new("Minimum-bill top-up", Party::Rep, folded.minimum_top_up));
    }
    lines.push(CostLine::new("TDSP delivery", Party::Tdsp, folded.tdsp_delivery));
    lines.push(CostLine::new("TDSP customer charge", Party::Tdsp, folded.tdsp_fixed));

    let breakdown = Breakdown::from_lines(lines);
    let annual = breakdown.total;

    let debug = inputs.debug.then(|| {
        let mut trace = DebugTrace::new(kind);
        for (month, costs) in month_costs {
            trace.months.push(month.to_string());
            trace.month_costs.push(*costs);
        }
        trace
    });

    #[allow(clippy::cast_possible_truncation)]
    let months = month_costs.len() as u32;
    Estimate {
        status: Status::Ok,
        reason: None,
        confidence: Confidence::Medium,
        annual_cost: Some(annual),
        monthly_cost: Some(annual.per_period(months)),
        breakdown: Some(breakdown),
        notes,
        debug,
    }
}
