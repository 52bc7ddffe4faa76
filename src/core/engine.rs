//! The estimation entry point: validate → classify → extract → compute →
//! assemble. Pure and synchronous; the estimate is a deterministic function
//! of the inputs, safe to invoke concurrently without locking.

use std::fmt::{Display, Formatter};

use bon::Builder;

use crate::{
    core::{
        classify::{Classification, classify},
        compute::{BranchInputs, fixed, indexed, tiered, tou},
        estimate::{Estimate, reason},
        extract::{anchors, charges, credits, minimum},
        rate_structure::RateStructure,
        resolve::Resolution,
        tdsp::TdspRates,
        usage::UsageHistory,
    },
    prelude::*,
    quantity::{Cents, KilowattHours},
};

/// Policy for indexed/variable plans, whose true future cost is unknowable.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum IndexedMode {
    /// Refuse with `NON_DETERMINISTIC_PRICING_INDEXED`.
    #[default]
    Refuse,

    /// Opt in to a LOW-confidence approximation from disclosed anchors.
    Approximate(AnchorMethod),
}

/// How the average-price anchor is chosen for the household's usage.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum AnchorMethod {
    /// Anchor closest to the household's average monthly usage.
    #[default]
    Nearest,

    /// Piecewise-linear interpolation between bracketing anchors.
    Interpolate,
}

impl Display for AnchorMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Nearest => "nearest",
            Self::Interpolate => "interpolate",
        })
    }
}

/// One plan-cost estimation request.
#[derive(Builder)]
#[builder(finish_fn(vis = ""))]
pub struct Estimator<'a> {
    rate_structure: &'a RateStructure,
    tdsp: TdspRates,
    annual_kwh: KilowattHours,
    usage: Option<&'a UsageHistory>,

    /// Billing months covered by the estimate.
    #[builder(default = 12)]
    months: u32,

    #[builder(default)]
    indexed_mode: IndexedMode,

    /// Attach the non-contractual debug trace.
    #[builder(default)]
    debug: bool,
}

impl<S: estimator_builder::IsComplete> EstimatorBuilder<'_, S> {
    #[must_use]
    pub fn estimate(self) -> Estimate {
        self.build().run()
    }
}

impl Estimator<'_> {
    #[instrument(skip_all, fields(annual_kwh = %self.annual_kwh, months = self.months))]
    fn run(self) -> Estimate {
        if !self.annual_kwh.is_positive() {
            return Estimate::not_implemented(reason::INVALID_ANNUAL_KWH)
                .with_note(format!("annual usage must be positive, got {}", self.annual_kwh));
        }
        if self.months == 0 {
            return Estimate::not_implemented(reason::INVALID_MONTHS)
                .with_note("the estimate must cover at least one billing month");
        }

        let classification = classify(self.rate_structure);
        debug!(kind = classification.name(), "classified");

        match classification {
            Classification::Unsupported { detail } => Estimate::not_computable(format!(
                "{}: {detail}",
                reason::UNSUPPORTED_RATE_STRUCTURE,
            )),
            Classification::Indexed => match self.indexed_mode {
                IndexedMode::Refuse => indexed::refuse(),
                IndexedMode::Approximate(method) => {
                    let inputs = match self.branch_inputs() {
                        Ok(inputs) => inputs,
                        Err(refusal) => return *refusal,
                    };
                    match anchors::extract(self.rate_structure) {
                        Ok(anchors) => indexed::approximate(&anchors, method, &inputs),
                        Err(error) => Estimate::not_computable(format!(
                            "{}: {error:#}",
                            reason::UNSUPPORTED_RATE_STRUCTURE,
                        )),
                    }
                }
            },
            Classification::Fixed { rate } => {
                match self.branch_inputs() {
                    Ok(inputs) => fixed::estimate(rate, &inputs),
                    Err(refusal) => *refusal,
                }
            }
            Classification::TouLegacy { shape, schedule } => {
                match self.branch_inputs() {
                    Ok(inputs) => tou::estimate(Some(shape), &schedule, &inputs),
                    Err(refusal) => *refusal,
                }
            }
            Classification::TouWindowed { schedule } => {
                match self.branch_inputs() {
                    Ok(inputs) => tou::estimate(None, &schedule, &inputs),
                    Err(refusal) => *refusal,
                }
            }
            Classification::Tiered { schedule } => {
                match self.branch_inputs() {
                    Ok(inputs) => tiered::estimate(&schedule, &inputs),
                    Err(refusal) => *refusal,
                }
            }
        }
    }

    /// Extract the features shared by every computable kind. A malformed or
    /// ambiguous modifier is a refusal, never a silent skip.
    fn branch_inputs(&self) -> Result<BranchInputs<'_>, Box<Estimate>> {
        let rep_monthly = match charges::monthly_charge(self.rate_structure) {
            Resolution::Unique(dollars) => Some(Cents::from_dollars(dollars)),
            Resolution::Missing => None,
            Resolution::Ambiguous(values) => {
                return Err(Box::new(
                    Estimate::not_computable(reason::AMBIGUOUS_MONTHLY_CHARGE)
                        .with_note(format!("monthly charge aliases disagree: {values:?}")),
                ));
            }
        };

        let credits = match credits::extract(self.rate_structure) {
            Ok(credits::CreditsOutcome::Rules(rules)) => rules,
            Ok(credits::CreditsOutcome::NoCredits) => Vec::new(),
            Err(error) => {
                return Err(Box::new(Estimate::not_computable(format!(
                    "{}: {error:#}",
                    reason::UNSUPPORTED_RATE_STRUCTURE,
                ))));
            }
        };

        let minimum = match minimum::extract(self.rate_structure) {
            Ok(minimum::MinimumOutcome::Rule(rule)) => Some(rule),
            Ok(minimum::MinimumOutcome::NoMinimum) => None,
            Err(error) => {
                return Err(Box::new(Estimate::not_computable(format!(
                    "{}: {error:#}",
                    reason::UNSUPPORTED_RATE_STRUCTURE,
                ))));
            }
        };

        Ok(BranchInputs {
            annual_kwh: self.annual_kwh,
            months: self.months,
            tdsp: self.tdsp,
            rep_monthly,
            usage: self.usage,
            credits,
            minimum,
            debug: self.debug,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::core::estimate::{Confidence, Status};

    fn tdsp() -> TdspRates {
        TdspRates {
            per_kwh_delivery: crate::quantity::CentsPerKwh(4.2),
            monthly_customer_charge: Cents(500),
            effective_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        }
    }

    fn usage_from(value: serde_json::Value) -> UsageHistory {
        serde_json::from_value(value).unwrap()
    }

    fn day_night_plan() -> RateStructure {
        RateStructure(json!({"touPeriods": [
            {"dayType": "all", "start": "07:00", "end": "20:00", "rateCents": 18.0},
            {"dayType": "all", "start": "20:00", "end": "07:00", "rateCents": 9.0},
        ]}))
    }

    #[test]
    fn test_fixed_plan_scenario() {
        let plan = RateStructure(json!({"energyRateCents": 14.5}));
        let estimate = Estimator::builder()
            .rate_structure(&plan)
            .tdsp(tdsp())
            .annual_kwh(KilowattHours(12_000.0))
            .estimate();

        assert_eq!(estimate.status, Status::Ok);
        assert_eq!(estimate.confidence, Confidence::High);
        assert_eq!(estimate.annual_cost, Some(Cents(230_400)));
        assert_eq!(estimate.monthly_cost, Some(Cents(19_200)));

        let breakdown = estimate.breakdown.unwrap();
        assert_eq!(breakdown.rep_total, Cents(174_000));
        assert_eq!(breakdown.tdsp_total, Cents(56_400));
        let delivery =
            breakdown.lines.iter().find(|line| line.label == "TDSP delivery").unwrap();
        assert_eq!(delivery.amount, Cents(50_400));
        let customer_charge =
            breakdown.lines.iter().find(|line| line.label == "TDSP customer charge").unwrap();
        assert_eq!(customer_charge.amount, Cents(6000));
    }

    #[test]
    fn test_fixed_monthly_times_months_matches_annual() {
        for (annual_kwh, rate, months) in
            [(12_000.0, 14.5, 12), (9_137.0, 11.3, 12), (15_500.0, 9.9, 6)]
        {
            let plan = RateStructure(json!({"energyRateCents": rate}));
            let estimate = Estimator::builder()
                .rate_structure(&plan)
                .tdsp(tdsp())
                .annual_kwh(KilowattHours(annual_kwh))
                .months(months)
                .estimate();
            let annual = estimate.annual_cost.unwrap();
            let monthly = estimate.monthly_cost.unwrap();
            assert!((monthly * months - annual).0.abs() <= i64::from(months));
        }
    }

    #[test]
    fn test_identical_inputs_identical_output() {
        let plan = day_night_plan();
        let usage = usage_from(json!({"2025-06": {
            "kwh.m.all.0700-2000": 600.0,
            "kwh.m.all.2000-0700": 400.0,
            "kwh.m.all.total": 1000.0,
        }}));
        let run = || {
            serde_json::to_string(
                &Estimator::builder()
                    .rate_structure(&plan)
                    .tdsp(tdsp())
                    .annual_kwh(KilowattHours(12_000.0))
                    .usage(&usage)
                    .months(1)
                    .estimate(),
            )
            .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_tou_without_buckets_scenario() {
        let estimate = Estimator::builder()
            .rate_structure(&day_night_plan())
            .tdsp(tdsp())
            .annual_kwh(KilowattHours(12_000.0))
            .estimate();
        assert_eq!(estimate.status, Status::NotComputable);
        assert_eq!(estimate.reason.as_deref(), Some("MISSING_USAGE_BUCKETS"));
    }

    #[test]
    fn test_tou_day_night_reconciles_and_prices() {
        let usage = usage_from(json!({"2025-06": {
            "kwh.m.all.0700-2000": 600.0,
            "kwh.m.all.2000-0700": 400.0,
            "kwh.m.all.total": 1000.0,
        }}));
        let estimate = Estimator::builder()
            .rate_structure(&day_night_plan())
            .tdsp(tdsp())
            .annual_kwh(KilowattHours(12_000.0))
            .usage(&usage)
            .months(1)
            .estimate();

        assert_eq!(estimate.status, Status::Ok);
        assert_eq!(estimate.confidence, Confidence::Medium);
        // 600×18¢ + 400×9¢ = $144.00; delivery 1000×4.2¢ = $42.00; +$5.00.
        assert_eq!(estimate.annual_cost, Some(Cents(19_100)));
    }

    #[test]
    fn test_missing_period_buckets_enumerate_keys() {
        let usage = usage_from(json!({"2025-06": {"kwh.m.all.total": 1000.0}}));
        let estimate = Estimator::builder()
            .rate_structure(&day_night_plan())
            .tdsp(tdsp())
            .annual_kwh(KilowattHours(12_000.0))
            .usage(&usage)
            .months(1)
            .estimate();
        assert_eq!(estimate.reason.as_deref(), Some("MISSING_USAGE_BUCKETS"));
        let note = estimate.notes.join("\n");
        assert!(note.contains("2025-06/kwh.m.all.0700-2000"), "{note}");
        assert!(note.contains("2025-06/kwh.m.all.2000-0700"), "{note}");
    }

    #[test]
    fn test_bucket_sum_mismatch_scenario() {
        let plan = RateStructure(json!({"touPeriods": [
            {"dayType": "weekday", "start": 0, "end": 2400, "rateCents": 15.0},
            {"dayType": "weekend", "start": 0, "end": 2400, "rateCents": 5.0},
        ]}));
        let usage = usage_from(json!({"2025-06": {
            "kwh.m.weekday.total": 500.0,
            "kwh.m.weekend.total": 100.0,
            "kwh.m.all.total": 700.5,
        }}));
        let estimate = Estimator::builder()
            .rate_structure(&plan)
            .tdsp(tdsp())
            .annual_kwh(KilowattHours(12_000.0))
            .usage(&usage)
            .months(1)
            .estimate();
        assert_eq!(estimate.status, Status::NotComputable);
        assert!(
            estimate.reason.as_deref().unwrap().contains("USAGE_BUCKET_SUM_MISMATCH"),
            "{:?}",
            estimate.reason,
        );
    }

    #[test]
    fn test_tiered_insufficient_history_scenario() {
        let plan = RateStructure(json!({"tiers": [
            {"uptoKwh": 500, "rateCents": 15.0},
            {"rateCents": 10.0},
        ]}));
        let mut buckets = serde_json::Map::new();
        for month in 1..=6 {
            buckets.insert(
                format!("2025-{month:02}"),
                json!({"kwh.m.all.total": 900.0}),
            );
        }
        let usage = usage_from(serde_json::Value::Object(buckets));
        let estimate = Estimator::builder()
            .rate_structure(&plan)
            .tdsp(tdsp())
            .annual_kwh(KilowattHours(12_000.0))
            .usage(&usage)
            .months(12)
            .estimate();
        assert_eq!(estimate.status, Status::NotComputable);
        assert!(
            estimate.reason.as_deref().unwrap().contains("need 12 months, have 6"),
            "{:?}",
            estimate.reason,
        );
    }

    #[test]
    fn test_tiered_rejects_annual_only_usage() {
        let plan = RateStructure(json!({"tiers": [
            {"uptoKwh": 500, "rateCents": 15.0},
            {"rateCents": 10.0},
        ]}));
        let estimate = Estimator::builder()
            .rate_structure(&plan)
            .tdsp(tdsp())
            .annual_kwh(KilowattHours(12_000.0))
            .estimate();
        assert_eq!(
            estimate.reason.as_deref(),
            Some("tiered_pricing_requires_monthly_totals"),
        );
    }

    #[test]
    fn test_tiered_band_accumulation() {
        let plan = RateStructure(json!({"tiers": [
            {"uptoKwh": 500, "rateCents": 15.0},
            {"uptoKwh": 1000, "rateCents": 12.0},
            {"rateCents": 10.0},
        ]}));
        let usage = usage_from(json!({"2025-06": {"kwh.m.all.total": 1200.0}}));
        let estimate = Estimator::builder()
            .rate_structure(&plan)
            .tdsp(tdsp())
            .annual_kwh(KilowattHours(12_000.0))
            .usage(&usage)
            .months(1)
            .estimate();

        assert_eq!(estimate.status, Status::Ok);
        // 500×15¢ + 500×12¢ + 200×10¢ = $155.00; delivery $50.40; +$5.00.
        assert_eq!(estimate.annual_cost, Some(Cents(21_040)));
    }

    #[test]
    fn test_indexed_without_opt_in_scenario() {
        let plan = RateStructure(json!({"isIndexed": true, "avgPriceCents1000": 12.4}));
        let estimate = Estimator::builder()
            .rate_structure(&plan)
            .tdsp(tdsp())
            .annual_kwh(KilowattHours(12_000.0))
            .estimate();
        assert_eq!(estimate.status, Status::NotComputable);
        assert_eq!(estimate.reason.as_deref(), Some("NON_DETERMINISTIC_PRICING_INDEXED"));
    }

    #[test]
    fn test_indexed_opt_in_approximates() {
        let plan = RateStructure(json!({
            "isIndexed": true,
            "avgPriceCents500": 16.8,
            "avgPriceCents1000": 12.4,
            "avgPriceCents2000": 11.9,
        }));
        let estimate = Estimator::builder()
            .rate_structure(&plan)
            .tdsp(tdsp())
            .annual_kwh(KilowattHours(12_000.0))
            .indexed_mode(IndexedMode::Approximate(AnchorMethod::Nearest))
            .estimate();

        assert_eq!(estimate.status, Status::Approximate);
        assert_eq!(estimate.confidence, Confidence::Low);
        // 1000 kWh/month → the 1000 kWh anchor: 12000 × 12.4¢.
        assert_eq!(estimate.annual_cost, Some(Cents(148_800)));
        assert!(estimate.notes.iter().any(|note| note.contains("nearest")));
    }

    #[test]
    fn test_modifiers_respect_the_clamp_and_floor() {
        let plan = RateStructure(json!({
            "energyRateCents": 10.0,
            "billCredits": [{"minUsageKwh": 1000, "creditDollars": 30.0}],
            "minimumBillDollars": 35.0,
        }));
        let usage = usage_from(json!({
            "2025-05": {"kwh.m.all.total": 1200.0},
            "2025-06": {"kwh.m.all.total": 100.0},
        }));
        let estimate = Estimator::builder()
            .rate_structure(&plan)
            .tdsp(tdsp())
            .annual_kwh(KilowattHours(12_000.0))
            .usage(&usage)
            .months(2)
            .estimate();

        assert_eq!(estimate.status, Status::Ok);
        assert_eq!(estimate.confidence, Confidence::Medium);
        let breakdown = estimate.breakdown.unwrap();
        // May: $120 + $50.40 + $5 − $30 = $145.40. June: $10 + $4.20 + $5 =
        // $19.20, topped up to $35.00.
        assert_eq!(breakdown.total, Cents(18_040));
        assert!(breakdown.lines.iter().any(|line| line.label == "Minimum-bill top-up"));
    }

    #[test]
    fn test_modifiers_without_buckets_are_a_hard_failure() {
        let plan = RateStructure(json!({
            "energyRateCents": 10.0,
            "billCredits": [{"minUsageKwh": 1000, "creditDollars": 30.0}],
        }));
        let estimate = Estimator::builder()
            .rate_structure(&plan)
            .tdsp(tdsp())
            .annual_kwh(KilowattHours(12_000.0))
            .estimate();
        assert_eq!(estimate.status, Status::NotComputable);
        assert_eq!(estimate.reason.as_deref(), Some("MISSING_USAGE_BUCKETS"));
    }

    #[test]
    fn test_non_positive_annual_usage() {
        let plan = RateStructure(json!({"energyRateCents": 14.5}));
        let estimate = Estimator::builder()
            .rate_structure(&plan)
            .tdsp(tdsp())
            .annual_kwh(KilowattHours(0.0))
            .estimate();
        assert_eq!(estimate.status, Status::NotImplemented);
        assert_eq!(estimate.reason.as_deref(), Some("INVALID_ANNUAL_KWH"));
    }

    #[test]
    fn test_ambiguous_monthly_charge_refuses() {
        let plan = RateStructure(json!({
            "energyRateCents": 14.5,
            "baseChargeDollars": 4.95,
            "monthlyFeeDollars": 9.95,
        }));
        let estimate = Estimator::builder()
            .rate_structure(&plan)
            .tdsp(tdsp())
            .annual_kwh(KilowattHours(12_000.0))
            .estimate();
        assert_eq!(estimate.status, Status::NotComputable);
        assert_eq!(estimate.reason.as_deref(), Some("AMBIGUOUS_MONTHLY_CHARGE"));
    }

    #[test]
    fn test_debug_trace_is_attached_on_request() {
        let plan = RateStructure(json!({"energyRateCents": 14.5}));
        let builder = || {
            Estimator::builder()
                .rate_structure(&plan)
                .tdsp(tdsp())
                .annual_kwh(KilowattHours(12_000.0))
        };
        assert!(builder().estimate().debug.is_none());
        assert!(builder().debug(true).estimate().debug.is_some());
    }
}
