use serde::Deserialize;
use serde_json::Value;

use crate::{
    core::{
        rate_structure::{RateStructure, as_number},
        resolve::Sanity,
    },
    prelude::*,
    quantity::{Cents, KilowattHours},
};

/// A usage-threshold bill credit: `amount` is earned in months whose total
/// usage falls within `[min_usage, max_usage)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CreditRule {
    pub min_usage: KilowattHours,
    pub max_usage: Option<KilowattHours>,
    pub amount: Cents,
}

impl CreditRule {
    #[must_use]
    pub fn applies_to(&self, usage: KilowattHours) -> bool {
        usage.0 >= self.min_usage.0 && self.max_usage.is_none_or(|max| usage.0 < max.0)
    }
}

/// Outcome of bill-credit extraction. Malformed rules are an error, never a
/// silent skip.
#[derive(Clone, Debug, PartialEq)]
pub enum CreditsOutcome {
    Rules(Vec<CreditRule>),
    NoCredits,
}

pub const CREDIT_ARRAY_ALIASES: &[&str] =
    &["billCredits", "bill_credits", "usageCredits", "credits"];

pub fn extract(structure: &RateStructure) -> Result<CreditsOutcome> {
    let Some(array) = structure.array(CREDIT_ARRAY_ALIASES) else {
        return Ok(CreditsOutcome::NoCredits);
    };
    let rules: Vec<CreditRule> = array.iter().map(parse_rule).collect::<Result<_>>()?;
    Ok(CreditsOutcome::Rules(rules))
}

#[derive(Deserialize)]
struct RawCredit {
    #[serde(
        rename = "minUsageKwh",
        alias = "min_usage_kwh",
        alias = "thresholdKwh",
        alias = "usageKwh"
    )]
    min_usage: Value,

    #[serde(default, rename = "maxUsageKwh", alias = "max_usage_kwh")]
    max_usage: Option<Value>,

    #[serde(default, rename = "creditDollars", alias = "credit_dollars", alias = "amountDollars")]
    dollars: Option<Value>,

    #[serde(default, rename = "creditCents", alias = "credit_cents")]
    cents: Option<Value>,
}

fn parse_rule(value: &Value) -> Result<CreditRule> {
    let raw: RawCredit = serde_json::from_value(value.clone()).context("malformed bill credit")?;

    let min_usage = as_number(&raw.min_usage).context("non-numeric credit threshold")?;
    ensure!(
        Sanity::USAGE_THRESHOLD_KWH.admits(min_usage),
        "credit threshold out of range: {min_usage}"
    );

    let max_usage = match &raw.max_usage {
        None | Some(Value::Null) => None,
        Some(value) => {
            let max_usage = as_number(value).context("non-numeric credit ceiling")?;
            ensure!(max_usage > min_usage, "credit ceiling below its threshold");
            Some(KilowattHours(max_usage))
        }
    };

    let amount = match (&raw.dollars, &raw.cents) {
        (Some(dollars), None) => {
            let dollars = as_number(dollars).context("non-numeric credit amount")?;
            ensure!(Sanity::MONTHLY_CHARGE_DOLLARS.admits(dollars), "credit amount out of range");
            Cents::from_dollars(dollars)
        }
        (None, Some(cents)) => {
            let cents = as_number(cents).context("non-numeric credit amount")?;
            ensure!(
                Sanity::MONTHLY_CHARGE_DOLLARS.admits(cents / 100.0),
                "credit amount out of range"
            );
            Cents::from_fractional(cents)
        }
        (Some(_), Some(_)) => bail!("credit amount spelled in both dollars and cents"),
        (None, None) => bail!("credit without an amount"),
    };

    Ok(CreditRule { min_usage: KilowattHours(min_usage), max_usage, amount })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_threshold_rule() {
        let outcome = extract(&RateStructure(json!({"billCredits": [
            {"minUsageKwh": 1000, "creditDollars": 30.0},
        ]})))
        .unwrap();
        let CreditsOutcome::Rules(rules) = outcome else {
            panic!("expected rules");
        };
        assert_eq!(rules[0].amount, Cents(3000));
        assert!(!rules[0].applies_to(KilowattHours(999.0)));
        assert!(rules[0].applies_to(KilowattHours(1000.0)));
    }

    #[test]
    fn test_banded_rule() {
        let outcome = extract(&RateStructure(json!({"usageCredits": [
            {"minUsageKwh": 500, "maxUsageKwh": 1500, "creditCents": 2500},
        ]})))
        .unwrap();
        let CreditsOutcome::Rules(rules) = outcome else {
            panic!("expected rules");
        };
        assert!(rules[0].applies_to(KilowattHours(500.0)));
        assert!(!rules[0].applies_to(KilowattHours(1500.0)));
    }

    #[test]
    fn test_absent_is_no_credits() {
        assert_eq!(extract(&RateStructure(json!({}))).unwrap(), CreditsOutcome::NoCredits);
    }

    #[test]
    fn test_double_spelled_amount_is_an_error() {
        let result = extract(&RateStructure(json!({"credits": [
            {"minUsageKwh": 1000, "creditDollars": 30.0, "creditCents": 3000},
        ]})));
        assert!(result.is_err());
    }
}
