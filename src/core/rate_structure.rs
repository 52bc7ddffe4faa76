use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pricing-rule blob from the upstream EFL parsing pipeline.
///
/// The schema is evolving and the same concept is persisted under multiple
/// historical field names, so this wrapper never assumes a canonical shape.
/// Callers collect candidates across aliases and resolve them under the
/// exactly-one discipline of [`crate::core::resolve`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, derive_more::From)]
pub struct RateStructure(pub Value);

impl RateStructure {
    fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Collect raw numeric candidates across field aliases. A candidate is a
    /// JSON number or a numeric string; anything else is ignored.
    #[must_use]
    pub fn numeric_candidates(&self, aliases: &[&str]) -> Vec<f64> {
        aliases.iter().filter_map(|alias| self.field(alias)).filter_map(as_number).collect()
    }

    /// Whether any alias carries an explicit `true`.
    #[must_use]
    pub fn flag(&self, aliases: &[&str]) -> bool {
        aliases
            .iter()
            .filter_map(|alias| self.field(alias))
            .any(|value| value.as_bool() == Some(true))
    }

    /// First non-empty string among the aliases.
    #[must_use]
    pub fn text(&self, aliases: &[&str]) -> Option<&str> {
        aliases
            .iter()
            .filter_map(|alias| self.field(alias))
            .filter_map(Value::as_str)
            .find(|text| !text.is_empty())
    }

    /// First non-empty array among the aliases.
    #[must_use]
    pub fn array(&self, aliases: &[&str]) -> Option<&Vec<Value>> {
        aliases
            .iter()
            .filter_map(|alias| self.field(alias))
            .filter_map(Value::as_array)
            .find(|array| !array.is_empty())
    }
}

/// Tolerant numeric read: JSON numbers and numeric strings both count, since
/// older pipeline versions stringified every rate.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
