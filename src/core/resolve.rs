//! The exactly-one-confident-value resolver.
//!
//! The same quantity is historically persisted under multiple field names.
//! When the aliases disagree, the data is stale or ambiguous and must not be
//! silently resolved, so every extractor funnels its candidates through
//! [`resolve`]: exactly one distinct sane value survives, or nothing does.

use itertools::Itertools;

/// Domain sanity range for a resolved value.
#[derive(Clone, Copy, Debug)]
pub struct Sanity {
    min: f64,
    min_inclusive: bool,
    max: f64,
}

impl Sanity {
    /// Energy prices in cents per kilowatt-hour: (0, 200).
    pub const ENERGY_RATE_CENTS: Self = Self { min: 0.0, min_inclusive: false, max: 200.0 };

    /// Recurring monthly charges, credits and fees in dollars: [0, 200).
    pub const MONTHLY_CHARGE_DOLLARS: Self = Self { min: 0.0, min_inclusive: true, max: 200.0 };

    /// Monthly usage thresholds in kilowatt-hours: (0, 10000).
    pub const USAGE_THRESHOLD_KWH: Self = Self { min: 0.0, min_inclusive: false, max: 10_000.0 };

    #[must_use]
    pub fn admits(self, value: f64) -> bool {
        let above = if self.min_inclusive { value >= self.min } else { value > self.min };
        above && value < self.max
    }
}

/// Outcome of alias resolution.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    Missing,
    Unique(f64),
    Ambiguous(Vec<f64>),
}

impl Resolution {
    /// The single confident value, if any. Zero and two-plus survivors both
    /// collapse to `None`; the caller decides which of the two refusals it
    /// can live with.
    #[must_use]
    pub fn unique(&self) -> Option<f64> {
        match self {
            Self::Unique(value) => Some(*value),
            Self::Missing | Self::Ambiguous(_) => None,
        }
    }

    #[must_use]
    pub const fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Ambiguous(_))
    }
}

const DEDUPE_PRECISION: f64 = 1e-4;

/// Normalize, sanity-filter and dedupe the candidates, accepting iff exactly
/// one distinct value survives. Never averages, never picks the first or the
/// largest candidate.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn resolve(candidates: impl IntoIterator<Item = f64>, sanity: Sanity) -> Resolution {
    let survivors: Vec<f64> = candidates
        .into_iter()
        .filter(|value| value.is_finite() && sanity.admits(*value))
        .map(|value| (value / DEDUPE_PRECISION).round() * DEDUPE_PRECISION)
        .unique_by(|value| (value / DEDUPE_PRECISION).round() as i64)
        .collect();
    if survivors.len() > 1 {
        return Resolution::Ambiguous(survivors);
    }
    match survivors.first() {
        None => Resolution::Missing,
        Some(&value) => Resolution::Unique(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_survivor() {
        assert_eq!(resolve([14.5], Sanity::ENERGY_RATE_CENTS), Resolution::Unique(14.5));
    }

    #[test]
    fn test_agreeing_aliases_dedupe() {
        assert_eq!(
            resolve([14.5, 14.5, 14.500_04], Sanity::ENERGY_RATE_CENTS),
            Resolution::Unique(14.5),
        );
    }

    #[test]
    fn test_disagreement_is_never_picked() {
        let resolution = resolve([14.5, 9.8], Sanity::ENERGY_RATE_CENTS);
        assert!(resolution.is_ambiguous());
        assert_eq!(resolution.unique(), None);
    }

    #[test]
    fn test_out_of_range_candidates_drop_out() {
        assert_eq!(resolve([0.0, 250.0], Sanity::ENERGY_RATE_CENTS), Resolution::Missing);
        assert_eq!(resolve([0.0], Sanity::MONTHLY_CHARGE_DOLLARS), Resolution::Unique(0.0));
        assert_eq!(resolve([f64::NAN, 14.5], Sanity::ENERGY_RATE_CENTS), Resolution::Unique(14.5));
    }
}
