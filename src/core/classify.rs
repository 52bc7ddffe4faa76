//! One classification pass from the loose blob into a closed sum type. All
//! downstream cost branches pattern-match exhaustively on the result instead
//! of probing optional fields.

use crate::{
    core::{
        extract::{
            charges,
            tiers::TierSchedule,
            tou::{LegacyShape, TouSchedule},
        },
        rate_structure::RateStructure,
        resolve::Resolution,
    },
    quantity::CentsPerKwh,
};

/// Deterministic pricing model of a plan.
#[derive(Clone, Debug, PartialEq)]
pub enum Classification {
    Fixed { rate: CentsPerKwh },
    TouLegacy { shape: LegacyShape, schedule: TouSchedule },
    TouWindowed { schedule: TouSchedule },
    Tiered { schedule: TierSchedule },
    Indexed,
    Unsupported { detail: String },
}

impl Classification {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Fixed { .. } => "fixed",
            Self::TouLegacy { .. } => "tou-legacy",
            Self::TouWindowed { .. } => "tou-windowed",
            Self::Tiered { .. } => "tiered",
            Self::Indexed => "indexed",
            Self::Unsupported { .. } => "unsupported",
        }
    }
}

const TYPE_ALIASES: &[&str] = &["type", "rateType", "rate_type", "planType"];
const INDEXED_FLAG_ALIASES: &[&str] = &["isIndexed", "is_indexed", "isVariable", "is_variable"];

fn unsupported(detail: impl Into<String>) -> Classification {
    Classification::Unsupported { detail: detail.into() }
}

/// Classify a rate structure. Rule order matters: an indexed or time-of-use
/// signal refuses `Fixed` classification even when a convenience
/// `energyRateCents` field resolves uniquely, because TOU templates are
/// known to store a legacy off-peak value there that would otherwise
/// masquerade as a flat rate.
#[must_use]
pub fn classify(structure: &RateStructure) -> Classification {
    let type_text =
        structure.text(TYPE_ALIASES).map(str::to_ascii_lowercase).unwrap_or_default();

    if structure.flag(INDEXED_FLAG_ALIASES)
        || type_text.contains("indexed")
        || type_text.contains("variable")
    {
        return Classification::Indexed;
    }

    let tou = match TouSchedule::from_structure(structure) {
        Ok(tou) => tou,
        Err(error) => return unsupported(format!("{error:#}")),
    };
    let tiers = match TierSchedule::from_structure(structure) {
        Ok(tiers) => tiers,
        Err(error) => return unsupported(format!("{error:#}")),
    };

    if tou.is_some() && tiers.is_some() {
        return unsupported("mixed time-of-use and tiered structures");
    }

    if let Some(schedule) = tou {
        if let Err(error) = schedule.bucket_keys() {
            return unsupported(format!("{error:#}"));
        }
        return match schedule.legacy_shape() {
            Some(shape) => Classification::TouLegacy { shape, schedule },
            None => Classification::TouWindowed { schedule },
        };
    }
    let tou_signal =
        type_text.contains("time_of_use") || type_text.contains("time-of-use") || type_text == "tou";
    if tou_signal {
        return unsupported("time-of-use plan without period definitions");
    }

    if let Some(schedule) = tiers {
        return Classification::Tiered { schedule };
    }
    if type_text.contains("tiered") {
        return unsupported("tiered plan without block definitions");
    }

    match charges::energy_rate(structure) {
        Resolution::Unique(rate) => Classification::Fixed { rate: CentsPerKwh(rate) },
        Resolution::Ambiguous(values) => {
            unsupported(format!("ambiguous energy rate across aliases: {values:?}"))
        }
        Resolution::Missing => unsupported("no recognizable pricing structure"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_plain_fixed_rate() {
        let classification = classify(&RateStructure(json!({"energyRateCents": 14.5})));
        assert_eq!(classification, Classification::Fixed { rate: CentsPerKwh(14.5) });
    }

    #[test]
    fn test_tou_artifact_refuses_fixed() {
        // A TOU template storing a legacy off-peak convenience value: the
        // period array must win over the uniquely-resolving flat rate.
        let classification = classify(&RateStructure(json!({
            "energyRateCents": 9.4,
            "touPeriods": [
                {"dayType": "all", "start": "07:00", "end": "20:00", "rateCents": 18.1},
                {"dayType": "all", "start": "20:00", "end": "07:00", "rateCents": 9.4},
            ],
        })));
        assert!(matches!(classification, Classification::TouLegacy {
            shape: LegacyShape::DayNightAllDays,
            ..
        }));
    }

    #[test]
    fn test_tou_flag_without_periods_is_unsupported() {
        let classification =
            classify(&RateStructure(json!({"rateType": "time_of_use", "energyRateCents": 9.4})));
        assert_eq!(classification.name(), "unsupported");
    }

    #[test]
    fn test_indexed_flag_wins() {
        let classification =
            classify(&RateStructure(json!({"isIndexed": true, "energyRateCents": 11.0})));
        assert_eq!(classification, Classification::Indexed);
    }

    #[test]
    fn test_mixed_shapes_are_unsupported() {
        let classification = classify(&RateStructure(json!({
            "touPeriods": [{"dayType": "all", "start": 0, "end": 2400, "rateCents": 12.0}],
            "tiers": [{"uptoKwh": 500, "rateCents": 15.0}, {"rateCents": 10.0}],
        })));
        assert_eq!(classification.name(), "unsupported");
    }

    #[test]
    fn test_ambiguous_aliases_are_unsupported() {
        let classification =
            classify(&RateStructure(json!({"energyRateCents": 14.5, "rateCents": 9.8})));
        assert_eq!(classification.name(), "unsupported");
    }

    #[test]
    fn test_tiered_blocks() {
        let classification = classify(&RateStructure(json!({"usageTiers": [
            {"uptoKwh": 1000, "rateCents": 13.0},
            {"rateCents": 9.0},
        ]})));
        assert!(matches!(classification, Classification::Tiered { .. }));
    }
}
