use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::{core::accumulator::MonthCosts, quantity::Cents};

/// Outcome class of an estimate.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ok,
    Approximate,
    NotComputable,
    NotImplemented,
}

impl Status {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Approximate => "APPROXIMATE",
            Self::NotComputable => "NOT_COMPUTABLE",
            Self::NotImplemented => "NOT_IMPLEMENTED",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much the comparison product should trust the number.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl Display for Confidence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable machine-readable reason codes.
pub mod reason {
    pub const MISSING_USAGE_BUCKETS: &str = "MISSING_USAGE_BUCKETS";
    pub const USAGE_BUCKET_SUM_MISMATCH: &str = "USAGE_BUCKET_SUM_MISMATCH";
    pub const NON_DETERMINISTIC_PRICING_INDEXED: &str = "NON_DETERMINISTIC_PRICING_INDEXED";
    pub const TIERED_REQUIRES_MONTHLY_TOTALS: &str = "tiered_pricing_requires_monthly_totals";
    pub const INSUFFICIENT_USAGE_HISTORY: &str = "INSUFFICIENT_USAGE_HISTORY";
    pub const UNSUPPORTED_RATE_STRUCTURE: &str = "UNSUPPORTED_RATE_STRUCTURE";
    pub const AMBIGUOUS_MONTHLY_CHARGE: &str = "AMBIGUOUS_MONTHLY_CHARGE";
    pub const INVALID_ANNUAL_KWH: &str = "INVALID_ANNUAL_KWH";
    pub const INVALID_MONTHS: &str = "INVALID_MONTHS";
    pub const MISSING_PRICE_ANCHORS: &str = "MISSING_PRICE_ANCHORS";
}

/// Which party bills a cost line.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Party {
    Rep,
    Tdsp,
}

/// One line of the flat cost breakdown.
#[derive(Clone, Debug, Serialize)]
pub struct CostLine {
    pub label: String,
    pub party: Party,
    pub amount: Cents,
}

impl CostLine {
    pub fn new(label: impl Into<String>, party: Party, amount: Cents) -> Self {
        Self { label: label.into(), party, amount }
    }
}

/// Two-level breakdown: flat lines plus the REP/TDSP split.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Breakdown {
    pub lines: Vec<CostLine>,
    pub rep_total: Cents,
    pub tdsp_total: Cents,
    pub total: Cents,
}

impl Breakdown {
    #[must_use]
    pub fn from_lines(lines: Vec<CostLine>) -> Self {
        let split = |party| {
            lines.iter().filter(|line| line.party == party).map(|line| line.amount).sum::<Cents>()
        };
        let rep_total = split(Party::Rep);
        let tdsp_total = split(Party::Tdsp);
        Self { lines, rep_total, tdsp_total, total: rep_total + tdsp_total }
    }
}

pub const DEBUG_TRACE_VERSION: u32 = 1;

/// Non-contractual diagnostic payload. Strictly additive across versions;
/// nothing may depend on its exact shape.
#[derive(Clone, Debug, Serialize)]
pub struct DebugTrace {
    pub version: u32,
    pub classified: String,
    pub months: Vec<String>,
    pub month_costs: Vec<MonthCosts>,
    pub anchors: Vec<String>,
}

impl DebugTrace {
    #[must_use]
    pub fn new(classified: &str) -> Self {
        Self {
            version: DEBUG_TRACE_VERSION,
            classified: classified.to_owned(),
            months: Vec::new(),
            month_costs: Vec::new(),
            anchors: Vec::new(),
        }
    }
}

/// The estimate handed back to the comparison product.
#[derive(Clone, Debug, Serialize)]
pub struct Estimate {
    pub status: Status,
    pub reason: Option<String>,
    pub confidence: Confidence,
    pub annual_cost: Option<Cents>,
    pub monthly_cost: Option<Cents>,
    pub breakdown: Option<Breakdown>,
    pub notes: Vec<String>,
    pub debug: Option<DebugTrace>,
}

impl Estimate {
    /// A final, deterministic refusal, not a transient failure.
    #[must_use]
    pub fn not_computable(reason: impl Into<String>) -> Self {
        Self {
            status: Status::NotComputable,
            reason: Some(reason.into()),
            confidence: Confidence::Low,
            annual_cost: None,
            monthly_cost: None,
            breakdown: None,
            notes: Vec::new(),
            debug: None,
        }
    }

    /// Structurally invalid primary input.
    #[must_use]
    pub fn not_implemented(reason: impl Into<String>) -> Self {
        Self { status: Status::NotImplemented, ..Self::not_computable(reason) }
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}
