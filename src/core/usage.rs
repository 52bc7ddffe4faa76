//! Pre-aggregated usage buckets keyed by `kwh.m.<dayType>.<window>` within a
//! calendar month, as produced by the usage-simulation collaborator.

use std::{
    collections::BTreeMap,
    fmt::{Debug, Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::{prelude::*, quantity::KilowattHours};

/// Tolerance for legacy day/night and weekday/weekend reconciliation.
pub const LEGACY_SUM_EPSILON: f64 = 0.01;

/// Tolerance for windowed-schedule and tier reconciliation.
pub const WINDOWED_SUM_EPSILON: f64 = 0.001;

/// Calendar month in `YYYY-MM` form.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub const fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Debug for MonthKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl FromStr for MonthKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (year, month) = s.split_once('-').with_context(|| format!("expected `YYYY-MM`, got `{s}`"))?;
        let year = year.parse().with_context(|| format!("bad year in `{s}`"))?;
        let month = month.parse().with_context(|| format!("bad month in `{s}`"))?;
        ensure!((1..=12).contains(&month), "month out of range in `{s}`");
        Ok(Self { year, month })
    }
}

/// Day-type slice of a month.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum DayType {
    All,
    Weekday,
    Weekend,
}

impl DayType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Weekday => "weekday",
            Self::Weekend => "weekend",
        }
    }
}

impl Display for DayType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Debug for DayType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl FromStr for DayType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Self::All),
            "weekday" => Ok(Self::Weekday),
            "weekend" => Ok(Self::Weekend),
            _ => bail!("unknown day type `{s}`"),
        }
    }
}

/// Clock window with `HHMM` bounds. `2400` is the end-of-day sentinel, and
/// `start > end` denotes a window wrapping past midnight.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimeWindow {
    pub start: u16,
    pub end: u16,
}

impl TimeWindow {
    pub const FULL_DAY: Self = Self { start: 0, end: 2400 };

    pub fn new(start: u16, end: u16) -> Result<Self> {
        ensure!(start < 2400 && start % 100 < 60, "bad window start `{start:04}`");
        ensure!(end > 0 && end <= 2400 && end % 100 < 60, "bad window end `{end:04}`");
        ensure!(start != end, "empty window `{start:04}-{end:04}`");
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn is_full_day(self) -> bool {
        self.start == 0 && self.end == 2400
    }

    #[must_use]
    pub const fn wraps_midnight(self) -> bool {
        self.start > self.end
    }
}

impl Display for TimeWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:04}", self.start, self.end)
    }
}

impl Debug for TimeWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl FromStr for TimeWindow {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (start, end) = s.split_once('-').with_context(|| format!("expected `HHMM-HHMM`, got `{s}`"))?;
        ensure!(start.len() == 4 && end.len() == 4, "expected `HHMM-HHMM`, got `{s}`");
        Self::new(
            start.parse().with_context(|| format!("bad window start in `{s}`"))?,
            end.parse().with_context(|| format!("bad window end in `{s}`"))?,
        )
    }
}

/// Window part of a bucket key: the whole slice, or a clock window within it.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Window {
    Total,
    Clock(TimeWindow),
}

impl Display for Window {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Total => f.write_str("total"),
            Self::Clock(window) => Display::fmt(window, f),
        }
    }
}

impl Debug for Window {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl FromStr for Window {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "total" { Ok(Self::Total) } else { Ok(Self::Clock(s.parse()?)) }
    }
}

/// Identifier of a pre-aggregated kWh quantity over a day-type/time-window
/// slice within a month: `kwh.m.<dayType>.<window>`.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BucketKey {
    pub day_type: DayType,
    pub window: Window,
}

impl BucketKey {
    pub const ALL_TOTAL: Self = Self { day_type: DayType::All, window: Window::Total };

    #[must_use]
    pub const fn total(day_type: DayType) -> Self {
        Self { day_type, window: Window::Total }
    }

    #[must_use]
    pub const fn clock(day_type: DayType, window: TimeWindow) -> Self {
        Self { day_type, window: Window::Clock(window) }
    }
}

impl Display for BucketKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "kwh.m.{}.{}", self.day_type, self.window)
    }
}

impl Debug for BucketKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl FromStr for BucketKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let rest = s.strip_prefix("kwh.m.").with_context(|| format!("expected `kwh.m.` prefix in `{s}`"))?;
        let (day_type, window) =
            rest.split_once('.').with_context(|| format!("expected `<dayType>.<window>` in `{s}`"))?;
        Ok(Self { day_type: day_type.parse()?, window: window.parse()? })
    }
}

/// Usage buckets of a single month.
#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct MonthUsage(
    #[serde_as(as = "BTreeMap<DisplayFromStr, _>")] pub BTreeMap<BucketKey, KilowattHours>,
);

impl MonthUsage {
    #[must_use]
    pub fn get(&self, key: BucketKey) -> Option<KilowattHours> {
        self.0.get(&key).copied()
    }

    /// The month's `kwh.m.all.total` bucket.
    #[must_use]
    pub fn total(&self) -> Option<KilowattHours> {
        self.get(BucketKey::ALL_TOTAL)
    }
}

/// Per-month usage buckets covering the household's history.
#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct UsageHistory(
    #[serde_as(as = "BTreeMap<DisplayFromStr, _>")] pub BTreeMap<MonthKey, MonthUsage>,
);

impl UsageHistory {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The trailing `months` calendar months, oldest first. Thresholds reset
    /// every billing period, so callers always work month by month.
    pub fn trailing_months(&self, months: u32) -> Result<Vec<(MonthKey, &MonthUsage)>, HistoryShortfall> {
        if self.0.len() < months as usize {
            return Err(HistoryShortfall { need: months, have: self.0.len() });
        }
        let mut selected: Vec<_> =
            self.0.iter().rev().take(months as usize).map(|(key, usage)| (*key, usage)).collect();
        selected.reverse();
        Ok(selected)
    }
}

/// Fewer months of history than the request asked for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HistoryShortfall {
    pub need: u32,
    pub have: usize,
}

impl Display for HistoryShortfall {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "need {} months, have {}", self.need, self.have)
    }
}

/// A bucket-sum/total disagreement beyond tolerance. Terminal: the engine
/// never silently corrects either side.
#[derive(Clone, Copy, Debug)]
pub struct SumMismatch {
    pub month: MonthKey,
    pub parts: KilowattHours,
    pub total: KilowattHours,
}

impl Display for SumMismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} buckets sum to {} against a {} total", self.month, self.parts, self.total)
    }
}

/// Check that sub-window buckets add up to the month total within `epsilon`
/// kilowatt-hours.
pub fn reconcile(
    month: MonthKey,
    parts: KilowattHours,
    total: KilowattHours,
    epsilon: f64,
) -> Result<(), SumMismatch> {
    if (parts - total).abs().0 <= epsilon { Ok(()) } else { Err(SumMismatch { month, parts, total }) }
}
