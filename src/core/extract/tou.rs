use enumset::{EnumSet, EnumSetType, enum_set};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    core::{
        rate_structure::{RateStructure, as_number},
        resolve::Sanity,
        usage::{BucketKey, DayType, TimeWindow},
    },
    prelude::*,
    quantity::CentsPerKwh,
};

/// Day of week for period applicability.
#[derive(Debug, EnumSetType)]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

pub const ALL_DAYS: EnumSet<Day> =
    enum_set!(Day::Mon | Day::Tue | Day::Wed | Day::Thu | Day::Fri | Day::Sat | Day::Sun);
pub const WEEKDAYS: EnumSet<Day> = enum_set!(Day::Mon | Day::Tue | Day::Wed | Day::Thu | Day::Fri);
pub const WEEKEND: EnumSet<Day> = enum_set!(Day::Sat | Day::Sun);

/// The two canonical legacy schedules, recognized by exact boundary match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LegacyShape {
    /// 0700–2000 day rate, 2000–0700 night rate, every day.
    DayNightAllDays,
    /// Full-day weekday rate vs full-day weekend rate.
    WeekdayWeekendAllDay,
}

pub const DAY_WINDOW: TimeWindow = TimeWindow { start: 700, end: 2000 };
pub const NIGHT_WINDOW: TimeWindow = TimeWindow { start: 2000, end: 700 };

/// One time-of-use pricing window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouPeriod {
    pub days: EnumSet<Day>,
    pub window: TimeWindow,
    pub rate: CentsPerKwh,
}

impl TouPeriod {
    /// The usage bucket this period prices, refusing non-canonical day sets.
    pub fn bucket_key(&self) -> Result<BucketKey> {
        let day_type = match self.days {
            days if days == ALL_DAYS => DayType::All,
            days if days == WEEKDAYS => DayType::Weekday,
            days if days == WEEKEND => DayType::Weekend,
            days => bail!("unsupported period day set {days:?}"),
        };
        if self.window.is_full_day() {
            Ok(BucketKey::total(day_type))
        } else {
            Ok(BucketKey::clock(day_type, self.window))
        }
    }
}

/// An ordered list of time-of-use pricing windows.
#[derive(Clone, Debug, PartialEq)]
pub struct TouSchedule(pub Vec<TouPeriod>);

pub const PERIOD_ARRAY_ALIASES: &[&str] =
    &["touPeriods", "timeOfUsePeriods", "tou_periods", "periods"];

impl TouSchedule {
    /// Parse the first present period array; `Ok(None)` when the structure
    /// carries no period array at all.
    pub fn from_structure(structure: &RateStructure) -> Result<Option<Self>> {
        let Some(array) = structure.array(PERIOD_ARRAY_ALIASES) else {
            return Ok(None);
        };
        let periods: Vec<TouPeriod> = array.iter().map(parse_period).collect::<Result<_>>()?;
        Ok(Some(Self(periods)))
    }

    /// Exact legacy boundary match, no tolerance. Anything else is handled
    /// as a windowed schedule.
    #[must_use]
    pub fn legacy_shape(&self) -> Option<LegacyShape> {
        let [first, second] = self.0.as_slice() else {
            return None;
        };
        let matches_windows = |day: TimeWindow, night: TimeWindow| {
            (first.window, second.window) == (day, night)
                || (first.window, second.window) == (night, day)
        };
        if first.days == ALL_DAYS && second.days == ALL_DAYS && matches_windows(DAY_WINDOW, NIGHT_WINDOW)
        {
            return Some(LegacyShape::DayNightAllDays);
        }
        let day_sets = (first.days, second.days);
        if first.window.is_full_day()
            && second.window.is_full_day()
            && (day_sets == (WEEKDAYS, WEEKEND) || day_sets == (WEEKEND, WEEKDAYS))
        {
            return Some(LegacyShape::WeekdayWeekendAllDay);
        }
        None
    }

    /// Bucket keys required to price the schedule, one per period, in period
    /// order. `kwh.m.all.total` is required on top of these.
    pub fn bucket_keys(&self) -> Result<Vec<BucketKey>> {
        self.0.iter().map(TouPeriod::bucket_key).collect()
    }
}

#[derive(Deserialize)]
struct RawPeriod {
    #[serde(default, rename = "dayType", alias = "day_type")]
    day_type: Option<String>,

    #[serde(default)]
    days: Option<Vec<String>>,

    #[serde(rename = "startTime", alias = "start_time", alias = "start", alias = "from")]
    start: Value,

    #[serde(rename = "endTime", alias = "end_time", alias = "end", alias = "to")]
    end: Value,

    #[serde(rename = "rateCents", alias = "rate_cents", alias = "centsPerKwh", alias = "priceCents")]
    rate: Value,
}

fn parse_period(value: &Value) -> Result<TouPeriod> {
    let raw: RawPeriod =
        serde_json::from_value(value.clone()).context("malformed time-of-use period")?;

    let rate = as_number(&raw.rate).context("non-numeric period rate")?;
    ensure!(Sanity::ENERGY_RATE_CENTS.admits(rate), "period rate out of range: {rate}");

    let start = parse_time(&raw.start)?;
    // Midnight spelled `0000` is the end-of-day sentinel in end position.
    let end = match parse_time(&raw.end)? {
        0 => 2400,
        end => end,
    };

    Ok(TouPeriod {
        days: parse_days(raw.day_type.as_deref(), raw.days.as_deref())?,
        window: TimeWindow::new(start, end)?,
        rate: CentsPerKwh(rate),
    })
}

/// Accept `HHMM` numbers as well as `HH:MM`/`HHMM` strings.
fn parse_time(value: &Value) -> Result<u16> {
    match value {
        Value::Number(number) => {
            u16::try_from(number.as_u64().context("negative period boundary")?)
                .context("period boundary out of range")
        }
        Value::String(text) => {
            text.replace(':', "").parse().with_context(|| format!("bad period boundary `{text}`"))
        }
        _ => bail!("non-numeric period boundary"),
    }
}

fn parse_days(day_type: Option<&str>, days: Option<&[String]>) -> Result<EnumSet<Day>> {
    if let Some(days) = days
        && !days.is_empty()
    {
        return days.iter().map(|name| parse_day(name)).collect();
    }
    // Unspecified applicability means the period runs every day.
    match day_type.map(str::to_ascii_lowercase).as_deref() {
        None | Some("all" | "all_days" | "everyday") => Ok(ALL_DAYS),
        Some("weekday" | "weekdays") => Ok(WEEKDAYS),
        Some("weekend" | "weekends") => Ok(WEEKEND),
        Some(other) => bail!("unknown day type `{other}`"),
    }
}

fn parse_day(name: &str) -> Result<Day> {
    match name.to_ascii_lowercase().as_str() {
        "mon" | "monday" => Ok(Day::Mon),
        "tue" | "tuesday" => Ok(Day::Tue),
        "wed" | "wednesday" => Ok(Day::Wed),
        "thu" | "thursday" => Ok(Day::Thu),
        "fri" | "friday" => Ok(Day::Fri),
        "sat" | "saturday" => Ok(Day::Sat),
        "sun" | "sunday" => Ok(Day::Sun),
        _ => bail!("unknown day `{name}`"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn schedule(value: Value) -> TouSchedule {
        TouSchedule::from_structure(&RateStructure(value)).unwrap().unwrap()
    }

    #[test]
    fn test_day_night_legacy_shape() {
        let schedule = schedule(json!({"touPeriods": [
            {"dayType": "all", "start": "07:00", "end": "20:00", "rateCents": 18.1},
            {"dayType": "all", "start": 2000, "end": 700, "rateCents": 9.4},
        ]}));
        assert_eq!(schedule.legacy_shape(), Some(LegacyShape::DayNightAllDays));
    }

    #[test]
    fn test_shifted_boundary_is_not_legacy() {
        let schedule = schedule(json!({"periods": [
            {"dayType": "all", "start": "07:30", "end": "20:00", "rateCents": 18.1},
            {"dayType": "all", "start": "20:00", "end": "07:30", "rateCents": 9.4},
        ]}));
        assert_eq!(schedule.legacy_shape(), None);
    }

    #[test]
    fn test_weekday_weekend_legacy_shape() {
        let schedule = schedule(json!({"timeOfUsePeriods": [
            {"dayType": "weekday", "start": 0, "end": 2400, "centsPerKwh": 15.0},
            {"days": ["sat", "sun"], "start": 0, "end": "00:00", "centsPerKwh": 5.0},
        ]}));
        assert_eq!(schedule.legacy_shape(), Some(LegacyShape::WeekdayWeekendAllDay));
        assert_eq!(schedule.bucket_keys().unwrap(), [
            BucketKey::total(DayType::Weekday),
            BucketKey::total(DayType::Weekend),
        ]);
    }

    #[test]
    fn test_windowed_bucket_keys() {
        let schedule = schedule(json!({"touPeriods": [
            {"dayType": "all", "start": 0, "end": 1400, "rateCents": 11.0},
            {"dayType": "all", "start": 1400, "end": 2400, "rateCents": 19.0},
        ]}));
        assert_eq!(schedule.legacy_shape(), None);
        assert_eq!(
            schedule.bucket_keys().unwrap().iter().map(BucketKey::to_string).collect::<Vec<_>>(),
            ["kwh.m.all.0000-1400", "kwh.m.all.1400-2400"],
        );
    }

    #[test]
    fn test_partial_day_list_is_refused() {
        let schedule = schedule(json!({"touPeriods": [
            {"days": ["mon", "tue"], "start": 0, "end": 2400, "rateCents": 11.0},
        ]}));
        assert!(schedule.bucket_keys().is_err());
    }

    #[test]
    fn test_out_of_range_rate_is_refused() {
        let result = TouSchedule::from_structure(&RateStructure(json!({"touPeriods": [
            {"dayType": "all", "start": 0, "end": 2400, "rateCents": 250.0},
        ]})));
        assert!(result.is_err());
    }
}
