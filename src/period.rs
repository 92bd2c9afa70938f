//! Calendar-month resolution for paginated monthly views.
//!
//! Monthly pages are addressed by a zero-based page offset: page 0 is the
//! current month, page 1 the month before, and so on. The resolver turns an
//! offset plus a reference date into a concrete month, its canonical period
//! key, and a display label.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize, de};
use time::{Date, Month};

use crate::Error;

/// Canonical identifier for a calendar month: the zero-padded month number
/// followed by the four-digit year, e.g. "012025" for January 2025.
///
/// Budgets are keyed by this value in the store, so it serializes as the
/// six-character string rather than as a struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeriodKey {
    month: Month,
    year: i32,
}

impl PeriodKey {
    /// Create the period key for `month` of `year`.
    pub fn new(month: Month, year: i32) -> Self {
        Self { month, year }
    }

    /// The calendar month this key refers to.
    pub fn month(&self) -> Month {
        self.month
    }

    /// The calendar year this key refers to.
    pub fn year(&self) -> i32 {
        self.year
    }
}

impl Display for PeriodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}{:04}", u8::from(self.month), self.year)
    }
}

impl FromStr for PeriodKey {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidPeriodKey(raw.to_owned());

        if raw.len() != 6 || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(invalid());
        }

        let month: u8 = raw[..2].parse().map_err(|_| invalid())?;
        let month = Month::try_from(month).map_err(|_| invalid())?;
        let year: i32 = raw[2..].parse().map_err(|_| invalid())?;

        Ok(Self { month, year })
    }
}

impl Serialize for PeriodKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeriodKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// The outcome of resolving a page offset against a reference date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedMonth {
    /// The resolved calendar month.
    pub month: Month,
    /// The resolved calendar year.
    pub year: i32,
    /// The canonical period key, e.g. "012025".
    pub key: PeriodKey,
    /// A display label, e.g. "January 2025".
    pub label: String,
}

/// The earliest year a [Date] can represent. Page offsets that would reach
/// further back resolve to January of this year rather than panicking when
/// the resolved month is turned into query bounds.
const MIN_YEAR: i32 = -9999;

/// Map a zero-based page offset to a concrete month relative to `today`.
///
/// Page 0 is the month containing `today`, page 1 the previous month, and so
/// on, with year rollover. The reference is normalized to the first of the
/// month before subtracting, so the day of month never causes a skipped or
/// repeated month. Offsets reaching past [MIN_YEAR] clamp to January of
/// [MIN_YEAR].
pub fn resolve_month(page: u32, today: Date) -> ResolvedMonth {
    let months = today.year() as i64 * 12 + (u8::from(today.month()) as i64 - 1) - page as i64;
    let months = months.max(MIN_YEAR as i64 * 12);

    let year = months.div_euclid(12) as i32;
    let month = (months.rem_euclid(12) + 1) as u8;
    let month = Month::try_from(month).expect("month is in 1..=12 after modular reduction");

    ResolvedMonth {
        month,
        year,
        key: PeriodKey::new(month, year),
        label: format!("{} {year}", month_name(month)),
    }
}

/// The inclusive first and last dates of `month` in `year`.
pub fn month_bounds(month: Month, year: i32) -> (Date, Date) {
    let start = Date::from_calendar_date(year, month, 1).expect("invalid month start date");
    let end = Date::from_calendar_date(year, month, last_day_of_month(year, month))
        .expect("invalid month end date");

    (start, end)
}

/// The inclusive first and last dates of `year`.
pub(crate) fn year_bounds(year: i32) -> (Date, Date) {
    let start = Date::from_calendar_date(year, Month::January, 1).expect("invalid year start date");
    let end = Date::from_calendar_date(year, Month::December, 31).expect("invalid year end date");

    (start, end)
}

fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

fn month_name(month: Month) -> &'static str {
    match month {
        Month::January => "January",
        Month::February => "February",
        Month::March => "March",
        Month::April => "April",
        Month::May => "May",
        Month::June => "June",
        Month::July => "July",
        Month::August => "August",
        Month::September => "September",
        Month::October => "October",
        Month::November => "November",
        Month::December => "December",
    }
}

#[cfg(test)]
mod tests {
    use time::{Month, macros::date};

    use crate::Error;

    use super::{PeriodKey, month_bounds, resolve_month};

    #[test]
    fn page_zero_resolves_to_current_month() {
        let got = resolve_month(0, date!(2024 - 01 - 15));

        assert_eq!(got.month, Month::January);
        assert_eq!(got.year, 2024);
        assert_eq!(got.key.to_string(), "012024");
        assert_eq!(got.label, "January 2024");
    }

    #[test]
    fn page_one_rolls_over_year_boundary() {
        let got = resolve_month(1, date!(2024 - 01 - 15));

        assert_eq!(got.month, Month::December);
        assert_eq!(got.year, 2023);
        assert_eq!(got.key.to_string(), "122023");
    }

    #[test]
    fn page_thirteen_rolls_over_two_years() {
        let got = resolve_month(13, date!(2024 - 01 - 15));

        assert_eq!(got.month, Month::December);
        assert_eq!(got.year, 2022);
    }

    #[test]
    fn day_of_month_never_skips_a_month() {
        // Naive date subtraction from March 31st would overflow past the
        // 28 days of February; the resolver must still land on February.
        let got = resolve_month(1, date!(2024 - 03 - 31));

        assert_eq!(got.month, Month::February);
        assert_eq!(got.year, 2024);
    }

    #[test]
    fn extreme_page_offsets_clamp_to_earliest_month() {
        let got = resolve_month(u32::MAX, date!(2025 - 01 - 15));

        assert_eq!(got.month, Month::January);
        assert_eq!(got.year, -9999);

        // The clamped month must still convert into valid query bounds.
        let (start, end) = month_bounds(got.month, got.year);
        assert!(start < end);
    }

    #[test]
    fn twelve_consecutive_pages_cover_twelve_distinct_months() {
        let today = date!(2024 - 07 - 09);
        let mut seen = Vec::new();

        for page in 0..12 {
            let resolved = resolve_month(page, today);
            seen.push((resolved.year, resolved.month));
        }

        seen.dedup();
        assert_eq!(seen.len(), 12, "expected 12 distinct months, got {seen:?}");
    }

    #[test]
    fn period_key_round_trips_through_string_form() {
        let key = PeriodKey::new(Month::January, 2025);

        assert_eq!(key.to_string(), "012025");
        assert_eq!("012025".parse::<PeriodKey>().unwrap(), key);
    }

    #[test]
    fn period_key_rejects_malformed_strings() {
        for raw in ["", "13", "132025", "jan2025", "0120256"] {
            let got = raw.parse::<PeriodKey>();
            assert_eq!(got, Err(Error::InvalidPeriodKey(raw.to_owned())));
        }
    }

    #[test]
    fn month_bounds_handles_leap_february() {
        let (start, end) = month_bounds(Month::February, 2024);

        assert_eq!(start, date!(2024 - 02 - 01));
        assert_eq!(end, date!(2024 - 02 - 29));
    }

    #[test]
    fn month_bounds_handles_common_february() {
        let (_, end) = month_bounds(Month::February, 2023);

        assert_eq!(end, date!(2023 - 02 - 28));
    }
}
