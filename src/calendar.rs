//! Leap-year aware day-of-year numbering.
//!
//! Every date maps onto a fixed 365-day cycle: the non-leap ordinal is used
//! as is, and in leap years every date from March 1 onwards is shifted back
//! by one so that e.g. June 1 lands in the same bucket every year. February
//! 29 has no bucket of its own; [`LeapDayPolicy`] decides what happens to it.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::error::Error;

pub const DAYS_IN_CYCLE: usize = 365;

/// Ordinal of February 28 in the 365-day cycle.
pub const FEB_28: u16 = 59;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeapDayPolicy {
    /// February 29 is removed from the normalized series.
    #[default]
    Drop,
    /// February 29 shares the February 28 bucket.
    FoldIntoFeb28,
}

impl FromStr for LeapDayPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "drop" => Ok(LeapDayPolicy::Drop),
            "fold" | "feb28" => Ok(LeapDayPolicy::FoldIntoFeb28),
            _ => Err(Error::UnknownName {
                kind: "leap day policy",
                name: s.to_string(),
            }),
        }
    }
}

/// A value tagged with its position in the 365-day cycle.
///
/// Only [`normalize`] builds these, so `ordinal` is always in `1..=365`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedDay {
    ordinal: u16,
    date: NaiveDate,
    value: f64,
}

impl NormalizedDay {
    pub fn ordinal(&self) -> u16 {
        self.ordinal
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Zero-based position in a 365-slot buffer.
    pub(crate) fn slot(&self) -> usize {
        (self.ordinal - 1) as usize
    }
}

pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

/// Returns the ordinal in `1..=365`, or `None` for a dropped leap day.
pub fn ordinal_day(date: NaiveDate, policy: LeapDayPolicy) -> Option<u16> {
    let natural = date.ordinal() as u16;

    if !is_leap_year(date.year()) {
        return Some(natural);
    }

    match (date.month(), date.day()) {
        (2, 29) => match policy {
            LeapDayPolicy::Drop => None,
            LeapDayPolicy::FoldIntoFeb28 => Some(FEB_28),
        },
        (month, _) if month >= 3 => Some(natural - 1),
        _ => Some(natural),
    }
}

/// Tags each (date, value) pair with its ordinal day.
pub fn normalize<'a, I>(pairs: I, policy: LeapDayPolicy) -> Vec<NormalizedDay>
where
    I: IntoIterator<Item = (&'a NaiveDate, &'a f64)>,
{
    pairs
        .into_iter()
        .filter_map(|(date, value)| {
            ordinal_day(*date, policy).map(|ordinal| NormalizedDay {
                ordinal,
                date: *date,
                value: *value,
            })
        })
        .collect()
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn should_align_march_first_across_leap_years() {
        let leap = ordinal_day(date(2020, 3, 1), LeapDayPolicy::Drop);
        let common = ordinal_day(date(2021, 3, 1), LeapDayPolicy::Drop);

        assert_eq!(leap, Some(60));
        assert_eq!(common, Some(60));
    }

    #[test]
    fn should_align_known_calendar_days() {
        for year in [2019, 2020, 2023, 2024] {
            assert_eq!(ordinal_day(date(year, 1, 1), LeapDayPolicy::Drop), Some(1));
            assert_eq!(ordinal_day(date(year, 2, 28), LeapDayPolicy::Drop), Some(59));
            assert_eq!(ordinal_day(date(year, 6, 1), LeapDayPolicy::Drop), Some(152));
            assert_eq!(ordinal_day(date(year, 12, 31), LeapDayPolicy::Drop), Some(365));
        }
    }

    #[test]
    fn should_never_emit_366() {
        let mut day = date(2019, 1, 1);
        while day <= date(2025, 12, 31) {
            for policy in [LeapDayPolicy::Drop, LeapDayPolicy::FoldIntoFeb28] {
                if let Some(ordinal) = ordinal_day(day, policy) {
                    assert!((1..=365).contains(&ordinal), "{} -> {}", day, ordinal);
                }
            }
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn should_apply_leap_day_policy() {
        let leap_day = date(2024, 2, 29);

        assert_eq!(ordinal_day(leap_day, LeapDayPolicy::Drop), None);
        assert_eq!(ordinal_day(leap_day, LeapDayPolicy::FoldIntoFeb28), Some(FEB_28));
    }

    #[test]
    fn should_normalize_pairs() {
        let dates = vec![date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)];
        let values = vec![1.0, 2.0, 3.0];

        let days = normalize(dates.iter().zip(values.iter()), LeapDayPolicy::Drop);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].ordinal(), 59);
        assert_eq!(days[1].ordinal(), 60);
        assert_eq!(days[1].value(), 3.0);
    }

    #[test]
    fn should_parse_policy() {
        assert_eq!("Drop".parse::<LeapDayPolicy>(), Ok(LeapDayPolicy::Drop));
        assert_eq!("fold".parse::<LeapDayPolicy>(), Ok(LeapDayPolicy::FoldIntoFeb28));
        assert!("merge".parse::<LeapDayPolicy>().is_err());
    }
}
