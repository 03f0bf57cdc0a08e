use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// A calendar month on the UTC calendar, written `YYYY-MM`.
///
/// Stored as the first day of the month so ordering is chronological and
/// arithmetic never needs a timezone.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthYear(NaiveDate);

impl MonthYear {
    pub fn new(year: i32, month: u32) -> Result<Self, TypeError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(|| TypeError::InvalidMonth(format!("{year:04}-{month:02}")))
    }

    /// The month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// The given day of this month, clamped to the month's last day.
    pub fn day(&self, day: u32) -> NaiveDate {
        let day = day.clamp(1, 31);
        (1..=day)
            .rev()
            .find_map(|d| self.0.with_day(d))
            .unwrap_or(self.0)
    }

    /// The month `n` months later, or `None` past the end of the calendar.
    pub fn add_months(&self, n: u32) -> Option<Self> {
        self.0.checked_add_months(Months::new(n)).map(Self)
    }

    /// `count` consecutive months starting with this one.
    pub fn range(self, count: u32) -> impl Iterator<Item = MonthYear> {
        (0..count).map_while(move |i| self.add_months(i))
    }
}

impl FromStr for MonthYear {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypeError::InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl fmt::Debug for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MonthYear({self})")
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl Serialize for MonthYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthYear {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_and_display() {
        let m: MonthYear = "2024-03".parse().unwrap();
        assert_eq!(m.year(), 2024);
        assert_eq!(m.month(), 3);
        assert_eq!(m.to_string(), "2024-03");
    }

    #[test]
    fn parse_rejects_malformed_tokens() {
        for bad in ["2024-13", "2024-3", "24-03", "2024/03", "", "2024-03-01"] {
            assert!(bad.parse::<MonthYear>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn add_months_crosses_year_boundary() {
        let m = MonthYear::new(2024, 11).unwrap();
        assert_eq!(m.add_months(2).unwrap(), MonthYear::new(2025, 1).unwrap());
        assert_eq!(m.add_months(0).unwrap(), m);
    }

    #[test]
    fn range_yields_consecutive_months() {
        let start = MonthYear::from_date(date(2024, 1, 15));
        let months: Vec<String> = start.range(3).map(|m| m.to_string()).collect();
        assert_eq!(months, ["2024-01", "2024-02", "2024-03"]);
        assert_eq!(start.range(0).count(), 0);
    }

    #[test]
    fn day_clamps_to_month_end() {
        let feb = MonthYear::new(2023, 2).unwrap();
        assert_eq!(feb.day(10), date(2023, 2, 10));
        assert_eq!(feb.day(31), date(2023, 2, 28));
        assert_eq!(feb.day(0), date(2023, 2, 1));
    }

    #[test]
    fn ordering_is_chronological() {
        let a = MonthYear::new(2023, 12).unwrap();
        let b = MonthYear::new(2024, 1).unwrap();
        assert!(a < b);
    }

    #[test]
    fn serde_uses_token_form() {
        let m = MonthYear::new(2024, 7).unwrap();
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"2024-07\"");
        let back: MonthYear = serde_json::from_str("\"2024-07\"").unwrap();
        assert_eq!(back, m);
        assert!(serde_json::from_str::<MonthYear>("\"July\"").is_err());
    }
}
