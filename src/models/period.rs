//! Budget period representation
//!
//! Supports weekly, monthly, yearly and custom date ranges.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a budget period
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// ISO week period (e.g., "2025-W03")
    Weekly { year: i32, week: u32 },

    /// Monthly period (e.g., "2025-01")
    Monthly { year: i32, month: u32 },

    /// Calendar year (e.g., "2025")
    Yearly { year: i32 },

    /// Custom inclusive date range
    Custom { start: NaiveDate, end: NaiveDate },
}

impl BudgetPeriod {
    /// Create a weekly period (ISO week)
    pub fn weekly(year: i32, week: u32) -> Self {
        Self::Weekly { year, week }
    }

    /// Create a monthly period
    pub fn monthly(year: i32, month: u32) -> Self {
        Self::Monthly { year, month }
    }

    /// Create a yearly period
    pub fn yearly(year: i32) -> Self {
        Self::Yearly { year }
    }

    /// Create a custom period
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Self {
        Self::Custom { start, end }
    }

    /// The monthly period containing a date
    pub fn month_of(date: NaiveDate) -> Self {
        Self::Monthly {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Get the current monthly period
    pub fn current_month() -> Self {
        Self::month_of(chrono::Local::now().date_naive())
    }

    /// Get the start date of this period
    pub fn start_date(&self) -> NaiveDate {
        match self {
            Self::Weekly { year, week } => {
                NaiveDate::from_isoywd_opt(*year, *week, Weekday::Mon).unwrap_or(NaiveDate::MIN)
            }
            Self::Monthly { year, month } => {
                NaiveDate::from_ymd_opt(*year, *month, 1).unwrap_or(NaiveDate::MIN)
            }
            Self::Yearly { year } => NaiveDate::from_ymd_opt(*year, 1, 1).unwrap_or(NaiveDate::MIN),
            Self::Custom { start, .. } => *start,
        }
    }

    /// Get the end date of this period (inclusive)
    pub fn end_date(&self) -> NaiveDate {
        match self {
            Self::Weekly { .. } => self.start_date() + Duration::days(6),
            Self::Monthly { year, month } => {
                let next_month = if *month == 12 {
                    NaiveDate::from_ymd_opt(*year + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(*year, *month + 1, 1)
                };
                next_month
                    .map(|d| d - Duration::days(1))
                    .unwrap_or(NaiveDate::MIN)
            }
            Self::Yearly { year } => {
                NaiveDate::from_ymd_opt(*year, 12, 31).unwrap_or(NaiveDate::MIN)
            }
            Self::Custom { end, .. } => *end,
        }
    }

    /// Check if a date falls within this period
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date() && date <= self.end_date()
    }

    /// Get the next period of the same kind
    pub fn next(&self) -> Self {
        match self {
            Self::Weekly { .. } => {
                let next = self.start_date() + Duration::days(7);
                Self::Weekly {
                    year: next.iso_week().year(),
                    week: next.iso_week().week(),
                }
            }
            Self::Monthly { year, month } => {
                if *month == 12 {
                    Self::Monthly {
                        year: *year + 1,
                        month: 1,
                    }
                } else {
                    Self::Monthly {
                        year: *year,
                        month: *month + 1,
                    }
                }
            }
            Self::Yearly { year } => Self::Yearly { year: *year + 1 },
            Self::Custom { start, end } => {
                let duration = *end - *start;
                Self::Custom {
                    start: *end + Duration::days(1),
                    end: *end + duration + Duration::days(1),
                }
            }
        }
    }

    /// Parse a period string
    ///
    /// Formats:
    /// - Weekly: "2025-W03"
    /// - Monthly: "2025-01"
    /// - Yearly: "2025"
    /// - Custom: "2025-01-01..2025-01-15"
    pub fn parse(s: &str) -> Result<Self, PeriodParseError> {
        let s = s.trim();
        let invalid = || PeriodParseError::InvalidFormat(s.to_string());

        if let Some((year, week)) = s.split_once("-W") {
            let year: i32 = year.parse().map_err(|_| invalid())?;
            let week: u32 = week.parse().map_err(|_| invalid())?;
            if !(1..=53).contains(&week) {
                return Err(invalid());
            }
            return Ok(Self::Weekly { year, week });
        }

        if let Some((start, end)) = s.split_once("..") {
            let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").map_err(|_| invalid())?;
            let end = NaiveDate::parse_from_str(end, "%Y-%m-%d").map_err(|_| invalid())?;
            if end < start {
                return Err(invalid());
            }
            return Ok(Self::Custom { start, end });
        }

        if let Some((year, month)) = s.split_once('-') {
            let year: i32 = year.parse().map_err(|_| invalid())?;
            let month: u32 = month.parse().map_err(|_| invalid())?;
            if !(1..=12).contains(&month) {
                return Err(PeriodParseError::InvalidMonth(month));
            }
            return Ok(Self::Monthly { year, month });
        }

        let year: i32 = s.parse().map_err(|_| invalid())?;
        Ok(Self::Yearly { year })
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weekly { year, week } => write!(f, "{:04}-W{:02}", year, week),
            Self::Monthly { year, month } => write!(f, "{:04}-{:02}", year, month),
            Self::Yearly { year } => write!(f, "{:04}", year),
            Self::Custom { start, end } => write!(
                f,
                "{}..{}",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            ),
        }
    }
}

/// Error type for period parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodParseError {
    InvalidFormat(String),
    InvalidMonth(u32),
}

impl fmt::Display for PeriodParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodParseError::InvalidFormat(s) => write!(f, "Invalid period format: {}", s),
            PeriodParseError::InvalidMonth(m) => write!(f, "Invalid month: {}", m),
        }
    }
}

impl std::error::Error for PeriodParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monthly_bounds() {
        let feb = BudgetPeriod::monthly(2024, 2);
        assert_eq!(feb.start_date(), ymd(2024, 2, 1));
        assert_eq!(feb.end_date(), ymd(2024, 2, 29));

        let dec = BudgetPeriod::monthly(2025, 12);
        assert_eq!(dec.end_date(), ymd(2025, 12, 31));
    }

    #[test]
    fn test_weekly_bounds() {
        // ISO week 1 of 2025 starts on Monday December 30, 2024
        let week = BudgetPeriod::weekly(2025, 1);
        assert_eq!(week.start_date(), ymd(2024, 12, 30));
        assert_eq!(week.end_date(), ymd(2025, 1, 5));
    }

    #[test]
    fn test_yearly_bounds() {
        let year = BudgetPeriod::yearly(2025);
        assert!(year.contains(ymd(2025, 1, 1)));
        assert!(year.contains(ymd(2025, 12, 31)));
        assert!(!year.contains(ymd(2026, 1, 1)));
    }

    #[test]
    fn test_navigation() {
        assert_eq!(BudgetPeriod::monthly(2024, 12).next(), BudgetPeriod::monthly(2025, 1));
        assert_eq!(BudgetPeriod::weekly(2024, 52).next(), BudgetPeriod::weekly(2025, 1));
        assert_eq!(BudgetPeriod::yearly(2025).next(), BudgetPeriod::yearly(2026));
    }

    #[test]
    fn test_parse() {
        assert_eq!(BudgetPeriod::parse("2025-01").unwrap(), BudgetPeriod::monthly(2025, 1));
        assert_eq!(BudgetPeriod::parse("2025-W03").unwrap(), BudgetPeriod::weekly(2025, 3));
        assert_eq!(BudgetPeriod::parse("2025").unwrap(), BudgetPeriod::yearly(2025));
        assert_eq!(
            BudgetPeriod::parse("2025-01-01..2025-01-15").unwrap(),
            BudgetPeriod::custom(ymd(2025, 1, 1), ymd(2025, 1, 15))
        );
        assert_eq!(
            BudgetPeriod::parse("2025-13"),
            Err(PeriodParseError::InvalidMonth(13))
        );
        assert!(BudgetPeriod::parse("2025-01-15..2025-01-01").is_err());
        assert!(BudgetPeriod::parse("soon").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(BudgetPeriod::monthly(2025, 1).to_string(), "2025-01");
        assert_eq!(BudgetPeriod::weekly(2025, 3).to_string(), "2025-W03");
        assert_eq!(BudgetPeriod::yearly(2025).to_string(), "2025");
    }

    #[test]
    fn test_serialization() {
        let period = BudgetPeriod::monthly(2025, 1);
        let json = serde_json::to_string(&period).unwrap();
        let deserialized: BudgetPeriod = serde_json::from_str(&json).unwrap();
        assert_eq!(period, deserialized);
    }
}
