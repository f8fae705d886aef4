//! Shared calendar utilities and enums for projection primitives.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Longest projection window any configuration may allow, in days.
pub const WINDOW_DAYS_LIMIT: i64 = 4096;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
/// Inclusive range of calendar days a projection covers.
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateWindowError> {
        if start > end {
            return Err(DateWindowError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Single-day window.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days covered, counting both ends. Zero for an inverted window.
    pub fn len_days(&self) -> i64 {
        if self.start > self.end {
            return 0;
        }
        (self.end - self.start).num_days() + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + Clone {
        let start = self.start;
        (0..self.len_days()).map(move |offset| start + Duration::days(offset))
    }

    /// Intersects the window with `[from, until]`, returning `None` when they do not overlap.
    pub fn clamp(&self, from: NaiveDate, until: NaiveDate) -> Option<DateWindow> {
        let start = self.start.max(from);
        let end = self.end.min(until);
        (start <= end).then_some(DateWindow { start, end })
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Errors that can occur when constructing [`DateWindow`] values.
pub enum DateWindowError {
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

impl fmt::Display for DateWindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateWindowError::InvalidRange { start, end } => {
                write!(f, "date window start {start} is after end {end}")
            }
        }
    }
}

impl std::error::Error for DateWindowError {}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
/// What happens to an unpaid invoice whose resolved date lies before the window.
pub enum OverduePolicy {
    /// Expect the cash on the first day of the window.
    #[default]
    CarryForward,
    /// Leave the invoice out of the projection.
    Exclude,
}

impl OverduePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "carry_forward" | "carry" => Some(OverduePolicy::CarryForward),
            "exclude" | "drop" => Some(OverduePolicy::Exclude),
            _ => None,
        }
    }
}

impl fmt::Display for OverduePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OverduePolicy::CarryForward => "carry_forward",
            OverduePolicy::Exclude => "exclude",
        };
        f.write_str(label)
    }
}

/// Moves `date` by `months` calendar months, clamping the day to the target month's length.
///
/// Returns `None` only when the result falls outside chrono's representable range.
pub fn shift_month(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let index = i64::from(date.year()) * 12 + i64::from(date.month0()) + months;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some((first_next - Duration::days(1)).day())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let window = DateWindow::new(date(2024, 3, 1), date(2024, 3, 5)).unwrap();
        assert!(window.contains(date(2024, 3, 1)));
        assert!(window.contains(date(2024, 3, 5)));
        assert!(!window.contains(date(2024, 3, 6)));
        assert_eq!(window.len_days(), 5);
        assert_eq!(window.days().count(), 5);
    }

    #[test]
    fn window_rejects_inverted_range() {
        let err = DateWindow::new(date(2024, 3, 5), date(2024, 3, 1)).unwrap_err();
        assert!(matches!(err, DateWindowError::InvalidRange { .. }));
    }

    #[test]
    fn shift_month_clamps_to_month_end() {
        assert_eq!(shift_month(date(2024, 1, 31), 1), Some(date(2024, 2, 29)));
        assert_eq!(shift_month(date(2023, 1, 31), 1), Some(date(2023, 2, 28)));
        assert_eq!(shift_month(date(2024, 1, 31), 2), Some(date(2024, 3, 31)));
        assert_eq!(shift_month(date(2024, 11, 30), 3), Some(date(2025, 2, 28)));
        assert_eq!(shift_month(date(2024, 3, 31), -1), Some(date(2024, 2, 29)));
    }

    #[test]
    fn overdue_policy_parses_cli_spellings() {
        assert_eq!(
            OverduePolicy::parse("carry-forward"),
            Some(OverduePolicy::CarryForward)
        );
        assert_eq!(OverduePolicy::parse("Exclude"), Some(OverduePolicy::Exclude));
        assert_eq!(OverduePolicy::parse("later"), None);
    }
}
