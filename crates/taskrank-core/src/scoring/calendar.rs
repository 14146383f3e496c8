//! Business-day arithmetic over a holiday calendar.
//!
//! A business day is a Monday–Friday date that is not a holiday. Holidays
//! are either fixed annual dates (`MM-DD`, expanded for every year asked
//! about) or one-off dates (`YYYY-MM-DD`).

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::ConfigError;

/// Fixed-date national holidays used when no calendar is configured:
/// New Year's Day, Juneteenth, Independence Day, Veterans Day, Christmas.
pub const DEFAULT_FIXED_HOLIDAYS: &[&str] = &["01-01", "06-19", "07-04", "11-11", "12-25"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HolidayCalendar {
    fixed: BTreeSet<(u32, u32)>,
    dates: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    /// A calendar with no holidays: only weekends are skipped.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in calendar of [`DEFAULT_FIXED_HOLIDAYS`].
    pub fn national() -> Self {
        let mut cal = Self::empty();
        for entry in DEFAULT_FIXED_HOLIDAYS {
            // Entries above are known-valid month/day pairs.
            if let Some((m, d)) = parse_month_day(entry) {
                cal.fixed.insert((m, d));
            }
        }
        cal
    }

    /// Build a calendar from config entries.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] for an entry that is not a real
    /// `MM-DD` / `YYYY-MM-DD` date.
    pub fn from_entries(fixed: &[String], dates: &[String]) -> Result<Self, ConfigError> {
        let mut cal = Self::empty();
        for entry in fixed {
            let (m, d) = parse_month_day(entry).ok_or_else(|| ConfigError::InvalidValue {
                key: "holidays.fixed".into(),
                message: format!("'{entry}' is not a valid MM-DD date"),
            })?;
            cal.fixed.insert((m, d));
        }
        for entry in dates {
            let date = NaiveDate::parse_from_str(entry.trim(), "%Y-%m-%d").map_err(|_| {
                ConfigError::InvalidValue {
                    key: "holidays.dates".into(),
                    message: format!("'{entry}' is not a valid YYYY-MM-DD date"),
                }
            })?;
            cal.dates.insert(date);
        }
        Ok(cal)
    }

    pub fn add_date(&mut self, date: NaiveDate) -> &mut Self {
        self.dates.insert(date);
        self
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date) || self.fixed.contains(&(date.month(), date.day()))
    }

    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        is_weekday(date) && !self.is_holiday(date)
    }

    /// Every holiday falling in `year`, sorted. Feb 29 entries are skipped in
    /// non-leap years.
    pub fn holidays_in_year(&self, year: i32) -> Vec<NaiveDate> {
        let mut out: BTreeSet<NaiveDate> = self
            .fixed
            .iter()
            .filter_map(|&(m, d)| NaiveDate::from_ymd_opt(year, m, d))
            .collect();
        out.extend(self.dates.iter().copied().filter(|d| d.year() == year));
        out.into_iter().collect()
    }

    /// Business days in the half-open range `[start, end)`. Zero when
    /// `end <= start`.
    pub fn business_days_between(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        if end <= start {
            return 0;
        }

        let mut count = weekdays_between(start, end);
        for year in start.year()..=end.year() {
            count -= self
                .holidays_in_year(year)
                .into_iter()
                .filter(|&h| h >= start && h < end && is_weekday(h))
                .count() as i64;
        }
        count
    }

    /// Signed business-day distance from `today` to `due`.
    ///
    /// Non-negative when `due` is today or later (count over `[today, due)`);
    /// negative when `due` has passed (negated count over `[due, today)`).
    pub fn business_day_offset(&self, today: NaiveDate, due: NaiveDate) -> i64 {
        if due >= today {
            self.business_days_between(today, due)
        } else {
            -self.business_days_between(due, today)
        }
    }
}

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Weekdays in `[start, end)`, computed in whole weeks plus a short tail.
fn weekdays_between(start: NaiveDate, end: NaiveDate) -> i64 {
    let days = (end - start).num_days();
    let full_weeks = days / 7;
    let mut count = full_weeks * 5;
    let tail_start = start + Duration::days(full_weeks * 7);
    for offset in 0..(days % 7) {
        if is_weekday(tail_start + Duration::days(offset)) {
            count += 1;
        }
    }
    count
}

fn parse_month_day(entry: &str) -> Option<(u32, u32)> {
    let (m, d) = entry.trim().split_once('-')?;
    let month: u32 = m.parse().ok()?;
    let day: u32 = d.parse().ok()?;
    // 2000 is a leap year, so Feb 29 is accepted.
    NaiveDate::from_ymd_opt(2000, month, day).map(|_| (month, day))
}
