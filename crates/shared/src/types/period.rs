//! Billing period type for consumption records.
//!
//! A billing period is a calendar month in `YYYY-MM` form. Together with the
//! contract and consumption type it forms the natural key used for duplicate
//! detection, so parsing is strict: exactly four year digits, a dash, and a
//! month between 01 and 12.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when parsing a billing period fails.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodParseError {
    /// Input did not match the `YYYY-MM` shape.
    #[error("period must have the form YYYY-MM, got '{0}'")]
    Malformed(String),

    /// Month component was outside 1..=12.
    #[error("month must be between 01 and 12, got {0}")]
    MonthOutOfRange(u32),
}

/// A calendar month used as the consumption billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BillingPeriod {
    year: i32,
    month: u32,
}

impl BillingPeriod {
    /// Creates a period from year and month.
    ///
    /// # Errors
    ///
    /// Returns `PeriodParseError::MonthOutOfRange` if month is not 1..=12.
    pub const fn new(year: i32, month: u32) -> Result<Self, PeriodParseError> {
        if month == 0 || month > 12 {
            return Err(PeriodParseError::MonthOutOfRange(month));
        }
        Ok(Self { year, month })
    }

    /// Returns the year component.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Returns the month component (1..=12).
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// Returns the period immediately following this one.
    #[must_use]
    pub const fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Returns the period for the given date.
    #[must_use]
    pub fn from_date(date: chrono::NaiveDate) -> Self {
        use chrono::Datelike;
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for BillingPeriod {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PeriodParseError::Malformed(s.to_string());

        let (year_part, month_part) = s.split_once('-').ok_or_else(malformed)?;
        if year_part.len() != 4 || month_part.len() != 2 {
            return Err(malformed());
        }

        let year: i32 = year_part.parse().map_err(|_| malformed())?;
        let month: u32 = month_part.parse().map_err(|_| malformed())?;

        Self::new(year, month)
    }
}

impl TryFrom<String> for BillingPeriod {
    type Error = PeriodParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BillingPeriod> for String {
    fn from(period: BillingPeriod) -> Self {
        period.to_string()
    }
}
