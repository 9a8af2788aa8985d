//! Observing date parsing and formatting.

use chrono::{Datelike, Utc};
use regex_lite::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors produced while validating an observing date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("date value is blank")]
    Blank,

    #[error("unknown date format: '{0}' (expected YYYY-MM-DD)")]
    UnknownFormat(String),

    #[error("year value must be 1990 or larger, got {0}")]
    YearOutOfRange(u32),

    #[error("month value must be between 1 and 12, got {0}")]
    MonthOutOfRange(u32),

    #[error("day value must be between 1 and 31, got {0}")]
    DayOutOfRange(u32),
}

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4})[-/](\d{2})[-/](\d{2})$").expect("date pattern is valid")
    })
}

/// A validated UT observing date.
///
/// Day values are only range-checked (1-31), not checked against the
/// month length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObservingDate {
    year: u32,
    month: u32,
    day: u32,
}

impl ObservingDate {
    /// Earliest accepted year.
    pub const MIN_YEAR: u32 = 1990;

    /// Parses `YYYY-MM-DD` or `YYYY/MM/DD`.
    pub fn parse(input: &str) -> Result<Self, DateError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(DateError::Blank);
        }

        let captures = date_pattern()
            .captures(input)
            .ok_or_else(|| DateError::UnknownFormat(input.to_string()))?;

        let field = |idx: usize| -> Result<u32, DateError> {
            captures[idx]
                .parse::<u32>()
                .map_err(|_| DateError::UnknownFormat(input.to_string()))
        };
        let (year, month, day) = (field(1)?, field(2)?, field(3)?);

        if year < Self::MIN_YEAR {
            return Err(DateError::YearOutOfRange(year));
        }
        if !(1..=12).contains(&month) {
            return Err(DateError::MonthOutOfRange(month));
        }
        if !(1..=31).contains(&day) {
            return Err(DateError::DayOutOfRange(day));
        }

        Ok(Self { year, month, day })
    }

    /// The current UTC date.
    pub fn today_utc() -> Self {
        let today = Utc::now().date_naive();
        Self {
            year: today.year() as u32,
            month: today.month(),
            day: today.day(),
        }
    }

    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// `YYYY-MM-DD`
    pub fn canonical(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// `YYYYMMDD`
    pub fn compact(&self) -> String {
        format!("{:04}{:02}{:02}", self.year, self.month, self.day)
    }

    /// Two-digit year used by the instrument directory convention.
    pub fn short_year(&self) -> String {
        format!("{:02}", self.year % 100)
    }
}

impl fmt::Display for ObservingDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for ObservingDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ObservingDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical())
    }
}
