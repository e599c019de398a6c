use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use thiserror::Error;

// ---------------------------------------------------------------------------
// RecordError – why a single row was rejected
// ---------------------------------------------------------------------------

/// A data-quality fault in one source row. The loader attaches the row number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("missing value for '{0}'")]
    MissingField(&'static str),
    #[error("'{0}' is not a calendar date")]
    InvalidDate(String),
    #[error("'{0}' is not a year")]
    InvalidYear(String),
    #[error("year {year} does not match date {date}")]
    YearMismatch { year: i32, date: NaiveDate },
    #[error("unknown season '{0}'")]
    UnknownSeason(String),
    #[error("'{0}' is not a working-day flag")]
    InvalidWorkingDay(String),
    #[error("time period is empty")]
    EmptyTimePeriod,
    #[error("{field}: '{value}' is not a non-negative count")]
    InvalidCount { field: &'static str, value: String },
    #[error("casual {casual} + registered {registered} does not fit in a count")]
    CountOverflow { casual: u64, registered: u64 },
    #[error("total {total} != casual {casual} + registered {registered}")]
    TotalMismatch {
        casual: u64,
        registered: u64,
        total: u64,
    },
}

// ---------------------------------------------------------------------------
// Season
// ---------------------------------------------------------------------------

/// Season of a usage record, ordered in calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    /// Numeric season codes as used by the UCI bike-sharing dataset (1 = spring).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Season::Spring),
            2 => Some(Season::Summer),
            3 => Some(Season::Fall),
            4 => Some(Season::Winter),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Season {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i64>() {
            return Season::from_code(code).ok_or_else(|| RecordError::UnknownSeason(s.to_string()));
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "spring" | "springer" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "fall" | "autumn" => Ok(Season::Fall),
            "winter" => Ok(Season::Winter),
            _ => Err(RecordError::UnknownSeason(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a calendar date. Datetimes are accepted and truncated to their date.
pub fn parse_date(s: &str) -> Result<NaiveDate, RecordError> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .ok_or_else(|| RecordError::InvalidDate(s.to_string()))
}

/// Parse a working-day flag: numeric, boolean, yes/no, or a day-type label.
pub fn parse_working_day(s: &str) -> Result<bool, RecordError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "working day" | "workingday" | "weekday" => Ok(true),
        "0" | "false" | "no" | "holiday" | "weekend" | "non-working day" | "non working day" => {
            Ok(false)
        }
        _ => Err(RecordError::InvalidWorkingDay(s.to_string())),
    }
}

/// Parse a non-negative count. Integral floats (`"12.0"`) are accepted.
pub fn parse_count(field: &'static str, s: &str) -> Result<u64, RecordError> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u64>() {
        return Ok(n);
    }
    // `u64::MAX as f64` rounds up to 2^64, which is already out of range.
    match s.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => Ok(f as u64),
        _ => Err(RecordError::InvalidCount {
            field,
            value: s.to_string(),
        }),
    }
}

pub fn parse_year(s: &str) -> Result<i32, RecordError> {
    let s = s.trim();
    let year = s
        .parse::<i32>()
        .ok()
        .or_else(|| {
            s.parse::<f64>()
                .ok()
                .filter(|f| f.fract() == 0.0)
                .map(|f| f as i32)
        })
        .ok_or_else(|| RecordError::InvalidYear(s.to_string()))?;
    // Coded years (0/1) cannot be matched against the date.
    if year < 1000 {
        return Err(RecordError::InvalidYear(s.to_string()));
    }
    Ok(year)
}

// ---------------------------------------------------------------------------
// UsageRecord – one row of the source table
// ---------------------------------------------------------------------------

/// Rental activity in one time bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub date: NaiveDate,
    pub year: i32,
    pub season: Season,
    pub working_day: bool,
    pub time_period: String,
    pub casual: u64,
    pub registered: u64,
    /// Always `casual + registered`.
    pub total: u64,
}

impl UsageRecord {
    /// Build a record, checking the year against the date and the total
    /// against the customer counts. `year`/`total` default from the other
    /// fields when the source has no such column.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: NaiveDate,
        year: Option<i32>,
        season: Season,
        working_day: bool,
        time_period: &str,
        casual: u64,
        registered: u64,
        total: Option<u64>,
    ) -> Result<Self, RecordError> {
        let year = match year {
            Some(y) if y != date.year() => return Err(RecordError::YearMismatch { year: y, date }),
            Some(y) => y,
            None => date.year(),
        };

        let time_period = time_period.trim();
        if time_period.is_empty() {
            return Err(RecordError::EmptyTimePeriod);
        }

        let sum = casual
            .checked_add(registered)
            .ok_or(RecordError::CountOverflow { casual, registered })?;
        let total = total.unwrap_or(sum);
        if total != sum {
            return Err(RecordError::TotalMismatch {
                casual,
                registered,
                total,
            });
        }

        Ok(UsageRecord {
            date,
            year,
            season,
            working_day,
            time_period: time_period.to_string(),
            casual,
            registered,
            total,
        })
    }
}

// ---------------------------------------------------------------------------
// UsageTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The loaded dataset plus the distinct years it covers.
#[derive(Debug, Clone, Default)]
pub struct UsageTable {
    records: Vec<UsageRecord>,
    years: BTreeSet<i32>,
}

impl UsageTable {
    pub fn from_records(records: Vec<UsageRecord>) -> Self {
        let years = records.iter().map(|r| r.year).collect();
        UsageTable { records, years }
    }

    pub fn records(&self) -> &[UsageRecord] {
        &self.records
    }

    /// Records belonging to `year`, in source order.
    pub fn records_in(&self, year: i32) -> impl Iterator<Item = &UsageRecord> {
        self.records().iter().filter(move |r| r.year == year)
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> &BTreeSet<i32> {
        &self.years
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
