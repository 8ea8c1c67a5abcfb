use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

/// Format of capture timestamps returned by the archive CDX API.
pub const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Calendar month bucket used as the aggregation key for every analysis.
///
/// Orders chronologically and renders as `YYYY-MM`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid period {0:?}, expected YYYY-MM")]
pub struct ParsePeriodError(String);

impl FromStr for Period {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePeriodError(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(err)?;
        let year = year.parse::<i32>().map_err(|_| err())?;
        let month = month.parse::<u32>().map_err(|_| err())?;
        Period::new(year, month).ok_or_else(err)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse a 14-digit archive capture timestamp (`20200115083000`).
pub fn parse_archive_timestamp(ts: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(ts, ARCHIVE_TIMESTAMP_FORMAT).ok()
}

/// `YYYYMMDD` form used for CDX `from`/`to` bounds.
pub fn cdx_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}
