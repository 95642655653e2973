//! Report data types
//!
//! Core types shared by the form, the HTTP client and the chart renderer.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{ReportError, ReportResult};

/// Wire format of an HTML `datetime-local` input
pub const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Same as [`DATETIME_LOCAL_FORMAT`] with seconds and optional fractional
/// seconds, which browsers emit when a `step` below one minute is set
const DATETIME_LOCAL_SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse a `datetime-local` string (`YYYY-MM-DDTHH:MM[:SS[.fff]]`)
pub fn parse_datetime_local(value: &str) -> ReportResult<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, DATETIME_LOCAL_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, DATETIME_LOCAL_SECONDS_FORMAT))
        .map_err(|_| ReportError::InvalidDateTime(value.to_string()))
}

/// Format a timestamp the way a `datetime-local` input submits it
///
/// Seconds are only written when they or the fraction are non-zero.
pub fn format_datetime_local(value: &NaiveDateTime) -> String {
    if value.second() == 0 && value.nanosecond() == 0 {
        value.format(DATETIME_LOCAL_FORMAT).to_string()
    } else {
        value.format(DATETIME_LOCAL_SECONDS_FORMAT).to_string()
    }
}

/// Bucket size the server aggregates counts into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One bucket per hour
    #[default]
    Hour,
    /// One bucket per day
    Day,
    /// One bucket per week
    Week,
    /// One bucket per calendar month
    Month,
}

impl Granularity {
    /// All granularities in button order
    pub const ALL: [Granularity; 4] = [
        Granularity::Hour,
        Granularity::Day,
        Granularity::Week,
        Granularity::Month,
    ];

    /// Value sent as the `data_type` field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Button caption
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hour => "Hourly",
            Self::Day => "Daily",
            Self::Week => "Weekly",
            Self::Month => "Monthly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(ReportError::InvalidGranularity(other.to_string())),
        }
    }
}

/// Requested reporting window
///
/// Both ends are required. No ordering is enforced: the server decides what
/// to do with a start that lies after the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// True when start lies after end
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

/// Payload for one `POST /get_trends` submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendsRequest {
    pub range: DateRange,
    pub granularity: Granularity,
}

impl TrendsRequest {
    pub const START_DATE_FIELD: &'static str = "start_date";
    pub const END_DATE_FIELD: &'static str = "end_date";
    pub const DATA_TYPE_FIELD: &'static str = "data_type";

    pub fn new(range: DateRange, granularity: Granularity) -> Self {
        Self { range, granularity }
    }

    /// Form fields in submission order
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            (Self::START_DATE_FIELD, format_datetime_local(&self.range.start)),
            (Self::END_DATE_FIELD, format_datetime_local(&self.range.end)),
            (Self::DATA_TYPE_FIELD, self.granularity.as_str().to_string()),
        ]
    }
}

/// Response body exactly as the server sends it
#[derive(Debug, Deserialize)]
struct RawTrendsResponse {
    date_list: Option<Vec<String>>,
    count_list: Option<Vec<f64>>,
}

/// Decoded `/get_trends` response: index-aligned labels and counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendsResponse {
    #[serde(rename = "date_list")]
    pub dates: Vec<String>,
    #[serde(rename = "count_list")]
    pub counts: Vec<f64>,
}

impl TrendsResponse {
    /// Build a response, rejecting arrays of different length
    pub fn new(dates: Vec<String>, counts: Vec<f64>) -> ReportResult<Self> {
        if dates.len() != counts.len() {
            return Err(ReportError::LengthMismatch {
                labels: dates.len(),
                values: counts.len(),
            });
        }
        Ok(Self { dates, counts })
    }

    /// Decode and validate a JSON body
    pub fn from_json(body: &str) -> ReportResult<Self> {
        let raw: RawTrendsResponse = serde_json::from_str(body)?;

        let dates = raw
            .date_list
            .ok_or_else(|| ReportError::Decode("missing field `date_list`".to_string()))?;
        let counts = raw
            .count_list
            .ok_or_else(|| ReportError::Decode("missing field `count_list`".to_string()))?;

        Self::new(dates, counts)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Split into chart labels and values
    pub fn into_parts(self) -> (Vec<String>, Vec<f64>) {
        (self.dates, self.counts)
    }
}
