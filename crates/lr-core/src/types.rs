//! Core type definitions with validation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for user-supplied values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The input is neither a video ID nor a recognised video link.
    #[error("Please enter a valid YouTube link or 11-character video ID.")]
    InvalidVideoReference { input: String },

    /// The value is not a `YYYY-MM-DD` date.
    #[error("invalid day key: {value}")]
    InvalidDayKey { value: String },

    /// Unknown category name.
    #[error("invalid category: {value}")]
    InvalidCategory { value: String },
}

/// Commands an engine refuses to carry out.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A countdown is already live for this card.
    #[error("{category} countdown is already running")]
    AlreadyRunning { category: Category },
}

/// Accounting bucket for elapsed seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Focused learning time.
    Learning,
    /// Rest time, whether plain or video driven.
    Rest,
}

impl Category {
    /// All categories tracked per day.
    pub const ALL: [Self; 2] = [Self::Learning, Self::Rest];

    /// String representation for display and parsing.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Learning => "learning",
            Self::Rest => "rest",
        }
    }

    /// Suffix of the persisted counter key for this category.
    #[must_use]
    pub const fn key_suffix(&self) -> &'static str {
        match self {
            Self::Learning => "learnSec",
            Self::Rest => "restSec",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "learning" => Ok(Self::Learning),
            "rest" => Ok(Self::Rest),
            _ => Err(ValidationError::InvalidCategory {
                value: s.to_string(),
            }),
        }
    }
}

/// Calendar day (local time) that namespaces persisted totals.
///
/// Formats as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayKey(NaiveDate);

impl DayKey {
    /// Creates a day key for the given date.
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The local calendar day containing `instant`.
    #[must_use]
    pub fn containing<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self(instant.with_timezone(&Local).date_naive())
    }

    /// Today's day key in local time.
    #[must_use]
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Returns the underlying date.
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DayKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| ValidationError::InvalidDayKey {
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for DayKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DayKey> for String {
    fn from(day: DayKey) -> Self {
        day.to_string()
    }
}

/// Seconds an engine wants added to the daily totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credit {
    /// Bucket the seconds belong to.
    pub category: Category,
    /// Whole seconds to add.
    pub seconds: u64,
    /// True when the session ran to its natural end; drives the completion cue.
    pub completed: bool,
}
