//! Calendar value types shared by the store, cache window and renderer.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::dates::{add_months, first_of_month};

/// Years a month context may name. Keeps every shifted month representable.
pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

/// The month currently displayed. Immutable; navigation produces a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "MonthParts", into = "MonthParts")]
pub struct MonthContext {
    first: NaiveDate,
}

#[derive(Serialize, Deserialize)]
struct MonthParts {
    year: i32,
    month: u32,
}

impl TryFrom<MonthParts> for MonthContext {
    type Error = String;

    fn try_from(parts: MonthParts) -> Result<Self, Self::Error> {
        MonthContext::new(parts.year, parts.month)
            .ok_or_else(|| format!("invalid month {}-{:02}", parts.year, parts.month))
    }
}

impl From<MonthContext> for MonthParts {
    fn from(ctx: MonthContext) -> Self {
        Self {
            year: ctx.year(),
            month: ctx.month(),
        }
    }
}

impl MonthContext {
    /// Build a context, rejecting months outside 1..=12 and years outside
    /// `MIN_YEAR..=MAX_YEAR`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return None;
        }
        first_of_month(year, month).map(|first| Self { first })
    }

    /// The month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    /// The month containing the local date.
    pub fn today() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// Move by `delta` months. Results outside the supported year range
    /// leave the context unchanged.
    pub fn shift(&self, delta: i32) -> Self {
        let (year, month) = add_months(self.year(), self.month(), delta);
        Self::new(year, month).unwrap_or(*self)
    }

    /// "September 2025"
    pub fn label(&self) -> String {
        self.first.format("%B %Y").to_string()
    }
}

impl fmt::Display for MonthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year(), self.month())
    }
}

/// A stored calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub date: NaiveDate,
    /// Time of day as stored ("HH:MM"). Rendered verbatim when malformed.
    pub time: Option<String>,
    pub title: String,
    pub author: String,
}

/// A row to insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub title: String,
    pub author: String,
}

impl NewEvent {
    /// Stored form of the time column.
    pub fn time_text(&self) -> Option<String> {
        self.time.map(|t| t.format("%H:%M").to_string())
    }
}

/// ISO date -> events on that day, ordered by time (untimed last), then
/// insertion order. Rebuilt wholesale on every fetch.
pub type EventsMapping = BTreeMap<String, Vec<EventRecord>>;

/// Half-open date range `[start, end)` covered by a fetched mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CacheRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

impl fmt::Display for CacheRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Key used in `EventsMapping`.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
