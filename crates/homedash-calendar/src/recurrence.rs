//! Recurrence expansion for new events.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, Months, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, CalendarResult};
use crate::types::NewEvent;

/// Upper bound on dates produced by one expansion.
pub const MAX_OCCURRENCES: usize = 2000;

/// How often an event repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::None => "none",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Frequency::None)
    }

    /// Next occurrence after `date`. Monthly steps clamp to the last day of
    /// the target month.
    pub fn step(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Frequency::None => None,
            Frequency::Daily => date.checked_add_signed(Duration::days(1)),
            Frequency::Weekly => date.checked_add_signed(Duration::days(7)),
            Frequency::Monthly => date.checked_add_months(Months::new(1)),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Frequency::None),
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(CalendarError::invalid(format!(
                "Unknown recurrence '{}'.",
                other
            ))),
        }
    }
}

/// Parse user-entered time text.
///
/// Accepts "HH:MM" (24h) or "H:MM AM/PM". Blank input means no time.
pub fn parse_time_text(text: &str) -> CalendarResult<Option<NaiveTime>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    if let Ok(t) = NaiveTime::parse_from_str(text, "%H:%M") {
        return Ok(Some(t));
    }
    if let Ok(t) = NaiveTime::parse_from_str(&text.to_ascii_uppercase(), "%I:%M %p") {
        return Ok(Some(t));
    }
    Err(CalendarError::invalid(format!(
        "Invalid time '{}'. Use HH:MM or H:MM AM/PM.",
        text
    )))
}

/// Dates from `start` stepping by `frequency` while `<= end`, capped at
/// `MAX_OCCURRENCES`. A single date when there is nothing to repeat.
pub fn expand_dates(start: NaiveDate, end: Option<NaiveDate>, frequency: Frequency) -> Vec<NaiveDate> {
    let end = match end {
        Some(end) if frequency.is_recurring() && end > start => end,
        _ => return vec![start],
    };

    let mut dates = Vec::new();
    let mut cur = Some(start);
    while let Some(date) = cur {
        if date > end || dates.len() >= MAX_OCCURRENCES {
            break;
        }
        dates.push(date);
        cur = frequency.step(date);
    }
    dates
}

/// A save request from the event form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRequest {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    pub frequency: Frequency,
    pub title: String,
    pub author: String,
    pub time_text: String,
}

impl RecurrenceRequest {
    /// Check user input before any I/O. Returns the parsed time.
    pub fn validate(&self) -> CalendarResult<Option<NaiveTime>> {
        if self.title.trim().is_empty() {
            return Err(CalendarError::invalid("Title required."));
        }
        if self.frequency.is_recurring() {
            match self.end {
                None => {
                    return Err(CalendarError::invalid(
                        "Please choose an end date for the recurrence.",
                    ))
                }
                Some(end) if end < self.start => {
                    return Err(CalendarError::invalid(
                        "End date must be on or after the start date.",
                    ))
                }
                Some(_) => {}
            }
        }
        parse_time_text(&self.time_text)
    }

    /// Validate and produce the rows to insert.
    pub fn expand(&self) -> CalendarResult<Vec<NewEvent>> {
        let time = self.validate()?;
        let title = self.title.trim().to_string();
        let author = self.author.trim().to_string();

        let events: Vec<NewEvent> = expand_dates(self.start, self.end, self.frequency)
            .into_iter()
            .map(|date| NewEvent {
                date,
                time,
                title: title.clone(),
                author: author.clone(),
            })
            .collect();

        tracing::debug!(
            "Expanded {} recurrence from {} into {} events",
            self.frequency,
            self.start,
            events.len()
        );
        Ok(events)
    }
}
