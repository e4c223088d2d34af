//! Toolkit-independent render model for the month view.
//!
//! `build_grid` is pure: the same month, mapping, selection, `today` and
//! palette always produce the same grid.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::Serialize;

use crate::dates::month_grid_days;
use crate::types::{date_key, EventRecord, EventsMapping, MonthContext};

/// Badges rendered per day before collapsing into "+N more".
pub const MAX_VISIBLE_BADGES: usize = 3;

pub const WEEKDAY_HEADERS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub const NO_EVENTS_MESSAGE: &str = "No events";

/// Author -> badge color, matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorPalette {
    colors: HashMap<String, String>,
    default_color: String,
}

impl AuthorPalette {
    pub fn new(default_color: impl Into<String>) -> Self {
        Self {
            colors: HashMap::new(),
            default_color: default_color.into(),
        }
    }

    pub fn with_author(mut self, name: &str, color: impl Into<String>) -> Self {
        self.colors.insert(name.trim().to_lowercase(), color.into());
        self
    }

    pub fn from_pairs<'a, I>(default_color: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        pairs
            .into_iter()
            .fold(Self::new(default_color), |palette, (name, color)| {
                palette.with_author(name, color)
            })
    }

    pub fn color_for(&self, author: &str) -> &str {
        self.colors
            .get(&author.trim().to_lowercase())
            .map(String::as_str)
            .unwrap_or(&self.default_color)
    }

    pub fn default_color(&self) -> &str {
        &self.default_color
    }
}

impl Default for AuthorPalette {
    fn default() -> Self {
        Self::new("#868e96")
    }
}

/// One event chip inside a day cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub label: String,
    pub color: String,
    pub author: String,
    pub title: String,
}

/// One square of the month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub in_current_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub badges: Vec<Badge>,
    pub overflow_count: usize,
    /// Every title of the day, newline separated. `None` on empty days.
    pub tooltip: Option<String>,
}

impl DayCell {
    pub fn day_number(&self) -> u32 {
        self.date.day()
    }

    pub fn overflow_label(&self) -> Option<String> {
        (self.overflow_count > 0).then(|| format!("+{} more", self.overflow_count))
    }

    /// Style classes for the cell.
    pub fn classes(&self) -> Vec<&'static str> {
        let mut classes = vec!["cal-day"];
        if !self.in_current_month {
            classes.push("cal-day--out");
        }
        if self.is_today {
            classes.push("cal-day--today");
        }
        if self.is_selected {
            classes.push("cal-day--selected");
        }
        classes
    }
}

/// Six Sunday-first weeks of day cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub context: MonthContext,
    pub label: String,
    pub weeks: Vec<Vec<DayCell>>,
}

impl MonthGrid {
    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flatten()
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&DayCell> {
        self.days().find(|cell| cell.date == date)
    }
}

/// Build the render model for `ctx`.
pub fn build_grid(
    ctx: MonthContext,
    mapping: &EventsMapping,
    selected: Option<NaiveDate>,
    today: NaiveDate,
    palette: &AuthorPalette,
) -> MonthGrid {
    let first = ctx.first_day();
    // Always Some for months within MonthContext bounds.
    let days = month_grid_days(ctx.year(), ctx.month()).unwrap_or([[first; 7]; 6]);

    let weeks = days
        .iter()
        .map(|week| {
            week.iter()
                .map(|&date| {
                    day_cell(
                        date,
                        ctx,
                        events_on(mapping, date),
                        selected == Some(date),
                        date == today,
                        palette,
                    )
                })
                .collect()
        })
        .collect();

    MonthGrid {
        context: ctx,
        label: ctx.label(),
        weeks,
    }
}

fn events_on(mapping: &EventsMapping, date: NaiveDate) -> &[EventRecord] {
    mapping.get(&date_key(date)).map(Vec::as_slice).unwrap_or(&[])
}

fn day_cell(
    date: NaiveDate,
    ctx: MonthContext,
    events: &[EventRecord],
    is_selected: bool,
    is_today: bool,
    palette: &AuthorPalette,
) -> DayCell {
    let badges = events
        .iter()
        .take(MAX_VISIBLE_BADGES)
        .map(|ev| {
            let time = format_time_12h(ev.time.as_deref());
            let label = if time.is_empty() {
                ev.title.clone()
            } else {
                format!("{} · {}", time, ev.title)
            };
            Badge {
                label,
                color: palette.color_for(&ev.author).to_string(),
                author: ev.author.clone(),
                title: ev.title.clone(),
            }
        })
        .collect();

    let tooltip = (!events.is_empty()).then(|| {
        events
            .iter()
            .map(|ev| ev.title.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    });

    DayCell {
        date,
        in_current_month: date.year() == ctx.year() && date.month() == ctx.month(),
        is_today,
        is_selected,
        badges,
        overflow_count: events.len().saturating_sub(MAX_VISIBLE_BADGES),
        tooltip,
    }
}

/// "17:04" -> "5:04 PM". Missing time is empty; unparseable text is returned
/// verbatim.
pub fn format_time_12h(time: Option<&str>) -> String {
    let Some(raw) = time else {
        return String::new();
    };
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map(|t| t.format("%-I:%M %p").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// "Friday, September 5, 2025"
pub fn pretty_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Heading of the add-event dialog for `date`.
pub fn modal_title(date: NaiveDate) -> String {
    pretty_date(date)
}

/// One event in the selected-day side panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelRow {
    pub time: String,
    pub title: String,
    pub author: String,
    pub color: String,
}

/// Side panel for the selected day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedDayPanel {
    pub date: NaiveDate,
    pub heading: String,
    pub rows: Vec<PanelRow>,
}

impl SelectedDayPanel {
    /// Shown instead of rows when the day is empty.
    pub fn empty_message(&self) -> Option<&'static str> {
        self.rows.is_empty().then_some(NO_EVENTS_MESSAGE)
    }
}

pub fn selected_day_panel(
    date: NaiveDate,
    mapping: &EventsMapping,
    palette: &AuthorPalette,
) -> SelectedDayPanel {
    let rows = events_on(mapping, date)
        .iter()
        .map(|ev| PanelRow {
            time: format_time_12h(ev.time.as_deref()),
            title: ev.title.clone(),
            author: ev.author.clone(),
            color: palette.color_for(&ev.author).to_string(),
        })
        .collect();

    SelectedDayPanel {
        date,
        heading: pretty_date(date),
        rows,
    }
}
