//! Calendar page model.
//!
//! Holds the per-page session, the add-event dialog state and the flash
//! line, and applies `CalendarAction`s to them.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use homedash_calendar::{
    modal_title, AuthorPalette, CalendarError, CalendarResult, CalendarSession, EventStore,
    Frequency, MonthGrid, RecurrenceRequest, SelectedDayPanel, SqliteEventStore,
};
use homedash_core::{CalendarConfig, Config};

use crate::error_mapping::IntoAppError;

/// Values of the add-event form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventForm {
    pub title: String,
    pub time_text: String,
    pub author: String,
    /// "none", "daily", "weekly" or "monthly".
    pub recurrence: String,
    /// ISO date or ISO datetime; only the date part is used.
    pub recurrence_end: Option<String>,
}

impl EventForm {
    /// Build the save request for an event starting on `start`.
    pub fn to_request(&self, start: NaiveDate) -> CalendarResult<RecurrenceRequest> {
        let frequency: Frequency = self.recurrence.parse()?;
        let end = if frequency.is_recurring() {
            match self.recurrence_end.as_deref() {
                Some(text) => parse_end_date(text)?,
                None => None,
            }
        } else {
            None
        };

        Ok(RecurrenceRequest {
            start,
            end,
            frequency,
            title: self.title.clone(),
            author: self.author.clone(),
            time_text: self.time_text.clone(),
        })
    }
}

/// Accepts "2025-09-30" or "2025-09-30T00:00:00". Blank means no date.
fn parse_end_date(text: &str) -> CalendarResult<Option<NaiveDate>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    if let Ok(dt) = text.parse::<NaiveDateTime>() {
        return Ok(Some(dt.date()));
    }
    Err(CalendarError::invalid(format!("Invalid end date '{}'.", text)))
}

/// User interactions on the calendar page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarAction {
    PrevMonth,
    NextMonth,
    SelectDay(NaiveDate),
    OpenEventModal,
    CancelEventModal,
    SaveEvent(EventForm),
}

pub struct CalendarPageModel {
    session: CalendarSession,
    users: Vec<String>,
    modal_open: bool,
    flash: String,
}

/// Palette built from the configured author colors.
pub fn palette_from_config(config: &CalendarConfig) -> AuthorPalette {
    AuthorPalette::from_pairs(
        config.default_color.as_str(),
        config
            .authors
            .iter()
            .map(|a| (a.name.as_str(), a.color.as_str())),
    )
}

impl CalendarPageModel {
    pub fn new(store: Arc<dyn EventStore>, config: &CalendarConfig, today: NaiveDate) -> Self {
        Self {
            session: CalendarSession::new(store, today, palette_from_config(config)),
            users: config.users.clone(),
            modal_open: false,
            flash: String::new(),
        }
    }

    /// Open the configured database and build the page for `today`.
    pub fn open(config: &Config, today: NaiveDate) -> anyhow::Result<Self> {
        let store = SqliteEventStore::open(&config.database.path)?;
        Ok(Self::new(Arc::new(store), &config.calendar, today))
    }

    /// Fetch events for the displayed month. Failures go to the flash line.
    pub fn load(&mut self) {
        if let Err(e) = self.session.load() {
            self.report(e);
        }
    }

    pub fn dispatch(&mut self, action: CalendarAction) {
        match action {
            CalendarAction::PrevMonth => self.navigate(-1),
            CalendarAction::NextMonth => self.navigate(1),
            CalendarAction::SelectDay(date) => self.session.select_day(date),
            CalendarAction::OpenEventModal => self.modal_open = true,
            CalendarAction::CancelEventModal => self.modal_open = false,
            CalendarAction::SaveEvent(form) => self.save(&form),
        }
    }

    fn navigate(&mut self, delta: i32) {
        if let Err(e) = self.session.navigate(delta) {
            self.report(e);
        }
    }

    fn save(&mut self, form: &EventForm) {
        let result = form
            .to_request(self.session.selected())
            .and_then(|request| self.session.save_event(&request));

        match result {
            Ok(outcome) => {
                self.modal_open = false;
                self.flash = outcome.message();
            }
            Err(e) => self.report(e),
        }
    }

    fn report(&mut self, e: CalendarError) {
        self.flash = e.user_message();
        let app_err = e.into_app_error();
        tracing::error!("Calendar action failed: {}", app_err);
    }

    pub fn grid(&self, today: NaiveDate) -> MonthGrid {
        self.session.grid(today)
    }

    /// Grid as JSON for web or QML front ends.
    pub fn grid_json(&self, today: NaiveDate) -> String {
        serde_json::to_string(&self.grid(today)).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn selected_panel(&self) -> SelectedDayPanel {
        self.session.selected_panel()
    }

    pub fn month_label(&self) -> String {
        self.session.month().label()
    }

    /// Dialog heading while the dialog is open.
    pub fn modal_title(&self) -> Option<String> {
        self.modal_open
            .then(|| modal_title(self.session.selected()))
    }

    pub fn modal_open(&self) -> bool {
        self.modal_open
    }

    pub fn flash(&self) -> &str {
        &self.flash
    }

    /// Author choices for the form.
    pub fn users(&self) -> &[String] {
        &self.users
    }
}
