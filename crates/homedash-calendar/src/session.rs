//! Per-session calendar controller.
//!
//! Each open calendar page owns a `CalendarSession`. Navigation, saves and
//! refreshes take the session lock for their whole check-fetch-replace
//! sequence, so operations on one session are serialized.

use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;

use crate::error::CalendarResult;
use crate::recurrence::{Frequency, RecurrenceRequest};
use crate::render::{build_grid, selected_day_panel, AuthorPalette, MonthGrid, SelectedDayPanel};
use crate::store::EventStore;
use crate::types::{CacheRange, EventsMapping, MonthContext};
use crate::window::{CacheWindow, ResolveOutcome};

struct SessionState {
    month: MonthContext,
    selected: NaiveDate,
    window: CacheWindow,
}

/// Result of a successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    pub inserted: usize,
    pub ignored: usize,
    pub frequency: Frequency,
    /// False when the rows were written but the follow-up refetch failed.
    /// The cached window is dropped in that case.
    pub refreshed: bool,
}

impl SaveOutcome {
    /// Flash message for the user.
    pub fn message(&self) -> String {
        if self.frequency.is_recurring() {
            format!("Recurring events saved ({}).", self.frequency)
        } else {
            "Event saved.".to_string()
        }
    }
}

pub struct CalendarSession {
    store: Arc<dyn EventStore>,
    palette: AuthorPalette,
    state: Mutex<SessionState>,
}

impl CalendarSession {
    /// Session showing the month that contains `selected`.
    pub fn new(store: Arc<dyn EventStore>, selected: NaiveDate, palette: AuthorPalette) -> Self {
        Self {
            store,
            palette,
            state: Mutex::new(SessionState {
                month: MonthContext::containing(selected),
                selected,
                window: CacheWindow::new(),
            }),
        }
    }

    /// Fetch the window for the current month if it is not cached yet.
    pub fn load(&self) -> CalendarResult<ResolveOutcome> {
        let mut state = self.state.lock();
        let month = state.month;
        state.window.resolve(month, self.store.as_ref())
    }

    pub fn month(&self) -> MonthContext {
        self.state.lock().month
    }

    pub fn selected(&self) -> NaiveDate {
        self.state.lock().selected
    }

    pub fn palette(&self) -> &AuthorPalette {
        &self.palette
    }

    /// Move `delta` months. The displayed month only changes once its
    /// events are available.
    pub fn navigate(&self, delta: i32) -> CalendarResult<MonthContext> {
        let mut state = self.state.lock();
        let target = state.month.shift(delta);
        state.window.resolve(target, self.store.as_ref())?;
        state.month = target;
        tracing::debug!("Calendar moved to {}", target);
        Ok(target)
    }

    pub fn select_day(&self, date: NaiveDate) {
        self.state.lock().selected = date;
    }

    /// Validate, expand and insert `request`, then refetch the current
    /// window. Validation errors are returned before any I/O. If the refetch
    /// fails the window is invalidated so the next `load` goes to the store.
    pub fn save_event(&self, request: &RecurrenceRequest) -> CalendarResult<SaveOutcome> {
        let events = request.expand()?;

        let mut state = self.state.lock();
        let outcome = self.store.insert_many(&events)?;

        let month = state.month;
        let refreshed = match state.window.refresh(month, self.store.as_ref()) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Saved {} events but refresh failed: {}", outcome.inserted, e);
                state.window.invalidate();
                false
            }
        };

        tracing::info!(
            "Saved {} {} events starting {}",
            outcome.inserted,
            request.frequency,
            request.start
        );
        Ok(SaveOutcome {
            inserted: outcome.inserted,
            ignored: outcome.ignored,
            frequency: request.frequency,
            refreshed,
        })
    }

    /// Render model for the current month.
    pub fn grid(&self, today: NaiveDate) -> MonthGrid {
        let state = self.state.lock();
        build_grid(
            state.month,
            state.window.mapping(),
            Some(state.selected),
            today,
            &self.palette,
        )
    }

    pub fn selected_panel(&self) -> SelectedDayPanel {
        let state = self.state.lock();
        selected_day_panel(state.selected, state.window.mapping(), &self.palette)
    }

    /// Range the cached events cover, if any.
    pub fn range(&self) -> Option<CacheRange> {
        self.state.lock().window.range()
    }

    /// Snapshot of the cached events.
    pub fn mapping(&self) -> EventsMapping {
        self.state.lock().window.mapping().clone()
    }

    /// Forget cached events; the next `load` refetches.
    pub fn invalidate(&self) {
        self.state.lock().window.invalidate();
    }
}
