//! Shared family calendar for Homedash.
//!
//! Provides month arithmetic, recurrence expansion, the SQLite event store,
//! the three-month cache window and the toolkit-independent month grid.

pub mod dates;
pub mod error;
pub mod recurrence;
pub mod render;
pub mod session;
pub mod store;
pub mod types;
pub mod window;

pub use dates::{add_months, first_of_month, month_grid_days};
pub use error::{CalendarError, CalendarResult};
pub use recurrence::{expand_dates, parse_time_text, Frequency, RecurrenceRequest, MAX_OCCURRENCES};
pub use render::{
    build_grid, format_time_12h, modal_title, pretty_date, selected_day_panel, AuthorPalette, Badge,
    DayCell, MonthGrid, PanelRow, SelectedDayPanel, MAX_VISIBLE_BADGES, NO_EVENTS_MESSAGE,
    WEEKDAY_HEADERS,
};
pub use session::{CalendarSession, SaveOutcome};
pub use store::{EventStore, InsertOutcome, SqliteEventStore};
pub use types::{CacheRange, EventRecord, EventsMapping, MonthContext, NewEvent};
pub use window::{plan_window, window_for_month, CacheWindow, ResolveOutcome, WindowPlan};
