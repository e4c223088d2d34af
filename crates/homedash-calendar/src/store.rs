//! Event store gateway and its SQLite implementation.
//!
//! `EventStore` is the seam between the calendar session and persistence.
//! `SqliteEventStore` keeps one connection behind a mutex, reopening it and
//! retrying once when the database becomes unreachable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode};

use crate::error::{CalendarError, CalendarResult};
use crate::types::{date_key, EventRecord, EventsMapping, NewEvent};

const RECONNECT_BACKOFF: Duration = Duration::from_millis(200);
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of a batch insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InsertOutcome {
    /// Rows that were new.
    pub inserted: usize,
    /// Rows skipped as exact duplicates.
    pub ignored: usize,
}

impl InsertOutcome {
    pub fn total(&self) -> usize {
        self.inserted + self.ignored
    }
}

/// Persistence gateway for calendar events.
pub trait EventStore: Send + Sync {
    /// Events with `start <= date < end`, grouped by ISO date.
    fn fetch_range(&self, start: NaiveDate, end: NaiveDate) -> CalendarResult<EventsMapping>;

    /// Insert all rows atomically. Exact duplicates are ignored.
    fn insert_many(&self, events: &[NewEvent]) -> CalendarResult<InsertOutcome>;
}

/// SQLite-backed event store.
pub struct SqliteEventStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteEventStore {
    /// Open (or create) the store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> CalendarResult<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Self::connect(&path)?;
        tracing::info!("Opened event store at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path),
        })
    }

    /// In-memory store. Cannot reconnect; used for tests and demos.
    pub fn open_in_memory() -> CalendarResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    fn connect(path: &Path) -> CalendarResult<Connection> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        init_schema(&conn)?;
        Ok(conn)
    }

    /// Cheap liveness check.
    pub fn ping(&self) -> bool {
        self.with_connection(|conn| conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)))
            .is_ok()
    }

    /// Run `op`, reopening the connection and retrying once if the database
    /// could not be reached.
    fn with_connection<T, F>(&self, op: F) -> CalendarResult<T>
    where
        F: Fn(&mut Connection) -> rusqlite::Result<T>,
    {
        let mut conn = self.conn.lock();
        match op(&mut *conn) {
            Ok(value) => Ok(value),
            Err(e) if is_connection_error(&e) => {
                let Some(path) = &self.path else {
                    return Err(e.into());
                };
                tracing::warn!("Event store unreachable ({}), reconnecting", e);
                std::thread::sleep(RECONNECT_BACKOFF);
                *conn = Self::connect(path)?;
                op(&mut *conn).map_err(|e| {
                    tracing::error!("Event store retry failed: {}", e);
                    CalendarError::from(e)
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl EventStore for SqliteEventStore {
    #[tracing::instrument(skip(self))]
    fn fetch_range(&self, start: NaiveDate, end: NaiveDate) -> CalendarResult<EventsMapping> {
        let rows = self.with_connection(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT event_date, event_time, title, author
                 FROM calendar_events
                 WHERE event_date >= ?1 AND event_date < ?2
                 ORDER BY event_date, event_time NULLS LAST, id",
            )?;
            let rows = stmt
                .query_map(params![date_key(start), date_key(end)], row_to_event)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        let mut mapping = EventsMapping::new();
        for record in rows {
            mapping.entry(date_key(record.date)).or_default().push(record);
        }

        tracing::info!(
            "Fetched {} days with events between {} and {}",
            mapping.len(),
            start,
            end
        );
        Ok(mapping)
    }

    #[tracing::instrument(skip(self, events), fields(count = events.len()))]
    fn insert_many(&self, events: &[NewEvent]) -> CalendarResult<InsertOutcome> {
        if events.is_empty() {
            return Ok(InsertOutcome::default());
        }

        let inserted = self.with_connection(|conn| {
            let tx = conn.transaction()?;
            let mut inserted = 0;
            {
                let mut stmt = tx.prepare_cached(
                    "INSERT OR IGNORE INTO calendar_events (event_date, event_time, title, author)
                     VALUES (?1, ?2, ?3, ?4)",
                )?;
                for ev in events {
                    inserted += stmt.execute(params![
                        date_key(ev.date),
                        ev.time_text(),
                        ev.title,
                        ev.author
                    ])?;
                }
            }
            tx.commit()?;
            Ok(inserted)
        })?;

        let outcome = InsertOutcome {
            inserted,
            ignored: events.len() - inserted,
        };
        tracing::info!(
            "Inserted {} events ({} duplicates ignored)",
            outcome.inserted,
            outcome.ignored
        );
        Ok(outcome)
    }
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS calendar_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_date TEXT NOT NULL,
            event_time TEXT NULL,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_calendar_events_unique
            ON calendar_events(event_date, COALESCE(event_time, ''), title, author);
        CREATE INDEX IF NOT EXISTS idx_calendar_events_date ON calendar_events(event_date);
        "#,
    )
}

fn row_to_event(row: &rusqlite::Row) -> rusqlite::Result<EventRecord> {
    let date_str: String = row.get(0)?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

    Ok(EventRecord {
        date,
        time: row.get(1)?,
        title: row.get(2)?,
        author: row.get(3)?,
    })
}

fn is_connection_error(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if matches!(
                err.code,
                ErrorCode::CannotOpen
                    | ErrorCode::SystemIoFailure
                    | ErrorCode::DatabaseBusy
                    | ErrorCode::DatabaseLocked
            )
    )
}
