//! Daily odometer log and the per-day usage statistics derived from it.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::error::VehicleResult;

/// Average miles per day above which a day is flagged.
pub const DEFAULT_HIGH_MILEAGE_THRESHOLD: f64 = 40.0;

/// One odometer reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MileageEntry {
    pub date: NaiveDate,
    pub miles: f64,
}

/// A reading plus its change since the previous one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MileageStat {
    pub date: NaiveDate,
    pub miles: f64,
    pub increment: Option<f64>,
    pub days: Option<i64>,
    pub avg_per_day: Option<f64>,
    pub high_usage: bool,
}

/// SQLite table of odometer readings keyed by date.
pub struct MileageLog {
    conn: Connection,
}

impl MileageLog {
    pub fn open<P: AsRef<Path>>(path: P) -> VehicleResult<Self> {
        let conn = Connection::open(path)?;
        let log = Self { conn };
        log.init_schema()?;
        Ok(log)
    }

    pub fn in_memory() -> VehicleResult<Self> {
        let conn = Connection::open_in_memory()?;
        let log = Self { conn };
        log.init_schema()?;
        Ok(log)
    }

    fn init_schema(&self) -> VehicleResult<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS mileage_log (
                date TEXT PRIMARY KEY,
                miles REAL NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Insert or replace the reading for `date`.
    pub fn record(&self, date: NaiveDate, miles: f64) -> VehicleResult<()> {
        self.conn.execute(
            "INSERT INTO mileage_log (date, miles) VALUES (?1, ?2)
             ON CONFLICT(date) DO UPDATE SET miles = excluded.miles",
            params![date.format("%Y-%m-%d").to_string(), miles],
        )?;
        tracing::info!("Recorded odometer {} for {}", miles, date);
        Ok(())
    }

    /// All readings, oldest first.
    pub fn entries(&self) -> VehicleResult<Vec<MileageEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT date, miles FROM mileage_log ORDER BY date")?;
        let entries = stmt
            .query_map([], |row| {
                let date_str: String = row.get(0)?;
                let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
                })?;
                Ok(MileageEntry {
                    date,
                    miles: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

/// Per-row increments and averages. The first row, and rows on the same
/// day as their predecessor, have no average.
pub fn mileage_stats(entries: &[MileageEntry], high_threshold: f64) -> Vec<MileageStat> {
    let mut stats = Vec::with_capacity(entries.len());
    let mut previous: Option<&MileageEntry> = None;

    for entry in entries {
        let (increment, days) = match previous {
            Some(prev) => (
                Some(entry.miles - prev.miles),
                Some((entry.date - prev.date).num_days()),
            ),
            None => (None, None),
        };
        let avg_per_day = match (increment, days) {
            (Some(inc), Some(days)) if days != 0 => Some(inc / days as f64),
            _ => None,
        };

        stats.push(MileageStat {
            date: entry.date,
            miles: entry.miles,
            increment,
            days,
            avg_per_day,
            high_usage: avg_per_day.is_some_and(|avg| avg > high_threshold),
        });
        previous = Some(entry);
    }
    stats
}
