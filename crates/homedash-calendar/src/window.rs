//! Three-month cache window.
//!
//! Navigating the calendar only hits the store when the target month falls
//! outside the last fetched window of previous, current and next month.

use chrono::{Months, NaiveDate};

use crate::error::CalendarResult;
use crate::store::EventStore;
use crate::types::{CacheRange, EventsMapping, MonthContext};

/// `[first of previous month, first of the month after next)`.
///
/// Bounds are plain dates, so the window may reach past the years a
/// `MonthContext` can display.
pub fn window_for_month(ctx: MonthContext) -> CacheRange {
    let first = ctx.first_day();
    CacheRange {
        start: first
            .checked_sub_months(Months::new(1))
            .unwrap_or(NaiveDate::MIN),
        end: first
            .checked_add_months(Months::new(2))
            .unwrap_or(NaiveDate::MAX),
    }
}

/// What a navigation to `ctx` requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPlan {
    Reuse,
    Fetch(CacheRange),
}

/// Decide between reusing the current mapping and fetching a new window.
pub fn plan_window(ctx: MonthContext, current: Option<CacheRange>) -> WindowPlan {
    match current {
        Some(range) if range.contains(ctx.first_day()) => WindowPlan::Reuse,
        _ => WindowPlan::Fetch(window_for_month(ctx)),
    }
}

/// How `CacheWindow::resolve` was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    Hit,
    Fetched(CacheRange),
}

/// Fetched range plus its events.
#[derive(Debug, Clone, Default)]
pub struct CacheWindow {
    range: Option<CacheRange>,
    mapping: EventsMapping,
}

impl CacheWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn range(&self) -> Option<CacheRange> {
        self.range
    }

    pub fn mapping(&self) -> &EventsMapping {
        &self.mapping
    }

    /// Whether the mapping is authoritative for `ctx`.
    pub fn covers(&self, ctx: MonthContext) -> bool {
        plan_window(ctx, self.range) == WindowPlan::Reuse
    }

    /// Make the mapping cover `ctx`, fetching only on a miss. A failed
    /// fetch leaves range and mapping unchanged.
    pub fn resolve(&mut self, ctx: MonthContext, store: &dyn EventStore) -> CalendarResult<ResolveOutcome> {
        match plan_window(ctx, self.range) {
            WindowPlan::Reuse => {
                tracing::debug!("Cache hit for {}", ctx);
                Ok(ResolveOutcome::Hit)
            }
            WindowPlan::Fetch(range) => {
                self.load(range, store)?;
                Ok(ResolveOutcome::Fetched(range))
            }
        }
    }

    /// Refetch the window for `ctx` regardless of the current range.
    pub fn refresh(&mut self, ctx: MonthContext, store: &dyn EventStore) -> CalendarResult<CacheRange> {
        let range = window_for_month(ctx);
        self.load(range, store)?;
        Ok(range)
    }

    /// Drop the range and mapping.
    pub fn invalidate(&mut self) {
        self.range = None;
        self.mapping.clear();
    }

    fn load(&mut self, range: CacheRange, store: &dyn EventStore) -> CalendarResult<()> {
        tracing::info!("Loading calendar window {}", range);
        let mapping = store.fetch_range(range.start, range.end).map_err(|e| {
            tracing::warn!("Calendar window fetch failed: {}", e);
            e
        })?;
        self.range = Some(range);
        self.mapping = mapping;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::error::CalendarError;
    use crate::types::{EventRecord, NewEvent};
    use crate::store::InsertOutcome;
    use crate::types::{MAX_YEAR, MIN_YEAR};
    use parking_lot::Mutex;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn month(y: i32, m: u32) -> MonthContext {
        MonthContext::new(y, m).unwrap()
    }

    /// Records every fetched range; optionally fails.
    #[derive(Default)]
    struct RecordingStore {
        fetches: Mutex<Vec<(NaiveDate, NaiveDate)>>,
        fail: bool,
    }

    impl EventStore for RecordingStore {
        fn fetch_range(&self, start: NaiveDate, end: NaiveDate) -> CalendarResult<EventsMapping> {
            self.fetches.lock().push((start, end));
            if self.fail {
                return Err(CalendarError::storage("connection refused"));
            }
            let mut mapping = EventsMapping::new();
            mapping.insert(
                "2025-09-05".into(),
                vec![EventRecord {
                    date: d(2025, 9, 5),
                    time: None,
                    title: "Sync".into(),
                    author: "Daniel".into(),
                }],
            );
            Ok(mapping)
        }

        fn insert_many(&self, events: &[NewEvent]) -> CalendarResult<InsertOutcome> {
            Ok(InsertOutcome {
                inserted: events.len(),
                ignored: 0,
            })
        }
    }

    #[test]
    fn test_window_is_three_months_wide() {
        for ctx in [month(2025, 1), month(2025, 9), month(2025, 12), month(2024, 2)] {
            let range = window_for_month(ctx);
            assert!(range.contains(ctx.first_day()));
            assert_eq!(range.start, ctx.shift(-1).first_day());
            assert_eq!(range.end, ctx.shift(2).first_day());
        }
        let range = window_for_month(month(2025, 1));
        assert_eq!(range.start, d(2024, 12, 1));
        assert_eq!(range.end, d(2025, 3, 1));
    }

    #[test]
    fn test_window_at_year_limits() {
        let range = window_for_month(month(MAX_YEAR, 12));
        assert_eq!(range.start, d(MAX_YEAR, 11, 1));
        assert_eq!(range.end, d(MAX_YEAR + 1, 2, 1));

        let range = window_for_month(month(MIN_YEAR, 1));
        assert_eq!(range.start, d(MIN_YEAR - 1, 12, 1));
        assert_eq!(range.end, d(MIN_YEAR, 3, 1));

        for ctx in [
            month(MAX_YEAR, 11),
            month(MAX_YEAR, 12),
            month(MIN_YEAR, 1),
            month(MIN_YEAR, 2),
        ] {
            let range = window_for_month(ctx);
            assert!(range.contains(ctx.first_day()), "{} not inside {}", ctx, range);
            assert!(range.start < ctx.first_day());
        }
    }

    #[test]
    fn test_last_month_is_a_cache_hit() {
        let store = RecordingStore::default();
        let mut window = CacheWindow::new();
        let last = month(MAX_YEAR, 12);

        assert!(matches!(window.resolve(last, &store).unwrap(), ResolveOutcome::Fetched(_)));
        assert_eq!(window.resolve(last, &store).unwrap(), ResolveOutcome::Hit);
        assert_eq!(store.fetches.lock().len(), 1);
    }

    #[test]
    fn test_plan_hit_and_miss() {
        let current = Some(CacheRange {
            start: d(2025, 8, 1),
            end: d(2025, 11, 1),
        });
        assert_eq!(plan_window(month(2025, 9), current), WindowPlan::Reuse);
        assert_eq!(
            plan_window(month(2025, 12), current),
            WindowPlan::Fetch(CacheRange {
                start: d(2025, 11, 1),
                end: d(2026, 2, 1),
            })
        );
        assert!(matches!(plan_window(month(2025, 9), None), WindowPlan::Fetch(_)));
    }

    #[test]
    fn test_resolve_fetches_once_per_window() {
        let store = RecordingStore::default();
        let mut window = CacheWindow::new();

        let first = window.resolve(month(2025, 9), &store).unwrap();
        assert_eq!(
            first,
            ResolveOutcome::Fetched(CacheRange {
                start: d(2025, 8, 1),
                end: d(2025, 11, 1),
            })
        );
        assert_eq!(window.resolve(month(2025, 10), &store).unwrap(), ResolveOutcome::Hit);
        assert_eq!(window.resolve(month(2025, 8), &store).unwrap(), ResolveOutcome::Hit);
        assert_eq!(store.fetches.lock().len(), 1);

        window.resolve(month(2025, 11), &store).unwrap();
        assert_eq!(store.fetches.lock().len(), 2);
        assert!(window.covers(month(2025, 12)));
    }

    #[test]
    fn test_failed_fetch_leaves_window_untouched() {
        let good = RecordingStore::default();
        let bad = RecordingStore {
            fail: true,
            ..Default::default()
        };
        let mut window = CacheWindow::new();
        window.resolve(month(2025, 9), &good).unwrap();
        let before = window.range();

        let err = window.resolve(month(2026, 3), &bad).unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(window.range(), before);
        assert!(window.mapping().contains_key("2025-09-05"));
    }

    #[test]
    fn test_refresh_and_invalidate() {
        let store = RecordingStore::default();
        let mut window = CacheWindow::new();
        window.resolve(month(2025, 9), &store).unwrap();
        window.refresh(month(2025, 9), &store).unwrap();
        assert_eq!(store.fetches.lock().len(), 2);

        window.invalidate();
        assert!(window.range().is_none());
        assert!(window.mapping().is_empty());
        assert!(!window.covers(month(2025, 9)));
    }
}
