//! Plain-text rendering of the calendar page for the terminal.

use std::fmt::Write;

use homedash_calendar::{MonthGrid, SelectedDayPanel, WEEKDAY_HEADERS};

const CELL_WIDTH: usize = 6;

/// Month grid as fixed-width text. `[..]` marks the selected day, `*` today,
/// and the trailing number is the event count.
pub fn render_month(grid: &MonthGrid) -> String {
    let width = CELL_WIDTH * 7;
    let mut out = String::new();
    let _ = writeln!(out, "{:^width$}", grid.label, width = width);

    for header in WEEKDAY_HEADERS {
        let _ = write!(out, "{:^w$}", header, w = CELL_WIDTH);
    }
    out.push('\n');

    for week in &grid.weeks {
        for cell in week {
            let day = if cell.in_current_month {
                format!("{:>2}", cell.day_number())
            } else {
                " .".to_string()
            };
            let count = cell.badges.len() + cell.overflow_count;
            let marker = if cell.is_today { "*" } else { " " };
            let body = if count > 0 {
                format!("{}{}{}", day, marker, count)
            } else {
                format!("{}{} ", day, marker)
            };
            let text = if cell.is_selected {
                format!("[{}]", body)
            } else {
                format!(" {} ", body)
            };
            let _ = write!(out, "{:<w$}", text, w = CELL_WIDTH);
        }
        out.push('\n');
    }
    out
}

/// Selected-day panel as text.
pub fn render_panel(panel: &SelectedDayPanel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", panel.heading);
    if let Some(message) = panel.empty_message() {
        let _ = writeln!(out, "  {}", message);
        return out;
    }
    for row in &panel.rows {
        let _ = writeln!(out, "  {:>8}  {}  ({})", row.time, row.title, row.author);
    }
    out
}
