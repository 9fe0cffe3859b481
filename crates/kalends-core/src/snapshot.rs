use chrono::NaiveDate;
use serde::Serialize;

use crate::event::CalendarEvent;
use crate::grid::DayCell;

/// One month's worth of cells in a multi-month grid.
#[derive(Debug, Clone, Serialize)]
pub struct MonthSnapshot {
    pub month: NaiveDate,
    pub days: Vec<DayCell>,
}

/// The render-ready view of the widget's state, handed to the
/// templating collaborator on every render. `days` is populated for
/// single-period grids, `months` for multi-month grids; the other is
/// left empty.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub days: Vec<DayCell>,
    pub months: Vec<MonthSnapshot>,
    pub days_of_the_week: Vec<String>,
    pub month: Option<NaiveDate>,
    pub year: Option<i32>,
    pub interval_start: NaiveDate,
    pub interval_end: NaiveDate,
    pub number_of_rows: usize,
    pub events_this_interval: Vec<CalendarEvent>,
    pub events_this_month: Vec<CalendarEvent>,
    pub events_last_month: Vec<CalendarEvent>,
    pub events_next_month: Vec<CalendarEvent>,
    pub extras: Option<serde_json::Value>,
}

pub fn default_weekday_labels() -> [String; 7] {
    ["S", "M", "T", "W", "T", "F", "S"].map(str::to_string)
}

/// Rotates weekday labels left so the label at `week_offset` comes
/// first.
pub fn shift_weekday_labels(labels: &[String; 7], week_offset: u32) -> Vec<String> {
    let offset = (week_offset % 7) as usize;
    labels
        .iter()
        .cycle()
        .skip(offset)
        .take(7)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_rotate_by_week_offset() {
        let labels = default_weekday_labels();
        assert_eq!(
            shift_weekday_labels(&labels, 0),
            vec!["S", "M", "T", "W", "T", "F", "S"]
        );
        assert_eq!(
            shift_weekday_labels(&labels, 1),
            vec!["M", "T", "W", "T", "F", "S", "S"]
        );
        assert_eq!(
            shift_weekday_labels(&labels, 6),
            vec!["S", "S", "M", "T", "W", "T", "F"]
        );
    }
}
