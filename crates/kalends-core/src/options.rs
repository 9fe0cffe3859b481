use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::hooks::{ClickHandlers, LifecycleCallback};
use crate::template::RenderFn;

/// Which of the three sizing modes governs the interval.
/// A configured month count always wins over a day count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthMode {
    MonthCount(u32),
    DayCount(u32),
    SingleMonth,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthOfTime {
    pub months: Option<u32>,
    pub days: Option<u32>,
    pub interval: u32,
    pub start_date: Option<NaiveDate>,
}

impl Default for LengthOfTime {
    fn default() -> Self {
        Self {
            months: None,
            days: None,
            interval: 1,
            start_date: None,
        }
    }
}

impl LengthOfTime {
    pub fn mode(&self) -> LengthMode {
        if let Some(months) = self.months {
            LengthMode::MonthCount(months)
        } else if let Some(days) = self.days {
            LengthMode::DayCount(days)
        } else {
            LengthMode::SingleMonth
        }
    }

    /// True for day-count and multi-month configurations, which take
    /// interval-change callbacks instead of month/year ones.
    pub fn is_interval_based(&self) -> bool {
        self.months.is_some() || self.days.is_some()
    }

    /// Months spanned by one period in month-based modes.
    pub fn months_per_period(&self) -> u32 {
        self.months.unwrap_or(self.interval)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Constraints {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Field names to read start/end dates from when events span
/// multiple days. A record missing both falls back to `single_day`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiDayEvents {
    pub start_date: String,
    pub end_date: String,
    pub single_day: Option<String>,
}

impl Default for MultiDayEvents {
    fn default() -> Self {
        Self {
            start_date: "startDate".to_string(),
            end_date: "endDate".to_string(),
            single_day: None,
        }
    }
}

/// Class names the click boundary resolves against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Targets {
    pub day: String,
    pub empty: String,
    pub next_button: String,
    pub today_button: String,
    pub previous_button: String,
    pub next_year_button: String,
    pub previous_year_button: String,
}

impl Default for Targets {
    fn default() -> Self {
        Self {
            day: "day".to_string(),
            empty: "empty".to_string(),
            next_button: "calendar-next-button".to_string(),
            today_button: "calendar-today-button".to_string(),
            previous_button: "calendar-previous-button".to_string(),
            next_year_button: "calendar-next-year-button".to_string(),
            previous_year_button: "calendar-previous-year-button".to_string(),
        }
    }
}

/// Semantic class names attached to day cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classes {
    pub past: String,
    pub today: String,
    pub event: String,
    pub event_start: String,
    pub event_end: String,
    pub inactive: String,
    pub selected: String,
    pub last_month: String,
    pub next_month: String,
    pub adjacent_month: String,
    pub date_prefix: String,
    pub day_of_week_prefix: String,
}

impl Default for Classes {
    fn default() -> Self {
        Self {
            past: "past".to_string(),
            today: "today".to_string(),
            event: "event".to_string(),
            event_start: "event-start".to_string(),
            event_end: "event-end".to_string(),
            inactive: "inactive".to_string(),
            selected: "selected".to_string(),
            last_month: "last-month".to_string(),
            next_month: "next-month".to_string(),
            adjacent_month: "adjacent-month".to_string(),
            date_prefix: "calendar-day-".to_string(),
            day_of_week_prefix: "calendar-dow-".to_string(),
        }
    }
}

/// Construction-time configuration. Every field has a default, so
/// callers merge overrides with struct-update syntax:
///
/// ```ignore
/// let options = Options {
///     week_offset: 1,
///     force_six_rows: true,
///     ..Options::default()
/// };
/// ```
pub struct Options {
    pub events: Vec<serde_json::Value>,
    pub date_parameter: Option<String>,
    pub multi_day_events: Option<MultiDayEvents>,
    pub length_of_time: LengthOfTime,
    pub start_with_month: Option<NaiveDate>,
    pub week_offset: u32,
    pub show_adjacent_months: bool,
    pub force_six_rows: bool,
    pub constraints: Option<Constraints>,
    pub selected_date: Option<NaiveDate>,
    pub track_selected_date: bool,
    pub ignore_inactive_days_in_selection: bool,
    pub adjacent_days_change_month: bool,
    pub days_of_the_week: Option<[String; 7]>,
    pub targets: Targets,
    pub classes: Classes,
    pub click_events: ClickHandlers,
    pub render: Option<RenderFn>,
    pub ready: Option<LifecycleCallback>,
    pub done_rendering: Option<LifecycleCallback>,
    pub extras: Option<serde_json::Value>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            events: vec![],
            date_parameter: None,
            multi_day_events: None,
            length_of_time: LengthOfTime::default(),
            start_with_month: None,
            week_offset: 0,
            show_adjacent_months: true,
            force_six_rows: false,
            constraints: None,
            selected_date: None,
            track_selected_date: false,
            ignore_inactive_days_in_selection: false,
            adjacent_days_change_month: false,
            days_of_the_week: None,
            targets: Targets::default(),
            classes: Classes::default(),
            click_events: ClickHandlers::default(),
            render: None,
            ready: None,
            done_rendering: None,
            extras: None,
        }
    }
}

impl Options {
    pub const DEFAULT_DATE_PARAMETER: &'static str = "date";

    pub fn date_parameter(&self) -> &str {
        self.date_parameter
            .as_deref()
            .unwrap_or(Self::DEFAULT_DATE_PARAMETER)
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("events", &self.events.len())
            .field("date_parameter", &self.date_parameter())
            .field("multi_day_events", &self.multi_day_events)
            .field("length_of_time", &self.length_of_time)
            .field("start_with_month", &self.start_with_month)
            .field("week_offset", &self.week_offset)
            .field("show_adjacent_months", &self.show_adjacent_months)
            .field("force_six_rows", &self.force_six_rows)
            .field("constraints", &self.constraints)
            .field("selected_date", &self.selected_date)
            .field("track_selected_date", &self.track_selected_date)
            .field(
                "ignore_inactive_days_in_selection",
                &self.ignore_inactive_days_in_selection,
            )
            .field("adjacent_days_change_month", &self.adjacent_days_change_month)
            .field("click_events", &self.click_events)
            .field("render", &self.render.is_some())
            .finish_non_exhaustive()
    }
}
