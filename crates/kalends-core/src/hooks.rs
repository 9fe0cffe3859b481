use std::fmt;

use chrono::NaiveDate;
use tracing::warn;

use crate::datemath;
use crate::event::CalendarEvent;
use crate::options::{Classes, Targets};

pub type DayCallback = Box<dyn Fn(&TargetDetails)>;
pub type MonthCallback = Box<dyn Fn(NaiveDate)>;
pub type IntervalCallback = Box<dyn Fn(NaiveDate, NaiveDate)>;
pub type LifecycleCallback = Box<dyn Fn()>;

/// User-supplied navigation callbacks. Month-flavored callbacks
/// receive the new anchor month; interval-flavored ones receive the
/// new bounds. Callbacks run after the state mutation completes, and
/// anything they panic with propagates to the caller untouched.
#[derive(Default)]
pub struct ClickHandlers {
    pub click: Option<DayCallback>,
    pub today: Option<MonthCallback>,
    pub next_month: Option<MonthCallback>,
    pub previous_month: Option<MonthCallback>,
    pub next_year: Option<MonthCallback>,
    pub previous_year: Option<MonthCallback>,
    pub next_interval: Option<IntervalCallback>,
    pub previous_interval: Option<IntervalCallback>,
    pub on_month_change: Option<MonthCallback>,
    pub on_year_change: Option<MonthCallback>,
    pub on_interval_change: Option<IntervalCallback>,
}

impl fmt::Debug for ClickHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered: Vec<&str> = [
            ("click", self.click.is_some()),
            ("today", self.today.is_some()),
            ("next_month", self.next_month.is_some()),
            ("previous_month", self.previous_month.is_some()),
            ("next_year", self.next_year.is_some()),
            ("previous_year", self.previous_year.is_some()),
            ("next_interval", self.next_interval.is_some()),
            ("previous_interval", self.previous_interval.is_some()),
            ("on_month_change", self.on_month_change.is_some()),
            ("on_year_change", self.on_year_change.is_some()),
            ("on_interval_change", self.on_interval_change.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect();

        f.debug_struct("ClickHandlers")
            .field("registered", &registered)
            .finish()
    }
}

/// What a day-click callback receives: the clicked date (absent for
/// filler cells) and the events on it.
#[derive(Debug, Clone)]
pub struct TargetDetails {
    pub date: Option<NaiveDate>,
    pub events: Vec<CalendarEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjacency {
    LastMonth,
    NextMonth,
}

/// The closed set of things a click can land on. Resolved once at the
/// host's event boundary (see [`ClickTarget::from_class_list`]), then
/// dispatched with a plain match — the widget's public methods stay
/// the single source of truth for navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Day(NaiveDate),
    Empty(Adjacency),
    TodayButton,
    NextButton,
    PreviousButton,
    NextYearButton,
    PreviousYearButton,
}

impl ClickTarget {
    /// Resolves a rendered element's class attribute to a click
    /// target. The date of a day cell is recovered from its stable
    /// per-date class; unresolvable class lists yield `None`.
    pub fn from_class_list(
        class_attr: &str,
        targets: &Targets,
        classes: &Classes,
    ) -> Option<Self> {
        let names: Vec<&str> = class_attr.split_whitespace().collect();
        let has = |name: &str| names.iter().any(|candidate| *candidate == name);

        if has(&targets.empty) {
            let adjacency = if has(&classes.last_month) {
                Adjacency::LastMonth
            } else if has(&classes.next_month) {
                Adjacency::NextMonth
            } else {
                warn!(class_attr, "empty cell without an adjacency class");
                return None;
            };
            return Some(Self::Empty(adjacency));
        }

        if has(&targets.day) {
            let date = names
                .iter()
                .find_map(|name| name.strip_prefix(classes.date_prefix.as_str()))
                .and_then(|raw| match datemath::parse_date(raw) {
                    Ok(date) => Some(date),
                    Err(err) => {
                        warn!(raw, error = %err, "malformed date class on day cell");
                        None
                    }
                })?;
            return Some(Self::Day(date));
        }

        if has(&targets.today_button) {
            return Some(Self::TodayButton);
        }
        if has(&targets.next_button) {
            return Some(Self::NextButton);
        }
        if has(&targets.previous_button) {
            return Some(Self::PreviousButton);
        }
        if has(&targets.next_year_button) {
            return Some(Self::NextYearButton);
        }
        if has(&targets.previous_year_button) {
            return Some(Self::PreviousYearButton);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
    }

    #[test]
    fn resolves_day_cells_through_the_date_class() {
        let targets = Targets::default();
        let classes = Classes::default();

        let target = ClickTarget::from_class_list(
            "day past calendar-day-2024-03-14 calendar-dow-4",
            &targets,
            &classes,
        );
        assert_eq!(target, Some(ClickTarget::Day(d(2024, 3, 14))));
    }

    #[test]
    fn resolves_filler_cells_with_direction() {
        let targets = Targets::default();
        let classes = Classes::default();

        assert_eq!(
            ClickTarget::from_class_list("empty last-month", &targets, &classes),
            Some(ClickTarget::Empty(Adjacency::LastMonth))
        );
        assert_eq!(
            ClickTarget::from_class_list("empty next-month", &targets, &classes),
            Some(ClickTarget::Empty(Adjacency::NextMonth))
        );
    }

    #[test]
    fn resolves_buttons_and_rejects_unknowns() {
        let targets = Targets::default();
        let classes = Classes::default();

        assert_eq!(
            ClickTarget::from_class_list("calendar-next-button", &targets, &classes),
            Some(ClickTarget::NextButton)
        );
        assert_eq!(
            ClickTarget::from_class_list(
                "calendar-previous-year-button inactive",
                &targets,
                &classes
            ),
            Some(ClickTarget::PreviousYearButton)
        );
        assert_eq!(
            ClickTarget::from_class_list("header-day", &targets, &classes),
            None
        );
        assert_eq!(
            ClickTarget::from_class_list("day", &targets, &classes),
            None
        );
    }

    #[test]
    fn respects_overridden_target_names() {
        let targets = Targets {
            day: "cell".to_string(),
            ..Targets::default()
        };
        let classes = Classes {
            date_prefix: "on-".to_string(),
            ..Classes::default()
        };

        assert_eq!(
            ClickTarget::from_class_list("cell on-2024-01-05", &targets, &classes),
            Some(ClickTarget::Day(d(2024, 1, 5)))
        );
    }

    #[test]
    fn debug_lists_registered_handlers() {
        let handlers = ClickHandlers {
            today: Some(Box::new(|_| {})),
            ..ClickHandlers::default()
        };
        let rendered = format!("{handlers:?}");
        assert!(rendered.contains("today"));
        assert!(!rendered.contains("next_month"));
    }
}
