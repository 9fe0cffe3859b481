use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::trace;

use crate::datemath;
use crate::event::{CalendarEvent, EventIndex};
use crate::options::{Classes, Constraints, Targets};

/// Cells a six-row grid always holds: seven columns by six rows.
const SIX_ROW_CELL_COUNT: usize = 42;

/// One grid position. Filler cells (adjacent months hidden) have no
/// date and an empty day number. Cells are built fresh on every
/// render and never mutated afterward.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub date: Option<NaiveDate>,
    pub day_of_month: String,
    pub events: Vec<CalendarEvent>,
    pub is_today: bool,
    pub is_inactive: bool,
    pub is_adjacent_month: bool,
    pub classes: Vec<String>,
}

impl DayCell {
    /// The space-joined class attribute a template would emit.
    pub fn class_attr(&self) -> String {
        self.classes.join(" ")
    }
}

/// Everything the builder needs beyond the interval itself.
#[derive(Debug, Clone, Copy)]
pub struct GridContext<'a> {
    pub week_offset: u32,
    pub day_mode: bool,
    pub show_adjacent_months: bool,
    pub force_six_rows: bool,
    pub constraints: Option<&'a Constraints>,
    pub selected_date: Option<NaiveDate>,
    pub today: NaiveDate,
    pub targets: &'a Targets,
    pub classes: &'a Classes,
}

/// Builds the ordered cell sequence for `[start, end]`. Month-based
/// grids get leading/trailing adjacent-month fill to whole weeks and
/// optional six-row padding; day-count grids are exactly the
/// requested days with no padding at all.
#[tracing::instrument(skip(index, ctx), fields(start = %start, end = %end))]
pub fn build_days(
    start: NaiveDate,
    end: NaiveDate,
    index: &EventIndex,
    ctx: &GridContext<'_>,
) -> Vec<DayCell> {
    let mut cells = Vec::new();

    if !ctx.day_mode {
        let diff = datemath::leading_day_count(start, ctx.week_offset);
        for offset in 0..diff {
            if ctx.show_adjacent_months {
                let day = datemath::add_days(start, i64::from(offset) - i64::from(diff));
                cells.push(classify_day(day, start, &index.last_month, ctx));
            } else {
                cells.push(filler_cell(&ctx.classes.last_month, ctx.targets));
            }
        }
    }

    let mut cursor = start;
    while cursor <= end {
        cells.push(classify_day(cursor, start, &index.this_interval, ctx));
        cursor = datemath::add_days(cursor, 1);
    }

    if !ctx.day_mode {
        while cells.len() % 7 != 0 {
            if ctx.show_adjacent_months {
                cells.push(classify_day(cursor, start, &index.next_month, ctx));
            } else {
                cells.push(filler_cell(&ctx.classes.next_month, ctx.targets));
            }
            cursor = datemath::add_days(cursor, 1);
        }

        if ctx.force_six_rows {
            while cells.len() < SIX_ROW_CELL_COUNT {
                if ctx.show_adjacent_months {
                    cells.push(classify_day(cursor, start, &index.next_month, ctx));
                } else {
                    cells.push(filler_cell(&ctx.classes.next_month, ctx.targets));
                }
                cursor = datemath::add_days(cursor, 1);
            }
        }
    }

    trace!(cells = cells.len(), "built day grid");
    cells
}

/// Classifies a single day against the grid anchored at `anchor`
/// (the interval start, whose month decides adjacency).
pub fn classify_day(
    day: NaiveDate,
    anchor: NaiveDate,
    candidates: &[CalendarEvent],
    ctx: &GridContext<'_>,
) -> DayCell {
    let mut classes = vec![ctx.targets.day.clone()];
    let mut is_today = false;
    let mut is_inactive = false;
    let mut is_adjacent_month = false;

    let events: Vec<CalendarEvent> = candidates
        .iter()
        .filter(|ev| ev.contains(day))
        .cloned()
        .collect();

    if day == ctx.today {
        classes.push(ctx.classes.today.clone());
        is_today = true;
    }

    if day < ctx.today {
        classes.push(ctx.classes.past.clone());
    }

    if !events.is_empty() {
        classes.push(ctx.classes.event.clone());
        if events.iter().any(|ev| ev.start_date == day) {
            classes.push(ctx.classes.event_start.clone());
        }
        if events.iter().any(|ev| ev.end_date == day) {
            classes.push(ctx.classes.event_end.clone());
        }
    }

    if !ctx.day_mode {
        // Adjacency compares month numbers; a year mismatch means the
        // grid wrapped over a year boundary, which flips the tag.
        if anchor.month() > day.month() {
            classes.push(ctx.classes.adjacent_month.clone());
            is_adjacent_month = true;
            if anchor.year() == day.year() {
                classes.push(ctx.classes.last_month.clone());
            } else {
                classes.push(ctx.classes.next_month.clone());
            }
        } else if anchor.month() < day.month() {
            classes.push(ctx.classes.adjacent_month.clone());
            is_adjacent_month = true;
            if anchor.year() == day.year() {
                classes.push(ctx.classes.next_month.clone());
            } else {
                classes.push(ctx.classes.last_month.clone());
            }
        }
    }

    if let Some(constraints) = ctx.constraints {
        let before_start = constraints.start_date.is_some_and(|bound| day < bound);
        let after_end = constraints.end_date.is_some_and(|bound| day > bound);
        if before_start || after_end {
            classes.push(ctx.classes.inactive.clone());
            is_inactive = true;
        }
    }

    if ctx.selected_date == Some(day) {
        classes.push(ctx.classes.selected.clone());
    }

    classes.push(format!(
        "{}{}",
        ctx.classes.date_prefix,
        day.format("%Y-%m-%d")
    ));
    classes.push(format!(
        "{}{}",
        ctx.classes.day_of_week_prefix,
        datemath::weekday_number(day)
    ));

    DayCell {
        date: Some(day),
        day_of_month: day.day().to_string(),
        events,
        is_today,
        is_inactive,
        is_adjacent_month,
        classes,
    }
}

fn filler_cell(adjacent_class: &str, targets: &Targets) -> DayCell {
    DayCell {
        date: None,
        day_of_month: String::new(),
        events: vec![],
        is_today: false,
        is_inactive: false,
        is_adjacent_month: false,
        classes: vec![targets.empty.clone(), adjacent_class.to_string()],
    }
}
