use anyhow::bail;
use chrono::{Datelike, NaiveDate};
use serde_json::Value;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::clock;
use crate::datemath;
use crate::event::{self, CalendarEvent, EventIndex};
use crate::grid::{self, GridContext};
use crate::hooks::{Adjacency, ClickTarget, TargetDetails};
use crate::interval::{ConstraintFlags, Interval};
use crate::options::{LengthMode, Options};
use crate::snapshot::{self, MonthSnapshot, Snapshot};
use crate::template;

/// A calendar widget instance. All state is in-memory and owned by
/// the instance; navigation mutates the interval by whole-value
/// reassignment, rebuilds the grid, re-renders, and fires whichever
/// change callbacks apply.
#[derive(Debug)]
pub struct Calendar {
    id: Uuid,
    options: Options,
    events: Vec<CalendarEvent>,
    interval: Interval,
    flags: ConstraintFlags,
    days_of_the_week: Vec<String>,
    today_override: Option<NaiveDate>,
    snapshot: Snapshot,
    markup: String,
}

impl Calendar {
    /// Builds a widget whose "today" comes from the project clock.
    pub fn new(options: Options) -> anyhow::Result<Self> {
        Self::build(options, None)
    }

    /// Builds a widget pinned to an explicit current day. Useful for
    /// embedders that manage their own clock and for deterministic
    /// rendering.
    pub fn with_today(options: Options, today: NaiveDate) -> anyhow::Result<Self> {
        Self::build(options, Some(today))
    }

    fn build(mut options: Options, today_override: Option<NaiveDate>) -> anyhow::Result<Self> {
        validate(&options)?;

        let today = today_override.unwrap_or_else(clock::today);
        let records = std::mem::take(&mut options.events);
        let events = event::annotate_events(
            records,
            options.date_parameter(),
            options.multi_day_events.as_ref(),
        )?;

        let interval = Interval::initial(
            &options.length_of_time,
            options.start_with_month,
            options.week_offset,
            today,
        )
        .constrained(
            &options.length_of_time,
            options.constraints.as_ref(),
            options.week_offset,
        );

        let labels = options
            .days_of_the_week
            .clone()
            .unwrap_or_else(snapshot::default_weekday_labels);
        let days_of_the_week = snapshot::shift_weekday_labels(&labels, options.week_offset);

        let mut calendar = Self {
            id: Uuid::new_v4(),
            options,
            events,
            interval,
            flags: ConstraintFlags::default(),
            days_of_the_week: days_of_the_week.clone(),
            today_override,
            snapshot: Snapshot {
                days: vec![],
                months: vec![],
                days_of_the_week,
                month: None,
                year: None,
                interval_start: interval.start,
                interval_end: interval.end,
                number_of_rows: 0,
                events_this_interval: vec![],
                events_this_month: vec![],
                events_last_month: vec![],
                events_next_month: vec![],
                extras: None,
            },
            markup: String::new(),
        };

        calendar.render_pass();
        info!(
            widget = %calendar.id,
            start = %calendar.interval.start,
            end = %calendar.interval.end,
            "constructed calendar"
        );

        if let Some(ready) = &calendar.options.ready {
            ready();
        }

        Ok(calendar)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn constraint_flags(&self) -> ConstraintFlags {
        self.flags
    }

    /// The latest render snapshot.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// The latest markup produced by the render collaborator.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.options.selected_date
    }

    pub fn get_events(&self) -> &[CalendarEvent] {
        &self.events
    }

    /// Moves to the next period, honoring the `next` constraint flag.
    #[instrument(skip(self), fields(widget = %self.id))]
    pub fn next_month(&mut self) -> &mut Self {
        if !self.flags.next {
            debug!("next navigation blocked by constraint");
            return self;
        }
        let orig = self.interval;
        self.interval = self.interval.next(&self.options.length_of_time);
        self.render_pass();
        self.fire_change_events(orig);
        self
    }

    /// Moves to the previous period, honoring the `previous` flag.
    #[instrument(skip(self), fields(widget = %self.id))]
    pub fn previous_month(&mut self) -> &mut Self {
        if !self.flags.previous {
            debug!("previous navigation blocked by constraint");
            return self;
        }
        let orig = self.interval;
        self.interval = self.interval.previous(&self.options.length_of_time);
        self.render_pass();
        self.fire_change_events(orig);
        self
    }

    #[instrument(skip(self), fields(widget = %self.id))]
    pub fn next_year(&mut self) -> &mut Self {
        if !self.flags.next_year {
            debug!("next-year navigation blocked by constraint");
            return self;
        }
        let orig = self.interval;
        self.interval = self.interval.shifted_years(1);
        self.render_pass();
        self.fire_change_events(orig);
        self
    }

    #[instrument(skip(self), fields(widget = %self.id))]
    pub fn previous_year(&mut self) -> &mut Self {
        if !self.flags.previous_year {
            debug!("previous-year navigation blocked by constraint");
            return self;
        }
        let orig = self.interval;
        self.interval = self.interval.shifted_years(-1);
        self.render_pass();
        self.fire_change_events(orig);
        self
    }

    /// Jumps to the interval containing today. Skips the rebuild and
    /// render when nothing would change, but fires the `today`
    /// callback and evaluates change flags unconditionally.
    #[instrument(skip(self), fields(widget = %self.id))]
    pub fn today(&mut self) -> &mut Self {
        let orig = self.interval;

        if self.flags.today {
            let jumped = Interval::jumped_to_today(
                &self.options.length_of_time,
                self.options.week_offset,
                self.current_day(),
            );
            if jumped != self.interval {
                self.interval = jumped;
                self.render_pass();
            }
        } else {
            debug!("today navigation blocked by constraint");
        }

        if let Some(today) = &self.options.click_events.today {
            today(self.interval.month);
        }
        self.fire_change_events(orig);
        self
    }

    /// Re-anchors to a month (1-12) of the current year. Errors for
    /// day-count and multi-month configurations without touching any
    /// state.
    #[instrument(skip(self), fields(widget = %self.id))]
    pub fn set_month(&mut self, month: u32) -> anyhow::Result<&mut Self> {
        let orig = self.interval;
        self.interval = self.interval.with_month(&self.options.length_of_time, month)?;
        self.render_pass();
        self.fire_change_events(orig);
        Ok(self)
    }

    /// Moves the whole interval to another year.
    #[instrument(skip(self), fields(widget = %self.id))]
    pub fn set_year(&mut self, year: i32) -> &mut Self {
        let orig = self.interval;
        self.interval = self.interval.with_year(year);
        self.render_pass();
        self.fire_change_events(orig);
        self
    }

    /// Re-seeds the interval start. Errors for single-month
    /// configurations without touching any state.
    #[instrument(skip(self), fields(widget = %self.id, date = %date))]
    pub fn set_interval_start(&mut self, date: NaiveDate) -> anyhow::Result<&mut Self> {
        let orig = self.interval;
        self.interval = Interval::with_interval_start(&self.options.length_of_time, date)?;
        self.render_pass();
        self.fire_change_events(orig);
        Ok(self)
    }

    /// Replaces all events and re-renders.
    #[instrument(skip(self, records), fields(widget = %self.id, count = records.len()))]
    pub fn set_events(&mut self, records: Vec<Value>) -> anyhow::Result<&mut Self> {
        self.events = event::annotate_events(
            records,
            self.options.date_parameter(),
            self.options.multi_day_events.as_ref(),
        )?;
        self.render_pass();
        Ok(self)
    }

    /// Appends events, optionally skipping the re-render.
    #[instrument(skip(self, records), fields(widget = %self.id, count = records.len()))]
    pub fn add_events(&mut self, records: Vec<Value>, rerender: bool) -> anyhow::Result<&mut Self> {
        let mut annotated = event::annotate_events(
            records,
            self.options.date_parameter(),
            self.options.multi_day_events.as_ref(),
        )?;
        self.events.append(&mut annotated);

        if rerender {
            self.render_pass();
        }
        Ok(self)
    }

    /// Drops every event the predicate matches. The predicate sees
    /// the fully annotated record, derived dates included.
    #[instrument(skip(self, matching), fields(widget = %self.id))]
    pub fn remove_events(&mut self, matching: impl Fn(&CalendarEvent) -> bool) -> &mut Self {
        let before = self.events.len();
        self.events.retain(|event| !matching(event));
        debug!(
            removed = before - self.events.len(),
            remaining = self.events.len(),
            "removed events"
        );
        self.render_pass();
        self
    }

    /// Overwrites the template extras and re-renders.
    #[instrument(skip(self, extras), fields(widget = %self.id))]
    pub fn set_extras(&mut self, extras: Value) -> &mut Self {
        self.options.extras = Some(extras);
        self.render_pass();
        self
    }

    /// Dispatches a resolved click target to the matching operation.
    #[instrument(skip(self), fields(widget = %self.id))]
    pub fn handle_click(&mut self, target: ClickTarget) -> &mut Self {
        match target {
            ClickTarget::Day(date) => self.handle_day_click(date),
            ClickTarget::Empty(adjacency) => self.handle_empty_click(adjacency),
            ClickTarget::TodayButton => {
                self.today();
            }
            ClickTarget::NextButton => {
                self.next_month();
            }
            ClickTarget::PreviousButton => {
                self.previous_month();
            }
            ClickTarget::NextYearButton => {
                self.next_year();
            }
            ClickTarget::PreviousYearButton => {
                self.previous_year();
            }
        }
        self
    }

    /// Tears the widget down, dropping its configuration, events, and
    /// rendered output.
    pub fn destroy(self) {
        debug!(widget = %self.id, "destroyed calendar");
    }

    fn handle_day_click(&mut self, date: NaiveDate) {
        if let Some(click) = &self.options.click_events.click {
            click(&TargetDetails {
                date: Some(date),
                events: self.events_on(date),
            });
        }

        let mut selection_changed = false;
        if self.options.track_selected_date
            && !(self.options.ignore_inactive_days_in_selection && self.is_inactive(date))
        {
            selection_changed = self.options.selected_date != Some(date);
            self.options.selected_date = Some(date);
        }

        let day_mode = matches!(self.options.length_of_time.mode(), LengthMode::DayCount(_));
        if self.options.adjacent_days_change_month && !day_mode {
            if datemath::is_before_month(date, self.interval.start) {
                self.previous_month();
                return;
            }
            if datemath::is_after_month(date, self.interval.end) {
                self.next_month();
                return;
            }
        }

        if selection_changed {
            self.render_pass();
        }
    }

    fn handle_empty_click(&mut self, adjacency: Adjacency) {
        if let Some(click) = &self.options.click_events.click {
            click(&TargetDetails {
                date: None,
                events: vec![],
            });
        }

        if self.options.adjacent_days_change_month {
            match adjacency {
                Adjacency::LastMonth => {
                    self.previous_month();
                }
                Adjacency::NextMonth => {
                    self.next_month();
                }
            }
        }
    }

    fn events_on(&self, date: NaiveDate) -> Vec<CalendarEvent> {
        if self.options.multi_day_events.is_some() {
            self.events
                .iter()
                .filter(|event| event.contains(date))
                .cloned()
                .collect()
        } else {
            self.events
                .iter()
                .filter(|event| event.start_date == date)
                .cloned()
                .collect()
        }
    }

    fn is_inactive(&self, date: NaiveDate) -> bool {
        self.options.constraints.is_some_and(|constraints| {
            constraints.start_date.is_some_and(|bound| date < bound)
                || constraints.end_date.is_some_and(|bound| date > bound)
        })
    }

    fn current_day(&self) -> NaiveDate {
        self.today_override.unwrap_or_else(clock::today)
    }

    /// Rebuilds the grid and snapshot, renders, and recomputes the
    /// constraint flags. Exactly one of these runs per mutating call.
    #[instrument(skip(self), fields(widget = %self.id, start = %self.interval.start, end = %self.interval.end))]
    fn render_pass(&mut self) {
        let today = self.current_day();
        let mode = self.options.length_of_time.mode();
        let day_mode = matches!(mode, LengthMode::DayCount(_));
        let with_adjacent = self.options.show_adjacent_months && !day_mode;

        let index = EventIndex::classify(
            &self.events,
            self.interval.start,
            self.interval.end,
            with_adjacent,
        );

        let ctx = GridContext {
            week_offset: self.options.week_offset,
            day_mode,
            show_adjacent_months: self.options.show_adjacent_months,
            force_six_rows: self.options.force_six_rows,
            constraints: self.options.constraints.as_ref(),
            selected_date: self.options.selected_date,
            today,
            targets: &self.options.targets,
            classes: &self.options.classes,
        };

        let (days, months, number_of_rows, month, year) = match mode {
            LengthMode::DayCount(_) => {
                let days = grid::build_days(self.interval.start, self.interval.end, &index, &ctx);
                let rows = days.len().div_ceil(7);
                (days, vec![], rows, None, None)
            }
            LengthMode::MonthCount(month_count) => {
                let mut month_grids = Vec::with_capacity(month_count as usize);
                let mut rows = 0;
                for offset in 0..month_count {
                    let month_start =
                        datemath::shift_months(self.interval.start, offset as i32);
                    let month_end = datemath::end_of_month(month_start);
                    let month_index = EventIndex::classify(
                        &self.events,
                        month_start,
                        month_end,
                        with_adjacent,
                    );
                    let month_days = grid::build_days(month_start, month_end, &month_index, &ctx);
                    rows += month_days.len().div_ceil(7);
                    month_grids.push(MonthSnapshot {
                        month: month_start,
                        days: month_days,
                    });
                }
                (
                    vec![],
                    month_grids,
                    rows,
                    Some(self.interval.month),
                    Some(self.interval.month.year()),
                )
            }
            LengthMode::SingleMonth => {
                let days = grid::build_days(self.interval.start, self.interval.end, &index, &ctx);
                let rows = days.len().div_ceil(7);
                (
                    days,
                    vec![],
                    rows,
                    Some(self.interval.month),
                    Some(self.interval.month.year()),
                )
            }
        };

        let events_this_month = if matches!(mode, LengthMode::SingleMonth) {
            index.this_interval.clone()
        } else {
            vec![]
        };

        let snapshot = Snapshot {
            days,
            months,
            days_of_the_week: self.days_of_the_week.clone(),
            month,
            year,
            interval_start: self.interval.start,
            interval_end: self.interval.end,
            number_of_rows,
            events_this_interval: index.this_interval,
            events_this_month,
            events_last_month: index.last_month,
            events_next_month: index.next_month,
            extras: self.options.extras.clone(),
        };

        self.markup = match &self.options.render {
            Some(render) => render(&snapshot),
            None => template::default_template(&snapshot),
        };
        self.snapshot = snapshot;
        self.flags =
            ConstraintFlags::evaluate(self.options.constraints.as_ref(), &self.interval, today);

        debug!(
            rows = self.snapshot.number_of_rows,
            events = self.snapshot.events_this_interval.len(),
            "rendered"
        );

        if let Some(done_rendering) = &self.options.done_rendering {
            done_rendering();
        }
    }

    /// Diffs the old interval against the current one and fires every
    /// applicable change callback. Interval-based configurations get
    /// the interval callbacks; single-month ones get month/year
    /// callbacks.
    fn fire_change_events(&self, orig: Interval) {
        let new = self.interval;
        let handlers = &self.options.click_events;

        if self.options.length_of_time.is_interval_based() {
            let advanced = new.start > orig.start;
            let regressed = new.start < orig.start;

            if advanced {
                if let Some(next_interval) = &handlers.next_interval {
                    next_interval(new.start, new.end);
                }
            }
            if regressed {
                if let Some(previous_interval) = &handlers.previous_interval {
                    previous_interval(new.start, new.end);
                }
            }
            if advanced || regressed {
                if let Some(on_interval_change) = &handlers.on_interval_change {
                    on_interval_change(new.start, new.end);
                }
            }
            return;
        }

        let month_distance = (new.start.month() as i32 - orig.start.month() as i32).abs();
        let moved_to_next_month = new.start > orig.start
            && (month_distance == 1 || (orig.start.month() == 12 && new.start.month() == 1));
        let moved_to_previous_month = new.start < orig.start
            && (month_distance == 1 || (orig.start.month() == 1 && new.start.month() == 12));
        let month_changed = new.start.month() != orig.start.month()
            || new.start.year() != orig.start.year();
        let moved_to_next_year = new.start.year() - orig.start.year() == 1
            || new.end.year() - orig.end.year() == 1;
        let moved_to_previous_year = orig.start.year() - new.start.year() == 1
            || orig.end.year() - new.end.year() == 1;
        let year_changed = new.start.year() != orig.start.year();

        if moved_to_next_month {
            if let Some(next_month) = &handlers.next_month {
                next_month(new.month);
            }
        }
        if moved_to_previous_month {
            if let Some(previous_month) = &handlers.previous_month {
                previous_month(new.month);
            }
        }
        if month_changed {
            if let Some(on_month_change) = &handlers.on_month_change {
                on_month_change(new.month);
            }
        }
        if moved_to_next_year {
            if let Some(next_year) = &handlers.next_year {
                next_year(new.month);
            }
        }
        if moved_to_previous_year {
            if let Some(previous_year) = &handlers.previous_year {
                previous_year(new.month);
            }
        }
        if year_changed {
            if let Some(on_year_change) = &handlers.on_year_change {
                on_year_change(new.month);
            }
        }
    }
}

fn validate(options: &Options) -> anyhow::Result<()> {
    if options.week_offset > 6 {
        bail!("week_offset must be 0-6, got {}", options.week_offset);
    }
    if options.length_of_time.months == Some(0) {
        bail!("length_of_time.months must be at least 1 when set");
    }
    if options.length_of_time.days == Some(0) {
        bail!("length_of_time.days must be at least 1 when set");
    }
    if options.length_of_time.interval == 0 {
        bail!("length_of_time.interval must be at least 1");
    }
    Ok(())
}
