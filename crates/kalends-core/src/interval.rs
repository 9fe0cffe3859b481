use anyhow::bail;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::datemath;
use crate::options::{Constraints, LengthMode, LengthOfTime};

/// The inclusive date range currently displayed, plus the nominal
/// month anchor. Only whole values are ever swapped in; no field is
/// mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub month: NaiveDate,
}

impl Interval {
    /// Establishes the initial interval for the configured mode.
    ///
    /// Month-count: start-of-month of the explicit start date, else of
    /// `start_with_month`, else of today; the end spans N months.
    /// Day-count: the explicit start date, else the start of the
    /// current week. Default: the current (or requested) month.
    pub fn initial(
        time: &LengthOfTime,
        start_with_month: Option<NaiveDate>,
        week_offset: u32,
        today: NaiveDate,
    ) -> Self {
        match time.mode() {
            LengthMode::MonthCount(months) => {
                let seed = time.start_date.or(start_with_month).unwrap_or(today);
                let start = datemath::start_of_month(seed);
                let end = datemath::add_days(datemath::shift_months(start, months as i32), -1);
                Self {
                    start,
                    end,
                    month: start,
                }
            }
            LengthMode::DayCount(days) => {
                let start = time
                    .start_date
                    .unwrap_or_else(|| datemath::start_of_week(today, week_offset));
                Self {
                    start,
                    end: datemath::add_days(start, i64::from(days) - 1),
                    month: start,
                }
            }
            LengthMode::SingleMonth => {
                let month = datemath::start_of_month(start_with_month.unwrap_or(today));
                Self {
                    start: month,
                    end: datemath::end_of_month(month),
                    month,
                }
            }
        }
    }

    /// One-shot correction applied at construction only: shifts the
    /// interval into the constraint window, preserving its length.
    /// Day-count mode compares at week granularity, month modes at
    /// month granularity.
    pub fn constrained(
        mut self,
        time: &LengthOfTime,
        constraints: Option<&Constraints>,
        week_offset: u32,
    ) -> Self {
        let Some(constraints) = constraints else {
            return self;
        };

        if let Some(start_bound) = constraints.start_date {
            match time.mode() {
                LengthMode::DayCount(days) => {
                    let bound_week = datemath::start_of_week(start_bound, week_offset);
                    if datemath::start_of_week(self.start, week_offset) < bound_week {
                        self.start = bound_week;
                        self.end = datemath::add_days(self.start, i64::from(days) - 1);
                        self.month = self.start;
                    }
                }
                _ => {
                    if datemath::is_before_month(self.start, start_bound) {
                        self.start = datemath::with_year_month(
                            self.start,
                            start_bound.year(),
                            start_bound.month(),
                        );
                        self.month = datemath::with_year_month(
                            self.month,
                            start_bound.year(),
                            start_bound.month(),
                        );
                    }
                    if datemath::is_before_month(self.end, start_bound) {
                        self.end = datemath::with_year_month(
                            self.end,
                            start_bound.year(),
                            start_bound.month(),
                        );
                    }
                }
            }
        }

        if let Some(end_bound) = constraints.end_date {
            match time.mode() {
                LengthMode::DayCount(days) => {
                    let bound_week = datemath::start_of_week(end_bound, week_offset);
                    if datemath::start_of_week(self.start, week_offset) > bound_week {
                        self.end = datemath::end_of_week(end_bound, week_offset);
                        self.start = datemath::add_days(self.end, -(i64::from(days) - 1));
                        self.month = self.start;
                    }
                }
                _ => {
                    if datemath::is_after_month(self.end, end_bound) {
                        self.end = datemath::with_year_month(
                            self.end,
                            end_bound.year(),
                            end_bound.month(),
                        );
                        self.month = datemath::with_year_month(
                            self.month,
                            end_bound.year(),
                            end_bound.month(),
                        );
                    }
                    if datemath::is_after_month(self.start, end_bound) {
                        self.start = datemath::with_year_month(
                            self.start,
                            end_bound.year(),
                            end_bound.month(),
                        );
                    }
                }
            }
        }

        debug!(
            start = %self.start,
            end = %self.end,
            "interval after constraint correction"
        );
        self
    }

    /// The following period: `interval` days forward in day-count
    /// mode, `interval` months forward otherwise.
    #[must_use]
    pub fn next(self, time: &LengthOfTime) -> Self {
        self.advanced(time, 1)
    }

    /// The preceding period.
    #[must_use]
    pub fn previous(self, time: &LengthOfTime) -> Self {
        self.advanced(time, -1)
    }

    fn advanced(self, time: &LengthOfTime, direction: i32) -> Self {
        let step = time.interval as i32 * direction;
        match time.mode() {
            LengthMode::DayCount(days) => {
                let start = datemath::add_days(self.start, i64::from(step));
                Self {
                    start,
                    end: datemath::add_days(start, i64::from(days) - 1),
                    month: start,
                }
            }
            _ => {
                let start = datemath::start_of_month(datemath::shift_months(self.start, step));
                let end = datemath::add_days(
                    datemath::shift_months(start, time.months_per_period() as i32),
                    -1,
                );
                Self {
                    start,
                    end,
                    month: start,
                }
            }
        }
    }

    /// Same period shifted by whole years, each bound clamped to a
    /// valid day (Feb 29 becomes Feb 28).
    #[must_use]
    pub fn shifted_years(self, years: i32) -> Self {
        Self {
            start: datemath::shift_years(self.start, years),
            end: datemath::shift_years(self.end, years),
            month: datemath::shift_years(self.month, years),
        }
    }

    /// The interval containing today. In day-count mode with an
    /// explicit start date, the new start keeps that date's weekday
    /// within the current week.
    pub fn jumped_to_today(time: &LengthOfTime, week_offset: u32, today: NaiveDate) -> Self {
        match time.mode() {
            LengthMode::DayCount(days) => {
                let start = match time.start_date {
                    Some(seed) => datemath::add_days(
                        datemath::start_of_week(today, week_offset),
                        i64::from(datemath::leading_day_count(seed, week_offset)),
                    ),
                    None => datemath::start_of_week(today, week_offset),
                };
                Self {
                    start,
                    end: datemath::add_days(start, i64::from(days) - 1),
                    month: start,
                }
            }
            _ => {
                let start = datemath::start_of_month(today);
                let end = datemath::add_days(
                    datemath::shift_months(start, time.months_per_period() as i32),
                    -1,
                );
                Self {
                    start,
                    end,
                    month: start,
                }
            }
        }
    }

    /// Re-anchors to a calendar month (1-12) within the current year.
    /// Only valid for single-month configurations.
    pub fn with_month(self, time: &LengthOfTime, month: u32) -> anyhow::Result<Self> {
        if time.is_interval_based() {
            bail!(
                "calendar is configured with a custom interval; use set_interval_start(date) instead"
            );
        }
        if !(1..=12).contains(&month) {
            bail!("month must be between 1 and 12, got {month}");
        }

        let start = datemath::first_day_of_month(self.month.year(), month);
        Ok(Self {
            start,
            end: datemath::end_of_month(start),
            month: start,
        })
    }

    /// Same period re-anchored to another year.
    #[must_use]
    pub fn with_year(self, year: i32) -> Self {
        Self {
            start: datemath::with_year(self.start, year),
            end: datemath::with_year(self.end, year),
            month: datemath::with_year(self.month, year),
        }
    }

    /// Re-seeds the interval start. Only valid for day-count and
    /// month-count configurations.
    pub fn with_interval_start(time: &LengthOfTime, date: NaiveDate) -> anyhow::Result<Self> {
        match time.mode() {
            LengthMode::SingleMonth => {
                bail!(
                    "calendar is not configured with a custom interval; use set_month/set_year instead"
                );
            }
            LengthMode::DayCount(days) => Ok(Self {
                start: date,
                end: datemath::add_days(date, i64::from(days) - 1),
                month: date,
            }),
            LengthMode::MonthCount(_) => {
                let start = datemath::start_of_month(date);
                let end = datemath::add_days(
                    datemath::shift_months(start, time.months_per_period() as i32),
                    -1,
                );
                Ok(Self {
                    start,
                    end,
                    month: start,
                })
            }
        }
    }
}

/// Which navigation directions are currently permitted. Fully
/// recomputed on every render, never patched incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConstraintFlags {
    pub next: bool,
    pub previous: bool,
    pub next_year: bool,
    pub previous_year: bool,
    pub today: bool,
}

impl Default for ConstraintFlags {
    fn default() -> Self {
        Self {
            next: true,
            previous: true,
            next_year: true,
            previous_year: true,
            today: true,
        }
    }
}

impl ConstraintFlags {
    pub fn evaluate(
        constraints: Option<&Constraints>,
        interval: &Interval,
        today: NaiveDate,
    ) -> Self {
        let mut flags = Self::default();
        let Some(constraints) = constraints else {
            return flags;
        };

        if let Some(start) = constraints.start_date {
            if start >= interval.start {
                flags.previous = false;
            }
            if start > datemath::shift_years(interval.start, -1) {
                flags.previous_year = false;
            }
            if datemath::is_after_month(start, today) {
                flags.today = false;
            }
        }

        if let Some(end) = constraints.end_date {
            if end <= interval.end {
                flags.next = false;
            }
            if end < datemath::shift_years(interval.end, 1) {
                flags.next_year = false;
            }
            if datemath::is_before_month(end, today) {
                flags.today = false;
            }
        }

        flags
    }
}
