use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use kalends_core::widget::Calendar;
use kalends_core::{Constraints, LengthOfTime, Options, datemath};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cli::{CliArgs, OutputFormat};
use crate::table;

const EVENTS_ENV_VAR: &str = "KALENDS_EVENTS";
const DEFAULT_EVENTS_FILE: &str = ".kalends/events.json";

pub fn run(args: CliArgs) -> anyhow::Result<()> {
    let today = kalends_core::clock::today();
    let mut calendar = compose(&args, today)?;
    advance(&mut calendar, args.advance);

    let output = format_output(&calendar, args.format)?;
    println!("{output}");
    Ok(())
}

/// Builds the widget the flags describe. Split from `run` so tests
/// can drive it with a pinned current day.
pub fn compose(args: &CliArgs, today: NaiveDate) -> anyhow::Result<Calendar> {
    let events = load_events(args.events.as_deref())?;

    let parse = |raw: &str| datemath::parse_date_expr(raw, today);
    let month = args.month.as_deref().map(parse).transpose()?;
    let start = args.start.as_deref().map(parse).transpose()?;
    let constraint_start = args.constraint_start.as_deref().map(parse).transpose()?;
    let constraint_end = args.constraint_end.as_deref().map(parse).transpose()?;
    let selected = args.selected.as_deref().map(parse).transpose()?;

    let constraints = if constraint_start.is_some() || constraint_end.is_some() {
        Some(Constraints {
            start_date: constraint_start,
            end_date: constraint_end,
        })
    } else {
        None
    };

    let options = Options {
        events,
        length_of_time: LengthOfTime {
            months: args.months,
            days: args.days,
            interval: args.interval,
            start_date: start,
        },
        start_with_month: month,
        week_offset: args.week_offset,
        show_adjacent_months: !args.hide_adjacent,
        force_six_rows: args.force_six_rows,
        constraints,
        selected_date: selected,
        ..Options::default()
    };

    debug!(?options, "composed widget options");
    Calendar::with_today(options, today)
}

fn advance(calendar: &mut Calendar, steps: i32) {
    for _ in 0..steps.abs() {
        if steps > 0 {
            calendar.next_month();
        } else {
            calendar.previous_month();
        }
    }
    if steps != 0 {
        info!(
            steps,
            start = %calendar.interval().start,
            end = %calendar.interval().end,
            "advanced calendar"
        );
    }
}

pub fn format_output(calendar: &Calendar, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(table::render_text(calendar.snapshot())),
        OutputFormat::Html => Ok(calendar.markup().to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(calendar.snapshot())
            .context("failed serializing snapshot"),
    }
}

fn load_events(path_override: Option<&Path>) -> anyhow::Result<Vec<Value>> {
    let Some(path) = resolve_events_path(path_override) else {
        debug!("no events file; rendering an empty calendar");
        return Ok(vec![]);
    };

    if !path.exists() {
        if path_override.is_some() {
            return Err(anyhow!("events file does not exist: {}", path.display()));
        }
        debug!(file = %path.display(), "default events file not found");
        return Ok(vec![]);
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let records: Vec<Value> = serde_json::from_str(&raw)
        .with_context(|| format!("failed parsing {} as a JSON array", path.display()))?;

    info!(file = %path.display(), count = records.len(), "loaded events");
    Ok(records)
}

fn resolve_events_path(path_override: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = path_override {
        return Some(path.to_path_buf());
    }

    if let Ok(raw) = std::env::var(EVENTS_ENV_VAR) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    let Some(home) = dirs::home_dir() else {
        warn!("cannot determine home directory; skipping default events file");
        return None;
    };
    Some(home.join(DEFAULT_EVENTS_FILE))
}
