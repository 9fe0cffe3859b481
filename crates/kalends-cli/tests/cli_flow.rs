use std::fs;

use chrono::NaiveDate;
use clap::Parser;
use kalends_cli::app;
use kalends_cli::cli::{CliArgs, OutputFormat};
use tempfile::tempdir;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
}

#[test]
fn events_file_drives_the_rendered_month() {
    let temp = tempdir().expect("tempdir");
    let events_path = temp.path().join("events.json");
    fs::write(
        &events_path,
        r#"[
            {"date": "2024-03-20", "title": "release"},
            {"date": "2024-04-02", "title": "retro"}
        ]"#,
    )
    .expect("write events");

    let args = CliArgs::parse_from([
        "kal",
        "--events",
        events_path.to_str().expect("utf-8 path"),
        "--month",
        "2024-03-01",
    ]);

    let calendar = app::compose(&args, d(2024, 3, 15)).expect("compose");
    assert_eq!(calendar.interval().start, d(2024, 3, 1));
    assert_eq!(calendar.snapshot().events_this_month.len(), 1);
    assert_eq!(calendar.snapshot().events_next_month.len(), 1);

    let text = app::format_output(&calendar, OutputFormat::Text).expect("text");
    assert!(text.contains("March 2024"));
    assert!(text.contains("20+"));

    let html = app::format_output(&calendar, OutputFormat::Html).expect("html");
    assert!(html.contains("calendar-day-2024-03-20"));

    let json = app::format_output(&calendar, OutputFormat::Json).expect("json");
    let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(parsed["month"], "2024-03-01");
    assert_eq!(parsed["events_this_month"].as_array().expect("array").len(), 1);
}

#[test]
fn advance_and_day_mode_flags_compose() {
    let args = CliArgs::parse_from([
        "kal",
        "--days",
        "7",
        "--week-offset",
        "1",
        "--start",
        "2024-06-10",
    ]);

    let calendar = app::compose(&args, d(2024, 6, 12)).expect("compose");
    assert_eq!(calendar.interval().start, d(2024, 6, 10));
    assert_eq!(calendar.interval().end, d(2024, 6, 16));
    assert_eq!(calendar.snapshot().days.len(), 7);
}

#[test]
fn missing_events_file_is_an_error_when_explicit() {
    let temp = tempdir().expect("tempdir");
    let missing = temp.path().join("nope.json");

    let args = CliArgs::parse_from([
        "kal",
        "--events",
        missing.to_str().expect("utf-8 path"),
    ]);

    let err = app::compose(&args, d(2024, 3, 15)).expect_err("must fail");
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn month_names_parse_relative_to_today() {
    let args = CliArgs::parse_from(["kal", "--month", "march"]);
    let calendar = app::compose(&args, d(2024, 6, 12)).expect("compose");
    assert_eq!(calendar.interval().start, d(2024, 3, 1));
    assert_eq!(calendar.interval().end, d(2024, 3, 31));
}
