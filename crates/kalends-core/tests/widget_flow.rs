use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use kalends_core::widget::Calendar;
use kalends_core::{ClickHandlers, ClickTarget, Constraints, LengthOfTime, Options};
use serde_json::json;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
}

#[test]
fn navigation_round_trip_restores_the_interval() {
    let mut calendar = Calendar::with_today(
        Options {
            start_with_month: Some(d(2024, 2, 1)),
            ..Options::default()
        },
        d(2024, 2, 10),
    )
    .expect("construct");

    assert_eq!(calendar.interval().start, d(2024, 2, 1));
    assert_eq!(calendar.interval().end, d(2024, 2, 29));

    let original = calendar.interval();
    calendar.next_month();
    assert_eq!(calendar.interval().start, d(2024, 3, 1));
    assert_eq!(calendar.interval().end, d(2024, 3, 31));
    calendar.previous_month();
    assert_eq!(calendar.interval(), original);
}

#[test]
fn month_and_year_callbacks_fire_on_navigation() {
    let months: Rc<RefCell<Vec<NaiveDate>>> = Rc::new(RefCell::new(vec![]));
    let month_changes: Rc<RefCell<Vec<NaiveDate>>> = Rc::new(RefCell::new(vec![]));
    let years: Rc<RefCell<Vec<NaiveDate>>> = Rc::new(RefCell::new(vec![]));

    let months_sink = Rc::clone(&months);
    let month_change_sink = Rc::clone(&month_changes);
    let years_sink = Rc::clone(&years);

    let mut calendar = Calendar::with_today(
        Options {
            start_with_month: Some(d(2024, 12, 1)),
            click_events: ClickHandlers {
                next_month: Some(Box::new(move |month| {
                    months_sink.borrow_mut().push(month);
                })),
                on_month_change: Some(Box::new(move |month| {
                    month_change_sink.borrow_mut().push(month);
                })),
                on_year_change: Some(Box::new(move |month| {
                    years_sink.borrow_mut().push(month);
                })),
                ..ClickHandlers::default()
            },
            ..Options::default()
        },
        d(2024, 12, 10),
    )
    .expect("construct");

    // December to January: adjacent-month forward plus a year change.
    calendar.next_month();
    assert_eq!(months.borrow().as_slice(), &[d(2025, 1, 1)]);
    assert_eq!(month_changes.borrow().as_slice(), &[d(2025, 1, 1)]);
    assert_eq!(years.borrow().as_slice(), &[d(2025, 1, 1)]);
}

#[test]
fn interval_callbacks_fire_for_day_configurations() {
    let advances: Rc<RefCell<Vec<(NaiveDate, NaiveDate)>>> = Rc::new(RefCell::new(vec![]));
    let advances_sink = Rc::clone(&advances);

    let mut calendar = Calendar::with_today(
        Options {
            length_of_time: LengthOfTime {
                days: Some(7),
                ..LengthOfTime::default()
            },
            week_offset: 1,
            click_events: ClickHandlers {
                next_interval: Some(Box::new(move |start, end| {
                    advances_sink.borrow_mut().push((start, end));
                })),
                ..ClickHandlers::default()
            },
            ..Options::default()
        },
        d(2024, 6, 12),
    )
    .expect("construct");

    calendar.next_month();
    assert_eq!(
        advances.borrow().as_slice(),
        &[(d(2024, 6, 11), d(2024, 6, 17))]
    );
}

#[test]
fn previous_navigation_never_escapes_the_start_constraint() {
    let mut calendar = Calendar::with_today(
        Options {
            start_with_month: Some(d(2024, 3, 1)),
            constraints: Some(Constraints {
                start_date: Some(d(2024, 1, 1)),
                end_date: None,
            }),
            ..Options::default()
        },
        d(2024, 3, 10),
    )
    .expect("construct");

    for _ in 0..6 {
        calendar.previous_month();
        calendar.previous_year();
    }

    assert!(calendar.interval().start >= d(2024, 1, 1));
    assert!(!calendar.constraint_flags().previous);
    assert!(!calendar.constraint_flags().previous_year);
}

#[test]
fn today_callback_fires_even_when_nothing_moves() {
    let today_clicks = Rc::new(RefCell::new(0));
    let today_sink = Rc::clone(&today_clicks);

    let mut calendar = Calendar::with_today(
        Options {
            click_events: ClickHandlers {
                today: Some(Box::new(move |_| {
                    *today_sink.borrow_mut() += 1;
                })),
                ..ClickHandlers::default()
            },
            ..Options::default()
        },
        d(2024, 6, 12),
    )
    .expect("construct");

    calendar.today();
    calendar.today();
    assert_eq!(*today_clicks.borrow(), 2);
    assert_eq!(calendar.interval().start, d(2024, 6, 1));
}

#[test]
fn multi_day_event_spans_a_month_boundary() {
    let calendar = Calendar::with_today(
        Options {
            start_with_month: Some(d(2024, 4, 1)),
            multi_day_events: Some(kalends_core::MultiDayEvents {
                start_date: "startDate".to_string(),
                end_date: "endDate".to_string(),
                single_day: None,
            }),
            events: vec![json!({
                "title": "offsite",
                "startDate": "2024-03-28",
                "endDate": "2024-04-02"
            })],
            ..Options::default()
        },
        d(2024, 4, 15),
    )
    .expect("construct");

    let snapshot = calendar.snapshot();
    assert_eq!(snapshot.events_this_month.len(), 1);
    assert_eq!(snapshot.events_last_month.len(), 1);

    let cell = snapshot
        .days
        .iter()
        .find(|cell| cell.date == Some(d(2024, 4, 1)))
        .expect("April 1 cell");
    assert_eq!(cell.events.len(), 1);
    assert!(cell.classes.contains(&"event".to_string()));
    assert!(!cell.classes.contains(&"event-start".to_string()));

    let end_cell = snapshot
        .days
        .iter()
        .find(|cell| cell.date == Some(d(2024, 4, 2)))
        .expect("April 2 cell");
    assert!(end_cell.classes.contains(&"event-end".to_string()));
}

#[test]
fn click_targets_resolved_from_markup_round_trip() {
    let mut calendar = Calendar::with_today(
        Options {
            start_with_month: Some(d(2024, 3, 1)),
            track_selected_date: true,
            ..Options::default()
        },
        d(2024, 3, 15),
    )
    .expect("construct");

    // Pull a rendered cell's class attribute back out of the markup,
    // resolve it, and dispatch it, the way a host event handler would.
    let markup = calendar.markup().to_string();
    let needle = "calendar-day-2024-03-18";
    let class_attr = markup
        .lines()
        .find(|line| line.contains(needle))
        .and_then(|line| line.split('"').nth(1))
        .expect("March 18 cell")
        .to_string();

    let target = ClickTarget::from_class_list(
        &class_attr,
        &kalends_core::Targets::default(),
        &kalends_core::Classes::default(),
    )
    .expect("resolvable target");
    assert_eq!(target, ClickTarget::Day(d(2024, 3, 18)));

    calendar.handle_click(target);
    assert_eq!(calendar.selected_date(), Some(d(2024, 3, 18)));
}

#[test]
fn forced_six_rows_hold_across_offsets() {
    for week_offset in 0..7 {
        let calendar = Calendar::with_today(
            Options {
                start_with_month: Some(d(2024, 2, 1)),
                force_six_rows: true,
                week_offset,
                ..Options::default()
            },
            d(2024, 2, 10),
        )
        .expect("construct");

        let snapshot = calendar.snapshot();
        assert_eq!(snapshot.days.len(), 42, "offset {week_offset}");
        assert_eq!(snapshot.number_of_rows, 6);
    }
}

#[test]
fn custom_render_function_receives_the_snapshot() {
    let calendar = Calendar::with_today(
        Options {
            start_with_month: Some(d(2024, 3, 1)),
            render: Some(Box::new(|snapshot| {
                format!(
                    "{}x7:{}",
                    snapshot.number_of_rows,
                    snapshot.interval_start.format("%Y-%m")
                )
            })),
            ..Options::default()
        },
        d(2024, 3, 15),
    )
    .expect("construct");

    // March 2024 has five leading February cells, so the padded grid
    // lands on six rows.
    assert_eq!(calendar.markup(), "6x7:2024-03");
}

#[test]
fn lifecycle_callbacks_observe_every_render() {
    let renders = Rc::new(RefCell::new(0));
    let readies = Rc::new(RefCell::new(0));
    let renders_sink = Rc::clone(&renders);
    let readies_sink = Rc::clone(&readies);

    let mut calendar = Calendar::with_today(
        Options {
            start_with_month: Some(d(2024, 3, 1)),
            done_rendering: Some(Box::new(move || {
                *renders_sink.borrow_mut() += 1;
            })),
            ready: Some(Box::new(move || {
                *readies_sink.borrow_mut() += 1;
            })),
            ..Options::default()
        },
        d(2024, 3, 15),
    )
    .expect("construct");

    assert_eq!(*readies.borrow(), 1);
    assert_eq!(*renders.borrow(), 1);

    calendar.next_month();
    calendar.previous_month();
    assert_eq!(*readies.borrow(), 1);
    assert_eq!(*renders.borrow(), 3);
}
