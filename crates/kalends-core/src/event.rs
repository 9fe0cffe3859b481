use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::datemath;
use crate::options::MultiDayEvents;

/// An event record annotated with its calendar span. The raw JSON
/// payload rides along untouched so templates can reach every field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_multi_day: bool,
    pub record: Value,
}

impl CalendarEvent {
    /// Inclusive overlap with a date range.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }

    /// Whether `day` falls within this event's span.
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }
}

/// Derives start/end dates for a batch of raw records. Runs once per
/// `events` assignment; the annotated records are never re-derived.
#[tracing::instrument(skip(records, multi_day))]
pub fn annotate_events(
    records: Vec<Value>,
    date_parameter: &str,
    multi_day: Option<&MultiDayEvents>,
) -> anyhow::Result<Vec<CalendarEvent>> {
    let mut out = Vec::with_capacity(records.len());

    for (idx, record) in records.into_iter().enumerate() {
        let event = match multi_day {
            Some(fields) => annotate_multi_day(record, fields),
            None => annotate_single_day(record, date_parameter),
        }
        .with_context(|| format!("failed annotating event at index {idx}"))?;
        out.push(event);
    }

    debug!(count = out.len(), "annotated events");
    Ok(out)
}

fn annotate_single_day(record: Value, date_parameter: &str) -> anyhow::Result<CalendarEvent> {
    let date = parse_date_field(&record, date_parameter)?
        .ok_or_else(|| anyhow!("event record has no `{date_parameter}` field"))?;

    Ok(CalendarEvent {
        start_date: date,
        end_date: date,
        is_multi_day: false,
        record,
    })
}

fn annotate_multi_day(record: Value, fields: &MultiDayEvents) -> anyhow::Result<CalendarEvent> {
    let start = parse_date_field(&record, &fields.start_date)?;
    let end = parse_date_field(&record, &fields.end_date)?;

    let (start_date, end_date) = match (start, end) {
        (None, None) => {
            // Fall back to the single-day field for records that
            // carry no span at all.
            let field = fields.single_day.as_deref().ok_or_else(|| {
                anyhow!(
                    "event record has neither `{}` nor `{}`, and no singleDay field is configured",
                    fields.start_date,
                    fields.end_date
                )
            })?;
            let date = parse_date_field(&record, field)?
                .ok_or_else(|| anyhow!("event record has no `{field}` field"))?;
            (date, date)
        }
        (Some(start), None) => (start, start),
        (None, Some(end)) => (end, end),
        (Some(start), Some(end)) => (start, end),
    };

    Ok(CalendarEvent {
        start_date,
        end_date,
        is_multi_day: end_date > start_date,
        record,
    })
}

fn parse_date_field(record: &Value, field: &str) -> anyhow::Result<Option<NaiveDate>> {
    let Some(raw) = record.get(field) else {
        return Ok(None);
    };

    let text = raw
        .as_str()
        .ok_or_else(|| anyhow!("event field `{field}` is not a string: {raw}"))?;

    datemath::parse_date(text)
        .map(Some)
        .with_context(|| format!("event field `{field}`"))
}

/// Events bucketed by overlap with the visible interval and the two
/// adjacent month windows.
#[derive(Debug, Clone, Default)]
pub struct EventIndex {
    pub this_interval: Vec<CalendarEvent>,
    pub last_month: Vec<CalendarEvent>,
    pub next_month: Vec<CalendarEvent>,
}

impl EventIndex {
    /// Classifies `events` against `[start, end]`. The adjacent-month
    /// buckets are only populated when adjacent days will be shown.
    #[tracing::instrument(skip(events))]
    pub fn classify(
        events: &[CalendarEvent],
        start: NaiveDate,
        end: NaiveDate,
        with_adjacent: bool,
    ) -> Self {
        let this_interval: Vec<CalendarEvent> = events
            .iter()
            .filter(|ev| ev.overlaps(start, end))
            .cloned()
            .collect();

        let (last_month, next_month) = if with_adjacent {
            let last_start = datemath::start_of_month(datemath::shift_months(start, -1));
            let last_end = datemath::end_of_month(last_start);
            let next_start = datemath::start_of_month(datemath::shift_months(end, 1));
            let next_end = datemath::end_of_month(next_start);

            (
                events
                    .iter()
                    .filter(|ev| ev.overlaps(last_start, last_end))
                    .cloned()
                    .collect(),
                events
                    .iter()
                    .filter(|ev| ev.overlaps(next_start, next_end))
                    .cloned()
                    .collect(),
            )
        } else {
            (vec![], vec![])
        };

        debug!(
            total = events.len(),
            this_interval = this_interval.len(),
            last_month = last_month.len(),
            next_month = next_month.len(),
            "classified events"
        );

        Self {
            this_interval,
            last_month,
            next_month,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
    }

    #[test]
    fn single_day_annotation_uses_the_configured_field() {
        let events = annotate_events(
            vec![json!({"when": "2024-03-15", "title": "standup"})],
            "when",
            None,
        )
        .expect("annotate");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start_date, d(2024, 3, 15));
        assert_eq!(events[0].end_date, d(2024, 3, 15));
        assert!(!events[0].is_multi_day);
        assert_eq!(events[0].record["title"], "standup");
    }

    #[test]
    fn missing_date_field_fails_fast() {
        let err = annotate_events(vec![json!({"title": "no date"})], "date", None)
            .expect_err("must fail");
        assert!(err.to_string().contains("index 0"));
    }

    #[test]
    fn unparseable_date_fails_fast() {
        assert!(annotate_events(vec![json!({"date": "soonish"})], "date", None).is_err());
    }

    #[test]
    fn multi_day_annotation_and_fallbacks() {
        let fields = MultiDayEvents {
            start_date: "beginDate".to_string(),
            end_date: "endDate".to_string(),
            single_day: Some("singleDay".to_string()),
        };

        let events = annotate_events(
            vec![
                json!({"beginDate": "2024-03-10", "endDate": "2024-03-12"}),
                json!({"singleDay": "2024-03-15"}),
                json!({"beginDate": "2024-03-20"}),
            ],
            "date",
            Some(&fields),
        )
        .expect("annotate");

        assert!(events[0].is_multi_day);
        assert_eq!(events[0].end_date, d(2024, 3, 12));

        assert!(!events[1].is_multi_day);
        assert_eq!(events[1].start_date, d(2024, 3, 15));

        assert!(!events[2].is_multi_day);
        assert_eq!(events[2].start_date, d(2024, 3, 20));
        assert_eq!(events[2].end_date, d(2024, 3, 20));
    }

    #[test]
    fn overlap_is_inclusive_on_both_bounds() {
        let events = annotate_events(
            vec![json!({"startDate": "2024-03-28", "endDate": "2024-04-02"})],
            "date",
            Some(&MultiDayEvents::default()),
        )
        .expect("annotate");
        let event = &events[0];

        // Spans the March/April boundary.
        assert!(event.overlaps(d(2024, 3, 1), d(2024, 3, 31)));
        assert!(event.overlaps(d(2024, 4, 1), d(2024, 4, 30)));
        assert!(event.overlaps(d(2024, 4, 2), d(2024, 4, 10)));
        assert!(!event.overlaps(d(2024, 4, 3), d(2024, 4, 10)));
        assert!(event.contains(d(2024, 3, 28)));
        assert!(event.contains(d(2024, 4, 2)));
        assert!(!event.contains(d(2024, 3, 27)));
    }

    #[test]
    fn classify_buckets_adjacent_months() {
        let events = annotate_events(
            vec![
                json!({"date": "2024-02-15"}),
                json!({"date": "2024-03-05"}),
                json!({"date": "2024-04-01"}),
            ],
            "date",
            None,
        )
        .expect("annotate");

        let index = EventIndex::classify(&events, d(2024, 3, 1), d(2024, 3, 31), true);
        assert_eq!(index.this_interval.len(), 1);
        assert_eq!(index.last_month.len(), 1);
        assert_eq!(index.next_month.len(), 1);

        let bare = EventIndex::classify(&events, d(2024, 3, 1), d(2024, 3, 31), false);
        assert!(bare.last_month.is_empty());
        assert!(bare.next_month.is_empty());
    }
}
