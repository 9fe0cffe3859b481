use kalends_core::DayCell;
use kalends_core::snapshot::Snapshot;
use unicode_width::UnicodeWidthStr;

/// Plain-text rendering of a snapshot: one aligned grid per month,
/// `*` marking today and `+` marking days with events.
pub fn render_text(snapshot: &Snapshot) -> String {
    let mut out = String::new();

    if snapshot.months.is_empty() {
        let heading = match snapshot.month {
            Some(month) => month.format("%B %Y").to_string(),
            None => format!(
                "{} to {}",
                snapshot.interval_start.format("%Y-%m-%d"),
                snapshot.interval_end.format("%Y-%m-%d")
            ),
        };
        out.push_str(&heading);
        out.push('\n');
        push_grid(&mut out, &snapshot.days, &snapshot.days_of_the_week);
    } else {
        for (idx, month) in snapshot.months.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            out.push_str(&month.month.format("%B %Y").to_string());
            out.push('\n');
            push_grid(&mut out, &month.days, &snapshot.days_of_the_week);
        }
    }

    out
}

fn cell_text(cell: &DayCell) -> String {
    let marker = if cell.is_today {
        "*"
    } else if !cell.events.is_empty() {
        "+"
    } else {
        ""
    };
    format!("{}{marker}", cell.day_of_month)
}

fn push_grid(out: &mut String, days: &[DayCell], labels: &[String]) {
    let label_width = labels
        .iter()
        .map(|label| UnicodeWidthStr::width(label.as_str()))
        .max()
        .unwrap_or(0);
    let cell_width = days
        .iter()
        .map(|cell| UnicodeWidthStr::width(cell_text(cell).as_str()))
        .max()
        .unwrap_or(0);
    let width = label_width.max(cell_width).max(2);

    for (idx, label) in labels.iter().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        push_right_aligned(out, label, width);
    }
    out.push('\n');

    for row in days.chunks(7) {
        for (idx, cell) in row.iter().enumerate() {
            if idx > 0 {
                out.push(' ');
            }
            push_right_aligned(out, &cell_text(cell), width);
        }
        out.push('\n');
    }
}

fn push_right_aligned(out: &mut String, text: &str, width: usize) {
    let padding = width.saturating_sub(UnicodeWidthStr::width(text));
    out.push_str(&" ".repeat(padding));
    out.push_str(text);
}
