use crate::grid::DayCell;
use crate::snapshot::Snapshot;

/// The templating collaborator: a black box from snapshot to markup.
pub type RenderFn = Box<dyn Fn(&Snapshot) -> String>;

/// The built-in template: a controls header and one table per grid.
/// Replace it by setting `Options.render`.
pub fn default_template(snapshot: &Snapshot) -> String {
    let mut out = String::new();

    let heading = match (snapshot.month, snapshot.year) {
        (Some(month), _) => month.format("%B %Y").to_string(),
        (None, Some(year)) => year.to_string(),
        (None, None) => format!(
            "{} \u{2013} {}",
            snapshot.interval_start.format("%Y-%m-%d"),
            snapshot.interval_end.format("%Y-%m-%d")
        ),
    };

    out.push_str("<div class=\"calendar-controls\">\n");
    out.push_str(
        "  <div class=\"calendar-control-button\">\
         <span class=\"calendar-previous-button\">previous</span></div>\n",
    );
    out.push_str(&format!("  <div class=\"month\">{heading}</div>\n"));
    out.push_str(
        "  <div class=\"calendar-control-button rightalign\">\
         <span class=\"calendar-next-button\">next</span></div>\n",
    );
    out.push_str("</div>\n");

    if snapshot.months.is_empty() {
        push_table(&mut out, &snapshot.days, &snapshot.days_of_the_week);
    } else {
        for month in &snapshot.months {
            out.push_str(&format!(
                "<div class=\"month-label\">{}</div>\n",
                month.month.format("%B %Y")
            ));
            push_table(&mut out, &month.days, &snapshot.days_of_the_week);
        }
    }

    out
}

fn push_table(out: &mut String, days: &[DayCell], labels: &[String]) {
    out.push_str("<table class=\"calendar-table\" border=\"0\" cellspacing=\"0\" cellpadding=\"0\">\n");
    out.push_str("  <thead>\n  <tr class=\"header-days\">\n");
    for label in labels {
        out.push_str(&format!("    <td class=\"header-day\">{label}</td>\n"));
    }
    out.push_str("  </tr>\n  </thead>\n  <tbody>\n");

    for row in days.chunks(7) {
        out.push_str("  <tr>\n");
        for cell in row {
            out.push_str(&format!(
                "    <td class=\"{}\"><div class=\"day-contents\">{}</div></td>\n",
                cell.class_attr(),
                cell.day_of_month
            ));
        }
        out.push_str("  </tr>\n");
    }

    out.push_str("  </tbody>\n</table>\n");
}
