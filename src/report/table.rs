use super::html::{esc, fmt_number};
use crate::compare::{Change, Comparison};

const HEADERS: [&str; 9] = [
    "Name",
    "Usage (µJ) before",
    "Usage (µJ) new",
    "Change usage (µJ)",
    "Change usage (%)",
    "Time (µs) before",
    "Time (µs) new",
    "Change time (µs)",
    "Change time (%)",
];

fn change_cells(c: &Change, out: &mut String) {
    // Lower is better for both energy and time.
    let class = if c.delta > 0.0 {
        "num worse"
    } else if c.delta < 0.0 {
        "num better"
    } else {
        "num"
    };
    out.push_str(&format!(
        "<td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"{class}\">{}</td><td class=\"{class}\">{:.1}</td>",
        fmt_number(c.previous),
        fmt_number(c.current),
        fmt_number(c.delta),
        c.percent
    ));
}

pub fn comparison_table(comparison: &Comparison) -> String {
    let mut t = String::from("<table class=\"comparison\">\n<thead><tr>");
    for h in HEADERS {
        t.push_str(&format!("<th>{h}</th>"));
    }
    t.push_str("</tr></thead>\n<tbody>\n");
    for row in &comparison.rows {
        t.push_str(&format!("<tr><td>{}</td>", esc(&row.name)));
        change_cells(&row.energy, &mut t);
        change_cells(&row.time, &mut t);
        t.push_str("</tr>\n");
    }
    t.push_str("</tbody>\n</table>\n");
    t
}
