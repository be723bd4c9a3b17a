//! The bundled HTML template.

use super::{ContextValue, Renderer, ReportContext, TEMPLATE_ID};
use crate::error::{ReportError, Result};

pub(crate) fn esc(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub(crate) fn fmt_number(v: f64) -> String {
    let a = v.abs();
    if a >= 100.0 || a == 0.0 {
        format!("{v:.0}")
    } else if a >= 1.0 {
        format!("{v:.2}")
    } else {
        format!("{v:.3}")
    }
}

fn value_html(v: &ContextValue) -> String {
    match v {
        ContextValue::Number(n) => fmt_number(*n),
        ContextValue::Count(n) => n.to_string(),
        ContextValue::Text(s) => esc(s),
        ContextValue::Markup(m) => m.clone(),
        ContextValue::Flag(b) => b.to_string(),
        ContextValue::List(items) => items.iter().map(value_html).collect::<Vec<_>>().join(", "),
    }
}

const STYLE: &str = r#"
body{margin:0 auto;max-width:1000px;padding:24px;background:whitesmoke;font-family:sans-serif;color:#222}
h1{font-weight:300}
h2{margin-top:32px}
.summary td{padding:2px 12px 2px 0}
ol.ranking li{display:flex;justify-content:space-between;max-width:600px;padding:4px 0;border-bottom:1px solid #ddd}
.badge{border-radius:10px;padding:0 8px;color:white}
.badge.high{background:#c0392b}
.badge.low{background:#27ae60}
table.comparison{border-collapse:collapse;font-size:13px}
table.comparison th,table.comparison td{border:1px solid #ccc;padding:4px 8px;text-align:left}
table.comparison td.num{text-align:right}
td.worse{color:#c0392b}
td.better{color:#27ae60}
.omitted{color:#777;font-size:13px}
.chart{background:white;border:1px solid #ddd}
"#;

/// Renders the `energy-report` template.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    fn field(&self, ctx: &ReportContext, key: &str) -> String {
        ctx.get(key).map(value_html).unwrap_or_default()
    }

    fn summary(&self, ctx: &ReportContext, h: &mut String) {
        h.push_str("<h2>Summary</h2>\n<table class=\"summary\">\n");
        let rows = [
            ("Snapshot", "snapshot_file", ""),
            ("Tests", "number_of_tests", ""),
            ("Repeats", "number_of_repeats", ""),
            ("Energy per iteration", "total_energy", " µJ"),
            ("Time per iteration", "total_time", " µs"),
            ("Runner overhead energy", "overhead_energy", " µJ"),
            ("Runner overhead time", "overhead_time", " µs"),
        ];
        for (label, key, unit) in rows {
            if ctx.get(key).is_some() {
                h.push_str(&format!(
                    "<tr><td>{label}</td><td>{}{unit}</td></tr>\n",
                    self.field(ctx, key)
                ));
            }
        }
        h.push_str("</table>\n");
    }

    fn ranking_list(
        &self,
        ctx: &ReportContext,
        names: &str,
        usages: &str,
        class: &str,
        h: &mut String,
    ) {
        h.push_str("<ol class=\"ranking\">\n");
        for (name, usage) in ctx.list(names).iter().zip(ctx.list(usages)) {
            h.push_str(&format!(
                "<li><span>{}</span><span class=\"badge {class}\">{} µJ</span></li>\n",
                value_html(name),
                value_html(usage)
            ));
        }
        h.push_str("</ol>\n");
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, template: &str, ctx: &ReportContext) -> Result<String> {
        if template != TEMPLATE_ID {
            return Err(ReportError::UnknownTemplate(template.to_string()));
        }

        let title = self.field(ctx, "title");
        let mut h = String::new();
        h.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        h.push_str(&format!("<title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n"));
        h.push_str(&format!("<h1>{title}</h1>\n"));

        self.summary(ctx, &mut h);

        if ctx.flag("show_ranking") {
            let n = self.field(ctx, "amount_top");
            h.push_str(&format!("<h2>{n} most energy consuming tests</h2>\n"));
            self.ranking_list(
                ctx,
                "most_energy_consuming_names",
                "most_energy_consuming_usages",
                "high",
                &mut h,
            );
            h.push_str(&format!("<h2>{n} least energy consuming tests</h2>\n"));
            self.ranking_list(
                ctx,
                "least_energy_consuming_names",
                "least_energy_consuming_usages",
                "low",
                &mut h,
            );
        }

        if ctx.flag("over_time") {
            h.push_str("<h2>Energy consumption over time</h2>\n");
            h.push_str(&self.field(ctx, "plot_energy_over_time"));
        }

        if ctx.flag("compare_to_last") {
            h.push_str("<h2>Comparison with previous run</h2>\n");
            h.push_str(&format!(
                "<p>Compared with <code>{}</code>, the total energy consumption per iteration changed by {} µJ. The change per test is listed below.</p>\n",
                self.field(ctx, "previous_snapshot_file"),
                self.field(ctx, "overall_change")
            ));
            h.push_str(&self.field(ctx, "comparison_table"));
        }

        let omitted = ctx.list("omitted_sections");
        if !omitted.is_empty() {
            h.push_str("<ul class=\"omitted\">\n");
            for reason in omitted {
                h.push_str(&format!("<li>Section omitted: {}</li>\n", value_html(reason)));
            }
            h.push_str("</ul>\n");
        }

        h.push_str("<h2>All tests energy consumption</h2>\n");
        h.push_str(&self.field(ctx, "all_tests_plot"));
        h.push_str("</body>\n</html>\n");
        Ok(h)
    }
}
