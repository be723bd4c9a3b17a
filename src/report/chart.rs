//! Inline SVG charts.

use super::html::{esc, fmt_number};
use crate::normalize::NormalizedTest;
use crate::series::Series;

const SVG_W: f64 = 960.0;

const PALETTE: [&str; 8] = [
    "#4C78A8", "#F58518", "#E45756", "#72B7B2", "#54A24B", "#B279A2", "#FF9DA7", "#9D755D",
];

fn empty_chart(message: &str) -> String {
    format!(r#"<p class="chart-empty">{}</p>"#, esc(message))
}

/// Horizontal bar per test, largest consumer on top. Expects `ascending`
/// in ascending energy order.
pub fn bar_chart(ascending: &[NormalizedTest]) -> String {
    const LABEL_W: f64 = 280.0;
    const VALUE_W: f64 = 90.0;
    const BAR_H: f64 = 18.0;
    const GAP: f64 = 6.0;
    const TOP: f64 = 12.0;
    const AXIS_H: f64 = 36.0;

    if ascending.is_empty() {
        return empty_chart("No tests recorded in this run.");
    }

    let max = ascending.iter().map(|t| t.energy_uj).fold(0.0, f64::max);
    let chart_w = SVG_W - LABEL_W - VALUE_W;
    let scale = if max > 0.0 { chart_w / max } else { 0.0 };
    let h = TOP + ascending.len() as f64 * (BAR_H + GAP) + AXIS_H;
    let axis_y = h - AXIS_H + 4.0;

    let mut svg = format!(
        r#"<svg class="chart bar-chart" xmlns="http://www.w3.org/2000/svg" width="{SVG_W}" height="{h:.0}" viewBox="0 0 {SVG_W} {h:.0}" font-family="sans-serif" font-size="11">"#
    );
    svg.push('\n');

    for (i, t) in ascending.iter().rev().enumerate() {
        let y = TOP + i as f64 * (BAR_H + GAP);
        let w = (t.energy_uj * scale).max(0.0);
        let mid = y + BAR_H / 2.0 + 4.0;
        let name = esc(&t.name);
        let value = fmt_number(t.energy_uj);
        svg.push_str(&format!(
            r#"<rect x="{LABEL_W}" y="{y:.1}" width="{w:.1}" height="{BAR_H}" rx="2" fill="{}"><title>{name}: {value} µJ</title></rect>"#,
            PALETTE[0]
        ));
        svg.push_str(&format!(
            r##"<text x="{:.1}" y="{mid:.1}" text-anchor="end" fill="#333">{name}</text>"##,
            LABEL_W - 6.0
        ));
        svg.push_str(&format!(
            r##"<text x="{:.1}" y="{mid:.1}" fill="#555">{value}</text>"##,
            LABEL_W + w + 4.0
        ));
        svg.push('\n');
    }

    svg.push_str(&format!(
        r##"<line x1="{LABEL_W}" y1="{axis_y:.1}" x2="{:.1}" y2="{axis_y:.1}" stroke="#BBB"/>"##,
        LABEL_W + chart_w
    ));
    svg.push_str(&format!(
        r##"<text x="{:.1}" y="{:.1}" text-anchor="middle" fill="#333">Energy consumption (µJ)</text>"##,
        LABEL_W + chart_w / 2.0,
        axis_y + 22.0
    ));
    svg.push_str("</svg>\n");
    svg
}

/// One polyline per test across sequential run positions, with the run
/// labels on the x axis.
pub fn line_chart(series: &Series) -> String {
    const LEFT: f64 = 80.0;
    const LEGEND_W: f64 = 240.0;
    const TOP: f64 = 16.0;
    const PLOT_H: f64 = 320.0;
    const TICK_AREA: f64 = 150.0;
    const Y_TICKS: usize = 5;

    if series.points.is_empty() {
        return empty_chart("No measurements across runs.");
    }

    let lines = series.lines();
    let positions = series.positions().max(1);
    let plot_w = SVG_W - LEFT - LEGEND_W;
    let max = series.points.iter().map(|p| p.energy_uj).fold(0.0, f64::max);
    let y_max = if max > 0.0 { max * 1.1 } else { 1.0 };
    let legend_h = TOP + lines.len() as f64 * 16.0 + 8.0;
    let h = (TOP + PLOT_H + TICK_AREA).max(legend_h);

    let x_of = |pos: usize| -> f64 {
        if positions > 1 {
            LEFT + pos as f64 / (positions - 1) as f64 * plot_w
        } else {
            LEFT + plot_w / 2.0
        }
    };
    let y_of = |v: f64| -> f64 { TOP + PLOT_H - v / y_max * PLOT_H };

    let mut svg = format!(
        r#"<svg class="chart line-chart" xmlns="http://www.w3.org/2000/svg" width="{SVG_W}" height="{h:.0}" viewBox="0 0 {SVG_W} {h:.0}" font-family="sans-serif" font-size="11">"#
    );
    svg.push('\n');

    // y grid
    for k in 0..=Y_TICKS {
        let v = y_max * k as f64 / Y_TICKS as f64;
        let y = y_of(v);
        svg.push_str(&format!(
            r##"<line x1="{LEFT}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#EEE"/><text x="{:.1}" y="{:.1}" text-anchor="end" fill="#888">{}</text>"##,
            LEFT + plot_w,
            LEFT - 6.0,
            y + 4.0,
            fmt_number(v)
        ));
        svg.push('\n');
    }
    svg.push_str(&format!(
        r##"<text transform="translate(16,{:.1}) rotate(-90)" text-anchor="middle" fill="#333">Energy consumption (µJ)</text>"##,
        TOP + PLOT_H / 2.0
    ));

    // x ticks
    let base = TOP + PLOT_H;
    for tick in &series.ticks {
        let x = x_of(tick.position);
        svg.push_str(&format!(
            r##"<line x1="{x:.1}" y1="{base:.1}" x2="{x:.1}" y2="{:.1}" stroke="#BBB"/><text transform="translate({x:.1},{:.1}) rotate(-40)" text-anchor="end" fill="#555">{}</text>"##,
            base + 5.0,
            base + 14.0,
            esc(&tick.label)
        ));
        svg.push('\n');
    }

    for (idx, (name, points)) in lines.iter().enumerate() {
        let colour = PALETTE[idx % PALETTE.len()];
        let name = esc(name);
        let coords: Vec<String> = points
            .iter()
            .map(|(pos, v)| format!("{:.1},{:.1}", x_of(*pos), y_of(*v)))
            .collect();
        svg.push_str(&format!(
            r#"<polyline fill="none" stroke="{colour}" stroke-width="1.6" points="{}"/>"#,
            coords.join(" ")
        ));
        for (pos, v) in points {
            svg.push_str(&format!(
                r#"<circle cx="{:.1}" cy="{:.1}" r="3" fill="{colour}"><title>{name}: {} µJ</title></circle>"#,
                x_of(*pos),
                y_of(*v),
                fmt_number(*v)
            ));
        }

        let ly = TOP + idx as f64 * 16.0;
        let lx = LEFT + plot_w + 16.0;
        svg.push_str(&format!(
            r##"<rect x="{lx:.1}" y="{ly:.1}" width="10" height="10" fill="{colour}"/><text x="{:.1}" y="{:.1}" fill="#333">{name}</text>"##,
            lx + 14.0,
            ly + 9.0
        ));
        svg.push('\n');
    }

    svg.push_str("</svg>\n");
    svg
}
