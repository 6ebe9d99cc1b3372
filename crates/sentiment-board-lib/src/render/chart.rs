//! Inline SVG pie chart for the sidebar.
//!
//! Two wedges (Positive, Negative) in fixed colours, starting at 12 o'clock and
//! running counter-clockwise. Each wedge is labelled with its name just outside
//! the rim and its share of the pie (one decimal) at 60% of the radius, even
//! when the wedge itself is empty. Shares
//! are relative to positive + negative, so records with other labels do not
//! appear in the chart at all.

use std::f64::consts::PI;
use std::fmt::Write as _;

use crate::stats::SentimentSummary;

pub const POSITIVE_COLOR: &str = "#2ecc71";
pub const NEGATIVE_COLOR: &str = "#e74c3c";

const WIDTH: f64 = 320.0;
const HEIGHT: f64 = 240.0;
const CX: f64 = 160.0;
const CY: f64 = 120.0;
const RADIUS: f64 = 90.0;
const START_DEGREES: f64 = 90.0;
const LABEL_DISTANCE: f64 = 1.1;
const PCT_DISTANCE: f64 = 0.6;

/// Point on the circle at `degrees` (maths convention) and `scale * RADIUS`.
fn polar(degrees: f64, scale: f64) -> (f64, f64) {
    let rad = degrees * PI / 180.0;
    (
        CX + RADIUS * scale * rad.cos(),
        CY - RADIUS * scale * rad.sin(),
    )
}

/// Render the chart, or `None` when there are no comments at all.
pub fn pie_chart_svg(summary: &SentimentSummary) -> Option<String> {
    if summary.total == 0 {
        return None;
    }

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg class="pie-chart" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="Comments distribution">"#
    );

    let wedges = [
        ("Positive", summary.positive, POSITIVE_COLOR),
        ("Negative", summary.negative, NEGATIVE_COLOR),
    ];
    let sum: usize = wedges.iter().map(|(_, n, _)| n).sum();
    if sum == 0 {
        // Only unrecognised labels: nothing to apportion.
        let _ = write!(
            svg,
            r##"<circle cx="{CX}" cy="{CY}" r="{RADIUS}" fill="none" stroke="#cccccc"/>"##
        );
        svg.push_str("</svg>");
        return Some(svg);
    }

    let mut angle = START_DEGREES;
    for (name, count, color) in wedges {
        // An empty wedge draws no shape but keeps its name and 0.0% label.
        let fraction = count as f64 / sum as f64;
        let sweep = fraction * 360.0;
        let end = angle + sweep;

        if count == sum {
            let _ = write!(
                svg,
                r#"<circle class="wedge" cx="{CX}" cy="{CY}" r="{RADIUS}" fill="{color}"/>"#
            );
        } else if count > 0 {
            let (x1, y1) = polar(angle, 1.0);
            let (x2, y2) = polar(end, 1.0);
            let large_arc = u8::from(sweep > 180.0);
            // sweep-flag 0: counter-clockwise on screen.
            let _ = write!(
                svg,
                r#"<path class="wedge" d="M {CX:.2} {CY:.2} L {x1:.2} {y1:.2} A {RADIUS:.2} {RADIUS:.2} 0 {large_arc} 0 {x2:.2} {y2:.2} Z" fill="{color}"/>"#
            );
        }

        let mid = angle + sweep / 2.0;
        let (lx, ly) = polar(mid, LABEL_DISTANCE);
        let anchor = if mid.to_radians().cos() >= 0.0 { "start" } else { "end" };
        let _ = write!(
            svg,
            r#"<text x="{lx:.2}" y="{ly:.2}" text-anchor="{anchor}" dominant-baseline="middle" font-size="13">{name}</text>"#
        );
        let (px, py) = polar(mid, PCT_DISTANCE);
        let _ = write!(
            svg,
            r#"<text x="{px:.2}" y="{py:.2}" text-anchor="middle" dominant-baseline="middle" font-size="12">{:.1}%</text>"#,
            fraction * 100.0
        );

        angle = end;
    }

    svg.push_str("</svg>");
    Some(svg)
}
