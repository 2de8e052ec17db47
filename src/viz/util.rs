//! Utility functions for visualization: colors, ranges, locale mapping, tick text, smoothing.

use num_format::{Locale, ToFormattedString};
use plotters::prelude::*;

use super::text::estimate_text_width_px;

/// Parse `#rrggbb` (an optional trailing alpha pair is ignored). Falls back to black.
pub fn hex_to_rgb(hex: &str) -> RGBColor {
    let h = hex.trim().trim_start_matches('#');
    let channel = |i: usize| {
        h.get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    if h.len() < 6 {
        return RGBColor(0, 0, 0);
    }
    RGBColor(channel(0), channel(2), channel(4))
}

/// Value range for one axis with 5% headroom on both sides.
/// Empty input gives `(0, 1)`; a flat series is widened by ±1.
pub fn axis_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (mut lo, mut hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if (hi - lo).abs() < f64::EPSILON {
        lo -= 1.0;
        hi += 1.0;
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// Linear map of `v` from one range onto another.
pub fn remap(v: f64, from: (f64, f64), to: (f64, f64)) -> f64 {
    let span = from.1 - from.0;
    if span.abs() < f64::EPSILON {
        return to.0;
    }
    to.0 + (v - from.0) / span * (to.1 - to.0)
}

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator char.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'), // default
    }
}

/// Tick label text: whole numbers with thousands separators from 1000 up,
/// otherwise 0–2 decimals depending on magnitude.
pub fn format_tick(v: f64, locale: &Locale, dec_sep: char) -> String {
    let a = v.abs();
    if a >= 1000.0 {
        let n = v.round() as i64;
        return n.to_formatted_string(locale);
    }
    let prec = if a >= 100.0 {
        0
    } else if a >= 10.0 {
        1
    } else {
        2
    };
    let s = format!("{:.*}", prec, v);
    if dec_sep == '.' {
        s
    } else {
        s.replace('.', &dec_sep.to_string())
    }
}

/// Widest tick label (in pixels) for `ticks` evenly spaced values over `range`.
pub fn max_tick_label_px(range: (f64, f64), ticks: usize, font_px: u32, fmt: &dyn Fn(f64) -> String) -> u32 {
    let mut max_px = 0u32;
    for i in 0..=ticks {
        let t = if ticks == 0 {
            0.0
        } else {
            i as f64 / ticks as f64
        };
        let v = range.0 + (range.1 - range.0) * t;
        max_px = max_px.max(estimate_text_width_px(&fmt(v), font_px));
    }
    max_px
}

/// Left label area width: tick labels plus room for the rotated axis title.
pub fn compute_left_label_area_px(
    range: (f64, f64),
    ticks: usize,
    font_px: u32,
    fmt: &dyn Fn(f64) -> String,
) -> u32 {
    let with_padding = max_tick_label_px(range, ticks, font_px, fmt).saturating_add(30);
    with_padding.clamp(48, 140)
}

/// Width of one manually drawn right-hand axis column.
pub fn compute_right_column_px(
    range: (f64, f64),
    ticks: usize,
    font_px: u32,
    title: Option<&str>,
    fmt: &dyn Fn(f64) -> String,
) -> u32 {
    let ticks_w = max_tick_label_px(range, ticks, font_px, fmt).saturating_add(14);
    let title_w = title
        .map(|t| estimate_text_width_px(t, font_px) + 8)
        .unwrap_or(0);
    ticks_w.max(title_w).clamp(40, 120)
}

/// Split a nullable sequence into runs of `(index, value)` points; gaps break the line.
pub fn split_segments(data: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut cur: Vec<(f64, f64)> = Vec::new();
    for (i, v) in data.iter().enumerate() {
        match v {
            Some(y) if y.is_finite() => cur.push((i as f64, *y)),
            _ => {
                if !cur.is_empty() {
                    out.push(std::mem::take(&mut cur));
                }
            }
        }
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    out
}

/// Cubic smoothing through every point, with control points computed like a cardinal
/// spline scaled by `tension`. Distances are measured after dividing by `x_span` and
/// `y_span` so both axes weigh equally. Each segment is sampled `steps` times.
///
/// Returns the input unchanged for `tension <= 0` or fewer than three points.
pub fn smooth_segment(
    points: &[(f64, f64)],
    tension: f64,
    x_span: f64,
    y_span: f64,
    steps: usize,
) -> Vec<(f64, f64)> {
    let n = points.len();
    if tension <= 0.0 || n < 3 || steps == 0 {
        return points.to_vec();
    }
    let sx = if x_span.abs() > f64::EPSILON { x_span } else { 1.0 };
    let sy = if y_span.abs() > f64::EPSILON { y_span } else { 1.0 };
    let dist = |a: (f64, f64), b: (f64, f64)| ((a.0 - b.0) / sx).hypot((a.1 - b.1) / sy);

    // (control point before, control point after) for every point
    let controls: Vec<((f64, f64), (f64, f64))> = (0..n)
        .map(|i| {
            let prev = points[i.saturating_sub(1)];
            let cur = points[i];
            let next = points[(i + 1).min(n - 1)];
            let d01 = dist(prev, cur);
            let d12 = dist(cur, next);
            let total = d01 + d12;
            let (s01, s12) = if total > 0.0 {
                (d01 / total, d12 / total)
            } else {
                (0.0, 0.0)
            };
            let fa = tension * s01;
            let fb = tension * s12;
            let dx = next.0 - prev.0;
            let dy = next.1 - prev.1;
            (
                (cur.0 - fa * dx, cur.1 - fa * dy),
                (cur.0 + fb * dx, cur.1 + fb * dy),
            )
        })
        .collect();

    let mut out = Vec::with_capacity(1 + (n - 1) * steps);
    out.push(points[0]);
    for i in 0..n - 1 {
        let p0 = points[i];
        let c1 = controls[i].1;
        let c2 = controls[i + 1].0;
        let p3 = points[i + 1];
        for k in 1..=steps {
            let t = k as f64 / steps as f64;
            let u = 1.0 - t;
            let b0 = u * u * u;
            let b1 = 3.0 * u * u * t;
            let b2 = 3.0 * u * t * t;
            let b3 = t * t * t;
            out.push((
                b0 * p0.0 + b1 * c1.0 + b2 * c2.0 + b3 * p3.0,
                b0 * p0.1 + b1 * c1.1 + b2 * c2.1 + b3 * p3.1,
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing() {
        assert_eq!(hex_to_rgb("#037691"), RGBColor(0x03, 0x76, 0x91));
        assert_eq!(hex_to_rgb("#03769140"), RGBColor(0x03, 0x76, 0x91));
        assert_eq!(hex_to_rgb("nope"), RGBColor(0, 0, 0));
    }

    #[test]
    fn flat_and_empty_ranges_are_widened() {
        let (lo, hi) = axis_range(std::iter::empty::<f64>());
        assert_eq!((lo, hi), (0.0, 1.0));
        let (lo, hi) = axis_range([5.0, 5.0]);
        assert!(lo < 4.0 && hi > 6.0);
        let (lo, hi) = axis_range([1.0, f64::NAN, 3.0]);
        assert!(lo < 1.0 && hi > 3.0);
    }

    #[test]
    fn remap_is_linear() {
        assert_eq!(remap(5.0, (0.0, 10.0), (100.0, 200.0)), 150.0);
        assert_eq!(remap(5.0, (5.0, 5.0), (1.0, 2.0)), 1.0);
    }

    #[test]
    fn ticks_use_locale() {
        let (en_locale, en_sep) = map_locale("en");
        let (de_locale, de_sep) = map_locale("de");
        assert_eq!(format_tick(12345.0, en_locale, en_sep), "12,345");
        assert_eq!(format_tick(12345.0, de_locale, de_sep), "12.345");
        assert_eq!(format_tick(2.5, de_locale, de_sep), "2,50");
        assert_eq!(format_tick(25.0, en_locale, en_sep), "25.0");
    }

    #[test]
    fn segments_break_at_gaps() {
        let segs = split_segments(&[Some(1.0), None, Some(2.0), Some(3.0), None]);
        assert_eq!(segs, vec![vec![(0.0, 1.0)], vec![(2.0, 2.0), (3.0, 3.0)]]);
    }

    #[test]
    fn smoothing_keeps_endpoints_and_knots() {
        let pts = vec![(0.0, 0.0), (1.0, 4.0), (2.0, 1.0), (3.0, 3.0)];
        let out = smooth_segment(&pts, 0.2, 3.0, 4.0, 6);
        assert_eq!(out.len(), 1 + 3 * 6);
        assert_eq!(out[0], pts[0]);
        // every 6th sample lands on an input point
        for (i, p) in pts.iter().enumerate() {
            let q = out[i * 6];
            assert!((q.0 - p.0).abs() < 1e-9 && (q.1 - p.1).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_tension_is_identity() {
        let pts = vec![(0.0, 0.0), (1.0, 4.0), (2.0, 1.0)];
        assert_eq!(smooth_segment(&pts, 0.0, 2.0, 4.0, 6), pts);
    }
}
