//! Legend layout and drawing for the horizontal band above (or below) the plot.

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::text::{estimate_text_width_px, truncate_to_width};
use crate::error::ChartError;

// Layout constants shared by the estimator and the drawing code.
const FONT_PX: u32 = 13;
const LINE_H: i32 = FONT_PX as i32 + 4;
const ROW_GAP: i32 = 4;
const PAD_BAND: i32 = 8;
const BOX_W: i32 = 28;
const BOX_H: i32 = 10;
const BOX_TO_TEXT: i32 = 8;
const ITEM_GAP: i32 = 16;

fn item_width(label: &str, max_text_px: u32) -> i32 {
    let text = truncate_to_width(label, FONT_PX, max_text_px);
    BOX_W + BOX_TO_TEXT + estimate_text_width_px(&text, FONT_PX) as i32
}

/// Greedy row packing; returns item indices per row.
fn pack_rows(labels: &[String], total_w: i32) -> Vec<Vec<usize>> {
    let usable = (total_w - 2 * PAD_BAND).max(60);
    let max_text = (usable - BOX_W - BOX_TO_TEXT).max(40) as u32;
    let mut rows: Vec<Vec<usize>> = Vec::new();
    let mut cur: Vec<usize> = Vec::new();
    let mut x = 0;
    for (i, label) in labels.iter().enumerate() {
        let w = item_width(label, max_text);
        let needed = if cur.is_empty() { w } else { x + ITEM_GAP + w };
        if needed > usable && !cur.is_empty() {
            rows.push(std::mem::take(&mut cur));
            x = w;
        } else {
            x = needed;
        }
        cur.push(i);
    }
    if !cur.is_empty() {
        rows.push(cur);
    }
    rows
}

/// How tall the legend band must be to fit all items. Returns pixels.
pub fn estimate_legend_height_px(labels: &[String], total_w: i32) -> i32 {
    let rows = pack_rows(labels, total_w).len().max(1) as i32;
    PAD_BAND * 2 + rows * LINE_H + (rows - 1) * ROW_GAP
}

/// Draw centered legend rows: a filled color box followed by the series label.
pub fn draw_legend_band<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    items: &[(String, RGBColor)],
) -> Result<(), ChartError> {
    let (w_u32, _) = area.dim_in_pixel();
    let w = w_u32 as i32;
    let labels: Vec<String> = items.iter().map(|(l, _)| l.clone()).collect();
    let usable = (w - 2 * PAD_BAND).max(60);
    let max_text = (usable - BOX_W - BOX_TO_TEXT).max(40) as u32;

    let label_style: TextStyle =
        TextStyle::from((FontFamily::SansSerif, FONT_PX)).pos(Pos::new(HPos::Left, VPos::Center));

    let mut y_center = PAD_BAND + LINE_H / 2;
    for row in pack_rows(&labels, w) {
        let row_w: i32 = row
            .iter()
            .map(|&i| item_width(&labels[i], max_text))
            .sum::<i32>()
            + ITEM_GAP * (row.len() as i32 - 1);
        let mut x = ((w - row_w) / 2).max(PAD_BAND);

        for i in row {
            let (label, color) = &items[i];
            area.draw(&Rectangle::new(
                [(x, y_center - BOX_H / 2), (x + BOX_W, y_center + BOX_H / 2)],
                color.mix(0.25).filled(),
            ))
            .map_err(|e| ChartError::Draw(format!("{e:?}")))?;
            area.draw(&Rectangle::new(
                [(x, y_center - BOX_H / 2), (x + BOX_W, y_center + BOX_H / 2)],
                color.stroke_width(2),
            ))
            .map_err(|e| ChartError::Draw(format!("{e:?}")))?;

            let text = truncate_to_width(label, FONT_PX, max_text);
            area.draw(&Text::new(
                text,
                (x + BOX_W + BOX_TO_TEXT, y_center),
                label_style.clone(),
            ))
            .map_err(|e| ChartError::Draw(format!("{e:?}")))?;

            x += item_width(label, max_text) + ITEM_GAP;
        }
        y_center += LINE_H + ROW_GAP;
    }
    Ok(())
}
