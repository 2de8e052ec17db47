//! Visualization: render grouped weather series to **SVG**, **PNG** or an in-memory RGB buffer.
//!
//! - One y-scale per unit: the first on the left with grid lines, every other one in its
//!   own column on the right
//! - Smoothed lines (no point markers), gaps where the source had no value
//! - Legend band on top, optional title
//! - A [`ChartSurface`] owns at most one live [`ChartHandle`]; rendering again releases
//!   the previous one first

pub mod legend;
pub mod text;
pub mod types;
pub mod util;

pub use types::{
    BACKGROUND_ALPHA_SUFFIX, ChartConfig, ChartKind, DEFAULT_TENSION, DatasetConfig,
    LegendConfig, LegendPosition, ScaleConfig,
};

use crate::error::ChartError;
use crate::models::{Axis, AxisPosition, Series};
use log::debug;

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::LineSeries;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::{Path, PathBuf};
use std::sync::Once;

use legend::{draw_legend_band, estimate_legend_height_px};
use util::{
    axis_range, compute_left_label_area_px, compute_right_column_px, format_tick, hex_to_rgb,
    map_locale, remap, smooth_segment, split_segments,
};

/// Default canvas size in pixels.
pub const DEFAULT_WIDTH: u32 = 1000;
pub const DEFAULT_HEIGHT: u32 = 480;

/// Samples per segment when smoothing.
const SMOOTH_STEPS: usize = 8;

/// One-time registration for a fallback "sans-serif" font when using the `ab_glyph` text path.
/// Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    // Safe to call many times; only runs once.
    INIT_FONTS.call_once(|| {
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
    });
}

fn draw_err<E: std::fmt::Debug>(e: E) -> ChartError {
    ChartError::Draw(format!("{e:?}"))
}

/// Where a surface draws to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mount {
    /// SVG when the extension is `svg`, PNG otherwise. The parent directory must exist.
    File(PathBuf),
    /// Raw RGB pixels kept on the handle (e.g. for a GUI texture).
    Memory,
}

/// Pixels of an in-memory render, 3 bytes per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// A live chart instance on a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartHandle {
    id: u64,
    config: ChartConfig,
    path: Option<PathBuf>,
    image: Option<RenderedImage>,
}

impl ChartHandle {
    /// Sequential per surface, starting at 1.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn image(&self) -> Option<&RenderedImage> {
        self.image.as_ref()
    }
}

/// The single graphic surface of one widget mount point.
#[derive(Debug)]
pub struct ChartSurface {
    mount: Mount,
    width: u32,
    height: u32,
    locale: String,
    handle: Option<ChartHandle>,
    rendered: u64,
}

impl ChartSurface {
    pub fn new(mount: Mount, width: u32, height: u32) -> Self {
        Self {
            mount,
            width,
            height,
            locale: "en".into(),
            handle: None,
            rendered: 0,
        }
    }

    pub fn memory(width: u32, height: u32) -> Self {
        Self::new(Mount::Memory, width, height)
    }

    pub fn file(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self::new(Mount::File(path.into()), width, height)
    }

    /// Locale tag for tick labels (`en`, `de`, …).
    pub fn with_locale(mut self, tag: &str) -> Self {
        self.locale = tag.to_string();
        self
    }

    pub fn mount(&self) -> &Mount {
        &self.mount
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn handle(&self) -> Option<&ChartHandle> {
        self.handle.as_ref()
    }

    /// How many charts this surface has drawn so far.
    pub fn render_count(&self) -> u64 {
        self.rendered
    }

    /// Take the live chart off the surface, if any.
    pub fn release(&mut self) -> Option<ChartHandle> {
        let prev = self.handle.take();
        if let Some(h) = &prev {
            debug!("released chart #{}", h.id);
        }
        prev
    }

    fn check_mount(&self) -> Result<(), ChartError> {
        if let Mount::File(path) = &self.mount {
            let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
            if let Some(dir) = parent
                && !dir.is_dir()
            {
                return Err(ChartError::ContainerNotFound(dir.to_path_buf()));
            }
        }
        Ok(())
    }
}

/// Translate grouped series into a declarative chart description.
///
/// Line chart, not stacked, no point markers, light smoothing, legend on top. The title is
/// kept only when it has visible text. Grid lines belong to the first scale only.
pub fn build_chart_config(
    labels: &[String],
    series: &[Series],
    axes: &[Axis],
    title: Option<&str>,
) -> ChartConfig {
    let datasets = series
        .iter()
        .map(|s| DatasetConfig {
            label: s.name.clone(),
            data: s.values.clone(),
            y_axis_id: s.axis_id.clone(),
            border_color: s.color.clone(),
            background_color: format!("{}{}", s.color, BACKGROUND_ALPHA_SUFFIX),
            tension: DEFAULT_TENSION,
            point_radius: 0,
            fill: false,
        })
        .collect();

    let scales = axes
        .iter()
        .map(|a| ScaleConfig {
            id: a.id.clone(),
            position: a.position,
            draw_grid: a.is_first,
            title: (!a.unit.is_empty()).then(|| a.unit.clone()),
        })
        .collect();

    ChartConfig {
        kind: ChartKind::Line,
        stacked: false,
        labels: labels.to_vec(),
        datasets,
        scales,
        title: title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
        legend: LegendConfig {
            display: true,
            position: LegendPosition::Top,
        },
    }
}

/// Draw a chart onto `surface`, replacing whatever it showed before.
///
/// Fails with [`ChartError::ContainerNotFound`] when a file mount's directory is missing;
/// in that case the previous chart stays in place.
pub fn render<'s>(
    surface: &'s mut ChartSurface,
    labels: &[String],
    series: &[Series],
    axes: &[Axis],
    title: Option<&str>,
) -> Result<&'s ChartHandle, ChartError> {
    surface.check_mount()?;
    surface.release();

    let config = build_chart_config(labels, series, axes, title);
    let (w, h) = surface.size();
    let (path, image) = match &surface.mount {
        Mount::File(p) => {
            export(&config, p, w, h, &surface.locale)?;
            (Some(p.clone()), None)
        }
        Mount::Memory => (None, Some(draw_to_buffer(&config, w, h, &surface.locale)?)),
    };

    surface.rendered += 1;
    debug!(
        "rendered chart #{} ({} series, {} axes)",
        surface.rendered,
        config.datasets.len(),
        config.scales.len()
    );
    Ok(surface.handle.insert(ChartHandle {
        id: surface.rendered,
        config,
        path,
        image,
    }))
}

/// Draw an existing chart description to a file (SVG by extension, PNG otherwise).
pub fn export<P: AsRef<Path>>(
    config: &ChartConfig,
    out_path: P,
    width: u32,
    height: u32,
    locale_tag: &str,
) -> Result<(), ChartError> {
    ensure_fonts_registered();
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_config(root, config, locale_tag)
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_config(root, config, locale_tag)
    }
}

/// Draw a chart description into a fresh RGB buffer.
pub fn draw_to_buffer(
    config: &ChartConfig,
    width: u32,
    height: u32,
    locale_tag: &str,
) -> Result<RenderedImage, ChartError> {
    ensure_fonts_registered();
    let mut rgb = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut rgb, (width, height)).into_drawing_area();
        draw_config(root, config, locale_tag)?;
    }
    Ok(RenderedImage { width, height, rgb })
}

/// Helper that draws to any Plotters backend.
fn draw_config<DB>(
    root: DrawingArea<DB, Shift>,
    config: &ChartConfig,
    locale_tag: &str,
) -> Result<(), ChartError>
where
    DB: DrawingBackend,
{
    const MARGIN: u32 = 16;
    const FONT_PX: u32 = 12;
    const Y_TICKS: usize = 8;

    root.fill(&WHITE).map_err(draw_err)?;

    // Title first, then the legend band, the rest is the plot.
    let root = match config.title.as_deref() {
        Some(t) => root
            .titled(t, (FontFamily::SansSerif, 20))
            .map_err(draw_err)?,
        None => root,
    };

    let legend_items: Vec<(String, RGBColor)> = config
        .datasets
        .iter()
        .map(|d| (d.label.clone(), hex_to_rgb(&d.border_color)))
        .collect();
    let (root_w, _) = root.dim_in_pixel();
    let (plot_area, legend_area) = if config.legend.display && !legend_items.is_empty() {
        let labels: Vec<String> = legend_items.iter().map(|(l, _)| l.clone()).collect();
        let h = estimate_legend_height_px(&labels, root_w as i32);
        let (legend, plot) = match config.legend.position {
            LegendPosition::Top => root.split_vertically(h),
        };
        (plot, Some(legend))
    } else {
        (root, None)
    };

    // Value range per scale; datasets pointing at an unknown scale use the first one.
    let scale_index = |id: &str| {
        config
            .scales
            .iter()
            .position(|s| s.id == id)
            .unwrap_or(0)
    };
    let ranges: Vec<(f64, f64)> = (0..config.scales.len().max(1))
        .map(|idx| {
            axis_range(
                config
                    .datasets
                    .iter()
                    .filter(|d| scale_index(&d.y_axis_id) == idx)
                    .flat_map(|d| d.data.iter().flatten().copied()),
            )
        })
        .collect();
    let primary = ranges[0];

    let (num_locale, dec_sep) = map_locale(locale_tag);
    let tick = |v: f64| format_tick(v, num_locale, dec_sep);

    let left_w = compute_left_label_area_px(primary, Y_TICKS, FONT_PX, &tick);
    let right_scales: Vec<(usize, &ScaleConfig)> = config
        .scales
        .iter()
        .enumerate()
        .filter(|(i, s)| *i > 0 && s.position == AxisPosition::Right)
        .collect();
    let right_cols: Vec<u32> = right_scales
        .iter()
        .map(|(i, s)| compute_right_column_px(ranges[*i], Y_TICKS, FONT_PX, s.title.as_deref(), &tick))
        .collect();
    let right_w: u32 = right_cols.iter().sum();

    let n = config.labels.len();
    let x_max = n.saturating_sub(1).max(1) as f64;

    let mut chart = ChartBuilder::on(&plot_area)
        .margin(MARGIN)
        .set_label_area_size(LabelAreaPosition::Left, left_w)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .set_label_area_size(LabelAreaPosition::Right, right_w)
        .build_cartesian_2d(0f64..x_max, primary.0..primary.1)
        .map_err(draw_err)?;

    // Category labels only at whole indices.
    let x_label_fmt = |x: &f64| {
        let i = x.round();
        if (x - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        config.labels.get(i as usize).cloned().unwrap_or_default()
    };
    let y_label_fmt = |v: &f64| tick(*v);

    let first = config.scales.first();
    let mut mesh = chart.configure_mesh();
    mesh.x_labels(n.clamp(2, 10))
        .y_labels(Y_TICKS)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, FONT_PX))
        .axis_desc_style((FontFamily::SansSerif, 14));
    if let Some(t) = first.and_then(|s| s.title.clone()) {
        mesh.y_desc(t);
    }
    if !first.map(|s| s.draw_grid).unwrap_or(true) {
        mesh.disable_mesh();
    }
    mesh.draw().map_err(draw_err)?;

    // Series: every value is mapped onto the primary scale for plotting.
    for ds in &config.datasets {
        let range = ranges[scale_index(&ds.y_axis_id).min(ranges.len() - 1)];
        let style = hex_to_rgb(&ds.border_color).stroke_width(2);
        for seg in split_segments(&ds.data) {
            let mapped: Vec<(f64, f64)> = seg
                .into_iter()
                .map(|(x, y)| (x, remap(y, range, primary)))
                .collect();
            let smooth: Vec<(f64, f64)> = smooth_segment(
                &mapped,
                ds.tension,
                x_max,
                primary.1 - primary.0,
                SMOOTH_STEPS,
            )
            .into_iter()
            .map(|(x, y)| (x, y.clamp(primary.0, primary.1)))
            .collect();
            chart
                .draw_series(LineSeries::new(smooth, style))
                .map_err(draw_err)?;
        }
    }

    // Right-hand scales, one column each.
    let (x_px, y_px) = chart.plotting_area().get_pixel_range();
    let (base_x, base_y) = plot_area.get_base_pixel();
    let top = y_px.start - base_y;
    let bottom = y_px.end - base_y;
    let mut col_x = x_px.end - base_x;
    for ((idx, scale), col_w) in right_scales.iter().zip(&right_cols) {
        draw_right_axis(
            &plot_area,
            col_x,
            top,
            bottom,
            ranges[*idx],
            scale.title.as_deref(),
            &tick,
            Y_TICKS,
        )?;
        col_x += *col_w as i32;
    }

    if let Some(ref area) = legend_area {
        draw_legend_band(area, &legend_items)?;
    }

    plot_area.present().map_err(draw_err)?;
    if let Some(ref area) = legend_area {
        area.present().map_err(draw_err)?;
    }
    Ok(())
}

/// Vertical axis line with ticks and labels at pixel column `x`; the unit sits on top.
#[allow(clippy::too_many_arguments)]
fn draw_right_axis<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    x: i32,
    top: i32,
    bottom: i32,
    range: (f64, f64),
    title: Option<&str>,
    fmt: &dyn Fn(f64) -> String,
    ticks: usize,
) -> Result<(), ChartError> {
    let axis_style = BLACK.stroke_width(1);
    let label_style: TextStyle =
        TextStyle::from((FontFamily::SansSerif, 12)).pos(Pos::new(HPos::Left, VPos::Center));

    area.draw(&PathElement::new(vec![(x, top), (x, bottom)], axis_style))
        .map_err(draw_err)?;
    for i in 0..=ticks {
        let t = i as f64 / ticks.max(1) as f64;
        let v = range.0 + (range.1 - range.0) * t;
        let y = bottom - ((bottom - top) as f64 * t).round() as i32;
        area.draw(&PathElement::new(vec![(x, y), (x + 5, y)], axis_style))
            .map_err(draw_err)?;
        area.draw(&Text::new(fmt(v), (x + 8, y), label_style.clone()))
            .map_err(draw_err)?;
    }
    if let Some(t) = title {
        let title_style: TextStyle =
            TextStyle::from((FontFamily::SansSerif, 12)).pos(Pos::new(HPos::Left, VPos::Bottom));
        area.draw(&Text::new(t.to_string(), (x + 2, top - 3), title_style))
            .map_err(draw_err)?;
    }
    Ok(())
}
