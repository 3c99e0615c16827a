//! PNG rendering of heatmaps and replicator dynamics.
//!
//! Shapes are drawn strictly; text (captions, tick labels, annotations) is
//! drawn best-effort so a host without usable system fonts still gets the
//! images, only without lettering.

use std::error::Error;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::error::{ReportError, Result};
use crate::matrix::LabeledMatrix;

type DrawResult<T> = std::result::Result<T, Box<dyn Error>>;

/// Viridis sampled at nine evenly spaced stops.
const VIRIDIS: [(u8, u8, u8); 9] = [
    (68, 1, 84),
    (71, 44, 122),
    (59, 81, 139),
    (44, 113, 142),
    (33, 144, 141),
    (39, 173, 129),
    (92, 200, 99),
    (170, 220, 50),
    (253, 231, 37),
];

const GRID_LINE: RGBColor = RGBColor(211, 211, 211);

/// Colour scale of a heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScale {
    /// Dark purple for low values, yellow for high.
    Viridis,
    /// Yellow for low values, dark purple for high.
    ViridisReversed,
}

impl ColorScale {
    /// Colour for `t` in `[0, 1]` (clamped).
    pub fn color(self, t: f64) -> RGBColor {
        let t = match self {
            ColorScale::Viridis => t,
            ColorScale::ViridisReversed => 1.0 - t,
        }
        .clamp(0.0, 1.0);

        let scaled = t * (VIRIDIS.len() - 1) as f64;
        let lower = scaled.floor() as usize;
        let upper = (lower + 1).min(VIRIDIS.len() - 1);
        let frac = scaled - lower as f64;
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;

        let (r0, g0, b0) = VIRIDIS[lower];
        let (r1, g1, b1) = VIRIDIS[upper];
        RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
    }
}

/// Annotation colour readable on top of `background`.
fn contrast_text(background: RGBColor) -> RGBColor {
    let RGBColor(r, g, b) = background;
    let luminance = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
    if luminance > 140.0 {
        BLACK
    } else {
        WHITE
    }
}

/// Labels and appearance of one heatmap.
#[derive(Debug, Clone)]
pub struct HeatmapStyle {
    /// Caption above the grid.
    pub title: String,
    /// X axis description.
    pub x_desc: String,
    /// Y axis description.
    pub y_desc: String,
    /// Cell colouring.
    pub scale: ColorScale,
    /// Image size in pixels.
    pub size: (u32, u32),
}

impl HeatmapStyle {
    /// Size in pixels for a grid of `cols` x `rows` cells.
    ///
    /// `per_col` and `per_row` are in hundreds of pixels per cell; the
    /// result is at least 1000x800.
    pub fn size_for(cols: usize, rows: usize, per_col: f64, per_row: f64) -> (u32, u32) {
        let width = (cols as f64 * per_col).max(10.0) * 100.0;
        let height = (rows as f64 * per_row).max(8.0) * 100.0;
        (width as u32, height as u32)
    }
}

/// Render `matrix` as an annotated heatmap, first row at the top.
///
/// NaN cells are left blank.
pub fn render_heatmap(path: &Path, matrix: &LabeledMatrix, style: &HeatmapStyle) -> Result<()> {
    draw_heatmap(path, matrix, style)
        .map_err(|e| ReportError::Plot(format!("{}: {}", path.display(), e)))
}

fn draw_heatmap(path: &Path, matrix: &LabeledMatrix, style: &HeatmapStyle) -> DrawResult<()> {
    let rows = matrix.rows();
    let cols = matrix.cols();
    let root = BitMapBackend::new(path, style.size).into_drawing_area();
    root.fill(&WHITE)?;

    let bottom = label_area(&matrix.col_labels);
    let left = label_area(&matrix.row_labels);

    let chart = ChartBuilder::on(&root)
        .margin(40)
        .x_label_area_size(bottom)
        .y_label_area_size(left)
        .build_cartesian_2d(0f64..cols.max(1) as f64, 0f64..rows.max(1) as f64)?;

    let (lo, hi) = matrix.finite_range().unwrap_or((0.0, 1.0));
    let normalize = |v: f64| if hi - lo > f64::EPSILON { (v - lo) / (hi - lo) } else { 0.5 };

    // Row r is drawn at y = rows - 1 - r so the first row sits at the top.
    let cells: Vec<(f64, f64, f64)> = (0..rows)
        .flat_map(|r| (0..cols).map(move |c| (r, c)))
        .map(|(r, c)| (c as f64, (rows - 1 - r) as f64, matrix.get(r, c)))
        .filter(|(_, _, v)| !v.is_nan())
        .collect();

    for &(x, y, v) in &cells {
        let color = style.scale.color(normalize(v));
        chart.plotting_area().draw(&Rectangle::new(
            [(x, y), (x + 1.0, y + 1.0)],
            color.filled(),
        ))?;
        chart.plotting_area().draw(&Rectangle::new(
            [(x, y), (x + 1.0, y + 1.0)],
            GRID_LINE.stroke_width(1),
        ))?;
    }

    let mut lettering = Lettering::default();
    let font_size = annotation_font_size(rows.max(cols));
    for &(x, y, v) in &cells {
        let text_color = contrast_text(style.scale.color(normalize(v)));
        let text_style = TextStyle::from(("sans-serif", font_size).into_font())
            .pos(Pos::new(HPos::Center, VPos::Center))
            .color(&text_color);
        lettering.record(chart.plotting_area().draw(&Text::new(
            format!("{:.1}", v),
            (x + 0.5, y + 0.5),
            text_style,
        )));
    }

    // Tick labels, drawn in pixel space next to the plotting area.
    let tick_style = ("sans-serif", 14).into_font();
    for (c, label) in matrix.col_labels.iter().enumerate() {
        let (px, py) = chart.backend_coord(&(c as f64 + 0.5, 0.0));
        let style = TextStyle::from(tick_style.clone().transform(FontTransform::Rotate90))
            .pos(Pos::new(HPos::Left, VPos::Center));
        lettering.record(root.draw(&Text::new(label.clone(), (px, py + 8), style)));
    }
    for (r, label) in matrix.row_labels.iter().enumerate() {
        let y = (rows - 1 - r) as f64 + 0.5;
        let (px, py) = chart.backend_coord(&(0.0, y));
        let style = TextStyle::from(tick_style.clone()).pos(Pos::new(HPos::Right, VPos::Center));
        lettering.record(root.draw(&Text::new(label.clone(), (px - 8, py), style)));
    }

    draw_frame_text(&root, &style.title, &style.x_desc, &style.y_desc, &mut lettering);
    lettering.report(path);

    root.present()?;
    Ok(())
}

/// Render a population-share trajectory, one line per strategy.
///
/// The x axis is the sample index ("Generation").
pub fn render_dynamics(
    path: &Path,
    strategies: &[String],
    trajectory: &[Vec<f64>],
    title: &str,
) -> Result<()> {
    draw_dynamics(path, strategies, trajectory, title)
        .map_err(|e| ReportError::Plot(format!("{}: {}", path.display(), e)))
}

fn draw_dynamics(
    path: &Path,
    strategies: &[String],
    trajectory: &[Vec<f64>],
    title: &str,
) -> DrawResult<()> {
    let root = BitMapBackend::new(path, (1800, 1200)).into_drawing_area();
    root.fill(&WHITE)?;

    let generations = trajectory.len().max(2) as f64;
    let mut chart = ChartBuilder::on(&root)
        .margin(40)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(0f64..generations, 0f64..1.05f64)?;

    let mut lettering = Lettering::default();
    lettering.record(
        chart
            .configure_mesh()
            .bold_line_style(BLACK.mix(0.15))
            .x_desc("Generation")
            .y_desc("Population Share")
            .label_style(("sans-serif", 18))
            .draw(),
    );

    let count = strategies.len().max(1);
    for (i, strategy) in strategies.iter().enumerate() {
        let color = HSLColor(i as f64 / count as f64, 0.65, 0.5).to_rgba();
        let points = trajectory
            .iter()
            .enumerate()
            .map(|(g, shares)| (g as f64, shares.get(i).copied().unwrap_or(0.0)));
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(3)))?
            .label(strategy.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], color.stroke_width(3)));
    }

    lettering.record(
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .label_font(("sans-serif", 18))
            .draw(),
    );

    draw_frame_text(&root, title, "", "", &mut lettering);
    lettering.report(path);

    root.present()?;
    Ok(())
}

/// Caption and axis descriptions placed directly on the root area.
fn draw_frame_text(
    root: &DrawingArea<BitMapBackend, Shift>,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    lettering: &mut Lettering,
) {
    let (width, height) = root.dim_in_pixel();
    let (width, height) = (width as i32, height as i32);

    let caption = TextStyle::from(("sans-serif", 26).into_font()).pos(Pos::new(HPos::Center, VPos::Top));
    lettering.record(root.draw(&Text::new(title.to_string(), (width / 2, 8), caption)));

    if !x_desc.is_empty() {
        let style = TextStyle::from(("sans-serif", 18).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
        lettering.record(root.draw(&Text::new(x_desc.to_string(), (width / 2, height - 6), style)));
    }
    if !y_desc.is_empty() {
        let style = TextStyle::from(("sans-serif", 18).into_font().transform(FontTransform::Rotate270))
            .pos(Pos::new(HPos::Center, VPos::Top));
        lettering.record(root.draw(&Text::new(y_desc.to_string(), (8, height / 2), style)));
    }
}

/// Counts failed text draws so a missing font is reported once per image.
#[derive(Default)]
struct Lettering {
    failures: usize,
    first_error: Option<String>,
}

impl Lettering {
    fn record<E: std::fmt::Display>(&mut self, result: std::result::Result<(), E>) {
        if let Err(e) = result {
            self.failures += 1;
            self.first_error.get_or_insert_with(|| e.to_string());
        }
    }

    fn report(&self, path: &Path) {
        if let Some(error) = &self.first_error {
            log::warn!(
                "{} text elements could not be drawn in {} ({})",
                self.failures,
                path.display(),
                error
            );
        }
    }
}

/// Pixels reserved for tick labels, sized by the longest label.
fn label_area(labels: &[String]) -> u32 {
    let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u32;
    (longest * 9 + 20).clamp(60, 320)
}

fn annotation_font_size(cells_per_side: usize) -> u32 {
    match cells_per_side {
        0..=6 => 20,
        7..=12 => 16,
        _ => 12,
    }
}
