// Rendering backends for Figures. The plotters backend draws SVG or PNG files;
// log axes are plotted as log10 of the data on a linear coordinate system with
// 10^v tick labels, so every chart shares one coordinate type.

use std::ops::Range;
use std::path::PathBuf;

use plotters::coord::Shift;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, TextStyle};
use tracing::{debug, info};

use super::OutputSink;
use super::figure::{AxisSpec, Figure, Line, Panel, Scale};
use crate::error::{ReportError, Result};
use crate::models::{StyleKey, StyleValue};

const WIDTH: u32 = 1200;
const PANEL_HEIGHT: u32 = 380;
const TITLE_LINE_HEIGHT: i32 = 26;
const FOOTER_HEIGHT: i32 = 24;

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Draws a finished figure somewhere.
pub trait RenderBackend {
    fn render(&mut self, figure: &Figure) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Svg,
    Png,
}

impl ImageFormat {
    /// Output format from the sink's file extension. Known formats without a
    /// drawing backend, and the interactive console sink, are reported as such.
    pub fn infer(sink: &OutputSink) -> Result<Self> {
        let path = match sink {
            OutputSink::Console => {
                return Err(ReportError::MissingRenderingBackend(
                    "interactive display".to_string(),
                ));
            }
            OutputSink::Path(path) => path,
        };
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("svg") => Ok(ImageFormat::Svg),
            Some("png") => Ok(ImageFormat::Png),
            Some(ext @ ("svgz" | "ps" | "eps" | "pdf")) => Err(
                ReportError::MissingRenderingBackend(format!("'.{}' output", ext)),
            ),
            _ => Err(ReportError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

pub struct PlottersBackend {
    path: PathBuf,
    format: ImageFormat,
}

impl PlottersBackend {
    pub fn for_sink(sink: &OutputSink) -> Result<Self> {
        let format = ImageFormat::infer(sink)?;
        let OutputSink::Path(path) = sink else {
            return Err(ReportError::MissingRenderingBackend(
                "interactive display".to_string(),
            ));
        };
        Ok(Self {
            path: path.clone(),
            format,
        })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }
}

impl RenderBackend for PlottersBackend {
    fn render(&mut self, figure: &Figure) -> Result<()> {
        let panels = figure.panels.len().max(1) as u32;
        let size = (WIDTH, 120 + PANEL_HEIGHT * panels);
        match self.format {
            ImageFormat::Svg => {
                let root = SVGBackend::new(&self.path, size).into_drawing_area();
                draw_figure(&root, figure)?;
                root.present().map_err(drawing_err)?;
            }
            ImageFormat::Png => {
                let root = BitMapBackend::new(&self.path, size).into_drawing_area();
                draw_figure(&root, figure)?;
                root.present().map_err(drawing_err)?;
            }
        }
        info!(path = %self.path.display(), panels = figure.panels.len(), "plot written");
        Ok(())
    }
}

fn drawing_err<E: std::fmt::Display>(e: E) -> ReportError {
    ReportError::Drawing(e.to_string())
}

fn draw_figure<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, figure: &Figure) -> Result<()> {
    root.fill(&WHITE).map_err(drawing_err)?;

    let title_lines: Vec<&str> = figure.title.lines().collect();
    let title_height = TITLE_LINE_HEIGHT * title_lines.len().max(1) as i32 + 12;
    let (title_area, rest) = root.split_vertically(title_height);
    draw_centered_lines(
        &title_area,
        &title_lines,
        ("sans-serif", 22).into_font(),
        TITLE_LINE_HEIGHT,
    )?;

    let body = match &figure.annotation {
        Some(note) => {
            let (_, height) = rest.dim_in_pixel();
            let (body, footer) = rest.split_vertically(height as i32 - FOOTER_HEIGHT);
            draw_centered_lines(
                &footer,
                &[note.as_str()],
                ("sans-serif", 12).into_font(),
                FOOTER_HEIGHT,
            )?;
            body
        }
        None => rest,
    };

    let areas = body.split_evenly((figure.panels.len().max(1), 1));
    for (panel, area) in figure.panels.iter().zip(areas.iter()) {
        draw_panel(area, panel)?;
    }
    Ok(())
}

fn draw_centered_lines<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    lines: &[&str],
    font: FontDesc<'_>,
    line_height: i32,
) -> Result<()> {
    let (width, _) = area.dim_in_pixel();
    let style = TextStyle::from(font).pos(Pos::new(HPos::Center, VPos::Top));
    for (i, text) in lines.iter().enumerate() {
        area.draw_text(text, &style, (width as i32 / 2, 6 + line_height * i as i32))
            .map_err(drawing_err)?;
    }
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, panel: &Panel) -> Result<()> {
    let styles: Vec<ShapeStyle> = panel
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| line_style(line, i))
        .collect();

    let x_scale = panel.x_axis.scale;
    let x_range = fit_range(
        &panel.x_axis,
        panel.lines.iter().flat_map(|l| l.points.iter().map(|&(x, _)| x)),
    );
    let primary = panel.y_axes.first().cloned().unwrap_or_default();
    let y_range = fit_range(&primary, axis_values(panel, 0));
    let x_fmt = tick_formatter(x_scale);
    let y_fmt = tick_formatter(primary.scale);

    let mut builder = ChartBuilder::on(area);
    builder.margin(12).x_label_area_size(40).y_label_area_size(70);
    if panel.y_axes.len() > 1 {
        builder.right_y_label_area_size(70);
    }
    let mut chart = builder
        .build_cartesian_2d(x_range.clone(), y_range)
        .map_err(drawing_err)?;

    {
        let mut mesh = chart.configure_mesh();
        mesh.x_label_formatter(&x_fmt).y_label_formatter(&y_fmt);
        if let Some(label) = &panel.x_axis.label {
            mesh.x_desc(label.as_str());
        }
        if let Some(label) = &primary.label {
            mesh.y_desc(label.as_str());
        }
        mesh.draw().map_err(drawing_err)?;
    }

    for (line, style) in panel.lines.iter().zip(&styles) {
        if line.axis != 0 || !is_visible(line) {
            continue;
        }
        for segment in segments(&line.points, x_scale, primary.scale) {
            chart
                .draw_series(LineSeries::new(segment, *style))
                .map_err(drawing_err)?;
        }
    }

    match panel.y_axes.get(1) {
        Some(secondary) => {
            let y2_range = fit_range(secondary, axis_values(panel, 1));
            let y2_fmt = tick_formatter(secondary.scale);
            let mut dual = chart.set_secondary_coord(x_range, y2_range);
            {
                let mut axes = dual.configure_secondary_axes();
                axes.y_label_formatter(&y2_fmt);
                if let Some(label) = &secondary.label {
                    axes.y_desc(label.as_str());
                }
                axes.draw().map_err(drawing_err)?;
            }
            for (line, style) in panel.lines.iter().zip(&styles) {
                if line.axis != 1 || !is_visible(line) {
                    continue;
                }
                for segment in segments(&line.points, x_scale, secondary.scale) {
                    dual.draw_secondary_series(LineSeries::new(segment, *style))
                        .map_err(drawing_err)?;
                }
            }
            draw_legend::<DB>(&mut dual, panel, &styles)
        }
        None => draw_legend(&mut chart, panel, &styles),
    }
}

/// One legend for the whole panel: entries from every axis, primary first.
fn draw_legend<'a, DB: DrawingBackend + 'a>(
    chart: &mut Chart<'a, DB>,
    panel: &Panel,
    styles: &[ShapeStyle],
) -> Result<()> {
    if panel.legend.entries.is_empty() {
        return Ok(());
    }
    if let Some(title) = &panel.legend.title {
        chart
            .draw_series(std::iter::empty::<PathElement<(f64, f64)>>())
            .map_err(drawing_err)?
            .label(title.as_str())
            .legend(|(x, y)| EmptyElement::at((x, y)));
    }
    let mut ordered: Vec<(&Line, ShapeStyle)> =
        panel.lines.iter().zip(styles.iter().copied()).collect();
    ordered.sort_by_key(|(line, _)| line.axis);
    for (line, style) in ordered {
        let Some(label) = &line.label else {
            continue;
        };
        if !is_visible(line) {
            continue;
        }
        chart
            .draw_series(std::iter::empty::<PathElement<(f64, f64)>>())
            .map_err(drawing_err)?
            .label(label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(drawing_err)?;
    Ok(())
}

fn axis_values(panel: &Panel, axis: usize) -> impl Iterator<Item = f64> + '_ {
    panel
        .lines_on(axis)
        .flat_map(|l| l.points.iter().filter_map(|&(_, y)| y))
}

fn is_visible(line: &Line) -> bool {
    line.style
        .get(&StyleKey::Visible)
        .and_then(StyleValue::as_bool)
        .unwrap_or(true)
}

fn line_style(line: &Line, index: usize) -> ShapeStyle {
    for key in line.style.keys() {
        if !matches!(
            key,
            StyleKey::Color | StyleKey::Alpha | StyleKey::Linewidth | StyleKey::Visible | StyleKey::Label
        ) {
            debug!(style = %key, "style attribute not supported by plotters backend");
        }
    }
    let color = line
        .style
        .get(&StyleKey::Color)
        .and_then(StyleValue::as_str)
        .and_then(parse_color)
        .unwrap_or_else(|| Palette99::pick(index).to_rgba());
    let alpha = line
        .style
        .get(&StyleKey::Alpha)
        .and_then(StyleValue::as_f64)
        .unwrap_or(1.0);
    let stroke_width = line
        .style
        .get(&StyleKey::Linewidth)
        .and_then(StyleValue::as_f64)
        .map(|w| w.round().max(1.0) as u32)
        .unwrap_or(2);
    ShapeStyle {
        color: color.mix(alpha),
        filled: false,
        stroke_width,
    }
}

fn parse_color(s: &str) -> Option<RGBAColor> {
    let rgb = match s.to_ascii_lowercase().as_str() {
        "red" | "r" => RED,
        "blue" | "b" => BLUE,
        "green" | "g" => GREEN,
        "black" | "k" => BLACK,
        "cyan" | "c" => CYAN,
        "magenta" | "m" => MAGENTA,
        "yellow" | "y" => YELLOW,
        "orange" => RGBColor(255, 165, 0),
        "purple" => RGBColor(128, 0, 128),
        "gray" | "grey" => RGBColor(128, 128, 128),
        hex => {
            let hex = hex.strip_prefix('#')?;
            if hex.len() != 6 {
                return None;
            }
            let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
            RGBColor(channel(0)?, channel(2)?, channel(4)?)
        }
    };
    Some(rgb.to_rgba())
}

fn project(v: f64, scale: Scale) -> Option<f64> {
    match scale {
        Scale::Linear => v.is_finite().then_some(v),
        Scale::Log => (v > 0.0 && v.is_finite()).then(|| v.log10()),
    }
}

/// Splits a line at missing samples (and at non-positive values on log axes).
fn segments(points: &[(f64, Option<f64>)], x_scale: Scale, y_scale: Scale) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for &(x, y) in points {
        match (project(x, x_scale), y.and_then(|y| project(y, y_scale))) {
            (Some(x), Some(y)) => current.push((x, y)),
            _ => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Coordinate range for an axis, in drawing space (log10 for log axes).
fn fit_range(axis: &AxisSpec, data: impl Iterator<Item = f64>) -> Range<f64> {
    let data: Vec<f64> = data.filter(|v| v.is_finite()).collect();
    let (lo, hi) = axis.range.unwrap_or_else(|| {
        let lo = data.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo.is_finite() && hi.is_finite() {
            (lo, hi)
        } else {
            (0.0, 1.0)
        }
    });
    match axis.scale {
        Scale::Linear => {
            if hi > lo {
                lo..hi
            } else {
                (lo - 1.0)..(hi + 1.0)
            }
        }
        Scale::Log => {
            let lo = if lo > 0.0 {
                lo
            } else {
                data.iter()
                    .copied()
                    .filter(|v| *v > 0.0)
                    .fold(f64::INFINITY, f64::min)
            };
            let lo = if lo.is_finite() { lo } else { 1.0 };
            let hi = if hi > lo { hi } else { lo * 10.0 };
            lo.log10()..hi.log10()
        }
    }
}

fn tick_formatter(scale: Scale) -> fn(&f64) -> String {
    match scale {
        Scale::Linear => |v: &f64| format_number(*v),
        Scale::Log => |v: &f64| format_number(10f64.powf(*v)),
    }
}

fn format_number(v: f64) -> String {
    let abs = v.abs();
    if abs >= 100.0 || v.fract() == 0.0 {
        format!("{:.0}", v)
    } else if abs >= 1.0 {
        format!("{:.1}", v)
    } else if abs >= 0.01 {
        format!("{:.2}", v)
    } else {
        format!("{:.1e}", v)
    }
}
