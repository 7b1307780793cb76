// Plot formatter: turns the resolved plot configuration plus the results into a
// Figure (one panel per time-series/CDF plot, stacked panels for meta plots)
// and hands it to a rendering backend.

use tracing::{info, instrument, warn};

use super::backend::{PlottersBackend, RenderBackend};
use super::figure::{AxisSpec, Figure, Legend, Line, Panel, Scale};
use super::{Formatter, OutputSink};
use crate::cdf::{XScale, build_cdf};
use crate::config::ReportContext;
use crate::error::{ReportError, Result};
use crate::models::{
    CdfPlot, PlotConfig, PlotKind, ResultSet, SeriesSource, SeriesSpec, StyleKey, StyleMap,
    StyleValue, TimeseriesPlot,
};
use crate::resolver::PlotResolver;
use crate::stats::scale_axis;

const CDF_Y_LABEL: &str = "Cumulative probability";
const TIME_LABEL: &str = "Time";

pub struct PlotFormatter<'a> {
    ctx: &'a ReportContext,
    plot: PlotConfig,
    backend: Box<dyn RenderBackend + 'a>,
}

impl<'a> PlotFormatter<'a> {
    /// Picks the plotters backend from the sink's file extension.
    pub fn new(sink: &OutputSink, ctx: &'a ReportContext) -> Result<Self> {
        let backend = PlottersBackend::for_sink(sink)?;
        Self::with_backend(ctx, Box::new(backend))
    }

    /// Resolves the configured plot and checks axis units up front.
    pub fn with_backend(ctx: &'a ReportContext, backend: Box<dyn RenderBackend + 'a>) -> Result<Self> {
        let resolver = PlotResolver::new(&ctx.settings);
        let plot = resolver.resolve(&ctx.settings.report.plot)?;
        resolver.check_units(&plot)?;
        Ok(Self { ctx, plot, backend })
    }

    pub fn plot(&self) -> &PlotConfig {
        &self.plot
    }

    /// The figure for `results`, or `None` when the first result is empty.
    /// With several results every series is drawn once per result, its label
    /// suffixed with the result's title.
    #[instrument(skip_all, fields(plot = %self.plot.name, results = results.len()))]
    pub fn build_figure<S: SeriesSource>(&self, results: &[S]) -> Result<Option<Figure>> {
        match results.first() {
            None => return Ok(None),
            Some(first) if first.is_empty() => {
                info!("empty result set; nothing to plot");
                return Ok(None);
            }
            Some(_) => {}
        }
        let panels = self.draw(&self.plot, results)?;
        Ok(Some(Figure {
            title: self.title(results.len() > 1),
            annotation: self.annotation(),
            panels,
        }))
    }

    fn draw<S: SeriesSource>(&self, plot: &PlotConfig, results: &[S]) -> Result<Vec<Panel>> {
        match &plot.kind {
            PlotKind::Timeseries(ts) => Ok(vec![self.timeseries_panel(plot, ts, results)?]),
            PlotKind::Cdf(cdf) => Ok(vec![self.cdf_panel(plot, cdf, results)?]),
            PlotKind::Meta(meta) => {
                let mut panels = Vec::with_capacity(meta.subplots.len());
                for sub in &meta.subplots {
                    panels.extend(self.draw(sub, results)?);
                }
                let last = panels.len().saturating_sub(1);
                for panel in &mut panels[..last] {
                    panel.x_axis.label = None;
                }
                Ok(panels)
            }
        }
    }

    fn timeseries_panel<S: SeriesSource>(
        &self,
        plot: &PlotConfig,
        ts: &TimeseriesPlot,
        results: &[S],
    ) -> Result<Panel> {
        let axes = if ts.dual_axes { 2 } else { 1 };
        let units = PlotResolver::new(&self.ctx.settings).axis_units(&ts.series, axes)?;

        let mut axis_data: Vec<Vec<Option<f64>>> = vec![Vec::new(); axes];
        let mut lines = Vec::new();
        for result in results {
            let suffix = label_suffix(results, result);
            for spec in &ts.series {
                let axis = spec.axis.index();
                let y = result.series(&spec.data, spec.smoothing);
                axis_data[axis].extend_from_slice(&y);
                for reference in &self.ctx.scale_data {
                    axis_data[axis].extend_from_slice(&reference.series(&spec.data, spec.smoothing));
                }
                let (label, style) = labelled_style(spec, &suffix);
                lines.push(Line {
                    axis,
                    label,
                    points: result.x_values().iter().copied().zip(y.iter().copied()).collect(),
                    style,
                });
            }
        }

        let y_axes = units
            .into_iter()
            .zip(axis_data)
            .map(|(unit, data)| {
                match scale_axis(data, ts.scaling.bottom, ts.scaling.top) {
                    Ok(bounds) => AxisSpec {
                        label: unit,
                        range: Some((bounds.min, bounds.max)),
                        scale: if bounds.log { Scale::Log } else { Scale::Linear },
                    },
                    Err(e) => {
                        warn!(plot = %plot.name, error = %e, "axis left unscaled");
                        AxisSpec {
                            label: unit,
                            range: None,
                            scale: Scale::Linear,
                        }
                    }
                }
            })
            .collect();

        Ok(Panel {
            x_axis: AxisSpec {
                label: Some(TIME_LABEL.to_string()),
                range: Some((0.0, self.ctx.settings.report.total_length)),
                scale: Scale::Linear,
            },
            y_axes,
            legend: legend(plot, &lines),
            lines,
        })
    }

    fn cdf_panel<S: SeriesSource>(
        &self,
        plot: &PlotConfig,
        cdf: &CdfPlot,
        results: &[S],
    ) -> Result<Panel> {
        let unit = cdf
            .series
            .first()
            .and_then(|s| self.ctx.settings.data_set(&s.data))
            .map(|ds| ds.units.clone());
        let y_axis = AxisSpec {
            label: Some(CDF_Y_LABEL.to_string()),
            range: Some((0.0, 1.0)),
            scale: Scale::Linear,
        };

        let report = match build_cdf(results, cdf, self.ctx) {
            Ok(report) => report,
            Err(ReportError::NoData(what)) => {
                warn!(plot = %plot.name, series = %what, "no data for CDF plot; drawing an empty panel");
                return Ok(Panel {
                    x_axis: AxisSpec {
                        label: unit,
                        ..AxisSpec::default()
                    },
                    y_axes: vec![y_axis],
                    lines: Vec::new(),
                    legend: Legend {
                        title: plot.legend_title.clone(),
                        entries: Vec::new(),
                    },
                });
            }
            Err(e) => return Err(e),
        };

        let lines: Vec<Line> = report
            .curves
            .iter()
            .map(|curve| {
                let suffix = label_suffix(results, &results[curve.result]);
                let (label, style) = labelled_style(&cdf.series[curve.series], &suffix);
                Line {
                    axis: 0,
                    label,
                    points: curve.points.iter().map(|&(x, p)| (x, Some(p))).collect(),
                    style,
                }
            })
            .collect();

        let x_axis = match report.x_scale {
            XScale::Linear => AxisSpec {
                label: unit,
                range: Some((0.0, report.max_value)),
                scale: Scale::Linear,
            },
            XScale::Log { left } => AxisSpec {
                label: unit,
                range: Some((left, report.max_value)),
                scale: Scale::Log,
            },
        };

        Ok(Panel {
            x_axis,
            y_axes: vec![y_axis],
            legend: legend(plot, &lines),
            lines,
        })
    }

    /// Report description, the plot's own description on a second line, and
    /// the report title unless several results are being compared.
    fn title(&self, skip_title: bool) -> String {
        let report = &self.ctx.settings.report;
        let mut title = report.description.clone();
        if let Some(description) = &self.plot.description {
            title.push('\n');
            title.push_str(description);
        }
        if !report.title.is_empty() && !skip_title {
            title.push_str(" - ");
            title.push_str(&report.title);
        }
        title
    }

    fn annotation(&self) -> Option<String> {
        let report = &self.ctx.settings.report;
        report.annotate.then(|| {
            format!(
                "Local/remote: {}/{} - Time: {} - Length/step: {:.0}s/{:.2}s",
                report.local_host,
                report.host,
                report.time,
                report.length.trunc(),
                report.step_size
            )
        })
    }
}

impl Formatter for PlotFormatter<'_> {
    fn format(&mut self, results: &[ResultSet]) -> Result<()> {
        if let Some(figure) = self.build_figure(results)? {
            self.backend.render(&figure)?;
        }
        Ok(())
    }
}

fn label_suffix<S: SeriesSource>(results: &[S], result: &S) -> String {
    if results.len() > 1 {
        format!(" - {}", result.title())
    } else {
        String::new()
    }
}

/// The series' style with the result suffix appended to its label.
fn labelled_style(spec: &SeriesSpec, suffix: &str) -> (Option<String>, StyleMap) {
    let mut style = spec.style.clone();
    let label = spec.label().map(|l| format!("{}{}", l, suffix));
    if let Some(label) = &label {
        style.insert(StyleKey::Label, StyleValue::Text(label.clone()));
    }
    (label, style)
}

/// Labels of every axis merged into one legend, primary axis first.
fn legend(plot: &PlotConfig, lines: &[Line]) -> Legend {
    let mut labelled: Vec<&Line> = lines.iter().filter(|l| l.label.is_some()).collect();
    labelled.sort_by_key(|l| l.axis);
    Legend {
        title: plot.legend_title.clone(),
        entries: labelled.into_iter().filter_map(|l| l.label.clone()).collect(),
    }
}
