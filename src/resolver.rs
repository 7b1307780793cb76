// Plot configuration resolution: catalog lookup, parent overlay, sub-plot
// expansion, and per-axis unit checks. Runs before any data is touched.

use tracing::{debug, instrument};

use crate::config::Settings;
use crate::error::{ReportError, Result};
use crate::models::{
    AxisSide, CdfPlot, Cutoff, MetaPlot, PlotConfig, PlotEntry, PlotKind, PlotType, Scaling,
    SeriesEntry, SeriesSpec, StyleKey, StyleMap, TimeseriesPlot,
};

pub struct PlotResolver<'a> {
    settings: &'a Settings,
}

impl<'a> PlotResolver<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Resolves a named plot into its typed form. Meta plots expand each sub-plot
    /// independently (each may carry its own parent); meta plots do not nest.
    #[instrument(skip(self), fields(operation = "resolve_plot"))]
    pub fn resolve(&self, name: &str) -> Result<PlotConfig> {
        self.resolve_inner(name, true)
    }

    fn resolve_inner(&self, name: &str, allow_meta: bool) -> Result<PlotConfig> {
        let entry = self.merged_entry(name)?;
        let config = self.build(name, entry, allow_meta)?;
        debug!(plot = name, plot_type = ?config.plot_type(), "plot configuration resolved");
        Ok(config)
    }

    /// The catalog record for `name` overlaid onto its fully resolved parent chain.
    pub fn merged_entry(&self, name: &str) -> Result<PlotEntry> {
        let mut chain = vec![name.to_string()];
        self.merge_chain(name, &mut chain)
    }

    fn merge_chain(&self, name: &str, chain: &mut Vec<String>) -> Result<PlotEntry> {
        let entry = self
            .settings
            .plots
            .get(name)
            .ok_or_else(|| ReportError::ConfigNotFound(name.to_string()))?;
        let Some(parent) = entry.parent.as_deref() else {
            return Ok(entry.clone());
        };
        let cyclic = chain.iter().any(|n| n == parent);
        chain.push(parent.to_string());
        if cyclic {
            return Err(ReportError::ParentCycle {
                plot: chain[0].clone(),
                chain: chain.join(" -> "),
            });
        }
        let base = self.merge_chain(parent, chain)?;
        Ok(base.overlay(entry))
    }

    fn build(&self, name: &str, entry: PlotEntry, allow_meta: bool) -> Result<PlotConfig> {
        let kind = match entry.kind {
            None => return Err(invalid(name, "missing 'type'")),
            Some(PlotType::Timeseries) => {
                let dual_axes = entry.dual_axes.unwrap_or(false);
                let series = self.series_specs(name, entry.series, entry.cutoff)?;
                if !dual_axes && series.iter().any(|s| s.axis == AxisSide::Secondary) {
                    return Err(invalid(name, "series on axis 2 requires dual_axes"));
                }
                let scaling = match entry.scaling {
                    Some((bottom, top)) => {
                        if !(0.0..=100.0).contains(&bottom)
                            || !(0.0..=100.0).contains(&top)
                            || bottom > top
                        {
                            return Err(invalid(
                                name,
                                format!("scaling ({}, {}) is not a percentile range", bottom, top),
                            ));
                        }
                        Scaling { bottom, top }
                    }
                    None => Scaling::default(),
                };
                PlotKind::Timeseries(TimeseriesPlot {
                    series,
                    scaling,
                    dual_axes,
                })
            }
            Some(PlotType::Cdf) => {
                let series = self.series_specs(name, entry.series, entry.cutoff)?;
                PlotKind::Cdf(CdfPlot { series })
            }
            Some(PlotType::Meta) => {
                if !allow_meta {
                    return Err(invalid(name, "meta plots cannot be used as sub-plots"));
                }
                let names = entry.subplots.unwrap_or_default();
                if names.is_empty() {
                    return Err(invalid(name, "meta plot without subplots"));
                }
                let subplots = names
                    .iter()
                    .map(|sub| self.resolve_inner(sub, false))
                    .collect::<Result<Vec<_>>>()?;
                PlotKind::Meta(MetaPlot { subplots })
            }
        };
        Ok(PlotConfig {
            name: name.to_string(),
            description: entry.description,
            legend_title: entry.legend_title,
            kind,
        })
    }

    fn series_specs(
        &self,
        plot: &str,
        entries: Option<Vec<SeriesEntry>>,
        plot_cutoff: Option<(f64, f64)>,
    ) -> Result<Vec<SeriesSpec>> {
        let entries = entries.unwrap_or_default();
        if entries.is_empty() {
            return Err(invalid(plot, "no series defined"));
        }
        entries
            .into_iter()
            .map(|e| {
                if self.settings.data_set(&e.data).is_none() {
                    return Err(invalid(plot, format!("unknown data set '{}'", e.data)));
                }
                let axis = match e.axis {
                    None | Some(1) => AxisSide::Primary,
                    Some(2) => AxisSide::Secondary,
                    Some(n) => return Err(invalid(plot, format!("axis must be 1 or 2, got {}", n))),
                };
                let cutoff = match e.cutoff.or(plot_cutoff) {
                    Some((start, end)) if start < 0.0 || end < 0.0 => {
                        return Err(invalid(plot, "cutoff values must be >= 0"));
                    }
                    Some((start, end)) => Some(Cutoff { start, end }),
                    None => None,
                };
                let mut style = StyleMap::new();
                for (key, value) in e.style {
                    let key: StyleKey = key.parse().map_err(|reason: String| invalid(plot, reason))?;
                    style.insert(key, value);
                }
                Ok(SeriesSpec {
                    data: e.data,
                    axis,
                    smoothing: e.smoothing.unwrap_or(false),
                    cutoff,
                    style,
                })
            })
            .collect()
    }

    /// Declared units per axis; every series sharing an axis must agree.
    /// An axis without series has no unit.
    pub fn axis_units(&self, series: &[SeriesSpec], axes: usize) -> Result<Vec<Option<String>>> {
        let mut units: Vec<Option<String>> = vec![None; axes.max(1)];
        for s in series {
            let ds = self.settings.data_set(&s.data).ok_or_else(|| ReportError::InvalidConfig {
                plot: s.data.clone(),
                reason: "unknown data set".to_string(),
            })?;
            let slot = units
                .get_mut(s.axis.index())
                .ok_or_else(|| invalid(&s.data, "series on axis 2 requires dual_axes"))?;
            match slot.as_deref() {
                Some(unit) if unit != ds.units => {
                    return Err(ReportError::UnitMismatch {
                        first: unit.to_string(),
                        second: ds.units.clone(),
                    });
                }
                Some(_) => {}
                None => *slot = Some(ds.units.clone()),
            }
        }
        Ok(units)
    }

    /// Unit check for a whole plot, including every sub-plot of a meta plot.
    /// CDF plots put every series on the single value axis.
    pub fn check_units(&self, plot: &PlotConfig) -> Result<()> {
        match &plot.kind {
            PlotKind::Timeseries(ts) => {
                self.axis_units(&ts.series, if ts.dual_axes { 2 } else { 1 })?;
            }
            PlotKind::Cdf(cdf) => {
                let flattened: Vec<SeriesSpec> = cdf
                    .series
                    .iter()
                    .map(|s| SeriesSpec {
                        axis: AxisSide::Primary,
                        ..s.clone()
                    })
                    .collect();
                self.axis_units(&flattened, 1)?;
            }
            PlotKind::Meta(meta) => {
                for sub in &meta.subplots {
                    self.check_units(sub)?;
                }
            }
        }
        Ok(())
    }
}

fn invalid(plot: &str, reason: impl Into<String>) -> ReportError {
    ReportError::InvalidConfig {
        plot: plot.to_string(),
        reason: reason.into(),
    }
}
