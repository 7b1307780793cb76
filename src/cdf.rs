// Empirical CDF curves for one or more series, plus the log/linear decision
// for the value axis.

use tracing::warn;

use crate::config::ReportContext;
use crate::error::{ReportError, Result};
use crate::models::{CdfPlot, Cutoff, SeriesSource};
use crate::stats::{median_sorted, sorted_present};

/// Spacing of the evaluation axis, in data units.
pub const EVAL_STEP: f64 = 0.1;
/// Upper bound on evaluation points per curve; wider ranges get a coarser step.
pub const MAX_EVAL_POINTS: usize = 100_000;
/// Median spread (max/min) above which the value axis goes logarithmic.
const LOG_MEDIAN_RATIO: f64 = 10.0;

/// One drawn curve: which result and which configured series it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct CdfCurve {
    pub result: usize,
    pub series: usize,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum XScale {
    Linear,
    /// Logarithmic, starting at `left`.
    Log { left: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CdfReport {
    pub curves: Vec<CdfCurve>,
    pub x_scale: XScale,
    /// Largest sample seen, scale reference data included.
    pub max_value: f64,
}

/// Fraction of `sorted` samples that are <= `point`.
pub fn cum_prob(sorted: &[f64], point: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.partition_point(|&x| x <= point) as f64 / sorted.len() as f64
}

/// `0, step, 2*step, ...` up to and including the first point >= `max`.
/// At most `MAX_EVAL_POINTS` steps are produced; beyond that the step widens.
pub fn eval_axis(max: f64, step: f64) -> Vec<f64> {
    if !max.is_finite() || max <= 0.0 || step <= 0.0 {
        return vec![0.0];
    }
    let mut step = step;
    if max / step > MAX_EVAL_POINTS as f64 {
        let coarse = max / MAX_EVAL_POINTS as f64;
        warn!(max, step, coarse, "CDF value range too wide for the evaluation step; widening it");
        step = coarse;
    }
    let count = (max / step).ceil() as usize;
    let mut out: Vec<f64> = (0..=count).map(|n| n as f64 * step).collect();
    if out.last().is_some_and(|&last| last < max) {
        out.push(max);
    }
    out
}

/// Drops `start/step` leading and `end/step` trailing samples.
pub fn trim_cutoff(values: &[Option<f64>], cutoff: Option<Cutoff>, step: f64) -> &[Option<f64>] {
    let Some(cutoff) = cutoff else {
        return values;
    };
    let head = (cutoff.start / step + 1e-9).floor() as usize;
    let tail = (cutoff.end / step + 1e-9).floor() as usize;
    if head + tail >= values.len() {
        return &[];
    }
    &values[head..values.len() - tail]
}

/// Log scale when medians differ by more than an order of magnitude. The left
/// bound is the smallest minimum, rounded down to a multiple of 10 above 10.
pub fn choose_x_scale(medians: &[f64], minimums: &[f64]) -> XScale {
    let hi = medians.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lo = medians.iter().copied().fold(f64::INFINITY, f64::min);
    if medians.is_empty() || hi / lo <= LOG_MEDIAN_RATIO || (hi / lo).is_nan() {
        return XScale::Linear;
    }
    let mut left = minimums.iter().copied().fold(f64::INFINITY, f64::min);
    if left > 10.0 {
        left -= left % 10.0;
    }
    XScale::Log { left }
}

/// Builds one curve per (result, series) pair with usable samples. Medians,
/// minimums and the maximum are taken across all results, so every compared
/// run shares one value axis.
pub fn build_cdf<S: SeriesSource>(
    results: &[S],
    plot: &CdfPlot,
    ctx: &ReportContext,
) -> Result<CdfReport> {
    let step = ctx.settings.report.step_size;
    let mut samples: Vec<(usize, usize, Vec<f64>)> = Vec::new();
    let mut medians = Vec::new();
    let mut minimums = Vec::new();
    let mut max_value = 0.0f64;

    for (ri, result) in results.iter().enumerate() {
        for (si, spec) in plot.series.iter().enumerate() {
            let raw = result.series(&spec.data, spec.smoothing);
            let sorted = sorted_present(trim_cutoff(&raw, spec.cutoff, step).iter().copied());
            match (median_sorted(&sorted), sorted.first(), sorted.last()) {
                (Some(median), Some(&min), Some(&max)) => {
                    medians.push(median);
                    minimums.push(min);
                    max_value = max_value.max(max);
                }
                _ => warn!(series = %spec.data, result = ri, "no usable samples for CDF series"),
            }
            for reference in &ctx.scale_data {
                let extra = reference.series(&spec.data, spec.smoothing);
                max_value = extra.iter().flatten().copied().fold(max_value, f64::max);
            }
            samples.push((ri, si, sorted));
        }
    }

    if medians.is_empty() {
        let names: Vec<&str> = plot.series.iter().map(|s| s.data.as_str()).collect();
        return Err(ReportError::NoData(names.join(", ")));
    }

    let x_values = eval_axis(max_value, EVAL_STEP);
    let curves = samples
        .into_iter()
        .filter(|(_, _, sorted)| !sorted.is_empty())
        .map(|(result, series, sorted)| CdfCurve {
            result,
            series,
            points: x_values.iter().map(|&p| (p, cum_prob(&sorted, p))).collect(),
        })
        .collect();

    Ok(CdfReport {
        curves,
        x_scale: choose_x_scale(&medians, &minimums),
        max_value,
    })
}
