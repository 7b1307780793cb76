// Order statistics and percentile-based axis autoscaling.

use crate::error::{ReportError, Result};

/// Headroom above the top percentile.
const TOP_HEADROOM: f64 = 1.05;
/// Footroom below the bottom percentile.
const BOTTOM_FOOTROOM: f64 = 0.95;
/// Span ratio above which a y-axis switches to log scale.
const LOG_SPAN_RATIO: f64 = 20.0;

/// Percentile (0..=100) of ascending `sorted` values, linearly interpolated
/// between order statistics. `None` for an empty slice.
pub fn percentile_sorted(sorted: &[f64], pct: f64) -> Option<f64> {
    if sorted.is_empty() || !pct.is_finite() {
        return None;
    }
    if sorted.len() == 1 {
        return Some(sorted[0]);
    }
    let pos = (pct.clamp(0.0, 100.0) / 100.0) * ((sorted.len() - 1) as f64);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - (lo as f64);
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn median_sorted(sorted: &[f64]) -> Option<f64> {
    percentile_sorted(sorted, 50.0)
}

/// Present samples of `values`, sorted ascending.
pub fn sorted_present<I>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut out: Vec<f64> = values.into_iter().flatten().collect();
    out.sort_by(f64::total_cmp);
    out
}

/// y-axis bounds and scale chosen from the plotted data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
    pub log: bool,
}

/// Scales an axis to the `bottom`/`top` percentiles of the present samples,
/// with 5% footroom/headroom; log scale when the span ratio exceeds 20.
pub fn scale_axis<I>(values: I, bottom: f64, top: f64) -> Result<AxisBounds>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let sorted = sorted_present(values);
    let (Some(btm), Some(tp)) = (
        percentile_sorted(&sorted, bottom),
        percentile_sorted(&sorted, top),
    ) else {
        return Err(ReportError::EmptyData);
    };
    let max = tp * TOP_HEADROOM;
    let min = btm * BOTTOM_FOOTROOM;
    Ok(AxisBounds {
        min,
        max,
        log: max / min > LOG_SPAN_RATIO,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates_between_order_statistics() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile_sorted(&v, 0.0), Some(1.0));
        assert_eq!(percentile_sorted(&v, 100.0), Some(4.0));
        assert_eq!(percentile_sorted(&v, 50.0), Some(2.5));
        assert!((percentile_sorted(&v, 25.0).unwrap() - 1.75).abs() < 1e-12);
    }

    #[test]
    fn percentile_of_empty_is_none() {
        assert_eq!(percentile_sorted(&[], 50.0), None);
    }

    #[test]
    fn median_of_odd_length() {
        assert_eq!(median_sorted(&[1.0, 5.0, 9.0]), Some(5.0));
    }
}
