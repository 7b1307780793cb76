// Percentile helpers and axis autoscaling tests

use benchplot::error::ReportError;
use benchplot::stats::{median_sorted, percentile_sorted, scale_axis, sorted_present};

fn tens() -> Vec<Option<f64>> {
    (1..=10).map(|i| Some(i as f64 * 10.0)).collect()
}

#[test]
fn test_scale_axis_full_range_bounds() {
    let bounds = scale_axis(tens(), 0.0, 100.0).unwrap();
    assert!((bounds.min - 10.0 * 0.95).abs() < 1e-9);
    assert!((bounds.max - 100.0 * 1.05).abs() < 1e-9);
    assert_eq!(bounds.log, bounds.max / bounds.min > 20.0);
    assert!(!bounds.log);
}

#[test]
fn test_scale_axis_interpolates_percentiles() {
    let sorted = sorted_present(tens());
    let bounds = scale_axis(tens(), 5.0, 95.0).unwrap();
    let btm = percentile_sorted(&sorted, 5.0).unwrap();
    let top = percentile_sorted(&sorted, 95.0).unwrap();
    assert!((bounds.min - btm * 0.95).abs() < 1e-9);
    assert!((bounds.max - top * 1.05).abs() < 1e-9);
    assert!(btm > 10.0 && top < 100.0);
}

#[test]
fn test_scale_axis_goes_log_for_wide_spans() {
    let values = vec![Some(1.0), Some(10.0), Some(100.0)];
    let bounds = scale_axis(values, 0.0, 100.0).unwrap();
    assert!(bounds.log);
}

#[test]
fn test_scale_axis_ignores_missing_samples() {
    let mut values = tens();
    values.push(None);
    values.insert(0, None);
    let bounds = scale_axis(values, 0.0, 100.0).unwrap();
    assert!((bounds.min - 9.5).abs() < 1e-9);
}

#[test]
fn test_scale_axis_empty_is_error() {
    let err = scale_axis(Vec::<Option<f64>>::new(), 0.0, 100.0).unwrap_err();
    assert!(matches!(err, ReportError::EmptyData));
    let err = scale_axis(vec![None, None], 0.0, 100.0).unwrap_err();
    assert!(matches!(err, ReportError::EmptyData));
}

#[test]
fn test_percentile_endpoints_and_median() {
    let sorted = [1.0, 2.0, 3.0, 4.0];
    assert_eq!(percentile_sorted(&sorted, 0.0), Some(1.0));
    assert_eq!(percentile_sorted(&sorted, 100.0), Some(4.0));
    assert_eq!(median_sorted(&sorted), Some(2.5));
    assert_eq!(percentile_sorted(&[], 50.0), None);
}

#[test]
fn test_sorted_present_drops_none_and_sorts() {
    let sorted = sorted_present(vec![Some(3.0), None, Some(1.0), Some(2.0)]);
    assert_eq!(sorted, vec![1.0, 2.0, 3.0]);
}
