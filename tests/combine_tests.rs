// Result combination and header tests

mod common;

use benchplot::combine::{CombinedRow, check_alignment, combine_results, get_header};
use benchplot::error::ReportError;
use benchplot::models::ResultSet;
use common::{present, run};

fn throughput(title: &str, values: &[f64]) -> ResultSet {
    run(values.len())
        .with_meta("NAME", "NAME")
        .with_meta("TITLE", title)
        .with_series("throughput", present(values))
}

#[test]
fn test_combine_two_results_side_by_side() {
    let results = vec![
        throughput("A", &[1.0, 2.0, 3.0]),
        throughput("B", &[4.0, 5.0, 6.0]),
    ];
    let rows: Vec<CombinedRow> = combine_results(&results, &["throughput"])
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        rows,
        vec![
            CombinedRow { x: 0.0, values: vec![Some(1.0), Some(4.0)] },
            CombinedRow { x: 1.0, values: vec![Some(2.0), Some(5.0)] },
            CombinedRow { x: 2.0, values: vec![Some(3.0), Some(6.0)] },
        ]
    );
    assert_eq!(
        get_header(&results, &["throughput"]),
        vec!["NAME", "throughput - A", "throughput - B"]
    );
}

#[test]
fn test_header_arity() {
    let keys = ["throughput", "latency"];
    let one = vec![throughput("A", &[1.0])];
    assert_eq!(get_header(&one, &keys), vec!["NAME", "throughput", "latency"]);

    let three = vec![
        throughput("A", &[1.0]),
        throughput("B", &[1.0]),
        throughput("C", &[1.0]),
    ];
    assert_eq!(get_header(&three, &keys).len(), 1 + keys.len() * three.len());
}

#[test]
fn test_combine_single_result_keeps_key_order() {
    let result = run(2)
        .with_series("a", present(&[1.0, 2.0]))
        .with_series("b", present(&[3.0, 4.0]));
    let rows: Vec<CombinedRow> = combine_results(std::slice::from_ref(&result), &["b", "a"])
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(rows[0].values, vec![Some(3.0), Some(1.0)]);
    assert_eq!(rows[1].values, vec![Some(4.0), Some(2.0)]);
}

#[test]
fn test_combine_missing_series_yields_none() {
    let result = run(2).with_series("a", vec![Some(1.0), None]);
    let rows: Vec<CombinedRow> = combine_results(std::slice::from_ref(&result), &["a", "ghost"])
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(rows[0].values, vec![Some(1.0), None]);
    assert_eq!(rows[1].values, vec![None, None]);
}

#[test]
fn test_combine_reports_misaligned_x_values() {
    let a = throughput("A", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    let mut b = throughput("B", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    b.x_values[5] = 5.5;
    let results = vec![a, b];

    let mut rows = combine_results(&results, &["throughput"]);
    for _ in 0..5 {
        assert!(rows.next().unwrap().is_ok());
    }
    let err = rows.next().unwrap().unwrap_err();
    match &err {
        ReportError::Alignment { row, expected, found } => {
            assert_eq!(*row, 5);
            assert_eq!(*expected, 5.0);
            assert_eq!(*found, 5.5);
        }
        other => panic!("expected Alignment, got {other:?}"),
    }
    let msg = err.to_string();
    assert!(msg.contains('5') && msg.contains("5.5"));
    assert!(rows.next().is_none());
}

#[test]
fn test_check_alignment_runs_before_any_row() {
    let a = throughput("A", &[1.0, 2.0, 3.0]);
    let mut b = throughput("B", &[1.0, 2.0, 3.0]);
    b.x_values[2] = 9.0;
    let err = check_alignment(&[a.clone(), b]).unwrap_err();
    assert!(matches!(err, ReportError::Alignment { row: 2, .. }));
    check_alignment(&[a.clone(), a]).expect("identical runs align");
}

#[test]
fn test_combine_stops_at_shortest_result() {
    let results = vec![
        throughput("A", &[1.0, 2.0, 3.0]),
        throughput("B", &[4.0, 5.0]),
    ];
    let rows = combine_results(&results, &["throughput"]).count();
    assert_eq!(rows, 2);
}

#[test]
fn test_combine_is_repeatable() {
    let results = vec![
        throughput("A", &[1.0, 2.0, 3.0]),
        throughput("B", &[4.0, 5.0, 6.0]),
    ];
    let first: Vec<_> = combine_results(&results, &["throughput"])
        .map(Result::unwrap)
        .collect();
    let second: Vec<_> = combine_results(&results, &["throughput"])
        .map(Result::unwrap)
        .collect();
    assert_eq!(first, second);
}

#[test]
fn test_combine_empty_input_yields_nothing() {
    let results: Vec<ResultSet> = Vec::new();
    assert_eq!(combine_results(&results, &["throughput"]).count(), 0);
    assert_eq!(get_header(&results, &["throughput"]), vec!["", "throughput"]);
}
