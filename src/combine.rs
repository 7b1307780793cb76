// Combines several result sets into aligned table rows.
// Rows are produced lazily so a long run is never materialized as a whole table.

use std::borrow::Cow;
use std::iter::FusedIterator;

use crate::error::{ReportError, Result};
use crate::models::SeriesSource;

/// `[x, values of result 1..., values of result 2..., ...]` for one aligned position.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedRow {
    pub x: f64,
    pub values: Vec<Option<f64>>,
}

struct SourceColumns<'a> {
    x_values: &'a [f64],
    series: Vec<Cow<'a, [Option<f64>]>>,
}

/// Single-pass row iterator returned by [`combine_results`]. Stops after the first error.
pub struct CombinedRows<'a> {
    sources: Vec<SourceColumns<'a>>,
    len: usize,
    row: usize,
    failed: bool,
}

impl Iterator for CombinedRows<'_> {
    type Item = Result<CombinedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.row >= self.len {
            return None;
        }
        let row = self.row;
        self.row += 1;

        let x = self.sources[0].x_values[row];
        let width = self.sources.iter().map(|s| s.series.len()).sum();
        let mut values = Vec::with_capacity(width);
        for src in &self.sources {
            let found = src.x_values[row];
            if found != x {
                self.failed = true;
                return Some(Err(ReportError::Alignment {
                    row,
                    expected: x,
                    found,
                }));
            }
            values.extend(src.series.iter().map(|s| s.get(row).copied().flatten()));
        }
        Some(Ok(CombinedRow { x, values }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        (0, Some(self.len - self.row))
    }
}

impl FusedIterator for CombinedRows<'_> {}

/// Zips every result's rows for `keys`. The first result's x-value becomes the
/// row's x-value; every other result must report the same x at that row.
pub fn combine_results<'a, S: SeriesSource>(results: &'a [S], keys: &[&str]) -> CombinedRows<'a> {
    let sources: Vec<SourceColumns<'a>> = results
        .iter()
        .map(|r| SourceColumns {
            x_values: r.x_values(),
            series: keys.iter().map(|k| r.series(k, false)).collect(),
        })
        .collect();
    let len = sources.iter().map(|s| s.x_values.len()).min().unwrap_or(0);
    CombinedRows {
        sources,
        len,
        row: 0,
        failed: false,
    }
}

/// Checks x alignment of all results up front, so table output can refuse to
/// start instead of failing part-way through.
pub fn check_alignment<S: SeriesSource>(results: &[S]) -> Result<()> {
    let Some((first, rest)) = results.split_first() else {
        return Ok(());
    };
    let expected = first.x_values();
    for r in rest {
        for (row, (&e, &found)) in expected.iter().zip(r.x_values()).enumerate() {
            if e != found {
                return Err(ReportError::Alignment {
                    row,
                    expected: e,
                    found,
                });
            }
        }
    }
    Ok(())
}

/// Header row: the run name, then each key; keys are suffixed with the
/// result's title when more than one result is combined.
pub fn get_header<S: SeriesSource>(results: &[S], keys: &[&str]) -> Vec<String> {
    let name = results
        .first()
        .and_then(|r| r.meta("NAME"))
        .unwrap_or_default();
    let mut header = vec![name.to_string()];
    if results.len() > 1 {
        for r in results {
            header.extend(keys.iter().map(|k| format!("{} - {}", k, r.title())));
        }
    } else {
        header.extend(keys.iter().map(|k| k.to_string()));
    }
    header
}
