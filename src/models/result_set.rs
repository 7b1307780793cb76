// Measurement series sources. The report core only reads through SeriesSource;
// ResultSet is the JSON-backed implementation used by the binary and tests.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

/// Read-only view of one collected run: shared x-values plus named series.
pub trait SeriesSource {
    fn x_values(&self) -> &[f64];

    /// Values for a data set, same length as `x_values`; `None` marks a missing sample.
    fn series(&self, name: &str, smoothed: bool) -> Cow<'_, [Option<f64>]>;

    fn meta(&self, key: &str) -> Option<&str>;

    fn is_empty(&self) -> bool {
        self.x_values().is_empty()
    }

    /// Display title used to tell several compared runs apart.
    fn title(&self) -> &str {
        self.meta("TITLE").unwrap_or_default()
    }
}

impl<T: SeriesSource + ?Sized> SeriesSource for &T {
    fn x_values(&self) -> &[f64] {
        (**self).x_values()
    }

    fn series(&self, name: &str, smoothed: bool) -> Cow<'_, [Option<f64>]> {
        (**self).series(name, smoothed)
    }

    fn meta(&self, key: &str) -> Option<&str> {
        (**self).meta(key)
    }
}

fn default_smoothing_window() -> usize {
    5
}

/// One test run as stored on disk: `{"x_values": [...], "results": {...}, "metadata": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub x_values: Vec<f64>,
    #[serde(default)]
    pub results: BTreeMap<String, Vec<Option<f64>>>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// Window (in samples) of the centered moving average used for smoothed series.
    #[serde(skip, default = "default_smoothing_window")]
    pub smoothing_window: usize,
}

impl ResultSet {
    pub fn new(x_values: Vec<f64>) -> Self {
        Self {
            x_values,
            smoothing_window: default_smoothing_window(),
            ..Default::default()
        }
    }

    pub fn with_series(mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        self.results.insert(name.into(), values);
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let mut set: ResultSet = serde_json::from_str(s)?;
        set.smoothing_window = default_smoothing_window();
        Ok(set)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }

    /// Centered moving average over the present samples in each window.
    /// A position whose own sample is missing stays missing.
    fn smoothed(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        let half = self.smoothing_window / 2;
        (0..values.len())
            .map(|i| {
                values[i]?;
                let start = i.saturating_sub(half);
                let end = (i + half + 1).min(values.len());
                let (sum, n) = values[start..end]
                    .iter()
                    .flatten()
                    .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
                Some(sum / n as f64)
            })
            .collect()
    }
}

impl SeriesSource for ResultSet {
    fn x_values(&self) -> &[f64] {
        &self.x_values
    }

    fn series(&self, name: &str, smoothed: bool) -> Cow<'_, [Option<f64>]> {
        let Some(values) = self.results.get(name) else {
            warn!(series = name, "missing data points for series");
            return Cow::Owned(vec![None; self.x_values.len()]);
        };
        if smoothed && self.smoothing_window > 1 {
            Cow::Owned(self.smoothed(values))
        } else {
            Cow::Borrowed(values)
        }
    }

    fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}
