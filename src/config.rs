use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::models::{PlotEntry, ResultSet};

/// Process-wide report settings: loaded once, read-only for every report.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub report: ReportSettings,
    /// Ordered data-set table; the order drives table column order.
    #[serde(default)]
    pub data_sets: Vec<DataSetDefinition>,
    /// Plot catalog keyed by plot name.
    #[serde(default)]
    pub plots: BTreeMap<String, PlotEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportSettings {
    /// Name of the plot configuration to render.
    pub plot: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub local_host: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub time: String,
    /// Test length in seconds.
    pub length: f64,
    /// Total collection length in seconds (bounds the time-series x-axis).
    pub total_length: f64,
    /// Sampling interval in seconds.
    pub step_size: f64,
    #[serde(default = "default_annotate")]
    pub annotate: bool,
    #[serde(default = "default_smoothing_window")]
    pub smoothing_window: usize,
    /// Result files used only to widen axis ranges, never drawn.
    #[serde(default)]
    pub scale_data: Vec<PathBuf>,
}

fn default_annotate() -> bool {
    true
}

fn default_smoothing_window() -> usize {
    5
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DataSetDefinition {
    pub name: String,
    pub units: String,
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "benchplot.toml".into());
        Self::load_from_path(Path::new(&path))
    }

    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate settings from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let settings: Settings = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.report.plot.is_empty(), "report.plot must be non-empty");
        anyhow::ensure!(
            self.report.step_size > 0.0,
            "report.step_size must be > 0, got {}",
            self.report.step_size
        );
        anyhow::ensure!(
            self.report.length >= 0.0,
            "report.length must be >= 0, got {}",
            self.report.length
        );
        anyhow::ensure!(
            self.report.total_length >= 0.0,
            "report.total_length must be >= 0, got {}",
            self.report.total_length
        );
        anyhow::ensure!(
            self.report.smoothing_window > 0,
            "report.smoothing_window must be > 0, got {}",
            self.report.smoothing_window
        );
        let mut seen = HashSet::new();
        for ds in &self.data_sets {
            anyhow::ensure!(!ds.name.is_empty(), "data_sets.name must be non-empty");
            anyhow::ensure!(
                !ds.units.is_empty(),
                "data_sets.units must be non-empty for '{}'",
                ds.name
            );
            anyhow::ensure!(
                seen.insert(ds.name.as_str()),
                "data_sets.name '{}' is defined twice",
                ds.name
            );
        }
        Ok(())
    }

    pub fn data_set(&self, name: &str) -> Option<&DataSetDefinition> {
        self.data_sets.iter().find(|ds| ds.name == name)
    }

    pub fn data_set_names(&self) -> Vec<&str> {
        self.data_sets.iter().map(|ds| ds.name.as_str()).collect()
    }
}

/// Everything a report reads besides the results themselves.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub settings: Settings,
    /// Supplementary sources used only to extend axis ranges.
    pub scale_data: Vec<ResultSet>,
}

impl ReportContext {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            scale_data: Vec::new(),
        }
    }

    /// Builds the context and loads every `report.scale_data` file.
    pub fn load(settings: Settings) -> anyhow::Result<Self> {
        let mut scale_data = Vec::with_capacity(settings.report.scale_data.len());
        for path in &settings.report.scale_data {
            let mut set = ResultSet::load(path)
                .with_context(|| format!("loading scale data {}", path.display()))?;
            set.smoothing_window = settings.report.smoothing_window;
            scale_data.push(set);
        }
        Ok(Self {
            settings,
            scale_data,
        })
    }

    pub fn with_scale_data(mut self, scale_data: Vec<ResultSet>) -> Self {
        self.scale_data = scale_data;
        self
    }
}
