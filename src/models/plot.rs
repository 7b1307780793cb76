// Plot configuration: raw catalog records (as written in the config file) and
// the typed, fully-resolved form the renderers consume.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Plot type tag as written in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotType {
    Timeseries,
    Cdf,
    Meta,
}

/// Catalog record. Every field is optional so a child can override any subset of its parent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlotEntry {
    #[serde(rename = "type")]
    pub kind: Option<PlotType>,
    pub parent: Option<String>,
    pub description: Option<String>,
    pub legend_title: Option<String>,
    pub series: Option<Vec<SeriesEntry>>,
    pub scaling: Option<(f64, f64)>,
    pub dual_axes: Option<bool>,
    pub cutoff: Option<(f64, f64)>,
    pub subplots: Option<Vec<String>>,
}

impl PlotEntry {
    /// Shallow overlay: each field the child sets replaces the parent's value whole.
    pub fn overlay(self, child: &PlotEntry) -> PlotEntry {
        PlotEntry {
            kind: child.kind.or(self.kind),
            parent: child.parent.clone().or(self.parent),
            description: child.description.clone().or(self.description),
            legend_title: child.legend_title.clone().or(self.legend_title),
            series: child.series.clone().or(self.series),
            scaling: child.scaling.or(self.scaling),
            dual_axes: child.dual_axes.or(self.dual_axes),
            cutoff: child.cutoff.or(self.cutoff),
            subplots: child.subplots.clone().or(self.subplots),
        }
    }
}

/// One series line of a catalog record. Keys other than the known ones are style attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesEntry {
    pub data: String,
    pub axis: Option<u8>,
    pub smoothing: Option<bool>,
    pub cutoff: Option<(f64, f64)>,
    #[serde(flatten)]
    pub style: BTreeMap<String, StyleValue>,
}

/// Opaque style value; forwarded to the rendering backend without interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl StyleValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StyleValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StyleValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StyleValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

macro_rules! style_keys {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Recognized visual style attributes.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum StyleKey {
            $($variant),+
        }

        impl StyleKey {
            pub const ALL: &'static [StyleKey] = &[$(StyleKey::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(StyleKey::$variant => $name),+
                }
            }
        }

        impl FromStr for StyleKey {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(StyleKey::$variant),)+
                    other => Err(format!("unknown style attribute '{}'", other)),
                }
            }
        }
    };
}

style_keys! {
    Alpha => "alpha",
    Antialiased => "antialiased",
    Color => "color",
    DashCapstyle => "dash_capstyle",
    DashJoinstyle => "dash_joinstyle",
    Drawstyle => "drawstyle",
    Fillstyle => "fillstyle",
    Label => "label",
    Linestyle => "linestyle",
    Linewidth => "linewidth",
    Lod => "lod",
    Marker => "marker",
    MarkerEdgeColor => "markeredgecolor",
    MarkerEdgeWidth => "markeredgewidth",
    MarkerFaceColor => "markerfacecolor",
    MarkerFaceColorAlt => "markerfacecoloralt",
    MarkerSize => "markersize",
    MarkEvery => "markevery",
    PickRadius => "pickradius",
    SolidCapstyle => "solid_capstyle",
    SolidJoinstyle => "solid_joinstyle",
    Visible => "visible",
    Zorder => "zorder",
}

impl fmt::Display for StyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type StyleMap = BTreeMap<StyleKey, StyleValue>;

/// Which y-axis a series is drawn against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisSide {
    #[default]
    Primary,
    Secondary,
}

impl AxisSide {
    pub fn index(self) -> usize {
        match self {
            AxisSide::Primary => 0,
            AxisSide::Secondary => 1,
        }
    }
}

/// Seconds discarded from the start and end of a series before computing a CDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cutoff {
    pub start: f64,
    pub end: f64,
}

/// Bottom and top percentile used to autoscale a y-axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaling {
    pub bottom: f64,
    pub top: f64,
}

impl Default for Scaling {
    fn default() -> Self {
        Self {
            bottom: 0.0,
            top: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSpec {
    pub data: String,
    pub axis: AxisSide,
    pub smoothing: bool,
    pub cutoff: Option<Cutoff>,
    pub style: StyleMap,
}

impl SeriesSpec {
    pub fn label(&self) -> Option<&str> {
        self.style.get(&StyleKey::Label).and_then(StyleValue::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeseriesPlot {
    pub series: Vec<SeriesSpec>,
    pub scaling: Scaling,
    pub dual_axes: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CdfPlot {
    pub series: Vec<SeriesSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetaPlot {
    pub subplots: Vec<PlotConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlotKind {
    Timeseries(TimeseriesPlot),
    Cdf(CdfPlot),
    Meta(MetaPlot),
}

/// A fully resolved plot configuration (parents applied, sub-plots expanded).
#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    pub name: String,
    pub description: Option<String>,
    pub legend_title: Option<String>,
    pub kind: PlotKind,
}

impl PlotConfig {
    pub fn plot_type(&self) -> PlotType {
        match self.kind {
            PlotKind::Timeseries(_) => PlotType::Timeseries,
            PlotKind::Cdf(_) => PlotType::Cdf,
            PlotKind::Meta(_) => PlotType::Meta,
        }
    }
}
