// Backend-independent description of a rendered chart.

use crate::models::StyleMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    #[default]
    Linear,
    Log,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AxisSpec {
    pub label: Option<String>,
    /// Fixed bounds; `None` lets the backend fit the drawn data.
    pub range: Option<(f64, f64)>,
    pub scale: Scale,
}

/// One drawn line. `axis` indexes the panel's y-axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub axis: usize,
    pub label: Option<String>,
    pub points: Vec<(f64, Option<f64>)>,
    pub style: StyleMap,
}

/// Merged legend of every axis in a panel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Legend {
    pub title: Option<String>,
    pub entries: Vec<String>,
}

/// One chart area: a shared x-axis and one or two y-axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub x_axis: AxisSpec,
    pub y_axes: Vec<AxisSpec>,
    pub lines: Vec<Line>,
    pub legend: Legend,
}

impl Panel {
    pub fn lines_on(&self, axis: usize) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(move |l| l.axis == axis)
    }
}

/// A whole chart: title, stacked panels sharing the x-axis, optional footer.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub annotation: Option<String>,
    pub panels: Vec<Panel>,
}
