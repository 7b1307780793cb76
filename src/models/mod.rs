// Domain models: measurement result sets and plot configuration records

mod plot;
mod result_set;

pub use plot::{
    AxisSide, CdfPlot, Cutoff, MetaPlot, PlotConfig, PlotEntry, PlotKind, PlotType, Scaling,
    SeriesEntry, SeriesSpec, StyleKey, StyleMap, StyleValue, TimeseriesPlot,
};
pub use result_set::{ResultSet, SeriesSource};
