// Report error taxonomy. Config and alignment errors abort the report; callers
// decide whether NoData / EmptyData are recoverable for the plot at hand.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("unable to find plot configuration '{0}'")]
    ConfigNotFound(String),

    #[error("plot configuration '{plot}' has a cyclic parent chain: {chain}")]
    ParentCycle { plot: String, chain: String },

    #[error("invalid plot configuration '{plot}': {reason}")]
    InvalidConfig { plot: String, reason: String },

    /// x-values of two combined results differ at the same row.
    #[error("x-value mismatch at row {row}: {expected}/{found}. Incompatible data sets?")]
    Alignment {
        row: usize,
        expected: f64,
        found: f64,
    },

    #[error("plot axis unit mismatch: {first}/{second}")]
    UnitMismatch { first: String, second: String },

    #[error("no data to plot for '{0}'")]
    NoData(String),

    #[error("cannot scale an axis over an empty data set")]
    EmptyData,

    #[error("unrecognised file format for output '{0}'")]
    UnsupportedFormat(String),

    #[error("no rendering backend available for {0}")]
    MissingRenderingBackend(String),

    #[error("failed to draw plot: {0}")]
    Drawing(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("malformed result set: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, ReportError>;
