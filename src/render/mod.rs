// Report formatters: selection by name, output sinks, and the shared Formatter trait.

mod backend;
mod figure;
mod plot;
mod table;

use std::convert::Infallible;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

use crate::config::ReportContext;
use crate::error::Result;
use crate::models::ResultSet;

pub use backend::{ImageFormat, PlottersBackend, RenderBackend};
pub use figure::{AxisSpec, Figure, Legend, Line, Panel, Scale};
pub use plot::PlotFormatter;
pub use table::{CsvFormatter, OrgTableFormatter};

/// Turns a list of results into one report artifact.
pub trait Formatter {
    fn format(&mut self, results: &[ResultSet]) -> Result<()>;
}

/// Where a report goes: `-` is the console, anything else a file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSink {
    Console,
    Path(PathBuf),
}

impl OutputSink {
    pub fn parse(s: &str) -> Self {
        if s == "-" {
            OutputSink::Console
        } else {
            OutputSink::Path(PathBuf::from(s))
        }
    }

    pub fn open(&self) -> Result<Box<dyn Write>> {
        Ok(match self {
            OutputSink::Console => Box::new(std::io::stdout().lock()),
            OutputSink::Path(path) => Box::new(BufWriter::new(File::create(path)?)),
        })
    }
}

impl FromStr for OutputSink {
    type Err = Infallible;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        Ok(OutputSink::parse(s))
    }
}

impl fmt::Display for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputSink::Console => f.write_str("-"),
            OutputSink::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatterKind {
    #[default]
    Null,
    OrgTable,
    Csv,
    Plot,
}

impl FromStr for FormatterKind {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "null" | "default" => Ok(FormatterKind::Null),
            "org_table" | "org" | "table" => Ok(FormatterKind::OrgTable),
            "csv" => Ok(FormatterKind::Csv),
            "plot" => Ok(FormatterKind::Plot),
            other => Err(format!("unknown formatter '{}'", other)),
        }
    }
}

/// Used when no formatter was chosen: reports that nothing was rendered.
pub struct NullFormatter;

impl Formatter for NullFormatter {
    fn format(&mut self, results: &[ResultSet]) -> Result<()> {
        warn!(results = results.len(), "no output formatter selected; nothing rendered");
        Ok(())
    }
}

/// Builds the selected formatter. The plot formatter resolves and checks its
/// configuration and output format here, before any data is read.
pub fn formatter_for<'a>(
    kind: FormatterKind,
    sink: &OutputSink,
    ctx: &'a ReportContext,
) -> Result<Box<dyn Formatter + 'a>> {
    Ok(match kind {
        FormatterKind::Null => Box::new(NullFormatter),
        FormatterKind::OrgTable => Box::new(OrgTableFormatter::new(sink.open()?, ctx)),
        FormatterKind::Csv => Box::new(CsvFormatter::new(sink.open()?, ctx)),
        FormatterKind::Plot => Box::new(PlotFormatter::new(sink, ctx)?),
    })
}
