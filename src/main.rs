use std::path::PathBuf;

use anyhow::{Context, Result};
use benchplot::config::{ReportContext, Settings};
use benchplot::models::ResultSet;
use benchplot::render::{FormatterKind, OutputSink, formatter_for};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

/// Render benchmark result sets as tables or plots.
#[derive(Parser, Debug)]
#[command(name = "benchplot", version)]
struct Cli {
    /// Settings file; defaults to $CONFIG_FILE or ./benchplot.toml.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output formatter: null, org_table, csv or plot.
    #[arg(short, long, default_value = "null")]
    format: FormatterKind,

    /// Output destination; `-` writes to stdout.
    #[arg(short, long, default_value = "-")]
    output: OutputSink,

    /// Plot to render, overriding report.plot from the settings.
    #[arg(short, long)]
    plot: Option<String>,

    /// Result set files (JSON), compared in the order given.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from_path(path)?,
        None => Settings::load()?,
    };
    if let Some(plot) = cli.plot {
        settings.report.plot = plot;
    }

    let mut results = Vec::with_capacity(cli.inputs.len());
    for path in &cli.inputs {
        let mut set = ResultSet::load(path)
            .with_context(|| format!("loading result set {}", path.display()))?;
        set.smoothing_window = settings.report.smoothing_window;
        results.push(set);
    }
    tracing::info!(
        results = results.len(),
        format = ?cli.format,
        output = %cli.output,
        "rendering report"
    );

    let ctx = ReportContext::load(settings)?;
    let mut formatter = formatter_for(cli.format, &cli.output, &ctx)?;
    formatter.format(&results)?;
    Ok(())
}
