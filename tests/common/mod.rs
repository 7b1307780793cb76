// Shared test helpers
#![allow(dead_code)]

use benchplot::config::{ReportContext, Settings};
use benchplot::models::ResultSet;

pub const BASE_SETTINGS: &str = r#"
[report]
plot = "ping"
title = "run A"
description = "RRUL test"
local_host = "client"
host = "server"
time = "2026-01-01 12:00"
length = 60.0
total_length = 70.0
step_size = 1.0

[[data_sets]]
name = "Ping (ms)"
units = "ms"

[[data_sets]]
name = "TCP upload"
units = "Mbits/s"

[[data_sets]]
name = "TCP download"
units = "Mbits/s"

[plots.ping]
type = "timeseries"
description = "Ping"
series = [{ data = "Ping (ms)", label = "Ping" }]

[plots.all]
type = "timeseries"
description = "All flows"
dual_axes = true
legend_title = "Flows"
scaling = [5.0, 95.0]
series = [
    { data = "TCP upload", label = "Upload" },
    { data = "TCP download", label = "Download", color = "red" },
    { data = "Ping (ms)", label = "Ping", axis = 2 },
]

[plots.ping_cdf]
type = "cdf"
description = "Ping CDF"
series = [{ data = "Ping (ms)", label = "Ping" }]

[plots.tcp_cdf]
parent = "ping_cdf"
description = "TCP CDF"
series = [
    { data = "TCP upload", label = "Up" },
    { data = "TCP download", label = "Down" },
]

[plots.box]
type = "meta"
description = "Combined"
subplots = ["all", "ping_cdf"]
"#;

/// Base settings rendering `plot`, with `extra` TOML appended (more plots, usually).
pub fn settings_with(plot: &str, extra: &str) -> Settings {
    let toml = format!(
        "{}\n{}",
        BASE_SETTINGS.replace("plot = \"ping\"", &format!("plot = \"{}\"", plot)),
        extra
    );
    Settings::load_from_str(&toml).expect("valid test settings")
}

pub fn context(plot: &str) -> ReportContext {
    ReportContext::new(settings_with(plot, ""))
}

/// A run with x-values `0, 1, ..., n-1` and no series yet.
pub fn run(n: usize) -> ResultSet {
    ResultSet::new((0..n).map(|i| i as f64).collect())
}

pub fn present(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(Some).collect()
}

/// A titled run carrying every configured data set.
pub fn full_run(title: &str, n: usize) -> ResultSet {
    run(n)
        .with_meta("NAME", "rrul")
        .with_meta("TITLE", title)
        .with_series("Ping (ms)", (0..n).map(|i| Some(10.0 + i as f64)).collect())
        .with_series("TCP upload", (0..n).map(|i| Some(5.0 + (i % 3) as f64)).collect())
        .with_series("TCP download", (0..n).map(|i| Some(100.0 + 10.0 * i as f64)).collect())
}
