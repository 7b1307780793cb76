// Settings loading and validation tests

mod common;

use benchplot::config::{ReportContext, Settings};
use common::BASE_SETTINGS;

#[test]
fn test_config_loads_from_str() {
    let settings = Settings::load_from_str(BASE_SETTINGS).expect("load_from_str");
    assert_eq!(settings.report.plot, "ping");
    assert_eq!(settings.report.step_size, 1.0);
    assert_eq!(settings.report.total_length, 70.0);
    assert_eq!(
        settings.data_set_names(),
        vec!["Ping (ms)", "TCP upload", "TCP download"]
    );
    assert_eq!(settings.data_set("TCP upload").unwrap().units, "Mbits/s");
    assert_eq!(settings.plots.len(), 5);
}

#[test]
fn test_config_defaults_when_omitted() {
    let settings = Settings::load_from_str(BASE_SETTINGS).expect("valid");
    assert!(settings.report.annotate);
    assert_eq!(settings.report.smoothing_window, 5);
    assert!(settings.report.scale_data.is_empty());
}

#[test]
fn test_config_validation_rejects_empty_plot() {
    let bad = BASE_SETTINGS.replace("plot = \"ping\"", "plot = \"\"");
    let err = Settings::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("report.plot"));
}

#[test]
fn test_config_validation_rejects_step_size_zero() {
    let bad = BASE_SETTINGS.replace("step_size = 1.0", "step_size = 0.0");
    let err = Settings::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("report.step_size"));
}

#[test]
fn test_config_validation_rejects_negative_length() {
    let bad = BASE_SETTINGS.replace("length = 60.0", "length = -1.0");
    let err = Settings::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("report.length"));
}

#[test]
fn test_config_validation_rejects_smoothing_window_zero() {
    let bad = BASE_SETTINGS.replace("step_size = 1.0", "step_size = 1.0\nsmoothing_window = 0");
    let err = Settings::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("report.smoothing_window"));
}

#[test]
fn test_config_validation_rejects_empty_units() {
    let bad = BASE_SETTINGS.replace("units = \"ms\"", "units = \"\"");
    let err = Settings::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("data_sets.units"));
}

#[test]
fn test_config_validation_rejects_duplicate_data_set() {
    let bad = BASE_SETTINGS.replace("name = \"TCP download\"", "name = \"TCP upload\"");
    let err = Settings::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("data_sets.name"));
}

#[test]
fn test_config_rejects_unknown_plot_field() {
    let bad = BASE_SETTINGS.replace("dual_axes = true", "dual_axis = true");
    assert!(Settings::load_from_str(&bad).is_err());
}

#[test]
fn test_config_validation_rejects_invalid_toml() {
    let err = Settings::load_from_str("not valid toml [[[").unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_config_load_from_file_via_env() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("benchplot.toml");
    std::fs::write(&path, BASE_SETTINGS).unwrap();
    unsafe { std::env::set_var("CONFIG_FILE", path.to_str().unwrap()) };
    let result = Settings::load();
    unsafe { std::env::remove_var("CONFIG_FILE") };
    let settings = result.expect("load from CONFIG_FILE");
    assert_eq!(settings.report.plot, "ping");
    assert_eq!(settings.data_sets.len(), 3);
}

#[test]
fn test_config_missing_file_names_path() {
    let err = Settings::load_from_path(std::path::Path::new("/nonexistent/benchplot.toml"))
        .unwrap_err();
    assert!(format!("{:#}", err).contains("/nonexistent/benchplot.toml"));
}

#[test]
fn test_context_loads_scale_data_files() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("reference.json");
    std::fs::write(
        &path,
        r#"{"x_values": [0.0, 1.0], "results": {"Ping (ms)": [1.0, 500.0]}}"#,
    )
    .unwrap();
    let toml = BASE_SETTINGS.replace(
        "step_size = 1.0",
        &format!(
            "step_size = 1.0\nsmoothing_window = 3\nscale_data = [\"{}\"]",
            path.display()
        ),
    );
    let settings = Settings::load_from_str(&toml).expect("valid");
    let ctx = ReportContext::load(settings).expect("scale data loads");
    assert_eq!(ctx.scale_data.len(), 1);
    assert_eq!(ctx.scale_data[0].x_values, vec![0.0, 1.0]);
    assert_eq!(ctx.scale_data[0].smoothing_window, 3);
}

#[test]
fn test_context_fails_on_missing_scale_data() {
    let toml = BASE_SETTINGS.replace(
        "step_size = 1.0",
        "step_size = 1.0\nscale_data = [\"/nonexistent/reference.json\"]",
    );
    let settings = Settings::load_from_str(&toml).expect("valid");
    let err = ReportContext::load(settings).unwrap_err();
    assert!(format!("{:#}", err).contains("scale data"));
}
