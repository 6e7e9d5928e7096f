use std::fs;
use svgguard::config::settings::{Config, ConfigError};
use svgguard::detection::{ScanLevel, ThreatCategory};
use tempfile::TempDir;

#[test]
fn config_loads_from_toml_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
        [scan]
        level = "standard"
        recursive = true

        [sanitize]
        remove_all = false
        remove_scripts = true

        [report]
        project = "brand-icons"
        version = "3.0.0"

        [audit]
        enabled = true
        path = "/var/log/svgguard/audit.log"
    "#;
    fs::write(&config_path, toml_content).unwrap();

    let config = Config::from_file(&config_path).unwrap();

    assert_eq!(config.scan.level, ScanLevel::Standard);
    assert!(config.scan.recursive);
    assert!(config.sanitize.remove_scripts);
    assert!(!config.sanitize.remove_all);
    assert!(config.sanitize.selects(ThreatCategory::Script));
    assert!(!config.sanitize.selects(ThreatCategory::EventHandler));
    assert_eq!(config.report.project, "brand-icons");
    assert_eq!(config.report.version, "3.0.0");
    assert_eq!(config.report.generated_by, "svgguard security-scan");
    assert!(config.audit.enabled);
}

#[test]
fn config_uses_defaults_when_missing() {
    let config = Config::default();

    assert_eq!(config.scan.level, ScanLevel::Strict);
    assert!(!config.scan.recursive);
    assert!(config.sanitize.remove_all);
    assert_eq!(config.report.project, "svg-icons");
    assert_eq!(config.report.version, env!("CARGO_PKG_VERSION"));
    assert!(!config.audit.enabled);
    assert!(config.audit.path.ends_with("svgguard/audit.log"));
}

#[test]
fn partial_config_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[report]\nproject = \"x\"\n").unwrap();

    let config = Config::from_file(&config_path).unwrap();

    assert_eq!(config.report.project, "x");
    assert_eq!(config.report.generated_by, "svgguard security-scan");
    assert_eq!(config.scan.level, ScanLevel::Strict);
    assert!(config.sanitize.remove_all);
}

#[test]
fn empty_config_is_default() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "").unwrap();

    let config = Config::from_file(&config_path).unwrap();
    assert_eq!(config.scan.level, ScanLevel::Strict);
}

#[test]
fn invalid_scan_level_is_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[scan]\nlevel = \"paranoid\"\n").unwrap();

    let err = Config::from_file(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn missing_explicit_config_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = Config::load_or_default(Some(&temp_dir.path().join("none.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::IoError(_)));
}

#[test]
fn explicit_config_is_loaded() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[scan]\nlevel = \"standard\"\n").unwrap();

    let config = Config::load_or_default(Some(&config_path)).unwrap();
    assert_eq!(config.scan.level, ScanLevel::Standard);
}

#[test]
fn config_roundtrips_through_toml() {
    let mut config = Config::default();
    config.scan.level = ScanLevel::Standard;
    config.report.project = "roundtrip".to_string();

    let toml = config.to_toml().unwrap();
    assert!(toml.contains("level = \"standard\""));
    assert!(toml.contains("[sanitize]"));

    let parsed: Config = toml::from_str(&toml).unwrap();
    assert_eq!(parsed.scan.level, ScanLevel::Standard);
    assert_eq!(parsed.report.project, "roundtrip");
    assert_eq!(parsed.sanitize, config.sanitize);
}

#[test]
fn default_config_path_is_namespaced() {
    let path = Config::default_config_path();
    assert!(path.ends_with("svgguard/config.toml"));
}
