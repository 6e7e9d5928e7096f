mod common;

use common::{svgguard_cmd, write_svg, CLEAN_SVG, EVENT_SVG, KITCHEN_SINK_SVG, SCRIPT_SVG, STYLE_SVG};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

// ─── General ────────────────────────────────────────────────────

#[test]
fn cli_shows_help() {
    svgguard_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("svgguard"))
        .stdout(predicate::str::contains("sanitize"))
        .stdout(predicate::str::contains("report"));
}

#[test]
fn cli_shows_version() {
    svgguard_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_requires_subcommand() {
    svgguard_cmd().assert().failure();
}

// ─── scan ───────────────────────────────────────────────────────

#[test]
fn scan_clean_file_exits_zero() {
    let temp = TempDir::new().unwrap();
    let path = write_svg(temp.path(), "clean.svg", CLEAN_SVG);

    svgguard_cmd()
        .arg("scan")
        .arg(&path)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("✓"))
        .stdout(predicate::str::contains("0 threat(s) found"));
}

#[test]
fn scan_script_file_exits_one() {
    let temp = TempDir::new().unwrap();
    let path = write_svg(temp.path(), "bad.svg", SCRIPT_SVG);

    svgguard_cmd()
        .arg("scan")
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("✗"))
        .stdout(predicate::str::contains("[critical] script: script element"))
        .stdout(predicate::str::contains("1 threat(s) found"));
}

#[test]
fn scan_text_lines_are_ascii_separated() {
    let temp = TempDir::new().unwrap();
    let path = write_svg(temp.path(), "bad.svg", SCRIPT_SVG);

    svgguard_cmd()
        .arg("scan")
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "[critical] script: script element - <script>alert(1)</script>",
        ))
        .stdout(predicate::str::contains("—").not());
}

#[test]
fn scan_standard_level_ignores_style() {
    let temp = TempDir::new().unwrap();
    let path = write_svg(temp.path(), "style.svg", STYLE_SVG);

    svgguard_cmd()
        .args(["scan", "--level", "standard"])
        .arg(&path)
        .assert()
        .code(0);

    svgguard_cmd()
        .args(["scan", "--level", "strict"])
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[low] style_block"));
}

#[test]
fn scan_directory_json_output() {
    let temp = TempDir::new().unwrap();
    write_svg(temp.path(), "a.svg", CLEAN_SVG);
    write_svg(temp.path(), "b.svg", SCRIPT_SVG);
    write_svg(temp.path(), "sub/c.svg", SCRIPT_SVG);

    let output = svgguard_cmd()
        .args(["scan", "--format", "json"])
        .arg(temp.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["files_scanned"], 2);
    assert_eq!(json["secure_files"], 1);
    assert_eq!(json["results"][1]["threats"][0]["category"], "script");
    assert_eq!(json["results"][1]["threats"][0]["severity"], "critical");
}

#[test]
fn scan_directory_recursive() {
    let temp = TempDir::new().unwrap();
    write_svg(temp.path(), "a.svg", CLEAN_SVG);
    write_svg(temp.path(), "sub/c.svg", SCRIPT_SVG);

    svgguard_cmd()
        .args(["scan", "--recursive"])
        .arg(temp.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("2 file(s) scanned"));
}

#[test]
fn scan_single_file_json_has_hash() {
    let temp = TempDir::new().unwrap();
    let path = write_svg(temp.path(), "clean.svg", CLEAN_SVG);

    let output = svgguard_cmd()
        .args(["scan", "-F", "json"])
        .arg(&path)
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["content_hash"].as_str().unwrap().len(), 64);
}

#[test]
fn scan_quiet_prints_nothing() {
    let temp = TempDir::new().unwrap();
    let path = write_svg(temp.path(), "bad.svg", SCRIPT_SVG);

    svgguard_cmd()
        .args(["scan", "--quiet"])
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());
}

#[test]
fn scan_missing_file_exits_two() {
    svgguard_cmd()
        .args(["scan", "/nonexistent/icon.svg"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn scan_uses_level_from_config() {
    let temp = TempDir::new().unwrap();
    let path = write_svg(temp.path(), "style.svg", STYLE_SVG);
    let config = temp.path().join("config.toml");
    fs::write(&config, "[scan]\nlevel = \"standard\"\n").unwrap();

    svgguard_cmd()
        .arg("--config")
        .arg(&config)
        .arg("scan")
        .arg(&path)
        .assert()
        .code(0);
}

#[test]
fn invalid_config_exits_two() {
    let temp = TempDir::new().unwrap();
    let path = write_svg(temp.path(), "clean.svg", CLEAN_SVG);
    let config = temp.path().join("config.toml");
    fs::write(&config, "[scan\nlevel=").unwrap();

    svgguard_cmd()
        .arg("--config")
        .arg(&config)
        .arg("scan")
        .arg(&path)
        .assert()
        .code(2);
}

// ─── sanitize ───────────────────────────────────────────────────

#[test]
fn sanitize_removes_everything_by_default() {
    let temp = TempDir::new().unwrap();
    let input = write_svg(temp.path(), "in.svg", SCRIPT_SVG);
    let output = temp.path().join("out.svg");

    svgguard_cmd()
        .arg("sanitize")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("1 threat(s) removed"));

    assert_eq!(fs::read_to_string(&output).unwrap(), "<svg><rect/></svg>");
}

#[test]
fn sanitize_event_handlers_only() {
    let temp = TempDir::new().unwrap();
    let input = write_svg(temp.path(), "in.svg", EVENT_SVG);
    let output = temp.path().join("out.svg");

    svgguard_cmd()
        .arg("sanitize")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .arg("--event-handlers")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("2 threat(s) removed"));

    let written = fs::read_to_string(&output).unwrap();
    assert!(!written.contains("onclick="));
    assert!(!written.contains("onload="));
}

#[test]
fn sanitize_reports_untouched_categories() {
    let temp = TempDir::new().unwrap();
    let input = write_svg(temp.path(), "in.svg", KITCHEN_SINK_SVG);
    let output = temp.path().join("out.svg");

    svgguard_cmd()
        .arg("sanitize")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--all")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("style_block not removed"));
}

#[test]
fn sanitize_scripts_only_keeps_event_handlers() {
    let temp = TempDir::new().unwrap();
    let input = write_svg(
        temp.path(),
        "in.svg",
        r#"<svg onload="x()"><script>y()</script></svg>"#,
    );
    let output = temp.path().join("out.svg");

    svgguard_cmd()
        .arg("sanitize")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--scripts")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("event_handler not removed"));

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        r#"<svg onload="x()"></svg>"#
    );
}

#[test]
fn sanitize_missing_input_exits_two() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("out.svg");

    svgguard_cmd()
        .arg("sanitize")
        .arg(temp.path().join("missing.svg"))
        .arg("-o")
        .arg(&output)
        .assert()
        .code(2);

    assert!(!output.exists());
}

// ─── report ─────────────────────────────────────────────────────

#[test]
fn report_prints_json_and_fails_on_no_go() {
    let temp = TempDir::new().unwrap();
    write_svg(temp.path(), "a.svg", SCRIPT_SVG);
    write_svg(temp.path(), "b.svg", CLEAN_SVG);

    let output = svgguard_cmd()
        .args(["report", "--project", "brand", "--version", "9.9.9"])
        .arg(temp.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], "NO-GO");
    assert_eq!(json["project"], "brand");
    assert_eq!(json["version"], "9.9.9");
}

#[test]
fn report_clean_directory_is_go() {
    let temp = TempDir::new().unwrap();
    write_svg(temp.path(), "a.svg", CLEAN_SVG);

    svgguard_cmd()
        .arg("report")
        .arg(temp.path())
        .assert()
        .code(0)
        .stdout(predicate::str::contains("\"status\": \"GO\""))
        .stdout(predicate::str::contains("\"project\": \"svg-icons\""));
}

#[test]
fn report_empty_directory_is_go() {
    let temp = TempDir::new().unwrap();

    svgguard_cmd()
        .arg("report")
        .arg(temp.path())
        .assert()
        .code(0)
        .stdout(predicate::str::contains("\"status\": \"GO\""))
        .stdout(predicate::str::contains("ACTION ITEMS").not());
}

#[test]
fn report_writes_file() {
    let temp = TempDir::new().unwrap();
    write_svg(temp.path(), "icons/a.svg", STYLE_SVG);
    let out = temp.path().join("report.json");

    svgguard_cmd()
        .arg("report")
        .arg(temp.path().join("icons"))
        .arg("-o")
        .arg(&out)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Report written to"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["status"], "WARN");
}

// ─── rules / config ─────────────────────────────────────────────

#[test]
fn rules_list_shows_catalog() {
    svgguard_cmd()
        .args(["rules", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("script (severity: critical)"))
        .stdout(predicate::str::contains("style_block (severity: low)"))
        .stdout(predicate::str::contains("foreignObject element"))
        .stdout(predicate::str::contains("pattern(s) in 7 categories"));
}

#[test]
fn config_init_and_show() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested/config.toml");

    svgguard_cmd()
        .args(["config", "init", "--path"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("[scan]"));
    assert!(written.contains("[report]"));

    svgguard_cmd()
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("project = \"svg-icons\""));
}

#[test]
fn config_init_refuses_to_overwrite() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "[report]\nproject = \"mine\"\n").unwrap();

    svgguard_cmd()
        .args(["config", "init", "--path"])
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--force"));
    assert!(fs::read_to_string(&path).unwrap().contains("mine"));

    svgguard_cmd()
        .args(["config", "init", "--force", "--path"])
        .arg(&path)
        .assert()
        .success();
    assert!(fs::read_to_string(&path).unwrap().contains("svg-icons"));
}

#[test]
fn config_show_missing_explicit_file_fails() {
    svgguard_cmd()
        .args(["--config", "/nonexistent/svgguard.toml", "config", "show"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn config_show_without_file_prints_defaults() {
    svgguard_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No config file found"))
        .stdout(predicate::str::contains("remove_all = true"));
}

#[test]
fn json_logging_goes_to_stderr() {
    let temp = TempDir::new().unwrap();
    let path = write_svg(temp.path(), "clean.svg", CLEAN_SVG);

    let output = svgguard_cmd()
        .args(["--log-level", "info", "--log-format", "json", "scan", "-F", "json"])
        .arg(&path)
        .output()
        .unwrap();

    // stdout stays parseable
    let _: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(String::from_utf8_lossy(&output.stderr).contains("Scan complete"));
}
