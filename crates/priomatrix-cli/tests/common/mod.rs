//! Common utilities for CLI E2E tests.

use std::path::Path;
use std::process::Command;

/// Invoke a CLI command against `root` and return (stdout, stderr, code).
pub fn run_cli(root: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "priomatrix-cli", "--"])
        .args(args)
        .arg("--root")
        .arg(root)
        .env("PRIOMATRIX_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run the built binary directly with `HOME` pointed at `home`.
pub fn run_bin_with_home(root: &Path, home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_priomatrix-cli"))
        .args(args)
        .arg("--root")
        .arg(root)
        .env("HOME", home)
        .env("PRIOMATRIX_ENV", "dev")
        .output()
        .expect("Failed to execute CLI binary");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Invoke a CLI command and expect success.
pub fn run_cli_success(root: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(root, args);
    assert_eq!(code, 0, "CLI command failed with code {code}: {args:?}\n{stderr}");
    stdout
}

/// Parse JSON output from CLI.
pub fn parse_json(json: &str) -> serde_json::Value {
    serde_json::from_str(json).expect("Failed to parse JSON output")
}

/// Write `value` as JSON into `dir/name` and return the path as a string.
pub fn write_input(dir: &Path, name: &str, value: &serde_json::Value) -> String {
    let path = dir.join(name);
    std::fs::write(&path, value.to_string()).unwrap();
    path.to_string_lossy().into_owned()
}
