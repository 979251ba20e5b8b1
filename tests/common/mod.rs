#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

impl CmdResult {
    /// First stdout line parsed as JSON.
    pub fn json(&self) -> Value {
        let line = self.stdout.lines().next().unwrap_or_default();
        serde_json::from_str(line).unwrap_or_else(|e| {
            panic!("stdout is not JSON ({e}); log: {}", self.log_path.display())
        })
    }
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_iecat") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) { "iecat.exe" } else { "iecat" };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve iecat binary path for integration test"),
    }
}

/// Run `iecat` with `home` as `$HOME` so config, preferences and the activity
/// log stay inside the test's temp dir.
pub fn run_cli_case(case_name: &str, home: &Path, args: &[&str], envs: &[(&str, &str)]) -> CmdResult {
    let root = std::env::temp_dir().join("iecat-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");

    let log_path = root.join(format!("{}-{}.log", sanitize(case_name), now_millis()));
    let bin_path = resolve_bin_path();

    let mut command = Command::new(&bin_path);
    command
        .args(args)
        .env("HOME", home)
        .env("NO_COLOR", "1")
        .env("RUST_BACKTRACE", "1");
    for key in [
        "IECAT_CATALOG_ROOT",
        "IECAT_BATCH_SIZE",
        "IECAT_SEARCH_DEBOUNCE_MS",
        "IECAT_PREFETCH_ROWS",
        "IECAT_BUILDER_PARALLELISM",
        "IECAT_PREFERENCES_FILE",
        "IECAT_ACTIVITY_LOG",
        "IECAT_OUTPUT_FORMAT",
        "IECAT_OPENER",
    ] {
        command.env_remove(key);
    }
    command.envs(envs.iter().copied());
    let output = command.output().expect("execute iecat command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("args={args:?}\n"));
    log_content.push_str(&format!("status={}\n", output.status));
    log_content.push_str("----- stdout -----\n");
    log_content.push_str(&stdout);
    log_content.push('\n');
    log_content.push_str("----- stderr -----\n");
    log_content.push_str(&stderr);
    log_content.push('\n');
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

/// Lay out a small site: `count` documents spread over the three sections,
/// plus an `index.html` the builder must ignore.
pub fn write_site(root: &Path, count: usize) {
    let tests = root.join("tests");
    fs::create_dir_all(&tests).expect("create tests dir");
    fs::write(root.join("index.html"), "<html>index</html>").expect("write index");
    for i in 0..count {
        let section = ["reading", "listening", "writing"][i % 3];
        let name = format!("{section}-test-{i:03}.html");
        fs::write(tests.join(name), format!("<html>{section} {i}</html>")).expect("write doc");
    }
}

/// Write `data/tests.json` directly, bypassing the builder.
pub fn write_catalog(root: &Path, records: &Value) {
    let data = root.join("data");
    fs::create_dir_all(&data).expect("create data dir");
    fs::write(
        data.join("tests.json"),
        serde_json::to_vec_pretty(records).expect("encode records"),
    )
    .expect("write tests.json");
}
