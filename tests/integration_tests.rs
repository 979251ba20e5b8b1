//! Integration tests: CLI smoke tests and full build → list → open scenarios
//! driven through the `iecat` binary.

mod common;

use std::fs;
use std::path::Path;

use serde_json::{Value, json};

fn root_arg(root: &Path) -> String {
    root.to_string_lossy().into_owned()
}

fn titles(payload: &Value) -> Vec<String> {
    payload["records"]
        .as_array()
        .map(|records| {
            records
                .iter()
                .filter_map(|r| r["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// 120 records: 60 reading, 40 listening, 20 writing.
fn mixed_catalog() -> Value {
    let records: Vec<Value> = (0..120)
        .map(|i| {
            let category = match i {
                0..60 => "reading",
                60..100 => "listening",
                _ => "writing",
            };
            json!({
                "file": format!("tests/{category}-{i:03}.html"),
                "title": format!("{category} test {i:03}"),
                "category": category,
            })
        })
        .collect();
    Value::Array(records)
}

#[test]
fn help_command_prints_usage() {
    let home = tempfile::tempdir().unwrap();
    let result = common::run_cli_case("help_command_prints_usage", home.path(), &["--help"], &[]);
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stdout.contains("Usage: iecat [OPTIONS] <COMMAND>"),
        "missing help banner; log: {}",
        result.log_path.display()
    );
}

#[test]
fn subcommand_help_flags_work() {
    let home = tempfile::tempdir().unwrap();
    for sub in [
        "build",
        "list",
        "stats",
        "duplicates",
        "open",
        "browse",
        "prefs",
        "config",
        "completions",
        "version",
    ] {
        let result = common::run_cli_case(&format!("help_{sub}"), home.path(), &[sub, "--help"], &[]);
        assert!(
            result.status.success(),
            "{sub} --help failed; log: {}",
            result.log_path.display()
        );
    }
}

#[test]
fn build_then_list_round_trip() {
    let home = tempfile::tempdir().unwrap();
    let site = tempfile::tempdir().unwrap();
    common::write_site(site.path(), 9);
    let root = root_arg(site.path());

    let built = common::run_cli_case("build_round_trip", home.path(), &["build", &root, "--json"], &[]);
    assert!(built.status.success(), "build failed; log: {}", built.log_path.display());
    let report = built.json();
    assert_eq!(report["report"]["records"], 9);
    assert_eq!(report["report"]["totals"]["reading"], 3);
    assert_eq!(report["report"]["duplicate_groups"], 0);
    assert!(site.path().join("data/tests.json").exists());
    assert!(site.path().join("data/duplicates.json").exists());

    let listed = common::run_cli_case(
        "list_after_build",
        home.path(),
        &["--root", &root, "list", "--category", "listening", "--json"],
        &[],
    );
    assert!(listed.status.success(), "list failed; log: {}", listed.log_path.display());
    let payload = listed.json();
    assert_eq!(payload["total"], 9);
    assert_eq!(payload["filtered"], 3);
    assert_eq!(
        titles(&payload),
        vec!["listening-test-001", "listening-test-004", "listening-test-007"]
    );
}

#[test]
fn identical_documents_are_reported_as_duplicates() {
    let home = tempfile::tempdir().unwrap();
    let site = tempfile::tempdir().unwrap();
    common::write_site(site.path(), 3);
    fs::write(site.path().join("tests/reading-copy.html"), "<html>reading 0</html>").unwrap();
    let root = root_arg(site.path());

    let built = common::run_cli_case("build_dups", home.path(), &["build", &root, "--json"], &[]);
    assert!(built.status.success(), "log: {}", built.log_path.display());

    let dups = common::run_cli_case("duplicates", home.path(), &["--root", &root, "duplicates", "--json"], &[]);
    assert!(dups.status.success(), "log: {}", dups.log_path.display());
    let payload = dups.json();
    assert_eq!(payload["count"], 1);
    assert_eq!(
        payload["groups"][0]["files"],
        json!(["tests/reading-copy.html", "tests/reading-test-000.html"])
    );
    assert_eq!(payload["groups"][0]["hash_prefix"].as_str().map(str::len), Some(12));
}

#[test]
fn missing_duplicates_file_means_zero_groups() {
    let home = tempfile::tempdir().unwrap();
    let site = tempfile::tempdir().unwrap();
    common::write_catalog(site.path(), &mixed_catalog());
    let root = root_arg(site.path());

    let stats = common::run_cli_case("stats_no_dups", home.path(), &["--root", &root, "stats", "--json"], &[]);
    assert!(stats.status.success(), "log: {}", stats.log_path.display());
    let payload = stats.json();
    assert_eq!(payload["totals"]["all"], 120);
    assert_eq!(payload["totals"]["reading"], 60);
    assert_eq!(payload["duplicate_groups"], 0);

    let human = common::run_cli_case(
        "duplicates_none_human",
        home.path(),
        &["--root", &root, "duplicates"],
        &[("IECAT_OUTPUT_FORMAT", "human")],
    );
    assert!(human.status.success());
    assert_eq!(human.stdout.trim(), "No duplicate files found.");
}

#[test]
fn list_pages_through_the_lazy_pager() {
    let home = tempfile::tempdir().unwrap();
    let site = tempfile::tempdir().unwrap();
    common::write_catalog(site.path(), &mixed_catalog());
    let root = root_arg(site.path());

    let first = common::run_cli_case("list_page_1", home.path(), &["--root", &root, "list", "--json"], &[]);
    let payload = first.json();
    assert_eq!(payload["visible"], 50);
    assert_eq!(payload["phase"], "partial");

    let second = common::run_cli_case("list_page_2", home.path(), &["--root", &root, "list", "--page", "2", "--json"], &[]);
    assert_eq!(second.json()["visible"], 100);

    let all = common::run_cli_case("list_all", home.path(), &["--root", &root, "list", "--all", "--json"], &[]);
    let payload = all.json();
    assert_eq!(payload["visible"], 120);
    assert_eq!(payload["phase"], "complete");

    let reading = common::run_cli_case(
        "list_reading_page_2",
        home.path(),
        &["--root", &root, "list", "--category", "reading", "--page", "2", "--json"],
        &[],
    );
    let payload = reading.json();
    assert_eq!(payload["filtered"], 60);
    assert_eq!(payload["visible"], 60);
    assert_eq!(payload["phase"], "complete");
}

#[test]
fn date_sort_puts_undated_titles_last() {
    let home = tempfile::tempdir().unwrap();
    let site = tempfile::tempdir().unwrap();
    common::write_catalog(
        site.path(),
        &json!([
            {"file": "a.html", "title": "No date here", "category": "reading"},
            {"file": "b.html", "title": "Test 12.1.23", "category": "reading"},
            {"file": "c.html", "title": "Đề 5.3.24", "category": "reading"},
        ]),
    );
    let root = root_arg(site.path());

    let result = common::run_cli_case(
        "date_sort",
        home.path(),
        &["--root", &root, "list", "--sort", "date-desc", "--json"],
        &[],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert_eq!(titles(&result.json()), vec!["Đề 5.3.24", "Test 12.1.23", "No date here"]);
}

#[test]
fn saved_selection_is_restored_and_corrupt_prefs_fall_back() {
    let home = tempfile::tempdir().unwrap();
    let site = tempfile::tempdir().unwrap();
    common::write_catalog(site.path(), &mixed_catalog());
    let root = root_arg(site.path());

    let saved = common::run_cli_case(
        "list_save",
        home.path(),
        &["--root", &root, "list", "--category", "writing", "--sort", "za", "--save", "--json"],
        &[],
    );
    assert!(saved.status.success(), "log: {}", saved.log_path.display());

    let restored = common::run_cli_case("list_restored", home.path(), &["--root", &root, "list", "--json"], &[]);
    let payload = restored.json();
    assert_eq!(payload["filters"], json!({"category": "writing", "query": "", "sort": "za"}));
    assert_eq!(payload["filtered"], 20);

    let prefs_path = home.path().join(".config/iecat/filters.json");
    fs::write(&prefs_path, "{not json").unwrap();
    let fallback = common::run_cli_case("list_corrupt_prefs", home.path(), &["--root", &root, "list", "--json"], &[]);
    assert!(fallback.status.success(), "log: {}", fallback.log_path.display());
    let payload = fallback.json();
    assert_eq!(payload["filters"], json!({"category": "all", "query": "", "sort": "az"}));
    assert_eq!(payload["filtered"], 120);

    let reset = common::run_cli_case("prefs_reset", home.path(), &["prefs", "reset", "--json"], &[]);
    assert_eq!(reset.json()["removed"], true);
    assert!(!prefs_path.exists());
}

#[test]
fn missing_catalog_exits_with_runtime_code() {
    let home = tempfile::tempdir().unwrap();
    let site = tempfile::tempdir().unwrap();
    let root = root_arg(site.path());

    let result = common::run_cli_case("list_missing", home.path(), &["--root", &root, "list", "--json"], &[]);
    assert_eq!(result.status.code(), Some(2), "log: {}", result.log_path.display());
    assert!(result.stderr.contains("Could not read data. Check the files in data/."));
    assert!(result.stdout.is_empty());
}

#[test]
fn build_without_documents_is_a_user_error() {
    let home = tempfile::tempdir().unwrap();
    let site = tempfile::tempdir().unwrap();
    fs::write(site.path().join("index.html"), "<html></html>").unwrap();
    let root = root_arg(site.path());

    let result = common::run_cli_case("build_empty", home.path(), &["build", &root], &[]);
    assert_eq!(result.status.code(), Some(1), "log: {}", result.log_path.display());
    assert!(result.stderr.contains("IEC-2003"));
    assert!(!site.path().join("data/tests.json").exists());
}

#[cfg(unix)]
#[test]
fn open_hands_the_document_to_the_configured_opener() {
    let home = tempfile::tempdir().unwrap();
    let site = tempfile::tempdir().unwrap();
    common::write_site(site.path(), 3);
    let root = root_arg(site.path());
    let built = common::run_cli_case("open_build", home.path(), &["build", &root], &[]);
    assert!(built.status.success(), "log: {}", built.log_path.display());

    let opened = common::run_cli_case(
        "open_by_title",
        home.path(),
        &["--root", &root, "open", "writing-test", "--json"],
        &[("IECAT_OPENER", "true")],
    );
    assert!(opened.status.success(), "log: {}", opened.log_path.display());
    let payload = opened.json();
    assert_eq!(payload["file"], "tests/writing-test-002.html");
    assert_eq!(payload["opener"], "true");

    let missing = common::run_cli_case(
        "open_unknown",
        home.path(),
        &["--root", &root, "open", "speaking"],
        &[("IECAT_OPENER", "true")],
    );
    assert_eq!(missing.status.code(), Some(1));
}

#[test]
fn activity_log_records_builds_and_loads() {
    let home = tempfile::tempdir().unwrap();
    let site = tempfile::tempdir().unwrap();
    common::write_site(site.path(), 3);
    let root = root_arg(site.path());
    let log = home.path().join("activity.jsonl");
    let log_arg = root_arg(&log);
    let envs = [("IECAT_ACTIVITY_LOG", log_arg.as_str())];

    common::run_cli_case("log_build", home.path(), &["build", &root, "--json"], &envs);
    common::run_cli_case("log_list", home.path(), &["--root", &root, "list", "--json"], &envs);

    let events: Vec<String> = fs::read_to_string(&log)
        .unwrap()
        .lines()
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .filter_map(|entry| entry["event"].as_str().map(str::to_string))
        .collect();
    assert!(events.contains(&"catalog_built".to_string()), "{events:?}");
    assert!(events.contains(&"catalog_loaded".to_string()), "{events:?}");
    assert!(events.contains(&"filters_applied".to_string()), "{events:?}");
}

#[test]
fn invalid_config_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let cfg = home.path().join("bad.toml");
    fs::write(&cfg, "[browse]\nbatch_size = 0\n").unwrap();
    let cfg_arg = root_arg(&cfg);

    let result = common::run_cli_case("config_invalid", home.path(), &["--config", &cfg_arg, "config", "validate", "--json"], &[]);
    assert_eq!(result.status.code(), Some(1));
    assert_eq!(result.json()["valid"], false);
}
