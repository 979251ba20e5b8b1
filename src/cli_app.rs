//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use ielts_catalog::browse::date_key::current_year;
use ielts_catalog::browse::filter::{CategoryFilter, FilterState, SortMode, title_matches};
use ielts_catalog::browse::preferences::{self, LoadOutcome, SessionOverrides};
use ielts_catalog::browse::view::{CatalogView, STATUS_LOAD_FAILED};
use ielts_catalog::builder::{BuildReport, build_catalog};
use ielts_catalog::catalog::loader::{SiteData, load_site};
use ielts_catalog::catalog::record::TestRecord;
use ielts_catalog::catalog::stats::{
    CategoryTotals, NO_DUPLICATES, duplicate_lines, summarize_duplicates,
};
use ielts_catalog::core::config::Config;
use ielts_catalog::core::errors::CatalogError;
use ielts_catalog::core::paths::resolve_site_file;
use ielts_catalog::logger::jsonl::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};
use ielts_catalog::platform::opener::detect_opener;
use ielts_catalog::tui::theme::ColorMode;
use ielts_catalog::tui::{BrowserConfig, run_browser};

/// IELTS catalog: build and browse a static catalog of IELTS test documents.
#[derive(Debug, Parser)]
#[command(
    name = "iecat",
    author,
    version,
    about = "IELTS Catalog - build, search and browse IELTS test documents",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Site root holding `data/tests.json` (overrides config).
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Scan the site for test documents and write the catalog data files.
    Build(BuildArgs),
    /// Print the filtered, sorted catalog one batch at a time.
    List(ListArgs),
    /// Show per-category counts.
    Stats,
    /// Show groups of files with identical content.
    Duplicates,
    /// Open a record in the system viewer.
    Open(OpenArgs),
    /// Interactive terminal browser.
    Browse(BrowseArgs),
    /// Inspect or reset the persisted filter selection.
    Prefs(PrefsArgs),
    /// View configuration state.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
    /// Show version and optional build metadata.
    Version(VersionArgs),
}

#[derive(Debug, Clone, Args)]
struct BuildArgs {
    /// Site root to scan (defaults to --root or the configured root).
    #[arg(value_name = "ROOT")]
    site: Option<PathBuf>,
}

/// Selection flags shared by `list` and `browse`. Unset flags keep the
/// persisted value.
#[derive(Debug, Clone, Default, Args)]
struct FilterArgs {
    /// Category: all, reading, listening, writing or other.
    #[arg(long, value_name = "CATEGORY")]
    category: Option<CategoryFilter>,
    /// Case-insensitive title substring.
    #[arg(long, value_name = "TEXT")]
    query: Option<String>,
    /// Ordering: az, za or date-desc.
    #[arg(long, value_name = "MODE")]
    sort: Option<SortMode>,
    /// Ignore the persisted selection and start from defaults.
    #[arg(long)]
    no_prefs: bool,
}

impl FilterArgs {
    fn overrides(&self) -> SessionOverrides {
        SessionOverrides {
            category: self.category,
            query: self.query.clone(),
            sort: self.sort,
        }
    }
}

#[derive(Debug, Clone, Args)]
struct ListArgs {
    #[command(flatten)]
    filters: FilterArgs,
    /// Number of batches to materialize.
    #[arg(long, default_value_t = 1, value_name = "N", conflicts_with = "all")]
    page: usize,
    /// Materialize every matching record.
    #[arg(long)]
    all: bool,
    /// Persist the resulting selection.
    #[arg(long)]
    save: bool,
}

#[derive(Debug, Clone, Args)]
struct OpenArgs {
    /// Record file path (as stored in the catalog) or part of a title.
    #[arg(value_name = "TARGET")]
    target: String,
}

#[derive(Debug, Clone, Args)]
struct BrowseArgs {
    #[command(flatten)]
    filters: FilterArgs,
    /// Do not persist selection changes made in this session.
    #[arg(long)]
    no_save: bool,
}

#[derive(Debug, Clone, Args)]
struct PrefsArgs {
    #[command(subcommand)]
    command: Option<PrefsCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum PrefsCommand {
    /// Print the stored selection (defaults when absent or unreadable).
    Show,
    /// Delete the stored selection.
    Reset,
    /// Print the preference file path.
    Path,
}

#[derive(Debug, Clone, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Print the config file path.
    Path,
    /// Print the effective configuration.
    Show,
    /// Validate the configuration.
    Validate,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Args)]
struct VersionArgs {
    /// Include build metadata.
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input at runtime.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
    /// Operation partially succeeded.
    #[error("{0}")]
    Partial(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Internal(_) | Self::Json(_) => 3,
            Self::Partial(_) => 4,
        }
    }
}

impl From<CatalogError> for CliError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidConfig { .. }
            | CatalogError::MissingConfig { .. }
            | CatalogError::ConfigParse { .. }
            | CatalogError::NoSourceFiles { .. } => Self::User(err.to_string()),
            CatalogError::Serialization { .. } => Self::Internal(err.to_string()),
            _ => Self::Runtime(err.to_string()),
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Build(args) => run_build(cli, args),
        Command::List(args) => run_list(cli, args),
        Command::Stats => run_stats(cli),
        Command::Duplicates => run_duplicates(cli),
        Command::Open(args) => run_open(cli, args),
        Command::Browse(args) => run_browse(cli, args),
        Command::Prefs(args) => run_prefs(cli, args),
        Command::Config(args) => run_config(cli, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
        Command::Version(args) => emit_version(cli, args),
    }
}

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(root) = &cli.root {
        config.catalog.root.clone_from(root);
    }
    Ok(config)
}

fn open_activity_log(config: &Config) -> JsonlWriter {
    JsonlWriter::open(JsonlConfig::for_path(config.paths.activity_log.clone()))
}

fn warn(cli: &Cli, message: &str) {
    if !cli.quiet {
        eprintln!("{}", message.yellow());
    }
}

/// Load both data files, logging the outcome. A failed test list is fatal.
fn load_site_logged(cli: &Cli, config: &Config, log: &mut JsonlWriter) -> Result<SiteData, CliError> {
    match load_site(&config.catalog) {
        Ok(site) => {
            log.write_entry(
                &LogEntry::new(EventType::CatalogLoaded, Severity::Info)
                    .with_path(&site.tests_path)
                    .with_counts(site.records.len(), site.duplicates.len())
                    .with_duration(site.elapsed),
            );
            if let Some(err) = &site.duplicates_warning {
                log.write_entry(
                    &LogEntry::failure(EventType::DuplicatesLoaded, err)
                        .with_path(config.catalog.duplicates_path()),
                );
                if cli.verbose {
                    warn(cli, &format!("duplicate list unavailable: {err}"));
                }
            }
            Ok(site)
        }
        Err(err) => {
            log.write_entry(&LogEntry::failure(EventType::CatalogLoadFailed, &err));
            warn(cli, STATUS_LOAD_FAILED);
            Err(err.into())
        }
    }
}

/// Defaults, then the stored selection (unless disabled), then flags.
fn resolve_filters(cli: &Cli, config: &Config, args: &FilterArgs, log: &mut JsonlWriter) -> FilterState {
    let persisted = if args.no_prefs {
        FilterState::default()
    } else {
        let outcome = preferences::load(&config.paths.preferences_file);
        if let Some(problem) = outcome.problem() {
            log.write_entry(
                &LogEntry::new(EventType::PreferencesFailed, Severity::Warning)
                    .with_path(&config.paths.preferences_file)
                    .with_details(problem.clone()),
            );
            if cli.verbose {
                warn(cli, &format!("[IEC-PREFS] {problem}; using defaults"));
            }
        } else if matches!(outcome, LoadOutcome::Loaded { .. }) {
            log.write_entry(
                &LogEntry::new(EventType::PreferencesLoaded, Severity::Info)
                    .with_path(&config.paths.preferences_file),
            );
        }
        outcome.into_filters()
    };
    preferences::merge(&persisted, &args.overrides())
}

fn save_filters(cli: &Cli, config: &Config, filters: &FilterState, log: &mut JsonlWriter) {
    let path = &config.paths.preferences_file;
    match preferences::save(filters, path) {
        Ok(saved) => log.write_entry(
            &LogEntry::new(EventType::PreferencesSaved, Severity::Info)
                .with_path(saved)
                .with_filters(filters),
        ),
        Err(err) => {
            log.write_entry(&LogEntry::failure(EventType::PreferencesFailed, &err).with_path(path));
            warn(cli, &format!("preferences not saved: {err}"));
        }
    }
}

// ---------------------------------------------------------------------------
// build
// ---------------------------------------------------------------------------

fn run_build(cli: &Cli, args: &BuildArgs) -> Result<(), CliError> {
    let mut config = load_config(cli)?;
    if let Some(site) = &args.site {
        config.catalog.root.clone_from(site);
    }
    let mut log = open_activity_log(&config);

    let report = match build_catalog(&config.catalog, &config.builder) {
        Ok(report) => report,
        Err(err) => {
            log.write_entry(
                &LogEntry::failure(EventType::CatalogBuilt, &err).with_path(&config.catalog.root),
            );
            return Err(err.into());
        }
    };
    log.write_entry(
        &LogEntry::new(EventType::CatalogBuilt, Severity::Info)
            .with_path(&report.tests_path)
            .with_counts(report.records, report.records + report.skipped.len())
            .with_duration(report.elapsed)
            .with_details(format!("duplicate_groups={}", report.duplicate_groups)),
    );

    match output_mode(cli) {
        OutputMode::Human => print_build_report(cli, &report),
        OutputMode::Json => {
            let payload = json!({
                "command": "build",
                "report": serde_json::to_value(&report)?,
                "elapsed_ms": u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
            });
            write_json_line(&payload)?;
        }
    }

    if report.skipped.is_empty() {
        Ok(())
    } else {
        Err(CliError::Partial(format!(
            "{} file(s) could not be catalogued",
            report.skipped.len()
        )))
    }
}

fn print_build_report(cli: &Cli, report: &BuildReport) {
    let t = &report.totals;
    println!(
        "{} {} tests ({} reading, {} listening, {} writing, {} other)",
        "Catalogued".green().bold(),
        report.records,
        t.reading,
        t.listening,
        t.writing,
        t.other,
    );
    println!("  Tests: {}", report.tests_path.display());
    println!("  Duplicates: {}", report.duplicates_path.display());
    if report.duplicate_groups == 0 {
        println!("  {NO_DUPLICATES}");
    } else {
        println!(
            "  {} duplicate group(s) covering {} files",
            report.duplicate_groups.to_string().yellow(),
            report.duplicate_files
        );
    }
    for skipped in &report.skipped {
        warn(
            cli,
            &format!("[{}] skipped {}: {}", skipped.error_code, skipped.path.display(), skipped.reason),
        );
    }
    if cli.verbose {
        println!("  Elapsed: {}", format_duration(report.elapsed));
    }
}

// ---------------------------------------------------------------------------
// list / stats / duplicates / open
// ---------------------------------------------------------------------------

fn run_list(cli: &Cli, args: &ListArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let mut log = open_activity_log(&config);
    let filters = resolve_filters(cli, &config, &args.filters, &mut log);
    let site = load_site_logged(cli, &config, &mut log)?;

    let mut view = CatalogView::new(
        filters,
        config.browse.batch_size,
        config.browse.prefetch_rows,
        current_year(),
    );
    view.set_catalog(site.records, site.duplicates);
    if args.all {
        view.render_all();
    } else {
        // Each further page is one load-more trigger at the end of the window.
        for _ in 1..args.page.max(1) {
            if view.load_more(view.visible_len()).is_none() {
                break;
            }
        }
    }
    log.write_entry(
        &LogEntry::new(EventType::FiltersApplied, Severity::Info)
            .with_counts(view.visible_len(), view.filtered_len())
            .with_filters(view.filters()),
    );
    if args.save {
        save_filters(cli, &config, view.filters(), &mut log);
    }

    match output_mode(cli) {
        OutputMode::Human => {
            println!("{}", view.result_count_text().bold());
            for record in view.visible() {
                println!("{}", format_record_row(record));
            }
            if view.filtered_len() == 0 {
                println!("{}", ielts_catalog::browse::view::NO_MATCHES.dimmed());
            }
            println!("{}", view.status_text().dimmed());
        }
        OutputMode::Json => {
            let records: Vec<&TestRecord> = view.visible().collect();
            let payload = json!({
                "command": "list",
                "filters": serde_json::to_value(view.filters())?,
                "total": view.total_len(),
                "filtered": view.filtered_len(),
                "visible": view.visible_len(),
                "phase": view.pager().phase().as_str(),
                "records": serde_json::to_value(records)?,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn format_record_row(record: &TestRecord) -> String {
    format!(
        "  {}  {}  {}",
        record.title,
        record.category.label(),
        record.file.dimmed()
    )
}

fn run_stats(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let mut log = open_activity_log(&config);
    let site = load_site_logged(cli, &config, &mut log)?;
    let totals = CategoryTotals::from_records(&site.records);

    match output_mode(cli) {
        OutputMode::Human => {
            for (label, count) in totals.cards() {
                println!("{label:<10} {}", count.to_string().bold());
            }
            if totals.other > 0 {
                println!("{:<10} {}", "Other", totals.other);
            }
            println!("{:<10} {}", "Duplicates", site.duplicates.len());
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "stats",
                "totals": serde_json::to_value(totals)?,
                "duplicate_groups": site.duplicates.len(),
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn run_duplicates(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let mut log = open_activity_log(&config);
    let site = load_site_logged(cli, &config, &mut log)?;

    match output_mode(cli) {
        OutputMode::Human => {
            for line in duplicate_lines(&site.duplicates) {
                if line.starts_with("Hash:") {
                    println!("{}", line.yellow());
                } else {
                    println!("{line}");
                }
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "duplicates",
                "count": site.duplicates.len(),
                "groups": serde_json::to_value(summarize_duplicates(&site.duplicates))?,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

/// Exact `file` match first, then the first title containing the target.
fn find_record<'a>(records: &'a [TestRecord], target: &str) -> Option<&'a TestRecord> {
    records
        .iter()
        .find(|r| r.file == target)
        .or_else(|| records.iter().find(|r| title_matches(&r.title, target)))
}

fn run_open(cli: &Cli, args: &OpenArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let mut log = open_activity_log(&config);
    let site = load_site_logged(cli, &config, &mut log)?;

    let record = find_record(&site.records, args.target.trim())
        .ok_or_else(|| CliError::User(format!("no record matches {:?}", args.target)))?;
    let path = resolve_site_file(&config.catalog.root, &record.file);
    let opener = detect_opener();

    if let Err(err) = opener.open(&path) {
        log.write_entry(&LogEntry::failure(EventType::RecordOpened, &err).with_path(&path));
        return Err(err.into());
    }
    log.write_entry(
        &LogEntry::new(EventType::RecordOpened, Severity::Info)
            .with_path(&path)
            .with_details(format!("opener={}", opener.name())),
    );

    match output_mode(cli) {
        OutputMode::Human => {
            if !cli.quiet {
                println!("Opened {} ({})", record.title.bold(), path.display());
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "open",
                "file": record.file,
                "title": record.title,
                "path": path.to_string_lossy(),
                "opener": opener.name(),
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// browse
// ---------------------------------------------------------------------------

fn run_browse(cli: &Cli, args: &BrowseArgs) -> Result<(), CliError> {
    if !io::stdout().is_terminal() {
        return Err(CliError::User(
            "browse needs an interactive terminal; use `iecat list` instead".to_string(),
        ));
    }
    let config = load_config(cli)?;
    let mut log = open_activity_log(&config);
    let filters = resolve_filters(cli, &config, &args.filters, &mut log);

    let browser = BrowserConfig {
        catalog: config.catalog.clone(),
        filters,
        preferences_file: (!args.no_save).then(|| config.paths.preferences_file.clone()),
        batch_size: config.browse.batch_size,
        prefetch_rows: config.browse.prefetch_rows,
        debounce: Duration::from_millis(config.browse.search_debounce_ms),
        fallback_year: current_year(),
        color: ColorMode::from_environment(cli.no_color),
    };
    let opener = detect_opener();
    run_browser(&browser, opener.as_ref(), &mut log)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// prefs
// ---------------------------------------------------------------------------

fn run_prefs(cli: &Cli, args: &PrefsArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let path = &config.paths.preferences_file;

    match &args.command {
        None | Some(PrefsCommand::Show) => {
            let outcome = preferences::load(path);
            let status = match &outcome {
                LoadOutcome::Loaded { .. } => "loaded",
                LoadOutcome::Missing => "missing",
                LoadOutcome::Corrupt { .. } => "corrupt",
                LoadOutcome::IoError { .. } => "io_error",
            };
            let problem = outcome.problem();
            let filters = outcome.into_filters();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("Category: {}", filters.category);
                    println!("Query:    {:?}", filters.query);
                    println!("Sort:     {} ({})", filters.sort, filters.sort.label());
                    if let Some(problem) = problem {
                        warn(cli, &format!("{problem}; showing defaults"));
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "prefs show",
                        "path": path.to_string_lossy(),
                        "status": status,
                        "filters": serde_json::to_value(&filters)?,
                        "problem": problem,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(PrefsCommand::Reset) => {
            let removed = preferences::clear(path)?;
            match output_mode(cli) {
                OutputMode::Human => {
                    if removed {
                        println!("Removed {}", path.display());
                    } else {
                        println!("No stored preferences at {}", path.display());
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "prefs reset",
                        "path": path.to_string_lossy(),
                        "removed": removed,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(PrefsCommand::Path) => {
            match output_mode(cli) {
                OutputMode::Human => println!("{}", path.display()),
                OutputMode::Json => {
                    let payload = json!({
                        "command": "prefs path",
                        "path": path.to_string_lossy(),
                        "exists": path.exists(),
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match &args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = load_config(cli)?;

            match output_mode(cli) {
                OutputMode::Human => {
                    let toml_str = toml::to_string_pretty(&config)
                        .map_err(|e| CliError::Runtime(format!("serialize config: {e}")))?;
                    println!("{toml_str}");
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config show",
                        "config": serde_json::to_value(&config)?,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Validate) => match load_config(cli) {
            Ok(config) => {
                let hash = config.stable_hash()?;

                match output_mode(cli) {
                    OutputMode::Human => {
                        println!("{}", "Configuration is valid.".green());
                        println!("  Source: {}", config.paths.config_file.display());
                        println!("  Hash: {hash}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": true,
                            "path": config.paths.config_file.to_string_lossy(),
                            "hash": hash,
                        });
                        write_json_line(&payload)?;
                    }
                }
                Ok(())
            }
            Err(e) => {
                match output_mode(cli) {
                    OutputMode::Human => {
                        eprintln!("{} {e}", "Configuration is INVALID:".red());
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": false,
                            "error": e.to_string(),
                        });
                        write_json_line(&payload)?;
                    }
                }
                Err(CliError::User(format!("invalid config: {e}")))
            }
        },
    }
}

// ---------------------------------------------------------------------------
// version / output helpers
// ---------------------------------------------------------------------------

fn emit_version(cli: &Cli, args: &VersionArgs) -> Result<(), CliError> {
    let version = env!("CARGO_PKG_VERSION");
    let package = env!("CARGO_PKG_NAME");
    let target = option_env!("TARGET").unwrap_or("unknown");
    let profile = option_env!("PROFILE").unwrap_or("unknown");
    let git_sha = option_env!("GIT_SHA").unwrap_or("unknown");

    match output_mode(cli) {
        OutputMode::Human => {
            println!("iecat {version}");
            if args.verbose {
                println!("package: {package}");
                println!("target: {target}");
                println!("profile: {profile}");
                println!("git_sha: {git_sha}");
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "binary": "iecat",
                "version": version,
                "package": package,
                "build": {
                    "target": target,
                    "profile": profile,
                    "git_sha": git_sha,
                }
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1_000 {
        format!("{millis}ms")
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("IECAT_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        _ => fallback,
    }
}
