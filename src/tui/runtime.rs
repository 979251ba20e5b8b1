//! Event loop for the interactive browser.
//!
//! Keys and resizes come from crossterm, catalog loads arrive over a channel
//! from a loader thread, and a tick every poll interval drives the search
//! debounce. Every message goes through [`update`]; the commands it returns
//! are executed here, the only place in the TUI that touches the filesystem.

#![allow(missing_docs)]

use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, TryRecvError, bounded};
use crossterm::event::{self, Event, KeyEventKind};

use super::model::{BrowserCmd, BrowserModel, BrowserMsg};
use super::render::{compose_frame, paint};
use super::terminal_guard::TerminalGuard;
use super::theme::{ColorMode, Theme};
use super::update::update;
use crate::browse::filter::FilterState;
use crate::browse::preferences;
use crate::browse::view::CatalogView;
use crate::catalog::loader::{SiteData, load_site};
use crate::core::config::CatalogConfig;
use crate::core::errors::{CatalogError, Result};
use crate::core::paths::resolve_site_file;
use crate::logger::jsonl::{EventType, JsonlWriter, LogEntry, Severity};
use crate::platform::opener::Opener;

/// Input poll interval; also the debounce resolution.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub catalog: CatalogConfig,
    /// Selection to start from (defaults, stored preferences and flags merged).
    pub filters: FilterState,
    /// Where to persist the selection; `None` disables saving.
    pub preferences_file: Option<PathBuf>,
    pub batch_size: usize,
    pub prefetch_rows: usize,
    pub debounce: Duration,
    pub fallback_year: i32,
    pub color: ColorMode,
}

/// Executes [`BrowserCmd`]s against the outside world.
pub struct CommandExecutor<'a> {
    catalog: CatalogConfig,
    preferences_file: Option<PathBuf>,
    opener: &'a dyn Opener,
    log: &'a mut JsonlWriter,
    loading: Option<Receiver<Result<SiteData>>>,
}

impl<'a> CommandExecutor<'a> {
    pub fn new(
        catalog: CatalogConfig,
        preferences_file: Option<PathBuf>,
        opener: &'a dyn Opener,
        log: &'a mut JsonlWriter,
    ) -> Self {
        Self {
            catalog,
            preferences_file,
            opener,
            log,
            loading: None,
        }
    }

    /// Run a command. Returns messages to feed back into the update loop.
    pub fn execute(&mut self, cmd: BrowserCmd, model: &BrowserModel) -> Vec<BrowserMsg> {
        let mut feedback = Vec::new();
        for cmd in cmd.flatten() {
            match cmd {
                BrowserCmd::LoadCatalog => self.start_load(),
                BrowserCmd::SavePreferences(filters) => {
                    if let Some(msg) = self.save_preferences(&filters) {
                        feedback.push(msg);
                    }
                }
                BrowserCmd::OpenRecord(file) => {
                    if let Some(msg) = self.open_record(&file) {
                        feedback.push(msg);
                    }
                }
                BrowserCmd::LogFilters { visible, filtered } => {
                    self.log.write_entry(
                        &LogEntry::new(EventType::FiltersApplied, Severity::Info)
                            .with_counts(visible, filtered)
                            .with_filters(model.view.filters()),
                    );
                }
                BrowserCmd::Quit | BrowserCmd::None | BrowserCmd::Batch(_) => {}
            }
        }
        feedback
    }

    /// Whether a catalog load is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    /// Non-blocking check for a finished load.
    pub fn poll_load(&mut self) -> Option<BrowserMsg> {
        let rx = self.loading.as_ref()?;
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(CatalogError::ChannelClosed {
                component: "catalog loader",
            }),
        };
        self.loading = None;
        self.log_load(&result);
        Some(BrowserMsg::CatalogLoaded(Box::new(result)))
    }

    /// Block until the in-flight load finishes. Used by tests and by callers
    /// that want the first frame to show data.
    pub fn wait_load(&mut self) -> Option<BrowserMsg> {
        let rx = self.loading.take()?;
        let result = rx.recv().unwrap_or_else(|_| {
            Err(CatalogError::ChannelClosed {
                component: "catalog loader",
            })
        });
        self.log_load(&result);
        Some(BrowserMsg::CatalogLoaded(Box::new(result)))
    }

    fn start_load(&mut self) {
        let (tx, rx) = bounded(1);
        let catalog = self.catalog.clone();
        thread::spawn(move || {
            let _ = tx.send(load_site(&catalog));
        });
        // A newer load replaces an older one; the stale receiver is dropped.
        self.loading = Some(rx);
    }

    fn log_load(&mut self, result: &Result<SiteData>) {
        match result {
            Ok(site) => {
                self.log.write_entry(
                    &LogEntry::new(EventType::CatalogLoaded, Severity::Info)
                        .with_path(&site.tests_path)
                        .with_counts(site.records.len(), site.duplicates.len())
                        .with_duration(site.elapsed),
                );
                if let Some(err) = &site.duplicates_warning {
                    self.log.write_entry(
                        &LogEntry::failure(EventType::DuplicatesLoaded, err)
                            .with_path(self.catalog.duplicates_path()),
                    );
                }
            }
            Err(err) => {
                self.log
                    .write_entry(&LogEntry::failure(EventType::CatalogLoadFailed, err));
            }
        }
    }

    fn save_preferences(&mut self, filters: &FilterState) -> Option<BrowserMsg> {
        let path = self.preferences_file.as_ref()?;
        match preferences::save(filters, path) {
            Ok(saved) => {
                self.log.write_entry(
                    &LogEntry::new(EventType::PreferencesSaved, Severity::Info)
                        .with_path(saved)
                        .with_filters(filters),
                );
                None
            }
            Err(err) => {
                self.log.write_entry(
                    &LogEntry::failure(EventType::PreferencesFailed, &err).with_path(path),
                );
                Some(BrowserMsg::Failed(format!("preferences not saved: {err}")))
            }
        }
    }

    fn open_record(&mut self, file: &str) -> Option<BrowserMsg> {
        let path = resolve_site_file(&self.catalog.root, file);
        match self.opener.open(&path) {
            Ok(()) => {
                self.log.write_entry(
                    &LogEntry::new(EventType::RecordOpened, Severity::Info)
                        .with_path(&path)
                        .with_details(format!("opener={}", self.opener.name())),
                );
                None
            }
            Err(err) => {
                self.log
                    .write_entry(&LogEntry::failure(EventType::RecordOpened, &err).with_path(&path));
                Some(BrowserMsg::Failed(err.to_string()))
            }
        }
    }
}

/// Build the initial model for a configuration.
#[must_use]
pub fn initial_model(config: &BrowserConfig, terminal_size: (u16, u16), now: Instant) -> BrowserModel {
    let view = CatalogView::new(
        config.filters.clone(),
        config.batch_size,
        config.prefetch_rows,
        config.fallback_year,
    );
    BrowserModel::new(view, config.debounce, terminal_size, now)
}

/// Run the browser until the user quits.
///
/// # Errors
/// Terminal setup and event-read failures; catalog and persistence problems
/// are shown in the UI instead.
pub fn run_browser(config: &BrowserConfig, opener: &dyn Opener, log: &mut JsonlWriter) -> Result<()> {
    let started = Instant::now();
    log.write_entry(
        &LogEntry::new(EventType::SessionStart, Severity::Info)
            .with_path(&config.catalog.root)
            .with_filters(&config.filters),
    );

    let result = run_loop(config, opener, log);

    let mut stop = LogEntry::new(EventType::SessionStop, Severity::Info).with_duration(started.elapsed());
    if let Err(err) = &result {
        stop = LogEntry::failure(EventType::SessionStop, err).with_duration(started.elapsed());
    }
    log.write_entry(&stop);
    log.flush();
    result
}

fn run_loop(config: &BrowserConfig, opener: &dyn Opener, log: &mut JsonlWriter) -> Result<()> {
    let _guard = TerminalGuard::new().map_err(runtime_error)?;
    let mut stdout = io::stdout();

    let mut model = initial_model(config, TerminalGuard::terminal_size(), Instant::now());
    let mut executor = CommandExecutor::new(
        config.catalog.clone(),
        config.preferences_file.clone(),
        opener,
        log,
    );
    executor.execute(BrowserCmd::LoadCatalog, &model);

    let mut dirty = true;
    while !model.quit {
        if dirty {
            let theme = Theme::new(model.theme, config.color);
            let (cols, rows) = model.terminal_size;
            let frame = compose_frame(&model, usize::from(cols), usize::from(rows));
            paint(&mut stdout, &frame, &theme).map_err(runtime_error)?;
            dirty = false;
        }

        let mut inbox = VecDeque::new();
        if event::poll(POLL_INTERVAL).map_err(runtime_error)? {
            match event::read().map_err(runtime_error)? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    inbox.push_back(BrowserMsg::Key(key, Instant::now()));
                }
                Event::Resize(cols, rows) => inbox.push_back(BrowserMsg::Resize { cols, rows }),
                _ => {}
            }
        }
        if let Some(loaded) = executor.poll_load() {
            inbox.push_back(loaded);
        }
        inbox.push_back(BrowserMsg::Tick(Instant::now()));

        while let Some(msg) = inbox.pop_front() {
            let is_tick = matches!(msg, BrowserMsg::Tick(_));
            let cmd = update(&mut model, msg);
            if !is_tick || cmd != BrowserCmd::None {
                dirty = true;
            }
            inbox.extend(executor.execute(cmd, &model));
        }
    }
    Ok(())
}

fn runtime_error(err: io::Error) -> CatalogError {
    CatalogError::Runtime {
        details: format!("terminal: {err}"),
    }
}
