//! Elm-style state model for the catalog browser.
//!
//! All display state lives in [`BrowserModel`]. Input and data events arrive
//! as [`BrowserMsg`] values; side-effects are represented as [`BrowserCmd`]
//! values returned from the update function. No I/O happens here.

use std::time::{Duration, Instant};

use crossterm::event::KeyEvent;

use crate::browse::debounce::SearchDebouncer;
use crate::browse::filter::FilterState;
use crate::browse::view::CatalogView;
use crate::catalog::loader::SiteData;
use crate::core::errors::CatalogError;
use crate::tui::theme::ThemeMode;

/// Rows taken by header, stats, chips, search bar, rule, status and help.
pub const CHROME_ROWS: u16 = 7;

/// Where keystrokes go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    List,
    Search,
}

/// Main panel content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Panel {
    #[default]
    Catalog,
    Duplicates,
}

pub struct BrowserModel {
    pub view: CatalogView,
    /// Text in the search box; applied to the view after the debounce.
    pub search_input: String,
    pub focus: Focus,
    pub panel: Panel,
    pub debouncer: SearchDebouncer,
    /// Selected row within the materialized window.
    pub cursor: usize,
    /// First list row on screen.
    pub scroll: usize,
    /// First line of the duplicates panel on screen.
    pub duplicates_scroll: usize,
    pub terminal_size: (u16, u16),
    pub theme: ThemeMode,
    /// File of the last opened record; keeps its marker across re-renders.
    pub active_file: Option<String>,
    pub notification: Option<String>,
    /// Last time seen by the update function.
    pub clock: Instant,
    pub tick: u64,
    pub quit: bool,
}

impl BrowserModel {
    #[must_use]
    pub fn new(view: CatalogView, debounce: Duration, terminal_size: (u16, u16), now: Instant) -> Self {
        let search_input = view.filters().query.clone();
        Self {
            view,
            search_input,
            focus: Focus::List,
            panel: Panel::Catalog,
            debouncer: SearchDebouncer::new(debounce),
            cursor: 0,
            scroll: 0,
            duplicates_scroll: 0,
            terminal_size,
            theme: ThemeMode::default(),
            active_file: None,
            notification: None,
            clock: now,
            tick: 0,
            quit: false,
        }
    }

    /// Rows available for list items.
    #[must_use]
    pub fn list_height(&self) -> usize {
        usize::from(self.terminal_size.1.saturating_sub(CHROME_ROWS)).max(1)
    }

    /// One past the last list row on screen.
    #[must_use]
    pub fn viewport_end(&self) -> usize {
        self.scroll + self.list_height()
    }
}

/// Messages consumed by the update function.
#[derive(Debug)]
pub enum BrowserMsg {
    /// Periodic tick carrying the current time; drives the search debounce.
    Tick(Instant),
    /// Key press with the instant it was read from the terminal.
    Key(KeyEvent, Instant),
    Resize { cols: u16, rows: u16 },
    /// Result of a catalog (re)load.
    CatalogLoaded(Box<Result<SiteData, CatalogError>>),
    /// A side-effect failed; surfaced as a notification.
    Failed(String),
}

/// Side-effects returned by the update function for the runtime to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserCmd {
    None,
    /// Read both data files and deliver `CatalogLoaded`.
    LoadCatalog,
    /// Persist the selection (best effort).
    SavePreferences(FilterState),
    /// Open a record's file (site-relative path) in the system viewer.
    OpenRecord(String),
    /// Log a filter application to the activity log.
    LogFilters { visible: usize, filtered: usize },
    Quit,
    Batch(Vec<Self>),
}

impl BrowserCmd {
    /// Flatten nested batches, dropping `None`.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::None => Vec::new(),
            Self::Batch(cmds) => cmds.into_iter().flat_map(Self::flatten).collect(),
            other => vec![other],
        }
    }
}
