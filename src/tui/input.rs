//! Key routing for the browser.
//!
//! The search box captures printable keys while focused; everything else goes
//! through the list bindings.

#![allow(missing_docs)]

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::model::{Focus, Panel};
use crate::browse::filter::CategoryFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputContext {
    pub focus: Focus,
    pub panel: Panel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    FocusSearch,
    BlurSearch,
    CommitSearch,
    InsertChar(char),
    DeleteChar,
    ClearSearch,
    ResetFilters,
    ToggleTheme,
    SelectCategory(CategoryFilter),
    NextCategory,
    PrevCategory,
    NextSort,
    ToggleDuplicates,
    Reload,
    CursorUp,
    CursorDown,
    PageUp,
    PageDown,
    Home,
    End,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpBinding {
    pub keys: &'static str,
    pub description: &'static str,
}

const HELP: [HelpBinding; 9] = [
    HelpBinding { keys: "/", description: "search" },
    HelpBinding { keys: "Tab", description: "category" },
    HelpBinding { keys: "s", description: "sort" },
    HelpBinding { keys: "Enter", description: "open" },
    HelpBinding { keys: "Esc", description: "reset" },
    HelpBinding { keys: "x", description: "duplicates" },
    HelpBinding { keys: "d", description: "theme" },
    HelpBinding { keys: "R", description: "reload" },
    HelpBinding { keys: "q", description: "quit" },
];

#[must_use]
pub const fn help_bindings() -> &'static [HelpBinding] {
    &HELP
}

/// Resolve a key into an action, or `None` if the key is unbound.
#[must_use]
pub fn resolve_key_event(key: &KeyEvent, context: InputContext) -> Option<InputAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global bindings.
    match key.code {
        KeyCode::Char('c') if ctrl => return Some(InputAction::Quit),
        KeyCode::Char('f') if ctrl => return Some(InputAction::FocusSearch),
        _ => {}
    }

    match context.focus {
        Focus::Search => resolve_search_key(key, ctrl),
        Focus::List => resolve_list_key(key, ctrl, context.panel),
    }
}

fn resolve_search_key(key: &KeyEvent, ctrl: bool) -> Option<InputAction> {
    match key.code {
        KeyCode::Esc => Some(InputAction::BlurSearch),
        KeyCode::Enter => Some(InputAction::CommitSearch),
        KeyCode::Backspace => Some(InputAction::DeleteChar),
        KeyCode::Char('u') if ctrl => Some(InputAction::ClearSearch),
        KeyCode::Char(c) if !ctrl => Some(InputAction::InsertChar(c)),
        KeyCode::Up => Some(InputAction::CursorUp),
        KeyCode::Down => Some(InputAction::CursorDown),
        _ => None,
    }
}

fn resolve_list_key(key: &KeyEvent, ctrl: bool, panel: Panel) -> Option<InputAction> {
    if ctrl {
        return None;
    }
    let action = match key.code {
        KeyCode::Char('q') => InputAction::Quit,
        KeyCode::Char('/') => InputAction::FocusSearch,
        KeyCode::Esc if panel == Panel::Duplicates => InputAction::ToggleDuplicates,
        KeyCode::Esc => InputAction::ResetFilters,
        KeyCode::Char('d' | 'D') => InputAction::ToggleTheme,
        KeyCode::Tab => InputAction::NextCategory,
        KeyCode::BackTab => InputAction::PrevCategory,
        KeyCode::Char(c @ '0'..='4') => {
            let index = c.to_digit(10).map_or(0, |d| d as usize);
            InputAction::SelectCategory(CategoryFilter::from_index(index)?)
        }
        KeyCode::Char('s') => InputAction::NextSort,
        KeyCode::Char('x') => InputAction::ToggleDuplicates,
        KeyCode::Char('R') => InputAction::Reload,
        KeyCode::Up | KeyCode::Char('k') => InputAction::CursorUp,
        KeyCode::Down | KeyCode::Char('j') => InputAction::CursorDown,
        KeyCode::PageUp => InputAction::PageUp,
        KeyCode::PageDown | KeyCode::Char(' ') => InputAction::PageDown,
        KeyCode::Home | KeyCode::Char('g') => InputAction::Home,
        KeyCode::End | KeyCode::Char('G') => InputAction::End,
        KeyCode::Enter => InputAction::Open,
        _ => return None,
    };
    Some(action)
}
