//! Pure update function for the Elm-style browser.
//!
//! `update()` takes the current model and a message, mutates the model, and
//! returns a command describing any side-effects the runtime should execute.
//! This module performs zero I/O.

use super::input::{InputAction, InputContext, resolve_key_event};
use super::model::{BrowserCmd, BrowserModel, BrowserMsg, Focus, Panel};
use crate::catalog::stats::duplicate_lines;

/// Apply a message to the model and return the next command for the runtime.
pub fn update(model: &mut BrowserModel, msg: BrowserMsg) -> BrowserCmd {
    match msg {
        BrowserMsg::Tick(now) => {
            model.tick = model.tick.wrapping_add(1);
            model.clock = now;
            match model.debouncer.poll(now) {
                Some(query) => apply_query(model, &query),
                None => BrowserCmd::None,
            }
        }

        BrowserMsg::Key(key, at) => {
            model.clock = model.clock.max(at);
            let context = InputContext {
                focus: model.focus,
                panel: model.panel,
            };
            resolve_key_event(&key, context).map_or(BrowserCmd::None, |action| {
                apply_input_action(model, action)
            })
        }

        BrowserMsg::Resize { cols, rows } => {
            model.terminal_size = (cols, rows);
            clamp_cursor(model);
            fill_viewport(model)
        }

        BrowserMsg::CatalogLoaded(result) => {
            match *result {
                Ok(site) => {
                    model.view.set_catalog(site.records, site.duplicates);
                    model.notification = None;
                }
                Err(err) => {
                    model.view.set_load_failed(&err);
                    model.notification = Some(if err.is_retryable() {
                        format!("{err} (press R to retry)")
                    } else {
                        err.to_string()
                    });
                }
            }
            model.cursor = 0;
            model.scroll = 0;
            model.duplicates_scroll = 0;
            fill_viewport(model)
        }

        BrowserMsg::Failed(message) => {
            model.notification = Some(message);
            BrowserCmd::None
        }
    }
}

fn apply_input_action(model: &mut BrowserModel, action: InputAction) -> BrowserCmd {
    match action {
        InputAction::Quit => {
            model.quit = true;
            // A query still waiting on the debounce is applied so it persists.
            match model.debouncer.flush() {
                Some(query) => BrowserCmd::Batch(vec![apply_query(model, &query), BrowserCmd::Quit]),
                None => BrowserCmd::Quit,
            }
        }
        InputAction::FocusSearch => {
            model.focus = Focus::Search;
            BrowserCmd::None
        }
        InputAction::BlurSearch => {
            model.focus = Focus::List;
            BrowserCmd::None
        }
        InputAction::CommitSearch => {
            model.focus = Focus::List;
            match model.debouncer.flush() {
                Some(query) => apply_query(model, &query),
                None => BrowserCmd::None,
            }
        }
        InputAction::InsertChar(c) => {
            model.search_input.push(c);
            schedule_search(model);
            BrowserCmd::None
        }
        InputAction::DeleteChar => {
            if model.search_input.pop().is_some() {
                schedule_search(model);
            }
            BrowserCmd::None
        }
        InputAction::ClearSearch => {
            if !model.search_input.is_empty() {
                model.search_input.clear();
                schedule_search(model);
            }
            BrowserCmd::None
        }
        InputAction::ResetFilters => {
            model.debouncer.cancel();
            model.search_input.clear();
            let changed = model.view.reset_filters();
            after_filter_change(model, changed)
        }
        InputAction::ToggleTheme => {
            model.theme = model.theme.toggled();
            BrowserCmd::None
        }
        InputAction::SelectCategory(category) => {
            let changed = model.view.set_category(category);
            after_filter_change(model, changed)
        }
        InputAction::NextCategory => {
            let next = model.view.filters().category.next();
            let changed = model.view.set_category(next);
            after_filter_change(model, changed)
        }
        InputAction::PrevCategory => {
            let prev = model.view.filters().category.prev();
            let changed = model.view.set_category(prev);
            after_filter_change(model, changed)
        }
        InputAction::NextSort => {
            let next = model.view.filters().sort.next();
            let changed = model.view.set_sort(next);
            after_filter_change(model, changed)
        }
        InputAction::ToggleDuplicates => {
            model.panel = match model.panel {
                Panel::Catalog => Panel::Duplicates,
                Panel::Duplicates => Panel::Catalog,
            };
            model.duplicates_scroll = 0;
            BrowserCmd::None
        }
        InputAction::Reload => {
            model.view.set_loading();
            model.notification = None;
            BrowserCmd::LoadCatalog
        }
        InputAction::CursorUp => move_cursor(model, -1),
        InputAction::CursorDown => move_cursor(model, 1),
        InputAction::PageUp => move_cursor(model, -page_step(model)),
        InputAction::PageDown => move_cursor(model, page_step(model)),
        InputAction::Home => move_cursor(model, isize::MIN),
        InputAction::End => move_cursor(model, isize::MAX),
        InputAction::Open => {
            let Some(record) = model.view.visible_record(model.cursor) else {
                return BrowserCmd::None;
            };
            let file = record.file.clone();
            model.active_file = Some(file.clone());
            BrowserCmd::OpenRecord(file)
        }
    }
}

fn schedule_search(model: &mut BrowserModel) {
    let query = model.search_input.clone();
    let now = model.clock;
    model.debouncer.schedule(query, now);
}

fn apply_query(model: &mut BrowserModel, query: &str) -> BrowserCmd {
    let changed = model.view.set_query(query);
    after_filter_change(model, changed)
}

/// The view already reset its window; bring the cursor and viewport along.
fn after_filter_change(model: &mut BrowserModel, changed: bool) -> BrowserCmd {
    if !changed {
        return BrowserCmd::None;
    }
    model.cursor = 0;
    model.scroll = 0;
    fill_viewport(model);
    BrowserCmd::Batch(vec![
        BrowserCmd::SavePreferences(model.view.filters().clone()),
        BrowserCmd::LogFilters {
            visible: model.view.visible_len(),
            filtered: model.view.filtered_len(),
        },
    ])
}

fn page_step(model: &BrowserModel) -> isize {
    isize::try_from(model.list_height().saturating_sub(1).max(1)).unwrap_or(1)
}

fn move_cursor(model: &mut BrowserModel, delta: isize) -> BrowserCmd {
    if model.panel == Panel::Duplicates {
        let lines = duplicate_lines(model.view.duplicates()).len().max(1);
        let max_scroll = lines.saturating_sub(model.list_height());
        model.duplicates_scroll = model
            .duplicates_scroll
            .saturating_add_signed(delta)
            .min(max_scroll);
        return BrowserCmd::None;
    }

    // `End` walks the whole window; render everything so End means the end.
    if delta == isize::MAX {
        model.view.render_all();
    }
    model.cursor = model.cursor.saturating_add_signed(delta);
    clamp_cursor(model);
    fill_viewport(model)
}

fn clamp_cursor(model: &mut BrowserModel) {
    let len = model.view.visible_len();
    model.cursor = model.cursor.min(len.saturating_sub(1));

    let height = model.list_height();
    if model.cursor < model.scroll {
        model.scroll = model.cursor;
    } else if model.cursor >= model.scroll + height {
        model.scroll = model.cursor + 1 - height;
    }
}

/// Viewport-proximity check: let the pager append batches while the sentinel
/// is within reach of the visible rows.
fn fill_viewport(model: &mut BrowserModel) -> BrowserCmd {
    let end = model.viewport_end();
    model.view.fill_viewport(end);
    BrowserCmd::None
}
