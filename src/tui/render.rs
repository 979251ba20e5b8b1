//! Frame composition and painting for the catalog browser.
//!
//! [`compose_frame`] is pure: it turns a model into styled lines, which keeps
//! layout testable without a terminal. [`paint`] writes a composed frame with
//! `crossterm` commands.

#![allow(missing_docs)]

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::input::help_bindings;
use super::model::{BrowserModel, Focus, Panel};
use super::theme::{SemanticToken, Theme};
use crate::browse::filter::CategoryFilter;
use crate::browse::view::{LoadState, NO_MATCHES, STATUS_SEARCHING};
use crate::catalog::stats::duplicate_lines;

const TITLE: &str = "IELTS Test Catalog";
const ACTIVE_MARKER: &str = "▶";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub token: SemanticToken,
    pub bold: bool,
}

impl Span {
    fn new(text: impl Into<String>, token: SemanticToken) -> Self {
        Self {
            text: text.into(),
            token,
            bold: false,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub spans: Vec<Span>,
    pub selected: bool,
}

impl Line {
    fn plain(text: impl Into<String>, token: SemanticToken) -> Self {
        Self {
            spans: vec![Span::new(text, token)],
            selected: false,
        }
    }

    /// Concatenated text without styling.
    #[must_use]
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    pub lines: Vec<Line>,
}

impl Frame {
    /// Plain-text rendering, one string per row.
    #[must_use]
    pub fn to_text(&self) -> Vec<String> {
        self.lines.iter().map(Line::text).collect()
    }
}

/// Cut `text` to at most `width` terminal columns, ending in `…` when cut.
#[must_use]
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if UnicodeWidthStr::width(text) <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Compose the full screen for the current model.
#[must_use]
pub fn compose_frame(model: &BrowserModel, width: usize, height: usize) -> Frame {
    let mut lines = vec![
        header_line(model),
        stats_line(model),
        chips_line(model),
        search_line(model),
        Line::plain("─".repeat(width), SemanticToken::Muted),
    ];

    let list_height = model.list_height();
    match model.panel {
        Panel::Catalog => lines.extend(list_lines(model, list_height)),
        Panel::Duplicates => lines.extend(duplicates_lines(model, list_height)),
    }

    lines.push(status_line(model));
    lines.push(help_line());

    lines.truncate(height.max(1));
    for line in &mut lines {
        clip_line(line, width);
    }
    Frame { width, lines }
}

fn header_line(model: &BrowserModel) -> Line {
    Line {
        spans: vec![
            Span::new(format!(" {TITLE}"), SemanticToken::Accent).bold(),
            Span::new(format!("  [{}]  ", model.theme.as_str()), SemanticToken::Muted),
            Span::new(model.view.result_count_text(), SemanticToken::Neutral),
        ],
        selected: false,
    }
}

fn stats_line(model: &BrowserModel) -> Line {
    let mut spans = Vec::new();
    for (i, (label, count)) in model.view.totals().cards().into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::new(" │ ", SemanticToken::Muted));
        }
        let token = match label {
            "Listening" => SemanticToken::Listening,
            "Reading" => SemanticToken::Reading,
            "Writing" => SemanticToken::Writing,
            _ => SemanticToken::Neutral,
        };
        spans.push(Span::new(format!(" {label} "), SemanticToken::Muted));
        spans.push(Span::new(count.to_string(), token).bold());
    }
    Line {
        spans,
        selected: false,
    }
}

fn chips_line(model: &BrowserModel) -> Line {
    let active = model.view.filters().category;
    let totals = model.view.totals();
    let mut spans = vec![Span::new(" ", SemanticToken::Neutral)];
    for (i, chip) in CategoryFilter::CHOICES.into_iter().enumerate() {
        let label = format!("{i}:{}", totals.chip_label(chip));
        if chip == active {
            spans.push(Span::new(format!("[{label}]"), SemanticToken::Accent).bold());
        } else {
            spans.push(Span::new(format!(" {label} "), SemanticToken::Muted));
        }
        spans.push(Span::new(" ", SemanticToken::Neutral));
    }
    Line {
        spans,
        selected: false,
    }
}

fn search_line(model: &BrowserModel) -> Line {
    let focused = model.focus == Focus::Search;
    let cursor = if focused { "▏" } else { "" };
    let placeholder = model.search_input.is_empty() && !focused;
    let input = if placeholder {
        Span::new("press / to search titles", SemanticToken::Muted)
    } else {
        Span::new(format!("{}{cursor}", model.search_input), SemanticToken::Neutral)
    };
    let label_token = if focused { SemanticToken::Accent } else { SemanticToken::Muted };
    Line {
        spans: vec![
            Span::new(" Search: ", label_token).bold(),
            input,
            Span::new("   Sort: ", SemanticToken::Muted),
            Span::new(model.view.filters().sort.label(), SemanticToken::Neutral),
        ],
        selected: false,
    }
}

fn list_lines(model: &BrowserModel, list_height: usize) -> Vec<Line> {
    let mut lines = Vec::with_capacity(list_height);
    if *model.view.load_state() == LoadState::Ready && model.view.filtered_len() == 0 {
        lines.push(Line::plain(format!(" {NO_MATCHES}"), SemanticToken::Muted));
    } else {
        for (row, record) in model.view.visible().enumerate().skip(model.scroll).take(list_height) {
            let active = model.active_file.as_deref() == Some(record.file.as_str());
            let marker = if active { ACTIVE_MARKER } else { " " };
            lines.push(Line {
                spans: vec![
                    Span::new(format!("{marker} "), SemanticToken::Accent),
                    Span::new(record.title.clone(), SemanticToken::Neutral),
                    Span::new("  ", SemanticToken::Neutral),
                    Span::new(
                        record.category.label(),
                        SemanticToken::for_category(record.category),
                    ),
                ],
                selected: row == model.cursor && model.focus == Focus::List,
            });
        }
    }
    lines.resize_with(list_height, Line::default);
    lines
}

fn duplicates_lines(model: &BrowserModel, list_height: usize) -> Vec<Line> {
    let mut lines: Vec<Line> = duplicate_lines(model.view.duplicates())
        .into_iter()
        .skip(model.duplicates_scroll)
        .take(list_height)
        .map(|text| {
            let token = if text.starts_with("Hash:") {
                SemanticToken::Warning
            } else {
                SemanticToken::Neutral
            };
            Line::plain(format!(" {text}"), token)
        })
        .collect();
    lines.resize_with(list_height, Line::default);
    lines
}

fn status_line(model: &BrowserModel) -> Line {
    let (status, token) = match model.view.load_state() {
        LoadState::Failed { .. } => (model.view.status_text(), SemanticToken::Danger),
        _ if model.debouncer.is_pending() => (STATUS_SEARCHING.to_string(), SemanticToken::Muted),
        _ => (model.view.status_text(), SemanticToken::Muted),
    };
    let mut line = Line::plain(format!(" {status}"), token);
    if let Some(note) = &model.notification {
        line.spans.push(Span::new(format!("  {note}"), SemanticToken::Warning));
    }
    line
}

fn help_line() -> Line {
    let mut spans = vec![Span::new(" ", SemanticToken::Muted)];
    for binding in help_bindings() {
        spans.push(Span::new(binding.keys, SemanticToken::Accent));
        spans.push(Span::new(format!(" {}  ", binding.description), SemanticToken::Muted));
    }
    Line {
        spans,
        selected: false,
    }
}

fn clip_line(line: &mut Line, width: usize) {
    let mut remaining = width;
    let mut kept = Vec::with_capacity(line.spans.len());
    for mut span in line.spans.drain(..) {
        if remaining == 0 {
            break;
        }
        let w = UnicodeWidthStr::width(span.text.as_str());
        if w > remaining {
            span.text = truncate_to_width(&span.text, remaining);
            remaining = 0;
        } else {
            remaining -= w;
        }
        kept.push(span);
    }
    line.spans = kept;
}

/// Write a composed frame to the terminal.
pub fn paint(out: &mut impl Write, frame: &Frame, theme: &Theme) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    for (row, line) in frame.lines.iter().enumerate() {
        let row = u16::try_from(row).unwrap_or(u16::MAX);
        queue!(out, MoveTo(0, row))?;
        if line.selected {
            match theme.selection_bg() {
                Some(bg) => queue!(out, SetBackgroundColor(bg))?,
                None => queue!(out, SetAttribute(Attribute::Reverse))?,
            }
        }
        let mut used = 0;
        for span in &line.spans {
            if let Some(fg) = theme.fg(span.token) {
                queue!(out, SetForegroundColor(fg))?;
            }
            if span.bold {
                queue!(out, SetAttribute(Attribute::Bold))?;
            }
            write!(out, "{}", span.text)?;
            if span.bold {
                queue!(out, SetAttribute(Attribute::NormalIntensity))?;
            }
            used += UnicodeWidthStr::width(span.text.as_str());
        }
        if line.selected {
            // Extend the highlight to the right edge.
            write!(out, "{:pad$}", "", pad = frame.width.saturating_sub(used))?;
        }
        queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
    }
    out.flush()
}
