//! Incremental materialization of the filtered list.
//!
//! The visible window is always a prefix of the filtered sequence. It starts
//! empty after every reset, grows one batch per render, and a load-more
//! watcher sits on the row just past the window (the sentinel) while more
//! rows remain.

use std::ops::Range;

/// Where the pager is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerPhase {
    /// Window empty; nothing rendered since the last filter change.
    Reset,
    /// Some rows rendered, watcher armed on the sentinel.
    Partial,
    /// Every filtered row rendered, watcher torn down.
    Complete,
}

impl PagerPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::Partial => "partial",
            Self::Complete => "complete",
        }
    }
}

/// Fires when the viewport comes within `margin` rows of the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadMoreWatcher {
    sentinel: usize,
    margin: usize,
}

impl LoadMoreWatcher {
    #[must_use]
    pub const fn new(sentinel: usize, margin: usize) -> Self {
        Self { sentinel, margin }
    }

    /// Row index the watcher observes.
    #[must_use]
    pub const fn sentinel(&self) -> usize {
        self.sentinel
    }

    /// `viewport_end` is one past the last row on screen.
    #[must_use]
    pub const fn intersects(&self, viewport_end: usize) -> bool {
        viewport_end.saturating_add(self.margin) >= self.sentinel
    }
}

/// Lazy-render controller over a filtered sequence of known length.
#[derive(Debug, Clone)]
pub struct LazyPager {
    batch_size: usize,
    margin: usize,
    filtered_len: usize,
    window: usize,
    phase: PagerPhase,
    watcher: Option<LoadMoreWatcher>,
}

impl LazyPager {
    /// `batch_size` of zero is treated as one.
    #[must_use]
    pub fn new(batch_size: usize, margin: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            margin,
            filtered_len: 0,
            window: 0,
            phase: PagerPhase::Reset,
            watcher: None,
        }
    }

    /// Drop the window for a new filtered sequence. The watcher goes first so
    /// a stale trigger cannot append into the new sequence.
    pub fn reset(&mut self, filtered_len: usize) {
        self.watcher = None;
        self.window = 0;
        self.filtered_len = filtered_len;
        self.phase = PagerPhase::Reset;
    }

    /// Append the next batch and re-arm or tear down the watcher.
    ///
    /// Resumes from the current window, so calling it again after completion
    /// appends nothing.
    pub fn render_next(&mut self) -> Range<usize> {
        let start = self.window;
        let end = start.saturating_add(self.batch_size).min(self.filtered_len);
        self.window = end;

        if end < self.filtered_len {
            self.watcher = Some(LoadMoreWatcher::new(end, self.margin));
            self.phase = PagerPhase::Partial;
        } else {
            self.watcher = None;
            self.phase = PagerPhase::Complete;
        }
        start..end
    }

    /// Viewport moved. Appends a batch if the watcher fires, otherwise `None`.
    pub fn on_intersection(&mut self, viewport_end: usize) -> Option<Range<usize>> {
        let watcher = self.watcher?;
        if !watcher.intersects(viewport_end) {
            return None;
        }
        let appended = self.render_next();
        (!appended.is_empty()).then_some(appended)
    }

    /// Render until the watcher stops firing for this viewport. Used after a
    /// reset when the first batch does not fill the screen.
    pub fn fill_viewport(&mut self, viewport_end: usize) -> usize {
        let mut appended = 0;
        while let Some(range) = self.on_intersection(viewport_end) {
            appended += range.len();
        }
        appended
    }

    #[must_use]
    pub const fn window_len(&self) -> usize {
        self.window
    }

    #[must_use]
    pub const fn filtered_len(&self) -> usize {
        self.filtered_len
    }

    #[must_use]
    pub const fn phase(&self) -> PagerPhase {
        self.phase
    }

    #[must_use]
    pub const fn watcher(&self) -> Option<LoadMoreWatcher> {
        self.watcher
    }

    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }
}
