//! Owned browsing state: catalog, filters, filtered order and the pager.
//!
//! Every filter mutation recomputes the filtered order, resets the pager and
//! renders the first batch before returning, so callers never observe a
//! window belonging to an older filter.

use std::ops::Range;

use crate::browse::filter::{CategoryFilter, FilterState, SortMode, filter_indices};
use crate::browse::pager::{LazyPager, PagerPhase};
use crate::catalog::record::{DuplicateGroup, TestRecord};
use crate::catalog::stats::CategoryTotals;
use crate::core::errors::CatalogError;

pub const STATUS_LOADING: &str = "Loading data...";
pub const STATUS_SEARCHING: &str = "Searching...";
pub const STATUS_LOAD_FAILED: &str = "Could not read data. Check the files in data/.";
pub const COUNT_LOAD_FAILED: &str = "Could not load test list";
pub const NO_MATCHES: &str = "No tests match the current filters.";

/// Where the catalog data stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    /// Required data failed; carries the error code and message.
    Failed { code: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct CatalogView {
    records: Vec<TestRecord>,
    duplicates: Vec<DuplicateGroup>,
    totals: CategoryTotals,
    filters: FilterState,
    filtered: Vec<usize>,
    pager: LazyPager,
    load_state: LoadState,
    fallback_year: i32,
}

impl CatalogView {
    #[must_use]
    pub fn new(filters: FilterState, batch_size: usize, prefetch_rows: usize, fallback_year: i32) -> Self {
        Self {
            records: Vec::new(),
            duplicates: Vec::new(),
            totals: CategoryTotals::default(),
            filters,
            filtered: Vec::new(),
            pager: LazyPager::new(batch_size, prefetch_rows),
            load_state: LoadState::Loading,
            fallback_year,
        }
    }

    /// Install a freshly loaded catalog and render its first batch.
    pub fn set_catalog(&mut self, records: Vec<TestRecord>, duplicates: Vec<DuplicateGroup>) {
        self.totals = CategoryTotals::from_records(&records);
        self.records = records;
        self.duplicates = duplicates;
        self.load_state = LoadState::Ready;
        self.refilter();
    }

    /// Required data failed: drop everything, show no partial catalog.
    pub fn set_load_failed(&mut self, err: &CatalogError) {
        self.records.clear();
        self.duplicates.clear();
        self.totals = CategoryTotals::default();
        self.filtered.clear();
        self.pager.reset(0);
        self.load_state = LoadState::Failed {
            code: err.code(),
            message: err.to_string(),
        };
    }

    pub fn set_loading(&mut self) {
        self.load_state = LoadState::Loading;
    }

    /// Replace the whole selection. Returns whether anything changed.
    pub fn set_filters(&mut self, filters: FilterState) -> bool {
        if filters == self.filters {
            return false;
        }
        self.filters = filters;
        self.refilter();
        true
    }

    pub fn set_category(&mut self, category: CategoryFilter) -> bool {
        let next = FilterState {
            category,
            ..self.filters.clone()
        };
        self.set_filters(next)
    }

    pub fn set_query(&mut self, query: &str) -> bool {
        let next = FilterState {
            query: query.to_string(),
            ..self.filters.clone()
        };
        self.set_filters(next)
    }

    pub fn set_sort(&mut self, sort: SortMode) -> bool {
        let next = FilterState {
            sort,
            ..self.filters.clone()
        };
        self.set_filters(next)
    }

    pub fn reset_filters(&mut self) -> bool {
        self.set_filters(FilterState::default())
    }

    /// Viewport proximity check; appends a batch when the watcher fires.
    pub fn load_more(&mut self, viewport_end: usize) -> Option<Range<usize>> {
        self.pager.on_intersection(viewport_end)
    }

    /// Keep rendering while the window ends inside the viewport.
    pub fn fill_viewport(&mut self, viewport_end: usize) -> usize {
        self.pager.fill_viewport(viewport_end)
    }

    /// Append one batch unconditionally (the CLI's `--page` walk).
    pub fn render_next(&mut self) -> Range<usize> {
        self.pager.render_next()
    }

    /// Render everything that is left.
    pub fn render_all(&mut self) {
        while self.pager.phase() == PagerPhase::Partial {
            self.pager.render_next();
        }
    }

    fn refilter(&mut self) {
        self.filtered = filter_indices(&self.records, &self.filters, self.fallback_year);
        self.pager.reset(self.filtered.len());
        self.pager.render_next();
    }

    /// Materialized rows, in display order.
    pub fn visible(&self) -> impl Iterator<Item = &TestRecord> + '_ {
        self.filtered[..self.pager.window_len()]
            .iter()
            .map(|&i| &self.records[i])
    }

    #[must_use]
    pub fn visible_record(&self, row: usize) -> Option<&TestRecord> {
        if row >= self.pager.window_len() {
            return None;
        }
        self.filtered.get(row).map(|&i| &self.records[i])
    }

    #[must_use]
    pub fn visible_len(&self) -> usize {
        self.pager.window_len()
    }

    #[must_use]
    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    #[must_use]
    pub fn total_len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn records(&self) -> &[TestRecord] {
        &self.records
    }

    #[must_use]
    pub fn duplicates(&self) -> &[DuplicateGroup] {
        &self.duplicates
    }

    #[must_use]
    pub const fn totals(&self) -> &CategoryTotals {
        &self.totals
    }

    #[must_use]
    pub const fn filters(&self) -> &FilterState {
        &self.filters
    }

    #[must_use]
    pub const fn pager(&self) -> &LazyPager {
        &self.pager
    }

    #[must_use]
    pub const fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    /// Status bar line.
    #[must_use]
    pub fn status_text(&self) -> String {
        match &self.load_state {
            LoadState::Loading => STATUS_LOADING.to_string(),
            LoadState::Failed { .. } => STATUS_LOAD_FAILED.to_string(),
            LoadState::Ready => format!(
                "Showing {} / {} tests.",
                self.visible_len(),
                self.filtered_len()
            ),
        }
    }

    /// Result counter next to the list header.
    #[must_use]
    pub fn result_count_text(&self) -> String {
        match &self.load_state {
            LoadState::Failed { .. } => COUNT_LOAD_FAILED.to_string(),
            _ if self.filtered.is_empty() => "0 results".to_string(),
            _ => format!("{} / {} tests", self.filtered_len(), self.total_len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::record::Category;
    use std::path::PathBuf;

    /// 120 records: 60 reading, 40 listening, 20 writing.
    fn catalog_120() -> Vec<TestRecord> {
        (0..120)
            .map(|i| {
                let category = match i % 6 {
                    0..=2 => Category::Reading,
                    3 | 4 => Category::Listening,
                    _ => Category::Writing,
                };
                TestRecord::new(format!("t{i:03}.html"), format!("Test {i:03}"), category)
            })
            .collect()
    }

    fn view() -> CatalogView {
        let mut view = CatalogView::new(FilterState::default(), 50, 5, 2026);
        view.set_catalog(catalog_120(), Vec::new());
        view
    }

    #[test]
    fn reading_scenario_grows_fifty_then_sixty() {
        let mut view = view();
        assert_eq!(view.totals().reading, 60);

        assert!(view.set_category(CategoryFilter::Only(Category::Reading)));
        assert_eq!(view.filtered_len(), 60);
        assert_eq!(view.visible_len(), 50);
        assert_eq!(view.pager().phase(), PagerPhase::Partial);

        assert_eq!(view.load_more(50), Some(50..60));
        assert_eq!(view.visible_len(), 60);
        assert_eq!(view.pager().phase(), PagerPhase::Complete);

        assert_eq!(view.load_more(60), None);
        assert_eq!(view.visible_len(), 60);
    }

    #[test]
    fn filter_change_drops_stale_rows() {
        let mut view = view();
        view.render_all();
        assert_eq!(view.visible_len(), 120);

        view.set_category(CategoryFilter::Only(Category::Writing));
        assert_eq!(view.visible_len(), 20);
        assert!(view.visible().all(|r| r.category == Category::Writing));
    }

    #[test]
    fn unchanged_filter_keeps_window() {
        let mut view = view();
        view.load_more(50);
        assert_eq!(view.visible_len(), 100);
        assert!(!view.set_sort(SortMode::TitleAsc));
        assert_eq!(view.visible_len(), 100);
    }

    #[test]
    fn status_and_count_text() {
        let mut view = CatalogView::new(FilterState::default(), 50, 5, 2026);
        assert_eq!(view.status_text(), STATUS_LOADING);

        view.set_catalog(catalog_120(), Vec::new());
        assert_eq!(view.status_text(), "Showing 50 / 120 tests.");
        assert_eq!(view.result_count_text(), "120 / 120 tests");

        view.set_query("no such title");
        assert_eq!(view.result_count_text(), "0 results");
        assert_eq!(view.status_text(), "Showing 0 / 0 tests.");
    }

    #[test]
    fn failed_load_shows_no_partial_catalog() {
        let mut view = view();
        view.set_load_failed(&CatalogError::LoadFailed {
            path: PathBuf::from("data/tests.json"),
            details: "not found".to_string(),
        });
        assert_eq!(view.visible_len(), 0);
        assert_eq!(view.total_len(), 0);
        assert_eq!(view.status_text(), STATUS_LOAD_FAILED);
        assert_eq!(view.result_count_text(), COUNT_LOAD_FAILED);
    }

    #[test]
    fn reset_filters_restores_defaults() {
        let mut view = view();
        view.set_query("Test 00");
        view.set_sort(SortMode::TitleDesc);
        assert!(view.reset_filters());
        assert!(view.filters().is_default());
        assert_eq!(view.filtered_len(), 120);
    }

    #[test]
    fn visible_record_is_bounded_by_window() {
        let view = view();
        assert!(view.visible_record(49).is_some());
        assert!(view.visible_record(50).is_none());
    }
}
