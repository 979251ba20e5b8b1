//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use ielts_catalog::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{CatalogError, Result};

// Catalog
pub use crate::catalog::loader::{SiteData, load_site};
pub use crate::catalog::record::{Category, DuplicateGroup, TestRecord};
pub use crate::catalog::stats::{CategoryTotals, summarize_duplicates};

// Browse
pub use crate::browse::filter::{CategoryFilter, FilterState, SortMode, apply_filters};
pub use crate::browse::pager::{LazyPager, PagerPhase};
pub use crate::browse::view::CatalogView;

// Builder
pub use crate::builder::{BuildReport, build_catalog};
