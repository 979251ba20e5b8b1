#![forbid(unsafe_code)]

//! IELTS catalog (iecat): build, filter, sort and page through a static
//! catalog of IELTS test documents.
//!
//! The pieces:
//! 1. **Builder** scans a site root for test documents, hashes them and writes
//!    `data/tests.json` plus `data/duplicates.json`
//! 2. **Browse pipeline** filters by category and title, sorts with locale-aware
//!    collation or a date heuristic, and materializes results in batches
//! 3. **Browser** is a terminal UI over the pipeline with persisted preferences
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use ielts_catalog::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use ielts_catalog::core::config::Config;
//! use ielts_catalog::browse::filter::{FilterState, apply_filters};
//! ```

pub mod prelude;

pub mod browse;
pub mod builder;
pub mod catalog;
pub mod core;
pub mod logger;
pub mod platform;
#[cfg(feature = "tui")]
pub mod tui;
