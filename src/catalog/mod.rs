//! Catalog data: records, loading, aggregate stats.

pub mod loader;
pub mod record;
pub mod stats;
