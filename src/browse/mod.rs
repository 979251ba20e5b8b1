//! The browsing pipeline: filter → sort → paginate → load more.

pub mod collate;
pub mod date_key;
pub mod debounce;
pub mod filter;
pub mod pager;
pub mod preferences;
pub mod view;
