//! Interactive terminal browser over the catalog.
//!
//! Elm-style split: `model` holds state, `update` is the pure transition
//! function, `render` composes frames, and `runtime` owns the terminal and
//! executes side-effects.

#![allow(missing_docs)]

pub mod input;
pub mod model;
pub mod render;
pub mod runtime;
pub mod terminal_guard;
pub mod theme;
pub mod update;

pub use runtime::{BrowserConfig, run_browser};
