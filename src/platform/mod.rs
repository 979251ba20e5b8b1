//! OS integration points.

pub mod opener;
