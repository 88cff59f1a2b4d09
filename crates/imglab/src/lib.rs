//! Umbrella crate for the `imglab` workspace.
//!
//! Re-exports the image container (`il-core`) and the filter engine
//! (`il-filter`).

pub use il_core::*;
pub use il_filter::*;
