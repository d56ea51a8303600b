//! Shared types for the scenerep workspace.
//!
//! # Invariants
//! - `OccurrenceId` values handed out by [`OccurrenceId::generate`] are never `0`.
//!   They do not repeat until the 32-bit generator wraps, after `u32::MAX` ids.
//! - An empty [`BoundingBox`] has no center and no radius.

mod bounds;
mod types;

pub use bounds::BoundingBox;
pub use types::{OccurrenceId, Transform};
