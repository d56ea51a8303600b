//! Scene graph for scenerep.
//!
//! Occurrences form a tree owned by the world's root. Each occurrence may
//! instance a shared [`Reference`] carrying a representation. A
//! [`WorldHandle`] keeps a flat id registry over the tree, a selection set
//! and a view collection of renderable instances. [`World`] values share one
//! handle and count its owners.
//!
//! # Invariants
//!
//! - An id is registered at most once per handle.
//! - Every selected id is registered; removing an occurrence unselects it.
//! - Only occurrences whose reference has geometry own a view instance.
//! - A handle starts with one owner and is orphan once the count reaches zero.
//!
//! Misuse (duplicate registration, selecting an unknown id, releasing an
//! orphan handle) panics. Lookups a caller may reasonably get wrong return
//! [`SceneError`].

mod collection;
mod handle;
mod occurrence;
mod selection;
mod world;

pub use collection::{ViewCollection, ViewInstance};
pub use handle::WorldHandle;
pub use occurrence::{Occurrence, OccurrenceRef, Reference};
pub use selection::{
    Highlight, SelectionChange, SelectionEvent, SelectionMode, SelectionObserver, SelectionSet,
};
pub use world::World;

use scenerep_common::OccurrenceId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("occurrence {0} not found in world")]
    OccurrenceNotFound(OccurrenceId),
    #[error("occurrence {0} is already registered in world")]
    AlreadyRegistered(OccurrenceId),
}
