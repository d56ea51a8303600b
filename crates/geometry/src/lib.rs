//! Derived geometric representations.
//!
//! A [`Representation`] is the payload the binary cache persists: a named list
//! of bodies plus the time the source geometry was last modified.
//!
//! # Invariants
//! - Every mutation of a representation refreshes `last_modified`.
//! - Two representations with the same content hash have the same geometry.

mod mesh;
mod rep;

pub use mesh::{Material, Mesh};
pub use rep::Representation;

/// Errors from geometry validation.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("mesh '{mesh}': index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        mesh: String,
        index: u32,
        vertex_count: usize,
    },
    #[error("mesh '{mesh}': index count {count} is not a multiple of 3")]
    NotTriangles { mesh: String, count: usize },
    #[error("mesh '{mesh}': {normals} normals for {positions} positions")]
    NormalCountMismatch {
        mesh: String,
        normals: usize,
        positions: usize,
    },
}
