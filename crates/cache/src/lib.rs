//! Binary representation cache.
//!
//! A cache file holds a fixed header followed by one serialized
//! [`Representation`](scenerep_geometry::Representation):
//! ```text
//! magic      16 bytes   UUID d6f97789-36a9-4c2e-b667-0e66c27f839f
//! version    u32 BE     exactly 100
//! timestamp  i64 BE     seconds since the Unix epoch
//!            u32 BE     nanoseconds
//! payload    zstd frame of the CBOR-encoded representation
//! ```
//!
//! # Invariants
//! - Cache paths always end with the `.BSRep` suffix.
//! - A handle holds at most one open file; re-opening an open handle panics.
//! - The file is released before any error is returned.
//! - A failed save never leaves a file at the cache path.

mod bsrep;
mod header;

use std::path::PathBuf;

pub use bsrep::{BinaryRep, OpenMode};
pub use header::{MAGIC, SUFFIX, VERSION};

/// Errors surfaced by the binary cache.
#[derive(Debug, thiserror::Error)]
pub enum BinaryRepError {
    #[error("binary rep not found: {}", .path.display())]
    NotFound { path: PathBuf },
    #[error("unsupported binary rep {}: {reason}", .path.display())]
    UnsupportedFormat { path: PathBuf, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
