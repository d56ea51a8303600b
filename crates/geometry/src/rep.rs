use chrono::{DateTime, Utc};
use scenerep_common::BoundingBox;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{GeometryError, Mesh};

/// A derived geometric representation: named bodies plus a modification time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Representation {
    name: String,
    bodies: Vec<Mesh>,
    last_modified: DateTime<Utc>,
}

impl Default for Representation {
    fn default() -> Self {
        Self::new("")
    }
}

impl Representation {
    /// Create an empty representation stamped with the current time.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bodies: Vec::new(),
            last_modified: Utc::now(),
        }
    }

    /// Create a representation holding a single body.
    pub fn from_mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        let mut rep = Self::new(name);
        rep.add_body(mesh);
        rep
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn bodies(&self) -> &[Mesh] {
        &self.bodies
    }

    pub fn add_body(&mut self, mesh: Mesh) {
        self.bodies.push(mesh);
        self.touch();
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
        self.touch();
    }

    /// Time the source geometry was last modified.
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// Override the modification time, e.g. with the mtime of the source file.
    pub fn set_last_modified(&mut self, time: DateTime<Utc>) {
        self.last_modified = time;
    }

    pub fn number_of_body(&self) -> usize {
        self.bodies.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.bodies.iter().map(Mesh::vertex_count).sum()
    }

    pub fn face_count(&self) -> usize {
        self.bodies.iter().map(Mesh::face_count).sum()
    }

    /// True when no body carries a vertex.
    pub fn is_empty(&self) -> bool {
        self.bodies.iter().all(Mesh::is_empty)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::EMPTY;
        for body in &self.bodies {
            bbox.combine(&body.bounding_box());
        }
        bbox
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        self.bodies.iter().try_for_each(Mesh::validate)
    }

    /// SHA-256 over the geometric content, hex encoded.
    ///
    /// Name and modification time are not part of the hash.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.bodies.len() as u64).to_le_bytes());
        for body in &self.bodies {
            hasher.update((body.positions.len() as u64).to_le_bytes());
            for p in &body.positions {
                for c in p.to_array() {
                    hasher.update(c.to_le_bytes());
                }
            }
            hasher.update((body.normals.len() as u64).to_le_bytes());
            for n in &body.normals {
                for c in n.to_array() {
                    hasher.update(c.to_le_bytes());
                }
            }
            hasher.update((body.indices.len() as u64).to_le_bytes());
            for i in &body.indices {
                hasher.update(i.to_le_bytes());
            }
            for c in body.material.base_color {
                hasher.update(c.to_le_bytes());
            }
        }
        format!("{:x}", hasher.finalize())
    }

    fn touch(&mut self) {
        self.last_modified = Utc::now();
    }
}
