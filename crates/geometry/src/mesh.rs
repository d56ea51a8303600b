use glam::Vec3;
use scenerep_common::BoundingBox;
use serde::{Deserialize, Serialize};

use crate::GeometryError;

/// Surface material of a body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".into(),
            base_color: [0.8, 0.8, 0.8, 1.0],
        }
    }
}

/// Indexed triangle mesh: one body of a representation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub material: Material,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Axis-aligned cube centered on the origin, 24 vertices / 12 triangles.
    pub fn cube(name: impl Into<String>, size: f32) -> Self {
        let h = size * 0.5;
        let faces: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y, Vec3::X),
        ];
        let mut mesh = Self::new(name);
        for (normal, u, v) in faces {
            let base = mesh.positions.len() as u32;
            let center = normal * h;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                mesh.positions.push(center + u * (su * h) + v * (sv * h));
                mesh.normals.push(normal);
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.positions)
    }

    /// Check index bounds, triangle layout and normal count.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.indices.len() % 3 != 0 {
            return Err(GeometryError::NotTriangles {
                mesh: self.name.clone(),
                count: self.indices.len(),
            });
        }
        if !self.normals.is_empty() && self.normals.len() != self.positions.len() {
            return Err(GeometryError::NormalCountMismatch {
                mesh: self.name.clone(),
                normals: self.normals.len(),
                positions: self.positions.len(),
            });
        }
        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.positions.len())
        {
            return Err(GeometryError::IndexOutOfRange {
                mesh: self.name.clone(),
                index,
                vertex_count: self.positions.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_counts() {
        let cube = Mesh::cube("cube", 2.0);
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.face_count(), 12);
        cube.validate().unwrap();
    }

    #[test]
    fn cube_bounds_match_size() {
        let cube = Mesh::cube("cube", 2.0);
        let b = cube.bounding_box();
        assert!((b.min() - Vec3::splat(-1.0)).length() < 1e-6);
        assert!((b.max() - Vec3::splat(1.0)).length() < 1e-6);
    }

    #[test]
    fn empty_mesh_has_empty_bounds() {
        let mesh = Mesh::new("nothing");
        assert!(mesh.is_empty());
        assert!(mesh.bounding_box().is_empty());
    }

    #[test]
    fn validate_rejects_out_of_range_index() {
        let mut mesh = Mesh::new("broken");
        mesh.positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        mesh.indices = vec![0, 1, 5];
        match mesh.validate() {
            Err(GeometryError::IndexOutOfRange { index, .. }) => assert_eq!(index, 5),
            other => panic!("expected IndexOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_partial_triangle() {
        let mut mesh = Mesh::new("partial");
        mesh.positions = vec![Vec3::ZERO, Vec3::X];
        mesh.indices = vec![0, 1];
        assert!(matches!(
            mesh.validate(),
            Err(GeometryError::NotTriangles { count: 2, .. })
        ));
    }
}
