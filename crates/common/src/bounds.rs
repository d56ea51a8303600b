use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
///
/// A box is empty until a point has been added to it; `min > max` on any axis
/// encodes emptiness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    min: Vec3,
    max: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BoundingBox {
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Box spanning two corners, in any order.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest box containing every point.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        let mut bbox = Self::EMPTY;
        for p in points {
            bbox.combine_point(*p);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Center of the box. Meaningless for an empty box.
    pub fn center(&self) -> Vec3 {
        debug_assert!(!self.is_empty(), "center of an empty bounding box");
        (self.min + self.max) * 0.5
    }

    /// Radius of the sphere circumscribing the box.
    pub fn bounding_sphere_radius(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        (self.max - self.min).length() * 0.5
    }

    pub fn combine_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn combine(&mut self, other: &BoundingBox) {
        if other.is_empty() {
            return;
        }
        self.combine_point(other.min);
        self.combine_point(other.max);
    }

    pub fn contains(&self, point: Vec3) -> bool {
        !self.is_empty() && point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Axis-aligned box of the eight transformed corners.
    pub fn transformed(&self, matrix: &Mat4) -> BoundingBox {
        if self.is_empty() {
            return Self::EMPTY;
        }
        let mut out = Self::EMPTY;
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            out.combine_point(matrix.transform_point3(corner));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_box_is_empty() {
        let b = BoundingBox::default();
        assert!(b.is_empty());
        assert_eq!(b.bounding_sphere_radius(), 0.0);
    }

    #[test]
    fn from_points_spans_all() {
        let pts = [Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, -2.0, 0.0)];
        let b = BoundingBox::from_points(&pts);
        assert_eq!(b.min(), Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max(), Vec3::new(3.0, 0.0, 2.0));
        assert_eq!(b.center(), Vec3::new(1.0, -1.0, 1.0));
    }

    #[test]
    fn radius_is_half_diagonal() {
        let b = BoundingBox::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));
        assert!((b.bounding_sphere_radius() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn combine_ignores_empty() {
        let mut b = BoundingBox::new(Vec3::ZERO, Vec3::ONE);
        b.combine(&BoundingBox::EMPTY);
        assert_eq!(b, BoundingBox::new(Vec3::ZERO, Vec3::ONE));
    }

    #[test]
    fn transform_translates_box() {
        let b = BoundingBox::new(Vec3::ZERO, Vec3::ONE);
        let moved = b.transformed(&Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        assert_eq!(moved.min(), Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(moved.max(), Vec3::new(11.0, 1.0, 1.0));
        assert!(moved.contains(Vec3::new(10.5, 0.5, 0.5)));
        assert!(!moved.contains(Vec3::ZERO));
    }

    #[test]
    fn transforming_empty_box_stays_empty() {
        let t = BoundingBox::EMPTY.transformed(&Mat4::from_scale(Vec3::splat(2.0)));
        assert!(t.is_empty());
    }
}
