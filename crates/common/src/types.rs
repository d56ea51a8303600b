use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_OCCURRENCE_ID: AtomicU32 = AtomicU32::new(1);

/// Unique 32-bit identifier of an occurrence in the scene graph.
///
/// `0` is reserved as the null id (nothing under the cursor when picking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OccurrenceId(pub u32);

impl OccurrenceId {
    /// The reserved null id.
    pub const NULL: Self = Self(0);

    /// Allocate a fresh id from the process-wide generator.
    ///
    /// The generator skips `0` when it wraps after `u32::MAX` ids.
    pub fn generate() -> Self {
        next_id(&NEXT_OCCURRENCE_ID)
    }

    /// True for [`OccurrenceId::NULL`].
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

fn next_id(counter: &AtomicU32) -> OccurrenceId {
    loop {
        let raw = counter.fetch_add(1, Ordering::Relaxed);
        if raw != 0 {
            return OccurrenceId(raw);
        }
    }
}

impl std::fmt::Display for OccurrenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Pure translation.
    pub fn from_translation(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Affine matrix applying scale, then rotation, then translation.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique_and_not_null() {
        let a = OccurrenceId::generate();
        let b = OccurrenceId::generate();
        assert_ne!(a, b);
        assert!(!a.is_null());
        assert!(!b.is_null());
    }

    #[test]
    fn wrapped_generator_skips_null() {
        let counter = AtomicU32::new(u32::MAX);
        assert_eq!(next_id(&counter), OccurrenceId(u32::MAX));
        assert_eq!(next_id(&counter), OccurrenceId(1));
        assert_eq!(next_id(&counter), OccurrenceId(2));
    }

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.to_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn translation_matrix_moves_points() {
        let t = Transform::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let p = t.to_matrix().transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(1.0, 2.0, 3.0));
    }
}
