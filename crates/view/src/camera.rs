use glam::{Mat4, Vec2, Vec3};

/// Look-at camera orbiting a target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    eye: Vec3,
    target: Vec3,
    up: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::Z,
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

impl Camera {
    /// # Panics
    /// If `eye` and `target` coincide.
    pub fn new(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        assert!(eye != target, "Camera eye and target must differ");
        Self { eye, target, up }
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn set_up(&mut self, up: Vec3) {
        self.up = up;
    }

    /// Unit vector from the eye towards the target.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize_or(Vec3::NEG_Z)
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize_or(Vec3::X)
    }

    /// Up direction orthogonal to the line of sight.
    pub fn true_up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    pub fn dist_eye_target(&self) -> f32 {
        self.eye.distance(self.target)
    }

    /// Move the eye along the line of sight, keeping the target.
    pub fn set_dist_eye_target(&mut self, distance: f32) {
        self.eye = self.target - self.forward() * distance;
    }

    /// Move eye and target together.
    pub fn translate(&mut self, delta: Vec3) {
        self.eye += delta;
        self.target += delta;
    }

    /// Slide the camera in its image plane by `offset`, expressed in
    /// target-plane units. The scene follows the cursor, so the camera moves
    /// the opposite way.
    pub fn pan(&mut self, offset: Vec2) {
        let delta = self.right() * offset.x + self.true_up() * offset.y;
        self.translate(-delta);
    }

    /// Aim at `target` without moving the eye.
    pub fn set_target(&mut self, target: Vec3) {
        assert!(target != self.eye, "Camera eye and target must differ");
        self.target = target;
    }

    /// World to camera space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        a.abs_diff_eq(b, 1e-5)
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let cam = Camera::default();
        assert_eq!(cam.forward(), Vec3::NEG_Z);
        assert_eq!(cam.dist_eye_target(), 1.0);
    }

    #[test]
    fn set_distance_keeps_direction() {
        let mut cam = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        cam.set_dist_eye_target(20.0);
        assert!(close(cam.eye(), Vec3::new(0.0, 0.0, 20.0)));
        assert_eq!(cam.target(), Vec3::ZERO);
    }

    #[test]
    fn translate_moves_both_points() {
        let mut cam = Camera::default();
        cam.translate(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(cam.target(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(cam.dist_eye_target(), 1.0);
    }

    #[test]
    fn pan_moves_against_offset() {
        let mut cam = Camera::default();
        cam.pan(Vec2::new(1.0, 0.0));
        assert!(close(cam.target(), Vec3::new(-1.0, 0.0, 0.0)));
        cam.pan(Vec2::new(0.0, 2.0));
        assert!(close(cam.target(), Vec3::new(-1.0, -2.0, 0.0)));
    }

    #[test]
    fn view_matrix_maps_target_onto_axis() {
        let cam = Camera::new(Vec3::new(3.0, 0.0, 10.0), Vec3::new(3.0, 0.0, 0.0), Vec3::Y);
        let p = cam.view_matrix().transform_point3(cam.target());
        assert!(close(p, Vec3::new(0.0, 0.0, -10.0)));
    }

    #[test]
    #[should_panic(expected = "must differ")]
    fn degenerate_camera_panics() {
        Camera::new(Vec3::ONE, Vec3::ONE, Vec3::Y);
    }
}
