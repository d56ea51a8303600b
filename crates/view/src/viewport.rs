use glam::{Mat4, Vec2, Vec3};
use scenerep_common::BoundingBox;

use crate::camera::Camera;
use crate::settings::ViewSettings;

/// Margin applied around the scene sphere when fitting clipping planes.
const CLIP_MARGIN: f32 = 1.1;

/// A line segment of the target cross.
pub type Segment = (Vec3, Vec3);

/// Camera plus projection parameters and window size.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    camera: Camera,
    fov_degrees: f32,
    dist_min: f32,
    dist_max: f32,
    win_width: u32,
    win_height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_settings(&ViewSettings::default())
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    /// If the settings describe an invalid field of view, unordered clipping
    /// distances or a degenerate camera.
    pub fn from_settings(settings: &ViewSettings) -> Self {
        let mut viewport = Self {
            camera: Camera::new(settings.eye, settings.target, settings.up),
            fov_degrees: 35.0,
            dist_min: settings.dist_min.abs(),
            dist_max: settings.dist_max.abs(),
            win_width: 1,
            win_height: 1,
        };
        assert!(
            viewport.dist_min < viewport.dist_max,
            "near distance {} must be below far distance {}",
            viewport.dist_min,
            viewport.dist_max
        );
        viewport.set_fov(settings.fov_degrees);
        viewport.set_win_gl_size(settings.width, settings.height);
        viewport
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn fov(&self) -> f32 {
        self.fov_degrees
    }

    /// # Panics
    /// Unless `0 < fov_degrees < 180`.
    pub fn set_fov(&mut self, fov_degrees: f32) {
        assert!(
            fov_degrees > 0.0 && fov_degrees < 180.0,
            "field of view must lie in (0, 180) degrees, got {fov_degrees}"
        );
        self.fov_degrees = fov_degrees;
    }

    /// `tan(fov / 2)`.
    pub fn view_tangent(&self) -> f32 {
        (self.fov_degrees.to_radians() / 2.0).tan()
    }

    pub fn win_width(&self) -> u32 {
        self.win_width
    }

    pub fn win_height(&self) -> u32 {
        self.win_height
    }

    /// A zero height is stored as 1.
    pub fn set_win_gl_size(&mut self, width: u32, height: u32) {
        self.win_width = width;
        self.win_height = height.max(1);
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.win_width as f32 / self.win_height as f32
    }

    pub fn dist_min(&self) -> f32 {
        self.dist_min
    }

    pub fn dist_max(&self) -> f32 {
        self.dist_max
    }

    /// Set the near clipping distance. Negative values are taken by absolute
    /// value. Returns false, leaving the viewport untouched, unless the
    /// result is below the far distance.
    pub fn set_dist_min(&mut self, distance: f32) -> bool {
        let distance = distance.abs();
        if distance < self.dist_max {
            self.dist_min = distance;
            true
        } else {
            tracing::debug!(distance, dist_max = self.dist_max, "near distance rejected");
            false
        }
    }

    /// Far clipping counterpart of [`set_dist_min`](Self::set_dist_min).
    pub fn set_dist_max(&mut self, distance: f32) -> bool {
        let distance = distance.abs();
        if distance > self.dist_min {
            self.dist_max = distance;
            true
        } else {
            tracing::debug!(distance, dist_min = self.dist_min, "far distance rejected");
            false
        }
    }

    /// Fit both clipping distances on `scene`, seen from the current camera.
    ///
    /// With the eye inside the scene sphere the near distance falls back to
    /// `min(0.01 * radius, dist_eye_target / 4)`. An empty scene yields
    /// `[dist / 2, dist]`.
    pub fn set_dist_min_and_max(&mut self, scene: &BoundingBox) {
        let dist = self.camera.dist_eye_target();
        if scene.is_empty() {
            self.dist_min = dist / 2.0;
            self.dist_max = dist;
            return;
        }
        let in_camera = scene.transformed(&self.camera.view_matrix());
        let center = in_camera.center().z.abs();
        let radius = in_camera.bounding_sphere_radius();
        let min = center - radius * CLIP_MARGIN;
        let max = center + radius * CLIP_MARGIN;
        if min > 0.0 {
            self.dist_min = min;
        } else {
            self.dist_min = (0.01 * radius).min(dist / 4.0);
        }
        self.dist_max = max;
        tracing::trace!(dist_min = self.dist_min, dist_max = self.dist_max, "clipping fitted");
    }

    /// Center the target on `scene` and back off until its bounding sphere
    /// fills the field of view.
    ///
    /// # Panics
    /// If `scene` is empty.
    pub fn reframe(&mut self, scene: &BoundingBox) {
        assert!(!scene.is_empty(), "Viewport::reframe requires a non-empty bounding box");
        let delta = scene.center() - self.camera.target();
        self.camera.translate(delta);
        let cover = scene.bounding_sphere_radius() * 2.0;
        let distance = cover / (2.0 * self.view_tangent());
        self.camera.set_dist_eye_target(distance);
        tracing::debug!(distance, "viewport reframed");
    }

    /// Length of the field of view on the target plane.
    pub fn field_of_view_length(&self) -> f32 {
        2.0 * self.camera.dist_eye_target() * self.view_tangent()
    }

    /// Map a window position (origin top left, y down) to an offset on the
    /// target plane (origin at the window center, y up).
    pub fn map_pos_mouse(&self, x: f32, y: f32) -> Vec2 {
        let centered = Vec2::new(
            x - self.win_width as f32 / 2.0,
            self.win_height as f32 / 2.0 - y,
        );
        centered * (self.field_of_view_length() / self.win_height as f32)
    }

    /// Pan so the scene point under `(x, y)` moves to the window center.
    pub fn pan_to(&mut self, x: f32, y: f32) {
        let offset = self.map_pos_mouse(x, y);
        self.camera.pan(-offset);
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.camera.view_matrix()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect_ratio(),
            self.dist_min,
            self.dist_max,
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// The six segments of the cross drawn on the camera target.
    ///
    /// Each axis spans one seventh of half the shorter window side, with a
    /// gap of a third of that length around the target.
    pub fn target_cross(&self) -> [Segment; 6] {
        let half_side = (self.win_width.min(self.win_height) / 2) as f32;
        let length = (half_side * self.field_of_view_length() / self.win_height as f32) / 7.0;
        let gap = length / 3.0;
        let t = self.camera.target();
        let mut segments = [(Vec3::ZERO, Vec3::ZERO); 6];
        for (i, axis) in [Vec3::X, Vec3::Y, Vec3::Z].into_iter().enumerate() {
            segments[2 * i] = (t - axis * length, t - axis * gap);
            segments[2 * i + 1] = (t + axis * gap, t + axis * length);
        }
        segments
    }
}
