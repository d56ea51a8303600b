use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Viewport configuration, usually read from a JSON file.
///
/// Every field is optional in the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSettings {
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
    #[serde(default = "default_dist_min")]
    pub dist_min: f32,
    #[serde(default = "default_dist_max")]
    pub dist_max: f32,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_eye")]
    pub eye: Vec3,
    #[serde(default)]
    pub target: Vec3,
    #[serde(default = "default_up")]
    pub up: Vec3,
    /// Reframe on the scene after loading.
    #[serde(default = "default_true")]
    pub reframe: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            fov_degrees: default_fov(),
            dist_min: default_dist_min(),
            dist_max: default_dist_max(),
            width: default_width(),
            height: default_height(),
            eye: default_eye(),
            target: Vec3::ZERO,
            up: default_up(),
            reframe: true,
        }
    }
}

fn default_fov() -> f32 {
    35.0
}

fn default_dist_min() -> f32 {
    0.01
}

fn default_dist_max() -> f32 {
    500.0
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

fn default_eye() -> Vec3 {
    Vec3::Z
}

fn default_up() -> Vec3 {
    Vec3::Y
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let settings: ViewSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, ViewSettings::default());
    }

    #[test]
    fn partial_object_overrides_fields() {
        let settings: ViewSettings =
            serde_json::from_str(r#"{ "fov_degrees": 50.0, "height": 0, "eye": [0.0, 5.0, 5.0] }"#)
                .unwrap();
        assert_eq!(settings.fov_degrees, 50.0);
        assert_eq!(settings.height, 0);
        assert_eq!(settings.eye, Vec3::new(0.0, 5.0, 5.0));
        assert_eq!(settings.dist_max, 500.0);
    }
}
