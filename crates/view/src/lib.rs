//! Viewing for scenerep: camera, viewport, picking and the renderer interface.
//!
//! # Invariants
//! - The near clipping distance stays below the far one.
//! - The window height is never zero.
//! - Renderers read the scene; they never mutate it.

mod camera;
pub mod picking;
mod renderer;
mod settings;
mod viewport;

pub use camera::Camera;
pub use renderer::{DebugTextRenderer, Renderer};
pub use settings::ViewSettings;
pub use viewport::{Segment, Viewport};
