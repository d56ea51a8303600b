use scenerep_scene::WorldHandle;
use std::fmt::Write;

use crate::viewport::Viewport;

/// Renderer-agnostic interface.
///
/// A renderer reads the view collection of a world and a viewport, then
/// produces output. It never mutates the scene.
pub trait Renderer {
    type Output;

    /// Render one frame.
    fn render(&self, world: &WorldHandle, view: &Viewport) -> Self::Output;
}

/// Text renderer listing the view collection and the camera.
///
/// Useful for CLI output, logging and testing the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// Also list hidden instances.
    pub show_hidden: bool,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hidden(mut self) -> Self {
        self.show_hidden = true;
        self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, world: &WorldHandle, view: &Viewport) -> String {
        let mut out = String::new();
        let cam = view.camera();
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "=== World (occurrences={}, instances={}, selected={}) ===",
            world.number_of_occurrence(),
            world.collection().len(),
            world.selection_set().len()
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) fov={:.0} clip=[{:.3}, {:.3}]",
            cam.eye().x,
            cam.eye().y,
            cam.eye().z,
            cam.target().x,
            cam.target().y,
            cam.target().z,
            view.fov(),
            view.dist_min(),
            view.dist_max()
        );

        for id in world.instances() {
            let Some(instance) = world.collection().get(id) else {
                continue;
            };
            if !instance.is_visible() && !self.show_hidden {
                continue;
            }
            let c = instance.bounding_box().center();
            let name = world
                .find_occurrence(id)
                .map(|occ| occ.borrow().name().to_string())
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "  {id} {name:<12} center=({:.2}, {:.2}, {:.2}){}{}",
                c.x,
                c.y,
                c.z,
                if instance.is_selected() { " [selected]" } else { "" },
                if instance.is_visible() { "" } else { " [hidden]" },
            );
        }

        out
    }
}
