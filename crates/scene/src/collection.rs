use glam::Mat4;
use scenerep_common::{BoundingBox, OccurrenceId};
use std::collections::HashMap;

/// Render-collection entry of an occurrence owning geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewInstance {
    id: OccurrenceId,
    matrix: Mat4,
    local_box: BoundingBox,
    visible: bool,
    selected: bool,
}

impl ViewInstance {
    pub fn new(id: OccurrenceId, matrix: Mat4, local_box: BoundingBox, visible: bool) -> Self {
        Self {
            id,
            matrix,
            local_box,
            visible,
            selected: false,
        }
    }

    pub fn id(&self) -> OccurrenceId {
        self.id
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    pub fn set_matrix(&mut self, matrix: Mat4) {
        self.matrix = matrix;
    }

    /// Bounding box in world space.
    pub fn bounding_box(&self) -> BoundingBox {
        self.local_box.transformed(&self.matrix)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }
}

/// Live set of renderable instances, keyed by occurrence id.
#[derive(Debug, Clone, Default)]
pub struct ViewCollection {
    instances: HashMap<OccurrenceId, ViewInstance>,
}

impl ViewCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, instance: ViewInstance) {
        self.instances.insert(instance.id, instance);
    }

    pub fn remove(&mut self, id: OccurrenceId) -> Option<ViewInstance> {
        self.instances.remove(&id)
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn contains(&self, id: OccurrenceId) -> bool {
        self.instances.contains_key(&id)
    }

    pub fn get(&self, id: OccurrenceId) -> Option<&ViewInstance> {
        self.instances.get(&id)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ViewInstance> {
        self.instances.values()
    }

    /// Ids of all instances, sorted.
    pub fn ids(&self) -> Vec<OccurrenceId> {
        let mut ids: Vec<OccurrenceId> = self.instances.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn set_matrix(&mut self, id: OccurrenceId, matrix: Mat4) -> bool {
        self.instances
            .get_mut(&id)
            .map(|i| i.set_matrix(matrix))
            .is_some()
    }

    /// Highlight an instance. Returns false if there is no instance for `id`.
    pub fn select(&mut self, id: OccurrenceId) -> bool {
        self.set_selected(id, true)
    }

    pub fn unselect(&mut self, id: OccurrenceId) -> bool {
        self.set_selected(id, false)
    }

    pub fn unselect_all(&mut self) {
        for instance in self.instances.values_mut() {
            instance.selected = false;
        }
    }

    pub fn set_visibility(&mut self, id: OccurrenceId, visible: bool) -> bool {
        match self.instances.get_mut(&id) {
            Some(instance) => {
                instance.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn selected_count(&self) -> usize {
        self.instances.values().filter(|i| i.selected).count()
    }

    /// Union of the world boxes of visible instances.
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::EMPTY;
        for instance in self.instances.values().filter(|i| i.visible) {
            bbox.combine(&instance.bounding_box());
        }
        bbox
    }

    fn set_selected(&mut self, id: OccurrenceId, selected: bool) -> bool {
        match self.instances.get_mut(&id) {
            Some(instance) => {
                instance.selected = selected;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn unit_instance(id: u32, at: Vec3) -> ViewInstance {
        ViewInstance::new(
            OccurrenceId(id),
            Mat4::from_translation(at),
            BoundingBox::new(Vec3::ZERO, Vec3::ONE),
            true,
        )
    }

    #[test]
    fn add_and_remove() {
        let mut c = ViewCollection::new();
        c.add(unit_instance(1, Vec3::ZERO));
        c.add(unit_instance(2, Vec3::X));
        assert_eq!(c.len(), 2);
        assert!(c.remove(OccurrenceId(1)).is_some());
        assert!(!c.contains(OccurrenceId(1)));
        assert_eq!(c.ids(), vec![OccurrenceId(2)]);
    }

    #[test]
    fn select_unknown_instance_is_false() {
        let mut c = ViewCollection::new();
        assert!(!c.select(OccurrenceId(9)));
    }

    #[test]
    fn highlight_and_clear() {
        let mut c = ViewCollection::new();
        c.add(unit_instance(1, Vec3::ZERO));
        c.add(unit_instance(2, Vec3::X));
        assert!(c.select(OccurrenceId(1)));
        assert!(c.select(OccurrenceId(2)));
        assert_eq!(c.selected_count(), 2);
        c.unselect_all();
        assert_eq!(c.selected_count(), 0);
    }

    #[test]
    fn bounding_box_skips_hidden() {
        let mut c = ViewCollection::new();
        c.add(unit_instance(1, Vec3::ZERO));
        c.add(unit_instance(2, Vec3::new(10.0, 0.0, 0.0)));
        assert_eq!(c.bounding_box().max().x, 11.0);

        c.set_visibility(OccurrenceId(2), false);
        assert_eq!(c.bounding_box().max().x, 1.0);
    }
}
