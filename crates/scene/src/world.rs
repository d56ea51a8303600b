use glam::Vec3;
use scenerep_common::{BoundingBox, OccurrenceId, Transform};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::handle::WorldHandle;
use crate::occurrence::{Occurrence, OccurrenceRef, Reference};
use crate::selection::Highlight;
use crate::SceneError;

/// A shared view on one [`WorldHandle`].
///
/// Cloning a `World` registers a new owner; dropping it releases one. The
/// owner that brings the count to zero detaches the tree from the registry,
/// after which the handle is freed with its last `Rc`.
pub struct World {
    handle: Rc<RefCell<WorldHandle>>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("World").field(&*self.handle.borrow()).finish()
    }
}

impl Clone for World {
    fn clone(&self) -> Self {
        self.handle.borrow().increment();
        Self {
            handle: Rc::clone(&self.handle),
        }
    }
}

impl Drop for World {
    fn drop(&mut self) {
        let orphan = {
            let handle = self.handle.borrow();
            handle.decrement();
            handle.is_orphan()
        };
        if orphan {
            let mut handle = self.handle.borrow_mut();
            handle.remove_all_occurrences();
            handle.take_root_occurrence();
            tracing::debug!("last world owner released, scene torn down");
        }
    }
}

impl World {
    /// A world with an empty root and one owner.
    pub fn new() -> Self {
        Self::from_handle(WorldHandle::new())
    }

    /// A world rooted at `root`, whose subtree is registered.
    pub fn with_root(root: OccurrenceRef) -> Self {
        Self::from_handle(WorldHandle::with_root(root))
    }

    /// Wrap a freshly built handle. Its owner count must be one.
    ///
    /// # Panics
    /// If the handle already has a different number of owners.
    pub fn from_handle(handle: WorldHandle) -> Self {
        assert_eq!(
            handle.number_of_world(),
            1,
            "World::from_handle expects a handle with exactly one owner"
        );
        Self {
            handle: Rc::new(RefCell::new(handle)),
        }
    }

    /// Borrow the shared handle.
    pub fn handle(&self) -> Ref<'_, WorldHandle> {
        self.handle.borrow()
    }

    /// Borrow the shared handle mutably.
    pub fn handle_mut(&self) -> RefMut<'_, WorldHandle> {
        self.handle.borrow_mut()
    }

    /// Number of `World` values sharing the handle.
    pub fn number_of_world(&self) -> usize {
        self.handle.borrow().number_of_world()
    }

    /// True if both values share the same handle.
    pub fn is_same_world(&self, other: &World) -> bool {
        Rc::ptr_eq(&self.handle, &other.handle)
    }

    /// The root occurrence, unless it was removed.
    pub fn root(&self) -> Option<OccurrenceRef> {
        self.handle.borrow().root_occurrence()
    }

    /// The occurrence registered under `id`, if any.
    pub fn occurrence(&self, id: OccurrenceId) -> Option<OccurrenceRef> {
        self.handle.borrow().find_occurrence(id)
    }

    /// Number of registered occurrences.
    pub fn number_of_occurrence(&self) -> usize {
        self.handle.borrow().number_of_occurrence()
    }

    /// Attach `child` and its subtree under the occurrence `parent` and
    /// register them.
    pub fn add_child(&self, parent: OccurrenceId, child: OccurrenceRef) -> Result<(), SceneError> {
        let mut handle = self.handle.borrow_mut();
        let parent = handle
            .find_occurrence(parent)
            .ok_or(SceneError::OccurrenceNotFound(parent))?;
        if let Some(taken) = Occurrence::subtree(&child)
            .iter()
            .map(|occ| occ.borrow().id())
            .find(|&id| handle.contains_occurrence(id))
        {
            return Err(SceneError::AlreadyRegistered(taken));
        }
        Occurrence::attach(&parent, Rc::clone(&child));
        handle.register_subtree(&child);
        Ok(())
    }

    /// Detach the occurrence `id` from its parent and unregister its subtree.
    ///
    /// Removing the root leaves the world without one.
    pub fn remove_subtree(&self, id: OccurrenceId) -> Result<OccurrenceRef, SceneError> {
        let mut handle = self.handle.borrow_mut();
        let node = handle
            .find_occurrence(id)
            .ok_or(SceneError::OccurrenceNotFound(id))?;
        let is_root = handle
            .root_occurrence()
            .is_some_and(|root| Rc::ptr_eq(&root, &node));
        if is_root {
            handle.take_root_occurrence();
        } else {
            Occurrence::detach(&node);
            handle.unregister_subtree(&node);
        }
        Ok(node)
    }

    /// Move an occurrence and refresh the instance matrices below it.
    pub fn set_transform(&self, id: OccurrenceId, transform: Transform) -> Result<(), SceneError> {
        let mut handle = self.handle.borrow_mut();
        let node = handle
            .find_occurrence(id)
            .ok_or(SceneError::OccurrenceNotFound(id))?;
        node.borrow_mut().set_transform(transform);
        handle.refresh_instances(&node);
        Ok(())
    }

    /// Registered occurrences instancing `reference`.
    pub fn reference_count(&self, reference: &Rc<Reference>) -> usize {
        self.handle
            .borrow()
            .occurrences()
            .iter()
            .filter(|occ| {
                occ.borrow()
                    .reference()
                    .is_some_and(|r| Rc::ptr_eq(r, reference))
            })
            .count()
    }

    /// See [`WorldHandle::select`].
    pub fn select(&self, id: OccurrenceId) {
        self.handle.borrow_mut().select(id);
    }

    /// See [`WorldHandle::unselect`].
    pub fn unselect(&self, id: OccurrenceId, highlight: Highlight) {
        self.handle.borrow_mut().unselect(id, highlight);
    }

    /// Clear the selection.
    pub fn unselect_all(&self) {
        self.handle.borrow_mut().unselect_all();
    }

    /// Scene up direction.
    pub fn up_vector(&self) -> Vec3 {
        self.handle.borrow().up_vector()
    }

    /// World box of the visible instances.
    pub fn bounding_box(&self) -> BoundingBox {
        self.handle.borrow().bounding_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_handle() {
        let w1 = World::new();
        let w2 = w1.clone();
        let w3 = w2.clone();
        assert!(w1.is_same_world(&w3));
        assert_eq!(w1.number_of_world(), 3);
        drop(w3);
        assert_eq!(w2.number_of_world(), 2);
        drop(w2);
        assert_eq!(w1.number_of_world(), 1);
    }

    #[test]
    fn independent_worlds_are_distinct() {
        let a = World::new();
        let b = World::new();
        assert!(!a.is_same_world(&b));
    }

    #[test]
    fn edits_through_one_clone_are_seen_by_all() {
        let w1 = World::new();
        let w2 = w1.clone();
        let root_id = w1.root().unwrap().borrow().id();
        let child = Occurrence::new("child").into_shared();
        let child_id = child.borrow().id();

        w1.add_child(root_id, child).unwrap();
        assert!(w2.occurrence(child_id).is_some());
        w2.select(child_id);
        assert!(w1.handle().selection_set().contains(child_id));
    }

    #[test]
    fn last_owner_tears_down_the_tree() {
        let w = World::new();
        let root = w.root().unwrap();
        let child = Occurrence::new("child").into_shared();
        let root_id = root.borrow().id();
        w.add_child(root_id, Rc::clone(&child)).unwrap();
        let weak_handle = Rc::downgrade(&w.handle);

        drop(w);
        assert!(weak_handle.upgrade().is_none());
        // The caller still holds the nodes; only the world let go.
        assert_eq!(root.borrow().child_count(), 1);
    }

    #[test]
    fn add_child_to_unknown_parent_fails() {
        let w = World::new();
        let missing = OccurrenceId::generate();
        let err = w
            .add_child(missing, Occurrence::new("c").into_shared())
            .unwrap_err();
        assert_eq!(err, SceneError::OccurrenceNotFound(missing));
    }

    #[test]
    fn add_registered_child_fails() {
        let w = World::new();
        let root = w.root().unwrap();
        let root_id = root.borrow().id();
        let err = w.add_child(root_id, Rc::clone(&root)).unwrap_err();
        assert_eq!(err, SceneError::AlreadyRegistered(root_id));
    }

    #[test]
    fn remove_subtree_unregisters_descendants() {
        let w = World::new();
        let root_id = w.root().unwrap().borrow().id();
        let group = Occurrence::new("group").into_shared();
        let leaf = Occurrence::new("leaf").into_shared();
        Occurrence::attach(&group, Rc::clone(&leaf));
        let group_id = group.borrow().id();
        let leaf_id = leaf.borrow().id();
        w.add_child(root_id, group).unwrap();
        assert_eq!(w.number_of_occurrence(), 3);

        let removed = w.remove_subtree(group_id).unwrap();
        assert_eq!(removed.borrow().child_count(), 1);
        assert!(w.occurrence(leaf_id).is_none());
        assert_eq!(w.number_of_occurrence(), 1);
        assert_eq!(w.root().unwrap().borrow().child_count(), 0);
    }

    #[test]
    fn remove_root_leaves_world_empty() {
        let w = World::new();
        let root_id = w.root().unwrap().borrow().id();
        w.remove_subtree(root_id).unwrap();
        assert!(w.root().is_none());
        assert_eq!(w.number_of_occurrence(), 0);
    }

    #[test]
    fn set_transform_on_unknown_id_fails() {
        let w = World::new();
        let missing = OccurrenceId::generate();
        assert_eq!(
            w.set_transform(missing, Transform::default()),
            Err(SceneError::OccurrenceNotFound(missing))
        );
    }

    #[test]
    fn reference_count_follows_registration() {
        let w = World::new();
        let root_id = w.root().unwrap().borrow().id();
        let shared = Reference::new("bracket");
        let a = Occurrence::with_reference("a", Rc::clone(&shared)).into_shared();
        let b = Occurrence::with_reference("b", Rc::clone(&shared)).into_shared();
        let b_id = b.borrow().id();
        w.add_child(root_id, a).unwrap();
        w.add_child(root_id, b).unwrap();
        assert_eq!(w.reference_count(&shared), 2);

        w.remove_subtree(b_id).unwrap();
        assert_eq!(w.reference_count(&shared), 1);
    }

    #[test]
    #[should_panic(expected = "exactly one owner")]
    fn shared_handle_cannot_be_rewrapped() {
        let handle = WorldHandle::new();
        handle.increment();
        let _ = World::from_handle(handle);
    }
}
