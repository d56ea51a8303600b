use glam::Vec3;
use scenerep_common::{BoundingBox, OccurrenceId};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

use crate::collection::{ViewCollection, ViewInstance};
use crate::occurrence::{Occurrence, OccurrenceRef, Reference};
use crate::selection::{
    Highlight, SelectionChange, SelectionEvent, SelectionMode, SelectionObserver, SelectionSet,
};

/// Shared state behind every [`World`](crate::World) clone.
///
/// Owns the flat occurrence registry, the root slot, the selection set, the
/// up vector and the view collection. The registry maps ids to weak links
/// into the tree; the tree itself is owned by the root.
///
/// `number_of_world` counts external owners. The handle never frees itself:
/// whoever observes [`is_orphan`](Self::is_orphan) last tears it down.
pub struct WorldHandle {
    collection: ViewCollection,
    root: Option<OccurrenceRef>,
    number_of_world: Cell<usize>,
    occurrences: HashMap<OccurrenceId, Weak<RefCell<Occurrence>>>,
    up_vector: Vec3,
    selection: SelectionSet,
    observers: Vec<Box<dyn SelectionObserver>>,
}

impl Default for WorldHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WorldHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldHandle")
            .field("number_of_world", &self.number_of_world.get())
            .field("occurrences", &self.occurrences.len())
            .field("instances", &self.collection.len())
            .field("selected", &self.selection.len())
            .field("up_vector", &self.up_vector)
            .finish()
    }
}

impl WorldHandle {
    /// A handle with an empty root occurrence and one owner.
    pub fn new() -> Self {
        Self::with_root(Occurrence::new("root").into_shared())
    }

    /// A handle rooted at `root`, whose whole subtree is registered.
    pub fn with_root(root: OccurrenceRef) -> Self {
        let mut handle = Self {
            collection: ViewCollection::new(),
            root: None,
            number_of_world: Cell::new(1),
            occurrences: HashMap::new(),
            up_vector: Vec3::Z,
            selection: SelectionSet::new(),
            observers: Vec::new(),
        };
        handle.register_subtree(&root);
        handle.root = Some(root);
        handle
    }

    // ---- owner count ----

    /// Number of external owners.
    pub fn number_of_world(&self) -> usize {
        self.number_of_world.get()
    }

    /// True once every owner has released the handle.
    pub fn is_orphan(&self) -> bool {
        self.number_of_world.get() == 0
    }

    /// Register one more owner.
    pub fn increment(&self) {
        self.number_of_world.set(self.number_of_world.get() + 1);
    }

    /// Release one owner.
    ///
    /// # Panics
    /// If the handle is already orphan.
    pub fn decrement(&self) {
        let count = self.number_of_world.get();
        assert!(count > 0, "WorldHandle::decrement called on an orphan handle");
        self.number_of_world.set(count - 1);
    }

    // ---- registry ----

    /// Register one occurrence, optionally selecting it.
    ///
    /// Occurrences owning geometry also get a view instance.
    ///
    /// # Panics
    /// If the id is already registered.
    pub fn add_occurrence(&mut self, occurrence: &OccurrenceRef, is_selected: bool) {
        let id = {
            let occ = occurrence.borrow();
            let id = occ.id();
            assert!(
                !self.occurrences.contains_key(&id),
                "occurrence {id} is already registered in this world"
            );
            if let Some(rep) = occ.representation() {
                self.collection.add(ViewInstance::new(
                    id,
                    occ.absolute_matrix(),
                    rep.bounding_box(),
                    occ.is_visible(),
                ));
            }
            id
        };
        self.occurrences.insert(id, Rc::downgrade(occurrence));
        tracing::trace!(%id, "occurrence registered");
        if is_selected {
            self.select(id);
        }
    }

    /// Unregister one occurrence. Descendants stay registered.
    ///
    /// # Panics
    /// If the occurrence is not registered.
    pub fn remove_occurrence(&mut self, occurrence: &OccurrenceRef) {
        let id = occurrence.borrow().id();
        assert!(
            self.occurrences.remove(&id).is_some(),
            "occurrence {id} is not registered in this world"
        );
        self.selection.remove(id);
        self.collection.remove(id);
        tracing::trace!(%id, "occurrence unregistered");
    }

    /// Clear the lookup table. The tree, the selection set and the
    /// collection are left untouched.
    pub fn remove_all_occurrences(&mut self) {
        self.occurrences.clear();
    }

    /// True if `id` is registered.
    pub fn contains_occurrence(&self, id: OccurrenceId) -> bool {
        self.occurrences.contains_key(&id)
    }

    /// The occurrence registered under `id`.
    ///
    /// # Panics
    /// If `id` is not registered or its node has been dropped.
    pub fn get_occurrence(&self, id: OccurrenceId) -> OccurrenceRef {
        self.find_occurrence(id)
            .unwrap_or_else(|| panic!("occurrence {id} is not registered in this world"))
    }

    /// The occurrence registered under `id`, if any.
    pub fn find_occurrence(&self, id: OccurrenceId) -> Option<OccurrenceRef> {
        self.occurrences.get(&id).and_then(Weak::upgrade)
    }

    /// All registered occurrences, in no particular order.
    pub fn occurrences(&self) -> Vec<OccurrenceRef> {
        self.occurrences.values().filter_map(Weak::upgrade).collect()
    }

    /// Number of registered ids.
    pub fn number_of_occurrence(&self) -> usize {
        self.occurrences.len()
    }

    /// Ids of occurrences owning a view instance, sorted.
    pub fn instances(&self) -> Vec<OccurrenceId> {
        self.collection.ids()
    }

    /// Distinct references instanced by registered occurrences.
    pub fn references(&self) -> Vec<Rc<Reference>> {
        let mut seen: HashSet<*const Reference> = HashSet::new();
        let mut refs = Vec::new();
        for occ in self.occurrences() {
            if let Some(reference) = occ.borrow().reference() {
                if seen.insert(Rc::as_ptr(reference)) {
                    refs.push(Rc::clone(reference));
                }
            }
        }
        refs
    }

    /// Bodies over distinct references.
    pub fn number_of_body(&self) -> usize {
        self.references().iter().map(|r| r.number_of_body()).sum()
    }

    /// Distinct references carrying a representation.
    pub fn representation_count(&self) -> usize {
        self.references()
            .iter()
            .filter(|r| r.representation().is_some())
            .count()
    }

    /// Register `node` and every descendant.
    pub fn register_subtree(&mut self, node: &OccurrenceRef) {
        for occ in Occurrence::subtree(node) {
            self.add_occurrence(&occ, false);
        }
    }

    /// Unregister `node` and every descendant that is still registered.
    pub fn unregister_subtree(&mut self, node: &OccurrenceRef) {
        for occ in Occurrence::subtree(node) {
            let id = occ.borrow().id();
            if self.contains_occurrence(id) {
                self.remove_occurrence(&occ);
            }
        }
    }

    /// Recompute the absolute matrices of the view instances under `node`.
    pub fn refresh_instances(&mut self, node: &OccurrenceRef) {
        for occ in Occurrence::subtree(node) {
            let occ = occ.borrow();
            self.collection.set_matrix(occ.id(), occ.absolute_matrix());
        }
    }

    // ---- root ----

    /// The root, unless it was taken.
    pub fn root_occurrence(&self) -> Option<OccurrenceRef> {
        self.root.clone()
    }

    /// Install `occurrence` as the root and return the previous root.
    ///
    /// The previous root's subtree is unregistered and the new one registered;
    /// the returned tree belongs to the caller.
    pub fn replace_root_occurrence(&mut self, occurrence: OccurrenceRef) -> Option<OccurrenceRef> {
        let previous = self.take_root_occurrence();
        Occurrence::detach(&occurrence);
        self.register_subtree(&occurrence);
        tracing::debug!(id = %occurrence.borrow().id(), "root occurrence replaced");
        self.root = Some(occurrence);
        previous
    }

    /// Detach the root, leaving the world without one.
    pub fn take_root_occurrence(&mut self) -> Option<OccurrenceRef> {
        let root = self.root.take()?;
        self.unregister_subtree(&root);
        Some(root)
    }

    // ---- selection ----

    /// Ids currently selected.
    pub fn selection_set(&self) -> &SelectionSet {
        &self.selection
    }

    /// Notify `observer` of every highlight change.
    pub fn add_observer(&mut self, observer: impl SelectionObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Add `id` to the selection and highlight its view instance.
    ///
    /// # Panics
    /// If `id` is not registered in this world.
    pub fn select(&mut self, id: OccurrenceId) {
        let occ = self.registered(id, "select");
        occ.borrow_mut().set_selected(true);
        self.selection.insert(id);
        self.collection.select(id);
        self.notify(SelectionChange::Selected(id));
    }

    /// With [`Highlight::Propagate`], the view instance highlight is cleared
    /// and observers are notified.
    ///
    /// # Panics
    /// If `id` is not registered in this world.
    pub fn unselect(&mut self, id: OccurrenceId, highlight: Highlight) {
        let occ = self.registered(id, "unselect");
        occ.borrow_mut().set_selected(false);
        self.selection.remove(id);
        if highlight == Highlight::Propagate {
            self.collection.unselect(id);
            self.notify(SelectionChange::Unselected(id));
        }
    }

    /// Select every occurrence owning a view instance. Unless
    /// `all_show_state` is set, hidden instances are skipped.
    pub fn select_all_with_3d_view_instance(&mut self, all_show_state: bool) {
        let ids: Vec<OccurrenceId> = self
            .collection
            .iter()
            .filter(|i| all_show_state || i.is_visible())
            .map(ViewInstance::id)
            .filter(|id| self.occurrences.contains_key(id))
            .collect();
        for id in ids {
            self.select(id);
        }
    }

    /// Clear the selection and every highlight.
    pub fn unselect_all(&mut self) {
        for id in self.selection.ids() {
            if let Some(occ) = self.find_occurrence(id) {
                occ.borrow_mut().set_selected(false);
            }
        }
        self.selection.clear();
        self.collection.unselect_all();
        self.notify(SelectionChange::Cleared);
    }

    /// Apply a batch selection.
    ///
    /// # Panics
    /// If an id of the event is not registered in this world.
    pub fn update_selection(&mut self, event: &SelectionEvent) {
        match event.mode {
            SelectionMode::Replace => {
                self.unselect_all();
                event.ids.iter().for_each(|&id| self.select(id));
            }
            SelectionMode::Add => event.ids.iter().for_each(|&id| self.select(id)),
            SelectionMode::Remove => {
                for &id in &event.ids {
                    if self.selection.contains(id) {
                        self.unselect(id, Highlight::Propagate);
                    }
                }
            }
            SelectionMode::Toggle => {
                for &id in &event.ids {
                    if self.selection.contains(id) {
                        self.unselect(id, Highlight::Propagate);
                    } else {
                        self.select(id);
                    }
                }
            }
        }
    }

    /// Flip the visibility of every selected view instance.
    pub fn show_hide_selected_3d_view_instance(&mut self) {
        for id in self.selection.ids() {
            if let Some(visible) = self.collection.get(id).map(ViewInstance::is_visible) {
                self.set_instance_visibility(id, !visible);
            }
        }
    }

    /// Show or hide every selected view instance.
    pub fn set_selected_3d_view_instance_visibility(&mut self, visible: bool) {
        for id in self.selection.ids() {
            if self.collection.contains(id) {
                self.set_instance_visibility(id, visible);
            }
        }
    }

    // ---- misc ----

    /// Renderable instances of geometry-owning occurrences.
    pub fn collection(&self) -> &ViewCollection {
        &self.collection
    }

    /// Scene up direction, `+Z` by default.
    pub fn up_vector(&self) -> Vec3 {
        self.up_vector
    }

    /// Change the scene up direction.
    pub fn set_up_vector(&mut self, up: Vec3) {
        self.up_vector = up;
    }

    /// World box of the visible instances.
    pub fn bounding_box(&self) -> BoundingBox {
        self.collection.bounding_box()
    }

    fn set_instance_visibility(&mut self, id: OccurrenceId, visible: bool) {
        self.collection.set_visibility(id, visible);
        if let Some(occ) = self.find_occurrence(id) {
            occ.borrow_mut().set_visible(visible);
        }
    }

    fn registered(&self, id: OccurrenceId, op: &str) -> OccurrenceRef {
        self.find_occurrence(id).unwrap_or_else(|| {
            panic!("WorldHandle::{op}: occurrence {id} does not belong to this world")
        })
    }

    fn notify(&mut self, change: SelectionChange) {
        for observer in &mut self.observers {
            observer.selection_changed(change);
        }
    }
}
