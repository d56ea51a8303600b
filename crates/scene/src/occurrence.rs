use glam::Mat4;
use scenerep_common::{OccurrenceId, Transform};
use scenerep_geometry::Representation;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Shared handle on a tree node. Parents own their children through it.
pub type OccurrenceRef = Rc<RefCell<Occurrence>>;

/// Geometry shared by every occurrence that instances it.
///
/// Freed when the last occurrence pointing at it is dropped.
#[derive(Debug, Clone, Default)]
pub struct Reference {
    name: String,
    representation: Option<Representation>,
}

impl Reference {
    /// A reference without geometry (assembly node).
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            representation: None,
        })
    }

    pub fn with_representation(name: impl Into<String>, representation: Representation) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            representation: Some(representation),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn representation(&self) -> Option<&Representation> {
        self.representation.as_ref()
    }

    /// True when the reference carries a representation with at least one vertex.
    pub fn has_geometry(&self) -> bool {
        self.representation.as_ref().is_some_and(|rep| !rep.is_empty())
    }

    pub fn number_of_body(&self) -> usize {
        self.representation
            .as_ref()
            .map_or(0, Representation::number_of_body)
    }
}

/// One placement of geometry in the scene tree.
#[derive(Debug)]
pub struct Occurrence {
    id: OccurrenceId,
    name: String,
    transform: Transform,
    reference: Option<Rc<Reference>>,
    visible: bool,
    selected: bool,
    parent: Weak<RefCell<Occurrence>>,
    children: Vec<OccurrenceRef>,
}

impl Occurrence {
    /// Create a detached occurrence with a freshly generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: OccurrenceId::generate(),
            name: name.into(),
            transform: Transform::default(),
            reference: None,
            visible: true,
            selected: false,
            parent: Weak::new(),
            children: Vec::new(),
        }
    }

    /// Create an occurrence instancing `reference`.
    pub fn with_reference(name: impl Into<String>, reference: Rc<Reference>) -> Self {
        Self {
            reference: Some(reference),
            ..Self::new(name)
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn into_shared(self) -> OccurrenceRef {
        Rc::new(RefCell::new(self))
    }

    pub fn id(&self) -> OccurrenceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub fn reference(&self) -> Option<&Rc<Reference>> {
        self.reference.as_ref()
    }

    pub fn set_reference(&mut self, reference: Option<Rc<Reference>>) {
        self.reference = reference;
    }

    /// The shared representation, if this occurrence has renderable geometry.
    pub fn representation(&self) -> Option<&Representation> {
        self.reference
            .as_ref()
            .filter(|r| r.has_geometry())
            .and_then(|r| r.representation())
    }

    pub fn has_geometry(&self) -> bool {
        self.representation().is_some()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn parent(&self) -> Option<OccurrenceRef> {
        self.parent.upgrade()
    }

    pub fn children(&self) -> &[OccurrenceRef] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Product of the ancestors' local matrices and this node's own.
    pub fn absolute_matrix(&self) -> Mat4 {
        let local = self.transform.to_matrix();
        match self.parent.upgrade() {
            Some(parent) => parent.borrow().absolute_matrix() * local,
            None => local,
        }
    }

    /// Attach `child` under `parent`, detaching it from any previous parent.
    pub fn attach(parent: &OccurrenceRef, child: OccurrenceRef) {
        Self::detach(&child);
        child.borrow_mut().parent = Rc::downgrade(parent);
        parent.borrow_mut().children.push(child);
    }

    /// Remove `node` from its parent's children. Returns false for a root.
    pub fn detach(node: &OccurrenceRef) -> bool {
        let Some(parent) = node.borrow().parent.upgrade() else {
            return false;
        };
        parent
            .borrow_mut()
            .children
            .retain(|c| !Rc::ptr_eq(c, node));
        node.borrow_mut().parent = Weak::new();
        true
    }

    /// `node` and all its descendants, depth first, parents before children.
    pub fn subtree(node: &OccurrenceRef) -> Vec<OccurrenceRef> {
        let mut out = Vec::new();
        let mut stack = vec![Rc::clone(node)];
        while let Some(current) = stack.pop() {
            stack.extend(current.borrow().children.iter().rev().cloned());
            out.push(current);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use scenerep_geometry::Mesh;

    fn cube_reference() -> Rc<Reference> {
        Reference::with_representation("cube", Representation::from_mesh("cube", Mesh::cube("c", 1.0)))
    }

    #[test]
    fn new_occurrences_get_distinct_ids() {
        let a = Occurrence::new("a");
        let b = Occurrence::new("b");
        assert_ne!(a.id(), b.id());
        assert!(a.is_visible());
        assert!(!a.is_selected());
    }

    #[test]
    fn attach_links_both_ways() {
        let root = Occurrence::new("root").into_shared();
        let child = Occurrence::new("child").into_shared();
        Occurrence::attach(&root, Rc::clone(&child));

        assert_eq!(root.borrow().child_count(), 1);
        let parent = child.borrow().parent().unwrap();
        assert!(Rc::ptr_eq(&parent, &root));
    }

    #[test]
    fn reattach_moves_child() {
        let a = Occurrence::new("a").into_shared();
        let b = Occurrence::new("b").into_shared();
        let child = Occurrence::new("child").into_shared();
        Occurrence::attach(&a, Rc::clone(&child));
        Occurrence::attach(&b, Rc::clone(&child));

        assert_eq!(a.borrow().child_count(), 0);
        assert_eq!(b.borrow().child_count(), 1);
    }

    #[test]
    fn detach_root_is_noop() {
        let root = Occurrence::new("root").into_shared();
        assert!(!Occurrence::detach(&root));
    }

    #[test]
    fn absolute_matrix_composes_ancestors() {
        let root = Occurrence::new("root")
            .with_transform(Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)))
            .into_shared();
        let child = Occurrence::new("child")
            .with_transform(Transform::from_translation(Vec3::new(0.0, 2.0, 0.0)))
            .into_shared();
        Occurrence::attach(&root, Rc::clone(&child));

        let p = child.borrow().absolute_matrix().transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn subtree_lists_parents_first() {
        let root = Occurrence::new("root").into_shared();
        let a = Occurrence::new("a").into_shared();
        let b = Occurrence::new("b").into_shared();
        let a1 = Occurrence::new("a1").into_shared();
        Occurrence::attach(&root, Rc::clone(&a));
        Occurrence::attach(&root, Rc::clone(&b));
        Occurrence::attach(&a, Rc::clone(&a1));

        let names: Vec<String> = Occurrence::subtree(&root)
            .iter()
            .map(|n| n.borrow().name().to_string())
            .collect();
        assert_eq!(names, ["root", "a", "a1", "b"]);
    }

    #[test]
    fn shared_reference_is_counted() {
        let reference = cube_reference();
        let a = Occurrence::with_reference("a", Rc::clone(&reference));
        let b = Occurrence::with_reference("b", Rc::clone(&reference));
        assert_eq!(Rc::strong_count(&reference), 3);
        drop(a);
        assert_eq!(Rc::strong_count(&reference), 2);
        assert!(b.has_geometry());
    }

    #[test]
    fn empty_representation_is_not_geometry() {
        let reference = Reference::with_representation("empty", Representation::new("empty"));
        let occ = Occurrence::with_reference("o", reference);
        assert!(!occ.has_geometry());
        assert!(occ.representation().is_none());
    }
}
