use scenerep_cache::BinaryRep;
use scenerep_common::{OccurrenceId, Transform};
use scenerep_geometry::{Mesh, Representation};
use scenerep_scene::{Highlight, Occurrence, Reference, SelectionMode, SelectionEvent, World};
use std::rc::Rc;

fn bake(dir: &std::path::Path) -> BinaryRep {
    let mut rep = Representation::new("bolt");
    rep.add_body(Mesh::cube("head", 1.0));
    rep.add_body(Mesh::cube("shank", 0.5));
    let mut cache = BinaryRep::new(dir.join("bolt"));
    assert!(cache.save(&rep));
    cache
}

#[test]
fn cached_representation_instanced_across_world_clones() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = bake(dir.path());
    let rep = cache.load_rep().unwrap();
    let bolt = Reference::with_representation("bolt", rep);

    let world = World::new();
    let viewer = world.clone();
    let root_id = world.root().unwrap().borrow().id();

    let mut ids: Vec<OccurrenceId> = Vec::new();
    for i in 0..4 {
        let occ = Occurrence::with_reference(format!("bolt-{i}"), Rc::clone(&bolt))
            .with_transform(Transform::from_translation(glam::Vec3::new(i as f32 * 3.0, 0.0, 0.0)))
            .into_shared();
        ids.push(occ.borrow().id());
        world.add_child(root_id, occ).unwrap();
    }

    {
        let handle = viewer.handle();
        assert_eq!(handle.number_of_occurrence(), 5);
        assert_eq!(handle.instances(), ids);
        assert_eq!(handle.references().len(), 1);
        assert_eq!(handle.number_of_body(), 2);
    }

    viewer
        .handle_mut()
        .update_selection(&SelectionEvent::new(SelectionMode::Replace, ids[1..3].to_vec()));
    assert_eq!(world.handle().selection_set().len(), 2);

    world.unselect(ids[1], Highlight::Propagate);
    assert_eq!(viewer.handle().selection_set().ids(), vec![ids[2]]);

    drop(world);
    assert_eq!(viewer.number_of_world(), 1);
    drop(viewer);
    // Occurrences are gone; only the test's reference remains.
    assert_eq!(Rc::strong_count(&bolt), 1);
}

#[test]
fn moving_a_group_moves_its_instances() {
    let dir = tempfile::tempdir().unwrap();
    let rep = bake(dir.path()).load_rep().unwrap();
    let part = Reference::with_representation("bolt", rep);

    let world = World::new();
    let root_id = world.root().unwrap().borrow().id();
    let group = Occurrence::new("group").into_shared();
    let leaf = Occurrence::with_reference("leaf", part).into_shared();
    Occurrence::attach(&group, Rc::clone(&leaf));
    let group_id = group.borrow().id();
    world.add_child(root_id, group).unwrap();

    let before = world.bounding_box().center();
    world
        .set_transform(group_id, Transform::from_translation(glam::Vec3::new(0.0, 0.0, 7.0)))
        .unwrap();
    let after = world.bounding_box().center();
    assert!((after.z - before.z - 7.0).abs() < 1e-5);
}
