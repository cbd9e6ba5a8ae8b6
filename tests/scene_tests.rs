//! Scene Hierarchy Integration Tests
//!
//! Tests for:
//! - Node creation, naming, removal
//! - Reparenting: depth maintenance, sibling ordering, cycle rejection
//! - Detach and recursive removal
//! - Structural sanity checking

use glam::Vec3;

use arbor::scene::{GeometryId, MaterialId};
use arbor::{
    ArborError, Attachment, AttachmentKind, Camera, Light, Mesh, MeshLayerId, Node, Scene,
    SceneRoot,
};

// ============================================================================
// Node Creation & Naming
// ============================================================================

#[test]
fn scene_create_node() {
    let mut scene = Scene::new("test");
    let handle = scene.create_node();
    assert!(scene.get_node(handle).is_some());
    assert!(scene.root_nodes.contains(&handle));
}

#[test]
fn scene_create_node_with_name() {
    let mut scene = Scene::new("test");
    let handle = scene.create_node_with_name("Anvil");
    assert_eq!(scene.get_name(handle), Some("Anvil"));
}

#[test]
fn scene_set_name() {
    let mut scene = Scene::new("test");
    let handle = scene.create_node();
    scene.set_name(handle, "Renamed");
    assert_eq!(scene.get_name(handle), Some("Renamed"));
}

#[test]
fn scene_stale_handle_stops_resolving() {
    let mut scene = Scene::new("test");
    let handle = scene.add_node(Node::new("ghost"));
    scene.remove(handle);
    assert!(scene.get_node(handle).is_none());
    assert!(!scene.root_nodes.contains(&handle));
}

// ============================================================================
// Reparenting & Depth
// ============================================================================

#[test]
fn set_parent_maintains_depth() {
    let mut scene = Scene::new("test");
    let a = scene.create_node_with_name("a");
    let b = scene.create_node_with_name("b");
    let c = scene.create_node_with_name("c");

    scene.set_parent(b, a, None).unwrap();
    scene.set_parent(c, b, None).unwrap();

    assert_eq!(scene.get_node(a).unwrap().depth(), 0);
    assert_eq!(scene.get_node(b).unwrap().depth(), 1);
    assert_eq!(scene.get_node(c).unwrap().depth(), 2);
    scene.sanity_check();
}

#[test]
fn set_parent_updates_depth_of_whole_subtree() {
    let mut scene = Scene::new("test");
    let a = scene.create_node_with_name("a");
    let b = scene.create_node_with_name("b");
    let c = scene.create_node_with_name("c");
    let other = scene.create_node_with_name("other");

    scene.set_parent(b, a, None).unwrap();
    scene.set_parent(c, b, None).unwrap();

    // Move b (with c below it) under a deeper anchor.
    let anchor = scene.create_node_with_name("anchor");
    scene.set_parent(anchor, other, None).unwrap();
    scene.set_parent(b, anchor, None).unwrap();

    assert_eq!(scene.get_node(b).unwrap().depth(), 2);
    assert_eq!(scene.get_node(c).unwrap().depth(), 3);
    assert!(!scene.get_node(a).unwrap().children().contains(&b));
    scene.sanity_check();
}

#[test]
fn set_parent_position_controls_sibling_order() {
    let mut scene = Scene::new("test");
    let parent = scene.create_node_with_name("parent");
    let first = scene.create_node_with_name("first");
    let second = scene.create_node_with_name("second");
    let third = scene.create_node_with_name("third");

    scene.set_parent(first, parent, None).unwrap();
    scene.set_parent(second, parent, None).unwrap();
    scene.set_parent(third, parent, None).unwrap();
    assert_eq!(scene.get_node(parent).unwrap().children(), &[first, second, third]);

    // Reorder under the same parent.
    scene.set_parent(third, parent, Some(0)).unwrap();
    assert_eq!(scene.get_node(parent).unwrap().children(), &[third, first, second]);

    // Out-of-range position clamps to append.
    scene.set_parent(third, parent, Some(99)).unwrap();
    assert_eq!(scene.get_node(parent).unwrap().children(), &[first, second, third]);
    scene.sanity_check();
}

#[test]
fn set_parent_rejects_self() {
    let mut scene = Scene::new("test");
    let a = scene.create_node_with_name("a");
    let result = scene.set_parent(a, a, None);
    assert!(matches!(result, Err(ArborError::CyclicReparent { .. })));
}

#[test]
fn set_parent_rejects_descendant_across_levels() {
    let mut scene = Scene::new("test");
    let a = scene.create_node_with_name("a");
    let b = scene.create_node_with_name("b");
    let c = scene.create_node_with_name("c");
    let d = scene.create_node_with_name("d");

    scene.set_parent(b, a, None).unwrap();
    scene.set_parent(c, b, None).unwrap();
    scene.set_parent(d, c, None).unwrap();

    // Great-grandchild as new parent must be rejected, and the tree must
    // be left untouched.
    let result = scene.set_parent(a, d, None);
    assert!(matches!(result, Err(ArborError::CyclicReparent { .. })));
    assert!(scene.get_node(a).unwrap().parent().is_none());
    assert_eq!(scene.get_node(d).unwrap().depth(), 3);
    scene.sanity_check();
}

#[test]
fn is_ancestor_walks_the_whole_chain() {
    let mut scene = Scene::new("test");
    let a = scene.create_node_with_name("a");
    let b = scene.create_node_with_name("b");
    let c = scene.create_node_with_name("c");

    scene.set_parent(b, a, None).unwrap();
    scene.set_parent(c, b, None).unwrap();

    assert!(scene.is_ancestor(c, a));
    assert!(scene.is_ancestor(c, b));
    assert!(!scene.is_ancestor(a, c));
    assert!(!scene.is_ancestor(a, a));
}

// ============================================================================
// Detach & Removal
// ============================================================================

#[test]
fn detach_makes_node_a_root_again() {
    let mut scene = Scene::new("test");
    let parent = scene.create_node_with_name("parent");
    let child = scene.create_node_with_name("child");
    scene.set_parent(child, parent, None).unwrap();

    scene.detach(child);

    assert!(scene.get_node(child).unwrap().parent().is_none());
    assert_eq!(scene.get_node(child).unwrap().depth(), 0);
    assert!(scene.root_nodes.contains(&child));
    assert!(scene.get_node(parent).unwrap().children().is_empty());
    scene.sanity_check();
}

#[test]
fn remove_orphans_children_as_roots() {
    let mut scene = Scene::new("test");
    let parent = scene.create_node_with_name("parent");
    let child_a = scene.create_node_with_name("child_a");
    let child_b = scene.create_node_with_name("child_b");
    let grandchild = scene.create_node_with_name("grandchild");

    scene.set_parent(child_a, parent, None).unwrap();
    scene.set_parent(child_b, parent, None).unwrap();
    scene.set_parent(grandchild, child_a, None).unwrap();

    scene.remove(parent);

    assert!(scene.get_node(parent).is_none());
    // Children survive as parentless roots; their own subtrees stay intact.
    assert!(scene.root_nodes.contains(&child_a));
    assert!(scene.root_nodes.contains(&child_b));
    assert_eq!(scene.get_node(child_a).unwrap().depth(), 0);
    assert_eq!(scene.get_node(grandchild).unwrap().depth(), 1);
    assert_eq!(scene.get_node(grandchild).unwrap().parent(), Some(child_a));
    scene.sanity_check();
}

#[test]
fn recursive_remove_takes_the_whole_subtree() {
    let mut scene = Scene::new("test");
    let parent = scene.create_node_with_name("parent");
    let child = scene.create_node_with_name("child");
    let grandchild = scene.create_node_with_name("grandchild");
    let bystander = scene.create_node_with_name("bystander");

    scene.set_parent(child, parent, None).unwrap();
    scene.set_parent(grandchild, child, None).unwrap();

    scene.recursive_remove(parent);

    assert!(scene.get_node(parent).is_none());
    assert!(scene.get_node(child).is_none());
    assert!(scene.get_node(grandchild).is_none());
    assert!(scene.get_node(bystander).is_some());
    assert_eq!(scene.node_count(), 1);
    scene.sanity_check();
}

// ============================================================================
// Scene Commands & Registries
// ============================================================================

#[test]
fn create_new_camera_registers_and_becomes_active() {
    let mut root = SceneRoot::new("commands");
    let camera = root
        .create_new_camera("editor camera", Camera::new_perspective(60.0, 16.0 / 9.0, 0.1, 100.0))
        .unwrap();

    assert_eq!(root.scene.cameras(), &[camera]);
    assert_eq!(root.scene.active_camera, Some(camera));
    assert!(root.scene.get_node(camera).unwrap().camera().is_some());
}

#[test]
fn create_new_light_lands_in_the_light_layer() {
    let mut root = SceneRoot::new("commands");
    let sun = root
        .create_new_light("sun", Light::new_directional(Vec3::ONE, 3.0))
        .unwrap();

    assert_eq!(root.scene.lights(), &[sun]);
    assert!(root.scene.layers.light().lights.contains(&sun));
}

#[test]
fn mesh_attachment_lands_in_its_layer() {
    let mut root = SceneRoot::new("commands");
    let node = root.create_new_empty_node("rock");
    root.attach_to_node(
        node,
        Attachment::Mesh(Mesh::new(MeshLayerId::Content, GeometryId(7), MaterialId(2))),
    )
    .unwrap();

    assert_eq!(root.scene.meshes(), &[node]);
    assert!(root.scene.layers.layer(MeshLayerId::Content).meshes.contains(&node));
    assert!(root.scene.layers.layer(MeshLayerId::Tool).meshes.is_empty());

    root.detach_from_node(node, AttachmentKind::MESH).unwrap();
    assert!(root.scene.meshes().is_empty());
    assert!(root.scene.layers.layer(MeshLayerId::Content).meshes.is_empty());
}

#[test]
fn removing_a_camera_node_picks_the_next_active_camera() {
    let mut root = SceneRoot::new("commands");
    let first = root
        .create_new_camera("first", Camera::new_perspective(60.0, 1.0, 0.1, 100.0))
        .unwrap();
    let second = root
        .create_new_camera("second", Camera::new_perspective(60.0, 1.0, 0.1, 100.0))
        .unwrap();
    assert_eq!(root.scene.active_camera, Some(first));

    root.remove_node(first);
    assert_eq!(root.scene.active_camera, Some(second));
    assert_eq!(root.scene.cameras(), &[second]);
}

#[test]
fn set_parent_with_dead_handle_fails() {
    let mut scene = Scene::new("test");
    let a = scene.create_node_with_name("a");
    let dead = scene.create_node_with_name("dead");
    scene.remove(dead);

    assert!(matches!(
        scene.set_parent(a, dead, None),
        Err(ArborError::NodeNotFound { .. })
    ));
    assert!(matches!(
        scene.set_parent(dead, a, None),
        Err(ArborError::NodeNotFound { .. })
    ));
}
