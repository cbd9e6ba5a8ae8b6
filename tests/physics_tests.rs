//! Physics Synchronization Tests
//!
//! Tests for:
//! - Editor-to-physics pushes: once per actual change, scale stripped
//! - Physics-to-editor pulls: no push-back, child propagation, depth order
//! - Sleeping-body skip, fall respawn, registration lifecycle

use glam::{Affine3A, Quat, Vec3};

use arbor::scene::{FALL_Y_THRESHOLD, RESPAWN_POSITION};
use arbor::{
    Attachment, AttachmentKind, MotionMode, NodePhysics, RigidBodyDescriptor, SceneRoot,
    TransformWriteOrigin,
};

mod common;
use common::{assert_vec3_near, TestWorld, WorldState};

const EPS: f32 = 1e-4;

fn physics_root() -> (SceneRoot, std::rc::Rc<std::cell::RefCell<WorldState>>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let (world, state) = TestWorld::new();
    let root = SceneRoot::new("physics test").with_physics(Box::new(world));
    (root, state)
}

fn dynamic_body(label: &str) -> Attachment {
    Attachment::Physics(NodePhysics::new(RigidBodyDescriptor::new(1.0, label)))
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn attaching_physics_creates_a_body_at_the_node_pose() {
    let (mut root, state) = physics_root();
    let node = root.create_new_empty_node("crate");
    root.scene.get_node_mut(node).unwrap().transform.position = Vec3::new(0.0, 2.0, 0.0);
    root.update_transforms(TransformWriteOrigin::Editor);

    root.attach_to_node(node, dynamic_body("crate")).unwrap();

    let state = state.borrow();
    let body = state.single_body();
    assert_vec3_near(
        state.bodies[&body].transform.translation.into(),
        Vec3::new(0.0, 2.0, 0.0),
        EPS,
    );
    // Creation pose comes through add_rigid_body, not a transform write.
    assert_eq!(state.set_transform_calls, 0);
}

#[test]
fn detaching_physics_removes_the_body() {
    let (mut root, state) = physics_root();
    let node = root.create_new_empty_node("crate");
    root.attach_to_node(node, dynamic_body("crate")).unwrap();

    let body = state.borrow().single_body();
    root.detach_from_node(node, AttachmentKind::PHYSICS).unwrap();

    let state = state.borrow();
    assert!(state.bodies.is_empty());
    assert_eq!(state.removed, vec![body]);
    assert_eq!(root.physics_node_count(), 0);
}

#[test]
fn removing_a_node_releases_its_body() {
    let (mut root, state) = physics_root();
    let node = root.create_new_empty_node("crate");
    root.attach_to_node(node, dynamic_body("crate")).unwrap();

    root.remove_node(node);

    assert!(state.borrow().bodies.is_empty());
    assert_eq!(root.physics_node_count(), 0);
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "double physics registration")]
fn double_physics_registration_is_a_caller_bug() {
    let (mut root, _state) = physics_root();
    let node = root.create_new_empty_node("crate");
    root.attach_to_node(node, dynamic_body("one")).unwrap();
    root.attach_to_node(node, dynamic_body("two")).unwrap();
}

// ============================================================================
// Editor -> Physics Pushes
// ============================================================================

#[test]
fn unchanged_transform_pushes_exactly_once() {
    let (mut root, state) = physics_root();
    let node = root.create_new_empty_node("crate");
    root.attach_to_node(node, dynamic_body("crate")).unwrap();

    root.scene.get_node_mut(node).unwrap().transform.position = Vec3::new(3.0, 1.0, 0.0);
    root.update_transforms(TransformWriteOrigin::Editor);
    assert_eq!(state.borrow().set_transform_calls, 1);

    // Clean passes must not touch the body again.
    root.update_transforms(TransformWriteOrigin::Editor);
    root.update_transforms(TransformWriteOrigin::Editor);
    assert_eq!(state.borrow().set_transform_calls, 1);
}

#[test]
fn push_strips_node_scale() {
    let (mut root, state) = physics_root();
    let node = root.create_new_empty_node("crate");
    root.attach_to_node(node, dynamic_body("crate")).unwrap();

    {
        let transform = &mut root.scene.get_node_mut(node).unwrap().transform;
        transform.position = Vec3::new(1.0, 0.0, 0.0);
        transform.scale = Vec3::new(2.0, 3.0, 4.0);
    }
    root.update_transforms(TransformWriteOrigin::Editor);

    let state = state.borrow();
    let body = state.single_body();
    let (scale, _rotation, translation) =
        state.bodies[&body].transform.to_scale_rotation_translation();
    assert_vec3_near(scale, Vec3::ONE, EPS);
    assert_vec3_near(translation, Vec3::new(1.0, 0.0, 0.0), EPS);
}

// ============================================================================
// Physics -> Editor Pulls
// ============================================================================

#[test]
fn pull_writes_node_without_pushing_back() {
    let (mut root, state) = physics_root();
    let node = root.create_new_empty_node("crate");
    root.attach_to_node(node, dynamic_body("crate")).unwrap();
    root.update_transforms(TransformWriteOrigin::Editor);
    let pushes_before = state.borrow().set_transform_calls;

    // Simulation moves the body.
    {
        let mut state = state.borrow_mut();
        let body = state.single_body();
        state.bodies.get_mut(&body).unwrap().transform = Affine3A::from_rotation_translation(
            Quat::from_rotation_z(0.4),
            Vec3::new(1.0, 2.0, 3.0),
        );
    }
    root.update_physics_simulation_once_per_frame();

    let world = root.scene.get_node(node).unwrap().world_matrix().translation;
    assert_vec3_near(world.into(), Vec3::new(1.0, 2.0, 3.0), EPS);
    assert_eq!(state.borrow().set_transform_calls, pushes_before);

    // The pulled pose is settled editor state; the next editor pass must
    // not re-push it either.
    root.update_transforms(TransformWriteOrigin::Editor);
    assert_eq!(state.borrow().set_transform_calls, pushes_before);
}

#[test]
fn pull_restores_cached_node_scale() {
    let (mut root, state) = physics_root();
    let node = root.create_new_empty_node("crate");
    root.attach_to_node(node, dynamic_body("crate")).unwrap();
    root.scene.get_node_mut(node).unwrap().transform.scale = Vec3::new(2.0, 2.0, 2.0);
    root.update_transforms(TransformWriteOrigin::Editor);

    {
        let mut state = state.borrow_mut();
        let body = state.single_body();
        state.bodies.get_mut(&body).unwrap().transform =
            Affine3A::from_translation(Vec3::new(0.0, 1.0, 0.0));
    }
    root.update_physics_simulation_once_per_frame();

    let transform = &root.scene.get_node(node).unwrap().transform;
    assert_vec3_near(transform.scale, Vec3::splat(2.0), EPS);
    assert_vec3_near(transform.position, Vec3::new(0.0, 1.0, 0.0), EPS);
}

#[test]
fn sleeping_bodies_are_skipped() {
    let (mut root, state) = physics_root();
    let node = root.create_new_empty_node("crate");
    root.attach_to_node(node, dynamic_body("crate")).unwrap();
    root.update_transforms(TransformWriteOrigin::Editor);

    {
        let mut state = state.borrow_mut();
        let body = state.single_body();
        let b = state.bodies.get_mut(&body).unwrap();
        b.transform = Affine3A::from_translation(Vec3::new(9.0, 9.0, 9.0));
        b.active = false;
    }
    root.update_physics_simulation_once_per_frame();

    // The node keeps its settled pose.
    let world = root.scene.get_node(node).unwrap().world_matrix().translation;
    assert_vec3_near(world.into(), Vec3::ZERO, EPS);
}

#[test]
fn static_bodies_are_never_pulled() {
    let (mut root, state) = physics_root();
    let node = root.create_new_empty_node("floor");
    root.attach_to_node(
        node,
        Attachment::Physics(NodePhysics::new(RigidBodyDescriptor::new(0.0, "floor"))),
    )
    .unwrap();
    assert_eq!(
        root.scene.get_node(node).unwrap().physics().unwrap().motion_mode(),
        MotionMode::Static
    );

    {
        let mut state = state.borrow_mut();
        let body = state.single_body();
        state.bodies.get_mut(&body).unwrap().transform =
            Affine3A::from_translation(Vec3::new(0.0, -5.0, 0.0));
    }
    root.update_physics_simulation_once_per_frame();

    let world = root.scene.get_node(node).unwrap().world_matrix().translation;
    assert_vec3_near(world.into(), Vec3::ZERO, EPS);
}

#[test]
fn children_follow_a_pulled_parent() {
    let (mut root, state) = physics_root();
    let parent = root.create_new_empty_node("parent");
    let child = root.create_new_empty_node("child");
    root.scene.set_parent(child, parent, None).unwrap();
    root.scene.get_node_mut(child).unwrap().transform.position = Vec3::new(1.0, 0.0, 0.0);
    root.attach_to_node(parent, dynamic_body("parent")).unwrap();
    root.update_transforms(TransformWriteOrigin::Editor);

    {
        let mut state = state.borrow_mut();
        let body = state.single_body();
        state.bodies.get_mut(&body).unwrap().transform =
            Affine3A::from_translation(Vec3::new(5.0, 0.0, 0.0));
    }
    root.update_physics_simulation_once_per_frame();

    let child_world = root.scene.get_node(child).unwrap().world_matrix().translation;
    assert_vec3_near(child_world.into(), Vec3::new(6.0, 0.0, 0.0), EPS);
}

// ============================================================================
// Fall Respawn
// ============================================================================

#[test]
fn fallen_bodies_respawn_with_zeroed_velocities() {
    let (mut root, state) = physics_root();
    let node = root.create_new_empty_node("crate");
    root.attach_to_node(node, dynamic_body("crate")).unwrap();
    root.update_transforms(TransformWriteOrigin::Editor);

    {
        let mut state = state.borrow_mut();
        let body = state.single_body();
        let b = state.bodies.get_mut(&body).unwrap();
        b.transform = Affine3A::from_translation(Vec3::new(2.0, -150.0, 0.0));
        b.linear_velocity = Vec3::new(0.0, -40.0, 0.0);
        b.angular_velocity = Vec3::new(1.0, 1.0, 1.0);
    }
    root.update_physics_simulation_once_per_frame();

    let state = state.borrow();
    let body = state.single_body();
    let b = &state.bodies[&body];
    assert_vec3_near(b.transform.translation.into(), RESPAWN_POSITION, EPS);
    assert_vec3_near(b.linear_velocity, Vec3::ZERO, EPS);
    assert_vec3_near(b.angular_velocity, Vec3::ZERO, EPS);

    let world = root.scene.get_node(node).unwrap().world_matrix().translation;
    assert_vec3_near(world.into(), RESPAWN_POSITION, EPS);
}

#[test]
fn editor_push_below_the_floor_is_clamped() {
    let (mut root, state) = physics_root();
    let node = root.create_new_empty_node("crate");
    root.attach_to_node(node, dynamic_body("crate")).unwrap();
    root.update_transforms(TransformWriteOrigin::Editor);

    root.scene.get_node_mut(node).unwrap().transform.position = Vec3::new(0.0, -200.0, 0.0);
    root.update_transforms(TransformWriteOrigin::Editor);

    // The body never sees the sub-floor pose; the node catches up on the
    // next pull.
    let body_pos: Vec3 = {
        let state = state.borrow();
        let body = state.single_body();
        state.bodies[&body].transform.translation.into()
    };
    assert_vec3_near(body_pos, RESPAWN_POSITION, EPS);

    root.update_physics_simulation_once_per_frame();
    let world = root.scene.get_node(node).unwrap().world_matrix().translation;
    assert_vec3_near(world.into(), RESPAWN_POSITION, EPS);
}

#[test]
fn bodies_above_the_threshold_are_left_alone() {
    let (mut root, state) = physics_root();
    let node = root.create_new_empty_node("crate");
    root.attach_to_node(node, dynamic_body("crate")).unwrap();
    root.update_transforms(TransformWriteOrigin::Editor);

    let just_above = Vec3::new(0.0, FALL_Y_THRESHOLD + 0.1, 0.0);
    {
        let mut state = state.borrow_mut();
        let body = state.single_body();
        state.bodies.get_mut(&body).unwrap().transform = Affine3A::from_translation(just_above);
    }
    root.update_physics_simulation_once_per_frame();

    let world = root.scene.get_node(node).unwrap().world_matrix().translation;
    assert_vec3_near(world.into(), just_above, EPS);
}

// ============================================================================
// Fixed Step Driving
// ============================================================================

#[test]
fn fixed_steps_reach_the_backend() {
    let (mut root, state) = physics_root();
    root.update_physics_simulation_fixed_step(1.0 / 120.0);
    root.update_physics_simulation_fixed_step(1.0 / 120.0);
    assert_eq!(state.borrow().fixed_steps, 2);
}
