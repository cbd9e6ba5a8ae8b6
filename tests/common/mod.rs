//! Recording test doubles for the physics and raytrace collaborators.
//!
//! Both doubles share their state through an `Rc<RefCell<_>>` so a test
//! can hand ownership to a `SceneRoot` and still inspect every call the
//! scene core made.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::{Affine3A, Vec3};

use arbor::{BodyId, InstanceId, MotionMode, PhysicsWorld, RaytraceScene, RigidBodyDescriptor};

// ============================================================================
// Physics double
// ============================================================================

#[derive(Clone, Debug)]
pub struct TestBody {
    pub transform: Affine3A,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub active: bool,
    pub motion_mode: MotionMode,
    pub label: String,
}

#[derive(Default)]
pub struct WorldState {
    pub bodies: HashMap<BodyId, TestBody>,
    /// Bodies in creation order.
    pub order: Vec<BodyId>,
    /// Number of `set_world_transform` calls, i.e. editor pushes.
    pub set_transform_calls: usize,
    pub fixed_steps: usize,
    pub removed: Vec<BodyId>,
}

impl WorldState {
    pub fn single_body(&self) -> BodyId {
        assert_eq!(self.order.len(), 1, "expected exactly one body");
        self.order[0]
    }
}

/// Physics world double that records every call.
#[derive(Default)]
pub struct TestWorld {
    pub state: Rc<RefCell<WorldState>>,
}

impl TestWorld {
    pub fn new() -> (Self, Rc<RefCell<WorldState>>) {
        let world = Self::default();
        let state = world.state.clone();
        (world, state)
    }
}

impl PhysicsWorld for TestWorld {
    fn add_rigid_body(
        &mut self,
        descriptor: &RigidBodyDescriptor,
        motion_mode: MotionMode,
        world_from_rigidbody: Affine3A,
    ) -> BodyId {
        let body = BodyId::next();
        let mut state = self.state.borrow_mut();
        state.bodies.insert(
            body,
            TestBody {
                transform: world_from_rigidbody,
                linear_velocity: Vec3::ZERO,
                angular_velocity: Vec3::ZERO,
                active: true,
                motion_mode,
                label: descriptor.debug_label.clone(),
            },
        );
        state.order.push(body);
        body
    }

    fn remove_rigid_body(&mut self, body: BodyId) {
        let mut state = self.state.borrow_mut();
        state.bodies.remove(&body);
        state.order.retain(|&b| b != body);
        state.removed.push(body);
    }

    fn update_fixed_step(&mut self, _dt: f64) {
        self.state.borrow_mut().fixed_steps += 1;
    }

    fn set_world_transform(&mut self, body: BodyId, world_from_rigidbody: Affine3A) {
        let mut state = self.state.borrow_mut();
        state.set_transform_calls += 1;
        if let Some(b) = state.bodies.get_mut(&body) {
            b.transform = world_from_rigidbody;
        }
    }

    fn get_world_transform(&self, body: BodyId) -> Affine3A {
        self.state
            .borrow()
            .bodies
            .get(&body)
            .map_or(Affine3A::IDENTITY, |b| b.transform)
    }

    fn set_linear_velocity(&mut self, body: BodyId, velocity: Vec3) {
        if let Some(b) = self.state.borrow_mut().bodies.get_mut(&body) {
            b.linear_velocity = velocity;
        }
    }

    fn set_angular_velocity(&mut self, body: BodyId, velocity: Vec3) {
        if let Some(b) = self.state.borrow_mut().bodies.get_mut(&body) {
            b.angular_velocity = velocity;
        }
    }

    fn is_active(&self, body: BodyId) -> bool {
        self.state
            .borrow()
            .bodies
            .get(&body)
            .is_some_and(|b| b.active)
    }
}

// ============================================================================
// Raytrace double
// ============================================================================

#[derive(Default)]
pub struct RaytraceState {
    pub attached: Vec<InstanceId>,
    pub masks: HashMap<InstanceId, u32>,
    pub detach_calls: usize,
}

/// Raytrace scene double that records attachments and masks.
#[derive(Default)]
pub struct TestRaytraceScene {
    pub state: Rc<RefCell<RaytraceState>>,
}

impl TestRaytraceScene {
    pub fn new() -> (Self, Rc<RefCell<RaytraceState>>) {
        let scene = Self::default();
        let state = scene.state.clone();
        (scene, state)
    }
}

impl RaytraceScene for TestRaytraceScene {
    fn attach(&mut self, instance: InstanceId) {
        self.state.borrow_mut().attached.push(instance);
    }

    fn detach(&mut self, instance: InstanceId) {
        let mut state = self.state.borrow_mut();
        state.attached.retain(|&i| i != instance);
        state.detach_calls += 1;
    }

    fn set_mask(&mut self, instance: InstanceId, mask: u32) {
        self.state.borrow_mut().masks.insert(instance, mask);
    }
}

// ============================================================================
// Assertion helpers
// ============================================================================

pub fn assert_vec3_near(actual: Vec3, expected: Vec3, epsilon: f32) {
    assert!(
        (actual - expected).length() < epsilon,
        "expected {expected:?}, got {actual:?}"
    );
}
