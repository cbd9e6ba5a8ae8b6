//! Physics collaborator interface.
//!
//! The constraint solver lives outside this crate; the scene core talks to
//! it through [`PhysicsWorld`]. Bodies are referred to by opaque
//! [`BodyId`]s so a backend can keep whatever internal representation it
//! wants. [`NullWorld`] is the soft-disabled stand-in used when no physics
//! backend is attached.

use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Affine3A, Vec3};

/// Simulation mode of one rigid body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionMode {
    /// Never moves; infinite mass.
    Static,
    /// Moved by the editor, pushes other bodies but is not simulated.
    /// Used by interactive drag tools for grabbed bodies.
    Kinematic,
    /// Fully simulated.
    Dynamic,
}

/// Opaque rigid-body handle issued by a [`PhysicsWorld`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyId(pub u64);

static NEXT_BODY_ID: AtomicU64 = AtomicU64::new(1);

impl BodyId {
    /// Allocates a process-unique id. Backends may use this or issue
    /// their own ids; the scene core only compares them for identity.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_BODY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Everything a backend needs to create a rigid body.
///
/// Collision shapes are defined unscaled; per-node scale is stripped by
/// the owning attachment before any transform reaches the body.
#[derive(Clone, Debug)]
pub struct RigidBodyDescriptor {
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
    pub debug_label: String,
}

impl RigidBodyDescriptor {
    #[must_use]
    pub fn new(mass: f32, debug_label: &str) -> Self {
        Self {
            mass,
            friction: 0.5,
            restitution: 0.0,
            debug_label: debug_label.to_owned(),
        }
    }
}

/// The rigid-body simulation the scene core registers bodies with.
///
/// All transforms are rigid (rotation + translation) in world space.
pub trait PhysicsWorld {
    /// Creates a body at the given pose and returns its handle.
    fn add_rigid_body(
        &mut self,
        descriptor: &RigidBodyDescriptor,
        motion_mode: MotionMode,
        world_from_rigidbody: Affine3A,
    ) -> BodyId;

    /// Destroys a body. Unknown ids are ignored by well-behaved backends.
    fn remove_rigid_body(&mut self, body: BodyId);

    /// Advances the simulation by one fixed step.
    fn update_fixed_step(&mut self, dt: f64);

    fn set_world_transform(&mut self, body: BodyId, world_from_rigidbody: Affine3A);
    fn get_world_transform(&self, body: BodyId) -> Affine3A;
    fn set_linear_velocity(&mut self, body: BodyId, velocity: Vec3);
    fn set_angular_velocity(&mut self, body: BodyId, velocity: Vec3);

    /// Whether the body is awake. Sleeping bodies are skipped by the
    /// per-frame pull pass.
    fn is_active(&self, body: BodyId) -> bool;
}

/// No-op backend used when physics is disabled.
#[derive(Debug, Default)]
pub struct NullWorld;

impl PhysicsWorld for NullWorld {
    fn add_rigid_body(
        &mut self,
        _descriptor: &RigidBodyDescriptor,
        _motion_mode: MotionMode,
        _world_from_rigidbody: Affine3A,
    ) -> BodyId {
        BodyId::next()
    }

    fn remove_rigid_body(&mut self, _body: BodyId) {}

    fn update_fixed_step(&mut self, _dt: f64) {}

    fn set_world_transform(&mut self, _body: BodyId, _world_from_rigidbody: Affine3A) {}

    fn get_world_transform(&self, _body: BodyId) -> Affine3A {
        Affine3A::IDENTITY
    }

    fn set_linear_velocity(&mut self, _body: BodyId, _velocity: Vec3) {}

    fn set_angular_velocity(&mut self, _body: BodyId, _velocity: Vec3) {}

    fn is_active(&self, _body: BodyId) -> bool {
        false
    }
}
