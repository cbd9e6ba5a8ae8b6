//! Rigid-body attachment: couples one node to one body in the physics
//! world.
//!
//! The body's local frame may differ from the node's origin (center of
//! mass offset), expressed by the `rigidbody_from_node` /
//! `node_from_rigidbody` transform pair. Physics backends do not support
//! per-instance scaled shapes, so the node's non-uniform scale is
//! stripped before any transform reaches the body and cached here so the
//! pull path can restore it.
//!
//! Every transform write carries a [`TransformWriteOrigin`]; a
//! `Physics`-origin write must not be pushed back into the world, which
//! would otherwise ping-pong between the simulation and the scene graph.

use glam::{Affine3A, Vec3};

use crate::physics::{BodyId, MotionMode, PhysicsWorld, RigidBodyDescriptor};

/// Who is writing a node transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformWriteOrigin {
    /// Editor-side: drag tools, animation, undo, scene loading.
    Editor,
    /// The per-frame pull from the physics simulation.
    Physics,
}

/// Dynamic bodies falling below this world Y are considered lost to
/// numeric divergence or tunneling and are respawned.
pub const FALL_Y_THRESHOLD: f32 = -100.0;

/// Where respawned bodies reappear.
pub const RESPAWN_POSITION: Vec3 = Vec3::new(0.0, 8.0, 0.0);

/// Physics aspect of a node.
#[derive(Debug)]
pub struct NodePhysics {
    descriptor: RigidBodyDescriptor,
    rigidbody_from_node: Affine3A,
    node_from_rigidbody: Affine3A,
    /// Node scale stripped from pushed transforms, restored on pull.
    scale: Vec3,
    motion_mode: MotionMode,
    pub(crate) body: Option<BodyId>,
}

impl NodePhysics {
    /// Creates the attachment from a body descriptor. Zero mass makes the
    /// body static, anything else dynamic; kinematic mode is only entered
    /// later through [`Self::set_motion_mode`].
    #[must_use]
    pub fn new(descriptor: RigidBodyDescriptor) -> Self {
        let motion_mode = if descriptor.mass == 0.0 {
            MotionMode::Static
        } else {
            MotionMode::Dynamic
        };
        log::trace!("created NodePhysics {}", descriptor.debug_label);
        Self {
            descriptor,
            rigidbody_from_node: Affine3A::IDENTITY,
            node_from_rigidbody: Affine3A::IDENTITY,
            scale: Vec3::ONE,
            motion_mode,
            body: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &RigidBodyDescriptor {
        &self.descriptor
    }

    #[inline]
    #[must_use]
    pub fn motion_mode(&self) -> MotionMode {
        self.motion_mode
    }

    /// Changed by external callers, e.g. a drag tool switching a grabbed
    /// body to kinematic for the duration of the drag.
    pub fn set_motion_mode(&mut self, motion_mode: MotionMode) {
        self.motion_mode = motion_mode;
    }

    /// Body handle, valid only while registered with a physics world.
    #[inline]
    #[must_use]
    pub fn body(&self) -> Option<BodyId> {
        self.body
    }

    #[inline]
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.body.is_some()
    }

    pub fn set_rigidbody_from_node(&mut self, rigidbody_from_node: Affine3A) {
        self.rigidbody_from_node = rigidbody_from_node;
        self.node_from_rigidbody = rigidbody_from_node.inverse();
    }

    #[inline]
    #[must_use]
    pub fn rigidbody_from_node(&self) -> &Affine3A {
        &self.rigidbody_from_node
    }

    #[inline]
    #[must_use]
    pub fn cached_scale(&self) -> Vec3 {
        self.scale
    }

    /// Body pose for a given node world transform: strips scale (caching
    /// it for the pull direction) and applies the body frame offset.
    pub(crate) fn world_from_rigidbody(&mut self, world_from_node: &Affine3A) -> Affine3A {
        let (scale, rotation, translation) = world_from_node.to_scale_rotation_translation();
        self.scale = scale;
        Affine3A::from_rotation_translation(rotation, translation) * self.node_from_rigidbody
    }

    /// Node world transform for a given body pose: applies the inverse
    /// frame offset and restores the cached scale.
    #[must_use]
    pub(crate) fn world_from_node_for_pull(&self, world_from_rigidbody: Affine3A) -> Affine3A {
        world_from_rigidbody * self.rigidbody_from_node * Affine3A::from_scale(self.scale)
    }

    /// Editor-to-physics push, fired from the hierarchy pass when the
    /// owning node's world transform changed for a non-physics reason.
    ///
    /// The simulation's velocity state is deliberately left untouched.
    pub(crate) fn push_world_transform(
        &mut self,
        world_from_node: &Affine3A,
        world: &mut dyn PhysicsWorld,
    ) {
        let Some(body) = self.body else {
            // Node was updated while detached from any physics world.
            log::warn!(
                "NodePhysics '{}' is not in a physics world",
                self.descriptor.debug_label
            );
            return;
        };

        let mut world_from_rigidbody = self.world_from_rigidbody(world_from_node);
        if world_from_rigidbody.translation.y < FALL_Y_THRESHOLD {
            // Same fall safety net as the pull direction.
            log::warn!(
                "'{}' pushed below the world floor, respawning",
                self.descriptor.debug_label
            );
            world_from_rigidbody.translation = RESPAWN_POSITION.into();
            world.set_linear_velocity(body, Vec3::ZERO);
            world.set_angular_velocity(body, Vec3::ZERO);
        }
        log::trace!(
            "push {} pos = {:?}",
            self.descriptor.debug_label,
            world_from_rigidbody.translation
        );
        world.set_world_transform(body, world_from_rigidbody);
    }
}
