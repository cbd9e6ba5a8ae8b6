//! Transform component: local TRS with cached local and world matrices.
//!
//! The dirty check is a shadow-state comparison: public `position` /
//! `rotation` / `scale` fields are compared against privately stored
//! last-seen values, so user code mutates fields directly and the
//! hierarchy pass picks the change up on its next visit.

use glam::{Affine3A, EulerRot, Mat3, Mat4, Quat, Vec3};

/// Local transform ("parent_from_node") plus the cached world transform
/// ("world_from_node") maintained by the hierarchy pass.
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    // Matrix caches, written by the hierarchy pass.
    pub(crate) local_matrix: Affine3A,
    pub(crate) world_matrix: Affine3A,

    // Shadow state for the dirty check.
    last_position: Vec3,
    last_rotation: Quat,
    last_scale: Vec3,
    force_update: bool,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,

            local_matrix: Affine3A::IDENTITY,
            world_matrix: Affine3A::IDENTITY,

            last_position: Vec3::ZERO,
            last_rotation: Quat::IDENTITY,
            last_scale: Vec3::ONE,
            force_update: true,
        }
    }

    // ========================================================================
    // Dirty check
    // ========================================================================

    /// Recomputes the local matrix if the TRS fields changed since the
    /// last call. Returns whether a recomputation happened.
    pub fn update_local_matrix(&mut self) -> bool {
        let changed = self.position != self.last_position
            || self.rotation != self.last_rotation
            || self.scale != self.last_scale
            || self.force_update;

        if changed {
            self.local_matrix = Affine3A::from_scale_rotation_translation(
                self.scale,
                self.rotation,
                self.position,
            );

            self.last_position = self.position;
            self.last_rotation = self.rotation;
            self.last_scale = self.scale;
            self.force_update = false;
        }

        changed
    }

    /// Forces the next [`Self::update_local_matrix`] to recompute, e.g.
    /// after a reparent where the TRS fields did not change.
    pub fn mark_dirty(&mut self) {
        self.force_update = true;
    }

    // ========================================================================
    // Getters & helpers
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    /// World matrix for CPU-side physics and picking math.
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }

    /// World matrix widened to `Mat4` for GPU upload paths.
    #[inline]
    #[must_use]
    pub fn world_matrix_as_mat4(&self) -> Mat4 {
        Mat4::from(self.world_matrix)
    }

    /// Written by the hierarchy pass after the parent matrix is valid.
    pub(crate) fn set_world_matrix(&mut self, mat: Affine3A) {
        self.world_matrix = mat;
    }

    pub fn set_rotation_euler(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
    }

    #[must_use]
    pub fn rotation_euler(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    /// Directly sets the local matrix, decomposing it back into TRS.
    ///
    /// Shear is lost in the decomposition. The transform is left dirty so
    /// the next hierarchy pass propagates the change.
    pub fn apply_local_matrix(&mut self, mat: Affine3A) {
        self.local_matrix = mat;

        let (scale, rotation, translation) = mat.to_scale_rotation_translation();
        self.scale = scale;
        self.rotation = rotation;
        self.position = translation;

        self.last_scale = scale;
        self.last_rotation = rotation;
        self.last_position = translation;

        self.mark_dirty();
    }

    /// Writes the world matrix directly and derives the local TRS from the
    /// given parent world matrix.
    ///
    /// Unlike [`Self::apply_local_matrix`] the shadow state is left in
    /// sync, so the next hierarchy pass treats this transform as clean.
    /// This is the physics pull path: the simulation result must land in
    /// the node without being pushed back out to the simulation again.
    pub(crate) fn apply_world_matrix(&mut self, world: Affine3A, parent_world: &Affine3A) {
        self.world_matrix = world;

        let local = parent_world.inverse() * world;
        self.local_matrix = local;

        let (scale, rotation, translation) = local.to_scale_rotation_translation();
        self.scale = scale;
        self.rotation = rotation;
        self.position = translation;

        self.last_scale = scale;
        self.last_rotation = rotation;
        self.last_position = translation;
        self.force_update = false;
    }

    /// Orients this transform to look at `target` (parent space).
    /// Degenerate configurations (forward collinear with `up`) are a no-op.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize();

        if forward.cross(up).length_squared() < 1e-4 {
            return;
        }

        let right = forward.cross(up).normalize();
        let new_up = right.cross(forward).normalize();

        let rot_mat = Mat3::from_cols(right, new_up, -forward);
        self.rotation = Quat::from_mat3(&rot_mat);
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
