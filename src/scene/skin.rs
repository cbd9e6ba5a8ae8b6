//! Skin attachment data.
//!
//! Joints are node handles into the same arena as everything else, so a
//! skinned mesh and its skeleton share one hierarchy and one transform
//! pass.

use glam::Mat4;

use crate::scene::NodeHandle;

/// Skeleton binding for a skinned mesh.
#[derive(Debug, Clone, Default)]
pub struct Skin {
    pub joints: Vec<NodeHandle>,
    pub inverse_bind_matrices: Vec<Mat4>,
    /// Common root of the joint hierarchy, when the source asset names one.
    pub skeleton: Option<NodeHandle>,
}

impl Skin {
    #[must_use]
    pub fn new(joints: Vec<NodeHandle>, inverse_bind_matrices: Vec<Mat4>) -> Self {
        Self {
            joints,
            inverse_bind_matrices,
            skeleton: None,
        }
    }

    /// Joint matrices relative to the given mesh world transform.
    ///
    /// `joint_worlds` must be in the same order as `self.joints`; callers
    /// gather them from the scene after a transform pass.
    #[must_use]
    pub fn compute_joint_matrices(&self, mesh_world_inverse: &Mat4, joint_worlds: &[Mat4]) -> Vec<Mat4> {
        self.joints
            .iter()
            .enumerate()
            .map(|(i, _)| {
                let inverse_bind = self
                    .inverse_bind_matrices
                    .get(i)
                    .copied()
                    .unwrap_or(Mat4::IDENTITY);
                let world = joint_worlds.get(i).copied().unwrap_or(Mat4::IDENTITY);
                *mesh_world_inverse * world * inverse_bind
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use slotmap::SlotMap;

    use super::*;
    use crate::scene::node::Node;
    use crate::scene::NodeHandle;

    #[test]
    fn joint_at_bind_pose_yields_identity() {
        let mut arena: SlotMap<NodeHandle, Node> = SlotMap::with_key();
        let joint = arena.insert(Node::new("joint"));

        let bind_world = Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0));
        let skin = Skin::new(vec![joint], vec![bind_world.inverse()]);

        let matrices = skin.compute_joint_matrices(&Mat4::IDENTITY, &[bind_world]);
        assert_eq!(matrices.len(), 1);
        assert!(matrices[0].abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn moved_joint_yields_the_delta_from_bind() {
        let mut arena: SlotMap<NodeHandle, Node> = SlotMap::with_key();
        let joint = arena.insert(Node::new("joint"));

        let bind_world = Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0));
        let moved_world = Mat4::from_translation(Vec3::new(1.0, 2.0, 0.0));
        let skin = Skin::new(vec![joint], vec![bind_world.inverse()]);

        let matrices = skin.compute_joint_matrices(&Mat4::IDENTITY, &[moved_world]);
        let expected = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        assert!(matrices[0].abs_diff_eq(expected, 1e-6));
    }
}
