//! Hierarchy transform pass.
//!
//! Recomputes world matrices top-down, parent before child, and fires
//! attachment synchronization for every node whose world transform
//! changed. The pass borrows only the node arena and a sync context, not
//! the whole scene, so the caller can lend out its physics and raytrace
//! collaborators at the same time.
//!
//! The [`TransformWriteOrigin`] the caller passes is handed to every
//! notification: a pass triggered by a physics pull must not push poses
//! back into the physics world.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::physics::PhysicsWorld;
use crate::raytrace::RaytraceScene;
use crate::scene::attachment::Attachment;
use crate::scene::node::Node;
use crate::scene::node_physics::TransformWriteOrigin;
use crate::scene::NodeHandle;

/// Collaborators interested in node transform updates, borrowed for the
/// duration of one pass. Either side may be absent (soft-disabled).
#[derive(Default)]
pub struct AttachmentSync<'a> {
    pub physics: Option<&'a mut (dyn PhysicsWorld + 'static)>,
    pub raytrace: Option<&'a mut (dyn RaytraceScene + 'static)>,
}

impl AttachmentSync<'_> {
    /// A context with no collaborators; updates stay inside the scene.
    #[must_use]
    pub fn none() -> Self {
        AttachmentSync {
            physics: None,
            raytrace: None,
        }
    }
}

/// Updates world matrices for all trees in the scene.
///
/// Iterative traversal with an explicit stack; deep hierarchies must not
/// overflow the call stack.
pub fn update_hierarchy(
    nodes: &mut SlotMap<NodeHandle, Node>,
    roots: &[NodeHandle],
    origin: TransformWriteOrigin,
    sync: &mut AttachmentSync<'_>,
) {
    // (handle, parent world matrix, parent changed)
    let mut stack: Vec<(NodeHandle, Affine3A, bool)> = Vec::with_capacity(64);

    for &root in roots.iter().rev() {
        stack.push((root, Affine3A::IDENTITY, false));
    }

    while let Some((handle, parent_world, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            continue;
        };

        let local_changed = node.transform.update_local_matrix();
        let world_needs_update = local_changed || parent_changed;

        if world_needs_update {
            let new_world = parent_world * *node.transform.local_matrix();
            node.transform.set_world_matrix(new_world);
            notify_attachments(node, origin, sync);
        }

        let current_world = *node.transform.world_matrix();
        for i in (0..node.children().len()).rev() {
            let child = node.children()[i];
            stack.push((child, current_world, world_needs_update));
        }
    }
}

/// Updates the subtree rooted at `handle`, forcing recomputation even if
/// the local transforms are clean. Used after a reparent or after a
/// physics pull rewired a node's world transform directly.
pub fn update_subtree(
    nodes: &mut SlotMap<NodeHandle, Node>,
    handle: NodeHandle,
    origin: TransformWriteOrigin,
    sync: &mut AttachmentSync<'_>,
) {
    let parent_world = match nodes.get(handle) {
        Some(node) => node
            .parent()
            .and_then(|p| nodes.get(p))
            .map_or(Affine3A::IDENTITY, |p| *p.transform.world_matrix()),
        None => return,
    };

    let mut stack: Vec<(NodeHandle, Affine3A)> = vec![(handle, parent_world)];
    while let Some((handle, parent_world)) = stack.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            continue;
        };

        node.transform.update_local_matrix();
        let new_world = parent_world * *node.transform.local_matrix();
        node.transform.set_world_matrix(new_world);
        notify_attachments(node, origin, sync);

        for i in (0..node.children().len()).rev() {
            let child = node.children()[i];
            stack.push((child, new_world));
        }
    }
}

/// Lets a node's attachments react to its fresh world transform.
pub(crate) fn notify_attachments(node: &mut Node, origin: TransformWriteOrigin, sync: &mut AttachmentSync<'_>) {
    let world_from_node = *node.transform.world_matrix();

    for attachment in node.attachments.iter_mut() {
        match attachment {
            Attachment::Physics(node_physics) => {
                if origin == TransformWriteOrigin::Physics {
                    // The value came from the simulation; pushing it back
                    // would oscillate.
                    continue;
                }
                if let Some(world) = sync.physics.as_deref_mut() {
                    node_physics.push_world_transform(&world_from_node, world);
                }
            }
            Attachment::Camera(camera) => {
                camera.update_view(&world_from_node);
            }
            // Raytrace instances are re-read on demand by pick queries;
            // lights and meshes carry no cached world state of their own.
            _ => {}
        }
    }
}
