//! The scene: node arena, hierarchy editing, and per-type registries.
//!
//! The scene owns every node and is the only place hierarchy is mutated,
//! so the structural invariants (parent/child backlinks, the depth rule,
//! acyclicity) are enforced in one module. Cross-cutting aspects that
//! need a physics world or raytrace scene are layered on top by
//! [`SceneRoot`](crate::scene::SceneRoot); a plain `Scene` is fully
//! usable without either.

use std::sync::atomic::{AtomicU32, Ordering};

use slotmap::SlotMap;

use crate::errors::{ArborError, Result};
use crate::scene::item::ItemFlags;
use crate::scene::layers::{MeshLayerId, SceneLayers};
use crate::scene::node::Node;
use crate::scene::node_physics::TransformWriteOrigin;
use crate::scene::transform_system::{self, AttachmentSync};
use crate::scene::NodeHandle;

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// Scene graph container.
pub struct Scene {
    pub id: u32,
    pub name: String,

    pub(crate) nodes: SlotMap<NodeHandle, Node>,
    /// Parentless nodes, in creation order.
    pub root_nodes: Vec<NodeHandle>,

    // ==== Per-type registries ====
    // Populated by explicit register/unregister calls from attachment
    // lifecycle handling; iteration never scans the whole arena.
    pub(crate) meshes: Vec<NodeHandle>,
    pub(crate) cameras: Vec<NodeHandle>,
    pub(crate) lights: Vec<NodeHandle>,
    pub(crate) skins: Vec<NodeHandle>,

    pub layers: SceneLayers,

    pub active_camera: Option<NodeHandle>,
}

impl Scene {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            id: NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed),
            name: name.to_owned(),
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            meshes: Vec::new(),
            cameras: Vec::new(),
            lights: Vec::new(),
            skins: Vec::new(),
            layers: SceneLayers::new(),
            active_camera: None,
        }
    }

    // ========================================================================
    // Node creation & access
    // ========================================================================

    pub fn create_node(&mut self) -> NodeHandle {
        self.add_node(Node::default())
    }

    pub fn create_node_with_name(&mut self, name: &str) -> NodeHandle {
        self.add_node(Node::new(name))
    }

    /// Inserts a detached node as a root.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    /// Inserts a node as the last child of `parent`.
    pub fn add_to_parent(&mut self, node: Node, parent: NodeHandle) -> Result<NodeHandle> {
        let handle = self.add_node(node);
        self.set_parent(handle, parent, None)?;
        Ok(handle)
    }

    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[must_use]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn get_name(&self, handle: NodeHandle) -> Option<&str> {
        self.nodes.get(handle).map(|n| n.item.name.as_str())
    }

    pub fn set_name(&mut self, handle: NodeHandle, name: &str) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.item.name = name.to_owned();
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ========================================================================
    // Hierarchy editing
    // ========================================================================

    /// Returns true when `ancestor_candidate` appears in the parent chain
    /// of `node`.
    #[must_use]
    pub fn is_ancestor(&self, node: NodeHandle, ancestor_candidate: NodeHandle) -> bool {
        let mut current = self.nodes.get(node).and_then(Node::parent);
        while let Some(handle) = current {
            if handle == ancestor_candidate {
                return true;
            }
            current = self.nodes.get(handle).and_then(Node::parent);
        }
        false
    }

    /// Moves `child` under `new_parent`, inserted at `position` (appended
    /// when `None` or out of range). Reparenting to the current parent at
    /// a new position is a valid reorder.
    ///
    /// Cyclic reparenting (under itself or any descendant) is rejected
    /// here rather than left to callers.
    pub fn set_parent(
        &mut self,
        child: NodeHandle,
        new_parent: NodeHandle,
        position: Option<usize>,
    ) -> Result<()> {
        if !self.nodes.contains_key(child) || !self.nodes.contains_key(new_parent) {
            return Err(ArborError::NodeNotFound {
                context: "set_parent",
            });
        }
        if child == new_parent || self.is_ancestor(new_parent, child) {
            return Err(ArborError::CyclicReparent {
                node: self.get_name(child).unwrap_or_default().to_owned(),
                new_parent: self.get_name(new_parent).unwrap_or_default().to_owned(),
            });
        }

        self.detach_from_parent(child);

        let parent_node = &mut self.nodes[new_parent];
        let index = position
            .unwrap_or(parent_node.item.children.len())
            .min(parent_node.item.children.len());
        parent_node.item.children.insert(index, child);
        let parent_depth = parent_node.item.depth;

        let child_node = &mut self.nodes[child];
        child_node.item.parent = Some(new_parent);
        child_node.transform.mark_dirty();
        self.set_depth_recursive(child, parent_depth + 1);
        Ok(())
    }

    /// Detaches `child` from its parent, making it a root. No-op for
    /// nodes that already are roots.
    pub fn detach(&mut self, child: NodeHandle) {
        let Some(node) = self.nodes.get(child) else {
            return;
        };
        if node.parent().is_none() {
            return;
        }
        self.detach_from_parent(child);
        self.root_nodes.push(child);
        let node = &mut self.nodes[child];
        node.item.parent = None;
        node.transform.mark_dirty();
        self.set_depth_recursive(child, 0);
    }

    /// Removes `handle` from the tree and the arena. Children are NOT
    /// removed and NOT promoted to the grandparent: they become
    /// parentless roots, and the caller decides what to do with them.
    pub fn remove(&mut self, handle: NodeHandle) {
        if !self.nodes.contains_key(handle) {
            return;
        }

        let children: Vec<NodeHandle> = self.nodes[handle].item.children.to_vec();
        for child in children {
            self.detach(child);
        }

        self.detach_from_parent(handle);
        self.unregister_all_for(handle);
        self.nodes.remove(handle);
    }

    /// Removes `handle` and, depth-first, all of its descendants.
    /// Registry unregistration runs leaf-to-root so no aspect outlives a
    /// deeper one that refers to it.
    pub fn recursive_remove(&mut self, handle: NodeHandle) {
        if !self.nodes.contains_key(handle) {
            return;
        }
        self.detach_from_parent(handle);

        for h in self.subtree_post_order(handle) {
            self.unregister_all_for(h);
            self.nodes.remove(h);
        }
    }

    /// Subtree handles in post order (leaves first, `handle` last).
    #[must_use]
    pub(crate) fn subtree_post_order(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        let mut order = Vec::new();
        let mut stack = vec![(handle, false)];
        while let Some((h, visited)) = stack.pop() {
            if visited {
                order.push(h);
                continue;
            }
            stack.push((h, true));
            if let Some(node) = self.nodes.get(h) {
                for &child in node.children() {
                    stack.push((child, false));
                }
            }
        }
        order
    }

    /// Unlinks `handle` from its parent's child list or the root list.
    /// Leaves `handle`'s own parent field untouched.
    fn detach_from_parent(&mut self, handle: NodeHandle) {
        let parent = self.nodes.get(handle).and_then(Node::parent);
        if let Some(parent) = parent {
            if let Some(parent_node) = self.nodes.get_mut(parent)
                && let Some(i) = parent_node.item.children.iter().position(|&c| c == handle)
            {
                parent_node.item.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&r| r == handle) {
            self.root_nodes.remove(i);
        }
    }

    /// Rewrites cached depths for a whole subtree.
    fn set_depth_recursive(&mut self, handle: NodeHandle, depth: usize) {
        let mut stack = vec![(handle, depth)];
        while let Some((h, d)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(h) else {
                continue;
            };
            node.item.depth = d;
            for &child in node.children() {
                stack.push((child, d + 1));
            }
        }
    }

    // ========================================================================
    // Flag mutation
    // ========================================================================

    /// All flag mutation funnels through here so the scene can react to
    /// transitions in one place.
    pub fn set_flag_bits(&mut self, handle: NodeHandle, mask: ItemFlags, value: bool) {
        let Some(node) = self.nodes.get_mut(handle) else {
            return;
        };
        let old = node.item.flags;
        let new = if value { old | mask } else { old - mask };
        if old != new {
            node.item.flags = new;
            self.handle_flag_bits_update(handle, old, new);
        }
    }

    pub fn enable_flag_bits(&mut self, handle: NodeHandle, mask: ItemFlags) {
        self.set_flag_bits(handle, mask, true);
    }

    pub fn disable_flag_bits(&mut self, handle: NodeHandle, mask: ItemFlags) {
        self.set_flag_bits(handle, mask, false);
    }

    fn handle_flag_bits_update(&mut self, handle: NodeHandle, old: ItemFlags, new: ItemFlags) {
        log::trace!(
            "flags of '{}' changed: {old:?} -> {new:?}",
            self.get_name(handle).unwrap_or_default()
        );
    }

    // ========================================================================
    // Per-type registries
    // ========================================================================

    pub(crate) fn register_mesh(&mut self, handle: NodeHandle, layer: MeshLayerId) {
        if self.meshes.contains(&handle) {
            log::error!("mesh node already registered in scene '{}'", self.name);
            return;
        }
        self.meshes.push(handle);
        self.layers.layer_mut(layer).meshes.push(handle);
    }

    pub(crate) fn unregister_mesh(&mut self, handle: NodeHandle, layer: MeshLayerId) {
        remove_registered(&mut self.meshes, handle, "mesh");
        remove_registered(&mut self.layers.layer_mut(layer).meshes, handle, "mesh layer");
    }

    pub(crate) fn register_camera(&mut self, handle: NodeHandle) {
        if self.cameras.contains(&handle) {
            log::error!("camera node already registered in scene '{}'", self.name);
            return;
        }
        self.cameras.push(handle);
        if self.active_camera.is_none() {
            self.active_camera = Some(handle);
        }
    }

    pub(crate) fn unregister_camera(&mut self, handle: NodeHandle) {
        remove_registered(&mut self.cameras, handle, "camera");
        if self.active_camera == Some(handle) {
            self.active_camera = self.cameras.first().copied();
        }
    }

    pub(crate) fn register_light(&mut self, handle: NodeHandle) {
        if self.lights.contains(&handle) {
            log::error!("light node already registered in scene '{}'", self.name);
            return;
        }
        self.lights.push(handle);
        self.layers.light_mut().lights.push(handle);
    }

    pub(crate) fn unregister_light(&mut self, handle: NodeHandle) {
        remove_registered(&mut self.lights, handle, "light");
        remove_registered(&mut self.layers.light_mut().lights, handle, "light layer");
    }

    pub(crate) fn register_skin(&mut self, handle: NodeHandle) {
        if self.skins.contains(&handle) {
            log::error!("skin node already registered in scene '{}'", self.name);
            return;
        }
        self.skins.push(handle);
    }

    pub(crate) fn unregister_skin(&mut self, handle: NodeHandle) {
        remove_registered(&mut self.skins, handle, "skin");
    }

    /// Scene-level registry cleanup for a node about to be destroyed.
    fn unregister_all_for(&mut self, handle: NodeHandle) {
        let Some(node) = self.nodes.get(handle) else {
            return;
        };
        let mut mesh_layers: Vec<MeshLayerId> = Vec::new();
        let mut has_camera = false;
        let mut has_light = false;
        let mut has_skin = false;
        for attachment in node.attachments() {
            match attachment {
                crate::scene::Attachment::Mesh(mesh) => mesh_layers.push(mesh.layer),
                crate::scene::Attachment::Camera(_) => has_camera = true,
                crate::scene::Attachment::Light(_) => has_light = true,
                crate::scene::Attachment::Skin(_) => has_skin = true,
                _ => {}
            }
        }
        for layer in mesh_layers {
            self.unregister_mesh(handle, layer);
        }
        if has_camera {
            self.unregister_camera(handle);
        }
        if has_light {
            self.unregister_light(handle);
        }
        if has_skin {
            self.unregister_skin(handle);
        }
    }

    #[must_use]
    pub fn cameras(&self) -> &[NodeHandle] {
        &self.cameras
    }

    #[must_use]
    pub fn lights(&self) -> &[NodeHandle] {
        &self.lights
    }

    #[must_use]
    pub fn meshes(&self) -> &[NodeHandle] {
        &self.meshes
    }

    #[must_use]
    pub fn skins(&self) -> &[NodeHandle] {
        &self.skins
    }

    /// Visible mesh-bearing nodes of one layer.
    pub fn iter_visible_meshes(
        &self,
        layer: MeshLayerId,
    ) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.layers
            .layer(layer)
            .meshes
            .iter()
            .filter_map(|&handle| self.nodes.get(handle).map(|node| (handle, node)))
            .filter(|(_, node)| node.item.is_visible())
    }

    // ========================================================================
    // Transform pass
    // ========================================================================

    /// Scene-wide world-matrix update, parent before child, firing
    /// attachment sync through `sync`.
    pub fn update_transforms(&mut self, origin: TransformWriteOrigin, sync: &mut AttachmentSync<'_>) {
        transform_system::update_hierarchy(&mut self.nodes, &self.root_nodes, origin, sync);
    }

    /// Forced update of one subtree, e.g. after a reparent.
    pub fn update_subtree(
        &mut self,
        handle: NodeHandle,
        origin: TransformWriteOrigin,
        sync: &mut AttachmentSync<'_>,
    ) {
        transform_system::update_subtree(&mut self.nodes, handle, origin, sync);
    }

    // ========================================================================
    // Structural validation
    // ========================================================================

    /// Validates parent/child backlink symmetry and the depth invariant.
    /// A debug aid for tests and structural-edit call sites, not an error
    /// path; panics on violation.
    pub fn sanity_check(&self) {
        for &root in &self.root_nodes {
            let node = self.nodes.get(root).expect("root list holds a dead handle");
            assert!(node.parent().is_none(), "root node has a parent");
            assert_eq!(node.depth(), 0, "root node depth must be 0");
        }

        for (handle, node) in &self.nodes {
            if let Some(parent) = node.parent() {
                let parent_node = self.nodes.get(parent).expect("parent handle is dead");
                assert!(
                    parent_node.children().contains(&handle),
                    "parent does not list '{}' as child",
                    node.item.name
                );
                assert_eq!(
                    node.depth(),
                    parent_node.depth() + 1,
                    "depth invariant broken at '{}'",
                    node.item.name
                );
            } else {
                assert!(
                    self.root_nodes.contains(&handle),
                    "parentless node '{}' missing from root list",
                    node.item.name
                );
            }
            for &child in node.children() {
                let child_node = self.nodes.get(child).expect("child handle is dead");
                assert_eq!(
                    child_node.parent(),
                    Some(handle),
                    "child backlink broken under '{}'",
                    node.item.name
                );
            }
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("Scene")
    }
}

/// Removes `handle` from a registry list; a missing entry is an error in
/// the log and otherwise a no-op, since out-of-order teardown can produce
/// it harmlessly.
fn remove_registered(list: &mut Vec<NodeHandle>, handle: NodeHandle, what: &str) {
    if let Some(i) = list.iter().position(|&h| h == handle) {
        list.remove(i);
    } else {
        log::error!("{what} node not in registry");
    }
}
