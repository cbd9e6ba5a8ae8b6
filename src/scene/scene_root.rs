//! Scene root: the host that wires a scene graph to its collaborators.
//!
//! A bare [`Scene`] knows nothing about rigid bodies or ray queries. The
//! [`SceneRoot`] owns the scene together with an optional physics world
//! and an optional raytrace scene and runs the attachment lifecycle:
//! attaching a [`NodePhysics`] creates a body, attaching a
//! [`NodeRaytrace`] creates an acceleration-structure instance, and
//! detaching tears both down. Both collaborators are soft-disabled; with
//! neither present a `SceneRoot` degrades to a plain hierarchy.
//!
//! Per-frame driving order is fixed:
//! 1. fixed-step simulation updates (possibly several per frame),
//! 2. one physics pull ([`Self::update_physics_simulation_once_per_frame`]),
//! 3. editor-origin transform pass ([`Self::update_transforms`]),
//! 4. pointer hit-testing for rendertarget surfaces.

use glam::Affine3A;
use parking_lot::Mutex;

use crate::errors::{ArborError, Result};
use crate::physics::{MotionMode, PhysicsWorld};
use crate::raytrace::{visibility_mask_from_flags, RaytraceScene};
use crate::scene::attachment::{Attachment, AttachmentKind};
use crate::scene::camera::Camera;
use crate::scene::light::Light;
use crate::scene::node::Node;
use crate::scene::node_physics::{TransformWriteOrigin, FALL_Y_THRESHOLD, RESPAWN_POSITION};
use crate::scene::rendertarget::SceneView;
use crate::scene::scene::Scene;
use crate::scene::transform_system::{self, AttachmentSync};
use crate::scene::{ItemFlags, NodeHandle};

/// A container items can be attached to and detached from.
///
/// The scene core has one implementation, [`SceneRoot`]; tools and asset
/// import go through this trait so they do not care which scene (content,
/// tool overlay, brush preview) hosts the items they create.
pub trait ItemHost {
    fn host_name(&self) -> &str;
    fn attach_to_node(&mut self, handle: NodeHandle, attachment: Attachment) -> Result<()>;
    fn detach_from_node(&mut self, handle: NodeHandle, kind: AttachmentKind) -> Result<Attachment>;
}

/// A scene plus the collaborators its attachments synchronize with.
pub struct SceneRoot {
    pub scene: Scene,

    physics: Option<Box<dyn PhysicsWorld>>,
    raytrace: Option<Box<dyn RaytraceScene>>,

    /// Nodes carrying a registered physics attachment. Kept depth-sorted
    /// lazily; the pull pass sorts before iterating.
    node_physics: Vec<NodeHandle>,
    /// Nodes carrying an attached raytrace instance.
    node_raytraces: Vec<NodeHandle>,
    /// Rendertarget-surface nodes. Locked separately because pointer
    /// updates come from the input thread, not the frame driver.
    rendertarget_meshes: Mutex<Vec<NodeHandle>>,
}

impl SceneRoot {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            scene: Scene::new(name),
            physics: None,
            raytrace: None,
            node_physics: Vec::new(),
            node_raytraces: Vec::new(),
            rendertarget_meshes: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_physics(mut self, world: Box<dyn PhysicsWorld>) -> Self {
        self.physics = Some(world);
        self
    }

    #[must_use]
    pub fn with_raytrace(mut self, rt_scene: Box<dyn RaytraceScene>) -> Self {
        self.raytrace = Some(rt_scene);
        self
    }

    #[must_use]
    pub fn physics_world(&self) -> Option<&dyn PhysicsWorld> {
        self.physics.as_deref()
    }

    #[must_use]
    pub fn raytrace_scene(&self) -> Option<&dyn RaytraceScene> {
        self.raytrace.as_deref()
    }

    // ========================================================================
    // Node creation commands
    // ========================================================================

    pub fn create_new_empty_node(&mut self, name: &str) -> NodeHandle {
        self.scene.add_node(Node::new(name))
    }

    pub fn create_new_camera(&mut self, name: &str, camera: Camera) -> Result<NodeHandle> {
        let handle = self.scene.add_node(Node::new(name));
        self.attach_to_node(handle, Attachment::Camera(camera))?;
        Ok(handle)
    }

    pub fn create_new_light(&mut self, name: &str, light: Light) -> Result<NodeHandle> {
        let handle = self.scene.add_node(Node::new(name));
        self.attach_to_node(handle, Attachment::Light(light))?;
        Ok(handle)
    }

    // ========================================================================
    // Attachment lifecycle
    // ========================================================================

    /// Attaches `attachment` to the node and registers it with the scene
    /// and, where the kind requires it, with the physics or raytrace
    /// collaborator.
    pub fn attach_to_node(&mut self, handle: NodeHandle, attachment: Attachment) -> Result<()> {
        let kind = attachment.kind();
        let is_rendertarget = attachment.as_mesh().is_some_and(crate::scene::mesh::Mesh::is_rendertarget);
        let mesh_layer = attachment.as_mesh().map(|m| m.layer);

        {
            let Some(node) = self.scene.get_node_mut(handle) else {
                return Err(ArborError::NodeNotFound {
                    context: "attach_to_node",
                });
            };
            log::trace!(
                "attach {} to '{}'",
                attachment.type_name(),
                node.item.name
            );
            node.push_attachment(attachment);
        }

        if kind == AttachmentKind::MESH {
            if let Some(layer) = mesh_layer {
                self.scene.register_mesh(handle, layer);
            }
            if is_rendertarget {
                self.rendertarget_meshes.lock().push(handle);
            }
        } else if kind == AttachmentKind::CAMERA {
            self.scene.register_camera(handle);
        } else if kind == AttachmentKind::LIGHT {
            self.scene.register_light(handle);
        } else if kind == AttachmentKind::SKIN {
            self.scene.register_skin(handle);
        } else if kind == AttachmentKind::PHYSICS {
            self.register_node_physics(handle);
        } else if kind == AttachmentKind::RAYTRACE {
            self.register_node_raytrace(handle);
        }

        // Any attachment can widen the node's ray-visibility mask.
        self.refresh_raytrace_mask(handle);
        Ok(())
    }

    /// Detaches the first attachment of `kind` from the node, releasing
    /// its body or instance first, and returns it to the caller.
    pub fn detach_from_node(
        &mut self,
        handle: NodeHandle,
        kind: AttachmentKind,
    ) -> Result<Attachment> {
        if self.scene.get_node(handle).is_none() {
            return Err(ArborError::NodeNotFound {
                context: "detach_from_node",
            });
        }

        if kind == AttachmentKind::PHYSICS {
            self.unregister_node_physics(handle);
        } else if kind == AttachmentKind::RAYTRACE {
            self.unregister_node_raytrace(handle);
        }

        let node = self
            .scene
            .get_node_mut(handle)
            .ok_or(ArborError::NodeNotFound {
                context: "detach_from_node",
            })?;
        let name = node.item.name.clone();
        let Some(attachment) = node.take_attachment(kind) else {
            return Err(ArborError::AttachmentNotFound {
                node: name,
                type_name: attachment_kind_name(kind),
            });
        };

        match &attachment {
            Attachment::Mesh(mesh) => {
                self.scene.unregister_mesh(handle, mesh.layer);
                if mesh.is_rendertarget() {
                    let mut rts = self.rendertarget_meshes.lock();
                    rts.retain(|&h| h != handle);
                }
            }
            Attachment::Camera(_) => self.scene.unregister_camera(handle),
            Attachment::Light(_) => self.scene.unregister_light(handle),
            Attachment::Skin(_) => self.scene.unregister_skin(handle),
            _ => {}
        }

        self.refresh_raytrace_mask(handle);
        Ok(attachment)
    }

    /// Removes one node; its children become roots. Host resources are
    /// released before the node leaves the arena.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        self.release_host_aspects(handle);
        self.scene.remove(handle);
    }

    /// Removes a whole subtree, releasing host resources leaf-to-root.
    pub fn recursive_remove_node(&mut self, handle: NodeHandle) {
        for h in self.scene.subtree_post_order(handle) {
            self.release_host_aspects(h);
        }
        self.scene.recursive_remove(handle);
    }

    fn release_host_aspects(&mut self, handle: NodeHandle) {
        let Some(node) = self.scene.get_node(handle) else {
            return;
        };
        let kinds = node.attachment_kinds();
        if kinds.contains(AttachmentKind::PHYSICS) {
            self.unregister_node_physics(handle);
        }
        if kinds.contains(AttachmentKind::RAYTRACE) {
            self.unregister_node_raytrace(handle);
        }
        let is_rt_mesh = self
            .scene
            .get_node(handle)
            .and_then(Node::mesh)
            .is_some_and(crate::scene::mesh::Mesh::is_rendertarget);
        if is_rt_mesh {
            self.rendertarget_meshes.lock().retain(|&h| h != handle);
        }
    }

    // ========================================================================
    // Physics registration & per-frame sync
    // ========================================================================

    /// Registers the node's physics attachment, creating the rigid body
    /// at the node's current world pose. Registering a node twice is a
    /// caller bug; in release builds it is logged and ignored.
    fn register_node_physics(&mut self, handle: NodeHandle) {
        debug_assert!(
            !self.node_physics.contains(&handle),
            "double physics registration"
        );
        if self.node_physics.contains(&handle) {
            log::error!(
                "node '{}' already has a registered physics attachment",
                self.scene.get_name(handle).unwrap_or_default()
            );
            return;
        }
        self.node_physics.push(handle);

        let Some(world) = self.physics.as_deref_mut() else {
            return;
        };
        let Some(node) = self.scene.get_node_mut(handle) else {
            return;
        };
        let world_from_node = *node.transform.world_matrix();
        let Some(node_physics) = node.physics_mut() else {
            return;
        };
        let world_from_rigidbody = node_physics.world_from_rigidbody(&world_from_node);
        let body = world.add_rigid_body(
            node_physics.descriptor(),
            node_physics.motion_mode(),
            world_from_rigidbody,
        );
        node_physics.body = Some(body);
    }

    fn unregister_node_physics(&mut self, handle: NodeHandle) {
        let Some(i) = self.node_physics.iter().position(|&h| h == handle) else {
            log::error!("physics attachment was never registered");
            return;
        };
        self.node_physics.remove(i);

        let Some(node) = self.scene.get_node_mut(handle) else {
            return;
        };
        let Some(node_physics) = node.physics_mut() else {
            return;
        };
        if let Some(body) = node_physics.body.take()
            && let Some(world) = self.physics.as_deref_mut()
        {
            world.remove_rigid_body(body);
        }
    }

    /// Advances the simulation by one fixed step. Call as many times per
    /// frame as the fixed-step accumulator demands, then pull results with
    /// [`Self::update_physics_simulation_once_per_frame`].
    pub fn update_physics_simulation_fixed_step(&mut self, dt: f64) {
        if let Some(world) = self.physics.as_deref_mut() {
            world.update_fixed_step(dt);
        }
    }

    /// Pulls simulated poses into the scene graph, once per frame.
    ///
    /// Nodes are visited in ascending depth order so a simulated parent's
    /// world matrix is final before a simulated child derives its local
    /// transform from it. Sleeping bodies are skipped; their nodes already
    /// hold the settled pose. Bodies fallen below [`FALL_Y_THRESHOLD`] are
    /// respawned at [`RESPAWN_POSITION`] with zeroed velocities.
    pub fn update_physics_simulation_once_per_frame(&mut self) {
        if self.physics.is_none() {
            return;
        }

        self.node_physics
            .retain(|&h| self.scene.get_node(h).is_some());
        self.node_physics
            .sort_by_key(|&h| self.scene.get_node(h).map_or(usize::MAX, Node::depth));

        let handles = self.node_physics.clone();
        for handle in handles {
            self.pull_body_transform(handle);
        }
    }

    fn pull_body_transform(&mut self, handle: NodeHandle) {
        let Some(world) = self.physics.as_deref_mut() else {
            return;
        };
        let Some(node) = self.scene.get_node(handle) else {
            return;
        };
        let parent = node.parent();
        let Some(node_physics) = node.physics() else {
            return;
        };
        if node_physics.motion_mode() != MotionMode::Dynamic {
            return;
        }
        let Some(body) = node_physics.body() else {
            return;
        };
        if !world.is_active(body) {
            return;
        }

        let mut world_from_rigidbody = world.get_world_transform(body);
        if world_from_rigidbody.translation.y < FALL_Y_THRESHOLD {
            log::warn!(
                "'{}' fell out of the world, respawning",
                node.item.name
            );
            world_from_rigidbody.translation = RESPAWN_POSITION.into();
            world.set_world_transform(body, world_from_rigidbody);
            world.set_linear_velocity(body, glam::Vec3::ZERO);
            world.set_angular_velocity(body, glam::Vec3::ZERO);
        }

        let parent_world = parent
            .and_then(|p| self.scene.get_node(p))
            .map_or(Affine3A::IDENTITY, |p| *p.transform.world_matrix());

        let Some(node) = self.scene.get_node_mut(handle) else {
            return;
        };
        let world_from_node = match node.physics() {
            Some(np) => np.world_from_node_for_pull(world_from_rigidbody),
            None => return,
        };
        node.transform
            .apply_world_matrix(world_from_node, &parent_world);

        let children: Vec<NodeHandle> = node.children().to_vec();

        let mut sync = AttachmentSync {
            physics: Some(&mut *world),
            raytrace: self.raytrace.as_deref_mut(),
        };

        // The pulled node itself must not push back into the simulation;
        // descendants moved along with it are ordinary editor writes.
        if let Some(node) = self.scene.get_node_mut(handle) {
            transform_system::notify_attachments(node, TransformWriteOrigin::Physics, &mut sync);
        }
        for child in children {
            transform_system::update_subtree(
                &mut self.scene.nodes,
                child,
                TransformWriteOrigin::Editor,
                &mut sync,
            );
        }
    }

    // ========================================================================
    // Raytrace registration & masks
    // ========================================================================

    fn register_node_raytrace(&mut self, handle: NodeHandle) {
        debug_assert!(
            !self.node_raytraces.contains(&handle),
            "double raytrace registration"
        );
        if self.node_raytraces.contains(&handle) {
            log::error!(
                "node '{}' already has a registered raytrace attachment",
                self.scene.get_name(handle).unwrap_or_default()
            );
            return;
        }
        self.node_raytraces.push(handle);

        let Some(rt_scene) = self.raytrace.as_deref_mut() else {
            return;
        };
        let Some(node) = self.scene.get_node_mut(handle) else {
            return;
        };
        let Some(node_raytrace) = node.raytrace_mut() else {
            return;
        };
        rt_scene.attach(node_raytrace.instance());
        node_raytrace.attached = true;
    }

    fn unregister_node_raytrace(&mut self, handle: NodeHandle) {
        let Some(i) = self.node_raytraces.iter().position(|&h| h == handle) else {
            log::error!("raytrace attachment was never registered");
            return;
        };
        self.node_raytraces.remove(i);

        let Some(node) = self.scene.get_node_mut(handle) else {
            return;
        };
        let Some(node_raytrace) = node.raytrace_mut() else {
            return;
        };
        if node_raytrace.attached
            && let Some(rt_scene) = self.raytrace.as_deref_mut()
        {
            rt_scene.detach(node_raytrace.instance());
        }
        node_raytrace.attached = false;
    }

    /// Recomputes the node's ray-visibility mask from the union of its
    /// item category flags and every attachment's category flags, and
    /// forwards it to the raytrace scene.
    fn refresh_raytrace_mask(&mut self, handle: NodeHandle) {
        let Some(node) = self.scene.get_node(handle) else {
            return;
        };
        if node.raytrace().is_none() {
            return;
        }

        let categories = node
            .attachments()
            .iter()
            .fold(node.item.flags.categories(), |acc, a| {
                acc | a.category_flags()
            });
        let mask = visibility_mask_from_flags(categories);

        let Some(node) = self.scene.get_node_mut(handle) else {
            return;
        };
        let Some(node_raytrace) = node.raytrace_mut() else {
            return;
        };
        if node_raytrace.mask() == mask {
            return;
        }
        node_raytrace.set_mask(mask);
        let instance = node_raytrace.instance();
        let attached = node_raytrace.attached;
        if attached && let Some(rt_scene) = self.raytrace.as_deref_mut() {
            rt_scene.set_mask(instance, mask);
        }
    }

    // ========================================================================
    // Flags
    // ========================================================================

    /// Flag mutation entry point; keeps the raytrace mask in sync when a
    /// category bit changed.
    pub fn set_flag_bits(&mut self, handle: NodeHandle, mask: ItemFlags, value: bool) {
        let old = self
            .scene
            .get_node(handle)
            .map(|n| n.item.flags.categories());
        self.scene.set_flag_bits(handle, mask, value);
        let new = self
            .scene
            .get_node(handle)
            .map(|n| n.item.flags.categories());
        if old != new {
            self.refresh_raytrace_mask(handle);
        }
    }

    pub fn enable_flag_bits(&mut self, handle: NodeHandle, mask: ItemFlags) {
        self.set_flag_bits(handle, mask, true);
    }

    pub fn disable_flag_bits(&mut self, handle: NodeHandle, mask: ItemFlags) {
        self.set_flag_bits(handle, mask, false);
    }

    // ========================================================================
    // Transform pass & pointer hit testing
    // ========================================================================

    /// Runs the scene-wide transform pass, lending the collaborators to
    /// attachment sync.
    pub fn update_transforms(&mut self, origin: TransformWriteOrigin) {
        let mut sync = AttachmentSync {
            physics: self.physics.as_deref_mut(),
            raytrace: self.raytrace.as_deref_mut(),
        };
        self.scene.update_transforms(origin, &mut sync);
    }

    /// Hit-tests the view's pointer ray against every rendertarget
    /// surface, updating each surface's stored pointer position.
    pub fn update_pointer_for_rendertarget_meshes(&mut self, view: &SceneView) {
        let handles: Vec<NodeHandle> = self.rendertarget_meshes.lock().clone();
        for handle in handles {
            let Some(node) = self.scene.get_node_mut(handle) else {
                continue;
            };
            let world_from_mesh = *node.transform.world_matrix();
            if let Some(mesh) = node.mesh_mut()
                && let Some(rendertarget) = mesh.rendertarget.as_mut()
            {
                rendertarget.update_pointer(&world_from_mesh, view);
            }
        }
    }

    #[must_use]
    pub fn physics_node_count(&self) -> usize {
        self.node_physics.len()
    }

    #[must_use]
    pub fn raytrace_node_count(&self) -> usize {
        self.node_raytraces.len()
    }
}

impl ItemHost for SceneRoot {
    fn host_name(&self) -> &str {
        &self.scene.name
    }

    fn attach_to_node(&mut self, handle: NodeHandle, attachment: Attachment) -> Result<()> {
        SceneRoot::attach_to_node(self, handle, attachment)
    }

    fn detach_from_node(&mut self, handle: NodeHandle, kind: AttachmentKind) -> Result<Attachment> {
        SceneRoot::detach_from_node(self, handle, kind)
    }
}

fn attachment_kind_name(kind: AttachmentKind) -> &'static str {
    if kind == AttachmentKind::MESH {
        "Mesh"
    } else if kind == AttachmentKind::LIGHT {
        "Light"
    } else if kind == AttachmentKind::CAMERA {
        "Camera"
    } else if kind == AttachmentKind::PHYSICS {
        "NodePhysics"
    } else if kind == AttachmentKind::RAYTRACE {
        "NodeRaytrace"
    } else if kind == AttachmentKind::SKIN {
        "Skin"
    } else {
        "attachment"
    }
}
