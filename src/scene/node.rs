//! A scene node: a positioned item carrying a set of attachments.
//!
//! Hierarchy and identity live in the embedded [`Item`]; spatial state in
//! the [`Transform`]. Attachments are owned inline. Nodes are stored in
//! the scene's arena and referred to by [`NodeHandle`]s everywhere else.

use glam::Affine3A;
use smallvec::SmallVec;

use crate::scene::attachment::{Attachment, AttachmentKind};
use crate::scene::item::Item;
use crate::scene::transform::Transform;
use crate::scene::NodeHandle;

/// A node in the scene tree.
///
/// # Transform invariant
///
/// `world_from_node == parent world_from_node * parent_from_node`,
/// evaluated parent-first. The hierarchy pass guarantees this by
/// visiting nodes in non-decreasing depth order.
#[derive(Debug, Default)]
pub struct Node {
    pub item: Item,
    pub transform: Transform,
    pub(crate) attachments: SmallVec<[Attachment; 2]>,
}

impl Node {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            item: Item::new(name),
            transform: Transform::new(),
            attachments: SmallVec::new(),
        }
    }

    // ========================================================================
    // Hierarchy shortcuts
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.item.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.item.children
    }

    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.item.depth
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        self.transform.world_matrix()
    }

    // ========================================================================
    // Attachments
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    #[inline]
    pub fn attachments_mut(&mut self) -> &mut [Attachment] {
        &mut self.attachments
    }

    /// Union of the type tags of all attachments on this node.
    #[must_use]
    pub fn attachment_kinds(&self) -> AttachmentKind {
        self.attachments
            .iter()
            .fold(AttachmentKind::empty(), |acc, a| acc | a.kind())
    }

    #[must_use]
    pub fn has_attachment(&self, kind: AttachmentKind) -> bool {
        self.attachment_kinds().intersects(kind)
    }

    #[must_use]
    pub fn first_attachment(&self, kind: AttachmentKind) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.kind() == kind)
    }

    #[must_use]
    pub fn first_attachment_mut(&mut self, kind: AttachmentKind) -> Option<&mut Attachment> {
        self.attachments.iter_mut().find(|a| a.kind() == kind)
    }

    #[must_use]
    pub fn mesh(&self) -> Option<&crate::scene::mesh::Mesh> {
        self.first_attachment(AttachmentKind::MESH)?.as_mesh()
    }

    #[must_use]
    pub fn mesh_mut(&mut self) -> Option<&mut crate::scene::mesh::Mesh> {
        self.first_attachment_mut(AttachmentKind::MESH)?.as_mesh_mut()
    }

    #[must_use]
    pub fn camera(&self) -> Option<&crate::scene::camera::Camera> {
        self.first_attachment(AttachmentKind::CAMERA)?.as_camera()
    }

    #[must_use]
    pub fn light(&self) -> Option<&crate::scene::light::Light> {
        self.first_attachment(AttachmentKind::LIGHT)?.as_light()
    }

    #[must_use]
    pub fn physics(&self) -> Option<&crate::scene::node_physics::NodePhysics> {
        self.first_attachment(AttachmentKind::PHYSICS)?.as_physics()
    }

    #[must_use]
    pub fn physics_mut(&mut self) -> Option<&mut crate::scene::node_physics::NodePhysics> {
        self.first_attachment_mut(AttachmentKind::PHYSICS)?
            .as_physics_mut()
    }

    #[must_use]
    pub fn raytrace(&self) -> Option<&crate::scene::node_raytrace::NodeRaytrace> {
        self.first_attachment(AttachmentKind::RAYTRACE)?.as_raytrace()
    }

    #[must_use]
    pub fn raytrace_mut(&mut self) -> Option<&mut crate::scene::node_raytrace::NodeRaytrace> {
        self.first_attachment_mut(AttachmentKind::RAYTRACE)?
            .as_raytrace_mut()
    }

    #[must_use]
    pub fn skin(&self) -> Option<&crate::scene::skin::Skin> {
        self.first_attachment(AttachmentKind::SKIN)?.as_skin()
    }

    pub(crate) fn push_attachment(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    pub(crate) fn take_attachment(&mut self, kind: AttachmentKind) -> Option<Attachment> {
        let index = self.attachments.iter().position(|a| a.kind() == kind)?;
        Some(self.attachments.remove(index))
    }
}
