//! Node attachments: the closed set of aspects a node can carry.
//!
//! Rather than an open subclass hierarchy, attachments are a tagged
//! variant; [`AttachmentKind`] is the matching bitmask so callers can
//! filter a node's aspects without pattern matching every variant.
//! Each attachment is uniquely owned by exactly one node (it lives inline
//! in the node's attachment list) and is created already bound to its
//! defining data, then attached to a node afterwards.

use bitflags::bitflags;

use crate::scene::camera::Camera;
use crate::scene::light::Light;
use crate::scene::mesh::Mesh;
use crate::scene::node_physics::NodePhysics;
use crate::scene::node_raytrace::NodeRaytrace;
use crate::scene::skin::Skin;
use crate::scene::ItemFlags;

bitflags! {
    /// Type-tag mask for fast attachment filtering.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct AttachmentKind: u32 {
        const MESH     = 1 << 0;
        const LIGHT    = 1 << 1;
        const CAMERA   = 1 << 2;
        const PHYSICS  = 1 << 3;
        const RAYTRACE = 1 << 4;
        const SKIN     = 1 << 5;
    }
}

/// One aspect of a node.
#[derive(Debug)]
pub enum Attachment {
    Mesh(Mesh),
    Light(Light),
    Camera(Camera),
    Physics(NodePhysics),
    Raytrace(NodeRaytrace),
    Skin(Skin),
}

impl Attachment {
    #[must_use]
    pub fn kind(&self) -> AttachmentKind {
        match self {
            Attachment::Mesh(_) => AttachmentKind::MESH,
            Attachment::Light(_) => AttachmentKind::LIGHT,
            Attachment::Camera(_) => AttachmentKind::CAMERA,
            Attachment::Physics(_) => AttachmentKind::PHYSICS,
            Attachment::Raytrace(_) => AttachmentKind::RAYTRACE,
            Attachment::Skin(_) => AttachmentKind::SKIN,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Attachment::Mesh(_) => "Mesh",
            Attachment::Light(_) => "Light",
            Attachment::Camera(_) => "Camera",
            Attachment::Physics(_) => "NodePhysics",
            Attachment::Raytrace(_) => "NodeRaytrace",
            Attachment::Skin(_) => "Skin",
        }
    }

    /// Category flags this attachment contributes to the owning node's
    /// raytrace visibility mask.
    #[must_use]
    pub fn category_flags(&self) -> ItemFlags {
        match self {
            Attachment::Mesh(mesh) => mesh.flags.categories(),
            _ => ItemFlags::empty(),
        }
    }

    // ========================================================================
    // Typed accessors
    // ========================================================================

    #[must_use]
    pub fn as_mesh(&self) -> Option<&Mesh> {
        match self {
            Attachment::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_mesh_mut(&mut self) -> Option<&mut Mesh> {
        match self {
            Attachment::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_light(&self) -> Option<&Light> {
        match self {
            Attachment::Light(light) => Some(light),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_camera(&self) -> Option<&Camera> {
        match self {
            Attachment::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_camera_mut(&mut self) -> Option<&mut Camera> {
        match self {
            Attachment::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_physics(&self) -> Option<&NodePhysics> {
        match self {
            Attachment::Physics(physics) => Some(physics),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_physics_mut(&mut self) -> Option<&mut NodePhysics> {
        match self {
            Attachment::Physics(physics) => Some(physics),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_raytrace(&self) -> Option<&NodeRaytrace> {
        match self {
            Attachment::Raytrace(raytrace) => Some(raytrace),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_raytrace_mut(&mut self) -> Option<&mut NodeRaytrace> {
        match self {
            Attachment::Raytrace(raytrace) => Some(raytrace),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_skin(&self) -> Option<&Skin> {
        match self {
            Attachment::Skin(skin) => Some(skin),
            _ => None,
        }
    }
}
