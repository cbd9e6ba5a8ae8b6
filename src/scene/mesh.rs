//! Mesh attachment data.
//!
//! Geometry and materials are owned elsewhere (the brush library, asset
//! import); a mesh attachment references them by id and records which
//! layer it is drawn in plus its category flags. A mesh may additionally
//! carry a [`Rendertarget`] payload, which turns it into an in-scene GUI
//! surface.

use crate::scene::layers::MeshLayerId;
use crate::scene::rendertarget::Rendertarget;
use crate::scene::ItemFlags;

/// Index of a geometry owned outside the scene graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeometryId(pub u32);

/// Index of a material owned outside the scene graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

/// A drawable surface bound to one node.
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Category flags; contribute to the node's raytrace visibility mask.
    pub flags: ItemFlags,
    pub layer: MeshLayerId,
    pub geometry: GeometryId,
    pub material: MaterialId,
    /// Present when this mesh is an in-scene GUI surface.
    pub rendertarget: Option<Rendertarget>,
}

impl Mesh {
    #[must_use]
    pub fn new(layer: MeshLayerId, geometry: GeometryId, material: MaterialId) -> Self {
        let flags = match layer {
            MeshLayerId::Brush => ItemFlags::BRUSH,
            MeshLayerId::Content => {
                ItemFlags::CONTENT | ItemFlags::OPAQUE | ItemFlags::SHADOW_CAST
            }
            MeshLayerId::Controller => ItemFlags::CONTROLLER | ItemFlags::OPAQUE,
            MeshLayerId::Rendertarget => ItemFlags::RENDERTARGET | ItemFlags::TRANSLUCENT,
            MeshLayerId::Tool => ItemFlags::TOOL,
        };
        Self {
            flags,
            layer,
            geometry,
            material,
            rendertarget: None,
        }
    }

    /// A rendertarget-layer mesh carrying an off-screen GUI target.
    #[must_use]
    pub fn new_rendertarget(
        geometry: GeometryId,
        material: MaterialId,
        width_px: u32,
        height_px: u32,
        pixels_per_meter: f32,
    ) -> Self {
        let mut mesh = Self::new(MeshLayerId::Rendertarget, geometry, material);
        mesh.rendertarget = Some(Rendertarget::new(width_px, height_px, pixels_per_meter));
        mesh
    }

    #[must_use]
    pub fn with_flags(mut self, flags: ItemFlags) -> Self {
        self.flags = flags;
        self
    }

    #[inline]
    #[must_use]
    pub fn is_rendertarget(&self) -> bool {
        self.rendertarget.is_some()
    }
}
