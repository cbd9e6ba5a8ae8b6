//! Renderer-facing interface.
//!
//! Drawing happens outside this crate. What the scene core defines is the
//! contract a renderer consumes: a viewport, a camera, the mesh layers to
//! draw, and an [`ItemFilter`] selecting which nodes of those layers
//! participate. Passes differ only in their parameters; a shadow pass
//! asks for shadow casters of the content layer, an id pass for
//! pickable items, a tool pass for tool overlays drawn over content.

use crate::scene::{ItemFilter, MaterialId, MeshLayerId, NodeHandle, Scene};

/// Target rectangle in framebuffer pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Width over height; `None` for degenerate extents.
    #[must_use]
    pub fn aspect_ratio(&self) -> Option<f32> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some(self.width as f32 / self.height as f32)
    }
}

/// Kind of output a pass produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderPass {
    /// Shaded color output.
    Color,
    /// Depth-only output for shadow maps.
    Shadow,
    /// Per-pixel item ids for picking.
    Id,
}

/// One renderer invocation, fully described.
pub struct RenderParameters<'a> {
    pub scene: &'a Scene,
    pub camera: NodeHandle,
    pub viewport: Viewport,
    pub pass: RenderPass,
    /// Layers drawn by this pass, in order.
    pub layers: &'a [MeshLayerId],
    /// Materials available to the pass, in binding order.
    pub materials: &'a [MaterialId],
    /// Selects participating nodes within those layers.
    pub filter: ItemFilter,
    /// Whether the light layer feeds this pass.
    pub use_lights: bool,
}

/// A renderer backend. The scene core never calls this itself; the frame
/// driver hands it parameters once transforms are final.
pub trait Renderer {
    fn render(&mut self, parameters: &RenderParameters<'_>);
}
