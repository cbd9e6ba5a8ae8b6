//! Named mesh and light layers.
//!
//! Layers are ordered groups the renderer draws (or skips) as a unit:
//! interactive brushes, scene content, controller visuals, rendertarget
//! surfaces and tool overlays each get their own layer. Layer membership
//! is maintained by the mesh registration path, not by the meshes
//! themselves.

use crate::scene::{ItemFlags, NodeHandle};

/// Identifies one of the fixed mesh layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshLayerId {
    Brush,
    Content,
    Controller,
    Rendertarget,
    Tool,
}

impl MeshLayerId {
    pub const ALL: [MeshLayerId; 5] = [
        MeshLayerId::Brush,
        MeshLayerId::Content,
        MeshLayerId::Controller,
        MeshLayerId::Rendertarget,
        MeshLayerId::Tool,
    ];
}

/// An ordered group of mesh-bearing nodes.
#[derive(Debug)]
pub struct MeshLayer {
    pub name: &'static str,
    pub flags: ItemFlags,
    pub id: MeshLayerId,
    pub meshes: Vec<NodeHandle>,
}

impl MeshLayer {
    #[must_use]
    fn new(name: &'static str, flags: ItemFlags, id: MeshLayerId) -> Self {
        Self {
            name,
            flags,
            id,
            meshes: Vec::new(),
        }
    }
}

/// The single light group of a scene.
#[derive(Debug)]
pub struct LightLayer {
    pub name: &'static str,
    pub lights: Vec<NodeHandle>,
}

/// The fixed layer set every scene carries.
#[derive(Debug)]
pub struct SceneLayers {
    brush: MeshLayer,
    content: MeshLayer,
    controller: MeshLayer,
    rendertarget: MeshLayer,
    tool: MeshLayer,
    light: LightLayer,
}

impl SceneLayers {
    #[must_use]
    pub fn new() -> Self {
        Self {
            brush: MeshLayer::new("brush", ItemFlags::BRUSH, MeshLayerId::Brush),
            content: MeshLayer::new("content", ItemFlags::CONTENT, MeshLayerId::Content),
            controller: MeshLayer::new(
                "controller",
                ItemFlags::CONTROLLER,
                MeshLayerId::Controller,
            ),
            rendertarget: MeshLayer::new(
                "rendertarget",
                ItemFlags::RENDERTARGET,
                MeshLayerId::Rendertarget,
            ),
            tool: MeshLayer::new("tool", ItemFlags::TOOL, MeshLayerId::Tool),
            light: LightLayer {
                name: "lights",
                lights: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn layer(&self, id: MeshLayerId) -> &MeshLayer {
        match id {
            MeshLayerId::Brush => &self.brush,
            MeshLayerId::Content => &self.content,
            MeshLayerId::Controller => &self.controller,
            MeshLayerId::Rendertarget => &self.rendertarget,
            MeshLayerId::Tool => &self.tool,
        }
    }

    #[must_use]
    pub fn layer_mut(&mut self, id: MeshLayerId) -> &mut MeshLayer {
        match id {
            MeshLayerId::Brush => &mut self.brush,
            MeshLayerId::Content => &mut self.content,
            MeshLayerId::Controller => &mut self.controller,
            MeshLayerId::Rendertarget => &mut self.rendertarget,
            MeshLayerId::Tool => &mut self.tool,
        }
    }

    #[must_use]
    pub fn light(&self) -> &LightLayer {
        &self.light
    }

    #[must_use]
    pub fn light_mut(&mut self) -> &mut LightLayer {
        &mut self.light
    }
}

impl Default for SceneLayers {
    fn default() -> Self {
        Self::new()
    }
}
