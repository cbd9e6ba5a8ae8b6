//! Arbor: scene graph and editor core for an interactive 3D editor.
//!
//! The crate owns the retained node tree and keeps three external views
//! of it in sync: a rigid-body physics world, a raytrace scene used for
//! picking, and rendertarget surfaces hosting in-scene GUIs. Rendering
//! itself happens elsewhere; see [`render`] for the interface a renderer
//! consumes.

pub mod brush;
pub mod errors;
pub mod physics;
pub mod raytrace;
pub mod render;
pub mod scene;

pub use brush::{Brush, BrushDescriptor, BrushLibrary, BrushShape};
pub use errors::{ArborError, Result};
pub use physics::{BodyId, MotionMode, NullWorld, PhysicsWorld, RigidBodyDescriptor};
pub use raytrace::{InstanceId, NullRaytraceScene, RaytraceScene};
pub use render::{RenderParameters, RenderPass, Renderer, Viewport};
pub use scene::{
    Attachment, AttachmentKind, AttachmentSync, Camera, Item, ItemFilter, ItemFlags, ItemHost,
    Light, LightKind, Mesh, MeshLayerId, Node, NodeHandle, NodePhysics, NodeRaytrace, Ray,
    Rendertarget, Scene, SceneRoot, SceneView, Skin, Transform, TransformWriteOrigin,
};
