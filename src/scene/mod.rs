//! Scene graph core.
//!
//! Nodes live in a generational arena inside [`Scene`] and are addressed
//! by copyable [`NodeHandle`]s; a handle to a removed node simply stops
//! resolving instead of dangling. Aspects (mesh, light, camera, physics,
//! raytrace, skin) attach to nodes as [`Attachment`] values, and
//! [`SceneRoot`] hosts the scene together with the physics and raytrace
//! collaborators those attachments synchronize with.

pub mod attachment;
pub mod camera;
pub mod item;
pub mod layers;
pub mod light;
pub mod mesh;
pub mod node;
pub mod node_physics;
pub mod node_raytrace;
pub mod rendertarget;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod scene_root;
pub mod skin;
pub mod transform;
pub mod transform_system;

slotmap::new_key_type! {
    /// Generational handle to a node in a scene's arena.
    pub struct NodeHandle;
}

pub use attachment::{Attachment, AttachmentKind};
pub use camera::{Camera, ProjectionType};
pub use item::{Item, ItemFilter, ItemFlags, ItemId};
pub use layers::{LightLayer, MeshLayer, MeshLayerId, SceneLayers};
pub use light::{Light, LightKind};
pub use mesh::{GeometryId, MaterialId, Mesh};
pub use node::Node;
pub use node_physics::{NodePhysics, TransformWriteOrigin, FALL_Y_THRESHOLD, RESPAWN_POSITION};
pub use node_raytrace::NodeRaytrace;
pub use rendertarget::{Ray, Rendertarget, SceneView};
pub use scene::Scene;
pub use scene_root::{ItemHost, SceneRoot};
pub use skin::Skin;
pub use transform::Transform;
pub use transform_system::AttachmentSync;
