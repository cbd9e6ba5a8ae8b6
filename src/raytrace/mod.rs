//! Raytrace collaborator interface.
//!
//! The acceleration structure lives outside this crate; the scene core
//! attaches and detaches per-node instances through [`RaytraceScene`] and
//! assigns each instance a visibility mask derived from item category
//! flags, so pick rays can select "content only", "tools only" and so on.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::scene::ItemFlags;

/// Opaque acceleration-structure instance handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InstanceId(pub u64);

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

impl InstanceId {
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Ray-visibility mask bits, one per item category.
pub mod visibility {
    pub const OPAQUE: u32 = 1 << 0;
    pub const CONTENT: u32 = 1 << 1;
    pub const SHADOW_CAST: u32 = 1 << 2;
    pub const TOOL: u32 = 1 << 3;
    pub const BRUSH: u32 = 1 << 4;
    pub const CONTROLLER: u32 = 1 << 5;
    pub const RENDERTARGET: u32 = 1 << 6;
}

/// Maps item category flags to ray-visibility mask bits.
///
/// An attachment flagged with several categories contributes all of the
/// corresponding bits; a node's instance mask is the union over its
/// attachments.
#[must_use]
pub fn visibility_mask_from_flags(flags: ItemFlags) -> u32 {
    let mut mask = 0;
    if flags.contains(ItemFlags::OPAQUE) {
        mask |= visibility::OPAQUE;
    }
    if flags.contains(ItemFlags::CONTENT) {
        mask |= visibility::CONTENT;
    }
    if flags.contains(ItemFlags::SHADOW_CAST) {
        mask |= visibility::SHADOW_CAST;
    }
    if flags.contains(ItemFlags::TOOL) {
        mask |= visibility::TOOL;
    }
    if flags.contains(ItemFlags::BRUSH) {
        mask |= visibility::BRUSH;
    }
    if flags.contains(ItemFlags::CONTROLLER) {
        mask |= visibility::CONTROLLER;
    }
    if flags.contains(ItemFlags::RENDERTARGET) {
        mask |= visibility::RENDERTARGET;
    }
    mask
}

/// The acceleration structure the scene core attaches instances to.
pub trait RaytraceScene {
    fn attach(&mut self, instance: InstanceId);
    fn detach(&mut self, instance: InstanceId);
    fn set_mask(&mut self, instance: InstanceId, mask: u32);
}

/// No-op backend used when raytracing is disabled.
#[derive(Debug, Default)]
pub struct NullRaytraceScene;

impl RaytraceScene for NullRaytraceScene {
    fn attach(&mut self, _instance: InstanceId) {}
    fn detach(&mut self, _instance: InstanceId) {}
    fn set_mask(&mut self, _instance: InstanceId, _mask: u32) {}
}
