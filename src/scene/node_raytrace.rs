//! Raytrace attachment: couples one node to one acceleration-structure
//! instance used by pick queries.

use crate::raytrace::InstanceId;

/// Raytrace aspect of a node.
///
/// The visibility mask is the union of the category masks of every
/// attachment on the owning node; [`SceneRoot`](crate::scene::SceneRoot)
/// computes it on registration and whenever category flags change.
#[derive(Debug)]
pub struct NodeRaytrace {
    instance: InstanceId,
    mask: u32,
    pub(crate) attached: bool,
}

impl NodeRaytrace {
    #[must_use]
    pub fn new() -> Self {
        Self {
            instance: InstanceId::next(),
            mask: 0,
            attached: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    /// Current ray-visibility mask.
    #[inline]
    #[must_use]
    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Whether the instance is attached to a raytrace scene.
    #[inline]
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub(crate) fn set_mask(&mut self, mask: u32) {
        self.mask = mask;
    }
}

impl Default for NodeRaytrace {
    fn default() -> Self {
        Self::new()
    }
}
