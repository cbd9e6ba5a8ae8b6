//! Item: identity, hierarchy and flag state shared by every scene entity.
//!
//! [`Item`] is plain data embedded in each [`Node`](crate::scene::Node);
//! the node arena owns all hierarchy. Parent/child relations are
//! [`NodeHandle`](crate::scene::NodeHandle) fields into the arena, so there
//! are no shared-pointer back-reference cycles to manage.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;
use glam::Vec4;
use smallvec::SmallVec;

use crate::scene::NodeHandle;

bitflags! {
    /// Per-item flag bits.
    ///
    /// The category bits (`CONTENT`, `TOOL`, `BRUSH`, `CONTROLLER`,
    /// `RENDERTARGET`, `ID`) classify what an item is for; the rest are
    /// editor state. Category bits also drive raytrace visibility masks,
    /// see [`crate::raytrace::visibility_mask_from_flags`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ItemFlags: u64 {
        const NO_MESSAGE                = 1 << 0;
        const NO_TRANSFORM_UPDATE       = 1 << 1;
        const TRANSFORM_WORLD_NORMATIVE = 1 << 2;
        const SHOW_IN_UI                = 1 << 3;
        const SHOW_DEBUG                = 1 << 4;
        const SHADOW_CAST               = 1 << 5;
        const SELECTED                  = 1 << 6;
        const LOCK_VIEWPORT_SELECTION   = 1 << 7;
        const LOCK_VIEWPORT_TRANSFORM   = 1 << 8;
        const VISIBLE                   = 1 << 9;
        const OPAQUE                    = 1 << 10;
        const TRANSLUCENT               = 1 << 11;
        const RENDER_WIREFRAME          = 1 << 12;
        const CONTENT                   = 1 << 13;
        const ID                        = 1 << 14;
        const TOOL                      = 1 << 15;
        const BRUSH                     = 1 << 16;
        const CONTROLLER                = 1 << 17;
        const RENDERTARGET              = 1 << 18;
    }
}

impl ItemFlags {
    /// The category subset used for layer assignment and raytrace masks.
    #[must_use]
    pub fn categories(self) -> ItemFlags {
        self & (ItemFlags::CONTENT
            | ItemFlags::ID
            | ItemFlags::TOOL
            | ItemFlags::BRUSH
            | ItemFlags::CONTROLLER
            | ItemFlags::RENDERTARGET
            | ItemFlags::SHADOW_CAST
            | ItemFlags::OPAQUE)
    }
}

/// Bitmask predicate over [`ItemFlags`], used by render passes and
/// visibility queries to select items without inspecting their type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub require_all_bits_set: ItemFlags,
    pub require_at_least_one_bit_set: ItemFlags,
    pub require_all_bits_clear: ItemFlags,
    pub require_at_least_one_bit_clear: ItemFlags,
}

impl ItemFilter {
    /// Returns true if `flags` passes all four bit conditions.
    #[must_use]
    pub fn matches(&self, flags: ItemFlags) -> bool {
        if !flags.contains(self.require_all_bits_set) {
            return false;
        }
        if !self.require_at_least_one_bit_set.is_empty()
            && !flags.intersects(self.require_at_least_one_bit_set)
        {
            return false;
        }
        if flags.intersects(self.require_all_bits_clear) {
            return false;
        }
        if !self.require_at_least_one_bit_clear.is_empty()
            && flags.contains(self.require_at_least_one_bit_clear)
        {
            return false;
        }
        true
    }

    /// Human-readable description, mostly for log output.
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "all set: {:?}, any set: {:?}, all clear: {:?}, any clear: {:?}",
            self.require_all_bits_set,
            self.require_at_least_one_bit_set,
            self.require_all_bits_clear,
            self.require_at_least_one_bit_clear,
        )
    }
}

/// Process-lifetime-unique, monotonically increasing item id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

impl ItemId {
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Identity, naming, flag and hierarchy state of a scene entity.
///
/// # Depth invariant
///
/// `depth == parent depth + 1` for attached items and `0` for detached
/// ones; [`Scene`](crate::scene::Scene) recomputes it on every reparent.
#[derive(Debug, Clone)]
pub struct Item {
    id: ItemId,
    pub name: String,
    pub label: String,
    pub wireframe_color: Vec4,
    pub source_path: Option<PathBuf>,

    pub(crate) flags: ItemFlags,
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: SmallVec<[NodeHandle; 4]>,
    pub(crate) depth: usize,
}

impl Item {
    #[must_use]
    pub fn new(name: &str) -> Self {
        let id = ItemId::next();
        Self {
            id,
            name: name.to_owned(),
            label: format!("{name}##{}", id.0),
            wireframe_color: Vec4::new(0.6, 0.7, 0.8, 0.7),
            source_path: None,
            flags: ItemFlags::VISIBLE | ItemFlags::SHOW_IN_UI,
            parent: None,
            children: SmallVec::new(),
            depth: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn flags(&self) -> ItemFlags {
        self.flags
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Distance from the root of the tree this item is attached to.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.flags.contains(ItemFlags::VISIBLE)
    }

    #[inline]
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.flags.contains(ItemFlags::SELECTED)
    }

    #[inline]
    #[must_use]
    pub fn is_shown_in_ui(&self) -> bool {
        self.flags.contains(ItemFlags::SHOW_IN_UI)
    }
}

impl Default for Item {
    fn default() -> Self {
        Self::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_ids_are_unique_and_monotonic() {
        let a = Item::new("a");
        let b = Item::new("b");
        assert!(b.id() > a.id());
    }

    #[test]
    fn filter_all_bits_set() {
        let filter = ItemFilter {
            require_all_bits_set: ItemFlags::VISIBLE | ItemFlags::CONTENT,
            ..ItemFilter::default()
        };
        assert!(filter.matches(ItemFlags::VISIBLE | ItemFlags::CONTENT | ItemFlags::OPAQUE));
        assert!(!filter.matches(ItemFlags::VISIBLE));
    }

    #[test]
    fn filter_any_bit_set_and_clear() {
        let filter = ItemFilter {
            require_at_least_one_bit_set: ItemFlags::TOOL | ItemFlags::BRUSH,
            require_all_bits_clear: ItemFlags::SELECTED,
            ..ItemFilter::default()
        };
        assert!(filter.matches(ItemFlags::TOOL));
        assert!(!filter.matches(ItemFlags::CONTENT));
        assert!(!filter.matches(ItemFlags::TOOL | ItemFlags::SELECTED));
    }
}
