//! Rendertarget surfaces: meshes that carry an off-screen GUI target.
//!
//! A rendertarget mesh is a flat quad in the scene whose texture is drawn
//! by a nested GUI. For the GUI to receive hover and click events the
//! quad needs per-frame hit testing against whatever pointing device the
//! user holds: a mouse ray, a controller ray or a fingertip. All of those
//! reduce to a world-space [`Ray`] carried by [`SceneView`].
//!
//! The quad lies in its node's local XY plane, centered on the origin,
//! facing +Z. Window coordinates are in pixels with the origin at the
//! top-left, matching GUI conventions.

use glam::{Affine3A, Vec2, Vec3};

/// A world-space ray.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Per-frame pointer state of the active viewport, device-agnostic.
#[derive(Clone, Copy, Debug, Default)]
pub struct SceneView {
    /// Ray under the pointing device, if any.
    pub pointer_ray: Option<Ray>,
}

/// Off-screen GUI target carried by a mesh attachment.
#[derive(Debug, Clone)]
pub struct Rendertarget {
    width_px: f32,
    height_px: f32,
    pixels_per_meter: f32,
    pointer: Option<Vec2>,
}

impl Rendertarget {
    #[must_use]
    pub fn new(width_px: u32, height_px: u32, pixels_per_meter: f32) -> Self {
        Self {
            width_px: width_px as f32,
            height_px: height_px as f32,
            pixels_per_meter,
            pointer: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> f32 {
        self.width_px
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> f32 {
        self.height_px
    }

    #[inline]
    #[must_use]
    pub fn pixels_per_meter(&self) -> f32 {
        self.pixels_per_meter
    }

    /// Pointer position in window pixels from the last
    /// [`Self::update_pointer`], if the pointer hit the surface.
    #[inline]
    #[must_use]
    pub fn get_pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    /// World-space size of the quad.
    #[must_use]
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(
            self.width_px / self.pixels_per_meter,
            self.height_px / self.pixels_per_meter,
        )
    }

    /// Projects a world position onto the quad plane, in window pixels.
    /// Returns `None` when the projected point lies outside the quad.
    #[must_use]
    pub fn world_to_window(
        &self,
        world_from_mesh: &Affine3A,
        world_position: Vec3,
    ) -> Option<Vec2> {
        let mesh_from_world = world_from_mesh.inverse();
        let local = mesh_from_world.transform_point3(world_position);
        self.local_to_window(Vec2::new(local.x, local.y))
    }

    /// Intersects the scene-view pointer ray with the quad and stores the
    /// resulting window position. Returns whether the surface was hit.
    pub fn update_pointer(&mut self, world_from_mesh: &Affine3A, view: &SceneView) -> bool {
        self.pointer = view
            .pointer_ray
            .and_then(|ray| self.intersect(world_from_mesh, ray));
        self.pointer.is_some()
    }

    fn intersect(&self, world_from_mesh: &Affine3A, ray: Ray) -> Option<Vec2> {
        let mesh_from_world = world_from_mesh.inverse();
        let origin = mesh_from_world.transform_point3(ray.origin);
        let direction = mesh_from_world.transform_vector3(ray.direction);

        // Quad plane is local z = 0.
        if direction.z.abs() < 1e-6 {
            return None;
        }
        let t = -origin.z / direction.z;
        if t < 0.0 {
            return None;
        }
        let hit = origin + t * direction;
        self.local_to_window(Vec2::new(hit.x, hit.y))
    }

    fn local_to_window(&self, local: Vec2) -> Option<Vec2> {
        let window = Vec2::new(
            local.x * self.pixels_per_meter + 0.5 * self.width_px,
            0.5 * self.height_px - local.y * self.pixels_per_meter,
        );
        let in_bounds = window.x >= 0.0
            && window.x <= self.width_px
            && window.y >= 0.0
            && window.y <= self.height_px;
        in_bounds.then_some(window)
    }
}
