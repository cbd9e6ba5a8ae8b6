//! Brush library: reusable shape templates for scene authoring.
//!
//! A brush bundles a CPU-built primitive geometry with the physical
//! properties instances of it get stamped into the scene with. Building a
//! geometry is pure math on its descriptor, so the library builds all
//! brushes in parallel.
//!
//! All primitives use a +Y-up axis; radial shapes are centered on the
//! local origin.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rayon::prelude::*;

use crate::physics::RigidBodyDescriptor;
use crate::scene::GeometryId;

/// Primitive shape of a brush, with its generation parameters.
#[derive(Clone, Debug)]
pub enum BrushShape {
    Box {
        size: Vec3,
    },
    Sphere {
        radius: f32,
        slices: u32,
        stacks: u32,
    },
    Cylinder {
        radius: f32,
        height: f32,
        slices: u32,
    },
    Cone {
        radius: f32,
        height: f32,
        slices: u32,
    },
    Torus {
        major_radius: f32,
        minor_radius: f32,
        major_steps: u32,
        minor_steps: u32,
    },
}

impl BrushShape {
    /// Enclosed volume, used to derive instance mass from density.
    #[must_use]
    pub fn volume(&self) -> f32 {
        match *self {
            BrushShape::Box { size } => size.x * size.y * size.z,
            BrushShape::Sphere { radius, .. } => (4.0 / 3.0) * PI * radius.powi(3),
            BrushShape::Cylinder { radius, height, .. } => PI * radius * radius * height,
            BrushShape::Cone { radius, height, .. } => PI * radius * radius * height / 3.0,
            BrushShape::Torus {
                major_radius,
                minor_radius,
                ..
            } => TAU * PI * major_radius * minor_radius * minor_radius,
        }
    }
}

/// Everything needed to build one brush.
#[derive(Clone, Debug)]
pub struct BrushDescriptor {
    pub name: String,
    pub shape: BrushShape,
    /// Mass per unit volume for stamped instances.
    pub density: f32,
}

impl BrushDescriptor {
    #[must_use]
    pub fn new(name: &str, shape: BrushShape) -> Self {
        Self {
            name: name.to_owned(),
            shape,
            density: 1.0,
        }
    }

    #[must_use]
    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }
}

/// Indexed triangle mesh with per-vertex normals.
#[derive(Debug, Default)]
pub struct BrushGeometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl BrushGeometry {
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Radius of the bounding sphere around the local origin.
    #[must_use]
    pub fn bounding_radius(&self) -> f32 {
        self.positions
            .iter()
            .map(|p| p.length())
            .fold(0.0, f32::max)
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = u32::try_from(self.positions.len()).unwrap_or(u32::MAX);
        self.positions.push(position);
        self.normals.push(normal);
        index
    }

    fn push_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.indices.extend_from_slice(&[a, b, c, a, c, d]);
    }
}

/// A built brush, ready to be stamped into a scene.
#[derive(Debug)]
pub struct Brush {
    pub descriptor: BrushDescriptor,
    pub geometry: BrushGeometry,
    pub geometry_id: GeometryId,
}

impl Brush {
    /// Rigid-body descriptor for one instance of this brush; mass comes
    /// from the shape's volume and the brush density.
    #[must_use]
    pub fn rigid_body_descriptor(&self) -> RigidBodyDescriptor {
        let mass = self.descriptor.density * self.descriptor.shape.volume();
        RigidBodyDescriptor::new(mass, &self.descriptor.name)
    }
}

/// All brushes known to the editor, built once at startup.
#[derive(Debug, Default)]
pub struct BrushLibrary {
    brushes: Vec<Brush>,
}

impl BrushLibrary {
    /// Builds every descriptor's geometry on the rayon pool.
    #[must_use]
    pub fn build_parallel(descriptors: Vec<BrushDescriptor>) -> Self {
        let brushes = descriptors
            .into_par_iter()
            .enumerate()
            .map(|(i, descriptor)| {
                let geometry = build_geometry(&descriptor.shape);
                log::debug!(
                    "built brush '{}': {} triangles",
                    descriptor.name,
                    geometry.triangle_count()
                );
                Brush {
                    descriptor,
                    geometry,
                    geometry_id: GeometryId(u32::try_from(i).unwrap_or(u32::MAX)),
                }
            })
            .collect();
        Self { brushes }
    }

    #[must_use]
    pub fn brushes(&self) -> &[Brush] {
        &self.brushes
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Brush> {
        self.brushes.iter().find(|b| b.descriptor.name == name)
    }
}

fn build_geometry(shape: &BrushShape) -> BrushGeometry {
    match *shape {
        BrushShape::Box { size } => build_box(size),
        BrushShape::Sphere {
            radius,
            slices,
            stacks,
        } => build_sphere(radius, slices.max(3), stacks.max(2)),
        BrushShape::Cylinder {
            radius,
            height,
            slices,
        } => build_cylinder(radius, height, slices.max(3)),
        BrushShape::Cone {
            radius,
            height,
            slices,
        } => build_cone(radius, height, slices.max(3)),
        BrushShape::Torus {
            major_radius,
            minor_radius,
            major_steps,
            minor_steps,
        } => build_torus(
            major_radius,
            minor_radius,
            major_steps.max(3),
            minor_steps.max(3),
        ),
    }
}

fn build_box(size: Vec3) -> BrushGeometry {
    let h = size * 0.5;
    let mut g = BrushGeometry::default();

    // (normal, two in-plane tangents)
    let faces = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];
    for (normal, u, v) in faces {
        let center = normal * (normal.abs() * h).length();
        let eu = u * (u.abs() * h).length();
        let ev = v * (v.abs() * h).length();
        let a = g.push_vertex(center - eu - ev, normal);
        let b = g.push_vertex(center + eu - ev, normal);
        let c = g.push_vertex(center + eu + ev, normal);
        let d = g.push_vertex(center - eu + ev, normal);
        g.push_quad(a, b, c, d);
    }
    g
}

fn build_sphere(radius: f32, slices: u32, stacks: u32) -> BrushGeometry {
    let mut g = BrushGeometry::default();

    for stack in 0..=stacks {
        let phi = PI * stack as f32 / stacks as f32;
        let y = phi.cos();
        let ring = phi.sin();
        for slice in 0..=slices {
            let theta = TAU * slice as f32 / slices as f32;
            let normal = Vec3::new(ring * theta.cos(), y, ring * theta.sin());
            g.push_vertex(normal * radius, normal);
        }
    }

    let ring_stride = slices + 1;
    for stack in 0..stacks {
        for slice in 0..slices {
            let a = stack * ring_stride + slice;
            let b = a + ring_stride;
            g.push_quad(a, b, b + 1, a + 1);
        }
    }
    g
}

fn build_cylinder(radius: f32, height: f32, slices: u32) -> BrushGeometry {
    let mut g = BrushGeometry::default();
    let half = height * 0.5;

    // Side
    for slice in 0..=slices {
        let theta = TAU * slice as f32 / slices as f32;
        let normal = Vec3::new(theta.cos(), 0.0, theta.sin());
        let radial = normal * radius;
        g.push_vertex(radial + Vec3::Y * half, normal);
        g.push_vertex(radial - Vec3::Y * half, normal);
    }
    for slice in 0..slices {
        let a = slice * 2;
        g.push_quad(a, a + 2, a + 3, a + 1);
    }

    // Caps
    for (y, normal) in [(half, Vec3::Y), (-half, Vec3::NEG_Y)] {
        let center = g.push_vertex(Vec3::Y * y, normal);
        let first = g.positions.len() as u32;
        for slice in 0..=slices {
            let theta = TAU * slice as f32 / slices as f32;
            let p = Vec3::new(radius * theta.cos(), y, radius * theta.sin());
            g.push_vertex(p, normal);
        }
        for slice in 0..slices {
            let (b, c) = if normal.y > 0.0 {
                (first + slice + 1, first + slice)
            } else {
                (first + slice, first + slice + 1)
            };
            g.indices.extend_from_slice(&[center, b, c]);
        }
    }
    g
}

fn build_cone(radius: f32, height: f32, slices: u32) -> BrushGeometry {
    let mut g = BrushGeometry::default();
    let apex = Vec3::new(0.0, height, 0.0);

    // Side; one apex vertex per slice keeps per-face normals sensible.
    for slice in 0..slices {
        let t0 = TAU * slice as f32 / slices as f32;
        let t1 = TAU * (slice + 1) as f32 / slices as f32;
        let tm = 0.5 * (t0 + t1);

        let n0 = Vec3::new(height * t0.cos(), radius, height * t0.sin()).normalize();
        let n1 = Vec3::new(height * t1.cos(), radius, height * t1.sin()).normalize();
        let nm = Vec3::new(height * tm.cos(), radius, height * tm.sin()).normalize();

        let a = g.push_vertex(Vec3::new(radius * t0.cos(), 0.0, radius * t0.sin()), n0);
        let b = g.push_vertex(Vec3::new(radius * t1.cos(), 0.0, radius * t1.sin()), n1);
        let top = g.push_vertex(apex, nm);
        g.indices.extend_from_slice(&[a, top, b]);
    }

    // Base cap
    let center = g.push_vertex(Vec3::ZERO, Vec3::NEG_Y);
    let first = g.positions.len() as u32;
    for slice in 0..=slices {
        let theta = TAU * slice as f32 / slices as f32;
        let p = Vec3::new(radius * theta.cos(), 0.0, radius * theta.sin());
        g.push_vertex(p, Vec3::NEG_Y);
    }
    for slice in 0..slices {
        g.indices
            .extend_from_slice(&[center, first + slice, first + slice + 1]);
    }
    g
}

fn build_torus(
    major_radius: f32,
    minor_radius: f32,
    major_steps: u32,
    minor_steps: u32,
) -> BrushGeometry {
    let mut g = BrushGeometry::default();

    for major in 0..=major_steps {
        let u = TAU * major as f32 / major_steps as f32;
        let ring_center = Vec3::new(major_radius * u.cos(), 0.0, major_radius * u.sin());
        let ring_out = Vec3::new(u.cos(), 0.0, u.sin());
        for minor in 0..=minor_steps {
            let v = TAU * minor as f32 / minor_steps as f32;
            let normal = ring_out * v.cos() + Vec3::Y * v.sin();
            g.push_vertex(ring_center + normal * minor_radius, normal);
        }
    }

    let ring_stride = minor_steps + 1;
    for major in 0..major_steps {
        for minor in 0..minor_steps {
            let a = major * ring_stride + minor;
            let b = a + ring_stride;
            g.push_quad(a, a + 1, b + 1, b);
        }
    }
    g
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_geometry_has_six_faces() {
        let g = build_box(Vec3::splat(2.0));
        assert_eq!(g.positions.len(), 24);
        assert_eq!(g.triangle_count(), 12);
        assert!((g.bounding_radius() - Vec3::splat(1.0).length()).abs() < 1e-5);
    }

    #[test]
    fn sphere_vertices_lie_on_the_sphere() {
        let g = build_sphere(3.0, 16, 8);
        for p in &g.positions {
            assert!((p.length() - 3.0).abs() < 1e-4);
        }
    }

    #[test]
    fn library_builds_all_brushes_and_finds_by_name() {
        let library = BrushLibrary::build_parallel(vec![
            BrushDescriptor::new(
                "box",
                BrushShape::Box {
                    size: Vec3::splat(1.0),
                },
            ),
            BrushDescriptor::new(
                "ball",
                BrushShape::Sphere {
                    radius: 0.5,
                    slices: 12,
                    stacks: 6,
                },
            )
            .with_density(2.0),
        ]);

        assert_eq!(library.brushes().len(), 2);
        let ball = library.find("ball").unwrap();
        assert!(ball.geometry.triangle_count() > 0);

        let expected_mass = 2.0 * (4.0 / 3.0) * PI * 0.5_f32.powi(3);
        let descriptor = ball.rigid_body_descriptor();
        assert!((descriptor.mass - expected_mass).abs() < 1e-4);
    }

    #[test]
    fn torus_volume_matches_closed_form() {
        let shape = BrushShape::Torus {
            major_radius: 2.0,
            minor_radius: 0.5,
            major_steps: 8,
            minor_steps: 6,
        };
        assert!((shape.volume() - TAU * PI * 2.0 * 0.25).abs() < 1e-4);
    }
}
