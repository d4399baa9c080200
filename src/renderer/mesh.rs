//! Procedural geometry for the shapes a layer can instance.
//!
//! Conventions: meshes are centered on the origin, indexed with `u16`, and
//! counter-clockwise when seen from outside. Cones point up the Y axis and
//! tori lie in the XY plane.

use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::entity::Shape;

#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.normalize_or_zero().to_array(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl Mesh {
    pub fn from_shape(shape: Shape) -> Self {
        match shape {
            Shape::Sphere { radius, segments } => Self::sphere(radius, segments, segments),
            Shape::Cuboid { size } => Self::cuboid(size),
            Shape::Cone {
                radius,
                height,
                segments,
            } => Self::cone(radius, height, segments),
            Shape::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => Self::torus(radius, tube, radial_segments, tubular_segments),
        }
    }

    fn next_index(&self) -> u16 {
        self.vertices.len() as u16
    }

    /// UV sphere. The seam and pole rows duplicate vertices so normals stay per-vertex.
    pub fn sphere(radius: f32, width_segments: u16, height_segments: u16) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let mut mesh = Self::default();

        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let normal = Vec3::new(
                    -(u * TAU).cos() * (v * PI).sin(),
                    (v * PI).cos(),
                    (u * TAU).sin() * (v * PI).sin(),
                );
                mesh.vertices.push(Vertex::new(normal * radius, normal));
            }
        }

        let row = width_segments + 1;
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                if iy != 0 {
                    mesh.indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments - 1 {
                    mesh.indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        mesh
    }

    /// Axis-aligned cube with flat-shaded faces.
    pub fn cuboid(size: f32) -> Self {
        let half = size * 0.5;
        let mut mesh = Self::default();

        // Each face as (normal, u, v) with u × v = normal.
        let faces = [
            (Vec3::X, -Vec3::Z, Vec3::Y),
            (-Vec3::X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, -Vec3::Z),
            (-Vec3::Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (-Vec3::Z, -Vec3::X, Vec3::Y),
        ];

        for (normal, u, v) in faces {
            let base = mesh.next_index();
            let center = normal * half;
            for (su, sv) in [(-1., -1.), (1., -1.), (1., 1.), (-1., 1.)] {
                mesh.vertices
                    .push(Vertex::new(center + (u * su + v * sv) * half, normal));
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        mesh
    }

    /// Cone with its apex at `+height / 2` and a capped base at `-height / 2`.
    pub fn cone(radius: f32, height: f32, segments: u16) -> Self {
        let segments = segments.max(3);
        let half = height * 0.5;
        let mut mesh = Self::default();

        let around = |i: u16| {
            let theta = i as f32 / segments as f32 * TAU;
            (theta.sin(), theta.cos())
        };
        let slant_normal =
            |(sin, cos): (f32, f32)| Vec3::new(sin * height, radius, cos * height);

        // Side: one apex vertex per segment so each carries its own normal.
        for i in 0..segments {
            let base = mesh.next_index();
            let (s0, c0) = around(i);
            let (s1, c1) = around(i + 1);
            let mid = (i as f32 + 0.5) / segments as f32 * TAU;
            let mid = (mid.sin(), mid.cos());
            mesh.vertices
                .push(Vertex::new(Vec3::new(0., half, 0.), slant_normal(mid)));
            mesh.vertices.push(Vertex::new(
                Vec3::new(s0 * radius, -half, c0 * radius),
                slant_normal((s0, c0)),
            ));
            mesh.vertices.push(Vertex::new(
                Vec3::new(s1 * radius, -half, c1 * radius),
                slant_normal((s1, c1)),
            ));
            mesh.indices.extend_from_slice(&[base, base + 1, base + 2]);
        }

        // Base cap.
        let center = mesh.next_index();
        mesh.vertices
            .push(Vertex::new(Vec3::new(0., -half, 0.), -Vec3::Y));
        for i in 0..=segments {
            let (s, c) = around(i);
            mesh.vertices.push(Vertex::new(
                Vec3::new(s * radius, -half, c * radius),
                -Vec3::Y,
            ));
        }
        for i in 0..segments {
            let ring = center + 1 + i;
            mesh.indices.extend_from_slice(&[center, ring + 1, ring]);
        }

        mesh
    }

    /// Torus around the Z axis: `radius` to the tube center, `tube` thickness.
    pub fn torus(radius: f32, tube: f32, radial_segments: u16, tubular_segments: u16) -> Self {
        let radial_segments = radial_segments.max(3);
        let tubular_segments = tubular_segments.max(3);
        let mut mesh = Self::default();

        for j in 0..=radial_segments {
            let v = j as f32 / radial_segments as f32 * TAU;
            for i in 0..=tubular_segments {
                let u = i as f32 / tubular_segments as f32 * TAU;
                let position = Vec3::new(
                    (radius + tube * v.cos()) * u.cos(),
                    (radius + tube * v.cos()) * u.sin(),
                    tube * v.sin(),
                );
                let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.);
                mesh.vertices.push(Vertex::new(position, position - center));
            }
        }

        let row = tubular_segments + 1;
        for j in 1..=radial_segments {
            for i in 1..=tubular_segments {
                let a = row * j + i - 1;
                let b = row * (j - 1) + i - 1;
                let c = row * (j - 1) + i;
                let d = row * j + i;
                mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        mesh
    }
}
