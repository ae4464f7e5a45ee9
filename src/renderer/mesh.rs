//! Tessellation of scene primitives into triangle lists
//!
//! Conventions match the scene description: spheres measure polar angle from
//! +Y, cylinders run along Y, tori lie in the XZ plane, and flat shapes lie in
//! the XY plane facing +Z (rotate them to lay them down).

use glam::{Mat3, Mat4, Vec3};
use std::f32::consts::{PI, TAU};

use super::vertex::Vertex;
use crate::scene::{FramePose, Primitive, SceneDescription, Side};
use crate::settings::QualityPreset;

/// Parts smaller than this use the coarse segment count
const SMALL_PART_RADIUS: f32 = 0.2;

/// Triangle list for one frame, split by blending mode
#[derive(Debug, Clone, Default)]
pub struct FrameMesh {
    pub opaque: Vec<Vertex>,
    /// Drawn after `opaque`, in part order
    pub transparent: Vec<Vertex>,
}

impl FrameMesh {
    pub fn vertex_count(&self) -> usize {
        self.opaque.len() + self.transparent.len()
    }
}

/// Largest extent of a primitive, used to pick tessellation detail
fn bounding_radius(primitive: &Primitive) -> f32 {
    match *primitive {
        Primitive::Sphere { radius } | Primitive::SphereSegment { radius, .. } => radius,
        Primitive::Cylinder {
            radius_top,
            radius_bottom,
            ..
        } => radius_top.max(radius_bottom),
        Primitive::Torus { radius, tube } => radius + tube,
        Primitive::Cuboid { size } => size.max_element() * 0.5,
        Primitive::Disc { radius } => radius,
        Primitive::Annulus { outer, .. } => outer,
        Primitive::Plane { width, height } => width.max(height) * 0.5,
    }
}

/// Radial segment count for a primitive at the given quality
pub fn segments_for(primitive: &Primitive, quality: QualityPreset) -> u32 {
    if bounding_radius(primitive) < SMALL_PART_RADIUS {
        quality.detail_segments()
    } else {
        quality.segments()
    }
}

/// Push a quad (a, b, c, d counter-clockwise) as two triangles
fn quad(out: &mut Vec<Vertex>, corners: [(Vec3, Vec3); 4], color: [f32; 4]) {
    let [a, b, c, d] = corners;
    for (p, n) in [a, b, c, c, d, a] {
        out.push(Vertex::new(p.to_array(), n.to_array(), color));
    }
}

/// Sphere band between polar angles `theta_start` and `theta_start + theta_length`
pub fn sphere_segment(
    radius: f32,
    theta_start: f32,
    theta_length: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let segments = segments.max(3);
    let rings = ((segments as f32 * 0.5 * theta_length / PI).ceil() as u32).max(1);
    let mut vertices = Vec::with_capacity((segments * rings * 6) as usize);

    let point = |u: u32, v: u32| {
        let phi = u as f32 / segments as f32 * TAU;
        let theta = theta_start + v as f32 / rings as f32 * theta_length;
        let n = Vec3::new(-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin());
        (n * radius, n)
    };

    for v in 0..rings {
        for u in 0..segments {
            quad(
                &mut vertices,
                [point(u, v), point(u, v + 1), point(u + 1, v + 1), point(u + 1, v)],
                color,
            );
        }
    }

    vertices
}

/// Tapered, capped cylinder along Y
pub fn cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let segments = segments.max(3);
    let half = height * 0.5;
    let slope = (radius_bottom - radius_top) / height.max(f32::EPSILON);
    let mut vertices = Vec::with_capacity((segments * 12) as usize);

    for i in 0..segments {
        let a1 = i as f32 / segments as f32 * TAU;
        let a2 = (i + 1) as f32 / segments as f32 * TAU;
        let (s1, c1) = a1.sin_cos();
        let (s2, c2) = a2.sin_cos();

        let n1 = Vec3::new(s1, slope, c1).normalize();
        let n2 = Vec3::new(s2, slope, c2).normalize();
        quad(
            &mut vertices,
            [
                (Vec3::new(radius_top * s1, half, radius_top * c1), n1),
                (Vec3::new(radius_bottom * s1, -half, radius_bottom * c1), n1),
                (Vec3::new(radius_bottom * s2, -half, radius_bottom * c2), n2),
                (Vec3::new(radius_top * s2, half, radius_top * c2), n2),
            ],
            color,
        );

        // Caps
        for (y, r, n) in [(half, radius_top, Vec3::Y), (-half, radius_bottom, Vec3::NEG_Y)] {
            if r <= 0.0 {
                continue;
            }
            let center = Vec3::new(0.0, y, 0.0);
            let p1 = Vec3::new(r * s1, y, r * c1);
            let p2 = Vec3::new(r * s2, y, r * c2);
            let (p1, p2) = if n.y > 0.0 { (p1, p2) } else { (p2, p1) };
            for p in [center, p1, p2] {
                vertices.push(Vertex::new(p.to_array(), n.to_array(), color));
            }
        }
    }

    vertices
}

/// Torus around the Y axis, lying in the XZ plane
pub fn torus(radius: f32, tube: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let tubular = segments.max(3) * 2;
    let radial = (segments / 4).max(4);
    let mut vertices = Vec::with_capacity((tubular * radial * 6) as usize);

    let point = |u: u32, v: u32| {
        let around = u as f32 / tubular as f32 * TAU;
        let across = v as f32 / radial as f32 * TAU;
        let ring_dir = Vec3::new(around.cos(), 0.0, around.sin());
        let n = ring_dir * across.cos() + Vec3::Y * across.sin();
        (ring_dir * radius + n * tube, n)
    };

    for u in 0..tubular {
        for v in 0..radial {
            quad(
                &mut vertices,
                [point(u, v), point(u, v + 1), point(u + 1, v + 1), point(u + 1, v)],
                color,
            );
        }
    }

    vertices
}

/// Axis-aligned box centered at the origin
pub fn cuboid(size: Vec3, color: [f32; 4]) -> Vec<Vertex> {
    let h = size * 0.5;
    let mut vertices = Vec::with_capacity(36);

    for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
        for sign in [1.0, -1.0] {
            let n = axis * sign;
            // Two tangents spanning the face, ordered so the winding faces `n`
            let (t1, t2) = if axis == Vec3::Y {
                (Vec3::Z, Vec3::X)
            } else {
                (Vec3::Y, axis.cross(Vec3::Y))
            };
            let (t1, t2) = if sign > 0.0 { (t1, t2) } else { (t2, t1) };
            let c = n * h;
            let e1 = t1 * h;
            let e2 = t2 * h;
            quad(
                &mut vertices,
                [(c - e1 - e2, n), (c + e1 - e2, n), (c + e1 + e2, n), (c - e1 + e2, n)],
                color,
            );
        }
    }

    vertices
}

/// Flat ring (or disc when `inner` is zero) facing +Z
pub fn annulus(inner: f32, outer: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let segments = segments.max(3);
    let n = Vec3::Z;
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let a1 = i as f32 / segments as f32 * TAU;
        let a2 = (i + 1) as f32 / segments as f32 * TAU;
        let dir1 = Vec3::new(a1.cos(), a1.sin(), 0.0);
        let dir2 = Vec3::new(a2.cos(), a2.sin(), 0.0);

        if inner <= 0.0 {
            for p in [Vec3::ZERO, dir1 * outer, dir2 * outer] {
                vertices.push(Vertex::new(p.to_array(), n.to_array(), color));
            }
        } else {
            quad(
                &mut vertices,
                [(dir1 * inner, n), (dir1 * outer, n), (dir2 * outer, n), (dir2 * inner, n)],
                color,
            );
        }
    }

    vertices
}

/// Rectangle facing +Z
pub fn plane(width: f32, height: f32, color: [f32; 4]) -> Vec<Vertex> {
    let (w, h) = (width * 0.5, height * 0.5);
    let n = Vec3::Z;
    let mut vertices = Vec::with_capacity(6);
    quad(
        &mut vertices,
        [
            (Vec3::new(-w, -h, 0.0), n),
            (Vec3::new(w, -h, 0.0), n),
            (Vec3::new(w, h, 0.0), n),
            (Vec3::new(-w, h, 0.0), n),
        ],
        color,
    );
    vertices
}

/// Triangle list for one primitive in its local frame
pub fn tessellate(primitive: &Primitive, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    match *primitive {
        Primitive::Sphere { radius } => sphere_segment(radius, 0.0, PI, color, segments),
        Primitive::SphereSegment {
            radius,
            theta_start,
            theta_length,
        } => sphere_segment(radius, theta_start, theta_length, color, segments),
        Primitive::Cylinder {
            radius_top,
            radius_bottom,
            height,
        } => cylinder(radius_top, radius_bottom, height, color, segments),
        Primitive::Torus { radius, tube } => torus(radius, tube, color, segments),
        Primitive::Cuboid { size } => cuboid(size, color),
        Primitive::Disc { radius } => annulus(0.0, radius, color, segments),
        Primitive::Annulus { inner, outer } => annulus(inner, outer, color, segments),
        Primitive::Plane { width, height } => plane(width, height, color),
    }
}

/// Reverse winding and normals so the inside faces outward
fn flip_faces(vertices: &mut [Vertex]) {
    for tri in vertices.chunks_exact_mut(3) {
        tri.swap(1, 2);
        for v in tri.iter_mut() {
            v.normal = (-Vec3::from_array(v.normal)).to_array();
        }
    }
}

/// Apply material sidedness to a front-facing triangle list
pub fn apply_side(mut vertices: Vec<Vertex>, side: Side) -> Vec<Vertex> {
    match side {
        Side::Front => vertices,
        Side::Back => {
            flip_faces(&mut vertices);
            vertices
        }
        Side::Double => {
            let mut back = vertices.clone();
            flip_faces(&mut back);
            vertices.extend(back);
            vertices
        }
    }
}

fn transform_vertices(vertices: &mut [Vertex], world: &Mat4) {
    let normal_matrix = Mat3::from_mat4(*world).inverse().transpose();
    for v in vertices {
        v.position = world.transform_point3(Vec3::from_array(v.position)).to_array();
        v.normal = (normal_matrix * Vec3::from_array(v.normal))
            .normalize_or_zero()
            .to_array();
    }
}

/// World-space triangles for every visible part of `scene` on this frame
pub fn build_frame_mesh(scene: &SceneDescription, pose: &FramePose, quality: QualityPreset) -> FrameMesh {
    let mut mesh = FrameMesh::default();

    for posed in scene.posed(pose) {
        let part = posed.part;
        let color = part.material.rgba(1.0);
        let color = [color[0], color[1], color[2], posed.opacity.clamp(0.0, 1.0)];
        let segments = segments_for(&part.primitive, quality);

        let mut vertices = apply_side(tessellate(&part.primitive, color, segments), part.material.side);
        transform_vertices(&mut vertices, &posed.world);

        if posed.opacity < 1.0 {
            mesh.transparent.extend(vertices);
        } else {
            mesh.opaque.extend(vertices);
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::compose;
    use crate::sim::kinematics::HalvesTransform;

    const WHITE: [f32; 4] = [1.0; 4];

    fn positions(vertices: &[Vertex]) -> impl Iterator<Item = Vec3> + '_ {
        vertices.iter().map(|v| Vec3::from_array(v.position))
    }

    #[test]
    fn test_sphere_on_surface() {
        let vertices = sphere_segment(1.3, 0.0, PI, WHITE, 16);
        assert_eq!(vertices.len() % 3, 0);
        for p in positions(&vertices) {
            assert!((p.length() - 1.3).abs() < 1e-4);
        }
    }

    #[test]
    fn test_hemispheres_split_at_equator() {
        let top = sphere_segment(1.0, 0.0, PI / 2.0, WHITE, 16);
        let bottom = sphere_segment(1.0, PI / 2.0, PI / 2.0, WHITE, 16);
        assert!(positions(&top).all(|p| p.y >= -1e-5));
        assert!(positions(&bottom).all(|p| p.y <= 1e-5));
    }

    #[test]
    fn test_cylinder_extent() {
        let vertices = cylinder(0.4, 0.3, 0.7, WHITE, 12);
        for p in positions(&vertices) {
            assert!(p.y.abs() <= 0.35 + 1e-6);
            assert!(Vec3::new(p.x, 0.0, p.z).length() <= 0.4 + 1e-5);
        }
    }

    #[test]
    fn test_cuboid_faces_point_outward() {
        let vertices = cuboid(Vec3::new(1.0, 2.0, 3.0), WHITE);
        assert_eq!(vertices.len(), 36);
        for tri in vertices.chunks_exact(3) {
            let [a, b, c] = [0, 1, 2].map(|i| Vec3::from_array(tri[i].position));
            let face = (b - a).cross(c - a);
            let n = Vec3::from_array(tri[0].normal);
            assert!(face.dot(n) > 0.0);
        }
    }

    #[test]
    fn test_torus_radius() {
        let vertices = torus(1.32, 0.02, WHITE, 16);
        for p in positions(&vertices) {
            let ring = Vec3::new(p.x, 0.0, p.z).length();
            assert!((ring - 1.32).abs() <= 0.02 + 1e-5);
        }
    }

    #[test]
    fn test_double_side_doubles() {
        let front = annulus(0.5, 0.6, WHITE, 8);
        let double = apply_side(front.clone(), Side::Double);
        assert_eq!(double.len(), front.len() * 2);
        let back = apply_side(front.clone(), Side::Back);
        assert_eq!(back[0].normal, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_frame_mesh_for_every_step() {
        for n in 1..=8 {
            let scene = compose(n).unwrap();
            let pose = FramePose {
                step: scene.step,
                time: 0.0,
                crack_onset: None,
                root: scene.root,
                water_stream: None,
                halves: HalvesTransform::IDENTITY,
                droplets: Vec::new(),
            };
            let mesh = build_frame_mesh(&scene, &pose, QualityPreset::Low);
            assert!(!mesh.opaque.is_empty());
            assert_eq!(mesh.vertex_count() % 3, 0);
            assert!(
                mesh.opaque
                    .iter()
                    .chain(&mesh.transparent)
                    .all(|v| v.position.iter().all(|c| c.is_finite()))
            );
        }
    }

    #[test]
    fn test_ground_is_flat() {
        let scene = compose(1).unwrap();
        let pose = FramePose {
            step: scene.step,
            time: 0.0,
            crack_onset: None,
            root: scene.root,
            water_stream: None,
            halves: HalvesTransform::IDENTITY,
            droplets: Vec::new(),
        };
        let ground_only = SceneDescription {
            parts: scene
                .parts
                .iter()
                .filter(|p| p.id.kind == crate::scene::PartKind::Ground)
                .cloned()
                .collect(),
            ..scene.clone()
        };
        let mesh = build_frame_mesh(&ground_only, &pose, QualityPreset::Low);
        for v in &mesh.opaque {
            assert!((v.position[1] + 2.5).abs() < 1e-5);
            assert!((v.normal[1] - 1.0).abs() < 1e-5);
        }
    }
}
