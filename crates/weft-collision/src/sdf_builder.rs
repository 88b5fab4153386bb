//! Signed distance field construction from triangle meshes.
//!
//! Brute-force exact point-mesh distance with sign from angle-weighted
//! pseudonormals, sampled over an adaptively subdivided octree: a node
//! splits while the trilinear interpolation error at its center
//! exceeds `max_error` and the depth budget allows. Builds can take a
//! while for dense meshes, so the builder reports progress and honors
//! cooperative cancellation.

use std::collections::{HashMap, VecDeque};

use tracing::debug;
use weft_math::Vec3;
use weft_types::error::{WeftError, WeftResult};

use crate::sdf::{DfNode, DistanceField};

#[derive(Debug, Clone, Copy)]
pub struct SdfBuildSettings {
    /// Maximum tolerated |exact - interpolated| at a node center.
    pub max_error: f32,
    /// Maximum octree depth; the root is depth 0.
    pub max_depth: u32,
    /// Padding added around the mesh bounds.
    pub margin: f32,
}

impl Default for SdfBuildSettings {
    fn default() -> Self {
        Self {
            max_error: 0.01,
            max_depth: 6,
            margin: 0.1,
        }
    }
}

/// Progress callback: receives a fraction in [0, 1]; returning `false`
/// cancels the build.
pub type ProgressFn<'a> = &'a mut dyn FnMut(f32) -> bool;

/// Builds a distance field from a triangle soup.
///
/// Returns [`WeftError::BuildCancelled`] if the progress callback
/// requests cancellation; partial output is discarded.
pub fn build(
    vertices: &[Vec3],
    triangles: &[[u32; 3]],
    settings: &SdfBuildSettings,
    mut progress: Option<ProgressFn<'_>>,
) -> WeftResult<DistanceField> {
    if vertices.is_empty() || triangles.is_empty() {
        return Err(WeftError::InvalidConfig("empty mesh for distance field".into()));
    }

    let mesh = MeshQuery::new(vertices, triangles);

    // Root cube: mesh bounds plus margin, cubified on the max extent.
    let (min, max) = bounds(vertices);
    let center = (min + max) * 0.5;
    let size = (max - min).max_element() + 2.0 * settings.margin;

    let mut nodes = vec![make_node(&mesh, center, size)];
    let mut depths = vec![0u32];
    let mut queue: VecDeque<usize> = VecDeque::from([0]);
    let mut processed = 0usize;
    let mut reported = 0.0f32;

    while let Some(index) = queue.pop_front() {
        processed += 1;
        if let Some(report) = progress.as_mut() {
            // Subdivision grows the queue, so the raw ratio can dip;
            // report the running maximum to keep progress monotone.
            let total = processed + queue.len();
            let fraction = (processed as f32 / total as f32).min(0.99);
            reported = reported.max(fraction);
            if !report(reported) {
                return Err(WeftError::BuildCancelled);
            }
        }

        let depth = depths[index];
        if depth >= settings.max_depth {
            continue;
        }

        let node = nodes[index];
        let node_center = node.center_xyz_size.truncate();
        let exact = mesh.signed_distance(node_center);
        // Trilinear at the center is the mean of the corners.
        let interpolated = node.distances.iter().sum::<f32>() / 8.0;
        if (exact - interpolated).abs() <= settings.max_error {
            continue;
        }

        let first_child = nodes.len();
        nodes[index].children = first_child as i32;
        let child_size = node.center_xyz_size.w * 0.5;
        let quarter = child_size * 0.5;
        for k in 0..8usize {
            let offset = Vec3::new(
                if k & 1 != 0 { quarter } else { -quarter },
                if k & 2 != 0 { quarter } else { -quarter },
                if k & 4 != 0 { quarter } else { -quarter },
            );
            nodes.push(make_node(&mesh, node_center + offset, child_size));
            depths.push(depth + 1);
            queue.push_back(first_child + k);
        }
    }

    if let Some(report) = progress.as_mut() {
        if !report(1.0) {
            return Err(WeftError::BuildCancelled);
        }
    }

    debug!(
        nodes = nodes.len(),
        extent = size,
        "distance field built"
    );
    Ok(DistanceField { nodes })
}

fn make_node(mesh: &MeshQuery<'_>, center: Vec3, size: f32) -> DfNode {
    let half = size * 0.5;
    let mut distances = [0.0f32; 8];
    for (k, d) in distances.iter_mut().enumerate() {
        let corner = center
            + Vec3::new(
                if k & 1 != 0 { half } else { -half },
                if k & 2 != 0 { half } else { -half },
                if k & 4 != 0 { half } else { -half },
            );
        *d = mesh.signed_distance(corner);
    }
    DfNode {
        center_xyz_size: center.extend(size),
        distances,
        children: -1,
    }
}

fn bounds(vertices: &[Vec3]) -> (Vec3, Vec3) {
    let mut min = Vec3::splat(f32::MAX);
    let mut max = Vec3::splat(f32::MIN);
    for v in vertices {
        min = min.min(*v);
        max = max.max(*v);
    }
    (min, max)
}

/// Exact signed distance queries against a triangle mesh.
///
/// Sign comes from angle-weighted pseudonormals: the face normal when
/// the closest feature is a face, the sum of adjacent face normals for
/// an edge, and the angle-weighted sum of incident face normals for a
/// vertex. Correct for closed, consistently wound meshes.
struct MeshQuery<'a> {
    vertices: &'a [Vec3],
    triangles: &'a [[u32; 3]],
    face_normals: Vec<Vec3>,
    vertex_normals: Vec<Vec3>,
    edge_normals: HashMap<(u32, u32), Vec3>,
}

impl<'a> MeshQuery<'a> {
    fn new(vertices: &'a [Vec3], triangles: &'a [[u32; 3]]) -> Self {
        let mut face_normals = Vec::with_capacity(triangles.len());
        let mut vertex_normals = vec![Vec3::ZERO; vertices.len()];
        let mut edge_normals: HashMap<(u32, u32), Vec3> = HashMap::new();

        for t in triangles {
            let [a, b, c] = [
                vertices[t[0] as usize],
                vertices[t[1] as usize],
                vertices[t[2] as usize],
            ];
            let n = (b - a).cross(c - a).normalize_or_zero();
            face_normals.push(n);

            for (i, &v) in t.iter().enumerate() {
                let prev = vertices[t[(i + 2) % 3] as usize];
                let next = vertices[t[(i + 1) % 3] as usize];
                let p = vertices[v as usize];
                let angle = (prev - p).angle_between(next - p);
                vertex_normals[v as usize] += n * angle;
            }
            for i in 0..3 {
                let e = edge_key(t[i], t[(i + 1) % 3]);
                *edge_normals.entry(e).or_insert(Vec3::ZERO) += n;
            }
        }

        Self {
            vertices,
            triangles,
            face_normals,
            vertex_normals,
            edge_normals,
        }
    }

    fn signed_distance(&self, p: Vec3) -> f32 {
        let mut best_dist_sq = f32::MAX;
        let mut best_closest = Vec3::ZERO;
        let mut best_normal = Vec3::ZERO;

        for (f, t) in self.triangles.iter().enumerate() {
            let a = self.vertices[t[0] as usize];
            let b = self.vertices[t[1] as usize];
            let c = self.vertices[t[2] as usize];
            let (closest, feature) = closest_point_on_triangle(p, a, b, c);
            let dist_sq = (p - closest).length_squared();
            if dist_sq < best_dist_sq {
                best_dist_sq = dist_sq;
                best_closest = closest;
                best_normal = match feature {
                    Feature::Face => self.face_normals[f],
                    Feature::Vertex(i) => self.vertex_normals[t[i] as usize],
                    Feature::Edge(i) => self.edge_normals[&edge_key(t[i], t[(i + 1) % 3])],
                };
            }
        }

        let dist = best_dist_sq.sqrt();
        if (p - best_closest).dot(best_normal) < 0.0 {
            -dist
        } else {
            dist
        }
    }
}

fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

enum Feature {
    Face,
    /// Local vertex index 0..3.
    Vertex(usize),
    /// Local edge index: i is the edge (v[i], v[i+1 mod 3]).
    Edge(usize),
}

/// Closest point on triangle `abc` to `p`, plus the feature it lies on.
fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> (Vec3, Feature) {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return (a, Feature::Vertex(0));
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return (b, Feature::Vertex(1));
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return (a + ab * v, Feature::Edge(0));
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return (c, Feature::Vertex(2));
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return (a + ac * w, Feature::Edge(2));
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (b + (c - b) * w, Feature::Edge(1));
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    (a + ab * v + ac * w, Feature::Face)
}
