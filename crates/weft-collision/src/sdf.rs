//! Signed distance field sampling.
//!
//! A distance field is a flat octree of cubic nodes. Each node stores
//! the exact signed distance at its eight corners; leaves answer
//! queries by trilinear interpolation, which also yields an analytic
//! gradient. Interior nodes store the index of their first child;
//! the eight children are contiguous, ordered by octant bits
//! (bit 0 = +x, bit 1 = +y, bit 2 = +z).

use serde::{Deserialize, Serialize};
use weft_math::{Vec3, Vec4};

/// One octree node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DfNode {
    /// Cube center in xyz, full edge length in w.
    pub center_xyz_size: Vec4,
    /// Signed distances at the eight corners, octant-bit order.
    pub distances: [f32; 8],
    /// Index of the first of eight contiguous children; -1 for a leaf.
    pub children: i32,
}

impl DfNode {
    /// Corner position `k` (octant-bit order).
    pub fn corner(&self, k: usize) -> Vec3 {
        let center = self.center_xyz_size.truncate();
        let half = self.center_xyz_size.w * 0.5;
        center
            + Vec3::new(
                if k & 1 != 0 { half } else { -half },
                if k & 2 != 0 { half } else { -half },
                if k & 4 != 0 { half } else { -half },
            )
    }
}

/// An immutable, sampled signed distance field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceField {
    /// Node 0 is the root.
    pub nodes: Vec<DfNode>,
}

impl DistanceField {
    /// Side length of the root cube.
    pub fn extent(&self) -> f32 {
        self.nodes.first().map_or(0.0, |n| n.center_xyz_size.w)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Signed distance and (unnormalized) gradient at `point`.
    ///
    /// Points outside the root cube are clamped onto it and the
    /// euclidean distance to the clamped point is added, so far-away
    /// queries still return a usable conservative distance.
    pub fn sample(&self, point: Vec3) -> (f32, Vec3) {
        let Some(root) = self.nodes.first() else {
            return (f32::MAX, Vec3::ZERO);
        };

        let center = root.center_xyz_size.truncate();
        let half = root.center_xyz_size.w * 0.5;
        let min = center - Vec3::splat(half);
        let max = center + Vec3::splat(half);
        let clamped = point.clamp(min, max);
        let outside = point - clamped;

        // Descend into the leaf containing the (clamped) point.
        let mut index = 0usize;
        loop {
            let node = &self.nodes[index];
            if node.children < 0 {
                break;
            }
            let c = node.center_xyz_size.truncate();
            let mut octant = 0usize;
            if clamped.x > c.x {
                octant |= 1;
            }
            if clamped.y > c.y {
                octant |= 2;
            }
            if clamped.z > c.z {
                octant |= 4;
            }
            index = node.children as usize + octant;
        }

        let node = &self.nodes[index];
        let size = node.center_xyz_size.w;
        let node_min = node.center_xyz_size.truncate() - Vec3::splat(size * 0.5);
        let t = ((clamped - node_min) / size).clamp(Vec3::ZERO, Vec3::ONE);
        let d = &node.distances;

        // Trilinear value.
        let c00 = d[0] + (d[1] - d[0]) * t.x;
        let c10 = d[2] + (d[3] - d[2]) * t.x;
        let c01 = d[4] + (d[5] - d[4]) * t.x;
        let c11 = d[6] + (d[7] - d[6]) * t.x;
        let c0 = c00 + (c10 - c00) * t.y;
        let c1 = c01 + (c11 - c01) * t.y;
        let value = c0 + (c1 - c0) * t.z;

        // Analytic gradient of the trilinear form.
        let gx = ((d[1] - d[0]) * (1.0 - t.y) + (d[3] - d[2]) * t.y) * (1.0 - t.z)
            + ((d[5] - d[4]) * (1.0 - t.y) + (d[7] - d[6]) * t.y) * t.z;
        let gy = (c10 - c00) * (1.0 - t.z) + (c11 - c01) * t.z;
        let gz = c1 - c0;
        let gradient = Vec3::new(gx, gy, gz) / size;

        let outside_len = outside.length();
        if outside_len > 0.0 {
            (value + outside_len, outside / outside_len)
        } else {
            (value, gradient)
        }
    }
}
