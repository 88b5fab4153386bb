//! Reference-counted distance field cache.
//!
//! Several colliders usually share the mesh of one prop, so fields are
//! keyed by a content hash of the source mesh and reference counted.
//! `acquire` bumps the count for an existing field; `release` drops
//! the field once the last user is gone.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::debug;
use weft_math::Vec3;
use weft_types::error::WeftResult;

use crate::sdf::DistanceField;
use crate::sdf_builder::{self, ProgressFn, SdfBuildSettings};

/// Handle to a cached distance field; the content hash of its mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SdfHandle(pub u64);

struct Entry {
    field: Arc<DistanceField>,
    refs: u32,
}

#[derive(Default)]
pub struct SdfCache {
    entries: HashMap<u64, Entry>,
}

impl SdfCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content hash of a mesh; identical meshes share one field.
    pub fn content_hash(vertices: &[Vec3], triangles: &[[u32; 3]]) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        for v in vertices {
            v.x.to_bits().hash(&mut hasher);
            v.y.to_bits().hash(&mut hasher);
            v.z.to_bits().hash(&mut hasher);
        }
        triangles.hash(&mut hasher);
        hasher.finish()
    }

    /// Bumps the refcount of an already-cached field.
    pub fn acquire(&mut self, handle: SdfHandle) -> Option<SdfHandle> {
        let entry = self.entries.get_mut(&handle.0)?;
        entry.refs += 1;
        Some(handle)
    }

    /// Returns a handle for the mesh, building the field on first use.
    /// Cancelled builds leave the cache untouched.
    pub fn acquire_or_build(
        &mut self,
        vertices: &[Vec3],
        triangles: &[[u32; 3]],
        settings: &SdfBuildSettings,
        progress: Option<ProgressFn<'_>>,
    ) -> WeftResult<SdfHandle> {
        let hash = Self::content_hash(vertices, triangles);
        if let Some(entry) = self.entries.get_mut(&hash) {
            entry.refs += 1;
            return Ok(SdfHandle(hash));
        }

        let field = sdf_builder::build(vertices, triangles, settings, progress)?;
        debug!(hash, nodes = field.node_count(), "distance field cached");
        self.entries.insert(
            hash,
            Entry {
                field: Arc::new(field),
                refs: 1,
            },
        );
        Ok(SdfHandle(hash))
    }

    /// Drops one reference; the field is evicted when none remain.
    pub fn release(&mut self, handle: SdfHandle) {
        if let Some(entry) = self.entries.get_mut(&handle.0) {
            entry.refs -= 1;
            if entry.refs == 0 {
                self.entries.remove(&handle.0);
                debug!(hash = handle.0, "distance field evicted");
            }
        }
    }

    pub fn get(&self, handle: SdfHandle) -> Option<&Arc<DistanceField>> {
        self.entries.get(&handle.0).map(|e| &e.field)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
