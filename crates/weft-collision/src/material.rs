//! Collision materials.
//!
//! Friction and restitution live in a table indexed by `MaterialId`,
//! so colliders share materials instead of carrying coefficients.
//! Contact generation combines the collider material with the
//! particle-side default.

use serde::{Deserialize, Serialize};
use weft_types::MaterialId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionMaterial {
    /// Coulomb friction coefficient.
    pub friction: f32,
    /// Bounce factor in [0, 1].
    pub restitution: f32,
}

impl Default for CollisionMaterial {
    fn default() -> Self {
        Self {
            friction: 0.3,
            restitution: 0.0,
        }
    }
}

/// How two materials mix at a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineMode {
    /// Arithmetic mean.
    Average,
    /// Geometric mean; zero on either side wins.
    Geometric,
    Minimum,
    Maximum,
}

#[derive(Debug, Clone, Default)]
pub struct MaterialTable {
    materials: Vec<CollisionMaterial>,
}

impl MaterialTable {
    /// Table with material 0 as the default.
    pub fn new() -> Self {
        Self {
            materials: vec![CollisionMaterial::default()],
        }
    }

    pub fn register(&mut self, material: CollisionMaterial) -> MaterialId {
        self.materials.push(material);
        MaterialId((self.materials.len() - 1) as u16)
    }

    /// Falls back to the default material for stale ids.
    pub fn get(&self, id: MaterialId) -> CollisionMaterial {
        self.materials.get(id.index()).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Mixes two materials. Friction uses `mode`; restitution always
    /// takes the maximum, so one bouncy side makes a bouncy contact.
    pub fn combine(a: CollisionMaterial, b: CollisionMaterial, mode: CombineMode) -> CollisionMaterial {
        let friction = match mode {
            CombineMode::Average => 0.5 * (a.friction + b.friction),
            CombineMode::Geometric => (a.friction * b.friction).sqrt(),
            CombineMode::Minimum => a.friction.min(b.friction),
            CombineMode::Maximum => a.friction.max(b.friction),
        };
        CollisionMaterial {
            friction,
            restitution: a.restitution.max(b.restitution),
        }
    }
}
