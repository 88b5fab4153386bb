//! Greedy graph coloring for conflict-free constraint batches.
//!
//! Two constraints conflict when they share a particle; constraints
//! with the same color never do, so every batch can be evaluated
//! jointly and its corrections applied without races. Greedy coloring
//! over the particle-adjacency graph is not optimal but is fast and in
//! practice lands within one or two colors of optimal for the meshes
//! ropes and cloth produce.

use std::collections::HashMap;

/// Builds the constraint-conflict graph and assigns colors.
#[derive(Debug, Default)]
pub struct ConstraintBatcher {
    /// Particle indices per constraint, flattened.
    particles: Vec<u32>,
    /// Offsets into `particles`; constraint `i` owns
    /// `particles[offsets[i]..offsets[i + 1]]`.
    offsets: Vec<usize>,
    /// Constraint indices touching each particle.
    users: HashMap<u32, Vec<u32>>,
}

impl ConstraintBatcher {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            offsets: vec![0],
            users: HashMap::new(),
        }
    }

    /// Number of constraints added so far.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registers a constraint over the given particle slots and
    /// returns its index.
    pub fn add_constraint(&mut self, particles: &[u32]) -> u32 {
        let index = self.len() as u32;
        for &p in particles {
            self.users.entry(p).or_default().push(index);
        }
        self.particles.extend_from_slice(particles);
        self.offsets.push(self.particles.len());
        index
    }

    fn constraint_particles(&self, i: usize) -> &[u32] {
        &self.particles[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Assigns a color to every constraint such that no two
    /// constraints of the same color share a particle.
    ///
    /// The first 64 colors are tracked in a bitmask; a linear fallback
    /// handles pathological cases with more than 64 conflicting
    /// neighbors (a particle shared by 65+ constraints).
    pub fn colorize(&self) -> Vec<u32> {
        const UNCOLORED: u32 = u32::MAX;
        let n = self.len();
        let mut colors = vec![UNCOLORED; n];
        let mut overflow: Vec<u32> = Vec::new();

        for i in 0..n {
            let mut used: u64 = 0;
            overflow.clear();

            for &p in self.constraint_particles(i) {
                if let Some(neighbors) = self.users.get(&p) {
                    for &j in neighbors {
                        let c = colors[j as usize];
                        if c == UNCOLORED {
                            continue;
                        }
                        if c < 64 {
                            used |= 1 << c;
                        } else {
                            overflow.push(c);
                        }
                    }
                }
            }

            let mut color = (!used).trailing_zeros();
            if color >= 64 {
                overflow.sort_unstable();
                overflow.dedup();
                color = 64;
                for &c in &overflow {
                    if c == color {
                        color += 1;
                    } else if c > color {
                        break;
                    }
                }
            }
            colors[i] = color;
        }
        colors
    }

    /// Groups constraint indices by color. Returns one `Vec` of
    /// constraint indices per color, ordered by ascending color.
    pub fn partition(&self) -> Vec<Vec<u32>> {
        let colors = self.colorize();
        let batch_count = colors.iter().map(|&c| c + 1).max().unwrap_or(0) as usize;
        let mut batches: Vec<Vec<u32>> = vec![Vec::new(); batch_count];
        for (i, &c) in colors.iter().enumerate() {
            batches[c as usize].push(i as u32);
        }
        batches
    }
}
