//! Contact event dispatcher.
//!
//! Diffs this step's contact list against the previous step's to raise
//! enter/stay/exit events. Both lists are sorted by (collider, actor)
//! key and deduplicated, so the diff is a single O(n) zip-merge;
//! sorting dominates at O(n log n).

use weft_types::Contact;

use crate::events::{ContactEvent, ContactPhase};

/// Stored summary of a contact pair from the previous step.
///
/// Only the key and representative geometry survive across steps; the
/// full contact list is transient and regenerated every step.
#[derive(Debug, Clone, Copy)]
struct PairRecord {
    key: (u32, u32),
    point: [f32; 3],
    normal: [f32; 3],
}

/// Diffs per-step contact sets into enter/stay/exit events.
#[derive(Default)]
pub struct ContactDispatcher {
    /// Sorted, deduplicated pairs from the previous step.
    previous: Vec<PairRecord>,
    /// Scratch for the current step's pairs.
    current: Vec<PairRecord>,
}

impl ContactDispatcher {
    /// Creates a dispatcher with no contact history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest this step's contacts and emit phase transitions.
    ///
    /// Guarantees, per step: the set of (enter ∪ stay) keys equals the
    /// current contact key set, (stay ∪ exit) equals the previous key
    /// set, and no key is both entered and exited.
    pub fn update(&mut self, contacts: &[Contact], out: &mut Vec<ContactEvent>) {
        // Sort and compact the current pairs. Multiple particles of one
        // actor touching the same collider collapse into a single pair.
        self.current.clear();
        self.current.extend(contacts.iter().map(|c| PairRecord {
            key: c.event_key(),
            point: c.point,
            normal: c.normal,
        }));
        self.current.sort_unstable_by_key(|r| r.key);
        self.current.dedup_by_key(|r| r.key);

        // Zip-merge against the previous sorted list.
        let mut i = 0; // previous
        let mut j = 0; // current
        while i < self.previous.len() && j < self.current.len() {
            let prev = self.previous[i];
            let curr = self.current[j];
            match prev.key.cmp(&curr.key) {
                std::cmp::Ordering::Less => {
                    out.push(Self::event(ContactPhase::Exit, prev));
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    out.push(Self::event(ContactPhase::Enter, curr));
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    out.push(Self::event(ContactPhase::Stay, curr));
                    i += 1;
                    j += 1;
                }
            }
        }
        for &prev in &self.previous[i..] {
            out.push(Self::event(ContactPhase::Exit, prev));
        }
        for &curr in &self.current[j..] {
            out.push(Self::event(ContactPhase::Enter, curr));
        }

        std::mem::swap(&mut self.previous, &mut self.current);
    }

    /// Number of pairs carried over from the last processed step.
    pub fn active_pair_count(&self) -> usize {
        self.previous.len()
    }

    /// Drop all contact history. The next update reports everything
    /// as `Enter`.
    pub fn clear(&mut self) {
        self.previous.clear();
    }

    fn event(phase: ContactPhase, record: PairRecord) -> ContactEvent {
        let (point, normal) = match phase {
            // Exit pairs have no live geometry this step.
            ContactPhase::Exit => ([0.0; 3], [0.0; 3]),
            _ => (record.point, record.normal),
        };
        ContactEvent {
            phase,
            collider: weft_types::ColliderId(record.key.0),
            actor: weft_types::ActorId(record.key.1),
            point,
            normal,
        }
    }
}
