//! Pairwise overlap detection with collide / uncollide transitions.
//!
//! One [`Entry`] per admitted entity remembers its last checked position and
//! the set of entities it currently overlaps. Each [`detect`] pass:
//!
//! 1. drops entries queued by [`remove_object`] since the last pass
//! 2. tests every collidable entity that moved against every other collidable
//!    one, each unordered pair at most once
//! 3. fires `collides` on both sides for overlapping pairs, and `uncollides`
//!    on both sides for recorded pairs that no longer overlap
//! 4. stores every entry's current position
//!
//! Broad phase is a plain O(n²) scan with an optional distance reject.
//!
//! [`detect`]: CollisionSpace::detect
//! [`remove_object`]: CollisionSpace::remove_object

use glam::DVec3;
use log::debug;
use rustc_hash::FxHashSet;
use slotmap::SlotMap;

use crate::components::entity::{Entity, EntityId};
use crate::error::{EngineError, EngineResult};
use crate::systems::collision::first_contact;

#[derive(Debug, Clone)]
struct Entry {
    id: EntityId,
    last_position: Option<DVec3>,
    colliding_with: FxHashSet<EntityId>,
}

#[derive(Debug, Clone)]
pub struct CollisionSpace {
    entries: Vec<Entry>,
    garbage: Vec<EntityId>,
    max_distance_sq: f64,
}

impl Default for CollisionSpace {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            garbage: Vec::new(),
            max_distance_sq: f64::INFINITY,
        }
    }
}

impl CollisionSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, id: EntityId) -> EngineResult<()> {
        if self.contains(id) {
            return Err(EngineError::AlreadyRegistered(id));
        }
        self.entries.push(Entry {
            id,
            last_position: None,
            colliding_with: FxHashSet::default(),
        });
        Ok(())
    }

    /// Queue `id` for removal at the start of the next pass.
    pub fn remove_object(&mut self, id: EntityId) {
        self.garbage.push(id);
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pairs further apart than `units` (centre to centre) never collide.
    pub fn set_collision_radius(&mut self, units: f64) {
        self.max_distance_sq = units * units;
    }

    pub fn is_colliding(&self, a: EntityId, b: EntityId) -> bool {
        self.entries
            .iter()
            .find(|e| e.id == a)
            .is_some_and(|e| e.colliding_with.contains(&b))
    }

    /// Ids `id` currently overlaps, in no particular order.
    pub fn colliding_with(&self, id: EntityId) -> Vec<EntityId> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.colliding_with.iter().copied().collect())
            .unwrap_or_default()
    }

    fn collect_garbage(&mut self) {
        if self.garbage.is_empty() {
            return;
        }
        let gone: FxHashSet<EntityId> = self.garbage.drain(..).collect();
        self.entries.retain(|e| !gone.contains(&e.id));
        for entry in &mut self.entries {
            entry.colliding_with.retain(|id| !gone.contains(id));
        }
    }

    fn needs_check(&self, index: usize, entities: &SlotMap<EntityId, Entity>) -> bool {
        let entry = &self.entries[index];
        entities
            .get(entry.id)
            .is_some_and(|e| e.collidable && entry.last_position != Some(e.position().get()))
    }

    /// Run one detection pass over `entities`.
    pub fn detect(&mut self, entities: &mut SlotMap<EntityId, Entity>) {
        self.collect_garbage();

        let count = self.entries.len();
        let mut processed: FxHashSet<(EntityId, EntityId)> = FxHashSet::default();
        for i in 0..count {
            if !self.needs_check(i, entities) {
                continue;
            }
            let a = self.entries[i].id;
            for j in 0..count {
                if i == j {
                    continue;
                }
                let b = self.entries[j].id;
                if !entities.get(b).is_some_and(|e| e.collidable) {
                    continue;
                }
                if !processed.insert((a.min(b), a.max(b))) {
                    continue;
                }
                self.check_pair(i, j, entities);
            }
        }

        for entry in &mut self.entries {
            if let Some(entity) = entities.get(entry.id) {
                entry.last_position = Some(entity.position().get());
            }
        }
    }

    fn check_pair(&mut self, i: usize, j: usize, entities: &mut SlotMap<EntityId, Entity>) {
        let (id_a, id_b) = (self.entries[i].id, self.entries[j].id);
        let Some([a, b]) = entities.get_disjoint_mut([id_a, id_b]) else {
            return;
        };

        let distance_sq = a.position().get().distance_squared(b.position().get());
        let contact = if distance_sq > self.max_distance_sq {
            None
        } else {
            first_contact(a, b)
        };

        match contact {
            Some(contact) => {
                a.collides(b, &contact);
                b.collides(a, &contact.flipped());
                if self.entries[i].colliding_with.insert(id_b) {
                    debug!("collide {:?} <-> {:?}", a.name, b.name);
                }
                self.entries[j].colliding_with.insert(id_a);
            }
            None => {
                let was_a = self.entries[i].colliding_with.remove(&id_b);
                let was_b = self.entries[j].colliding_with.remove(&id_a);
                if was_a || was_b {
                    debug!("uncollide {:?} <-> {:?}", a.name, b.name);
                    a.uncollides(b);
                    b.uncollides(a);
                }
            }
        }
    }
}
