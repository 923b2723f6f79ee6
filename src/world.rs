//! Fixed-step world simulation.
//!
//! The [`World`] owns every live [`Entity`], the [`CollisionSpace`] and the
//! fixed-step clock. Real time goes in through [`World::update_time`]; it is
//! stretched, accumulated and consumed one step at a time by
//! [`World::simulate_time`]:
//!
//! 1. time-shift every live entity in admission order
//! 2. drain queued commands
//! 3. collision detection
//! 4. drain queued commands, purge dead entities
//! 5. for positive steps, trigger [`WorldEvent::Simulated`] and bump the tick
//!
//! Entities and callbacks never mutate the world directly; they queue
//! [`WorldCommand`]s that are drained between phases, so nothing is spliced
//! out of a collection while it is being walked.

use std::rc::Rc;

use crossbeam_channel::Sender;
use glam::DVec2;
use log::{debug, info, warn};
use slotmap::SlotMap;

use crate::components::entity::{Entity, EntityId, WorldLink};
use crate::error::{EngineError, EngineResult};
use crate::events::bus::EventBus;
use crate::events::world::{WorldEvent, WorldEventKind};
use crate::resources::collisionspace::CollisionSpace;
use crate::resources::commands::{CommandQueue, WorldCommand};
use crate::resources::forces::Forces;
use crate::resources::gameconfig::GameConfig;
use crate::resources::worldtime::WorldTime;
use crate::scheduler::{Completion, Loops, SyncFuture};
use crate::traits::SimContext;

pub struct World {
    entities: SlotMap<EntityId, Entity>,
    order: Vec<EntityId>,
    collision: CollisionSpace,
    time: WorldTime,
    pub forces: Forces,
    events: Rc<EventBus<WorldEvent>>,
    commands: CommandQueue,
    garbage: Vec<EntityId>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
            order: Vec::new(),
            collision: CollisionSpace::new(),
            time: WorldTime::default(),
            forces: Forces::default(),
            events: Rc::new(EventBus::new()),
            commands: CommandQueue::default(),
            garbage: Vec::new(),
        }
    }

    /// Build a world with step, stretch, collision radius and forces from
    /// `config`.
    pub fn from_config(config: &GameConfig) -> Self {
        let mut world = Self::new();
        world.time.step = config.step;
        world.time.time_stretch = config.time_stretch;
        if let Some(radius) = config.collision_radius {
            world.set_collision_radius(radius);
        }
        world.forces = Forces::new(
            DVec2::new(config.gravity_x, config.gravity_y),
            DVec2::new(config.wind_x, config.wind_y),
        );
        info!(
            "World configured: step={}, time_stretch={}, collision_radius={:?}",
            config.step, config.time_stretch, config.collision_radius
        );
        world
    }

    // ---- entities ----

    /// Admit `entity`, register it for collision and make it live.
    pub fn add_object(&mut self, entity: Entity) -> EngineResult<EntityId> {
        let id = self.entities.insert(entity);
        if let Err(err) = self.collision.add_object(id) {
            self.entities.remove(id);
            return Err(err);
        }
        self.order.push(id);

        let link = WorldLink {
            id,
            tx: self.commands.sender(),
        };
        if let Some(entity) = self.entities.get_mut(id) {
            debug!("entity {:?} ({:?}) added", id, entity.name);
            entity.set_world(link);
        }
        self.events.trigger(&WorldEvent::Added(id));
        Ok(id)
    }

    /// Mark `id` dead. It stops being simulated at once and is purged at the
    /// next safe point.
    pub fn remove_object(&mut self, id: EntityId) -> EngineResult<()> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or(EngineError::EntityNotFound(id))?;
        if entity.is_dead() {
            return Ok(());
        }
        entity.mark_dead();
        self.garbage.push(id);
        self.collision.remove_object(id);
        Ok(())
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    pub fn require(&self, id: EntityId) -> EngineResult<&Entity> {
        self.entities.get(id).ok_or(EngineError::EntityNotFound(id))
    }

    pub fn require_mut(&mut self, id: EntityId) -> EngineResult<&mut Entity> {
        self.entities
            .get_mut(id)
            .ok_or(EngineError::EntityNotFound(id))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// First entity admitted under `name`.
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.entities.get(*id).is_some_and(|e| e.name == name))
    }

    /// Live entities in admission order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.order
            .iter()
            .filter_map(|id| self.entities.get(*id).map(|e| (*id, e)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // ---- shared surfaces ----

    pub fn events(&self) -> &Rc<EventBus<WorldEvent>> {
        &self.events
    }

    /// Sender for deferred mutations from callbacks.
    pub fn commands(&self) -> Sender<WorldCommand> {
        self.commands.sender()
    }

    pub fn collision(&self) -> &CollisionSpace {
        &self.collision
    }

    pub fn set_collision_radius(&mut self, units: f64) {
        self.collision.set_collision_radius(units);
    }

    pub fn time(&self) -> &WorldTime {
        &self.time
    }

    pub fn set_step(&mut self, step: f64) {
        self.time.step = step;
    }

    pub fn set_time_stretch(&mut self, stretch: f64) {
        self.time.time_stretch = stretch;
    }

    /// Announce `token` on the world bus.
    pub fn emit_audio(&self, token: impl Into<String>) {
        self.events.trigger(&WorldEvent::EmitAudio(token.into()));
    }

    // ---- clock ----

    /// Feed real time in; runs as many fixed steps as have accumulated.
    ///
    /// Returns the number of steps simulated.
    pub fn update_time(&mut self, real_delta: f64) -> usize {
        self.time.accumulate(real_delta);
        let mut steps = 0;
        while let Some(step) = self.time.consume_step() {
            self.simulate_time(step);
            steps += 1;
        }
        steps
    }

    /// Run exactly one step of `step` seconds.
    pub fn simulate_time(&mut self, step: f64) {
        self.time.total += step;

        let ctx = SimContext {
            forces: &self.forces,
            tick: self.time.tick,
            total: self.time.total,
        };
        for index in 0..self.order.len() {
            let id = self.order[index];
            if let Some(entity) = self.entities.get_mut(id) {
                if !entity.is_dead() {
                    entity.time_shift(step, &ctx);
                }
            }
        }
        self.apply_commands();

        self.collision.detect(&mut self.entities);
        self.apply_commands();
        self.purge();

        if step > 0.0 {
            self.events.trigger(&WorldEvent::Simulated {
                step,
                total: self.time.total,
                tick: self.time.tick,
            });
            self.time.tick += 1;
            self.apply_commands();
        }
    }

    /// Advance purely visual animators once per render frame.
    pub fn update_animation(&mut self, real_delta: f64) {
        for id in &self.order {
            if let Some(entity) = self.entities.get_mut(*id) {
                entity.update_animators(real_delta);
            }
        }
    }

    fn apply_commands(&mut self) {
        while let Some(command) = self.commands.pop() {
            match command {
                WorldCommand::Remove(id) => {
                    if self.remove_object(id).is_err() {
                        warn!("remove of unknown entity {:?} ignored", id);
                    }
                }
                WorldCommand::Spawn(entity) => {
                    if let Err(err) = self.add_object(*entity) {
                        warn!("spawn failed: {}", err);
                    }
                }
                WorldCommand::Edit(id, edit) => match self.entities.get_mut(id) {
                    Some(entity) => edit(entity),
                    None => warn!("edit of unknown entity {:?} ignored", id),
                },
                WorldCommand::EmitAudio(token) => self.emit_audio(token),
            }
        }
    }

    fn purge(&mut self) {
        if self.garbage.is_empty() {
            return;
        }
        let garbage: Vec<EntityId> = self.garbage.drain(..).collect();
        self.order.retain(|id| !garbage.contains(id));
        for id in garbage {
            if let Some(mut entity) = self.entities.remove(id) {
                debug!("entity {:?} ({:?}) purged", id, entity.name);
                entity.unset_world();
            }
            self.events.trigger(&WorldEvent::Removed(id));
        }
    }

    // ---- scheduling ----

    /// Waits driven by the world's `Simulated` tick.
    pub fn loops(&self) -> Loops<WorldEvent> {
        Loops::new(&self.events, WorldEventKind::Simulated)
    }

    pub fn do_for(
        &self,
        duration: f64,
        callback: impl FnMut(f64, f64) + 'static,
    ) -> SyncFuture<Completion> {
        self.loops().do_for(duration, callback)
    }

    pub fn wait_for(&self, duration: f64) -> SyncFuture<Completion> {
        self.loops().wait_for(duration)
    }
}
