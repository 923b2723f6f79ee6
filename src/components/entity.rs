//! The game-object record.
//!
//! An [`Entity`] carries transform, motion state, collision boxes, a trait
//! set and its own [`EventBus`]. It makes no gameplay decisions itself:
//! collisions, obstructions and time shifts are fanned out to attached traits
//! in attachment order, then announced on the entity bus.
//!
//! # Lifecycle
//!
//! Entities are built standalone and become live when a
//! [`World`](crate::world::World) admits them, which hands them a
//! [`WorldLink`]. Removal is always deferred: [`Entity::remove_from_world`]
//! only queues a command.
//!
//! # Example
//!
//! ```ignore
//! let mut crate_box = Entity::named("crate");
//! crate_box.add_collision_rect(16.0, 16.0, 0.0, 0.0);
//! crate_box.apply_trait(Physics::new(1.0))?;
//! let id = world.add_object(crate_box)?;
//! ```

use std::rc::Rc;

use crossbeam_channel::Sender;
use glam::{DVec2, DVec3};
use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::components::animation::{Animation, AnimationController, AnimationResource};
use crate::components::boundingbox::BoundingBox;
use crate::components::position::SharedPosition;
use crate::components::signals::Signals;
use crate::components::traitset::{TraitKey, TraitSet};
use crate::components::verlet::Verlet;
use crate::error::{EngineError, EngineResult};
use crate::events::bus::EventBus;
use crate::events::lifecycle::{EntityEvent, EntityEventKind, Lifecycle, Surface};
use crate::resources::commands::WorldCommand;
use crate::scheduler::{Completion, Loops, SyncFuture};
use crate::systems::animation::{advance_animation, select_animation};
use crate::traits::{Contact, SimContext, Trait};

slotmap::new_key_type! {
    /// Generational id of a live entity.
    pub struct EntityId;
}

/// Opaque handle to whatever the renderer draws for this entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelHandle(pub u64);

/// Connection from an admitted entity back to its world.
#[derive(Debug, Clone)]
pub struct WorldLink {
    pub id: EntityId,
    pub tx: Sender<WorldCommand>,
}

pub struct Entity {
    pub name: String,
    position: SharedPosition,
    pub velocity: DVec2,
    /// Directional intent, usually from input or AI.
    pub aim: DVec2,
    /// Facing derived from `aim`; x is -1 or 1, y is -1, 0 or 1.
    pub direction: DVec2,
    pub collidable: bool,
    collision: Vec<BoundingBox>,
    traits: TraitSet,
    events: Rc<EventBus<EntityEvent>>,
    integrator: Verlet<DVec2>,
    time: f64,
    /// Local time multiplier for simulation and animation.
    pub time_stretch: f64,
    delta_time: f64,
    pub signals: Signals,
    animations: FxHashMap<String, AnimationResource>,
    controller: Option<AnimationController>,
    animation: Option<Animation>,
    model: Option<ModelHandle>,
    /// Entity that spawned this one, e.g. the shooter of a projectile.
    pub emitter: Option<EntityId>,
    pub visible: bool,
    link: Option<WorldLink>,
    dead: bool,
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id())
            .field("name", &self.name)
            .field("position", &self.position.get())
            .field("velocity", &self.velocity)
            .field("traits", &self.traits.names().collect::<Vec<_>>())
            .finish()
    }
}

impl Entity {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            position: SharedPosition::default(),
            velocity: DVec2::ZERO,
            aim: DVec2::ZERO,
            direction: DVec2::new(1.0, 0.0),
            collidable: true,
            collision: Vec::new(),
            traits: TraitSet::new(),
            events: Rc::new(EventBus::new()),
            integrator: Verlet::new(),
            time: 0.0,
            time_stretch: 1.0,
            delta_time: 0.0,
            signals: Signals::default(),
            animations: FxHashMap::default(),
            controller: None,
            animation: None,
            model: None,
            emitter: None,
            visible: true,
            link: None,
            dead: false,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::new()
        }
    }

    /// Id assigned by the world, if admitted.
    pub fn id(&self) -> Option<EntityId> {
        self.link.as_ref().map(|l| l.id)
    }

    pub fn is_in_world(&self) -> bool {
        self.link.is_some()
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub(crate) fn mark_dead(&mut self) {
        self.dead = true;
    }

    /// The shared position handle. Clone it to follow this entity live.
    pub fn position(&self) -> &SharedPosition {
        &self.position
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Stretched delta of the last time shift.
    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    pub fn events(&self) -> &Rc<EventBus<EntityEvent>> {
        &self.events
    }

    pub fn model(&self) -> Option<ModelHandle> {
        self.model
    }

    pub fn set_model(&mut self, model: ModelHandle) {
        self.model = Some(model);
    }

    // ---- collision shapes ----

    /// Append a `w` x `h` box centred at `position + (offset_x, offset_y)`.
    pub fn add_collision_rect(&mut self, w: f64, h: f64, offset_x: f64, offset_y: f64) {
        self.collision.push(BoundingBox::new(
            self.position.clone(),
            DVec2::new(w, h),
            DVec2::new(offset_x, offset_y),
        ));
    }

    /// Append a square box of side `2 * r`.
    pub fn add_collision_zone(&mut self, r: f64, offset_x: f64, offset_y: f64) {
        self.add_collision_rect(r * 2.0, r * 2.0, offset_x, offset_y);
    }

    pub fn collision(&self) -> &[BoundingBox] {
        &self.collision
    }

    pub fn drop_collision(&mut self) {
        self.collision.clear();
    }

    // ---- motion ----

    /// Teleport to `to`, keeping depth. Clears the integrator history.
    pub fn move_to(&mut self, to: DVec2) {
        self.position.set_xy(to);
        self.integrator.reset();
    }

    pub fn nudge(&mut self, x: f64, y: f64) {
        let to = self.position.xy() + DVec2::new(x, y);
        self.move_to(to);
    }

    pub fn reset_integrator(&mut self) {
        self.integrator.reset();
    }

    /// Advance one fixed step.
    ///
    /// Order: animation routing, facing from `aim`, trait time shifts, the
    /// `TimeShift` bus event, integration, local time.
    pub fn time_shift(&mut self, dt: f64, ctx: &SimContext<'_>) {
        let adjusted = dt * self.time_stretch;
        self.delta_time = adjusted;

        self.route_animation();

        if self.aim.x != 0.0 {
            self.direction.x = self.aim.x.signum();
        }
        self.direction.y = if self.aim.y == 0.0 {
            0.0
        } else {
            self.aim.y.signum()
        };

        self.dispatch(Lifecycle::TimeShift, |t, host| t.time_shift(host, adjusted, ctx));

        self.events.trigger(&EntityEvent::TimeShift {
            delta: adjusted,
            time: self.time,
        });

        let mut position = self.position.get();
        self.integrator.integrate(&mut position, self.velocity, adjusted);
        self.position.set(position);

        self.time += adjusted;
    }

    // ---- collision fan-out ----

    pub fn collides(&mut self, other: &mut Entity, contact: &Contact) {
        self.dispatch(Lifecycle::Collide, |t, host| t.collides(host, other, contact));
        self.events.trigger(&EntityEvent::Collide { other: other.id() });
    }

    /// Report that `other` blocked this entity; `attack` is our side that hit.
    pub fn obstruct(&mut self, other: &mut Entity, attack: Surface, contact: &Contact) {
        self.dispatch(Lifecycle::Obstruct, |t, host| {
            t.obstruct(host, other, attack, contact)
        });
        self.events.trigger(&EntityEvent::Obstruct {
            other: other.id(),
            attack,
        });
    }

    pub fn uncollides(&mut self, other: &mut Entity) {
        self.dispatch(Lifecycle::Uncollide, |t, host| t.uncollides(host, other));
        self.events.trigger(&EntityEvent::Uncollide { other: other.id() });
    }

    /// Run `f` for every trait subscribed to `kind`, in attachment order.
    fn dispatch(&mut self, kind: Lifecycle, mut f: impl FnMut(&mut dyn Trait, &mut Entity)) {
        let gated = matches!(kind, Lifecycle::TimeShift | Lifecycle::Obstruct);
        let table = self.traits.lifecycle();
        table.dispatch(kind, |TraitKey(index)| {
            if gated && !self.traits.is_enabled(index) {
                return;
            }
            let Some(mut lifted) = self.traits.take(index) else {
                return;
            };
            f(&mut *lifted, self);
            self.put_back(index, lifted);
        });
    }

    fn put_back(&mut self, index: usize, lifted: Box<dyn Trait>) {
        if let Some(mut leaving) = self.traits.restore(index, lifted) {
            leaving.on_detach(self);
            self.traits.remove(index);
            let name = leaving.name().to_owned();
            debug!("trait \"{}\" detached from {:?}", name, self.name);
            self.events.trigger(&EntityEvent::TraitDetached { name });
        }
    }

    // ---- traits ----

    /// Attach `value` and expose it by name and type.
    ///
    /// Fails if the name is taken or a required trait type is absent.
    pub fn apply_trait<T: Trait>(&mut self, mut value: T) -> EngineResult<()> {
        let name = value.name().to_owned();
        if self.traits.contains_name(&name) {
            return Err(EngineError::TraitNameOccupied(name));
        }
        if let Some(missing) = value
            .requires()
            .into_iter()
            .find(|req| !self.traits.contains_type(req.type_id))
        {
            return Err(EngineError::MissingDependency {
                trait_name: name,
                required: missing.name,
            });
        }

        value.on_attach(self);
        self.traits.insert(value);
        debug!("trait \"{}\" attached to {:?}", name, self.name);
        self.events.trigger(&EntityEvent::TraitAttached { name });
        Ok(())
    }

    pub fn has_trait<T: Trait>(&self) -> bool {
        self.traits.index_of::<T>().is_some()
    }

    pub fn has_trait_named(&self, name: &str) -> bool {
        self.traits.contains_name(name)
    }

    /// First attached `T`. `None` if absent or currently running a callback.
    pub fn get_trait<T: Trait>(&self) -> Option<&T> {
        self.traits.get::<T>()
    }

    pub fn get_trait_mut<T: Trait>(&mut self) -> Option<&mut T> {
        self.traits.get_mut::<T>()
    }

    /// Like [`get_trait`](Self::get_trait) but a missing trait is an error.
    pub fn require_trait<T: Trait>(&self) -> EngineResult<&T> {
        self.traits
            .get::<T>()
            .ok_or_else(|| EngineError::TraitNotFound(std::any::type_name::<T>().to_owned()))
    }

    pub fn trait_by_name(&self, name: &str) -> Option<&dyn Trait> {
        self.traits.by_name(name)
    }

    pub fn trait_by_name_mut(&mut self, name: &str) -> Option<&mut (dyn Trait + 'static)> {
        self.traits.by_name_mut(name)
    }

    /// Names of attached traits in attachment order.
    pub fn trait_names(&self) -> impl Iterator<Item = &str> {
        self.traits.names()
    }

    /// Call `f` with the first `T` and this entity as its host.
    ///
    /// `None` if no `T` is attached or it is already running a callback.
    pub fn with_trait<T: Trait, R>(&mut self, f: impl FnOnce(&mut T, &mut Entity) -> R) -> Option<R> {
        let index = self.traits.index_of::<T>()?;
        let mut lifted = self.traits.take(index)?;
        let result = (*lifted).as_any_mut().downcast_mut::<T>().map(|t| f(t, self));
        self.put_back(index, lifted);
        result
    }

    /// Detach the first `T`.
    ///
    /// A trait detaching itself from inside its own callback is removed once
    /// that callback returns.
    pub fn detach_trait<T: Trait>(&mut self) -> EngineResult<()> {
        let index = self
            .traits
            .index_of::<T>()
            .ok_or_else(|| EngineError::TraitNotFound(std::any::type_name::<T>().to_owned()))?;
        self.detach_index(index);
        Ok(())
    }

    pub fn detach_trait_by_name(&mut self, name: &str) -> EngineResult<()> {
        let index = self
            .traits
            .index_by_name(name)
            .ok_or_else(|| EngineError::TraitNotFound(name.to_owned()))?;
        self.detach_index(index);
        Ok(())
    }

    fn detach_index(&mut self, index: usize) {
        if self.traits.is_taken(index) {
            warn!("trait in slot {} detached mid-dispatch; deferring", index);
            self.traits.mark_detach_pending(index);
            return;
        }
        if let Some(lifted) = self.traits.take(index) {
            self.traits.mark_detach_pending(index);
            self.put_back(index, lifted);
        }
    }

    /// Turn time-shift and obstruct handling of the first `T` on or off.
    pub fn set_trait_enabled<T: Trait>(&mut self, enabled: bool) -> EngineResult<()> {
        let index = self
            .traits
            .index_of::<T>()
            .ok_or_else(|| EngineError::TraitNotFound(std::any::type_name::<T>().to_owned()))?;
        self.traits.set_enabled(index, enabled);
        Ok(())
    }

    pub fn enable_trait<T: Trait>(&mut self) -> EngineResult<()> {
        self.set_trait_enabled::<T>(true)
    }

    pub fn disable_trait<T: Trait>(&mut self) -> EngineResult<()> {
        self.set_trait_enabled::<T>(false)
    }

    pub fn is_trait_enabled<T: Trait>(&self) -> bool {
        self.traits
            .index_of::<T>()
            .is_some_and(|i| self.traits.is_enabled(i))
    }

    /// Zero `aim` and restore every resettable trait, for pooled reuse.
    pub fn reset(&mut self) {
        self.aim = DVec2::ZERO;
        for index in self.traits.indices() {
            let Some(mut lifted) = self.traits.take(index) else {
                continue;
            };
            if let Some(resettable) = lifted.resettable() {
                resettable.reset(self);
            }
            self.put_back(index, lifted);
        }
    }

    // ---- animation ----

    pub fn add_animation(&mut self, key: impl Into<String>, resource: AnimationResource) {
        self.animations.insert(key.into(), resource);
    }

    pub fn animation(&self) -> Option<&Animation> {
        self.animation.as_ref()
    }

    /// Switch playback to `key`; a no-op if it is already playing.
    pub fn set_animation(&mut self, key: &str) -> EngineResult<()> {
        if !self.animations.contains_key(key) {
            return Err(EngineError::AnimationNotFound(key.to_owned()));
        }
        if self.animation.as_ref().is_some_and(|a| a.animation_key == key) {
            return Ok(());
        }
        self.animation = Some(Animation::new(key));
        Ok(())
    }

    /// Install the animation router. Every key it can select must be defined.
    pub fn set_animation_controller(&mut self, controller: AnimationController) -> EngineResult<()> {
        if let Some(unknown) = controller.keys().find(|k| !self.animations.contains_key(*k)) {
            return Err(EngineError::AnimationNotFound(unknown.to_owned()));
        }
        self.controller = Some(controller);
        Ok(())
    }

    fn route_animation(&mut self) {
        let Some(controller) = &self.controller else {
            return;
        };
        let wanted = select_animation(controller, &self.signals);
        if self.animation.as_ref().is_some_and(|a| a.animation_key == wanted) {
            return;
        }
        if self.animations.contains_key(wanted) {
            self.animation = Some(Animation::new(wanted));
        }
    }

    /// Advance visual playback by one render frame.
    pub fn update_animators(&mut self, dt: f64) {
        let adjusted = dt * self.time_stretch;
        let Some(anim) = self.animation.as_mut() else {
            return;
        };
        if let Some(resource) = self.animations.get(&anim.animation_key) {
            advance_animation(anim, resource, adjusted);
        }
    }

    // ---- world ----

    pub(crate) fn set_world(&mut self, link: WorldLink) {
        self.link = Some(link);
        self.dead = false;
        self.events.trigger(&EntityEvent::WorldAdd);
    }

    pub(crate) fn unset_world(&mut self) {
        self.events.trigger(&EntityEvent::WorldRemove);
        self.link = None;
    }

    /// Ask the world to remove this entity at its next safe point.
    pub fn remove_from_world(&self) {
        if let Some(link) = &self.link {
            let _ = link.tx.send(WorldCommand::Remove(link.id));
        }
    }

    /// Announce a sound through the world; silent outside a world.
    pub fn emit_audio(&self, token: impl Into<String>) {
        if let Some(link) = &self.link {
            let _ = link.tx.send(WorldCommand::EmitAudio(token.into()));
        }
    }

    /// Queue a mutation of this entity for when the world next drains commands.
    pub fn defer(&self, edit: impl FnOnce(&mut Entity) + 'static) {
        if let Some(link) = &self.link {
            let _ = link.tx.send(WorldCommand::Edit(link.id, Box::new(edit)));
        }
    }

    /// Command sender of the owning world, for spawning from traits.
    pub fn commands(&self) -> Option<&Sender<WorldCommand>> {
        self.link.as_ref().map(|l| &l.tx)
    }

    // ---- scheduling ----

    /// Waits driven by this entity's own time shifts.
    pub fn loops(&self) -> Loops<EntityEvent> {
        Loops::new(&self.events, EntityEventKind::TimeShift)
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

    /// Place the entity at `position` including depth.
    pub fn set_position(&mut self, position: DVec3) {
        self.position.set(position);
        self.integrator.reset();
    }
}
