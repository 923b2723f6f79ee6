//! Deferred world mutations.
//!
//! Entities, traits and scheduled callbacks never touch the world directly.
//! They send a [`WorldCommand`] through the sender in their
//! [`WorldLink`](crate::components::entity::WorldLink), and the world drains
//! the queue between simulation phases.

use std::fmt;

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::components::entity::{Entity, EntityId};

/// Closure run against a live entity when the queue is drained.
pub type EntityEdit = Box<dyn FnOnce(&mut Entity)>;

pub enum WorldCommand {
    /// Mark the entity dead; it is purged at the next safe point.
    Remove(EntityId),
    /// Admit a new entity.
    Spawn(Box<Entity>),
    /// Mutate an entity by id.
    Edit(EntityId, EntityEdit),
    /// Announce a sound on the world bus.
    EmitAudio(String),
}

impl fmt::Debug for WorldCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldCommand::Remove(id) => f.debug_tuple("Remove").field(id).finish(),
            WorldCommand::Spawn(entity) => f.debug_tuple("Spawn").field(&entity.name).finish(),
            WorldCommand::Edit(id, _) => f.debug_tuple("Edit").field(id).finish(),
            WorldCommand::EmitAudio(token) => f.debug_tuple("EmitAudio").field(token).finish(),
        }
    }
}

/// Both ends of the command channel.
pub struct CommandQueue {
    tx: Sender<WorldCommand>,
    rx: Receiver<WorldCommand>,
}

impl Default for CommandQueue {
    fn default() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }
}

impl CommandQueue {
    pub fn sender(&self) -> Sender<WorldCommand> {
        self.tx.clone()
    }

    /// Next queued command, without blocking.
    pub fn pop(&self) -> Option<WorldCommand> {
        self.rx.try_recv().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
