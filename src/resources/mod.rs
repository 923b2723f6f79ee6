//! Long-lived simulation state owned by the [`World`](crate::world::World).
//!
//! Overview
//! - `audio` – forwards world audio announcements onto a command channel
//! - `collisionspace` – pairwise overlap detection and collide/uncollide state
//! - `commands` – deferred world mutations queued by entities and callbacks
//! - `forces` – global gravity and wind
//! - `gameconfig` – INI-backed simulation and demo settings
//! - `worldtime` – fixed step, accumulator, totals and tick counter
pub mod audio;
pub mod collisionspace;
pub mod commands;
pub mod forces;
pub mod gameconfig;
pub mod worldtime;
