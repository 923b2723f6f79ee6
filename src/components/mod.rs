//! Entity data.
//!
//! Submodules overview:
//! - [`animation`] – animation definitions, playback state and the rule-based router
//! - [`boundingbox`] – axis-aligned collision box anchored to a shared position
//! - [`entity`] – the game-object record and its world link
//! - [`position`] – shared, live-updating position handle
//! - [`signals`] – per-entity scalars, integers and flags
//! - [`traitset`] – per-entity trait registry and lifecycle table
//! - [`verlet`] – trapezoidal motion integrator

pub mod animation;
pub mod boundingbox;
pub mod entity;
pub mod position;
pub mod signals;
pub mod traitset;
pub mod verlet;
