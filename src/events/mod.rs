//! Event types and the bus that carries them.
//!
//! Submodules:
//! - [`bus`] – the synchronous publish/subscribe channel
//! - [`lifecycle`] – trait lifecycle kinds and per-entity events
//! - [`world`] – world admission, purge, tick and audio events
//! - [`audio`] – commands forwarded to the audio consumer
pub mod audio;
pub mod bus;
pub mod lifecycle;
pub mod world;
