//! Stateless simulation helpers.
//!
//! Submodules overview
//! - [`animation`] – advance playback and select tracks via controller rules
//! - [`collision`] – narrow-phase box tests and the canonical contact pair
pub mod animation;
pub mod collision;
