//! Engine error type.
//!
//! Setup-time contract violations and missing-resource lookups surface as
//! [`EngineError`]. Nothing inside the simulation loop catches these; they are
//! meant to abort the offending load step in the surrounding application.

use crate::components::entity::EntityId;

/// Alias for `Result<T, EngineError>`.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by entity, trait, collision and configuration setup.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A trait with the same name is already applied to the entity.
    #[error("Trait name \"{0}\" occupied")]
    TraitNameOccupied(String),

    /// A trait declared a dependency the host does not carry.
    #[error("trait \"{trait_name}\" requires {required} on its host")]
    MissingDependency {
        /// Name of the trait being attached.
        trait_name: String,
        /// Type name of the missing trait.
        required: &'static str,
    },

    /// A trait lookup by name or type found nothing.
    #[error("trait not found: {0}")]
    TraitNotFound(String),

    /// The entity id is stale or was never admitted.
    #[error("entity not found: {0:?}")]
    EntityNotFound(EntityId),

    /// An animation key is not defined on the entity.
    #[error("animation not found: \"{0}\"")]
    AnimationNotFound(String),

    /// The entity is already registered with the collision space.
    #[error("entity already registered: {0:?}")]
    AlreadyRegistered(EntityId),

    /// Configuration could not be read or written.
    #[error("config error: {0}")]
    Config(String),
}
