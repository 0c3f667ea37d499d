//! World-layer error types.
//!
//! Lookup misses on read paths return `Option`/`bool` instead of an error;
//! these types cover rejected mutations only. A rejected mutation leaves the
//! world exactly as it was and emits no event.

use thiserror::Error;

use scene_schema::ValidationError;

use crate::entity::Entity;

/// A hierarchy operation was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HierarchyError {
    /// The requested parent does not exist.
    #[error("parent {0} not found")]
    ParentNotFound(Entity),

    /// The move would make an entity its own ancestor.
    #[error("cannot parent {0} under itself or one of its descendants")]
    Cycle(Entity),
}

/// Errors that can occur during world mutations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WorldError {
    /// The target entity does not exist.
    #[error("entity {0} not found")]
    EntityNotFound(Entity),

    /// No schema is registered under this component type name.
    #[error("unknown component type: {0}")]
    UnknownComponent(String),

    /// The entity does not carry this component.
    #[error("component '{0}' not found on entity {1}")]
    ComponentNotFound(String, Entity),

    /// The payload was rejected by the component type's schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The component conflicts with components already on the entity.
    #[error("component '{component}' is incompatible with [{}] already on the entity", conflicts.join(", "))]
    Incompatible {
        /// The component type whose attachment was rejected.
        component: String,
        /// The attached component types it conflicts with.
        conflicts: Vec<String>,
    },

    /// A hierarchy operation was rejected.
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}
