//! # scene_world
//!
//! The entity-component world at the heart of the editor runtime.
//!
//! All mutation flows through the public API of the [`World`] context object
//! (or its parts), and every successful mutation is announced synchronously
//! on the [`EventBus`]. There are no process-wide singletons — callers own
//! their worlds, and isolated worlds can coexist in one process.
//!
//! This crate provides:
//!
//! - [`Entity`] — lightweight `u64` entity identifiers.
//! - [`EntityAllocator`] — monotonically increasing ID allocator.
//! - [`EntityStore`] — entity identity, naming, and parent/child hierarchy.
//! - [`ComponentRegistry`] — schema-validated `(entity, type)` component
//!   storage with incompatibility enforcement.
//! - [`EventBus`] / [`WorldEvent`] — synchronous in-process notifications.
//! - [`World`] — the context object owning all of the above.

pub mod entity;
pub mod error;
pub mod events;
pub mod registry;
pub mod store;
pub mod world;

pub use entity::{Entity, EntityAllocator};
pub use error::{HierarchyError, WorldError};
pub use events::{EventBus, ListenerId, WorldEvent};
pub use registry::{ComponentRegistry, deep_merge};
pub use store::{EntityInfo, EntityStore};
pub use world::World;
