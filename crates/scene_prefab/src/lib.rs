//! # scene_prefab
//!
//! Reusable entity-tree templates over the scene world.
//!
//! A [`Prefab`] captures a live entity subtree — hierarchy plus component
//! data — detached from any live entity ids. Instantiating it stamps a
//! fresh tree of entities back into the world through the ordinary mutation
//! API, and marks the new root with a `PrefabInstance` component so the
//! editor can trace instances back to their source. A [`PrefabVariant`]
//! layers a patch over a base template at instantiation time without ever
//! touching the stored base.
//!
//! This crate provides:
//!
//! - [`Prefab`] / [`PrefabNode`] — the stored template tree.
//! - [`PrefabVariant`] — a named patch over a base prefab.
//! - [`PrefabSystem`] — capture, instantiation, variants, unpacking.
//! - [`InstantiateOptions`] — per-call overrides (root position, parent).

pub mod system;
pub mod template;

pub use system::{InstantiateOptions, PREFAB_INSTANCE, PrefabSystem};
pub use template::{Prefab, PrefabNode, PrefabVariant};
