//! # scene_schema
//!
//! Component schemas and payload validation for the scene runtime.
//!
//! Components are dynamic, string-keyed `serde_json::Value` payloads, so the
//! shape of each component type is described at runtime by a
//! [`ComponentSchema`] registered with the [`SchemaRegistry`]. Every write
//! into the component store validates against the schema first — invalid
//! data never lands.
//!
//! This crate provides:
//!
//! - [`FieldSpec`] / [`FieldKind`] — per-field shape, requiredness, numeric
//!   ranges, and string enums.
//! - [`ComponentSchema`] — a named field set plus the component types it is
//!   mutually incompatible with.
//! - [`SchemaRegistry`] — the resolved registry the runtime validates
//!   against.
//! - [`ValidationError`] — all problems found in a rejected payload.

pub mod registry;
pub mod schema;

pub use registry::SchemaRegistry;
pub use schema::{ComponentSchema, FieldKind, FieldSpec, ValidationError};
