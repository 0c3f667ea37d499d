//! Prefab capture, instantiation, variants, and unpacking.

use std::cell::RefCell;
use std::collections::BTreeMap;

use glam::Vec3;
use serde_json::{Value, json};
use tracing::warn;
use uuid::Uuid;

use scene_schema::{ComponentSchema, FieldSpec};
use scene_world::{Entity, World, WorldError, deep_merge};

use crate::template::{Prefab, PrefabNode, PrefabVariant};

/// Component type marking a live entity as the root of a prefab instance.
///
/// Fields: `prefab_id`, a fresh `instance_id` per instantiation, and
/// `variant_id` when the instance came through a variant.
pub const PREFAB_INSTANCE: &str = "PrefabInstance";

/// Per-call instantiation overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantiateOptions {
    /// Overrides the root node's `Transform.position`.
    pub position: Option<Vec3>,
    /// Attach the new root under an existing entity instead of the root set.
    pub parent: Option<Entity>,
}

/// Captures live subtrees into templates and stamps templates back into
/// live entities. Templates and variants persist until explicitly replaced.
#[derive(Debug, Default)]
pub struct PrefabSystem {
    prefabs: RefCell<BTreeMap<String, Prefab>>,
    variants: RefCell<BTreeMap<String, PrefabVariant>>,
}

impl PrefabSystem {
    /// Create a system with an empty prefab library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Capture --

    /// Capture the live subtree rooted at `root` into a template stored
    /// under `prefab_id`, replacing any previous template with that id.
    ///
    /// The walk is pre-order over `children`; the live entities are only
    /// read, never mutated. The `PrefabInstance` marker is not captured, so
    /// templates cut from an instance come out clean.
    pub fn create_from_entity(
        &self,
        world: &World,
        root: Entity,
        name: impl Into<String>,
        prefab_id: impl Into<String>,
    ) -> Result<(), WorldError> {
        let root_node = capture_node(world, root).ok_or(WorldError::EntityNotFound(root))?;

        let prefab = Prefab {
            id: prefab_id.into(),
            name: name.into(),
            tags: Vec::new(),
            root: root_node,
        };
        self.prefabs.borrow_mut().insert(prefab.id.clone(), prefab);
        Ok(())
    }

    /// Store a template directly (prefab-library loads, tag edits).
    pub fn upsert_prefab(&self, prefab: Prefab) {
        self.prefabs.borrow_mut().insert(prefab.id.clone(), prefab);
    }

    /// Store or replace a variant by id.
    pub fn upsert_variant(&self, variant: PrefabVariant) {
        self.variants.borrow_mut().insert(variant.id.clone(), variant);
    }

    // -- Library reads --

    /// A stored prefab by id.
    #[must_use]
    pub fn prefab(&self, id: &str) -> Option<Prefab> {
        self.prefabs.borrow().get(id).cloned()
    }

    /// A stored variant by id.
    #[must_use]
    pub fn variant(&self, id: &str) -> Option<PrefabVariant> {
        self.variants.borrow().get(id).cloned()
    }

    /// All stored prefab ids, in sorted order.
    #[must_use]
    pub fn prefab_ids(&self) -> Vec<String> {
        self.prefabs.borrow().keys().cloned().collect()
    }

    /// Ids of prefabs carrying the given tag.
    #[must_use]
    pub fn prefabs_tagged(&self, tag: &str) -> Vec<String> {
        self.prefabs
            .borrow()
            .values()
            .filter(|p| p.tags.iter().any(|t| t == tag))
            .map(|p| p.id.clone())
            .collect()
    }

    // -- Instantiation --

    /// Stamp a prefab or variant into the world and return the new root.
    ///
    /// An id that resolves to neither is a lookup miss: logged, `None`
    /// returned, nothing created. Variant ids resolve to their base
    /// template with the patch deep-merged on top; the stored base is
    /// untouched. Every new root carries a `PrefabInstance` marker.
    pub fn instantiate(
        &self,
        world: &World,
        id: &str,
        options: InstantiateOptions,
    ) -> Option<Entity> {
        let (template, prefab_id, variant_id) = match self.resolve(id) {
            Some(resolved) => resolved,
            None => {
                warn!(prefab = %id, "instantiate: unknown prefab or variant id");
                return None;
            }
        };

        ensure_marker_schema(world);

        let mut root_node = template;
        if let Some(position) = options.position {
            override_position(&mut root_node, position);
        }

        let root = spawn_node(world, &root_node, options.parent)?;

        let mut marker = json!({
            "prefab_id": prefab_id,
            "instance_id": Uuid::new_v4().to_string(),
        });
        if let Some(variant) = variant_id
            && let Some(fields) = marker.as_object_mut()
        {
            fields.insert("variant_id".to_string(), Value::String(variant));
        }
        if let Err(err) = world.add_component(root, PREFAB_INSTANCE, marker) {
            warn!(%root, %err, "failed to mark prefab instance");
        }

        Some(root)
    }

    /// Remove the `PrefabInstance` marker from an entity, making it a
    /// free-standing entity. All other component data is untouched.
    ///
    /// Not an instance: logs a warning and returns `false`.
    pub fn unpack(&self, world: &World, entity: Entity) -> bool {
        if world.remove_component(entity, PREFAB_INSTANCE) {
            true
        } else {
            warn!(%entity, "unpack: entity is not a prefab instance");
            false
        }
    }

    /// Resolve an id to a ready-to-spawn template plus marker metadata.
    fn resolve(&self, id: &str) -> Option<(PrefabNode, String, Option<String>)> {
        if let Some(prefab) = self.prefabs.borrow().get(id) {
            return Some((prefab.root.clone(), prefab.id.clone(), None));
        }

        let variant = self.variants.borrow().get(id).cloned()?;
        let Some(base) = self.prefabs.borrow().get(&variant.base_id).cloned() else {
            warn!(
                variant = %variant.id,
                base = %variant.base_id,
                "variant references a missing base prefab"
            );
            return None;
        };

        let mut root = base.root;
        for (component, patch) in variant.patch {
            let merged = match root.components.remove(&component) {
                Some(existing) => deep_merge(existing, patch),
                None => patch,
            };
            root.components.insert(component, merged);
        }
        Some((root, base.id, Some(variant.id)))
    }
}

/// Recursively read one live entity into a template node. `None` for a
/// dead id — the root is checked by the caller, children are always live.
fn capture_node(world: &World, entity: Entity) -> Option<PrefabNode> {
    let info = world.entity(entity)?;

    let components = world
        .components_for_entity(entity)
        .into_iter()
        .filter(|component| component != PREFAB_INSTANCE)
        .filter_map(|component| {
            world
                .component_data(entity, &component)
                .map(|data| (component, data))
        })
        .collect();

    Some(PrefabNode {
        name: info.name,
        components,
        children: info
            .children
            .iter()
            .filter_map(|&child| capture_node(world, child))
            .collect(),
    })
}

/// Recursively create live entities for a template subtree.
///
/// A component the store rejects (possible only when schemas changed since
/// capture) is logged and skipped; the rest of the tree still lands.
fn spawn_node(world: &World, node: &PrefabNode, parent: Option<Entity>) -> Option<Entity> {
    let entity = match world.create_entity(node.name.clone(), parent) {
        Ok(entity) => entity,
        Err(err) => {
            warn!(%err, node = %node.name, "instantiate: failed to create entity");
            return None;
        }
    };

    for (component, data) in &node.components {
        if let Err(err) = world.add_component(entity, component, data.clone()) {
            warn!(%entity, %component, %err, "instantiate: skipping component");
        }
    }

    for child in &node.children {
        spawn_node(world, child, Some(entity));
    }

    Some(entity)
}

/// Overwrite the root `Transform.position` with the per-call override.
fn override_position(node: &mut PrefabNode, position: Vec3) {
    let patch = json!({"position": [position.x, position.y, position.z]});
    match node.components.remove("Transform") {
        Some(transform) => {
            node.components
                .insert("Transform".to_string(), deep_merge(transform, patch));
        }
        None => warn!(node = %node.name, "position override ignored: root has no Transform"),
    }
}

/// Register the instance-marker schema if this world has not seen it yet.
fn ensure_marker_schema(world: &World) {
    if !world.registry().has_schema(PREFAB_INSTANCE) {
        world.register_schema(
            ComponentSchema::new(PREFAB_INSTANCE)
                .field(FieldSpec::string("prefab_id"))
                .field(FieldSpec::string("instance_id"))
                .field(FieldSpec::string("variant_id").optional()),
        );
    }
}
