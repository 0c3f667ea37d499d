//! Schema-validated component storage.
//!
//! Components are dynamic `serde_json::Value` payloads keyed by
//! `(entity, component type name)`. Every write validates against the
//! registered schema first and checks the type's incompatibility list, so
//! data in the store is always schema-valid and conflicting pairs never
//! coexist. A rejected write changes nothing and emits nothing.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::Value;

use scene_schema::{ComponentSchema, SchemaRegistry};

use crate::entity::Entity;
use crate::error::WorldError;
use crate::events::{EventBus, WorldEvent};
use crate::store::EntityStore;

/// Recursively merge `patch` into `base`.
///
/// Object fields merge key-by-key; any other value in the patch replaces the
/// base value outright. Used both for partial component updates and for
/// prefab variant patches.
#[must_use]
pub fn deep_merge(base: Value, patch: Value) -> Value {
    match (base, patch) {
        (Value::Object(mut base_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                let merged = match base_map.remove(&key) {
                    Some(existing) => deep_merge(existing, patch_value),
                    None => patch_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, patch) => patch,
    }
}

/// Type-indexed component storage with schema validation.
#[derive(Debug)]
pub struct ComponentRegistry {
    schemas: RefCell<SchemaRegistry>,
    /// component type -> entity -> payload
    data: RefCell<BTreeMap<String, BTreeMap<Entity, Value>>>,
    bus: Rc<EventBus>,
}

impl ComponentRegistry {
    /// Create an empty registry emitting on the given bus.
    #[must_use]
    pub fn new(bus: Rc<EventBus>) -> Self {
        Self {
            schemas: RefCell::new(SchemaRegistry::new()),
            data: RefCell::new(BTreeMap::new()),
            bus,
        }
    }

    /// Register (or replace) a component type schema.
    pub fn register_schema(&self, schema: ComponentSchema) {
        self.schemas.borrow_mut().register(schema);
    }

    /// Whether a component type is registered.
    #[must_use]
    pub fn has_schema(&self, component: &str) -> bool {
        self.schemas.borrow().contains(component)
    }

    /// All registered component type names.
    #[must_use]
    pub fn component_types(&self) -> Vec<String> {
        self.schemas.borrow().names()
    }

    /// Attach a component to an entity, or replace its existing value.
    ///
    /// Order of checks: the entity must exist, the type must be registered,
    /// no attached component may conflict with it, and the payload must
    /// validate. Any failure leaves the store unchanged and emits nothing.
    ///
    /// Emits [`WorldEvent::ComponentAdded`], or
    /// [`WorldEvent::ComponentUpdated`] when a value of the same type was
    /// already attached.
    pub fn add_component(
        &self,
        store: &EntityStore,
        entity: Entity,
        component: &str,
        data: Value,
    ) -> Result<(), WorldError> {
        if !store.contains(entity) {
            return Err(WorldError::EntityNotFound(entity));
        }
        if !self.has_schema(component) {
            return Err(WorldError::UnknownComponent(component.to_string()));
        }

        let conflicts = self.incompatible_components_for_entity(entity, component);
        if !conflicts.is_empty() {
            return Err(WorldError::Incompatible {
                component: component.to_string(),
                conflicts,
            });
        }

        self.schemas.borrow().validate(component, &data)?;

        let replaced = self
            .data
            .borrow_mut()
            .entry(component.to_string())
            .or_default()
            .insert(entity, data)
            .is_some();

        let event = if replaced {
            WorldEvent::ComponentUpdated {
                entity,
                component: component.to_string(),
            }
        } else {
            WorldEvent::ComponentAdded {
                entity,
                component: component.to_string(),
            }
        };
        self.bus.emit(&event);
        Ok(())
    }

    /// Merge a partial payload into an existing component and re-validate.
    ///
    /// The merged result must pass the schema or the update is rejected with
    /// the stored value untouched. Emits [`WorldEvent::ComponentUpdated`].
    pub fn update_component(
        &self,
        store: &EntityStore,
        entity: Entity,
        component: &str,
        partial: Value,
    ) -> Result<(), WorldError> {
        if !store.contains(entity) {
            return Err(WorldError::EntityNotFound(entity));
        }

        {
            let mut data = self.data.borrow_mut();
            let per_entity = data.get_mut(component).ok_or_else(|| {
                WorldError::ComponentNotFound(component.to_string(), entity)
            })?;
            let current = per_entity.get(&entity).cloned().ok_or_else(|| {
                WorldError::ComponentNotFound(component.to_string(), entity)
            })?;

            let merged = deep_merge(current, partial);
            self.schemas.borrow().validate(component, &merged)?;
            per_entity.insert(entity, merged);
        }

        self.bus.emit(&WorldEvent::ComponentUpdated {
            entity,
            component: component.to_string(),
        });
        Ok(())
    }

    /// Detach a component. Removing an absent component is a no-op, not an
    /// error. Emits [`WorldEvent::ComponentRemoved`] when something was
    /// removed.
    pub fn remove_component(&self, entity: Entity, component: &str) -> bool {
        let removed = self
            .data
            .borrow_mut()
            .get_mut(component)
            .is_some_and(|per_entity| per_entity.remove(&entity).is_some());

        if removed {
            self.bus.emit(&WorldEvent::ComponentRemoved {
                entity,
                component: component.to_string(),
            });
        }
        removed
    }

    /// Detach every component from an entity, emitting one
    /// [`WorldEvent::ComponentRemoved`] per removed type.
    pub fn remove_components_for_entity(&self, entity: Entity) {
        let removed: Vec<String> = {
            let mut data = self.data.borrow_mut();
            data.iter_mut()
                .filter_map(|(component, per_entity)| {
                    per_entity.remove(&entity).map(|_| component.clone())
                })
                .collect()
        };

        for component in removed {
            self.bus
                .emit(&WorldEvent::ComponentRemoved { entity, component });
        }
    }

    /// The stored payload for `(entity, component)`, or `None`.
    #[must_use]
    pub fn component_data(&self, entity: Entity, component: &str) -> Option<Value> {
        self.data
            .borrow()
            .get(component)
            .and_then(|per_entity| per_entity.get(&entity))
            .cloned()
    }

    /// Whether the entity carries the component.
    #[must_use]
    pub fn has_component(&self, entity: Entity, component: &str) -> bool {
        self.data
            .borrow()
            .get(component)
            .is_some_and(|per_entity| per_entity.contains_key(&entity))
    }

    /// All entities carrying the component, in id order.
    #[must_use]
    pub fn entities_with_component(&self, component: &str) -> Vec<Entity> {
        self.data
            .borrow()
            .get(component)
            .map(|per_entity| per_entity.keys().copied().collect())
            .unwrap_or_default()
    }

    /// All component types attached to the entity, in name order.
    #[must_use]
    pub fn components_for_entity(&self, entity: Entity) -> Vec<String> {
        self.data
            .borrow()
            .iter()
            .filter(|(_, per_entity)| per_entity.contains_key(&entity))
            .map(|(component, _)| component.clone())
            .collect()
    }

    /// Attached component types that conflict with attaching `candidate`.
    ///
    /// A conflict declared by either side counts. [`Self::add_component`]
    /// consults this before mutating anything.
    #[must_use]
    pub fn incompatible_components_for_entity(
        &self,
        entity: Entity,
        candidate: &str,
    ) -> Vec<String> {
        let schemas = self.schemas.borrow();
        self.data
            .borrow()
            .iter()
            .filter(|(attached, per_entity)| {
                attached.as_str() != candidate
                    && per_entity.contains_key(&entity)
                    && schemas.conflicts(candidate, attached)
            })
            .map(|(attached, _)| attached.clone())
            .collect()
    }

    /// Drop all component data. Schema registrations survive.
    pub fn clear(&self) {
        self.data.borrow_mut().clear();
    }
}
