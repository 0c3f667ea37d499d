//! The world context object.
//!
//! [`World`] owns the entity store, the component registry, and the event
//! bus, and is the surface every external collaborator drives — UI, physics,
//! scene I/O, automation bridges, the snapshot manager, and the prefab
//! system all go through the same mutation API. Worlds are plain values:
//! tests and editor sessions create as many isolated worlds as they need.

use std::rc::Rc;

use serde_json::Value;

use scene_schema::ComponentSchema;

use crate::entity::Entity;
use crate::error::WorldError;
use crate::events::{EventBus, ListenerId, WorldEvent};
use crate::registry::ComponentRegistry;
use crate::store::{EntityInfo, EntityStore};

/// An isolated entity-component world.
#[derive(Debug)]
pub struct World {
    bus: Rc<EventBus>,
    store: EntityStore,
    registry: ComponentRegistry,
}

impl World {
    /// Create an empty world with no registered component types.
    #[must_use]
    pub fn new() -> Self {
        let bus = Rc::new(EventBus::new());
        Self {
            store: EntityStore::new(bus.clone()),
            registry: ComponentRegistry::new(bus.clone()),
            bus,
        }
    }

    /// The entity store.
    #[must_use]
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// The component registry.
    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    // -- Events --

    /// Register an event listener.
    pub fn subscribe(&self, listener: impl Fn(&WorldEvent) + 'static) -> ListenerId {
        self.bus.subscribe(listener)
    }

    /// Remove an event listener.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    // -- Entity lifecycle --

    /// Create an entity. See [`EntityStore::create`].
    pub fn create_entity(
        &self,
        name: impl Into<String>,
        parent: Option<Entity>,
    ) -> Result<Entity, WorldError> {
        self.store.create(name, parent)
    }

    /// Look up an entity. Unknown ids return `None`.
    #[must_use]
    pub fn entity(&self, id: Entity) -> Option<EntityInfo> {
        self.store.entity(id)
    }

    /// All entities, in id order.
    #[must_use]
    pub fn entities(&self) -> Vec<EntityInfo> {
        self.store.entities()
    }

    /// Move an entity in the hierarchy. See [`EntityStore::set_parent`].
    pub fn set_parent(&self, id: Entity, parent: Option<Entity>) -> Result<(), WorldError> {
        self.store.set_parent(id, parent)
    }

    /// Rename an entity.
    pub fn rename_entity(&self, id: Entity, name: impl Into<String>) -> Result<(), WorldError> {
        self.store.rename(id, name)
    }

    /// Delete an entity and all of its own components, as a unit.
    ///
    /// Children are detached, not deleted. Returns `false` for unknown ids.
    pub fn delete_entity(&self, id: Entity) -> bool {
        if !self.store.contains(id) {
            return false;
        }
        self.registry.remove_components_for_entity(id);
        self.store.delete(id)
    }

    /// Reset to an empty world. Component data goes with the entities;
    /// schema registrations survive. Used for scene loads.
    pub fn clear_entities(&self) {
        self.registry.clear();
        self.store.clear();
    }

    // -- Components --

    /// Register (or replace) a component type schema.
    pub fn register_schema(&self, schema: ComponentSchema) {
        self.registry.register_schema(schema);
    }

    /// Attach a component. See [`ComponentRegistry::add_component`].
    pub fn add_component(
        &self,
        entity: Entity,
        component: &str,
        data: Value,
    ) -> Result<(), WorldError> {
        self.registry.add_component(&self.store, entity, component, data)
    }

    /// Merge a partial update into a component. See
    /// [`ComponentRegistry::update_component`].
    pub fn update_component(
        &self,
        entity: Entity,
        component: &str,
        partial: Value,
    ) -> Result<(), WorldError> {
        self.registry
            .update_component(&self.store, entity, component, partial)
    }

    /// Detach a component. Absent components are a no-op.
    pub fn remove_component(&self, entity: Entity, component: &str) -> bool {
        self.registry.remove_component(entity, component)
    }

    /// The stored payload for `(entity, component)`, or `None`.
    #[must_use]
    pub fn component_data(&self, entity: Entity, component: &str) -> Option<Value> {
        self.registry.component_data(entity, component)
    }

    /// Whether the entity carries the component.
    #[must_use]
    pub fn has_component(&self, entity: Entity, component: &str) -> bool {
        self.registry.has_component(entity, component)
    }

    /// All registered component type names.
    #[must_use]
    pub fn component_types(&self) -> Vec<String> {
        self.registry.component_types()
    }

    /// All entities carrying the component.
    #[must_use]
    pub fn entities_with_component(&self, component: &str) -> Vec<Entity> {
        self.registry.entities_with_component(component)
    }

    /// All component types attached to the entity.
    #[must_use]
    pub fn components_for_entity(&self, entity: Entity) -> Vec<String> {
        self.registry.components_for_entity(entity)
    }

    /// Attached component types that would conflict with attaching
    /// `candidate`. See
    /// [`ComponentRegistry::incompatible_components_for_entity`].
    #[must_use]
    pub fn incompatible_components_for_entity(
        &self,
        entity: Entity,
        candidate: &str,
    ) -> Vec<String> {
        self.registry
            .incompatible_components_for_entity(entity, candidate)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
