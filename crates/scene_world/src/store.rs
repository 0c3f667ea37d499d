//! Entity identity, naming, and parent/child hierarchy.
//!
//! The store guarantees the hierarchy invariant: `child.parent == Some(p)`
//! iff `p`'s children list contains the child exactly once, and the graph is
//! acyclic. All methods take `&self`; interior borrows are released before
//! any event is emitted, so listeners can re-enter the store.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityAllocator};
use crate::error::{HierarchyError, WorldError};
use crate::events::{EventBus, WorldEvent};

/// A read-only view of one entity's identity and place in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityInfo {
    pub id: Entity,
    pub name: String,
    pub parent: Option<Entity>,
    /// Child ids in insertion order.
    pub children: Vec<Entity>,
}

#[derive(Debug, Clone)]
struct EntityRecord {
    name: String,
    parent: Option<Entity>,
    children: Vec<Entity>,
}

/// Owns entity identity and the scene hierarchy.
#[derive(Debug)]
pub struct EntityStore {
    allocator: RefCell<EntityAllocator>,
    entities: RefCell<BTreeMap<Entity, EntityRecord>>,
    bus: Rc<EventBus>,
}

impl EntityStore {
    /// Create an empty store emitting on the given bus.
    #[must_use]
    pub fn new(bus: Rc<EventBus>) -> Self {
        Self {
            allocator: RefCell::new(EntityAllocator::new()),
            entities: RefCell::new(BTreeMap::new()),
            bus,
        }
    }

    /// Create a new entity, as a root or under `parent`.
    ///
    /// Fails with [`HierarchyError::ParentNotFound`] if the parent does not
    /// exist. Emits [`WorldEvent::EntityCreated`].
    pub fn create(
        &self,
        name: impl Into<String>,
        parent: Option<Entity>,
    ) -> Result<Entity, WorldError> {
        let id = {
            let mut entities = self.entities.borrow_mut();
            if let Some(p) = parent
                && !entities.contains_key(&p)
            {
                return Err(HierarchyError::ParentNotFound(p).into());
            }

            let id = self.allocator.borrow_mut().allocate();
            entities.insert(
                id,
                EntityRecord {
                    name: name.into(),
                    parent,
                    children: Vec::new(),
                },
            );
            if let Some(p) = parent
                && let Some(record) = entities.get_mut(&p)
            {
                record.children.push(id);
            }
            id
        };

        self.bus.emit(&WorldEvent::EntityCreated { entity: id });
        Ok(id)
    }

    /// Look up one entity. Unknown ids return `None`, never an error.
    #[must_use]
    pub fn entity(&self, id: Entity) -> Option<EntityInfo> {
        self.entities.borrow().get(&id).map(|r| EntityInfo {
            id,
            name: r.name.clone(),
            parent: r.parent,
            children: r.children.clone(),
        })
    }

    /// All entities, in id order.
    #[must_use]
    pub fn entities(&self) -> Vec<EntityInfo> {
        self.entities
            .borrow()
            .iter()
            .map(|(&id, r)| EntityInfo {
                id,
                name: r.name.clone(),
                parent: r.parent,
                children: r.children.clone(),
            })
            .collect()
    }

    /// Whether the entity exists.
    #[must_use]
    pub fn contains(&self, id: Entity) -> bool {
        self.entities.borrow().contains_key(&id)
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.borrow().len()
    }

    /// Move an entity to a new parent, or to the root set with `None`.
    ///
    /// Fails with [`HierarchyError::Cycle`] if `new_parent` is the entity
    /// itself or one of its descendants. Emits [`WorldEvent::EntityUpdated`].
    pub fn set_parent(&self, id: Entity, new_parent: Option<Entity>) -> Result<(), WorldError> {
        {
            let mut entities = self.entities.borrow_mut();
            if !entities.contains_key(&id) {
                return Err(WorldError::EntityNotFound(id));
            }
            if let Some(np) = new_parent {
                if np == id {
                    return Err(HierarchyError::Cycle(id).into());
                }
                if !entities.contains_key(&np) {
                    return Err(HierarchyError::ParentNotFound(np).into());
                }
                // Walk up from the candidate parent; hitting `id` means the
                // candidate sits inside `id`'s own subtree.
                let mut cursor = entities.get(&np).and_then(|r| r.parent);
                while let Some(ancestor) = cursor {
                    if ancestor == id {
                        return Err(HierarchyError::Cycle(id).into());
                    }
                    cursor = entities.get(&ancestor).and_then(|r| r.parent);
                }
            }

            let old_parent = entities.get(&id).and_then(|r| r.parent);
            if old_parent == new_parent {
                return Ok(());
            }
            if let Some(op) = old_parent
                && let Some(record) = entities.get_mut(&op)
            {
                record.children.retain(|&c| c != id);
            }
            if let Some(np) = new_parent
                && let Some(record) = entities.get_mut(&np)
            {
                record.children.push(id);
            }
            if let Some(record) = entities.get_mut(&id) {
                record.parent = new_parent;
            }
        }

        self.bus.emit(&WorldEvent::EntityUpdated { entity: id });
        Ok(())
    }

    /// Rename an entity. Emits [`WorldEvent::EntityUpdated`].
    pub fn rename(&self, id: Entity, name: impl Into<String>) -> Result<(), WorldError> {
        {
            let mut entities = self.entities.borrow_mut();
            let record = entities
                .get_mut(&id)
                .ok_or(WorldError::EntityNotFound(id))?;
            record.name = name.into();
        }

        self.bus.emit(&WorldEvent::EntityUpdated { entity: id });
        Ok(())
    }

    /// Delete an entity's own record.
    ///
    /// The entity is detached from its parent's children list, and its own
    /// children are detached and become roots — descendants are never
    /// deleted implicitly. Callers wanting a cascade delete the subtree
    /// leaf-first themselves.
    ///
    /// Returns `false` (and emits nothing) for unknown ids.
    pub fn delete(&self, id: Entity) -> bool {
        let existed = {
            let mut entities = self.entities.borrow_mut();
            match entities.remove(&id) {
                None => false,
                Some(record) => {
                    if let Some(p) = record.parent
                        && let Some(parent) = entities.get_mut(&p)
                    {
                        parent.children.retain(|&c| c != id);
                    }
                    for child in record.children {
                        if let Some(c) = entities.get_mut(&child) {
                            c.parent = None;
                        }
                    }
                    true
                }
            }
        };

        if existed {
            self.bus.emit(&WorldEvent::EntityDeleted { entity: id });
        }
        existed
    }

    /// Remove every entity. Used for scene loads.
    ///
    /// Emits a single [`WorldEvent::EntitiesCleared`]. Allocated ids are not
    /// reused afterwards.
    pub fn clear(&self) {
        self.entities.borrow_mut().clear();
        self.bus.emit(&WorldEvent::EntitiesCleared);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn store() -> EntityStore {
        EntityStore::new(Rc::new(EventBus::new()))
    }

    #[test]
    fn test_create_root_and_child() {
        let store = store();
        let root = store.create("root", None).unwrap();
        let child = store.create("child", Some(root)).unwrap();

        let info = store.entity(child).unwrap();
        assert_eq!(info.name, "child");
        assert_eq!(info.parent, Some(root));

        let root_info = store.entity(root).unwrap();
        assert_eq!(
            root_info.children.iter().filter(|&&c| c == child).count(),
            1
        );
    }

    #[test]
    fn test_create_under_unknown_parent_fails() {
        let store = store();
        let err = store.create("orphan", Some(Entity::from_raw(99))).unwrap_err();
        assert!(matches!(
            err,
            WorldError::Hierarchy(HierarchyError::ParentNotFound(_))
        ));
        assert_eq!(store.entity_count(), 0);
    }

    #[test]
    fn test_unknown_entity_reads_return_none() {
        let store = store();
        assert!(store.entity(Entity::from_raw(5)).is_none());
        assert!(!store.contains(Entity::from_raw(5)));
    }

    #[test]
    fn test_reparent_moves_child_lists() {
        let store = store();
        let a = store.create("a", None).unwrap();
        let b = store.create("b", None).unwrap();
        let c = store.create("c", Some(a)).unwrap();

        store.set_parent(c, Some(b)).unwrap();

        assert!(store.entity(a).unwrap().children.is_empty());
        assert_eq!(store.entity(b).unwrap().children, vec![c]);
        assert_eq!(store.entity(c).unwrap().parent, Some(b));
    }

    #[test]
    fn test_reparent_rejects_self_and_descendant() {
        let store = store();
        let a = store.create("a", None).unwrap();
        let b = store.create("b", Some(a)).unwrap();
        let c = store.create("c", Some(b)).unwrap();

        assert!(matches!(
            store.set_parent(a, Some(a)).unwrap_err(),
            WorldError::Hierarchy(HierarchyError::Cycle(_))
        ));
        assert!(matches!(
            store.set_parent(a, Some(c)).unwrap_err(),
            WorldError::Hierarchy(HierarchyError::Cycle(_))
        ));
        // The failed moves left the hierarchy untouched.
        assert_eq!(store.entity(a).unwrap().parent, None);
        assert_eq!(store.entity(c).unwrap().parent, Some(b));
    }

    #[test]
    fn test_delete_detaches_children_as_roots() {
        let store = store();
        let a = store.create("a", None).unwrap();
        let b = store.create("b", Some(a)).unwrap();
        let c = store.create("c", Some(a)).unwrap();

        assert!(store.delete(a));
        assert!(store.entity(a).is_none());
        assert_eq!(store.entity(b).unwrap().parent, None);
        assert_eq!(store.entity(c).unwrap().parent, None);
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let store = store();
        assert!(!store.delete(Entity::from_raw(1)));
    }

    #[test]
    fn test_clear_resets_and_keeps_ids_fresh() {
        let store = store();
        let a = store.create("a", None).unwrap();
        store.clear();
        assert_eq!(store.entity_count(), 0);

        let b = store.create("b", None).unwrap();
        assert_ne!(a, b, "cleared ids must not be reused");
    }

    #[test]
    fn test_events_emitted_per_mutation() {
        let bus = Rc::new(EventBus::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        bus.subscribe(move |e| s.borrow_mut().push(e.clone()));

        let store = EntityStore::new(bus);
        let a = store.create("a", None).unwrap();
        store.rename(a, "renamed").unwrap();
        store.delete(a);

        let seen = seen.borrow();
        assert_eq!(
            *seen,
            vec![
                WorldEvent::EntityCreated { entity: a },
                WorldEvent::EntityUpdated { entity: a },
                WorldEvent::EntityDeleted { entity: a },
            ]
        );
    }
}
