//! Scene file save/load.
//!
//! The serialization collaborator lives out here on purpose: it reads the
//! world through `entities()` plus per-entity component enumeration, and
//! reconstructs through `clear_entities()` + `create` + `add_component` —
//! the same public API every other caller uses. No format knowledge exists
//! in the core crates. Saved entity ids are remapped to freshly allocated
//! ones on load.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use scene_world::{Entity, World};

/// One entity as it appears in a scene file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneEntity {
    /// Saved entity id, only meaningful within the file.
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
    #[serde(default)]
    pub components: BTreeMap<String, Value>,
}

/// A whole scene file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneFile {
    pub entities: Vec<SceneEntity>,
}

/// Capture the world into a scene file structure.
#[must_use]
pub fn save_scene(world: &World) -> SceneFile {
    let entities = world
        .entities()
        .into_iter()
        .map(|info| SceneEntity {
            id: info.id.id(),
            name: info.name,
            parent: info.parent.map(Entity::id),
            components: world
                .components_for_entity(info.id)
                .into_iter()
                .filter_map(|component| {
                    world
                        .component_data(info.id, &component)
                        .map(|data| (component, data))
                })
                .collect(),
        })
        .collect();
    SceneFile { entities }
}

/// Replace the world's contents with a scene file.
///
/// All entities are created first (ids remapped), then the hierarchy is
/// linked, then components are attached. A dangling parent reference or a
/// payload the current schemas reject aborts the load with context; the
/// caller decides what to do with the half-loaded world.
pub fn load_scene(world: &World, scene: &SceneFile) -> Result<usize> {
    world.clear_entities();

    let mut remap: BTreeMap<u64, Entity> = BTreeMap::new();
    for entry in &scene.entities {
        let entity = world
            .create_entity(entry.name.clone(), None)
            .with_context(|| format!("creating entity '{}'", entry.name))?;
        remap.insert(entry.id, entity);
    }

    for entry in &scene.entities {
        if let Some(saved_parent) = entry.parent {
            let (Some(&entity), Some(&parent)) = (remap.get(&entry.id), remap.get(&saved_parent))
            else {
                bail!(
                    "entity '{}' references unknown parent id {saved_parent}",
                    entry.name
                );
            };
            world
                .set_parent(entity, Some(parent))
                .with_context(|| format!("linking entity '{}'", entry.name))?;
        }
    }

    for entry in &scene.entities {
        if let Some(&entity) = remap.get(&entry.id) {
            for (component, data) in &entry.components {
                world
                    .add_component(entity, component, data.clone())
                    .with_context(|| {
                        format!("attaching '{component}' to entity '{}'", entry.name)
                    })?;
            }
        }
    }

    Ok(scene.entities.len())
}

/// Load a scene from a JSON file on disk.
pub fn load_scene_file(world: &World, path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let scene: SceneFile =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    load_scene(world, &scene)
}

/// Save the world to a JSON file on disk.
pub fn save_scene_file(world: &World, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let scene = save_scene(world);
    let text = serde_json::to_string_pretty(&scene).context("serializing scene")?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
