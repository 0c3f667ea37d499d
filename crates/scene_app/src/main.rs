//! # scene_app — Runtime shell
//!
//! One-shot driver around the scene world: loads a scene file through the
//! public mutation API, logs a summary of what it holds, and can re-save
//! the normalized scene.
//!
//! ## Usage
//!
//! ```text
//! scene_app [INPUT.json] [OUTPUT.json]
//! ```
//!
//! Environment:
//!
//! - `SCENE_PREFABS` — path to a prefab library file to install.
//! - `SCENE_SPAWN` — prefab (or variant) id to instantiate into the scene
//!   before summarizing/saving.

mod library;
mod scene;
mod schemas;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use scene_prefab::{InstantiateOptions, PrefabSystem};
use scene_world::World;

fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("scene_app=info".parse()?))
        .init();

    let mut args = std::env::args().skip(1);
    let input = args.next();
    let output = args.next();

    let world = World::new();
    schemas::register_builtin_schemas(&world);

    match &input {
        Some(path) => {
            let count = scene::load_scene_file(&world, path)
                .with_context(|| format!("loading scene '{path}'"))?;
            info!(%path, entities = count, "scene loaded");
        }
        None => info!("no scene file given, starting empty"),
    }

    let prefabs = PrefabSystem::new();
    if let Ok(path) = std::env::var("SCENE_PREFABS") {
        let (prefab_count, variant_count) = library::load_prefab_library(&prefabs, &path)
            .with_context(|| format!("loading prefab library '{path}'"))?;
        info!(%path, prefabs = prefab_count, variants = variant_count, "prefab library loaded");
    }

    if let Ok(id) = std::env::var("SCENE_SPAWN") {
        match prefabs.instantiate(&world, &id, InstantiateOptions::default()) {
            Some(root) => info!(prefab = %id, %root, "prefab instantiated"),
            None => warn!(prefab = %id, "prefab not found, nothing spawned"),
        }
    }

    summarize(&world);

    if let Some(path) = &output {
        scene::save_scene_file(&world, path)
            .with_context(|| format!("saving scene '{path}'"))?;
        info!(%path, "scene saved");
    }

    Ok(())
}

/// Log a per-component-type census of the world.
fn summarize(world: &World) {
    info!(
        entities = world.entities().len(),
        component_types = world.component_types().len(),
        "world summary"
    );
    for component in world.component_types() {
        let count = world.entities_with_component(&component).len();
        if count > 0 {
            info!(%component, count, "component usage");
        }
    }
}
