//! Prefab library file load.
//!
//! A library file is a JSON document carrying prefab templates and variants
//! authored elsewhere. Loading installs them into a [`PrefabSystem`]; the
//! templates only become live entities when something instantiates them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use scene_prefab::{Prefab, PrefabSystem, PrefabVariant};

/// On-disk prefab library.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrefabLibrary {
    #[serde(default)]
    pub prefabs: Vec<Prefab>,
    #[serde(default)]
    pub variants: Vec<PrefabVariant>,
}

/// Load a library file and install its contents.
///
/// Returns `(prefab count, variant count)`.
pub fn load_prefab_library(system: &PrefabSystem, path: impl AsRef<Path>) -> Result<(usize, usize)> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let library: PrefabLibrary =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;

    let counts = (library.prefabs.len(), library.variants.len());
    for prefab in library.prefabs {
        system.upsert_prefab(prefab);
    }
    for variant in library.variants {
        system.upsert_variant(variant);
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_library_deserializes_and_installs() {
        let text = json!({
            "prefabs": [{
                "id": "barrel",
                "name": "Barrel",
                "tags": ["props"],
                "root": {
                    "name": "barrel",
                    "components": {
                        "Transform": {"position": [0.0, 0.0, 0.0]}
                    }
                }
            }],
            "variants": [{
                "id": "barrel_tall",
                "base_id": "barrel",
                "name": "Tall Barrel",
                "version": 1,
                "patch": {
                    "Transform": {"position": [0.0, 1.0, 0.0]}
                }
            }]
        })
        .to_string();

        let library: PrefabLibrary = serde_json::from_str(&text).unwrap();
        assert_eq!(library.prefabs.len(), 1);
        assert_eq!(library.variants.len(), 1);

        let system = PrefabSystem::new();
        for prefab in library.prefabs {
            system.upsert_prefab(prefab);
        }
        for variant in library.variants {
            system.upsert_variant(variant);
        }
        assert!(system.prefab("barrel").is_some());
        assert!(system.variant("barrel_tall").is_some());
    }
}
