//! Prefab template data structures.
//!
//! Templates describe an entity tree independently of live entity ids: a
//! root [`PrefabNode`] with nested children, each carrying a
//! `component type -> data` map. They are plain serializable data so a
//! prefab library can be shipped to disk or over a bridge without the
//! runtime caring.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One node of a prefab's entity tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefabNode {
    /// Entity name the node instantiates with.
    pub name: String,
    /// Component payloads keyed by component type name.
    pub components: BTreeMap<String, Value>,
    /// Child nodes, in the order they were captured.
    #[serde(default)]
    pub children: Vec<PrefabNode>,
}

impl PrefabNode {
    /// Number of nodes in this subtree, the node itself included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(PrefabNode::node_count).sum::<usize>()
    }
}

/// A reusable, id-addressable entity-tree template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prefab {
    /// Stable id the prefab is stored and instantiated under.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Free-form labels for palette filtering.
    #[serde(default)]
    pub tags: Vec<String>,
    /// The captured entity tree.
    pub root: PrefabNode,
}

/// A named patch applied over a base prefab's template at instantiation
/// time. The stored base prefab is never mutated by a variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefabVariant {
    /// Stable id the variant is stored and instantiated under.
    pub id: String,
    /// Id of the base prefab the patch applies to.
    pub base_id: String,
    /// Human-readable name.
    pub name: String,
    /// Monotonic revision of the variant definition.
    pub version: u32,
    /// Partial component overrides for the template root, keyed by
    /// component type name and deep-merged over the base data.
    pub patch: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_count_counts_whole_subtree() {
        let tree = PrefabNode {
            name: "root".into(),
            components: BTreeMap::new(),
            children: vec![
                PrefabNode {
                    name: "a".into(),
                    components: BTreeMap::new(),
                    children: vec![PrefabNode {
                        name: "a1".into(),
                        components: BTreeMap::new(),
                        children: Vec::new(),
                    }],
                },
                PrefabNode {
                    name: "b".into(),
                    components: BTreeMap::new(),
                    children: Vec::new(),
                },
            ],
        };
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn test_prefab_serialization_roundtrip() {
        let prefab = Prefab {
            id: "crate_small".into(),
            name: "Small Crate".into(),
            tags: vec!["props".into()],
            root: PrefabNode {
                name: "crate".into(),
                components: BTreeMap::from([(
                    "Transform".to_string(),
                    json!({"position": [0.0, 0.5, 0.0]}),
                )]),
                children: Vec::new(),
            },
        };
        let text = serde_json::to_string(&prefab).unwrap();
        let restored: Prefab = serde_json::from_str(&text).unwrap();
        assert_eq!(prefab, restored);
    }
}
