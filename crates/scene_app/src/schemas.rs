//! Built-in component schemas.
//!
//! The core crates are schema-agnostic; this is the standard set an editor
//! session starts from. Hosts can register more types at any time.

use glam::Vec3;
use serde_json::{Value, json};

use scene_schema::{ComponentSchema, FieldSpec};
use scene_world::World;

/// Register the standard component set on a world.
pub fn register_builtin_schemas(world: &World) {
    world.register_schema(
        ComponentSchema::new("Transform")
            .field(FieldSpec::vec3("position"))
            .field(FieldSpec::vec3("rotation").optional())
            .field(FieldSpec::vec3("scale").optional()),
    );
    world.register_schema(
        ComponentSchema::new("MeshRenderer")
            .field(FieldSpec::string("mesh"))
            .field(FieldSpec::string("material").optional())
            .field(FieldSpec::bool("cast_shadows").optional()),
    );
    world.register_schema(
        ComponentSchema::new("RigidBody")
            .field(FieldSpec::float("mass").range(0.0, 100_000.0))
            .field(FieldSpec::bool("kinematic").optional())
            .incompatible_with("StaticBody"),
    );
    world.register_schema(ComponentSchema::new("StaticBody"));
    world.register_schema(
        ComponentSchema::new("Collider")
            .field(FieldSpec::string("shape").one_of(["box", "sphere", "capsule"]))
            .field(FieldSpec::vec3("half_extents").optional())
            .field(FieldSpec::float("radius").range(0.0, 10_000.0).optional()),
    );
    world.register_schema(
        ComponentSchema::new("Light")
            .field(FieldSpec::string("kind").one_of(["directional", "point", "spot"]))
            .field(FieldSpec::float("intensity").range(0.0, 1_000.0))
            .field(FieldSpec::vec3("color").optional()),
    );
    world.register_schema(
        ComponentSchema::new("Camera")
            .field(FieldSpec::float("fov").range(1.0, 179.0))
            .field(FieldSpec::float("near").range(0.0001, 1_000.0).optional())
            .field(FieldSpec::float("far").range(0.01, 1_000_000.0).optional()),
    );
}

/// A `Transform` payload at the given position, identity otherwise.
#[must_use]
pub fn transform_at(position: Vec3) -> Value {
    json!({
        "position": [position.x, position.y, position.z],
        "rotation": [0.0, 0.0, 0.0],
        "scale": [1.0, 1.0, 1.0],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_schemas_accept_reasonable_payloads() {
        let world = World::new();
        register_builtin_schemas(&world);
        let e = world.create_entity("probe", None).unwrap();

        world
            .add_component(e, "Transform", transform_at(Vec3::new(1.0, 2.0, 3.0)))
            .unwrap();
        world
            .add_component(e, "MeshRenderer", json!({"mesh": "meshes/crate.obj"}))
            .unwrap();
        world
            .add_component(e, "Collider", json!({"shape": "sphere", "radius": 0.5}))
            .unwrap();
        world
            .add_component(e, "Light", json!({"kind": "point", "intensity": 20.0}))
            .unwrap();
        assert!(
            world
                .add_component(e, "Camera", json!({"fov": 400.0}))
                .is_err()
        );
    }

    #[test]
    fn test_rigid_and_static_bodies_conflict() {
        let world = World::new();
        register_builtin_schemas(&world);
        let e = world.create_entity("probe", None).unwrap();

        world.add_component(e, "StaticBody", Value::Null).unwrap();
        assert!(
            world
                .add_component(e, "RigidBody", json!({"mass": 10.0}))
                .is_err()
        );
    }
}
