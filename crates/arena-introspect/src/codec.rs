//! Tag-keyed JSON codec registry for scene loading and persistence.
//!
//! Each component type registered here contributes an encode/decode pair
//! captured as plain function pointers at registration time. Collaborators
//! move whole entities as JSON objects keyed by stable tags; the ECS core
//! never learns about the format, and replay goes through the world's
//! regular add-component path so signatures and membership stay correct.

use arena_ecs::{Component, ComponentTypeId, Entity, World};
use hashbrown::HashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::IntrospectError;

type EncodeFn = fn(&World, Entity) -> Result<Option<serde_json::Value>, IntrospectError>;
type DecodeFn = fn(&mut World, Entity, serde_json::Value) -> Result<(), IntrospectError>;

struct CodecEntry {
    tag: &'static str,
    type_id: ComponentTypeId,
    encode: EncodeFn,
    decode: DecodeFn,
}

fn encode_component<T: Component + Serialize>(
    world: &World,
    entity: Entity,
) -> Result<Option<serde_json::Value>, IntrospectError> {
    world
        .try_get_component::<T>(entity)
        .map(serde_json::to_value)
        .transpose()
        .map_err(IntrospectError::from)
}

fn decode_component<T: Component + DeserializeOwned>(
    world: &mut World,
    entity: Entity,
    value: serde_json::Value,
) -> Result<(), IntrospectError> {
    let component: T = serde_json::from_value(value)?;
    world.add_component(entity, component);
    Ok(())
}

/// Registry of `(encode, decode, insert)` triples keyed by stable tag.
#[derive(Default)]
pub struct CodecRegistry {
    entries: Vec<CodecEntry>,
    by_tag: HashMap<&'static str, usize>,
}

impl CodecRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under a stable tag.
    ///
    /// # Panics
    ///
    /// Panics if the tag is already taken or `T` was never registered in
    /// `world`.
    pub fn register<T>(&mut self, world: &World, tag: &'static str)
    where
        T: Component + Serialize + DeserializeOwned,
    {
        assert!(
            !self.by_tag.contains_key(tag),
            "component tag `{tag}` registered twice"
        );
        let type_id = world.component_type::<T>();
        self.by_tag.insert(tag, self.entries.len());
        self.entries.push(CodecEntry {
            tag,
            type_id,
            encode: encode_component::<T>,
            decode: decode_component::<T>,
        });
        debug!(tag, id = type_id.as_raw(), "registered component codec");
    }

    /// Encode every codec-registered component the entity holds into a
    /// JSON object keyed by tag.
    pub fn encode_entity(
        &self,
        world: &World,
        entity: Entity,
    ) -> Result<serde_json::Value, IntrospectError> {
        let mut object = serde_json::Map::new();
        for entry in &self.entries {
            if let Some(value) = (entry.encode)(world, entity)? {
                object.insert(entry.tag.to_owned(), value);
            }
        }
        Ok(serde_json::Value::Object(object))
    }

    /// Replay a JSON object produced by [`encode_entity`](Self::encode_entity)
    /// onto an entity through the regular add-component path.
    ///
    /// Stops at the first bad item; the components already replayed stay
    /// attached.
    pub fn decode_entity(
        &self,
        world: &mut World,
        entity: Entity,
        value: serde_json::Value,
    ) -> Result<(), IntrospectError> {
        let serde_json::Value::Object(object) = value else {
            return Err(IntrospectError::NotAnObject);
        };
        for (tag, value) in object {
            let &index = self
                .by_tag
                .get(tag.as_str())
                .ok_or_else(|| IntrospectError::UnknownTag(tag.clone()))?;
            (self.entries[index].decode)(world, entity, value)?;
        }
        Ok(())
    }

    /// The tag a type id was registered under, if any.
    #[must_use]
    pub fn tag_of(&self, ty: ComponentTypeId) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|entry| entry.type_id == ty)
            .map(|entry| entry.tag)
    }

    /// Number of registered codecs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Transform {
        x: f32,
        y: f32,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Name(String);

    fn registry() -> (World, CodecRegistry) {
        let mut world = World::new();
        world.register_component::<Transform>();
        world.register_component::<Name>();

        let mut registry = CodecRegistry::new();
        registry.register::<Transform>(&world, "transform");
        registry.register::<Name>(&world, "name");
        (world, registry)
    }

    #[test]
    fn test_encode_skips_absent_components() {
        let (mut world, registry) = registry();

        let entity = world.create_entity();
        world.add_component(entity, Transform { x: 1.0, y: 2.0 });

        let encoded = registry.encode_entity(&world, entity).unwrap();
        assert_eq!(encoded, json!({ "transform": { "x": 1.0, "y": 2.0 } }));
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let (mut world, registry) = registry();

        let source = world.create_entity();
        world.add_component(source, Transform { x: 3.0, y: 4.0 });
        world.add_component(source, Name("turret".to_owned()));

        let encoded = registry.encode_entity(&world, source).unwrap();

        let copy = world.create_entity();
        registry.decode_entity(&mut world, copy, encoded).unwrap();

        assert_eq!(
            world.get_component::<Transform>(copy),
            &Transform { x: 3.0, y: 4.0 }
        );
        assert_eq!(
            world.get_component::<Name>(copy),
            &Name("turret".to_owned())
        );
        assert_eq!(world.signature(copy), world.signature(source));
    }

    #[test]
    fn test_decode_unknown_tag() {
        let (mut world, registry) = registry();

        let entity = world.create_entity();
        let result = registry.decode_entity(&mut world, entity, json!({ "mystery": {} }));
        assert!(matches!(result, Err(IntrospectError::UnknownTag(_))));
    }

    #[test]
    fn test_decode_rejects_non_object() {
        let (mut world, registry) = registry();

        let entity = world.create_entity();
        let result = registry.decode_entity(&mut world, entity, json!([1, 2, 3]));
        assert!(matches!(result, Err(IntrospectError::NotAnObject)));
    }

    #[test]
    fn test_decode_malformed_value() {
        let (mut world, registry) = registry();

        let entity = world.create_entity();
        let result =
            registry.decode_entity(&mut world, entity, json!({ "transform": { "x": "oops" } }));
        assert!(matches!(result, Err(IntrospectError::Json(_))));
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_tag_panics() {
        let (world, mut registry) = registry();

        registry.register::<Transform>(&world, "transform");
    }

    #[test]
    fn test_tag_lookup() {
        let (world, registry) = registry();

        let ty = world.component_type::<Name>();
        assert_eq!(registry.tag_of(ty), Some("name"));
        assert_eq!(registry.len(), 2);
    }
}
