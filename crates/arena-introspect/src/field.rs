//! Field descriptor tables: declared-name access to component fields
//! without runtime reflection.
//!
//! A component type that wants its fields addressable by name declares them
//! once in a [`ComponentDescriptor`]. Each declaration pairs the name with
//! plain getter/setter function pointers, so reading, writing and diffing
//! never inspect types at runtime.

use smallvec::SmallVec;

use crate::error::IntrospectError;

/// A field value lifted out of a component.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer, covering every integer field width.
    Int(i64),
    /// Single-precision float.
    Float(f32),
    /// Double-precision float.
    Double(f64),
    /// Owned string.
    Str(String),
    /// Two-component vector.
    Vec2([f32; 2]),
    /// Three-component vector.
    Vec3([f32; 3]),
}

impl FieldValue {
    /// The kind of this value, for mismatch reporting.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Bool(_) => FieldKind::Bool,
            Self::Int(_) => FieldKind::Int,
            Self::Float(_) => FieldKind::Float,
            Self::Double(_) => FieldKind::Double,
            Self::Str(_) => FieldKind::Str,
            Self::Vec2(_) => FieldKind::Vec2,
            Self::Vec3(_) => FieldKind::Vec3,
        }
    }
}

/// The kind of a [`FieldValue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Boolean flag.
    Bool,
    /// Signed integer.
    Int,
    /// Single-precision float.
    Float,
    /// Double-precision float.
    Double,
    /// Owned string.
    Str,
    /// Two-component vector.
    Vec2,
    /// Three-component vector.
    Vec3,
}

/// Getter reading one declared field off a component.
pub type FieldGetter<T> = fn(&T) -> FieldValue;

/// Setter writing one declared field; returns `false` when the value kind
/// does not fit the field.
pub type FieldSetter<T> = fn(&mut T, &FieldValue) -> bool;

struct FieldDescriptor<T> {
    name: &'static str,
    get: FieldGetter<T>,
    set: FieldSetter<T>,
}

/// One named field together with its current value.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDelta {
    /// Declared field name.
    pub name: &'static str,
    /// The field's value.
    pub value: FieldValue,
}

/// Ordered table of a component type's declared fields.
///
/// Built once when the type is registered for sync; collaborators then read
/// and diff by name. Declaration order is report order.
pub struct ComponentDescriptor<T> {
    fields: Vec<FieldDescriptor<T>>,
}

impl<T> Default for ComponentDescriptor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ComponentDescriptor<T> {
    /// Create a descriptor with no declared fields.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Declare a field.
    ///
    /// # Panics
    ///
    /// Panics if a field with this name is already declared.
    #[must_use]
    pub fn field(mut self, name: &'static str, get: FieldGetter<T>, set: FieldSetter<T>) -> Self {
        assert!(
            self.fields.iter().all(|field| field.name != name),
            "field `{name}` declared twice"
        );
        self.fields.push(FieldDescriptor { name, get, set });
        self
    }

    /// Read a declared field, or `None` if the name is unknown.
    #[must_use]
    pub fn read(&self, component: &T, name: &str) -> Option<FieldValue> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| (field.get)(component))
    }

    /// Write a declared field.
    pub fn write(
        &self,
        component: &mut T,
        name: &str,
        value: &FieldValue,
    ) -> Result<(), IntrospectError> {
        let field = self
            .fields
            .iter()
            .find(|field| field.name == name)
            .ok_or_else(|| IntrospectError::UnknownField(name.to_owned()))?;
        if (field.set)(component, value) {
            Ok(())
        } else {
            Err(IntrospectError::FieldKind {
                field: field.name,
                kind: value.kind(),
            })
        }
    }

    /// Report every declared field whose value differs between `old` and
    /// `new`, in declaration order.
    #[must_use]
    pub fn diff(&self, old: &T, new: &T) -> SmallVec<[FieldDelta; 4]> {
        self.fields
            .iter()
            .filter_map(|field| {
                let value = (field.get)(new);
                ((field.get)(old) != value).then(|| FieldDelta {
                    name: field.name,
                    value,
                })
            })
            .collect()
    }

    /// Read every declared field, in declaration order.
    #[must_use]
    pub fn read_all(&self, component: &T) -> Vec<FieldDelta> {
        self.fields
            .iter()
            .map(|field| FieldDelta {
                name: field.name,
                value: (field.get)(component),
            })
            .collect()
    }

    /// Iterate declared field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.name)
    }

    /// Number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check whether no fields are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Transform {
        position: [f32; 2],
        rotation: f32,
        grounded: bool,
    }

    fn descriptor() -> ComponentDescriptor<Transform> {
        ComponentDescriptor::new()
            .field(
                "position",
                |t: &Transform| FieldValue::Vec2(t.position),
                |t, v| match v {
                    FieldValue::Vec2(position) => {
                        t.position = *position;
                        true
                    }
                    _ => false,
                },
            )
            .field(
                "rotation",
                |t| FieldValue::Float(t.rotation),
                |t, v| match v {
                    FieldValue::Float(rotation) => {
                        t.rotation = *rotation;
                        true
                    }
                    _ => false,
                },
            )
            .field(
                "grounded",
                |t| FieldValue::Bool(t.grounded),
                |t, v| match v {
                    FieldValue::Bool(grounded) => {
                        t.grounded = *grounded;
                        true
                    }
                    _ => false,
                },
            )
    }

    fn transform() -> Transform {
        Transform {
            position: [1.0, 2.0],
            rotation: 0.5,
            grounded: true,
        }
    }

    #[test]
    fn test_read_by_name() {
        let descriptor = descriptor();
        let value = transform();

        assert_eq!(
            descriptor.read(&value, "rotation"),
            Some(FieldValue::Float(0.5))
        );
        assert_eq!(descriptor.read(&value, "missing"), None);
    }

    #[test]
    fn test_write_by_name() {
        let descriptor = descriptor();
        let mut value = transform();

        descriptor
            .write(&mut value, "rotation", &FieldValue::Float(1.5))
            .unwrap();
        assert_eq!(value.rotation, 1.5);
    }

    #[test]
    fn test_write_unknown_field() {
        let descriptor = descriptor();
        let mut value = transform();

        let result = descriptor.write(&mut value, "missing", &FieldValue::Bool(false));
        assert!(matches!(result, Err(IntrospectError::UnknownField(_))));
    }

    #[test]
    fn test_write_kind_mismatch() {
        let descriptor = descriptor();
        let mut value = transform();

        let result = descriptor.write(&mut value, "rotation", &FieldValue::Bool(false));
        assert!(matches!(
            result,
            Err(IntrospectError::FieldKind {
                field: "rotation",
                kind: FieldKind::Bool
            })
        ));
    }

    #[test]
    fn test_diff_reports_changes_in_declaration_order() {
        let descriptor = descriptor();
        let old = transform();
        let mut new = transform();
        new.position = [3.0, 4.0];
        new.grounded = false;

        let deltas = descriptor.diff(&old, &new);
        assert_eq!(
            deltas.as_slice(),
            &[
                FieldDelta {
                    name: "position",
                    value: FieldValue::Vec2([3.0, 4.0])
                },
                FieldDelta {
                    name: "grounded",
                    value: FieldValue::Bool(false)
                }
            ]
        );
    }

    #[test]
    fn test_diff_of_equal_values_is_empty() {
        let descriptor = descriptor();

        assert!(descriptor.diff(&transform(), &transform()).is_empty());
    }

    #[test]
    #[should_panic(expected = "declared twice")]
    fn test_duplicate_field_panics() {
        let _ = ComponentDescriptor::<Transform>::new()
            .field("rotation", |t| FieldValue::Float(t.rotation), |_, _| false)
            .field("rotation", |t| FieldValue::Float(t.rotation), |_, _| false);
    }
}
