//! Bit-vector signatures over registered component types.

use std::fmt;

use crate::component::ComponentTypeId;

/// Maximum number of component types a process may register.
pub const MAX_COMPONENT_TYPES: usize = 32;

/// Fixed-width bit-vector keyed by [`ComponentTypeId`].
///
/// A signature is both an entity's "what it has" descriptor and a system's
/// "what it needs" filter. As a filter, the empty signature is the wildcard:
/// every entity satisfies it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Signature(u32);

impl Signature {
    /// The signature with no bits set.
    pub const EMPTY: Self = Self(0);

    /// Build a signature from component type ids.
    #[must_use]
    pub fn of(types: &[ComponentTypeId]) -> Self {
        let mut signature = Self::EMPTY;
        for &ty in types {
            signature.set(ty);
        }
        signature
    }

    /// Set the bit owned by `ty`.
    pub fn set(&mut self, ty: ComponentTypeId) {
        self.0 |= ty.bit();
    }

    /// Clear the bit owned by `ty`.
    pub fn clear(&mut self, ty: ComponentTypeId) {
        self.0 &= !ty.bit();
    }

    /// Check whether the bit owned by `ty` is set.
    #[must_use]
    pub const fn test(self, ty: ComponentTypeId) -> bool {
        self.0 & ty.bit() != 0
    }

    /// Check whether every bit of `required` is also set in `self`.
    #[must_use]
    pub const fn contains_all(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }

    /// Check whether no bits are set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature(0b{:b})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_clear_test() {
        let ty = ComponentTypeId::from_raw(5);
        let mut signature = Signature::EMPTY;

        assert!(!signature.test(ty));
        signature.set(ty);
        assert!(signature.test(ty));
        signature.clear(ty);
        assert!(!signature.test(ty));
        assert!(signature.is_empty());
    }

    #[test]
    fn test_contains_all() {
        let a = ComponentTypeId::from_raw(0);
        let b = ComponentTypeId::from_raw(1);
        let c = ComponentTypeId::from_raw(2);

        let both = Signature::of(&[a, b]);
        let required = Signature::of(&[a]);

        assert!(both.contains_all(required));
        assert!(!required.contains_all(both));
        assert!(!both.contains_all(Signature::of(&[c])));
    }

    #[test]
    fn test_empty_signature_is_wildcard() {
        let loaded = Signature::of(&[ComponentTypeId::from_raw(7)]);

        assert!(loaded.contains_all(Signature::EMPTY));
        assert!(Signature::EMPTY.contains_all(Signature::EMPTY));
    }
}
