//! The object factory: unit of sharing for one object population.
//!
//! A factory owns exactly one identifier interner and one shape tree. All
//! objects created from it take identifiers from that interner and
//! transition through that tree, which is what makes equal insertion
//! histories converge on the same shape instance.

use std::sync::Arc;

use morph_core::sync::Mutex;
use morph_core::{Identifier, StringInterner};

use crate::object::shape::ShapeRegistry;
use crate::object::DynObject;

/// Owner of an interner and a shape registry.
///
/// Identifiers and shape ids are meaningful only within the factory that
/// issued them; mixing factories is a host bug the runtime does not detect.
#[derive(Debug)]
pub struct ObjectFactory {
    /// Interner behind the factory guard. `intern` takes the guard
    /// exclusively; objects never touch it.
    interner: Mutex<StringInterner>,

    /// The shape tree shared by all of this factory's objects.
    shapes: ShapeRegistry,
}

impl ObjectFactory {
    /// Create a factory with an empty interner and a fresh root shape.
    pub fn new() -> Self {
        Self {
            interner: Mutex::new(StringInterner::new()),
            shapes: ShapeRegistry::new(),
        }
    }

    /// Intern a property name. Idempotent; identifiers are dense from 0 in
    /// first-encounter order and stable for the factory's lifetime.
    pub fn intern(&self, name: &str) -> Identifier {
        self.interner.lock().intern(name)
    }

    /// The name behind an identifier, or `None` if this factory never
    /// issued it. Diagnostic.
    pub fn lookup(&self, id: Identifier) -> Option<Arc<str>> {
        self.interner.lock().lookup(id)
    }

    /// Number of identifiers issued so far.
    pub fn interned_count(&self) -> usize {
        self.interner.lock().len()
    }

    /// Snapshot of all `(identifier, name)` pairs in issue order.
    pub fn interned(&self) -> Vec<(Identifier, Arc<str>)> {
        self.interner.lock().entries()
    }

    /// Create an empty object: root shape, no values, no prototype.
    pub fn create_object(&self) -> DynObject {
        DynObject::with_root_shape(self.shapes.root_shape())
    }

    /// Number of shape ids issued so far (root included). Diagnostic.
    pub fn shape_count(&self) -> u32 {
        self.shapes.shape_count()
    }

    /// The shape registry, for transitions during `set`.
    pub(crate) fn shapes(&self) -> &ShapeRegistry {
        &self.shapes
    }
}

impl Default for ObjectFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_round_trip() {
        let factory = ObjectFactory::new();
        let a = factory.intern("a");
        let b = factory.intern("b");

        assert_eq!(a.raw(), 0);
        assert_eq!(b.raw(), 1);
        assert_eq!(factory.intern("a"), a);
        assert_eq!(factory.lookup(b).as_deref(), Some("b"));
        assert!(factory.lookup(Identifier::from_raw(2)).is_none());
        assert_eq!(factory.interned_count(), 2);
    }

    #[test]
    fn test_fresh_objects_share_root() {
        let factory = ObjectFactory::new();
        let a = factory.create_object();
        let b = factory.create_object();

        assert_eq!(a.shape_id(), b.shape_id());
        assert!(a.shape_id().is_root());
        assert_eq!(a.property_count(), 0);
        assert!(!DynObject::ptr_eq(&a, &b));
    }

    #[test]
    fn test_separate_factories_are_independent() {
        let f1 = ObjectFactory::new();
        let f2 = ObjectFactory::new();

        // Both interners start dense from zero, independently.
        assert_eq!(f1.intern("x").raw(), 0);
        assert_eq!(f2.intern("y").raw(), 0);
    }

    #[test]
    fn test_shape_count_starts_at_root() {
        let factory = ObjectFactory::new();
        assert_eq!(factory.shape_count(), 1);

        let obj = factory.create_object();
        obj.set(&factory, factory.intern("x"), 1i64);
        assert_eq!(factory.shape_count(), 2);
    }
}
