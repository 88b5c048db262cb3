//! Dynamic objects: shape-addressed property storage with prototype
//! fallback.
//!
//! A [`DynObject`] stores its property values in a flat vector indexed by
//! offsets from its current shape. Assigning a new-to-this-object property
//! transitions the shape; assigning an existing property overwrites in
//! place. Lookups that miss fall back to the prototype chain.
//!
//! # Locking
//!
//! Every operation acquires the object's guard for its own duration only:
//! shared for reads, exclusive for writes. Prototype recursion releases the
//! guard first, so multi-level chains never nest object guards, and method
//! invocation runs user code with no guard held so re-entrant `set`/`get`/
//! `call` on `self` just works.

pub mod shape;

use std::sync::Arc;

use morph_core::sync::RwLock;
use morph_core::{AccessError, AccessResult, Identifier};

use crate::factory::ObjectFactory;
use crate::object::shape::{Shape, ShapeId};
use crate::value::{Args, FromValue, IntoValue, Value};

// =============================================================================
// Object state
// =============================================================================

/// Everything behind the object guard.
#[derive(Debug)]
struct ObjectState {
    /// Current shape; owns the whole parent chain.
    shape: Arc<Shape>,
    /// Value cells, indexed by shape offsets. At rest,
    /// `values.len() == shape.property_count()`.
    values: Vec<Value>,
    /// Fallback object for unresolved lookups.
    prototype: Option<DynObject>,
}

#[derive(Debug)]
struct ObjectInner {
    state: RwLock<ObjectState>,
}

// =============================================================================
// DynObject
// =============================================================================

/// A dynamic object created by an [`ObjectFactory`].
///
/// Cloning is cheap and yields another handle to the same object; handle
/// identity is [`DynObject::ptr_eq`]. Objects from one factory share its
/// shape tree, so equal insertion histories give equal [`shape_id`]s.
///
/// [`shape_id`]: DynObject::shape_id
#[derive(Clone, Debug)]
pub struct DynObject {
    inner: Arc<ObjectInner>,
}

impl DynObject {
    /// Create an empty object at the registry's root shape. Factory-only.
    pub(crate) fn with_root_shape(root: Arc<Shape>) -> Self {
        Self {
            inner: Arc::new(ObjectInner {
                state: RwLock::new(ObjectState {
                    shape: root,
                    values: Vec::new(),
                    prototype: None,
                }),
            }),
        }
    }

    // =========================================================================
    // Property writes
    // =========================================================================

    /// Assign `value` to the property named by `key`.
    ///
    /// Overwrites in place when the property is already present (the shape
    /// does not change). Otherwise transitions to the child shape appending
    /// `key`, grows the value vector (fresh cells are [`Value::Empty`]),
    /// and writes at the new offset. Total: every identifier of the
    /// object's factory is assignable.
    pub fn set(&self, factory: &ObjectFactory, key: Identifier, value: impl IntoValue) {
        let value = value.into_value();
        let mut state = self.inner.state.write();

        if let Some(offset) = state.shape.offset_of(key) {
            state.values[offset] = value;
            return;
        }

        let next = factory.shapes().transition(&state.shape, key);
        let slot = next.slot().expect("transition produced a root shape");
        let offset = slot.offset as usize;
        state.values.resize(next.property_count() as usize, Value::Empty);
        state.values[offset] = value;
        state.shape = next;
    }

    // =========================================================================
    // Property reads
    // =========================================================================

    /// Read the untyped cell for `key`, consulting the prototype chain on a
    /// local miss.
    ///
    /// The object's shared guard is released before recursing into the
    /// prototype, so sibling objects that reference each other cannot
    /// entangle their guards. Non-terminating prototype cycles are the
    /// host's bug; they will spin, not deadlock.
    pub fn get(&self, key: Identifier) -> AccessResult<Value> {
        let prototype = {
            let state = self.inner.state.read();
            if let Some(offset) = state.shape.offset_of(key) {
                return Ok(state.values[offset].clone());
            }
            state.prototype.clone()
            // Guard dropped here, before any prototype work.
        };

        match prototype {
            Some(parent) => parent.get(key),
            None => Err(AccessError::NoSuchProperty { key }),
        }
    }

    /// Read the property as `T`.
    ///
    /// Resolution stops at the first object (own or ancestor) holding the
    /// property; a tag mismatch there is an error, not a deeper fallback.
    pub fn get_as<T: FromValue>(&self, key: Identifier) -> AccessResult<T> {
        let value = self.get(key)?;
        T::from_value(&value).ok_or_else(|| AccessError::TypeMismatch {
            key,
            expected: T::EXPECTED,
            found: value.type_name(),
        })
    }

    // =========================================================================
    // Method dispatch
    // =========================================================================

    /// Invoke the callable stored under `key` with `(self, args)`.
    ///
    /// The callable is resolved through the normal `get` path (prototype
    /// fallback included), then invoked with no guard held, so the method
    /// body may freely `set`/`get`/`call` on the receiver.
    pub fn call(&self, factory: &ObjectFactory, key: Identifier, args: Args) -> AccessResult<Value> {
        let method = match self.get(key)? {
            Value::Method(method) => method,
            other => {
                return Err(AccessError::NotCallable {
                    key,
                    found: other.type_name(),
                })
            }
        };
        Ok(method.invoke(self, factory, args))
    }

    /// Invoke the callable under `key` and view its return value as `R`.
    pub fn call_as<R: FromValue>(
        &self,
        factory: &ObjectFactory,
        key: Identifier,
        args: Args,
    ) -> AccessResult<R> {
        let result = self.call(factory, key, args)?;
        R::from_value(&result).ok_or_else(|| AccessError::MethodReturnTypeMismatch {
            expected: R::EXPECTED,
            found: result.type_name(),
        })
    }

    // =========================================================================
    // Prototype link
    // =========================================================================

    /// Install or clear the prototype.
    ///
    /// # Panics
    ///
    /// Panics if `prototype` is this object itself. Longer cycles are not
    /// detected; avoiding them is the host's responsibility.
    pub fn set_prototype(&self, prototype: Option<DynObject>) {
        if let Some(parent) = &prototype {
            assert!(
                !Self::ptr_eq(self, parent),
                "an object cannot be its own prototype"
            );
        }
        self.inner.state.write().prototype = prototype;
    }

    /// The current prototype, if any.
    pub fn prototype(&self) -> Option<DynObject> {
        self.inner.state.read().prototype.clone()
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Id of the current shape. Equal ids mean identical layout.
    pub fn shape_id(&self) -> ShapeId {
        self.inner.state.read().shape.id()
    }

    /// Number of own properties.
    pub fn property_count(&self) -> usize {
        self.inner.state.read().shape.property_count() as usize
    }

    /// Identifiers of all own properties, in insertion order.
    pub fn keys(&self) -> Vec<Identifier> {
        self.inner.state.read().shape.keys()
    }

    /// Whether two handles refer to the same object.
    #[inline]
    pub fn ptr_eq(a: &DynObject, b: &DynObject) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

// =============================================================================
// Tests
// =============================================================================
