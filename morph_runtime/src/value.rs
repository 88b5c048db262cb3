//! Dynamically-typed value cells.
//!
//! A [`Value`] is the one unavoidably dynamic piece of the runtime: a
//! tagged union over the host-facing scalar and container types, plus a
//! callable variant and an opaque escape hatch for arbitrary host values.
//! The cell preserves type identity; typed extraction succeeds only when
//! the stored tag matches the requested view.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::factory::ObjectFactory;
use crate::object::DynObject;

/// Ordered argument pack for method invocation.
///
/// Short packs stay inline; there is no positional/named distinction at
/// this layer.
pub type Args = SmallVec<[Value; 4]>;

#[cfg(feature = "threaded")]
type MethodFn = dyn Fn(&DynObject, &ObjectFactory, Args) -> Value + Send + Sync;
#[cfg(not(feature = "threaded"))]
type MethodFn = dyn Fn(&DynObject, &ObjectFactory, Args) -> Value;

// =============================================================================
// Method
// =============================================================================

/// A callable stored in a value cell.
///
/// Receives the object it was resolved on and the factory, so a method body
/// can re-enter `get`/`set`/`call` on `self` and intern further identifiers
/// without capturing the factory per-callable.
#[derive(Clone)]
pub struct Method(Arc<MethodFn>);

impl Method {
    /// Wrap a closure as a callable cell value.
    #[cfg(feature = "threaded")]
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&DynObject, &ObjectFactory, Args) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(body))
    }

    /// Wrap a closure as a callable cell value.
    #[cfg(not(feature = "threaded"))]
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&DynObject, &ObjectFactory, Args) -> Value + 'static,
    {
        Self(Arc::new(body))
    }

    /// Invoke the callable. The caller must hold no object guard.
    #[inline]
    pub fn invoke(&self, receiver: &DynObject, factory: &ObjectFactory, args: Args) -> Value {
        (self.0)(receiver, factory, args)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Method(..)")
    }
}

impl PartialEq for Method {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

// =============================================================================
// Value
// =============================================================================

/// Payload type for the opaque variant.
pub type OpaquePayload = dyn Any + Send + Sync;

/// A tagged dynamic value held in one slot of an object's value vector.
#[derive(Clone, Default)]
pub enum Value {
    // NOTE: `PartialEq` is implemented manually below; `Method` and
    // `Opaque` can't derive it (closure / `dyn Any` payloads), so their
    // equality is defined as pointer identity.
    /// The untyped hole. Cells that were never assigned (slots grown by a
    /// shape transition for a sibling property) hold this.
    #[default]
    Empty,
    /// Boolean.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// Owned UTF-8 string.
    Str(String),
    /// Ordered sequence of cells.
    List(Vec<Value>),
    /// String-keyed mapping of cells.
    Map(FxHashMap<String, Value>),
    /// Callable property; see [`Method`].
    Method(Method),
    /// Arbitrary host value, extracted by downcast only.
    Opaque(Arc<OpaquePayload>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Method(a), Self::Method(b)) => a == b,
            (Self::Opaque(a), Self::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Value {
    /// Wrap an arbitrary host value.
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Self::Opaque(Arc::new(value))
    }

    /// Downcast the opaque variant to a concrete host type.
    pub fn downcast_opaque<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Self::Opaque(any) => Arc::clone(any).downcast::<T>().ok(),
            _ => None,
        }
    }

    /// Tag name, used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Method(_) => "method",
            Self::Opaque(_) => "opaque",
        }
    }

    /// Whether this cell holds a callable.
    #[inline]
    pub const fn is_callable(&self) -> bool {
        matches!(self, Self::Method(_))
    }

    /// Whether this cell is the untyped hole.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Self::List(v) => f.debug_tuple("List").field(v).finish(),
            Self::Map(v) => f.debug_tuple("Map").field(v).finish(),
            Self::Method(_) => f.write_str("Method(..)"),
            Self::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

// =============================================================================
// Typed extraction
// =============================================================================

/// Typed view over a value cell.
///
/// Extraction is tag-checked: `from_value` returns `None` when the stored
/// tag does not match, and the object layer reports that as a type
/// mismatch naming [`FromValue::EXPECTED`].
pub trait FromValue: Sized {
    /// Tag name reported in mismatch errors.
    const EXPECTED: &'static str;

    /// Extract a typed copy if the tag matches.
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    const EXPECTED: &'static str = "any";

    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "bool";

    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "int";

    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    const EXPECTED: &'static str = "int";

    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "float";

    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "string";

    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromValue for Vec<Value> {
    const EXPECTED: &'static str = "list";

    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromValue for FxHashMap<String, Value> {
    const EXPECTED: &'static str = "map";

    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Map(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromValue for Method {
    const EXPECTED: &'static str = "method";

    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Method(v) => Some(v.clone()),
            _ => None,
        }
    }
}

// =============================================================================
// Typed injection
// =============================================================================

/// Conversion into a value cell, so `set` accepts host types directly.
pub trait IntoValue {
    /// Wrap `self` in the matching tag.
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    #[inline]
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for bool {
    #[inline]
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoValue for i64 {
    #[inline]
    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl IntoValue for i32 {
    #[inline]
    fn into_value(self) -> Value {
        Value::Int(self.into())
    }
}

impl IntoValue for f64 {
    #[inline]
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl IntoValue for f32 {
    #[inline]
    fn into_value(self) -> Value {
        Value::Float(self.into())
    }
}

impl IntoValue for String {
    #[inline]
    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl IntoValue for &str {
    #[inline]
    fn into_value(self) -> Value {
        Value::Str(self.to_owned())
    }
}

impl IntoValue for Vec<Value> {
    #[inline]
    fn into_value(self) -> Value {
        Value::List(self)
    }
}

impl IntoValue for FxHashMap<String, Value> {
    #[inline]
    fn into_value(self) -> Value {
        Value::Map(self)
    }
}

impl IntoValue for Method {
    #[inline]
    fn into_value(self) -> Value {
        Value::Method(self)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Empty.type_name(), "empty");
        assert_eq!(Value::Int(1).type_name(), "int");
        assert_eq!(Value::Str("x".into()).type_name(), "string");
        assert_eq!(Value::opaque(std::time::Duration::ZERO).type_name(), "opaque");
    }

    #[test]
    fn test_tag_checked_extraction() {
        let v = Value::Int(7);
        assert_eq!(i64::from_value(&v), Some(7));
        assert_eq!(i32::from_value(&v), Some(7));
        assert_eq!(String::from_value(&v), None);
        assert_eq!(bool::from_value(&v), None);
    }

    #[test]
    fn test_i32_range_check() {
        let big = Value::Int(i64::from(i32::MAX) + 1);
        assert_eq!(i32::from_value(&big), None);
        assert_eq!(i64::from_value(&big), Some(i64::from(i32::MAX) + 1));
    }

    #[test]
    fn test_untyped_view_always_succeeds() {
        for v in [Value::Empty, Value::Bool(true), Value::Str("s".into())] {
            assert!(Value::from_value(&v).is_some());
        }
    }

    #[test]
    fn test_is_callable() {
        let m = Method::new(|_, _, _| Value::Empty);
        assert!(Value::Method(m).is_callable());
        assert!(!Value::Int(0).is_callable());
    }

    #[test]
    fn test_opaque_downcast() {
        #[derive(Debug, PartialEq)]
        struct HostHandle(u32);

        let v = Value::opaque(HostHandle(9));
        assert_eq!(*v.downcast_opaque::<HostHandle>().unwrap(), HostHandle(9));
        assert!(v.downcast_opaque::<String>().is_none());
        assert!(Value::Int(0).downcast_opaque::<HostHandle>().is_none());
    }

    #[test]
    fn test_into_value_tags() {
        assert_eq!("abc".into_value().type_name(), "string");
        assert_eq!(3i32.into_value().type_name(), "int");
        assert_eq!(2.5f32.into_value().type_name(), "float");
        assert_eq!(true.into_value().type_name(), "bool");
    }

    #[test]
    fn test_default_is_empty() {
        assert!(Value::default().is_empty());
    }
}
