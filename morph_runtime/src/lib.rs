//! Morph dynamic object runtime.
//!
//! An embeddable object system for hosts that need heterogeneous objects
//! whose property sets are discovered at runtime. The interesting part is
//! the hidden-class (shape) mechanism: objects that receive the same
//! sequence of property additions share one immutable layout descriptor, so
//! property access is an integer offset into a value vector instead of a
//! per-object hash table.
//!
//! This crate provides:
//! - Dynamically-typed value cells with typed extraction ([`Value`])
//! - The shape DAG and its transition cache ([`object::shape`])
//! - Dynamic objects with prototype-chain fallback ([`DynObject`])
//! - The factory owning one interner and one shape DAG ([`ObjectFactory`])
//! - An optional JSON rendering helper ([`json`], `json` feature)
//!
//! # Example
//!
//! ```
//! use morph_runtime::{Args, Method, ObjectFactory, Value};
//!
//! let factory = ObjectFactory::new();
//! let id_name = factory.intern("name");
//! let id_greet = factory.intern("greet");
//!
//! let obj = factory.create_object();
//! obj.set(&factory, id_name, "Cirno");
//! obj.set(
//!     &factory,
//!     id_greet,
//!     Method::new(move |this, _factory, _args: Args| {
//!         match this.get_as::<String>(id_name) {
//!             Ok(name) => Value::Str(format!("hello from {name}")),
//!             Err(_) => Value::Str("hello from ???".into()),
//!         }
//!     }),
//! );
//!
//! let greeting = obj.call_as::<String>(&factory, id_greet, Args::new()).unwrap();
//! assert_eq!(greeting, "hello from Cirno");
//! ```
//!
//! # Concurrency
//!
//! Built with the `threaded` feature (default), objects take a
//! reader-writer guard per operation and factories serialize interning and
//! shape transitions; lock ordering is object-before-factory and guards are
//! never held across prototype recursion or user callables. Without the
//! feature, every guard compiles to a no-op and the types stop being
//! `Sync`.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod factory;
#[cfg(feature = "json")]
pub mod json;
pub mod object;
pub mod value;

pub use factory::ObjectFactory;
pub use object::shape::{Shape, ShapeId, ShapeRegistry, SlotDescriptor};
pub use object::DynObject;
pub use value::{Args, FromValue, IntoValue, Method, Value};

// Re-export the core surface so hosts depend on one crate.
pub use morph_core::{AccessError, AccessResult, Identifier};
