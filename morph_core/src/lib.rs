//! # Morph Core
//!
//! Core types and primitives for the Morph dynamic object runtime.
//!
//! This crate provides the foundational building blocks shared across the
//! runtime:
//!
//! - **Interning**: dense integer identifiers for property names
//! - **Error Handling**: structured results for property access and dispatch
//! - **Synchronization**: lock primitives selected at build time
//!
//! The object model itself (shapes, objects, the factory) lives in
//! `morph_runtime`.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod intern;
pub mod sync;

pub use error::{AccessError, AccessResult};
pub use intern::{Identifier, StringInterner};

/// Runtime version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
