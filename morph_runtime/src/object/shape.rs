//! Shape system: hidden classes for property layout.
//!
//! Objects that receive the same sequence of property additions share a
//! Shape describing where each property lives in the value vector, so
//! access is an integer offset instead of a per-object dictionary probe.
//!
//! # Shape Transitions
//!
//! Adding a property moves an object to the child shape for that
//! identifier. Shapes form a transition tree rooted at the empty shape:
//!
//! ```text
//!     RootShape
//!         |
//!     +---+---+
//!     |       |
//!   "x"     "y"
//!     |       |
//!  Shape1  Shape2
//!     |
//!   "y"
//!     |
//!  Shape3 (has both x and y)
//! ```
//!
//! # Ownership
//!
//! Strong ownership flows upward: a child holds an `Arc` to its parent
//! because lookups walk toward the root. The transition cache points the
//! other way and is deliberately weak: once no object retains a descendant,
//! the descendant is freed and the next transition along the same edge
//! rebuilds an equivalent node. Held strongly, the cache would make the
//! tree grow monotonically for the life of the factory.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};

use morph_core::sync::Mutex;
use morph_core::Identifier;
use rustc_hash::FxHashMap;
use tracing::debug;

// =============================================================================
// Shape ID
// =============================================================================

/// Unique identifier for a shape within one factory.
///
/// Used for fast identity comparison and cache keying; two objects with
/// equal shape ids have identical property layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ShapeId(pub u32);

impl ShapeId {
    /// The root shape id (no properties).
    pub const ROOT: Self = Self(0);

    /// Check if this is the root shape id.
    #[inline]
    pub const fn is_root(self) -> bool {
        self.0 == 0
    }

    /// Get the raw value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

// =============================================================================
// Slot descriptor
// =============================================================================

/// The property a shape appends relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotDescriptor {
    /// Identifier of the appended property.
    pub key: Identifier,
    /// Index in the object's value vector; equals the parent's property
    /// count.
    pub offset: u32,
}

// =============================================================================
// Shape
// =============================================================================

/// An immutable node in the shape tree.
///
/// The parent chain encodes the object's full insertion history; the node
/// itself records only the one property it appends. Immutable after
/// construction apart from the transition cache.
#[derive(Debug)]
pub struct Shape {
    /// Unique id within the owning factory.
    id: ShapeId,

    /// Parent shape; `None` exactly for the root.
    parent: Option<Arc<Shape>>,

    /// Property appended by this node; `None` exactly for the root.
    slot: Option<SlotDescriptor>,

    /// Total number of properties on the chain ending here.
    property_count: u32,

    /// Weak edges to child shapes, keyed by the appended identifier.
    /// Expired edges are replaced transparently on the next transition.
    transitions: Mutex<FxHashMap<Identifier, Weak<Shape>>>,
}

impl Shape {
    /// Create a root shape (no properties).
    fn root() -> Arc<Self> {
        Arc::new(Self {
            id: ShapeId::ROOT,
            parent: None,
            slot: None,
            property_count: 0,
            transitions: Mutex::new(FxHashMap::default()),
        })
    }

    /// Create the child of `parent` that appends `key`.
    fn with_property(parent: Arc<Shape>, key: Identifier, id: ShapeId) -> Arc<Self> {
        let offset = parent.property_count;
        Arc::new(Self {
            id,
            slot: Some(SlotDescriptor { key, offset }),
            property_count: offset + 1,
            parent: Some(parent),
            transitions: Mutex::new(FxHashMap::default()),
        })
    }

    /// Shape id.
    #[inline]
    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// Parent shape, absent for the root.
    #[inline]
    pub fn parent(&self) -> Option<&Arc<Shape>> {
        self.parent.as_ref()
    }

    /// The property this node appends, absent for the root.
    #[inline]
    pub fn slot(&self) -> Option<&SlotDescriptor> {
        self.slot.as_ref()
    }

    /// Number of properties on the chain ending here.
    #[inline]
    pub fn property_count(&self) -> u32 {
        self.property_count
    }

    /// Check if this is the root shape.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Offset of `key` in the value vector of an object with this shape.
    ///
    /// Walks the parent chain toward the root; the lowest node wins, and
    /// the chain holds each identifier at most once, so the first match is
    /// the only one. O(depth).
    pub fn offset_of(&self, key: Identifier) -> Option<usize> {
        let mut current = self;
        loop {
            if let Some(slot) = &current.slot {
                if slot.key == key {
                    return Some(slot.offset as usize);
                }
            }
            match &current.parent {
                Some(parent) => current = parent.as_ref(),
                None => return None,
            }
        }
    }

    /// Check whether `key` is present on the chain ending here.
    #[inline]
    pub fn contains(&self, key: Identifier) -> bool {
        self.offset_of(key).is_some()
    }

    /// All identifiers on the chain, in insertion order.
    pub fn keys(&self) -> Vec<Identifier> {
        let mut keys = vec![Identifier::from_raw(0); self.property_count as usize];
        let mut current = self;
        while let Some(slot) = &current.slot {
            keys[slot.offset as usize] = slot.key;
            // Non-root nodes always have a parent.
            current = current.parent.as_deref().expect("non-root shape without parent");
        }
        keys
    }

    /// Get a live cached transition for `key`, if any.
    pub fn cached_transition(&self, key: Identifier) -> Option<Arc<Shape>> {
        self.transitions.lock().get(&key).and_then(Weak::upgrade)
    }
}

// =============================================================================
// Shape Registry
// =============================================================================

/// Owner of one shape tree: the root node plus the id counter.
///
/// Shared by all objects of one factory; transitions through the same
/// registry along the same edge yield the same child instance for as long
/// as any object keeps that child alive.
#[derive(Debug)]
pub struct ShapeRegistry {
    /// Counter for unique shape ids. Id 0 is the root.
    next_id: AtomicU32,

    /// The shared root shape.
    root: Arc<Shape>,
}

impl ShapeRegistry {
    /// Create a registry with a fresh root shape.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU32::new(1),
            root: Shape::root(),
        }
    }

    /// The root shape.
    #[inline]
    pub fn root_shape(&self) -> Arc<Shape> {
        Arc::clone(&self.root)
    }

    /// Return the unique child of `from` that appends `key`.
    ///
    /// The probe, the construction, and the publication happen under the
    /// parent's edge lock, so two racing transitions along one edge always
    /// observe the same child. An expired weak edge is replaced in place.
    pub fn transition(&self, from: &Arc<Shape>, key: Identifier) -> Arc<Shape> {
        let mut transitions = from.transitions.lock();

        if let Some(existing) = transitions.get(&key).and_then(Weak::upgrade) {
            return existing;
        }

        let id = ShapeId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let shape = Shape::with_property(Arc::clone(from), key, id);
        transitions.insert(key, Arc::downgrade(&shape));
        debug!(
            target: "morph::shape",
            parent = from.id().raw(),
            child = id.raw(),
            %key,
            "shape transition"
        );
        shape
    }

    /// Number of shape ids issued so far (root included). Counts rebuilt
    /// nodes; a diagnostic, not a live-node census.
    pub fn shape_count(&self) -> u32 {
        self.next_id.load(Ordering::Relaxed)
    }
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
