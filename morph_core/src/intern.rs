//! Property name interning.
//!
//! Objects never store or compare property names. The host interns each
//! name once, receiving a dense [`Identifier`], and every subsequent
//! operation takes identifiers. Comparison is integer equality; the set of
//! live identifiers is always the contiguous range `[0, len)` in
//! first-encounter order.
//!
//! Canonical strings are stored once as `Arc<str>`, shared between the
//! dense id-to-string vector and the reverse map. Reverse lookups are
//! satisfied against borrowed `&str` slices (`Arc<str>: Borrow<str>`), so
//! probing for an already-interned name allocates nothing.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::trace;

// =============================================================================
// Identifier
// =============================================================================

/// Dense integer identifier for an interned property name.
///
/// Issued monotonically starting at 0 and valid for the lifetime of the
/// factory that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Identifier(u32);

impl Identifier {
    /// Reconstruct an identifier from its raw index.
    ///
    /// Only indices previously returned by [`StringInterner::intern`] on the
    /// same factory name a property; anything else resolves to nothing.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw dense index.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// StringInterner
// =============================================================================

/// Bidirectional mapping between property names and identifiers.
///
/// Not internally synchronized; the owning factory serializes access behind
/// its guard.
#[derive(Debug, Default)]
pub struct StringInterner {
    /// Reverse map, keyed by the same `Arc<str>` the vector owns.
    ids: FxHashMap<Arc<str>, Identifier>,
    /// Canonical storage, indexed by raw identifier.
    strings: Vec<Arc<str>>,
}

impl StringInterner {
    /// Create an empty interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a property name, returning its identifier.
    ///
    /// Idempotent: equal strings (byte-exact, no normalization) always map
    /// to the same identifier.
    pub fn intern(&mut self, name: &str) -> Identifier {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }

        let id = Identifier(self.strings.len() as u32);
        let canonical: Arc<str> = Arc::from(name);
        self.strings.push(Arc::clone(&canonical));
        self.ids.insert(canonical, id);
        trace!(target: "morph::intern", %id, name, "interned property name");
        id
    }

    /// The name an identifier was interned from, or `None` for identifiers
    /// this interner never issued. Diagnostic; never aborts.
    #[inline]
    pub fn lookup(&self, id: Identifier) -> Option<Arc<str>> {
        self.strings.get(id.raw() as usize).cloned()
    }

    /// Number of interned names. Identifiers densely cover `[0, len)`.
    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether nothing has been interned yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Snapshot of all `(identifier, name)` pairs in issue order.
    pub fn entries(&self) -> Vec<(Identifier, Arc<str>)> {
        self.strings
            .iter()
            .enumerate()
            .map(|(i, s)| (Identifier(i as u32), Arc::clone(s)))
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
