//! Lock primitives selected at build time.
//!
//! With the `threaded` feature (the default) these are the `parking_lot`
//! types. Without it, every lock is a zero-cost wrapper over `UnsafeCell`:
//! acquisition compiles away entirely, and since `UnsafeCell` is `!Sync`,
//! any type guarded this way stops being shareable across threads. A host
//! that violates the single-threaded contract gets a compile error instead
//! of a data race.
//!
//! The no-op guards are sound under two rules the runtime upholds
//! everywhere:
//!
//! 1. A guard never escapes the public operation that acquired it.
//! 2. No guard is held while a user callable runs; nested operations
//!    re-acquire from scratch.
//!
//! Together these guarantee a single thread never holds two overlapping
//! exclusive guards on the same lock.

#[cfg(feature = "threaded")]
pub use parking_lot::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[cfg(not(feature = "threaded"))]
pub use noop::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[cfg(not(feature = "threaded"))]
mod noop {
    use std::cell::UnsafeCell;
    use std::fmt;
    use std::ops::{Deref, DerefMut};

    /// No-op stand-in for `parking_lot::Mutex`.
    pub struct Mutex<T: ?Sized> {
        cell: UnsafeCell<T>,
    }

    impl<T> Mutex<T> {
        /// Wrap a value. No lock state is allocated.
        #[inline]
        pub const fn new(value: T) -> Self {
            Self {
                cell: UnsafeCell::new(value),
            }
        }
    }

    impl<T: ?Sized> Mutex<T> {
        /// "Acquire" the lock. Always succeeds immediately.
        #[inline]
        pub fn lock(&self) -> MutexGuard<'_, T> {
            MutexGuard { cell: &self.cell }
        }
    }

    impl<T: fmt::Debug> fmt::Debug for Mutex<T> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            // SAFETY: single-threaded build; no guard is live across this
            // call per the module contract.
            f.debug_tuple("Mutex").field(unsafe { &*self.cell.get() }).finish()
        }
    }

    /// Exclusive guard for the no-op [`Mutex`].
    pub struct MutexGuard<'a, T: ?Sized> {
        cell: &'a UnsafeCell<T>,
    }

    impl<T: ?Sized> Deref for MutexGuard<'_, T> {
        type Target = T;

        #[inline]
        fn deref(&self) -> &T {
            // SAFETY: guards never overlap an exclusive borrow of the same
            // cell; see the module contract.
            unsafe { &*self.cell.get() }
        }
    }

    impl<T: ?Sized> DerefMut for MutexGuard<'_, T> {
        #[inline]
        fn deref_mut(&mut self) -> &mut T {
            // SAFETY: as above; this is the only live guard for the cell.
            unsafe { &mut *self.cell.get() }
        }
    }

    /// No-op stand-in for `parking_lot::RwLock`.
    pub struct RwLock<T: ?Sized> {
        cell: UnsafeCell<T>,
    }

    impl<T> RwLock<T> {
        /// Wrap a value. No lock state is allocated.
        #[inline]
        pub const fn new(value: T) -> Self {
            Self {
                cell: UnsafeCell::new(value),
            }
        }
    }

    impl<T: ?Sized> RwLock<T> {
        /// "Acquire" a shared guard. Always succeeds immediately.
        #[inline]
        pub fn read(&self) -> RwLockReadGuard<'_, T> {
            RwLockReadGuard { cell: &self.cell }
        }

        /// "Acquire" an exclusive guard. Always succeeds immediately.
        #[inline]
        pub fn write(&self) -> RwLockWriteGuard<'_, T> {
            RwLockWriteGuard { cell: &self.cell }
        }
    }

    impl<T: fmt::Debug> fmt::Debug for RwLock<T> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            // SAFETY: see Mutex::fmt.
            f.debug_tuple("RwLock").field(unsafe { &*self.cell.get() }).finish()
        }
    }

    /// Shared guard for the no-op [`RwLock`].
    pub struct RwLockReadGuard<'a, T: ?Sized> {
        cell: &'a UnsafeCell<T>,
    }

    impl<T: ?Sized> Deref for RwLockReadGuard<'_, T> {
        type Target = T;

        #[inline]
        fn deref(&self) -> &T {
            // SAFETY: no exclusive guard is live for the same cell; see the
            // module contract.
            unsafe { &*self.cell.get() }
        }
    }

    /// Exclusive guard for the no-op [`RwLock`].
    pub struct RwLockWriteGuard<'a, T: ?Sized> {
        cell: &'a UnsafeCell<T>,
    }

    impl<T: ?Sized> Deref for RwLockWriteGuard<'_, T> {
        type Target = T;

        #[inline]
        fn deref(&self) -> &T {
            // SAFETY: this is the only live guard for the cell.
            unsafe { &*self.cell.get() }
        }
    }

    impl<T: ?Sized> DerefMut for RwLockWriteGuard<'_, T> {
        #[inline]
        fn deref_mut(&mut self) -> &mut T {
            // SAFETY: this is the only live guard for the cell.
            unsafe { &mut *self.cell.get() }
        }
    }
}
