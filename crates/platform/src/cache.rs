//! Lazy caching primitive for dispatch tables.
//!
//! [`OnceCache<T>`] is the building block the hash crate's dispatcher sits
//! on: a single `Copy` value, initialised at most once, readable from any
//! thread afterwards.
//!
//! # Caching Strategy
//!
//! - **std**: zero-cost wrapper around `OnceLock<T>`
//! - **no_std with atomics**: atomic state machine over
//!   `UnsafeCell<MaybeUninit<T>>` with spin-wait synchronization
//! - **no_std without atomics**: per-call computation (unavoidable for
//!   single-threaded embedded targets)

#![allow(unsafe_code)] // Atomic state machine over UnsafeCell on no_std.

#[cfg(all(not(feature = "std"), target_has_atomic = "ptr"))]
use core::cell::UnsafeCell;
#[cfg(all(not(feature = "std"), target_has_atomic = "ptr"))]
use core::mem::MaybeUninit;

/// A lazy cache for a single `Copy` value.
///
/// # Example
///
/// ```ignore
/// use platform::cache::OnceCache;
///
/// static ACTIVE: OnceCache<Kernel> = OnceCache::new();
///
/// let kernel = ACTIVE.get_or_init(|| resolve_best_kernel());
/// ```
pub struct OnceCache<T: Copy> {
  #[cfg(feature = "std")]
  inner: std::sync::OnceLock<T>,

  #[cfg(all(not(feature = "std"), target_has_atomic = "ptr"))]
  state: core::sync::atomic::AtomicU8,
  #[cfg(all(not(feature = "std"), target_has_atomic = "ptr"))]
  value: UnsafeCell<MaybeUninit<T>>,

  // PhantomData<*const T> makes this !Send + !Sync on no-atomic targets.
  // Those targets are single-threaded, so the manual Sync impl below is
  // trivially sound.
  #[cfg(all(not(feature = "std"), not(target_has_atomic = "ptr")))]
  _marker: core::marker::PhantomData<*const T>,
}

#[cfg(all(not(feature = "std"), target_has_atomic = "ptr"))]
// SAFETY: the atomic state machine (UNINIT -> INITING -> READY) serialises
// access to the UnsafeCell. Only one thread can win the CAS from UNINIT to
// INITING and it has exclusive write access until it stores READY; all reads
// happen after observing READY with Acquire ordering.
#[allow(unsafe_code)]
unsafe impl<T: Copy + Sync> Sync for OnceCache<T> {}

#[cfg(all(not(feature = "std"), not(target_has_atomic = "ptr")))]
// SAFETY: targets without atomics are single-threaded by definition, so there
// is no concurrent access to synchronise.
#[allow(unsafe_code)]
unsafe impl<T: Copy + Sync> Sync for OnceCache<T> {}

impl<T: Copy> OnceCache<T> {
  #[cfg(all(not(feature = "std"), target_has_atomic = "ptr"))]
  const UNINIT: u8 = 0;
  #[cfg(all(not(feature = "std"), target_has_atomic = "ptr"))]
  const INITING: u8 = 1;
  #[cfg(all(not(feature = "std"), target_has_atomic = "ptr"))]
  const READY: u8 = 2;

  /// Create a new empty cache.
  #[must_use]
  pub const fn new() -> Self {
    Self {
      #[cfg(feature = "std")]
      inner: std::sync::OnceLock::new(),

      #[cfg(all(not(feature = "std"), target_has_atomic = "ptr"))]
      state: core::sync::atomic::AtomicU8::new(Self::UNINIT),
      #[cfg(all(not(feature = "std"), target_has_atomic = "ptr"))]
      value: UnsafeCell::new(MaybeUninit::uninit()),

      #[cfg(all(not(feature = "std"), not(target_has_atomic = "ptr")))]
      _marker: core::marker::PhantomData,
    }
  }

  /// Get the cached value, initializing with `f` if not yet set.
  ///
  /// On targets with atomics this is thread-safe and the initializer runs at
  /// most once. On targets without atomics the initializer runs every call.
  #[inline]
  pub fn get_or_init(&self, f: impl FnOnce() -> T) -> T {
    #[cfg(feature = "std")]
    {
      *self.inner.get_or_init(f)
    }

    #[cfg(all(not(feature = "std"), target_has_atomic = "ptr"))]
    {
      use core::sync::atomic::Ordering;

      // Fast path: already initialised.
      if self.state.load(Ordering::Acquire) == Self::READY {
        // SAFETY: READY is only stored after the value was written, and the
        // Acquire load synchronises with that Release store.
        return unsafe { (*self.value.get()).assume_init() };
      }

      match self
        .state
        .compare_exchange(Self::UNINIT, Self::INITING, Ordering::AcqRel, Ordering::Acquire)
      {
        Ok(_) => {
          let value = f();
          // SAFETY: we won the CAS, so we have exclusive access to the cell
          // until READY is published.
          unsafe { (*self.value.get()).write(value) };
          self.state.store(Self::READY, Ordering::Release);
          value
        }
        Err(_) => {
          // Another thread is initialising (or finished); wait for READY.
          while self.state.load(Ordering::Acquire) != Self::READY {
            core::hint::spin_loop();
          }
          // SAFETY: READY observed with Acquire ordering, so the write to the
          // cell happens-before this read.
          unsafe { (*self.value.get()).assume_init() }
        }
      }
    }

    #[cfg(all(not(feature = "std"), not(target_has_atomic = "ptr")))]
    {
      f()
    }
  }
}

impl<T: Copy> Default for OnceCache<T> {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn initializes_once() {
    static CACHE: OnceCache<u64> = OnceCache::new();

    let a = CACHE.get_or_init(|| 17);
    let b = CACHE.get_or_init(|| 99);
    assert_eq!(a, 17);
    assert_eq!(b, 17);
  }
}
