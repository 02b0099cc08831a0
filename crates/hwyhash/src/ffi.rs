//! C ABI.
//!
//! The exported functions mirror the streaming core plus one-shot helpers;
//! `include/hwyhash.h` at the repository root declares them for C callers.
//! The state a C caller allocates is [`HighwayHasher`]: the 128-byte
//! `v0 ∥ v1 ∥ mul0 ∥ mul1` record as a stable prefix, followed by the 32-byte
//! tail buffer and its fill count. Because the tail buffer crosses the ABI,
//! `hwyhash_update` is associative over arbitrary chunkings for C callers
//! too.
//!
//! # Pointer contract
//!
//! All pointers must be non-null and valid for the accesses implied by their
//! types; `key` and `hash` must be u64-aligned; `bytes` may have any
//! alignment; the state must not alias `bytes`, `key`, or `hash`. After a
//! finalize call the state is unspecified — reset before reuse.

#![allow(unsafe_code)]

use crate::{FastHash as _, HighwayHash64, HighwayHash128, HighwayHash256, HighwayHasher};

#[inline]
unsafe fn input<'a>(bytes: *const u8, len: usize) -> &'a [u8] {
  if len == 0 {
    // A zero-length input permits a null or dangling pointer.
    &[]
  } else {
    debug_assert!(!bytes.is_null());
    // SAFETY: caller contract; `bytes` covers `len` readable bytes.
    unsafe { core::slice::from_raw_parts(bytes, len) }
  }
}

/// Initialise `state` from a 4×u64 key.
///
/// # Safety
///
/// `state` must be valid for writes (it may be uninitialised) and `key` must
/// point to 4 readable u64s.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hwyhash_reset(state: *mut HighwayHasher, key: *const u64) {
  debug_assert!(!state.is_null() && !key.is_null());
  // SAFETY: caller contract; `key` points to 4 u64s.
  let key = unsafe { &*key.cast::<[u64; 4]>() };
  // SAFETY: caller contract; `state` is valid for writes and the type has no
  // drop glue, so overwriting uninitialised memory is fine.
  unsafe { state.write(HighwayHasher::new(key)) }
}

/// Append `len` bytes to the stream.
///
/// # Safety
///
/// `state` must hold a reset state, and `bytes` must cover `len` readable
/// bytes (it may be null when `len` is 0).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hwyhash_update(state: *mut HighwayHasher, bytes: *const u8, len: usize) {
  debug_assert!(!state.is_null());
  // SAFETY: caller contract.
  let state = unsafe { &mut *state };
  // SAFETY: caller contract.
  let data = unsafe { input(bytes, len) };
  state.update(data);
}

/// Finalize to a 64-bit digest. The state is unspecified afterwards.
///
/// # Safety
///
/// `state` must hold a reset state.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hwyhash_finalize64(state: *mut HighwayHasher) -> u64 {
  debug_assert!(!state.is_null());
  // SAFETY: caller contract.
  let state = unsafe { &mut *state };
  state.finalize64_in_place()
}

/// Finalize to a 128-bit digest, written as 2 u64s (`hash[0]` is the low
/// half). The state is unspecified afterwards.
///
/// # Safety
///
/// `state` must hold a reset state and `hash` must point to 2 writable u64s
/// that do not alias the state.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hwyhash_finalize128(state: *mut HighwayHasher, hash: *mut u64) {
  debug_assert!(!state.is_null() && !hash.is_null());
  // SAFETY: caller contract.
  let state = unsafe { &mut *state };
  let out = state.finalize128_in_place();
  // SAFETY: caller contract; `hash` covers 2 writable u64s.
  unsafe { core::ptr::copy_nonoverlapping(out.as_ptr(), hash, 2) }
}

/// Finalize to a 256-bit digest, written as 4 u64s. The state is unspecified
/// afterwards.
///
/// # Safety
///
/// `state` must hold a reset state and `hash` must point to 4 writable u64s
/// that do not alias the state.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hwyhash_finalize256(state: *mut HighwayHasher, hash: *mut u64) {
  debug_assert!(!state.is_null() && !hash.is_null());
  // SAFETY: caller contract.
  let state = unsafe { &mut *state };
  let out = state.finalize256_in_place();
  // SAFETY: caller contract; `hash` covers 4 writable u64s.
  unsafe { core::ptr::copy_nonoverlapping(out.as_ptr(), hash, 4) }
}

/// One-shot 64-bit hash of `len` bytes.
///
/// # Safety
///
/// `bytes` must cover `len` readable bytes (null allowed when `len` is 0)
/// and `key` must point to 4 readable u64s.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hwyhash_hash64(bytes: *const u8, len: usize, key: *const u64) -> u64 {
  debug_assert!(!key.is_null());
  // SAFETY: caller contract.
  let key = unsafe { *key.cast::<[u64; 4]>() };
  // SAFETY: caller contract.
  let data = unsafe { input(bytes, len) };
  HighwayHash64::hash_with_seed(key, data)
}

/// One-shot 128-bit hash of `len` bytes, written as 2 u64s.
///
/// # Safety
///
/// As [`hwyhash_hash64`], plus `hash` must point to 2 writable u64s.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hwyhash_hash128(bytes: *const u8, len: usize, key: *const u64, hash: *mut u64) {
  debug_assert!(!key.is_null() && !hash.is_null());
  // SAFETY: caller contract.
  let key = unsafe { *key.cast::<[u64; 4]>() };
  // SAFETY: caller contract.
  let data = unsafe { input(bytes, len) };
  let out = HighwayHash128::hash_with_seed(key, data);
  // SAFETY: caller contract; `hash` covers 2 writable u64s.
  unsafe { core::ptr::copy_nonoverlapping(out.as_ptr(), hash, 2) }
}

/// One-shot 256-bit hash of `len` bytes, written as 4 u64s.
///
/// # Safety
///
/// As [`hwyhash_hash64`], plus `hash` must point to 4 writable u64s.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hwyhash_hash256(bytes: *const u8, len: usize, key: *const u64, hash: *mut u64) {
  debug_assert!(!key.is_null() && !hash.is_null());
  // SAFETY: caller contract.
  let key = unsafe { *key.cast::<[u64; 4]>() };
  // SAFETY: caller contract.
  let data = unsafe { input(bytes, len) };
  let out = HighwayHash256::hash_with_seed(key, data);
  // SAFETY: caller contract; `hash` covers 4 writable u64s.
  unsafe { core::ptr::copy_nonoverlapping(out.as_ptr(), hash, 4) }
}
