//! SIMD-accelerated HighwayHash (**NOT CRYPTO**).
//!
//! HighwayHash is a *keyed* hash producing 64-, 128-, or 256-bit digests,
//! designed around multiply-and-permute mixing that vectorises well. This
//! implementation is byte-for-byte compatible with the reference HighwayHash
//! of Alakuijala, Cox and Wassenberg on every kernel tier.
//!
//! It is not a MAC with a formal security proof; use it for fingerprints,
//! sharding and hash tables, not for signatures or password hashing.
//!
//! # Kernels
//!
//! The algorithm runs over four logical u64 lanes. At first use, a CPU
//! capability probe binds the widest correct kernel for this host
//! (AVX2, SSE4.1 or NEON, with a portable scalar fallback); all kernels
//! produce identical digests. [`kernel_name()`] reports the bound kernel.
//!
//! # Example
//!
//! ```
//! use hwyhash::{HighwayHash64, HighwayHasher};
//! use traits::FastHash as _;
//!
//! let key = [1u64, 2, 3, 4];
//!
//! // One-shot.
//! let digest = HighwayHash64::hash_with_seed(key, b"hello");
//!
//! // Streaming; chunk boundaries never change the digest.
//! let mut hasher = HighwayHasher::new(&key);
//! hasher.update(b"he");
//! hasher.update(b"llo");
//! assert_eq!(hasher.finalize64(), digest);
//! ```
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

mod dispatch;
mod generic;
mod kernels;
mod lanes;
mod portable;
mod state;

#[cfg(all(target_arch = "aarch64", target_endian = "little"))]
mod aarch64;
#[cfg(target_arch = "x86_64")]
mod x86_64;

pub mod ffi;
#[cfg(feature = "std")]
#[doc(hidden)]
pub mod kernel_test;

pub use dispatch::kernel_name;
pub use traits::FastHash;

use crate::{
  kernels::Kernel,
  state::{HashState, PACKET_LEN},
};

/// Streaming HighwayHash hasher.
///
/// Sub-packet input is buffered, so any sequence of [`update`](Self::update)
/// calls over the same concatenated bytes yields the same digest. Finalizing
/// mangles the state beyond reuse, so the `finalize*` methods consume the
/// hasher; hash the same key again with [`new`](Self::new).
#[derive(Clone)]
#[repr(C)]
pub struct HighwayHasher {
  state: HashState,
  tail: [u8; PACKET_LEN],
  tail_len: usize,
}

#[allow(clippy::indexing_slicing)] // Tail-buffer arithmetic is bounds-evident.
impl HighwayHasher {
  /// Create a hasher for a 256-bit key (four little-endian u64 lanes).
  #[must_use]
  pub fn new(key: &[u64; 4]) -> Self {
    let mut state = HashState::ZERO;
    (dispatch::active().reset)(&mut state, key);
    Self {
      state,
      tail: [0; PACKET_LEN],
      tail_len: 0,
    }
  }

  /// Append bytes. Chunk sizes are arbitrary; only the concatenation counts.
  pub fn update(&mut self, mut data: &[u8]) {
    let k = dispatch::active();

    if self.tail_len > 0 {
      let take = (PACKET_LEN - self.tail_len).min(data.len());
      self.tail[self.tail_len..self.tail_len + take].copy_from_slice(&data[..take]);
      self.tail_len += take;
      data = &data[take..];

      if self.tail_len < PACKET_LEN {
        return;
      }
      (k.update_packets)(&mut self.state, &self.tail);
      self.tail_len = 0;
    }

    let split = data.len() - data.len() % PACKET_LEN;
    let (packets, rest) = data.split_at(split);
    if !packets.is_empty() {
      (k.update_packets)(&mut self.state, packets);
    }
    if !rest.is_empty() {
      self.tail[..rest.len()].copy_from_slice(rest);
      self.tail_len = rest.len();
    }
  }

  /// Finalize to a 64-bit digest.
  #[must_use]
  pub fn finalize64(mut self) -> u64 {
    self.finalize64_in_place()
  }

  /// Finalize to a 128-bit digest; `[0]` is the low half.
  #[must_use]
  pub fn finalize128(mut self) -> [u64; 2] {
    self.finalize128_in_place()
  }

  /// Finalize to a 256-bit digest.
  #[must_use]
  pub fn finalize256(mut self) -> [u64; 4] {
    self.finalize256_in_place()
  }

  fn drain_tail(&mut self, k: &Kernel) {
    if self.tail_len > 0 {
      (k.update_remainder)(&mut self.state, &self.tail[..self.tail_len]);
      self.tail_len = 0;
    }
  }

  pub(crate) fn finalize64_in_place(&mut self) -> u64 {
    let k = dispatch::active();
    self.drain_tail(&k);
    (k.finalize64)(&mut self.state)
  }

  pub(crate) fn finalize128_in_place(&mut self) -> [u64; 2] {
    let k = dispatch::active();
    self.drain_tail(&k);
    (k.finalize128)(&mut self.state)
  }

  pub(crate) fn finalize256_in_place(&mut self) -> [u64; 4] {
    let k = dispatch::active();
    self.drain_tail(&k);
    (k.finalize256)(&mut self.state)
  }
}

/// One-shot path: no tail buffering, the remainder goes straight from the
/// input slice into the remainder round.
fn one_shot_state(key: &[u64; 4], data: &[u8]) -> HashState {
  let k = dispatch::active();
  let mut state = HashState::ZERO;
  (k.reset)(&mut state, key);

  let split = data.len() - data.len() % PACKET_LEN;
  let (packets, tail) = data.split_at(split);
  if !packets.is_empty() {
    (k.update_packets)(&mut state, packets);
  }
  if !tail.is_empty() {
    (k.update_remainder)(&mut state, tail);
  }
  state
}

/// One-shot 64-bit HighwayHash.
#[derive(Clone, Default)]
pub struct HighwayHash64;

/// One-shot 128-bit HighwayHash.
#[derive(Clone, Default)]
pub struct HighwayHash128;

/// One-shot 256-bit HighwayHash.
#[derive(Clone, Default)]
pub struct HighwayHash256;

impl FastHash for HighwayHash64 {
  const OUTPUT_SIZE: usize = 8;
  type Output = u64;
  type Seed = [u64; 4];

  #[inline]
  fn hash_with_seed(seed: Self::Seed, data: &[u8]) -> Self::Output {
    let mut state = one_shot_state(&seed, data);
    (dispatch::active().finalize64)(&mut state)
  }
}

impl FastHash for HighwayHash128 {
  const OUTPUT_SIZE: usize = 16;
  type Output = [u64; 2];
  type Seed = [u64; 4];

  #[inline]
  fn hash_with_seed(seed: Self::Seed, data: &[u8]) -> Self::Output {
    let mut state = one_shot_state(&seed, data);
    (dispatch::active().finalize128)(&mut state)
  }
}

impl FastHash for HighwayHash256 {
  const OUTPUT_SIZE: usize = 32;
  type Output = [u64; 4];
  type Seed = [u64; 4];

  #[inline]
  fn hash_with_seed(seed: Self::Seed, data: &[u8]) -> Self::Output {
    let mut state = one_shot_state(&seed, data);
    (dispatch::active().finalize256)(&mut state)
  }
}
