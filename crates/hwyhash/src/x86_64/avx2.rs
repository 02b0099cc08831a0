//! AVX2 kernel: the logical 4×u64 vector as a single `__m256i`.
//!
//! AVX2's 256-bit shuffles operate within each 128-bit lane, which is exactly
//! the half-local behaviour the zipper merge and the reduction's lane shift
//! require; only `swap_128_halves` needs a cross-lane permute.

#![allow(unsafe_code)]
#![allow(clippy::inline_always)]

use core::arch::x86_64::*;

use crate::{generic, lanes::Lanes, state::HashState};

// SAFETY invariant for every intrinsic in this module: values of `Avx2` are
// only created inside the `#[target_feature]` entry points below, which the
// dispatcher binds after verifying AVX2 is available.

#[derive(Clone, Copy)]
pub(crate) struct Avx2(__m256i);

impl Lanes for Avx2 {
  #[inline(always)]
  fn load_packet(packet: &[u8; 32]) -> Self {
    // SAFETY: module invariant; 32 readable bytes, unaligned load.
    unsafe { Self(_mm256_loadu_si256(packet.as_ptr().cast())) }
  }

  #[inline(always)]
  fn load_state(lanes: &[u64; 4]) -> Self {
    // SAFETY: module invariant; the state block only guarantees u64
    // alignment, so the load is unaligned.
    unsafe { Self(_mm256_loadu_si256(lanes.as_ptr().cast())) }
  }

  #[inline(always)]
  fn store_state(self, lanes: &mut [u64; 4]) {
    // SAFETY: module invariant; 32 writable bytes, unaligned store.
    unsafe { _mm256_storeu_si256(lanes.as_mut_ptr().cast(), self.0) }
  }

  #[inline(always)]
  fn add(self, rhs: Self) -> Self {
    // SAFETY: module invariant.
    unsafe { Self(_mm256_add_epi64(self.0, rhs.0)) }
  }

  #[inline(always)]
  fn and(self, rhs: Self) -> Self {
    // SAFETY: module invariant.
    unsafe { Self(_mm256_and_si256(self.0, rhs.0)) }
  }

  #[inline(always)]
  fn or(self, rhs: Self) -> Self {
    // SAFETY: module invariant.
    unsafe { Self(_mm256_or_si256(self.0, rhs.0)) }
  }

  #[inline(always)]
  fn xor(self, rhs: Self) -> Self {
    // SAFETY: module invariant.
    unsafe { Self(_mm256_xor_si256(self.0, rhs.0)) }
  }

  #[inline(always)]
  fn shl<const N: i32>(self) -> Self {
    // SAFETY: module invariant.
    unsafe { Self(_mm256_slli_epi64::<N>(self.0)) }
  }

  #[inline(always)]
  fn shr<const N: i32>(self) -> Self {
    // SAFETY: module invariant.
    unsafe { Self(_mm256_srli_epi64::<N>(self.0)) }
  }

  #[inline(always)]
  fn shift_lanes_up_per_half(self) -> Self {
    // Per-128-lane byte shift: moves the lower u64 of each half up.
    // SAFETY: module invariant.
    unsafe { Self(_mm256_slli_si256::<8>(self.0)) }
  }

  #[inline(always)]
  fn rotate_u32_left(self, count: u32) -> Self {
    let c = count & 31;
    // SAFETY: module invariant.
    unsafe {
      let shl = _mm_cvtsi32_si128(c as i32);
      let shr = _mm_cvtsi32_si128(((32 - c) & 31) as i32);
      Self(_mm256_or_si256(
        _mm256_sll_epi32(self.0, shl),
        _mm256_srl_epi32(self.0, shr),
      ))
    }
  }

  #[inline(always)]
  fn rot32(self) -> Self {
    // SAFETY: module invariant.
    unsafe { Self(_mm256_shuffle_epi32::<0b1011_0001>(self.0)) }
  }

  #[inline(always)]
  fn swap_128_halves(self) -> Self {
    // SAFETY: module invariant.
    unsafe { Self(_mm256_permute4x64_epi64::<0b0100_1110>(self.0)) }
  }

  #[inline(always)]
  fn zipper_merge(self) -> Self {
    // SAFETY: module invariant. `_mm256_shuffle_epi8` permutes within each
    // 128-bit lane, which is the required half-local behaviour.
    unsafe {
      let idx = _mm256_setr_epi8(
        3, 12, 2, 5, 14, 1, 15, 0, 11, 4, 10, 13, 9, 6, 8, 7, //
        3, 12, 2, 5, 14, 1, 15, 0, 11, 4, 10, 13, 9, 6, 8, 7,
      );
      Self(_mm256_shuffle_epi8(self.0, idx))
    }
  }

  #[inline(always)]
  fn mul_lo32_hi32(a: Self, b: Self) -> Self {
    // SAFETY: module invariant.
    unsafe { Self(_mm256_mul_epu32(a.0, _mm256_srli_epi64::<32>(b.0))) }
  }

  #[inline(always)]
  fn broadcast_u32(value: u32) -> Self {
    // SAFETY: module invariant.
    unsafe { Self(_mm256_set1_epi32(value as i32)) }
  }

  #[inline(always)]
  fn dup128(lane0: u64, lane1: u64) -> Self {
    // SAFETY: module invariant.
    unsafe {
      Self(_mm256_set_epi64x(
        lane1 as i64,
        lane0 as i64,
        lane1 as i64,
        lane0 as i64,
      ))
    }
  }
}

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn reset(state: &mut HashState, key: &[u64; 4]) {
  generic::reset::<Avx2>(state, key);
}

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn update_packets(state: &mut HashState, packets: &[u8]) {
  generic::update_packets::<Avx2>(state, packets);
}

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn update_remainder(state: &mut HashState, tail: &[u8]) {
  generic::update_remainder::<Avx2>(state, tail);
}

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn finalize64(state: &mut HashState) -> u64 {
  generic::finalize64::<Avx2>(state)
}

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn finalize128(state: &mut HashState) -> [u64; 2] {
  generic::finalize128::<Avx2>(state)
}

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn finalize256(state: &mut HashState) -> [u64; 4] {
  generic::finalize256::<Avx2>(state)
}
