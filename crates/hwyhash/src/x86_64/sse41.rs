//! SSE4.1 kernel: the logical 4×u64 vector as a pair of `__m128i`.
//!
//! All lane operations are 128-bit-half-local in the algorithm (zipper merge,
//! the reduction's lane shift, the finalize permute's intra-lane rotate), so
//! the two registers never exchange bytes except in `swap_128_halves`, which
//! is a register swap and therefore free.

#![allow(unsafe_code)]
#![allow(clippy::inline_always)]

use core::arch::x86_64::*;

use crate::{generic, lanes::Lanes, state::HashState};

// SAFETY invariant for every intrinsic in this module: values of `Sse41` are
// only created inside the `#[target_feature]` entry points below, which the
// dispatcher binds after verifying SSE4.1 and SSSE3 are available.

#[derive(Clone, Copy)]
pub(crate) struct Sse41(__m128i, __m128i);

#[inline(always)]
fn zipper_index() -> __m128i {
  // Output byte i takes input byte index[i], within each 16-byte half.
  // SAFETY: module invariant above.
  unsafe { _mm_setr_epi8(3, 12, 2, 5, 14, 1, 15, 0, 11, 4, 10, 13, 9, 6, 8, 7) }
}

impl Lanes for Sse41 {
  #[inline(always)]
  fn load_packet(packet: &[u8; 32]) -> Self {
    // SAFETY: module invariant; `packet` covers 32 readable bytes and the
    // loads are unaligned.
    unsafe {
      Self(
        _mm_loadu_si128(packet.as_ptr().cast()),
        _mm_loadu_si128(packet.as_ptr().add(16).cast()),
      )
    }
  }

  #[inline(always)]
  fn load_state(lanes: &[u64; 4]) -> Self {
    // SAFETY: module invariant; the state block only guarantees u64
    // alignment, so the loads are unaligned.
    unsafe {
      Self(
        _mm_loadu_si128(lanes.as_ptr().cast()),
        _mm_loadu_si128(lanes.as_ptr().add(2).cast()),
      )
    }
  }

  #[inline(always)]
  fn store_state(self, lanes: &mut [u64; 4]) {
    // SAFETY: module invariant; 32 writable bytes, unaligned stores.
    unsafe {
      _mm_storeu_si128(lanes.as_mut_ptr().cast(), self.0);
      _mm_storeu_si128(lanes.as_mut_ptr().add(2).cast(), self.1);
    }
  }

  #[inline(always)]
  fn add(self, rhs: Self) -> Self {
    // SAFETY: module invariant.
    unsafe {
      Self(
        _mm_add_epi64(self.0, rhs.0),
        _mm_add_epi64(self.1, rhs.1),
      )
    }
  }

  #[inline(always)]
  fn and(self, rhs: Self) -> Self {
    // SAFETY: module invariant.
    unsafe { Self(_mm_and_si128(self.0, rhs.0), _mm_and_si128(self.1, rhs.1)) }
  }

  #[inline(always)]
  fn or(self, rhs: Self) -> Self {
    // SAFETY: module invariant.
    unsafe { Self(_mm_or_si128(self.0, rhs.0), _mm_or_si128(self.1, rhs.1)) }
  }

  #[inline(always)]
  fn xor(self, rhs: Self) -> Self {
    // SAFETY: module invariant.
    unsafe { Self(_mm_xor_si128(self.0, rhs.0), _mm_xor_si128(self.1, rhs.1)) }
  }

  #[inline(always)]
  fn shl<const N: i32>(self) -> Self {
    // SAFETY: module invariant.
    unsafe { Self(_mm_slli_epi64::<N>(self.0), _mm_slli_epi64::<N>(self.1)) }
  }

  #[inline(always)]
  fn shr<const N: i32>(self) -> Self {
    // SAFETY: module invariant.
    unsafe { Self(_mm_srli_epi64::<N>(self.0), _mm_srli_epi64::<N>(self.1)) }
  }

  #[inline(always)]
  fn shift_lanes_up_per_half(self) -> Self {
    // A whole-register byte shift moves the lower lane up within each half.
    // SAFETY: module invariant.
    unsafe { Self(_mm_slli_si128::<8>(self.0), _mm_slli_si128::<8>(self.1)) }
  }

  #[inline(always)]
  fn rotate_u32_left(self, count: u32) -> Self {
    let c = count & 31;
    // SAFETY: module invariant.
    unsafe {
      let shl = _mm_cvtsi32_si128(c as i32);
      let shr = _mm_cvtsi32_si128(((32 - c) & 31) as i32);
      let rot = |v: __m128i| _mm_or_si128(_mm_sll_epi32(v, shl), _mm_srl_epi32(v, shr));
      Self(rot(self.0), rot(self.1))
    }
  }

  #[inline(always)]
  fn rot32(self) -> Self {
    // SAFETY: module invariant.
    unsafe {
      Self(
        _mm_shuffle_epi32::<0b1011_0001>(self.0),
        _mm_shuffle_epi32::<0b1011_0001>(self.1),
      )
    }
  }

  #[inline(always)]
  fn swap_128_halves(self) -> Self {
    Self(self.1, self.0)
  }

  #[inline(always)]
  fn zipper_merge(self) -> Self {
    let idx = zipper_index();
    // SAFETY: module invariant.
    unsafe {
      Self(
        _mm_shuffle_epi8(self.0, idx),
        _mm_shuffle_epi8(self.1, idx),
      )
    }
  }

  #[inline(always)]
  fn mul_lo32_hi32(a: Self, b: Self) -> Self {
    // `_mm_mul_epu32` multiplies the low 32 bits of each u64 lane, so shift
    // `b`'s high halves down first.
    // SAFETY: module invariant.
    unsafe {
      Self(
        _mm_mul_epu32(a.0, _mm_srli_epi64::<32>(b.0)),
        _mm_mul_epu32(a.1, _mm_srli_epi64::<32>(b.1)),
      )
    }
  }

  #[inline(always)]
  fn broadcast_u32(value: u32) -> Self {
    // SAFETY: module invariant.
    unsafe {
      let v = _mm_set1_epi32(value as i32);
      Self(v, v)
    }
  }

  #[inline(always)]
  fn dup128(lane0: u64, lane1: u64) -> Self {
    // SAFETY: module invariant.
    unsafe {
      let v = _mm_set_epi64x(lane1 as i64, lane0 as i64);
      Self(v, v)
    }
  }
}

#[target_feature(enable = "sse4.1,ssse3")]
pub(crate) unsafe fn reset(state: &mut HashState, key: &[u64; 4]) {
  generic::reset::<Sse41>(state, key);
}

#[target_feature(enable = "sse4.1,ssse3")]
pub(crate) unsafe fn update_packets(state: &mut HashState, packets: &[u8]) {
  generic::update_packets::<Sse41>(state, packets);
}

#[target_feature(enable = "sse4.1,ssse3")]
pub(crate) unsafe fn update_remainder(state: &mut HashState, tail: &[u8]) {
  generic::update_remainder::<Sse41>(state, tail);
}

#[target_feature(enable = "sse4.1,ssse3")]
pub(crate) unsafe fn finalize64(state: &mut HashState) -> u64 {
  generic::finalize64::<Sse41>(state)
}

#[target_feature(enable = "sse4.1,ssse3")]
pub(crate) unsafe fn finalize128(state: &mut HashState) -> [u64; 2] {
  generic::finalize128::<Sse41>(state)
}

#[target_feature(enable = "sse4.1,ssse3")]
pub(crate) unsafe fn finalize256(state: &mut HashState) -> [u64; 4] {
  generic::finalize256::<Sse41>(state)
}
