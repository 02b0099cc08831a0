//! Kernel records: one set of entry points per SIMD tier.
//!
//! A [`Kernel`] is a record of function pointers covering the five state
//! operations. The dispatcher resolves the best [`KernelId`] for the running
//! CPU once and hands out the corresponding record; every kernel produces
//! bit-identical digests.

#![allow(unsafe_code)] // Safe wrappers over `#[target_feature]` entry points.

#[cfg(all(target_arch = "aarch64", target_endian = "little"))]
use platform::caps::aarch64;
use platform::caps::Bits256;
#[cfg(target_arch = "x86_64")]
use platform::caps::x86;

use crate::{portable, state::HashState};

pub(crate) type ResetFn = fn(&mut HashState, &[u64; 4]);
pub(crate) type UpdatePacketsFn = fn(&mut HashState, &[u8]);
pub(crate) type UpdateRemainderFn = fn(&mut HashState, &[u8]);
pub(crate) type Finalize64Fn = fn(&mut HashState) -> u64;
pub(crate) type Finalize128Fn = fn(&mut HashState) -> [u64; 2];
pub(crate) type Finalize256Fn = fn(&mut HashState) -> [u64; 4];

#[derive(Clone, Copy)]
pub(crate) struct Kernel {
  pub(crate) id: KernelId,
  pub(crate) reset: ResetFn,
  /// Mix whole 32-byte packets; the length must be a packet multiple.
  pub(crate) update_packets: UpdatePacketsFn,
  /// Mix the trailing 1..=31-byte remainder; runs at most once, at finalize.
  pub(crate) update_remainder: UpdateRemainderFn,
  pub(crate) finalize64: Finalize64Fn,
  pub(crate) finalize128: Finalize128Fn,
  pub(crate) finalize256: Finalize256Fn,
  /// Kernel name for debugging and introspection.
  pub(crate) name: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum KernelId {
  Portable = 0,
  #[cfg(target_arch = "x86_64")]
  X86Sse41 = 1,
  #[cfg(target_arch = "x86_64")]
  X86Avx2 = 2,
  #[cfg(all(target_arch = "aarch64", target_endian = "little"))]
  Aarch64Neon = 3,
}

pub const ALL: &[KernelId] = &[
  KernelId::Portable,
  #[cfg(target_arch = "x86_64")]
  KernelId::X86Sse41,
  #[cfg(target_arch = "x86_64")]
  KernelId::X86Avx2,
  #[cfg(all(target_arch = "aarch64", target_endian = "little"))]
  KernelId::Aarch64Neon,
];

impl KernelId {
  #[inline]
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Portable => "portable",
      #[cfg(target_arch = "x86_64")]
      Self::X86Sse41 => "x86_64/sse4.1",
      #[cfg(target_arch = "x86_64")]
      Self::X86Avx2 => "x86_64/avx2",
      #[cfg(all(target_arch = "aarch64", target_endian = "little"))]
      Self::Aarch64Neon => "aarch64/neon",
    }
  }
}

/// CPU features a kernel needs before it may be bound.
#[inline]
#[must_use]
pub(crate) const fn required_caps(id: KernelId) -> Bits256 {
  match id {
    KernelId::Portable => Bits256::NONE,
    #[cfg(target_arch = "x86_64")]
    KernelId::X86Sse41 => x86::SSE41.union(x86::SSSE3),
    #[cfg(target_arch = "x86_64")]
    KernelId::X86Avx2 => x86::AVX2.union(x86::SSE41).union(x86::SSSE3),
    #[cfg(all(target_arch = "aarch64", target_endian = "little"))]
    KernelId::Aarch64Neon => aarch64::NEON,
  }
}

#[must_use]
pub(crate) fn kernel(id: KernelId) -> Kernel {
  match id {
    KernelId::Portable => Kernel {
      id,
      reset: portable::reset,
      update_packets: portable::update_packets,
      update_remainder: portable::update_remainder,
      finalize64: portable::finalize64,
      finalize128: portable::finalize128,
      finalize256: portable::finalize256,
      name: id.as_str(),
    },
    #[cfg(target_arch = "x86_64")]
    KernelId::X86Sse41 => Kernel {
      id,
      reset: reset_sse41_wrapper,
      update_packets: update_packets_sse41_wrapper,
      update_remainder: update_remainder_sse41_wrapper,
      finalize64: finalize64_sse41_wrapper,
      finalize128: finalize128_sse41_wrapper,
      finalize256: finalize256_sse41_wrapper,
      name: id.as_str(),
    },
    #[cfg(target_arch = "x86_64")]
    KernelId::X86Avx2 => Kernel {
      id,
      reset: reset_avx2_wrapper,
      update_packets: update_packets_avx2_wrapper,
      update_remainder: update_remainder_avx2_wrapper,
      finalize64: finalize64_avx2_wrapper,
      finalize128: finalize128_avx2_wrapper,
      finalize256: finalize256_avx2_wrapper,
      name: id.as_str(),
    },
    #[cfg(all(target_arch = "aarch64", target_endian = "little"))]
    KernelId::Aarch64Neon => Kernel {
      id,
      reset: reset_neon_wrapper,
      update_packets: update_packets_neon_wrapper,
      update_remainder: update_remainder_neon_wrapper,
      finalize64: finalize64_neon_wrapper,
      finalize128: finalize128_neon_wrapper,
      finalize256: finalize256_neon_wrapper,
      name: id.as_str(),
    },
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// x86_64 SSE4.1 wrappers
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(target_arch = "x86_64")]
fn reset_sse41_wrapper(state: &mut HashState, key: &[u64; 4]) {
  // SAFETY: this kernel is only selected when SSE4.1 and SSSE3 are available
  // (checked by dispatch).
  unsafe { crate::x86_64::sse41::reset(state, key) }
}

#[cfg(target_arch = "x86_64")]
fn update_packets_sse41_wrapper(state: &mut HashState, packets: &[u8]) {
  // SAFETY: this kernel is only selected when SSE4.1 and SSSE3 are available
  // (checked by dispatch).
  unsafe { crate::x86_64::sse41::update_packets(state, packets) }
}

#[cfg(target_arch = "x86_64")]
fn update_remainder_sse41_wrapper(state: &mut HashState, tail: &[u8]) {
  // SAFETY: this kernel is only selected when SSE4.1 and SSSE3 are available
  // (checked by dispatch).
  unsafe { crate::x86_64::sse41::update_remainder(state, tail) }
}

#[cfg(target_arch = "x86_64")]
fn finalize64_sse41_wrapper(state: &mut HashState) -> u64 {
  // SAFETY: this kernel is only selected when SSE4.1 and SSSE3 are available
  // (checked by dispatch).
  unsafe { crate::x86_64::sse41::finalize64(state) }
}

#[cfg(target_arch = "x86_64")]
fn finalize128_sse41_wrapper(state: &mut HashState) -> [u64; 2] {
  // SAFETY: this kernel is only selected when SSE4.1 and SSSE3 are available
  // (checked by dispatch).
  unsafe { crate::x86_64::sse41::finalize128(state) }
}

#[cfg(target_arch = "x86_64")]
fn finalize256_sse41_wrapper(state: &mut HashState) -> [u64; 4] {
  // SAFETY: this kernel is only selected when SSE4.1 and SSSE3 are available
  // (checked by dispatch).
  unsafe { crate::x86_64::sse41::finalize256(state) }
}

// ─────────────────────────────────────────────────────────────────────────────
// x86_64 AVX2 wrappers
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(target_arch = "x86_64")]
fn reset_avx2_wrapper(state: &mut HashState, key: &[u64; 4]) {
  // SAFETY: this kernel is only selected when AVX2 is available (checked by
  // dispatch).
  unsafe { crate::x86_64::avx2::reset(state, key) }
}

#[cfg(target_arch = "x86_64")]
fn update_packets_avx2_wrapper(state: &mut HashState, packets: &[u8]) {
  // SAFETY: this kernel is only selected when AVX2 is available (checked by
  // dispatch).
  unsafe { crate::x86_64::avx2::update_packets(state, packets) }
}

#[cfg(target_arch = "x86_64")]
fn update_remainder_avx2_wrapper(state: &mut HashState, tail: &[u8]) {
  // SAFETY: this kernel is only selected when AVX2 is available (checked by
  // dispatch).
  unsafe { crate::x86_64::avx2::update_remainder(state, tail) }
}

#[cfg(target_arch = "x86_64")]
fn finalize64_avx2_wrapper(state: &mut HashState) -> u64 {
  // SAFETY: this kernel is only selected when AVX2 is available (checked by
  // dispatch).
  unsafe { crate::x86_64::avx2::finalize64(state) }
}

#[cfg(target_arch = "x86_64")]
fn finalize128_avx2_wrapper(state: &mut HashState) -> [u64; 2] {
  // SAFETY: this kernel is only selected when AVX2 is available (checked by
  // dispatch).
  unsafe { crate::x86_64::avx2::finalize128(state) }
}

#[cfg(target_arch = "x86_64")]
fn finalize256_avx2_wrapper(state: &mut HashState) -> [u64; 4] {
  // SAFETY: this kernel is only selected when AVX2 is available (checked by
  // dispatch).
  unsafe { crate::x86_64::avx2::finalize256(state) }
}

// ─────────────────────────────────────────────────────────────────────────────
// aarch64 NEON wrappers
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(all(target_arch = "aarch64", target_endian = "little"))]
fn reset_neon_wrapper(state: &mut HashState, key: &[u64; 4]) {
  // SAFETY: this kernel is only selected when NEON is available (checked by
  // dispatch).
  unsafe { crate::aarch64::reset(state, key) }
}

#[cfg(all(target_arch = "aarch64", target_endian = "little"))]
fn update_packets_neon_wrapper(state: &mut HashState, packets: &[u8]) {
  // SAFETY: this kernel is only selected when NEON is available (checked by
  // dispatch).
  unsafe { crate::aarch64::update_packets(state, packets) }
}

#[cfg(all(target_arch = "aarch64", target_endian = "little"))]
fn update_remainder_neon_wrapper(state: &mut HashState, tail: &[u8]) {
  // SAFETY: this kernel is only selected when NEON is available (checked by
  // dispatch).
  unsafe { crate::aarch64::update_remainder(state, tail) }
}

#[cfg(all(target_arch = "aarch64", target_endian = "little"))]
fn finalize64_neon_wrapper(state: &mut HashState) -> u64 {
  // SAFETY: this kernel is only selected when NEON is available (checked by
  // dispatch).
  unsafe { crate::aarch64::finalize64(state) }
}

#[cfg(all(target_arch = "aarch64", target_endian = "little"))]
fn finalize128_neon_wrapper(state: &mut HashState) -> [u64; 2] {
  // SAFETY: this kernel is only selected when NEON is available (checked by
  // dispatch).
  unsafe { crate::aarch64::finalize128(state) }
}

#[cfg(all(target_arch = "aarch64", target_endian = "little"))]
fn finalize256_neon_wrapper(state: &mut HashState) -> [u64; 4] {
  // SAFETY: this kernel is only selected when NEON is available (checked by
  // dispatch).
  unsafe { crate::aarch64::finalize256(state) }
}
