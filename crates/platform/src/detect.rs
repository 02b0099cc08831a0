//! Compile-time and runtime CPU detection.
//!
//! The unified [`caps()`] function returns detected capabilities. It layers:
//!
//! - Compile-time detection (`cfg!(target_feature = "...")`)
//! - Runtime detection (CPUID on x86_64, feature macros on aarch64)
//! - One-time caching (`OnceLock` with `std`, atomics without)
//! - A user override for bare metal and tests
//! - A Miri fallback that always reports portable-only caps

#![allow(unsafe_code)] // CPUID/XGETBV intrinsics on the x86_64 runtime path.

use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(not(feature = "std"))]
use crate::caps::Arch;
use crate::caps::{Bits256, Caps};

// ─────────────────────────────────────────────────────────────────────────────
// Compile-time detection
// ─────────────────────────────────────────────────────────────────────────────

/// Returns the capabilities known at compile time.
///
/// Detects features enabled via `-C target-feature=...` or
/// `-C target-cpu=native`. The `cfg!` macro evaluates to a const bool, so the
/// compiler folds this whole function to a constant.
#[inline(always)]
#[must_use]
pub const fn caps_static() -> Caps {
  #[allow(unused_macros)] // Only used on x86_64/aarch64.
  macro_rules! detect {
    ($caps:ident; $($feature:literal => $cap:expr),+ $(,)?) => {
      $(if cfg!(target_feature = $feature) { $caps = $caps.union($cap); })+
    };
  }

  #[allow(unused_mut)]
  let mut bits = Bits256::NONE;

  #[cfg(target_arch = "x86_64")]
  {
    use crate::caps::x86;

    // SSE2 is part of the x86_64 baseline.
    bits = bits.union(x86::SSE2);
    detect!(bits;
      "sse3" => x86::SSE3,
      "ssse3" => x86::SSSE3,
      "sse4.1" => x86::SSE41,
      "sse4.2" => x86::SSE42,
      "avx" => x86::AVX,
      "avx2" => x86::AVX2,
    );
  }

  #[cfg(target_arch = "aarch64")]
  {
    use crate::caps::aarch64;

    // NEON is part of the aarch64 baseline.
    bits = bits.union(aarch64::NEON);
  }

  Caps::new(bits)
}

// ─────────────────────────────────────────────────────────────────────────────
// Runtime detection
// ─────────────────────────────────────────────────────────────────────────────

/// Runtime feature probe for x86_64.
///
/// CPUID reports what the CPU supports, not what the OS allows. AVX state
/// lives in YMM registers the OS must save/restore, so AVX-family bits are
/// gated on OSXSAVE + XGETBV(XCR0) before they are believed. Without this
/// check, executing an AVX instruction could SIGILL even though CPUID
/// advertised it.
#[cfg(all(target_arch = "x86_64", feature = "std", not(miri)))]
fn caps_runtime() -> Bits256 {
  use core::arch::x86_64::{__cpuid, __cpuid_count, _xgetbv};

  use crate::caps::x86;

  // XCR0 bits 1-2: XMM + YMM state must both be OS-managed for AVX.
  const XCR0_AVX_MASK: u64 = 0x6;

  let mut bits = Bits256::NONE;

  // SAFETY: CPUID is always available on x86_64.
  let max_leaf = unsafe { __cpuid(0) }.eax;
  // SAFETY: as above.
  let cpuid1 = unsafe { __cpuid(1) };

  if cpuid1.ecx & (1 << 0) != 0 {
    bits |= x86::SSE3;
  }
  if cpuid1.ecx & (1 << 9) != 0 {
    bits |= x86::SSSE3;
  }
  if cpuid1.ecx & (1 << 19) != 0 {
    bits |= x86::SSE41;
  }
  if cpuid1.ecx & (1 << 20) != 0 {
    bits |= x86::SSE42;
  }

  // OSXSAVE (ecx bit 27) gates XGETBV itself.
  let osxsave = cpuid1.ecx & (1 << 27) != 0;
  let xcr0 = if osxsave {
    // SAFETY: XGETBV is valid when OSXSAVE is set (checked above).
    unsafe { _xgetbv(0) }
  } else {
    0
  };
  let os_avx = (xcr0 & XCR0_AVX_MASK) == XCR0_AVX_MASK;

  if os_avx && cpuid1.ecx & (1 << 28) != 0 {
    bits |= x86::AVX;
  }

  if os_avx && max_leaf >= 7 {
    // SAFETY: leaf 7 exists (max_leaf checked).
    let cpuid7 = unsafe { __cpuid_count(7, 0) };
    if cpuid7.ebx & (1 << 5) != 0 {
      bits |= x86::AVX2;
    }
  }

  bits
}

/// Runtime feature probe for aarch64.
#[cfg(all(target_arch = "aarch64", feature = "std", not(miri)))]
fn caps_runtime() -> Bits256 {
  use crate::caps::aarch64;

  let mut bits = Bits256::NONE;

  if std::arch::is_aarch64_feature_detected!("neon") {
    bits |= aarch64::NEON;
  }

  bits
}

#[cfg(all(
  not(any(target_arch = "x86_64", target_arch = "aarch64")),
  feature = "std",
  not(miri)
))]
fn caps_runtime() -> Bits256 {
  Bits256::NONE
}

fn detect() -> Caps {
  // Under Miri, never report SIMD features: the interpreter cannot execute
  // vendor intrinsics.
  #[cfg(miri)]
  {
    Caps {
      arch: crate::caps::Arch::current(),
      bits: Bits256::NONE,
    }
  }

  #[cfg(not(miri))]
  {
    let static_caps = caps_static();

    #[cfg(feature = "std")]
    {
      static_caps.union(Caps::new(caps_runtime()))
    }

    #[cfg(not(feature = "std"))]
    {
      static_caps
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Override support
// ─────────────────────────────────────────────────────────────────────────────

static OVERRIDE_SET: AtomicBool = AtomicBool::new(false);

#[cfg(feature = "std")]
static OVERRIDE: std::sync::OnceLock<Option<Caps>> = std::sync::OnceLock::new();

#[cfg(not(feature = "std"))]
mod override_storage {
  use core::sync::atomic::{AtomicU64, AtomicU8};

  pub static BITS: [AtomicU64; 4] = [
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
  ];
  pub static ARCH: AtomicU8 = AtomicU8::new(0);
}

#[cfg(not(feature = "std"))]
fn arch_to_u8(arch: Arch) -> u8 {
  match arch {
    Arch::X86_64 => 1,
    Arch::Aarch64 => 2,
    _ => 0,
  }
}

#[cfg(not(feature = "std"))]
fn arch_from_u8(v: u8) -> Arch {
  match v {
    1 => Arch::X86_64,
    2 => Arch::Aarch64,
    _ => Arch::Other,
  }
}

pub fn set_caps_override(value: Option<Caps>) {
  #[cfg(feature = "std")]
  {
    // OnceLock can only be populated once per process; the flag tracks
    // whether the stored value is live.
    let _ = OVERRIDE.set(value);
    OVERRIDE_SET.store(value.is_some(), Ordering::Release);
  }

  #[cfg(not(feature = "std"))]
  {
    match value {
      Some(caps) => {
        override_storage::BITS[0].store(caps.bits.0[0], Ordering::Release);
        override_storage::BITS[1].store(caps.bits.0[1], Ordering::Release);
        override_storage::BITS[2].store(caps.bits.0[2], Ordering::Release);
        override_storage::BITS[3].store(caps.bits.0[3], Ordering::Release);
        override_storage::ARCH.store(arch_to_u8(caps.arch), Ordering::Release);
        OVERRIDE_SET.store(true, Ordering::Release);
      }
      None => {
        OVERRIDE_SET.store(false, Ordering::Release);
      }
    }
  }
}

#[inline]
pub fn has_override() -> bool {
  OVERRIDE_SET.load(Ordering::Acquire)
}

fn get_override() -> Option<Caps> {
  if !OVERRIDE_SET.load(Ordering::Acquire) {
    return None;
  }

  #[cfg(feature = "std")]
  {
    OVERRIDE.get().and_then(|v| *v)
  }

  #[cfg(not(feature = "std"))]
  {
    let bits = Bits256([
      override_storage::BITS[0].load(Ordering::Acquire),
      override_storage::BITS[1].load(Ordering::Acquire),
      override_storage::BITS[2].load(Ordering::Acquire),
      override_storage::BITS[3].load(Ordering::Acquire),
    ]);
    let arch = arch_from_u8(override_storage::ARCH.load(Ordering::Acquire));
    Some(Caps { arch, bits })
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main API
// ─────────────────────────────────────────────────────────────────────────────

#[inline]
#[must_use]
pub fn caps() -> Caps {
  if let Some(caps) = get_override() {
    return caps;
  }

  #[cfg(feature = "std")]
  {
    static CACHE: std::sync::OnceLock<Caps> = std::sync::OnceLock::new();
    *CACHE.get_or_init(detect)
  }

  #[cfg(not(feature = "std"))]
  {
    no_std_cache::get_or_detect(detect)
  }
}

/// no_std detection cache: Bits256 + arch stored in atomics, guarded by the
/// same UNINIT/INITING/READY discipline as `OnceCache`.
#[cfg(not(feature = "std"))]
pub(crate) mod no_std_cache {
  use core::sync::atomic::{AtomicU64, AtomicU8, Ordering};

  use crate::caps::{Bits256, Caps};

  static STATE: AtomicU8 = AtomicU8::new(0);
  static CACHED_BITS: [AtomicU64; 4] = [
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
    AtomicU64::new(0),
  ];
  static CACHED_ARCH: AtomicU8 = AtomicU8::new(0);

  pub(crate) fn get_or_detect(f: fn() -> Caps) -> Caps {
    if STATE.load(Ordering::Acquire) == 2 {
      return load_cached();
    }

    match STATE.compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire) {
      Ok(_) => {
        let caps = f();
        store_cached(caps);
        STATE.store(2, Ordering::Release);
        caps
      }
      Err(1) => {
        while STATE.load(Ordering::Acquire) == 1 {
          core::hint::spin_loop();
        }
        load_cached()
      }
      Err(_) => load_cached(),
    }
  }

  fn load_cached() -> Caps {
    let bits = Bits256([
      CACHED_BITS[0].load(Ordering::Acquire),
      CACHED_BITS[1].load(Ordering::Acquire),
      CACHED_BITS[2].load(Ordering::Acquire),
      CACHED_BITS[3].load(Ordering::Acquire),
    ]);
    let arch = super::arch_from_u8(CACHED_ARCH.load(Ordering::Acquire));
    Caps { arch, bits }
  }

  fn store_cached(caps: Caps) {
    CACHED_BITS[0].store(caps.bits.0[0], Ordering::Release);
    CACHED_BITS[1].store(caps.bits.0[1], Ordering::Release);
    CACHED_BITS[2].store(caps.bits.0[2], Ordering::Release);
    CACHED_BITS[3].store(caps.bits.0[3], Ordering::Release);
    CACHED_ARCH.store(super::arch_to_u8(caps.arch), Ordering::Release);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn static_caps_are_subset_of_detected() {
    let detected = caps();
    if !has_override() {
      assert!(detected.bits.contains(caps_static().bits));
    }
  }

  #[cfg(target_arch = "x86_64")]
  #[test]
  fn x86_64_baseline() {
    use crate::caps::x86;
    assert!(caps_static().has(x86::SSE2));
  }

  #[cfg(target_arch = "aarch64")]
  #[test]
  fn aarch64_baseline() {
    use crate::caps::aarch64;
    assert!(caps_static().has(aarch64::NEON));
  }
}
