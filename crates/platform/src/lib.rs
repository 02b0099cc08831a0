//! CPU detection and capability-based dispatch support for hwyhash.
//!
//! This crate is the single source of truth for CPU feature detection across
//! the workspace. Kernels never do ad-hoc detection; they ask this crate.
//!
//! # Core Types
//!
//! - [`Caps`]: what instructions can run on this machine
//! - [`cache::OnceCache`]: the lazy one-time cache dispatchers are built on
//!
//! # Main Entry Point
//!
//! ```ignore
//! let caps = platform::caps();
//!
//! if caps.has(platform::caps::x86::AVX2) {
//!     // Bind the 256-bit kernel
//! }
//! ```
//!
//! # Design
//!
//! 1. **One API**: algorithms query [`caps()`] instead of doing their own
//!    detection.
//! 2. **Zero-cost when possible**: features fixed at compile time are folded
//!    in via `cfg!` and cost nothing at runtime.
//! 3. **Cached otherwise**: runtime detection runs once and is cached in a
//!    `OnceLock` (std) or an atomic state machine (no_std).
//! 4. **Miri-safe**: under Miri, detection reports portable-only caps so no
//!    SIMD intrinsics are ever interpreted.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod cache;
pub mod caps;
mod detect;

pub use caps::{Arch, Bits256, Caps};

/// Get detected CPU capabilities.
///
/// This is the main entry point for capability-based dispatch. The first call
/// performs detection; subsequent calls return the cached result.
#[inline]
#[must_use]
pub fn caps() -> Caps {
  detect::caps()
}

/// Set or clear the capabilities override.
///
/// When set, [`caps()`] returns the override value instead of detecting. This
/// is useful for bare-metal targets without runtime detection support, and
/// for forcing the portable paths in tests. Pass `None` to clear.
///
/// Call this early, before the first call to [`caps()`]; with `std` the
/// detection cache is populated once and an override set afterwards only
/// affects processes that have not yet detected.
#[inline]
pub fn set_caps_override(value: Option<Caps>) {
  detect::set_caps_override(value);
}

/// Check if a caps override is currently set.
#[inline]
#[must_use]
pub fn has_override() -> bool {
  detect::has_override()
}
