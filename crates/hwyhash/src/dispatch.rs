//! One-time kernel resolution.
//!
//! The first call probes CPU capabilities and binds the widest kernel whose
//! requirements the host meets; afterwards every hash call is one cache read
//! and an indirect call. Resolution degrades down an architecture-aware
//! ladder instead of cliff-falling to portable, so a host with SSE4.1 but
//! not AVX2 still gets a vector kernel.

use platform::{Caps, cache::OnceCache};

use crate::kernels::{Kernel, KernelId, kernel, required_caps};

static ACTIVE: OnceCache<Kernel> = OnceCache::new();

#[must_use]
fn resolve(caps: Caps) -> KernelId {
  #[cfg(target_arch = "x86_64")]
  {
    if caps.has(required_caps(KernelId::X86Avx2)) {
      return KernelId::X86Avx2;
    }
    if caps.has(required_caps(KernelId::X86Sse41)) {
      return KernelId::X86Sse41;
    }
  }

  #[cfg(all(target_arch = "aarch64", target_endian = "little"))]
  {
    if caps.has(required_caps(KernelId::Aarch64Neon)) {
      return KernelId::Aarch64Neon;
    }
  }

  let _ = caps;
  KernelId::Portable
}

/// The kernel bound for this process.
#[inline]
#[must_use]
pub(crate) fn active() -> Kernel {
  ACTIVE.get_or_init(|| kernel(resolve(platform::caps())))
}

/// Name of the kernel the dispatcher has bound (e.g. `"x86_64/avx2"`).
#[inline]
#[must_use]
pub fn kernel_name() -> &'static str {
  active().name
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn resolves_to_an_available_kernel() {
    let caps = platform::caps();
    let id = resolve(caps);
    assert!(caps.has(required_caps(id)));
  }

  #[test]
  fn portable_when_no_features() {
    assert_eq!(resolve(Caps::NONE), KernelId::Portable);
  }
}
