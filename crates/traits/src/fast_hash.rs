//! Fast non-cryptographic hash traits (**NOT CRYPTO**).

use core::fmt::Debug;

/// A fast keyed, non-cryptographic hash.
///
/// These hashes are suitable for hash tables, sharding, fingerprints, and
/// other settings where the key is secret but no formal MAC security proof is
/// required. They are **not** suitable for signatures, password hashing, or
/// settings that demand collision resistance against adaptive adversaries.
///
/// This trait is intentionally one-shot. Streaming APIs for fast hashes often
/// require algorithm-specific buffering and are exposed as concrete types.
pub trait FastHash {
  /// Output size in bytes.
  const OUTPUT_SIZE: usize;

  /// Hash output type (typically `u64` or a small `[u64; N]`).
  type Output: Copy + Eq + Debug + Default;

  /// Seed type. For keyed hashes this is the key (e.g. `[u64; 4]`).
  type Seed: Copy + Debug + Default;

  /// Compute the hash of `data` using a default (all-zero) seed.
  #[inline]
  #[must_use]
  fn hash(data: &[u8]) -> Self::Output {
    Self::hash_with_seed(Self::Seed::default(), data)
  }

  /// Compute the hash of `data` using `seed`.
  #[must_use]
  fn hash_with_seed(seed: Self::Seed, data: &[u8]) -> Self::Output;
}
