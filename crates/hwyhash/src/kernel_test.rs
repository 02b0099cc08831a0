//! Cross-kernel determinism harness.
//!
//! Every kernel the host can run must produce bit-identical digests for all
//! inputs. This module runs each available kernel over the same input and
//! compares the results; the test suite drives it across a length sweep that
//! crosses every remainder branch.

extern crate alloc;

use alloc::vec::Vec;

use crate::{
  kernels::{ALL, Kernel, KernelId, kernel, required_caps},
  state::{HashState, PACKET_LEN},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelResult {
  pub name: &'static str,
  pub hash64: u64,
  pub hash128: [u64; 2],
  pub hash256: [u64; 4],
}

fn state_with_kernel(k: &Kernel, key: &[u64; 4], data: &[u8]) -> HashState {
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

fn result_with_kernel(id: KernelId, key: &[u64; 4], data: &[u8]) -> KernelResult {
  let k = kernel(id);

  // Finalize mangles the state, so each width gets a fresh pass.
  let mut s64 = state_with_kernel(&k, key, data);
  let mut s128 = state_with_kernel(&k, key, data);
  let mut s256 = state_with_kernel(&k, key, data);

  KernelResult {
    name: k.id.as_str(),
    hash64: (k.finalize64)(&mut s64),
    hash128: (k.finalize128)(&mut s128),
    hash256: (k.finalize256)(&mut s256),
  }
}

/// Hash `data` with every kernel the host CPU can run.
#[must_use]
pub fn run_all_kernels(key: &[u64; 4], data: &[u8]) -> Vec<KernelResult> {
  let caps = platform::caps();
  let mut out = Vec::new();
  for &id in ALL {
    if caps.has(required_caps(id)) {
      out.push(result_with_kernel(id, key, data));
    }
  }
  out
}

/// Check that every available kernel agrees on `data`.
pub fn verify_kernels(key: &[u64; 4], data: &[u8]) -> Result<(), &'static str> {
  let results = run_all_kernels(key, data);
  let Some(first) = results.first() else {
    return Ok(());
  };
  for r in results.iter().skip(1) {
    if r.hash64 != first.hash64 {
      return Err("kernel mismatch on the 64-bit digest");
    }
    if r.hash128 != first.hash128 {
      return Err("kernel mismatch on the 128-bit digest");
    }
    if r.hash256 != first.hash256 {
      return Err("kernel mismatch on the 256-bit digest");
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use alloc::vec;

  use super::*;
  use crate::{FastHash as _, HighwayHash64, HighwayHasher};

  const KEY: [u64; 4] = [
    0x0706_0504_0302_0100,
    0x0f0e_0d0c_0b0a_0908,
    0x1716_1514_1312_1110,
    0x1f1e_1d1c_1b1a_1918,
  ];

  fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
  }

  // Crosses every remainder branch: empty, sub-word tails, the 16-byte
  // boundary, whole packets, and multi-packet inputs with tails.
  const LENS: &[usize] = &[
    0, 1, 2, 3, 4, 5, 7, 8, 12, 15, 16, 17, 20, 24, 31, 32, 33, 47, 48, 63, 64, 65, 96, 127, 128,
    129, 255, 256, 1000,
  ];

  #[test]
  fn all_kernels_agree_across_lengths() {
    for &len in LENS {
      let msg = pattern(len);
      verify_kernels(&KEY, &msg).unwrap_or_else(|e| panic!("len={len}: {e}"));
    }
  }

  #[test]
  fn all_kernels_agree_with_dispatch() {
    let caps = platform::caps();
    for &len in LENS {
      let msg = pattern(len);
      let dispatched = HighwayHash64::hash_with_seed(KEY, &msg);
      for &id in ALL {
        if !caps.has(required_caps(id)) {
          continue;
        }
        let r = result_with_kernel(id, &KEY, &msg);
        assert_eq!(r.hash64, dispatched, "kernel={} len={len}", r.name);
      }
    }
  }

  #[test]
  fn all_resets_are_identical() {
    let caps = platform::caps();
    let reference = {
      let mut state = HashState::ZERO;
      (kernel(KernelId::Portable).reset)(&mut state, &KEY);
      state
    };
    for &id in ALL {
      if !caps.has(required_caps(id)) {
        continue;
      }
      let mut state = HashState::ZERO;
      (kernel(id).reset)(&mut state, &KEY);
      assert_eq!(state, reference, "kernel={}", id.as_str());
    }
  }

  #[test]
  fn streaming_splits_match_every_kernel() {
    let msg = pattern(321);
    let expected = HighwayHash64::hash_with_seed(KEY, &msg);

    for &chunk in &[1usize, 3, 7, 16, 31, 32, 33, 100] {
      let mut h = HighwayHasher::new(&KEY);
      for part in msg.chunks(chunk) {
        h.update(part);
      }
      assert_eq!(h.finalize64(), expected, "chunk={chunk}");
    }

    // Irregular split sequence, including empty slices.
    let splits = vec![0usize, 1, 0, 5, 26, 32, 2, 255];
    let mut h = HighwayHasher::new(&KEY);
    let mut offset = 0;
    for len in splits {
      let end = (offset + len).min(msg.len());
      h.update(&msg[offset..end]);
      offset = end;
    }
    h.update(&msg[offset..]);
    assert_eq!(h.finalize64(), expected);
  }
}
