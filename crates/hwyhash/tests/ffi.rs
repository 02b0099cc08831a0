//! C-ABI parity with the Rust API, including finalize purity.

#![allow(unsafe_code)]

use core::mem::MaybeUninit;

use hwyhash::{HighwayHash64, HighwayHash128, HighwayHash256, HighwayHasher, ffi};
use traits::FastHash as _;

const KEY: [u64; 4] = [
  0x0706050403020100,
  0x0F0E0D0C0B0A0908,
  0x1716151413121110,
  0x1F1E1D1C1B1A1918,
];

fn pattern(len: usize) -> Vec<u8> {
  (0..len).map(|i| (i % 251) as u8).collect()
}

/// Reset an uninitialised state through the C entry point, as a C caller
/// would.
fn reset_state() -> HighwayHasher {
  let mut state = MaybeUninit::<HighwayHasher>::uninit();
  unsafe {
    ffi::hwyhash_reset(state.as_mut_ptr(), KEY.as_ptr());
    state.assume_init()
  }
}

#[test]
fn oneshot_entry_points_match_rust_api() {
  for len in [0usize, 1, 31, 32, 33, 64, 1000] {
    let data = pattern(len);

    let h64 = unsafe { ffi::hwyhash_hash64(data.as_ptr(), data.len(), KEY.as_ptr()) };
    assert_eq!(h64, HighwayHash64::hash_with_seed(KEY, &data), "length {len}");

    let mut h128 = [0u64; 2];
    unsafe { ffi::hwyhash_hash128(data.as_ptr(), data.len(), KEY.as_ptr(), h128.as_mut_ptr()) };
    assert_eq!(h128, HighwayHash128::hash_with_seed(KEY, &data), "length {len}");

    let mut h256 = [0u64; 4];
    unsafe { ffi::hwyhash_hash256(data.as_ptr(), data.len(), KEY.as_ptr(), h256.as_mut_ptr()) };
    assert_eq!(h256, HighwayHash256::hash_with_seed(KEY, &data), "length {len}");
  }
}

#[test]
fn streaming_through_the_abi_buffers_chunks() {
  let data = pattern(777);
  let expected = HighwayHash64::hash_with_seed(KEY, &data);

  for chunk in [1usize, 5, 31, 32, 33, 100] {
    let mut state = reset_state();
    for part in data.chunks(chunk) {
      unsafe { ffi::hwyhash_update(&mut state, part.as_ptr(), part.len()) };
    }
    assert_eq!(unsafe { ffi::hwyhash_finalize64(&mut state) }, expected, "chunk {chunk}");
  }
}

#[test]
fn update_accepts_null_for_empty_input() {
  let mut state = reset_state();
  unsafe { ffi::hwyhash_update(&mut state, core::ptr::null(), 0) };
  assert_eq!(
    unsafe { ffi::hwyhash_finalize64(&mut state) },
    HighwayHash64::hash_with_seed(KEY, b"")
  );
}

#[test]
fn finalize_writes_only_the_declared_output() {
  let data = pattern(100);

  // Canary words on both sides of the real output slots.
  let mut out = [0xa5a5_a5a5_a5a5_a5a5_u64; 6];

  let mut state = reset_state();
  unsafe {
    ffi::hwyhash_update(&mut state, data.as_ptr(), data.len());
    ffi::hwyhash_finalize128(&mut state, out[1..3].as_mut_ptr());
  }
  assert_eq!(out[0], 0xa5a5_a5a5_a5a5_a5a5);
  assert_eq!([out[1], out[2]], HighwayHash128::hash_with_seed(KEY, &data));
  assert_eq!(out[3], 0xa5a5_a5a5_a5a5_a5a5);

  let mut out = [0x5a5a_5a5a_5a5a_5a5a_u64; 6];
  let mut state = reset_state();
  unsafe {
    ffi::hwyhash_update(&mut state, data.as_ptr(), data.len());
    ffi::hwyhash_finalize256(&mut state, out[1..5].as_mut_ptr());
  }
  assert_eq!(out[0], 0x5a5a_5a5a_5a5a_5a5a);
  assert_eq!(
    [out[1], out[2], out[3], out[4]],
    HighwayHash256::hash_with_seed(KEY, &data)
  );
  assert_eq!(out[5], 0x5a5a_5a5a_5a5a_5a5a);
}

#[test]
fn state_layout_has_the_stable_prefix() {
  // The first 128 bytes of the C state are the v0∥v1∥mul0∥mul1 record; the
  // tail buffer and its counter follow. Guard the overall size so the
  // header's struct cannot drift from the Rust layout.
  assert!(core::mem::size_of::<HighwayHasher>() >= 128 + 32 + core::mem::size_of::<usize>());
  assert_eq!(core::mem::align_of::<HighwayHasher>(), core::mem::align_of::<u64>());
}
