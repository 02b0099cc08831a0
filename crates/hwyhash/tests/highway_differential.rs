//! Differential tests against the `highway` crate, plus the chunking,
//! key-sensitivity and length-sensitivity properties.

use highway::{HighwayHash as _, HighwayHasher as OracleHasher, Key};
use hwyhash::{HighwayHash64, HighwayHash128, HighwayHash256, HighwayHasher};
use proptest::prelude::*;
use traits::FastHash as _;

fn oracle64(key: [u64; 4], data: &[u8]) -> u64 {
  OracleHasher::new(Key(key)).hash64(data)
}

fn oracle128(key: [u64; 4], data: &[u8]) -> [u64; 2] {
  OracleHasher::new(Key(key)).hash128(data)
}

fn oracle256(key: [u64; 4], data: &[u8]) -> [u64; 4] {
  OracleHasher::new(Key(key)).hash256(data)
}

proptest! {
  #[test]
  fn hash64_matches_highway(key in any::<[u64; 4]>(), data in proptest::collection::vec(any::<u8>(), 0..4096)) {
    prop_assert_eq!(HighwayHash64::hash_with_seed(key, &data), oracle64(key, &data));
  }

  #[test]
  fn hash128_matches_highway(key in any::<[u64; 4]>(), data in proptest::collection::vec(any::<u8>(), 0..2048)) {
    prop_assert_eq!(HighwayHash128::hash_with_seed(key, &data), oracle128(key, &data));
  }

  #[test]
  fn hash256_matches_highway(key in any::<[u64; 4]>(), data in proptest::collection::vec(any::<u8>(), 0..2048)) {
    prop_assert_eq!(HighwayHash256::hash_with_seed(key, &data), oracle256(key, &data));
  }

  #[test]
  fn chunking_never_changes_the_digest(
    key in any::<[u64; 4]>(),
    data in proptest::collection::vec(any::<u8>(), 0..1024),
    cuts in proptest::collection::vec(any::<proptest::sample::Index>(), 0..16),
  ) {
    let mut splits: Vec<usize> = cuts.iter().map(|ix| ix.index(data.len() + 1)).collect();
    splits.sort_unstable();

    let mut h = HighwayHasher::new(&key);
    let mut offset = 0;
    for split in splits {
      h.update(&data[offset..split]);
      offset = split;
    }
    h.update(&data[offset..]);

    prop_assert_eq!(h.finalize64(), HighwayHash64::hash_with_seed(key, &data));
  }
}

#[test]
fn every_key_bit_changes_the_digest() {
  let key = [
    0x0706050403020100,
    0x0F0E0D0C0B0A0908,
    0x1716151413121110,
    0x1F1E1D1C1B1A1918,
  ];
  let data: [u8; 64] = core::array::from_fn(|i| i as u8);
  let baseline = HighwayHash64::hash_with_seed(key, &data);

  for lane in 0..4 {
    for bit in 0..64 {
      let mut flipped = key;
      flipped[lane] ^= 1u64 << bit;
      assert_ne!(
        HighwayHash64::hash_with_seed(flipped, &data),
        baseline,
        "flipping key lane {lane} bit {bit} left the digest unchanged"
      );
    }
  }
}

#[test]
fn appending_a_zero_byte_changes_the_digest() {
  let key = [1u64, 2, 3, 4];
  let data: Vec<u8> = (0..128).map(|i| (i * 7 + 3) as u8).collect();

  for n in 0..data.len() {
    let base = HighwayHash64::hash_with_seed(key, &data[..n]);
    let mut extended = data[..n].to_vec();
    extended.push(0);
    assert_ne!(
      HighwayHash64::hash_with_seed(key, &extended),
      base,
      "length {n}"
    );
  }
}

#[test]
fn oracle_agrees_on_remainder_boundary_lengths() {
  // The tail handling branches at 4-byte words, the 16-byte midpoint and the
  // packet size; pin each boundary against the oracle.
  let key = [0xdead_beef_u64, 0xbad_c0de, 42, 7];
  let data: Vec<u8> = (0..256).map(|i| (i ^ 0x5a) as u8).collect();

  for n in [
    0usize, 1, 2, 3, 4, 5, 7, 8, 12, 15, 16, 17, 19, 20, 28, 31, 32, 33, 47, 48, 63, 64, 65, 96,
    127, 128, 129, 255, 256,
  ] {
    assert_eq!(
      HighwayHash64::hash_with_seed(key, &data[..n]),
      oracle64(key, &data[..n]),
      "length {n}"
    );
    assert_eq!(
      HighwayHash256::hash_with_seed(key, &data[..n]),
      oracle256(key, &data[..n]),
      "length {n} (256)"
    );
  }
}
