//! The 128-byte hash state record and its initialisation constants.

/// Input packet size consumed by one round of the update function.
pub(crate) const PACKET_LEN: usize = 32;

/// Core hash state: four 4-lane little-endian u64 blocks, laid out as the
/// literal concatenation `v0 ∥ v1 ∥ mul0 ∥ mul1`.
///
/// The layout is `repr(C)` because the record crosses the C ABI unchanged.
/// No particular alignment is required; kernels use unaligned vector
/// loads/stores on this record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C)]
pub struct HashState {
  pub(crate) v0: [u64; 4],
  pub(crate) v1: [u64; 4],
  pub(crate) mul0: [u64; 4],
  pub(crate) mul1: [u64; 4],
}

impl HashState {
  pub(crate) const ZERO: Self = Self {
    v0: [0; 4],
    v1: [0; 4],
    mul0: [0; 4],
    mul1: [0; 4],
  };
}

// First 32 bytes of the fractional parts of pi and e, as in the published
// HighwayHash constants.
pub(crate) const INIT_MUL0: [u64; 4] = [
  0xdbe6_d5d5_fe4c_ce2f,
  0xa409_3822_299f_31d0,
  0x1319_8a2e_0370_7344,
  0x243f_6a88_85a3_08d3,
];

pub(crate) const INIT_MUL1: [u64; 4] = [
  0x3bd3_9e10_cb0e_f593,
  0xc0ac_f169_b5f1_8a8c,
  0xbe54_66cf_34e9_0c6c,
  0x4528_21e6_38d0_1377,
];
