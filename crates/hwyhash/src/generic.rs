//! The hash algorithm, written once over the lane abstraction.
//!
//! Everything here is `#[inline(always)]` so that per-ISA entry points (which
//! carry `#[target_feature]`) fold the whole algorithm into a single
//! vectorised function body.

#![allow(clippy::indexing_slicing)] // Tight fixed-size packet parsing.

use crate::{
  lanes::Lanes,
  state::{HashState, INIT_MUL0, INIT_MUL1, PACKET_LEN},
};

/// Initialise the state from a 256-bit key.
///
/// `v0` is the key xored with the first constant block; `v1` is the key with
/// each lane's 32-bit halves exchanged, xored with the second block.
#[inline(always)]
pub(crate) fn reset<V: Lanes>(state: &mut HashState, key: &[u64; 4]) {
  let mul0 = V::load_state(&INIT_MUL0);
  let mul1 = V::load_state(&INIT_MUL1);
  let key_v = V::load_state(key);

  let v0 = key_v.xor(mul0);
  let v1 = key_v.rot32().xor(mul1);

  v0.store_state(&mut state.v0);
  v1.store_state(&mut state.v1);
  mul0.store_state(&mut state.mul0);
  mul1.store_state(&mut state.mul1);
}

/// One round of the mixing function with packet `a`.
#[inline(always)]
fn update<V: Lanes>(v0: &mut V, v1: &mut V, mul0: &mut V, mul1: &mut V, a: V) {
  *v1 = v1.add(mul0.add(a));
  *mul0 = mul0.xor(V::mul_lo32_hi32(*v1, *v0));
  *v0 = v0.add(*mul1);
  *mul1 = mul1.xor(V::mul_lo32_hi32(*v0, *v1));
  *v0 = v0.add(v1.zipper_merge());
  *v1 = v1.add(v0.zipper_merge());
}

/// Mix whole 32-byte packets into the state. `packets.len()` must be a
/// multiple of the packet size.
#[inline(always)]
pub(crate) fn update_packets<V: Lanes>(state: &mut HashState, packets: &[u8]) {
  debug_assert_eq!(packets.len() % PACKET_LEN, 0);

  let mut v0 = V::load_state(&state.v0);
  let mut v1 = V::load_state(&state.v1);
  let mut mul0 = V::load_state(&state.mul0);
  let mut mul1 = V::load_state(&state.mul1);

  let (chunks, rest) = packets.as_chunks::<PACKET_LEN>();
  debug_assert!(rest.is_empty());
  for chunk in chunks {
    update(&mut v0, &mut v1, &mut mul0, &mut mul1, V::load_packet(chunk));
  }

  v0.store_state(&mut state.v0);
  v1.store_state(&mut state.v1);
  mul0.store_state(&mut state.mul0);
  mul1.store_state(&mut state.mul1);
}

/// Build the padded 32-byte packet for a trailing `1..=31`-byte remainder.
///
/// The first `len & !3` bytes are copied verbatim. For remainders of 16 bytes
/// or more, the final four input bytes land in bytes 28..32 of the packet;
/// for shorter remainders with a sub-word tail of `t` bytes, three probe
/// bytes of the tail are placed at offsets 16..19. Everything else is zero.
#[inline(always)]
fn remainder_packet(tail: &[u8]) -> [u8; PACKET_LEN] {
  let len = tail.len();
  debug_assert!(len >= 1 && len < PACKET_LEN);

  let word_len = len & !3;
  let mut packet = [0u8; PACKET_LEN];
  packet[..word_len].copy_from_slice(&tail[..word_len]);

  if len >= 16 {
    packet[28..32].copy_from_slice(&tail[len - 4..]);
  } else {
    let t = len & 3;
    if t != 0 {
      packet[16] = tail[word_len];
      packet[17] = tail[word_len + (t >> 1)];
      packet[18] = tail[word_len + t - 1];
    }
  }

  packet
}

/// Mix a trailing partial packet (`1..=31` bytes) into the state.
///
/// Before the packet round, the remainder length is folded in: `v0` gains the
/// length broadcast into every 32-bit element, and every 32-bit element of
/// `v1` is rotated left by the length.
#[inline(always)]
pub(crate) fn update_remainder<V: Lanes>(state: &mut HashState, tail: &[u8]) {
  debug_assert!(!tail.is_empty() && tail.len() < PACKET_LEN);

  let mut v0 = V::load_state(&state.v0);
  let mut v1 = V::load_state(&state.v1);
  let mut mul0 = V::load_state(&state.mul0);
  let mut mul1 = V::load_state(&state.mul1);

  let len = tail.len() as u32;
  v0 = v0.add(V::broadcast_u32(len));
  v1 = v1.rotate_u32_left(len);

  let packet = remainder_packet(tail);
  update(&mut v0, &mut v1, &mut mul0, &mut mul1, V::load_packet(&packet));

  v0.store_state(&mut state.v0);
  v1.store_state(&mut state.v1);
  mul0.store_state(&mut state.mul0);
  mul1.store_state(&mut state.mul1);
}

/// One finalisation round: a regular update whose packet is `v0` with its
/// 128-bit halves swapped and each lane's 32-bit halves exchanged.
#[inline(always)]
fn permute_and_update<V: Lanes>(v0: &mut V, v1: &mut V, mul0: &mut V, mul1: &mut V) {
  let permuted = v0.rot32().swap_128_halves();
  update(v0, v1, mul0, mul1, permuted);
}

#[inline(always)]
fn load<V: Lanes>(state: &HashState) -> (V, V, V, V) {
  (
    V::load_state(&state.v0),
    V::load_state(&state.v1),
    V::load_state(&state.mul0),
    V::load_state(&state.mul1),
  )
}

/// 64-bit digest: 4 permute-update rounds, then the sum of lane 0 of all
/// four state blocks.
#[inline(always)]
pub(crate) fn finalize64<V: Lanes>(state: &mut HashState) -> u64 {
  let (mut v0, mut v1, mut mul0, mut mul1) = load::<V>(state);

  for _ in 0..4 {
    permute_and_update(&mut v0, &mut v1, &mut mul0, &mut mul1);
  }

  let (mut a, mut b, mut c, mut d) = ([0u64; 4], [0u64; 4], [0u64; 4], [0u64; 4]);
  v0.store_state(&mut a);
  v1.store_state(&mut b);
  mul0.store_state(&mut c);
  mul1.store_state(&mut d);

  a[0]
    .wrapping_add(b[0])
    .wrapping_add(c[0])
    .wrapping_add(d[0])
}

/// 128-bit digest: 6 permute-update rounds, then a cross-half lane sum.
#[inline(always)]
pub(crate) fn finalize128<V: Lanes>(state: &mut HashState) -> [u64; 2] {
  let (mut v0, mut v1, mut mul0, mut mul1) = load::<V>(state);

  for _ in 0..6 {
    permute_and_update(&mut v0, &mut v1, &mut mul0, &mut mul1);
  }

  let (mut a, mut b, mut c, mut d) = ([0u64; 4], [0u64; 4], [0u64; 4], [0u64; 4]);
  v0.store_state(&mut a);
  v1.store_state(&mut b);
  mul0.store_state(&mut c);
  mul1.store_state(&mut d);

  [
    a[0].wrapping_add(c[0]).wrapping_add(b[2]).wrapping_add(d[2]),
    a[1].wrapping_add(c[1]).wrapping_add(b[3]).wrapping_add(d[3]),
  ]
}

/// Fold `v0 + mul0` (lanes a0, a1 per half) and `v1 + mul1` (lanes a2, a3)
/// into the 256-bit digest, reducing modulo the GF(2) polynomial
/// x²⁵⁶ + x² + x.
///
/// Per 128-bit half, with `a3` masked to 62 bits:
///
/// ```text
/// hash_lo = a0 ⊕ (a2 << 1) ⊕ (a2 << 2)
/// hash_hi = a1 ⊕ ((a3 << 1) | (a2 >> 63)) ⊕ ((a3 << 2) | (a2 >> 62))
/// ```
#[inline(always)]
fn modular_reduction<V: Lanes>(a01: V, a23: V) -> V {
  let a2_in_odd = a23.shift_lanes_up_per_half();
  let a23_masked = a23.and(V::dup128(u64::MAX, 0x3fff_ffff_ffff_ffff));
  V::xor3(
    a01,
    a23_masked.shl::<1>().or(a2_in_odd.shr::<63>()),
    a23_masked.shl::<2>().or(a2_in_odd.shr::<62>()),
  )
}

/// 256-bit digest: 10 permute-update rounds, then the modular reduction.
#[inline(always)]
pub(crate) fn finalize256<V: Lanes>(state: &mut HashState) -> [u64; 4] {
  let (mut v0, mut v1, mut mul0, mut mul1) = load::<V>(state);

  for _ in 0..10 {
    permute_and_update(&mut v0, &mut v1, &mut mul0, &mut mul1);
  }

  let hash = modular_reduction::<V>(v0.add(mul0), v1.add(mul1));
  let mut out = [0u64; 4];
  hash.store_state(&mut out);
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn remainder_packet_word_copy_only() {
    // 8 bytes: two whole words, no sub-word tail, bytes 16..19 untouched.
    let tail = [1u8, 2, 3, 4, 5, 6, 7, 8];
    let packet = remainder_packet(&tail);
    assert_eq!(&packet[..8], &tail);
    assert!(packet[8..].iter().all(|&b| b == 0));
  }

  #[test]
  fn remainder_packet_short_tail_probes() {
    // 7 bytes: one whole word plus a 3-byte tail probed at offsets 16..19.
    let tail = [10u8, 11, 12, 13, 20, 21, 22];
    let packet = remainder_packet(&tail);
    assert_eq!(&packet[..4], &[10, 11, 12, 13]);
    assert_eq!(packet[16], 20); // tail[word_len]
    assert_eq!(packet[17], 21); // tail[word_len + t/2]
    assert_eq!(packet[18], 22); // tail[word_len + t - 1]
    assert!(packet[4..16].iter().all(|&b| b == 0));
    assert!(packet[19..].iter().all(|&b| b == 0));
  }

  #[test]
  fn remainder_packet_single_byte() {
    let tail = [0xAB_u8];
    let packet = remainder_packet(&tail);
    assert_eq!(packet[16], 0xAB);
    assert_eq!(packet[17], 0xAB);
    assert_eq!(packet[18], 0xAB);
    assert_eq!(packet.iter().filter(|&&b| b != 0).count(), 3);
  }

  #[test]
  fn remainder_packet_long_tail_keeps_last_word() {
    // 17 bytes: 16 copied verbatim, the last 4 input bytes land at 28..32.
    let tail: [u8; 17] = core::array::from_fn(|i| (i + 1) as u8);
    let packet = remainder_packet(&tail);
    assert_eq!(&packet[..16], &tail[..16]);
    assert_eq!(&packet[28..32], &tail[13..17]);
    assert!(packet[16..28].iter().all(|&b| b == 0));
  }

  #[test]
  fn remainder_packet_31_bytes() {
    let tail: [u8; 31] = core::array::from_fn(|i| (i + 1) as u8);
    let packet = remainder_packet(&tail);
    assert_eq!(&packet[..28], &tail[..28]);
    assert_eq!(&packet[28..32], &tail[27..31]);
  }
}
