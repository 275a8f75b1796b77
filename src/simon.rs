// SPDX-License-Identifier: MIT

//! Unmasked Simon64/128: key schedule and reference block encryption.
//!
//! The masked cipher in [`masked`](crate::masked) shares the key
//! schedule defined here and must always produce the same ciphertext
//! as [`encrypt_block`].
use zeroize::Zeroize;

/// Number of rounds.
pub const ROUNDS: usize = 44;
/// Key length in bytes.
pub const KEY_LEN: usize = 16;
/// Block length in bytes.
pub const BLOCK_LEN: usize = 8;

const KEY_WORDS: usize = 4;

// Round constant sequence z3.
const Z: u64 = 0b0011011011101011000110010111100000010010001010011100110100001111;
const Z_LEN: usize = 62;

/// A 64 bit block: `x` is the first four bytes, `y` the last four, both
/// big-endian.
pub type Block = [u8; BLOCK_LEN];

/// Expanded round keys, one 32 bit word per round.
#[derive(Clone, PartialEq, Eq)]
pub struct RoundKeys(pub [u32; ROUNDS]);

impl RoundKeys {
    /// Returns the round key for `round` (0..44).
    #[inline]
    pub fn get(&self, round: usize) -> u32 {
        self.0[round]
    }
}

impl core::fmt::Debug for RoundKeys {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("RoundKeys(..)")
    }
}

impl Zeroize for RoundKeys {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Drop for RoundKeys {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Bit `i` of the 62 bit round constant sequence `z3`, counted from
/// the most significant end.
///
/// # Panics
///
/// Panics if `i >= 62`.
#[inline]
pub fn round_constant(i: usize) -> u32 {
    assert!(i < Z_LEN, "Simon: round constant index out of range");
    ((Z >> (Z_LEN - 1 - i)) & 1) as u32
}

/// Expand a 128 bit key into [`ROUNDS`] round keys.
///
/// The last four key bytes form word 0, the first four form word 3.
pub fn expand_key(key: &[u8; KEY_LEN]) -> RoundKeys {
    let mut k = [0u32; ROUNDS];
    for (word, chunk) in k.iter_mut().zip(key.rchunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    for i in KEY_WORDS..ROUNDS {
        let mut tmp = k[i - 1].rotate_right(3) ^ k[i - 3];
        tmp ^= tmp.rotate_right(1);
        k[i] = !k[i - KEY_WORDS] ^ tmp ^ round_constant(i - KEY_WORDS) ^ 0x3;
    }
    RoundKeys(k)
}

/// The nonlinear part of the round function.
#[inline]
pub(crate) fn f(x: u32) -> u32 {
    x.rotate_left(1) & x.rotate_left(8)
}

#[inline]
fn round(x: u32, y: u32, k: u32) -> (u32, u32) {
    (y ^ f(x) ^ x.rotate_left(2) ^ k, x)
}

pub(crate) fn split(block: &Block) -> (u32, u32) {
    (
        u32::from_be_bytes([block[0], block[1], block[2], block[3]]),
        u32::from_be_bytes([block[4], block[5], block[6], block[7]]),
    )
}

pub(crate) fn join(x: u32, y: u32) -> Block {
    let mut block = [0u8; BLOCK_LEN];
    block[..4].copy_from_slice(&x.to_be_bytes());
    block[4..].copy_from_slice(&y.to_be_bytes());
    block
}

/// Encrypt a single block without any masking.
///
/// # Example
///
/// ```
/// use masked_simon::simon::{encrypt_block, expand_key};
///
/// let key = [
///     0x1b, 0x1a, 0x19, 0x18, 0x13, 0x12, 0x11, 0x10,
///     0x0b, 0x0a, 0x09, 0x08, 0x03, 0x02, 0x01, 0x00,
/// ];
/// let pt = [0x65, 0x6b, 0x69, 0x6c, 0x20, 0x64, 0x6e, 0x75];
/// let ct = encrypt_block(&pt, &expand_key(&key));
/// assert_eq!(ct, [0x44, 0xc8, 0xfc, 0x20, 0xb9, 0xdf, 0xa0, 0x7a]);
/// ```
pub fn encrypt_block(block: &Block, keys: &RoundKeys) -> Block {
    let (mut x, mut y) = split(block);
    for k in keys.0.iter() {
        (x, y) = round(x, y, *k);
    }
    join(x, y)
}

/// The unmasked `x` word after round `round_idx` (0 based) has been
/// applied. This is the value a first-order power model targets.
///
/// # Panics
///
/// Panics if `round_idx >= ROUNDS`.
pub fn x_after_round(block: &Block, keys: &RoundKeys, round_idx: usize) -> u32 {
    assert!(round_idx < ROUNDS, "Simon: round index out of range");
    let (mut x, mut y) = split(block);
    for k in &keys.0[..=round_idx] {
        (x, y) = round(x, y, *k);
    }
    x
}
