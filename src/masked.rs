// SPDX-License-Identifier: MIT

//! First-order Boolean-masked Simon64/128 encryption.
//!
//! Every intermediate value of the data path is kept as two shares, a
//! public share and a mask, whose XOR is the real value. Each call to
//! [`MaskedSimon::encrypt`] draws a fresh [`MaskSet`] from a
//! [`HashDrbg`]: one mask for each plaintext half and one per round for
//! the output of the AND gate.
//!
//! Only the round function is masked. The key schedule runs unmasked
//! and round keys are XORed into the public share directly.
//!
//! # Example
//!
//! ```
//! use masked_simon::{hash::HashDrbg, masked::MaskedSimon, simon};
//!
//! # use masked_simon::error::Error;
//! #
//! # fn main() -> Result<(), Error> {
//! #
//! let key = [0u8; 16];
//! let mut drbg = HashDrbg::from_seed(&[0u8; 48]);
//! let mut cipher = MaskedSimon::new();
//! cipher.set_key(&key);
//!
//! let ct = cipher.encrypt(&mut drbg, &[0u8; 8])?;
//! assert_eq!(ct, simon::encrypt_block(&[0u8; 8], &simon::expand_key(&key)));
//! #
//! # Ok(())
//! # }
//! ```
use crate::{
    error::Error,
    hash::HashDrbg,
    simon::{expand_key, join, split, Block, RoundKeys, KEY_LEN, ROUNDS},
};

use alloc::vec::Vec;
use core::fmt;
use zeroize::{Zeroize, Zeroizing};

/// Number of mask words consumed by one encryption.
pub const MASK_WORDS: usize = ROUNDS + 2;

const MASK_BYTES: usize = MASK_WORDS * 4;

/// AND of two masked operands.
///
/// `a`/`ma` and `b`/`mb` are the public and mask shares of the two
/// operands and `mc` is the mask the result is produced under. The
/// return value XOR `mc` equals `(a ^ ma) & (b ^ mb)`, but that value
/// is never formed itself: every partial result mixes in at least one
/// mask.
#[inline]
pub fn masked_and(a: u32, ma: u32, b: u32, mb: u32, mc: u32) -> u32 {
    ((((a & b) ^ mc) ^ (a & mb)) ^ (b & ma)) ^ (ma & mb)
}

/// Mask words for a single encryption.
///
/// Word 0 masks `x`, word 1 masks `y` and word `r + 2` masks the AND
/// output of round `r`. A set must never be used for more than one
/// encryption.
pub struct MaskSet([u32; MASK_WORDS]);

impl MaskSet {
    /// Draw a new set with a single [`HashDrbg::fill_bytes`] call of
    /// 184 bytes. Each word is read little-endian.
    ///
    /// # Error
    ///
    /// Returns [`Error::Unseeded`] if `drbg` was never seeded.
    pub fn draw(drbg: &mut HashDrbg) -> Result<Self, Error> {
        let mut bytes = Zeroizing::new([0u8; MASK_BYTES]);
        drbg.fill_bytes(&mut bytes[..])?;
        let mut words = [0u32; MASK_WORDS];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
            *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(Self(words))
    }

    /// Build a set from explicit words, e.g. to replay a recorded
    /// encryption.
    pub fn from_words(words: [u32; MASK_WORDS]) -> Self {
        Self(words)
    }

    pub fn words(&self) -> &[u32; MASK_WORDS] {
        &self.0
    }

    #[inline]
    fn x(&self) -> u32 {
        self.0[0]
    }

    #[inline]
    fn y(&self) -> u32 {
        self.0[1]
    }

    #[inline]
    fn and_mask(&self, round: usize) -> u32 {
        self.0[round + 2]
    }
}

impl fmt::Debug for MaskSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("MaskSet(..)")
    }
}

impl Zeroize for MaskSet {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Drop for MaskSet {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Both shares of `x` after one round, plus the masked AND output and
/// its mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundShares {
    pub x: u32,
    pub mx: u32,
    pub and_out: u32,
    pub mc: u32,
}

impl RoundShares {
    /// The real value of `x`.
    pub fn unmasked_x(&self) -> u32 {
        self.x ^ self.mx
    }
}

/// Per-round record of a masked encryption.
#[derive(Clone, Debug, Default)]
pub struct Trace {
    rounds: Vec<RoundShares>,
}

impl Trace {
    pub fn rounds(&self) -> &[RoundShares] {
        &self.rounds
    }

    /// Simulated power trace: the Hamming weight of the public `x`
    /// share after each round.
    pub fn hamming_weights(&self) -> Vec<u32> {
        self.rounds.iter().map(|r| r.x.count_ones()).collect()
    }

    /// Hamming weight of the public AND gate output of each round.
    pub fn and_hamming_weights(&self) -> Vec<u32> {
        self.rounds.iter().map(|r| r.and_out.count_ones()).collect()
    }

    /// The real `x` after each round, reconstructed from both shares.
    pub fn unmasked_states(&self) -> Vec<u32> {
        self.rounds.iter().map(RoundShares::unmasked_x).collect()
    }
}

/// Pearson correlation of two samples, e.g. simulated Hamming weights
/// of a trace point across many encryptions against the Hamming
/// weights of the unmasked value they should hide.
///
/// Returns 0 when a sample is empty or constant.
///
/// # Panics
///
/// Panics if `xs` and `ys` differ in length.
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub fn correlation(xs: &[u32], ys: &[u32]) -> f64 {
    assert_eq!(xs.len(), ys.len(), "correlation: sample lengths differ");
    if xs.is_empty() {
        return 0.0;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().map(|&x| f64::from(x)).sum::<f64>() / n;
    let mean_y = ys.iter().map(|&y| f64::from(y)).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = f64::from(x) - mean_x;
        let dy = f64::from(y) - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }
    cov / (var_x * var_y).sqrt()
}

/// Simon64/128 with a masked round function.
///
/// The cipher holds only the round keys. Randomness comes from the
/// [`HashDrbg`] passed to [`encrypt`](MaskedSimon::encrypt), so the
/// caller decides which generator backs which cipher.
#[derive(Default)]
pub struct MaskedSimon {
    keys: Option<RoundKeys>,
}

impl MaskedSimon {
    /// Create a cipher with no key set.
    pub const fn new() -> Self {
        Self { keys: None }
    }

    pub fn with_key(key: &[u8; KEY_LEN]) -> Self {
        let mut cipher = Self::new();
        cipher.set_key(key);
        cipher
    }

    /// Expand `key` and replace any previous round keys.
    pub fn set_key(&mut self, key: &[u8; KEY_LEN]) {
        self.keys = Some(expand_key(key));
        trace_event!("masked simon key set");
    }

    pub fn round_keys(&self) -> Option<&RoundKeys> {
        self.keys.as_ref()
    }

    /// Encrypt one block under fresh masks drawn from `drbg`.
    ///
    /// Consumes exactly one generate call on `drbg`.
    ///
    /// # Error
    ///
    /// Returns [`Error::MissingKey`] if no key was set and
    /// [`Error::Unseeded`] if `drbg` was never seeded. The generator
    /// is not advanced in either case.
    pub fn encrypt(&self, drbg: &mut HashDrbg, block: &Block) -> Result<Block, Error> {
        let keys = self.keys.as_ref().ok_or(Error::MissingKey)?;
        let masks = MaskSet::draw(drbg)?;
        trace_event!(
            generation_count = drbg.generation_count(),
            "masked simon encrypt"
        );
        Ok(encrypt_masked(keys, block, &masks, |_| {}))
    }

    /// Encrypt one block under caller supplied masks.
    ///
    /// # Error
    ///
    /// Returns [`Error::MissingKey`] if no key was set.
    pub fn encrypt_with_masks(&self, block: &Block, masks: &MaskSet) -> Result<Block, Error> {
        let keys = self.keys.as_ref().ok_or(Error::MissingKey)?;
        Ok(encrypt_masked(keys, block, masks, |_| {}))
    }

    /// Like [`encrypt_with_masks`](MaskedSimon::encrypt_with_masks),
    /// also returning the shares seen in every round.
    ///
    /// # Error
    ///
    /// Returns [`Error::MissingKey`] if no key was set.
    pub fn encrypt_traced(
        &self,
        block: &Block,
        masks: &MaskSet,
    ) -> Result<(Block, Trace), Error> {
        let keys = self.keys.as_ref().ok_or(Error::MissingKey)?;
        let mut trace = Trace {
            rounds: Vec::with_capacity(ROUNDS),
        };
        let ct = encrypt_masked(keys, block, masks, |shares| trace.rounds.push(shares));
        Ok((ct, trace))
    }
}

fn encrypt_masked<F>(keys: &RoundKeys, block: &Block, masks: &MaskSet, mut observe: F) -> Block
where
    F: FnMut(RoundShares),
{
    let (x, y) = split(block);
    let (mut mx, mut my) = (masks.x(), masks.y());
    let (mut x, mut y) = (x ^ mx, y ^ my);

    for (round, k) in keys.0.iter().enumerate() {
        let mc = masks.and_mask(round);
        let and_out = masked_and(
            x.rotate_left(1),
            mx.rotate_left(1),
            x.rotate_left(8),
            mx.rotate_left(8),
            mc,
        );
        // The round key goes into the public share only.
        let next_x = y ^ and_out ^ x.rotate_left(2) ^ k;
        let next_mx = my ^ mc ^ mx.rotate_left(2);
        (y, my) = (x, mx);
        (x, mx) = (next_x, next_mx);
        observe(RoundShares { x, mx, and_out, mc });
    }

    join(x ^ mx, y ^ my)
}
