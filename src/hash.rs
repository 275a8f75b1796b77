//
// Copyright (c) 2023 Daniel Ottavio
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE
//
//! A module to facilitate the Hash_DRBG algorithm.
//!
//! Hash_DRBG is implemented by the [`HashDrbg`] type using SHA-256 as
//! defined by NIST [SP 800-90A
//! Rev. 1](https://csrc.nist.gov/publications/detail/sp/800-90a/rev-1/final).
//! An instance may be seeded directly from 48 bytes of seed material,
//! or built from an [`Entropy`] source with [`HashBuilder`].
//!
//! The generator does not enforce a reseed interval. Callers that
//! need one should track [`HashDrbg::generation_count`] and call
//! [`HashDrbg::reseed`] themselves.
use crate::{entropy::Entropy, error::Error};

use alloc::{vec, vec::Vec};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, Zeroizing};

#[cfg(feature = "rand_core")]
use rand_core::{TryCryptoRng, TryRngCore};

/// Bytes of entropy in a seed, matching the 256 bit security strength.
pub const SECURITY_STRENGTH: usize = 32;
/// Bytes of nonce in a seed.
pub const NONCE_LEN: usize = 16;
/// Total length of the seed material accepted by [`HashDrbg::seed`].
pub const SEED_MATERIAL_LEN: usize = SECURITY_STRENGTH + NONCE_LEN;
/// Length of the working value `V` and the constant `C` (440 bits).
pub const SEED_LEN: usize = 55;
/// SHA-256 output length.
pub const OUTPUT_LEN: usize = 32;

/// Opaque seed input: entropy followed by nonce.
pub type SeedMaterial = [u8; SEED_MATERIAL_LEN];

type Seed = [u8; SEED_LEN];

const SEED_TAG: u8 = 0x00;
const GENERATE_TAG: u8 = 0x03;

/// Implementation of Hash_DRBG with SHA-256.
///
/// A freshly constructed instance is unseeded and refuses to produce
/// output until [`seed`](HashDrbg::seed) has been called.
///
/// # Example
///
/// ```
/// use masked_simon::hash::HashDrbg;
///
/// # use masked_simon::error::Error;
/// #
/// # fn main() -> Result<(), Error> {
/// #
/// let mut drbg = HashDrbg::from_seed(&[0u8; 48]);
///
/// let random_data = drbg.fill(4)?;
/// assert_eq!(random_data, [0x36, 0x2a, 0xb4, 0x41]);
/// assert_eq!(drbg.generation_count(), 1);
/// #
/// # Ok(())
/// # }
/// ```
pub struct HashDrbg {
    v: Seed,
    c: Seed,
    gen_count: u64,
    seeded: bool,
}

/// Builder class for seeding a [`HashDrbg`] from an [`Entropy`]
/// source.
///
/// # Example
/// ```
/// use masked_simon::{entropy::OsEntropy, hash::HashBuilder};
///
/// # use masked_simon::error::Error;
/// #
/// # fn main() -> Result<(), Error> {
/// #
/// let nonce = 7u128.to_be_bytes();
/// let mut drbg = HashBuilder::new(OsEntropy::default())
///     .nonce(&nonce)
///     .build()?;
///
/// let mut random_data = [0u8; 32];
/// drbg.fill_bytes(&mut random_data)?;
/// #
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HashBuilder<'a, E> {
    nonce: Option<&'a [u8; NONCE_LEN]>,
    entropy: E,
}

/// Add the big-endian number `b` into the big-endian number `a`,
/// discarding any carry out of the most significant byte of `a`.
///
/// `b` must not be longer than `a`. The loop always visits every byte
/// of `a` so the running time only depends on the lengths.
fn add_accumulate(a: &mut [u8], b: &[u8]) {
    debug_assert!(b.len() <= a.len());
    let mut addend = b.iter().rev();
    let mut carry = 0u16;
    for byte in a.iter_mut().rev() {
        carry += u16::from(*byte) + addend.next().map_or(0, |&x| u16::from(x));
        *byte = carry as u8;
        carry >>= 8;
    }
}

/// Hash derivation function. The concatenation of `input` is stretched
/// into `output.len()` bytes.
///
/// Each block hashes `counter || be32(8 * output.len()) || input`, the
/// counter being a single byte starting at 1.
fn hash_df(input: &[&[u8]], output: &mut [u8]) {
    debug_assert!(output.len() <= usize::from(u8::MAX) * OUTPUT_LEN);
    let nbits = (output.len() as u32) << 3;
    for (counter, blk) in (1u8..).zip(output.chunks_mut(OUTPUT_LEN)) {
        let mut hasher = Sha256::new();
        hasher.update([counter]);
        hasher.update(nbits.to_be_bytes());
        for part in input {
            hasher.update(part);
        }
        let digest = hasher.finalize();
        blk.copy_from_slice(&digest[..blk.len()]);
    }
}

/// Hash generator. Fills `output` with `SHA256(data)`, `SHA256(data +
/// 1)`, ... where `data` starts as a copy of `v`.
fn hash_gen(v: &Seed, output: &mut [u8]) {
    let mut data = Zeroizing::new(*v);
    for blk in output.chunks_mut(OUTPUT_LEN) {
        let digest = Sha256::digest(&data[..]);
        blk.copy_from_slice(&digest[..blk.len()]);
        add_accumulate(&mut data[..], &[1]);
    }
}

impl<'a, E> HashBuilder<'a, E>
where
    E: Entropy,
{
    pub fn new(entropy: E) -> Self {
        Self {
            nonce: None,
            entropy,
        }
    }

    /// Specify the nonce half of the seed material.
    ///
    /// By default, this value is 16 bytes read from the `Entropy`
    /// source.
    pub fn nonce(mut self, nonce: &'a [u8; NONCE_LEN]) -> HashBuilder<'a, E> {
        self.nonce = Some(nonce);
        self
    }

    /// Build and return a new, seeded [`HashDrbg`] instance.
    ///
    /// The seed is 32 bytes from the `Entropy` source followed by the
    /// nonce.
    ///
    /// # Error
    ///
    /// Returns an error when there is a problem reading from the
    /// entropy source.
    pub fn build(mut self) -> Result<HashDrbg, Error> {
        let seed = match self.nonce {
            Some(nonce) => {
                let mut seed = Zeroizing::new([0u8; SEED_MATERIAL_LEN]);
                self.entropy.fill_bytes(&mut seed[..SECURITY_STRENGTH])?;
                seed[SECURITY_STRENGTH..].copy_from_slice(nonce);
                seed
            }
            None => Zeroizing::new(self.entropy.seed_material()?),
        };
        Ok(HashDrbg::from_seed(&seed))
    }
}

impl Default for HashDrbg {
    fn default() -> Self {
        Self::new()
    }
}

/// Wipes `V`, `C` and the counter and leaves the instance unseeded.
impl Zeroize for HashDrbg {
    fn zeroize(&mut self) {
        self.v.zeroize();
        self.c.zeroize();
        self.gen_count.zeroize();
        self.seeded = false;
    }
}

impl Drop for HashDrbg {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl HashDrbg {
    /// Create an unseeded instance.
    pub const fn new() -> Self {
        Self {
            v: [0u8; SEED_LEN],
            c: [0u8; SEED_LEN],
            gen_count: 0,
            seeded: false,
        }
    }

    /// Create an instance seeded with `seed`.
    pub fn from_seed(seed: &SeedMaterial) -> Self {
        let mut drbg = Self::new();
        drbg.seed(seed);
        drbg
    }

    /// Derive fresh `V` and `C` from `seed` and reset the generation
    /// counter. Any previous state is discarded.
    pub fn seed(&mut self, seed: &SeedMaterial) {
        hash_df(&[seed.as_slice()], &mut self.v);
        hash_df(&[&[SEED_TAG][..], &self.v[..]], &mut self.c);
        self.gen_count = 0;
        self.seeded = true;
        trace_event!(seed_len = seed.len(), "hash_drbg seeded");
    }

    /// Reseed with 48 bytes drawn from `entropy`.
    ///
    /// # Error
    ///
    /// Returns an error when there is a problem reading from the
    /// entropy source. The current state is left untouched in that
    /// case.
    pub fn reseed<E: Entropy>(&mut self, entropy: &mut E) -> Result<(), Error> {
        let seed = Zeroizing::new(entropy.seed_material()?);
        self.seed(&seed);
        Ok(())
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Number of generate calls since the last seed.
    pub fn generation_count(&self) -> u64 {
        self.gen_count
    }

    /// Return `length` random bytes. See
    /// [`fill_bytes`](HashDrbg::fill_bytes).
    pub fn fill(&mut self, length: u32) -> Result<Vec<u8>, Error> {
        if !self.seeded {
            return Err(Error::Unseeded);
        }
        let mut bytes = vec![0u8; length as usize];
        self.fill_bytes(&mut bytes)?;
        Ok(bytes)
    }

    /// Fill the slice `bytes` with random data.
    ///
    /// Every call is a single generate step followed by a state
    /// update, even when `bytes` is empty, so no two calls ever see
    /// the same `V`.
    ///
    /// # Error
    ///
    /// Returns [`Error::Unseeded`] if [`seed`](HashDrbg::seed) was
    /// never called.
    pub fn fill_bytes(&mut self, bytes: &mut [u8]) -> Result<(), Error> {
        if !self.seeded {
            return Err(Error::Unseeded);
        }
        hash_gen(&self.v, bytes);

        let h = Sha256::new()
            .chain_update([GENERATE_TAG])
            .chain_update(self.v)
            .finalize();
        self.gen_count += 1;
        add_accumulate(&mut self.v, &h);
        add_accumulate(&mut self.v, &self.c);
        add_accumulate(&mut self.v, &self.gen_count.to_be_bytes());
        trace_event!(
            generation_count = self.gen_count,
            len = bytes.len(),
            "hash_drbg generate"
        );
        Ok(())
    }
}

#[cfg(feature = "rand_core")]
#[cfg_attr(docsrs, doc(cfg(feature = "rand_core")))]
impl TryCryptoRng for HashDrbg {}

#[cfg(feature = "rand_core")]
#[cfg_attr(docsrs, doc(cfg(feature = "rand_core")))]
impl TryRngCore for HashDrbg {
    type Error = Error;

    fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
        let mut bytes = [0u8; 4];
        self.fill_bytes(&mut bytes)?;
        Ok(u32::from_be_bytes(bytes))
    }

    fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
        let mut bytes = [0u8; 8];
        self.fill_bytes(&mut bytes)?;
        Ok(u64::from_be_bytes(bytes))
    }

    fn try_fill_bytes(&mut self, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.fill_bytes(bytes)
    }
}
