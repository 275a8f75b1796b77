// SPDX-License-Identifier: MIT

//! A thread-local interface for the Hash_DRBG algorithm.
use crate::{
    entropy::OsEntropy,
    error::Error,
    hash::{HashBuilder, HashDrbg},
    masked::MaskedSimon,
    simon::Block,
};

use std::{
    cell::RefCell,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
    thread_local,
    vec::Vec,
};

#[cfg(feature = "rand_core")]
use rand_core::{TryCryptoRng, TryRngCore};

/// A thread-local instance of Hash_DRBG.
///
/// A call to [`LocalHashDrbg::default()`] returns a handle to a
/// pre-allocated thread-local instance seeded with 32 bytes from
/// [`OsEntropy`] and a nonce made of a per-thread counter followed by
/// 8 bytes from the OS.
///
/// The handle is neither `Send` nor `Sync`, so a generator is never
/// shared between threads and every masked encryption drawn from it
/// sees its state update as a whole.
///
/// # Example
///
/// ```
/// # use masked_simon::error::Error;
/// use masked_simon::{masked::MaskedSimon, thread::LocalHashDrbg};
///
/// # fn main() -> Result<(), Error> {
/// let drbg = LocalHashDrbg::default();
/// let mut random_data = [0u8; 32];
/// drbg.fill_bytes(&mut random_data)?;
///
/// let cipher = MaskedSimon::with_key(&[0u8; 16]);
/// let ct = drbg.encrypt(&cipher, &[0u8; 8])?;
/// # Ok(())
/// # }
/// ```
pub struct LocalHashDrbg {
    rng: Rc<RefCell<HashDrbg>>,
}

static NEXT_LOCAL_ID: AtomicU64 = AtomicU64::new(0);

thread_local!(
    static LOCAL_RNG: Rc<RefCell<HashDrbg>> = {
        let id = NEXT_LOCAL_ID.fetch_add(1, Ordering::Relaxed);
        let mut nonce = [0u8; 16];
        nonce[..8].copy_from_slice(&id.to_be_bytes());
        getrandom::getrandom(&mut nonce[8..]).expect("getrandom failure");
        let drbg = HashBuilder::new(OsEntropy::default())
            .nonce(&nonce)
            .build().expect("HashBuilder failure");

        Rc::new(RefCell::new(drbg))
    }
);

impl Default for LocalHashDrbg {
    fn default() -> Self {
        Self {
            rng: LOCAL_RNG.with(|v| v.clone()),
        }
    }
}

impl LocalHashDrbg {
    /// See [`fill_bytes`](crate::hash::HashDrbg::fill_bytes) for details.
    pub fn fill_bytes(&self, bytes: &mut [u8]) -> Result<(), Error> {
        self.rng.borrow_mut().fill_bytes(bytes)
    }

    /// See [`fill`](crate::hash::HashDrbg::fill) for details.
    pub fn fill(&self, length: u32) -> Result<Vec<u8>, Error> {
        self.rng.borrow_mut().fill(length)
    }

    /// Reseed the thread's generator with fresh OS entropy.
    pub fn reseed(&self) -> Result<(), Error> {
        self.rng.borrow_mut().reseed(&mut OsEntropy::default())
    }

    /// See [`generation_count`](crate::hash::HashDrbg::generation_count).
    pub fn generation_count(&self) -> u64 {
        self.rng.borrow().generation_count()
    }

    /// Encrypt `block` with masks from the thread's generator. See
    /// [`MaskedSimon::encrypt`].
    pub fn encrypt(&self, cipher: &MaskedSimon, block: &Block) -> Result<Block, Error> {
        cipher.encrypt(&mut self.rng.borrow_mut(), block)
    }
}

#[cfg(feature = "rand_core")]
#[cfg_attr(docsrs, doc(cfg(feature = "rand_core")))]
impl TryCryptoRng for LocalHashDrbg where LocalHashDrbg: TryRngCore {}

#[cfg(feature = "rand_core")]
#[cfg_attr(docsrs, doc(cfg(feature = "rand_core")))]
impl TryRngCore for LocalHashDrbg {
    type Error = Error;

    fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
        self.rng.borrow_mut().try_next_u32()
    }

    fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
        self.rng.borrow_mut().try_next_u64()
    }

    fn try_fill_bytes(&mut self, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.rng.borrow_mut().try_fill_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::Error,
        masked::MaskedSimon,
        simon::{encrypt_block, expand_key},
        thread::LocalHashDrbg,
    };
    use std::{thread, vec::Vec};

    #[test]
    fn single_thread() -> Result<(), Error> {
        let rng = LocalHashDrbg::default();
        let mut buf = [0u8; 8];
        rng.fill_bytes(&mut buf)?;
        assert_ne!([0u8; 8], buf);
        Ok(())
    }

    #[test]
    fn handles_share_state() -> Result<(), Error> {
        let a = LocalHashDrbg::default();
        let b = LocalHashDrbg::default();
        let before = a.generation_count();
        b.fill(4)?;
        assert_eq!(a.generation_count(), before + 1);
        Ok(())
    }

    #[test]
    fn reseed_resets_count() -> Result<(), Error> {
        let rng = LocalHashDrbg::default();
        rng.fill(16)?;
        rng.reseed()?;
        assert_eq!(rng.generation_count(), 0);
        Ok(())
    }

    #[test]
    fn encrypt_with_local_masks() -> Result<(), Error> {
        let rng = LocalHashDrbg::default();
        let key = [0x42u8; 16];
        let cipher = MaskedSimon::with_key(&key);
        let ct = rng.encrypt(&cipher, b"8 bytes!")?;
        assert_eq!(ct, encrypt_block(b"8 bytes!", &expand_key(&key)));
        Ok(())
    }

    #[test]
    fn multi_thread() {
        let num_threads = 32;
        let mut handles = Vec::with_capacity(num_threads);
        for _ in 0..num_threads {
            let h = thread::spawn(move || {
                let rng = LocalHashDrbg::default();
                rng.fill(8).unwrap()
            });
            handles.push(h)
        }
        let outputs: Vec<Vec<u8>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for (i, a) in outputs.iter().enumerate() {
            assert_ne!(a, &[0u8; 8]);
            for b in &outputs[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
