// SPDX-License-Identifier: MIT

//! Simon64/128 encryption with first-order Boolean masking, fed by the
//! Hash_DRBG random bit generator defined by NIST [SP 800-90A
//! Rev. 1](https://csrc.nist.gov/publications/detail/sp/800-90a/rev-1/final).
//!
//! The masked cipher is only as good as its masks. Every encryption
//! draws 46 fresh words from a [`HashDrbg`](hash::HashDrbg): if those
//! words are predictable or repeat, the masking buys nothing against
//! differential power analysis.
//!
//! # Quick Example
//!
//! Seed a generator, set a key, encrypt:
//!
//! ```
//! use masked_simon::{hash::HashDrbg, masked::MaskedSimon};
//!
//! # use masked_simon::error::Error;
//! #
//! # fn main() -> Result<(), Error> {
//! #
//! let mut drbg = HashDrbg::from_seed(&[0u8; 48]);
//! let cipher = MaskedSimon::with_key(&[0u8; 16]);
//!
//! let ct = cipher.encrypt(&mut drbg, &[0u8; 8])?;
//! assert_eq!(ct, [0xed, 0xf1, 0xbe, 0x0a, 0x54, 0xd9, 0xbf, 0x51]);
//! #
//! # Ok(())
//! # }
//! ```
//!
//! With the `std` feature,
//! [`LocalHashDrbg::default()`](crate::thread::LocalHashDrbg::default())
//! hands out a thread-local generator seeded from the OS, and a
//! generator may also be seeded from any [`Entropy`](entropy::Entropy)
//! source through [`HashBuilder`](hash::HashBuilder).
//!
//! # Limitations
//!
//! - Only first-order masking. The key schedule and the round key XOR
//!   are not masked.
//! - No reseed interval is enforced; see
//!   [`HashDrbg::generation_count`](hash::HashDrbg::generation_count).
//! - Control flow is data independent, but nothing stops the compiler
//!   or CPU from undoing that.
//!
#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// Emits a `tracing` event at trace level when the `tracing` feature is
// enabled, and nothing otherwise. Never pass secret values.
macro_rules! trace_event {
    ($($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        tracing::trace!($($arg)+);
    };
}

pub mod dump;
pub mod entropy;
pub mod error;
pub mod hash;
pub mod masked;
pub mod simon;

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub mod thread;

#[cfg(all(test, feature = "tracing", feature = "std"))]
mod tests {
    use crate::{error::Error, hash::HashDrbg, masked::MaskedSimon};
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tracing::{span, Event, Level, Metadata, Subscriber};

    struct CountEvents(Arc<AtomicUsize>);

    impl Subscriber for CountEvents {
        fn enabled(&self, metadata: &Metadata<'_>) -> bool {
            *metadata.level() == Level::TRACE
        }

        fn new_span(&self, _: &span::Attributes<'_>) -> span::Id {
            span::Id::from_u64(1)
        }

        fn record(&self, _: &span::Id, _: &span::Record<'_>) {}

        fn record_follows_from(&self, _: &span::Id, _: &span::Id) {}

        fn event(&self, _: &Event<'_>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }

        fn enter(&self, _: &span::Id) {}

        fn exit(&self, _: &span::Id) {}
    }

    #[test]
    fn events_are_emitted() -> Result<(), Error> {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = CountEvents(count.clone());
        tracing::subscriber::with_default(subscriber, || {
            // seed, key set, one generate, one encrypt
            let mut drbg = HashDrbg::from_seed(&[0u8; 48]);
            let cipher = MaskedSimon::with_key(&[0u8; 16]);
            cipher.encrypt(&mut drbg, &[0u8; 8]).map(|_| ())
        })?;
        assert_eq!(count.load(Ordering::SeqCst), 4);
        Ok(())
    }
}
