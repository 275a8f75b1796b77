// SPDX-License-Identifier: MIT

//! Crate level error type.
use crate::entropy;

use core::{
    fmt,
    fmt::{Display, Formatter},
};

/// Faults reported by the generator and the masked cipher.
///
/// None of these are transient: an operation either completes or one
/// of its preconditions did not hold. Nothing is mutated when an error
/// is returned.
#[derive(Debug)]
pub enum Error {
    /// Output was requested from a generator that was never seeded.
    Unseeded,
    /// Encryption was requested before a key was set.
    MissingKey,
    /// The entropy source failed while seeding.
    Entropy(entropy::Error),
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Error::Entropy(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Error::Unseeded => f.write_str("generator used before being seeded"),
            Error::MissingKey => f.write_str("cipher used before a key was set"),
            Error::Entropy(e) => Display::fmt(e, f),
        }
    }
}

impl From<entropy::Error> for Error {
    fn from(error: entropy::Error) -> Self {
        Error::Entropy(error)
    }
}

#[cfg(test)]
mod tests {
    use super::Error;
    use crate::entropy;
    use alloc::string::ToString;
    use core::error::Error as _;

    #[test]
    fn display() {
        assert_eq!(
            Error::Unseeded.to_string(),
            "generator used before being seeded"
        );
        assert_eq!(
            Error::MissingKey.to_string(),
            "cipher used before a key was set"
        );
        let e: Error = entropy::Error::new("no device").into();
        assert_eq!(e.to_string(), "entropy error: no device");
    }

    #[test]
    fn source_chain() {
        let e: Error = entropy::Error::new("no device").into();
        assert!(e.source().is_some());
        assert!(Error::Unseeded.source().is_none());
    }
}
