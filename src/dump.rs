// SPDX-License-Identifier: MIT

//! Hex rendering of byte buffers for debugging.
use alloc::string::String;

/// Lowercase hex, no separators.
///
/// ```
/// assert_eq!(masked_simon::dump::to_hex(&[0x36, 0x2a, 0xb4, 0x41]), "362ab441");
/// ```
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Write `bytes` to stdout as one line of lowercase hex.
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub fn print_hex(bytes: &[u8]) {
    std::println!("{}", to_hex(bytes));
}
