use std::fmt;

use serde::Serialize;

/// A loadable memory region of a process image.
///
/// Both fields are kept as the exact tokens the producer printed. They are
/// expected to be hexadecimal numerals but are never parsed or normalized,
/// so `0x`-prefixed and bare forms pass through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub address: String,
    pub size: String,
}

impl Segment {
    pub fn new(address: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            size: size.into(),
        }
    }
}

/// Canonical form: `"<address> <size>"`.
impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.address, self.size)
    }
}
