// SPDX-License-Identifier: MIT

//! Name validation for layer definitions and layer instances.
//!
//! Both identities share the same shape: `^[A-Za-z0-9][A-Za-z0-9_-]*[A-Za-z0-9]$`,
//! i.e. alphanumeric with interior dash/underscore, at least two characters,
//! first and last character always alphanumeric.

use std::fmt;

/// A name failed [`validate_name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidName(pub String);

impl fmt::Display for InvalidName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid name \"{}\"", self.0)
    }
}

impl std::error::Error for InvalidName {}

/// Validate a definition or instance name against the shared name regex.
pub fn validate_name(name: &str) -> Result<(), InvalidName> {
    let bytes = name.as_bytes();
    let is_alnum = |b: u8| b.is_ascii_alphanumeric();

    let valid = bytes.len() >= 2
        && is_alnum(bytes[0])
        && is_alnum(bytes[bytes.len() - 1])
        && bytes
            .iter()
            .all(|&b| is_alnum(b) || b == b'-' || b == b'_');

    if valid {
        Ok(())
    } else {
        Err(InvalidName(name.to_string()))
    }
}

#[cfg(test)]
#[path = "name_tests.rs"]
mod tests;
