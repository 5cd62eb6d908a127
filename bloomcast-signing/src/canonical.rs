//! Canonical payload derivation
//!
//! Canonicalization is a pure function of the input; the same input always
//! yields the same bytes. File inputs pass through unmodified, text inputs
//! are normalized so clients on different platforms produce identical
//! hashes.

use bloomcast_core::JobInput;
use sha2::{Digest, Sha256};
use std::borrow::Cow;

/// Lowercase-hex SHA-256 of a byte slice
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Normalize a text payload: `\r\n` and `\r` become `\n`, then leading and
/// trailing whitespace is trimmed (internal whitespace is untouched)
pub fn canonicalize_text(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n").trim().to_string()
}

/// Derive the canonical byte sequence for a job input
///
/// URL-mode inputs must be downloaded first; the fetched bytes are then
/// canonicalized as a file input. Calling this on a `Url` variant is a
/// programming error and yields the empty payload.
pub fn canonicalize(input: &JobInput) -> Cow<'_, [u8]> {
    match input {
        JobInput::Text(text) => Cow::Owned(canonicalize_text(text).into_bytes()),
        JobInput::File { bytes, .. } => Cow::Borrowed(bytes.as_slice()),
        JobInput::Url(_) => Cow::Borrowed(&[]),
    }
}

/// Lowercase-hex SHA-256 of the canonical payload of an input
pub fn payload_sha256(input: &JobInput) -> String {
    sha256_hex(&canonicalize(input))
}

/// Lowercase-hex SHA-256 of a canonicalized text payload
pub fn payload_sha256_text(text: &str) -> String {
    sha256_hex(canonicalize_text(text).as_bytes())
}
