//! Taskyard Request Signing for BloomCast
//!
//! This crate implements the two load-bearing pieces of the request
//! authentication protocol:
//!
//! - **Canonicalization**: deriving the exact byte sequence that is hashed
//!   for signing. Text inputs are line-ending normalized and trimmed; file
//!   inputs are hashed as raw bytes. The same function is used on both the
//!   signing and verification side, or every signature mismatches.
//! - **Signature verification**: recomputing the HMAC-SHA256 of
//!   `"{ts}.POST./run.{job_id}.{payload_sha256}"` and comparing it in
//!   constant time against the supplied `v1=<hex>` value, after checking
//!   the timestamp against the skew tolerance.
//!
//! # Example
//!
//! ```rust
//! use bloomcast_signing::{TaskyardSignature, payload_sha256_text};
//!
//! let sha = payload_sha256_text("product_id,product_name,units_sold,stock\r\nP-1,Tulip,40,12\r\n");
//! assert_eq!(
//!     sha,
//!     "ac2178c92f9f0f72c0eb4d8d25a17736514aa5b10c448d9b502833e128be4f83"
//! );
//!
//! let signer = TaskyardSignature::new("replace_me");
//! let signature = signer.sign(1_700_000_000, "job-0042", &sha);
//! assert_eq!(
//!     signature,
//!     "v1=21a7673628595551e0300eae919c6cbda9bdbcf099b16e24216888fe4bd7b5f5"
//! );
//! ```

mod canonical;
mod error;
mod signature;

pub use canonical::{canonicalize, canonicalize_text, payload_sha256, payload_sha256_text, sha256_hex};
pub use error::SignatureError;
pub use signature::TaskyardSignature;

/// Result type for signing operations
pub type Result<T> = std::result::Result<T, SignatureError>;
