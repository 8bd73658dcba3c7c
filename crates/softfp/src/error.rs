//! Errors at the crate's one genuinely fallible boundary: construction.
//!
//! The arithmetic kernel itself never returns a `Result` — anomalous results
//! are reported through the sticky exception-flag cell (`crate::state`,
//! §7 of the design). Building a format wrapper from a raw byte slice of the
//! wrong length, or parsing a rounding-mode/NaN-policy name out of
//! configuration, are the only places this crate can fail outright.

use thiserror::Error;

/// Failure at the construction boundary: decoding a packed value from bytes,
/// or parsing a named rounding mode / NaN policy from configuration.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FormatError {
    /// A byte slice handed to a `from_*_bytes` constructor was the wrong
    /// length for the target format.
    #[error("expected {expected} bytes for this format, got {actual}")]
    InvalidByteLength {
        /// The format's packed width in bytes.
        expected: usize,
        /// The length actually supplied.
        actual: usize,
    },
    /// A configuration string did not name a known rounding mode.
    #[error("unknown rounding mode: {0:?}")]
    UnknownRoundingMode(String),
    /// A configuration string did not name a known NaN policy.
    #[error("unknown NaN mode: {0:?}")]
    UnknownNanMode(String),
}
