//! The 64-bit (double-precision) binary interchange format.

use super::Format;

/// A double-precision IEEE-754 value, stored as its raw 64-bit pattern.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct F64(pub u64);

impl F64 {
    /// Positive zero.
    pub const ZERO: Self = Self(0);
    /// Positive infinity.
    pub const INFINITY: Self = Self(0x7FF0_0000_0000_0000);
    /// Negative infinity.
    pub const NEG_INFINITY: Self = Self(0xFFF0_0000_0000_0000);

    /// Wraps a raw 64-bit pattern.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the raw 64-bit pattern.
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Converts from a host `f64`, for bridging to FPU-backed code.
    #[must_use]
    pub fn from_host(value: f64) -> Self {
        Self(value.to_bits())
    }

    /// Converts to a host `f64`, for the same bridging purpose.
    #[must_use]
    pub fn to_host(self) -> f64 {
        f64::from_bits(self.0)
    }

    /// The sign bit.
    #[must_use]
    pub const fn sign(self) -> bool {
        self.0 >> 63 != 0
    }

    /// Decodes a little-endian byte slice into a packed value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::FormatError::InvalidByteLength`] if `bytes`
    /// isn't exactly 8 bytes long.
    pub fn from_le_bytes(bytes: &[u8]) -> Result<Self, crate::error::FormatError> {
        let array: [u8; 8] =
            bytes
                .try_into()
                .map_err(|_| crate::error::FormatError::InvalidByteLength {
                    expected: 8,
                    actual: bytes.len(),
                })?;
        Ok(Self(u64::from_le_bytes(array)))
    }

    /// Encodes this value as little-endian bytes.
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl std::fmt::Debug for F64 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "F64(0x{:016x})", self.0)
    }
}

impl Format for F64 {
    type Bits = u64;

    const EXP_WIDTH: u32 = 11;
    const SIG_WIDTH: u32 = 52;
    const BIAS: i32 = 1023;

    fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    fn to_bits(self) -> u64 {
        self.0
    }
}
