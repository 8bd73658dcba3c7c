//! The 32-bit (single-precision) binary interchange format.

use super::Format;

/// A single-precision IEEE-754 value, stored as its raw 32-bit pattern.
///
/// Never a host `f32` internally — this crate's entire purpose is to not
/// depend on hardware float semantics. A lossy, explicitly-opt-in
/// conversion to/from host `f32` is provided for convenience at the edges.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct F32(pub u32);

impl F32 {
    /// Positive zero.
    pub const ZERO: Self = Self(0);
    /// Positive infinity.
    pub const INFINITY: Self = Self(0x7F80_0000);
    /// Negative infinity.
    pub const NEG_INFINITY: Self = Self(0xFF80_0000);

    /// Wraps a raw 32-bit pattern.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw 32-bit pattern.
    #[must_use]
    pub const fn to_bits(self) -> u32 {
        self.0
    }

    /// Converts from a host `f32`. Exists for convenience when bridging to
    /// code that does use the hardware FPU; this crate's own kernel never
    /// calls it.
    #[must_use]
    pub fn from_host(value: f32) -> Self {
        Self(value.to_bits())
    }

    /// Converts to a host `f32`, for the same bridging purpose.
    #[must_use]
    pub fn to_host(self) -> f32 {
        f32::from_bits(self.0)
    }

    /// The sign bit.
    #[must_use]
    pub const fn sign(self) -> bool {
        self.0 >> 31 != 0
    }

    /// Decodes a little-endian byte slice into a packed value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::FormatError::InvalidByteLength`] if `bytes`
    /// isn't exactly 4 bytes long.
    pub fn from_le_bytes(bytes: &[u8]) -> Result<Self, crate::error::FormatError> {
        let array: [u8; 4] =
            bytes
                .try_into()
                .map_err(|_| crate::error::FormatError::InvalidByteLength {
                    expected: 4,
                    actual: bytes.len(),
                })?;
        Ok(Self(u32::from_le_bytes(array)))
    }

    /// Encodes this value as little-endian bytes.
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl std::fmt::Debug for F32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "F32(0x{:08x})", self.0)
    }
}

impl Format for F32 {
    type Bits = u32;

    const EXP_WIDTH: u32 = 8;
    const SIG_WIDTH: u32 = 23;
    const BIAS: i32 = 127;

    fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    fn to_bits(self) -> u32 {
        self.0
    }
}
