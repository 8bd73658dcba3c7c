//! Target-selectable policy: NaN propagation rule, tininess-detection point,
//! and integer-conversion sentinel values.
//!
//! The historical library bakes these into build-time `#[cfg]`-equivalent
//! switches, one binary per target. Here they are run-time configuration, so
//! one process can run an x86 FPU model and a RISC-V FPU model side by side,
//! each against its own [`crate::state`] context.

/// Which operand a binary NaN-producing operation propagates, and how.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NanMode {
    /// x87/SSE: propagate an operand NaN (greater-magnitude payload wins,
    /// ties broken toward the smaller bit pattern), quieting it if signaling.
    X86,
    /// RISC-V: every NaN result collapses to the format's canonical NaN.
    RiscV,
}

impl std::str::FromStr for NanMode {
    type Err = crate::error::FormatError;

    /// Parses a NaN-policy name out of configuration (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x86" | "x87" | "sse" => Ok(Self::X86),
            "riscv" | "risc-v" | "risc_v" => Ok(Self::RiscV),
            other => Err(crate::error::FormatError::UnknownNanMode(other.to_owned())),
        }
    }
}

/// When tininess (result smaller in magnitude than the minimum normal) is
/// detected relative to the rounding step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TininessMode {
    /// Detect on the unrounded result.
    BeforeRounding,
    /// Detect on the rounded result.
    AfterRounding,
}

/// Sentinel values returned by out-of-range float-to-integer conversions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntSentinels {
    /// Returned for `i32` conversions of a NaN.
    pub i32_from_nan: i32,
    /// Returned for `i32` conversions that overflow toward +∞.
    pub i32_from_pos_overflow: i32,
    /// Returned for `i32` conversions that overflow toward −∞.
    pub i32_from_neg_overflow: i32,
    /// Returned for `i64` conversions of a NaN.
    pub i64_from_nan: i64,
    /// Returned for `i64` conversions that overflow toward +∞.
    pub i64_from_pos_overflow: i64,
    /// Returned for `i64` conversions that overflow toward −∞.
    pub i64_from_neg_overflow: i64,
    /// Returned for `u32` conversions of a NaN or overflow toward +∞.
    pub u32_from_nan_or_pos_overflow: u32,
    /// Returned for `u32` conversions that overflow toward −∞.
    pub u32_from_neg_overflow: u32,
    /// Returned for `u64` conversions of a NaN or overflow toward +∞.
    pub u64_from_nan_or_pos_overflow: u64,
    /// Returned for `u64` conversions that overflow toward −∞.
    pub u64_from_neg_overflow: u64,
}

impl IntSentinels {
    const X86: Self = Self {
        i32_from_nan: i32::MAX,
        i32_from_pos_overflow: i32::MAX,
        i32_from_neg_overflow: i32::MIN,
        i64_from_nan: i64::MAX,
        i64_from_pos_overflow: i64::MAX,
        i64_from_neg_overflow: i64::MIN,
        u32_from_nan_or_pos_overflow: u32::MAX,
        u32_from_neg_overflow: 0,
        u64_from_nan_or_pos_overflow: u64::MAX,
        u64_from_neg_overflow: 0,
    };

    const RISC_V: Self = Self {
        i32_from_nan: i32::MAX,
        i32_from_pos_overflow: i32::MAX,
        i32_from_neg_overflow: i32::MIN,
        i64_from_nan: i64::MAX,
        i64_from_pos_overflow: i64::MAX,
        i64_from_neg_overflow: i64::MIN,
        u32_from_nan_or_pos_overflow: u32::MAX,
        u32_from_neg_overflow: 0,
        u64_from_nan_or_pos_overflow: u64::MAX,
        u64_from_neg_overflow: 0,
    };
}

/// Bundle of target-selectable arithmetic policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Policy {
    /// NaN propagation rule.
    pub nan_mode: NanMode,
    /// Tininess-detection point.
    pub detect_tininess: TininessMode,
    /// Float-to-integer overflow/NaN sentinels.
    pub int_sentinels: IntSentinels,
}

impl Policy {
    /// The x87/SSE x86 target profile.
    #[must_use]
    pub const fn x86() -> Self {
        Self {
            nan_mode: NanMode::X86,
            detect_tininess: TininessMode::AfterRounding,
            int_sentinels: IntSentinels::X86,
        }
    }

    /// The RISC-V target profile.
    #[must_use]
    pub const fn risc_v() -> Self {
        Self {
            nan_mode: NanMode::RiscV,
            detect_tininess: TininessMode::AfterRounding,
            int_sentinels: IntSentinels::RISC_V,
        }
    }

    /// Builds a policy from explicit component choices, for embedders that
    /// need neither shipped profile verbatim (formal-verification harnesses
    /// most often want this).
    #[must_use]
    pub const fn custom(
        nan_mode: NanMode,
        detect_tininess: TininessMode,
        int_sentinels: IntSentinels,
    ) -> Self {
        Self {
            nan_mode,
            detect_tininess,
            int_sentinels,
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::risc_v()
    }
}
