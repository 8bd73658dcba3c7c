//! Ambient per-thread rounding mode, target policy, and sticky exception flags.
//!
//! The kernel is otherwise a pure function of its operands; this is the one
//! piece of global mutable state IEEE-754 requires (§5, §6 of the design).
//! Each thread gets its own cell, so two threads never observe each other's
//! mode, policy, or flags.

use std::cell::Cell;

use crate::policy::Policy;

/// IEEE-754 rounding directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundingMode {
    /// Round to nearest, ties to even (the IEEE-754 default).
    NearEven,
    /// Round toward zero.
    MinMag,
    /// Round toward negative infinity.
    Min,
    /// Round toward positive infinity.
    Max,
    /// Round to nearest, ties away from zero (to max magnitude).
    NearMaxMag,
}

impl std::str::FromStr for RoundingMode {
    type Err = crate::error::FormatError;

    /// Parses a rounding-mode name out of configuration (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "neareven" | "near_even" | "rne" => Ok(Self::NearEven),
            "minmag" | "min_mag" | "rtz" | "towardzero" => Ok(Self::MinMag),
            "min" | "rdn" | "towardnegative" => Ok(Self::Min),
            "max" | "rup" | "towardpositive" => Ok(Self::Max),
            "nearmaxmag" | "near_max_mag" | "rna" => Ok(Self::NearMaxMag),
            other => Err(crate::error::FormatError::UnknownRoundingMode(
                other.to_owned(),
            )),
        }
    }
}

/// Sticky IEEE-754 exception flags.
///
/// Once raised, a flag remains set until [`clear_flags`] is called
/// explicitly; the kernel never clears a flag on its own. Shaped after the
/// teacher's own `FpFlags`: a const per bit, `bits`/`contains` accessors,
/// `BitOr` for combining freshly-raised flags before a single sticky-OR.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExceptionFlags(u8);

impl ExceptionFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Any nonzero bit was discarded by rounding.
    pub const INEXACT: Self = Self(1 << 0);
    /// Result is a nonzero subnormal produced by rounding an inexact value.
    pub const UNDERFLOW: Self = Self(1 << 1);
    /// Rounded result magnitude exceeds the format's maximum finite value.
    pub const OVERFLOW: Self = Self(1 << 2);
    /// Finite value divided by zero.
    pub const INFINITE: Self = Self(1 << 3);
    /// NaN input to a signaling operation, or another operation with no
    /// mathematically meaningful result (0/0, ∞−∞, sqrt of a negative, ...).
    pub const INVALID: Self = Self(1 << 4);

    /// The raw bitmask.
    #[must_use]
    pub fn bits(self) -> u8 {
        self.0
    }

    /// True if no flags are set.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True iff every bit of `other` is set in `self`.
    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for ExceptionFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

thread_local! {
    static ROUNDING_MODE: Cell<RoundingMode> = const { Cell::new(RoundingMode::NearEven) };
    static POLICY: Cell<Policy> = Cell::new(Policy::risc_v());
    static FLAGS: Cell<ExceptionFlags> = const { Cell::new(ExceptionFlags::NONE) };
}

/// Returns the calling thread's current rounding mode.
#[must_use]
pub fn get_rounding_mode() -> RoundingMode {
    ROUNDING_MODE.with(Cell::get)
}

/// Sets the calling thread's rounding mode.
pub fn set_rounding_mode(mode: RoundingMode) {
    ROUNDING_MODE.with(|cell| cell.set(mode));
}

/// Returns the calling thread's current target policy.
#[must_use]
pub fn get_policy() -> Policy {
    POLICY.with(Cell::get)
}

/// Sets the calling thread's target policy.
pub fn set_policy(policy: Policy) {
    tracing::debug!(?policy, "softfp: policy changed");
    POLICY.with(|cell| cell.set(policy));
}

/// Sticky-ORs `flags` into the calling thread's exception-flag cell.
pub fn raise_flags(flags: ExceptionFlags) {
    if flags.contains(ExceptionFlags::INVALID) || flags.contains(ExceptionFlags::INFINITE) {
        tracing::trace!(bits = flags.bits(), "softfp: raised exception flags");
    }
    FLAGS.with(|cell| cell.set(cell.get() | flags));
}

/// Returns the calling thread's accrued exception flags.
#[must_use]
pub fn get_flags() -> ExceptionFlags {
    FLAGS.with(Cell::get)
}

/// Clears the calling thread's accrued exception flags.
pub fn clear_flags() {
    FLAGS.with(|cell| cell.set(ExceptionFlags::NONE));
}

#[cfg(test)]
mod tests {
    use super::{
        clear_flags, get_flags, get_rounding_mode, raise_flags, set_rounding_mode,
        ExceptionFlags, RoundingMode,
    };

    #[test]
    fn flags_are_sticky_until_cleared() {
        clear_flags();
        raise_flags(ExceptionFlags::INEXACT);
        raise_flags(ExceptionFlags::NONE);
        assert!(get_flags().contains(ExceptionFlags::INEXACT));
        clear_flags();
        assert!(get_flags().is_empty());
    }

    #[test]
    fn rounding_mode_round_trips() {
        set_rounding_mode(RoundingMode::Min);
        assert_eq!(get_rounding_mode(), RoundingMode::Min);
        set_rounding_mode(RoundingMode::NearEven);
        assert_eq!(get_rounding_mode(), RoundingMode::NearEven);
    }

    #[test]
    fn flags_are_thread_local() {
        clear_flags();
        raise_flags(ExceptionFlags::OVERFLOW);
        let other = std::thread::spawn(super::get_flags).join().unwrap();
        assert!(other.is_empty());
        assert!(get_flags().contains(ExceptionFlags::OVERFLOW));
    }
}
