//! Per-operation algorithms (§4.4–§4.12 of the design), generic over
//! [`crate::format::Format`] for f16/f32/f64. f128 and extF80 implement the
//! same operation surface by hand in [`crate::f128`] / [`crate::extf80`]
//! since their significands don't fit the shared 64-bit working register.

pub(crate) mod add_sub;
pub(crate) mod compare;
pub(crate) mod convert;
pub(crate) mod div;
pub(crate) mod fma;
pub(crate) mod mul;
pub(crate) mod rem;
pub(crate) mod round_to_int;
pub(crate) mod sqrt;

use crate::format::Format;
use crate::state::RoundingMode;

/// The full arithmetic-kernel operation surface, implemented once generically
/// over every [`Format`] (f16/f32/f64) and by hand for [`crate::f128::F128`]
/// and [`crate::extf80::ExtF80`].
///
/// Every method here consumes the ambient rounding mode and policy
/// (`crate::state`) rather than taking them as parameters, except
/// [`SoftFloat::round_to_int`], which mirrors the external C entry points'
/// explicit-rounding-mode convention for conversions (§6 of the design).
pub trait SoftFloat: Copy {
    /// `self + rhs`.
    #[must_use]
    fn add(self, rhs: Self) -> Self;
    /// `self - rhs`.
    #[must_use]
    fn sub(self, rhs: Self) -> Self;
    /// `self * rhs`.
    #[must_use]
    fn mul(self, rhs: Self) -> Self;
    /// `self * b + c`, rounded once (§4.6).
    #[must_use]
    fn mul_add(self, b: Self, c: Self) -> Self;
    /// `self / rhs`.
    #[must_use]
    fn div(self, rhs: Self) -> Self;
    /// IEEE-754 remainder: `self - n * rhs` for `n` the nearest integer to
    /// `self / rhs`, ties to even (§4.8).
    #[must_use]
    fn rem(self, rhs: Self) -> Self;
    /// Square root.
    #[must_use]
    fn sqrt(self) -> Self;
    /// Rounds to the nearest representable integer under `mode`, raising
    /// `INEXACT` iff `exact` and the result differs from `self`.
    #[must_use]
    fn round_to_int(self, mode: RoundingMode, exact: bool) -> Self;
    /// Quiet equality: unordered (any NaN) compares unequal; raises
    /// `INVALID` only on a signaling-NaN operand.
    #[must_use]
    fn eq(self, rhs: Self) -> bool;
    /// `self <= rhs`, raising `INVALID` on any NaN operand (signaling or
    /// quiet) per §4.12.
    #[must_use]
    fn le(self, rhs: Self) -> bool;
    /// `self < rhs`, raising `INVALID` on any NaN operand.
    #[must_use]
    fn lt(self, rhs: Self) -> bool;
    /// Signaling equality: raises `INVALID` on any NaN operand.
    #[must_use]
    fn eq_signaling(self, rhs: Self) -> bool;
    /// Quiet `self <= rhs`: raises `INVALID` only on a signaling-NaN operand.
    #[must_use]
    fn le_quiet(self, rhs: Self) -> bool;
    /// Quiet `self < rhs`: raises `INVALID` only on a signaling-NaN operand.
    #[must_use]
    fn lt_quiet(self, rhs: Self) -> bool;
    /// True iff `self` is a signaling NaN.
    #[must_use]
    fn is_signaling_nan(self) -> bool;
}

impl<F: Format> SoftFloat for F {
    fn add(self, rhs: Self) -> Self {
        add_sub::add(self, rhs)
    }

    fn sub(self, rhs: Self) -> Self {
        add_sub::sub(self, rhs)
    }

    fn mul(self, rhs: Self) -> Self {
        mul::mul(self, rhs)
    }

    fn mul_add(self, b: Self, c: Self) -> Self {
        fma::mul_add(self, b, c)
    }

    fn div(self, rhs: Self) -> Self {
        div::div(self, rhs)
    }

    fn rem(self, rhs: Self) -> Self {
        rem::rem(self, rhs)
    }

    fn sqrt(self) -> Self {
        sqrt::sqrt(self)
    }

    fn round_to_int(self, mode: RoundingMode, exact: bool) -> Self {
        round_to_int::round_to_int(self, mode, exact)
    }

    fn eq(self, rhs: Self) -> bool {
        compare::eq(self, rhs, compare::Signaling::No)
    }

    fn le(self, rhs: Self) -> bool {
        compare::le(self, rhs, compare::Signaling::Yes)
    }

    fn lt(self, rhs: Self) -> bool {
        compare::lt(self, rhs, compare::Signaling::Yes)
    }

    fn eq_signaling(self, rhs: Self) -> bool {
        compare::eq(self, rhs, compare::Signaling::Yes)
    }

    fn le_quiet(self, rhs: Self) -> bool {
        compare::le(self, rhs, compare::Signaling::No)
    }

    fn lt_quiet(self, rhs: Self) -> bool {
        compare::lt(self, rhs, compare::Signaling::No)
    }

    fn is_signaling_nan(self) -> bool {
        compare::is_signaling_nan(self)
    }
}
