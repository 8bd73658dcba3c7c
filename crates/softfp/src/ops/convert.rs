//! Float ↔ integer and float ↔ float conversions (§4.11 of the design),
//! generic over [`Format`].
//!
//! These don't fit [`crate::ops::SoftFloat`]'s one-type-per-call shape — a
//! conversion's source and destination types differ — so they're plain
//! generic functions instead of trait methods, called directly by the `ffi`
//! entry points and by any embedder working in pure Rust.

use crate::format::{self, quiet_bit, unpack, Format, Unpacked};
use crate::policy::NanMode;
use crate::round::{round_pack, round_increment, Exactness, Unrounded};
use crate::state::{self, ExceptionFlags, RoundingMode};

/// Shifts a 128-bit fixed-point magnitude right by `dist`, keeping the round
/// bit and sticky bit apart (unlike
/// [`crate::primitives::shift_right_jam_u128`], which pre-merges them) —
/// the integer-conversion tie rule still needs the truncated value's own LSB
/// for parity.
pub(crate) fn shift_right_round_sticky(x: u128, dist: u32) -> (u128, bool, bool) {
    if dist == 0 {
        (x, false, false)
    } else if dist > 128 {
        (0, false, x != 0)
    } else if dist == 128 {
        (0, (x >> 127) & 1 != 0, (x & !(1u128 << 127)) != 0)
    } else {
        let truncated = x >> dist;
        let round_bit = (x >> (dist - 1)) & 1 != 0;
        let sticky = (x & ((1u128 << (dist - 1)) - 1)) != 0;
        (truncated, round_bit, sticky)
    }
}

/// Converts a finite operand's `(exp, sig)` to a rounded unsigned magnitude,
/// raising `INEXACT` iff `exact` and a nonzero fraction was discarded. The
/// `u128` return is never too narrow: it has room for any finite format's
/// magnitude, with the caller range-checking against the actual target
/// width afterward.
pub(crate) fn finite_magnitude_to_u128(sign: bool, exp: i32, sig: u64, mode: RoundingMode, exact: bool) -> u128 {
    if exp > 127 {
        // Already far beyond any target integer width; the caller's range
        // check rejects this regardless of the precise magnitude.
        return u128::MAX;
    }
    let reg = u128::from(sig) << 64;
    let dist = 127 - exp;
    let (truncated, round_bit, sticky) = if dist <= 0 {
        (reg, false, false)
    } else {
        shift_right_round_sticky(reg, dist as u32)
    };
    let lsb_odd = truncated & 1 != 0;
    if exact && (round_bit || sticky) {
        state::raise_flags(ExceptionFlags::INEXACT);
    }
    if round_increment(mode, sign, round_bit, sticky, lsb_odd) {
        truncated + 1
    } else {
        truncated
    }
}

enum Classified {
    Value { magnitude: u128, sign: bool },
    Nan,
    Overflow { toward_positive: bool },
}

fn classify_for_int<F: Format>(a: F, mode: RoundingMode, exact: bool) -> Classified {
    match unpack(a) {
        Unpacked::Nan { .. } => Classified::Nan,
        Unpacked::Infinity { sign } => Classified::Overflow {
            toward_positive: !sign,
        },
        Unpacked::Zero { .. } => Classified::Value {
            magnitude: 0,
            sign: false,
        },
        Unpacked::Finite { sign, exp, sig } => Classified::Value {
            magnitude: finite_magnitude_to_u128(sign, exp, sig, mode, exact),
            sign,
        },
    }
}

macro_rules! signed_conversion {
    ($name:ident, $ty:ty, $minmag_name:ident, $nan_field:ident, $pos_field:ident, $neg_field:ident) => {
        /// Converts `a` to the nearest representable integer of this width,
        /// rounding under `mode`; raises `INVALID` and returns the policy's
        /// overflow/NaN sentinel when out of range.
        pub(crate) fn $name<F: Format>(a: F, mode: RoundingMode, exact: bool) -> $ty {
            let sentinels = state::get_policy().int_sentinels;
            match classify_for_int(a, mode, exact) {
                Classified::Nan => {
                    state::raise_flags(ExceptionFlags::INVALID);
                    sentinels.$nan_field
                }
                Classified::Overflow { toward_positive } => {
                    state::raise_flags(ExceptionFlags::INVALID);
                    if toward_positive {
                        sentinels.$pos_field
                    } else {
                        sentinels.$neg_field
                    }
                }
                Classified::Value { magnitude, sign } => {
                    let limit = if sign {
                        (<$ty>::MAX as u128) + 1
                    } else {
                        <$ty>::MAX as u128
                    };
                    if magnitude > limit {
                        state::raise_flags(ExceptionFlags::INVALID);
                        if sign {
                            sentinels.$neg_field
                        } else {
                            sentinels.$pos_field
                        }
                    } else if sign {
                        (-(magnitude as i128)) as $ty
                    } else {
                        magnitude as $ty
                    }
                }
            }
        }

        /// As [`
        #[doc = stringify!($name)]
        /// `], but always truncating toward zero (the `_r_minMag` entry
        /// point: same core, mode pinned to
        /// [`RoundingMode::MinMag`]).
        pub(crate) fn $minmag_name<F: Format>(a: F, exact: bool) -> $ty {
            $name(a, RoundingMode::MinMag, exact)
        }
    };
}

macro_rules! unsigned_conversion {
    ($name:ident, $ty:ty, $minmag_name:ident, $nan_or_pos_field:ident, $neg_field:ident) => {
        /// Converts `a` to the nearest representable `
        #[doc = stringify!($ty)]
        /// `, rounding under `mode`; raises `INVALID` and returns the
        /// policy's overflow/NaN sentinel when out of range or negative.
        pub(crate) fn $name<F: Format>(a: F, mode: RoundingMode, exact: bool) -> $ty {
            let sentinels = state::get_policy().int_sentinels;
            match classify_for_int(a, mode, exact) {
                Classified::Nan => {
                    state::raise_flags(ExceptionFlags::INVALID);
                    sentinels.$nan_or_pos_field
                }
                Classified::Overflow { toward_positive } => {
                    state::raise_flags(ExceptionFlags::INVALID);
                    if toward_positive {
                        sentinels.$nan_or_pos_field
                    } else {
                        sentinels.$neg_field
                    }
                }
                Classified::Value { magnitude, sign } => {
                    if sign && magnitude != 0 {
                        state::raise_flags(ExceptionFlags::INVALID);
                        sentinels.$neg_field
                    } else if magnitude > <$ty>::MAX as u128 {
                        state::raise_flags(ExceptionFlags::INVALID);
                        sentinels.$nan_or_pos_field
                    } else {
                        magnitude as $ty
                    }
                }
            }
        }

        /// As [`
        #[doc = stringify!($name)]
        /// `], but always truncating toward zero.
        pub(crate) fn $minmag_name<F: Format>(a: F, exact: bool) -> $ty {
            $name(a, RoundingMode::MinMag, exact)
        }
    };
}

signed_conversion!(to_i32, i32, to_i32_r_minmag, i32_from_nan, i32_from_pos_overflow, i32_from_neg_overflow);
signed_conversion!(to_i64, i64, to_i64_r_minmag, i64_from_nan, i64_from_pos_overflow, i64_from_neg_overflow);
unsigned_conversion!(to_u32, u32, to_u32_r_minmag, u32_from_nan_or_pos_overflow, u32_from_neg_overflow);
unsigned_conversion!(to_u64, u64, to_u64_r_minmag, u64_from_nan_or_pos_overflow, u64_from_neg_overflow);

fn from_magnitude<F: Format>(sign: bool, magnitude: u64) -> F {
    if magnitude == 0 {
        return format::pack_zero(sign);
    }
    let shift = magnitude.leading_zeros();
    let sig = magnitude << shift;
    let exp = 63 - shift as i32;
    round_pack(
        Unrounded {
            sign,
            exp,
            sig,
            sticky: false,
        },
        Exactness::Exact,
    )
}

/// Converts a signed 32-bit integer to `F`, exactly when `F` has enough
/// significand bits and otherwise rounded under the ambient rounding mode.
pub(crate) fn from_i32<F: Format>(a: i32) -> F {
    from_magnitude(a < 0, i64::from(a).unsigned_abs())
}

/// As [`from_i32`], for a 64-bit signed integer.
pub(crate) fn from_i64<F: Format>(a: i64) -> F {
    from_magnitude(a < 0, a.unsigned_abs())
}

/// Converts an unsigned 32-bit integer to `F`.
pub(crate) fn from_u32<F: Format>(a: u32) -> F {
    from_magnitude(false, u64::from(a))
}

/// As [`from_u32`], for a 64-bit unsigned integer.
pub(crate) fn from_u64<F: Format>(a: u64) -> F {
    from_magnitude(false, a)
}

/// Converts `a` from one binary format to another. Widening is always
/// exact; narrowing goes through the destination's own round-pack, so it
/// raises `OVERFLOW`/`UNDERFLOW`/`INEXACT` exactly as a narrow-format
/// arithmetic result would.
pub(crate) fn convert<From: Format, To: Format>(a: From) -> To {
    match unpack(a) {
        Unpacked::Nan {
            sign,
            signaling,
            payload,
        } => {
            if signaling {
                state::raise_flags(ExceptionFlags::INVALID);
            }
            match state::get_policy().nan_mode {
                NanMode::RiscV => format::pack_canonical_nan(),
                NanMode::X86 => {
                    // Re-justify the payload from `From`'s fraction width to
                    // `To`'s, anchored at the same left-justified-to-63
                    // convention `format::unpack` uses for significands.
                    let left_justified = payload << (63 - From::SIG_WIDTH);
                    let narrowed = left_justified >> (63 - To::SIG_WIDTH);
                    format::pack_raw_nan(sign, false, narrowed | quiet_bit(To::SIG_WIDTH))
                }
            }
        }
        Unpacked::Infinity { sign } => format::pack_infinity(sign),
        Unpacked::Zero { sign } => format::pack_zero(sign),
        Unpacked::Finite { sign, exp, sig } => round_pack(
            Unrounded {
                sign,
                exp,
                sig,
                sticky: false,
            },
            Exactness::Exact,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{convert, from_i32, from_u64, to_i32, to_i32_r_minmag, to_u32};
    use crate::format::{F32, F64};
    use crate::policy::Policy;
    use crate::state::{self, RoundingMode};

    fn setup() {
        state::set_policy(Policy::risc_v());
        state::set_rounding_mode(RoundingMode::NearEven);
        state::clear_flags();
    }

    #[test]
    fn f32_to_i32_rounds_half_to_even() {
        setup();
        let two_point_five = F32::from_bits(0x4020_0000);
        assert_eq!(to_i32(two_point_five, RoundingMode::NearEven, true), 2);
    }

    #[test]
    fn f32_to_i32_minmag_truncates() {
        setup();
        let huge_integral = F32::from_bits(0x4B80_0000); // 16777216.0
        assert_eq!(to_i32_r_minmag(huge_integral, false), 16_777_216);
        assert!(state::get_flags().is_empty());
    }

    #[test]
    fn f32_to_i32_overflow_raises_invalid_and_returns_sentinel() {
        setup();
        let result = to_i32(F32::from_bits(0x4F80_0000), RoundingMode::NearEven, true); // 2^32
        assert_eq!(result, i32::MAX);
        assert!(state::get_flags().contains(state::ExceptionFlags::INVALID));
    }

    #[test]
    fn f32_to_u32_rejects_negative() {
        setup();
        let minus_one = F32::from_bits(0xBF80_0000);
        let result = to_u32(minus_one, RoundingMode::NearEven, true);
        assert_eq!(result, 0);
        assert!(state::get_flags().contains(state::ExceptionFlags::INVALID));
    }

    #[test]
    fn nan_to_i32_raises_invalid_and_returns_sentinel() {
        setup();
        let result = to_i32(F32::from_bits(0x7FC0_0000), RoundingMode::NearEven, true);
        assert_eq!(result, i32::MAX);
        assert!(state::get_flags().contains(state::ExceptionFlags::INVALID));
    }

    #[test]
    fn i32_round_trips_through_from_i32() {
        setup();
        let value: F32 = from_i32(-100);
        assert_eq!(to_i32(value, RoundingMode::NearEven, true), -100);
        assert!(state::get_flags().is_empty());
    }

    #[test]
    fn u64_max_widens_to_f64_inexactly() {
        setup();
        let value: F64 = from_u64(u64::MAX);
        assert!(state::get_flags().contains(state::ExceptionFlags::INEXACT));
        assert_eq!(to_i32_r_minmag(value, false).max(0), i32::MAX); // sanity: huge
    }

    #[test]
    fn f32_widens_to_f64_exactly() {
        setup();
        let pi_ish = F32::from_bits(0x4049_0FDB);
        let widened: F64 = convert(pi_ish);
        assert!(state::get_flags().is_empty());
        let narrowed: F32 = convert(widened);
        assert_eq!(narrowed, pi_ish);
    }

    #[test]
    fn quiet_nan_widens_without_raising_invalid() {
        setup();
        let qnan = F32::from_bits(0x7FC0_0000);
        let widened: F64 = convert(qnan);
        assert!(state::get_flags().is_empty());
        assert_eq!(widened.to_bits(), 0x7FF8_0000_0000_0000);
    }

    #[test]
    fn signaling_nan_conversion_raises_invalid() {
        setup();
        let snan = F32::from_bits(0x7FA0_0001);
        let _: F64 = convert(snan);
        assert!(state::get_flags().contains(state::ExceptionFlags::INVALID));
    }
}
