//! Round-to-integral-value (§4.10 of the design), generic over [`Format`].

use crate::format::{self, unpack, Format, Unpacked};
use crate::nan::propagate_nan_unary;
use crate::round::round_increment;
use crate::state::{self, ExceptionFlags, RoundingMode};

/// Rounds `a` to the nearest representable integer under `mode`, raising
/// `INEXACT` iff `exact` and the result differs from `a`.
pub(crate) fn round_to_int<F: Format>(a: F, mode: RoundingMode, exact: bool) -> F {
    match unpack(a) {
        Unpacked::Nan { .. } => propagate_nan_unary(a),
        Unpacked::Zero { .. } | Unpacked::Infinity { .. } => a,
        Unpacked::Finite { sign, exp, sig } => {
            // `value = sig * 2^(exp-63)`; the unit (ones) bit of the integer
            // result sits at bit `63 - exp` of `sig`. `exp >= 63` means even
            // bit 0 already carries weight `>= 2^0`, so every bit of `sig`
            // is above the integer boundary: the value is already integral.
            if exp >= 63 {
                return a;
            }

            if exp < 0 {
                return round_fraction_below_one::<F>(sign, exp, sig, mode, exact);
            }

            round_middle::<F>(sign, exp, sig, mode, exact)
        }
    }
}

/// `0 <= exp <= 62`: some low bits of `sig` are fractional, the rest
/// integral. Masks them off, rounds by the standard guard/round/sticky rule,
/// and folds any carry out of the integer part into the exponent.
fn round_middle<F: Format>(sign: bool, exp: i32, sig: u64, mode: RoundingMode, exact: bool) -> F {
    let shift = (63 - exp) as u32;
    let frac_mask = (1u64 << shift) - 1;
    let int_part = sig & !frac_mask;
    let frac = sig & frac_mask;

    let round_bit = (frac >> (shift - 1)) & 1 != 0;
    let sticky = (frac & ((1u64 << (shift - 1)) - 1)) != 0;
    let lsb_odd = (int_part >> shift) & 1 != 0;
    let inexact = round_bit || sticky;

    if exact && inexact {
        state::raise_flags(ExceptionFlags::INEXACT);
    }

    if !round_increment(mode, sign, round_bit, sticky, lsb_odd) {
        return repack::<F>(sign, exp, int_part);
    }

    let (new_int, carried) = int_part.overflowing_add(1u64 << shift);
    if carried {
        repack::<F>(sign, exp + 1, 1u64 << 63)
    } else {
        repack::<F>(sign, exp, new_int)
    }
}

/// `exp < 0`: `|value| < 1`. The result is `±0` or `±1`, decided by the same
/// round-increment rule with the implicit unit bit (0, always even) as the
/// LSB — `exp == -1` puts `value` in `[0.5, 1)` (a genuine round/tie), any
/// more negative exponent puts it below `0.25` (never a tie).
fn round_fraction_below_one<F: Format>(
    sign: bool,
    exp: i32,
    sig: u64,
    mode: RoundingMode,
    exact: bool,
) -> F {
    let round_bit = exp == -1;
    let sticky = if exp == -1 { sig != 1u64 << 63 } else { true };

    if exact {
        state::raise_flags(ExceptionFlags::INEXACT);
    }

    if round_increment(mode, sign, round_bit, sticky, false) {
        repack::<F>(sign, 0, 1u64 << 63)
    } else {
        format::pack_zero(sign)
    }
}

/// Packs an already-integral `(sign, exp, sig)` — exact by construction, so
/// this never raises a flag itself (the caller already raised `INEXACT` if
/// warranted) and never overflows the format's range, since `round_to_int`
/// only ever shrinks a value's magnitude toward the nearest integer.
fn repack<F: Format>(sign: bool, exp: i32, sig: u64) -> F {
    crate::round::round_pack::<F>(
        crate::round::Unrounded {
            sign,
            exp,
            sig,
            sticky: false,
        },
        crate::round::Exactness::MayDiscard,
    )
}

#[cfg(test)]
mod tests {
    use super::round_to_int;
    use crate::format::F32;
    use crate::policy::Policy;
    use crate::state::{self, RoundingMode};

    fn setup() {
        state::set_policy(Policy::risc_v());
        state::clear_flags();
    }

    #[test]
    fn two_point_five_rounds_to_two_under_near_even() {
        setup();
        let two_point_five = F32::from_bits(0x4020_0000);
        let result = round_to_int(two_point_five, RoundingMode::NearEven, true);
        assert_eq!(result.to_bits(), 0x4000_0000);
        assert!(state::get_flags().contains(state::ExceptionFlags::INEXACT));
    }

    #[test]
    fn three_point_five_rounds_to_four_under_near_even() {
        setup();
        let three_point_five = F32::from_bits(0x4060_0000);
        let result = round_to_int(three_point_five, RoundingMode::NearEven, true);
        assert_eq!(result.to_bits(), 0x4080_0000);
    }

    #[test]
    fn half_rounds_to_zero_under_near_even() {
        setup();
        let half = F32::from_bits(0x3F00_0000);
        let result = round_to_int(half, RoundingMode::NearEven, true);
        assert_eq!(result, F32::ZERO);
        assert!(!result.sign());
    }

    #[test]
    fn negative_half_rounds_to_negative_zero() {
        setup();
        let neg_half = F32::from_bits(0xBF00_0000);
        let result = round_to_int(neg_half, RoundingMode::NearEven, true);
        assert_eq!(result.to_bits(), 0x8000_0000);
    }

    #[test]
    fn already_integral_is_unchanged_and_exact() {
        setup();
        let four = F32::from_bits(0x4080_0000);
        let result = round_to_int(four, RoundingMode::NearEven, true);
        assert_eq!(result, four);
        assert!(state::get_flags().is_empty());
    }

    #[test]
    fn min_mag_truncates_toward_zero() {
        setup();
        let two_point_nine = F32::from_bits(0x4039_9999); // 2.9
        let result = round_to_int(two_point_nine, RoundingMode::MinMag, false);
        assert_eq!(result.to_bits(), 0x4000_0000); // 2.0, no flag (exact=false)
        assert!(state::get_flags().is_empty());
    }
}
