//! IEEE remainder (§4.8 of the design), generic over [`Format`].
//!
//! `x rem y = x - n*y` for `n` the integer nearest `x/y` (ties to even), and
//! is always computed exactly — no rounding step is ever needed, since the
//! result's magnitude never exceeds half of `y`'s. The historical library
//! gets there with an iterative digit-recurrence loop seeded from an
//! approximate reciprocal, consuming a bounded number of exponent bits per
//! pass. This reimplements the same bounded-iteration shape with an exact
//! binary long-division recurrence instead (doubling the running remainder
//! and reducing modulo the divisor one bit at a time), which needs no
//! boundary-correction branch because every step is exact by construction.

use crate::format::{self, unpack, Format, Unpacked};
use crate::nan::propagate_nan;
use crate::round::{round_pack, Exactness, Unrounded};
use crate::state::{self, ExceptionFlags};

/// `a rem b`.
pub(crate) fn rem<F: Format>(a: F, b: F) -> F {
    let ua = unpack(a);
    let ub = unpack(b);

    if matches!(ua, Unpacked::Nan { .. }) || matches!(ub, Unpacked::Nan { .. }) {
        return propagate_nan(a, b);
    }
    if matches!(ua, Unpacked::Infinity { .. }) || matches!(ub, Unpacked::Zero { .. }) {
        state::raise_flags(ExceptionFlags::INVALID);
        return format::pack_canonical_nan();
    }
    if matches!(ub, Unpacked::Infinity { .. }) {
        return a;
    }
    if matches!(ua, Unpacked::Zero { .. }) {
        return a;
    }

    let Unpacked::Finite {
        sign: sa,
        exp: ea,
        sig: siga,
    } = ua
    else {
        unreachable!("remaining case is Finite")
    };
    let Unpacked::Finite { exp: eb, sig: sigb, .. } = ub else {
        unreachable!("remaining case is Finite")
    };

    let gap = ea - eb;
    if gap < -1 {
        // `|a| < |b| / 2` already: `a` is its own correctly-rounded remainder.
        return a;
    }

    // Fold the `gap == -1` case into the `gap >= 0` loop by working against
    // `2*b` (at exponent `eb - 1`) instead of `b` directly: the real value is
    // unchanged, and the exponent gap against the adjusted divisor is now 0.
    let adjust = i32::from(gap == -1);
    let eb_work = eb - adjust;
    let modulus = u128::from(sigb) << adjust;
    let gap_work = (ea - eb_work) as u32;

    // Binary long division of `siga` by `modulus`, carrying only the running
    // remainder and the last quotient bit produced (which is the LSB of the
    // overall quotient `floor(|a| / |b|)`, needed for the ties-to-even rule
    // below) — never the quotient itself, which can run unboundedly large
    // when the exponents are far apart.
    let mut acc = u128::from(siga) % modulus;
    let mut lsb = (u128::from(siga) / modulus) & 1 != 0;
    for _ in 0..gap_work {
        let doubled = acc * 2;
        if doubled >= modulus {
            acc = doubled - modulus;
            lsb = true;
        } else {
            acc = doubled;
            lsb = false;
        }
    }

    let take_upper = (2 * acc > modulus) || (2 * acc == modulus && lsb);
    let (r_mag, result_sign) = if take_upper {
        (modulus - acc, !sa)
    } else {
        (acc, sa)
    };

    if r_mag == 0 {
        return format::pack_zero(result_sign);
    }

    // The centered remainder is always strictly smaller than `modulus / 2`,
    // which is itself smaller than `2^64`: this always fits a `u64`, and the
    // pack below is always exact (no discarded bits, so no `INEXACT`).
    let r_mag = r_mag as u64;
    let shift = r_mag.leading_zeros();
    round_pack(
        Unrounded {
            sign: result_sign,
            exp: eb_work - shift as i32,
            sig: r_mag << shift,
            sticky: false,
        },
        Exactness::Exact,
    )
}

#[cfg(test)]
mod tests {
    use super::rem;
    use crate::format::F32;
    use crate::policy::Policy;
    use crate::state::{self, RoundingMode};

    fn setup() {
        state::set_policy(Policy::risc_v());
        state::set_rounding_mode(RoundingMode::NearEven);
        state::clear_flags();
    }

    #[test]
    fn seven_rem_three_is_one() {
        setup();
        let seven = F32::from_bits(0x40E0_0000);
        let three = F32::from_bits(0x4040_0000);
        let result = rem(seven, three);
        assert_eq!(result.to_bits(), 0x3F80_0000); // +1.0
    }

    #[test]
    fn three_rem_two_rounds_to_minus_one_on_exact_tie() {
        setup();
        let three = F32::from_bits(0x4040_0000);
        let two = F32::from_bits(0x4000_0000);
        let result = rem(three, two);
        assert_eq!(result.to_bits(), 0xBF80_0000); // -1.0: 3/2 = 1.5 ties to 2 (even)
    }

    #[test]
    fn two_rem_four_is_two_on_exact_tie_to_even_zero() {
        setup();
        let two = F32::from_bits(0x4000_0000);
        let four = F32::from_bits(0x4080_0000);
        let result = rem(two, four);
        assert_eq!(result.to_bits(), 0x4000_0000); // +2.0: 2/4 = 0.5 ties to 0 (even)
    }

    #[test]
    fn x_rem_infinity_is_x() {
        setup();
        let x = F32::from_bits(0x4012_3456);
        let result = rem(x, F32::INFINITY);
        assert_eq!(result, x);
    }

    #[test]
    fn x_rem_zero_is_invalid() {
        setup();
        let x = F32::from_bits(0x4012_3456);
        let result = rem(x, F32::ZERO);
        assert!(state::get_flags().contains(state::ExceptionFlags::INVALID));
        assert_eq!(result.to_bits(), 0x7FC0_0000);
    }
}
