//! Square root (§4.9 of the design), generic over [`Format`].
//!
//! The historical library computes this from an approximate reciprocal
//! square root (`softfloat_approxRecipSqrt32_1`) refined by two
//! Newton-Raphson passes and a boundary-correction branch comparing against
//! the exact remainder. Since the generic path's significand fits in 64
//! bits, the same result comes directly from one native 128-bit integer
//! square root: fold the operand's exponent parity into a `[2^126, 2^128)`
//! window whose integer square root is always a correctly left-justified
//! 64-bit significand, with the exact remainder doubling as the round/sticky
//! information. The approximate primitive stays reserved for f128/extF80,
//! where no integer type wide enough for a native `isqrt` exists.

use crate::format::{self, unpack, Format, Unpacked};
use crate::nan::propagate_nan_unary;
use crate::round::{round_pack, Exactness, Unrounded};
use crate::state::{self, ExceptionFlags};

/// `sqrt(a)`.
pub(crate) fn sqrt<F: Format>(a: F) -> F {
    match unpack(a) {
        Unpacked::Nan { .. } => propagate_nan_unary(a),
        Unpacked::Zero { .. } => a,
        Unpacked::Infinity { sign: false } => a,
        Unpacked::Infinity { sign: true } | Unpacked::Finite { sign: true, .. } => {
            state::raise_flags(ExceptionFlags::INVALID);
            format::pack_canonical_nan()
        }
        Unpacked::Finite {
            sign: false,
            exp,
            sig,
        } => {
            // `value = sig * 2^(exp-63)`, `sig` in `[2^63, 2^64)`. Write
            // `exp = 2*re + r` (`r` in `{0,1}`, via Euclidean division so
            // negative exponents still land on a nonnegative remainder),
            // then `value = (sig << (63+r)) * 2^(2*re-126)`, and the bracket
            // — call it `m` — always falls in `[2^126, 2^128)` regardless of
            // `r`, so `isqrt(m)` is always a 64-bit value already
            // left-justified at bit 63.
            let re = exp.div_euclid(2);
            let r = exp.rem_euclid(2) as u32;
            let m: u128 = u128::from(sig) << (63 + r);
            let rsig = m.isqrt() as u64;
            let remainder = m - u128::from(rsig) * u128::from(rsig);

            round_pack(
                Unrounded {
                    sign: false,
                    exp: re,
                    sig: rsig,
                    sticky: remainder != 0,
                },
                Exactness::Exact,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::sqrt;
    use crate::format::F32;
    use crate::policy::Policy;
    use crate::state::{self, RoundingMode};

    fn setup() {
        state::set_policy(Policy::risc_v());
        state::set_rounding_mode(RoundingMode::NearEven);
        state::clear_flags();
    }

    #[test]
    fn sqrt_of_four_is_two_exactly() {
        setup();
        let four = F32::from_bits(0x4080_0000);
        let result = sqrt(four);
        assert_eq!(result.to_bits(), 0x4000_0000);
        assert!(state::get_flags().is_empty());
    }

    #[test]
    fn sqrt_of_two_is_inexact() {
        setup();
        let two = F32::from_bits(0x4000_0000);
        let result = sqrt(two);
        assert_eq!(result.to_bits(), 0x3FB5_04F3);
        assert!(state::get_flags().contains(state::ExceptionFlags::INEXACT));
    }

    #[test]
    fn sqrt_of_negative_is_invalid() {
        setup();
        let result = sqrt(F32::from_bits(0xBF80_0000));
        assert!(state::get_flags().contains(state::ExceptionFlags::INVALID));
        assert_eq!(result.to_bits(), 0x7FC0_0000);
    }

    #[test]
    fn sqrt_of_negative_zero_is_negative_zero() {
        setup();
        let result = sqrt(F32::from_bits(0x8000_0000));
        assert_eq!(result.to_bits(), 0x8000_0000);
    }

    #[test]
    fn sqrt_of_positive_infinity_is_itself() {
        setup();
        let result = sqrt(F32::INFINITY);
        assert_eq!(result, F32::INFINITY);
    }
}
