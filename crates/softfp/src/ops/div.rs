//! Division (§4.7 of the design), generic over [`Format`].
//!
//! The historical library computes a quotient digit-by-digit from an
//! approximate reciprocal (`softfloat_approxRecip32_1`) refined by a
//! boundary-correction branch, because the targets it shipped for had no
//! hardware divide wide enough to do better. That constraint doesn't apply
//! here: both operands fit in a 64-bit significand, so the quotient and its
//! exact remainder come directly out of one native `u128` division. The
//! approximate-reciprocal primitives are kept for the f128/extF80 paths,
//! where no integer type wide enough for an exact divide exists.

use crate::format::{self, unpack, Format, Unpacked};
use crate::nan::propagate_nan;
use crate::round::{round_pack, Exactness, Unrounded};
use crate::state::{self, ExceptionFlags};

/// `a / b`.
pub(crate) fn div<F: Format>(a: F, b: F) -> F {
    let ua = unpack(a);
    let ub = unpack(b);

    match (ua, ub) {
        (Unpacked::Nan { .. }, _) | (_, Unpacked::Nan { .. }) => propagate_nan(a, b),

        (Unpacked::Infinity { .. }, Unpacked::Infinity { .. }) => {
            state::raise_flags(ExceptionFlags::INVALID);
            format::pack_canonical_nan()
        }
        (Unpacked::Infinity { sign: sa }, Unpacked::Zero { sign: sb })
        | (Unpacked::Infinity { sign: sa }, Unpacked::Finite { sign: sb, .. }) => {
            format::pack_infinity(sa ^ sb)
        }
        (Unpacked::Zero { sign: sa }, Unpacked::Infinity { sign: sb })
        | (Unpacked::Finite { sign: sa, .. }, Unpacked::Infinity { sign: sb }) => {
            format::pack_zero(sa ^ sb)
        }

        (Unpacked::Zero { sign: sa }, Unpacked::Zero { sign: sb }) => {
            let _ = (sa, sb);
            state::raise_flags(ExceptionFlags::INVALID);
            format::pack_canonical_nan()
        }
        (Unpacked::Finite { sign: sa, .. }, Unpacked::Zero { sign: sb }) => {
            state::raise_flags(ExceptionFlags::INFINITE);
            format::pack_infinity(sa ^ sb)
        }
        (Unpacked::Zero { sign: sa }, Unpacked::Finite { sign: sb, .. }) => {
            format::pack_zero(sa ^ sb)
        }

        (
            Unpacked::Finite {
                sign: sa,
                exp: ea,
                sig: siga,
            },
            Unpacked::Finite {
                sign: sb,
                exp: eb,
                sig: sigb,
            },
        ) => {
            let sign = sa ^ sb;

            // `siga`, `sigb` both lie in `[2^63, 2^64)`. Align the dividend
            // one bit higher when it's the smaller of the two, so the
            // quotient always lands back in `[2^63, 2^64)` without a
            // post-hoc renormalizing shift.
            let (numerator, exp_adjust): (u128, i32) = if siga < sigb {
                (u128::from(siga) << 64, -1)
            } else {
                (u128::from(siga) << 63, 0)
            };

            let divisor = u128::from(sigb);
            let quotient = (numerator / divisor) as u64;
            let sticky = numerator % divisor != 0;

            round_pack(
                Unrounded {
                    sign,
                    exp: ea - eb + exp_adjust,
                    sig: quotient,
                    sticky,
                },
                Exactness::Exact,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::div;
    use crate::format::F32;
    use crate::policy::Policy;
    use crate::state::{self, RoundingMode};

    fn setup() {
        state::set_policy(Policy::risc_v());
        state::set_rounding_mode(RoundingMode::NearEven);
        state::clear_flags();
    }

    #[test]
    fn six_divided_by_two_is_three() {
        setup();
        let six = F32::from_bits(0x40C0_0000);
        let two = F32::from_bits(0x4000_0000);
        let result = div(six, two);
        assert_eq!(result.to_bits(), 0x4040_0000);
        assert!(state::get_flags().is_empty());
    }

    #[test]
    fn one_divided_by_three_is_inexact() {
        setup();
        let one = F32::from_bits(0x3F80_0000);
        let three = F32::from_bits(0x4040_0000);
        let result = div(one, three);
        // 1/3 rounded to nearest f32.
        assert_eq!(result.to_bits(), 0x3EAA_AAAB);
        assert!(state::get_flags().contains(state::ExceptionFlags::INEXACT));
    }

    #[test]
    fn finite_divided_by_zero_is_infinite_and_raises() {
        setup();
        let one = F32::from_bits(0x3F80_0000);
        let result = div(one, F32::ZERO);
        assert_eq!(result, F32::INFINITY);
        assert!(state::get_flags().contains(state::ExceptionFlags::INFINITE));
    }

    #[test]
    fn zero_divided_by_zero_is_invalid() {
        setup();
        let result = div(F32::ZERO, F32::ZERO);
        assert!(state::get_flags().contains(state::ExceptionFlags::INVALID));
        assert_eq!(result.to_bits(), 0x7FC0_0000);
    }
}
