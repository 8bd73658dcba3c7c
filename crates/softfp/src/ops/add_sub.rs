//! Addition and subtraction (§4.4 of the design), generic over [`Format`].

use crate::format::{self, unpack, Format, Unpacked};
use crate::nan::propagate_nan;
use crate::primitives::shift_right_jam_u128;
use crate::round::{round_pack, Exactness, Unrounded};
use crate::state::{self, ExceptionFlags, RoundingMode};

/// `a + b`.
pub(crate) fn add<F: Format>(a: F, b: F) -> F {
    add_sub_dispatch(a, b, false)
}

/// `a - b`.
pub(crate) fn sub<F: Format>(a: F, b: F) -> F {
    add_sub_dispatch(a, b, true)
}

fn add_sub_dispatch<F: Format>(a: F, b: F, subtract: bool) -> F {
    let ua = unpack(a);
    let ub = unpack(b);

    match (ua, ub) {
        (Unpacked::Nan { .. }, _) | (_, Unpacked::Nan { .. }) => propagate_nan(a, b),

        (Unpacked::Infinity { sign: sa }, Unpacked::Infinity { sign: sb }) => {
            let sb = sb ^ subtract;
            if sa == sb {
                format::pack_infinity(sa)
            } else {
                state::raise_flags(ExceptionFlags::INVALID);
                format::pack_canonical_nan()
            }
        }
        (Unpacked::Infinity { sign: sa }, _) => format::pack_infinity(sa),
        (_, Unpacked::Infinity { sign: sb }) => format::pack_infinity(sb ^ subtract),

        (Unpacked::Zero { sign: sa }, Unpacked::Zero { sign: sb }) => {
            let sb = sb ^ subtract;
            if sa == sb {
                format::pack_zero(sa)
            } else {
                let negative = state::get_rounding_mode() == RoundingMode::Min;
                format::pack_zero(negative)
            }
        }
        (Unpacked::Zero { .. }, Unpacked::Finite { sign: sb, exp, sig }) => {
            exact::<F>(sb ^ subtract, exp, sig)
        }
        (Unpacked::Finite { sign: sa, exp, sig }, Unpacked::Zero { .. }) => exact::<F>(sa, exp, sig),

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
            let sb = sb ^ subtract;
            if sa == sb {
                add_mags::<F>(sa, ea, siga, eb, sigb)
            } else {
                sub_mags::<F>(sa, ea, siga, eb, sigb)
            }
        }
    }
}

/// Repacks an already-representable (sign, exp, left-justified sig) value:
/// used for the `0 + x` / `x + 0` special case, which is exact by the
/// IEEE-754 zero identity and never raises a flag.
fn exact<F: Format>(sign: bool, exp: i32, sig: u64) -> F {
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

fn add_mags<F: Format>(sign: bool, ea: i32, siga: u64, eb: i32, sigb: u64) -> F {
    let wa = u128::from(siga) << 64;
    let wb = u128::from(sigb) << 64;

    let (exp, wa, wb) = if ea >= eb {
        let dist = (ea - eb) as u32;
        (ea, wa, shift_right_jam_u128(wb, dist))
    } else {
        let dist = (eb - ea) as u32;
        (eb, shift_right_jam_u128(wa, dist), wb)
    };

    let (sum, carry) = wa.overflowing_add(wb);
    let (sig128, exp) = if carry {
        (shift_right_jam_u128(sum, 1) | (1u128 << 127), exp + 1)
    } else {
        (sum, exp)
    };

    let sig = (sig128 >> 64) as u64;
    let sticky = sig128 as u64 != 0;
    round_pack(
        Unrounded {
            sign,
            exp,
            sig,
            sticky,
        },
        Exactness::Exact,
    )
}

fn sub_mags<F: Format>(sign_a: bool, ea: i32, siga: u64, eb: i32, sigb: u64) -> F {
    let wa = u128::from(siga) << 64;
    let wb = u128::from(sigb) << 64;

    let (exp, wa, wb) = if ea >= eb {
        let dist = (ea - eb) as u32;
        (ea, wa, shift_right_jam_u128(wb, dist))
    } else {
        let dist = (eb - ea) as u32;
        (eb, shift_right_jam_u128(wa, dist), wb)
    };

    let (result_sign, diff) = if wa >= wb {
        (sign_a, wa - wb)
    } else {
        (!sign_a, wb - wa)
    };

    if diff == 0 {
        let negative = state::get_rounding_mode() == RoundingMode::Min;
        return format::pack_zero(negative);
    }

    let shift = diff.leading_zeros();
    let sig128 = diff << shift;
    let exp = exp - shift as i32;

    let sig = (sig128 >> 64) as u64;
    let sticky = sig128 as u64 != 0;
    round_pack(
        Unrounded {
            sign: result_sign,
            exp,
            sig,
            sticky,
        },
        Exactness::Exact,
    )
}

#[cfg(test)]
mod tests {
    use super::{add, sub};
    use crate::format::F32;
    use crate::policy::Policy;
    use crate::state::{self, RoundingMode};

    fn setup() {
        state::set_policy(Policy::risc_v());
        state::set_rounding_mode(RoundingMode::NearEven);
        state::clear_flags();
    }

    #[test]
    fn one_plus_one_is_two() {
        setup();
        let one = F32::from_bits(0x3F80_0000);
        let result = add(one, one);
        assert_eq!(result.to_bits(), 0x4000_0000);
        assert!(state::get_flags().is_empty());
    }

    #[test]
    fn x_minus_x_is_positive_zero() {
        setup();
        let x = F32::from_bits(0x4012_3456);
        let result = sub(x, x);
        assert_eq!(result, F32::ZERO);
        assert!(!result.sign());
    }

    #[test]
    fn x_minus_x_is_negative_zero_toward_minus_infinity() {
        setup();
        state::set_rounding_mode(RoundingMode::Min);
        let x = F32::from_bits(0x4012_3456);
        let result = sub(x, x);
        assert_eq!(result.to_bits(), 0x8000_0000);
        state::set_rounding_mode(RoundingMode::NearEven);
    }

    #[test]
    fn max_finite_plus_small_overflows_to_infinity() {
        setup();
        let max_finite = F32::from_bits(0x7F7F_FFFF);
        let one = F32::from_bits(0x3F80_0000);
        let result = add(max_finite, one);
        assert_eq!(result, F32::INFINITY);
        assert!(state::get_flags().contains(state::ExceptionFlags::OVERFLOW));
    }
}
