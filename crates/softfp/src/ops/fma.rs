//! Fused multiply-add (§4.6 of the design), generic over [`Format`].
//!
//! Computes `a * b + c` with a single rounding, by carrying the exact
//! 128-bit product of `a` and `b` alongside `c` (widened into the same
//! 128-bit register) through one alignment/add-or-subtract step before the
//! final round-pack — the same alignment pattern `add_sub` uses for its
//! own 64-bit operands, one register width up to hold the full product.

use crate::format::{self, unpack, Format, Unpacked};
use crate::nan::propagate_nan_ternary;
use crate::primitives::mul_64_to_128;
use crate::round::{round_pack, Exactness, Unrounded};
use crate::state::{self, ExceptionFlags};

/// `a * b + c`, rounded once.
pub(crate) fn mul_add<F: Format>(a: F, b: F, c: F) -> F {
    let ua = unpack(a);
    let ub = unpack(b);
    let uc = unpack(c);

    let any_nan = matches!(ua, Unpacked::Nan { .. })
        || matches!(ub, Unpacked::Nan { .. })
        || matches!(uc, Unpacked::Nan { .. });
    if any_nan {
        return propagate_nan_ternary(a, b, c);
    }

    let product_is_invalid_inf_times_zero = matches!(
        (ua, ub),
        (Unpacked::Infinity { .. }, Unpacked::Zero { .. })
            | (Unpacked::Zero { .. }, Unpacked::Infinity { .. })
    );
    if product_is_invalid_inf_times_zero {
        state::raise_flags(ExceptionFlags::INVALID);
        return format::pack_canonical_nan();
    }

    let product_is_infinite =
        matches!(ua, Unpacked::Infinity { .. }) || matches!(ub, Unpacked::Infinity { .. });
    if product_is_infinite {
        let product_sign = operand_sign(ua) ^ operand_sign(ub);
        return match uc {
            Unpacked::Infinity { sign: sc } if sc != product_sign => {
                state::raise_flags(ExceptionFlags::INVALID);
                format::pack_canonical_nan()
            }
            _ => format::pack_infinity(product_sign),
        };
    }

    if let Unpacked::Infinity { sign: sc } = uc {
        return format::pack_infinity(sc);
    }

    let product_is_zero =
        matches!(ua, Unpacked::Zero { .. }) || matches!(ub, Unpacked::Zero { .. });
    if product_is_zero {
        let product_sign = operand_sign(ua) ^ operand_sign(ub);
        return match uc {
            Unpacked::Zero { sign: sc } => {
                if product_sign == sc {
                    format::pack_zero(sc)
                } else {
                    let negative = state::get_rounding_mode() == crate::state::RoundingMode::Min;
                    format::pack_zero(negative)
                }
            }
            Unpacked::Finite { sign: sc, exp, sig } => exact::<F>(sc, exp, sig),
            Unpacked::Infinity { .. } | Unpacked::Nan { .. } => unreachable!(),
        };
    }

    let Unpacked::Finite {
        sign: sa,
        exp: ea,
        sig: siga,
    } = ua
    else {
        unreachable!("remaining case is Finite * Finite")
    };
    let Unpacked::Finite {
        sign: sb,
        exp: eb,
        sig: sigb,
    } = ub
    else {
        unreachable!("remaining case is Finite * Finite")
    };

    let product_sign = sa ^ sb;
    let raw_product = mul_64_to_128(siga, sigb);

    // Normalize the product to a full 128-bit mantissa with the implicit bit
    // at bit 127 (no bits discarded yet — unlike `mul`, which drops to a
    // 64-bit mantissa immediately, `fma` needs the full width to add `c`
    // exactly before rounding once).
    let (mut p_wide, mut p_exp) = if raw_product >> 127 != 0 {
        (raw_product, ea + eb + 1)
    } else {
        (raw_product << 1, ea + eb)
    };

    match uc {
        Unpacked::Zero { .. } => {
            let sig = (p_wide >> 64) as u64;
            let sticky = (p_wide & u128::from(u64::MAX)) != 0;
            return round_pack(
                Unrounded {
                    sign: product_sign,
                    exp: p_exp,
                    sig,
                    sticky,
                },
                Exactness::Exact,
            );
        }
        Unpacked::Finite {
            sign: sc,
            exp: ec,
            sig: sigc,
        } => {
            let mut c_wide = u128::from(sigc) << 64;
            let mut sticky = false;

            let result_exp = if p_exp >= ec {
                let dist = (p_exp - ec) as u32;
                let before = c_wide;
                c_wide = crate::primitives::shift_right_jam_u128(c_wide, dist);
                sticky |= dist != 0 && before != (c_wide & !1u128) && c_wide & 1 != 0;
                p_exp
            } else {
                let dist = (ec - p_exp) as u32;
                let before = p_wide;
                p_wide = crate::primitives::shift_right_jam_u128(p_wide, dist);
                sticky |= dist != 0 && before != (p_wide & !1u128) && p_wide & 1 != 0;
                ec
            };

            let (sign, sig128, exp, extra_sticky) = if product_sign == sc {
                let (sum, carry) = p_wide.overflowing_add(c_wide);
                if carry {
                    let shifted = crate::primitives::shift_right_jam_u128(sum, 1) | (1u128 << 127);
                    let dropped = sum & 1 != 0;
                    (product_sign, shifted, result_exp + 1, dropped)
                } else {
                    (product_sign, sum, result_exp, false)
                }
            } else if p_wide >= c_wide {
                let diff = p_wide - c_wide;
                if diff == 0 {
                    let negative =
                        state::get_rounding_mode() == crate::state::RoundingMode::Min;
                    return format::pack_zero(negative);
                }
                let shift = diff.leading_zeros();
                (product_sign, diff << shift, result_exp - shift as i32, false)
            } else {
                let diff = c_wide - p_wide;
                let shift = diff.leading_zeros();
                (!product_sign, diff << shift, result_exp - shift as i32, false)
            };

            let sig = (sig128 >> 64) as u64;
            let low_sticky = (sig128 & u128::from(u64::MAX)) != 0;

            round_pack(
                Unrounded {
                    sign,
                    exp,
                    sig,
                    sticky: sticky || extra_sticky || low_sticky,
                },
                Exactness::Exact,
            )
        }
        Unpacked::Infinity { .. } | Unpacked::Nan { .. } => unreachable!(),
    }
}

fn operand_sign(u: Unpacked) -> bool {
    match u {
        Unpacked::Zero { sign }
        | Unpacked::Infinity { sign }
        | Unpacked::Nan { sign, .. }
        | Unpacked::Finite { sign, .. } => sign,
    }
}

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

#[cfg(test)]
mod tests {
    use super::mul_add;
    use crate::format::F32;
    use crate::policy::Policy;
    use crate::state::{self, RoundingMode};

    fn setup() {
        state::set_policy(Policy::risc_v());
        state::set_rounding_mode(RoundingMode::NearEven);
        state::clear_flags();
    }

    #[test]
    fn two_times_three_plus_one_is_seven() {
        setup();
        let two = F32::from_bits(0x4000_0000);
        let three = F32::from_bits(0x4040_0000);
        let one = F32::from_bits(0x3F80_0000);
        let result = mul_add(two, three, one);
        assert_eq!(result.to_bits(), 0x40E0_0000);
    }

    #[test]
    fn exact_cancellation_yields_positive_zero() {
        setup();
        let two = F32::from_bits(0x4000_0000);
        let three = F32::from_bits(0x4040_0000);
        let neg_six = F32::from_bits(0xC0C0_0000);
        let result = mul_add(two, three, neg_six);
        assert_eq!(result, F32::ZERO);
        assert!(!result.sign());
    }

    #[test]
    fn infinity_times_zero_plus_finite_is_invalid() {
        setup();
        let result = mul_add(F32::INFINITY, F32::ZERO, F32::from_bits(0x3F80_0000));
        assert!(state::get_flags().contains(state::ExceptionFlags::INVALID));
        assert_eq!(result.to_bits(), 0x7FC0_0000);
    }
}
