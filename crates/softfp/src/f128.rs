//! The 128-bit (quadruple-precision) binary interchange format.
//!
//! f128's 112-bit stored fraction doesn't fit the 64-bit working register
//! [`crate::format::Format`] and [`crate::ops`] share, so this module
//! reimplements the whole operation surface by hand: every algorithm here is
//! the same shape as its generic counterpart in `crate::ops`, one register
//! width up (`u128` significands, [`crate::primitives::U256`] working
//! registers in place of `u128`).

use crate::policy::NanMode;
use crate::primitives::{
    self, add_u256, leading_zeros_u256, long_divide_u128, mul_128_to_256, shift_left_u256,
    shift_right_jam_extra_u128, shift_right_jam_u256, sub_u256, U256,
};
use crate::round::round_increment;
use crate::state::{self, ExceptionFlags, RoundingMode, TininessMode};

const EXP_WIDTH: u32 = 15;
const SIG_WIDTH: u32 = 112;
const BIAS: i32 = 16383;

const fn frac_mask() -> u128 {
    (1u128 << SIG_WIDTH) - 1
}

const fn exp_mask() -> u128 {
    (1u128 << EXP_WIDTH) - 1
}

const fn quiet_bit() -> u128 {
    1u128 << (SIG_WIDTH - 1)
}

/// A quadruple-precision IEEE-754 value, stored as its raw 128-bit pattern.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct F128(pub u128);

impl F128 {
    /// Positive zero.
    pub const ZERO: Self = Self(0);
    /// Positive infinity.
    pub const INFINITY: Self = Self(exp_mask() << SIG_WIDTH);
    /// Negative infinity.
    pub const NEG_INFINITY: Self = Self((1u128 << (EXP_WIDTH + SIG_WIDTH)) | (exp_mask() << SIG_WIDTH));

    /// Wraps a raw 128-bit pattern.
    #[must_use]
    pub const fn from_bits(bits: u128) -> Self {
        Self(bits)
    }

    /// Returns the raw 128-bit pattern.
    #[must_use]
    pub const fn to_bits(self) -> u128 {
        self.0
    }

    /// The sign bit.
    #[must_use]
    pub const fn sign(self) -> bool {
        self.0 >> (EXP_WIDTH + SIG_WIDTH) != 0
    }

    /// Decodes a little-endian byte slice into a packed value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::FormatError::InvalidByteLength`] if `bytes`
    /// isn't exactly 16 bytes long.
    pub fn from_le_bytes(bytes: &[u8]) -> Result<Self, crate::error::FormatError> {
        let array: [u8; 16] =
            bytes
                .try_into()
                .map_err(|_| crate::error::FormatError::InvalidByteLength {
                    expected: 16,
                    actual: bytes.len(),
                })?;
        Ok(Self(u128::from_le_bytes(array)))
    }

    /// Encodes this value as little-endian bytes.
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 16] {
        self.0.to_le_bytes()
    }
}

impl std::fmt::Debug for F128 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "F128(0x{:032x})", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Unpacked {
    Zero { sign: bool },
    Infinity { sign: bool },
    Nan { sign: bool, signaling: bool, payload: u128 },
    Finite { sign: bool, exp: i32, sig: u128 },
}

fn unpack(value: F128) -> Unpacked {
    let bits = value.0;
    let sign = (bits >> (EXP_WIDTH + SIG_WIDTH)) & 1 != 0;
    let exp_field = (bits >> SIG_WIDTH) & exp_mask();
    let frac = bits & frac_mask();
    let max_exp_field = exp_mask();

    if exp_field == 0 {
        if frac == 0 {
            Unpacked::Zero { sign }
        } else {
            let raw = frac << (127 - SIG_WIDTH);
            let shift = raw.leading_zeros();
            let sig = raw << shift;
            let exp = 1 - BIAS - shift as i32;
            Unpacked::Finite { sign, exp, sig }
        }
    } else if exp_field == max_exp_field {
        if frac == 0 {
            Unpacked::Infinity { sign }
        } else {
            let signaling = frac & quiet_bit() == 0;
            Unpacked::Nan { sign, signaling, payload: frac }
        }
    } else {
        let sig = ((1u128 << SIG_WIDTH) | frac) << (127 - SIG_WIDTH);
        let exp = exp_field as i32 - BIAS;
        Unpacked::Finite { sign, exp, sig }
    }
}

fn pack_zero(sign: bool) -> F128 {
    F128(u128::from(sign) << (EXP_WIDTH + SIG_WIDTH))
}

fn pack_infinity(sign: bool) -> F128 {
    F128((u128::from(sign) << (EXP_WIDTH + SIG_WIDTH)) | (exp_mask() << SIG_WIDTH))
}

fn pack_canonical_nan() -> F128 {
    F128((exp_mask() << SIG_WIDTH) | quiet_bit())
}

fn pack_raw_nan(sign: bool, signaling: bool, payload: u128) -> F128 {
    let quiet = if signaling { 0 } else { quiet_bit() };
    let frac = (payload & frac_mask()) | quiet;
    F128((u128::from(sign) << (EXP_WIDTH + SIG_WIDTH)) | (exp_mask() << SIG_WIDTH) | frac)
}

#[derive(Clone, Copy, Debug)]
struct CommonNan128 {
    sign: bool,
    signaling: bool,
    payload: u128,
}

fn unpack_nan(value: F128) -> Option<CommonNan128> {
    match unpack(value) {
        Unpacked::Nan { sign, signaling, payload } => Some(CommonNan128 {
            sign,
            signaling,
            payload: payload & frac_mask(),
        }),
        _ => None,
    }
}

fn select_x86(a: CommonNan128, b: CommonNan128) -> CommonNan128 {
    if a.payload > b.payload || (a.payload == b.payload && !a.sign && b.sign) {
        a
    } else {
        b
    }
}

fn propagate_nan(a: F128, b: F128) -> F128 {
    let (a_nan, b_nan) = (unpack_nan(a), unpack_nan(b));
    let any_signaling = a_nan.is_some_and(|n| n.signaling) || b_nan.is_some_and(|n| n.signaling);
    if any_signaling {
        state::raise_flags(ExceptionFlags::INVALID);
    }
    match state::get_policy().nan_mode {
        NanMode::RiscV => pack_canonical_nan(),
        NanMode::X86 => {
            let chosen = match (a_nan, b_nan) {
                (Some(x), Some(y)) => select_x86(x, y),
                (Some(x), None) => x,
                (None, Some(y)) => y,
                (None, None) => unreachable!("propagate_nan called with no NaN operand"),
            };
            pack_raw_nan(chosen.sign, false, chosen.payload | quiet_bit())
        }
    }
}

fn propagate_nan_unary(a: F128) -> F128 {
    let a_nan = unpack_nan(a).expect("propagate_nan_unary called with a non-NaN operand");
    if a_nan.signaling {
        state::raise_flags(ExceptionFlags::INVALID);
    }
    match state::get_policy().nan_mode {
        NanMode::RiscV => pack_canonical_nan(),
        NanMode::X86 => pack_raw_nan(a_nan.sign, false, a_nan.payload | quiet_bit()),
    }
}

fn propagate_nan_ternary(a: F128, b: F128, c: F128) -> F128 {
    let ab_is_nan = matches!(unpack(a), Unpacked::Nan { .. }) || matches!(unpack(b), Unpacked::Nan { .. });
    if ab_is_nan {
        propagate_nan(propagate_nan(a, b), c)
    } else {
        propagate_nan_unary(c)
    }
}

/// An unrounded result: `sig` left-justified to bit 126 (implicit bit at bit
/// 126 for a normal result), mirroring [`crate::round::Unrounded`] one
/// register width up.
#[derive(Clone, Copy, Debug)]
struct Unrounded128 {
    sign: bool,
    exp: i32,
    sig: u128,
    sticky: bool,
}

const ROUND_POS: u32 = 126 - SIG_WIDTH;

fn round_pack(input: Unrounded128) -> F128 {
    round_pack_with(input, state::get_rounding_mode())
}

fn round_pack_with(input: Unrounded128, mode: RoundingMode) -> F128 {
    let Unrounded128 { sign, exp: true_exp, mut sig, mut sticky } = input;
    let mut exp = true_exp + BIAS;
    let max_exp_field = exp_mask() as i32;

    if exp <= 0 {
        let dist = (1 - exp) as u32;
        let (shifted, extra) = shift_right_jam_extra_u128(sig, sticky, dist);
        sig = shifted;
        sticky = extra;
        exp = 0;
    }

    let round_bit = (sig >> ROUND_POS) & 1 != 0;
    let sticky_mask = (1u128 << ROUND_POS) - 1;
    let sticky_all = sticky || (sig & sticky_mask) != 0;
    let frac = (sig >> (ROUND_POS + 1)) & frac_mask();
    let lsb_odd = frac & 1 != 0;

    let policy = state::get_policy();
    let tiny_before = exp <= 0
        && policy.detect_tininess == TininessMode::BeforeRounding
        && (round_bit || sticky_all);

    let roundup = round_increment(mode, sign, round_bit, sticky_all, lsb_odd);
    let mut biased_exp = exp;
    let mut new_frac = frac;

    if roundup {
        new_frac += 1;
        if new_frac == 1u128 << SIG_WIDTH {
            new_frac = 0;
            biased_exp += 1;
        }
    }

    let inexact = round_bit || sticky_all;

    if biased_exp >= max_exp_field {
        state::raise_flags(ExceptionFlags::OVERFLOW | ExceptionFlags::INEXACT);
        return overflow_result(sign, mode);
    }

    if biased_exp <= 0 && inexact {
        let tiny_after = policy.detect_tininess == TininessMode::AfterRounding;
        if tiny_before || tiny_after {
            state::raise_flags(ExceptionFlags::UNDERFLOW);
        }
    }

    if inexact {
        state::raise_flags(ExceptionFlags::INEXACT);
    }

    let bits = (u128::from(sign) << (EXP_WIDTH + SIG_WIDTH)) + ((biased_exp as u128) << SIG_WIDTH) + new_frac;
    F128(bits)
}

fn overflow_result(sign: bool, mode: RoundingMode) -> F128 {
    let deliver_infinity = matches!(mode, RoundingMode::NearEven | RoundingMode::NearMaxMag)
        || (sign && mode == RoundingMode::Min)
        || (!sign && mode == RoundingMode::Max);
    if deliver_infinity {
        pack_infinity(sign)
    } else {
        max_finite(sign)
    }
}

fn max_finite(sign: bool) -> F128 {
    let max_exp_field = exp_mask() - 1;
    F128((u128::from(sign) << (EXP_WIDTH + SIG_WIDTH)) | (max_exp_field << SIG_WIDTH) | frac_mask())
}

// `sticky: false` plus a `sig` with no set bits below the target precision
// means `round_pack`'s `inexact` (round_bit || sticky) comes out false, so
// this never raises INEXACT — the caller is asserting exactness, not
// suppressing a flag that would otherwise fire.
fn exact(sign: bool, exp: i32, sig: u128) -> F128 {
    round_pack(Unrounded128 { sign, exp, sig, sticky: false })
}

fn add_sub_dispatch(a: F128, b: F128, subtract: bool) -> F128 {
    let ua = unpack(a);
    let ub = unpack(b);

    match (ua, ub) {
        (Unpacked::Nan { .. }, _) | (_, Unpacked::Nan { .. }) => propagate_nan(a, b),
        (Unpacked::Infinity { sign: sa }, Unpacked::Infinity { sign: sb }) => {
            let sb = sb ^ subtract;
            if sa == sb {
                pack_infinity(sa)
            } else {
                state::raise_flags(ExceptionFlags::INVALID);
                pack_canonical_nan()
            }
        }
        (Unpacked::Infinity { sign: sa }, _) => pack_infinity(sa),
        (_, Unpacked::Infinity { sign: sb }) => pack_infinity(sb ^ subtract),
        (Unpacked::Zero { sign: sa }, Unpacked::Zero { sign: sb }) => {
            let sb = sb ^ subtract;
            if sa == sb {
                pack_zero(sa)
            } else {
                pack_zero(state::get_rounding_mode() == RoundingMode::Min)
            }
        }
        (Unpacked::Zero { .. }, Unpacked::Finite { sign: sb, exp, sig }) => exact(sb ^ subtract, exp, sig),
        (Unpacked::Finite { sign: sa, exp, sig }, Unpacked::Zero { .. }) => exact(sa, exp, sig),
        (
            Unpacked::Finite { sign: sa, exp: ea, sig: siga },
            Unpacked::Finite { sign: sb, exp: eb, sig: sigb },
        ) => {
            let sb = sb ^ subtract;
            if sa == sb {
                add_mags(sa, ea, siga, eb, sigb)
            } else {
                sub_mags(sa, ea, siga, eb, sigb)
            }
        }
    }
}

fn add_mags(sign: bool, ea: i32, siga: u128, eb: i32, sigb: u128) -> F128 {
    let wa: U256 = (siga, 0);
    let wb: U256 = (sigb, 0);

    let (exp, wa, wb) = if ea >= eb {
        let dist = (ea - eb) as u32;
        (ea, wa, shift_right_jam_u256(wb, dist))
    } else {
        let dist = (eb - ea) as u32;
        (eb, shift_right_jam_u256(wa, dist), wb)
    };

    let (sum, carry) = add_u256(wa, wb);
    let (sig256, exp) = if carry {
        let shifted = shift_right_jam_u256(sum, 1);
        ((shifted.0 | (1u128 << 127), shifted.1), exp + 1)
    } else {
        (sum, exp)
    };

    let sig = sig256.0;
    let sticky = sig256.1 != 0;
    round_pack(Unrounded128 { sign, exp, sig, sticky })
}

fn sub_mags(sign_a: bool, ea: i32, siga: u128, eb: i32, sigb: u128) -> F128 {
    let wa: U256 = (siga, 0);
    let wb: U256 = (sigb, 0);

    let (exp, wa, wb) = if ea >= eb {
        let dist = (ea - eb) as u32;
        (ea, wa, shift_right_jam_u256(wb, dist))
    } else {
        let dist = (eb - ea) as u32;
        (eb, shift_right_jam_u256(wa, dist), wb)
    };

    let (result_sign, diff) = if wa >= wb {
        (sign_a, sub_u256(wa, wb))
    } else {
        (!sign_a, sub_u256(wb, wa))
    };

    if diff == (0, 0) {
        return pack_zero(state::get_rounding_mode() == RoundingMode::Min);
    }

    let shift = leading_zeros_u256(diff);
    let sig256 = shift_left_u256(diff, shift);
    let exp = exp - shift as i32;

    let sig = sig256.0;
    let sticky = sig256.1 != 0;
    round_pack(Unrounded128 { sign: result_sign, exp, sig, sticky })
}

fn mul(a: F128, b: F128) -> F128 {
    let ua = unpack(a);
    let ub = unpack(b);

    match (ua, ub) {
        (Unpacked::Nan { .. }, _) | (_, Unpacked::Nan { .. }) => propagate_nan(a, b),
        (Unpacked::Infinity { .. }, Unpacked::Zero { .. }) | (Unpacked::Zero { .. }, Unpacked::Infinity { .. }) => {
            state::raise_flags(ExceptionFlags::INVALID);
            pack_canonical_nan()
        }
        (Unpacked::Infinity { sign: sa }, Unpacked::Infinity { sign: sb }) => pack_infinity(sa ^ sb),
        (Unpacked::Infinity { sign: sa }, Unpacked::Finite { sign: sb, .. }) => pack_infinity(sa ^ sb),
        (Unpacked::Finite { sign: sa, .. }, Unpacked::Infinity { sign: sb }) => pack_infinity(sa ^ sb),
        (Unpacked::Zero { sign: sa }, Unpacked::Zero { sign: sb }) => pack_zero(sa ^ sb),
        (Unpacked::Zero { sign: sa }, Unpacked::Finite { sign: sb, .. }) => pack_zero(sa ^ sb),
        (Unpacked::Finite { sign: sa, .. }, Unpacked::Zero { sign: sb }) => pack_zero(sa ^ sb),
        (
            Unpacked::Finite { sign: sa, exp: ea, sig: siga },
            Unpacked::Finite { sign: sb, exp: eb, sig: sigb },
        ) => {
            let sign = sa ^ sb;
            let product = mul_128_to_256(siga, sigb);

            // Two operands each in `[2^127, 2^128)` multiply to a product in
            // `[2^254, 2^256)`: normalize by at most one bit.
            let (sig, sticky, exp) = if product.0 >> 127 != 0 {
                (product.0, product.1 != 0, ea + eb + 1)
            } else {
                let shifted = shift_left_u256(product, 1);
                (shifted.0, shifted.1 != 0, ea + eb)
            };

            round_pack(Unrounded128 { sign, exp, sig, sticky })
        }
    }
}

fn operand_sign(u: Unpacked) -> bool {
    match u {
        Unpacked::Zero { sign } | Unpacked::Infinity { sign } | Unpacked::Nan { sign, .. } | Unpacked::Finite { sign, .. } => sign,
    }
}

/// Checks whether `v`'s bits below position `dist` are nonzero. A direct
/// bitmask test, replacing the alignment-delta comparison the 64-bit `fma`
/// uses, since here the alignment register is a `U256` pair rather than a
/// single machine integer.
fn bits_below(v: U256, dist: u32) -> bool {
    if dist == 0 {
        false
    } else if dist >= 256 {
        v != (0, 0)
    } else if dist <= 128 {
        (v.1 & ((1u128 << dist) - 1)) != 0
    } else {
        v.1 != 0 || (v.0 & ((1u128 << (dist - 128)) - 1)) != 0
    }
}

fn mul_add(a: F128, b: F128, c: F128) -> F128 {
    let ua = unpack(a);
    let ub = unpack(b);
    let uc = unpack(c);

    let any_nan = matches!(ua, Unpacked::Nan { .. }) || matches!(ub, Unpacked::Nan { .. }) || matches!(uc, Unpacked::Nan { .. });
    if any_nan {
        return propagate_nan_ternary(a, b, c);
    }

    let product_is_invalid_inf_times_zero = matches!(
        (ua, ub),
        (Unpacked::Infinity { .. }, Unpacked::Zero { .. }) | (Unpacked::Zero { .. }, Unpacked::Infinity { .. })
    );
    if product_is_invalid_inf_times_zero {
        state::raise_flags(ExceptionFlags::INVALID);
        return pack_canonical_nan();
    }

    let product_is_infinite = matches!(ua, Unpacked::Infinity { .. }) || matches!(ub, Unpacked::Infinity { .. });
    if product_is_infinite {
        let product_sign = operand_sign(ua) ^ operand_sign(ub);
        return match uc {
            Unpacked::Infinity { sign: sc } if sc != product_sign => {
                state::raise_flags(ExceptionFlags::INVALID);
                pack_canonical_nan()
            }
            _ => pack_infinity(product_sign),
        };
    }

    if let Unpacked::Infinity { sign: sc } = uc {
        return pack_infinity(sc);
    }

    let product_is_zero = matches!(ua, Unpacked::Zero { .. }) || matches!(ub, Unpacked::Zero { .. });
    if product_is_zero {
        let product_sign = operand_sign(ua) ^ operand_sign(ub);
        return match uc {
            Unpacked::Zero { sign: sc } => {
                if product_sign == sc {
                    pack_zero(sc)
                } else {
                    pack_zero(state::get_rounding_mode() == RoundingMode::Min)
                }
            }
            Unpacked::Finite { sign: sc, exp, sig } => exact(sc, exp, sig),
            Unpacked::Infinity { .. } | Unpacked::Nan { .. } => unreachable!(),
        };
    }

    let Unpacked::Finite { sign: sa, exp: ea, sig: siga } = ua else {
        unreachable!("remaining case is Finite * Finite")
    };
    let Unpacked::Finite { sign: sb, exp: eb, sig: sigb } = ub else {
        unreachable!("remaining case is Finite * Finite")
    };

    let product_sign = sa ^ sb;
    let raw_product = mul_128_to_256(siga, sigb);

    let (mut p_wide, mut p_exp) = if raw_product.0 >> 127 != 0 {
        (raw_product, ea + eb + 1)
    } else {
        (shift_left_u256(raw_product, 1), ea + eb)
    };

    match uc {
        Unpacked::Zero { .. } => round_pack(Unrounded128 {
            sign: product_sign,
            exp: p_exp,
            sig: p_wide.0,
            sticky: p_wide.1 != 0,
        }),
        Unpacked::Finite { sign: sc, exp: ec, sig: sigc } => {
            let mut c_wide: U256 = (sigc, 0);
            let mut sticky = false;

            let result_exp = if p_exp >= ec {
                let dist = (p_exp - ec) as u32;
                sticky |= bits_below(c_wide, dist);
                c_wide = shift_right_jam_u256(c_wide, dist);
                p_exp
            } else {
                let dist = (ec - p_exp) as u32;
                sticky |= bits_below(p_wide, dist);
                p_wide = shift_right_jam_u256(p_wide, dist);
                ec
            };

            let (sign, sig256, exp, extra_sticky) = if product_sign == sc {
                let (sum, carry) = add_u256(p_wide, c_wide);
                if carry {
                    let dropped = sum.1 & 1 != 0;
                    let shifted = shift_right_jam_u256(sum, 1);
                    ((shifted.0 | (1u128 << 127), shifted.1), product_sign, result_exp + 1, dropped)
                } else {
                    (sum, product_sign, result_exp, false)
                }
            } else if p_wide >= c_wide {
                let diff = sub_u256(p_wide, c_wide);
                if diff == (0, 0) {
                    return pack_zero(state::get_rounding_mode() == RoundingMode::Min);
                }
                let shift = leading_zeros_u256(diff);
                (shift_left_u256(diff, shift), product_sign, result_exp - shift as i32, false)
            } else {
                let diff = sub_u256(c_wide, p_wide);
                let shift = leading_zeros_u256(diff);
                (shift_left_u256(diff, shift), !product_sign, result_exp - shift as i32, false)
            };

            round_pack(Unrounded128 {
                sign,
                exp,
                sig: sig256.0,
                sticky: sticky || extra_sticky || sig256.1 != 0,
            })
        }
        Unpacked::Infinity { .. } | Unpacked::Nan { .. } => unreachable!(),
    }
}

fn div(a: F128, b: F128) -> F128 {
    let ua = unpack(a);
    let ub = unpack(b);

    match (ua, ub) {
        (Unpacked::Nan { .. }, _) | (_, Unpacked::Nan { .. }) => propagate_nan(a, b),
        (Unpacked::Infinity { .. }, Unpacked::Infinity { .. }) => {
            state::raise_flags(ExceptionFlags::INVALID);
            pack_canonical_nan()
        }
        (Unpacked::Infinity { sign: sa }, Unpacked::Zero { sign: sb })
        | (Unpacked::Infinity { sign: sa }, Unpacked::Finite { sign: sb, .. }) => pack_infinity(sa ^ sb),
        (Unpacked::Zero { sign: sa }, Unpacked::Infinity { sign: sb })
        | (Unpacked::Finite { sign: sa, .. }, Unpacked::Infinity { sign: sb }) => pack_zero(sa ^ sb),
        (Unpacked::Zero { .. }, Unpacked::Zero { .. }) => {
            state::raise_flags(ExceptionFlags::INVALID);
            pack_canonical_nan()
        }
        (Unpacked::Finite { sign: sa, .. }, Unpacked::Zero { sign: sb }) => {
            state::raise_flags(ExceptionFlags::INFINITE);
            pack_infinity(sa ^ sb)
        }
        (Unpacked::Zero { sign: sa }, Unpacked::Finite { sign: sb, .. }) => pack_zero(sa ^ sb),
        (
            Unpacked::Finite { sign: sa, exp: ea, sig: siga },
            Unpacked::Finite { sign: sb, exp: eb, sig: sigb },
        ) => {
            let sign = sa ^ sb;

            // `siga`, `sigb` both lie in `[2^127, 2^128)`. `long_divide_u128`
            // treats `siga` as its own 128-bit bit stream, so asking for
            // `128 + k` quotient bits appends `k` zero bits beyond it before
            // dividing, scaling the quotient by `2^k`. Choosing `k = 127`
            // when `siga >= sigb` (quotient already in `[1, 2)`) or `k = 128`
            // otherwise (quotient in `[0.5, 1)`, needs one extra bit to land
            // back in `[2^127, 2^128)`) keeps the result left-justified
            // without a post-hoc renormalizing shift.
            let (k, exp_adjust) = if siga >= sigb { (127, 0) } else { (128, -1) };
            let (quotient, inexact) = long_divide_u128(siga, sigb, 128 + k);

            round_pack(Unrounded128 {
                sign,
                exp: ea - eb + exp_adjust,
                sig: quotient,
                sticky: inexact,
            })
        }
    }
}

fn rem(a: F128, b: F128) -> F128 {
    let ua = unpack(a);
    let ub = unpack(b);

    if matches!(ua, Unpacked::Nan { .. }) || matches!(ub, Unpacked::Nan { .. }) {
        return propagate_nan(a, b);
    }
    if matches!(ua, Unpacked::Infinity { .. }) || matches!(ub, Unpacked::Zero { .. }) {
        state::raise_flags(ExceptionFlags::INVALID);
        return pack_canonical_nan();
    }
    if matches!(ub, Unpacked::Infinity { .. }) {
        return a;
    }
    if matches!(ua, Unpacked::Zero { .. }) {
        return a;
    }

    let Unpacked::Finite { sign: sa, exp: ea, sig: siga } = ua else {
        unreachable!("remaining case is Finite")
    };
    let Unpacked::Finite { exp: eb, sig: sigb, .. } = ub else {
        unreachable!("remaining case is Finite")
    };

    let gap = ea - eb;
    if gap < -1 {
        return a;
    }

    let adjust = u32::from(gap == -1);
    let eb_work = eb - adjust as i32;
    let modulus = shift_left_u256((sigb, 0), adjust);
    let gap_work = (ea - eb_work) as u32;

    let mut acc = (0u128, siga);
    // Reduce the 128-bit dividend into the (at most 128-bit) modulus before
    // the bit-serial loop, mirroring the generic version's initial `% / &`
    // pair, one register width up via repeated subtraction of shifted
    // multiples — the modulus is always within a factor of 2 of `siga`,
    // since both operands are normalized, so this never takes more than a
    // couple of steps.
    let mut lsb = false;
    while (acc.0, acc.1) >= modulus {
        acc = sub_u256(acc, modulus);
        lsb = !lsb;
    }

    for _ in 0..gap_work {
        let doubled = shift_left_u256(acc, 1);
        if doubled >= modulus {
            acc = sub_u256(doubled, modulus);
            lsb = true;
        } else {
            acc = doubled;
            lsb = false;
        }
    }

    let twice_acc = shift_left_u256(acc, 1);
    let take_upper = twice_acc > modulus || (twice_acc == modulus && lsb);
    let (r_mag, result_sign) = if take_upper {
        (sub_u256(modulus, acc), !sa)
    } else {
        (acc, sa)
    };

    if r_mag == (0, 0) {
        return pack_zero(result_sign);
    }

    let shift = leading_zeros_u256(r_mag);
    let shifted = shift_left_u256(r_mag, shift);
    round_pack(Unrounded128 {
        sign: result_sign,
        exp: eb_work - shift as i32,
        sig: shifted.0,
        sticky: false,
    })
}

fn sqrt(a: F128) -> F128 {
    match unpack(a) {
        Unpacked::Nan { .. } => propagate_nan_unary(a),
        Unpacked::Zero { .. } => a,
        Unpacked::Infinity { sign: false } => a,
        Unpacked::Infinity { sign: true } | Unpacked::Finite { sign: true, .. } => {
            state::raise_flags(ExceptionFlags::INVALID);
            pack_canonical_nan()
        }
        Unpacked::Finite { sign: false, exp, sig } => {
            let re = exp.div_euclid(2);
            let r = exp.rem_euclid(2) as u32;
            let m = shift_left_u256((0u128, sig), 127 + r);
            let (rsig, inexact) = primitives::isqrt_u256(m);

            round_pack(Unrounded128 {
                sign: false,
                exp: re,
                sig: rsig,
                sticky: inexact,
            })
        }
    }
}

fn round_to_int(a: F128, mode: RoundingMode, exact_flag: bool) -> F128 {
    match unpack(a) {
        Unpacked::Nan { .. } => propagate_nan_unary(a),
        Unpacked::Zero { .. } | Unpacked::Infinity { .. } => a,
        Unpacked::Finite { sign, exp, sig } => {
            if exp >= 127 {
                return a;
            }
            if exp < 0 {
                return round_fraction_below_one(sign, exp, mode, exact_flag);
            }
            round_middle(sign, exp, sig, mode, exact_flag)
        }
    }
}

fn round_middle(sign: bool, exp: i32, sig: u128, mode: RoundingMode, exact_flag: bool) -> F128 {
    let shift = (127 - exp) as u32;
    let frac_mask = (1u128 << shift) - 1;
    let int_part = sig & !frac_mask;
    let frac = sig & frac_mask;

    let round_bit = (frac >> (shift - 1)) & 1 != 0;
    let sticky = (frac & ((1u128 << (shift - 1)) - 1)) != 0;
    let lsb_odd = (int_part >> shift) & 1 != 0;
    let inexact = round_bit || sticky;

    if exact_flag && inexact {
        state::raise_flags(ExceptionFlags::INEXACT);
    }

    if !round_increment(mode, sign, round_bit, sticky, lsb_odd) {
        return repack(sign, exp, int_part);
    }

    let (new_int, carried) = int_part.overflowing_add(1u128 << shift);
    if carried {
        repack(sign, exp + 1, 1u128 << 127)
    } else {
        repack(sign, exp, new_int)
    }
}

fn round_fraction_below_one(sign: bool, exp: i32, mode: RoundingMode, exact_flag: bool) -> F128 {
    let round_bit = exp == -1;
    let sticky = exp != -1;

    if exact_flag {
        state::raise_flags(ExceptionFlags::INEXACT);
    }

    if round_increment(mode, sign, round_bit, sticky, false) {
        repack(sign, 0, 1u128 << 127)
    } else {
        pack_zero(sign)
    }
}

// Same reasoning as `exact`: no bits below the target precision, so this
// never raises INEXACT on its own.
fn repack(sign: bool, exp: i32, sig: u128) -> F128 {
    round_pack(Unrounded128 { sign, exp, sig, sticky: false })
}

fn classify(v: F128) -> (bool, bool) {
    match unpack(v) {
        Unpacked::Nan { signaling, .. } => (true, signaling),
        _ => (false, false),
    }
}

fn order_key(v: F128) -> i128 {
    let sign_bit = 1u128 << (EXP_WIDTH + SIG_WIDTH);
    let magnitude = (v.0 & !sign_bit) as i128;
    if v.0 & sign_bit != 0 {
        -magnitude
    } else {
        magnitude
    }
}

fn raise_if_unordered(a_nan: bool, a_sig: bool, b_nan: bool, b_sig: bool, signaling_mode: bool) {
    let raise = signaling_mode || a_sig || b_sig;
    if raise {
        state::raise_flags(ExceptionFlags::INVALID);
    }
}

fn eq(a: F128, b: F128, signaling_mode: bool) -> bool {
    let (a_nan, a_sig) = classify(a);
    let (b_nan, b_sig) = classify(b);
    if a_nan || b_nan {
        raise_if_unordered(a_nan, a_sig, b_nan, b_sig, signaling_mode);
        return false;
    }
    (matches!(unpack(a), Unpacked::Zero { .. }) && matches!(unpack(b), Unpacked::Zero { .. })) || a == b
}

fn le(a: F128, b: F128, signaling_mode: bool) -> bool {
    let (a_nan, a_sig) = classify(a);
    let (b_nan, b_sig) = classify(b);
    if a_nan || b_nan {
        raise_if_unordered(a_nan, a_sig, b_nan, b_sig, signaling_mode);
        return false;
    }
    order_key(a) <= order_key(b)
}

fn lt(a: F128, b: F128, signaling_mode: bool) -> bool {
    let (a_nan, a_sig) = classify(a);
    let (b_nan, b_sig) = classify(b);
    if a_nan || b_nan {
        raise_if_unordered(a_nan, a_sig, b_nan, b_sig, signaling_mode);
        return false;
    }
    order_key(a) < order_key(b)
}

fn is_signaling_nan(a: F128) -> bool {
    classify(a).1
}

fn finite_magnitude_to_u128(sign: bool, exp: i32, sig: u128, mode: RoundingMode, exact_flag: bool) -> u128 {
    if exp > 127 {
        return u128::MAX;
    }
    let dist = 127 - exp;
    let (truncated, round_bit, sticky) = if dist <= 0 {
        (sig, false, false)
    } else {
        let dist = dist as u32;
        if dist >= 128 {
            (0, (sig >> 127) & 1 != 0, (sig & !(1u128 << 127)) != 0)
        } else {
            let t = sig >> dist;
            let rb = (sig >> (dist - 1)) & 1 != 0;
            let st = (sig & ((1u128 << (dist - 1)) - 1)) != 0;
            (t, rb, st)
        }
    };
    let lsb_odd = truncated & 1 != 0;
    if exact_flag && (round_bit || sticky) {
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

fn classify_for_int(a: F128, mode: RoundingMode, exact_flag: bool) -> Classified {
    match unpack(a) {
        Unpacked::Nan { .. } => Classified::Nan,
        Unpacked::Infinity { sign } => Classified::Overflow { toward_positive: !sign },
        Unpacked::Zero { .. } => Classified::Value { magnitude: 0, sign: false },
        Unpacked::Finite { sign, exp, sig } => Classified::Value {
            magnitude: finite_magnitude_to_u128(sign, exp, sig, mode, exact_flag),
            sign,
        },
    }
}

macro_rules! signed_conversion {
    ($name:ident, $ty:ty, $nan_field:ident, $pos_field:ident, $neg_field:ident) => {
        fn $name(a: F128, mode: RoundingMode, exact_flag: bool) -> $ty {
            let sentinels = state::get_policy().int_sentinels;
            match classify_for_int(a, mode, exact_flag) {
                Classified::Nan => {
                    state::raise_flags(ExceptionFlags::INVALID);
                    sentinels.$nan_field
                }
                Classified::Overflow { toward_positive } => {
                    state::raise_flags(ExceptionFlags::INVALID);
                    if toward_positive { sentinels.$pos_field } else { sentinels.$neg_field }
                }
                Classified::Value { magnitude, sign } => {
                    let limit = if sign { (<$ty>::MAX as u128) + 1 } else { <$ty>::MAX as u128 };
                    if magnitude > limit {
                        state::raise_flags(ExceptionFlags::INVALID);
                        if sign { sentinels.$neg_field } else { sentinels.$pos_field }
                    } else if sign {
                        (-(magnitude as i128)) as $ty
                    } else {
                        magnitude as $ty
                    }
                }
            }
        }
    };
}

macro_rules! unsigned_conversion {
    ($name:ident, $ty:ty, $nan_or_pos_field:ident, $neg_field:ident) => {
        fn $name(a: F128, mode: RoundingMode, exact_flag: bool) -> $ty {
            let sentinels = state::get_policy().int_sentinels;
            match classify_for_int(a, mode, exact_flag) {
                Classified::Nan => {
                    state::raise_flags(ExceptionFlags::INVALID);
                    sentinels.$nan_or_pos_field
                }
                Classified::Overflow { toward_positive } => {
                    state::raise_flags(ExceptionFlags::INVALID);
                    if toward_positive { sentinels.$nan_or_pos_field } else { sentinels.$neg_field }
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
    };
}

signed_conversion!(to_i32, i32, i32_from_nan, i32_from_pos_overflow, i32_from_neg_overflow);
signed_conversion!(to_i64, i64, i64_from_nan, i64_from_pos_overflow, i64_from_neg_overflow);
unsigned_conversion!(to_u32, u32, u32_from_nan_or_pos_overflow, u32_from_neg_overflow);
unsigned_conversion!(to_u64, u64, u64_from_nan_or_pos_overflow, u64_from_neg_overflow);

fn from_magnitude(sign: bool, magnitude: u64) -> F128 {
    if magnitude == 0 {
        return pack_zero(sign);
    }
    let shift = magnitude.leading_zeros();
    let sig = u128::from(magnitude << shift) << 64;
    let exp = 63 - shift as i32;
    round_pack(Unrounded128 { sign, exp, sig, sticky: false })
}

fn from_i32(a: i32) -> F128 {
    from_magnitude(a < 0, i64::from(a).unsigned_abs())
}

fn from_i64(a: i64) -> F128 {
    from_magnitude(a < 0, a.unsigned_abs())
}

fn from_u32(a: u32) -> F128 {
    from_magnitude(false, u64::from(a))
}

fn from_u64(a: u64) -> F128 {
    from_magnitude(false, a)
}

/// Converts a narrower format's value into `F128`. Always exact: every
/// f16/f32/f64 finite value fits `F128`'s wider significand without rounding.
fn widen_from_generic<F: crate::format::Format>(a: F) -> F128 {
    match crate::format::unpack(a) {
        crate::format::Unpacked::Nan { sign, signaling, payload } => {
            if signaling {
                state::raise_flags(ExceptionFlags::INVALID);
            }
            match state::get_policy().nan_mode {
                NanMode::RiscV => pack_canonical_nan(),
                NanMode::X86 => {
                    let left_justified = u128::from(payload) << (127 - F::SIG_WIDTH);
                    let narrowed = left_justified >> (127 - SIG_WIDTH);
                    pack_raw_nan(sign, false, narrowed | quiet_bit())
                }
            }
        }
        crate::format::Unpacked::Infinity { sign } => pack_infinity(sign),
        crate::format::Unpacked::Zero { sign } => pack_zero(sign),
        crate::format::Unpacked::Finite { sign, exp, sig } => {
            round_pack(Unrounded128 { sign, exp, sig: u128::from(sig) << 64, sticky: false })
        }
    }
}

/// Converts `F128` to a narrower format, going through that format's own
/// round-pack so the conversion raises `OVERFLOW`/`UNDERFLOW`/`INEXACT`
/// exactly as a same-width arithmetic result would.
fn narrow_to_generic<F: crate::format::Format>(a: F128) -> F {
    match unpack(a) {
        Unpacked::Nan { sign, signaling, payload } => {
            if signaling {
                state::raise_flags(ExceptionFlags::INVALID);
            }
            match state::get_policy().nan_mode {
                NanMode::RiscV => crate::format::pack_canonical_nan(),
                NanMode::X86 => {
                    let narrowed = payload >> (SIG_WIDTH - F::SIG_WIDTH);
                    crate::format::pack_raw_nan(sign, false, (narrowed as u64) | crate::format::quiet_bit(F::SIG_WIDTH))
                }
            }
        }
        Unpacked::Infinity { sign } => crate::format::pack_infinity(sign),
        Unpacked::Zero { sign } => crate::format::pack_zero(sign),
        Unpacked::Finite { sign, exp, sig } => {
            let top = (sig >> 64) as u64;
            let low_sticky = (sig & u128::from(u64::MAX)) != 0;
            crate::round::round_pack(
                crate::round::Unrounded { sign, exp, sig: top, sticky: low_sticky },
                crate::round::Exactness::Exact,
            )
        }
    }
}

/// Converts a host `f16` value into `F128`.
#[must_use]
pub fn from_f16(a: crate::format::F16) -> F128 {
    widen_from_generic(a)
}

/// Converts a `F128` value into the nearest `f16`.
#[must_use]
pub fn to_f16(a: F128) -> crate::format::F16 {
    narrow_to_generic(a)
}

/// Converts a host `f32` value into `F128`.
#[must_use]
pub fn from_f32(a: crate::format::F32) -> F128 {
    widen_from_generic(a)
}

/// Converts a `F128` value into the nearest `f32`.
#[must_use]
pub fn to_f32(a: F128) -> crate::format::F32 {
    narrow_to_generic(a)
}

/// Converts a host `f64` value into `F128`.
#[must_use]
pub fn from_f64(a: crate::format::F64) -> F128 {
    widen_from_generic(a)
}

/// Converts a `F128` value into the nearest `f64`.
#[must_use]
pub fn to_f64(a: F128) -> crate::format::F64 {
    narrow_to_generic(a)
}

/// Converts an 80-bit extended-precision value into `F128`. Always exact:
/// extF80's 64-bit explicit significand fits `F128`'s 112-bit fraction
/// without rounding.
#[must_use]
pub fn from_ext_f80(a: crate::extf80::ExtF80) -> F128 {
    match crate::extf80::unpack(a) {
        crate::extf80::Unpacked::Nan { sign, signaling, payload } => {
            if signaling {
                state::raise_flags(ExceptionFlags::INVALID);
            }
            match state::get_policy().nan_mode {
                NanMode::RiscV => pack_canonical_nan(),
                NanMode::X86 => {
                    let left_justified = u128::from(payload) << (127 - 63);
                    let narrowed = left_justified >> (127 - SIG_WIDTH);
                    pack_raw_nan(sign, false, narrowed | quiet_bit())
                }
            }
        }
        crate::extf80::Unpacked::Infinity { sign } => pack_infinity(sign),
        crate::extf80::Unpacked::Zero { sign } => pack_zero(sign),
        crate::extf80::Unpacked::Finite { sign, exp, sig } => {
            round_pack(Unrounded128 { sign, exp, sig: u128::from(sig) << 64, sticky: false })
        }
    }
}

/// Converts a `F128` value into the nearest 80-bit extended-precision value.
#[must_use]
pub fn to_ext_f80(a: F128) -> crate::extf80::ExtF80 {
    match unpack(a) {
        Unpacked::Nan { sign, signaling, payload } => {
            if signaling {
                state::raise_flags(ExceptionFlags::INVALID);
            }
            match state::get_policy().nan_mode {
                NanMode::RiscV => crate::extf80::pack_canonical_nan(),
                NanMode::X86 => {
                    let narrowed = (payload >> (SIG_WIDTH - 63)) as u64;
                    crate::extf80::pack_raw_nan(sign, false, narrowed)
                }
            }
        }
        Unpacked::Infinity { sign } => crate::extf80::pack_infinity(sign),
        Unpacked::Zero { sign } => crate::extf80::pack_zero(sign),
        Unpacked::Finite { sign, exp, sig } => {
            let top = (sig >> 64) as u64;
            let low_sticky = (sig & u128::from(u64::MAX)) != 0;
            crate::extf80::round_pack_ext(crate::extf80::UnroundedExt {
                sign,
                exp,
                sig: top,
                round_bit: (sig >> 63) & 1 != 0,
                sticky: low_sticky,
            })
        }
    }
}

impl crate::ops::SoftFloat for F128 {
    fn add(self, rhs: Self) -> Self {
        add_sub_dispatch(self, rhs, false)
    }

    fn sub(self, rhs: Self) -> Self {
        add_sub_dispatch(self, rhs, true)
    }

    fn mul(self, rhs: Self) -> Self {
        mul(self, rhs)
    }

    fn mul_add(self, b: Self, c: Self) -> Self {
        mul_add(self, b, c)
    }

    fn div(self, rhs: Self) -> Self {
        div(self, rhs)
    }

    fn rem(self, rhs: Self) -> Self {
        rem(self, rhs)
    }

    fn sqrt(self) -> Self {
        sqrt(self)
    }

    fn round_to_int(self, mode: RoundingMode, exact_flag: bool) -> Self {
        round_to_int(self, mode, exact_flag)
    }

    fn eq(self, rhs: Self) -> bool {
        eq(self, rhs, false)
    }

    fn le(self, rhs: Self) -> bool {
        le(self, rhs, true)
    }

    fn lt(self, rhs: Self) -> bool {
        lt(self, rhs, true)
    }

    fn eq_signaling(self, rhs: Self) -> bool {
        eq(self, rhs, true)
    }

    fn le_quiet(self, rhs: Self) -> bool {
        le(self, rhs, false)
    }

    fn lt_quiet(self, rhs: Self) -> bool {
        lt(self, rhs, false)
    }

    fn is_signaling_nan(self) -> bool {
        is_signaling_nan(self)
    }
}

/// Converts a signed 32-bit integer to `F128`, always exactly.
#[must_use]
pub fn i32_to_f128(a: i32) -> F128 {
    from_i32(a)
}

/// Converts a signed 64-bit integer to `F128`, always exactly.
#[must_use]
pub fn i64_to_f128(a: i64) -> F128 {
    from_i64(a)
}

/// Converts an unsigned 32-bit integer to `F128`, always exactly.
#[must_use]
pub fn u32_to_f128(a: u32) -> F128 {
    from_u32(a)
}

/// Converts an unsigned 64-bit integer to `F128`, always exactly.
#[must_use]
pub fn u64_to_f128(a: u64) -> F128 {
    from_u64(a)
}

/// Converts `F128` to the nearest `i32`, rounding under `mode`.
#[must_use]
pub fn f128_to_i32(a: F128, mode: RoundingMode, exact_flag: bool) -> i32 {
    to_i32(a, mode, exact_flag)
}

/// Converts `F128` to the nearest `i64`, rounding under `mode`.
#[must_use]
pub fn f128_to_i64(a: F128, mode: RoundingMode, exact_flag: bool) -> i64 {
    to_i64(a, mode, exact_flag)
}

/// Converts `F128` to the nearest `u32`, rounding under `mode`.
#[must_use]
pub fn f128_to_u32(a: F128, mode: RoundingMode, exact_flag: bool) -> u32 {
    to_u32(a, mode, exact_flag)
}

/// Converts `F128` to the nearest `u64`, rounding under `mode`.
#[must_use]
pub fn f128_to_u64(a: F128, mode: RoundingMode, exact_flag: bool) -> u64 {
    to_u64(a, mode, exact_flag)
}

#[cfg(test)]
mod tests {
    use super::F128;
    use crate::ops::SoftFloat;
    use crate::policy::Policy;
    use crate::state::{self, RoundingMode};

    fn setup() {
        state::set_policy(Policy::risc_v());
        state::set_rounding_mode(RoundingMode::NearEven);
        state::clear_flags();
    }

    fn one() -> F128 {
        F128(0x3FFF_0000_0000_0000_0000_0000_0000_0000)
    }

    fn two() -> F128 {
        F128(0x4000_0000_0000_0000_0000_0000_0000_0000)
    }

    fn three() -> F128 {
        F128(0x4000_8000_0000_0000_0000_0000_0000_0000)
    }

    #[test]
    fn one_plus_one_is_two() {
        setup();
        let result = SoftFloat::add(one(), one());
        assert_eq!(result, two());
        assert!(state::get_flags().is_empty());
    }

    #[test]
    fn x_minus_x_is_positive_zero() {
        setup();
        let result = SoftFloat::sub(three(), three());
        assert_eq!(result, F128::ZERO);
        assert!(!result.sign());
    }

    #[test]
    fn two_times_two_is_four() {
        setup();
        let result = SoftFloat::mul(two(), two());
        assert_eq!(result.to_bits() >> 112, 0x4001);
    }

    #[test]
    fn six_divided_by_two_is_three() {
        setup();
        let six = F128(0x4001_8000_0000_0000_0000_0000_0000_0000);
        let result = SoftFloat::div(six, two());
        assert_eq!(result, three());
        assert!(state::get_flags().is_empty());
    }

    #[test]
    fn sqrt_of_four_is_two_exactly() {
        setup();
        let four = F128(0x4001_0000_0000_0000_0000_0000_0000_0000);
        let result = SoftFloat::sqrt(four);
        assert_eq!(result, two());
        assert!(state::get_flags().is_empty());
    }

    #[test]
    fn seven_rem_three_is_one() {
        setup();
        let seven = F128(0x4001_C000_0000_0000_0000_0000_0000_0000);
        let result = SoftFloat::rem(seven, three());
        assert_eq!(result, one());
    }

    #[test]
    fn fma_two_three_one_is_seven() {
        setup();
        let result = SoftFloat::mul_add(two(), three(), one());
        let seven = F128(0x4001_C000_0000_0000_0000_0000_0000_0000);
        assert_eq!(result, seven);
    }

    #[test]
    fn ordering_and_equality_hold() {
        setup();
        assert!(SoftFloat::lt(one(), two()));
        assert!(SoftFloat::le(one(), one()));
        assert!(SoftFloat::eq(one(), one()));
    }

    #[test]
    fn round_trip_through_f64() {
        setup();
        let widened = super::from_f64(crate::format::F64::from_bits(0x3FF0_0000_0000_0000));
        assert_eq!(widened, one());
        let narrowed = super::to_f64(one());
        assert_eq!(narrowed.to_bits(), 0x3FF0_0000_0000_0000);
    }

    #[test]
    fn int_round_trip() {
        setup();
        let value = super::from_i64(-100);
        assert_eq!(super::to_i64(value, RoundingMode::NearEven, true), -100);
        assert!(state::get_flags().is_empty());
    }
}
