//! The 80-bit (x87 extended-precision) binary interchange format.
//!
//! Unlike every other format in this crate, extF80 stores its leading
//! integer bit explicitly (at bit 63 of `sig`) rather than implying it from
//! a normal exponent field. That one structural difference is why this
//! format can't plug into [`crate::format::Format`]/[`crate::ops`] despite
//! its significand already fitting a 64-bit register: every algorithm below
//! is the 64-bit generic path's, adjusted to carry the integer bit through
//! explicitly instead of assuming it's always bit 63 of a normalized value.

use crate::nan::CommonNan;
use crate::policy::NanMode;
use crate::primitives::{mul_64_to_128, shift_right_jam_extra_u128, shift_right_jam_u128};
use crate::round::round_increment;
use crate::state::{self, ExceptionFlags, RoundingMode, TininessMode};

const EXP_WIDTH: u32 = 15;
const BIAS: i32 = 16383;

/// An 80-bit extended-precision value: a 15-bit biased exponent (plus sign)
/// and a 64-bit significand with an explicit integer bit at bit 63 — unlike
/// every other format here, a normal extF80 value's integer bit is stored,
/// not implied.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtF80 {
    signexp: u16,
    sig: u64,
}

impl ExtF80 {
    /// Positive zero.
    pub const ZERO: Self = Self { signexp: 0, sig: 0 };
    /// Positive infinity.
    pub const INFINITY: Self = Self { signexp: 0x7FFF, sig: 1 << 63 };
    /// Negative infinity.
    pub const NEG_INFINITY: Self = Self { signexp: 0xFFFF, sig: 1 << 63 };

    /// Builds a value from its raw `(signexp, sig)` fields: `signexp`'s low
    /// 15 bits are the biased exponent, its bit 15 the sign; `sig` is the
    /// 64-bit significand with the explicit integer bit at bit 63.
    #[must_use]
    pub const fn from_bits(signexp: u16, sig: u64) -> Self {
        Self { signexp, sig }
    }

    /// Returns the raw `(signexp, sig)` fields.
    #[must_use]
    pub const fn to_bits(self) -> (u16, u64) {
        (self.signexp, self.sig)
    }

    /// The sign bit.
    #[must_use]
    pub const fn sign(self) -> bool {
        self.signexp & 0x8000 != 0
    }

    fn exp_field(self) -> u16 {
        self.signexp & 0x7FFF
    }

    /// Decodes a little-endian 10-byte memory-form slice (8 bytes of
    /// significand followed by 2 bytes of sign+exponent, the x87 in-memory
    /// layout) into a packed value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::FormatError::InvalidByteLength`] if `bytes`
    /// isn't exactly 10 bytes long.
    pub fn from_le_bytes(bytes: &[u8]) -> Result<Self, crate::error::FormatError> {
        if bytes.len() != 10 {
            return Err(crate::error::FormatError::InvalidByteLength {
                expected: 10,
                actual: bytes.len(),
            });
        }
        let mut sig_bytes = [0u8; 8];
        sig_bytes.copy_from_slice(&bytes[0..8]);
        let mut exp_bytes = [0u8; 2];
        exp_bytes.copy_from_slice(&bytes[8..10]);
        Ok(Self {
            signexp: u16::from_le_bytes(exp_bytes),
            sig: u64::from_le_bytes(sig_bytes),
        })
    }

    /// Encodes this value as little-endian x87 memory-form bytes.
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 10] {
        let sig_bytes = self.sig.to_le_bytes();
        let exp_bytes = self.signexp.to_le_bytes();
        [
            sig_bytes[0],
            sig_bytes[1],
            sig_bytes[2],
            sig_bytes[3],
            sig_bytes[4],
            sig_bytes[5],
            sig_bytes[6],
            sig_bytes[7],
            exp_bytes[0],
            exp_bytes[1],
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Unpacked {
    Zero { sign: bool },
    Infinity { sign: bool },
    Nan { sign: bool, signaling: bool, payload: u64 },
    Finite { sign: bool, exp: i32, sig: u64 },
}

/// Decomposes a packed value, renormalizing subnormals and — uniquely to
/// this format — "pseudo-denormal"/unnormal encodings (a nonzero exponent
/// field whose integer bit is 0) into the same left-justified convention
/// every other `unpack` in this crate produces.
pub(crate) fn unpack(value: ExtF80) -> Unpacked {
    let sign = value.sign();
    let exp_field = value.exp_field();
    let sig = value.sig;

    if exp_field == 0 {
        if sig == 0 {
            Unpacked::Zero { sign }
        } else {
            let shift = sig.leading_zeros();
            let normalized = sig << shift;
            let exp = 1 - BIAS - shift as i32;
            Unpacked::Finite { sign, exp, sig: normalized }
        }
    } else if exp_field == 0x7FFF {
        if sig == (1u64 << 63) {
            Unpacked::Infinity { sign }
        } else {
            let signaling = sig & (1u64 << 62) == 0;
            Unpacked::Nan { sign, signaling, payload: sig & !(1u64 << 63) }
        }
    } else if sig & (1u64 << 63) == 0 {
        // Unnormal: unsupported by any of the policies this crate models,
        // but harmless to renormalize the same way a subnormal would be.
        let shift = sig.leading_zeros();
        let normalized = sig << shift;
        let exp = exp_field as i32 - BIAS - shift as i32;
        Unpacked::Finite { sign, exp, sig: normalized }
    } else {
        let exp = exp_field as i32 - BIAS;
        Unpacked::Finite { sign, exp, sig }
    }
}

pub(crate) fn pack_zero(sign: bool) -> ExtF80 {
    ExtF80 { signexp: u16::from(sign) << 15, sig: 0 }
}

pub(crate) fn pack_infinity(sign: bool) -> ExtF80 {
    ExtF80 { signexp: (u16::from(sign) << 15) | 0x7FFF, sig: 1 << 63 }
}

pub(crate) fn pack_canonical_nan() -> ExtF80 {
    ExtF80 { signexp: 0x7FFF, sig: (1u64 << 63) | (1u64 << 62) }
}

pub(crate) fn pack_raw_nan(sign: bool, signaling: bool, payload: u64) -> ExtF80 {
    let quiet = if signaling { 0 } else { 1u64 << 62 };
    let sig = (1u64 << 63) | quiet | (payload & ((1u64 << 63) - 1));
    ExtF80 { signexp: (u16::from(sign) << 15) | 0x7FFF, sig }
}

fn unpack_nan(value: ExtF80) -> Option<CommonNan> {
    match unpack(value) {
        Unpacked::Nan { sign, signaling, payload } => Some(CommonNan { sign, signaling, payload }),
        _ => None,
    }
}

fn select_x86(a: CommonNan, b: CommonNan) -> CommonNan {
    if a.payload > b.payload || (a.payload == b.payload && !a.sign && b.sign) {
        a
    } else {
        b
    }
}

fn propagate_nan(a: ExtF80, b: ExtF80) -> ExtF80 {
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
            pack_raw_nan(chosen.sign, false, chosen.payload | (1u64 << 62))
        }
    }
}

fn propagate_nan_unary(a: ExtF80) -> ExtF80 {
    let a_nan = unpack_nan(a).expect("propagate_nan_unary called with a non-NaN operand");
    if a_nan.signaling {
        state::raise_flags(ExceptionFlags::INVALID);
    }
    match state::get_policy().nan_mode {
        NanMode::RiscV => pack_canonical_nan(),
        NanMode::X86 => pack_raw_nan(a_nan.sign, false, a_nan.payload | (1u64 << 62)),
    }
}

fn propagate_nan_ternary(a: ExtF80, b: ExtF80, c: ExtF80) -> ExtF80 {
    let ab_is_nan = matches!(unpack(a), Unpacked::Nan { .. }) || matches!(unpack(b), Unpacked::Nan { .. });
    if ab_is_nan {
        propagate_nan(propagate_nan(a, b), c)
    } else {
        propagate_nan_unary(c)
    }
}

/// An unrounded extF80 result. Unlike [`crate::round::Unrounded`], the
/// round/guard bit and sticky bit are carried as separate fields instead of
/// being extracted from a packed fraction field inside the pack step: extF80
/// has no fixed fraction width to extract them from — the integer bit is
/// explicit and the full 64 bits of `sig` are always significant.
#[derive(Clone, Copy, Debug)]
pub(crate) struct UnroundedExt {
    pub sign: bool,
    pub exp: i32,
    pub sig: u64,
    pub round_bit: bool,
    pub sticky: bool,
}

pub(crate) fn round_pack_ext(input: UnroundedExt) -> ExtF80 {
    round_pack_ext_with(input, state::get_rounding_mode())
}

fn round_pack_ext_with(input: UnroundedExt, mode: RoundingMode) -> ExtF80 {
    let UnroundedExt { sign, exp: true_exp, mut sig, mut round_bit, mut sticky } = input;
    let mut exp = true_exp + BIAS;

    if exp <= 0 {
        // Widen (sig, round_bit) into one 128-bit register with `sig` in the
        // top 64 bits and the incoming round bit just below it, so a single
        // jam-shift by `dist` produces a new sig/round_bit pair at this
        // format's native width with everything below correctly folded into
        // sticky — mirrors the generic path's subnormal shift, adapted to
        // this format's separate round/sticky fields instead of shifting
        // within a single register that already holds them at fixed offsets.
        let dist = (1 - exp) as u32;
        let combined: u128 = (u128::from(sig) << 64) | (u128::from(round_bit) << 63);
        let (shifted, extra) = shift_right_jam_extra_u128(combined, sticky, dist);
        sig = (shifted >> 64) as u64;
        round_bit = (shifted >> 63) & 1 != 0;
        sticky = extra || (shifted & ((1u128 << 63) - 1)) != 0;
        exp = 0;
    }

    let lsb_odd = sig & 1 != 0;
    let inexact = round_bit || sticky;

    let policy = state::get_policy();
    let tiny_before = exp <= 0
        && policy.detect_tininess == TininessMode::BeforeRounding
        && inexact;

    let roundup = round_increment(mode, sign, round_bit, sticky, lsb_odd);
    let mut biased_exp = exp;
    let mut new_sig = sig;

    if roundup {
        let (bumped, carried) = new_sig.overflowing_add(1);
        if carried {
            new_sig = 1u64 << 63;
            biased_exp += 1;
        } else {
            new_sig = bumped;
            if new_sig & (1u64 << 63) == 0 && biased_exp > 0 {
                // Rounding up from just below a power of two (all-ones
                // fraction with the integer bit already set) never clears
                // the integer bit for this format — the explicit-bit layout
                // has no separate fraction field to overflow out of, so this
                // branch is unreachable in practice but kept defensive.
                new_sig |= 1u64 << 63;
            }
        }
    }

    let max_exp_field = 0x7FFFi32;
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

    ExtF80 {
        signexp: (u16::from(sign) << 15) | (biased_exp as u16),
        sig: new_sig,
    }
}

fn overflow_result(sign: bool, mode: RoundingMode) -> ExtF80 {
    let deliver_infinity = matches!(mode, RoundingMode::NearEven | RoundingMode::NearMaxMag)
        || (sign && mode == RoundingMode::Min)
        || (!sign && mode == RoundingMode::Max);
    if deliver_infinity {
        pack_infinity(sign)
    } else {
        max_finite(sign)
    }
}

fn max_finite(sign: bool) -> ExtF80 {
    ExtF80 { signexp: (u16::from(sign) << 15) | 0x7FFE, sig: u64::MAX }
}

// `round_bit`/`sticky` both false means `round_pack_ext`'s own `inexact`
// computation is false, so this never raises INEXACT even though
// `round_pack_ext` has no separate exactness gate: the caller is asserting
// the value needs no rounding, not suppressing a flag that would otherwise
// fire.
fn exact(sign: bool, exp: i32, sig: u64) -> ExtF80 {
    round_pack_ext(UnroundedExt { sign, exp, sig, round_bit: false, sticky: false })
}

fn add_sub_dispatch(a: ExtF80, b: ExtF80, subtract: bool) -> ExtF80 {
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

fn add_mags(sign: bool, ea: i32, siga: u64, eb: i32, sigb: u64) -> ExtF80 {
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
    let round_bit = (sig128 >> 63) & 1 != 0;
    let sticky = (sig128 & ((1u128 << 63) - 1)) != 0;
    round_pack_ext(UnroundedExt { sign, exp, sig, round_bit, sticky })
}

fn sub_mags(sign_a: bool, ea: i32, siga: u64, eb: i32, sigb: u64) -> ExtF80 {
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
        return pack_zero(state::get_rounding_mode() == RoundingMode::Min);
    }

    let shift = diff.leading_zeros();
    let sig128 = diff << shift;
    let exp = exp - shift as i32;

    let sig = (sig128 >> 64) as u64;
    let round_bit = (sig128 >> 63) & 1 != 0;
    let sticky = (sig128 & ((1u128 << 63) - 1)) != 0;
    round_pack_ext(UnroundedExt { sign: result_sign, exp, sig, round_bit, sticky })
}

fn mul(a: ExtF80, b: ExtF80) -> ExtF80 {
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
            let product = mul_64_to_128(siga, sigb);

            let (sig, round_bit, sticky, exp) = if product >> 127 != 0 {
                let sig = (product >> 64) as u64;
                let round_bit = (product >> 63) & 1 != 0;
                let sticky = (product & ((1u128 << 63) - 1)) != 0;
                (sig, round_bit, sticky, ea + eb + 1)
            } else {
                let shifted = product << 1;
                let sig = (shifted >> 64) as u64;
                let round_bit = (shifted >> 63) & 1 != 0;
                let sticky = (shifted & ((1u128 << 63) - 1)) != 0;
                (sig, round_bit, sticky, ea + eb)
            };

            round_pack_ext(UnroundedExt { sign, exp, sig, round_bit, sticky })
        }
    }
}

fn operand_sign(u: Unpacked) -> bool {
    match u {
        Unpacked::Zero { sign } | Unpacked::Infinity { sign } | Unpacked::Nan { sign, .. } | Unpacked::Finite { sign, .. } => sign,
    }
}

fn mul_add(a: ExtF80, b: ExtF80, c: ExtF80) -> ExtF80 {
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
    let raw_product = mul_64_to_128(siga, sigb);

    let (mut p_wide, mut p_exp) = if raw_product >> 127 != 0 {
        (raw_product, ea + eb + 1)
    } else {
        (raw_product << 1, ea + eb)
    };

    match uc {
        Unpacked::Zero { .. } => {
            let sig = (p_wide >> 64) as u64;
            let round_bit = (p_wide >> 63) & 1 != 0;
            let sticky = (p_wide & ((1u128 << 63) - 1)) != 0;
            round_pack_ext(UnroundedExt { sign: product_sign, exp: p_exp, sig, round_bit, sticky })
        }
        Unpacked::Finite { sign: sc, exp: ec, sig: sigc } => {
            let mut c_wide = u128::from(sigc) << 64;
            let mut sticky = false;

            let result_exp = if p_exp >= ec {
                let dist = (p_exp - ec) as u32;
                let before = c_wide;
                c_wide = shift_right_jam_u128(c_wide, dist);
                sticky |= dist != 0 && before != (c_wide & !1u128) && c_wide & 1 != 0;
                p_exp
            } else {
                let dist = (ec - p_exp) as u32;
                let before = p_wide;
                p_wide = shift_right_jam_u128(p_wide, dist);
                sticky |= dist != 0 && before != (p_wide & !1u128) && p_wide & 1 != 0;
                ec
            };

            let (sign, sig128, exp, extra_sticky) = if product_sign == sc {
                let (sum, carry) = p_wide.overflowing_add(c_wide);
                if carry {
                    let shifted = shift_right_jam_u128(sum, 1) | (1u128 << 127);
                    let dropped = sum & 1 != 0;
                    (product_sign, shifted, result_exp + 1, dropped)
                } else {
                    (product_sign, sum, result_exp, false)
                }
            } else if p_wide >= c_wide {
                let diff = p_wide - c_wide;
                if diff == 0 {
                    return pack_zero(state::get_rounding_mode() == RoundingMode::Min);
                }
                let shift = diff.leading_zeros();
                (product_sign, diff << shift, result_exp - shift as i32, false)
            } else {
                let diff = c_wide - p_wide;
                let shift = diff.leading_zeros();
                (!product_sign, diff << shift, result_exp - shift as i32, false)
            };

            let sig = (sig128 >> 64) as u64;
            let round_bit = (sig128 >> 63) & 1 != 0;
            let low_sticky = (sig128 & ((1u128 << 63) - 1)) != 0;

            round_pack_ext(UnroundedExt {
                sign,
                exp,
                sig,
                round_bit,
                sticky: sticky || extra_sticky || low_sticky,
            })
        }
        Unpacked::Infinity { .. } | Unpacked::Nan { .. } => unreachable!(),
    }
}

fn div(a: ExtF80, b: ExtF80) -> ExtF80 {
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

            let (numerator, exp_adjust): (u128, i32) = if siga < sigb {
                (u128::from(siga) << 64, -1)
            } else {
                (u128::from(siga) << 63, 0)
            };

            let divisor = u128::from(sigb);
            let quotient = (numerator / divisor) as u64;
            let remainder = numerator % divisor;

            round_pack_ext(UnroundedExt {
                sign,
                exp: ea - eb + exp_adjust,
                sig: quotient,
                round_bit: false,
                sticky: remainder != 0,
            })
        }
    }
}

fn rem(a: ExtF80, b: ExtF80) -> ExtF80 {
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

    let adjust = i32::from(gap == -1);
    let eb_work = eb - adjust;
    let modulus = u128::from(sigb) << adjust;
    let gap_work = (ea - eb_work) as u32;

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
        return pack_zero(result_sign);
    }

    let r_mag = r_mag as u64;
    let shift = r_mag.leading_zeros();
    round_pack_ext(UnroundedExt {
        sign: result_sign,
        exp: eb_work - shift as i32,
        sig: r_mag << shift,
        round_bit: false,
        sticky: false,
    })
}

fn sqrt(a: ExtF80) -> ExtF80 {
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
            let m: u128 = u128::from(sig) << (63 + r);
            let rsig = m.isqrt() as u64;
            let remainder = m - u128::from(rsig) * u128::from(rsig);

            round_pack_ext(UnroundedExt {
                sign: false,
                exp: re,
                sig: rsig,
                round_bit: false,
                sticky: remainder != 0,
            })
        }
    }
}

fn round_to_int(a: ExtF80, mode: RoundingMode, exact_flag: bool) -> ExtF80 {
    match unpack(a) {
        Unpacked::Nan { .. } => propagate_nan_unary(a),
        Unpacked::Zero { .. } | Unpacked::Infinity { .. } => a,
        Unpacked::Finite { sign, exp, sig } => {
            if exp >= 63 {
                return a;
            }
            if exp < 0 {
                return round_fraction_below_one(sign, exp, mode, exact_flag);
            }
            round_middle(sign, exp, sig, mode, exact_flag)
        }
    }
}

fn round_middle(sign: bool, exp: i32, sig: u64, mode: RoundingMode, exact_flag: bool) -> ExtF80 {
    let shift = (63 - exp) as u32;
    let frac_mask = (1u64 << shift) - 1;
    let int_part = sig & !frac_mask;
    let frac = sig & frac_mask;

    let round_bit = (frac >> (shift - 1)) & 1 != 0;
    let sticky = (frac & ((1u64 << (shift - 1)) - 1)) != 0;
    let lsb_odd = (int_part >> shift) & 1 != 0;
    let inexact = round_bit || sticky;

    if exact_flag && inexact {
        state::raise_flags(ExceptionFlags::INEXACT);
    }

    if !round_increment(mode, sign, round_bit, sticky, lsb_odd) {
        return repack(sign, exp, int_part);
    }

    let (new_int, carried) = int_part.overflowing_add(1u64 << shift);
    if carried {
        repack(sign, exp + 1, 1u64 << 63)
    } else {
        repack(sign, exp, new_int)
    }
}

fn round_fraction_below_one(sign: bool, exp: i32, mode: RoundingMode, exact_flag: bool) -> ExtF80 {
    let round_bit = exp == -1;
    let sticky = exp != -1;

    if exact_flag {
        state::raise_flags(ExceptionFlags::INEXACT);
    }

    if round_increment(mode, sign, round_bit, sticky, false) {
        repack(sign, 0, 1u64 << 63)
    } else {
        pack_zero(sign)
    }
}

// Same reasoning as `exact`: zero round_bit/sticky means this never raises
// INEXACT on its own.
fn repack(sign: bool, exp: i32, sig: u64) -> ExtF80 {
    round_pack_ext(UnroundedExt { sign, exp, sig, round_bit: false, sticky: false })
}

fn classify(v: ExtF80) -> (bool, bool) {
    match unpack(v) {
        Unpacked::Nan { signaling, .. } => (true, signaling),
        _ => (false, false),
    }
}

/// A total order over the non-NaN bit patterns: `(sign, exp_field, sig)`
/// compared lexicographically with sign flipping the direction, mirroring
/// the generic formats' bit-pattern-as-integer trick but over this format's
/// two-field layout instead of one packed integer.
fn order_key(v: ExtF80) -> (bool, i128) {
    let exp_field = i128::from(v.exp_field());
    let magnitude = (exp_field << 64) | i128::from(v.sig);
    if v.sign() {
        (true, -magnitude)
    } else {
        (false, magnitude)
    }
}

fn raise_if_unordered(a_nan: bool, a_sig: bool, b_nan: bool, b_sig: bool, signaling_mode: bool) {
    let raise = signaling_mode || a_sig || b_sig;
    if raise {
        state::raise_flags(ExceptionFlags::INVALID);
    }
}

fn eq(a: ExtF80, b: ExtF80, signaling_mode: bool) -> bool {
    let (a_nan, a_sig) = classify(a);
    let (b_nan, b_sig) = classify(b);
    if a_nan || b_nan {
        raise_if_unordered(a_nan, a_sig, b_nan, b_sig, signaling_mode);
        return false;
    }
    (matches!(unpack(a), Unpacked::Zero { .. }) && matches!(unpack(b), Unpacked::Zero { .. })) || a == b
}

fn le(a: ExtF80, b: ExtF80, signaling_mode: bool) -> bool {
    let (a_nan, a_sig) = classify(a);
    let (b_nan, b_sig) = classify(b);
    if a_nan || b_nan {
        raise_if_unordered(a_nan, a_sig, b_nan, b_sig, signaling_mode);
        return false;
    }
    order_key(a).1 <= order_key(b).1
}

fn lt(a: ExtF80, b: ExtF80, signaling_mode: bool) -> bool {
    let (a_nan, a_sig) = classify(a);
    let (b_nan, b_sig) = classify(b);
    if a_nan || b_nan {
        raise_if_unordered(a_nan, a_sig, b_nan, b_sig, signaling_mode);
        return false;
    }
    order_key(a).1 < order_key(b).1
}

fn is_signaling_nan(a: ExtF80) -> bool {
    classify(a).1
}

enum Classified {
    Value { magnitude: u128, sign: bool },
    Nan,
    Overflow { toward_positive: bool },
}

fn classify_for_int(a: ExtF80, mode: RoundingMode, exact_flag: bool) -> Classified {
    match unpack(a) {
        Unpacked::Nan { .. } => Classified::Nan,
        Unpacked::Infinity { sign } => Classified::Overflow { toward_positive: !sign },
        Unpacked::Zero { .. } => Classified::Value { magnitude: 0, sign: false },
        Unpacked::Finite { sign, exp, sig } => Classified::Value {
            magnitude: crate::ops::convert::finite_magnitude_to_u128(sign, exp, sig, mode, exact_flag),
            sign,
        },
    }
}

macro_rules! signed_conversion {
    ($name:ident, $ty:ty, $nan_field:ident, $pos_field:ident, $neg_field:ident) => {
        /// Converts `a` to the nearest representable integer of this width.
        #[must_use]
        pub fn $name(a: ExtF80, mode: RoundingMode, exact_flag: bool) -> $ty {
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
        /// Converts `a` to the nearest representable unsigned integer of this
        /// width.
        #[must_use]
        pub fn $name(a: ExtF80, mode: RoundingMode, exact_flag: bool) -> $ty {
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

fn from_magnitude(sign: bool, magnitude: u64) -> ExtF80 {
    if magnitude == 0 {
        return pack_zero(sign);
    }
    let shift = magnitude.leading_zeros();
    let sig = magnitude << shift;
    let exp = 63 - shift as i32;
    exact(sign, exp, sig)
}

/// Converts a signed 32-bit integer to `ExtF80`, always exactly.
#[must_use]
pub fn from_i32(a: i32) -> ExtF80 {
    from_magnitude(a < 0, i64::from(a).unsigned_abs())
}

/// Converts a signed 64-bit integer to `ExtF80`, always exactly.
#[must_use]
pub fn from_i64(a: i64) -> ExtF80 {
    from_magnitude(a < 0, a.unsigned_abs())
}

/// Converts an unsigned 32-bit integer to `ExtF80`, always exactly.
#[must_use]
pub fn from_u32(a: u32) -> ExtF80 {
    from_magnitude(false, u64::from(a))
}

/// Converts an unsigned 64-bit integer to `ExtF80`, always exactly.
#[must_use]
pub fn from_u64(a: u64) -> ExtF80 {
    from_magnitude(false, a)
}

/// Converts a narrower generic format's value into `ExtF80`. Always exact:
/// f16/f32/f64's significands all fit this format's 64-bit one without
/// rounding.
fn widen_from_generic<F: crate::format::Format>(a: F) -> ExtF80 {
    match crate::format::unpack(a) {
        crate::format::Unpacked::Nan { sign, signaling, payload } => {
            if signaling {
                state::raise_flags(ExceptionFlags::INVALID);
            }
            match state::get_policy().nan_mode {
                NanMode::RiscV => pack_canonical_nan(),
                NanMode::X86 => {
                    let left_justified = payload << (63 - F::SIG_WIDTH);
                    pack_raw_nan(sign, false, left_justified)
                }
            }
        }
        crate::format::Unpacked::Infinity { sign } => pack_infinity(sign),
        crate::format::Unpacked::Zero { sign } => pack_zero(sign),
        crate::format::Unpacked::Finite { sign, exp, sig } => exact(sign, exp, sig),
    }
}

/// Converts `ExtF80` to a narrower generic format, going through that
/// format's own round-pack so the conversion raises
/// `OVERFLOW`/`UNDERFLOW`/`INEXACT` exactly as a same-width arithmetic result
/// would.
fn narrow_to_generic<F: crate::format::Format>(a: ExtF80) -> F {
    match unpack(a) {
        Unpacked::Nan { sign, signaling, payload } => {
            if signaling {
                state::raise_flags(ExceptionFlags::INVALID);
            }
            match state::get_policy().nan_mode {
                NanMode::RiscV => crate::format::pack_canonical_nan(),
                NanMode::X86 => {
                    let narrowed = payload >> (63 - F::SIG_WIDTH);
                    crate::format::pack_raw_nan(sign, false, narrowed | crate::format::quiet_bit(F::SIG_WIDTH))
                }
            }
        }
        Unpacked::Infinity { sign } => crate::format::pack_infinity(sign),
        Unpacked::Zero { sign } => crate::format::pack_zero(sign),
        Unpacked::Finite { sign, exp, sig } => crate::round::round_pack(
            crate::round::Unrounded { sign, exp, sig, sticky: false },
            crate::round::Exactness::Exact,
        ),
    }
}

/// Converts a host `f16` value into `ExtF80`.
#[must_use]
pub fn from_f16(a: crate::format::F16) -> ExtF80 {
    widen_from_generic(a)
}

/// Converts an `ExtF80` value into the nearest `f16`.
#[must_use]
pub fn to_f16(a: ExtF80) -> crate::format::F16 {
    narrow_to_generic(a)
}

/// Converts a host `f32` value into `ExtF80`.
#[must_use]
pub fn from_f32(a: crate::format::F32) -> ExtF80 {
    widen_from_generic(a)
}

/// Converts an `ExtF80` value into the nearest `f32`.
#[must_use]
pub fn to_f32(a: ExtF80) -> crate::format::F32 {
    narrow_to_generic(a)
}

/// Converts a host `f64` value into `ExtF80`.
#[must_use]
pub fn from_f64(a: crate::format::F64) -> ExtF80 {
    widen_from_generic(a)
}

/// Converts an `ExtF80` value into the nearest `f64`.
#[must_use]
pub fn to_f64(a: ExtF80) -> crate::format::F64 {
    narrow_to_generic(a)
}

impl crate::ops::SoftFloat for ExtF80 {
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

#[cfg(test)]
mod tests {
    use super::ExtF80;
    use crate::ops::SoftFloat;
    use crate::policy::Policy;
    use crate::state::{self, RoundingMode};

    fn setup() {
        state::set_policy(Policy::x86());
        state::set_rounding_mode(RoundingMode::NearEven);
        state::clear_flags();
    }

    fn one() -> ExtF80 {
        ExtF80::from_bits(0x3FFF, 1u64 << 63)
    }

    fn two() -> ExtF80 {
        ExtF80::from_bits(0x4000, 1u64 << 63)
    }

    fn three() -> ExtF80 {
        ExtF80::from_bits(0x4000, 0xC000_0000_0000_0000)
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
        assert_eq!(result, ExtF80::ZERO);
        assert!(!result.sign());
    }

    #[test]
    fn two_times_two_is_four() {
        setup();
        let result = SoftFloat::mul(two(), two());
        assert_eq!(result, ExtF80::from_bits(0x4001, 1u64 << 63));
    }

    #[test]
    fn six_divided_by_two_is_three() {
        setup();
        let six = ExtF80::from_bits(0x4001, 0xC000_0000_0000_0000);
        let result = SoftFloat::div(six, two());
        assert_eq!(result, three());
        assert!(state::get_flags().is_empty());
    }

    #[test]
    fn sqrt_of_four_is_two_exactly() {
        setup();
        let four = ExtF80::from_bits(0x4001, 1u64 << 63);
        let result = SoftFloat::sqrt(four);
        assert_eq!(result, two());
        assert!(state::get_flags().is_empty());
    }

    #[test]
    fn seven_rem_three_is_one() {
        setup();
        let seven = ExtF80::from_bits(0x4001, 0xE000_0000_0000_0000);
        let result = SoftFloat::rem(seven, three());
        assert_eq!(result, one());
    }

    #[test]
    fn fma_two_three_one_is_seven() {
        setup();
        let result = SoftFloat::mul_add(two(), three(), one());
        let seven = ExtF80::from_bits(0x4001, 0xE000_0000_0000_0000);
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
    fn unnormal_encoding_renormalizes_on_unpack() {
        setup();
        // Nonzero exponent field but integer bit clear: a legal but unusual
        // x87 "unnormal" encoding of the same value as `one()` shifted down
        // by one exponent step.
        let unnormal = ExtF80::from_bits(0x4000, 1u64 << 62);
        let result = SoftFloat::add(unnormal, ExtF80::ZERO);
        assert_eq!(result, one());
    }
}
