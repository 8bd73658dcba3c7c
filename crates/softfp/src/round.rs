//! The rounding-and-pack pipeline: the single point at which every
//! arithmetic operation raises `INEXACT`/`UNDERFLOW`/`OVERFLOW` and produces
//! a packed result from an unrounded `(sign, exp, sig, sticky)` tuple.
//!
//! Grounded on `s_roundPackToF32.cpp`'s algorithm (round-increment-by-mode,
//! overflow-band check, subnormal shift with tininess selection, nearest-even
//! tie-to-LSB-parity), reimplemented over the left-justified-to-64-bit
//! significand convention `format::unpack` produces instead of the
//! original's per-format-width right-aligned registers.

use crate::format::{exp_mask, frac_mask, Format};
use crate::policy::TininessMode;
use crate::primitives::shift_right_jam_extra_u64;
use crate::state::{ExceptionFlags, RoundingMode};

/// An unrounded result: `sig` left-justified (implicit bit at bit 63 for a
/// normal, unnormalized for a subnormal/zero-producing result), `exp` the
/// true exponent such that `value = (-1)^sign * (sig / 2^63) * 2^exp`, and
/// `sticky` any round/guard information already shifted off before this
/// point (e.g. by an earlier alignment step in the caller).
#[derive(Clone, Copy, Debug)]
pub(crate) struct Unrounded {
    pub sign: bool,
    pub exp: i32,
    pub sig: u64,
    pub sticky: bool,
}

/// Whether the caller wants `INEXACT` raised for discarded bits. Conversion
/// routines that only care about overflow/invalid pass `false`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Exactness {
    Exact,
    MayDiscard,
}

/// Computes the round increment for (mode, sign, round/sticky bits, LSB
/// parity). Shared by [`round_pack`] and `ops::round_to_int`, which rounds to
/// an integer boundary inside the 64-bit working register rather than a
/// format's fraction field but needs the exact same mode table.
pub(crate) fn round_increment(
    mode: RoundingMode,
    sign: bool,
    round_bit: bool,
    sticky: bool,
    lsb: bool,
) -> bool {
    match mode {
        RoundingMode::NearEven => round_bit && (sticky || lsb),
        RoundingMode::NearMaxMag => round_bit,
        RoundingMode::MinMag => false,
        RoundingMode::Min => sign && (round_bit || sticky),
        RoundingMode::Max => !sign && (round_bit || sticky),
    }
}

/// Runs the rounding-and-pack pipeline, raising flags on the ambient
/// per-thread cell as a side effect (per §5/§7 of the design — there is no
/// return-channel error path for arithmetic).
pub(crate) fn round_pack<F: Format>(input: Unrounded, exactness: Exactness) -> F {
    round_pack_with(input, exactness, crate::state::get_rounding_mode())
}

/// As [`round_pack`], but with an explicit rounding mode rather than the
/// ambient one — used by conversion entry points that take a rounding-mode
/// argument directly (§6 of the design).
pub(crate) fn round_pack_with<F: Format>(
    input: Unrounded,
    exactness: Exactness,
    mode: RoundingMode,
) -> F {
    let Unrounded {
        sign,
        exp: true_exp,
        mut sig,
        mut sticky,
    } = input;

    // `true_exp` is the unbiased exponent `unpack` hands back everywhere
    // else in the crate; this is the one place it turns into the packed
    // format's biased exponent field, so every caller stays in the
    // unbiased domain and never open-codes `+ F::BIAS` itself.
    let mut exp = true_exp + F::BIAS;

    let round_pos = 62 - F::SIG_WIDTH;
    let max_exp_field = exp_mask(F::EXP_WIDTH) as i32;

    if exp <= 0 {
        let dist = (1 - exp) as u32;
        let (shifted, extra) = shift_right_jam_extra_u64(sig, sticky, dist);
        sig = shifted;
        sticky = extra;
        exp = 0;
    }

    let round_bit = (sig >> round_pos) & 1 != 0;
    let sticky_mask = (1u64 << round_pos) - 1;
    let sticky_all = sticky || (sig & sticky_mask) != 0;
    let frac = (sig >> (round_pos + 1)) & frac_mask(F::SIG_WIDTH);
    let lsb_odd = frac & 1 != 0;

    let policy = crate::state::get_policy();
    let tiny_before = exp <= 0
        && policy.detect_tininess == TininessMode::BeforeRounding
        && (round_bit || sticky_all);

    let roundup = round_increment(mode, sign, round_bit, sticky_all, lsb_odd);
    let mut biased_exp = exp;
    let mut new_frac = frac;

    if roundup {
        new_frac += 1;
        if new_frac == 1u64 << F::SIG_WIDTH {
            new_frac = 0;
            biased_exp += 1;
        }
    }

    let inexact = round_bit || sticky_all;

    if biased_exp >= max_exp_field {
        crate::state::raise_flags(ExceptionFlags::OVERFLOW | ExceptionFlags::INEXACT);
        return overflow_result::<F>(sign, mode);
    }

    if biased_exp <= 0 && inexact {
        let tiny_after = policy.detect_tininess == TininessMode::AfterRounding;
        if tiny_before || tiny_after {
            crate::state::raise_flags(ExceptionFlags::UNDERFLOW);
        }
    }

    if inexact && exactness == Exactness::Exact {
        crate::state::raise_flags(ExceptionFlags::INEXACT);
    }

    let bits = (u64::from(sign) << (F::EXP_WIDTH + F::SIG_WIDTH))
        + ((biased_exp as u64) << F::SIG_WIDTH)
        + new_frac;
    F::from_bits(<F::Bits as crate::format::BitsInt>::from_u64(bits))
}

fn overflow_result<F: Format>(sign: bool, mode: RoundingMode) -> F {
    let deliver_infinity = matches!(mode, RoundingMode::NearEven | RoundingMode::NearMaxMag)
        || (sign && mode == RoundingMode::Min)
        || (!sign && mode == RoundingMode::Max);
    if deliver_infinity {
        crate::format::pack_infinity(sign)
    } else {
        max_finite::<F>(sign)
    }
}

fn max_finite<F: Format>(sign: bool) -> F {
    let max_exp_field = exp_mask(F::EXP_WIDTH) - 1;
    let bits = (u64::from(sign) << (F::EXP_WIDTH + F::SIG_WIDTH))
        | (max_exp_field << F::SIG_WIDTH)
        | frac_mask(F::SIG_WIDTH);
    F::from_bits(<F::Bits as crate::format::BitsInt>::from_u64(bits))
}

#[cfg(test)]
mod tests {
    use super::{round_pack, Exactness, Unrounded};
    use crate::format::F32;
    use crate::policy::Policy;
    use crate::state::{self, RoundingMode};

    #[test]
    fn exact_value_round_trips() {
        state::set_policy(Policy::risc_v());
        state::set_rounding_mode(RoundingMode::NearEven);
        state::clear_flags();
        // 1.0 = sig with implicit bit only, exp = 0 (true exponent of 1.xxx).
        let input = Unrounded {
            sign: false,
            exp: 0,
            sig: 1u64 << 63,
            sticky: false,
        };
        let result: F32 = round_pack(input, Exactness::Exact);
        assert_eq!(result.to_bits(), 0x3F80_0000);
        assert!(state::get_flags().is_empty());
    }

    #[test]
    fn overflow_to_infinity_under_near_even() {
        state::set_rounding_mode(RoundingMode::NearEven);
        state::clear_flags();
        let input = Unrounded {
            sign: false,
            exp: 1000,
            sig: 1u64 << 63,
            sticky: false,
        };
        let result: F32 = round_pack(input, Exactness::Exact);
        assert_eq!(result, F32::INFINITY);
        assert!(state::get_flags().contains(state::ExceptionFlags::OVERFLOW));
    }
}
