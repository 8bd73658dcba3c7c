//! Target-selectable NaN propagation, per §4.3 of the design.
//!
//! The RISC-V arm (canonical-NaN collapse) generalizes the teacher's own
//! `canonicalize_f32`/`canonicalize_f64` (`nan_handling.rs`) from a
//! hardcoded policy to one arm of [`crate::policy::NanMode`]. The x86 arm
//! (operand-payload propagation) has no teacher precedent and is built
//! directly from the design's prose description.

use crate::format::{self, frac_mask, quiet_bit, unpack, Format, Unpacked};
use crate::policy::NanMode;
use crate::state::{self, ExceptionFlags};

/// Format-independent NaN payload courier, used to marshal a NaN's sign and
/// fraction bits across a format conversion without re-deriving them from a
/// packed bit pattern at each step.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CommonNan {
    pub sign: bool,
    pub signaling: bool,
    pub payload: u64,
}

fn operand_as_common_nan(sign: bool, signaling: bool, payload: u64) -> CommonNan {
    CommonNan {
        sign,
        signaling,
        payload,
    }
}

/// Picks the operand the x86 policy propagates: the one with the
/// greater-magnitude payload, ties broken toward the smaller bit pattern.
fn select_x86(a: CommonNan, b: CommonNan) -> CommonNan {
    if a.payload > b.payload || (a.payload == b.payload && !a.sign && b.sign) {
        a
    } else {
        b
    }
}

/// Propagates a NaN result for a binary operation where at least one operand
/// is a NaN. Raises `INVALID` iff either operand is signaling.
pub(crate) fn propagate_nan<F: Format>(a: F, b: F) -> F {
    let (a_nan, b_nan) = (unpack_nan::<F>(a), unpack_nan::<F>(b));
    let any_signaling =
        a_nan.is_some_and(|n| n.signaling) || b_nan.is_some_and(|n| n.signaling);
    if any_signaling {
        state::raise_flags(ExceptionFlags::INVALID);
    }

    match state::get_policy().nan_mode {
        NanMode::RiscV => format::pack_canonical_nan(),
        NanMode::X86 => {
            let chosen = match (a_nan, b_nan) {
                (Some(x), Some(y)) => select_x86(x, y),
                (Some(x), None) => x,
                (None, Some(y)) => y,
                (None, None) => unreachable!("propagate_nan called with no NaN operand"),
            };
            format::pack_raw_nan(chosen.sign, false, chosen.payload | quiet_bit(F::SIG_WIDTH))
        }
    }
}

/// Propagates a NaN result for a unary operation (sqrt, round-to-integer)
/// whose single operand is a NaN.
pub(crate) fn propagate_nan_unary<F: Format>(a: F) -> F {
    let a_nan = unpack_nan::<F>(a).expect("propagate_nan_unary called with a non-NaN operand");
    if a_nan.signaling {
        state::raise_flags(ExceptionFlags::INVALID);
    }
    match state::get_policy().nan_mode {
        NanMode::RiscV => format::pack_canonical_nan(),
        NanMode::X86 => format::pack_raw_nan(a_nan.sign, false, a_nan.payload | quiet_bit(F::SIG_WIDTH)),
    }
}

/// Folds a ternary (FMA) NaN propagation left-to-right:
/// `propagate(propagate(a, b), c)`, per the design's explicit rule for x86;
/// harmless to apply for RISC-V too since its result never depends on which
/// operand was chosen.
pub(crate) fn propagate_nan_ternary<F: Format>(a: F, b: F, c: F) -> F {
    let ab_is_nan = matches!(unpack::<F>(a), Unpacked::Nan { .. })
        || matches!(unpack::<F>(b), Unpacked::Nan { .. });
    if ab_is_nan {
        propagate_nan(propagate_nan(a, b), c)
    } else {
        propagate_nan_unary(c)
    }
}

fn unpack_nan<F: Format>(value: F) -> Option<CommonNan> {
    match unpack::<F>(value) {
        Unpacked::Nan {
            sign,
            signaling,
            payload,
        } => Some(operand_as_common_nan(sign, signaling, payload & frac_mask(F::SIG_WIDTH))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::propagate_nan;
    use crate::format::F32;
    use crate::policy::Policy;
    use crate::state;

    #[test]
    fn riscv_policy_collapses_to_canonical_nan() {
        state::set_policy(Policy::risc_v());
        let sig_nan = F32::from_bits(0x7FA0_0001);
        let result = propagate_nan(sig_nan, F32::from_bits(1));
        assert_eq!(result.to_bits(), 0x7FC0_0000);
        state::set_policy(Policy::default());
    }

    #[test]
    fn signaling_operand_raises_invalid() {
        state::clear_flags();
        let sig_nan = F32::from_bits(0x7FA0_0001);
        let _ = propagate_nan(sig_nan, F32::from_bits(0x4000_0000));
        assert!(state::get_flags().contains(state::ExceptionFlags::INVALID));
    }
}
