//! Comparison predicates (§4.12 of the design), generic over [`Format`].
//!
//! Ordering ignores the NaN cases entirely: for any two non-NaN operands,
//! interpreting the sign bit as a flip-and-negate over the remaining bits
//! turns IEEE-754's (mostly) monotonic bit-pattern ordering into a plain
//! signed-integer comparison, handling ±0 and ±∞ uniformly with the finite
//! range — no separate classification needed for those cases.

use crate::format::{unpack, Format, Unpacked};
use crate::state::{self, ExceptionFlags};

/// Whether a comparison raises `INVALID` on a quiet-NaN operand too
/// (`Yes`), or only on a signaling one (`No`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Signaling {
    Yes,
    No,
}

fn classify<F: Format>(v: F) -> (bool, bool) {
    match unpack(v) {
        Unpacked::Nan { signaling, .. } => (true, signaling),
        _ => (false, false),
    }
}

/// A total order over the non-NaN bit patterns of `F`: increasing with
/// value, ±0 both mapping to 0.
fn order_key<F: Format>(v: F) -> i128 {
    let bits = i128::from(v.to_bits().to_u64());
    let sign_bit = 1i128 << (F::EXP_WIDTH + F::SIG_WIDTH);
    if bits & sign_bit != 0 {
        -(bits & !sign_bit)
    } else {
        bits
    }
}

fn raise_if_unordered(a_nan: bool, a_sig: bool, b_nan: bool, b_sig: bool, mode: Signaling) {
    let raise = match mode {
        Signaling::Yes => true,
        Signaling::No => a_sig || b_sig,
    };
    if raise {
        state::raise_flags(ExceptionFlags::INVALID);
    }
}

/// `a == b`. Two operands compare equal iff neither is NaN and either both
/// are zero (regardless of sign) or their bit patterns match exactly — no
/// other pair of distinct bit patterns denotes the same IEEE-754 value.
pub(crate) fn eq<F: Format>(a: F, b: F, mode: Signaling) -> bool {
    let (a_nan, a_sig) = classify(a);
    let (b_nan, b_sig) = classify(b);
    if a_nan || b_nan {
        raise_if_unordered(a_nan, a_sig, b_nan, b_sig, mode);
        return false;
    }
    (matches!(unpack(a), Unpacked::Zero { .. }) && matches!(unpack(b), Unpacked::Zero { .. }))
        || a == b
}

/// `a <= b`.
pub(crate) fn le<F: Format>(a: F, b: F, mode: Signaling) -> bool {
    let (a_nan, a_sig) = classify(a);
    let (b_nan, b_sig) = classify(b);
    if a_nan || b_nan {
        raise_if_unordered(a_nan, a_sig, b_nan, b_sig, mode);
        return false;
    }
    order_key(a) <= order_key(b)
}

/// `a < b`.
pub(crate) fn lt<F: Format>(a: F, b: F, mode: Signaling) -> bool {
    let (a_nan, a_sig) = classify(a);
    let (b_nan, b_sig) = classify(b);
    if a_nan || b_nan {
        raise_if_unordered(a_nan, a_sig, b_nan, b_sig, mode);
        return false;
    }
    order_key(a) < order_key(b)
}

/// True iff `a` is a signaling NaN. Never raises a flag itself — this is the
/// classification primitive callers use to decide whether to, not an
/// IEEE-754 comparison operation.
pub(crate) fn is_signaling_nan<F: Format>(a: F) -> bool {
    classify(a).1
}

#[cfg(test)]
mod tests {
    use super::{eq, le, lt, Signaling};
    use crate::format::F32;
    use crate::state;

    #[test]
    fn positive_and_negative_zero_compare_equal() {
        state::clear_flags();
        assert!(eq(F32::ZERO, F32::from_bits(0x8000_0000), Signaling::No));
    }

    #[test]
    fn ordering_respects_sign_across_zero() {
        let neg_one = F32::from_bits(0xBF80_0000);
        let one = F32::from_bits(0x3F80_0000);
        assert!(lt(neg_one, one, Signaling::No));
        assert!(le(neg_one, one, Signaling::No));
        assert!(!lt(one, neg_one, Signaling::No));
    }

    #[test]
    fn quiet_nan_is_unordered_and_quiet_eq_does_not_raise() {
        state::clear_flags();
        let qnan = F32::from_bits(0x7FC0_0000);
        let one = F32::from_bits(0x3F80_0000);
        assert!(!eq(qnan, one, Signaling::No));
        assert!(state::get_flags().is_empty());
    }

    #[test]
    fn quiet_nan_raises_invalid_under_signaling_mode() {
        state::clear_flags();
        let qnan = F32::from_bits(0x7FC0_0000);
        let one = F32::from_bits(0x3F80_0000);
        assert!(!lt(qnan, one, Signaling::Yes));
        assert!(state::get_flags().contains(state::ExceptionFlags::INVALID));
    }

    #[test]
    fn signaling_nan_raises_invalid_even_under_quiet_mode() {
        state::clear_flags();
        let snan = F32::from_bits(0x7FA0_0001);
        let one = F32::from_bits(0x3F80_0000);
        assert!(!le(snan, one, Signaling::No));
        assert!(state::get_flags().contains(state::ExceptionFlags::INVALID));
    }
}
