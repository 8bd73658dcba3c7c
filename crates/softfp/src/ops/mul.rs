//! Multiplication (§4.5 of the design), generic over [`Format`].

use crate::format::{self, unpack, Format, Unpacked};
use crate::nan::propagate_nan;
use crate::primitives::mul_64_to_128;
use crate::round::{round_pack, Exactness, Unrounded};
use crate::state::{self, ExceptionFlags};

/// `a * b`.
pub(crate) fn mul<F: Format>(a: F, b: F) -> F {
    let ua = unpack(a);
    let ub = unpack(b);

    match (ua, ub) {
        (Unpacked::Nan { .. }, _) | (_, Unpacked::Nan { .. }) => propagate_nan(a, b),

        (Unpacked::Infinity { sign: sa }, Unpacked::Zero { .. })
        | (Unpacked::Zero { .. }, Unpacked::Infinity { sign: sa }) => {
            let _ = sa;
            state::raise_flags(ExceptionFlags::INVALID);
            format::pack_canonical_nan()
        }
        (Unpacked::Infinity { sign: sa }, Unpacked::Infinity { sign: sb }) => {
            format::pack_infinity(sa ^ sb)
        }
        (Unpacked::Infinity { sign: sa }, Unpacked::Finite { sign: sb, .. }) => {
            format::pack_infinity(sa ^ sb)
        }
        (Unpacked::Finite { sign: sa, .. }, Unpacked::Infinity { sign: sb }) => {
            format::pack_infinity(sa ^ sb)
        }

        (Unpacked::Zero { sign: sa }, Unpacked::Zero { sign: sb }) => format::pack_zero(sa ^ sb),
        (Unpacked::Zero { sign: sa }, Unpacked::Finite { sign: sb, .. }) => {
            format::pack_zero(sa ^ sb)
        }
        (Unpacked::Finite { sign: sa, .. }, Unpacked::Zero { sign: sb }) => {
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
            let product = mul_64_to_128(siga, sigb);

            // Two operands each in `[2^63, 2^64)` multiply to a product in
            // `[2^126, 2^128)`: normalize by at most one bit.
            let (sig, sticky, exp) = if product >> 127 != 0 {
                let sig = (product >> 64) as u64;
                let sticky = (product & u128::from(u64::MAX)) != 0;
                (sig, sticky, ea + eb + 1)
            } else {
                let sig = (product >> 63) as u64;
                let sticky = (product & ((1u128 << 63) - 1)) != 0;
                (sig, sticky, ea + eb)
            };

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
    }
}

#[cfg(test)]
mod tests {
    use super::mul;
    use crate::format::F32;
    use crate::policy::Policy;
    use crate::state::{self, RoundingMode};

    fn setup() {
        state::set_policy(Policy::risc_v());
        state::set_rounding_mode(RoundingMode::NearEven);
        state::clear_flags();
    }

    #[test]
    fn two_times_two_is_four() {
        setup();
        let two = F32::from_bits(0x4000_0000);
        let result = mul(two, two);
        assert_eq!(result.to_bits(), 0x4080_0000);
    }

    #[test]
    fn one_point_five_squared_is_two_point_two_five() {
        setup();
        let one_point_five = F32::from_bits(0x3FC0_0000);
        let result = mul(one_point_five, one_point_five);
        assert_eq!(result.to_bits(), 0x4010_0000);
    }

    #[test]
    fn zero_times_infinity_is_invalid() {
        setup();
        let result = mul(F32::ZERO, F32::INFINITY);
        assert!(state::get_flags().contains(state::ExceptionFlags::INVALID));
        assert_eq!(result.to_bits(), 0x7FC0_0000);
    }

    #[test]
    fn sign_of_product_is_xor_of_operand_signs() {
        setup();
        let neg_two = F32::from_bits(0xC000_0000);
        let two = F32::from_bits(0x4000_0000);
        let result = mul(neg_two, two);
        assert!(result.sign());
    }
}
