//! A portable, deterministic, software implementation of binary IEEE-754
//! floating-point arithmetic.
//!
//! Every arithmetic, conversion, comparison, and rounding operation is
//! performed on fixed-width integers — no host floating-point unit is
//! consulted and no result depends on host FPU state. Five binary
//! interchange formats are supported: half ([`format::F16`]), single
//! ([`format::F32`]), double ([`format::F64`]), 80-bit x87-style extended
//! ([`extf80::ExtF80`]), and quad ([`f128::F128`]).
//!
//! ```
//! use softfp::{Policy, RoundingMode, SoftFloat, format::F32};
//!
//! softfp::state::set_policy(Policy::risc_v());
//! softfp::state::set_rounding_mode(RoundingMode::NearEven);
//! softfp::state::clear_flags();
//!
//! let one = F32::from_bits(0x3F80_0000);
//! let two = SoftFloat::add(one, one);
//! assert_eq!(two.to_bits(), 0x4000_0000);
//! assert!(softfp::state::get_flags().is_empty());
//! ```
//!
//! The only piece of global state is a per-thread cell holding the rounding
//! mode, the target [`Policy`], and the sticky exception flags (§5/§6 of the
//! design) — see [`state`]. Every arithmetic operation is otherwise a pure
//! function of its operands.

pub mod error;
pub mod extf80;
#[cfg(feature = "ffi")]
pub mod ffi;
pub mod f128;
pub mod format;
mod nan;
mod ops;
pub mod policy;
mod primitives;
mod round;
pub mod state;

pub use crate::error::FormatError;
pub use crate::extf80::ExtF80;
pub use crate::f128::F128;
pub use crate::format::{F16, F32, F64};
pub use crate::ops::SoftFloat;
pub use crate::policy::{NanMode, Policy, TininessMode};
pub use crate::state::{ExceptionFlags, RoundingMode};
