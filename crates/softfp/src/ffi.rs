//! C ABI entry points, gated behind the `ffi` feature.
//!
//! Named after the historical library's own `<fmt>_<op>` convention so code
//! linking against an existing softfloat shim can retarget these symbols
//! without renaming call sites. Every function here just marshals a raw bit
//! pattern to/from this crate's wrapper types and calls straight into
//! [`crate::ops`]/[`crate::f128`]/[`crate::extf80`]/[`crate::ops::convert`] —
//! no arithmetic logic lives in this module. Each entry point logs at
//! `trace` on entry, naming itself, per the design's FFI logging convention.
//!
//! Rounding-mode arguments are the historical library's `uint_fast8_t` codes:
//! `0` near-even, `1` toward-zero, `2` toward −∞, `3` toward +∞, `4` near-away
//! (anything else falls back to near-even). `exact` is a C boolean (`0`/`1`).
//! Comparison and `isSignalingNaN` entry points return a C boolean `int32_t`.

use crate::extf80::ExtF80;
use crate::f128::F128;
use crate::format::{F16, F32, F64};
use crate::ops::SoftFloat;
use crate::state::RoundingMode;

/// C layout for an 80-bit extended value: the sign+exponent half-word and
/// the 64-bit significand (with its explicit integer bit), passed by value —
/// the same two fields [`ExtF80::to_bits`] exposes in Rust.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ExtF80Raw {
    pub sign_exp: u16,
    pub signif: u64,
}

/// C layout for a 128-bit value: low/high 64-bit halves, since the C ABI has
/// no native 128-bit integer.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct F128Raw {
    pub v0: u64,
    pub v1: u64,
}

fn extf80_from_raw(r: ExtF80Raw) -> ExtF80 {
    ExtF80::from_bits(r.sign_exp, r.signif)
}

fn extf80_to_raw(v: ExtF80) -> ExtF80Raw {
    let (sign_exp, signif) = v.to_bits();
    ExtF80Raw { sign_exp, signif }
}

fn f128_from_raw(r: F128Raw) -> F128 {
    F128::from_bits((u128::from(r.v1) << 64) | u128::from(r.v0))
}

fn f128_to_raw(v: F128) -> F128Raw {
    let bits = v.to_bits();
    F128Raw {
        v0: bits as u64,
        v1: (bits >> 64) as u64,
    }
}

fn mode_from_u8(code: u8) -> RoundingMode {
    match code {
        1 => RoundingMode::MinMag,
        2 => RoundingMode::Min,
        3 => RoundingMode::Max,
        4 => RoundingMode::NearMaxMag,
        _ => RoundingMode::NearEven,
    }
}

macro_rules! ffi_binary {
    ($name:ident, $raw:ty, $from:path, $to:path, $op:ident) => {
        #[no_mangle]
        pub extern "C" fn $name(a: $raw, b: $raw) -> $raw {
            tracing::trace!(target: "softfp::ffi", entry = stringify!($name));
            $to(SoftFloat::$op($from(a), $from(b)))
        }
    };
}

macro_rules! ffi_unary {
    ($name:ident, $raw:ty, $from:path, $to:path, $op:ident) => {
        #[no_mangle]
        pub extern "C" fn $name(a: $raw) -> $raw {
            tracing::trace!(target: "softfp::ffi", entry = stringify!($name));
            $to(SoftFloat::$op($from(a)))
        }
    };
}

macro_rules! ffi_mul_add {
    ($name:ident, $raw:ty, $from:path, $to:path) => {
        #[no_mangle]
        pub extern "C" fn $name(a: $raw, b: $raw, c: $raw) -> $raw {
            tracing::trace!(target: "softfp::ffi", entry = stringify!($name));
            $to(SoftFloat::mul_add($from(a), $from(b), $from(c)))
        }
    };
}

macro_rules! ffi_round_to_int {
    ($name:ident, $raw:ty, $from:path, $to:path) => {
        #[no_mangle]
        pub extern "C" fn $name(a: $raw, round_mode: u8, exact: u8) -> $raw {
            tracing::trace!(target: "softfp::ffi", entry = stringify!($name));
            $to(SoftFloat::round_to_int($from(a), mode_from_u8(round_mode), exact != 0))
        }
    };
}

macro_rules! ffi_compare {
    ($name:ident, $raw:ty, $from:path, $op:ident) => {
        #[no_mangle]
        pub extern "C" fn $name(a: $raw, b: $raw) -> i32 {
            tracing::trace!(target: "softfp::ffi", entry = stringify!($name));
            i32::from(SoftFloat::$op($from(a), $from(b)))
        }
    };
}

macro_rules! ffi_is_signaling_nan {
    ($name:ident, $raw:ty, $from:path) => {
        #[no_mangle]
        pub extern "C" fn $name(a: $raw) -> i32 {
            tracing::trace!(target: "softfp::ffi", entry = stringify!($name));
            i32::from(SoftFloat::is_signaling_nan($from(a)))
        }
    };
}

// Token pasting across formats (`<fmt>_<op>`) would need an extra macro
// dependency, so each format's op surface is spelled out below instead of
// generated from one format-level macro — the per-op macros above already
// remove the duplication that matters (the marshal-call-marshal body).

ffi_binary!(f16_add, u16, F16::from_bits, F16::to_bits, add);
ffi_binary!(f16_sub, u16, F16::from_bits, F16::to_bits, sub);
ffi_binary!(f16_mul, u16, F16::from_bits, F16::to_bits, mul);
ffi_binary!(f16_div, u16, F16::from_bits, F16::to_bits, div);
ffi_binary!(f16_rem, u16, F16::from_bits, F16::to_bits, rem);
ffi_unary!(f16_sqrt, u16, F16::from_bits, F16::to_bits, sqrt);
ffi_mul_add!(f16_mulAdd, u16, F16::from_bits, F16::to_bits);
ffi_round_to_int!(f16_roundToInt, u16, F16::from_bits, F16::to_bits);
ffi_compare!(f16_eq, u16, F16::from_bits, eq);
ffi_compare!(f16_le, u16, F16::from_bits, le);
ffi_compare!(f16_lt, u16, F16::from_bits, lt);
ffi_compare!(f16_eq_signaling, u16, F16::from_bits, eq_signaling);
ffi_compare!(f16_le_quiet, u16, F16::from_bits, le_quiet);
ffi_compare!(f16_lt_quiet, u16, F16::from_bits, lt_quiet);
ffi_is_signaling_nan!(f16_isSignalingNaN, u16, F16::from_bits);

ffi_binary!(f32_add, u32, F32::from_bits, F32::to_bits, add);
ffi_binary!(f32_sub, u32, F32::from_bits, F32::to_bits, sub);
ffi_binary!(f32_mul, u32, F32::from_bits, F32::to_bits, mul);
ffi_binary!(f32_div, u32, F32::from_bits, F32::to_bits, div);
ffi_binary!(f32_rem, u32, F32::from_bits, F32::to_bits, rem);
ffi_unary!(f32_sqrt, u32, F32::from_bits, F32::to_bits, sqrt);
ffi_mul_add!(f32_mulAdd, u32, F32::from_bits, F32::to_bits);
ffi_round_to_int!(f32_roundToInt, u32, F32::from_bits, F32::to_bits);
ffi_compare!(f32_eq, u32, F32::from_bits, eq);
ffi_compare!(f32_le, u32, F32::from_bits, le);
ffi_compare!(f32_lt, u32, F32::from_bits, lt);
ffi_compare!(f32_eq_signaling, u32, F32::from_bits, eq_signaling);
ffi_compare!(f32_le_quiet, u32, F32::from_bits, le_quiet);
ffi_compare!(f32_lt_quiet, u32, F32::from_bits, lt_quiet);
ffi_is_signaling_nan!(f32_isSignalingNaN, u32, F32::from_bits);

ffi_binary!(f64_add, u64, F64::from_bits, F64::to_bits, add);
ffi_binary!(f64_sub, u64, F64::from_bits, F64::to_bits, sub);
ffi_binary!(f64_mul, u64, F64::from_bits, F64::to_bits, mul);
ffi_binary!(f64_div, u64, F64::from_bits, F64::to_bits, div);
ffi_binary!(f64_rem, u64, F64::from_bits, F64::to_bits, rem);
ffi_unary!(f64_sqrt, u64, F64::from_bits, F64::to_bits, sqrt);
ffi_mul_add!(f64_mulAdd, u64, F64::from_bits, F64::to_bits);
ffi_round_to_int!(f64_roundToInt, u64, F64::from_bits, F64::to_bits);
ffi_compare!(f64_eq, u64, F64::from_bits, eq);
ffi_compare!(f64_le, u64, F64::from_bits, le);
ffi_compare!(f64_lt, u64, F64::from_bits, lt);
ffi_compare!(f64_eq_signaling, u64, F64::from_bits, eq_signaling);
ffi_compare!(f64_le_quiet, u64, F64::from_bits, le_quiet);
ffi_compare!(f64_lt_quiet, u64, F64::from_bits, lt_quiet);
ffi_is_signaling_nan!(f64_isSignalingNaN, u64, F64::from_bits);

ffi_binary!(extF80_add, ExtF80Raw, extf80_from_raw, extf80_to_raw, add);
ffi_binary!(extF80_sub, ExtF80Raw, extf80_from_raw, extf80_to_raw, sub);
ffi_binary!(extF80_mul, ExtF80Raw, extf80_from_raw, extf80_to_raw, mul);
ffi_binary!(extF80_div, ExtF80Raw, extf80_from_raw, extf80_to_raw, div);
ffi_binary!(extF80_rem, ExtF80Raw, extf80_from_raw, extf80_to_raw, rem);
ffi_unary!(extF80_sqrt, ExtF80Raw, extf80_from_raw, extf80_to_raw, sqrt);
ffi_mul_add!(extF80_mulAdd, ExtF80Raw, extf80_from_raw, extf80_to_raw);
ffi_round_to_int!(extF80_roundToInt, ExtF80Raw, extf80_from_raw, extf80_to_raw);
ffi_compare!(extF80_eq, ExtF80Raw, extf80_from_raw, eq);
ffi_compare!(extF80_le, ExtF80Raw, extf80_from_raw, le);
ffi_compare!(extF80_lt, ExtF80Raw, extf80_from_raw, lt);
ffi_compare!(extF80_eq_signaling, ExtF80Raw, extf80_from_raw, eq_signaling);
ffi_compare!(extF80_le_quiet, ExtF80Raw, extf80_from_raw, le_quiet);
ffi_compare!(extF80_lt_quiet, ExtF80Raw, extf80_from_raw, lt_quiet);
ffi_is_signaling_nan!(extF80_isSignalingNaN, ExtF80Raw, extf80_from_raw);

ffi_binary!(f128_add, F128Raw, f128_from_raw, f128_to_raw, add);
ffi_binary!(f128_sub, F128Raw, f128_from_raw, f128_to_raw, sub);
ffi_binary!(f128_mul, F128Raw, f128_from_raw, f128_to_raw, mul);
ffi_binary!(f128_div, F128Raw, f128_from_raw, f128_to_raw, div);
ffi_binary!(f128_rem, F128Raw, f128_from_raw, f128_to_raw, rem);
ffi_unary!(f128_sqrt, F128Raw, f128_from_raw, f128_to_raw, sqrt);
ffi_mul_add!(f128_mulAdd, F128Raw, f128_from_raw, f128_to_raw);
ffi_round_to_int!(f128_roundToInt, F128Raw, f128_from_raw, f128_to_raw);
ffi_compare!(f128_eq, F128Raw, f128_from_raw, eq);
ffi_compare!(f128_le, F128Raw, f128_from_raw, le);
ffi_compare!(f128_lt, F128Raw, f128_from_raw, lt);
ffi_compare!(f128_eq_signaling, F128Raw, f128_from_raw, eq_signaling);
ffi_compare!(f128_le_quiet, F128Raw, f128_from_raw, le_quiet);
ffi_compare!(f128_lt_quiet, F128Raw, f128_from_raw, lt_quiet);
ffi_is_signaling_nan!(f128_isSignalingNaN, F128Raw, f128_from_raw);

macro_rules! ffi_to_int {
    ($name:ident, $raw:ty, $F:ty, $from:path, $conv:ident, $ity:ty) => {
        #[no_mangle]
        pub extern "C" fn $name(a: $raw, round_mode: u8, exact: u8) -> $ity {
            tracing::trace!(target: "softfp::ffi", entry = stringify!($name));
            crate::ops::convert::$conv::<$F>($from(a), mode_from_u8(round_mode), exact != 0)
        }
    };
}

macro_rules! ffi_to_int_r_minmag {
    ($name:ident, $raw:ty, $F:ty, $from:path, $conv_minmag:ident, $ity:ty) => {
        #[no_mangle]
        pub extern "C" fn $name(a: $raw, exact: u8) -> $ity {
            tracing::trace!(target: "softfp::ffi", entry = stringify!($name));
            crate::ops::convert::$conv_minmag::<$F>($from(a), exact != 0)
        }
    };
}

macro_rules! ffi_from_int {
    ($name:ident, $raw:ty, $F:ty, $to:path, $conv:ident, $ity:ty) => {
        #[no_mangle]
        pub extern "C" fn $name(a: $ity) -> $raw {
            tracing::trace!(target: "softfp::ffi", entry = stringify!($name));
            $to(crate::ops::convert::$conv::<$F>(a))
        }
    };
}

ffi_to_int!(f16_to_i32, u16, F16, F16::from_bits, to_i32, i32);
ffi_to_int!(f16_to_i64, u16, F16, F16::from_bits, to_i64, i64);
ffi_to_int!(f16_to_ui32, u16, F16, F16::from_bits, to_u32, u32);
ffi_to_int!(f16_to_ui64, u16, F16, F16::from_bits, to_u64, u64);
ffi_to_int_r_minmag!(f16_to_i32_r_minMag, u16, F16, F16::from_bits, to_i32_r_minmag, i32);
ffi_to_int_r_minmag!(f16_to_i64_r_minMag, u16, F16, F16::from_bits, to_i64_r_minmag, i64);
ffi_to_int_r_minmag!(f16_to_ui32_r_minMag, u16, F16, F16::from_bits, to_u32_r_minmag, u32);
ffi_to_int_r_minmag!(f16_to_ui64_r_minMag, u16, F16, F16::from_bits, to_u64_r_minmag, u64);
ffi_from_int!(i32_to_f16, u16, F16, F16::to_bits, from_i32, i32);
ffi_from_int!(i64_to_f16, u16, F16, F16::to_bits, from_i64, i64);
ffi_from_int!(ui32_to_f16, u16, F16, F16::to_bits, from_u32, u32);
ffi_from_int!(ui64_to_f16, u16, F16, F16::to_bits, from_u64, u64);

ffi_to_int!(f32_to_i32, u32, F32, F32::from_bits, to_i32, i32);
ffi_to_int!(f32_to_i64, u32, F32, F32::from_bits, to_i64, i64);
ffi_to_int!(f32_to_ui32, u32, F32, F32::from_bits, to_u32, u32);
ffi_to_int!(f32_to_ui64, u32, F32, F32::from_bits, to_u64, u64);
ffi_to_int_r_minmag!(f32_to_i32_r_minMag, u32, F32, F32::from_bits, to_i32_r_minmag, i32);
ffi_to_int_r_minmag!(f32_to_i64_r_minMag, u32, F32, F32::from_bits, to_i64_r_minmag, i64);
ffi_to_int_r_minmag!(f32_to_ui32_r_minMag, u32, F32, F32::from_bits, to_u32_r_minmag, u32);
ffi_to_int_r_minmag!(f32_to_ui64_r_minMag, u32, F32, F32::from_bits, to_u64_r_minmag, u64);
ffi_from_int!(i32_to_f32, u32, F32, F32::to_bits, from_i32, i32);
ffi_from_int!(i64_to_f32, u32, F32, F32::to_bits, from_i64, i64);
ffi_from_int!(ui32_to_f32, u32, F32, F32::to_bits, from_u32, u32);
ffi_from_int!(ui64_to_f32, u32, F32, F32::to_bits, from_u64, u64);

ffi_to_int!(f64_to_i32, u64, F64, F64::from_bits, to_i32, i32);
ffi_to_int!(f64_to_i64, u64, F64, F64::from_bits, to_i64, i64);
ffi_to_int!(f64_to_ui32, u64, F64, F64::from_bits, to_u32, u32);
ffi_to_int!(f64_to_ui64, u64, F64, F64::from_bits, to_u64, u64);
ffi_to_int_r_minmag!(f64_to_i32_r_minMag, u64, F64, F64::from_bits, to_i32_r_minmag, i32);
ffi_to_int_r_minmag!(f64_to_i64_r_minMag, u64, F64, F64::from_bits, to_i64_r_minmag, i64);
ffi_to_int_r_minmag!(f64_to_ui32_r_minMag, u64, F64, F64::from_bits, to_u32_r_minmag, u32);
ffi_to_int_r_minmag!(f64_to_ui64_r_minMag, u64, F64, F64::from_bits, to_u64_r_minmag, u64);
ffi_from_int!(i32_to_f64, u64, F64, F64::to_bits, from_i32, i32);
ffi_from_int!(i64_to_f64, u64, F64, F64::to_bits, from_i64, i64);
ffi_from_int!(ui32_to_f64, u64, F64, F64::to_bits, from_u32, u32);
ffi_from_int!(ui64_to_f64, u64, F64, F64::to_bits, from_u64, u64);

#[no_mangle]
pub extern "C" fn extF80_to_i32(a: ExtF80Raw, round_mode: u8, exact: u8) -> i32 {
    tracing::trace!(target: "softfp::ffi", entry = "extF80_to_i32");
    crate::extf80::to_i32(extf80_from_raw(a), mode_from_u8(round_mode), exact != 0)
}

#[no_mangle]
pub extern "C" fn extF80_to_i64(a: ExtF80Raw, round_mode: u8, exact: u8) -> i64 {
    tracing::trace!(target: "softfp::ffi", entry = "extF80_to_i64");
    crate::extf80::to_i64(extf80_from_raw(a), mode_from_u8(round_mode), exact != 0)
}

#[no_mangle]
pub extern "C" fn extF80_to_ui32(a: ExtF80Raw, round_mode: u8, exact: u8) -> u32 {
    tracing::trace!(target: "softfp::ffi", entry = "extF80_to_ui32");
    crate::extf80::to_u32(extf80_from_raw(a), mode_from_u8(round_mode), exact != 0)
}

#[no_mangle]
pub extern "C" fn extF80_to_ui64(a: ExtF80Raw, round_mode: u8, exact: u8) -> u64 {
    tracing::trace!(target: "softfp::ffi", entry = "extF80_to_ui64");
    crate::extf80::to_u64(extf80_from_raw(a), mode_from_u8(round_mode), exact != 0)
}

#[no_mangle]
pub extern "C" fn extF80_to_i32_r_minMag(a: ExtF80Raw, exact: u8) -> i32 {
    tracing::trace!(target: "softfp::ffi", entry = "extF80_to_i32_r_minMag");
    crate::extf80::to_i32(extf80_from_raw(a), RoundingMode::MinMag, exact != 0)
}

#[no_mangle]
pub extern "C" fn extF80_to_i64_r_minMag(a: ExtF80Raw, exact: u8) -> i64 {
    tracing::trace!(target: "softfp::ffi", entry = "extF80_to_i64_r_minMag");
    crate::extf80::to_i64(extf80_from_raw(a), RoundingMode::MinMag, exact != 0)
}

#[no_mangle]
pub extern "C" fn extF80_to_ui32_r_minMag(a: ExtF80Raw, exact: u8) -> u32 {
    tracing::trace!(target: "softfp::ffi", entry = "extF80_to_ui32_r_minMag");
    crate::extf80::to_u32(extf80_from_raw(a), RoundingMode::MinMag, exact != 0)
}

#[no_mangle]
pub extern "C" fn extF80_to_ui64_r_minMag(a: ExtF80Raw, exact: u8) -> u64 {
    tracing::trace!(target: "softfp::ffi", entry = "extF80_to_ui64_r_minMag");
    crate::extf80::to_u64(extf80_from_raw(a), RoundingMode::MinMag, exact != 0)
}

#[no_mangle]
pub extern "C" fn i32_to_extF80(a: i32) -> ExtF80Raw {
    tracing::trace!(target: "softfp::ffi", entry = "i32_to_extF80");
    extf80_to_raw(crate::extf80::from_i32(a))
}

#[no_mangle]
pub extern "C" fn i64_to_extF80(a: i64) -> ExtF80Raw {
    tracing::trace!(target: "softfp::ffi", entry = "i64_to_extF80");
    extf80_to_raw(crate::extf80::from_i64(a))
}

#[no_mangle]
pub extern "C" fn ui32_to_extF80(a: u32) -> ExtF80Raw {
    tracing::trace!(target: "softfp::ffi", entry = "ui32_to_extF80");
    extf80_to_raw(crate::extf80::from_u32(a))
}

#[no_mangle]
pub extern "C" fn ui64_to_extF80(a: u64) -> ExtF80Raw {
    tracing::trace!(target: "softfp::ffi", entry = "ui64_to_extF80");
    extf80_to_raw(crate::extf80::from_u64(a))
}

#[no_mangle]
pub extern "C" fn f128_to_i32(a: F128Raw, round_mode: u8, exact: u8) -> i32 {
    tracing::trace!(target: "softfp::ffi", entry = "f128_to_i32");
    crate::f128::f128_to_i32(f128_from_raw(a), mode_from_u8(round_mode), exact != 0)
}

#[no_mangle]
pub extern "C" fn f128_to_i64(a: F128Raw, round_mode: u8, exact: u8) -> i64 {
    tracing::trace!(target: "softfp::ffi", entry = "f128_to_i64");
    crate::f128::f128_to_i64(f128_from_raw(a), mode_from_u8(round_mode), exact != 0)
}

#[no_mangle]
pub extern "C" fn f128_to_ui32(a: F128Raw, round_mode: u8, exact: u8) -> u32 {
    tracing::trace!(target: "softfp::ffi", entry = "f128_to_ui32");
    crate::f128::f128_to_u32(f128_from_raw(a), mode_from_u8(round_mode), exact != 0)
}

#[no_mangle]
pub extern "C" fn f128_to_ui64(a: F128Raw, round_mode: u8, exact: u8) -> u64 {
    tracing::trace!(target: "softfp::ffi", entry = "f128_to_ui64");
    crate::f128::f128_to_u64(f128_from_raw(a), mode_from_u8(round_mode), exact != 0)
}

#[no_mangle]
pub extern "C" fn f128_to_i32_r_minMag(a: F128Raw, exact: u8) -> i32 {
    tracing::trace!(target: "softfp::ffi", entry = "f128_to_i32_r_minMag");
    crate::f128::f128_to_i32(f128_from_raw(a), RoundingMode::MinMag, exact != 0)
}

#[no_mangle]
pub extern "C" fn f128_to_i64_r_minMag(a: F128Raw, exact: u8) -> i64 {
    tracing::trace!(target: "softfp::ffi", entry = "f128_to_i64_r_minMag");
    crate::f128::f128_to_i64(f128_from_raw(a), RoundingMode::MinMag, exact != 0)
}

#[no_mangle]
pub extern "C" fn f128_to_ui32_r_minMag(a: F128Raw, exact: u8) -> u32 {
    tracing::trace!(target: "softfp::ffi", entry = "f128_to_ui32_r_minMag");
    crate::f128::f128_to_u32(f128_from_raw(a), RoundingMode::MinMag, exact != 0)
}

#[no_mangle]
pub extern "C" fn f128_to_ui64_r_minMag(a: F128Raw, exact: u8) -> u64 {
    tracing::trace!(target: "softfp::ffi", entry = "f128_to_ui64_r_minMag");
    crate::f128::f128_to_u64(f128_from_raw(a), RoundingMode::MinMag, exact != 0)
}

#[no_mangle]
pub extern "C" fn i32_to_f128(a: i32) -> F128Raw {
    tracing::trace!(target: "softfp::ffi", entry = "i32_to_f128");
    f128_to_raw(crate::f128::i32_to_f128(a))
}

#[no_mangle]
pub extern "C" fn i64_to_f128(a: i64) -> F128Raw {
    tracing::trace!(target: "softfp::ffi", entry = "i64_to_f128");
    f128_to_raw(crate::f128::i64_to_f128(a))
}

#[no_mangle]
pub extern "C" fn ui32_to_f128(a: u32) -> F128Raw {
    tracing::trace!(target: "softfp::ffi", entry = "ui32_to_f128");
    f128_to_raw(crate::f128::u32_to_f128(a))
}

#[no_mangle]
pub extern "C" fn ui64_to_f128(a: u64) -> F128Raw {
    tracing::trace!(target: "softfp::ffi", entry = "ui64_to_f128");
    f128_to_raw(crate::f128::u64_to_f128(a))
}

macro_rules! ffi_convert_generic {
    ($name:ident, $raw_from:ty, $From:ty, $from:path, $raw_to:ty, $To:ty, $to:path) => {
        #[no_mangle]
        pub extern "C" fn $name(a: $raw_from) -> $raw_to {
            tracing::trace!(target: "softfp::ffi", entry = stringify!($name));
            $to(crate::ops::convert::convert::<$From, $To>($from(a)))
        }
    };
}

ffi_convert_generic!(f16_to_f32, u16, F16, F16::from_bits, u32, F32, F32::to_bits);
ffi_convert_generic!(f16_to_f64, u16, F16, F16::from_bits, u64, F64, F64::to_bits);
ffi_convert_generic!(f32_to_f16, u32, F32, F32::from_bits, u16, F16, F16::to_bits);
ffi_convert_generic!(f32_to_f64, u32, F32, F32::from_bits, u64, F64, F64::to_bits);
ffi_convert_generic!(f64_to_f16, u64, F64, F64::from_bits, u16, F16, F16::to_bits);
ffi_convert_generic!(f64_to_f32, u64, F64, F64::from_bits, u32, F32, F32::to_bits);

#[no_mangle]
pub extern "C" fn f16_to_extF80(a: u16) -> ExtF80Raw {
    tracing::trace!(target: "softfp::ffi", entry = "f16_to_extF80");
    extf80_to_raw(crate::extf80::from_f16(F16::from_bits(a)))
}

#[no_mangle]
pub extern "C" fn extF80_to_f16(a: ExtF80Raw) -> u16 {
    tracing::trace!(target: "softfp::ffi", entry = "extF80_to_f16");
    crate::extf80::to_f16(extf80_from_raw(a)).to_bits()
}

#[no_mangle]
pub extern "C" fn f32_to_extF80(a: u32) -> ExtF80Raw {
    tracing::trace!(target: "softfp::ffi", entry = "f32_to_extF80");
    extf80_to_raw(crate::extf80::from_f32(F32::from_bits(a)))
}

#[no_mangle]
pub extern "C" fn extF80_to_f32(a: ExtF80Raw) -> u32 {
    tracing::trace!(target: "softfp::ffi", entry = "extF80_to_f32");
    crate::extf80::to_f32(extf80_from_raw(a)).to_bits()
}

#[no_mangle]
pub extern "C" fn f64_to_extF80(a: u64) -> ExtF80Raw {
    tracing::trace!(target: "softfp::ffi", entry = "f64_to_extF80");
    extf80_to_raw(crate::extf80::from_f64(F64::from_bits(a)))
}

#[no_mangle]
pub extern "C" fn extF80_to_f64(a: ExtF80Raw) -> u64 {
    tracing::trace!(target: "softfp::ffi", entry = "extF80_to_f64");
    crate::extf80::to_f64(extf80_from_raw(a)).to_bits()
}

#[no_mangle]
pub extern "C" fn f16_to_f128(a: u16) -> F128Raw {
    tracing::trace!(target: "softfp::ffi", entry = "f16_to_f128");
    f128_to_raw(crate::f128::from_f16(F16::from_bits(a)))
}

#[no_mangle]
pub extern "C" fn f128_to_f16(a: F128Raw) -> u16 {
    tracing::trace!(target: "softfp::ffi", entry = "f128_to_f16");
    crate::f128::to_f16(f128_from_raw(a)).to_bits()
}

#[no_mangle]
pub extern "C" fn f32_to_f128(a: u32) -> F128Raw {
    tracing::trace!(target: "softfp::ffi", entry = "f32_to_f128");
    f128_to_raw(crate::f128::from_f32(F32::from_bits(a)))
}

#[no_mangle]
pub extern "C" fn f128_to_f32(a: F128Raw) -> u32 {
    tracing::trace!(target: "softfp::ffi", entry = "f128_to_f32");
    crate::f128::to_f32(f128_from_raw(a)).to_bits()
}

#[no_mangle]
pub extern "C" fn f64_to_f128(a: u64) -> F128Raw {
    tracing::trace!(target: "softfp::ffi", entry = "f64_to_f128");
    f128_to_raw(crate::f128::from_f64(F64::from_bits(a)))
}

#[no_mangle]
pub extern "C" fn f128_to_f64(a: F128Raw) -> u64 {
    tracing::trace!(target: "softfp::ffi", entry = "f128_to_f64");
    crate::f128::to_f64(f128_from_raw(a)).to_bits()
}

#[no_mangle]
pub extern "C" fn extF80_to_f128(a: ExtF80Raw) -> F128Raw {
    tracing::trace!(target: "softfp::ffi", entry = "extF80_to_f128");
    f128_to_raw(crate::f128::from_ext_f80(extf80_from_raw(a)))
}

#[no_mangle]
pub extern "C" fn f128_to_extF80(a: F128Raw) -> ExtF80Raw {
    tracing::trace!(target: "softfp::ffi", entry = "f128_to_extF80");
    extf80_to_raw(crate::f128::to_ext_f80(f128_from_raw(a)))
}

/// Pointer-marshaling "memory form" wrappers for the two wide formats, named
/// per the historical library's `*M` convention for operands that used to
/// live in caller-allocated storage. With both formats passed by value as
/// small structs already, these exist purely for naming-convention parity on
/// the core arithmetic surface — registers and memory hold the same bits.
macro_rules! ffi_binary_m {
    ($name:ident, $inner:ident, $raw:ty) => {
        /// # Safety
        ///
        /// `a`, `b`, and `result` must each point to a valid, properly
        /// aligned value of this format's memory-form layout; `result` must
        /// be writable.
        #[no_mangle]
        pub unsafe extern "C" fn $name(a: *const $raw, b: *const $raw, result: *mut $raw) {
            tracing::trace!(target: "softfp::ffi", entry = stringify!($name));
            let out = $inner(*a, *b);
            *result = out;
        }
    };
}

ffi_binary_m!(extF80M_addM, extF80_add, ExtF80Raw);
ffi_binary_m!(extF80M_subM, extF80_sub, ExtF80Raw);
ffi_binary_m!(extF80M_mulM, extF80_mul, ExtF80Raw);
ffi_binary_m!(extF80M_divM, extF80_div, ExtF80Raw);
ffi_binary_m!(f128M_addM, f128_add, F128Raw);
ffi_binary_m!(f128M_subM, f128_sub, F128Raw);
ffi_binary_m!(f128M_mulM, f128_mul, F128Raw);
ffi_binary_m!(f128M_divM, f128_div, F128Raw);

#[cfg(test)]
mod tests {
    use super::{f128_from_raw, f128_to_raw, f32_add, f32_to_i32, extF80_add, extF80_from_raw, extF80_to_raw, i32_to_f32};
    use crate::policy::Policy;
    use crate::state::{self, RoundingMode};

    fn setup() {
        state::set_policy(Policy::risc_v());
        state::set_rounding_mode(RoundingMode::NearEven);
        state::clear_flags();
    }

    #[test]
    fn f32_add_matches_native_bit_pattern() {
        setup();
        let one = 0x3F80_0000u32;
        let two = f32_add(one, one);
        assert_eq!(two, 0x4000_0000);
    }

    #[test]
    fn int_round_trip_through_ffi() {
        setup();
        let bits = i32_to_f32(-100);
        assert_eq!(f32_to_i32(bits, 0, 1u8), -100);
    }

    #[test]
    fn extf80_raw_round_trips() {
        setup();
        let raw = super::ExtF80Raw { sign_exp: 0x3FFF, signif: 1u64 << 63 };
        let doubled = extF80_add(raw, raw);
        let back = extf80_to_raw(extf80_from_raw(doubled));
        assert_eq!(back.sign_exp, doubled.sign_exp);
        assert_eq!(back.signif, doubled.signif);
    }

    #[test]
    fn f128_raw_round_trips() {
        let raw = super::F128Raw { v0: 0, v1: 0x3FFF_0000_0000_0000 };
        let back = f128_to_raw(f128_from_raw(raw));
        assert_eq!(back.v0, raw.v0);
        assert_eq!(back.v1, raw.v1);
    }
}
