use float_cmp::approx_eq;

use super::types::*;

const ULPS: i64 = 2;

#[inline]
pub(crate) fn approx_eq_real(x: R, y: R) -> bool {
    approx_eq!(R, x, y, ulps = ULPS)
}

#[inline]
pub(crate) fn approx_eq_complex(a: &C, b: &C) -> bool {
    approx_eq!(R, a.re, b.re, ulps = ULPS) && approx_eq!(R, a.im, b.im, ulps = ULPS)
}
