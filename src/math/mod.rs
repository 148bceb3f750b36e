pub use std::f64::consts::*;

pub use self::{consts::*, types::*};

pub mod approx_cmp;
pub mod index;

pub(crate) mod consts {
    use super::types::*;

    pub const C_ZERO: C = C { re: 0., im: 0. };
    pub const C_ONE: C = C { re: 1., im: 0. };
    pub const C_IMAG: C = C { re: 0., im: 1. };
}

pub(crate) mod types {
    pub type N = usize;
    pub type Mask = usize;

    pub type R = f64;
    pub type C = num_complex::Complex<R>;

    /// Row-major 2x2 unitary: [m00, m01, m10, m11].
    pub type M1 = [C; 4];
}
