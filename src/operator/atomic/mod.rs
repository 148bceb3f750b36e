use crate::math::{consts::*, types::*, FRAC_1_SQRT_2};

pub(crate) mod h;
pub(crate) mod rx;
pub(crate) mod ry;
pub(crate) mod rz;
pub(crate) mod s;
pub(crate) mod t;
pub(crate) mod x;
pub(crate) mod y;
pub(crate) mod z;

mod dispatch;
pub(crate) use self::dispatch::*;
