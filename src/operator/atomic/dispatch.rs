#![allow(clippy::upper_case_acronyms)]

use std::fmt;

use super::*;

pub(crate) type X = x::Op;
pub(crate) type Y = y::Op;
pub(crate) type Z = z::Op;
pub(crate) type H = h::Op;
pub(crate) type S = s::Op;
pub(crate) type T = t::Op;
pub(crate) type RX = rx::Op;
pub(crate) type RY = ry::Op;
pub(crate) type RZ = rz::Op;

#[enum_dispatch::enum_dispatch(AtomicOpDispatch)]
pub(crate) trait AtomicOp: Clone + PartialEq {
    /// Gate name for diagnostics.
    fn name(&self) -> String;

    /// The 2x2 unitary applied to each (bit = 0, bit = 1) amplitude pair,
    /// row-major.
    fn matrix(&self) -> M1;

    /// Diagonal gates never mix an amplitude pair; on a global qubit they
    /// need no rank traffic.
    fn is_diagonal(&self) -> bool {
        false
    }

    fn this(self) -> AtomicOpDispatch;
}

#[enum_dispatch::enum_dispatch]
#[derive(Clone, PartialEq)]
pub(crate) enum AtomicOpDispatch {
    X,
    Y,
    Z,
    H,
    S,
    T,
    RX,
    RY,
    RZ,
}

impl fmt::Debug for AtomicOpDispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Op").field("name", &self.name()).finish()
    }
}
