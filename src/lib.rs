#![allow(dead_code)]
#![warn(clippy::cargo)]
#![doc = include_str!("../README.md")]

mod math;
mod operator;

pub mod circuit;
pub mod error;
pub mod grad;
pub mod hamiltonian;
pub mod register;
pub mod topology;

#[cfg(test)]
mod tests;

#[doc(hidden)]
pub mod prelude {
    pub use crate::{
        circuit::{execute, CircuitRequest, GateKind, GateOperation, StateResponse},
        error::{Error, Result},
        grad::ParameterShift,
        hamiltonian::{Hamiltonian, PauliOp, PauliString, PauliTerm},
        register::{CReg, QReg},
        topology::{MeshRank, RankTopology, SingleRank, ThreadMesh},
    };
}
