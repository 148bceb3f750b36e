//! Decoded circuit requests and the execution entry point.
//!
//! The transport that carries circuits from a front-end is an external
//! collaborator: what arrives here is already decoded, a qubit count and a
//! flat list of gate operations tagged with the wire codes below. Execution
//! drives a fresh register and, on rank 0 only, assembles the full state
//! and the classical outcomes into a [`StateResponse`].

use std::convert::TryFrom;

use crate::{
    error::{Error, Result},
    math::{C, N, R},
    register::{CReg, QReg},
    topology::RankTopology,
};

/// Gate operation codes as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum GateKind {
    Hadamard = 0,
    PauliX = 1,
    Cnot = 2,
    Measure = 3,
    Toffoli = 4,
    PhaseS = 5,
    PhaseT = 6,
    RotationY = 7,
    RotationZ = 8,
}

impl TryFrom<i32> for GateKind {
    type Error = Error;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Self::Hadamard),
            1 => Ok(Self::PauliX),
            2 => Ok(Self::Cnot),
            3 => Ok(Self::Measure),
            4 => Ok(Self::Toffoli),
            5 => Ok(Self::PhaseS),
            6 => Ok(Self::PhaseT),
            7 => Ok(Self::RotationY),
            8 => Ok(Self::RotationZ),
            _ => Err(Error::invalid(format!("unknown gate code {}", code))),
        }
    }
}

/// One decoded gate operation. Fields a given kind does not use are
/// ignored.
#[derive(Debug, Clone, Copy)]
pub struct GateOperation {
    pub kind: GateKind,
    pub target_qubit: N,
    pub control_qubit: N,
    pub second_control_qubit: N,
    pub classical_register: N,
    pub angle: R,
}

impl GateOperation {
    /// An operation acting on `target_qubit` with every other field at its
    /// default; chain the `with_*` helpers for the rest.
    pub fn gate(kind: GateKind, target_qubit: N) -> Self {
        Self {
            kind,
            target_qubit,
            control_qubit: 0,
            second_control_qubit: 0,
            classical_register: 0,
            angle: 0.0,
        }
    }

    pub fn with_control(mut self, control_qubit: N) -> Self {
        self.control_qubit = control_qubit;
        self
    }

    pub fn with_second_control(mut self, second_control_qubit: N) -> Self {
        self.second_control_qubit = second_control_qubit;
        self
    }

    pub fn with_classical_register(mut self, classical_register: N) -> Self {
        self.classical_register = classical_register;
        self
    }

    pub fn with_angle(mut self, angle: R) -> Self {
        self.angle = angle;
        self
    }
}

/// A decoded circuit.
#[derive(Debug, Clone)]
pub struct CircuitRequest {
    pub num_qubits: N,
    pub operations: Vec<GateOperation>,
}

/// Full state vector plus classical outcomes. Produced on rank 0 only.
#[derive(Debug, Clone)]
pub struct StateResponse {
    pub state_vector: Vec<C>,
    pub classical_results: CReg,
}

/// Run a decoded circuit on a fresh register.
///
/// Collective: every rank calls this with the same request and its own
/// topology endpoint. Rank 0 receives `Some(StateResponse)`; every other
/// rank receives `None`.
pub fn execute<T: RankTopology>(
    request: &CircuitRequest,
    topo: T,
) -> Result<Option<StateResponse>> {
    let mut reg = QReg::new(request.num_qubits, topo)?;
    let mut classical = CReg::new();

    for op in &request.operations {
        match op.kind {
            GateKind::Hadamard => reg.apply_hadamard(op.target_qubit)?,
            GateKind::PauliX => reg.apply_x(op.target_qubit)?,
            GateKind::Cnot => reg.apply_cnot(op.control_qubit, op.target_qubit)?,
            GateKind::Measure => {
                if op.classical_register > CReg::MAX_SLOT {
                    return Err(Error::invalid(format!(
                        "classical register {} is out of range",
                        op.classical_register
                    )));
                }
                let outcome = reg.measure(op.target_qubit)?;
                classical.set(op.classical_register, outcome);
            }
            GateKind::Toffoli => reg.apply_toffoli(
                op.control_qubit,
                op.second_control_qubit,
                op.target_qubit,
            )?,
            GateKind::PhaseS => reg.apply_s(op.target_qubit)?,
            GateKind::PhaseT => reg.apply_t(op.target_qubit)?,
            GateKind::RotationY => reg.apply_rotation_y(op.target_qubit, op.angle)?,
            GateKind::RotationZ => reg.apply_rotation_z(op.target_qubit, op.angle)?,
        }
    }

    Ok(reg
        .gather_to_root()?
        .map(|state_vector| StateResponse {
            state_vector,
            classical_results: classical,
        }))
}
