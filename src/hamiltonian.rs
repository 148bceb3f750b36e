//! Pauli-sum Hamiltonians and expectation values.
//!
//! A Hamiltonian is a sum of weighted Pauli strings,
//!
//! ```text
//! H = Σ_j  w_j · P_j
//! ```
//!
//! where each P_j is a tensor product of single-qubit Pauli operators and
//! w_j ∈ ℝ. Expectation values are taken against a borrowed register
//! without disturbing it: each term is applied to a deep copy and reduced
//! with the distributed inner product.

use std::{iter::FromIterator, str::FromStr};

use crate::{
    error::{Error, Result},
    math::{N, R},
    register::QReg,
    topology::RankTopology,
};

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauliOp {
    I,
    X,
    Y,
    Z,
}

impl PauliOp {
    fn from_char(ch: char) -> Result<Self> {
        match ch {
            'I' => Ok(Self::I),
            'X' => Ok(Self::X),
            'Y' => Ok(Self::Y),
            'Z' => Ok(Self::Z),
            _ => Err(Error::invalid(format!(
                "'{}' is not a Pauli operator",
                ch
            ))),
        }
    }
}

/// A tensor product of Pauli operators on named qubits.
///
/// Stored as non-identity `(qubit, op)` pairs sorted by qubit index; qubits
/// not listed are implicitly I. The text form is indexed left-to-right from
/// qubit 0: `"ZXI"` puts Z on qubit 0 and X on qubit 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PauliString {
    ops: Vec<(N, PauliOp)>,
}

impl PauliString {
    /// Build from `(qubit, op)` pairs. Identity entries are dropped, the
    /// rest sorted by qubit.
    pub fn from_ops(ops: impl IntoIterator<Item = (N, PauliOp)>) -> Self {
        let mut ops: Vec<_> = ops
            .into_iter()
            .filter(|(_, op)| *op != PauliOp::I)
            .collect();
        ops.sort_by_key(|(qubit, _)| *qubit);
        Self { ops }
    }

    /// Non-identity `(qubit, op)` pairs, sorted by qubit index.
    pub fn ops(&self) -> &[(N, PauliOp)] {
        &self.ops
    }

    /// True when every factor is the identity.
    pub fn is_identity(&self) -> bool {
        self.ops.is_empty()
    }

    /// Highest qubit index referenced, `None` for an identity string.
    pub fn max_qubit(&self) -> Option<N> {
        self.ops.last().map(|(qubit, _)| *qubit)
    }
}

impl FromStr for PauliString {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Err(Error::invalid("empty Pauli string"));
        }
        let ops = text
            .chars()
            .enumerate()
            .map(|(qubit, ch)| Ok((qubit, PauliOp::from_char(ch)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_ops(ops))
    }
}

/// A single weighted Pauli string: `coeff · string`.
#[derive(Debug, Clone)]
pub struct PauliTerm {
    pub coeff: R,
    pub string: PauliString,
}

impl PauliTerm {
    pub fn new(coeff: R, string: PauliString) -> Self {
        Self { coeff, string }
    }

    /// Parse the text form of a term, e.g. `PauliTerm::parse(-0.5, "ZZ")`.
    pub fn parse(coeff: R, text: &str) -> Result<Self> {
        Ok(Self::new(coeff, text.parse()?))
    }

    /// Shorthand: single-qubit Z term.
    pub fn z(qubit: N, coeff: R) -> Self {
        Self::new(coeff, PauliString::from_ops([(qubit, PauliOp::Z)]))
    }

    /// Shorthand: single-qubit X term.
    pub fn x(qubit: N, coeff: R) -> Self {
        Self::new(coeff, PauliString::from_ops([(qubit, PauliOp::X)]))
    }
}

/// A sum-of-Pauli-strings Hamiltonian.
#[derive(Debug, Clone, Default)]
pub struct Hamiltonian {
    terms: Vec<PauliTerm>,
}

impl Hamiltonian {
    pub fn from_terms(terms: Vec<PauliTerm>) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &[PauliTerm] {
        &self.terms
    }

    pub fn n_terms(&self) -> N {
        self.terms.len()
    }

    /// Minimum register width this Hamiltonian acts on.
    pub fn min_qubits(&self) -> N {
        self.terms
            .iter()
            .filter_map(|term| term.string.max_qubit())
            .max()
            .map_or(0, |qubit| qubit + 1)
    }

    /// ⟨ψ|H|ψ⟩ for the state held by `reg`.
    ///
    /// Term by term: apply the string's gates to a deep copy of the
    /// register, take the distributed inner product with the original and
    /// accumulate the weighted real part. `reg` itself is left untouched.
    /// Collective: every rank must call this with the same Hamiltonian.
    pub fn expectation<T: RankTopology>(&self, reg: &QReg<T>) -> Result<R> {
        if self.min_qubits() > reg.num() {
            return Err(Error::invalid(format!(
                "Hamiltonian acts on {} qubits but the register has {}",
                self.min_qubits(),
                reg.num()
            )));
        }

        let mut energy = 0.0;
        for term in &self.terms {
            let value = if term.string.is_identity() {
                reg.norm_sqr()?
            } else {
                let mut scratch = reg.clone();
                for &(qubit, op) in term.string.ops() {
                    match op {
                        PauliOp::I => {}
                        PauliOp::X => scratch.apply_x(qubit)?,
                        PauliOp::Y => scratch.apply_y(qubit)?,
                        PauliOp::Z => scratch.apply_z(qubit)?,
                    }
                }
                reg.inner_product(&scratch)?.re
            };
            tracing::trace!(coeff = term.coeff, value, "pauli term");
            energy += term.coeff * value;
        }

        if energy.is_finite() {
            Ok(energy)
        } else {
            Err(Error::Numeric(format!(
                "expectation value {} is not finite",
                energy
            )))
        }
    }
}

impl FromIterator<PauliTerm> for Hamiltonian {
    fn from_iter<I: IntoIterator<Item = PauliTerm>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}
