//! Parameter-shift gradients of Hamiltonian expectations.
//!
//! For an ansatz built from single-qubit Pauli-rotation gates, whose
//! generators square to the identity, the derivative of an expectation
//! value is exact:
//!
//! ```text
//! ∂⟨H⟩/∂θ_i = ½ (⟨H⟩(θ + π/2·e_i) − ⟨H⟩(θ − π/2·e_i))
//! ```
//!
//! The estimator treats the simulator as a black box: two fresh registers
//! per parameter, the ansatz run on each, two expectation values, one
//! difference.

use crate::{
    error::{Error, Result},
    hamiltonian::Hamiltonian,
    math::{FRAC_PI_2, N, R},
    register::QReg,
    topology::RankTopology,
};

/// Analytic gradient estimator for Pauli-rotation ansatze.
///
/// The ansatz is a pure callable `Fn(&[R], &mut QReg<T>) -> Result<()>`:
/// given a parameter vector and a fresh |0…0⟩ register, it prepares
/// |ψ(θ)⟩ by issuing gate calls. It must not capture mutable state:
/// successive invocations run on unrelated registers.
#[derive(Debug, Clone, Copy)]
pub struct ParameterShift {
    shift: R,
}

impl Default for ParameterShift {
    fn default() -> Self {
        Self { shift: FRAC_PI_2 }
    }
}

impl ParameterShift {
    pub fn new() -> Self {
        Self::default()
    }

    /// ∂⟨H⟩/∂θ_i for every parameter, in order.
    ///
    /// Fails with an invalid-argument error on an empty parameter vector;
    /// any ansatz or expectation failure aborts the whole call and no
    /// partial gradients are returned.
    pub fn gradients<T, F>(
        &self,
        q_num: N,
        theta: &[R],
        ansatz: F,
        hamiltonian: &Hamiltonian,
        topo: &T,
    ) -> Result<Vec<R>>
    where
        T: RankTopology,
        F: Fn(&[R], &mut QReg<T>) -> Result<()>,
    {
        if theta.is_empty() {
            return Err(Error::invalid(
                "parameter-shift call needs at least one parameter",
            ));
        }

        let mut gradients = Vec::with_capacity(theta.len());
        for at in 0..theta.len() {
            let e_plus = self.energy_at(q_num, theta, at, self.shift, &ansatz, hamiltonian, topo)?;
            let e_minus =
                self.energy_at(q_num, theta, at, -self.shift, &ansatz, hamiltonian, topo)?;

            let gradient = 0.5 * (e_plus - e_minus);
            tracing::debug!(parameter = at, gradient, "shift rule");
            gradients.push(gradient);
        }
        Ok(gradients)
    }

    #[allow(clippy::too_many_arguments)]
    fn energy_at<T, F>(
        &self,
        q_num: N,
        theta: &[R],
        at: N,
        delta: R,
        ansatz: &F,
        hamiltonian: &Hamiltonian,
        topo: &T,
    ) -> Result<R>
    where
        T: RankTopology,
        F: Fn(&[R], &mut QReg<T>) -> Result<()>,
    {
        let mut shifted = theta.to_vec();
        shifted[at] += delta;

        let mut reg = QReg::new(q_num, topo.clone())?;
        ansatz(&shifted, &mut reg)?;
        hamiltonian.expectation(&reg)
    }
}
