use std::fmt;

use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{buffer::AmpBuffer, kernel};
use crate::{
    error::{Error, Result},
    math::{approx_cmp::approx_eq_real, index, C, Mask, N, R, C_ZERO},
    operator::atomic::{self, AtomicOp, AtomicOpDispatch},
    topology::RankTopology,
};

/// Tolerance on measurement probabilities.
const PROB_TOL: R = 1e-9;

/// Default measurement seed. Fixed so every rank draws the same stream
/// without a broadcast; [`QReg::with_seed`] overrides it.
const DEFAULT_SEED: u64 = 0x51D5_EED0;

const MAX_LEN_TO_DISPLAY: N = 8;

/// [`Quantum register`](QReg)
///
/// The heart of the crate: this rank's slice of the 2^N-amplitude state
/// vector, the gate library that mutates it and the projective measurement
/// that collapses it.
///
/// With world size P (a power of two), each rank owns L = 2^N / P
/// contiguous amplitudes; rank r holds global indices `r·L .. (r+1)·L`. A
/// gate on a qubit whose index bit lies inside the slice runs entirely in
/// place. A gate on one of the top log2(P) qubits pairs this rank with the
/// rank whose id differs in that qubit's rank bit and costs at most one
/// paired buffer exchange, or none at all for diagonal gates.
///
/// Gate calls are collective: every rank must issue the same gates in the
/// same order. A transport or numeric failure poisons the register; every
/// later operation returns the original error.
///
/// ```rust
/// use qdsim::prelude::*;
///
/// let mut reg = QReg::new(2, SingleRank).unwrap();
/// reg.apply_hadamard(0).unwrap();
/// reg.apply_cnot(0, 1).unwrap();
///
/// let psi = reg.state_vector().unwrap();
/// assert!((psi[0].re - psi[3].re).abs() < 1e-9);
/// ```
#[derive(Clone)]
pub struct QReg<T: RankTopology> {
    buffer: AmpBuffer,
    topo: T,
    q_num: N,
    local_len: N,
    rng: StdRng,
    poisoned: Option<Error>,
}

impl<T: RankTopology> QReg<T> {
    /// Create an N-qubit register in state |0…0⟩.
    ///
    /// Fails with an invalid-argument error when N = 0, the world size is
    /// not a power of two, or 2^N < P.
    pub fn new(q_num: N, topo: T) -> Result<Self> {
        Self::with_seed(q_num, topo, DEFAULT_SEED)
    }

    /// Like [`new`](QReg::new), with a caller-pinned measurement seed for
    /// reproducible runs. The seed must be identical on every rank.
    pub fn with_seed(q_num: N, topo: T, seed: u64) -> Result<Self> {
        let size = topo.size();
        if q_num == 0 {
            return Err(Error::invalid("register needs at least one qubit"));
        }
        if q_num >= usize::BITS as N {
            return Err(Error::invalid(format!(
                "{} qubits cannot be indexed on this platform",
                q_num
            )));
        }
        if !index::is_pow2(size) {
            return Err(Error::invalid(format!(
                "world size {} is not a power of two",
                size
            )));
        }
        if (1usize << q_num) < size {
            return Err(Error::invalid(format!(
                "{} qubits cannot be sliced across {} ranks",
                q_num, size
            )));
        }

        let local_len = (1usize << q_num) / size;
        let mut buffer = AmpBuffer::new(local_len);
        if topo.rank() == 0 {
            buffer.reset(Some(0));
        }
        topo.barrier()?;

        Ok(Self {
            buffer,
            topo,
            q_num,
            local_len,
            rng: StdRng::seed_from_u64(seed),
            poisoned: None,
        })
    }

    /// Number of qubits.
    pub fn num(&self) -> N {
        self.q_num
    }

    /// Amplitudes held by this rank.
    pub fn local_len(&self) -> N {
        self.local_len
    }

    /// This rank's slice of the state vector.
    pub fn local_slice(&self) -> &[C] {
        &self.buffer.psi
    }

    pub fn topology(&self) -> &T {
        &self.topo
    }

    pub fn apply_x(&mut self, target: N) -> Result<()> {
        self.apply_single(&atomic::x::Op::new().this(), target)
    }

    pub fn apply_y(&mut self, target: N) -> Result<()> {
        self.apply_single(&atomic::y::Op::new().this(), target)
    }

    pub fn apply_z(&mut self, target: N) -> Result<()> {
        self.apply_single(&atomic::z::Op::new().this(), target)
    }

    pub fn apply_hadamard(&mut self, target: N) -> Result<()> {
        self.apply_single(&atomic::h::Op::new().this(), target)
    }

    pub fn apply_s(&mut self, target: N) -> Result<()> {
        self.apply_single(&atomic::s::Op::new().this(), target)
    }

    pub fn apply_t(&mut self, target: N) -> Result<()> {
        self.apply_single(&atomic::t::Op::new().this(), target)
    }

    pub fn apply_rotation_x(&mut self, target: N, theta: R) -> Result<()> {
        let theta = checked_angle(theta)?;
        self.apply_single(&atomic::rx::Op::new(theta).this(), target)
    }

    pub fn apply_rotation_y(&mut self, target: N, theta: R) -> Result<()> {
        let theta = checked_angle(theta)?;
        self.apply_single(&atomic::ry::Op::new(theta).this(), target)
    }

    pub fn apply_rotation_z(&mut self, target: N, theta: R) -> Result<()> {
        let theta = checked_angle(theta)?;
        self.apply_single(&atomic::rz::Op::new(theta).this(), target)
    }

    /// Controlled NOT. `control` and `target` must be distinct.
    pub fn apply_cnot(&mut self, control: N, target: N) -> Result<()> {
        self.apply_controlled_x(&[control], target)
    }

    /// Doubly controlled NOT. All three indices must be distinct.
    pub fn apply_toffoli(&mut self, control_a: N, control_b: N, target: N) -> Result<()> {
        self.apply_controlled_x(&[control_a, control_b], target)
    }

    /// Z-basis projective measurement of one qubit.
    ///
    /// The marginal is reduced over every rank and the outcome is drawn
    /// from the register's shared-seed stream, so all ranks observe the
    /// same result. Collapses the state and renormalises.
    pub fn measure(&mut self, target: N) -> Result<bool> {
        self.ensure_usable()?;
        self.check_qubit(target)?;

        let p_one = self.probability_of_one(target)?;
        if !p_one.is_finite() || !(-PROB_TOL..=1.0 + PROB_TOL).contains(&p_one) {
            return Err(self.poison(Error::Numeric(format!(
                "probability {} measuring qubit {}",
                p_one, target
            ))));
        }

        let draw: R = self.rng.gen();
        let outcome = draw < p_one;
        let p_outcome = if outcome { p_one } else { 1.0 - p_one };
        tracing::debug!(qubit = target, outcome, p_one, "measure");

        self.collapse_qubit(target, outcome, p_outcome);
        Ok(outcome)
    }

    /// The full 2^N-amplitude state vector, assembled on every rank.
    /// Meant for tests and small N.
    pub fn state_vector(&self) -> Result<Vec<C>> {
        self.ensure_usable()?;
        self.topo.allgather(&self.buffer.psi)
    }

    /// The full state vector on rank 0, `None` elsewhere.
    pub fn gather_to_root(&self) -> Result<Option<Vec<C>>> {
        self.ensure_usable()?;
        self.topo.gather_to_root(&self.buffer.psi)
    }

    /// Probabilities of every basis state, assembled on every rank.
    pub fn probabilities(&self) -> Result<Vec<R>> {
        Ok(self.state_vector()?.iter().map(C::norm_sqr).collect())
    }

    /// Squared norm of the distributed state.
    pub fn norm_sqr(&self) -> Result<R> {
        self.ensure_usable()?;
        let local = C::new(self.buffer.local_norm_sqr(), 0.0);
        Ok(self.topo.allreduce_sum(local)?.re)
    }

    /// ⟨self|other⟩, reduced over every rank.
    pub fn inner_product(&self, other: &Self) -> Result<C> {
        self.ensure_usable()?;
        other.ensure_usable()?;
        if self.q_num != other.q_num {
            return Err(Error::invalid(format!(
                "inner product between {}- and {}-qubit registers",
                self.q_num, other.q_num
            )));
        }

        let local = self
            .buffer
            .psi
            .iter()
            .zip(&other.buffer.psi)
            .map(|(a, b)| a.conj() * b)
            .sum();
        self.topo.allreduce_sum(local)
    }

    fn apply_single(&mut self, op: &AtomicOpDispatch, target: N) -> Result<()> {
        self.ensure_usable()?;
        self.check_qubit(target)?;
        tracing::trace!(gate = %op.name(), qubit = target, "apply");

        let m = op.matrix();
        if index::is_local(target, self.local_len) {
            kernel::rotate_pairs(&mut self.buffer.psi, 1 << target, &m);
        } else if op.is_diagonal() {
            // The rank bit fixes the qubit value for the whole slice: a
            // diagonal gate reduces to one scalar, no traffic.
            let bit = index::rank_bit(target, self.local_len);
            let factor = if index::qubit_of_rank(self.topo.rank(), bit) {
                m[3]
            } else {
                m[0]
            };
            kernel::scale_all(&mut self.buffer.psi, factor);
        } else {
            let bit = index::rank_bit(target, self.local_len);
            let holds_one = index::qubit_of_rank(self.topo.rank(), bit);
            self.exchange_with(self.topo.rank() ^ (1 << bit))?;

            let AmpBuffer { psi, psi_recv } = &mut self.buffer;
            kernel::combine_exchanged(psi, psi_recv, holds_one, &m);
        }
        Ok(())
    }

    fn apply_controlled_x(&mut self, controls: &[N], target: N) -> Result<()> {
        self.ensure_usable()?;
        self.check_qubit(target)?;
        for (i, &control) in controls.iter().enumerate() {
            self.check_qubit(control)?;
            if control == target {
                return Err(Error::invalid(format!(
                    "control {} coincides with target {}",
                    control, target
                )));
            }
            if controls[..i].contains(&control) {
                return Err(Error::invalid(format!("control {} given twice", control)));
            }
        }

        let rank = self.topo.rank();
        let mut c_mask: Mask = 0;
        let mut armed = true;
        for &control in controls {
            if index::is_local(control, self.local_len) {
                c_mask |= 1 << control;
            } else if !index::qubit_of_rank(rank, index::rank_bit(control, self.local_len)) {
                // A global control reads 0 everywhere on this slice.
                armed = false;
            }
        }
        tracing::trace!(?controls, qubit = target, armed, "apply controlled-X");

        if index::is_local(target, self.local_len) {
            if armed {
                kernel::controlled_swap_pairs(&mut self.buffer.psi, 1 << target, c_mask);
            }
        } else if armed {
            // Both members of a target-bit pair agree on every global
            // control, so the peer enters the exchange symmetrically.
            let bit = index::rank_bit(target, self.local_len);
            self.exchange_with(rank ^ (1 << bit))?;

            let AmpBuffer { psi, psi_recv } = &mut self.buffer;
            kernel::overwrite_controlled(psi, psi_recv, c_mask);
        }
        Ok(())
    }

    fn probability_of_one(&mut self, target: N) -> Result<R> {
        let local = if index::is_local(target, self.local_len) {
            let t_mask = 1 << target;
            kernel::masked_norm_sqr(&self.buffer.psi, t_mask, t_mask)
        } else if index::qubit_of_rank(self.topo.rank(), index::rank_bit(target, self.local_len)) {
            self.buffer.local_norm_sqr()
        } else {
            0.0
        };

        let total = self.topo.allreduce_sum(C::new(local, 0.0));
        Ok(total.map_err(|err| self.poison(err))?.re)
    }

    fn collapse_qubit(&mut self, target: N, outcome: bool, p_outcome: R) {
        let inv_norm = if approx_eq_real(p_outcome, 1.0) {
            1.0
        } else {
            p_outcome.sqrt().recip()
        };

        if index::is_local(target, self.local_len) {
            let t_mask = 1 << target;
            let value = if outcome { t_mask } else { 0 };
            kernel::collapse(&mut self.buffer.psi, t_mask, value, inv_norm);
        } else {
            let bit = index::rank_bit(target, self.local_len);
            if index::qubit_of_rank(self.topo.rank(), bit) == outcome {
                self.buffer.scale(inv_norm);
            } else {
                self.buffer.psi.fill(C_ZERO);
            }
        }
    }

    fn exchange_with(&mut self, peer: N) -> Result<()> {
        let AmpBuffer { psi, psi_recv } = &mut self.buffer;
        let exchanged = self.topo.exchange(peer, psi, psi_recv);
        exchanged.map_err(|err| self.poison(err))
    }

    fn check_qubit(&self, qubit: N) -> Result<()> {
        if qubit < self.q_num {
            Ok(())
        } else {
            Err(Error::invalid(format!(
                "qubit {} is out of range for a {}-qubit register",
                qubit, self.q_num
            )))
        }
    }

    fn ensure_usable(&self) -> Result<()> {
        match &self.poisoned {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn poison(&mut self, err: Error) -> Error {
        if err.poisons_register() && self.poisoned.is_none() {
            tracing::debug!(error = %err, "register poisoned");
            self.poisoned = Some(err.clone());
        }
        err
    }
}

fn checked_angle(theta: R) -> Result<R> {
    if theta.is_finite() {
        Ok(theta)
    } else {
        Err(Error::invalid(format!(
            "rotation angle {} is not finite",
            theta
        )))
    }
}

impl<T: RankTopology> fmt::Debug for QReg<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let psi = &self.buffer.psi;
        let shown = psi.len().min(MAX_LEN_TO_DISPLAY);

        let mut debug = f.debug_struct("QReg");
        let debug = psi[..shown]
            .iter()
            .enumerate()
            .fold(&mut debug, |debug, (offset, psi)| {
                let idx = index::global_index(self.topo.rank(), offset, self.local_len);
                debug.field(&format!("{}", idx), psi)
            });
        if shown < psi.len() {
            debug.finish_non_exhaustive()
        } else {
            debug.finish()
        }
    }
}
