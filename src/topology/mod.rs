//! Rank-communication facade.
//!
//! The simulator core never talks to a transport directly: it consumes a
//! [`RankTopology`], an already-initialised communication facility exposing
//! the rank id, the world size, a barrier, an all-to-one gather and a
//! blocking paired exchange. Everything else the register needs
//! (all-reduce, all-gather) is derived from the paired exchange with
//! power-of-two butterflies, so implementors only provide the five
//! primitives.
//!
//! Two implementations ship with the crate: [`SingleRank`] for P = 1 and the
//! in-process channel mesh [`ThreadMesh`] used by the test suite. A real
//! multi-process deployment wires its own transport behind the trait.

use crate::{
    error::Result,
    math::{C, C_ZERO, N},
};

mod mesh;
mod single;

pub use self::{
    mesh::{MeshRank, ThreadMesh},
    single::SingleRank,
};

/// Communication endpoint of one rank in a power-of-two world.
///
/// Clones are cheap handles onto the same endpoint; a register and the
/// scratch copies made while evaluating expectations share one endpoint.
///
/// Collective calls must be issued by every rank in the same order. The
/// paired [`exchange`](RankTopology::exchange) is the synchronisation
/// primitive: it returns only once both sides hold consistent data.
pub trait RankTopology: Clone {
    /// This rank's id, in `0..size()`.
    fn rank(&self) -> N;

    /// World size. Power of two.
    fn size(&self) -> N;

    /// Block until every rank arrives.
    fn barrier(&self) -> Result<()>;

    /// Gather every rank's buffer onto rank 0, in rank order.
    /// Returns `None` on every other rank.
    fn gather_to_root(&self, local: &[C]) -> Result<Option<Vec<C>>>;

    /// Blocking paired exchange with `peer`: send `send`, fill `recv` with
    /// the peer's buffer of the same length.
    fn exchange(&self, peer: N, send: &[C], recv: &mut [C]) -> Result<()>;

    /// Sum a value over every rank; every rank gets the total.
    ///
    /// Butterfly over the paired exchange: log2(P) rounds, peer distance
    /// doubling each round.
    fn allreduce_sum(&self, value: C) -> Result<C> {
        let mut acc = value;
        let mut recv = [C_ZERO];

        let mut step = 1;
        while step < self.size() {
            self.exchange(self.rank() ^ step, &[acc], &mut recv)?;
            acc += recv[0];
            step <<= 1;
        }

        Ok(acc)
    }

    /// Concatenate every rank's buffer in rank order; every rank gets the
    /// full vector. Recursive doubling over the paired exchange.
    fn allgather(&self, local: &[C]) -> Result<Vec<C>> {
        let mut block = local.to_vec();

        let mut step = 1;
        while step < self.size() {
            let mut recv = vec![C_ZERO; block.len()];
            self.exchange(self.rank() ^ step, &block, &mut recv)?;

            // The lower half of the pair owns the lower-indexed block.
            if self.rank() & step == 0 {
                block.extend_from_slice(&recv);
            } else {
                recv.extend_from_slice(&block);
                block = recv;
            }
            step <<= 1;
        }

        Ok(block)
    }
}
