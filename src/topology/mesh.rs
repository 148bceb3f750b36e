use std::sync::{
    mpsc::{channel, Receiver, Sender},
    Arc, Barrier, Mutex,
};

use super::RankTopology;
use crate::{
    error::{Error, Result},
    math::{index, C, N},
};

type Payload = Vec<C>;

/// Builder for an in-process rank mesh.
///
/// Every ordered pair of ranks gets its own channel, so paired exchanges and
/// gathers never contend on a shared queue. One endpoint per rank is handed
/// out; the test suite moves each endpoint into its own thread.
pub struct ThreadMesh;

impl ThreadMesh {
    /// Create the endpoints of a `size`-rank world. `size` must be a power
    /// of two.
    pub fn endpoints(size: N) -> Result<Vec<MeshRank>> {
        if !index::is_pow2(size) {
            return Err(Error::invalid(format!(
                "world size {} is not a power of two",
                size
            )));
        }

        let mut txs: Vec<Vec<Sender<Payload>>> = (0..size).map(|_| Vec::with_capacity(size)).collect();
        let mut rxs: Vec<Vec<Arc<Mutex<Receiver<Payload>>>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();

        for to in 0..size {
            for from in 0..size {
                let (tx, rx) = channel();
                txs[from].push(tx);
                rxs[to].push(Arc::new(Mutex::new(rx)));
            }
        }

        let barrier = Arc::new(Barrier::new(size));
        Ok(txs
            .into_iter()
            .zip(rxs)
            .enumerate()
            .map(|(rank, (txs, rxs))| MeshRank {
                rank,
                size,
                barrier: barrier.clone(),
                txs,
                rxs,
            })
            .collect())
    }
}

/// One rank's endpoint in a [`ThreadMesh`]. Cheap to clone; clones share the
/// underlying channels.
#[derive(Clone)]
pub struct MeshRank {
    rank: N,
    size: N,
    barrier: Arc<Barrier>,
    /// txs[peer] sends to `peer`.
    txs: Vec<Sender<Payload>>,
    /// rxs[peer] receives what `peer` sent here.
    rxs: Vec<Arc<Mutex<Receiver<Payload>>>>,
}

impl MeshRank {
    fn recv_from(&self, peer: N) -> Result<Payload> {
        self.rxs[peer]
            .lock()
            .map_err(|_| Error::Transport(format!("receive queue from rank {} is poisoned", peer)))?
            .recv()
            .map_err(|_| Error::Transport(format!("rank {} hung up", peer)))
    }
}

impl RankTopology for MeshRank {
    fn rank(&self) -> N {
        self.rank
    }

    fn size(&self) -> N {
        self.size
    }

    fn barrier(&self) -> Result<()> {
        self.barrier.wait();
        Ok(())
    }

    fn gather_to_root(&self, local: &[C]) -> Result<Option<Vec<C>>> {
        if self.rank != 0 {
            self.txs[0]
                .send(local.to_vec())
                .map_err(|_| Error::Transport("root rank hung up".to_string()))?;
            return Ok(None);
        }

        let mut full = local.to_vec();
        for peer in 1..self.size {
            let block = self.recv_from(peer)?;
            if block.len() != local.len() {
                return Err(Error::RankMismatch {
                    peer,
                    expected: local.len(),
                    received: block.len(),
                });
            }
            full.extend_from_slice(&block);
        }
        Ok(Some(full))
    }

    fn exchange(&self, peer: N, send: &[C], recv: &mut [C]) -> Result<()> {
        if peer >= self.size || peer == self.rank {
            return Err(Error::invalid(format!(
                "rank {} cannot exchange with peer {}",
                self.rank, peer
            )));
        }
        tracing::trace!(rank = self.rank, peer, len = send.len(), "paired exchange");

        self.txs[peer]
            .send(send.to_vec())
            .map_err(|_| Error::Transport(format!("rank {} hung up", peer)))?;
        let block = self.recv_from(peer)?;
        if block.len() != recv.len() {
            return Err(Error::RankMismatch {
                peer,
                expected: recv.len(),
                received: block.len(),
            });
        }
        recv.copy_from_slice(&block);
        Ok(())
    }
}
