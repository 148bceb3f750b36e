use super::RankTopology;
use crate::{
    error::{Error, Result},
    math::{C, N},
};

/// Topology of a lone rank: no peers, every collective is local.
#[derive(Clone, Copy, Debug, Default)]
pub struct SingleRank;

impl RankTopology for SingleRank {
    fn rank(&self) -> N {
        0
    }

    fn size(&self) -> N {
        1
    }

    fn barrier(&self) -> Result<()> {
        Ok(())
    }

    fn gather_to_root(&self, local: &[C]) -> Result<Option<Vec<C>>> {
        Ok(Some(local.to_vec()))
    }

    fn exchange(&self, peer: N, _send: &[C], _recv: &mut [C]) -> Result<()> {
        Err(Error::Transport(format!(
            "no peer rank {} in a single-rank world",
            peer
        )))
    }
}
