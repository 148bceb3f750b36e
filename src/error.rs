//! Error kinds of the simulator core.

use thiserror::Error;

use crate::math::N;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    /// A malformed caller argument, rejected before any state mutation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A collective ran with inconsistent shapes across ranks.
    #[error("rank mismatch with peer {peer}: expected {expected} amplitudes, received {received}")]
    RankMismatch { peer: N, expected: N, received: N },

    /// The underlying exchange or gather failed. Fatal for the register.
    #[error("transport failure: {0}")]
    Transport(String),

    /// NaN/Inf or an out-of-range probability. Fatal for the register.
    #[error("numeric failure: {0}")]
    Numeric(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Whether the register that hit this error must be considered corrupted.
    pub fn poisons_register(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Numeric(_) | Error::RankMismatch { .. })
    }
}
