use crate::math::{C, N, R, C_ONE, C_ZERO};

/// This rank's slice of the state vector: L amplitudes plus an equally
/// sized receive scratch for paired exchanges, 2L complex values in total.
#[derive(Debug)]
pub(crate) struct AmpBuffer {
    pub(crate) psi: Vec<C>,
    pub(crate) psi_recv: Vec<C>,
}

impl AmpBuffer {
    pub fn new(local_len: N) -> Self {
        Self {
            psi: vec![C_ZERO; local_len],
            psi_recv: vec![C_ZERO; local_len],
        }
    }

    pub fn len(&self) -> N {
        self.psi.len()
    }

    /// Zero the slice, optionally writing the unit amplitude at a local
    /// offset. Only the rank holding global index 0 passes `Some`.
    pub fn reset(&mut self, one_at: Option<N>) {
        self.psi.fill(C_ZERO);
        if let Some(offset) = one_at {
            self.psi[offset] = C_ONE;
        }
    }

    /// Squared norm of the local slice only.
    pub fn local_norm_sqr(&self) -> R {
        self.psi.iter().map(C::norm_sqr).sum()
    }

    pub fn scale(&mut self, factor: R) {
        for psi in &mut self.psi {
            *psi *= factor;
        }
    }
}

impl Clone for AmpBuffer {
    fn clone(&self) -> Self {
        Self {
            psi: self.psi.clone(),
            psi_recv: vec![C_ZERO; self.psi.len()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init() {
        let mut buffer = AmpBuffer::new(4);
        buffer.reset(Some(0));

        assert_eq!(buffer.psi, [&[C_ONE; 1][..], &[C_ZERO; 3]].concat());
        assert_eq!(buffer.len(), 4);
        assert!((buffer.local_norm_sqr() - 1.0).abs() < 1e-15);

        buffer.reset(None);
        assert_eq!(buffer.local_norm_sqr(), 0.0);
    }
}
