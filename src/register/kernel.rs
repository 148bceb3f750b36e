//! Slice-level gate kernels.
//!
//! Every loop here runs over one rank's amplitudes only; nothing in this
//! module communicates. The `cpu` feature parallelises the pair iteration
//! with rayon; the pairs are disjoint, so chunks never alias.

#[cfg(feature = "cpu")]
use rayon::prelude::*;

use crate::math::{C, M1, Mask, R, C_ZERO};

/// Apply a 2x2 unitary to every (ℓ, ℓ | t_mask) amplitude pair.
///
/// `t_mask` is the target qubit's local bit; chunks of `2 * t_mask` hold
/// `t_mask` disjoint pairs each.
pub(crate) fn rotate_pairs(psi: &mut [C], t_mask: Mask, m: &M1) {
    let pair = t_mask << 1;

    #[cfg(feature = "cpu")]
    psi.par_chunks_mut(pair)
        .for_each(|chunk| rotate_chunk(chunk, t_mask, m));

    #[cfg(not(feature = "cpu"))]
    for chunk in psi.chunks_mut(pair) {
        rotate_chunk(chunk, t_mask, m);
    }
}

#[inline]
fn rotate_chunk(chunk: &mut [C], t_mask: Mask, m: &M1) {
    for l in 0..t_mask {
        let (a, b) = (chunk[l], chunk[l | t_mask]);
        chunk[l] = m[0] * a + m[1] * b;
        chunk[l | t_mask] = m[2] * a + m[3] * b;
    }
}

/// Combine the local slice with the peer slice after a global-qubit
/// exchange. `holds_one` says which half of each pair this rank keeps: the
/// rank whose target bit reads 1 holds the `b` partner and keeps the second
/// matrix row.
pub(crate) fn combine_exchanged(psi: &mut [C], peer: &[C], holds_one: bool, m: &M1) {
    let (m_a, m_b) = if holds_one {
        (m[2], m[3])
    } else {
        (m[0], m[1])
    };

    #[cfg(feature = "cpu")]
    psi.par_iter_mut().zip(peer.par_iter()).for_each(|(psi, &peer)| {
        let (a, b) = if holds_one { (peer, *psi) } else { (*psi, peer) };
        *psi = m_a * a + m_b * b;
    });

    #[cfg(not(feature = "cpu"))]
    for (psi, &peer) in psi.iter_mut().zip(peer) {
        let (a, b) = if holds_one { (peer, *psi) } else { (*psi, peer) };
        *psi = m_a * a + m_b * b;
    }
}

/// Multiply every amplitude by a scalar (diagonal gate on a global qubit).
pub(crate) fn scale_all(psi: &mut [C], factor: C) {
    #[cfg(feature = "cpu")]
    psi.par_iter_mut().for_each(|psi| *psi *= factor);

    #[cfg(not(feature = "cpu"))]
    for psi in psi.iter_mut() {
        *psi *= factor;
    }
}

/// Swap (ℓ, ℓ ^ t_mask) for every ℓ whose control bits are all set and
/// whose target bit is clear. Filtering on the controls and pairing by XOR
/// keeps the iteration correct for any control/target ordering.
pub(crate) fn controlled_swap_pairs(psi: &mut [C], t_mask: Mask, c_mask: Mask) {
    for l in 0..psi.len() {
        if l & t_mask == 0 && l & c_mask == c_mask {
            psi.swap(l, l ^ t_mask);
        }
    }
}

/// Copy peer amplitudes over the slots whose control bits are all set
/// (controlled-X with a global target: the pair swap is the exchange).
pub(crate) fn overwrite_controlled(psi: &mut [C], peer: &[C], c_mask: Mask) {
    if c_mask == 0 {
        psi.copy_from_slice(peer);
        return;
    }
    for (l, (psi, &peer)) in psi.iter_mut().zip(peer).enumerate() {
        if l & c_mask == c_mask {
            *psi = peer;
        }
    }
}

/// Sum |amp|² over the slots whose masked index bits equal `value`.
pub(crate) fn masked_norm_sqr(psi: &[C], mask: Mask, value: Mask) -> R {
    psi.iter()
        .enumerate()
        .filter(|(l, _)| l & mask == value)
        .map(|(_, psi)| psi.norm_sqr())
        .sum()
}

/// Zero the amplitudes inconsistent with a measurement outcome and rescale
/// the survivors.
pub(crate) fn collapse(psi: &mut [C], mask: Mask, value: Mask, inv_norm: R) {
    for (l, psi) in psi.iter_mut().enumerate() {
        if l & mask == value {
            *psi *= inv_norm;
        } else {
            *psi = C_ZERO;
        }
    }
}
