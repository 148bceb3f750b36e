//! Index arithmetic for the distributed state vector.
//!
//! With P ranks (P a power of two) and local length L = 2^N / P, the top
//! log2(P) bits of a global amplitude index select the rank. A qubit whose
//! index bit lies below L is LOCAL to every rank's slice; otherwise it is
//! GLOBAL and its value for rank r is a bit of r itself. Everything the
//! register needs to know about that split is encoded here.

use super::types::*;

/// log2 of a power of two.
#[inline]
pub fn log2(n: N) -> N {
    n.trailing_zeros() as N
}

#[inline]
pub fn is_pow2(n: N) -> bool {
    n != 0 && n & (n - 1) == 0
}

/// A qubit is local iff its index bit addresses the rank slice.
#[inline]
pub fn is_local(qubit: N, local_len: N) -> bool {
    (1 << qubit) < local_len
}

/// Rank-bit position of a global qubit.
#[inline]
pub fn rank_bit(qubit: N, local_len: N) -> N {
    qubit - log2(local_len)
}

/// Value of a global qubit on rank `rank`, given its rank-bit position.
#[inline]
pub fn qubit_of_rank(rank: N, bit: N) -> bool {
    rank >> bit & 1 != 0
}

/// Split a global amplitude index into (rank, local offset).
#[inline]
pub fn split_global(idx: N, local_len: N) -> (N, N) {
    (idx >> log2(local_len), idx & (local_len - 1))
}

/// Rebuild a global amplitude index from (rank, local offset).
#[inline]
pub fn global_index(rank: N, offset: N, local_len: N) -> N {
    (rank << log2(local_len)) | offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        // N = 4, P = 2 => L = 8: qubits 0..2 local, qubit 3 selects the rank.
        let local_len = 8;

        assert!(is_local(0, local_len));
        assert!(is_local(2, local_len));
        assert!(!is_local(3, local_len));
        assert_eq!(rank_bit(3, local_len), 0);

        // N = 4, P = 4 => L = 4.
        let local_len = 4;

        assert!(!is_local(2, local_len));
        assert!(!is_local(3, local_len));
        assert_eq!(rank_bit(2, local_len), 0);
        assert_eq!(rank_bit(3, local_len), 1);
        assert!(qubit_of_rank(0b10, 1));
        assert!(!qubit_of_rank(0b10, 0));
    }

    #[test]
    fn split_and_join() {
        let local_len = 8;

        assert_eq!(split_global(0, local_len), (0, 0));
        assert_eq!(split_global(9, local_len), (1, 1));
        assert_eq!(split_global(15, local_len), (1, 7));
        assert_eq!(global_index(1, 1, local_len), 9);

        for idx in 0..16 {
            let (rank, offset) = split_global(idx, local_len);
            assert_eq!(global_index(rank, offset, local_len), idx);
        }
    }

    #[test]
    fn pow2() {
        assert!(is_pow2(1));
        assert!(is_pow2(8));
        assert!(!is_pow2(0));
        assert!(!is_pow2(6));
    }
}
