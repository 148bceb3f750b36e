use std::fmt;

use crate::math::{Mask, N};

/// [`Classical register`](CReg)
///
/// Holds the outcomes of projective measurements, one bit per classical
/// slot. Slots that were never written read as `None`; re-measuring into a
/// slot overwrites it.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CReg {
    value: Mask,
    written: Mask,
}

impl CReg {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest usable slot index.
    pub const MAX_SLOT: N = Mask::BITS as N - 1;

    pub fn set(&mut self, slot: N, bit: bool) {
        let mask = 1 << slot;
        self.written |= mask;
        if bit {
            self.value |= mask;
        } else {
            self.value &= !mask;
        }
    }

    pub fn get(&self, slot: N) -> Option<bool> {
        if slot > Self::MAX_SLOT || self.written & (1 << slot) == 0 {
            None
        } else {
            Some(self.value & (1 << slot) != 0)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// Written slots in ascending order.
    pub fn results(&self) -> impl Iterator<Item = (N, bool)> + '_ {
        (0..=Self::MAX_SLOT)
            .filter(move |slot| self.written & (1 << slot) != 0)
            .map(move |slot| (slot, self.value & (1 << slot) != 0))
    }
}

impl fmt::Debug for CReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.results().map(|(slot, bit)| (slot, bit as u8)))
            .finish()
    }
}
