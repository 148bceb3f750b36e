use super::*;

#[derive(Clone, Copy, PartialEq)]
pub(crate) struct Op {
    phase: C,
}

impl Op {
    #[inline(always)]
    pub fn new(mut phase: R) -> Self {
        phase /= 2.;
        let phase = C::new(phase.cos(), phase.sin());
        Self { phase }
    }
}

impl AtomicOp for Op {
    fn name(&self) -> String {
        format!("RX({})", 2.0 * self.phase.arg())
    }

    fn matrix(&self) -> M1 {
        let cos = C::new(self.phase.re, 0.0);
        let m_i_sin = C::new(0.0, -self.phase.im);
        [cos, m_i_sin, m_i_sin, cos]
    }

    fn this(self) -> AtomicOpDispatch {
        AtomicOpDispatch::RX(self)
    }
}

#[cfg(test)]
#[test]
fn matrix_repr() {
    const ANGLE: R = 1.23456;

    let cos = C::new((0.5 * ANGLE).cos(), 0.0);
    let m_i_sin = C::new(0.0, -(0.5 * ANGLE).sin());

    let op = Op::new(ANGLE);
    assert!(op.name().starts_with("RX("));
    assert_eq!(op.matrix(), [cos, m_i_sin, m_i_sin, cos]);
}
