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
        format!("RZ({})", 2.0 * self.phase.arg())
    }

    fn matrix(&self) -> M1 {
        [self.phase.conj(), C_ZERO, C_ZERO, self.phase]
    }

    fn is_diagonal(&self) -> bool {
        true
    }

    fn this(self) -> AtomicOpDispatch {
        AtomicOpDispatch::RZ(self)
    }
}

#[cfg(test)]
#[test]
fn matrix_repr() {
    const ANGLE: R = 1.23456;

    const O: C = C { re: 0.0, im: 0.0 };
    let exp = C::new((0.5 * ANGLE).cos(), (0.5 * ANGLE).sin());

    let op = Op::new(ANGLE);
    assert!(op.name().starts_with("RZ("));
    assert_eq!(op.matrix(), [exp.conj(), O, O, exp]);
    assert!(op.is_diagonal());
}
