use super::*;

#[derive(Clone, Copy, Eq, PartialEq)]
pub(crate) struct Op;

impl Op {
    #[inline(always)]
    pub fn new() -> Self {
        Self
    }
}

impl AtomicOp for Op {
    fn name(&self) -> String {
        "T".to_string()
    }

    fn matrix(&self) -> M1 {
        // e^{i pi/4}
        const PHASE: C = C {
            re: FRAC_1_SQRT_2,
            im: FRAC_1_SQRT_2,
        };
        [C_ONE, C_ZERO, C_ZERO, PHASE]
    }

    fn is_diagonal(&self) -> bool {
        true
    }

    fn this(self) -> AtomicOpDispatch {
        AtomicOpDispatch::T(self)
    }
}

#[cfg(test)]
#[test]
fn matrix_repr() {
    let op = Op::new();
    let m = op.matrix();

    assert_eq!(op.name(), "T");
    // T squared is S.
    let t2 = m[3] * m[3];
    assert!((t2.re - 0.0).abs() < 1e-15 && (t2.im - 1.0).abs() < 1e-15);
    assert!(op.is_diagonal());
}
