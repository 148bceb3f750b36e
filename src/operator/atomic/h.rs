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
        "H".to_string()
    }

    fn matrix(&self) -> M1 {
        const F: C = C {
            re: FRAC_1_SQRT_2,
            im: 0.0,
        };
        [F, F, F, -F]
    }

    fn this(self) -> AtomicOpDispatch {
        AtomicOpDispatch::H(self)
    }
}

#[cfg(test)]
#[test]
fn matrix_repr() {
    const F: C = C {
        re: FRAC_1_SQRT_2,
        im: 0.0,
    };

    let op = Op::new();
    assert_eq!(op.name(), "H");
    assert_eq!(op.matrix(), [F, F, F, -F]);
}
