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
        "S".to_string()
    }

    fn matrix(&self) -> M1 {
        [C_ONE, C_ZERO, C_ZERO, C_IMAG]
    }

    fn is_diagonal(&self) -> bool {
        true
    }

    fn this(self) -> AtomicOpDispatch {
        AtomicOpDispatch::S(self)
    }
}

#[cfg(test)]
#[test]
fn matrix_repr() {
    const O: C = C { re: 0.0, im: 0.0 };
    const I: C = C { re: 1.0, im: 0.0 };
    const IM: C = C { re: 0.0, im: 1.0 };

    let op = Op::new();
    assert_eq!(op.name(), "S");
    assert_eq!(op.matrix(), [I, O, O, IM]);
    assert!(op.is_diagonal());
}
