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
        "X".to_string()
    }

    fn matrix(&self) -> M1 {
        [C_ZERO, C_ONE, C_ONE, C_ZERO]
    }

    fn this(self) -> AtomicOpDispatch {
        AtomicOpDispatch::X(self)
    }
}

#[cfg(test)]
#[test]
fn matrix_repr() {
    const O: C = C { re: 0.0, im: 0.0 };
    const I: C = C { re: 1.0, im: 0.0 };

    let op = Op::new();
    assert_eq!(op.name(), "X");
    assert_eq!(op.matrix(), [O, I, I, O]);
    assert!(!op.is_diagonal());
}
