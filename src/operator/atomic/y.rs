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
        "Y".to_string()
    }

    fn matrix(&self) -> M1 {
        [C_ZERO, -C_IMAG, C_IMAG, C_ZERO]
    }

    fn this(self) -> AtomicOpDispatch {
        AtomicOpDispatch::Y(self)
    }
}

#[cfg(test)]
#[test]
fn matrix_repr() {
    const O: C = C { re: 0.0, im: 0.0 };
    const I: C = C { re: 0.0, im: 1.0 };

    let op = Op::new();
    assert_eq!(op.name(), "Y");
    assert_eq!(op.matrix(), [O, -I, I, O]);
}
