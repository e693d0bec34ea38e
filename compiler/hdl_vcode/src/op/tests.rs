use super::*;

#[test]
fn value_ops_report_result() {
    let add = Op::Add {
        result: VReg::new(2),
        lhs: VReg::new(0),
        rhs: VReg::new(1),
    };
    assert_eq!(add.kind(), OpKind::Add);
    assert_eq!(add.result(), VReg::new(2));
    assert_eq!(add.args().as_slice(), &[VReg::new(0), VReg::new(1)]);
    assert!(add.is_pure());
    assert!(!add.is_terminator());
}

#[test]
fn void_ops_have_invalid_result() {
    let store = Op::Store {
        value: VReg::new(4),
        var: VVar::new(0),
    };
    assert!(!store.result().is_valid());
    assert_eq!(store.args().as_slice(), &[VReg::new(4)]);
    assert!(!store.is_pure());
}

#[test]
fn terminators_and_successors() {
    let jump = Op::Jump {
        target: VBlock::new(1),
    };
    let cond = Op::Cond {
        test: VReg::new(0),
        then_block: VBlock::new(1),
        else_block: VBlock::new(2),
    };
    let wait = Op::Wait {
        target: VBlock::new(3),
        time: None,
    };
    let ret = Op::Return { value: None };

    assert!(jump.is_terminator());
    assert!(cond.is_terminator());
    assert!(wait.is_terminator());
    assert!(ret.is_terminator());
    assert_eq!(jump.successors().as_slice(), &[VBlock::new(1)]);
    assert_eq!(
        cond.successors().as_slice(),
        &[VBlock::new(1), VBlock::new(2)]
    );
    assert!(ret.successors().is_empty());
    assert!(wait.args().is_empty());
}

#[test]
fn fcall_is_not_pure() {
    let call = Op::FCall {
        result: VReg::new(1),
        func: Name::from_raw(7),
        ty: VType::new(0),
        args: smallvec![VReg::new(0)],
    };
    assert!(!call.is_pure());
    assert_eq!(call.kind().as_str(), "fcall");
}

#[test]
fn mnemonics() {
    assert_eq!(OpKind::ConstArray.as_str(), "const array");
    assert_eq!(OpKind::Bounds.as_str(), "bounds");
    assert_eq!(Cmp::Eq.as_str(), "==");
}
