use hdl_ir::{Decl, FuncDecl, Type, TypeKind};
use hdl_vcode::{ConstValue, Op, OpKind};
use pretty_assertions::assert_eq;

use super::*;

struct Fixture {
    arena: AstArena,
    interner: StringInterner,
    int: TypeId,
}

impl Fixture {
    fn new() -> Self {
        let interner = StringInterner::new();
        let mut arena = AstArena::new();
        let int = arena.alloc_type(Type::new(
            interner.intern("INTEGER"),
            TypeKind::Integer {
                low: -1000,
                high: 1000,
            },
        ));
        Self {
            arena,
            interner,
            int,
        }
    }

    fn int_lit(&mut self, value: i64) -> NodeId {
        self.arena.alloc_literal(Literal::Int(value), self.int)
    }

    fn builtin(&mut self, name: &str, builtin: Builtin, result: TypeId) -> hdl_ir::DeclId {
        let func = FuncDecl::new(self.interner.intern(name), result).with_builtin(builtin);
        self.arena.alloc_decl(Decl::function(func))
    }

    fn function(&mut self, name: &str, mangled: Option<&str>, result: TypeId) -> hdl_ir::DeclId {
        let mut func = FuncDecl::new(self.interner.intern(name), result);
        if let Some(mangled) = mangled {
            func = func.with_mangled(self.interner.intern(mangled));
        }
        self.arena.alloc_decl(Decl::function(func))
    }

    fn lower(&self, vcode: &mut Vcode, call: NodeId) -> Option<UnitId> {
        ThunkLowerer.lower_thunk(vcode, &self.arena, &self.interner, call)
    }
}

fn op_kinds(vcode: &Vcode) -> Vec<OpKind> {
    (0..vcode.count_ops()).map(|i| vcode.op(i).kind()).collect()
}

#[test]
fn builtin_add_is_inlined() {
    let mut fx = Fixture::new();
    let plus = fx.builtin("STD.STANDARD.\"+\"", Builtin::Add, fx.int);
    let a = fx.int_lit(2);
    let b = fx.int_lit(3);
    let call = fx.arena.alloc_fcall(plus, vec![a, b]);

    let mut vcode = Vcode::new();
    let unit = fx.lower(&mut vcode, call).unwrap();
    assert_eq!(vcode.selected_unit(), Some(unit));
    assert_eq!(
        fx.interner.lookup(vcode.unit_name()),
        "STD.STANDARD.\"+\"$thunk"
    );
    assert_eq!(
        op_kinds(&vcode),
        vec![
            OpKind::Const,
            OpKind::Const,
            OpKind::Add,
            OpKind::Bounds,
            OpKind::Return
        ]
    );
    assert_eq!(vcode.verify(unit), Ok(()));
}

#[test]
fn user_function_becomes_fcall() {
    let mut fx = Fixture::new();
    let color = fx.arena.alloc_enum_type(
        fx.interner.intern("COLOR"),
        &[
            fx.interner.intern("RED"),
            fx.interner.intern("GREEN"),
            fx.interner.intern("BLUE"),
        ],
    );
    let next = fx.function("WORK.PACK.NEXT", Some("WORK.PACK.NEXT(E)E"), color);
    let Some(green) = fx.arena.enum_literal(color, 1) else {
        panic!("GREEN missing");
    };
    let arg = fx.arena.alloc_ref(green);
    let call = fx.arena.alloc_fcall(next, vec![arg]);

    let mut vcode = Vcode::new();
    fx.lower(&mut vcode, call).unwrap();
    assert_eq!(
        op_kinds(&vcode),
        vec![OpKind::Const, OpKind::FCall, OpKind::Bounds, OpKind::Return]
    );
    match vcode.op(1) {
        Op::FCall { func, args, .. } => {
            assert_eq!(fx.interner.lookup(*func), "WORK.PACK.NEXT(E)E");
            assert_eq!(args.len(), 1);
        }
        other => panic!("expected fcall, got {other:?}"),
    }
    match vcode.op(0) {
        Op::Const { value, .. } => assert_eq!(*value, ConstValue::Int(1)),
        other => panic!("expected const, got {other:?}"),
    }
}

#[test]
fn constant_reference_lowers_through_value() {
    let mut fx = Fixture::new();
    let seven = fx.int_lit(7);
    let width = fx.arena.alloc_decl(Decl::new(
        fx.interner.intern("WIDTH"),
        fx.int,
        DeclKind::Constant { value: Some(seven) },
    ));
    let times = fx.builtin("STD.STANDARD.\"*\"", Builtin::Mul, fx.int);
    let lhs = fx.arena.alloc_ref(width);
    let rhs = fx.int_lit(6);
    let call = fx.arena.alloc_fcall(times, vec![lhs, rhs]);

    let mut vcode = Vcode::new();
    fx.lower(&mut vcode, call).unwrap();
    assert_eq!(
        vcode.op(0),
        &Op::Const {
            result: VReg::new(0),
            value: ConstValue::Int(7),
        }
    );
    assert_eq!(vcode.op(2).kind(), OpKind::Mul);
}

#[test]
fn real_result_has_no_bounds_check() {
    let mut fx = Fixture::new();
    let real = fx
        .arena
        .alloc_type(Type::new(fx.interner.intern("REAL"), TypeKind::Real));
    let plus = fx.builtin("STD.STANDARD.\"+\"", Builtin::Add, real);
    let a = fx.arena.alloc_literal(Literal::real(0.25), real);
    let b = fx.arena.alloc_literal(Literal::real(0.5), real);
    let call = fx.arena.alloc_fcall(plus, vec![a, b]);

    let mut vcode = Vcode::new();
    fx.lower(&mut vcode, call).unwrap();
    assert_eq!(
        op_kinds(&vcode),
        vec![OpKind::Const, OpKind::Const, OpKind::Add, OpKind::Return]
    );
}

#[test]
fn failed_lowering_leaves_nothing_selected() {
    let mut fx = Fixture::new();
    let deferred = fx.arena.alloc_decl(Decl::new(
        fx.interner.intern("LATER"),
        fx.int,
        DeclKind::Constant { value: None },
    ));
    let f = fx.function("WORK.PACK.F", Some("WORK.PACK.F(I)I"), fx.int);
    let arg = fx.arena.alloc_ref(deferred);
    let call = fx.arena.alloc_fcall(f, vec![arg]);

    let mut vcode = Vcode::new();
    assert_eq!(fx.lower(&mut vcode, call), None);
    assert_eq!(vcode.selected_unit(), None);
}

#[test]
fn unsupported_builtin() {
    let mut fx = Fixture::new();
    let minus = fx.builtin("STD.STANDARD.\"-\"", Builtin::Sub, fx.int);
    let a = fx.int_lit(5);
    let b = fx.int_lit(1);
    let call = fx.arena.alloc_fcall(minus, vec![a, b]);
    assert_eq!(fx.lower(&mut Vcode::new(), call), None);
}

#[test]
fn callee_without_link_name() {
    let mut fx = Fixture::new();
    let f = fx.function("WORK.PACK.G", None, fx.int);
    let call = fx.arena.alloc_fcall(f, Vec::new());
    assert_eq!(fx.lower(&mut Vcode::new(), call), None);
}

#[test]
fn non_call_is_not_lowered() {
    let mut fx = Fixture::new();
    let lit = fx.int_lit(1);
    assert_eq!(fx.lower(&mut Vcode::new(), lit), None);
}
