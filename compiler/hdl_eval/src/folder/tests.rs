use std::sync::Arc;

use hdl_codegen::{CodegenError, NativeModule};
use hdl_ir::{Builtin, DeclKind, Literal, NodeKind};
use hdl_lib::LibraryRegistry;
use hdl_vcode::UnitId;
use pretty_assertions::assert_eq;

use super::*;
use crate::test_support::Design;
use crate::{EngineStats, FoldConfig};

fn manager(config: FoldConfig) -> EngineManager {
    EngineManager::new(Arc::new(LibraryRegistry::new()), config)
}

fn int_value(d: &Design, node: NodeId) -> Option<i64> {
    match d.arena.kind(node) {
        NodeKind::Literal(Literal::Int(v)) => Some(*v),
        _ => None,
    }
}

#[test]
fn adds_two_literals() {
    let mut d = Design::new();
    let plus = d.builtin("+", Builtin::Add, d.integer);
    let (a, b) = (d.int(2), d.int(3));
    let call = d.call(plus, vec![a, b]);

    let engines = manager(FoldConfig::default());
    let folded = Folder::new(&engines, &d.interner)
        .fold(&mut d.arena, call)
        .unwrap();
    assert_ne!(folded, call);
    assert_eq!(int_value(&d, folded), Some(5));
    assert_eq!(d.arena.node_type(folded), d.integer);
    assert_eq!(
        engines.stats(),
        EngineStats {
            engines_created: 1,
            artifacts_loaded: 0,
            modules_linked: 1,
        }
    );
}

#[test]
fn nested_builtins_and_constants() {
    let mut d = Design::new();
    let plus = d.builtin("+", Builtin::Add, d.integer);
    let times = d.builtin("*", Builtin::Mul, d.integer);
    let six = d.int(6);
    let width = d.object("WIDTH", d.integer, DeclKind::Constant { value: Some(six) });
    let seven = d.int(7);
    let product = d.call(times, vec![width, seven]);
    let one = d.int(1);
    let call = d.call(plus, vec![product, one]);

    let engines = manager(FoldConfig::default());
    let folded = Folder::new(&engines, &d.interner)
        .fold(&mut d.arena, call)
        .unwrap();
    assert_eq!(int_value(&d, folded), Some(43));
}

#[test]
fn equality_yields_boolean_literal() {
    let mut d = Design::new();
    let eq = d.builtin("=", Builtin::Eq, d.boolean);
    let (a, b) = (d.int(4), d.int(4));
    let call = d.call(eq, vec![a, b]);

    let engines = manager(FoldConfig::default());
    let folded = Folder::new(&engines, &d.interner)
        .fold(&mut d.arena, call)
        .unwrap();
    let true_lit = d.arena.enum_literal(d.boolean, 1).unwrap();
    assert_eq!(d.arena.kind(folded), &NodeKind::Ref { decl: true_lit });
}

#[test]
fn real_addition() {
    let mut d = Design::new();
    let plus = d.builtin("+", Builtin::Add, d.real);
    let (a, b) = (d.real(0.5), d.real(0.25));
    let call = d.call(plus, vec![a, b]);

    let engines = manager(FoldConfig::default());
    let folded = Folder::new(&engines, &d.interner)
        .fold(&mut d.arena, call)
        .unwrap();
    assert_eq!(d.arena.kind(folded), &NodeKind::Literal(Literal::real(0.75)));
}

#[test]
fn real_overflow_is_not_folded() {
    let mut d = Design::new();
    let times = d.builtin("*", Builtin::Mul, d.real);
    let (a, b) = (d.real(1.0e308), d.real(10.0));
    let call = d.call(times, vec![a, b]);

    let engines = manager(FoldConfig::default());
    let folded = Folder::new(&engines, &d.interner)
        .fold(&mut d.arena, call)
        .unwrap();
    assert_eq!(folded, call);
}

#[test]
fn unfoldable_calls_are_returned_unchanged() {
    let mut d = Design::new();
    let bar = d.function("WORK.PACK.BAR", d.integer);
    let x = d.object("X", d.integer, DeclKind::Signal);
    let with_signal = d.call(bar, vec![x]);

    let baz = d.impure_function("WORK.PACK.BAZ", d.integer);
    let impure = d.call(baz, Vec::new());

    let vec_fn = d.function("WORK.PACK.ZEROS", d.bit_vector);
    let one = d.int(1);
    let aggregate = d.call(vec_fn, vec![one]);

    let engines = manager(FoldConfig::default());
    let folder = Folder::new(&engines, &d.interner);
    let nodes_before = d.arena.node_count();
    for call in [with_signal, impure, aggregate] {
        assert_eq!(folder.fold(&mut d.arena, call).unwrap(), call);
    }
    assert_eq!(d.arena.node_count(), nodes_before);
    // Rejected before the engine is touched.
    assert_eq!(engines.stats(), EngineStats::default());
}

#[test]
fn unavailable_callee_is_not_folded() {
    let mut d = Design::new();
    let f = d.function("WORK.PACK.F", d.integer);
    let one = d.int(1);
    let call = d.call(f, vec![one]);

    let engines = manager(FoldConfig::default());
    let folded = Folder::new(&engines, &d.interner)
        .fold(&mut d.arena, call)
        .unwrap();
    assert_eq!(folded, call);
}

#[test]
fn run_time_fault_is_not_folded() {
    let mut d = Design::new();
    let plus = d.builtin("+", Builtin::Add, d.integer);
    let (a, b) = (d.int(i64::from(i32::MAX)), d.int(1));
    let call = d.call(plus, vec![a, b]);

    let engines = manager(FoldConfig::default());
    let folded = Folder::new(&engines, &d.interner)
        .fold(&mut d.arena, call)
        .unwrap();
    assert_eq!(folded, call);
}

#[test]
fn unsupported_builtin_is_not_folded() {
    let mut d = Design::new();
    let minus = d.builtin("-", Builtin::Sub, d.integer);
    let (a, b) = (d.int(9), d.int(4));
    let call = d.call(minus, vec![a, b]);

    let engines = manager(FoldConfig::default());
    let folded = Folder::new(&engines, &d.interner)
        .fold(&mut d.arena, call)
        .unwrap();
    assert_eq!(folded, call);
}

#[test]
fn folding_is_deterministic() {
    let mut d = Design::new();
    let times = d.builtin("*", Builtin::Mul, d.integer);
    let (a, b) = (d.int(-12), d.int(12));
    let call = d.call(times, vec![a, b]);

    let engines = manager(FoldConfig::default().with_optimize_thunks(false));
    let folder = Folder::new(&engines, &d.interner);
    let first = folder.fold(&mut d.arena, call).unwrap();
    let second = folder.fold(&mut d.arena, call).unwrap();
    assert_ne!(first, second);
    assert_eq!(d.arena.node(first), d.arena.node(second));
    assert_eq!(int_value(&d, first), Some(-144));
}

struct NeverLowers;

impl ThunkLowering for NeverLowers {
    fn lower_thunk(
        &self,
        _: &mut Vcode,
        _: &AstArena,
        _: &StringInterner,
        _: NodeId,
    ) -> Option<UnitId> {
        None
    }
}

#[test]
fn lowering_failure_is_not_folded() {
    let mut d = Design::new();
    let plus = d.builtin("+", Builtin::Add, d.integer);
    let (a, b) = (d.int(1), d.int(1));
    let call = d.call(plus, vec![a, b]);

    let engines = manager(FoldConfig::default());
    let folded = Folder::new(&engines, &d.interner)
        .with_lowering(&NeverLowers)
        .fold(&mut d.arena, call)
        .unwrap();
    assert_eq!(folded, call);
}

struct FailingCodegen;

impl NativeCodegen for FailingCodegen {
    fn generate_native(
        &self,
        _: &Vcode,
        _: &StringInterner,
    ) -> Result<NativeModule, CodegenError> {
        Err(CodegenError::NoUnitSelected)
    }
}

/// Produces a module whose only function is not the thunk.
struct MisnamingCodegen;

impl NativeCodegen for MisnamingCodegen {
    fn generate_native(
        &self,
        vcode: &Vcode,
        interner: &StringInterner,
    ) -> Result<NativeModule, CodegenError> {
        let mut module = VcodeCodegen.generate_native(vcode, interner)?;
        module.functions[0].name.push_str("_renamed");
        Ok(module)
    }
}

#[test]
fn codegen_failure_is_not_folded() {
    let mut d = Design::new();
    let plus = d.builtin("+", Builtin::Add, d.integer);
    let (a, b) = (d.int(1), d.int(1));
    let call = d.call(plus, vec![a, b]);

    let engines = manager(FoldConfig::default());
    let folded = Folder::new(&engines, &d.interner)
        .with_codegen(&FailingCodegen)
        .fold(&mut d.arena, call)
        .unwrap();
    assert_eq!(folded, call);
}

#[test]
fn unresolvable_thunk_is_fatal() {
    let mut d = Design::new();
    let plus = d.builtin("+", Builtin::Add, d.integer);
    let (a, b) = (d.int(1), d.int(1));
    let call = d.call(plus, vec![a, b]);

    let engines = manager(FoldConfig::default());
    let err = Folder::new(&engines, &d.interner)
        .with_codegen(&MisnamingCodegen)
        .fold(&mut d.arena, call)
        .unwrap_err();
    match err {
        FoldError::MissingThunk(name) => assert_eq!(name, "STD.STANDARD.\"+\"$thunk"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn callees_are_listed_outermost_first() {
    let mut d = Design::new();
    let plus = d.builtin("+", Builtin::Add, d.integer);
    let f = d.function("WORK.A.F", d.integer);
    let g = d.function("WORK.B.G", d.integer);
    let one = d.int(1);
    let g_call = d.call(g, vec![one]);
    let hidden = d.object("K", d.integer, DeclKind::Constant { value: Some(g_call) });
    let f_call = d.call(f, vec![hidden]);
    let call = d.call(plus, vec![f_call, g_call]);

    let decl_of = |node| match d.arena.kind(node) {
        NodeKind::FCall { decl, .. } => *decl,
        _ => unreachable!(),
    };
    assert_eq!(
        callees(&d.arena, call),
        vec![decl_of(call), decl_of(f_call), decl_of(g_call)]
    );
}
