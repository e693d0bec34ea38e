//! Which calls may be evaluated during elaboration.
//!
//! A call is foldable when its result is scalar, its callee is pure and
//! every argument is itself a compile-time value: a literal, a reference
//! to an enumeration literal, physical unit or constant, or a foldable
//! call. A constant with a known value counts only if that value does. The check never touches the engine and is cheap enough to run on
//! every call in the tree.

use hdl_ir::{AstArena, DeclKind, NodeId, NodeKind};

/// Why a node is not foldable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotFoldable {
    NotACall,
    NonScalarResult,
    Impure,
    /// The argument at this position is not a compile-time value.
    Argument(usize),
}

/// `true` if `call` can be folded.
pub fn is_foldable(arena: &AstArena, call: NodeId) -> bool {
    check_foldable(arena, call).is_ok()
}

/// Like [`is_foldable`] but names the first reason for rejection.
pub fn check_foldable(arena: &AstArena, call: NodeId) -> Result<(), NotFoldable> {
    let Some((_, func)) = arena.called_function(call) else {
        return Err(NotFoldable::NotACall);
    };
    if !arena.ty(arena.node_type(call)).is_scalar() {
        return Err(NotFoldable::NonScalarResult);
    }
    if func.is_impure() {
        return Err(NotFoldable::Impure);
    }
    let NodeKind::FCall { params, .. } = arena.kind(call) else {
        return Err(NotFoldable::NotACall);
    };
    match params.iter().position(|&arg| !is_constant_arg(arena, arg)) {
        Some(index) => Err(NotFoldable::Argument(index)),
        None => Ok(()),
    }
}

fn is_constant_arg(arena: &AstArena, arg: NodeId) -> bool {
    match arena.kind(arg) {
        NodeKind::Literal(_) => true,
        NodeKind::FCall { .. } => is_foldable(arena, arg),
        NodeKind::Ref { decl } => match arena.decl(*decl).kind {
            DeclKind::EnumLit { .. } | DeclKind::UnitDecl { .. } => true,
            // Lowering goes through the value, so it must pass the same test.
            DeclKind::Constant { value: Some(value) } => is_constant_arg(arena, value),
            DeclKind::Constant { value: None } => true,
            DeclKind::Signal | DeclKind::Variable | DeclKind::Port | DeclKind::Function(_) => {
                false
            }
        },
        NodeKind::Other => false,
    }
}
