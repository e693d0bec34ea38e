//! Lowering a foldable call into a thunk unit.
//!
//! A thunk is a zero-argument, single-block unit that recomputes the call
//! and returns its value. Builtin `+`, `*` and `=` are expanded inline;
//! any other callee becomes a call to its link name, which the execution
//! engine must already be able to resolve.

use hdl_ir::{AstArena, Builtin, DeclKind, Literal, NodeId, NodeKind, StringInterner, TypeId};
use hdl_vcode::{Cmp, UnitId, VReg, VType, Vcode, VcodeError};

/// Produces thunk units for foldable calls.
pub trait ThunkLowering {
    /// Lower `call` into a new thunk, left selected in `vcode`.
    ///
    /// Returns `None` when some part of the call has no lowering; `vcode`
    /// then holds no trace of the attempt.
    fn lower_thunk(
        &self,
        vcode: &mut Vcode,
        arena: &AstArena,
        interner: &StringInterner,
        call: NodeId,
    ) -> Option<UnitId>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ThunkLowerer;

impl ThunkLowering for ThunkLowerer {
    fn lower_thunk(
        &self,
        vcode: &mut Vcode,
        arena: &AstArena,
        interner: &StringInterner,
        call: NodeId,
    ) -> Option<UnitId> {
        let (_, func) = arena.called_function(call)?;
        let name = interner.intern(&format!("{}$thunk", interner.lookup(func.name)));
        let unit = vcode.emit_thunk(name);

        let mut builder = ThunkBuilder { vcode, arena };
        match builder.build(call) {
            Ok(()) => Some(unit),
            Err(Unsupported(what)) => {
                tracing::debug!(thunk = interner.lookup(name), what, "cannot lower thunk");
                vcode.close();
                None
            }
        }
    }
}

/// Reason a call has no thunk lowering.
struct Unsupported(&'static str);

impl From<VcodeError> for Unsupported {
    fn from(_: VcodeError) -> Self {
        Unsupported("invalid vcode state")
    }
}

struct ThunkBuilder<'a> {
    vcode: &'a mut Vcode,
    arena: &'a AstArena,
}

impl ThunkBuilder<'_> {
    fn build(&mut self, call: NodeId) -> Result<(), Unsupported> {
        let result = self.lower(call)?;
        let ty = self.arena.ty(self.arena.node_type(call));
        if let Some((low, high)) = ty.discrete_range() {
            let bounds = self.vcode.vtype_int(low, high);
            self.vcode.emit_bounds(result, bounds)?;
        }
        self.vcode.emit_return(Some(result))?;
        Ok(())
    }

    fn vtype(&mut self, ty: TypeId) -> Result<VType, Unsupported> {
        let ty = self.arena.ty(ty);
        if let Some((low, high)) = ty.discrete_range() {
            Ok(self.vcode.vtype_int(low, high))
        } else if ty.is_real() {
            Ok(self.vcode.vtype_real())
        } else {
            Err(Unsupported("non-scalar type"))
        }
    }

    fn lower(&mut self, node: NodeId) -> Result<VReg, Unsupported> {
        let arena = self.arena;
        match arena.kind(node) {
            NodeKind::Literal(Literal::Int(value)) => {
                let ty = self.vtype(arena.node_type(node))?;
                Ok(self.vcode.emit_const(ty, *value)?)
            }
            NodeKind::Literal(Literal::Real(bits)) => {
                Ok(self.vcode.emit_const_real(f64::from_bits(*bits))?)
            }
            NodeKind::Ref { decl } => match &arena.decl(*decl).kind {
                DeclKind::EnumLit { ordinal } => {
                    let ty = self.vtype(arena.node_type(node))?;
                    Ok(self.vcode.emit_const(ty, i64::from(*ordinal))?)
                }
                DeclKind::UnitDecl { multiplier } => {
                    let ty = self.vtype(arena.node_type(node))?;
                    Ok(self.vcode.emit_const(ty, *multiplier)?)
                }
                DeclKind::Constant { value: Some(value) } => self.lower(*value),
                DeclKind::Constant { value: None } => Err(Unsupported("deferred constant")),
                DeclKind::Signal
                | DeclKind::Variable
                | DeclKind::Port
                | DeclKind::Function(_) => Err(Unsupported("non-constant reference")),
            },
            NodeKind::FCall { params, .. } => self.lower_call(node, params),
            NodeKind::Other => Err(Unsupported("expression kind")),
        }
    }

    fn lower_call(&mut self, node: NodeId, params: &[NodeId]) -> Result<VReg, Unsupported> {
        let arena = self.arena;
        let (_, func) = arena
            .called_function(node)
            .ok_or(Unsupported("call of a non-function"))?;

        if let Some(builtin) = func.builtin {
            let [lhs, rhs] = params else {
                return Err(Unsupported("builtin arity"));
            };
            let lhs = self.lower(*lhs)?;
            let rhs = self.lower(*rhs)?;
            return Ok(match builtin {
                Builtin::Add => self.vcode.emit_add(lhs, rhs)?,
                Builtin::Mul => self.vcode.emit_mul(lhs, rhs)?,
                Builtin::Eq => self.vcode.emit_cmp(Cmp::Eq, lhs, rhs)?,
                Builtin::Sub
                | Builtin::Div
                | Builtin::Neq
                | Builtin::Lt
                | Builtin::Gt
                | Builtin::Neg
                | Builtin::Abs => return Err(Unsupported("builtin operator")),
            });
        }

        let mangled = func.mangled.ok_or(Unsupported("callee without link name"))?;
        let args = params
            .iter()
            .map(|&param| self.lower(param))
            .collect::<Result<Vec<_>, _>>()?;
        let ty = self.vtype(arena.node_type(node))?;
        Ok(self.vcode.emit_fcall(mangled, ty, &args)?)
    }
}

#[cfg(test)]
mod tests;
