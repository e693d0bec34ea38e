//! The fold driver.
//!
//! ```text
//! call ─► foldable? ─► prepare engine ─► lower thunk ─► codegen ─► link ─► run ─► literal
//!            │              │                 │            │                │
//!            └──────────────┴─────── not folded: original call ────────────┘
//! ```
//!
//! Only conditions the compiler itself guarantees cannot happen surface as
//! [`FoldError`]; everything else leaves the call for run-time evaluation.

use std::sync::Arc;

use hdl_codegen::{NativeCodegen, ThunkLowerer, ThunkLowering, VcodeCodegen};
use hdl_ir::{AstArena, DeclId, DeclKind, NodeId, NodeKind, StringInterner};
use hdl_vcode::Vcode;

use crate::foldable::check_foldable;
use crate::manager::EngineManager;
use crate::materialize::materialize;
use crate::FoldError;

pub struct Folder<'a> {
    engines: &'a EngineManager,
    interner: &'a StringInterner,
    lowering: &'a dyn ThunkLowering,
    codegen: &'a dyn NativeCodegen,
}

impl<'a> Folder<'a> {
    /// A folder using the default lowering and code generator.
    pub fn new(engines: &'a EngineManager, interner: &'a StringInterner) -> Self {
        Self {
            engines,
            interner,
            lowering: &ThunkLowerer,
            codegen: &VcodeCodegen,
        }
    }

    #[must_use]
    pub fn with_lowering(mut self, lowering: &'a dyn ThunkLowering) -> Self {
        self.lowering = lowering;
        self
    }

    #[must_use]
    pub fn with_codegen(mut self, codegen: &'a dyn NativeCodegen) -> Self {
        self.codegen = codegen;
        self
    }

    /// Fold `call` into a literal if possible.
    ///
    /// Returns the new literal node, or `call` itself when it is not
    /// folded.
    pub fn fold(&self, arena: &mut AstArena, call: NodeId) -> Result<NodeId, FoldError> {
        if let Err(reason) = check_foldable(arena, call) {
            tracing::trace!(?reason, "not foldable");
            return Ok(call);
        }

        for decl in callees(arena, call) {
            let DeclKind::Function(func) = &arena.decl(decl).kind else {
                continue;
            };
            if self.engines.prepare(func, self.interner)?.is_none() {
                tracing::debug!(
                    callee = self.interner.lookup(func.name),
                    "callee not available for folding"
                );
                return Ok(call);
            }
        }

        let mut vcode = Vcode::new();
        if self
            .lowering
            .lower_thunk(&mut vcode, arena, self.interner, call)
            .is_none()
        {
            return Ok(call);
        }
        if self.engines.config().optimize_thunks {
            if let Err(err) = vcode.opt() {
                tracing::debug!(%err, "thunk optimisation failed");
                return Ok(call);
            }
        }
        let thunk = self.interner.lookup(vcode.unit_name());
        tracing::trace!(thunk, vcode = %vcode.dump(self.interner), "lowered thunk");

        let module = match self.codegen.generate_native(&vcode, self.interner) {
            Ok(module) => module,
            Err(err) => {
                tracing::debug!(thunk, %err, "thunk code generation failed");
                return Ok(call);
            }
        };
        vcode.close();

        let mut engine = self.engines.handle();
        engine.link(Arc::new(module));
        let Some(entry) = engine.find_function(thunk) else {
            return Err(FoldError::MissingThunk(thunk.to_owned()));
        };
        let value = match engine.run_function(entry, &[]) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(thunk, %err, "thunk faulted");
                return Ok(call);
            }
        };
        drop(engine);
        tracing::trace!(thunk, bits = value.bits(), "thunk result");

        Ok(materialize(arena, call, value).unwrap_or(call))
    }
}

/// Every function called while evaluating `call`, outermost first,
/// including calls hidden behind constant references.
fn callees(arena: &AstArena, call: NodeId) -> Vec<DeclId> {
    let mut out = Vec::new();
    let mut stack = vec![call];
    while let Some(node) = stack.pop() {
        match arena.kind(node) {
            NodeKind::FCall { decl, params } => {
                if !out.contains(decl) {
                    out.push(*decl);
                }
                stack.extend(params.iter().rev());
            }
            NodeKind::Ref { decl } => {
                if let DeclKind::Constant { value: Some(value) } = arena.decl(*decl).kind {
                    stack.push(value);
                }
            }
            NodeKind::Literal(_) | NodeKind::Other => {}
        }
    }
    out
}

#[cfg(test)]
mod tests;
