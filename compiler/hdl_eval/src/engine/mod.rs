//! Native execution engine.
//!
//! Linked [`NativeModule`]s form one symbol space. A function name
//! resolves to the most recently linked definition, so a thunk recompiled
//! under an existing name replaces the old one. Modules are never
//! unlinked.

mod interp;
mod value;

use std::sync::Arc;

use hdl_codegen::{NativeFunction, NativeModule};
use rustc_hash::FxHashMap;

use crate::{ExecError, FoldConfig};

pub use value::GenericValue;

/// A resolved function: module slot and function index within it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FunctionRef {
    module: u32,
    index: u32,
}

/// Name of the empty module every engine starts with.
pub const PLACEHOLDER_MODULE: &str = "dummy";

pub struct ExecutionEngine {
    modules: Vec<Arc<NativeModule>>,
    symbols: FxHashMap<String, FunctionRef>,
    max_call_depth: usize,
    max_steps: u64,
}

impl ExecutionEngine {
    /// An engine bound to an empty placeholder module.
    pub fn new(config: &FoldConfig) -> Self {
        tracing::debug!(
            max_call_depth = config.max_call_depth,
            max_steps = config.max_steps,
            "creating execution engine"
        );
        Self {
            modules: vec![Arc::new(NativeModule::new(PLACEHOLDER_MODULE))],
            symbols: FxHashMap::default(),
            max_call_depth: config.max_call_depth,
            max_steps: config.max_steps,
        }
    }

    /// Make every function of `module` resolvable.
    pub fn add_module(&mut self, module: Arc<NativeModule>) {
        let slot = u32::try_from(self.modules.len()).unwrap_or(u32::MAX);
        for (index, function) in (0u32..).zip(&module.functions) {
            self.symbols.insert(
                function.name.clone(),
                FunctionRef {
                    module: slot,
                    index,
                },
            );
        }
        tracing::debug!(
            module = %module.name,
            functions = module.functions.len(),
            "linked module"
        );
        self.modules.push(module);
    }

    /// `true` if this exact module (not merely one of the same name) is
    /// linked.
    pub fn has_module(&self, module: &Arc<NativeModule>) -> bool {
        self.modules.iter().any(|m| Arc::ptr_eq(m, module))
    }

    /// Linked modules, the placeholder included.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn find_function(&self, name: &str) -> Option<FunctionRef> {
        self.symbols.get(name).copied()
    }

    pub(crate) fn function(&self, f: FunctionRef) -> &NativeFunction {
        &self.modules[f.module as usize].functions[f.index as usize]
    }

    /// Run `f` to completion on the calling thread.
    pub fn run_function(
        &self,
        f: FunctionRef,
        args: &[GenericValue],
    ) -> Result<GenericValue, ExecError> {
        interp::Interpreter::new(self).run(f, args)
    }
}
