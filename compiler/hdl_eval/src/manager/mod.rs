//! Lazily created, shared execution engine and the linking of library
//! units into it.
//!
//! One [`EngineManager`] serves a whole compilation. The engine is built
//! on first use; each external unit's native module is read from its
//! library at most once (the module is cached on the unit) and linked at
//! most once. A single mutex covers both check-then-act sequences.

use std::sync::Arc;

use hdl_codegen::{read_bitcode, NativeModule};
use hdl_ir::{FuncDecl, StringInterner};
use hdl_lib::{naming, LibraryService};
use parking_lot::{Mutex, MutexGuard};

use crate::engine::{ExecutionEngine, FunctionRef, GenericValue};
use crate::{ExecError, FoldConfig, FoldError};

/// Counters describing what the manager has done so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub engines_created: u32,
    pub artifacts_loaded: u32,
    pub modules_linked: u32,
}

#[derive(Default)]
struct EngineState {
    engine: Option<ExecutionEngine>,
    stats: EngineStats,
}

impl EngineState {
    fn engine(&mut self, config: &FoldConfig) -> &mut ExecutionEngine {
        let stats = &mut self.stats;
        self.engine.get_or_insert_with(|| {
            stats.engines_created += 1;
            ExecutionEngine::new(config)
        })
    }
}

pub struct EngineManager {
    libraries: Arc<dyn LibraryService + Send + Sync>,
    config: FoldConfig,
    state: Mutex<EngineState>,
}

impl EngineManager {
    pub fn new(libraries: Arc<dyn LibraryService + Send + Sync>, config: FoldConfig) -> Self {
        Self {
            libraries,
            config,
            state: Mutex::new(EngineState::default()),
        }
    }

    pub fn config(&self) -> &FoldConfig {
        &self.config
    }

    /// Exclusive access to the engine, creating it if needed.
    pub fn handle(&self) -> EngineHandle<'_> {
        let mut state = self.state.lock();
        state.engine(&self.config);
        EngineHandle {
            state,
            config: &self.config,
        }
    }

    /// Make `func` callable from native code.
    ///
    /// Returns `Ok(None)` when the function cannot be made available
    /// (no link name, library or unit not found); the call is then simply
    /// not folded. A unit whose artifact is unreadable or lacks the
    /// promised symbol is an `Err`.
    pub fn prepare(
        &self,
        func: &FuncDecl,
        interner: &StringInterner,
    ) -> Result<Option<EngineHandle<'_>>, FoldError> {
        let mut handle = self.handle();
        if func.is_builtin() {
            return Ok(Some(handle));
        }

        let Some(mangled) = func.mangled else {
            tracing::debug!(func = interner.lookup(func.name), "no link name");
            return Ok(None);
        };
        let mangled = interner.lookup(mangled);
        if handle.find_function(mangled).is_some() {
            return Ok(Some(handle));
        }

        let name = interner.lookup(func.name);
        let (lib_name, unit_name) = (naming::library_of(name), naming::unit_of(name));
        tracing::debug!(func = name, library = lib_name, unit = unit_name, "resolving");

        let Some(library) = self.libraries.find_library(lib_name) else {
            tracing::debug!(library = lib_name, "library not found");
            return Ok(None);
        };
        let Some(mut unit) = library.get_unit(unit_name) else {
            tracing::debug!(unit = unit_name, "unit not found");
            return Ok(None);
        };
        if unit.is_package() {
            let body = naming::body_of(unit_name);
            let Some(body_unit) = library.get_unit(&body) else {
                tracing::debug!(unit = %body, "package body not found");
                return Ok(None);
            };
            unit = body_unit;
        }

        let module = if let Some(module) = unit.native() {
            module
        } else {
            let path = library.realpath_of_artifact(&unit.artifact_name());
            let module = Arc::new(read_bitcode(&path)?);
            handle.state.stats.artifacts_loaded += 1;
            unit.set_native(Arc::clone(&module));
            module
        };
        handle.link(module);

        if handle.find_function(mangled).is_none() {
            return Err(FoldError::MissingSymbol {
                symbol: mangled.to_owned(),
                unit: unit.name().to_owned(),
            });
        }
        Ok(Some(handle))
    }

    pub fn stats(&self) -> EngineStats {
        self.state.lock().stats
    }

    /// Drop the engine and every linked module, and zero the counters.
    ///
    /// Modules cached on library units survive and are relinked on demand.
    pub fn reset(&self) {
        *self.state.lock() = EngineState::default();
        tracing::debug!("execution engine reset");
    }
}

/// Locked access to the shared engine.
pub struct EngineHandle<'a> {
    state: MutexGuard<'a, EngineState>,
    config: &'a FoldConfig,
}

impl EngineHandle<'_> {
    fn engine(&mut self) -> &mut ExecutionEngine {
        self.state.engine(self.config)
    }

    /// Link `module` unless this very module is linked already.
    pub fn link(&mut self, module: Arc<NativeModule>) {
        let engine = self.engine();
        if engine.has_module(&module) {
            return;
        }
        engine.add_module(module);
        self.state.stats.modules_linked += 1;
    }

    pub fn find_function(&mut self, name: &str) -> Option<FunctionRef> {
        self.engine().find_function(name)
    }

    pub fn run_function(
        &mut self,
        f: FunctionRef,
        args: &[GenericValue],
    ) -> Result<GenericValue, ExecError> {
        self.engine().run_function(f, args)
    }
}
