//! Shared fixture: a `WORK` library in a temporary directory plus a small
//! elaborated design whose calls the tests fold.

// Each test binary uses a different subset of the fixture.
#![allow(dead_code)]

use std::sync::{Arc, Once};

use hdl_codegen::{write_bitcode, VcodeCodegen};
use hdl_eval::{EngineManager, FoldConfig, FoldError, Folder};
use hdl_ir::{
    AstArena, Builtin, Decl, DeclFlags, DeclId, DeclKind, FuncDecl, Literal, NodeId, NodeKind,
    StringInterner, Type, TypeId, TypeKind,
};
use hdl_lib::{CompiledUnit, Library, LibraryRegistry, UnitKind};
use hdl_vcode::{UnitId, Vcode};
use tempfile::TempDir;

static TRACING_INIT: Once = Once::new();

/// Route `tracing` output through the test harness when `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_test_writer().with_target(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

pub struct Fixture {
    pub arena: AstArena,
    pub interner: StringInterner,
    pub registry: Arc<LibraryRegistry>,
    pub work: Arc<Library>,
    pub integer: TypeId,
    pub natural: TypeId,
    pub real: TypeId,
    pub state: TypeId,
    pub time: TypeId,
    pub word: TypeId,
    // Keeps the library directory alive.
    _dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(LibraryRegistry::new());
        let work = registry.register(Library::new("WORK", dir.path()));

        let interner = StringInterner::new();
        let mut arena = AstArena::new();
        let integer = arena.alloc_type(Type::new(
            interner.intern("INTEGER"),
            TypeKind::Integer {
                low: i64::from(i32::MIN),
                high: i64::from(i32::MAX),
            },
        ));
        let natural = arena.alloc_type(Type::new(
            interner.intern("NATURAL"),
            TypeKind::Integer {
                low: 0,
                high: i64::from(i32::MAX),
            },
        ));
        let real = arena.alloc_type(Type::new(interner.intern("REAL"), TypeKind::Real));
        let state = arena.alloc_enum_type(
            interner.intern("STATE"),
            &[
                interner.intern("IDLE"),
                interner.intern("LOAD"),
                interner.intern("RUN"),
                interner.intern("DONE"),
            ],
        );
        let time = arena.alloc_type(Type::new(
            interner.intern("TIME"),
            TypeKind::Physical {
                low: i64::MIN,
                high: i64::MAX,
            },
        ));
        let word = arena.alloc_type(Type::new(
            interner.intern("WORD"),
            TypeKind::Array {
                elem: state,
                dims: vec![(0, 15)],
            },
        ));

        Self {
            arena,
            interner,
            registry,
            work,
            integer,
            natural,
            real,
            state,
            time,
            word,
            _dir: dir,
        }
    }

    /// An engine manager over this fixture's libraries.
    pub fn engines(&self, config: FoldConfig) -> EngineManager {
        EngineManager::new(self.registry.clone(), config)
    }

    pub fn fold(&mut self, engines: &EngineManager, call: NodeId) -> Result<NodeId, FoldError> {
        Folder::new(engines, &self.interner).fold(&mut self.arena, call)
    }

    /// Declare package `unit` and its body, and write the body's artifact
    /// holding the functions `build` emits.
    pub fn compile_package(
        &self,
        unit: &str,
        build: impl FnOnce(&mut Vcode, &StringInterner) -> Vec<UnitId>,
    ) {
        let body = self.declare_package(unit);
        let mut vcode = Vcode::new();
        let functions = build(&mut vcode, &self.interner);
        let module = VcodeCodegen
            .generate_module(body.name(), &vcode, &functions, &self.interner)
            .unwrap();
        let path = self.work.realpath_of_artifact(&body.artifact_name());
        write_bitcode(&path, &module).unwrap();
    }

    /// Declare package `unit` and its body without writing any artifact.
    pub fn declare_package(&self, unit: &str) -> Arc<CompiledUnit> {
        self.work.put_unit(CompiledUnit::new(unit, UnitKind::Package));
        self.work
            .put_unit(CompiledUnit::new(format!("{unit}-body"), UnitKind::PackageBody))
    }

    pub fn int(&mut self, value: i64) -> NodeId {
        self.arena.alloc_literal(Literal::Int(value), self.integer)
    }

    pub fn builtin(&mut self, op: &str, builtin: Builtin, result: TypeId) -> DeclId {
        let name = self.interner.intern(&format!("STD.STANDARD.\"{op}\""));
        let func = FuncDecl::new(name, result)
            .with_flags(DeclFlags::PREDEFINED)
            .with_builtin(builtin);
        self.arena.alloc_decl(Decl::function(func))
    }

    pub fn function(&mut self, name: &str, mangled: &str, result: TypeId) -> DeclId {
        let func = FuncDecl::new(self.interner.intern(name), result)
            .with_mangled(self.interner.intern(mangled));
        self.arena.alloc_decl(Decl::function(func))
    }

    pub fn impure_function(&mut self, name: &str, mangled: &str, result: TypeId) -> DeclId {
        let func = FuncDecl::new(self.interner.intern(name), result)
            .with_flags(DeclFlags::IMPURE)
            .with_mangled(self.interner.intern(mangled));
        self.arena.alloc_decl(Decl::function(func))
    }

    pub fn signal(&mut self, name: &str, ty: TypeId) -> NodeId {
        let decl = self
            .arena
            .alloc_decl(Decl::new(self.interner.intern(name), ty, DeclKind::Signal));
        self.arena.alloc_ref(decl)
    }

    /// A reference to a constant whose value is `value`.
    pub fn constant(&mut self, name: &str, ty: TypeId, value: NodeId) -> NodeId {
        let decl = self.arena.alloc_decl(Decl::new(
            self.interner.intern(name),
            ty,
            DeclKind::Constant { value: Some(value) },
        ));
        self.arena.alloc_ref(decl)
    }

    pub fn call(&mut self, decl: DeclId, args: Vec<NodeId>) -> NodeId {
        self.arena.alloc_fcall(decl, args)
    }

    /// The integer a folded node holds, if it is an integer literal.
    pub fn int_value(&self, node: NodeId) -> Option<i64> {
        match self.arena.kind(node) {
            NodeKind::Literal(Literal::Int(value)) => Some(*value),
            _ => None,
        }
    }

    /// Name of the enumeration literal a folded node refers to.
    pub fn enum_value(&self, node: NodeId) -> Option<&'static str> {
        match self.arena.kind(node) {
            NodeKind::Ref { decl } => match self.arena.decl(*decl).kind {
                DeclKind::EnumLit { .. } => Some(self.interner.lookup(self.arena.decl(*decl).name)),
                _ => None,
            },
            _ => None,
        }
    }
}
