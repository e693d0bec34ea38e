//! A small elaborated design for unit tests.

use hdl_ir::{
    AstArena, Builtin, Decl, DeclFlags, DeclId, DeclKind, FuncDecl, Literal, NodeId, NodeKind,
    StringInterner, Type, TypeId, TypeKind,
};

pub(crate) struct Design {
    pub arena: AstArena,
    pub interner: StringInterner,
    pub integer: TypeId,
    pub real: TypeId,
    pub boolean: TypeId,
    pub time: TypeId,
    pub bit_vector: TypeId,
}

impl Design {
    pub fn new() -> Self {
        let interner = StringInterner::new();
        let mut arena = AstArena::new();
        let integer = arena.alloc_type(Type::new(
            interner.intern("INTEGER"),
            TypeKind::Integer {
                low: i64::from(i32::MIN),
                high: i64::from(i32::MAX),
            },
        ));
        let real = arena.alloc_type(Type::new(interner.intern("REAL"), TypeKind::Real));
        let boolean = arena.alloc_enum_type(
            interner.intern("BOOLEAN"),
            &[interner.intern("FALSE"), interner.intern("TRUE")],
        );
        let time = arena.alloc_type(Type::new(
            interner.intern("TIME"),
            TypeKind::Physical {
                low: i64::MIN,
                high: i64::MAX,
            },
        ));
        let bit = arena.alloc_enum_type(
            interner.intern("BIT"),
            &[interner.intern("'0'"), interner.intern("'1'")],
        );
        let bit_vector = arena.alloc_type(Type::new(
            interner.intern("BIT_VECTOR"),
            TypeKind::Array {
                elem: bit,
                dims: vec![(0, 7)],
            },
        ));
        Self {
            arena,
            interner,
            integer,
            real,
            boolean,
            time,
            bit_vector,
        }
    }

    pub fn int(&mut self, value: i64) -> NodeId {
        self.arena.alloc_literal(Literal::Int(value), self.integer)
    }

    pub fn real(&mut self, value: f64) -> NodeId {
        self.arena.alloc_literal(Literal::real(value), self.real)
    }

    pub fn builtin(&mut self, op: &str, builtin: Builtin, result: TypeId) -> DeclId {
        let name = self.interner.intern(&format!("STD.STANDARD.\"{op}\""));
        let func = FuncDecl::new(name, result)
            .with_flags(DeclFlags::PREDEFINED)
            .with_builtin(builtin);
        self.arena.alloc_decl(Decl::function(func))
    }

    /// A pure function linked under `<name>()`.
    pub fn function(&mut self, name: &str, result: TypeId) -> DeclId {
        let func = FuncDecl::new(self.interner.intern(name), result)
            .with_mangled(self.interner.intern(&format!("{name}()")));
        self.arena.alloc_decl(Decl::function(func))
    }

    pub fn impure_function(&mut self, name: &str, result: TypeId) -> DeclId {
        let func = FuncDecl::new(self.interner.intern(name), result)
            .with_flags(DeclFlags::IMPURE)
            .with_mangled(self.interner.intern(&format!("{name}()")));
        self.arena.alloc_decl(Decl::function(func))
    }

    pub fn object(&mut self, name: &str, ty: TypeId, kind: DeclKind) -> NodeId {
        let decl = self
            .arena
            .alloc_decl(Decl::new(self.interner.intern(name), ty, kind));
        self.arena.alloc_ref(decl)
    }

    pub fn call(&mut self, decl: DeclId, args: Vec<NodeId>) -> NodeId {
        self.arena.alloc_fcall(decl, args)
    }

    pub fn other(&mut self, ty: TypeId) -> NodeId {
        self.arena
            .alloc_node(hdl_ir::Node::new(NodeKind::Other, ty))
    }
}
