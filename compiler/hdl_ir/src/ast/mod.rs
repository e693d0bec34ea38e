//! AST arena: the elaborated tree the folder reads and rewrites.
//!
//! Nodes, declarations and types live in flat arenas addressed by 32-bit
//! handles. Folding never mutates an existing node; it allocates the
//! replacement literal and hands back its [`NodeId`].

mod decl;
mod node;
mod types;

pub use decl::{Builtin, Decl, DeclFlags, DeclKind, FuncDecl};
pub use node::{Literal, Node, NodeKind};
pub use types::{Type, TypeKind};

use crate::Name;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Sentinel for "no handle".
            pub const NONE: Self = Self(u32::MAX);

            /// Create a handle from a raw index.
            #[inline]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Get the raw `u32` value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Get the index as `usize` (for indexing into `Vec`s).
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Returns `false` for the [`NONE`](Self::NONE) sentinel.
            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }
        }
    };
}

arena_id!(
    /// Handle to a [`Node`] in an [`AstArena`].
    NodeId
);
arena_id!(
    /// Handle to a [`Decl`] in an [`AstArena`].
    DeclId
);
arena_id!(
    /// Handle to a [`Type`] in an [`AstArena`].
    TypeId
);

fn next_raw(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("{what} count exceeds u32::MAX"))
}

/// Flat storage for an elaborated design.
#[derive(Clone, Debug, Default)]
pub struct AstArena {
    nodes: Vec<Node>,
    decls: Vec<Decl>,
    types: Vec<Type>,
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }

    // Allocation

    pub fn alloc_node(&mut self, node: Node) -> NodeId {
        let id = NodeId::new(next_raw(self.nodes.len(), "node"));
        self.nodes.push(node);
        id
    }

    pub fn alloc_decl(&mut self, decl: Decl) -> DeclId {
        let id = DeclId::new(next_raw(self.decls.len(), "declaration"));
        self.decls.push(decl);
        id
    }

    pub fn alloc_type(&mut self, ty: Type) -> TypeId {
        let id = TypeId::new(next_raw(self.types.len(), "type"));
        self.types.push(ty);
        id
    }

    /// Allocate a literal node of the given type.
    pub fn alloc_literal(&mut self, value: Literal, ty: TypeId) -> NodeId {
        self.alloc_node(Node::new(NodeKind::Literal(value), ty))
    }

    /// Allocate a reference to `decl`, typed by the declaration's type.
    pub fn alloc_ref(&mut self, decl: DeclId) -> NodeId {
        let ty = self.decl(decl).ty;
        self.alloc_node(Node::new(NodeKind::Ref { decl }, ty))
    }

    /// Allocate a call of function `decl`, typed by its result type.
    ///
    /// # Panics
    ///
    /// Panics if `decl` is not a function declaration.
    pub fn alloc_fcall(&mut self, decl: DeclId, params: Vec<NodeId>) -> NodeId {
        let ty = match &self.decl(decl).kind {
            DeclKind::Function(func) => func.result,
            other => panic!("call target {decl:?} is not a function: {other:?}"),
        };
        self.alloc_node(Node::new(NodeKind::FCall { decl, params }, ty))
    }

    /// Allocate an enumeration type together with its literal declarations.
    ///
    /// Literal ordinals follow the order of `literals`.
    pub fn alloc_enum_type(&mut self, name: Name, literals: &[Name]) -> TypeId {
        let ty = self.alloc_type(Type::new(name, TypeKind::Enum { literals: Vec::new() }));
        let decls: Vec<DeclId> = literals
            .iter()
            .zip(0u32..)
            .map(|(&lit, ordinal)| {
                self.alloc_decl(Decl::new(lit, ty, DeclKind::EnumLit { ordinal }))
            })
            .collect();
        self.types[ty.index()].kind = TypeKind::Enum { literals: decls };
        ty
    }

    // Access

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        debug_assert!(
            id.index() < self.nodes.len(),
            "NodeId {} out of bounds (have {} nodes)",
            id.raw(),
            self.nodes.len(),
        );
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// Static type of a node.
    #[inline]
    pub fn node_type(&self, id: NodeId) -> TypeId {
        self.node(id).ty
    }

    #[inline]
    pub fn decl(&self, id: DeclId) -> &Decl {
        debug_assert!(
            id.index() < self.decls.len(),
            "DeclId {} out of bounds (have {} declarations)",
            id.raw(),
            self.decls.len(),
        );
        &self.decls[id.index()]
    }

    #[inline]
    pub fn ty(&self, id: TypeId) -> &Type {
        debug_assert!(
            id.index() < self.types.len(),
            "TypeId {} out of bounds (have {} types)",
            id.raw(),
            self.types.len(),
        );
        &self.types[id.index()]
    }

    /// The function declaration called by `id`, if `id` is a call.
    pub fn called_function(&self, id: NodeId) -> Option<(DeclId, &FuncDecl)> {
        match self.kind(id) {
            NodeKind::FCall { decl, .. } => match &self.decl(*decl).kind {
                DeclKind::Function(func) => Some((*decl, func)),
                _ => None,
            },
            _ => None,
        }
    }

    /// The literal declaration with `ordinal` in enumeration type `ty`.
    pub fn enum_literal(&self, ty: TypeId, ordinal: u64) -> Option<DeclId> {
        match &self.ty(ty).kind {
            TypeKind::Enum { literals } => usize::try_from(ordinal)
                .ok()
                .and_then(|i| literals.get(i).copied()),
            _ => None,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
