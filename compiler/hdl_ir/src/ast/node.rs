use super::{DeclId, NodeId, TypeId};

/// Literal value carried by a [`NodeKind::Literal`] node.
///
/// Reals are stored as `f64` bits so the node stays `Eq + Hash`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Literal {
    Int(i64),
    Real(u64),
}

impl Literal {
    pub fn real(value: f64) -> Self {
        Literal::Real(value.to_bits())
    }

    pub fn as_real(self) -> Option<f64> {
        match self {
            Literal::Real(bits) => Some(f64::from_bits(bits)),
            Literal::Int(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Literal(Literal),
    /// Function call, including predefined operators written infix.
    FCall { decl: DeclId, params: Vec<NodeId> },
    /// Name reference to a declaration.
    Ref { decl: DeclId },
    /// Aggregates, attribute names and everything else the folder leaves alone.
    Other,
}

/// A node in the [`AstArena`](super::AstArena) with its static type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Node {
    pub kind: NodeKind,
    pub ty: TypeId,
}

impl Node {
    pub fn new(kind: NodeKind, ty: TypeId) -> Self {
        Self { kind, ty }
    }
}
