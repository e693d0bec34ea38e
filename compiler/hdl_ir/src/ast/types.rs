use super::{DeclId, TypeId};
use crate::Name;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Integer { low: i64, high: i64 },
    Physical { low: i64, high: i64 },
    Real,
    /// Literal declarations in ordinal order.
    Enum { literals: Vec<DeclId> },
    Array { elem: TypeId, dims: Vec<(i64, i64)> },
    Record { fields: Vec<(Name, TypeId)> },
    Access { designated: TypeId },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Type {
    pub name: Name,
    pub kind: TypeKind,
}

impl Type {
    pub fn new(name: Name, kind: TypeKind) -> Self {
        Self { name, kind }
    }

    /// Enumeration, integer, physical or real.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Integer { .. }
                | TypeKind::Physical { .. }
                | TypeKind::Real
                | TypeKind::Enum { .. }
        )
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum { .. })
    }

    /// Integer or physical: both fold to integer literals.
    pub fn is_integer_like(&self) -> bool {
        matches!(self.kind, TypeKind::Integer { .. } | TypeKind::Physical { .. })
    }

    pub fn is_real(&self) -> bool {
        matches!(self.kind, TypeKind::Real)
    }

    /// Inclusive value range of a discrete type; enumerations span their
    /// ordinals.
    pub fn discrete_range(&self) -> Option<(i64, i64)> {
        match &self.kind {
            TypeKind::Integer { low, high } | TypeKind::Physical { low, high } => {
                Some((*low, *high))
            }
            TypeKind::Enum { literals } => {
                let count = i64::try_from(literals.len()).ok()?;
                Some((0, count - 1))
            }
            _ => None,
        }
    }
}
