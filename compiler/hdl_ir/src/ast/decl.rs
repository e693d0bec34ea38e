use bitflags::bitflags;

use super::{NodeId, TypeId};
use crate::Name;

bitflags! {
    /// Attributes the semantic pass attaches to subprogram declarations.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct DeclFlags: u8 {
        /// Declared `impure`: may read or write state outside its arguments.
        const IMPURE = 1 << 0;
        /// Declared in a predefined package (`STD.STANDARD` and friends).
        const PREDEFINED = 1 << 1;
    }
}

/// Operation implemented directly by the compiler rather than compiled
/// from source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Neq,
    Lt,
    Gt,
    Neg,
    Abs,
}

/// Function declaration metadata.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FuncDecl {
    /// Fully qualified name, `LIB.UNIT.FUNC`.
    pub name: Name,
    pub flags: DeclFlags,
    /// Set for intrinsic operations; such callees need no linking.
    pub builtin: Option<Builtin>,
    /// Link-time symbol assigned by the front end.
    pub mangled: Option<Name>,
    pub result: TypeId,
}

impl FuncDecl {
    /// A pure, non-builtin function with no link name yet.
    pub fn new(name: Name, result: TypeId) -> Self {
        Self {
            name,
            flags: DeclFlags::empty(),
            builtin: None,
            mangled: None,
            result,
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: DeclFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_builtin(mut self, builtin: Builtin) -> Self {
        self.builtin = Some(builtin);
        self
    }

    #[must_use]
    pub fn with_mangled(mut self, mangled: Name) -> Self {
        self.mangled = Some(mangled);
        self
    }

    #[inline]
    pub fn is_impure(&self) -> bool {
        self.flags.contains(DeclFlags::IMPURE)
    }

    #[inline]
    pub fn is_builtin(&self) -> bool {
        self.builtin.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeclKind {
    /// Enumeration literal with its position in the type.
    EnumLit { ordinal: u32 },
    /// Physical unit (`ns`, `ps`, ...) as a multiple of the base unit.
    UnitDecl { multiplier: i64 },
    /// Constant; `value` is `None` for a deferred constant whose full
    /// declaration is not visible.
    Constant { value: Option<NodeId> },
    Signal,
    Variable,
    Port,
    Function(FuncDecl),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Decl {
    pub name: Name,
    pub ty: TypeId,
    pub kind: DeclKind,
}

impl Decl {
    pub fn new(name: Name, ty: TypeId, kind: DeclKind) -> Self {
        Self { name, ty, kind }
    }

    /// A function declaration; its type is its result type.
    pub fn function(func: FuncDecl) -> Self {
        Self {
            name: func.name,
            ty: func.result,
            kind: DeclKind::Function(func),
        }
    }
}
