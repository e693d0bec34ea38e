//! HDL IR - the semantic-layer model seen by elaboration-time folding.
//!
//! This crate contains the data structures the folding engine reads and
//! writes while it walks an elaborated design:
//! - Names for interned identifiers
//! - The AST arena holding nodes, declarations and types
//! - Declaration metadata (purity, builtin marker, mangled link name)
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: Strings → Name(u32)
//! - **Flatten Everything**: No `Box<Node>`, use `NodeId(u32)` indices
//!
//! Parsing and semantic checking live elsewhere; their output is modelled
//! here only as far as folding needs it.

pub mod ast;
mod interner;
mod name;

pub use ast::{
    AstArena, Builtin, Decl, DeclFlags, DeclId, DeclKind, FuncDecl, Literal, Node, NodeId,
    NodeKind, Type, TypeId, TypeKind,
};
pub use interner::{InternError, StringInterner};
pub use name::Name;
