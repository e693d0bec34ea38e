//! Elaboration-time folding of calls to pure functions.
//!
//! Given a call whose arguments are all compile-time constants, the
//! [`Folder`] lowers the call into a zero-argument thunk, compiles it,
//! links it into a shared [`ExecutionEngine`] next to the native modules
//! of every library unit it depends on, runs it and replaces the call
//! with a literal of the result.
//!
//! Failure to fold is never an error: the call is left in place for
//! run-time evaluation. The only hard failures ([`FoldError`]) are an
//! unreadable artifact for a unit the library says is compiled, and a
//! symbol that linking should have made available but did not.
//!
//! # Modules
//!
//! - [`foldable`]: which calls are worth attempting
//! - `engine`: the execution engine and its interpreter
//! - `manager`: lazy engine creation and library linking
//! - `folder`: the fold driver
//! - `materialize`: turning a result back into an AST literal

mod config;
mod engine;
mod error;
pub mod foldable;
mod folder;
mod manager;
mod materialize;

#[cfg(test)]
mod test_support;

pub use config::FoldConfig;
pub use engine::{ExecutionEngine, FunctionRef, GenericValue, PLACEHOLDER_MODULE};
pub use error::{ExecError, FoldError};
pub use foldable::{check_foldable, is_foldable, NotFoldable};
pub use folder::Folder;
pub use manager::{EngineHandle, EngineManager, EngineStats};
pub use materialize::materialize;
