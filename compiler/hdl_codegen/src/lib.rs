//! Code generation gateways used by elaboration-time folding.
//!
//! - [`ThunkLowering`] turns a foldable call into a vcode thunk
//!   ([`ThunkLowerer`] is the default).
//! - [`NativeCodegen`] compiles vcode into a [`NativeModule`]
//!   ([`VcodeCodegen`] is the default).
//! - [`bitcode`] reads and writes the per-unit artifact the general
//!   pipeline leaves in each library directory.
//!
//! Both gateways either succeed or report failure without touching any
//! state other than the vcode context they are handed.

pub mod bitcode;
mod codegen;
mod native;
mod thunk;

pub use bitcode::{read_bitcode, write_bitcode, BitcodeError};
pub use codegen::{CodegenError, NativeCodegen, VcodeCodegen};
pub use native::{BoundsSpec, Inst, NativeBlock, NativeFunction, NativeModule, Reg, ScalarKind};
pub use thunk::{ThunkLowerer, ThunkLowering};
