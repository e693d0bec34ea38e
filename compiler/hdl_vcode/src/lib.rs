//! Vcode - a typed, block-structured virtual instruction set.
//!
//! Lowering emits one [`Unit`] per function, process or folding thunk into
//! a [`Vcode`] context. Code generation then consumes the selected unit.
//!
//! - **Types** are interned ([`VType`]); equal structure means equal handle.
//! - **Registers** ([`VReg`]) are defined exactly once, by an operation or a
//!   function parameter.
//! - **Blocks** ([`VBlock`]) end in exactly one terminator: `jump`, `cond`,
//!   `wait` or `return`.
//!
//! The context carries a selection (current unit, current block). Emission
//! calls append to that block and report [`InvalidState`] instead of
//! corrupting a unit when the selection is missing or already terminated.

mod context;
mod dump;
mod error;
mod ids;
mod op;
mod opt;
mod types;
mod unit;
mod verify;

pub use context::Vcode;
pub use error::{InvalidState, VcodeError};
pub use ids::{UnitId, VBlock, VReg, VType, VVar};
pub use op::{ArgList, Cmp, ConstValue, Op, OpKind};
pub use types::{TypeData, VTypeKind};
pub use unit::{Block, Unit, UnitKind, VarInfo};
pub use verify::VerifyError;
