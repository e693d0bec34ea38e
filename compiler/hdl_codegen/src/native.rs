//! Native module format.
//!
//! A [`NativeModule`] is what code generation hands to the execution
//! engine and what the bitcode artifact stores on disk. Symbols are plain
//! strings (interned [`Name`](hdl_ir::Name)s do not survive a process
//! boundary) and every arithmetic instruction already knows whether it
//! works on integers or reals.

use serde::{Deserialize, Serialize};

/// Register index within one [`NativeFunction`].
pub type Reg = u32;

/// Scalar representation an instruction operates on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    Int,
    Real,
}

/// Range a value must lie in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundsSpec {
    Static { low: i64, high: i64 },
    /// Bounds read from registers at run time.
    Dynamic { low: Reg, high: Reg },
    /// Array value with exactly this many elements.
    Length(u64),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Inst {
    ConstInt { dst: Reg, value: i64 },
    ConstReal { dst: Reg, bits: u64 },
    ConstArray { dst: Reg, elems: Vec<Reg> },
    Add { dst: Reg, kind: ScalarKind, lhs: Reg, rhs: Reg },
    Mul { dst: Reg, kind: ScalarKind, lhs: Reg, rhs: Reg },
    CmpEq { dst: Reg, kind: ScalarKind, lhs: Reg, rhs: Reg },
    Call { dst: Reg, func: String, args: Vec<Reg> },
    Load { dst: Reg, var: u32 },
    Store { src: Reg, var: u32 },
    Assert { value: Reg },
    Bounds { value: Reg, bounds: BoundsSpec },
    Jump { target: u32 },
    Cond { test: Reg, then_block: u32, else_block: u32 },
    Wait { target: u32 },
    Return { value: Option<Reg> },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NativeBlock {
    pub insts: Vec<Inst>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NativeFunction {
    /// Link name the engine resolves calls by.
    pub name: String,
    /// Registers receiving the arguments, in order.
    pub params: Vec<Reg>,
    pub regs: u32,
    pub vars: u32,
    /// Entry block first.
    pub blocks: Vec<NativeBlock>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NativeModule {
    pub name: String,
    pub functions: Vec<NativeFunction>,
}

impl NativeModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    pub fn function(&self, name: &str) -> Option<&NativeFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
