//! Vcode operations.
//!
//! Each opcode is its own variant carrying only the fields it needs.
//! Value-producing operations name their fresh result register; the
//! registers they read are reported by [`Op::args`].

use hdl_ir::Name;
use smallvec::{smallvec, SmallVec};

use crate::{VBlock, VReg, VType, VVar};

/// Comparison kind for [`Op::Cmp`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cmp {
    Eq,
}

impl Cmp {
    pub fn as_str(self) -> &'static str {
        match self {
            Cmp::Eq => "==",
        }
    }
}

/// Literal payload of [`Op::Const`]. Reals are kept as bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstValue {
    Int(i64),
    Real(u64),
}

/// Opcode tag, one per [`Op`] variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    Cmp,
    FCall,
    Wait,
    Const,
    Assert,
    Jump,
    Load,
    Store,
    Mul,
    Add,
    Bounds,
    Comment,
    ConstArray,
    Return,
    Cond,
}

impl OpKind {
    /// Mnemonic used by the dump format.
    pub fn as_str(self) -> &'static str {
        match self {
            OpKind::Cmp => "cmp",
            OpKind::FCall => "fcall",
            OpKind::Wait => "wait",
            OpKind::Const => "const",
            OpKind::Assert => "assert",
            OpKind::Jump => "jump",
            OpKind::Load => "load",
            OpKind::Store => "store",
            OpKind::Mul => "mul",
            OpKind::Add => "add",
            OpKind::Bounds => "bounds",
            OpKind::Comment => "comment",
            OpKind::ConstArray => "const array",
            OpKind::Return => "return",
            OpKind::Cond => "cond",
        }
    }
}

pub type ArgList = SmallVec<[VReg; 4]>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    Cmp {
        result: VReg,
        cmp: Cmp,
        lhs: VReg,
        rhs: VReg,
    },
    FCall {
        result: VReg,
        func: Name,
        ty: VType,
        args: ArgList,
    },
    /// Suspend a process until `time` elapses, then continue at `target`.
    Wait { target: VBlock, time: Option<VReg> },
    Const { result: VReg, value: ConstValue },
    Assert { value: VReg },
    Jump { target: VBlock },
    Load { result: VReg, var: VVar },
    Store { value: VReg, var: VVar },
    Mul { result: VReg, lhs: VReg, rhs: VReg },
    Add { result: VReg, lhs: VReg, rhs: VReg },
    /// Check that `value` lies within `bounds`.
    Bounds { value: VReg, bounds: VType },
    Comment { text: String },
    ConstArray { result: VReg, values: Vec<VReg> },
    Return { value: Option<VReg> },
    Cond {
        test: VReg,
        then_block: VBlock,
        else_block: VBlock,
    },
}

impl Op {
    pub fn kind(&self) -> OpKind {
        match self {
            Op::Cmp { .. } => OpKind::Cmp,
            Op::FCall { .. } => OpKind::FCall,
            Op::Wait { .. } => OpKind::Wait,
            Op::Const { .. } => OpKind::Const,
            Op::Assert { .. } => OpKind::Assert,
            Op::Jump { .. } => OpKind::Jump,
            Op::Load { .. } => OpKind::Load,
            Op::Store { .. } => OpKind::Store,
            Op::Mul { .. } => OpKind::Mul,
            Op::Add { .. } => OpKind::Add,
            Op::Bounds { .. } => OpKind::Bounds,
            Op::Comment { .. } => OpKind::Comment,
            Op::ConstArray { .. } => OpKind::ConstArray,
            Op::Return { .. } => OpKind::Return,
            Op::Cond { .. } => OpKind::Cond,
        }
    }

    /// The register this operation defines, or [`VReg::INVALID`].
    pub fn result(&self) -> VReg {
        match self {
            Op::Cmp { result, .. }
            | Op::FCall { result, .. }
            | Op::Const { result, .. }
            | Op::Load { result, .. }
            | Op::Mul { result, .. }
            | Op::Add { result, .. }
            | Op::ConstArray { result, .. } => *result,

            Op::Wait { .. }
            | Op::Assert { .. }
            | Op::Jump { .. }
            | Op::Store { .. }
            | Op::Bounds { .. }
            | Op::Comment { .. }
            | Op::Return { .. }
            | Op::Cond { .. } => VReg::INVALID,
        }
    }

    /// Registers read by this operation, in operand order.
    pub fn args(&self) -> ArgList {
        match self {
            Op::Cmp { lhs, rhs, .. } | Op::Mul { lhs, rhs, .. } | Op::Add { lhs, rhs, .. } => {
                smallvec![*lhs, *rhs]
            }
            Op::FCall { args, .. } => args.clone(),
            Op::ConstArray { values, .. } => values.iter().copied().collect(),
            Op::Wait { time, .. } => time.iter().copied().collect(),
            Op::Return { value } => value.iter().copied().collect(),
            Op::Assert { value } | Op::Store { value, .. } | Op::Bounds { value, .. } => {
                smallvec![*value]
            }
            Op::Cond { test, .. } => smallvec![*test],
            Op::Const { .. } | Op::Jump { .. } | Op::Load { .. } | Op::Comment { .. } => {
                SmallVec::new()
            }
        }
    }

    /// Control leaves the block after this operation.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Op::Jump { .. } | Op::Wait { .. } | Op::Return { .. } | Op::Cond { .. }
        )
    }

    /// Blocks control may continue at after a terminator.
    pub fn successors(&self) -> SmallVec<[VBlock; 2]> {
        match self {
            Op::Jump { target } | Op::Wait { target, .. } => smallvec![*target],
            Op::Cond {
                then_block,
                else_block,
                ..
            } => smallvec![*then_block, *else_block],
            _ => SmallVec::new(),
        }
    }

    /// Removing this operation is unobservable when its result is unused.
    pub fn is_pure(&self) -> bool {
        matches!(
            self,
            Op::Const { .. }
                | Op::Add { .. }
                | Op::Mul { .. }
                | Op::Cmp { .. }
                | Op::Load { .. }
                | Op::ConstArray { .. }
        )
    }
}

#[cfg(test)]
mod tests;
