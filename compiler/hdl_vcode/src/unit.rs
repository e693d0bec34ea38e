//! Units, blocks, registers and variables.

use hdl_ir::Name;

use crate::{Op, VBlock, VReg, VType, VVar};

/// What a unit will be compiled as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Function,
    Process,
    /// Zero-argument unit computing one expression for the folder.
    Thunk,
}

impl UnitKind {
    pub fn as_str(self) -> &'static str {
        match self {
            UnitKind::Function => "function",
            UnitKind::Process => "process",
            UnitKind::Thunk => "thunk",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VarInfo {
    pub name: Name,
    pub ty: VType,
    /// Range/length constraint checked on stores, if any.
    pub bounds: Option<VType>,
}

/// An ordered sequence of operations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    pub(crate) ops: Vec<Op>,
}

impl Block {
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// The block ends in a terminator; nothing more may be appended.
    pub fn is_finished(&self) -> bool {
        self.ops.last().is_some_and(Op::is_terminator)
    }
}

/// A function, process or thunk under construction or ready for codegen.
#[derive(Clone, Debug)]
pub struct Unit {
    pub(crate) name: Name,
    pub(crate) kind: UnitKind,
    pub(crate) blocks: Vec<Block>,
    pub(crate) regs: Vec<VType>,
    pub(crate) vars: Vec<VarInfo>,
    pub(crate) params: Vec<(VReg, Name)>,
    pub(crate) current: VBlock,
}

impl Unit {
    pub(crate) fn new(name: Name, kind: UnitKind) -> Self {
        Self {
            name,
            kind,
            blocks: vec![Block::default()],
            regs: Vec::new(),
            vars: Vec::new(),
            params: Vec::new(),
            current: VBlock::new(0),
        }
    }

    pub fn name(&self) -> Name {
        self.name
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, block: VBlock) -> &Block {
        assert!(
            block.index() < self.blocks.len(),
            "block {block} out of range (unit has {} blocks)",
            self.blocks.len()
        );
        &self.blocks[block.index()]
    }

    pub fn count_regs(&self) -> usize {
        self.regs.len()
    }

    pub fn reg_type(&self, reg: VReg) -> VType {
        self.check_reg(reg);
        self.regs[reg.index()]
    }

    /// Parameter registers in declaration order.
    pub fn params(&self) -> impl ExactSizeIterator<Item = VReg> + '_ {
        self.params.iter().map(|&(reg, _)| reg)
    }

    pub fn param_name(&self, index: usize) -> Name {
        self.params[index].1
    }

    pub fn vars(&self) -> &[VarInfo] {
        &self.vars
    }

    pub fn var(&self, var: VVar) -> &VarInfo {
        assert!(
            var.index() < self.vars.len(),
            "variable {var} out of range (unit has {} variables)",
            self.vars.len()
        );
        &self.vars[var.index()]
    }

    pub(crate) fn check_reg(&self, reg: VReg) {
        assert!(
            reg.is_valid() && reg.index() < self.regs.len(),
            "register {reg} is not defined in this unit (have {} registers)",
            self.regs.len()
        );
    }

    pub(crate) fn new_reg(&mut self, ty: VType) -> VReg {
        let reg = VReg::from_len(self.regs.len());
        self.regs.push(ty);
        reg
    }
}
