//! Dead operation removal.

use smallvec::SmallVec;

use crate::error::VcodeError;
use crate::types::{TypeData, TypeTable};
use crate::{Op, VReg, VType, Vcode};

/// Registers a type reads at run time (bounds of a dynamic range).
pub(crate) fn type_regs(types: &TypeTable, ty: VType) -> SmallVec<[VReg; 2]> {
    match types.get(ty) {
        TypeData::DynamicInt { low, high } => SmallVec::from_slice(&[*low, *high]),
        TypeData::Int { .. } | TypeData::Real | TypeData::CArray { .. } => SmallVec::new(),
    }
}

/// All registers an operation reads, including those hidden in its types.
pub(crate) fn op_uses(types: &TypeTable, op: &Op) -> SmallVec<[VReg; 4]> {
    let mut uses = op.args();
    match op {
        Op::Bounds { bounds: ty, .. } | Op::FCall { ty, .. } => {
            uses.extend(type_regs(types, *ty));
        }
        _ => {}
    }
    uses
}

impl Vcode {
    /// Remove pure operations of the selected unit whose results are never
    /// read, repeating until nothing more can be removed.
    ///
    /// Returns the number of operations removed.
    pub fn opt(&mut self) -> Result<usize, VcodeError> {
        let (types, unit) = self.split_selected_mut()?;
        let mut removed = 0;
        loop {
            let mut used = vec![false; unit.regs.len()];
            for block in &unit.blocks {
                for op in &block.ops {
                    for reg in op_uses(types, op) {
                        used[reg.index()] = true;
                    }
                }
            }
            for var in &unit.vars {
                for ty in std::iter::once(var.ty).chain(var.bounds) {
                    for reg in type_regs(types, ty) {
                        used[reg.index()] = true;
                    }
                }
            }

            let before: usize = unit.blocks.iter().map(|b| b.ops.len()).sum();
            for block in &mut unit.blocks {
                block
                    .ops
                    .retain(|op| !(op.is_pure() && !used[op.result().index()]));
            }
            let after: usize = unit.blocks.iter().map(|b| b.ops.len()).sum();

            if after == before {
                break;
            }
            removed += before - after;
        }
        tracing::trace!(removed, "vcode opt");
        Ok(removed)
    }
}
