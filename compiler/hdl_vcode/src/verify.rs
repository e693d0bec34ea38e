//! Structural checks run before code generation.
//!
//! Emission already rejects appending past a terminator and registers
//! from outside the unit. What it cannot see is control flow: a register
//! read in one block must be defined earlier in the same block or in a
//! block that dominates it, and every reachable block must be terminated.

use thiserror::Error;

use crate::opt::op_uses;
use crate::{UnitId, VBlock, VReg, Vcode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("block {0} does not end in a terminator")]
    Unterminated(VBlock),
    #[error("register {reg} is read in block {block} where its definition does not dominate")]
    UseNotDominated { reg: VReg, block: VBlock },
}

#[derive(Clone, Copy)]
enum Def {
    Param,
    Op { block: usize, index: usize },
}

impl Vcode {
    /// Check the dominance and termination invariants of `unit`.
    pub fn verify(&self, unit: UnitId) -> Result<(), VerifyError> {
        let u = self.unit(unit);
        let types = self.type_table();
        let nblocks = u.blocks.len();

        let mut defs: Vec<Option<Def>> = vec![None; u.regs.len()];
        for reg in u.params() {
            defs[reg.index()] = Some(Def::Param);
        }
        for (b, block) in u.blocks.iter().enumerate() {
            for (i, op) in block.ops.iter().enumerate() {
                let result = op.result();
                if result.is_valid() {
                    defs[result.index()] = Some(Def::Op { block: b, index: i });
                }
            }
        }

        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); nblocks];
        let mut reachable = vec![false; nblocks];
        let mut stack = vec![0usize];
        while let Some(b) = stack.pop() {
            if std::mem::replace(&mut reachable[b], true) {
                continue;
            }
            let block = &u.blocks[b];
            if !block.is_finished() {
                return Err(VerifyError::Unterminated(VBlock::from_len(b)));
            }
            if let Some(last) = block.ops.last() {
                for succ in last.successors() {
                    preds[succ.index()].push(b);
                    stack.push(succ.index());
                }
            }
        }

        // dom[b][d]: block d dominates block b
        let mut dom: Vec<Vec<bool>> = (0..nblocks)
            .map(|b| {
                if b == 0 {
                    (0..nblocks).map(|d| d == 0).collect()
                } else {
                    vec![true; nblocks]
                }
            })
            .collect();
        let mut changed = true;
        while changed {
            changed = false;
            for b in 1..nblocks {
                if !reachable[b] {
                    continue;
                }
                let mut next = vec![true; nblocks];
                for &p in preds[b].iter().filter(|&&p| reachable[p]) {
                    for (n, &d) in next.iter_mut().zip(&dom[p]) {
                        *n &= d;
                    }
                }
                next[b] = true;
                if next != dom[b] {
                    dom[b] = next;
                    changed = true;
                }
            }
        }

        for (b, block) in u.blocks.iter().enumerate() {
            if !reachable[b] {
                continue;
            }
            for (i, op) in block.ops.iter().enumerate() {
                for reg in op_uses(types, op) {
                    let ok = match defs[reg.index()] {
                        Some(Def::Param) => true,
                        Some(Def::Op { block: db, index }) => {
                            if db == b {
                                index < i
                            } else {
                                dom[b][db]
                            }
                        }
                        None => false,
                    };
                    if !ok {
                        return Err(VerifyError::UseNotDominated {
                            reg,
                            block: VBlock::from_len(b),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
