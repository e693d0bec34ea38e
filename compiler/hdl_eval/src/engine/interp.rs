//! Interpreter over linked native functions.

use std::sync::Arc;

use hdl_codegen::{BoundsSpec, Inst, NativeFunction, Reg, ScalarKind};

use super::{ExecutionEngine, FunctionRef, GenericValue};
use crate::ExecError;

#[derive(Clone, Debug)]
enum Slot {
    Scalar(GenericValue),
    Array(Arc<[GenericValue]>),
}

fn malformed(func: &NativeFunction, reason: &'static str) -> ExecError {
    ExecError::Malformed {
        function: func.name.clone(),
        reason,
    }
}

#[allow(clippy::float_cmp)]
fn real_eq(a: f64, b: f64) -> bool {
    a == b
}

/// Register and variable storage of one activation.
struct Frame<'f> {
    func: &'f NativeFunction,
    regs: Vec<Option<Slot>>,
    vars: Vec<Option<Slot>>,
}

impl<'f> Frame<'f> {
    fn new(func: &'f NativeFunction) -> Self {
        Self {
            func,
            regs: vec![None; func.regs as usize],
            vars: vec![None; func.vars as usize],
        }
    }

    fn get(&self, reg: Reg) -> Result<&Slot, ExecError> {
        self.regs
            .get(reg as usize)
            .and_then(Option::as_ref)
            .ok_or_else(|| malformed(self.func, "read of undefined register"))
    }

    fn scalar(&self, reg: Reg) -> Result<GenericValue, ExecError> {
        match self.get(reg)? {
            Slot::Scalar(value) => Ok(*value),
            Slot::Array(_) => Err(malformed(self.func, "array used as scalar")),
        }
    }

    fn int(&self, reg: Reg) -> Result<i64, ExecError> {
        self.scalar(reg).map(GenericValue::as_i64)
    }

    fn set(&mut self, reg: Reg, value: Slot) -> Result<(), ExecError> {
        let func = self.func;
        let slot = self
            .regs
            .get_mut(reg as usize)
            .ok_or_else(|| malformed(func, "write to undefined register"))?;
        *slot = Some(value);
        Ok(())
    }

    fn set_scalar(&mut self, reg: Reg, value: GenericValue) -> Result<(), ExecError> {
        self.set(reg, Slot::Scalar(value))
    }

    fn load(&self, var: u32) -> Result<Slot, ExecError> {
        self.vars
            .get(var as usize)
            .and_then(Option::clone)
            .ok_or_else(|| malformed(self.func, "read of unset variable"))
    }

    fn store(&mut self, var: u32, value: Slot) -> Result<(), ExecError> {
        let func = self.func;
        let slot = self
            .vars
            .get_mut(var as usize)
            .ok_or_else(|| malformed(func, "store to undefined variable"))?;
        *slot = Some(value);
        Ok(())
    }

    fn overflow(&self) -> ExecError {
        ExecError::Overflow {
            function: self.func.name.clone(),
        }
    }

    fn arith(
        &self,
        kind: ScalarKind,
        lhs: Reg,
        rhs: Reg,
        int_op: fn(i64, i64) -> Option<i64>,
        real_op: fn(f64, f64) -> f64,
    ) -> Result<GenericValue, ExecError> {
        match kind {
            ScalarKind::Int => int_op(self.int(lhs)?, self.int(rhs)?)
                .map(GenericValue::from_int)
                .ok_or_else(|| self.overflow()),
            ScalarKind::Real => Ok(GenericValue::from_f64(real_op(
                self.scalar(lhs)?.to_f64(),
                self.scalar(rhs)?.to_f64(),
            ))),
        }
    }

    fn check_range(&self, value: i64, low: i64, high: i64) -> Result<(), ExecError> {
        if (low..=high).contains(&value) {
            Ok(())
        } else {
            Err(ExecError::OutOfRange {
                function: self.func.name.clone(),
                value,
                low,
                high,
            })
        }
    }

    fn check_bounds(&self, value: Reg, bounds: BoundsSpec) -> Result<(), ExecError> {
        match bounds {
            BoundsSpec::Static { low, high } => self.check_range(self.int(value)?, low, high),
            BoundsSpec::Dynamic { low, high } => {
                self.check_range(self.int(value)?, self.int(low)?, self.int(high)?)
            }
            BoundsSpec::Length(expected) => match self.get(value)? {
                Slot::Array(elems) => {
                    let found = elems.len() as u64;
                    if found == expected {
                        Ok(())
                    } else {
                        Err(ExecError::LengthMismatch {
                            function: self.func.name.clone(),
                            expected,
                            found,
                        })
                    }
                }
                Slot::Scalar(_) => Err(malformed(self.func, "length check on a scalar")),
            },
        }
    }
}

pub(super) struct Interpreter<'e> {
    engine: &'e ExecutionEngine,
    steps: u64,
}

impl<'e> Interpreter<'e> {
    pub(super) fn new(engine: &'e ExecutionEngine) -> Self {
        Self { engine, steps: 0 }
    }

    pub(super) fn run(
        mut self,
        f: FunctionRef,
        args: &[GenericValue],
    ) -> Result<GenericValue, ExecError> {
        let args = args.iter().map(|&a| Slot::Scalar(a)).collect();
        match self.call(f, args, 0)? {
            Slot::Scalar(value) => Ok(value),
            Slot::Array(_) => Err(ExecError::NonScalarResult {
                function: self.engine.function(f).name.clone(),
            }),
        }
    }

    fn call(&mut self, f: FunctionRef, args: Vec<Slot>, depth: usize) -> Result<Slot, ExecError> {
        if depth >= self.engine.max_call_depth {
            return Err(ExecError::CallDepth(self.engine.max_call_depth));
        }
        let engine = self.engine;
        let func = engine.function(f);
        tracing::trace!(function = %func.name, depth, "call");

        let mut frame = Frame::new(func);
        if args.len() != func.params.len() {
            return Err(malformed(func, "argument count mismatch"));
        }
        for (&reg, arg) in func.params.iter().zip(args) {
            frame.set(reg, arg)?;
        }

        let mut block = 0usize;
        'blocks: loop {
            let insts = &func
                .blocks
                .get(block)
                .ok_or_else(|| malformed(func, "branch to missing block"))?
                .insts;
            for inst in insts {
                self.steps += 1;
                if self.steps > self.engine.max_steps {
                    return Err(ExecError::StepLimit(self.engine.max_steps));
                }
                match inst {
                    Inst::ConstInt { dst, value } => {
                        frame.set_scalar(*dst, GenericValue::from_int(*value))?;
                    }
                    Inst::ConstReal { dst, bits } => {
                        frame.set_scalar(*dst, GenericValue::from_bits(*bits))?;
                    }
                    Inst::ConstArray { dst, elems } => {
                        let elems = elems
                            .iter()
                            .map(|&r| frame.scalar(r))
                            .collect::<Result<Arc<[_]>, _>>()?;
                        frame.set(*dst, Slot::Array(elems))?;
                    }
                    Inst::Add {
                        dst,
                        kind,
                        lhs,
                        rhs,
                    } => {
                        let v = frame.arith(*kind, *lhs, *rhs, i64::checked_add, |a, b| a + b)?;
                        frame.set_scalar(*dst, v)?;
                    }
                    Inst::Mul {
                        dst,
                        kind,
                        lhs,
                        rhs,
                    } => {
                        let v = frame.arith(*kind, *lhs, *rhs, i64::checked_mul, |a, b| a * b)?;
                        frame.set_scalar(*dst, v)?;
                    }
                    Inst::CmpEq {
                        dst,
                        kind,
                        lhs,
                        rhs,
                    } => {
                        let (a, b) = (frame.scalar(*lhs)?, frame.scalar(*rhs)?);
                        let eq = match kind {
                            ScalarKind::Int => a == b,
                            ScalarKind::Real => real_eq(a.to_f64(), b.to_f64()),
                        };
                        frame.set_scalar(*dst, GenericValue::from_bool(eq))?;
                    }
                    Inst::Call { dst, func: name, args } => {
                        let target = engine
                            .find_function(name)
                            .ok_or_else(|| ExecError::Unresolved(name.clone()))?;
                        let args = args
                            .iter()
                            .map(|&r| frame.get(r).cloned())
                            .collect::<Result<Vec<_>, _>>()?;
                        let result = self.call(target, args, depth + 1)?;
                        frame.set(*dst, result)?;
                    }
                    Inst::Load { dst, var } => {
                        let value = frame.load(*var)?;
                        frame.set(*dst, value)?;
                    }
                    Inst::Store { src, var } => {
                        let value = frame.get(*src)?.clone();
                        frame.store(*var, value)?;
                    }
                    Inst::Assert { value } => {
                        if !frame.scalar(*value)?.is_true() {
                            return Err(ExecError::AssertionFailed {
                                function: func.name.clone(),
                            });
                        }
                    }
                    Inst::Bounds { value, bounds } => frame.check_bounds(*value, *bounds)?,
                    Inst::Jump { target } => {
                        block = *target as usize;
                        continue 'blocks;
                    }
                    Inst::Cond {
                        test,
                        then_block,
                        else_block,
                    } => {
                        let target = if frame.scalar(*test)?.is_true() {
                            then_block
                        } else {
                            else_block
                        };
                        block = *target as usize;
                        continue 'blocks;
                    }
                    Inst::Wait { .. } => {
                        return Err(ExecError::WaitInFunction {
                            function: func.name.clone(),
                        });
                    }
                    Inst::Return { value } => {
                        return match value {
                            Some(reg) => frame.get(*reg).cloned(),
                            None => Ok(Slot::Scalar(GenericValue::default())),
                        };
                    }
                }
            }
            return Err(malformed(func, "block without terminator"));
        }
    }
}
