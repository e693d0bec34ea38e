//! Vcode to native module translation.
//!
//! Registers, variables and blocks keep their vcode numbering; comments
//! are dropped and each arithmetic operation is tagged with the scalar
//! kind of its operands. Stores into a variable with a bounds type get an
//! explicit bounds check in front of them.

use hdl_ir::StringInterner;
use hdl_vcode::{ConstValue, Op, TypeData, Unit, UnitId, VReg, VType, Vcode, VerifyError};
use thiserror::Error;

use crate::native::{BoundsSpec, Inst, NativeBlock, NativeFunction, NativeModule, ScalarKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    #[error("no vcode unit selected")]
    NoUnitSelected,
    #[error("unit {unit} failed verification: {source}")]
    Verify {
        unit: String,
        #[source]
        source: VerifyError,
    },
    #[error("unit {unit}: no native form for {what}")]
    Unsupported { unit: String, what: &'static str },
}

/// Compiles vcode into linkable native modules.
pub trait NativeCodegen {
    /// Compile the selected unit into a module holding that one function,
    /// named after the unit.
    fn generate_native(
        &self,
        vcode: &Vcode,
        interner: &StringInterner,
    ) -> Result<NativeModule, CodegenError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct VcodeCodegen;

impl VcodeCodegen {
    /// Compile several units into one module, as the general pipeline does
    /// for all subprograms of a library unit.
    pub fn generate_module(
        &self,
        name: &str,
        vcode: &Vcode,
        units: &[UnitId],
        interner: &StringInterner,
    ) -> Result<NativeModule, CodegenError> {
        let mut module = NativeModule::new(name);
        for &unit in units {
            module.functions.push(lower_unit(vcode, unit, interner)?);
        }
        tracing::debug!(module = name, functions = module.functions.len(), "generated module");
        Ok(module)
    }
}

impl NativeCodegen for VcodeCodegen {
    fn generate_native(
        &self,
        vcode: &Vcode,
        interner: &StringInterner,
    ) -> Result<NativeModule, CodegenError> {
        let unit = vcode.selected_unit().ok_or(CodegenError::NoUnitSelected)?;
        let function = lower_unit(vcode, unit, interner)?;
        tracing::debug!(function = %function.name, "generated native thunk");
        Ok(NativeModule {
            name: function.name.clone(),
            functions: vec![function],
        })
    }
}

fn lower_unit(
    vcode: &Vcode,
    id: UnitId,
    interner: &StringInterner,
) -> Result<NativeFunction, CodegenError> {
    let unit = vcode.unit(id);
    let name = interner.lookup(unit.name()).to_owned();
    if let Err(source) = vcode.verify(id) {
        return Err(CodegenError::Verify { unit: name, source });
    }

    let cx = FunctionLowering {
        vcode,
        unit,
        interner,
        name: &name,
    };
    let mut blocks = Vec::with_capacity(unit.blocks().len());
    for block in unit.blocks() {
        let mut insts = Vec::with_capacity(block.ops().len());
        for op in block.ops() {
            cx.lower_op(op, &mut insts)?;
        }
        blocks.push(NativeBlock { insts });
    }

    Ok(NativeFunction {
        params: unit.params().map(VReg::raw).collect(),
        regs: count(unit.count_regs()),
        vars: count(unit.vars().len()),
        blocks,
        name,
    })
}

/// Arena sizes are bounded by `u32` handles.
fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

struct FunctionLowering<'a> {
    vcode: &'a Vcode,
    unit: &'a Unit,
    interner: &'a StringInterner,
    name: &'a str,
}

impl FunctionLowering<'_> {
    fn unsupported(&self, what: &'static str) -> CodegenError {
        CodegenError::Unsupported {
            unit: self.name.to_owned(),
            what,
        }
    }

    fn scalar_kind(&self, reg: VReg) -> Result<ScalarKind, CodegenError> {
        match self.vcode.vtype_data(self.unit.reg_type(reg)) {
            TypeData::Int { .. } | TypeData::DynamicInt { .. } => Ok(ScalarKind::Int),
            TypeData::Real => Ok(ScalarKind::Real),
            TypeData::CArray { .. } => Err(self.unsupported("array arithmetic")),
        }
    }

    /// `None` when values of `ty` carry no checkable range.
    fn bounds_spec(&self, ty: VType) -> Result<Option<BoundsSpec>, CodegenError> {
        Ok(match self.vcode.vtype_data(ty) {
            TypeData::Int { low, high } => Some(BoundsSpec::Static {
                low: *low,
                high: *high,
            }),
            TypeData::DynamicInt { low, high } => Some(BoundsSpec::Dynamic {
                low: low.raw(),
                high: high.raw(),
            }),
            TypeData::Real => None,
            data @ TypeData::CArray { .. } => Some(BoundsSpec::Length(
                data.element_count()
                    .ok_or_else(|| self.unsupported("array length beyond u64"))?,
            )),
        })
    }

    fn lower_op(&self, op: &Op, out: &mut Vec<Inst>) -> Result<(), CodegenError> {
        let inst = match op {
            Op::Const { result, value } => match *value {
                ConstValue::Int(value) => Inst::ConstInt {
                    dst: result.raw(),
                    value,
                },
                ConstValue::Real(bits) => Inst::ConstReal {
                    dst: result.raw(),
                    bits,
                },
            },
            Op::ConstArray { result, values } => Inst::ConstArray {
                dst: result.raw(),
                elems: values.iter().map(|r| r.raw()).collect(),
            },
            Op::Add { result, lhs, rhs } => Inst::Add {
                dst: result.raw(),
                kind: self.scalar_kind(*result)?,
                lhs: lhs.raw(),
                rhs: rhs.raw(),
            },
            Op::Mul { result, lhs, rhs } => Inst::Mul {
                dst: result.raw(),
                kind: self.scalar_kind(*result)?,
                lhs: lhs.raw(),
                rhs: rhs.raw(),
            },
            Op::Cmp {
                result, lhs, rhs, ..
            } => Inst::CmpEq {
                dst: result.raw(),
                kind: self.scalar_kind(*lhs)?,
                lhs: lhs.raw(),
                rhs: rhs.raw(),
            },
            Op::FCall {
                result, func, args, ..
            } => Inst::Call {
                dst: result.raw(),
                func: self.interner.lookup(*func).to_owned(),
                args: args.iter().map(|r| r.raw()).collect(),
            },
            Op::Load { result, var } => Inst::Load {
                dst: result.raw(),
                var: var.raw(),
            },
            Op::Store { value, var } => {
                if let Some(ty) = self.unit.var(*var).bounds {
                    if let Some(bounds) = self.bounds_spec(ty)? {
                        out.push(Inst::Bounds {
                            value: value.raw(),
                            bounds,
                        });
                    }
                }
                Inst::Store {
                    src: value.raw(),
                    var: var.raw(),
                }
            }
            Op::Assert { value } => Inst::Assert { value: value.raw() },
            Op::Bounds { value, bounds } => match self.bounds_spec(*bounds)? {
                Some(bounds) => Inst::Bounds {
                    value: value.raw(),
                    bounds,
                },
                None => return Ok(()),
            },
            Op::Jump { target } => Inst::Jump {
                target: target.raw(),
            },
            Op::Cond {
                test,
                then_block,
                else_block,
            } => Inst::Cond {
                test: test.raw(),
                then_block: then_block.raw(),
                else_block: else_block.raw(),
            },
            Op::Wait { target, .. } => Inst::Wait {
                target: target.raw(),
            },
            Op::Return { value } => Inst::Return {
                value: value.map(VReg::raw),
            },
            Op::Comment { .. } => return Ok(()),
        };
        out.push(inst);
        Ok(())
    }
}
