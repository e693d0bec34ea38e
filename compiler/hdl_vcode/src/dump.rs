//! Human-readable rendering of the selected unit.

use std::fmt::{self, Write};

use hdl_ir::StringInterner;

use crate::types::{TypeData, TypeTable};
use crate::{ConstValue, Op, VType, Vcode};

struct TypeDisplay<'a> {
    types: &'a TypeTable,
    ty: VType,
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.types.get(self.ty) {
            TypeData::Int { low, high } => write!(f, "{low}..{high}"),
            TypeData::DynamicInt { low, high } => write!(f, "{low}..{high}"),
            TypeData::Real => f.write_str("real"),
            TypeData::CArray { dims, elem, .. } => {
                f.write_str("[")?;
                for (i, (low, high)) in dims.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{low}..{high}")?;
                }
                write!(
                    f,
                    "] of {}",
                    TypeDisplay {
                        types: self.types,
                        ty: *elem
                    }
                )
            }
        }
    }
}

fn join_regs(regs: &[crate::VReg]) -> String {
    regs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Vcode {
    /// Render the selected unit.
    ///
    /// # Panics
    ///
    /// Panics if no unit is selected.
    pub fn dump(&self, interner: &StringInterner) -> String {
        let unit = self.selected();
        let types = self.type_table();
        let show = |ty| TypeDisplay { types, ty };
        let mut out = String::new();

        // Writing to a String cannot fail.
        let _ = writeln!(out, "Name       {}", interner.lookup(unit.name()));
        let _ = writeln!(out, "Kind       {}", unit.kind().as_str());
        for (i, reg) in unit.params().enumerate() {
            let _ = writeln!(
                out,
                "Param      {reg} {} : {}",
                interner.lookup(unit.param_name(i)),
                show(unit.reg_type(reg))
            );
        }
        for (i, var) in unit.vars().iter().enumerate() {
            let _ = write!(
                out,
                "Variable   v{i} {} : {}",
                interner.lookup(var.name),
                show(var.ty)
            );
            if let Some(bounds) = var.bounds {
                let _ = write!(out, " in {}", show(bounds));
            }
            out.push('\n');
        }

        for (b, block) in unit.blocks().iter().enumerate() {
            let _ = writeln!(out, "  bb{b}:");
            for op in block.ops() {
                out.push_str("    ");
                let _ = match op {
                    Op::Const { result, value } => match value {
                        ConstValue::Int(v) => writeln!(out, "{result} := const {v}"),
                        ConstValue::Real(bits) => {
                            writeln!(out, "{result} := const {:?}", f64::from_bits(*bits))
                        }
                    },
                    Op::Add { result, lhs, rhs } => writeln!(out, "{result} := add {lhs}, {rhs}"),
                    Op::Mul { result, lhs, rhs } => writeln!(out, "{result} := mul {lhs}, {rhs}"),
                    Op::Cmp {
                        result,
                        cmp,
                        lhs,
                        rhs,
                    } => writeln!(out, "{result} := cmp {lhs} {} {rhs}", cmp.as_str()),
                    Op::FCall {
                        result, func, args, ..
                    } => writeln!(
                        out,
                        "{result} := fcall {} {}",
                        interner.lookup(*func),
                        join_regs(args)
                    ),
                    Op::Load { result, var } => writeln!(out, "{result} := load {var}"),
                    Op::Store { value, var } => writeln!(out, "store {value} -> {var}"),
                    Op::ConstArray { result, values } => {
                        writeln!(out, "{result} := const array [{}]", join_regs(values))
                    }
                    Op::Assert { value } => writeln!(out, "assert {value}"),
                    Op::Bounds { value, bounds } => {
                        writeln!(out, "bounds {value} in {}", show(*bounds))
                    }
                    Op::Jump { target } => writeln!(out, "jump {target}"),
                    Op::Wait { target, time } => match time {
                        Some(time) => writeln!(out, "wait {target} for {time}"),
                        None => writeln!(out, "wait {target}"),
                    },
                    Op::Cond {
                        test,
                        then_block,
                        else_block,
                    } => writeln!(out, "cond {test} then {then_block} else {else_block}"),
                    Op::Return { value } => match value {
                        Some(value) => writeln!(out, "return {value}"),
                        None => writeln!(out, "return"),
                    },
                    Op::Comment { text } => writeln!(out, "// {text}"),
                };
            }
        }
        out
    }
}
