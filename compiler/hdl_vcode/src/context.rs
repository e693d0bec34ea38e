//! The vcode context: type table, unit arena and the selection state.
//!
//! All block- and operation-level calls act on the *selected* unit and
//! its selected block. Emission appends exactly one operation to the
//! selected block and is rejected with [`InvalidState`] when no unit is
//! selected or its block is already terminated. Selecting a block the unit
//! does not have is rejected the same way.

use hdl_ir::Name;
use smallvec::SmallVec;

use crate::error::{InvalidState, VcodeError};
use crate::types::{TypeData, TypeTable, VTypeKind};
use crate::unit::{Unit, UnitKind, VarInfo};
use crate::{Cmp, ConstValue, Op, UnitId, VBlock, VReg, VType, VVar};

/// Owner of every unit built during one lowering session.
#[derive(Default)]
pub struct Vcode {
    types: TypeTable,
    units: Vec<Option<Unit>>,
    selected: Option<UnitId>,
}

impl Vcode {
    pub fn new() -> Self {
        Self::default()
    }

    // Types

    pub fn vtype_int(&mut self, low: i64, high: i64) -> VType {
        self.types.intern(TypeData::Int { low, high })
    }

    /// Integer whose bounds are the run-time values of `low` and `high`.
    pub fn vtype_dynamic(&mut self, low: VReg, high: VReg) -> VType {
        self.types.intern(TypeData::DynamicInt { low, high })
    }

    pub fn vtype_bool(&mut self) -> VType {
        self.vtype_int(0, 1)
    }

    pub fn vtype_real(&mut self) -> VType {
        self.types.intern(TypeData::Real)
    }

    pub fn vtype_carray(&mut self, dims: &[(i64, i64)], elem: VType, bounds: VType) -> VType {
        self.types.intern(TypeData::CArray {
            dims: SmallVec::from_slice(dims),
            elem,
            bounds,
        })
    }

    #[inline]
    pub fn vtype_eq(&self, a: VType, b: VType) -> bool {
        a == b
    }

    pub fn vtype_includes(&self, ty: VType, bounds: VType) -> bool {
        self.types.includes(ty, bounds)
    }

    pub fn vtype_kind(&self, ty: VType) -> VTypeKind {
        self.types.get(ty).kind()
    }

    pub fn vtype_data(&self, ty: VType) -> &TypeData {
        self.types.get(ty)
    }

    /// Low bound of a statically bounded integer type.
    pub fn vtype_low(&self, ty: VType) -> Option<i64> {
        self.types.get(ty).int_range().map(|(low, _)| low)
    }

    /// High bound of a statically bounded integer type.
    pub fn vtype_high(&self, ty: VType) -> Option<i64> {
        self.types.get(ty).int_range().map(|(_, high)| high)
    }

    // Units

    pub fn emit_func(&mut self, name: Name) -> UnitId {
        self.new_unit(name, UnitKind::Function)
    }

    pub fn emit_process(&mut self, name: Name) -> UnitId {
        self.new_unit(name, UnitKind::Process)
    }

    pub fn emit_thunk(&mut self, name: Name) -> UnitId {
        self.new_unit(name, UnitKind::Thunk)
    }

    /// Create a unit with an entry block and select both.
    fn new_unit(&mut self, name: Name, kind: UnitKind) -> UnitId {
        let id = UnitId::from_len(self.units.len());
        self.units.push(Some(Unit::new(name, kind)));
        self.selected = Some(id);
        tracing::trace!(unit = id.raw(), kind = kind.as_str(), "new vcode unit");
        id
    }

    pub fn select_unit(&mut self, unit: UnitId) {
        let _ = self.unit(unit);
        self.selected = Some(unit);
    }

    pub fn selected_unit(&self) -> Option<UnitId> {
        self.selected
    }

    /// A live unit.
    ///
    /// # Panics
    ///
    /// Panics if `unit` was closed or belongs to another context.
    pub fn unit(&self, unit: UnitId) -> &Unit {
        match self.units.get(unit.index()) {
            Some(Some(u)) => u,
            _ => panic!("unit {unit} is closed or unknown"),
        }
    }

    pub(crate) fn try_selected(&self) -> Result<&Unit, InvalidState> {
        self.selected
            .and_then(|id| self.units.get(id.index()).and_then(Option::as_ref))
            .ok_or(InvalidState::NoUnit)
    }

    pub(crate) fn try_selected_mut(&mut self) -> Result<&mut Unit, InvalidState> {
        let id = self.selected.ok_or(InvalidState::NoUnit)?;
        self.units
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(InvalidState::NoUnit)
    }

    /// The type table alongside the selected unit, for passes that rewrite
    /// the unit while reading types.
    pub(crate) fn split_selected_mut(&mut self) -> Result<(&TypeTable, &mut Unit), InvalidState> {
        let id = self.selected.ok_or(InvalidState::NoUnit)?;
        let unit = self
            .units
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(InvalidState::NoUnit)?;
        Ok((&self.types, unit))
    }

    pub(crate) fn type_table(&self) -> &TypeTable {
        &self.types
    }

    /// The selected unit.
    ///
    /// # Panics
    ///
    /// Panics if no unit is selected.
    pub fn selected(&self) -> &Unit {
        self.try_selected()
            .unwrap_or_else(|e| panic!("vcode query without selection: {e}"))
    }

    /// Name of the selected unit.
    pub fn unit_name(&self) -> Name {
        self.selected().name()
    }

    /// Discard the selected unit's IR.
    pub fn close(&mut self) {
        if let Some(id) = self.selected.take() {
            self.units[id.index()] = None;
        }
    }

    // Blocks

    pub fn select_block(&mut self, block: VBlock) -> Result<(), VcodeError> {
        let unit = self.try_selected_mut()?;
        if !block.is_valid() || block.index() >= unit.blocks.len() {
            return Err(InvalidState::NoBlock.into());
        }
        unit.current = block;
        Ok(())
    }

    pub fn selected_block(&self) -> VBlock {
        self.selected().current
    }

    pub fn count_blocks(&self) -> usize {
        self.selected().blocks.len()
    }

    /// The selected block already ends in a terminator.
    pub fn block_finished(&self) -> bool {
        let unit = self.selected();
        unit.block(unit.current).is_finished()
    }

    pub fn reg_type(&self, reg: VReg) -> VType {
        self.selected().reg_type(reg)
    }

    // Operation queries (selected block)

    pub fn count_ops(&self) -> usize {
        let unit = self.selected();
        unit.block(unit.current).ops.len()
    }

    pub fn op(&self, index: usize) -> &Op {
        let unit = self.selected();
        &unit.block(unit.current).ops[index]
    }

    pub fn count_args(&self, index: usize) -> usize {
        self.op(index).args().len()
    }

    pub fn get_arg(&self, index: usize, arg: usize) -> VReg {
        self.op(index).args()[arg]
    }

    pub fn get_result(&self, index: usize) -> VReg {
        self.op(index).result()
    }

    // Variables

    pub fn count_vars(&self) -> usize {
        self.selected().vars.len()
    }

    pub fn var_name(&self, var: VVar) -> Name {
        self.selected().var(var).name
    }

    // Emission

    pub fn emit_block(&mut self) -> Result<VBlock, VcodeError> {
        let unit = self.try_selected_mut()?;
        let block = VBlock::from_len(unit.blocks.len());
        unit.blocks.push(crate::unit::Block::default());
        Ok(block)
    }

    pub fn emit_var(
        &mut self,
        ty: VType,
        bounds: Option<VType>,
        name: Name,
    ) -> Result<VVar, VcodeError> {
        let unit = self.try_selected_mut()?;
        let var = VVar::from_len(unit.vars.len());
        unit.vars.push(VarInfo { name, ty, bounds });
        Ok(var)
    }

    /// Declare the next parameter of a function unit.
    pub fn emit_param(&mut self, ty: VType, name: Name) -> Result<VReg, VcodeError> {
        let unit = self.try_selected_mut()?;
        if unit.kind != UnitKind::Function {
            return Err(InvalidState::ParamOutsideFunction.into());
        }
        let reg = unit.new_reg(ty);
        unit.params.push((reg, name));
        Ok(reg)
    }

    /// The selected unit, provided its selected block accepts operations.
    fn open_block(&mut self) -> Result<&mut Unit, InvalidState> {
        let unit = self.try_selected_mut()?;
        if unit.blocks[unit.current.index()].is_finished() {
            return Err(InvalidState::BlockFinished(unit.current));
        }
        Ok(unit)
    }

    fn push(&mut self, op: Op) -> Result<(), VcodeError> {
        let unit = self.open_block()?;
        for arg in op.args() {
            unit.check_reg(arg);
        }
        for target in op.successors() {
            assert!(
                target.index() < unit.blocks.len(),
                "branch target {target} out of range (unit has {} blocks)",
                unit.blocks.len()
            );
        }
        let current = unit.current.index();
        unit.blocks[current].ops.push(op);
        Ok(())
    }

    /// Allocate a result register of type `ty` and append `make(result)`.
    fn push_value(
        &mut self,
        ty: VType,
        make: impl FnOnce(VReg) -> Op,
    ) -> Result<VReg, VcodeError> {
        let unit = self.open_block()?;
        let result = unit.new_reg(ty);
        let op = make(result);
        for arg in op.args() {
            unit.check_reg(arg);
        }
        let current = unit.current.index();
        unit.blocks[current].ops.push(op);
        Ok(result)
    }

    pub fn emit_const(&mut self, ty: VType, value: i64) -> Result<VReg, VcodeError> {
        self.push_value(ty, |result| Op::Const {
            result,
            value: ConstValue::Int(value),
        })
    }

    pub fn emit_const_real(&mut self, value: f64) -> Result<VReg, VcodeError> {
        let ty = self.vtype_real();
        self.push_value(ty, |result| Op::Const {
            result,
            value: ConstValue::Real(value.to_bits()),
        })
    }

    /// Constant array of type `ty` built from scalar registers.
    pub fn emit_const_array(&mut self, ty: VType, values: &[VReg]) -> Result<VReg, VcodeError> {
        debug_assert_eq!(
            self.types.get(ty).element_count(),
            u64::try_from(values.len()).ok(),
            "constant array length does not match its type"
        );
        self.push_value(ty, |result| Op::ConstArray {
            result,
            values: values.to_vec(),
        })
    }

    pub fn emit_add(&mut self, lhs: VReg, rhs: VReg) -> Result<VReg, VcodeError> {
        let ty = self.try_selected()?.reg_type(lhs);
        self.push_value(ty, |result| Op::Add { result, lhs, rhs })
    }

    pub fn emit_mul(&mut self, lhs: VReg, rhs: VReg) -> Result<VReg, VcodeError> {
        let ty = self.try_selected()?.reg_type(lhs);
        self.push_value(ty, |result| Op::Mul { result, lhs, rhs })
    }

    pub fn emit_cmp(&mut self, cmp: Cmp, lhs: VReg, rhs: VReg) -> Result<VReg, VcodeError> {
        let ty = self.vtype_bool();
        self.push_value(ty, |result| Op::Cmp {
            result,
            cmp,
            lhs,
            rhs,
        })
    }

    pub fn emit_fcall(
        &mut self,
        func: Name,
        ty: VType,
        args: &[VReg],
    ) -> Result<VReg, VcodeError> {
        self.push_value(ty, |result| Op::FCall {
            result,
            func,
            ty,
            args: SmallVec::from_slice(args),
        })
    }

    pub fn emit_assert(&mut self, value: VReg) -> Result<(), VcodeError> {
        self.push(Op::Assert { value })
    }

    pub fn emit_wait(&mut self, target: VBlock, time: Option<VReg>) -> Result<(), VcodeError> {
        self.push(Op::Wait { target, time })
    }

    pub fn emit_jump(&mut self, target: VBlock) -> Result<(), VcodeError> {
        self.push(Op::Jump { target })
    }

    pub fn emit_cond(
        &mut self,
        test: VReg,
        then_block: VBlock,
        else_block: VBlock,
    ) -> Result<(), VcodeError> {
        self.push(Op::Cond {
            test,
            then_block,
            else_block,
        })
    }

    pub fn emit_return(&mut self, value: Option<VReg>) -> Result<(), VcodeError> {
        self.push(Op::Return { value })
    }

    pub fn emit_load(&mut self, var: VVar) -> Result<VReg, VcodeError> {
        let ty = self.try_selected()?.var(var).ty;
        self.push_value(ty, |result| Op::Load { result, var })
    }

    pub fn emit_store(&mut self, value: VReg, var: VVar) -> Result<(), VcodeError> {
        let _ = self.try_selected()?.var(var);
        self.push(Op::Store { value, var })
    }

    pub fn emit_bounds(&mut self, value: VReg, bounds: VType) -> Result<(), VcodeError> {
        let _ = self.types.get(bounds);
        self.push(Op::Bounds { value, bounds })
    }

    pub fn emit_comment(&mut self, text: impl Into<String>) -> Result<(), VcodeError> {
        self.push(Op::Comment { text: text.into() })
    }
}
