//! Interned vcode types.
//!
//! Every distinct [`TypeData`] is stored once; a [`VType`] handle therefore
//! identifies a type structurally and `vtype_eq` is handle equality.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{VReg, VType};

/// Structure of a vcode type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    /// Integer with an inclusive literal range. Booleans are `Int { 0, 1 }`.
    Int { low: i64, high: i64 },
    /// Integer whose range is only known at run time.
    DynamicInt { low: VReg, high: VReg },
    /// 64-bit floating point.
    Real,
    /// Constrained array: one bound pair per dimension, the element type and
    /// a separate bounds type used for range and length checks.
    CArray {
        dims: SmallVec<[(i64, i64); 2]>,
        elem: VType,
        bounds: VType,
    },
}

/// Coarse classification of a [`TypeData`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VTypeKind {
    Int,
    Real,
    CArray,
}

impl TypeData {
    pub fn kind(&self) -> VTypeKind {
        match self {
            TypeData::Int { .. } | TypeData::DynamicInt { .. } => VTypeKind::Int,
            TypeData::Real => VTypeKind::Real,
            TypeData::CArray { .. } => VTypeKind::CArray,
        }
    }

    /// Literal range of a statically bounded integer.
    pub fn int_range(&self) -> Option<(i64, i64)> {
        match self {
            TypeData::Int { low, high } => Some((*low, *high)),
            _ => None,
        }
    }

    /// Number of scalar elements of a constrained array; zero for a null
    /// range in any dimension.
    pub fn element_count(&self) -> Option<u64> {
        let TypeData::CArray { dims, .. } = self else {
            return None;
        };
        dims.iter().try_fold(1u64, |acc, &(low, high)| {
            let len = if high < low {
                0
            } else {
                high.abs_diff(low).checked_add(1)?
            };
            acc.checked_mul(len)
        })
    }
}

#[derive(Default)]
pub(crate) struct TypeTable {
    types: Vec<TypeData>,
    map: FxHashMap<TypeData, VType>,
}

impl TypeTable {
    pub(crate) fn intern(&mut self, data: TypeData) -> VType {
        if let Some(&ty) = self.map.get(&data) {
            return ty;
        }
        let ty = VType::from_len(self.types.len());
        self.types.push(data.clone());
        self.map.insert(data, ty);
        ty
    }

    pub(crate) fn get(&self, ty: VType) -> &TypeData {
        assert!(
            ty.index() < self.types.len(),
            "type {ty} is not interned in this context (have {} types)",
            self.types.len()
        );
        &self.types[ty.index()]
    }

    /// `true` when every value admitted by `bounds` is admitted by `ty`.
    pub(crate) fn includes(&self, ty: VType, bounds: VType) -> bool {
        if ty == bounds {
            return true;
        }
        match (self.get(ty), self.get(bounds)) {
            (
                TypeData::Int { low, high },
                TypeData::Int {
                    low: blow,
                    high: bhigh,
                },
            ) => low <= blow && bhigh <= high,
            _ => false,
        }
    }
}
