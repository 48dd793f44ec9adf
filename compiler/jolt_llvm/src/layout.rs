//! Target data layout: sizes, alignments and element offsets.
//!
//! [`DataLayout`] names a target; [`TargetLayout`] answers layout queries
//! through LLVM's `TargetData` for that target's layout string, so the
//! numbers agree with what LLVM itself emits. Querying a type that
//! contains an opaque struct by value is an error rather than an LLVM
//! assertion.

use std::fmt;

use inkwell::targets::TargetData;

use crate::{IrError, IrType, TypeId, TypeTable};

/// Target data layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DataLayout {
    /// 64-bit target (x86-64 System V).
    #[default]
    Lp64,
    /// 32-bit target.
    Ilp32,
}

impl DataLayout {
    /// 32-bit target.
    pub const fn ilp32() -> Self {
        Self::Ilp32
    }

    /// LLVM data layout string.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Lp64 => "e-m:e-p270:32:32-p271:32:32-p272:64:64-i64:64-f80:128-n8:16:32:64-S128",
            Self::Ilp32 => "e-m:e-p:32:32-i64:64-n8:16:32-S128",
        }
    }

    /// Native word size in bytes.
    #[inline]
    pub const fn word_bytes(self) -> u64 {
        match self {
            Self::Lp64 => 8,
            Self::Ilp32 => 4,
        }
    }
}

/// Layout queries for one target.
pub struct TargetLayout {
    layout: DataLayout,
    target: TargetData,
}

impl fmt::Debug for TargetLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetLayout")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl TargetLayout {
    pub fn new(layout: DataLayout) -> Self {
        Self {
            layout,
            target: TargetData::create(layout.description()),
        }
    }

    #[inline]
    pub fn data_layout(&self) -> DataLayout {
        self.layout
    }

    #[inline]
    pub(crate) fn target_data(&self) -> &TargetData {
        &self.target
    }

    /// Native word size in bytes.
    #[inline]
    pub fn word_bytes(&self) -> u64 {
        self.layout.word_bytes()
    }

    /// Allocation size of a type in bytes, including tail padding.
    pub fn size_of(&self, types: &TypeTable<'_>, ty: TypeId) -> Result<u64, IrError> {
        types.check_sized(ty)?;
        Ok(self.target.get_abi_size(&types.basic_type(ty)?))
    }

    /// ABI alignment of a type in bytes.
    pub fn align_of(&self, types: &TypeTable<'_>, ty: TypeId) -> Result<u64, IrError> {
        types.check_sized(ty)?;
        Ok(u64::from(self.target.get_abi_alignment(&types.basic_type(ty)?)))
    }

    /// Byte offset of component `index` within a struct type.
    pub fn element_offset(
        &self,
        types: &TypeTable<'_>,
        struct_ty: TypeId,
        index: usize,
    ) -> Result<u64, IrError> {
        let invalid = || IrError::InvalidIndex {
            ty: types.display(struct_ty),
            index: index as u64,
        };
        if index >= types.struct_fields(struct_ty)?.len() {
            return Err(invalid());
        }
        types.check_sized(struct_ty)?;
        let slot = u32::try_from(index).map_err(|_| invalid())?;
        let llvm = types.basic_type(struct_ty)?.into_struct_type();
        self.target.offset_of_element(&llvm, slot).ok_or_else(invalid)
    }

    /// Byte offset addressed by a constant GEP over a pointer to `pointee`.
    ///
    /// The first index steps over whole `pointee` values; later indices
    /// select struct components or array elements.
    pub fn gep_offset(
        &self,
        types: &TypeTable<'_>,
        pointee: TypeId,
        indices: &[u64],
    ) -> Result<u64, IrError> {
        let Some((&first, rest)) = indices.split_first() else {
            return Ok(0);
        };
        let mut offset = first * self.size_of(types, pointee)?;
        let mut cur = pointee;
        for &index in rest {
            match types.get(cur) {
                IrType::Named(_) | IrType::Struct(_) => {
                    let slot = usize::try_from(index).map_err(|_| IrError::InvalidIndex {
                        ty: types.display(cur),
                        index,
                    })?;
                    offset += self.element_offset(types, cur, slot)?;
                    cur = types.struct_fields(cur)?[slot];
                }
                IrType::Array { elem, .. } => {
                    offset += index * self.size_of(types, *elem)?;
                    cur = *elem;
                }
                _ => {
                    return Err(IrError::NotAggregate {
                        ty: types.display(cur),
                    })
                }
            }
        }
        Ok(offset)
    }
}
