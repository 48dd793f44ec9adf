//! Module, functions, values and globals.
//!
//! [`Module`] wraps one LLVM module together with the arenas the ID-based
//! API indexes into. Every LLVM value the builder creates is recorded with
//! its [`TypeId`], so callers reason about types without LLVM round trips.

use std::fmt;

use inkwell::basic_block::BasicBlock;
use inkwell::context::Context;
use inkwell::module::Module as LlvmModule;
use inkwell::types::BasicTypeEnum;
use inkwell::values::{AnyValue, BasicValueEnum, FunctionValue};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    BlockId, DataLayout, FunctionId, GlobalId, IrError, TargetLayout, TypeId, TypeTable, ValueId,
};

// ── Values ──────────────────────────────────────────────────────────

/// A GEP index: a constant (required for struct components) or a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GepIndex {
    Const(u32),
    Value(ValueId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    SDiv,
    SRem,
    And,
    Or,
    Xor,
    FAdd,
    FSub,
    FMul,
    FDiv,
    FRem,
}

impl BinaryOp {
    pub const fn is_floating(self) -> bool {
        matches!(
            self,
            Self::FAdd | Self::FSub | Self::FMul | Self::FDiv | Self::FRem
        )
    }
}

/// Comparison predicate. Integer operands compare signed, floating operands
/// compare ordered; pointers compare by address (`Eq`/`Ne` only).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CmpPredicate {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Numeric conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CastOp {
    /// Sign-extend to a wider integer.
    SExt,
    /// Zero-extend to a wider integer.
    ZExt,
    /// Truncate to a narrower integer.
    Trunc,
    SIToFP,
    FPToSI,
    FPExt,
    FPTrunc,
}

impl CastOp {
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::SExt => "sext",
            Self::ZExt => "zext",
            Self::Trunc => "trunc",
            Self::SIToFP => "sitofp",
            Self::FPToSI => "fptosi",
            Self::FPExt => "fpext",
            Self::FPTrunc => "fptrunc",
        }
    }
}

/// A value in the module-wide value arena.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueData<'ctx> {
    pub ty: TypeId,
    pub value: BasicValueEnum<'ctx>,
}

impl ValueData<'_> {
    /// The value as a signed integer constant, if it is one.
    pub fn as_const_int(&self) -> Option<i64> {
        match self.value {
            BasicValueEnum::IntValue(int) if int.is_const() => int.get_sign_extended_constant(),
            _ => None,
        }
    }
}

// ── Functions and globals ───────────────────────────────────────────

/// A function. Declarations have no blocks.
#[derive(Clone, Debug, PartialEq)]
pub struct Function<'ctx> {
    pub name: String,
    /// The function type.
    pub ty: TypeId,
    pub return_type: TypeId,
    pub params: Vec<ValueId>,
    pub value: FunctionValue<'ctx>,
    /// `blocks[0]` is the entry block.
    pub(crate) blocks: Vec<BasicBlock<'ctx>>,
}

impl<'ctx> Function<'ctx> {
    #[inline]
    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    #[inline]
    pub fn block(&self, id: BlockId) -> BasicBlock<'ctx> {
        self.blocks[id.index()]
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Name of a block as LLVM spells it.
    pub fn block_name(&self, id: BlockId) -> String {
        self.block(id).get_name().to_string_lossy().into_owned()
    }

    /// Find a block by name.
    pub fn block_named(&self, name: &str) -> Option<BlockId> {
        self.blocks
            .iter()
            .position(|b| b.get_name().to_bytes() == name.as_bytes())
            .map(BlockId::next)
    }

    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> {
        (0..self.blocks.len()).map(BlockId::next)
    }

    /// Whether a block already ends in a terminator.
    pub fn is_terminated(&self, id: BlockId) -> bool {
        self.block(id).get_terminator().is_some()
    }
}

/// A zero-initialized module global.
#[derive(Clone, Debug, PartialEq)]
pub struct Global {
    pub name: String,
    /// Type of the stored value.
    pub ty: TypeId,
    /// The global's address, a `ty*` value.
    pub address: ValueId,
}

// ── Module ──────────────────────────────────────────────────────────

/// One compilation unit's IR.
pub struct Module<'ctx> {
    pub name: String,
    pub types: TypeTable<'ctx>,
    pub layout: TargetLayout,
    llmod: LlvmModule<'ctx>,
    values: Vec<ValueData<'ctx>>,
    functions: Vec<Function<'ctx>>,
    globals: Vec<Global>,
    function_names: FxHashMap<String, FunctionId>,
    global_names: FxHashMap<String, GlobalId>,
}

impl fmt::Debug for Module<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("layout", &self.layout.data_layout())
            .field("functions", &self.functions.len())
            .field("globals", &self.globals.len())
            .finish_non_exhaustive()
    }
}

impl<'ctx> Module<'ctx> {
    pub fn new(context: &'ctx Context, name: &str, layout: DataLayout) -> Self {
        let llmod = context.create_module(name);
        let layout = TargetLayout::new(layout);
        llmod.set_data_layout(&layout.target_data().get_data_layout());
        Self {
            name: name.to_owned(),
            types: TypeTable::new(context),
            layout,
            llmod,
            values: Vec::new(),
            functions: Vec::new(),
            globals: Vec::new(),
            function_names: FxHashMap::default(),
            global_names: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn context(&self) -> &'ctx Context {
        self.types.context()
    }

    /// The underlying LLVM module, for handing to an execution engine or
    /// an object emitter.
    #[inline]
    pub fn llvm_module(&self) -> &LlvmModule<'ctx> {
        &self.llmod
    }

    // ── Values ─────────────────────────────────────────────────

    pub(crate) fn push_value(&mut self, ty: TypeId, value: BasicValueEnum<'ctx>) -> ValueId {
        let id = ValueId::next(self.values.len());
        self.values.push(ValueData { ty, value });
        id
    }

    #[inline]
    pub fn value(&self, id: ValueId) -> &ValueData<'ctx> {
        &self.values[id.index()]
    }

    #[inline]
    pub fn value_type(&self, id: ValueId) -> TypeId {
        self.values[id.index()].ty
    }

    /// Integer constant of the given integer type.
    pub fn const_int(&mut self, ty: TypeId, value: i64) -> Result<ValueId, IrError> {
        let BasicTypeEnum::IntType(int) = self.types.basic_type(ty)? else {
            return Err(IrError::TypeMismatch {
                expected: "integer".to_owned(),
                found: self.types.display(ty),
            });
        };
        #[allow(clippy::cast_sign_loss, reason = "two's complement bits, sign-extended by LLVM")]
        let constant = int.const_int(value as u64, value < 0);
        Ok(self.push_value(ty, constant.into()))
    }

    fn const_sized_int(&mut self, bits: u32, value: i64) -> ValueId {
        let ty = self.types.int(bits);
        #[allow(clippy::cast_sign_loss, reason = "two's complement bits, sign-extended by LLVM")]
        let constant = self
            .context()
            .custom_width_int_type(bits)
            .const_int(value as u64, value < 0);
        self.push_value(ty, constant.into())
    }

    pub fn const_bool(&mut self, value: bool) -> ValueId {
        self.const_sized_int(1, i64::from(value))
    }

    pub fn const_i32(&mut self, value: i32) -> ValueId {
        self.const_sized_int(32, i64::from(value))
    }

    pub fn const_i64(&mut self, value: i64) -> ValueId {
        self.const_sized_int(64, value)
    }

    /// Floating constant of the given floating type.
    pub fn const_float(&mut self, ty: TypeId, value: f64) -> Result<ValueId, IrError> {
        let BasicTypeEnum::FloatType(float) = self.types.basic_type(ty)? else {
            return Err(IrError::TypeMismatch {
                expected: "floating point".to_owned(),
                found: self.types.display(ty),
            });
        };
        Ok(self.push_value(ty, float.const_float(value).into()))
    }

    /// Null of a pointer type.
    pub fn const_null(&mut self, ptr_ty: TypeId) -> Result<ValueId, IrError> {
        let BasicTypeEnum::PointerType(ptr) = self.types.basic_type(ptr_ty)? else {
            return Err(IrError::NotAPointer {
                found: self.types.display(ptr_ty),
            });
        };
        Ok(self.push_value(ptr_ty, ptr.const_null().into()))
    }

    /// Zero of an integer, floating or pointer type.
    pub fn const_zero(&mut self, ty: TypeId) -> Result<ValueId, IrError> {
        if self.types.is_floating(ty) {
            self.const_float(ty, 0.0)
        } else if self.types.is_pointer(ty) {
            self.const_null(ty)
        } else {
            self.const_int(ty, 0)
        }
    }

    // ── Functions ──────────────────────────────────────────────

    /// Get a function by name, declaring it with `fn_ty` if absent.
    ///
    /// An existing function with a different type is an error.
    pub fn get_or_declare_function(
        &mut self,
        name: &str,
        fn_ty: TypeId,
    ) -> Result<FunctionId, IrError> {
        if let Some(&id) = self.function_names.get(name) {
            let existing = self.functions[id.index()].ty;
            if existing != fn_ty {
                return Err(IrError::SignatureMismatch {
                    name: name.to_owned(),
                    existing: self.types.display(existing),
                    requested: self.types.display(fn_ty),
                });
            }
            return Ok(id);
        }

        let (ret, param_tys) = {
            let (ret, params) = self.types.function_signature(fn_ty)?;
            (ret, params.to_vec())
        };
        let value = self
            .llmod
            .add_function(name, self.types.function_type(fn_ty)?, None);
        let params = param_tys
            .iter()
            .zip(value.get_param_iter())
            .map(|(&ty, param)| self.push_value(ty, param))
            .collect();
        let id = FunctionId::next(self.functions.len());
        self.functions.push(Function {
            name: name.to_owned(),
            ty: fn_ty,
            return_type: ret,
            params,
            value,
            blocks: Vec::new(),
        });
        self.function_names.insert(name.to_owned(), id);
        Ok(id)
    }

    pub fn get_function(&self, name: &str) -> Option<FunctionId> {
        self.function_names.get(name).copied()
    }

    #[inline]
    pub fn function(&self, id: FunctionId) -> &Function<'ctx> {
        &self.functions[id.index()]
    }

    #[inline]
    pub(crate) fn function_mut(&mut self, id: FunctionId) -> &mut Function<'ctx> {
        &mut self.functions[id.index()]
    }

    pub fn functions(&self) -> impl Iterator<Item = (FunctionId, &Function<'ctx>)> {
        self.functions
            .iter()
            .enumerate()
            .map(|(i, f)| (FunctionId::next(i), f))
    }

    /// Name a parameter in the printed IR.
    pub fn set_param_name(&mut self, func: FunctionId, index: u32, name: &str) {
        let params = &self.functions[func.index()].params;
        if let Some(&param) = usize::try_from(index).ok().and_then(|i| params.get(i)) {
            self.values[param.index()].value.set_name(name);
        }
    }

    // ── Globals ────────────────────────────────────────────────

    /// Get a global by name, adding a zero-initialized one of `ty` if absent.
    pub fn get_or_add_global(&mut self, name: &str, ty: TypeId) -> Result<GlobalId, IrError> {
        if let Some(&id) = self.global_names.get(name) {
            let existing = self.globals[id.index()].ty;
            if existing != ty {
                return Err(IrError::SignatureMismatch {
                    name: name.to_owned(),
                    existing: self.types.display(existing),
                    requested: self.types.display(ty),
                });
            }
            return Ok(id);
        }
        self.types.check_sized(ty)?;
        let llvm_ty = self.types.basic_type(ty)?;
        let global = self.llmod.add_global(llvm_ty, None, name);
        let zero: BasicValueEnum<'ctx> = match llvm_ty {
            BasicTypeEnum::IntType(t) => t.const_zero().into(),
            BasicTypeEnum::FloatType(t) => t.const_zero().into(),
            BasicTypeEnum::PointerType(t) => t.const_null().into(),
            BasicTypeEnum::StructType(t) => t.const_zero().into(),
            BasicTypeEnum::ArrayType(t) => t.const_zero().into(),
            _ => {
                return Err(IrError::TypeMismatch {
                    expected: "scalar or aggregate".to_owned(),
                    found: self.types.display(ty),
                })
            }
        };
        global.set_initializer(&zero);

        let ptr = self.types.ptr_to(ty);
        let address = self.push_value(ptr, global.as_pointer_value().into());
        let id = GlobalId::next(self.globals.len());
        self.globals.push(Global {
            name: name.to_owned(),
            ty,
            address,
        });
        self.global_names.insert(name.to_owned(), id);
        Ok(id)
    }

    pub fn get_global(&self, name: &str) -> Option<GlobalId> {
        self.global_names.get(name).copied()
    }

    #[inline]
    pub fn global(&self, id: GlobalId) -> &Global {
        &self.globals[id.index()]
    }

    pub fn globals(&self) -> impl Iterator<Item = (GlobalId, &Global)> {
        self.globals
            .iter()
            .enumerate()
            .map(|(i, g)| (GlobalId::next(i), g))
    }
}

// ── Printing and verification ───────────────────────────────────────

/// LLVM assembly for the whole module.
pub fn print_module(module: &Module<'_>) -> String {
    module.llmod.print_to_string().to_string()
}

/// LLVM assembly for one function.
pub fn print_function(module: &Module<'_>, function: FunctionId) -> String {
    module.function(function).value.print_to_string().to_string()
}

/// A module that LLVM's verifier rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid module `{module}`: {message}")]
pub struct VerifyError {
    pub module: String,
    pub message: String,
}

/// Run LLVM's module verifier.
pub fn verify_module(module: &Module<'_>) -> Result<(), VerifyError> {
    module.llmod.verify().map_err(|message| VerifyError {
        module: module.name.clone(),
        message: message.to_string().trim_end().to_owned(),
    })
}
