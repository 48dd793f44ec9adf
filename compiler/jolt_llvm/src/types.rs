//! Interned IR types backed by LLVM types, plus named struct records.
//!
//! Structural types (`i32`, `i8*`, `{ i32, i8* }`, `[0 x i8]`) are interned:
//! equal types always share one [`TypeId`], so type equality is ID equality.
//! Each interned type carries its LLVM counterpart, created in the table's
//! [`Context`] when the type is first interned. The shape is kept alongside
//! so the builder can check operands without asking LLVM.
//!
//! Named structs are nominal. Each has a [`StructDef`] record, backed by an
//! LLVM identified struct, that moves through three states:
//!
//! ```text
//! Opaque ──begin_fill──▶ Filling ──finish_fill──▶ Filled
//!    ▲                      │
//!    └──────abort_fill──────┘
//! ```
//!
//! A pointer to an opaque struct is a complete type, so a class whose field
//! points back at itself can be described before its own body exists.
//! `begin_fill` returns `false` while a fill is already in progress, which
//! is the guard against re-entrant filling through a cycle.

use inkwell::context::Context;
use inkwell::types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum, FunctionType, StructType};
use inkwell::AddressSpace;
use rustc_hash::FxHashMap;

use crate::{IrError, StructId, TypeId};

/// Shape of an IR type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum IrType {
    Void,
    /// Integer of the given bit width (`i1`, `i8`, `i16`, `i32`, `i64`).
    Int(u32),
    /// 32-bit IEEE float.
    Float,
    /// 64-bit IEEE float.
    Double,
    /// Typed pointer.
    Ptr(TypeId),
    /// Nominal struct, see [`StructDef`].
    Named(StructId),
    /// Anonymous (literal) struct.
    Struct(Vec<TypeId>),
    /// Fixed-length array; `len == 0` marks a trailing variable-length region.
    Array { elem: TypeId, len: u32 },
    Function { ret: TypeId, params: Vec<TypeId> },
}

/// Fill state of a named struct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StructState {
    Opaque,
    Filling,
    Filled(Vec<TypeId>),
}

/// A named struct record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructDef<'ctx> {
    /// Name as LLVM knows it. LLVM uniques names per context, so this can
    /// carry a numeric suffix when the requested name was already taken.
    pub name: String,
    pub state: StructState,
    pub llvm: StructType<'ctx>,
}

impl StructDef<'_> {
    /// Body types once filled.
    pub fn body(&self) -> Option<&[TypeId]> {
        match &self.state {
            StructState::Filled(body) => Some(body),
            StructState::Opaque | StructState::Filling => None,
        }
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        matches!(self.state, StructState::Filled(_))
    }
}

/// LLVM form of an interned type.
#[derive(Clone, Copy, Debug)]
enum Lowered<'ctx> {
    Void,
    Basic(BasicTypeEnum<'ctx>),
    Function(FunctionType<'ctx>),
}

/// Type interner plus named struct arena.
pub struct TypeTable<'ctx> {
    context: &'ctx Context,
    types: Vec<IrType>,
    lowered: Vec<Lowered<'ctx>>,
    interned: FxHashMap<IrType, TypeId>,
    structs: Vec<StructDef<'ctx>>,
    struct_names: FxHashMap<String, StructId>,
}

impl<'ctx> TypeTable<'ctx> {
    pub fn new(context: &'ctx Context) -> Self {
        Self {
            context,
            types: Vec::new(),
            lowered: Vec::new(),
            interned: FxHashMap::default(),
            structs: Vec::new(),
            struct_names: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn context(&self) -> &'ctx Context {
        self.context
    }

    /// Intern a type, returning the existing ID for an equal type.
    pub fn intern(&mut self, ty: IrType) -> TypeId {
        if let Some(&id) = self.interned.get(&ty) {
            return id;
        }
        let lowered = self.lower(&ty);
        let id = TypeId::next(self.types.len());
        self.types.push(ty.clone());
        self.lowered.push(lowered);
        self.interned.insert(ty, id);
        id
    }

    #[inline]
    pub fn get(&self, id: TypeId) -> &IrType {
        &self.types[id.index()]
    }

    fn lower(&self, ty: &IrType) -> Lowered<'ctx> {
        let cx = self.context;
        match ty {
            IrType::Void => Lowered::Void,
            IrType::Int(bits) => Lowered::Basic(cx.custom_width_int_type(*bits).into()),
            IrType::Float => Lowered::Basic(cx.f32_type().into()),
            IrType::Double => Lowered::Basic(cx.f64_type().into()),
            IrType::Ptr(pointee) => {
                let ptr = match self.lowered[pointee.index()] {
                    Lowered::Basic(basic) => basic.ptr_type(AddressSpace::default()),
                    Lowered::Function(func) => func.ptr_type(AddressSpace::default()),
                    Lowered::Void => cx.i8_type().ptr_type(AddressSpace::default()),
                };
                Lowered::Basic(ptr.into())
            }
            IrType::Named(id) => Lowered::Basic(self.structs[id.index()].llvm.into()),
            IrType::Struct(fields) => {
                let fields: Vec<BasicTypeEnum<'ctx>> =
                    fields.iter().map(|&f| self.value_type_or_byte(f)).collect();
                Lowered::Basic(cx.struct_type(&fields, false).into())
            }
            IrType::Array { elem, len } => {
                Lowered::Basic(self.value_type_or_byte(*elem).array_type(*len).into())
            }
            IrType::Function { ret, params } => {
                let params: Vec<BasicMetadataTypeEnum<'ctx>> = params
                    .iter()
                    .map(|&p| self.value_type_or_byte(p).into())
                    .collect();
                let func = match self.lowered[ret.index()] {
                    Lowered::Basic(basic) => basic.fn_type(&params, false),
                    Lowered::Void | Lowered::Function(_) => cx.void_type().fn_type(&params, false),
                };
                Lowered::Function(func)
            }
        }
    }

    /// LLVM type of a first-class type. `void` and function types stand in
    /// as `i8` inside aggregates; the code generator never builds those.
    fn value_type_or_byte(&self, ty: TypeId) -> BasicTypeEnum<'ctx> {
        match self.lowered[ty.index()] {
            Lowered::Basic(basic) => basic,
            Lowered::Void | Lowered::Function(_) => {
                tracing::error!(ty = %self.display(ty), "non-value type inside an aggregate");
                self.context.i8_type().into()
            }
        }
    }

    // ── Constructors ───────────────────────────────────────────

    pub fn void(&mut self) -> TypeId {
        self.intern(IrType::Void)
    }

    pub fn int(&mut self, bits: u32) -> TypeId {
        self.intern(IrType::Int(bits))
    }

    pub fn i1(&mut self) -> TypeId {
        self.int(1)
    }

    pub fn i8(&mut self) -> TypeId {
        self.int(8)
    }

    pub fn i16(&mut self) -> TypeId {
        self.int(16)
    }

    pub fn i32(&mut self) -> TypeId {
        self.int(32)
    }

    pub fn i64(&mut self) -> TypeId {
        self.int(64)
    }

    pub fn f32(&mut self) -> TypeId {
        self.intern(IrType::Float)
    }

    pub fn f64(&mut self) -> TypeId {
        self.intern(IrType::Double)
    }

    pub fn ptr_to(&mut self, pointee: TypeId) -> TypeId {
        self.intern(IrType::Ptr(pointee))
    }

    /// `i8*`, the untyped pointer.
    pub fn i8_ptr(&mut self) -> TypeId {
        let i8 = self.i8();
        self.ptr_to(i8)
    }

    pub fn literal_struct(&mut self, fields: Vec<TypeId>) -> TypeId {
        self.intern(IrType::Struct(fields))
    }

    pub fn array(&mut self, elem: TypeId, len: u32) -> TypeId {
        self.intern(IrType::Array { elem, len })
    }

    pub fn function(&mut self, ret: TypeId, params: Vec<TypeId>) -> TypeId {
        self.intern(IrType::Function { ret, params })
    }

    /// The type referring to a named struct.
    pub fn named(&mut self, id: StructId) -> TypeId {
        self.intern(IrType::Named(id))
    }

    // ── Queries ────────────────────────────────────────────────

    /// Pointee of a pointer type.
    pub fn pointee(&self, ty: TypeId) -> Option<TypeId> {
        match self.get(ty) {
            IrType::Ptr(p) => Some(*p),
            _ => None,
        }
    }

    #[inline]
    pub fn is_pointer(&self, ty: TypeId) -> bool {
        matches!(self.get(ty), IrType::Ptr(_))
    }

    #[inline]
    pub fn is_void(&self, ty: TypeId) -> bool {
        matches!(self.get(ty), IrType::Void)
    }

    /// Bit width of an integer type.
    pub fn int_width(&self, ty: TypeId) -> Option<u32> {
        match self.get(ty) {
            IrType::Int(bits) => Some(*bits),
            _ => None,
        }
    }

    #[inline]
    pub fn is_floating(&self, ty: TypeId) -> bool {
        matches!(self.get(ty), IrType::Float | IrType::Double)
    }

    /// Return and parameter types of a function type.
    pub fn function_signature(&self, ty: TypeId) -> Result<(TypeId, &[TypeId]), IrError> {
        match self.get(ty) {
            IrType::Function { ret, params } => Ok((*ret, params)),
            _ => Err(IrError::NotAFunction {
                ty: self.display(ty),
            }),
        }
    }

    /// Component types of a literal struct or filled named struct.
    pub fn struct_fields(&self, ty: TypeId) -> Result<&[TypeId], IrError> {
        match self.get(ty) {
            IrType::Struct(fields) => Ok(fields),
            IrType::Named(id) => {
                let def = self.struct_def(*id);
                def.body().ok_or_else(|| IrError::OpaqueStruct {
                    name: def.name.clone(),
                })
            }
            _ => Err(IrError::NotAggregate {
                ty: self.display(ty),
            }),
        }
    }

    /// LLVM type of a first-class (storable) type.
    pub fn basic_type(&self, ty: TypeId) -> Result<BasicTypeEnum<'ctx>, IrError> {
        match self.lowered[ty.index()] {
            Lowered::Basic(basic) => Ok(basic),
            Lowered::Void | Lowered::Function(_) => Err(IrError::Unsized {
                ty: self.display(ty),
            }),
        }
    }

    /// LLVM type of a function type.
    pub fn function_type(&self, ty: TypeId) -> Result<FunctionType<'ctx>, IrError> {
        match self.lowered[ty.index()] {
            Lowered::Function(func) => Ok(func),
            Lowered::Void | Lowered::Basic(_) => Err(IrError::NotAFunction {
                ty: self.display(ty),
            }),
        }
    }

    /// Check that a type has a known size: first-class, with every named
    /// struct it contains by value already filled.
    pub fn check_sized(&self, ty: TypeId) -> Result<(), IrError> {
        match self.get(ty) {
            IrType::Int(_) | IrType::Float | IrType::Double | IrType::Ptr(_) => Ok(()),
            IrType::Named(_) | IrType::Struct(_) => self
                .struct_fields(ty)?
                .iter()
                .try_for_each(|&field| self.check_sized(field)),
            IrType::Array { elem, .. } => self.check_sized(*elem),
            IrType::Void | IrType::Function { .. } => Err(IrError::Unsized {
                ty: self.display(ty),
            }),
        }
    }

    // ── Named structs ──────────────────────────────────────────

    /// Look up a named struct, declaring it opaque on first use.
    pub fn get_or_create_named_struct(&mut self, name: &str) -> StructId {
        if let Some(&id) = self.struct_names.get(name) {
            return id;
        }
        let llvm = self.context.opaque_struct_type(name);
        let actual = llvm
            .get_name()
            .map_or_else(|| name.to_owned(), |n| n.to_string_lossy().into_owned());
        let id = StructId::next(self.structs.len());
        self.structs.push(StructDef {
            name: actual,
            state: StructState::Opaque,
            llvm,
        });
        self.struct_names.insert(name.to_owned(), id);
        tracing::trace!(name, "declare opaque struct");
        id
    }

    pub fn struct_by_name(&self, name: &str) -> Option<StructId> {
        self.struct_names.get(name).copied()
    }

    #[inline]
    pub fn struct_def(&self, id: StructId) -> &StructDef<'ctx> {
        &self.structs[id.index()]
    }

    pub fn structs(&self) -> impl Iterator<Item = (StructId, &StructDef<'ctx>)> {
        self.structs
            .iter()
            .enumerate()
            .map(|(i, def)| (StructId::next(i), def))
    }

    /// Claim an opaque struct for filling.
    ///
    /// Returns `true` if the caller must now compute the body and call
    /// [`finish_fill`](Self::finish_fill). Returns `false` when the struct is
    /// already filled or is being filled further up the call stack.
    pub fn begin_fill(&mut self, id: StructId) -> bool {
        let def = &mut self.structs[id.index()];
        match def.state {
            StructState::Opaque => {
                def.state = StructState::Filling;
                true
            }
            StructState::Filling | StructState::Filled(_) => false,
        }
    }

    /// Attach the body to a struct claimed with [`begin_fill`](Self::begin_fill).
    pub fn finish_fill(&mut self, id: StructId, body: Vec<TypeId>) -> Result<(), IrError> {
        if self.structs[id.index()].is_filled() {
            return Err(IrError::StructRefilled {
                name: self.structs[id.index()].name.clone(),
            });
        }
        let fields: Vec<BasicTypeEnum<'ctx>> =
            body.iter().map(|&f| self.value_type_or_byte(f)).collect();
        let def = &mut self.structs[id.index()];
        def.llvm.set_body(&fields, false);
        tracing::trace!(name = %def.name, fields = body.len(), "fill struct");
        def.state = StructState::Filled(body);
        Ok(())
    }

    /// Return a claimed struct to the opaque state after a failed body computation.
    pub fn abort_fill(&mut self, id: StructId) {
        let def = &mut self.structs[id.index()];
        if def.state == StructState::Filling {
            def.state = StructState::Opaque;
        }
    }

    // ── Rendering ──────────────────────────────────────────────

    /// LLVM assembly spelling of a type.
    pub fn display(&self, ty: TypeId) -> String {
        if let IrType::Named(id) = self.get(ty) {
            // LLVM prints a named struct together with its body.
            return format!("%{}", self.struct_def(*id).name);
        }
        match self.lowered[ty.index()] {
            Lowered::Void => "void".to_owned(),
            Lowered::Basic(basic) => basic.print_to_string().to_string(),
            Lowered::Function(func) => func.print_to_string().to_string(),
        }
    }
}
