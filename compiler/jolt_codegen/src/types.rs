//! Lowering of resolved types and signatures to IR types.
//!
//! | Jolt type | IR type |
//! |---|---|
//! | `boolean` | `i1` |
//! | `byte` | `i8` |
//! | `short`, `char` | `i16` |
//! | `int` | `i32` |
//! | `long` | `i64` |
//! | `float` | `float` |
//! | `double` | `double` |
//! | `void` | `void` |
//! | class, type parameter, array | pointer to the erased class struct |
//! | `null` | `i8*` |

use jolt_llvm::{Module, TypeId, TypeTable};
use jolt_types::{MethodDecl, PrimitiveType, Type};

use crate::layout::ObjectLayout;
use crate::Result;

/// IR type of a primitive.
pub fn lower_primitive(types: &mut TypeTable<'_>, p: PrimitiveType) -> TypeId {
    match p {
        PrimitiveType::Boolean => types.i1(),
        PrimitiveType::Byte => types.i8(),
        PrimitiveType::Short | PrimitiveType::Char => types.i16(),
        PrimitiveType::Int => types.i32(),
        PrimitiveType::Long => types.i64(),
        PrimitiveType::Float => types.f32(),
        PrimitiveType::Double => types.f64(),
    }
}

impl ObjectLayout<'_> {
    /// IR type of a resolved type. References become pointers to the
    /// (possibly still opaque) struct of their erased class.
    pub fn ir_type(&mut self, module: &mut Module<'_>, ty: &Type) -> Result<TypeId> {
        match ty {
            Type::Void => Ok(module.types.void()),
            Type::Null => Ok(module.types.i8_ptr()),
            Type::Primitive(p) => Ok(lower_primitive(&mut module.types, *p)),
            Type::Class { .. } | Type::Param(_) | Type::Array(_) => {
                let id = self.struct_type_ref(module, ty)?;
                let named = module.types.named(id);
                Ok(module.types.ptr_to(named))
            }
        }
    }

    /// Function type of a procedure. Instance methods and constructors take
    /// a pointer to their container's struct as parameter 0.
    pub fn function_type(&mut self, module: &mut Module<'_>, method: &MethodDecl) -> Result<TypeId> {
        let mut params = Vec::with_capacity(method.formals.len() + 1);
        if method.has_receiver() {
            params.push(self.ir_type(module, &Type::class(method.container))?);
        }
        for formal in &method.formals {
            params.push(self.ir_type(module, formal)?);
        }
        let ret = self.ir_type(module, &method.return_type)?;
        Ok(module.types.function(ret, params))
    }
}
