//! Symbol names for classes, dispatch vectors, procedures and static fields.
//!
//! Procedure and static field symbols use length-prefixed components so that
//! no two distinct declarations collide:
//!
//! ```text
//! class struct      class.<fqn>
//! dv struct         dv.<fqn>
//! dv instance       _V<len><fqn>
//! procedure         _J<len><fqn><len><name>_<formal codes>
//! static field      _S<len><fqn><len><name>
//! ```
//!
//! Formal codes: `Z` boolean, `B` byte, `S` short, `C` char, `I` int,
//! `J` long, `F` float, `D` double, `L<len><fqn>` class (after erasure),
//! `A<code>` array.

use std::fmt::Write;

use jolt_types::{ClassTable, FieldDecl, MethodDecl, PrimitiveType, ProcedureKind, Type};

/// Name mangling strategy.
pub trait Mangler {
    /// Named struct of a class's object layout.
    fn class_struct(&self, fqn: &str) -> String {
        format!("class.{fqn}")
    }

    /// Named struct of a class's dispatch vector.
    fn dispatch_vector_struct(&self, fqn: &str) -> String {
        format!("dv.{fqn}")
    }

    /// Global holding a class's dispatch vector.
    fn dispatch_vector_global(&self, fqn: &str) -> String;

    /// Function symbol of a method or constructor.
    fn procedure(&self, classes: &ClassTable, method: &MethodDecl) -> String;

    /// Global symbol of a static field.
    fn static_field(&self, classes: &ClassTable, field: &FieldDecl) -> String;
}

/// Default Jolt mangling, see the module docs.
#[derive(Clone, Copy, Debug, Default)]
pub struct JoltMangler;

impl Mangler for JoltMangler {
    fn dispatch_vector_global(&self, fqn: &str) -> String {
        format!("_V{}{fqn}", fqn.len())
    }

    fn procedure(&self, classes: &ClassTable, method: &MethodDecl) -> String {
        let fqn = &classes.class(method.container).name;
        let name = match method.kind {
            ProcedureKind::Method => method.name.as_str(),
            ProcedureKind::Constructor => "$init",
        };
        let mut out = format!("_J{}{fqn}{}{name}_", fqn.len(), name.len());
        for formal in &method.formals {
            push_type_code(&mut out, classes, formal);
        }
        out
    }

    fn static_field(&self, classes: &ClassTable, field: &FieldDecl) -> String {
        let fqn = &classes.class(field.container).name;
        format!("_S{}{fqn}{}{}", fqn.len(), field.name.len(), field.name)
    }
}

fn push_type_code(out: &mut String, classes: &ClassTable, ty: &Type) {
    match ty {
        Type::Primitive(p) => out.push(primitive_code(*p)),
        Type::Array(elem) => {
            out.push('A');
            push_type_code(out, classes, elem);
        }
        Type::Void => out.push('V'),
        Type::Class { .. } | Type::Param(_) | Type::Null => {
            let class = classes.erase_class(ty).unwrap_or_else(|| classes.object());
            let fqn = &classes.class(class).name;
            let _ = write!(out, "L{}{fqn}", fqn.len());
        }
    }
}

fn primitive_code(p: PrimitiveType) -> char {
    match p {
        PrimitiveType::Boolean => 'Z',
        PrimitiveType::Byte => 'B',
        PrimitiveType::Short => 'S',
        PrimitiveType::Char => 'C',
        PrimitiveType::Int => 'I',
        PrimitiveType::Long => 'J',
        PrimitiveType::Float => 'F',
        PrimitiveType::Double => 'D',
    }
}
