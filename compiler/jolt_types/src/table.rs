//! The class table: arena of every class, field and method in a program.

use rustc_hash::FxHashMap;

use crate::ids::next_raw;
use crate::{
    ClassDecl, ClassId, FieldDecl, FieldId, Flags, MethodDecl, MethodId, ProcedureKind, Type,
};

/// Arena of resolved declarations.
///
/// Seeded with three built-in classes:
///
/// | Class | Role |
/// |---|---|
/// | `jolt.lang.Object` | root of the hierarchy, erasure of unbounded type parameters |
/// | `jolt.lang.String` | the platform string type (entry-point signature) |
/// | `jolt.lang.Array` | erasure of every array type; declares `length: int` |
pub struct ClassTable {
    classes: Vec<ClassDecl>,
    fields: Vec<FieldDecl>,
    methods: Vec<MethodDecl>,
    by_name: FxHashMap<String, ClassId>,
    object: ClassId,
    string: ClassId,
    array: ClassId,
    array_length: FieldId,
}

impl Default for ClassTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassTable {
    pub const OBJECT_NAME: &'static str = "jolt.lang.Object";
    pub const STRING_NAME: &'static str = "jolt.lang.String";
    pub const ARRAY_NAME: &'static str = "jolt.lang.Array";

    /// Create a table holding only the built-in classes.
    pub fn new() -> Self {
        let mut table = Self {
            classes: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            by_name: FxHashMap::default(),
            object: ClassId::new(0),
            string: ClassId::new(0),
            array: ClassId::new(0),
            array_length: FieldId::new(0),
        };

        table.object = table.push_class(Self::OBJECT_NAME, Flags::PUBLIC, None);
        let object_ty = Type::class(table.object);
        table.string = table.push_class(
            Self::STRING_NAME,
            Flags::PUBLIC | Flags::FINAL,
            Some(object_ty.clone()),
        );
        table.array = table.push_class(
            Self::ARRAY_NAME,
            Flags::PUBLIC | Flags::FINAL,
            Some(object_ty),
        );
        table.array_length = table.add_field(
            table.array,
            "length",
            Type::INT,
            Flags::PUBLIC | Flags::FINAL,
        );
        table
    }

    fn push_class(&mut self, name: &str, flags: Flags, superclass: Option<Type>) -> ClassId {
        let id = ClassId::new(next_raw(self.classes.len()));
        self.classes.push(ClassDecl {
            name: name.to_owned(),
            flags,
            superclass,
            type_params: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        });
        self.by_name.insert(name.to_owned(), id);
        id
    }

    // ── Built-ins ──────────────────────────────────────────────

    #[inline]
    pub fn object(&self) -> ClassId {
        self.object
    }

    #[inline]
    pub fn string(&self) -> ClassId {
        self.string
    }

    /// The class every array type erases to.
    #[inline]
    pub fn array_class(&self) -> ClassId {
        self.array
    }

    /// The `length` field of the array class.
    #[inline]
    pub fn array_length_field(&self) -> FieldId {
        self.array_length
    }

    // ── Declaration ────────────────────────────────────────────

    /// Declare a class. A missing superclass defaults to the root object class.
    pub fn declare_class(&mut self, name: &str, flags: Flags, superclass: Option<Type>) -> ClassId {
        let superclass = superclass.unwrap_or_else(|| Type::class(self.object));
        tracing::trace!(class = name, "declare class");
        self.push_class(name, flags, Some(superclass))
    }

    /// Declare a generic class with the given type parameter names.
    pub fn declare_generic_class(
        &mut self,
        name: &str,
        flags: Flags,
        superclass: Option<Type>,
        type_params: &[&str],
    ) -> ClassId {
        let id = self.declare_class(name, flags, superclass);
        self.classes[id.index()].type_params = type_params.iter().map(|p| (*p).to_owned()).collect();
        id
    }

    /// Declare a field on `container`, appended after its existing fields.
    pub fn add_field(&mut self, container: ClassId, name: &str, ty: Type, flags: Flags) -> FieldId {
        let id = FieldId::new(next_raw(self.fields.len()));
        self.fields.push(FieldDecl {
            name: name.to_owned(),
            container,
            ty,
            flags,
        });
        self.classes[container.index()].fields.push(id);
        id
    }

    /// Declare a method on `container`.
    pub fn add_method(
        &mut self,
        container: ClassId,
        name: &str,
        flags: Flags,
        formals: Vec<Type>,
        return_type: Type,
    ) -> MethodId {
        self.push_method(MethodDecl {
            name: name.to_owned(),
            container,
            flags,
            kind: ProcedureKind::Method,
            formals,
            return_type,
        })
    }

    /// Declare a constructor on `container`.
    pub fn add_constructor(&mut self, container: ClassId, flags: Flags, formals: Vec<Type>) -> MethodId {
        self.push_method(MethodDecl {
            name: "<init>".to_owned(),
            container,
            flags: flags.difference(Flags::STATIC),
            kind: ProcedureKind::Constructor,
            formals,
            return_type: Type::Void,
        })
    }

    fn push_method(&mut self, decl: MethodDecl) -> MethodId {
        let id = MethodId::new(next_raw(self.methods.len()));
        self.classes[decl.container.index()].methods.push(id);
        self.methods.push(decl);
        id
    }

    // ── Lookup ─────────────────────────────────────────────────

    #[inline]
    pub fn class(&self, id: ClassId) -> &ClassDecl {
        &self.classes[id.index()]
    }

    #[inline]
    pub fn field(&self, id: FieldId) -> &FieldDecl {
        &self.fields[id.index()]
    }

    #[inline]
    pub fn method(&self, id: MethodId) -> &MethodDecl {
        &self.methods[id.index()]
    }

    pub fn class_by_name(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    /// All classes in declaration order, built-ins first.
    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> {
        (0..self.classes.len()).map(|i| ClassId::new(next_raw(i)))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Erased direct superclass, `None` for the root.
    pub fn superclass(&self, id: ClassId) -> Option<ClassId> {
        self.class(id)
            .superclass
            .as_ref()
            .and_then(|sup| self.erase_class(sup))
    }

    /// `sub` is `sup` or inherits from it.
    pub fn is_subclass(&self, sub: ClassId, sup: ClassId) -> bool {
        let mut cur = Some(sub);
        while let Some(c) = cur {
            if c == sup {
                return true;
            }
            cur = self.superclass(c);
        }
        false
    }

    /// Find a field by name on `class` or its ancestors.
    pub fn find_field(&self, class: ClassId, name: &str) -> Option<FieldId> {
        let mut cur = Some(class);
        while let Some(c) = cur {
            if let Some(&f) = self
                .class(c)
                .fields
                .iter()
                .find(|&&f| self.field(f).name == name)
            {
                return Some(f);
            }
            cur = self.superclass(c);
        }
        None
    }

    /// Find a method declared directly on `class` by name and formal count.
    pub fn find_method(&self, class: ClassId, name: &str, arity: usize) -> Option<MethodId> {
        self.class(class)
            .methods
            .iter()
            .copied()
            .find(|&m| {
                let decl = self.method(m);
                decl.name == name && decl.formals.len() == arity
            })
    }

    /// Human-readable rendering of a type.
    pub fn display_type(&self, ty: &Type) -> String {
        match ty {
            Type::Void => "void".to_owned(),
            Type::Null => "null".to_owned(),
            Type::Primitive(p) => p.name().to_owned(),
            Type::Class { class, args } if args.is_empty() => self.class(*class).name.clone(),
            Type::Class { class, args } => {
                let args: Vec<String> = args.iter().map(|a| self.display_type(a)).collect();
                format!("{}<{}>", self.class(*class).name, args.join(", "))
            }
            Type::Param(p) => p.name.clone(),
            Type::Array(elem) => format!("{}[]", self.display_type(elem)),
        }
    }
}
