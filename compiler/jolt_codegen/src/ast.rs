//! Resolved syntax tree of a compilation unit.
//!
//! Produced by the front end after name resolution and type checking: every
//! expression carries its static type, every name is resolved to a
//! [`ClassId`], [`FieldId`], [`MethodId`] or [`LocalId`], and implicit
//! conversions the checker inserted appear as [`ExprKind::Cast`] nodes.
//!
//! Translation dispatches on these enums with `match`; there is no visitor.

use jolt_types::{ClassId, FieldId, LocalId, MethodId, Type};

/// Everything emitted into one module.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompilationUnit {
    pub classes: Vec<ClassBody>,
}

/// Procedure bodies of one class.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassBody {
    pub class: ClassId,
    pub procedures: Vec<ProcedureDecl>,
}

/// A method or constructor definition.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcedureDecl {
    pub method: MethodId,
    pub formals: Vec<Formal>,
    /// `None` for native and abstract procedures.
    pub body: Option<Block>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Formal {
    pub local: LocalId,
    pub name: String,
    pub ty: Type,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    LocalDecl {
        local: LocalId,
        name: String,
        ty: Type,
        init: Option<Expr>,
    },
    Return(Option<Expr>),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    Expr(Expr),
    Block(Block),
}

/// An assignable location.
#[derive(Clone, Debug, PartialEq)]
pub enum Place {
    Local(LocalId),
    Field { receiver: Box<Expr>, field: FieldId },
    StaticField(FieldId),
    ArrayElement { array: Box<Expr>, index: Box<Expr> },
}

/// An expression and its static type.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(u16),
    Null,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Short-circuit `&&`.
    And,
    /// Short-circuit `||`.
    Or,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    pub fn is_short_circuit(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    BitNot,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IncDecOp {
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl IncDecOp {
    pub fn is_increment(self) -> bool {
        matches!(self, IncDecOp::PreInc | IncDecOp::PostInc)
    }

    pub fn is_prefix(self) -> bool {
        matches!(self, IncDecOp::PreInc | IncDecOp::PreDec)
    }
}

/// `cond ? consequent : alternative`.
#[derive(Clone, Debug, PartialEq)]
pub struct Conditional {
    pub cond: Expr,
    pub consequent: Expr,
    pub alternative: Expr,
    pub ty: Type,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialKind {
    This,
    Super,
}

/// `this`, `super`, or a qualified `Outer.this`.
#[derive(Clone, Debug, PartialEq)]
pub struct Special {
    pub kind: SpecialKind,
    pub qualifier: Option<ClassId>,
    /// Static type: the enclosing class for `this`, its superclass for `super`.
    pub ty: Type,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Local(LocalId),
    Field {
        receiver: Box<Expr>,
        field: FieldId,
    },
    StaticField(FieldId),
    ArrayElement {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    ArrayLength(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    IncDec {
        op: IncDecOp,
        place: Box<Place>,
    },
    Assign {
        place: Box<Place>,
        value: Box<Expr>,
    },
    /// Conversion to the node's own type.
    Cast(Box<Expr>),
    Conditional(Box<Conditional>),
    Special(Special),
    /// `new C(args)`; the class is the node's type.
    New {
        constructor: MethodId,
        args: Vec<Expr>,
    },
    /// `new T[length]`; the array type is the node's type.
    NewArray {
        length: Box<Expr>,
    },
    /// Direct call. `receiver` is `None` for static methods and for
    /// instance methods called on the implicit `this`.
    Call {
        method: MethodId,
        receiver: Option<Box<Expr>>,
        args: Vec<Expr>,
    },
}

// ── Construction helpers ───────────────────────────────────────────

impl Expr {
    pub fn new(kind: ExprKind, ty: Type) -> Self {
        Self { kind, ty }
    }

    pub fn bool(value: bool) -> Self {
        Self::new(ExprKind::Literal(Literal::Bool(value)), Type::BOOLEAN)
    }

    pub fn int(value: i32) -> Self {
        Self::new(ExprKind::Literal(Literal::Int(value)), Type::INT)
    }

    pub fn long(value: i64) -> Self {
        Self::new(ExprKind::Literal(Literal::Long(value)), Type::LONG)
    }

    pub fn double(value: f64) -> Self {
        Self::new(ExprKind::Literal(Literal::Double(value)), Type::DOUBLE)
    }

    pub fn null() -> Self {
        Self::new(ExprKind::Literal(Literal::Null), Type::Null)
    }

    pub fn local(local: LocalId, ty: Type) -> Self {
        Self::new(ExprKind::Local(local), ty)
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr, ty: Type) -> Self {
        Self::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            ty,
        )
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        let ty = operand.ty.clone();
        Self::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            ty,
        )
    }

    pub fn inc_dec(op: IncDecOp, place: Place, ty: Type) -> Self {
        Self::new(
            ExprKind::IncDec {
                op,
                place: Box::new(place),
            },
            ty,
        )
    }

    pub fn assign(place: Place, value: Expr) -> Self {
        let ty = value.ty.clone();
        Self::new(
            ExprKind::Assign {
                place: Box::new(place),
                value: Box::new(value),
            },
            ty,
        )
    }

    pub fn cast(value: Expr, ty: Type) -> Self {
        Self::new(ExprKind::Cast(Box::new(value)), ty)
    }

    /// `cond ? consequent : alternative`, typed by the consequent.
    pub fn conditional(cond: Expr, consequent: Expr, alternative: Expr) -> Self {
        let ty = consequent.ty.clone();
        Self::new(
            ExprKind::Conditional(Box::new(Conditional {
                cond,
                consequent,
                alternative,
                ty: ty.clone(),
            })),
            ty,
        )
    }

    pub fn this(ty: Type) -> Self {
        Self::special(SpecialKind::This, None, ty)
    }

    pub fn super_(ty: Type) -> Self {
        Self::special(SpecialKind::Super, None, ty)
    }

    pub fn special(kind: SpecialKind, qualifier: Option<ClassId>, ty: Type) -> Self {
        Self::new(
            ExprKind::Special(Special {
                kind,
                qualifier,
                ty: ty.clone(),
            }),
            ty,
        )
    }

    pub fn field(receiver: Expr, field: FieldId, ty: Type) -> Self {
        Self::new(
            ExprKind::Field {
                receiver: Box::new(receiver),
                field,
            },
            ty,
        )
    }

    pub fn call(method: MethodId, receiver: Option<Expr>, args: Vec<Expr>, ty: Type) -> Self {
        Self::new(
            ExprKind::Call {
                method,
                receiver: receiver.map(Box::new),
                args,
            },
            ty,
        )
    }
}

impl Stmt {
    pub fn ret(value: Expr) -> Self {
        Stmt::Return(Some(value))
    }

    pub fn local(local: LocalId, name: &str, ty: Type, init: Option<Expr>) -> Self {
        Stmt::LocalDecl {
            local,
            name: name.to_owned(),
            ty,
            init,
        }
    }

    pub fn if_else(cond: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Self {
        Stmt::If {
            cond,
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        }
    }
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }
}
