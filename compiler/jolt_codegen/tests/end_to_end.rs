//! End-to-end translation tests.
//!
//! Each test builds a small typed program, translates the whole unit with
//! [`compile_unit`] and runs the result on LLVM's JIT, checking the values
//! procedures return and the bytes objects occupy.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(unsafe_code, reason = "JIT-compiled procedures are called through raw function pointers")]

use std::alloc::Layout;
use std::cell::RefCell;
use std::sync::Once;

use inkwell::context::Context;
use inkwell::execution_engine::ExecutionEngine;
use inkwell::targets::{InitializationConfig, Target};
use inkwell::OptimizationLevel;

use jolt_codegen::ast::{
    BinaryOp, Block, ClassBody, CompilationUnit, Expr, ExprKind, Formal, IncDecOp, Place, ProcedureDecl, Stmt,
};
use jolt_codegen::{compile_unit, CodegenError, CodegenOptions, DebugEvent, DebugLevel, JoltMangler, Mangler};
use jolt_llvm::print_module;
use jolt_types::{ClassId, ClassTable, Flags, LocalId, MethodId, Type};
use pretty_assertions::assert_eq;

// -- Fixture --

/// ```text
/// class app.Shape { int sides; }
/// class app.Square extends Shape {
///     Square() {}
///     int viaSuper() { return super.sides; }
/// }
/// class app.Point {
///     int x; long y;
///     Point(int x) { this.x = x; }
///     int getX() { return this.x; }
/// }
/// class app.Main {
///     static int total;
///     public static void main(String[] args) {}
///     static int makePoint() { Point p = new Point(5); return p.getX(); }
///     static int pick(boolean b) { return b ? 10 : 20; }
///     static int sum(int n) { int i = 0; int s = 0; while (i < n) { s = s + i; i++; } return s; }
///     static int safe(int x) { return x != 0 && 10 / x > 1 ? 1 : 0; }
///     static int bump() { total++; ++total; return total; }
///     static int[] newInts(int n) { return new int[n]; }
///     static int arrays(int n) { int[] a = new int[n]; a[2] = 7; return a[2] + a.length; }
///     static int shapeSides() { Square s = new Square(); s.sides = 4; return s.viaSuper(); }
/// }
/// ```
struct Program {
    classes: ClassTable,
    unit: CompilationUnit,
    point: ClassId,
    main: ClassId,
}

fn formal(index: u32, name: &str, ty: Type) -> Formal {
    Formal {
        local: LocalId::new(index),
        name: name.to_owned(),
        ty,
    }
}

fn define(method: MethodId, formals: Vec<Formal>, stmts: Vec<Stmt>) -> ProcedureDecl {
    ProcedureDecl {
        method,
        formals,
        body: Some(Block::new(stmts)),
    }
}

fn local(index: u32) -> LocalId {
    LocalId::new(index)
}

#[allow(clippy::too_many_lines, reason = "one fixture program")]
fn program() -> Program {
    let mut classes = ClassTable::new();
    let int_array = Type::array_of(Type::INT);

    // Shape / Square
    let shape = classes.declare_class("app.Shape", Flags::PUBLIC, None);
    let sides = classes.add_field(shape, "sides", Type::INT, Flags::PUBLIC);
    let square = classes.declare_class("app.Square", Flags::PUBLIC, Some(Type::class(shape)));
    let square_ctor = classes.add_constructor(square, Flags::PUBLIC, vec![]);
    let via_super = classes.add_method(square, "viaSuper", Flags::PUBLIC, vec![], Type::INT);

    // Point
    let point = classes.declare_class("app.Point", Flags::PUBLIC, None);
    let point_ty = Type::class(point);
    let x = classes.add_field(point, "x", Type::INT, Flags::PRIVATE);
    classes.add_field(point, "y", Type::LONG, Flags::PRIVATE);
    let point_ctor = classes.add_constructor(point, Flags::PUBLIC, vec![Type::INT]);
    let get_x = classes.add_method(point, "getX", Flags::PUBLIC, vec![], Type::INT);

    // Main
    let main = classes.declare_class("app.Main", Flags::PUBLIC, None);
    let total = classes.add_field(main, "total", Type::INT, Flags::STATIC);
    let args_ty = Type::array_of(Type::class(classes.string()));
    let ps = Flags::PUBLIC | Flags::STATIC;
    let entry = classes.add_method(main, "main", ps, vec![args_ty.clone()], Type::Void);
    let make_point = classes.add_method(main, "makePoint", Flags::STATIC, vec![], Type::INT);
    let pick = classes.add_method(main, "pick", Flags::STATIC, vec![Type::BOOLEAN], Type::INT);
    let sum = classes.add_method(main, "sum", Flags::STATIC, vec![Type::INT], Type::INT);
    let safe = classes.add_method(main, "safe", Flags::STATIC, vec![Type::INT], Type::INT);
    let bump = classes.add_method(main, "bump", Flags::STATIC, vec![], Type::INT);
    let new_ints = classes.add_method(main, "newInts", Flags::STATIC, vec![Type::INT], int_array.clone());
    let arrays = classes.add_method(main, "arrays", Flags::STATIC, vec![Type::INT], Type::INT);
    let shape_sides = classes.add_method(main, "shapeSides", Flags::STATIC, vec![], Type::INT);

    let shape_body = ClassBody {
        class: shape,
        procedures: vec![],
    };
    let square_body = ClassBody {
        class: square,
        procedures: vec![
            define(square_ctor, vec![], vec![]),
            define(
                via_super,
                vec![],
                vec![Stmt::ret(Expr::field(Expr::super_(Type::class(shape)), sides, Type::INT))],
            ),
        ],
    };
    let point_body = ClassBody {
        class: point,
        procedures: vec![
            define(
                point_ctor,
                vec![formal(0, "x", Type::INT)],
                vec![Stmt::Expr(Expr::assign(
                    Place::Field {
                        receiver: Box::new(Expr::this(point_ty.clone())),
                        field: x,
                    },
                    Expr::local(local(0), Type::INT),
                ))],
            ),
            define(
                get_x,
                vec![],
                vec![Stmt::ret(Expr::field(Expr::this(point_ty.clone()), x, Type::INT))],
            ),
        ],
    };

    let p = local(0);
    let (i, s) = (local(1), local(2));
    let a = local(1);
    let sq = local(0);
    let main_body = ClassBody {
        class: main,
        procedures: vec![
            define(entry, vec![formal(0, "args", args_ty)], vec![]),
            define(
                make_point,
                vec![],
                vec![
                    Stmt::local(
                        p,
                        "p",
                        point_ty.clone(),
                        Some(Expr::new(
                            ExprKind::New {
                                constructor: point_ctor,
                                args: vec![Expr::int(5)],
                            },
                            point_ty.clone(),
                        )),
                    ),
                    Stmt::ret(Expr::call(get_x, Some(Expr::local(p, point_ty.clone())), vec![], Type::INT)),
                ],
            ),
            define(
                pick,
                vec![formal(0, "b", Type::BOOLEAN)],
                vec![Stmt::ret(Expr::conditional(
                    Expr::local(local(0), Type::BOOLEAN),
                    Expr::int(10),
                    Expr::int(20),
                ))],
            ),
            define(
                sum,
                vec![formal(0, "n", Type::INT)],
                vec![
                    Stmt::local(i, "i", Type::INT, Some(Expr::int(0))),
                    Stmt::local(s, "s", Type::INT, Some(Expr::int(0))),
                    Stmt::While {
                        cond: Expr::binary(
                            BinaryOp::Lt,
                            Expr::local(i, Type::INT),
                            Expr::local(local(0), Type::INT),
                            Type::BOOLEAN,
                        ),
                        body: Box::new(Stmt::Block(Block::new(vec![
                            Stmt::Expr(Expr::assign(
                                Place::Local(s),
                                Expr::binary(
                                    BinaryOp::Add,
                                    Expr::local(s, Type::INT),
                                    Expr::local(i, Type::INT),
                                    Type::INT,
                                ),
                            )),
                            Stmt::Expr(Expr::inc_dec(IncDecOp::PostInc, Place::Local(i), Type::INT)),
                        ]))),
                    },
                    Stmt::ret(Expr::local(s, Type::INT)),
                ],
            ),
            define(
                safe,
                vec![formal(0, "x", Type::INT)],
                vec![Stmt::ret(Expr::conditional(
                    Expr::binary(
                        BinaryOp::And,
                        Expr::binary(BinaryOp::Ne, Expr::local(local(0), Type::INT), Expr::int(0), Type::BOOLEAN),
                        Expr::binary(
                            BinaryOp::Gt,
                            Expr::binary(BinaryOp::Div, Expr::int(10), Expr::local(local(0), Type::INT), Type::INT),
                            Expr::int(1),
                            Type::BOOLEAN,
                        ),
                        Type::BOOLEAN,
                    ),
                    Expr::int(1),
                    Expr::int(0),
                ))],
            ),
            define(
                bump,
                vec![],
                vec![
                    Stmt::Expr(Expr::inc_dec(IncDecOp::PostInc, Place::StaticField(total), Type::INT)),
                    Stmt::Expr(Expr::inc_dec(IncDecOp::PreInc, Place::StaticField(total), Type::INT)),
                    Stmt::ret(Expr::new(ExprKind::StaticField(total), Type::INT)),
                ],
            ),
            define(
                new_ints,
                vec![formal(0, "n", Type::INT)],
                vec![Stmt::ret(Expr::new(
                    ExprKind::NewArray {
                        length: Box::new(Expr::local(local(0), Type::INT)),
                    },
                    int_array.clone(),
                ))],
            ),
            define(
                arrays,
                vec![formal(0, "n", Type::INT)],
                vec![
                    Stmt::local(
                        a,
                        "a",
                        int_array.clone(),
                        Some(Expr::new(
                            ExprKind::NewArray {
                                length: Box::new(Expr::local(local(0), Type::INT)),
                            },
                            int_array.clone(),
                        )),
                    ),
                    Stmt::Expr(Expr::assign(
                        Place::ArrayElement {
                            array: Box::new(Expr::local(a, int_array.clone())),
                            index: Box::new(Expr::int(2)),
                        },
                        Expr::int(7),
                    )),
                    Stmt::ret(Expr::binary(
                        BinaryOp::Add,
                        Expr::new(
                            ExprKind::ArrayElement {
                                array: Box::new(Expr::local(a, int_array.clone())),
                                index: Box::new(Expr::int(2)),
                            },
                            Type::INT,
                        ),
                        Expr::new(
                            ExprKind::ArrayLength(Box::new(Expr::local(a, int_array.clone()))),
                            Type::INT,
                        ),
                        Type::INT,
                    )),
                ],
            ),
            define(
                shape_sides,
                vec![],
                vec![
                    Stmt::local(
                        sq,
                        "s",
                        Type::class(square),
                        Some(Expr::new(
                            ExprKind::New {
                                constructor: square_ctor,
                                args: vec![],
                            },
                            Type::class(square),
                        )),
                    ),
                    Stmt::Expr(Expr::assign(
                        Place::Field {
                            receiver: Box::new(Expr::local(sq, Type::class(square))),
                            field: sides,
                        },
                        Expr::int(4),
                    )),
                    Stmt::ret(Expr::call(
                        via_super,
                        Some(Expr::local(sq, Type::class(square))),
                        vec![],
                        Type::INT,
                    )),
                ],
            ),
        ],
    };

    Program {
        classes,
        unit: CompilationUnit {
            classes: vec![shape_body, square_body, point_body, main_body],
        },
        point,
        main,
    }
}

impl Program {
    fn symbol(&self, name: &str, arity: usize) -> String {
        let method = self.classes.find_method(self.main, name, arity).unwrap();
        JoltMangler.procedure(&self.classes, self.classes.method(method))
    }
}

// -- JIT --

thread_local! {
    /// `(address, bytes)` of every object the JIT-compiled code allocated.
    static ALLOCATIONS: RefCell<Vec<(usize, usize)>> = const { RefCell::new(Vec::new()) };
}

/// Runtime allocator: zeroed memory, recorded for size checks. Never freed.
extern "C" fn jolt_alloc(size: i64) -> *mut u8 {
    let size = usize::try_from(size).unwrap();
    let layout = Layout::from_size_align(size.max(1), 8).unwrap();
    let ptr = unsafe { std::alloc::alloc_zeroed(layout) };
    assert!(!ptr.is_null(), "out of memory");
    ALLOCATIONS.with(|allocations| allocations.borrow_mut().push((ptr as usize, size)));
    ptr
}

fn allocation_size(ptr: *const u8) -> Option<usize> {
    ALLOCATIONS.with(|allocations| {
        allocations
            .borrow()
            .iter()
            .find(|&&(address, _)| address == ptr as usize)
            .map(|&(_, size)| size)
    })
}

static NATIVE_TARGET: Once = Once::new();

/// Translate the program and hand a JIT engine for it to `run`.
fn with_engine<R>(program: &Program, run: impl FnOnce(&ExecutionEngine<'_>) -> R) -> R {
    NATIVE_TARGET.call_once(|| {
        Target::initialize_native(&InitializationConfig::default()).expect("native target");
    });
    let context = Context::create();
    let output = compile_unit(&context, &program.classes, &program.unit, &CodegenOptions::default()).unwrap();
    let engine = output
        .module
        .llvm_module()
        .create_jit_execution_engine(OptimizationLevel::None)
        .unwrap();
    if let Some(alloc) = output.module.get_function("jolt_alloc") {
        engine.add_global_mapping(&output.module.function(alloc).value, jolt_alloc as *const () as usize);
    }
    run(&engine)
}

fn run0(program: &Program, name: &str) -> i32 {
    let symbol = program.symbol(name, 0);
    with_engine(program, |engine| unsafe {
        engine
            .get_function::<unsafe extern "C" fn() -> i32>(&symbol)
            .unwrap()
            .call()
    })
}

fn run1<A: Copy>(program: &Program, name: &str, arg: A) -> i32 {
    let symbol = program.symbol(name, 1);
    with_engine(program, |engine| unsafe {
        engine
            .get_function::<unsafe extern "C" fn(A) -> i32>(&symbol)
            .unwrap()
            .call(arg)
    })
}

// -- Execution --

#[test]
fn constructor_and_instance_call() {
    let program = program();
    assert_eq!(run0(&program, "makePoint"), 5);
}

#[test]
fn conditional_selects_each_arm() {
    let program = program();
    assert_eq!(run1(&program, "pick", true), 10);
    assert_eq!(run1(&program, "pick", false), 20);
}

#[test]
fn while_loop_accumulates() {
    let program = program();
    assert_eq!(run1(&program, "sum", 5_i32), 10);
    assert_eq!(run1(&program, "sum", 0_i32), 0);
}

#[test]
fn and_does_not_evaluate_rhs_when_lhs_is_false() {
    let program = program();
    assert_eq!(run1(&program, "safe", 0_i32), 0);
    assert_eq!(run1(&program, "safe", 2_i32), 1);
    assert_eq!(run1(&program, "safe", 20_i32), 0);
}

#[test]
fn static_field_increments() {
    let program = program();
    assert_eq!(run0(&program, "bump"), 2);
}

#[test]
fn array_elements_and_length() {
    let program = program();
    assert_eq!(run1(&program, "arrays", 4_i32), 11);
}

#[test]
fn super_reads_inherited_field() {
    let program = program();
    assert_eq!(run0(&program, "shapeSides"), 4);
}

// -- Memory --

#[test]
fn array_allocation_is_header_plus_elements() {
    let program = program();
    let symbol = program.symbol("newInts", 1);
    let array = with_engine(&program, |engine| unsafe {
        engine
            .get_function::<unsafe extern "C" fn(i32) -> *const u8>(&symbol)
            .unwrap()
            .call(3)
    });
    // dv (8) + sync (8) + { i32 length } (4), then 3 x i32
    assert_eq!(allocation_size(array), Some(20 + 3 * 4));
    let length = unsafe { array.add(16).cast::<i32>().read_unaligned() };
    assert_eq!(length, 3);
}

#[test]
fn object_header_points_at_dispatch_vector() {
    let program = program();
    let context = Context::create();
    let output = compile_unit(&context, &program.classes, &program.unit, &CodegenOptions::default()).unwrap();
    let dv = output.module.get_global("_V9app.Point").unwrap();
    let point_name = &program.classes.class(program.point).name;
    let point_info = output
        .layouts
        .iter()
        .find(|info| &info.name == point_name)
        .unwrap();
    assert_eq!(point_info.object_size, 32);

    let text = print_module(&output.module);
    assert!(
        text.contains("%class.app.Point = type { %dv.app.Point*, i8*, { i32, i64 } }"),
        "{text}"
    );
    assert!(text.contains("@_V9app.Point = global %dv.app.Point zeroinitializer"), "{text}");
    assert!(text.contains(&format!("store %dv.app.Point* @{}", output.module.global(dv).name)), "{text}");
}

// -- Unit-level results --

#[test]
fn unit_reports_layouts_in_unit_order() {
    let program = program();
    let context = Context::create();
    let output = compile_unit(&context, &program.classes, &program.unit, &CodegenOptions::default()).unwrap();
    let names: Vec<&str> = output.layouts.iter().map(|info| info.name.as_str()).collect();
    assert_eq!(names, vec!["app.Shape", "app.Square", "app.Point", "app.Main"]);

    let point = &output.layouts[2];
    let offsets: Vec<(&str, u64)> = point.fields.iter().map(|f| (f.name.as_str(), f.offset)).collect();
    assert_eq!(offsets, vec![("x", 16), ("y", 24)]);

    let main = &output.layouts[3];
    assert_eq!(main.static_fields.len(), 1);
    assert_eq!(main.static_fields[0].symbol, "_S8app.Main5total");
}

#[test]
fn unit_finds_the_entry_point() {
    let program = program();
    let context = Context::create();
    let output = compile_unit(&context, &program.classes, &program.unit, &CodegenOptions::default()).unwrap();
    let entries: Vec<(String, &str)> = output
        .entry_points
        .iter()
        .map(|e| (output.module.function(e.function).name.clone(), e.class.as_str()))
        .collect();
    assert_eq!(
        entries,
        vec![("_J8app.Main4main_AL16jolt.lang.String".to_owned(), "app.Main")]
    );
}

#[test]
fn configured_entry_name_changes_detection() {
    let program = program();
    let options = CodegenOptions::default().with_entry_name("start");
    let context = Context::create();
    let output = compile_unit(&context, &program.classes, &program.unit, &options).unwrap();
    assert!(output.entry_points.is_empty());
}

#[test]
fn debug_level_full_records_every_definition() {
    let program = program();
    let options = CodegenOptions::default().with_debug(DebugLevel::Full);
    let context = Context::create();
    let output = compile_unit(&context, &program.classes, &program.unit, &options).unwrap();
    let events = output.debug_info.events();
    let opened = events
        .iter()
        .filter(|e| matches!(e, DebugEvent::OpenScope { .. }))
        .count();
    let closed = events.iter().filter(|e| **e == DebugEvent::CloseScope).count();
    let defined: usize = program.unit.classes.iter().map(|c| c.procedures.len()).sum();
    assert_eq!(opened, defined);
    assert_eq!(closed, defined);
    assert_eq!(output.debug_info.depth(), 0);
}

#[test]
fn allocator_name_is_configurable() {
    let program = program();
    let options = CodegenOptions::default().with_allocator("gc_alloc");
    let context = Context::create();
    let output = compile_unit(&context, &program.classes, &program.unit, &options).unwrap();
    assert!(output.module.get_function("gc_alloc").is_some());
    assert!(output.module.get_function("jolt_alloc").is_none());
}

// -- Failures --

#[test]
fn procedure_listed_under_wrong_class_is_rejected() {
    let mut program = program();
    let stray = program.unit.classes[3].procedures.remove(1);
    program.unit.classes[2].procedures.push(stray);
    let context = Context::create();
    let Err(err) = compile_unit(&context, &program.classes, &program.unit, &CodegenOptions::default()) else {
        panic!("a procedure under the wrong class must be rejected");
    };
    assert_eq!(
        err,
        CodegenError::MissingProcedure {
            class: "app.Point".to_owned(),
            procedure: "makePoint".to_owned(),
        }
    );
}

#[test]
fn first_emission_error_aborts_the_unit() {
    let mut program = program();
    let main = program.main;
    let broken = program.classes.add_method(main, "broken", Flags::STATIC, vec![], Type::INT);
    program.unit.classes[3].procedures.push(define(
        broken,
        vec![],
        vec![Stmt::ret(Expr::local(local(42), Type::INT))],
    ));
    let context = Context::create();
    let Err(err) = compile_unit(&context, &program.classes, &program.unit, &CodegenOptions::default()) else {
        panic!("an unbound local must abort the unit");
    };
    assert!(matches!(err, CodegenError::UnboundLocal { local: 42, .. }), "{err}");
}

#[test]
fn output_debug_names_the_module() {
    let program = program();
    let context = Context::create();
    let options = CodegenOptions::default();
    let output = compile_unit(&context, &program.classes, &program.unit, &options).unwrap();
    let rendered = format!("{output:?}");
    assert!(rendered.contains(&format!("{:?}", options.module_name)), "{rendered}");
    assert!(rendered.contains("entry_points"), "{rendered}");
}
