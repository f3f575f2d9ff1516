//! Integration tests for the Bolt parser.
//!
//! These tests tokenize and parse source fragments, then assert on the AST
//! shape and on the collected diagnostics. Resolution and checking are not
//! run here; decoration slots stay empty.

use bolt_common::report::Reporter;
use bolt_parser::ast::decl::{Decl, DeclKind};
use bolt_parser::ast::expr::ExprKind;
use bolt_parser::ast::stmt::StmtKind;
use bolt_parser::ast::ty::Type;
use bolt_parser::ast::SourceFile;
use bolt_parser::context::{CompilerContext, Prefs};

// ── Helpers ────────────────────────────────────────────────────────────

fn parse(source: &str) -> (SourceFile, Reporter) {
    let mut ctx = CompilerContext::new(Prefs::default());
    let mut reporter = Reporter::new();
    let file = bolt_parser::parse_file(&mut ctx, &mut reporter, "test.bolt", source);
    (file, reporter)
}

fn parse_ok(source: &str) -> SourceFile {
    let (file, reporter) = parse(source);
    assert!(
        !reporter.has_errors(),
        "expected no parse errors, got: {:?}",
        reporter.diagnostics()
    );
    file
}

fn first_fn(file: &SourceFile) -> &bolt_parser::ast::decl::FnDecl {
    file.decls
        .iter()
        .find_map(|d| match &d.kind {
            DeclKind::Fn(f) => Some(f),
            _ => None,
        })
        .expect("expected a fn declaration")
}

// ── Declarations ───────────────────────────────────────────────────────

#[test]
fn parses_fn_with_defaults_and_result_type() {
    let file = parse_ok("pub fn f(x: i32 = 1, y: i32 = 2) !i32 { return x; }");
    let f = first_fn(&file);
    assert_eq!(f.name, "f");
    assert_eq!(f.args.len(), 2);
    assert!(f.args.iter().all(|a| a.def_expr.is_some()));
    assert!(f.has_named_args);
    assert!(matches!(f.ret_typ, Type::Result(_)));
    assert!(f.has_body);
}

#[test]
fn fn_without_return_type_defaults_to_void() {
    let file = parse_ok("fn f() {}");
    let f = first_fn(&file);
    assert!(matches!(f.ret_typ, Type::Sym(_)));
}

#[test]
fn parses_method_receivers() {
    let file = parse_ok(
        "struct S {\n\
         x: i32;\n\
         fn a(self) {}\n\
         fn b(&self) {}\n\
         fn c(&mut self) {}\n\
         fn d() {}\n\
         }",
    );
    let DeclKind::Struct { decls, .. } = &file.decls[0].kind else {
        panic!("expected struct");
    };
    let fns: Vec<_> = decls
        .iter()
        .filter_map(|d| match &d.kind {
            DeclKind::Fn(f) => Some(f),
            _ => None,
        })
        .collect();
    assert_eq!(fns.len(), 4);
    assert!(fns[0].is_method && !fns[0].self_is_ref && !fns[0].self_is_mut);
    assert!(fns[1].is_method && fns[1].self_is_ref && !fns[1].self_is_mut);
    assert!(fns[2].is_method && fns[2].self_is_ref && fns[2].self_is_mut);
    assert!(!fns[3].is_method);
}

#[test]
fn struct_fields_and_destructor() {
    let file = parse_ok(
        "struct File {\n\
         pub fd: i32;\n\
         mut closed: bool = false;\n\
         ~self { }\n\
         }",
    );
    let DeclKind::Struct { decls, .. } = &file.decls[0].kind else {
        panic!("expected struct");
    };
    let mut kinds = decls.iter().map(|d| &d.kind);
    assert!(matches!(
        kinds.next(),
        Some(DeclKind::StructField { is_pub: true, is_mut: false, .. })
    ));
    assert!(matches!(
        kinds.next(),
        Some(DeclKind::StructField { is_pub: false, is_mut: true, def_expr: Some(_), .. })
    ));
    assert!(matches!(kinds.next(), Some(DeclKind::Destructor { .. })));
}

#[test]
fn parses_enum_union_trait_extend() {
    let file = parse_ok(
        "enum Color { Red, Green, Blue }\n\
         union Value { i32, bool; fn describe(&self) str { return \"\"; } }\n\
         trait Hash { fn hash(&self) u64; }\n\
         extend Color { fn all() {} }",
    );
    assert!(matches!(&file.decls[0].kind, DeclKind::Enum { variants, .. } if variants.len() == 3));
    assert!(
        matches!(&file.decls[1].kind, DeclKind::Union { variants, decls, .. } if variants.len() == 2 && decls.len() == 1)
    );
    let DeclKind::Trait { decls, .. } = &file.decls[2].kind else {
        panic!("expected trait");
    };
    let DeclKind::Fn(hash) = &decls[0].kind else {
        panic!("expected trait fn");
    };
    assert!(!hash.has_body);
    assert!(matches!(&file.decls[3].kind, DeclKind::Extend { .. }));
}

#[test]
fn extern_pkg_and_extern_fns() {
    let file = parse_ok(
        "extern pkg core;\n\
         extern \"C\" {\n\
         fn malloc(size: usize) *c_void;\n\
         fn free(ptr: *c_void);\n\
         }",
    );
    assert!(matches!(&file.decls[0].kind, DeclKind::ExternPkg { name } if name == "core"));
    let DeclKind::Extern { abi, protos } = &file.decls[1].kind else {
        panic!("expected extern block");
    };
    assert_eq!(abi, "C");
    assert_eq!(protos.len(), 2);
    for p in protos {
        let DeclKind::Fn(f) = &p.kind else { panic!("expected fn proto") };
        assert!(f.is_extern);
        assert!(!f.has_body);
    }
}

#[test]
fn extern_rules_are_enforced() {
    let (_, r) = parse("pub extern pkg core;");
    assert!(r.has_message("`extern` declarations cannot be declared public"));

    let (_, r) = parse("mod m { extern pkg core; }");
    assert!(r.has_message("can only be declared at the package level"));

    let (_, r) = parse("extern \"C\" fn malloc(size: usize) *c_void { };");
    assert!(r.has_message("extern functions cannot have a body"));
}

#[test]
fn unsafe_is_rejected_on_non_fn_decls() {
    let (_, r) = parse("unsafe const X: i32 = 0;");
    assert!(r.has_message("constants cannot be declared unsafe"));

    let (_, r) = parse("unsafe struct S { x: i32; }");
    assert!(r.has_message("structs cannot be declared unsafe"));

    let file = parse_ok("unsafe fn danger() {}");
    assert!(first_fn(&file).is_unsafe);
}

#[test]
fn trait_items_reject_attrs_on_nothing_and_visibility() {
    let (_, r) = parse("trait T { pub fn f(); }");
    assert!(r.has_message("unnecessary visibility qualifier"));
}

#[test]
fn doc_comments_and_attrs_attach_to_decls() {
    let file = parse_ok(
        "/// Adds numbers.\n\
         /// Second line.\n\
         #[inline; if(true)]\n\
         pub fn add(a: i32, b: i32) i32 { return a + b; }",
    );
    let decl: &Decl = &file.decls[0];
    assert_eq!(decl.doc.len(), 2);
    assert_eq!(decl.doc[0], "Adds numbers.");
    assert!(decl.attrs.lookup("inline").is_some());
    assert!(decl.attrs.lookup("if").is_some());
}

// ── Expressions ────────────────────────────────────────────────────────

fn first_stmt_expr(file: &SourceFile) -> &bolt_parser::ast::expr::Expr {
    let f = first_fn(file);
    match &f.stmts[0].kind {
        StmtKind::Expr(e) => e,
        StmtKind::Let(l) => &l.right,
        other => panic!("expected expr-bearing stmt, got {other:?}"),
    }
}

#[test]
fn precedence_mul_binds_tighter_than_add() {
    let file = parse_ok("fn f() { let x = 1 + 2 * 3; }");
    let e = first_stmt_expr(&file);
    let ExprKind::Binary { op, right, .. } = &e.kind else {
        panic!("expected binary");
    };
    assert_eq!(*op, bolt_common::token::TokenKind::Plus);
    assert!(matches!(
        right.kind,
        ExprKind::Binary { op: bolt_common::token::TokenKind::Mul, .. }
    ));
}

#[test]
fn adjacent_angles_parse_as_shift() {
    let file = parse_ok("fn f() { let x = 1 << 2; }");
    let e = first_stmt_expr(&file);
    assert!(matches!(
        e.kind,
        ExprKind::Binary { op: bolt_common::token::TokenKind::Lshift, .. }
    ));
}

#[test]
fn spaced_angles_stay_comparisons() {
    // `a < b` must never fuse into a shift
    let file = parse_ok("fn f() { let x = 1 < 2; }");
    let e = first_stmt_expr(&file);
    assert!(matches!(
        e.kind,
        ExprKind::Binary { op: bolt_common::token::TokenKind::Lt, .. }
    ));
}

#[test]
fn tuple_literal_arity_is_capped_at_8() {
    let (_, r) = parse("fn f() { let x = (1, 2, 3, 4, 5, 6, 7, 8, 9); }");
    assert!(r.has_message("tuples can have a maximum of 8 expressions"));

    let (_, r) = parse("fn f(x: (i32, i32, i32, i32, i32, i32, i32, i32, i32)) {}");
    assert!(r.has_message("tuples can have a maximum of 8 types"));
}

#[test]
fn block_tail_expression_detection() {
    // last statement without `;` makes the block value-producing
    let file = parse_ok("fn f() { let x = { g(); 1 }; }");
    let e = first_stmt_expr(&file);
    let ExprKind::Block(block) = &e.kind else { panic!("expected block") };
    assert!(block.is_expr);
    assert!(block.tail.is_some());
    assert_eq!(block.stmts.len(), 1);

    let file = parse_ok("fn f() { let x = { g(); 1; }; }");
    let e = first_stmt_expr(&file);
    let ExprKind::Block(block) = &e.kind else { panic!("expected block") };
    assert!(!block.is_expr);
    assert!(block.tail.is_none());
    assert_eq!(block.stmts.len(), 2);
}

#[test]
fn call_arguments_enforce_named_after_named() {
    let file = parse_ok("fn f() { g(1, y: 2, z: 3); }");
    let e = first_stmt_expr(&file);
    let ExprKind::Call(call) = &e.kind else { panic!("expected call") };
    assert_eq!(call.pure_args_count(), 1);
    assert!(call.get_named_arg("y").is_some());

    let (_, r) = parse("fn f() { g(y: 2, 1); }");
    assert!(r.has_message("expected named argument, found expression"));
}

#[test]
fn call_catch_handler_forms() {
    let file = parse_ok("fn f() { let x = g() catch 0; }");
    let ExprKind::Call(call) = &first_stmt_expr(&file).kind else {
        panic!("expected call");
    };
    let handler = call.err_handler.as_ref().expect("expected catch handler");
    assert!(handler.varname.is_none());

    let file = parse_ok("fn f() { let x = g() catch |err| 0; }");
    let ExprKind::Call(call) = &first_stmt_expr(&file).kind else {
        panic!("expected call");
    };
    let handler = call.err_handler.as_ref().expect("expected catch handler");
    assert_eq!(handler.varname.as_deref(), Some("err"));
}

#[test]
fn postfix_chain_selector_path_index_ranges() {
    let file = parse_ok("fn f() { let x = a.b.?; }");
    let e = first_stmt_expr(&file);
    assert!(matches!(e.kind, ExprKind::NoneCheck { .. }));

    let file = parse_ok("fn f() { let x = p.*; }");
    assert!(matches!(first_stmt_expr(&file).kind, ExprKind::Indirect { .. }));

    let file = parse_ok("fn f() { let x = m::c; }");
    assert!(matches!(first_stmt_expr(&file).kind, ExprKind::Path(_)));

    let file = parse_ok("fn f() { let x = arr[1..=3]; }");
    let ExprKind::Index { index, .. } = &first_stmt_expr(&file).kind else {
        panic!("expected index");
    };
    assert!(matches!(index.kind, ExprKind::Range { is_inclusive: true, .. }));

    let file = parse_ok("fn f() { let x = arr[..3]; }");
    let ExprKind::Index { index, .. } = &first_stmt_expr(&file).kind else {
        panic!("expected index");
    };
    assert!(matches!(index.kind, ExprKind::Range { start: None, .. }));
}

#[test]
fn comptime_dollar_forms() {
    let file = parse_ok("fn f() { let x = $_OS_; }");
    let ExprKind::Ident(ident) = &first_stmt_expr(&file).kind else {
        panic!("expected ident");
    };
    assert!(ident.is_comptime);

    let file = parse_ok("fn f() { let x = $if (true) 1 $else 2; }");
    let ExprKind::If(if_expr) = &first_stmt_expr(&file).kind else {
        panic!("expected if");
    };
    assert!(if_expr.is_comptime);
    assert_eq!(if_expr.branches.len(), 2);
    assert!(if_expr.branch_idx.is_none());
}

#[test]
fn match_expr_with_typematch() {
    let file = parse_ok("fn f() { match (v) is { i32 => 1, else => 2 } }");
    let ExprKind::Match(m) = &first_stmt_expr(&file).kind else {
        panic!("expected match");
    };
    assert!(m.is_typematch);
    assert_eq!(m.branches.len(), 2);
    assert!(m.branches[1].is_else);
    assert!(matches!(m.branches[0].pats[0].kind, ExprKind::TypeNode { .. }));
}

#[test]
fn enum_variant_sugar_and_struct_literal() {
    let file = parse_ok("fn f() { let c = .Red; }");
    assert!(matches!(
        first_stmt_expr(&file).kind,
        ExprKind::EnumVariant { .. }
    ));

    let file = parse_ok("fn f() { let s = Point{ x: 1, y: 2 }; }");
    let ExprKind::StructLit { fields, .. } = &first_stmt_expr(&file).kind else {
        panic!("expected struct literal");
    };
    assert_eq!(fields.len(), 2);
}

#[test]
fn string_prefixes_and_concatenation() {
    let file = parse_ok("fn f() { let s = r\"a\\n\" ; let b = b\"abc\"; let c = b'x'; }");
    let f = first_fn(&file);
    let StmtKind::Let(l) = &f.stmts[0].kind else { panic!() };
    assert!(matches!(l.right.kind, ExprKind::StrLit { is_raw: true, .. }));
    let StmtKind::Let(l) = &f.stmts[1].kind else { panic!() };
    assert!(matches!(l.right.kind, ExprKind::StrLit { is_bytestr: true, .. }));
    let StmtKind::Let(l) = &f.stmts[2].kind else { panic!() };
    assert!(matches!(l.right.kind, ExprKind::CharLit { is_byte: true, .. }));

    let file = parse_ok("fn f() { let s = \"a\" \"b\"; }");
    let ExprKind::StrLit { value, .. } = &first_stmt_expr(&file).kind else {
        panic!("expected string");
    };
    assert_eq!(value, "ab");
}

#[test]
fn builtin_calls_take_types_or_exprs() {
    let file = parse_ok("fn f() { let n = sizeof!(u64); }");
    let ExprKind::BuiltinCall { name, args } = &first_stmt_expr(&file).kind else {
        panic!("expected builtin call");
    };
    assert_eq!(name, "sizeof");
    assert!(matches!(args[0].kind, ExprKind::TypeNode { .. }));

    let file = parse_ok("fn f() { assert!(1 == 1); }");
    let ExprKind::BuiltinCall { name, args } = &first_stmt_expr(&file).kind else {
        panic!("expected builtin call");
    };
    assert_eq!(name, "assert");
    assert!(matches!(args[0].kind, ExprKind::Binary { .. }));
}

// ── Statements ─────────────────────────────────────────────────────────

#[test]
fn statement_forms() {
    let file = parse_ok(
        "fn f() {\n\
         start: while (x) { continue; }\n\
         loop { break; }\n\
         for (i in 0..10) { }\n\
         goto start;\n\
         x += 1;\n\
         return;\n\
         }",
    );
    let f = first_fn(&file);
    let kinds: Vec<_> = f.stmts.iter().map(|s| &s.kind).collect();
    assert!(matches!(kinds[0], StmtKind::Label { .. }));
    assert!(matches!(kinds[1], StmtKind::While { .. }));
    assert!(matches!(kinds[2], StmtKind::Loop { .. }));
    assert!(matches!(kinds[3], StmtKind::ForIn { .. }));
    assert!(matches!(kinds[4], StmtKind::Goto { .. }));
    assert!(matches!(
        kinds[5],
        StmtKind::Assign { op: bolt_common::token::TokenKind::PlusAssign, .. }
    ));
    assert!(matches!(kinds[6], StmtKind::Expr(_)));
}

#[test]
fn while_true_sets_infinite_flag() {
    let file = parse_ok("fn f() { while (true) { } }");
    let f = first_fn(&file);
    assert!(matches!(f.stmts[0].kind, StmtKind::While { is_inf: true, .. }));
}

#[test]
fn multi_binding_let() {
    let file = parse_ok("fn f() { let (a, mut b) = pair; }");
    let f = first_fn(&file);
    let StmtKind::Let(l) = &f.stmts[0].kind else { panic!("expected let") };
    assert_eq!(l.lefts.len(), 2);
    assert!(!l.lefts[0].is_mut);
    assert!(l.lefts[1].is_mut);
}

#[test]
fn guard_condition_in_if() {
    let file = parse_ok("fn f() { if (let v = opt) { g(v); } }");
    let f = first_fn(&file);
    let StmtKind::Expr(e) = &f.stmts[0].kind else { panic!("expected expr stmt") };
    let ExprKind::If(if_expr) = &e.kind else { panic!("expected if") };
    assert!(matches!(
        if_expr.branches[0].cond.as_ref().unwrap().kind,
        ExprKind::Guard { .. }
    ));
}

// ── Types ──────────────────────────────────────────────────────────────

#[test]
fn type_grammar_constraints() {
    let (_, r) = parse("fn f(x: ?*u8) {}");
    assert!(r.has_message("pointers cannot be optional"));

    let (_, r) = parse("fn f(x: &&u8) {}");
    assert!(r.has_message("multi-level references are not allowed"));

    let (_, r) = parse("fn f(x: &*u8) {}");
    assert!(r.has_message("cannot use references with pointers"));

    let (_, r) = parse("fn f(x: *&u8) {}");
    assert!(r.has_message("cannot use pointers with references"));

    let (_, r) = parse("fn f(x: ? ? u8) {}");
    assert!(r.has_message("optional multi-level types are not allowed"));

    let (_, r) = parse("fn f(x: c_void) {}");
    assert!(r.has_message("`c_void` can only be used inside `extern` declarations"));
}

#[test]
fn type_forms_parse() {
    let file = parse_ok("fn f(a: &u8, b: *u8, c: [u8], d: [u8; 4], e: (u8, str), g: ?u8) {}");
    let f = first_fn(&file);
    assert!(matches!(f.args[0].typ, Type::Ref(_)));
    assert!(matches!(f.args[1].typ, Type::Ptr(_)));
    assert!(matches!(f.args[2].typ, Type::Slice { .. }));
    assert!(matches!(f.args[3].typ, Type::Array { .. }));
    assert!(matches!(&f.args[4].typ, Type::Tuple { types, .. } if types.len() == 2));
    assert!(matches!(f.args[5].typ, Type::Optional(_)));
}

// ── Recovery ───────────────────────────────────────────────────────────

#[test]
fn expected_found_recovery_keeps_parsing() {
    let (file, r) = parse("fn f() { let x = 1 let y = 2; }");
    assert!(r.has_message("expected `;`, found `let`"));
    // parsing resumes inside the same body
    let DeclKind::Fn(f) = &file.decls[0].kind else { panic!("expected fn") };
    assert!(f.stmts.len() >= 2);
}

#[test]
fn lex_errors_produce_an_empty_file() {
    let (file, r) = parse("fn f() { let x = \"unterminated }");
    assert!(r.has_errors());
    assert!(file.decls.is_empty());
}
