//! Integration tests for name resolution.
//!
//! Each test drives a source fragment through lex -> parse -> register ->
//! resolve (the checker only runs when resolution is clean) and asserts on
//! the reported diagnostics or on the resolved decorations.

use bolt_sema::{analyze, Analysis};

fn check(src: &str) -> Analysis {
    analyze("main", &[("test.bolt", src)])
}

fn assert_clean(a: &Analysis) {
    assert!(
        !a.has_errors(),
        "expected no errors, got: {:?}",
        a.reporter.diagnostics()
    );
}

// ── Identifier binding ─────────────────────────────────────────────────

#[test]
fn undefined_name_is_reported() {
    let a = check("fn f() { let x = y; }");
    assert!(a.reporter.has_message("cannot find `y` in this scope"));
}

#[test]
fn locals_bind_to_objects() {
    let a = check("fn f(n: i32) { let x = n; let y = x; }");
    assert_clean(&a);
}

#[test]
fn underscore_is_a_placeholder() {
    let a = check("static mut C: i32 = 0;\nfn f() { unsafe { let _ = C; } }");
    assert_clean(&a);
}

#[test]
fn label_in_value_position_is_rejected() {
    let a = check("fn f() { lbl: loop { break; } let x = lbl; }");
    assert!(a.reporter.has_message("expected value, found label"));
}

#[test]
fn comptime_constants_are_whitelisted() {
    let a = check("fn f() { let os = $_OS_; }");
    assert_clean(&a);

    let a = check("fn f() { let x = $_WEIRD_; }");
    assert!(a.reporter.has_message("unknown comptime constant `_WEIRD_`"));
}

#[test]
fn self_requires_a_receiver_scope() {
    let a = check("fn f() { let x = self; }");
    assert!(a.reporter.has_message("cannot find `self` in this scope"));
}

#[test]
fn self_type_requires_enclosing_type() {
    let a = check("fn f() { let x: Self = 1; }");
    assert!(a.reporter.has_message("cannot resolve type for `Self`"));
}

// ── Paths and visibility ───────────────────────────────────────────────

#[test]
fn undeclared_external_package() {
    let a = check("fn f() { let x = core::mem; }");
    assert!(a.reporter.has_message("use of undeclared external package `core`"));
}

#[test]
fn declared_external_package_resolves_members() {
    let a = check("extern pkg core;\nfn f() { let x = core::missing; }");
    assert!(a.reporter.has_message("could not find `missing` in package `core`"));
}

#[test]
fn private_symbols_are_inaccessible_across_modules() {
    let a = check("mod m { fn secret() {} }\npub fn f() { m::secret(); }");
    assert!(a.reporter.has_message("function `secret` is private"));
}

#[test]
fn public_symbols_resolve_across_modules() {
    let a = check("mod m { pub fn api() {} }\npub fn f() { m::api(); }");
    assert_clean(&a);
}

#[test]
fn nested_module_paths() {
    let a = check(
        "mod outer { pub mod inner { pub const MAX: i32 = 9; } }\n\
         pub fn f() { let x = outer::inner::MAX; }",
    );
    assert_clean(&a);
}

#[test]
fn enum_variant_paths_resolve() {
    let a = check("enum Color { Red, Green }\nfn f() { let c = Color::Red; }");
    assert_clean(&a);

    let a = check("enum Color { Red, Green }\nfn f() { let c = Color::Purple; }");
    assert!(a.reporter.has_message("enum `Color` has no variant `Purple`"));
}

// ── Symbol registration ────────────────────────────────────────────────

#[test]
fn duplicate_names_are_redefinitions() {
    let a = check("fn a() {}\nfn a() {}");
    assert!(a.reporter.has_message("redefinition of `a`"));

    let a = check("fn f() { let x = 1; let x = 2; }");
    assert!(a.reporter.has_message("redefinition of `x`"));
}

#[test]
fn shadowing_in_child_scopes_is_allowed() {
    let a = check("fn f() { let x = 1; { let x = true; } }");
    assert_clean(&a);
}

// ── Types ──────────────────────────────────────────────────────────────

#[test]
fn aliases_are_transparently_unaliased() {
    let a = check("type Int = i32;\nfn f() { let x: Int = 5; }");
    assert_clean(&a);
    // the binding's type is the alias's parent, not the alias
    let decl = &a.files[0].decls[1];
    let bolt_parser::ast::decl::DeclKind::Fn(f) = &decl.kind else {
        panic!("expected fn");
    };
    let bolt_parser::ast::stmt::StmtKind::Let(l) = &f.stmts[0].kind else {
        panic!("expected let");
    };
    assert_eq!(l.lefts[0].typ.as_ref().unwrap(), &a.ctx.i32_t);
}

#[test]
fn errtype_outside_raise_or_is_is_rejected() {
    let a = check("errtype E;\nfn f() { let x: E = 1; }");
    assert!(a.reporter.has_message("cannot use error type as a normal type"));
}

#[test]
fn errtype_in_is_comparison_is_allowed() {
    let a = check("errtype E;\nfn f(x: i32) { let b = x is E; }");
    assert!(!a.reporter.has_message("cannot use error type as a normal type"));
}

#[test]
fn unknown_type_name() {
    let a = check("fn f() { let x: Missing = 1; }");
    assert!(a.reporter.has_message("cannot find type `Missing` in this scope"));
}

#[test]
fn value_symbol_in_type_position() {
    let a = check("const N: i32 = 1;\nfn f() { let x: N = 1; }");
    assert!(a.reporter.has_message("expected type, found constant"));
}

// ── Extend ─────────────────────────────────────────────────────────────

#[test]
fn extend_named_type_registers_methods() {
    let a = check(
        "struct S { x: i32; }\n\
         extend S { fn get(&self) i32 { return self.x; } }\n\
         fn f(s: S) { let v = s.get(); }",
    );
    assert_clean(&a);
}

#[test]
fn extend_interned_slice_registers_methods() {
    let a = check(
        "extend [i32] { fn total(&self) i32 { return 0; } }\n\
         fn f(s: [i32]) { let t = s.total(); }",
    );
    assert_clean(&a);
}

#[test]
fn extend_interned_type_rejects_non_methods() {
    let a = check("extend [i32] { fn helper() {} }");
    assert!(a.reporter.has_message("expected method"));
}

// ── Phase gating ───────────────────────────────────────────────────────

#[test]
fn registration_errors_skip_resolution() {
    // the duplicate is a registration error; the bogus body name would be
    // a resolution error and must not be reported
    let a = check("fn a() { missing_name; }\nfn a() {}");
    assert!(a.reporter.has_message("redefinition of `a`"));
    assert!(!a.reporter.has_message("cannot find `missing_name`"));
}
