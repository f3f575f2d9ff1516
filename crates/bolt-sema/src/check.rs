//! Pass 3: semantic checking.
//!
//! Walks the fully-resolved AST and assigns a type to every expression,
//! enforcing operator legality, assignability, call arity and
//! named-argument rules, return/raise typing, optional/pointer/reference
//! discipline and the unsafe-context rules.
//!
//! `expected_type` propagates downward so literals can widen (`let x: u8 =
//! 1;` types `1` as `u8`), and is saved/restored around every
//! sub-expression, diagnostic paths included. `unsafe_operations` counts
//! the operations a surrounding `unsafe` block actually justified; a block
//! that justified none is flagged.

use bolt_common::report::Reporter;
use bolt_common::span::Span;
use bolt_common::token::TokenKind;
use bolt_parser::ast::decl::{Decl, DeclKind};
use bolt_parser::ast::expr::{CallArg, CallExpr, Expr, ExprKind};
use bolt_parser::ast::stmt::{Stmt, StmtKind};
use bolt_parser::ast::sym::{FnSym, ScopeId, SymKind, SymbolId, TypeInfo, TypeKind};
use bolt_parser::ast::ty::Type;
use bolt_parser::ast::SourceFile;
use bolt_parser::context::CompilerContext;

pub struct Checker<'a> {
    pub(crate) ctx: &'a mut CompilerContext,
    reporter: &'a mut Reporter,

    cur_fn: Option<SymbolId>,
    cur_sym: SymbolId,
    expected_type: Type,

    inside_unsafe: bool,
    unsafe_operations: u32,
    /// Set while checking the operand of `try`, which handles the result
    /// in place of a `catch`.
    inside_try: bool,
}

impl<'a> Checker<'a> {
    pub fn new(ctx: &'a mut CompilerContext, reporter: &'a mut Reporter) -> Self {
        let cur_sym = ctx.pkg_sym;
        let expected_type = ctx.void_t.clone();
        Self {
            ctx,
            reporter,
            cur_fn: None,
            cur_sym,
            expected_type,
            inside_unsafe: false,
            unsafe_operations: 0,
            inside_try: false,
        }
    }

    pub fn check_files(&mut self, files: &mut [SourceFile]) {
        for sf in files {
            self.reporter.set_file(&sf.file);
            self.unsafe_operations = 0;
            self.check_decls(&mut sf.decls);
        }
    }

    fn check_decls(&mut self, decls: &mut [Decl]) {
        for decl in decls {
            self.check_decl(decl);
        }
    }

    fn check_decl(&mut self, decl: &mut Decl) {
        if !decl.attrs.if_check {
            return;
        }
        match &mut decl.kind {
            DeclKind::Empty | DeclKind::ExternPkg { .. } | DeclKind::ErrType { .. } => {}
            DeclKind::Extern { protos, .. } => self.check_decls(protos),
            DeclKind::Const { typ, expr, .. } => {
                let expected = typ.clone();
                self.check_with_expected(expr, expected);
            }
            DeclKind::Static { typ, expr, .. } => {
                let expected = typ.clone();
                self.check_with_expected(expr, expected);
            }
            DeclKind::Mod { decls, sym, .. } => {
                let old_sym = self.cur_sym;
                if let Some(id) = *sym {
                    self.cur_sym = id;
                }
                self.check_decls(decls);
                self.cur_sym = old_sym;
            }
            DeclKind::TypeAlias { .. } => {}
            DeclKind::Trait { decls, .. }
            | DeclKind::Union { decls, .. }
            | DeclKind::Enum { decls, .. }
            | DeclKind::Struct { decls, .. }
            | DeclKind::Extend { decls, .. } => self.check_decls(decls),
            DeclKind::StructField { typ, def_expr, .. } => {
                if let Some(def) = def_expr {
                    let expected = typ.clone();
                    self.check_with_expected(def, expected);
                }
            }
            DeclKind::Test { stmts, .. } => self.check_stmts(stmts),
            DeclKind::Fn(f) => {
                self.cur_fn = f.sym;
                for arg in f.args.iter_mut() {
                    if arg.is_mut && !(arg.typ.is_ref() || arg.typ.is_ptr()) {
                        self.reporter
                            .error("arguments passed by value cannot be mutated", arg.pos);
                        self.reporter
                            .note("only arguments passed by reference can be mutated");
                    } else if let Some(def) = &mut arg.def_expr {
                        let expected = arg.typ.clone();
                        self.check_with_expected(def, expected);
                    }
                }
                self.check_stmts(&mut f.stmts);
                self.cur_fn = None;
            }
            DeclKind::Destructor { stmts, .. } => self.check_stmts(stmts),
        }
    }

    // ── Statements ─────────────────────────────────────────────────────

    fn check_stmts(&mut self, stmts: &mut [Stmt]) {
        for stmt in stmts {
            self.check_stmt(stmt);
        }
    }

    fn check_stmt(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Let(ls) => {
                if ls.lefts.len() == 1 {
                    let has_typ = ls.lefts[0].has_typ;
                    if has_typ {
                        let annotated = ls.lefts[0].typ.clone().expect("annotated binding");
                        let right_pos = ls.right.pos;
                        let rt = self.check_with_expected(&mut ls.right, annotated.clone());
                        if let Err(msg) = self.check_types(&rt, &annotated) {
                            self.reporter.error(msg, right_pos);
                        }
                    } else {
                        let rt = self.check_expr(&mut ls.right);
                        ls.lefts[0].typ = Some(rt.clone());
                        self.ctx.scopes.update_typ(
                            ls.scope,
                            &ls.lefts[0].name,
                            rt,
                            &mut self.ctx.symbols,
                        );
                    }
                } else {
                    let right_pos = ls.right.pos;
                    let rt = self.check_expr(&mut ls.right);
                    let tuple_types = rt.sym_of().and_then(|id| match &self.ctx.sym(id).kind {
                        SymKind::Type {
                            kind: TypeKind::Tuple,
                            info: TypeInfo::Tuple { types },
                            ..
                        } => Some(types.clone()),
                        _ => None,
                    });
                    match tuple_types {
                        None => {
                            let shown = self.ctx.typ_display(&rt);
                            self.reporter
                                .error(format!("expected tuple value, found `{shown}`"), right_pos);
                        }
                        Some(types) if types.len() != ls.lefts.len() => {
                            self.reporter.error(
                                format!(
                                    "expected {} values, found {}",
                                    ls.lefts.len(),
                                    types.len()
                                ),
                                right_pos,
                            );
                        }
                        Some(types) => {
                            for (binding, t) in ls.lefts.iter_mut().zip(types) {
                                binding.typ = Some(t.clone());
                                self.ctx.scopes.update_typ(
                                    ls.scope,
                                    &binding.name,
                                    t,
                                    &mut self.ctx.symbols,
                                );
                            }
                        }
                    }
                }
            }
            StmtKind::Assign { left, right, .. } => {
                let lt = self.check_expr(left);
                let right_pos = right.pos;
                let rt = self.check_with_expected(right, lt.clone());
                if let Err(msg) = self.check_types(&rt, &lt) {
                    self.reporter.error(msg, right_pos);
                }
            }
            StmtKind::Expr(expr) => {
                let pos = expr.pos;
                let t = self.check_expr(expr);
                if !self.is_droppable(&t) {
                    self.reporter.warn("expression evaluated but not used", pos);
                }
            }
            StmtKind::While { cond, is_inf, body } => {
                if !*is_inf {
                    let cond_pos = cond.pos;
                    if self.check_expr(cond) != self.ctx.bool_t {
                        self.reporter.error(
                            "non-boolean expression used as `while` condition",
                            cond_pos,
                        );
                    }
                }
                self.check_stmt(body);
            }
            StmtKind::ForIn { key, value, iterable, body, scope } => {
                let it = self.check_expr(iterable);
                let scope = *scope;
                let elem = self.iterable_elem(&it, iterable);
                if let Some(elem) = elem {
                    if let Some(v) = value {
                        let usize_t = self.ctx.usize_t.clone();
                        let key = key.clone();
                        let v = v.clone();
                        self.update_scope_typ(scope, &key, usize_t);
                        self.update_scope_typ(scope, &v, elem);
                    } else {
                        let key = key.clone();
                        self.update_scope_typ(scope, &key, elem);
                    }
                }
                self.check_stmt(body);
            }
            StmtKind::Loop { body } => self.check_stmt(body),
            StmtKind::Label { .. } | StmtKind::Goto { .. } | StmtKind::Branch { .. } => {}
        }
    }

    /// Element type produced when iterating `it`.
    fn iterable_elem(&self, it: &Type, iterable: &Expr) -> Option<Type> {
        match self.ctx.type_kind_of(it) {
            Some(TypeKind::Array | TypeKind::Slice) => {
                it.sym_of().and_then(|id| match &self.ctx.sym(id).kind {
                    SymKind::Type { info: TypeInfo::Array { elem_typ, .. }, .. }
                    | SymKind::Type { info: TypeInfo::Slice { elem_typ }, .. } => {
                        Some(elem_typ.clone())
                    }
                    _ => None,
                })
            }
            Some(TypeKind::Str) => Some(self.ctx.u8_t.clone()),
            _ if matches!(iterable.kind, ExprKind::Range { .. }) => Some(it.clone()),
            _ => None,
        }
    }

    fn update_scope_typ(&mut self, scope: ScopeId, name: &str, typ: Type) {
        self.ctx.scopes.update_typ(scope, name, typ, &mut self.ctx.symbols);
    }

    /// Whether a statement expression's value may be silently discarded.
    fn is_droppable(&self, t: &Type) -> bool {
        let bare = match t {
            Type::Result(inner) | Type::Optional(inner) => inner,
            other => other,
        };
        *bare == self.ctx.void_t
            || *bare == self.ctx.c_void_t
            || *bare == self.ctx.no_return_t
    }

    // ── Expressions ────────────────────────────────────────────────────

    /// Check a sub-expression under a pushed `expected_type`; the previous
    /// expectation is restored on every path.
    fn check_with_expected(&mut self, expr: &mut Expr, expected: Type) -> Type {
        let old = std::mem::replace(&mut self.expected_type, expected);
        let t = self.check_expr(expr);
        self.expected_type = old;
        t
    }

    pub(crate) fn check_expr(&mut self, expr: &mut Expr) -> Type {
        let pos = expr.pos;
        let t = self.check_expr_kind(&mut expr.kind, pos, expr.typ.clone());
        expr.typ = Some(t.clone());
        t
    }

    fn check_expr_kind(&mut self, kind: &mut ExprKind, pos: Span, pre_typ: Option<Type>) -> Type {
        match kind {
            ExprKind::Empty => self.ctx.void_t.clone(),
            ExprKind::VoidLit => self.ctx.void_t.clone(),
            ExprKind::NoneLit => self.ctx.none_t.clone(),
            ExprKind::BoolLit(_) => self.ctx.bool_t.clone(),
            ExprKind::CharLit { is_byte, .. } => {
                if *is_byte {
                    self.ctx.u8_t.clone()
                } else {
                    self.ctx.rune_t.clone()
                }
            }
            ExprKind::IntLit { .. } => {
                // default i32, widened by the expected type
                if self.ctx.is_int(&self.expected_type) {
                    self.expected_type.clone()
                } else {
                    self.ctx.i32_t.clone()
                }
            }
            ExprKind::FloatLit { .. } => {
                if self.ctx.is_float(&self.expected_type) {
                    self.expected_type.clone()
                } else {
                    self.ctx.f64_t.clone()
                }
            }
            ExprKind::StrLit { value, is_bytestr, .. } => {
                if *is_bytestr {
                    let size = bytestr_len(value);
                    let size_expr =
                        Expr::new(ExprKind::IntLit { value: size.to_string() }, pos);
                    let u8_t = self.ctx.u8_t.clone();
                    Type::Sym(self.ctx.add_or_get_array(u8_t, &size_expr))
                } else {
                    self.ctx.str_t.clone()
                }
            }
            ExprKind::TupleLit { exprs } => {
                let types: Vec<Type> = exprs.iter_mut().map(|e| self.check_expr(e)).collect();
                Type::Sym(self.ctx.add_or_get_tuple(types))
            }
            ExprKind::ArrayLit { elems } => {
                let mut elem_typ = self.ctx.void_t.clone();
                let old = self.expected_type.clone();
                for (i, e) in elems.iter_mut().enumerate() {
                    let t = self.check_expr(e);
                    if i == 0 {
                        elem_typ = t;
                        self.expected_type = elem_typ.clone();
                    }
                }
                self.expected_type = old;
                let size_expr =
                    Expr::new(ExprKind::IntLit { value: elems.len().to_string() }, pos);
                Type::Sym(self.ctx.add_or_get_array(elem_typ, &size_expr))
            }
            ExprKind::StructLit { target, fields } => self.check_struct_lit(target, fields),
            ExprKind::SelfExpr { scope } => {
                match self.ctx.scopes.lookup(*scope, "self") {
                    Some(obj) => self.object_typ(obj),
                    None => self.ctx.void_t.clone(),
                }
            }
            ExprKind::SelfTyExpr { .. } => pre_typ.unwrap_or_else(|| self.ctx.void_t.clone()),
            ExprKind::PkgExpr => self.ctx.void_t.clone(),
            ExprKind::Ident(ident) => {
                if ident.is_comptime {
                    return self.ctx.str_t.clone();
                }
                if ident.is_obj {
                    return match ident.obj {
                        Some(obj) => self.object_typ(obj),
                        None => self.ctx.void_t.clone(),
                    };
                }
                match ident.sym {
                    Some(s) => self.symbol_value_typ(s, pos),
                    None => self.ctx.void_t.clone(),
                }
            }
            ExprKind::EnumVariant { variant } => {
                let expected_sym = self.expected_type.sym_of();
                match expected_sym {
                    Some(id)
                        if self.ctx.sym(id).type_kind() == Some(TypeKind::Enum) =>
                    {
                        let has = match &self.ctx.sym(id).kind {
                            SymKind::Type { info: TypeInfo::Enum { variants }, .. } => {
                                variants.iter().any(|v| v == variant)
                            }
                            _ => false,
                        };
                        if has {
                            Type::Sym(id)
                        } else {
                            let name = self.ctx.sym(id).name.clone();
                            self.reporter.error(
                                format!("enum `{name}` has no variant `{variant}`"),
                                pos,
                            );
                            self.ctx.void_t.clone()
                        }
                    }
                    _ => {
                        let shown = self.ctx.typ_display(&self.expected_type);
                        self.reporter.error(format!("`{shown}` is not an enum"), pos);
                        self.ctx.void_t.clone()
                    }
                }
            }
            ExprKind::Par { inner } => {
                if matches!(inner.kind, ExprKind::Par { .. }) {
                    self.reporter.warn("redundant parentheses are used", pos);
                }
                self.check_expr(inner)
            }
            ExprKind::Unary { op, right } => self.check_unary(*op, right, pos),
            ExprKind::Binary { left, op, right } => self.check_binary(left, *op, right, pos),
            ExprKind::Postfix { left, op } => {
                let t = self.check_expr(left);
                if matches!(op, TokenKind::Inc | TokenKind::Dec) && !self.ctx.is_int(&t) {
                    self.reporter.error(
                        format!("operator `{op}` can only be used with numeric values"),
                        pos,
                    );
                }
                t
            }
            ExprKind::Cast { expr: inner, target } => {
                let target = target.clone();
                self.check_with_expected(inner, target.clone());
                target
            }
            ExprKind::NoneCheck { expr: inner } => {
                let t = self.check_expr(inner);
                match t {
                    Type::Optional(inner_t) => *inner_t,
                    _ => {
                        self.reporter.error("cannot check a non-optional value", pos);
                        self.ctx.void_t.clone()
                    }
                }
            }
            ExprKind::Indirect { expr: inner } => {
                let t = self.check_expr(inner);
                if !(t.is_ptr() || t.is_ref()) {
                    let shown = self.ctx.typ_display(&t);
                    self.reporter.error(format!("invalid indirect for `{shown}`"), pos);
                    return self.ctx.void_t.clone();
                }
                if t.is_ptr() && !self.inside_unsafe_block() {
                    self.reporter.error(
                        "dereference of pointer is unsafe and requires `unsafe` block",
                        pos,
                    );
                    return self.ctx.void_t.clone();
                }
                if *t.inner() == self.ctx.c_void_t {
                    self.reporter.error("invalid indirect for `*c_void`", pos);
                    self.reporter
                        .help("consider casting this to another pointer type, e.g. `*u8`");
                    return self.ctx.void_t.clone();
                }
                t.inner().clone()
            }
            ExprKind::Guard { name, expr: inner, scope, .. } => {
                let t = self.check_expr(inner);
                let unwrapped = match t {
                    Type::Optional(inner_t) | Type::Result(inner_t) => *inner_t,
                    other => other,
                };
                let scope = *scope;
                let name = name.clone();
                self.update_scope_typ(scope, &name, unwrapped);
                self.ctx.bool_t.clone()
            }
            ExprKind::Range { start, end, .. } => {
                let mut t = None;
                if let Some(s) = start {
                    t = Some(self.check_expr(s));
                }
                if let Some(e) = end {
                    let et = self.check_expr(e);
                    t.get_or_insert(et);
                }
                t.unwrap_or_else(|| self.ctx.i32_t.clone())
            }
            ExprKind::Index { left, index, left_typ } => {
                let lt = self.check_expr(left);
                *left_typ = Some(lt.clone());
                self.check_index(lt, index, pos)
            }
            ExprKind::Selector(sel) => {
                let left_typ = self.check_expr(&mut sel.left);
                let field_name = sel.field_name.clone();
                let field_pos = sel.field_pos;
                let left_repr = sel.left.repr();
                self.check_selector(left_typ, &field_name, &left_repr, pos, field_pos)
            }
            ExprKind::Path(path) => {
                let field_info = path.field_info;
                let left_info = path.left_info;
                let has_error = path.has_error;
                let field_name = path.field_name.clone();
                let field_pos = path.field_pos;
                self.check_path(field_info, left_info, has_error, &field_name, pos, field_pos)
            }
            ExprKind::BuiltinCall { name, args } => {
                let name = name.clone();
                self.check_builtin_call(&name, args, pos)
            }
            ExprKind::Call(call) => self.check_call_expr(call, pos),
            ExprKind::TypeNode { typ } => typ.clone(),
            ExprKind::Try { expr: inner } => {
                let old = self.inside_try;
                self.inside_try = true;
                let t = self.check_expr(inner);
                self.inside_try = old;
                match t {
                    Type::Result(inner_t) => {
                        let ret_is_result = self
                            .cur_fn
                            .map(|f| self.fn_sym(f).ret_typ.is_result())
                            .unwrap_or(false);
                        if !ret_is_result {
                            self.reporter.error(
                                "error propagation requires the current function to return a result value",
                                pos,
                            );
                        }
                        *inner_t
                    }
                    other => {
                        self.reporter.error("cannot use `try` with a non-result value", pos);
                        other
                    }
                }
            }
            ExprKind::Go { expr: inner } => {
                self.check_expr(inner);
                self.ctx.void_t.clone()
            }
            ExprKind::Block(block) => {
                if self.inside_unsafe && block.is_unsafe {
                    self.reporter.warn("unnecesary `unsafe` block", pos);
                }
                let old_inside = self.inside_unsafe;
                let old_ops = self.unsafe_operations;
                self.inside_unsafe = old_inside || block.is_unsafe;
                self.unsafe_operations = 0;
                for stmt in block.stmts.iter_mut() {
                    self.check_stmt(stmt);
                }
                let t = match &mut block.tail {
                    Some(tail) => self.check_expr(tail),
                    None => self.ctx.void_t.clone(),
                };
                if block.is_unsafe && !old_inside && self.unsafe_operations == 0 {
                    self.reporter.warn("unnecesary `unsafe` block", pos);
                }
                self.inside_unsafe = old_inside;
                self.unsafe_operations = old_ops;
                t
            }
            ExprKind::If(if_expr) => {
                if if_expr.is_comptime {
                    match if_expr.branch_idx {
                        Some(idx) => match if_expr.branches.get_mut(idx) {
                            Some(branch) => self.check_expr(&mut branch.expr),
                            None => self.ctx.void_t.clone(),
                        },
                        None => self.ctx.void_t.clone(),
                    }
                } else {
                    let mut t = self.ctx.void_t.clone();
                    for (i, branch) in if_expr.branches.iter_mut().enumerate() {
                        if let Some(cond) = &mut branch.cond {
                            let cond_pos = cond.pos;
                            if self.check_expr(cond) != self.ctx.bool_t {
                                self.reporter.error(
                                    "non-boolean expression used as `if` condition",
                                    cond_pos,
                                );
                            }
                        }
                        let bt = self.check_expr(&mut branch.expr);
                        if i == 0 {
                            t = bt;
                        }
                    }
                    t
                }
            }
            ExprKind::Match(match_expr) => {
                let scrutinee_t = self.check_expr(&mut match_expr.expr);
                let mut t = self.ctx.void_t.clone();
                for (i, branch) in match_expr.branches.iter_mut().enumerate() {
                    for pat in branch.pats.iter_mut() {
                        // patterns match the scrutinee's type
                        let st = scrutinee_t.clone();
                        self.check_with_expected(pat, st);
                    }
                    let bt = self.check_expr(&mut branch.expr);
                    if i == 0 {
                        t = bt;
                    }
                }
                t
            }
            ExprKind::Return { expr: ret } => {
                let fn_info = self.cur_fn.map(|f| {
                    let s = self.ctx.sym(f);
                    (self.fn_sym(f).ret_typ.clone(), s.sym_kind(), s.name.clone())
                });
                if let Some(e) = ret {
                    let e_pos = e.pos;
                    if let Some((ret_typ, kind, name)) = fn_info {
                        let t = self.check_with_expected(e, ret_typ.clone());
                        if let Err(msg) = self.check_types(&t, &ret_typ) {
                            self.reporter.error(msg, e_pos);
                            self.reporter
                                .note(format!("in return argument for {kind} `{name}`"));
                        }
                    } else {
                        self.check_expr(e);
                    }
                } else if let Some((ret_typ, kind, name)) = fn_info {
                    if ret_typ != self.ctx.void_t {
                        let shown = self.ctx.typ_display(&ret_typ);
                        self.reporter.error(format!("expected `{shown}` argument"), pos);
                        self.reporter
                            .note(format!("in return argument for {kind} `{name}`"));
                    }
                }
                self.ctx.no_return_t.clone()
            }
            ExprKind::Raise { expr: inner } => {
                if let Some(f) = self.cur_fn {
                    if !self.fn_sym(f).ret_typ.is_result() {
                        let kind = self.ctx.sym(f).sym_kind();
                        self.reporter.error(
                            format!("current {kind} does not return a result value"),
                            pos,
                        );
                    }
                }
                let inner_pos = inner.pos;
                let t = self.check_expr(inner);
                if self.ctx.type_kind_of(&t) != Some(TypeKind::ErrType) {
                    self.reporter.error("expected an errtype value", inner_pos);
                }
                self.ctx.no_return_t.clone()
            }
        }
    }

    // ── Expression helpers ─────────────────────────────────────────────

    fn object_typ(&self, obj: SymbolId) -> Type {
        match &self.ctx.sym(obj).kind {
            SymKind::Object(o) => o.typ.clone(),
            _ => self.ctx.void_t.clone(),
        }
    }

    fn fn_sym(&self, id: SymbolId) -> &FnSym {
        match &self.ctx.sym(id).kind {
            SymKind::Fn(fs) => fs,
            _ => panic!("symbol is not a function"),
        }
    }

    /// Type of a symbol used as a value (identifier or path tail).
    fn symbol_value_typ(&mut self, s: SymbolId, pos: Span) -> Type {
        match &self.ctx.sym(s).kind {
            SymKind::Fn(fs) => fs.typ(),
            SymKind::Const { typ } => typ.clone(),
            SymKind::Static { is_mut, typ } => {
                let (is_mut, typ) = (*is_mut, typ.clone());
                if is_mut && !self.inside_unsafe_block() {
                    self.report_mut_static(pos);
                }
                typ
            }
            _ => self.ctx.void_t.clone(),
        }
    }

    fn report_mut_static(&mut self, pos: Span) {
        self.reporter
            .error("use of mutable static is unsafe and requires `unsafe` block", pos);
        self.reporter.note(
            "mutable statics can be mutated by multiple threads: aliasing violations or data \
             races will cause undefined behavior",
        );
    }

    fn check_struct_lit(
        &mut self,
        target: &mut Expr,
        fields: &mut [bolt_parser::ast::expr::StructLitField],
    ) -> Type {
        let target_pos = target.pos;
        // the target resolves to a symbol, not a value; `Self` carries its
        // type from resolution
        if matches!(target.kind, ExprKind::SelfTyExpr { .. }) {
            self.check_expr(target);
        }
        let target_sym = match &target.kind {
            ExprKind::Ident(ident) => ident.sym,
            ExprKind::Path(path) => path.field_info,
            ExprKind::SelfTyExpr { .. } => target.typ.as_ref().and_then(Type::sym_of),
            _ => {
                self.reporter
                    .error("expected identifier or path expression", target_pos);
                return self.ctx.void_t.clone();
            }
        };
        let Some(target_sym) = target_sym else {
            return self.ctx.void_t.clone();
        };

        if self.ctx.sym(target_sym).type_kind() == Some(TypeKind::Struct) {
            let struct_name = self.ctx.sym(target_sym).name.clone();
            for f in fields.iter_mut() {
                let field = self.ctx.sym(target_sym).lookup_field(&f.name).cloned();
                match field {
                    Some(field) => {
                        let f_pos = f.expr.pos;
                        let ft = self.check_with_expected(&mut f.expr, field.typ.clone());
                        if let Err(msg) = self.check_types(&ft, &field.typ) {
                            self.reporter.error(msg, f_pos);
                            self.reporter.note(format!(
                                "in field `{}` of struct `{struct_name}`",
                                field.name
                            ));
                        }
                    }
                    None => {
                        self.reporter.error(
                            format!("struct `{struct_name}` has no field `{}`", f.name),
                            f.pos,
                        );
                    }
                }
            }
        } else {
            let kind = self
                .ctx
                .sym(target_sym)
                .type_kind()
                .map(|k| k.to_string())
                .unwrap_or_else(|| self.ctx.sym(target_sym).sym_kind().to_string());
            self.reporter
                .error(format!("expected struct, found {kind}"), target_pos);
        }
        Type::Sym(target_sym)
    }

    fn check_unary(&mut self, op: TokenKind, right: &mut Expr, pos: Span) -> Type {
        let t = self.check_expr(right);
        match op {
            TokenKind::Bang => {
                if t != self.ctx.bool_t {
                    self.reporter
                        .error("operator `!` can only be used with boolean values", pos);
                }
                t
            }
            TokenKind::BitNot => {
                if !self.ctx.is_int(&t) {
                    self.reporter
                        .error("operator `~` can only be used with numeric values", pos);
                }
                t
            }
            TokenKind::Minus => {
                if self.ctx.is_unsigned_int(&t) {
                    let shown = self.ctx.typ_display(&t);
                    self.reporter.error(
                        format!("cannot apply unary operator `-` to type `{shown}`"),
                        pos,
                    );
                    self.reporter.note("unsigned values cannot be negated");
                } else if !self.ctx.is_signed_int(&t) && !self.ctx.is_float(&t) {
                    self.reporter
                        .error("operator `-` can only be used with signed values", pos);
                }
                t
            }
            TokenKind::Inc | TokenKind::Dec => {
                if !self.ctx.is_int(&t) {
                    self.reporter.error(
                        format!("operator `{op}` can only be used with numeric values"),
                        pos,
                    );
                }
                t
            }
            TokenKind::Amp => {
                // `&(x)` behaves as `&x`
                let target: &Expr = match &right.kind {
                    ExprKind::Par { inner } => inner,
                    _ => right,
                };
                if let ExprKind::Index { left_typ: Some(lt), .. } = &target.kind {
                    if lt.is_ptr() {
                        self.reporter.error("cannot reference a pointer indexing", pos);
                    }
                } else if let ExprKind::Indirect { expr: inner } = &target.kind {
                    if inner.typ.as_ref().is_some_and(Type::is_ptr) {
                        self.reporter
                            .error("cannot take the address of a pointer dereference", pos);
                    }
                } else if t.is_ref() {
                    self.reporter
                        .error("cannot take the address of other reference", pos);
                }
                if self.expected_type.is_ptr() {
                    Type::Ptr(Box::new(t))
                } else {
                    Type::Ref(Box::new(t))
                }
            }
            _ => t,
        }
    }

    fn check_binary(
        &mut self,
        left: &mut Expr,
        op: TokenKind,
        right: &mut Expr,
        pos: Span,
    ) -> Type {
        let left_pos = left.pos;
        let right_pos = right.pos;
        let lt = self.check_expr(left);
        let rt = if matches!(op, TokenKind::KeyIs | TokenKind::KeyNotIs) {
            self.check_expr(right)
        } else {
            self.check_with_expected(right, lt.clone())
        };

        // pointer arithmetic
        if matches!(
            op,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Mul
                | TokenKind::Div
                | TokenKind::Mod
                | TokenKind::Xor
                | TokenKind::Amp
                | TokenKind::Pipe
        ) {
            if lt.is_ptr() {
                let bad = (rt.is_ptr() && op != TokenKind::Minus)
                    || (!rt.is_ptr() && !matches!(op, TokenKind::Plus | TokenKind::Minus));
                if bad {
                    let (l, r) = (self.ctx.typ_display(&lt), self.ctx.typ_display(&rt));
                    self.reporter
                        .error(format!("invalid operator `{op}` to `{l}` and `{r}`"), pos);
                } else if matches!(op, TokenKind::Plus | TokenKind::Minus)
                    && !self.inside_unsafe_block()
                {
                    self.reporter
                        .error("pointer arithmetic is only allowed inside `unsafe` block", pos);
                }
            } else if lt.is_ref() {
                self.reporter
                    .error("cannot use arithmetic operations with references", pos);
            }
        }

        let mut return_type = lt.clone();
        if matches!(op, TokenKind::KeyAnd | TokenKind::KeyOr) {
            if lt != self.ctx.bool_t {
                self.reporter.error(
                    format!("non-boolean expression in left operand for `{op}`"),
                    left_pos,
                );
            } else if rt != self.ctx.bool_t {
                self.reporter.error(
                    format!("non-boolean expression in right operand for `{op}`"),
                    right_pos,
                );
            } else if let ExprKind::Binary { op: left_op, .. } = &left.kind {
                // `a and b or c` reads two ways; require parentheses
                if *left_op != op
                    && matches!(left_op, TokenKind::KeyAnd | TokenKind::KeyOr)
                {
                    self.reporter.error("ambiguous boolean expression", pos);
                    self.reporter.help("use `()` to ensure correct order of operations");
                }
            }
        } else if op == TokenKind::KeyOrElse {
            match &lt {
                Type::Optional(inner) => {
                    if **inner != rt && rt != self.ctx.no_return_t {
                        let (i, r) =
                            (self.ctx.typ_display(inner), self.ctx.typ_display(&rt));
                        self.reporter
                            .error(format!("expected type `{i}`, found `{r}`"), right_pos);
                        self.reporter.note("in right operand for operator `orelse`");
                    }
                    return_type = (**inner).clone();
                }
                _ => {
                    self.reporter.error(
                        "expected optional value in left operand for operator `orelse`",
                        pos,
                    );
                }
            }
        }

        if lt == self.ctx.bool_t
            && rt == self.ctx.bool_t
            && !matches!(
                op,
                TokenKind::Eq
                    | TokenKind::Ne
                    | TokenKind::KeyAnd
                    | TokenKind::KeyOr
                    | TokenKind::Pipe
                    | TokenKind::Amp
            )
        {
            self.reporter.error(
                "boolean values only support `==`, `!=`, `and`, `or`, `&` and `|`",
                pos,
            );
        } else if lt == self.ctx.str_t
            && rt == self.ctx.str_t
            && !matches!(
                op,
                TokenKind::Eq
                    | TokenKind::Ne
                    | TokenKind::Lt
                    | TokenKind::Gt
                    | TokenKind::Le
                    | TokenKind::Ge
            )
        {
            self.reporter.error(
                "string values only support `==`, `!=`, `<`, `>`, `<=` and `>=`",
                pos,
            );
        }

        // `in`/`is` compare against a container or a type, not a value of
        // the left type; pointer arithmetic mixes `*T` with integers and
        // was validated above
        if !matches!(
            op,
            TokenKind::KeyIs
                | TokenKind::KeyNotIs
                | TokenKind::KeyIn
                | TokenKind::KeyNotIn
                | TokenKind::KeyOrElse
        ) && !lt.is_ptr()
        {
            if let Err(msg) = self.check_types(&rt, &return_type) {
                self.reporter.error(msg, right_pos);
            }
        }

        if op.is_relational() {
            self.ctx.bool_t.clone()
        } else {
            return_type
        }
    }

    fn check_index(&mut self, lt: Type, index: &mut Expr, pos: Span) -> Type {
        let is_range = matches!(index.kind, ExprKind::Range { .. });
        let index_pos = index.pos;
        let usize_t = self.ctx.usize_t.clone();
        let idx_t = self.check_with_expected(index, usize_t);

        let left_kind = self.ctx.type_kind_of(&lt);
        if matches!(left_kind, Some(TypeKind::Array | TypeKind::Slice)) && !lt.is_ptr() {
            if !self.ctx.is_unsigned_int(&idx_t) {
                let shown = self.ctx.typ_display(&idx_t);
                self.reporter.error(
                    format!("expected unsigned integer type, found `{shown}`"),
                    index_pos,
                );
            }
            let elem = lt.sym_of().and_then(|id| match &self.ctx.sym(id).kind {
                SymKind::Type { info: TypeInfo::Array { elem_typ, .. }, .. }
                | SymKind::Type { info: TypeInfo::Slice { elem_typ }, .. } => {
                    Some(elem_typ.clone())
                }
                _ => None,
            });
            let Some(elem) = elem else {
                return self.ctx.void_t.clone();
            };
            if is_range {
                if left_kind == Some(TypeKind::Slice) {
                    lt
                } else {
                    Type::Sym(self.ctx.add_or_get_slice(elem))
                }
            } else {
                elem
            }
        } else {
            if !(lt.is_ptr() || lt == self.ctx.str_t) {
                let shown = self.ctx.typ_display(&lt);
                self.reporter
                    .error(format!("type `{shown}` does not support indexing"), pos);
                self.reporter
                    .note("only `str`, pointers, arrays and slices support indexing");
            } else if !self.ctx.is_unsigned_int(&idx_t) {
                let shown = self.ctx.typ_display(&idx_t);
                self.reporter.error(
                    format!("expected unsigned integer type, found `{shown}`"),
                    index_pos,
                );
            } else if lt.is_ptr() {
                if !self.inside_unsafe_block() {
                    self.reporter
                        .error("pointer indexing is only allowed inside `unsafe` blocks", pos);
                } else if is_range {
                    self.reporter.error("cannot slice a pointer", index_pos);
                }
            }

            if lt == self.ctx.str_t {
                if is_range {
                    self.ctx.str_t.clone()
                } else {
                    self.ctx.u8_t.clone()
                }
            } else if lt.is_ptr() {
                lt.inner().clone()
            } else {
                self.ctx.void_t.clone()
            }
        }
    }

    fn check_selector(
        &mut self,
        left_typ: Type,
        field_name: &str,
        left_repr: &str,
        pos: Span,
        field_pos: Span,
    ) -> Type {
        if left_typ.is_optional() {
            self.reporter
                .error("fields of an optional value cannot be accessed directly", pos);
            self.reporter.help("handle it with `.?` or `orelse`");
            return self.ctx.void_t.clone();
        }
        if left_typ.is_ptr() {
            self.reporter
                .error("fields of a pointer value cannot be accessed directly", pos);
            self.reporter
                .help("use the dereference operator instead: `ptr_value.*.field_name`");
            return self.ctx.void_t.clone();
        }

        let Some(left_sym) = left_typ.sym_of() else {
            let shown = self.ctx.typ_display(&left_typ);
            self.reporter
                .error(format!("type `{shown}` has no field `{field_name}`"), pos);
            return self.ctx.void_t.clone();
        };
        let left_kind = self.ctx.sym(left_sym).type_kind();
        let left_name = self.ctx.sym(left_sym).name.clone();

        if matches!(left_kind, Some(TypeKind::Array | TypeKind::Slice)) && field_name == "len" {
            return self.ctx.usize_t.clone();
        }
        if let Some(field) = self.ctx.sym(left_sym).lookup_field(field_name).cloned() {
            if !field.is_pub && Some(self.cur_sym) != self.ctx.sym(left_sym).parent {
                self.reporter.error(
                    format!("field `{field_name}` of type `{left_name}` is private"),
                    field_pos,
                );
            }
            return field.typ;
        }
        if let Some(decl) = self.ctx.symbols.lookup_member(left_sym, field_name) {
            return match &self.ctx.sym(decl).kind {
                SymKind::Fn(fs) => {
                    if fs.is_method {
                        self.reporter.error(
                            format!("cannot take value of method `{field_name}`"),
                            field_pos,
                        );
                        self.reporter.help(format!(
                            "use parentheses to call the method: `{left_repr}.{field_name}()`"
                        ));
                        self.ctx.void_t.clone()
                    } else {
                        let typ = fs.typ();
                        self.reporter.error(
                            format!(
                                "cannot take value of associated function `{field_name}` from value"
                            ),
                            field_pos,
                        );
                        self.reporter
                            .help(format!("use `{left_name}::{field_name}` instead"));
                        typ
                    }
                }
                other => {
                    let kind = Symbolish(other).kind_str();
                    self.reporter.error(
                        format!("cannot take value of {kind} `{left_name}::{field_name}`"),
                        field_pos,
                    );
                    self.ctx.void_t.clone()
                }
            };
        }
        self.reporter
            .error(format!("type `{left_name}` has no field `{field_name}`"), pos);
        self.ctx.void_t.clone()
    }

    fn check_path(
        &mut self,
        field_info: Option<SymbolId>,
        left_info: Option<SymbolId>,
        has_error: bool,
        field_name: &str,
        pos: Span,
        field_pos: Span,
    ) -> Type {
        if has_error {
            return self.ctx.void_t.clone();
        }
        match field_info {
            Some(fi) => match &self.ctx.sym(fi).kind {
                SymKind::Fn(fs) => {
                    let typ = fs.typ();
                    if fs.is_method {
                        self.reporter.error(
                            format!("cannot take value of method `{field_name}`"),
                            field_pos,
                        );
                    }
                    typ
                }
                SymKind::Const { typ } => typ.clone(),
                SymKind::Static { is_mut, typ } => {
                    let (is_mut, typ) = (*is_mut, typ.clone());
                    if is_mut && !self.inside_unsafe_block() {
                        self.report_mut_static(pos);
                    }
                    typ
                }
                SymKind::Type { .. } => Type::Sym(fi),
                other => {
                    let kind = Symbolish(other).kind_str();
                    self.reporter
                        .error(format!("expected value, found {kind}"), field_pos);
                    self.ctx.void_t.clone()
                }
            },
            None => {
                // enum variant: the path types as the enum itself
                if let Some(li) = left_info {
                    if self.ctx.sym(li).type_kind() == Some(TypeKind::Enum) {
                        return Type::Sym(li);
                    }
                }
                self.reporter.error("unexpected bug for path expression", field_pos);
                self.ctx.void_t.clone()
            }
        }
    }

    fn check_builtin_call(&mut self, name: &str, args: &mut [Expr], pos: Span) -> Type {
        match name {
            "sizeof" => {
                for a in args.iter_mut() {
                    self.check_expr(a);
                }
                self.ctx.usize_t.clone()
            }
            "default" => {
                let t = args
                    .first_mut()
                    .map(|a| self.check_expr(a))
                    .unwrap_or_else(|| self.ctx.void_t.clone());
                t
            }
            "assert" => {
                if let Some(cond) = args.first_mut() {
                    let cond_pos = cond.pos;
                    let bool_t = self.ctx.bool_t.clone();
                    if self.check_with_expected(cond, bool_t) != self.ctx.bool_t {
                        self.reporter
                            .error("non-boolean expression used as `assert!` condition", cond_pos);
                    }
                }
                self.ctx.void_t.clone()
            }
            "trace" => {
                for a in args.iter_mut() {
                    self.check_expr(a);
                }
                self.ctx.void_t.clone()
            }
            "compile_warn" | "compile_error" => {
                let msg = match args.first() {
                    Some(Expr { kind: ExprKind::StrLit { value, .. }, .. }) => value.clone(),
                    _ => String::new(),
                };
                if name == "compile_warn" {
                    self.reporter.warn(msg, pos);
                } else {
                    self.reporter.error(msg, pos);
                }
                self.ctx.void_t.clone()
            }
            _ => {
                self.reporter
                    .error(format!("unknown builtin function `{name}`"), pos);
                self.ctx.void_t.clone()
            }
        }
    }

    // ── Calls ──────────────────────────────────────────────────────────

    fn check_call_expr(&mut self, call: &mut CallExpr, pos: Span) -> Type {
        let mut typ = self.ctx.void_t.clone();

        // a parenthesized selector callee means "call the field's value"
        let mut inside_parens = false;
        let is_par_selector = matches!(
            &call.left.kind,
            ExprKind::Par { inner } if matches!(inner.kind, ExprKind::Selector(_))
        );
        if is_par_selector {
            let ExprKind::Par { inner } =
                std::mem::replace(&mut call.left.kind, ExprKind::Empty)
            else {
                unreachable!();
            };
            *call.left = *inner;
            inside_parens = true;
        }

        let callee = if matches!(call.left.kind, ExprKind::Selector(_)) {
            self.method_callee(call, inside_parens, pos)
        } else {
            self.plain_callee(call, pos)
        };

        match callee {
            Callee::FnSym(s) => {
                call.info = Some(s);
                typ = self.check_call(s, call, pos);
            }
            Callee::ErrType(s) => {
                call.info = Some(s);
                typ = self.check_errtype_ctor(s, call, pos);
            }
            Callee::FnValue { args, ret } => {
                typ = self.check_fn_value_call(&args, ret, call, pos);
            }
            Callee::Invalid => {}
        }

        // `catch` is required exactly when the callee returns a result
        let callee_desc = match call.info {
            Some(s) => format!("{} `{}`", self.ctx.sym(s).sym_kind(), self.ctx.sym(s).name),
            None => "expression".to_string(),
        };
        if let Some(handler) = &mut call.err_handler {
            if typ.is_result() {
                if let Some(varname) = handler.varname.clone() {
                    let str_t = self.ctx.str_t.clone();
                    let scope = handler.scope;
                    self.update_scope_typ(scope, &varname, str_t);
                }
                let inner = match &typ {
                    Type::Result(inner) => (**inner).clone(),
                    _ => unreachable!(),
                };
                let h_pos = handler.expr.pos;
                let ht = self.check_with_expected(&mut handler.expr, inner.clone());
                if ht != self.ctx.no_return_t {
                    if let Err(msg) = self.check_types(&ht, &inner) {
                        self.reporter.error(msg, h_pos);
                        self.reporter.note("in `catch` handler expression");
                    }
                }
                typ = inner;
            } else {
                self.reporter.error(
                    format!("{callee_desc} does not return a result value"),
                    handler.pos,
                );
                self.check_expr(&mut handler.expr);
            }
        } else if typ.is_result() && !self.inside_try {
            self.reporter
                .error(format!("{callee_desc} returns a result"), pos);
            self.reporter
                .note("handle it with `catch` or propagate it with `try`");
        }

        typ
    }

    /// Resolve an `ident(...)` or `path::to::fn(...)` callee.
    fn plain_callee(&mut self, call: &mut CallExpr, pos: Span) -> Callee {
        match &call.left.kind {
            ExprKind::Ident(ident) => {
                if let Some(s) = ident.sym {
                    match &self.ctx.sym(s).kind {
                        SymKind::Fn(_) => Callee::FnSym(s),
                        SymKind::Type { kind: TypeKind::ErrType, .. } => Callee::ErrType(s),
                        _ => {
                            let shown = self.ctx.sym(s).sym_kind();
                            let left_pos = call.left.pos;
                            self.reporter
                                .error(format!("expected function, found {shown}"), left_pos);
                            Callee::Invalid
                        }
                    }
                } else if ident.is_obj {
                    let obj_typ = ident.obj.map(|o| self.object_typ(o));
                    match obj_typ {
                        Some(Type::Fn { args, ret }) => Callee::FnValue { args, ret: *ret },
                        Some(other) => {
                            let shown = self.ctx.typ_display(&other);
                            let left_pos = call.left.pos;
                            self.reporter
                                .error(format!("expected function, found {shown}"), left_pos);
                            Callee::Invalid
                        }
                        None => Callee::Invalid,
                    }
                } else {
                    Callee::Invalid
                }
            }
            ExprKind::Path(path) => match path.field_info {
                Some(fi) => match &self.ctx.sym(fi).kind {
                    SymKind::Fn(_) => Callee::FnSym(fi),
                    SymKind::Type { kind: TypeKind::ErrType, .. } => Callee::ErrType(fi),
                    other => {
                        let kind = Symbolish(other).kind_str();
                        self.reporter
                            .error(format!("expected function, found {kind}"), pos);
                        Callee::Invalid
                    }
                },
                None => Callee::Invalid,
            },
            _ => {
                self.reporter
                    .error("invalid expression used in call expression", pos);
                Callee::Invalid
            }
        }
    }

    /// Resolve a `value.method(...)` callee; reports receiver problems.
    fn method_callee(
        &mut self,
        call: &mut CallExpr,
        inside_parens: bool,
        pos: Span,
    ) -> Callee {
        let ExprKind::Selector(sel) = &mut call.left.kind else {
            return Callee::Invalid;
        };
        let left_typ = self.check_expr(&mut sel.left);
        let field_name = sel.field_name.clone();
        let field_pos = sel.field_pos;

        let Some(left_sym) = left_typ.sym_of() else {
            let shown = self.ctx.typ_display(&left_typ);
            self.reporter.error(
                format!("type `{shown}` has no method `{field_name}`"),
                field_pos,
            );
            return Callee::Invalid;
        };
        let left_name = self.ctx.sym(left_sym).name.clone();

        if let Some(m) = self.ctx.symbols.lookup_member(left_sym, &field_name) {
            match &self.ctx.sym(m).kind {
                SymKind::Fn(fs) => {
                    if fs.is_method {
                        if left_typ.is_optional() {
                            self.reporter
                                .error("optional value cannot be called directly", field_pos);
                            self.reporter
                                .help("use the none-check syntax: `foo.?.method()`");
                            self.reporter.help("or use `orelse`: `(foo orelse 5).method()`");
                            Callee::Invalid
                        } else if left_typ.is_ptr() {
                            if fs.self_is_ref {
                                self.reporter
                                    .error("cannot use pointers as references", pos);
                                self.reporter
                                    .help("consider casting this pointer to a reference");
                            } else {
                                self.reporter
                                    .error("unexpected pointer type as receiver", pos);
                                self.reporter.help("consider dereferencing this pointer");
                            }
                            Callee::Invalid
                        } else {
                            Callee::FnSym(m)
                        }
                    } else {
                        self.reporter
                            .error(format!("`{field_name}` is not a method"), field_pos);
                        Callee::Invalid
                    }
                }
                other => {
                    let kind = Symbolish(other).kind_str();
                    self.reporter
                        .error(format!("expected method, found {kind}"), field_pos);
                    Callee::Invalid
                }
            }
        } else if let Some(field) = self.ctx.sym(left_sym).lookup_field(&field_name).cloned() {
            match field.typ {
                Type::Fn { args, ret } => {
                    if inside_parens {
                        Callee::FnValue { args, ret: *ret }
                    } else {
                        self.reporter.error(
                            format!("type `{left_name}` has no method `{field_name}`"),
                            field_pos,
                        );
                        self.reporter.help(format!(
                            "to call the function stored in `{field_name}`, surround the field \
                             access with parentheses"
                        ));
                        Callee::Invalid
                    }
                }
                _ => {
                    self.reporter.error(
                        format!(
                            "field `{field_name}` of type `{left_name}` is not a function type"
                        ),
                        field_pos,
                    );
                    Callee::Invalid
                }
            }
        } else {
            self.reporter.error(
                format!("type `{left_name}` has no method `{field_name}`"),
                field_pos,
            );
            Callee::Invalid
        }
    }

    /// Validate a call against a declared function symbol: named-argument
    /// rules, default filling, arity, per-argument typing, unsafe usage.
    fn check_call(&mut self, info: SymbolId, call: &mut CallExpr, pos: Span) -> Type {
        let fs = self.fn_sym(info).clone();
        let kind = self.ctx.sym(info).sym_kind();
        let name = self.ctx.sym(info).name.clone();
        let typ = fs.ret_typ.clone();

        if fs.is_unsafe && !self.inside_unsafe_block() {
            self.reporter.warn(
                format!("{kind} `{name}` should be called inside `unsafe` block"),
                pos,
            );
        }

        let fn_args_len = fs.args.len();

        // named arguments must name a defaulted parameter
        let mut err = false;
        for arg in &call.args {
            if let Some(arg_name) = &arg.name {
                match fs.args.iter().find(|a| &a.name == arg_name) {
                    Some(param) => {
                        if !param.has_def_expr() {
                            self.reporter.error(
                                format!("argument `{arg_name}` is not optional"),
                                arg.pos,
                            );
                        }
                    }
                    None => {
                        err = true;
                        self.reporter.error(
                            format!(
                                "{kind} `{name}` does not have an argument called `{arg_name}`"
                            ),
                            arg.pos,
                        );
                    }
                }
            }
        }
        if err {
            return typ;
        }

        // positional first, then each missing slot takes its named
        // argument, else the declared default
        if fs.has_named_args {
            let pure = call.pure_args_count();
            let mut filled: Vec<CallArg> = call.args.iter().take(pure).cloned().collect();
            for param in fs.args.iter().skip(pure) {
                if !param.has_def_expr() {
                    continue;
                }
                if let Some(named) = call.get_named_arg(&param.name) {
                    let expr = named.expr.clone();
                    let expr_pos = expr.pos;
                    filled.push(CallArg { expr, name: None, pos: expr_pos });
                } else {
                    let def = param.def_expr.clone().expect("defaulted parameter");
                    let def_pos = def.pos;
                    filled.push(CallArg { expr: def, name: None, pos: def_pos });
                }
            }
            call.args = filled;
        }

        let expr_args_len = call.pure_args_count();
        if expr_args_len != fn_args_len {
            let which = if expr_args_len < fn_args_len { "few" } else { "many" };
            self.reporter
                .error(format!("too {which} arguments to {kind} `{name}`"), pos);
            self.reporter.note(format!(
                "expected {fn_args_len} argument(s), found {expr_args_len}"
            ));
            return typ;
        }

        for (i, arg) in call.args.iter_mut().enumerate() {
            let param_typ = fs.args[i].typ.clone();
            let arg_pos = arg.pos;
            let got = self.check_with_expected(&mut arg.expr, param_typ.clone());
            if !fs.is_extern {
                if let Err(msg) = self.check_types(&got, &param_typ) {
                    self.reporter.error(msg, arg_pos);
                    self.reporter.note(format!(
                        "in argument `{}` of {kind} `{name}`",
                        fs.args[i].name
                    ));
                }
            }
        }
        typ
    }

    /// Call through a function-typed value: positional arguments only.
    fn check_fn_value_call(
        &mut self,
        params: &[Type],
        ret: Type,
        call: &mut CallExpr,
        pos: Span,
    ) -> Type {
        if call.args.iter().any(|a| a.is_named()) {
            self.reporter
                .error("named arguments cannot be used with function values", pos);
            return ret;
        }
        if call.args.len() != params.len() {
            self.reporter.error(
                format!("expected {} argument(s), found {}", params.len(), call.args.len()),
                pos,
            );
            return ret;
        }
        for (arg, param_typ) in call.args.iter_mut().zip(params) {
            let arg_pos = arg.pos;
            let got = self.check_with_expected(&mut arg.expr, param_typ.clone());
            if let Err(msg) = self.check_types(&got, param_typ) {
                self.reporter.error(msg, arg_pos);
            }
        }
        ret
    }

    /// `SomeErr()` / `SomeErr("message")` constructs an error value.
    fn check_errtype_ctor(&mut self, info: SymbolId, call: &mut CallExpr, pos: Span) -> Type {
        let typ = Type::Sym(info);
        if call.args.len() == 1 {
            let arg_pos = call.args[0].pos;
            let t = self.check_expr(&mut call.args[0].expr);
            if t != self.ctx.str_t {
                let shown = self.ctx.typ_display(&t);
                self.reporter
                    .error(format!("expected string value, found `{shown}`"), arg_pos);
            }
        } else if !call.args.is_empty() {
            self.reporter.error(
                format!("expected 1 argument, found {}", call.args.len()),
                pos,
            );
        }
        typ
    }

    // ── Unsafe tracking ────────────────────────────────────────────────

    /// Record that an unsafe operation was checked and report whether an
    /// `unsafe` block covers it.
    fn inside_unsafe_block(&mut self) -> bool {
        self.unsafe_operations += 1;
        self.inside_unsafe
    }
}

/// What a call expression's left side resolved to.
enum Callee {
    FnSym(SymbolId),
    /// An error-type constructor: `SomeErr(...)`.
    ErrType(SymbolId),
    FnValue { args: Vec<Type>, ret: Type },
    Invalid,
}

/// Borrow wrapper to name a `SymKind` in diagnostics without a `Symbol`.
struct Symbolish<'k>(&'k SymKind);

impl Symbolish<'_> {
    fn kind_str(&self) -> &'static str {
        match self.0 {
            SymKind::Pkg { .. } => "package",
            SymKind::Mod { .. } => "module",
            SymKind::Type { .. } => "type",
            SymKind::Fn(f) => {
                if f.is_method {
                    "method"
                } else {
                    "function"
                }
            }
            SymKind::Const { .. } => "constant",
            SymKind::Static { .. } => "static",
            SymKind::Object(_) => "variable",
            SymKind::Label => "label",
        }
    }
}

/// Decoded byte length of a byte-string literal whose escapes are still
/// written out (`\xNN` and single-character escapes are one byte each).
fn bytestr_len(lit: &str) -> usize {
    let bytes = lit.as_bytes();
    let mut i = 0;
    let mut n = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 1 < bytes.len() {
            if bytes[i + 1] == b'x' {
                i += 4;
            } else {
                i += 2;
            }
        } else {
            i += 1;
        }
        n += 1;
    }
    n
}

#[cfg(test)]
mod tests {
    use super::bytestr_len;

    #[test]
    fn bytestr_length_counts_escapes_once() {
        assert_eq!(bytestr_len("abc"), 3);
        assert_eq!(bytestr_len(r"a\nb"), 3);
        assert_eq!(bytestr_len(r"\x00\xff"), 2);
        assert_eq!(bytestr_len(r"\\"), 1);
        assert_eq!(bytestr_len(""), 0);
    }
}
