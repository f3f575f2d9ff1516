//! Pass 2: name resolution.
//!
//! Binds every identifier, path expression and syntactic type node to a
//! symbol. Identifiers try the lexical scope first (objects and labels),
//! then the enclosing symbol scopes. Type nodes are rewritten to their
//! canonical interned form; aliases are transparently unaliased; error
//! types are rejected outside `raise` and `is` comparisons.

use bolt_common::report::Reporter;
use bolt_common::span::Span;
use bolt_common::token::TokenKind;
use bolt_parser::ast::decl::{Decl, DeclKind};
use bolt_parser::ast::expr::{Expr, ExprKind};
use bolt_parser::ast::stmt::{Stmt, StmtKind};
use bolt_parser::ast::sym::{SymKind, SymbolId, TypeInfo, TypeKind};
use bolt_parser::ast::ty::Type;
use bolt_parser::ast::{is_known_comptime_constant, SourceFile};
use bolt_parser::context::CompilerContext;

use crate::register::Register;

/// Outcome of resolving one path segment.
enum PathTarget {
    Sym(SymbolId),
    /// The segment named an enum variant; there is no symbol for it.
    EnumVariant,
    Missing,
}

pub struct Resolver<'a> {
    ctx: &'a mut CompilerContext,
    reporter: &'a mut Reporter,
    cur_sym: SymbolId,
    self_sym: Option<SymbolId>,
    inside_is_comparation: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(ctx: &'a mut CompilerContext, reporter: &'a mut Reporter) -> Self {
        let cur_sym = ctx.pkg_sym;
        Self { ctx, reporter, cur_sym, self_sym: None, inside_is_comparation: false }
    }

    /// Register all declarations, then resolve every file. Resolution is
    /// skipped entirely when registration (or anything before it)
    /// reported errors.
    pub fn resolve_files(&mut self, files: &mut [SourceFile]) {
        Register::new(self.ctx, self.reporter).visit_source_files(files);
        if self.reporter.has_errors() {
            return;
        }

        self.cur_sym = self.ctx.pkg_sym;
        for sf in files {
            self.reporter.set_file(&sf.file);
            self.resolve_decls(&mut sf.decls);
        }
    }

    fn resolve_decls(&mut self, decls: &mut [Decl]) {
        for decl in decls {
            self.resolve_decl(decl);
        }
    }

    fn resolve_decl(&mut self, decl: &mut Decl) {
        if !decl.attrs.if_check {
            return;
        }
        match &mut decl.kind {
            DeclKind::Empty | DeclKind::ExternPkg { .. } => {}
            DeclKind::Extern { protos, .. } => self.resolve_decls(protos),
            DeclKind::Const { typ, expr, sym, .. } => {
                self.resolve_type(typ);
                self.resolve_expr(expr);
                if let Some(id) = *sym {
                    if let SymKind::Const { typ: sym_typ } = &mut self.ctx.symbols.get_mut(id).kind
                    {
                        *sym_typ = typ.clone();
                    }
                }
            }
            DeclKind::Static { typ, expr, sym, .. } => {
                self.resolve_type(typ);
                self.resolve_expr(expr);
                if let Some(id) = *sym {
                    if let SymKind::Static { typ: sym_typ, .. } =
                        &mut self.ctx.symbols.get_mut(id).kind
                    {
                        *sym_typ = typ.clone();
                    }
                }
            }
            DeclKind::Mod { decls, sym, .. } => {
                let old_sym = self.cur_sym;
                if let Some(id) = *sym {
                    self.cur_sym = id;
                }
                self.resolve_decls(decls);
                self.cur_sym = old_sym;
            }
            DeclKind::TypeAlias { parent, sym, .. } => {
                self.resolve_type(parent);
                if let Some(id) = *sym {
                    if let SymKind::Type { info: TypeInfo::Alias { parent: p }, .. } =
                        &mut self.ctx.symbols.get_mut(id).kind
                    {
                        *p = parent.clone();
                    }
                }
            }
            DeclKind::ErrType { .. } => {}
            DeclKind::Trait { decls, .. } => self.resolve_decls(decls),
            DeclKind::Union { variants, decls, sym, .. } => {
                let old_self = self.self_sym;
                self.self_sym = *sym;
                for v in variants.iter_mut() {
                    self.resolve_type(v);
                }
                if let Some(id) = *sym {
                    if let SymKind::Type { info: TypeInfo::Union { variants: vs }, .. } =
                        &mut self.ctx.symbols.get_mut(id).kind
                    {
                        *vs = variants.clone();
                    }
                }
                self.resolve_decls(decls);
                self.self_sym = old_self;
            }
            DeclKind::Enum { decls, sym, .. } => {
                let old_self = self.self_sym;
                self.self_sym = *sym;
                self.resolve_decls(decls);
                self.self_sym = old_self;
            }
            DeclKind::Struct { decls, sym, .. } => {
                let old_self = self.self_sym;
                self.self_sym = *sym;
                self.resolve_decls(decls);
                self.self_sym = old_self;
            }
            DeclKind::StructField { name, typ, def_expr, .. } => {
                self.resolve_type(typ);
                if let Some(def) = def_expr {
                    self.resolve_expr(def);
                }
                // keep the struct symbol's field record in sync
                if let Some(struct_sym) = self.self_sym {
                    if let SymKind::Type { info: TypeInfo::Struct { fields }, .. } =
                        &mut self.ctx.symbols.get_mut(struct_sym).kind
                    {
                        if let Some(field) = fields.iter_mut().find(|f| &f.name == name) {
                            field.typ = typ.clone();
                        }
                    }
                }
            }
            DeclKind::Extend { typ, decls } => {
                if self.resolve_type(typ) {
                    let Some(target) = typ.sym_of() else {
                        return;
                    };
                    let old_self = self.self_sym;
                    self.self_sym = Some(target);
                    let interned = matches!(
                        self.ctx.sym(target).type_kind(),
                        Some(TypeKind::Array | TypeKind::Slice | TypeKind::Tuple)
                    );
                    for d in decls.iter_mut() {
                        let d_vis = d.vis;
                        match &mut d.kind {
                            DeclKind::Fn(f) => {
                                if interned && !f.is_method {
                                    self.reporter.error("expected method", f.name_pos);
                                    continue;
                                }
                                Register::new(self.ctx, self.reporter)
                                    .register_fn(f, d_vis, target);
                            }
                            _ => self.reporter.error("expected method", d.pos),
                        }
                    }
                    self.resolve_decls(decls);
                    self.self_sym = old_self;
                }
            }
            DeclKind::Test { stmts, .. } => self.resolve_stmts(stmts),
            DeclKind::Fn(f) => {
                for arg in f.args.iter_mut() {
                    self.resolve_type(&mut arg.typ);
                    if let Some(def) = &mut arg.def_expr {
                        self.resolve_expr(def);
                    }
                }
                self.resolve_type(&mut f.ret_typ);
                // push the resolved signature back onto the symbol and the
                // argument objects
                if let Some(id) = f.sym {
                    if let SymKind::Fn(fs) = &mut self.ctx.symbols.get_mut(id).kind {
                        fs.args = f.args.clone();
                        fs.ret_typ = f.ret_typ.clone();
                    }
                }
                for arg in &f.args {
                    self.ctx.scopes.update_typ(
                        f.scope,
                        &arg.name,
                        arg.typ.clone(),
                        &mut self.ctx.symbols,
                    );
                }
                self.resolve_stmts(&mut f.stmts);
            }
            DeclKind::Destructor { stmts, .. } => self.resolve_stmts(stmts),
        }
    }

    fn resolve_stmts(&mut self, stmts: &mut [Stmt]) {
        for stmt in stmts {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_stmt(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Let(let_stmt) => {
                for binding in let_stmt.lefts.iter_mut() {
                    if let Some(typ) = &mut binding.typ {
                        self.resolve_type(typ);
                        self.ctx.scopes.update_typ(
                            let_stmt.scope,
                            &binding.name,
                            typ.clone(),
                            &mut self.ctx.symbols,
                        );
                    }
                }
                self.resolve_expr(&mut let_stmt.right);
            }
            StmtKind::Assign { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            StmtKind::Expr(expr) => self.resolve_expr(expr),
            StmtKind::While { cond, body, .. } => {
                self.resolve_expr(cond);
                self.resolve_stmt(body);
            }
            StmtKind::ForIn { iterable, body, .. } => {
                self.resolve_expr(iterable);
                self.resolve_stmt(body);
            }
            StmtKind::Loop { body } => self.resolve_stmt(body),
            StmtKind::Label { .. } | StmtKind::Goto { .. } | StmtKind::Branch { .. } => {}
        }
    }

    fn resolve_exprs(&mut self, exprs: &mut [Expr]) {
        for e in exprs {
            self.resolve_expr(e);
        }
    }

    fn resolve_expr(&mut self, expr: &mut Expr) {
        let pos = expr.pos;

        // `Self` sets the expression's type right here, so it can serve as
        // a struct-literal target
        if matches!(expr.kind, ExprKind::SelfTyExpr { .. }) {
            match self.self_sym {
                Some(s) => expr.typ = Some(Type::Sym(s)),
                None => self.reporter.error("cannot resolve type for `Self`", pos),
            }
            return;
        }
        if matches!(expr.kind, ExprKind::Path(_)) {
            self.resolve_path(expr);
            return;
        }

        match &mut expr.kind {
            ExprKind::Par { inner } => self.resolve_expr(inner),
            ExprKind::Ident(ident) => {
                if ident.name == "_" {
                    return; // placeholder
                }
                if ident.is_comptime {
                    if !is_known_comptime_constant(&ident.name) {
                        self.reporter
                            .error(format!("unknown comptime constant `{}`", ident.name), pos);
                    }
                    return;
                }
                if let Some(obj) = self.ctx.scopes.lookup(ident.scope, &ident.name) {
                    if matches!(self.ctx.sym(obj).kind, SymKind::Label) {
                        self.reporter.error("expected value, found label", pos);
                    } else {
                        ident.is_obj = true;
                        ident.obj = Some(obj);
                    }
                } else if let Some(s) = self.ctx.symbols.lookup_walk(self.cur_sym, &ident.name) {
                    ident.sym = Some(s);
                } else {
                    self.reporter
                        .error(format!("cannot find `{}` in this scope", ident.name), pos);
                }
            }
            ExprKind::SelfExpr { scope } => {
                if self.ctx.scopes.lookup(*scope, "self").is_none() {
                    self.reporter.error("cannot find `self` in this scope", pos);
                }
            }
            ExprKind::TypeNode { typ } => {
                self.resolve_type(typ);
            }
            ExprKind::TupleLit { exprs } => self.resolve_exprs(exprs),
            ExprKind::ArrayLit { elems } => self.resolve_exprs(elems),
            ExprKind::StructLit { target, fields } => {
                self.resolve_expr(target);
                for f in fields {
                    self.resolve_expr(&mut f.expr);
                }
            }
            ExprKind::Unary { right, .. } => self.resolve_expr(right),
            ExprKind::Binary { left, op, right } => {
                let old = self.inside_is_comparation;
                self.inside_is_comparation =
                    matches!(op, TokenKind::KeyIs | TokenKind::KeyNotIs);
                self.resolve_expr(left);
                self.resolve_expr(right);
                self.inside_is_comparation = old;
            }
            ExprKind::Postfix { left, .. } => self.resolve_expr(left),
            ExprKind::Cast { expr: inner, target } => {
                self.resolve_expr(inner);
                self.resolve_type(target);
            }
            ExprKind::NoneCheck { expr: inner } | ExprKind::Indirect { expr: inner } => {
                self.resolve_expr(inner)
            }
            ExprKind::Guard { expr: inner, .. } => self.resolve_expr(inner),
            ExprKind::Index { left, index, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(index);
            }
            ExprKind::Range { start, end, .. } => {
                if let Some(s) = start {
                    self.resolve_expr(s);
                }
                if let Some(e) = end {
                    self.resolve_expr(e);
                }
            }
            ExprKind::Selector(sel) => self.resolve_expr(&mut sel.left),
            ExprKind::BuiltinCall { args, .. } => self.resolve_exprs(args),
            ExprKind::Call(call) => {
                self.resolve_expr(&mut call.left);
                for arg in call.args.iter_mut() {
                    self.resolve_expr(&mut arg.expr);
                }
                if let Some(handler) = &mut call.err_handler {
                    self.resolve_expr(&mut handler.expr);
                }
            }
            ExprKind::Try { expr: inner } | ExprKind::Go { expr: inner } => {
                self.resolve_expr(inner)
            }
            ExprKind::Block(block) => {
                self.resolve_stmts(&mut block.stmts);
                if let Some(tail) = &mut block.tail {
                    self.resolve_expr(tail);
                }
            }
            ExprKind::If(if_expr) => {
                if if_expr.is_comptime {
                    // only the branch the comptime evaluator selected
                    if let Some(idx) = if_expr.branch_idx {
                        if let Some(branch) = if_expr.branches.get_mut(idx) {
                            self.resolve_expr(&mut branch.expr);
                        }
                    }
                } else {
                    for branch in if_expr.branches.iter_mut() {
                        if let Some(cond) = &mut branch.cond {
                            self.resolve_expr(cond);
                        }
                        self.resolve_expr(&mut branch.expr);
                    }
                }
            }
            ExprKind::Match(match_expr) => {
                self.resolve_expr(&mut match_expr.expr);
                for branch in match_expr.branches.iter_mut() {
                    self.resolve_exprs(&mut branch.pats);
                    self.resolve_expr(&mut branch.expr);
                }
            }
            ExprKind::Return { expr: ret } => {
                if let Some(e) = ret {
                    self.resolve_expr(e);
                }
            }
            ExprKind::Raise { expr: inner } => self.resolve_expr(inner),
            ExprKind::Empty
            | ExprKind::VoidLit
            | ExprKind::NoneLit
            | ExprKind::BoolLit(_)
            | ExprKind::CharLit { .. }
            | ExprKind::IntLit { .. }
            | ExprKind::FloatLit { .. }
            | ExprKind::StrLit { .. }
            | ExprKind::EnumVariant { .. }
            | ExprKind::PkgExpr => {}
            ExprKind::SelfTyExpr { .. } | ExprKind::Path(_) => unreachable!("handled above"),
        }
    }

    // ── Paths ──────────────────────────────────────────────────────────

    /// Resolve one path segment against the symbol on its left.
    fn find_symbol(&mut self, symbol: SymbolId, name: &str, pos: Span) -> PathTarget {
        if let Some(s) = self.ctx.symbols.lookup_member(symbol, name) {
            self.check_visibility(s, pos);
            return PathTarget::Sym(s);
        }
        let sym = self.ctx.sym(symbol);
        if let SymKind::Type { kind: TypeKind::Enum, info: TypeInfo::Enum { variants }, .. } =
            &sym.kind
        {
            if variants.iter().any(|v| v == name) {
                return PathTarget::EnumVariant;
            }
            let enum_name = sym.name.clone();
            self.reporter
                .error(format!("enum `{enum_name}` has no variant `{name}`"), pos);
            return PathTarget::Missing;
        }
        let (kind, sym_name) = (sym.sym_kind(), sym.name.clone());
        self.reporter
            .error(format!("could not find `{name}` in {kind} `{sym_name}`"), pos);
        PathTarget::Missing
    }

    fn resolve_path(&mut self, expr: &mut Expr) {
        let pos = expr.pos;
        let ExprKind::Path(path) = &mut expr.kind else {
            return;
        };

        match &mut path.left.kind {
            ExprKind::PkgExpr => {
                path.left_info = Some(self.ctx.pkg_sym);
                match self.find_symbol(self.ctx.pkg_sym, &path.field_name, path.field_pos) {
                    PathTarget::Sym(s) => path.field_info = Some(s),
                    PathTarget::EnumVariant => {}
                    PathTarget::Missing => path.has_error = true,
                }
            }
            ExprKind::Ident(ident) => {
                if let Some(local) = self.ctx.symbols.lookup_walk(self.cur_sym, &ident.name) {
                    path.left_info = Some(local);
                    match self.find_symbol(local, &path.field_name, path.field_pos) {
                        PathTarget::Sym(s) => path.field_info = Some(s),
                        PathTarget::EnumVariant => {}
                        PathTarget::Missing => path.has_error = true,
                    }
                } else if let Some(package) = self.ctx.universe_lookup(&ident.name) {
                    // external package
                    path.left_info = Some(package);
                    match self.find_symbol(package, &path.field_name, path.field_pos) {
                        PathTarget::Sym(s) => path.field_info = Some(s),
                        PathTarget::EnumVariant => {}
                        PathTarget::Missing => path.has_error = true,
                    }
                } else {
                    let name = ident.name.clone();
                    let left_pos = path.left.pos;
                    self.reporter.error(
                        format!("use of undeclared external package `{name}`"),
                        left_pos,
                    );
                    path.has_error = true;
                }
            }
            ExprKind::Path(_) => {
                self.resolve_path(&mut path.left);
                let ExprKind::Path(left_path) = &path.left.kind else {
                    unreachable!();
                };
                if !left_path.has_error {
                    path.left_info = left_path.field_info;
                    if let Some(fi) = left_path.field_info {
                        match self.find_symbol(fi, &path.field_name, path.field_pos) {
                            PathTarget::Sym(s) => path.field_info = Some(s),
                            PathTarget::EnumVariant => {}
                            PathTarget::Missing => path.has_error = true,
                        }
                    } else {
                        path.has_error = true;
                    }
                } else {
                    path.has_error = true;
                }
            }
            _ => {
                self.reporter.error("bad use of path expression", pos);
                path.has_error = true;
            }
        }
    }

    fn check_visibility(&mut self, sym: SymbolId, pos: Span) {
        let s = self.ctx.sym(sym);
        if s.vis == bolt_parser::ast::sym::Visibility::Private && s.parent != Some(self.cur_sym) {
            let msg = format!("{} `{}` is private", s.sym_kind(), s.name);
            self.reporter.error(msg, pos);
        }
    }

    // ── Types ──────────────────────────────────────────────────────────

    fn disallow_errtype_use(&mut self, kind: TypeKind, pos: Span) {
        if !self.inside_is_comparation && kind == TypeKind::ErrType {
            self.reporter.error("cannot use error type as a normal type", pos);
            self.reporter
                .note("error types can only be used inside `raise` or in `is` comparisons");
        }
    }

    /// Resolve a type node in place. Returns whether the node is fully
    /// resolved afterwards; resolving an already-resolved node is a no-op.
    pub(crate) fn resolve_type(&mut self, typ: &mut Type) -> bool {
        match typ {
            Type::Ref(inner)
            | Type::Ptr(inner)
            | Type::Optional(inner)
            | Type::Result(inner) => self.resolve_type(inner),
            Type::Slice { elem, sym } => {
                if self.resolve_type(elem) {
                    *sym = Some(self.ctx.add_or_get_slice((**elem).clone()));
                    true
                } else {
                    false
                }
            }
            Type::Array { elem, size, sym } => {
                self.resolve_expr(size);
                if self.resolve_type(elem) {
                    *sym = Some(self.ctx.add_or_get_array((**elem).clone(), size));
                    true
                } else {
                    false
                }
            }
            Type::Tuple { types, sym } => {
                let mut res = true;
                for t in types.iter_mut() {
                    res &= self.resolve_type(t);
                }
                *sym = Some(self.ctx.add_or_get_tuple(types.clone()));
                res
            }
            Type::Fn { args, ret } => {
                let mut res = true;
                for a in args.iter_mut() {
                    res &= self.resolve_type(a);
                }
                res & self.resolve_type(ret)
            }
            Type::Sym(_) => true,
            Type::Unknown { expr } => {
                let mut name_expr = (**expr).clone();
                match self.resolve_type_expr(&mut name_expr) {
                    Some(resolved) => {
                        *typ = resolved;
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Resolve the expression naming a type (`Ident`, `Path` or `Self`)
    /// into a canonical type.
    fn resolve_type_expr(&mut self, expr: &mut Expr) -> Option<Type> {
        let pos = expr.pos;
        match &expr.kind {
            ExprKind::Ident(ident) => {
                if let Some(t) = self.ctx.primitive_type(&ident.name) {
                    return Some(t);
                }
                let name = ident.name.clone();
                match self.ctx.symbols.lookup_walk(self.cur_sym, &name) {
                    Some(s) => self.named_type(s, pos),
                    None => {
                        self.reporter
                            .error(format!("cannot find type `{name}` in this scope"), pos);
                        None
                    }
                }
            }
            ExprKind::Path(_) => {
                self.resolve_path(expr);
                let ExprKind::Path(path) = &expr.kind else {
                    unreachable!();
                };
                if path.has_error {
                    return None;
                }
                match path.field_info {
                    Some(fi) => self.named_type(fi, pos),
                    None => {
                        self.reporter.error("expected type, found enum variant", pos);
                        None
                    }
                }
            }
            ExprKind::SelfTyExpr { .. } => match self.self_sym {
                Some(s) => Some(Type::Sym(s)),
                None => {
                    self.reporter.error("cannot resolve type for `Self`", pos);
                    None
                }
            },
            _ => {
                self.reporter.error("expected type, found expression", pos);
                None
            }
        }
    }

    /// A resolved symbol used in type position: must be a type; aliases
    /// are unaliased (idempotently); errtype placement is enforced.
    fn named_type(&mut self, sym: SymbolId, pos: Span) -> Option<Type> {
        match self.ctx.sym(sym).type_kind() {
            Some(TypeKind::Alias) => {
                let mut parent = match &self.ctx.sym(sym).kind {
                    SymKind::Type { info: TypeInfo::Alias { parent }, .. } => parent.clone(),
                    _ => unreachable!(),
                };
                if self.resolve_type(&mut parent) {
                    if let SymKind::Type { info: TypeInfo::Alias { parent: p }, .. } =
                        &mut self.ctx.symbols.get_mut(sym).kind
                    {
                        *p = parent.clone();
                    }
                    Some(parent)
                } else {
                    None
                }
            }
            Some(kind) => {
                self.disallow_errtype_use(kind, pos);
                Some(Type::Sym(sym))
            }
            None => {
                let found = self.ctx.sym(sym).sym_kind();
                self.reporter.error(format!("expected type, found {found}"), pos);
                None
            }
        }
    }
}
