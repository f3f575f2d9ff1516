//! Pass 1: symbol registration.
//!
//! A single walk over the declarations creates a symbol for each `const`,
//! `static`, `mod`, `type`, `errtype`, `trait`, `union`, `enum`, `struct`
//! and `fn`, attaches it to the parent's member table, and descends into
//! children. Method receivers synthesize a hidden `self` object in the
//! function's scope; declared parameters become argument objects there too.
//! Duplicate names in one table are redefinitions.
//!
//! `extend` bodies are deliberately skipped: their target type is not
//! resolvable yet, so the resolver registers those methods itself.

use rustc_hash::FxHashMap;

use bolt_common::report::Reporter;
use bolt_common::span::Span;
use bolt_parser::ast::decl::{Decl, DeclKind, FnDecl};
use bolt_parser::ast::sym::{
    FnSym, ObjectSym, ScopeId, StructFieldInfo, SymKind, Symbol, SymbolId, TypeInfo, TypeKind,
    Visibility,
};
use bolt_parser::ast::ty::Type;
use bolt_parser::ast::SourceFile;
use bolt_parser::context::CompilerContext;

pub struct Register<'a> {
    ctx: &'a mut CompilerContext,
    reporter: &'a mut Reporter,
}

impl<'a> Register<'a> {
    pub fn new(ctx: &'a mut CompilerContext, reporter: &'a mut Reporter) -> Self {
        Self { ctx, reporter }
    }

    pub fn visit_source_files(&mut self, files: &mut [SourceFile]) {
        for sf in files {
            self.reporter.set_file(&sf.file);
            let pkg = self.ctx.pkg_sym;
            for decl in &mut sf.decls {
                self.visit_decl(decl, pkg);
            }
        }
    }

    fn visit_decls(&mut self, decls: &mut [Decl], parent: SymbolId) {
        for decl in decls {
            self.visit_decl(decl, parent);
        }
    }

    fn visit_decl(&mut self, decl: &mut Decl, parent: SymbolId) {
        let vis = decl.vis;
        match &mut decl.kind {
            DeclKind::ExternPkg { name } => {
                let id = self.ctx.symbols.alloc(Symbol {
                    name: name.clone(),
                    vis: Visibility::Public,
                    parent: None,
                    kind: SymKind::Pkg { members: FxHashMap::default() },
                });
                self.ctx.universe_add(name, id);
            }
            DeclKind::Extern { protos, .. } => {
                self.visit_decls(protos, parent);
            }
            DeclKind::Const { name, name_pos, typ, sym, .. } => {
                let id = self.ctx.symbols.alloc(Symbol {
                    name: name.clone(),
                    vis,
                    parent: None,
                    kind: SymKind::Const { typ: typ.clone() },
                });
                self.attach(parent, id, *name_pos);
                *sym = Some(id);
            }
            DeclKind::Static { is_mut, name, name_pos, typ, sym, .. } => {
                let id = self.ctx.symbols.alloc(Symbol {
                    name: name.clone(),
                    vis,
                    parent: None,
                    kind: SymKind::Static { is_mut: *is_mut, typ: typ.clone() },
                });
                self.attach(parent, id, *name_pos);
                *sym = Some(id);
            }
            DeclKind::Mod { name, name_pos, decls, sym } => {
                let id = self.ctx.symbols.alloc(Symbol {
                    name: name.clone(),
                    vis,
                    parent: None,
                    kind: SymKind::Mod { members: FxHashMap::default() },
                });
                self.attach(parent, id, *name_pos);
                *sym = Some(id);
                self.visit_decls(decls, id);
            }
            DeclKind::TypeAlias { name, name_pos, parent: alias_parent, sym } => {
                let id = self.alloc_type(
                    name,
                    vis,
                    TypeKind::Alias,
                    TypeInfo::Alias { parent: alias_parent.clone() },
                );
                self.attach(parent, id, *name_pos);
                *sym = Some(id);
            }
            DeclKind::ErrType { name, name_pos, sym } => {
                let id = self.alloc_type(name, vis, TypeKind::ErrType, TypeInfo::None);
                self.attach(parent, id, *name_pos);
                *sym = Some(id);
            }
            DeclKind::Trait { name, name_pos, decls, sym } => {
                let id = self.alloc_type(name, vis, TypeKind::Trait, TypeInfo::None);
                self.attach(parent, id, *name_pos);
                *sym = Some(id);
                self.visit_decls(decls, id);
            }
            DeclKind::Union { name, name_pos, variants, decls, sym } => {
                let id = self.alloc_type(
                    name,
                    vis,
                    TypeKind::Union,
                    TypeInfo::Union { variants: variants.clone() },
                );
                self.attach(parent, id, *name_pos);
                *sym = Some(id);
                self.visit_decls(decls, id);
            }
            DeclKind::Enum { name, name_pos, variants, decls, sym } => {
                let id = self.alloc_type(
                    name,
                    vis,
                    TypeKind::Enum,
                    TypeInfo::Enum { variants: variants.clone() },
                );
                self.attach(parent, id, *name_pos);
                *sym = Some(id);
                self.visit_decls(decls, id);
            }
            DeclKind::Struct { name, name_pos, decls, sym } => {
                let fields: Vec<StructFieldInfo> = decls
                    .iter()
                    .filter_map(|d| match &d.kind {
                        DeclKind::StructField { is_pub, is_mut, name, typ, def_expr, .. } => {
                            Some(StructFieldInfo {
                                name: name.clone(),
                                is_pub: *is_pub,
                                is_mut: *is_mut,
                                typ: typ.clone(),
                                has_def_expr: def_expr.is_some(),
                            })
                        }
                        _ => None,
                    })
                    .collect();
                let id =
                    self.alloc_type(name, vis, TypeKind::Struct, TypeInfo::Struct { fields });
                self.attach(parent, id, *name_pos);
                *sym = Some(id);
                // register nested items (methods, consts, destructor scope)
                for d in decls.iter_mut() {
                    match &mut d.kind {
                        DeclKind::StructField { .. } => {}
                        DeclKind::Destructor { scope, .. } => {
                            let scope = *scope;
                            self.add_self_object(scope, id, false, false);
                        }
                        _ => self.visit_decl(d, id),
                    }
                }
            }
            DeclKind::Fn(fn_decl) => {
                self.register_fn(fn_decl, vis, parent);
            }
            DeclKind::StructField { .. } => {
                // only legal inside a struct body, where the struct arm
                // consumed it
            }
            DeclKind::Extend { .. } => {}
            DeclKind::Test { .. } | DeclKind::Destructor { .. } | DeclKind::Empty => {}
        }
    }

    /// Create the `Fn` symbol, attach it, and seed the function scope with
    /// the receiver and argument objects. Also used by the resolver to
    /// register `extend` methods once their target type is known.
    pub(crate) fn register_fn(&mut self, decl: &mut FnDecl, vis: Visibility, parent: SymbolId) {
        let id = self.ctx.symbols.alloc(Symbol {
            name: decl.name.clone(),
            vis,
            parent: None,
            kind: SymKind::Fn(FnSym {
                is_extern: decl.is_extern,
                is_unsafe: decl.is_unsafe,
                is_method: decl.is_method,
                self_is_ref: decl.self_is_ref,
                self_is_mut: decl.self_is_mut,
                args: decl.args.clone(),
                ret_typ: decl.ret_typ.clone(),
                has_named_args: decl.has_named_args,
            }),
        });
        self.attach(parent, id, decl.name_pos);
        decl.sym = Some(id);

        if decl.is_method {
            self.add_self_object(decl.scope, parent, decl.self_is_ref, decl.self_is_mut);
        }
        for arg in &decl.args {
            let obj = self.ctx.symbols.alloc(Symbol {
                name: arg.name.clone(),
                vis: Visibility::Private,
                parent: None,
                kind: SymKind::Object(ObjectSym {
                    is_mut: arg.is_mut,
                    is_arg: true,
                    typ: arg.typ.clone(),
                }),
            });
            if let Err(msg) = self.ctx.scopes.add(decl.scope, &arg.name, obj) {
                self.reporter.error(msg, arg.pos);
            }
        }
    }

    /// Synthesize the hidden `self` object for a method or destructor.
    fn add_self_object(
        &mut self,
        scope: ScopeId,
        owner: SymbolId,
        self_is_ref: bool,
        self_is_mut: bool,
    ) {
        if self.ctx.scopes.exists(scope, "self") {
            return;
        }
        let mut self_typ = Type::Sym(owner);
        if self_is_ref {
            self_typ = Type::Ref(Box::new(self_typ));
        }
        let obj = self.ctx.symbols.alloc(Symbol {
            name: "self".into(),
            vis: Visibility::Private,
            parent: None,
            kind: SymKind::Object(ObjectSym { is_mut: self_is_mut, is_arg: true, typ: self_typ }),
        });
        let _ = self.ctx.scopes.add(scope, "self", obj);
    }

    fn alloc_type(
        &mut self,
        name: &str,
        vis: Visibility,
        kind: TypeKind,
        info: TypeInfo,
    ) -> SymbolId {
        self.ctx.symbols.alloc(Symbol {
            name: name.to_string(),
            vis,
            parent: None,
            kind: SymKind::Type { kind, members: FxHashMap::default(), info },
        })
    }

    fn attach(&mut self, parent: SymbolId, child: SymbolId, pos: Span) {
        if let Err(msg) = self.ctx.symbols.add_member(parent, child) {
            self.reporter.error(msg, pos);
        }
    }
}
