//! Declaration parsing.
//!
//! A declaration's prefix is always read in the same order: doc-comment
//! block, attribute block, visibility, `unsafe`. The head keyword then
//! dispatches to its specialized parser. `unsafe` is rejected on everything
//! except functions; `extern` carries its own placement rules.

use bolt_common::token::TokenKind;

use crate::ast::decl::{Attr, Attrs, Decl, DeclKind, FnDecl};
use crate::ast::sym::{FnArg, Visibility};
use crate::ast::ty::Type;

use super::Parser;

impl Parser<'_> {
    pub(crate) fn parse_decls(&mut self) -> Vec<Decl> {
        let mut decls = Vec::new();
        while self.tok.kind != TokenKind::Eof {
            decls.push(self.parse_decl());
        }
        decls
    }

    fn parse_doc_comment(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while self.accept(TokenKind::DocComment) {
            lines.push(self.prev_tok.lit.clone());
        }
        lines
    }

    /// Parse `#[name; name; if(cond)]` blocks.
    fn parse_attrs(&mut self) -> Attrs {
        let mut attrs = Attrs::new();
        while self.accept(TokenKind::Hash) {
            self.expect(TokenKind::Lbracket);
            loop {
                let pos = self.tok.pos();
                if self.accept(TokenKind::KeyIf) {
                    self.expect(TokenKind::Lparen);
                    let cond = self.parse_expr();
                    self.expect(TokenKind::Rparen);
                    attrs.add(Attr { name: "if".into(), pos, cond: Some(cond) });
                } else {
                    let name = self.parse_name();
                    attrs.add(Attr { name, pos, cond: None });
                }
                if !self.accept(TokenKind::Semicolon) {
                    break;
                }
            }
            self.expect(TokenKind::Rbracket);
        }
        attrs
    }

    fn parse_vis(&mut self) -> Visibility {
        if self.accept(TokenKind::KeyPub) {
            if self.accept(TokenKind::Lparen) {
                self.expect(TokenKind::KeyPkg);
                self.expect(TokenKind::Rparen);
                return Visibility::PublicInPkg;
            }
            return Visibility::Public;
        }
        Visibility::Private
    }

    pub(crate) fn parse_decl(&mut self) -> Decl {
        let doc = self.parse_doc_comment();
        let attrs = self.parse_attrs();
        let vis = self.parse_vis();
        let is_unsafe = self.accept(TokenKind::KeyUnsafe);
        let pos = self.tok.pos();

        let kind = if self.accept(TokenKind::KeyExtern) {
            if self.inside_extern {
                self.error("`extern` declarations cannot be nested", pos);
            } else if vis.is_pub() {
                self.error("`extern` declarations cannot be declared public", pos);
            } else if is_unsafe {
                self.error("`extern` declarations cannot be declared unsafe", pos);
            } else if !self.is_pkg_level {
                self.error(
                    "extern packages or functions can only be declared at the package level",
                    pos,
                );
            }
            self.inside_extern = true;
            let kind = if self.accept(TokenKind::KeyPkg) {
                let name = self.parse_name();
                self.expect(TokenKind::Semicolon);
                DeclKind::ExternPkg { name }
            } else {
                let abi = self.tok.lit.clone();
                self.expect(TokenKind::Str);
                let mut protos = Vec::new();
                if self.accept(TokenKind::Lbrace) {
                    while !self.accept(TokenKind::Rbrace) {
                        self.expect(TokenKind::KeyFn);
                        protos.push(self.finish_fn_decl(Vec::new(), Attrs::new(), vis, false));
                        self.expect(TokenKind::Semicolon);
                        if self.tok.kind == TokenKind::Eof {
                            break;
                        }
                    }
                } else {
                    self.expect(TokenKind::KeyFn);
                    protos.push(self.finish_fn_decl(Vec::new(), Attrs::new(), vis, false));
                    self.expect(TokenKind::Semicolon);
                }
                DeclKind::Extern { abi, protos }
            };
            self.inside_extern = false;
            kind
        } else if self.accept(TokenKind::KeyConst) {
            if is_unsafe {
                self.error("constants cannot be declared unsafe", pos);
            }
            let name_pos = self.tok.pos();
            let name = self.parse_name();
            self.expect(TokenKind::Colon);
            let typ = self.parse_type();
            self.expect(TokenKind::Assign);
            let expr = self.parse_expr();
            self.expect(TokenKind::Semicolon);
            DeclKind::Const { name, name_pos, typ, expr, sym: None }
        } else if self.accept(TokenKind::KeyStatic) {
            if is_unsafe {
                self.error("static values cannot be declared unsafe", pos);
            }
            let is_mut = self.accept(TokenKind::KeyMut);
            let name_pos = self.tok.pos();
            let name = self.parse_name();
            self.expect(TokenKind::Colon);
            let typ = self.parse_type();
            self.expect(TokenKind::Assign);
            let expr = self.parse_expr();
            self.expect(TokenKind::Semicolon);
            DeclKind::Static { is_mut, name, name_pos, typ, expr, sym: None }
        } else if self.accept(TokenKind::KeyMod) {
            if is_unsafe {
                self.error("modules cannot be declared unsafe", pos);
            }
            let name_pos = self.tok.pos();
            let name = self.parse_name();

            let old_is_pkg_level = self.is_pkg_level;
            self.is_pkg_level = false;

            let mut decls = Vec::new();
            self.expect(TokenKind::Lbrace);
            while !self.accept(TokenKind::Rbrace) {
                if self.tok.kind == TokenKind::Eof {
                    self.expect(TokenKind::Rbrace);
                    break;
                }
                decls.push(self.parse_decl());
            }

            self.is_pkg_level = old_is_pkg_level;
            DeclKind::Mod { name, name_pos, decls, sym: None }
        } else if self.accept(TokenKind::KeyType) {
            if is_unsafe {
                self.error("type aliases cannot be declared unsafe", pos);
            }
            let name_pos = self.tok.pos();
            let name = self.parse_name();
            self.expect(TokenKind::Assign);
            let parent = self.parse_type();
            self.expect(TokenKind::Semicolon);
            DeclKind::TypeAlias { name, name_pos, parent, sym: None }
        } else if self.accept(TokenKind::KeyErrType) {
            if is_unsafe {
                self.error("error types cannot be declared unsafe", pos);
            }
            let name_pos = self.tok.pos();
            let name = self.parse_name();
            self.expect(TokenKind::Semicolon);
            DeclKind::ErrType { name, name_pos, sym: None }
        } else if self.accept(TokenKind::KeyTrait) {
            if is_unsafe {
                self.error("traits cannot be declared unsafe", pos);
            }
            let name_pos = self.tok.pos();
            let name = self.parse_name();
            let mut decls = Vec::new();
            let old_inside_trait = self.inside_trait;
            self.inside_trait = true;
            self.expect(TokenKind::Lbrace);
            while !self.accept(TokenKind::Rbrace) {
                if self.tok.kind == TokenKind::Eof {
                    self.expect(TokenKind::Rbrace);
                    break;
                }
                let item_doc = self.parse_doc_comment();
                let attrs_pos = self.tok.pos();
                let item_attrs = self.parse_attrs();
                if item_attrs.has_attrs() {
                    self.error(
                        "attributes should be applied to a function or method",
                        attrs_pos,
                    );
                }
                if self.accept(TokenKind::KeyPub) {
                    let span = self.prev_tok.span;
                    self.error("unnecessary visibility qualifier", span);
                }
                let item_unsafe = self.accept(TokenKind::KeyUnsafe);
                self.expect(TokenKind::KeyFn);
                decls.push(self.finish_fn_decl(item_doc, item_attrs, Visibility::Public, item_unsafe));
            }
            self.inside_trait = old_inside_trait;
            DeclKind::Trait { name, name_pos, decls, sym: None }
        } else if self.accept(TokenKind::KeyUnion) {
            if is_unsafe {
                self.error("unions cannot be declared unsafe", pos);
            }
            let name_pos = self.tok.pos();
            let name = self.parse_name();
            self.expect(TokenKind::Lbrace);
            let mut variants = Vec::new();
            loop {
                variants.push(self.parse_type());
                if !self.accept(TokenKind::Comma) {
                    break;
                }
            }
            let mut decls = Vec::new();
            if self.accept(TokenKind::Semicolon) {
                // methods, consts, etc.
                while self.tok.kind != TokenKind::Rbrace && self.tok.kind != TokenKind::Eof {
                    decls.push(self.parse_decl());
                }
            }
            self.expect(TokenKind::Rbrace);
            DeclKind::Union { name, name_pos, variants, decls, sym: None }
        } else if self.accept(TokenKind::KeyStruct) {
            let old_inside_struct_decl = self.inside_struct_decl;
            self.inside_struct_decl = true;
            if is_unsafe {
                self.error("structs cannot be declared unsafe", pos);
            }
            let name_pos = self.tok.pos();
            let name = self.parse_name();
            self.expect(TokenKind::Lbrace);
            let mut decls = Vec::new();
            while self.tok.kind != TokenKind::Rbrace && self.tok.kind != TokenKind::Eof {
                if self.accept(TokenKind::BitNot) {
                    // destructor
                    self.expect(TokenKind::KeySelf);
                    self.expect(TokenKind::Lbrace);
                    let scope = self.open_scope();
                    let mut stmts = Vec::new();
                    while !self.accept(TokenKind::Rbrace) {
                        if self.tok.kind == TokenKind::Eof {
                            self.expect(TokenKind::Rbrace);
                            break;
                        }
                        stmts.push(self.parse_stmt());
                    }
                    self.close_scope();
                    decls.push(Decl {
                        kind: DeclKind::Destructor { stmts, scope },
                        pos,
                        doc: Vec::new(),
                        attrs: Attrs::new(),
                        vis: Visibility::Private,
                    });
                } else {
                    decls.push(self.parse_decl());
                }
            }
            self.expect(TokenKind::Rbrace);
            self.inside_struct_decl = old_inside_struct_decl;
            DeclKind::Struct { name, name_pos, decls, sym: None }
        } else if self.inside_struct_decl
            && matches!(self.tok.kind, TokenKind::KeyMut | TokenKind::Name)
        {
            // struct field
            let is_mut = self.accept(TokenKind::KeyMut);
            let name_pos = self.tok.pos();
            let name = self.parse_name();
            self.expect(TokenKind::Colon);
            let typ = self.parse_type();
            let def_expr = if self.accept(TokenKind::Assign) {
                Some(self.parse_expr())
            } else {
                None
            };
            self.expect(TokenKind::Semicolon);
            DeclKind::StructField { is_pub: vis.is_pub(), is_mut, name, name_pos, typ, def_expr }
        } else if self.accept(TokenKind::KeyEnum) {
            if is_unsafe {
                self.error("enums cannot be declared unsafe", pos);
            }
            let name_pos = self.tok.pos();
            let name = self.parse_name();
            self.expect(TokenKind::Lbrace);
            let mut variants = Vec::new();
            loop {
                variants.push(self.parse_name());
                if !self.accept(TokenKind::Comma) {
                    break;
                }
            }
            let mut decls = Vec::new();
            if self.accept(TokenKind::Semicolon) {
                while self.tok.kind != TokenKind::Rbrace && self.tok.kind != TokenKind::Eof {
                    decls.push(self.parse_decl());
                }
            }
            self.expect(TokenKind::Rbrace);
            DeclKind::Enum { name, name_pos, variants, decls, sym: None }
        } else if self.accept(TokenKind::KeyExtend) {
            if is_unsafe {
                let span = self.prev_tok.span;
                self.error("`extend`s cannot be unsafe", span);
            }
            let typ = self.parse_type();
            let mut decls = Vec::new();
            self.expect(TokenKind::Lbrace);
            while !self.accept(TokenKind::Rbrace) {
                if self.tok.kind == TokenKind::Eof {
                    self.expect(TokenKind::Rbrace);
                    break;
                }
                decls.push(self.parse_decl());
            }
            DeclKind::Extend { typ, decls }
        } else if self.accept(TokenKind::KeyFn) {
            return Decl {
                kind: DeclKind::Fn(self.finish_fn(is_unsafe)),
                pos,
                doc,
                attrs,
                vis,
            };
        } else if self.accept(TokenKind::KeyTest) {
            let name = self.tok.lit.clone();
            self.expect(TokenKind::Str);
            let scope = self.open_scope();
            let mut stmts = Vec::new();
            self.expect(TokenKind::Lbrace);
            while !self.accept(TokenKind::Rbrace) {
                if self.tok.kind == TokenKind::Eof {
                    self.expect(TokenKind::Rbrace);
                    break;
                }
                stmts.push(self.parse_stmt());
            }
            self.close_scope();
            DeclKind::Test { name, stmts, scope }
        } else {
            self.error(format!("expected declaration, found {}", self.tok), pos);
            self.next();
            DeclKind::Empty
        };

        Decl { kind, pos, doc, attrs, vis }
    }

    /// Parse a fn head+body after the `fn` keyword, wrapping it in a `Decl`.
    fn finish_fn_decl(
        &mut self,
        doc: Vec<String>,
        attrs: Attrs,
        vis: Visibility,
        is_unsafe: bool,
    ) -> Decl {
        let pos = self.tok.pos();
        Decl { kind: DeclKind::Fn(self.finish_fn(is_unsafe)), pos, doc, attrs, vis }
    }

    /// The fn grammar: receiver, parameters with optional defaults, the `!`
    /// result-wrapper, and the body (absent for extern prototypes and
    /// bodyless trait items).
    fn finish_fn(&mut self, is_unsafe: bool) -> FnDecl {
        let pos = self.tok.pos();
        let name_pos = self.tok.pos();
        let name = self.parse_name();

        let scope = self.open_scope();

        let mut args: Vec<FnArg> = Vec::new();
        let mut is_method = false;
        let mut self_is_ref = false;
        let mut self_is_mut = false;
        self.expect(TokenKind::Lparen);
        if self.tok.kind != TokenKind::Rparen {
            // receiver: `self` | `&self` | `&mut self`
            if self.tok.kind == TokenKind::KeySelf
                || (self.tok.kind == TokenKind::Amp && self.peek_tok.kind == TokenKind::KeySelf)
                || (self.tok.kind == TokenKind::Amp
                    && self.peek_tok.kind == TokenKind::KeyMut
                    && self.peek_token(2).kind == TokenKind::KeySelf)
            {
                is_method = true;
                self_is_ref = self.accept(TokenKind::Amp);
                self_is_mut = self.accept(TokenKind::KeyMut);
                self.expect(TokenKind::KeySelf);
                if self.tok.kind != TokenKind::Rparen {
                    self.expect(TokenKind::Comma);
                }
            }
            while self.tok.kind != TokenKind::Rparen {
                let is_mut = self.accept(TokenKind::KeyMut);
                let arg_pos = self.tok.pos();
                let arg_name = self.parse_name();
                self.expect(TokenKind::Colon);
                let arg_typ = self.parse_type();
                let def_expr = if self.accept(TokenKind::Assign) {
                    Some(self.parse_expr())
                } else {
                    None
                };
                args.push(FnArg {
                    name: arg_name,
                    is_mut,
                    typ: arg_typ,
                    def_expr,
                    pos: arg_pos,
                });
                if !self.accept(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::Rparen);
        let has_named_args = args.iter().any(|a| a.has_def_expr());

        let is_result = self.accept(TokenKind::Bang);
        let ret_typ = if matches!(self.tok.kind, TokenKind::Lbrace | TokenKind::Semicolon) {
            self.ctx.void_t.clone()
        } else {
            self.parse_type()
        };
        let ret_typ = if is_result { Type::Result(Box::new(ret_typ)) } else { ret_typ };

        let mut stmts = Vec::new();
        let mut has_body = true;
        if self.tok.kind == TokenKind::Semicolon && self.inside_trait {
            has_body = false;
            self.expect(TokenKind::Semicolon);
        } else if self.inside_extern {
            if self.tok.kind == TokenKind::Lbrace {
                self.error("extern functions cannot have a body", pos);
            }
            has_body = false;
        } else {
            self.expect(TokenKind::Lbrace);
            while !self.accept(TokenKind::Rbrace) {
                if self.tok.kind == TokenKind::Eof {
                    self.expect(TokenKind::Rbrace);
                    break;
                }
                stmts.push(self.parse_stmt());
            }
        }

        self.close_scope();

        FnDecl {
            name,
            name_pos,
            args,
            ret_typ,
            stmts,
            has_body,
            is_extern: self.inside_extern,
            is_unsafe,
            is_method,
            self_is_ref,
            self_is_mut,
            has_named_args,
            scope,
            sym: None,
        }
    }
}
