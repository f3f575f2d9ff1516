//! Type grammar.
//!
//! `&T`, `*T`, `[T]`, `[T; N]`, `(T, ..)`, `?T`, `Self`, qualified paths
//! and primitive keywords. The shape constraints are enforced here: no
//! `&&T`, no mixing `&`/`*` directly, no `?*T`, no `??T`, `c_void` only
//! inside extern declarations, tuple arity at most 8.

use bolt_common::token::TokenKind;

use crate::ast::expr::{Expr, ExprKind};
use crate::ast::ty::Type;

use super::Parser;

impl Parser<'_> {
    pub(crate) fn parse_type(&mut self) -> Type {
        let pos = self.tok.pos();
        if self.accept(TokenKind::Amp) {
            // reference
            let typ = self.parse_type();
            if self.inside_extern {
                self.error("cannot use references inside `extern` blocks", pos);
                let shown = self.ctx.typ_display(&typ);
                self.reporter.help(format!("use pointers instead: `*{shown}`"));
            } else if typ.is_ref() {
                self.error("multi-level references are not allowed", pos);
            } else if typ.is_ptr() {
                self.error("cannot use references with pointers", pos);
            }
            Type::Ref(Box::new(typ))
        } else if self.accept(TokenKind::Mul) {
            // pointer
            let typ = self.parse_type();
            if typ.is_ref() {
                self.error("cannot use pointers with references", pos);
            }
            Type::Ptr(Box::new(typ))
        } else if self.accept(TokenKind::Lbracket) {
            // array or slice
            let typ = self.parse_type();
            if self.accept(TokenKind::Semicolon) {
                let size = self.parse_expr();
                self.expect(TokenKind::Rbracket);
                return Type::Array { elem: Box::new(typ), size: Box::new(size), sym: None };
            }
            self.expect(TokenKind::Rbracket);
            Type::Slice { elem: Box::new(typ), sym: None }
        } else if self.accept(TokenKind::Lparen) {
            // tuple
            let mut types = Vec::new();
            loop {
                types.push(self.parse_type());
                if !self.accept(TokenKind::Comma) {
                    break;
                }
            }
            if types.len() > 8 {
                self.error("tuples can have a maximum of 8 types", pos);
                self.reporter.help("you can use a struct instead");
            }
            self.expect(TokenKind::Rparen);
            Type::Tuple { types, sym: None }
        } else if self.accept(TokenKind::Question) {
            // optional
            let typ = self.parse_type();
            if typ.is_ptr() {
                self.error("pointers cannot be optional", pos);
                self.reporter.note("by default pointers can contain the value `none`");
            } else if typ.is_optional() {
                self.error("optional multi-level types are not allowed", pos);
            }
            Type::Optional(Box::new(typ))
        } else if self.accept(TokenKind::KeySelfTy) {
            let expr = Expr::new(ExprKind::SelfTyExpr { scope: self.scope }, self.prev_tok.pos());
            Type::Unknown { expr: Box::new(expr) }
        } else if matches!(self.tok.kind, TokenKind::KeyPkg | TokenKind::Name) {
            if self.peek_tok.kind == TokenKind::DoubleColon {
                // qualified path
                let left = if self.tok.kind == TokenKind::KeyPkg {
                    let p = self.tok.pos();
                    self.next();
                    Expr::new(ExprKind::PkgExpr, p)
                } else {
                    self.parse_ident(false)
                };
                let mut path = self.parse_path_expr(left);
                while self.tok.kind == TokenKind::DoubleColon {
                    path = self.parse_path_expr(path);
                }
                Type::Unknown { expr: Box::new(path) }
            } else if self.tok.kind == TokenKind::Name {
                let expr = self.parse_ident(false);
                let name = match &expr.kind {
                    ExprKind::Ident(ident) => ident.name.clone(),
                    _ => String::new(),
                };
                if name == "c_void" && !self.inside_extern {
                    self.error("`c_void` can only be used inside `extern` declarations", pos);
                }
                match self.ctx.primitive_type(&name) {
                    Some(typ) => typ,
                    None => Type::Unknown { expr: Box::new(expr) },
                }
            } else {
                self.error("expected type, found keyword `pkg`", pos);
                self.next();
                Type::Unknown { expr: Box::new(Expr::empty(pos)) }
            }
        } else {
            self.error(format!("expected type, found {}", self.tok), pos);
            self.next();
            Type::Unknown { expr: Box::new(Expr::empty(pos)) }
        }
    }
}
