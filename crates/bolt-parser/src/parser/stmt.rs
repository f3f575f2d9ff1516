//! Statement parsing.

use bolt_common::token::TokenKind;

use crate::ast::expr::{BlockExpr, Expr, ExprKind};
use crate::ast::stmt::{LetBinding, LetStmt, Stmt, StmtKind};
use crate::ast::sym::{ObjectSym, SymKind, Symbol, Visibility};
use crate::ast::ty::Type;

use super::Parser;

impl Parser<'_> {
    pub(crate) fn parse_stmt(&mut self) -> Stmt {
        let pos = self.tok.pos();
        if self.tok.kind == TokenKind::Name && self.peek_tok.kind == TokenKind::Colon {
            // label
            let name = self.parse_name();
            self.expect(TokenKind::Colon);
            let sym = self.ctx.symbols.alloc(Symbol {
                name: name.clone(),
                vis: Visibility::Private,
                parent: None,
                kind: SymKind::Label,
            });
            if let Err(msg) = self.ctx.scopes.add(self.scope, &name, sym) {
                self.error(msg, pos);
            }
            Stmt::new(StmtKind::Label { name }, pos)
        } else if matches!(self.tok.kind, TokenKind::KeyUnsafe | TokenKind::Lbrace) {
            // block statement
            let is_unsafe = self.accept(TokenKind::KeyUnsafe);
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
            let block = ExprKind::Block(BlockExpr {
                is_unsafe,
                stmts,
                tail: None,
                is_expr: false,
                scope,
            });
            Stmt::new(StmtKind::Expr(Expr::new(block, pos)), pos)
        } else if self.accept(TokenKind::KeyLoop) {
            Stmt::new(StmtKind::Loop { body: Box::new(self.parse_stmt()) }, pos)
        } else if self.accept(TokenKind::KeyWhile) {
            self.expect(TokenKind::Lparen);
            let cond = self.parse_cond();
            self.expect(TokenKind::Rparen);
            let is_inf = matches!(cond.kind, ExprKind::BoolLit(true));
            let body = Box::new(self.parse_stmt());
            Stmt::new(StmtKind::While { cond, is_inf, body }, pos)
        } else if self.accept(TokenKind::KeyFor) {
            self.expect(TokenKind::Lparen);
            let key = self.parse_name();
            let value = if self.accept(TokenKind::Comma) {
                Some(self.parse_name())
            } else {
                None
            };
            self.expect(TokenKind::KeyIn);
            let iterable = self.parse_expr();
            self.expect(TokenKind::Rparen);
            let scope = self.open_scope();
            self.add_object(&key, false, false, pos);
            if let Some(v) = &value {
                self.add_object(v, false, false, pos);
            }
            let body = Box::new(self.parse_stmt());
            self.close_scope();
            Stmt::new(StmtKind::ForIn { key, value, iterable, body, scope }, pos)
        } else if self.accept(TokenKind::KeyGoto) {
            let name = self.parse_name();
            self.expect(TokenKind::Semicolon);
            Stmt::new(StmtKind::Goto { name }, pos)
        } else if matches!(self.tok.kind, TokenKind::KeyContinue | TokenKind::KeyBreak) {
            let op = self.tok.kind;
            self.next();
            self.expect(TokenKind::Semicolon);
            Stmt::new(StmtKind::Branch { op }, pos)
        } else if self.accept(TokenKind::KeyReturn) {
            let expr = if self.tok.kind != TokenKind::Semicolon {
                Some(Box::new(self.parse_expr()))
            } else {
                None
            };
            self.expect(TokenKind::Semicolon);
            Stmt::new(StmtKind::Expr(Expr::new(ExprKind::Return { expr }, pos)), pos)
        } else if self.accept(TokenKind::KeyRaise) {
            let expr = Box::new(self.parse_expr());
            self.expect(TokenKind::Semicolon);
            Stmt::new(StmtKind::Expr(Expr::new(ExprKind::Raise { expr }, pos)), pos)
        } else if self.accept(TokenKind::KeyLet) {
            self.parse_let(pos)
        } else {
            let expr = self.parse_expr();
            if self.tok.kind.is_assign() {
                let op = self.tok.kind;
                self.next();
                let right = self.parse_expr();
                self.expect(TokenKind::Semicolon);
                return Stmt::new(StmtKind::Assign { left: expr, op, right }, pos);
            }
            // value-producing block tails and if/match statements carry no
            // terminating semicolon
            if !((self.inside_block && self.tok.kind == TokenKind::Rbrace)
                || matches!(expr.kind, ExprKind::If(_) | ExprKind::Match(_)))
            {
                self.expect(TokenKind::Semicolon);
            }
            Stmt::new(StmtKind::Expr(expr), pos)
        }
    }

    /// `let [mut] name [: T] = expr;` or `let (a, b, ..) = expr;`
    fn parse_let(&mut self, pos: bolt_common::span::Span) -> Stmt {
        let mut lefts = Vec::new();
        if self.accept(TokenKind::Lparen) {
            loop {
                lefts.push(self.parse_let_binding());
                if !self.accept(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::Rparen);
        } else {
            lefts.push(self.parse_let_binding());
        }
        self.expect(TokenKind::Assign);
        let right = self.parse_expr();
        self.expect(TokenKind::Semicolon);

        for binding in &lefts {
            self.add_object(&binding.name, binding.is_mut, false, binding.pos);
            if let Some(typ) = &binding.typ {
                let typ = typ.clone();
                self.ctx.scopes.update_typ(self.scope, &binding.name, typ, &mut self.ctx.symbols);
            }
        }
        Stmt::new(StmtKind::Let(LetStmt { lefts, right, scope: self.scope }), pos)
    }

    fn parse_let_binding(&mut self) -> LetBinding {
        let is_mut = self.accept(TokenKind::KeyMut);
        let pos = self.tok.pos();
        let name = self.parse_name();
        let typ = if self.accept(TokenKind::Colon) {
            Some(self.parse_type())
        } else {
            None
        };
        LetBinding { name, is_mut, has_typ: typ.is_some(), typ, pos }
    }

    /// Introduce a local object into the current scope, reporting
    /// same-scope redefinitions.
    pub(crate) fn add_object(
        &mut self,
        name: &str,
        is_mut: bool,
        is_arg: bool,
        pos: bolt_common::span::Span,
    ) {
        if name == "_" {
            return;
        }
        let sym = self.ctx.symbols.alloc(Symbol {
            name: name.to_string(),
            vis: Visibility::Private,
            parent: None,
            kind: SymKind::Object(ObjectSym {
                is_mut,
                is_arg,
                typ: Type::Unknown { expr: Box::new(Expr::empty(pos)) },
            }),
        });
        if let Err(msg) = self.ctx.scopes.add(self.scope, name, sym) {
            self.error(msg, pos);
        }
    }
}
