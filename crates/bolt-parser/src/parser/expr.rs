//! Expression parsing.
//!
//! Precedence is encoded as one function per layer, lowest binding first:
//! `or`, `and`, equality, relational, shift/bitwise, additive,
//! multiplicative, unary prefix, then primary with its postfix chain.
//! `<<`/`>>` are only recognized when the two `<`/`>` tokens touch, which
//! keeps `a < b` and `a << b` unambiguous without a separate shift token.

use bolt_common::span::Span;
use bolt_common::token::TokenKind;

use crate::ast::expr::{
    BlockExpr, CallArg, CallErrHandler, CallExpr, Expr, ExprKind, IdentExpr, IfBranch, IfExpr,
    MatchBranch, MatchExpr, PathExpr, SelectorExpr, StructLitField,
};

use super::Parser;

impl Parser<'_> {
    pub(crate) fn parse_expr(&mut self) -> Expr {
        self.parse_or_expr()
    }

    /// Condition position: either a guard (`let x = e`) or an expression.
    pub(crate) fn parse_cond(&mut self) -> Expr {
        if self.accept(TokenKind::KeyLet) {
            let pos = self.prev_tok.pos();
            let is_mut = self.accept(TokenKind::KeyMut);
            let name = self.parse_name();
            self.expect(TokenKind::Assign);
            let expr = Box::new(self.parse_expr());
            self.add_object(&name, is_mut, false, pos);
            return Expr::new(ExprKind::Guard { name, is_mut, expr, scope: self.scope }, pos);
        }
        self.parse_expr()
    }

    fn parse_or_expr(&mut self) -> Expr {
        let mut left = self.parse_and_expr();
        while self.accept(TokenKind::KeyOr) {
            let right = self.parse_and_expr();
            left = binary(left, TokenKind::KeyOr, right);
        }
        left
    }

    fn parse_and_expr(&mut self) -> Expr {
        let mut left = self.parse_equality_expr();
        while self.accept(TokenKind::KeyAnd) {
            let right = self.parse_equality_expr();
            left = binary(left, TokenKind::KeyAnd, right);
        }
        left
    }

    fn parse_equality_expr(&mut self) -> Expr {
        let mut left = self.parse_relational_expr();
        if matches!(self.tok.kind, TokenKind::Eq | TokenKind::Ne) {
            let op = self.tok.kind;
            self.next();
            let right = self.parse_relational_expr();
            left = binary(left, op, right);
        }
        left
    }

    fn parse_relational_expr(&mut self) -> Expr {
        let mut left = self.parse_shift_expr();
        match self.tok.kind {
            TokenKind::Gt
            | TokenKind::Lt
            | TokenKind::Ge
            | TokenKind::Le
            | TokenKind::KeyIn
            | TokenKind::KeyNotIn => {
                let op = self.tok.kind;
                self.next();
                let right = self.parse_shift_expr();
                left = binary(left, op, right);
            }
            TokenKind::KeyIs | TokenKind::KeyNotIs => {
                let op = self.tok.kind;
                self.next();
                let pos = self.tok.pos();
                let typ = self.parse_type();
                let right = Expr::new(ExprKind::TypeNode { typ }, pos);
                left = binary(left, op, right);
            }
            _ => {}
        }
        left
    }

    fn parse_shift_expr(&mut self) -> Expr {
        let mut left = self.parse_additive_expr();
        match self.tok.kind {
            // the two angle tokens must be identical and adjacent
            TokenKind::Lt | TokenKind::Gt
                if self.peek_tok.kind == self.tok.kind
                    && self.tok.span.end == self.peek_tok.span.start =>
            {
                let op = if self.tok.kind == TokenKind::Lt {
                    TokenKind::Lshift
                } else {
                    TokenKind::Rshift
                };
                self.next();
                self.next();
                let right = self.parse_additive_expr();
                left = binary(left, op, right);
            }
            TokenKind::Amp | TokenKind::Pipe | TokenKind::Xor => {
                let op = self.tok.kind;
                self.next();
                let right = self.parse_additive_expr();
                left = binary(left, op, right);
            }
            _ => {}
        }
        // `orelse` binds like the other non-chaining layers
        if self.accept(TokenKind::KeyOrElse) {
            let right = self.parse_additive_expr();
            left = binary(left, TokenKind::KeyOrElse, right);
        }
        left
    }

    fn parse_additive_expr(&mut self) -> Expr {
        let mut left = self.parse_multiplicative_expr();
        if matches!(self.tok.kind, TokenKind::Plus | TokenKind::Minus) {
            let op = self.tok.kind;
            self.next();
            let right = self.parse_multiplicative_expr();
            left = binary(left, op, right);
        }
        left
    }

    fn parse_multiplicative_expr(&mut self) -> Expr {
        let mut left = self.parse_unary_expr();
        if matches!(self.tok.kind, TokenKind::Mul | TokenKind::Div | TokenKind::Mod) {
            let op = self.tok.kind;
            self.next();
            let right = self.parse_unary_expr();
            left = binary(left, op, right);
        }
        left
    }

    fn parse_unary_expr(&mut self) -> Expr {
        if matches!(
            self.tok.kind,
            TokenKind::Amp
                | TokenKind::Bang
                | TokenKind::BitNot
                | TokenKind::Inc
                | TokenKind::Dec
                | TokenKind::Minus
        ) {
            let op = self.tok.kind;
            self.next();
            let right = self.parse_unary_expr();
            let pos = right.pos;
            return Expr::new(ExprKind::Unary { op, right: Box::new(right) }, pos);
        }
        self.parse_primary_expr()
    }

    fn parse_primary_expr(&mut self) -> Expr {
        let pos = self.tok.pos();
        let mut expr = if matches!(
            self.tok.kind,
            TokenKind::KeyTrue
                | TokenKind::KeyFalse
                | TokenKind::Char
                | TokenKind::Number
                | TokenKind::Str
                | TokenKind::KeyNone
                | TokenKind::KeySelf
                | TokenKind::KeySelfTy
        ) {
            self.parse_literal()
        } else if self.accept(TokenKind::Dollar) {
            // comptime forms
            if self.tok.kind == TokenKind::KeyIf {
                self.parse_if_expr(true)
            } else if self.accept(TokenKind::KeyMatch) {
                self.parse_match_expr(true)
            } else {
                self.parse_ident(true)
            }
        } else if self.tok.kind == TokenKind::Dot && self.peek_tok.kind == TokenKind::Name {
            self.next();
            let variant = self.parse_name();
            Expr::new(ExprKind::EnumVariant { variant }, pos)
        } else if self.tok.kind == TokenKind::KeyIf {
            self.parse_if_expr(false)
        } else if self.accept(TokenKind::KeyMatch) {
            self.parse_match_expr(false)
        } else if self.tok.kind == TokenKind::Lparen {
            self.expect(TokenKind::Lparen);
            if self.accept(TokenKind::Rparen) {
                Expr::new(ExprKind::VoidLit, pos)
            } else {
                let e = self.parse_expr();
                if self.accept(TokenKind::Comma) {
                    // tuple
                    let mut exprs = vec![e];
                    loop {
                        exprs.push(self.parse_expr());
                        if !self.accept(TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(TokenKind::Rparen);
                    if exprs.len() > 8 {
                        self.error("tuples can have a maximum of 8 expressions", pos);
                    }
                    Expr::new(ExprKind::TupleLit { exprs }, pos)
                } else {
                    self.expect(TokenKind::Rparen);
                    Expr::new(ExprKind::Par { inner: Box::new(e) }, pos)
                }
            }
        } else if matches!(self.tok.kind, TokenKind::KeyUnsafe | TokenKind::Lbrace) {
            self.parse_block_expr()
        } else if self.accept(TokenKind::KeyCast) {
            self.expect(TokenKind::Lparen);
            let e = self.parse_expr();
            self.expect(TokenKind::Comma);
            let target = self.parse_type();
            self.expect(TokenKind::Rparen);
            Expr::new(ExprKind::Cast { expr: Box::new(e), target }, pos)
        } else if self.accept(TokenKind::KeyGo) {
            Expr::new(ExprKind::Go { expr: Box::new(self.parse_expr()) }, pos)
        } else if self.accept(TokenKind::KeyTry) {
            Expr::new(ExprKind::Try { expr: Box::new(self.parse_expr()) }, pos)
        } else if self.tok.kind == TokenKind::Lbracket {
            self.next();
            let mut elems = Vec::new();
            if self.tok.kind != TokenKind::Rbracket {
                loop {
                    elems.push(self.parse_expr());
                    if !self.accept(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::Rbracket);
            Expr::new(ExprKind::ArrayLit { elems }, pos)
        } else if self.tok.kind == TokenKind::KeyPkg {
            self.next();
            Expr::new(ExprKind::PkgExpr, pos)
        } else if self.tok.kind == TokenKind::Name && self.peek_tok.kind == TokenKind::Char {
            if self.tok.lit != "b" {
                self.error(
                    "only `b` is recognized as a valid prefix for a character literal",
                    pos,
                );
            }
            self.parse_character_literal()
        } else if self.tok.kind == TokenKind::Name && self.peek_tok.kind == TokenKind::Str {
            if self.tok.lit != "b" && self.tok.lit != "r" {
                self.error(
                    "only `b` and `r` are recognized as valid prefixes for a string literal",
                    pos,
                );
            }
            self.parse_string_literal()
        } else if self.tok.kind == TokenKind::Name && self.peek_tok.kind == TokenKind::Bang {
            // builtin call
            let name = self.parse_name();
            self.expect(TokenKind::Bang);
            self.expect(TokenKind::Lparen);
            let mut args = Vec::new();
            if name == "sizeof" || name == "default" {
                let tpos = self.tok.pos();
                let typ = self.parse_type();
                args.push(Expr::new(ExprKind::TypeNode { typ }, tpos));
            } else if self.tok.kind != TokenKind::Rparen {
                loop {
                    args.push(self.parse_expr());
                    if !self.accept(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::Rparen);
            Expr::new(ExprKind::BuiltinCall { name, args }, pos)
        } else {
            self.parse_ident(false)
        };

        // ── Postfix chain ──────────────────────────────────────────────
        loop {
            if self.accept(TokenKind::Lbrace) {
                // struct literal
                let mut fields = Vec::new();
                if self.tok.kind != TokenKind::Rbrace {
                    loop {
                        let fpos = self.tok.pos();
                        let fname = self.parse_name();
                        self.expect(TokenKind::Colon);
                        let value = self.parse_expr();
                        fields.push(StructLitField { name: fname, pos: fpos, expr: value });
                        if !self.accept(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::Rbrace);
                expr = Expr::new(
                    ExprKind::StructLit { target: Box::new(expr), fields },
                    pos,
                );
            } else if matches!(self.tok.kind, TokenKind::Inc | TokenKind::Dec) {
                let op = self.tok.kind;
                self.next();
                expr = Expr::new(ExprKind::Postfix { left: Box::new(expr), op }, pos);
            } else if self.accept(TokenKind::Lparen) {
                expr = self.finish_call(expr, pos);
            } else if self.accept(TokenKind::Dot) {
                if self.accept(TokenKind::Mul) {
                    expr = Expr::new(ExprKind::Indirect { expr: Box::new(expr) }, pos);
                } else if self.accept(TokenKind::Question) {
                    expr = Expr::new(ExprKind::NoneCheck { expr: Box::new(expr) }, pos);
                } else {
                    let field_pos = self.tok.pos();
                    let field_name = self.parse_name();
                    expr = Expr::new(
                        ExprKind::Selector(SelectorExpr {
                            left: Box::new(expr),
                            field_name,
                            field_pos,
                        }),
                        pos,
                    );
                }
            } else if self.tok.kind == TokenKind::DoubleColon {
                expr = self.parse_path_expr(expr);
            } else if self.accept(TokenKind::Lbracket) {
                let index = if self.accept(TokenKind::DotDot) {
                    // `[..b]` / `[..=b]`
                    let is_inclusive = self.accept(TokenKind::Assign);
                    let end = self.parse_expr();
                    let rpos = end.pos;
                    Expr::new(
                        ExprKind::Range { start: None, end: Some(Box::new(end)), is_inclusive },
                        rpos,
                    )
                } else {
                    let start = self.parse_expr();
                    if self.accept(TokenKind::DotDot) {
                        let is_inclusive = self.accept(TokenKind::Assign);
                        let rpos = start.pos;
                        if self.tok.kind != TokenKind::Rbracket {
                            let end = self.parse_expr();
                            Expr::new(
                                ExprKind::Range {
                                    start: Some(Box::new(start)),
                                    end: Some(Box::new(end)),
                                    is_inclusive,
                                },
                                rpos,
                            )
                        } else {
                            Expr::new(
                                ExprKind::Range {
                                    start: Some(Box::new(start)),
                                    end: None,
                                    is_inclusive,
                                },
                                rpos,
                            )
                        }
                    } else {
                        start
                    }
                };
                self.expect(TokenKind::Rbracket);
                expr = Expr::new(
                    ExprKind::Index { left: Box::new(expr), index: Box::new(index), left_typ: None },
                    pos,
                );
            } else if self.tok.kind == TokenKind::DotDot {
                self.next();
                let is_inclusive = self.accept(TokenKind::Assign);
                let end = self.parse_expr();
                expr = Expr::new(
                    ExprKind::Range {
                        start: Some(Box::new(expr)),
                        end: Some(Box::new(end)),
                        is_inclusive,
                    },
                    pos,
                );
            } else {
                break;
            }
        }
        expr
    }

    /// Call arguments and the optional `catch` error handler. Once a named
    /// argument appears, every following argument must be named.
    fn finish_call(&mut self, left: Expr, pos: Span) -> Expr {
        let mut args = Vec::new();
        if self.tok.kind != TokenKind::Rparen {
            let mut expecting_named_arg = false;
            loop {
                if self.tok.kind == TokenKind::Name && self.peek_tok.kind == TokenKind::Colon {
                    let name_pos = self.tok.pos();
                    let name = self.parse_name();
                    self.expect(TokenKind::Colon);
                    let value = self.parse_expr();
                    args.push(CallArg { expr: value, name: Some(name), pos: name_pos });
                    expecting_named_arg = true;
                } else {
                    if expecting_named_arg {
                        let span = self.tok.pos();
                        self.error("expected named argument, found expression", span);
                    }
                    let value = self.parse_expr();
                    let vpos = value.pos;
                    args.push(CallArg { expr: value, name: None, pos: vpos });
                }
                if !self.accept(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::Rparen);

        let err_handler = if self.accept(TokenKind::KeyCatch) {
            let hpos = self.prev_tok.pos();
            let scope = self.open_scope();
            let varname = if self.accept(TokenKind::Pipe) {
                let vpos = self.tok.pos();
                let name = self.parse_name();
                self.expect(TokenKind::Pipe);
                self.add_object(&name, false, false, vpos);
                Some(name)
            } else {
                None
            };
            let handler = self.parse_expr();
            self.close_scope();
            Some(CallErrHandler { varname, expr: Box::new(handler), pos: hpos, scope })
        } else {
            None
        };

        Expr::new(
            ExprKind::Call(CallExpr { left: Box::new(left), args, err_handler, info: None }),
            pos,
        )
    }

    /// Block expression: `{ stmts }` or `unsafe { stmts }`. The block
    /// produces a value iff its final statement is an expression statement
    /// that was not terminated by `;`.
    fn parse_block_expr(&mut self) -> Expr {
        let pos = self.tok.pos();
        let is_unsafe = self.accept(TokenKind::KeyUnsafe);
        self.expect(TokenKind::Lbrace);
        let scope = self.open_scope();
        let old_inside_block = self.inside_block;
        self.inside_block = true;
        let mut stmts: Vec<crate::ast::stmt::Stmt> = Vec::new();
        let mut has_expr = false;
        while !self.accept(TokenKind::Rbrace) {
            if self.tok.kind == TokenKind::Eof {
                self.expect(TokenKind::Rbrace);
                break;
            }
            let stmt = self.parse_stmt();
            has_expr = matches!(stmt.kind, crate::ast::stmt::StmtKind::Expr(_))
                && self.prev_tok.kind != TokenKind::Semicolon;
            stmts.push(stmt);
        }
        self.inside_block = old_inside_block;
        self.close_scope();

        let tail = if has_expr {
            match stmts.pop() {
                Some(crate::ast::stmt::Stmt { kind: crate::ast::stmt::StmtKind::Expr(e), .. }) => {
                    Some(Box::new(e))
                }
                other => {
                    // cannot happen; keep the statement if it does
                    if let Some(s) = other {
                        stmts.push(s);
                    }
                    None
                }
            }
        } else {
            None
        };
        let is_expr = tail.is_some();
        Expr::new(ExprKind::Block(BlockExpr { is_unsafe, stmts, tail, is_expr, scope }), pos)
    }

    fn parse_if_expr(&mut self, is_comptime: bool) -> Expr {
        let pos = self.tok.pos();
        let mut branches = Vec::new();
        loop {
            if self.accept(TokenKind::KeyElse) {
                let expr = self.parse_expr();
                branches.push(IfBranch { cond: None, expr, is_else: true });
                break;
            }
            if !matches!(self.tok.kind, TokenKind::KeyIf | TokenKind::KeyElif) {
                break;
            }
            self.next();
            self.expect(TokenKind::Lparen);
            let cond = self.parse_cond();
            self.expect(TokenKind::Rparen);
            let expr = self.parse_expr();
            branches.push(IfBranch { cond: Some(cond), expr, is_else: false });

            if is_comptime {
                // continuation keywords are `$`-prefixed: `$elif`, `$else`
                if self.tok.kind == TokenKind::Dollar
                    && matches!(self.peek_tok.kind, TokenKind::KeyElif | TokenKind::KeyElse)
                {
                    self.next();
                } else {
                    break;
                }
            } else if !matches!(self.tok.kind, TokenKind::KeyElif | TokenKind::KeyElse) {
                break;
            }
        }
        Expr::new(ExprKind::If(IfExpr { is_comptime, branches, branch_idx: None }), pos)
    }

    fn parse_match_expr(&mut self, is_comptime: bool) -> Expr {
        let pos = self.prev_tok.pos();
        self.expect(TokenKind::Lparen);
        let scrutinee = self.parse_expr();
        self.expect(TokenKind::Rparen);
        let is_typematch = self.accept(TokenKind::KeyIs);
        self.expect(TokenKind::Lbrace);
        let mut branches = Vec::new();
        loop {
            let mut pats = Vec::new();
            let is_else = self.accept(TokenKind::KeyElse);
            if !is_else {
                loop {
                    if is_typematch {
                        let tpos = self.tok.pos();
                        let typ = self.parse_type();
                        pats.push(Expr::new(ExprKind::TypeNode { typ }, tpos));
                    } else {
                        pats.push(self.parse_expr());
                    }
                    if !self.accept(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::FatArrow);
            let expr = self.parse_expr();
            branches.push(MatchBranch { pats, expr, is_else });
            if !self.accept(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Rbrace);
        Expr::new(
            ExprKind::Match(MatchExpr {
                is_comptime,
                expr: Box::new(scrutinee),
                branches,
                is_typematch,
            }),
            pos,
        )
    }

    pub(crate) fn parse_path_expr(&mut self, left: Expr) -> Expr {
        let pos = left.pos;
        self.expect(TokenKind::DoubleColon);
        let field_pos = self.tok.pos();
        let field_name = self.parse_name();
        let is_last = self.tok.kind != TokenKind::DoubleColon;
        Expr::new(
            ExprKind::Path(PathExpr {
                left: Box::new(left),
                field_name,
                field_pos,
                left_info: None,
                field_info: None,
                is_last,
                has_error: false,
            }),
            pos,
        )
    }

    fn parse_literal(&mut self) -> Expr {
        let pos = self.tok.pos();
        match self.tok.kind {
            TokenKind::KeyTrue | TokenKind::KeyFalse => {
                let value = self.tok.kind == TokenKind::KeyTrue;
                self.next();
                Expr::new(ExprKind::BoolLit(value), pos)
            }
            TokenKind::Char => self.parse_character_literal(),
            TokenKind::Number => self.parse_number_literal(),
            TokenKind::Str => self.parse_string_literal(),
            TokenKind::KeySelf => {
                self.next();
                Expr::new(ExprKind::SelfExpr { scope: self.scope }, pos)
            }
            TokenKind::KeySelfTy => {
                self.next();
                Expr::new(ExprKind::SelfTyExpr { scope: self.scope }, pos)
            }
            TokenKind::KeyNone => {
                self.next();
                Expr::new(ExprKind::NoneLit, pos)
            }
            _ => {
                self.error(format!("expected literal, found {}", self.tok), pos);
                Expr::empty(pos)
            }
        }
    }

    fn parse_number_literal(&mut self) -> Expr {
        let pos = self.tok.pos();
        let value = self.tok.lit.clone();
        self.next();
        let has_prefix = value.starts_with("0x") || value.starts_with("0o") || value.starts_with("0b");
        let is_float = !has_prefix && (value.contains('.') || value.contains('e') || value.contains('E'));
        if is_float {
            Expr::new(ExprKind::FloatLit { value }, pos)
        } else {
            Expr::new(ExprKind::IntLit { value }, pos)
        }
    }

    fn parse_character_literal(&mut self) -> Expr {
        let mut is_byte = false;
        if self.tok.kind == TokenKind::Name {
            is_byte = self.tok.lit == "b";
            self.expect(TokenKind::Name);
        }
        let pos = self.tok.pos();
        let value = self.tok.lit.clone();
        self.expect(TokenKind::Char);
        Expr::new(ExprKind::CharLit { value, is_byte }, pos)
    }

    fn parse_string_literal(&mut self) -> Expr {
        let mut is_bytestr = false;
        let mut is_raw = false;
        if self.tok.kind == TokenKind::Name {
            is_raw = self.tok.lit == "r";
            is_bytestr = self.tok.lit == "b";
            self.expect(TokenKind::Name);
        }
        let pos = self.tok.pos();
        let mut value = self.tok.lit.clone();
        self.expect(TokenKind::Str);
        // adjacent string literals concatenate
        while self.accept(TokenKind::Str) {
            value.push_str(&self.prev_tok.lit);
        }
        Expr::new(ExprKind::StrLit { value, is_raw, is_bytestr }, pos)
    }

    pub(crate) fn parse_ident(&mut self, is_comptime: bool) -> Expr {
        let pos = self.tok.pos();
        let name = self.parse_name();
        Expr::new(
            ExprKind::Ident(IdentExpr {
                name,
                scope: self.scope,
                is_comptime,
                is_obj: false,
                obj: None,
                sym: None,
            }),
            pos,
        )
    }
}

fn binary(left: Expr, op: TokenKind, right: Expr) -> Expr {
    let pos = left.pos;
    Expr::new(ExprKind::Binary { left: Box::new(left), op, right: Box::new(right) }, pos)
}
