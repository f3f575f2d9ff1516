//! Recursive-descent parser for Bolt.
//!
//! The parser keeps a three-token window (`prev_tok`, `tok`, `peek_tok`)
//! over the pull-based [`TokenStream`], with arbitrary-k lookahead through
//! `peek_token`. Error handling is best-effort: `expect` reports
//! `expected X, found Y`, consumes one token and keeps going, so one bad
//! token does not cascade into a parse abort.
//!
//! Grammar-mode flags (`inside_extern`, `inside_struct_decl`,
//! `inside_block`, `inside_trait`, `is_pkg_level`) alter both the accepted
//! grammar and the diagnostics; each is saved and restored around the
//! construct that flips it.

mod decl;
mod expr;
mod stmt;
mod types;

use bolt_common::report::Reporter;
use bolt_common::span::Span;
use bolt_common::token::{Token, TokenKind};
use bolt_lexer::{Lexer, TokenStream};

use crate::ast::sym::ScopeId;
use crate::ast::SourceFile;
use crate::context::CompilerContext;

/// Parse one source file into a [`SourceFile`].
///
/// Tokenizes `source` first; if the lexer reported errors the file comes
/// back empty, per the phase-gating contract.
pub fn parse_file(
    ctx: &mut CompilerContext,
    reporter: &mut Reporter,
    file: &str,
    source: &str,
) -> SourceFile {
    reporter.set_file(file);
    let errors_before = reporter.error_count();
    let tokens = Lexer::tokenize(source, reporter);
    if reporter.error_count() > errors_before {
        return SourceFile { file: file.to_string(), decls: Vec::new() };
    }
    let mut parser = Parser::new(ctx, reporter, TokenStream::new(tokens));
    let decls = parser.parse_decls();
    SourceFile { file: file.to_string(), decls }
}

pub(crate) struct Parser<'a> {
    pub(crate) ctx: &'a mut CompilerContext,
    pub(crate) reporter: &'a mut Reporter,
    stream: TokenStream,

    pub(crate) prev_tok: Token,
    pub(crate) tok: Token,
    pub(crate) peek_tok: Token,

    /// Current lexical scope; a fresh root per file.
    pub(crate) scope: ScopeId,

    pub(crate) is_pkg_level: bool,
    pub(crate) inside_extern: bool,
    pub(crate) inside_struct_decl: bool,
    pub(crate) inside_block: bool,
    pub(crate) inside_trait: bool,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(
        ctx: &'a mut CompilerContext,
        reporter: &'a mut Reporter,
        mut stream: TokenStream,
    ) -> Self {
        let tok = stream.next();
        let peek_tok = stream.next();
        let scope = ctx.scopes.alloc(None);
        Self {
            ctx,
            reporter,
            stream,
            prev_tok: Token::new(TokenKind::Eof, 0, 0),
            tok,
            peek_tok,
            scope,
            is_pkg_level: true,
            inside_extern: false,
            inside_struct_decl: false,
            inside_block: false,
            inside_trait: false,
        }
    }

    // ── Token discipline ───────────────────────────────────────────────

    /// Shift the token window by one.
    pub(crate) fn next(&mut self) {
        self.prev_tok = std::mem::replace(&mut self.tok, std::mem::replace(&mut self.peek_tok, self.stream.next()));
    }

    /// Shift the token window by `n`.
    pub(crate) fn advance(&mut self, n: usize) {
        for _ in 0..n {
            self.next();
        }
    }

    /// Look `n` tokens ahead of `tok`; `peek_token(1)` is `peek_tok`.
    pub(crate) fn peek_token(&self, n: usize) -> &Token {
        debug_assert!(n >= 1);
        if n == 1 {
            &self.peek_tok
        } else {
            self.stream.peek_nth(n - 2)
        }
    }

    /// Consume the current token if it matches.
    pub(crate) fn accept(&mut self, kind: TokenKind) -> bool {
        if self.tok.kind == kind {
            self.next();
            true
        } else {
            false
        }
    }

    /// Consume the current token if it matches, otherwise report and skip
    /// one token.
    pub(crate) fn expect(&mut self, kind: TokenKind) {
        if self.accept(kind) {
            return;
        }
        let expected = match kind {
            TokenKind::Name
            | TokenKind::Number
            | TokenKind::Char
            | TokenKind::Str
            | TokenKind::DocComment
            | TokenKind::Eof => kind.to_string(),
            _ => format!("`{kind}`"),
        };
        self.error(format!("expected {expected}, found {}", self.tok), self.tok.span);
        self.next();
    }

    /// Report an error at a span.
    pub(crate) fn error(&mut self, message: impl Into<String>, span: Span) {
        self.reporter.error(message, span);
    }

    // ── Scopes ─────────────────────────────────────────────────────────

    /// Enter a child scope of the current one. Returns its id.
    pub(crate) fn open_scope(&mut self) -> ScopeId {
        self.scope = self.ctx.scopes.alloc(Some(self.scope));
        self.scope
    }

    /// Leave the current scope, restoring its parent.
    pub(crate) fn close_scope(&mut self) {
        if let Some(parent) = self.ctx.scopes.parent(self.scope) {
            self.scope = parent;
        }
    }

    // ── Utilities ──────────────────────────────────────────────────────

    /// Parse an identifier, returning its text (empty on error).
    pub(crate) fn parse_name(&mut self) -> String {
        let lit = self.tok.lit.clone();
        self.expect(TokenKind::Name);
        lit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Prefs;

    fn with_parser<R>(source: &str, f: impl FnOnce(&mut Parser) -> R) -> R {
        let mut ctx = CompilerContext::new(Prefs::default());
        let mut reporter = Reporter::new();
        let tokens = Lexer::tokenize(source, &mut reporter);
        let mut parser = Parser::new(&mut ctx, &mut reporter, TokenStream::new(tokens));
        f(&mut parser)
    }

    #[test]
    fn window_tracks_prev_tok_and_peek() {
        with_parser("a b c d", |p| {
            assert_eq!(p.tok.lit, "a");
            assert_eq!(p.peek_tok.lit, "b");
            assert_eq!(p.peek_token(2).lit, "c");
            assert_eq!(p.peek_token(3).lit, "d");
            p.next();
            assert_eq!(p.prev_tok.lit, "a");
            assert_eq!(p.tok.lit, "b");
        });
    }

    #[test]
    fn accept_only_consumes_on_match() {
        with_parser("fn x", |p| {
            assert!(!p.accept(TokenKind::KeyPub));
            assert!(p.accept(TokenKind::KeyFn));
            assert_eq!(p.tok.kind, TokenKind::Name);
        });
    }

    #[test]
    fn expect_reports_and_recovers() {
        with_parser("fn", |p| {
            p.expect(TokenKind::Semicolon);
            assert!(p.reporter.has_message("expected `;`, found `fn`"));
            // one token was skipped, parsing can continue
            assert_eq!(p.tok.kind, TokenKind::Eof);
        });
    }

    #[test]
    fn advancing_past_eof_is_safe() {
        with_parser("x", |p| {
            p.advance(10);
            assert_eq!(p.tok.kind, TokenKind::Eof);
            p.expect(TokenKind::Eof);
        });
    }
}
