// Bolt lexer -- tokenizer for the Bolt programming language.

mod cursor;
mod stream;

pub use stream::TokenStream;

use bolt_common::report::Reporter;
use bolt_common::span::Span;
use bolt_common::token::{keyword_from_str, Token, TokenKind};
use cursor::Cursor;

/// The Bolt lexer. Converts source text into a vector of tokens.
///
/// Lexical errors (unrecognized characters, unterminated literals and
/// comments) are reported through the diagnostic sink; the offending input
/// is skipped so a single bad character does not abort the scan. The
/// returned vector always ends with an `Eof` token.
pub struct Lexer<'src, 'r> {
    cursor: Cursor<'src>,
    reporter: &'r mut Reporter,
}

impl<'src, 'r> Lexer<'src, 'r> {
    /// Tokenize an entire source text.
    pub fn tokenize(source: &'src str, reporter: &'r mut Reporter) -> Vec<Token> {
        let mut lexer = Lexer { cursor: Cursor::new(source), reporter };
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token();
            let is_eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn next_token(&mut self) -> Token {
        loop {
            self.cursor.eat_while(|c| c.is_whitespace());
            let start = self.cursor.pos();

            let Some(c) = self.cursor.peek() else {
                return Token::new(TokenKind::Eof, start, start);
            };

            return match c {
                '(' => self.single(TokenKind::Lparen, start),
                ')' => self.single(TokenKind::Rparen, start),
                '[' => self.single(TokenKind::Lbracket, start),
                ']' => self.single(TokenKind::Rbracket, start),
                '{' => self.single(TokenKind::Lbrace, start),
                '}' => self.single(TokenKind::Rbrace, start),
                ',' => self.single(TokenKind::Comma, start),
                ';' => self.single(TokenKind::Semicolon, start),
                '?' => self.single(TokenKind::Question, start),
                '~' => self.single(TokenKind::BitNot, start),
                '#' => self.single(TokenKind::Hash, start),
                '$' => self.single(TokenKind::Dollar, start),
                ':' => self.lex_colon(start),
                '.' => self.lex_dot(start),
                '=' => self.lex_eq(start),
                '!' => self.lex_bang(start),
                '<' => self.lex_lt(start),
                '>' => self.lex_gt(start),
                '&' => self.one_or_assign(TokenKind::Amp, TokenKind::AmpAssign, start),
                '|' => self.one_or_assign(TokenKind::Pipe, TokenKind::PipeAssign, start),
                '^' => self.one_or_assign(TokenKind::Xor, TokenKind::XorAssign, start),
                '%' => self.one_or_assign(TokenKind::Mod, TokenKind::ModAssign, start),
                '*' => self.one_or_assign(TokenKind::Mul, TokenKind::MulAssign, start),
                '+' => self.lex_plus(start),
                '-' => self.lex_minus(start),
                '/' => match self.lex_slash(start) {
                    Some(tok) => tok,
                    // comment -- scan again
                    None => continue,
                },
                '0'..='9' => self.lex_number(start),
                '\'' => self.lex_char(start),
                '"' => self.lex_string(start),
                c if is_name_start(c) => self.lex_name(start),
                _ => {
                    self.cursor.advance();
                    self.reporter.error(
                        format!("unrecognized character `{c}`"),
                        Span::new(start, self.cursor.pos()),
                    );
                    continue;
                }
            };
        }
    }

    // ── Helpers ────────────────────────────────────────────────────────

    fn single(&mut self, kind: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        Token::new(kind, start, self.cursor.pos())
    }

    /// One-character operator, or its `=`-suffixed compound-assign form.
    fn one_or_assign(&mut self, one: TokenKind, assign: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some('=') {
            self.cursor.advance();
            Token::new(assign, start, self.cursor.pos())
        } else {
            Token::new(one, start, self.cursor.pos())
        }
    }

    // ── Operators ──────────────────────────────────────────────────────

    /// `:` -> `Colon`, `::` -> `DoubleColon`
    fn lex_colon(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some(':') {
            self.cursor.advance();
            Token::new(TokenKind::DoubleColon, start, self.cursor.pos())
        } else {
            Token::new(TokenKind::Colon, start, self.cursor.pos())
        }
    }

    /// `.` -> `Dot`, `..` -> `DotDot`. `..=` is `DotDot` followed by
    /// `Assign`; the parser reassembles the inclusive range.
    fn lex_dot(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some('.') {
            self.cursor.advance();
            Token::new(TokenKind::DotDot, start, self.cursor.pos())
        } else {
            Token::new(TokenKind::Dot, start, self.cursor.pos())
        }
    }

    /// `=` -> `Assign`, `==` -> `Eq`, `=>` -> `FatArrow`
    fn lex_eq(&mut self, start: u32) -> Token {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('=') => {
                self.cursor.advance();
                Token::new(TokenKind::Eq, start, self.cursor.pos())
            }
            Some('>') => {
                self.cursor.advance();
                Token::new(TokenKind::FatArrow, start, self.cursor.pos())
            }
            _ => Token::new(TokenKind::Assign, start, self.cursor.pos()),
        }
    }

    /// `!` -> `Bang`, `!=` -> `Ne`, `!is` -> `KeyNotIs`, `!in` -> `KeyNotIn`.
    ///
    /// The keyword forms require the word to end right after (`!inner` is
    /// `Bang` + name `inner`).
    fn lex_bang(&mut self, start: u32) -> Token {
        self.cursor.advance();
        match (self.cursor.peek(), self.cursor.peek_next()) {
            (Some('='), _) => {
                self.cursor.advance();
                Token::new(TokenKind::Ne, start, self.cursor.pos())
            }
            (Some('i'), Some(second @ ('s' | 'n')))
                if !self.cursor.peek_next2().is_some_and(is_name_continue) =>
            {
                self.cursor.advance();
                self.cursor.advance();
                let kind = if second == 's' { TokenKind::KeyNotIs } else { TokenKind::KeyNotIn };
                Token::new(kind, start, self.cursor.pos())
            }
            _ => Token::new(TokenKind::Bang, start, self.cursor.pos()),
        }
    }

    /// `<` -> `Lt`, `<=` -> `Le`, `<<=` -> `LshiftAssign`.
    ///
    /// `<<` is NOT lexed as one token: the parser recognizes a shift from
    /// two adjacent `<` tokens, which is what disambiguates it from a pair
    /// of comparisons.
    fn lex_lt(&mut self, start: u32) -> Token {
        self.cursor.advance();
        match (self.cursor.peek(), self.cursor.peek_next()) {
            (Some('='), _) => {
                self.cursor.advance();
                Token::new(TokenKind::Le, start, self.cursor.pos())
            }
            (Some('<'), Some('=')) => {
                self.cursor.advance();
                self.cursor.advance();
                Token::new(TokenKind::LshiftAssign, start, self.cursor.pos())
            }
            _ => Token::new(TokenKind::Lt, start, self.cursor.pos()),
        }
    }

    /// `>` -> `Gt`, `>=` -> `Ge`, `>>=` -> `RshiftAssign`.
    fn lex_gt(&mut self, start: u32) -> Token {
        self.cursor.advance();
        match (self.cursor.peek(), self.cursor.peek_next()) {
            (Some('='), _) => {
                self.cursor.advance();
                Token::new(TokenKind::Ge, start, self.cursor.pos())
            }
            (Some('>'), Some('=')) => {
                self.cursor.advance();
                self.cursor.advance();
                Token::new(TokenKind::RshiftAssign, start, self.cursor.pos())
            }
            _ => Token::new(TokenKind::Gt, start, self.cursor.pos()),
        }
    }

    /// `+` -> `Plus`, `++` -> `Inc`, `+=` -> `PlusAssign`
    fn lex_plus(&mut self, start: u32) -> Token {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('+') => {
                self.cursor.advance();
                Token::new(TokenKind::Inc, start, self.cursor.pos())
            }
            Some('=') => {
                self.cursor.advance();
                Token::new(TokenKind::PlusAssign, start, self.cursor.pos())
            }
            _ => Token::new(TokenKind::Plus, start, self.cursor.pos()),
        }
    }

    /// `-` -> `Minus`, `--` -> `Dec`, `-=` -> `MinusAssign`
    fn lex_minus(&mut self, start: u32) -> Token {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('-') => {
                self.cursor.advance();
                Token::new(TokenKind::Dec, start, self.cursor.pos())
            }
            Some('=') => {
                self.cursor.advance();
                Token::new(TokenKind::MinusAssign, start, self.cursor.pos())
            }
            _ => Token::new(TokenKind::Minus, start, self.cursor.pos()),
        }
    }

    /// `/` -> `Div` or `DivAssign`; `//` line comments and `/* */` block
    /// comments return `None` so the caller rescans; `///` doc comments
    /// become tokens.
    fn lex_slash(&mut self, start: u32) -> Option<Token> {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('/') => {
                self.cursor.advance();
                if self.cursor.peek() == Some('/') {
                    self.cursor.advance();
                    let text_start = self.cursor.pos();
                    self.cursor.eat_while(|c| c != '\n');
                    let text = self.cursor.slice(text_start, self.cursor.pos());
                    return Some(Token::with_lit(
                        TokenKind::DocComment,
                        text.trim(),
                        start,
                        self.cursor.pos(),
                    ));
                }
                self.cursor.eat_while(|c| c != '\n');
                None
            }
            Some('*') => {
                self.cursor.advance();
                let mut depth = 1u32;
                while depth > 0 {
                    match self.cursor.advance() {
                        Some('*') if self.cursor.peek() == Some('/') => {
                            self.cursor.advance();
                            depth -= 1;
                        }
                        Some('/') if self.cursor.peek() == Some('*') => {
                            self.cursor.advance();
                            depth += 1;
                        }
                        Some(_) => {}
                        None => {
                            self.reporter.error(
                                "unterminated block comment",
                                Span::new(start, self.cursor.pos()),
                            );
                            break;
                        }
                    }
                }
                None
            }
            Some('=') => {
                self.cursor.advance();
                Some(Token::new(TokenKind::DivAssign, start, self.cursor.pos()))
            }
            _ => Some(Token::new(TokenKind::Div, start, self.cursor.pos())),
        }
    }

    // ── Literals ───────────────────────────────────────────────────────

    /// Scan a number literal: decimal, `0x`/`0o`/`0b` prefixed, or a float
    /// with fraction and/or exponent. Underscore separators are dropped
    /// from the lexeme.
    fn lex_number(&mut self, start: u32) -> Token {
        if self.cursor.peek() == Some('0')
            && matches!(self.cursor.peek_next(), Some('x' | 'o' | 'b'))
        {
            self.cursor.advance();
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
        } else {
            self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
            // fraction: only when the dot is followed by a digit, so that
            // ranges (`0..n`) and selectors keep their own tokens
            if self.cursor.peek() == Some('.')
                && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
            {
                self.cursor.advance();
                self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
            }
            if matches!(self.cursor.peek(), Some('e' | 'E')) {
                let after = self.cursor.peek_next();
                let after_sign = self.cursor.peek_next2();
                let exp_ok = after.is_some_and(|c| c.is_ascii_digit())
                    || (matches!(after, Some('+' | '-'))
                        && after_sign.is_some_and(|c| c.is_ascii_digit()));
                if exp_ok {
                    self.cursor.advance();
                    if matches!(self.cursor.peek(), Some('+' | '-')) {
                        self.cursor.advance();
                    }
                    self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
                }
            }
        }
        let text = self.cursor.slice(start, self.cursor.pos()).replace('_', "");
        Token::with_lit(TokenKind::Number, text, start, self.cursor.pos())
    }

    /// Scan a character literal. The lexeme is the text between the quotes
    /// with escape sequences left as written.
    fn lex_char(&mut self, start: u32) -> Token {
        self.cursor.advance(); // opening '
        let text_start = self.cursor.pos();
        loop {
            match self.cursor.peek() {
                Some('\'') => break,
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some('\n') | None => {
                    self.reporter.error(
                        "unterminated character literal",
                        Span::new(start, self.cursor.pos()),
                    );
                    let text = self.cursor.slice(text_start, self.cursor.pos()).to_string();
                    return Token::with_lit(TokenKind::Char, text, start, self.cursor.pos());
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
        let text = self.cursor.slice(text_start, self.cursor.pos()).to_string();
        self.cursor.advance(); // closing '
        Token::with_lit(TokenKind::Char, text, start, self.cursor.pos())
    }

    /// Scan a string literal. As with chars, escapes stay as written; the
    /// checker decodes them when it needs a byte length.
    fn lex_string(&mut self, start: u32) -> Token {
        self.cursor.advance(); // opening "
        let text_start = self.cursor.pos();
        loop {
            match self.cursor.peek() {
                Some('"') => break,
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                None => {
                    self.reporter.error(
                        "unterminated string literal",
                        Span::new(start, self.cursor.pos()),
                    );
                    let text = self.cursor.slice(text_start, self.cursor.pos()).to_string();
                    return Token::with_lit(TokenKind::Str, text, start, self.cursor.pos());
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
        let text = self.cursor.slice(text_start, self.cursor.pos()).to_string();
        self.cursor.advance(); // closing "
        Token::with_lit(TokenKind::Str, text, start, self.cursor.pos())
    }

    /// Scan an identifier or keyword.
    fn lex_name(&mut self, start: u32) -> Token {
        self.cursor.eat_while(is_name_continue);
        let text = self.cursor.slice(start, self.cursor.pos());
        match keyword_from_str(text) {
            Some(kind) => Token::new(kind, start, self.cursor.pos()),
            None => Token::with_lit(TokenKind::Name, text, start, self.cursor.pos()),
        }
    }
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut reporter = Reporter::new();
        let toks = Lexer::tokenize(source, &mut reporter);
        assert!(!reporter.has_errors(), "lex errors: {:?}", reporter.diagnostics());
        toks.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_and_names() {
        assert_eq!(
            kinds("pub fn main"),
            vec![TokenKind::KeyPub, TokenKind::KeyFn, TokenKind::Name, TokenKind::Eof]
        );
    }

    #[test]
    fn shift_stays_split() {
        // `<<` must come out as two adjacent `<` tokens.
        let mut reporter = Reporter::new();
        let toks = Lexer::tokenize("a << b", &mut reporter);
        assert_eq!(toks[1].kind, TokenKind::Lt);
        assert_eq!(toks[2].kind, TokenKind::Lt);
        assert_eq!(toks[1].span.end, toks[2].span.start);
    }

    #[test]
    fn shift_assign_is_one_token() {
        assert_eq!(
            kinds("x <<= 1"),
            vec![TokenKind::Name, TokenKind::LshiftAssign, TokenKind::Number, TokenKind::Eof]
        );
    }

    #[test]
    fn not_is_and_not_in() {
        assert_eq!(
            kinds("a !is b !in c !x"),
            vec![
                TokenKind::Name,
                TokenKind::KeyNotIs,
                TokenKind::Name,
                TokenKind::KeyNotIn,
                TokenKind::Name,
                TokenKind::Bang,
                TokenKind::Name,
                TokenKind::Eof
            ]
        );
        // `!inner` must not become `!in`
        assert_eq!(
            kinds("!inner"),
            vec![TokenKind::Bang, TokenKind::Name, TokenKind::Eof]
        );
    }

    #[test]
    fn inclusive_range_splits_into_dotdot_assign() {
        assert_eq!(
            kinds("0..=5"),
            vec![
                TokenKind::Number,
                TokenKind::DotDot,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn number_forms() {
        let mut reporter = Reporter::new();
        let toks = Lexer::tokenize("42 0xFF 0b1010 3.14 1e10 1_000", &mut reporter);
        let lits: Vec<_> = toks.iter().filter(|t| t.kind == TokenKind::Number).map(|t| t.lit.as_str()).collect();
        assert_eq!(lits, vec!["42", "0xFF", "0b1010", "3.14", "1e10", "1000"]);
    }

    #[test]
    fn range_after_number_is_not_a_float() {
        assert_eq!(
            kinds("0..n"),
            vec![TokenKind::Number, TokenKind::DotDot, TokenKind::Name, TokenKind::Eof]
        );
    }

    #[test]
    fn string_and_char_keep_raw_escapes() {
        let mut reporter = Reporter::new();
        let toks = Lexer::tokenize(r#""a\nb" '\t'"#, &mut reporter);
        assert_eq!(toks[0].kind, TokenKind::Str);
        assert_eq!(toks[0].lit, r"a\nb");
        assert_eq!(toks[1].kind, TokenKind::Char);
        assert_eq!(toks[1].lit, r"\t");
    }

    #[test]
    fn comments_are_skipped_doc_comments_kept() {
        let mut reporter = Reporter::new();
        let toks = Lexer::tokenize("// plain\n/// documented\n/* block */ fn", &mut reporter);
        assert_eq!(toks[0].kind, TokenKind::DocComment);
        assert_eq!(toks[0].lit, "documented");
        assert_eq!(toks[1].kind, TokenKind::KeyFn);
    }

    #[test]
    fn unterminated_string_reports() {
        let mut reporter = Reporter::new();
        let _ = Lexer::tokenize("\"oops", &mut reporter);
        assert!(reporter.has_message("unterminated string literal"));
    }

    #[test]
    fn unrecognized_character_reports_and_recovers() {
        let mut reporter = Reporter::new();
        let toks = Lexer::tokenize("a @ b", &mut reporter);
        assert!(reporter.has_message("unrecognized character"));
        assert_eq!(
            toks.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![TokenKind::Name, TokenKind::Name, TokenKind::Eof]
        );
    }
}
