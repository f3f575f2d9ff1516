//! Expression nodes.
//!
//! Expressions are a closed sum. Every node carries its span and a `typ`
//! decoration slot the checker fills; resolver-owned slots (`sym`, `obj`,
//! `left_info`, `field_info`) live on the variants that need them.

use bolt_common::span::Span;
use bolt_common::token::TokenKind;

use super::stmt::Stmt;
use super::sym::{ScopeId, SymbolId};
use super::ty::Type;

/// An expression: kind, source span, inferred type.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: Span,
    /// Filled by the checker; `None` until then.
    pub typ: Option<Type>,
}

impl Expr {
    pub fn new(kind: ExprKind, pos: Span) -> Self {
        Self { kind, pos, typ: None }
    }

    /// The placeholder expression used for error recovery.
    pub fn empty(pos: Span) -> Self {
        Self::new(ExprKind::Empty, pos)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, ExprKind::Empty)
    }

    /// Compact source-like rendering, used in diagnostics and as part of
    /// array-type interning keys. Only forms that can realistically appear
    /// there render fully; everything else collapses.
    pub fn repr(&self) -> String {
        match &self.kind {
            ExprKind::Empty => String::new(),
            ExprKind::IntLit { value } | ExprKind::FloatLit { value } => value.clone(),
            ExprKind::BoolLit(v) => v.to_string(),
            ExprKind::Ident(ident) => ident.name.clone(),
            ExprKind::SelfExpr { .. } => "self".into(),
            ExprKind::SelfTyExpr { .. } => "Self".into(),
            ExprKind::PkgExpr => "pkg".into(),
            ExprKind::EnumVariant { variant } => format!(".{variant}"),
            ExprKind::Path(path) => format!("{}::{}", path.left.repr(), path.field_name),
            ExprKind::Selector(sel) => format!("{}.{}", sel.left.repr(), sel.field_name),
            ExprKind::Par { inner } => format!("({})", inner.repr()),
            _ => "<expr>".into(),
        }
    }
}

/// A name reference plus its resolution slots.
#[derive(Debug, Clone)]
pub struct IdentExpr {
    pub name: String,
    /// Lexical scope the name appeared in.
    pub scope: ScopeId,
    /// Whether this is a `$name` comptime identifier.
    pub is_comptime: bool,
    /// True when the resolver bound a local object rather than a symbol.
    pub is_obj: bool,
    pub obj: Option<SymbolId>,
    pub sym: Option<SymbolId>,
}

/// One `name: value` entry of a struct literal.
#[derive(Debug, Clone)]
pub struct StructLitField {
    pub name: String,
    pub pos: Span,
    pub expr: Expr,
}

/// `left.field_name`
#[derive(Debug, Clone)]
pub struct SelectorExpr {
    pub left: Box<Expr>,
    pub field_name: String,
    pub field_pos: Span,
}

/// `left::field_name` plus resolution slots.
#[derive(Debug, Clone)]
pub struct PathExpr {
    pub left: Box<Expr>,
    pub field_name: String,
    pub field_pos: Span,
    /// Symbol the left side resolved to.
    pub left_info: Option<SymbolId>,
    /// Symbol the field resolved to. Stays `None` for enum variants.
    pub field_info: Option<SymbolId>,
    /// Whether this is the final segment of the chain.
    pub is_last: bool,
    pub has_error: bool,
}

/// One call argument, positional or named.
#[derive(Debug, Clone)]
pub struct CallArg {
    pub expr: Expr,
    pub name: Option<String>,
    pub pos: Span,
}

impl CallArg {
    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }
}

/// `catch [|name|] expr` attached to a call.
#[derive(Debug, Clone)]
pub struct CallErrHandler {
    pub varname: Option<String>,
    pub expr: Box<Expr>,
    pub pos: Span,
    pub scope: ScopeId,
}

/// `left(args...) [catch ...]`
#[derive(Debug, Clone)]
pub struct CallExpr {
    pub left: Box<Expr>,
    pub args: Vec<CallArg>,
    pub err_handler: Option<CallErrHandler>,
    /// Resolved callee, filled by the checker.
    pub info: Option<SymbolId>,
}

impl CallExpr {
    /// Number of positional (non-named) arguments.
    pub fn pure_args_count(&self) -> usize {
        self.args.iter().filter(|a| !a.is_named()).count()
    }

    /// The named argument called `name`, if present.
    pub fn get_named_arg(&self, name: &str) -> Option<&CallArg> {
        self.args.iter().find(|a| a.name.as_deref() == Some(name))
    }
}

/// `{ stmts; tail }`, possibly `unsafe`.
///
/// The block is value-producing (`is_expr`) iff its last statement was an
/// expression statement without a terminating semicolon; that expression is
/// moved into `tail`.
#[derive(Debug, Clone)]
pub struct BlockExpr {
    pub is_unsafe: bool,
    pub stmts: Vec<Stmt>,
    pub tail: Option<Box<Expr>>,
    pub is_expr: bool,
    pub scope: ScopeId,
}

/// One branch of an `if` chain. `cond` is `None` for the `else` branch.
#[derive(Debug, Clone)]
pub struct IfBranch {
    pub cond: Option<Expr>,
    pub expr: Expr,
    pub is_else: bool,
}

/// `if (c) e elif (c) e else e`, possibly comptime (`$if`).
#[derive(Debug, Clone)]
pub struct IfExpr {
    pub is_comptime: bool,
    pub branches: Vec<IfBranch>,
    /// For comptime chains: the branch selected by the comptime evaluator
    /// (an external collaborator). `None` means no branch was selected.
    pub branch_idx: Option<usize>,
}

/// One arm of a `match`.
#[derive(Debug, Clone)]
pub struct MatchBranch {
    pub pats: Vec<Expr>,
    pub expr: Expr,
    pub is_else: bool,
}

/// `match (e) [is] { pats => e, .., else => e }`
#[derive(Debug, Clone)]
pub struct MatchExpr {
    pub is_comptime: bool,
    pub expr: Box<Expr>,
    pub branches: Vec<MatchBranch>,
    /// Whether arms match on types (`match (x) is { ... }`).
    pub is_typematch: bool,
}

/// The closed set of expression forms.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// error-recovery placeholder
    Empty,
    VoidLit,
    NoneLit,
    BoolLit(bool),
    /// lexeme kept as written; `is_byte` for `b'x'`
    CharLit { value: String, is_byte: bool },
    IntLit { value: String },
    FloatLit { value: String },
    StrLit { value: String, is_raw: bool, is_bytestr: bool },
    TupleLit { exprs: Vec<Expr> },
    ArrayLit { elems: Vec<Expr> },
    /// `target { field: value, .. }`
    StructLit { target: Box<Expr>, fields: Vec<StructLitField> },
    SelfExpr { scope: ScopeId },
    SelfTyExpr { scope: ScopeId },
    PkgExpr,
    Ident(IdentExpr),
    /// `.Variant` resolved against the expected type
    EnumVariant { variant: String },
    Unary { op: TokenKind, right: Box<Expr> },
    Binary { left: Box<Expr>, op: TokenKind, right: Box<Expr> },
    Postfix { left: Box<Expr>, op: TokenKind },
    Par { inner: Box<Expr> },
    Cast { expr: Box<Expr>, target: Type },
    /// `e.?` -- unwrap an optional
    NoneCheck { expr: Box<Expr> },
    /// `e.*` -- dereference a pointer or reference
    Indirect { expr: Box<Expr> },
    /// `let [mut] name = e` in a condition position
    Guard { name: String, is_mut: bool, expr: Box<Expr>, scope: ScopeId },
    Range { start: Option<Box<Expr>>, end: Option<Box<Expr>>, is_inclusive: bool },
    Index { left: Box<Expr>, index: Box<Expr>, left_typ: Option<Type> },
    Selector(SelectorExpr),
    Path(PathExpr),
    Call(CallExpr),
    /// `name!(args)`
    BuiltinCall { name: String, args: Vec<Expr> },
    /// a type in expression position (`is` comparisons, `sizeof!` args)
    TypeNode { typ: Type },
    Try { expr: Box<Expr> },
    Go { expr: Box<Expr> },
    Block(BlockExpr),
    If(IfExpr),
    Match(MatchExpr),
    Return { expr: Option<Box<Expr>> },
    Raise { expr: Box<Expr> },
}
