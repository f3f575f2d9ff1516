//! The Bolt AST: a tree of owned nodes with non-owning back-references
//! into the symbol graph.
//!
//! Every expression carries a `typ` decoration slot that starts out `None`
//! and is filled exactly once by the checker; identifiers and paths carry
//! symbol slots filled by the resolver. Back-references are arena indices
//! ([`sym::SymbolId`] / [`sym::ScopeId`]), so the tree itself stays acyclic
//! and can be dropped without dangling-pointer concerns.

pub mod decl;
pub mod expr;
pub mod stmt;
pub mod sym;
pub mod ty;

pub use decl::{Attr, Attrs, Decl, DeclKind, FnDecl};
pub use expr::{
    BlockExpr, CallArg, CallErrHandler, CallExpr, Expr, ExprKind, IdentExpr, IfBranch, IfExpr,
    MatchBranch, MatchExpr, PathExpr, SelectorExpr, StructLitField,
};
pub use stmt::{LetBinding, LetStmt, Stmt, StmtKind};
pub use sym::{FnArg, ScopeId, SymbolId, Visibility};
pub use ty::Type;

/// One parsed source file and its top-level declarations.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub file: String,
    pub decls: Vec<Decl>,
}

/// Identifiers the `$name` comptime form may refer to. The resolver rejects
/// anything outside this table; no evaluator lives in the front-end.
pub const COMPTIME_CONSTANTS: &[&str] = &[
    "_OS_", "_ARCH_", "_ENDIAN_", "_DEBUG_", "_TESTS_", "_FILE_", "_LINE_", "_COLUMN_",
    "_FUNCTION_",
];

/// Whether `name` is a known comptime constant.
pub fn is_known_comptime_constant(name: &str) -> bool {
    COMPTIME_CONSTANTS.contains(&name)
}
