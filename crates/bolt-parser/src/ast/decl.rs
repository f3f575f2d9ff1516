//! Declaration nodes.
//!
//! Every declaration carries its doc comment, attribute block and
//! visibility up front, the way the grammar reads them; the head-specific
//! payload lives in [`DeclKind`]. Struct fields are themselves declarations
//! (they appear interleaved with methods inside a struct body).

use bolt_common::span::Span;

use super::expr::Expr;
use super::stmt::Stmt;
use super::sym::{FnArg, ScopeId, SymbolId, Visibility};
use super::ty::Type;

/// One attribute inside `#[...]`.
#[derive(Debug, Clone)]
pub struct Attr {
    pub name: String,
    pub pos: Span,
    /// Condition of an `if(...)` attribute.
    pub cond: Option<Expr>,
}

/// The attribute block of a declaration.
#[derive(Debug, Clone)]
pub struct Attrs {
    pub attrs: Vec<Attr>,
    /// Whether the declaration survives its `if(...)` attribute. Evaluated
    /// by the comptime collaborator; defaults to enabled.
    pub if_check: bool,
}

impl Attrs {
    pub fn new() -> Self {
        Self { attrs: Vec::new(), if_check: true }
    }

    pub fn add(&mut self, attr: Attr) {
        self.attrs.push(attr);
    }

    pub fn lookup(&self, name: &str) -> Option<&Attr> {
        self.attrs.iter().find(|a| a.name == name)
    }

    pub fn has_attrs(&self) -> bool {
        !self.attrs.is_empty()
    }
}

impl Default for Attrs {
    fn default() -> Self {
        Self::new()
    }
}

/// A declaration with its shared prefix (docs, attributes, visibility).
#[derive(Debug, Clone)]
pub struct Decl {
    pub kind: DeclKind,
    pub pos: Span,
    pub doc: Vec<String>,
    pub attrs: Attrs,
    pub vis: Visibility,
}

/// A function or method declaration (also used for extern prototypes and
/// trait items, which may lack a body).
#[derive(Debug, Clone)]
pub struct FnDecl {
    pub name: String,
    pub name_pos: Span,
    pub args: Vec<FnArg>,
    pub ret_typ: Type,
    pub stmts: Vec<Stmt>,
    pub has_body: bool,
    pub is_extern: bool,
    pub is_unsafe: bool,
    pub is_method: bool,
    pub self_is_ref: bool,
    pub self_is_mut: bool,
    pub has_named_args: bool,
    /// The function's own scope (receiver + parameters + body locals).
    pub scope: ScopeId,
    pub sym: Option<SymbolId>,
}

/// The closed set of declaration forms.
#[derive(Debug, Clone)]
pub enum DeclKind {
    /// error-recovery placeholder
    Empty,
    /// `extern pkg name;`
    ExternPkg { name: String },
    /// `extern "ABI" { fn ...; }` or a single prototype
    Extern { abi: String, protos: Vec<Decl> },
    Const {
        name: String,
        name_pos: Span,
        typ: Type,
        expr: Expr,
        sym: Option<SymbolId>,
    },
    Static {
        is_mut: bool,
        name: String,
        name_pos: Span,
        typ: Type,
        expr: Expr,
        sym: Option<SymbolId>,
    },
    Mod { name: String, name_pos: Span, decls: Vec<Decl>, sym: Option<SymbolId> },
    /// `type Name = Parent;`
    TypeAlias { name: String, name_pos: Span, parent: Type, sym: Option<SymbolId> },
    /// `errtype Name;`
    ErrType { name: String, name_pos: Span, sym: Option<SymbolId> },
    Trait { name: String, name_pos: Span, decls: Vec<Decl>, sym: Option<SymbolId> },
    Union {
        name: String,
        name_pos: Span,
        variants: Vec<Type>,
        decls: Vec<Decl>,
        sym: Option<SymbolId>,
    },
    Enum {
        name: String,
        name_pos: Span,
        variants: Vec<String>,
        decls: Vec<Decl>,
        sym: Option<SymbolId>,
    },
    Struct { name: String, name_pos: Span, decls: Vec<Decl>, sym: Option<SymbolId> },
    StructField {
        is_pub: bool,
        is_mut: bool,
        name: String,
        name_pos: Span,
        typ: Type,
        def_expr: Option<Expr>,
    },
    /// `extend Type { fn ... }`
    Extend { typ: Type, decls: Vec<Decl> },
    Fn(FnDecl),
    /// `~self { ... }` inside a struct body
    Destructor { stmts: Vec<Stmt>, scope: ScopeId },
    /// `test "name" { ... }`
    Test { name: String, stmts: Vec<Stmt>, scope: ScopeId },
}
