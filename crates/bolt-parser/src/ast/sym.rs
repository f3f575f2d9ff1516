//! Symbols and scopes.
//!
//! The symbol graph is a tree of owned children with non-owning `parent`
//! back-references, stored in one arena ([`SymbolTable`]) and addressed by
//! [`SymbolId`]. Module/type member tables live on the symbols themselves
//! and do not fall through to enclosing scopes; lexical scopes live in a
//! separate arena ([`ScopeArena`]) and *do* walk their parents on lookup.

use rustc_hash::FxHashMap;

use bolt_common::span::Span;

use super::expr::Expr;
use super::ty::Type;

/// Stable index of a symbol in the [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

/// Stable index of a lexical scope in the [`ScopeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

/// Symbol visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Private,
    PublicInPkg,
    Public,
}

impl Visibility {
    pub fn is_pub(self) -> bool {
        !matches!(self, Visibility::Private)
    }
}

/// What kind of named type a `SymKind::Type` symbol is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    CVoid,
    Void,
    None,
    Bool,
    Rune,
    Int8,
    Int16,
    Int32,
    Int64,
    Isize,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Usize,
    Float32,
    Float64,
    Str,
    NoReturn,
    RawPtr,
    Struct,
    Union,
    Trait,
    Enum,
    ErrType,
    Alias,
    Array,
    Slice,
    Tuple,
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TypeKind::CVoid => "c_void",
            TypeKind::Void => "void",
            TypeKind::None => "none",
            TypeKind::Bool => "bool",
            TypeKind::Rune => "rune",
            TypeKind::Int8 => "i8",
            TypeKind::Int16 => "i16",
            TypeKind::Int32 => "i32",
            TypeKind::Int64 => "i64",
            TypeKind::Isize => "isize",
            TypeKind::Uint8 => "u8",
            TypeKind::Uint16 => "u16",
            TypeKind::Uint32 => "u32",
            TypeKind::Uint64 => "u64",
            TypeKind::Usize => "usize",
            TypeKind::Float32 => "f32",
            TypeKind::Float64 => "f64",
            TypeKind::Str => "str",
            TypeKind::NoReturn => "no_return",
            TypeKind::RawPtr => "ptr",
            TypeKind::Struct => "struct",
            TypeKind::Union => "union",
            TypeKind::Trait => "trait",
            TypeKind::Enum => "enum",
            TypeKind::ErrType => "error type",
            TypeKind::Alias => "alias",
            TypeKind::Array => "array",
            TypeKind::Slice => "slice",
            TypeKind::Tuple => "tuple",
        };
        write!(f, "{s}")
    }
}

/// Kind-specific payload of a type symbol.
#[derive(Debug, Clone)]
pub enum TypeInfo {
    None,
    Struct { fields: Vec<StructFieldInfo> },
    Enum { variants: Vec<String> },
    Union { variants: Vec<Type> },
    Alias { parent: Type },
    Array { elem_typ: Type, size_key: String },
    Slice { elem_typ: Type },
    Tuple { types: Vec<Type> },
}

/// One declared struct field, in declaration order.
#[derive(Debug, Clone)]
pub struct StructFieldInfo {
    pub name: String,
    pub is_pub: bool,
    pub is_mut: bool,
    pub typ: Type,
    pub has_def_expr: bool,
}

/// A declared function parameter, as recorded on the `Fn` symbol.
#[derive(Debug, Clone)]
pub struct FnArg {
    pub name: String,
    pub is_mut: bool,
    pub typ: Type,
    pub def_expr: Option<Expr>,
    pub pos: Span,
}

impl FnArg {
    pub fn has_def_expr(&self) -> bool {
        self.def_expr.is_some()
    }
}

/// Payload of a function symbol.
#[derive(Debug, Clone)]
pub struct FnSym {
    pub is_extern: bool,
    pub is_unsafe: bool,
    pub is_method: bool,
    pub self_is_ref: bool,
    pub self_is_mut: bool,
    pub args: Vec<FnArg>,
    pub ret_typ: Type,
    pub has_named_args: bool,
}

impl FnSym {
    /// The function's type as a value (`fn (args) ret`).
    pub fn typ(&self) -> Type {
        Type::Fn {
            args: self.args.iter().map(|a| a.typ.clone()).collect(),
            ret: Box::new(self.ret_typ.clone()),
        }
    }
}

/// Payload of a local-variable symbol.
#[derive(Debug, Clone)]
pub struct ObjectSym {
    pub is_mut: bool,
    /// Whether this object is a declared function parameter.
    pub is_arg: bool,
    pub typ: Type,
}

/// The kind-specific payload of a symbol.
#[derive(Debug, Clone)]
pub enum SymKind {
    Pkg { members: FxHashMap<String, SymbolId> },
    Mod { members: FxHashMap<String, SymbolId> },
    Type { kind: TypeKind, members: FxHashMap<String, SymbolId>, info: TypeInfo },
    Fn(FnSym),
    Const { typ: Type },
    Static { is_mut: bool, typ: Type },
    Object(ObjectSym),
    Label,
}

/// A named entity: package, module, type, function, constant, static,
/// local variable or label.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub vis: Visibility,
    /// Back-reference only; ownership lives in the arena.
    pub parent: Option<SymbolId>,
    pub kind: SymKind,
}

impl Symbol {
    /// Human-readable kind word used in diagnostics.
    pub fn sym_kind(&self) -> &'static str {
        match &self.kind {
            SymKind::Pkg { .. } => "package",
            SymKind::Mod { .. } => "module",
            SymKind::Type { .. } => "type",
            SymKind::Fn(f) => {
                if f.is_method {
                    "method"
                } else {
                    "function"
                }
            }
            SymKind::Const { .. } => "constant",
            SymKind::Static { .. } => "static",
            SymKind::Object(_) => "variable",
            SymKind::Label => "label",
        }
    }

    /// Member table of this symbol, if it can own members.
    pub fn members(&self) -> Option<&FxHashMap<String, SymbolId>> {
        match &self.kind {
            SymKind::Pkg { members } | SymKind::Mod { members } | SymKind::Type { members, .. } => {
                Some(members)
            }
            _ => None,
        }
    }

    fn members_mut(&mut self) -> Option<&mut FxHashMap<String, SymbolId>> {
        match &mut self.kind {
            SymKind::Pkg { members } | SymKind::Mod { members } | SymKind::Type { members, .. } => {
                Some(members)
            }
            _ => None,
        }
    }

    /// The `TypeKind` of a type symbol, if this is one.
    pub fn type_kind(&self) -> Option<TypeKind> {
        match &self.kind {
            SymKind::Type { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Ordered field list of a struct symbol.
    pub fn struct_fields(&self) -> Option<&[StructFieldInfo]> {
        match &self.kind {
            SymKind::Type { info: TypeInfo::Struct { fields }, .. } => Some(fields),
            _ => None,
        }
    }

    /// Look up a declared field by name (structs only).
    pub fn lookup_field(&self, name: &str) -> Option<&StructFieldInfo> {
        self.struct_fields()?.iter().find(|f| f.name == name)
    }
}

/// Arena of all symbols created during a compilation, universe included.
#[derive(Debug, Default)]
pub struct SymbolTable {
    syms: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, sym: Symbol) -> SymbolId {
        let id = SymbolId(self.syms.len() as u32);
        self.syms.push(sym);
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.syms[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.syms[id.0 as usize]
    }

    /// Look up a member by name in `sym`'s own table (no parent walk).
    pub fn lookup_member(&self, sym: SymbolId, name: &str) -> Option<SymbolId> {
        self.get(sym).members()?.get(name).copied()
    }

    /// Look up a name in `sym`'s table, then in its ancestors' tables.
    /// This is how an item inside a module sees package-level items.
    pub fn lookup_walk(&self, sym: SymbolId, name: &str) -> Option<SymbolId> {
        let mut cur = Some(sym);
        while let Some(id) = cur {
            if let Some(found) = self.lookup_member(id, name) {
                return Some(found);
            }
            cur = self.get(id).parent;
        }
        None
    }

    /// Attach `child` to `parent`'s member table and set its back-reference.
    /// Fails when the name is already taken in that table.
    pub fn add_member(&mut self, parent: SymbolId, child: SymbolId) -> Result<(), String> {
        let name = self.get(child).name.clone();
        let table = self
            .get_mut(parent)
            .members_mut()
            .expect("parent symbol cannot own members");
        if table.contains_key(&name) {
            return Err(format!("redefinition of `{name}`"));
        }
        table.insert(name, child);
        self.get_mut(child).parent = Some(parent);
        Ok(())
    }
}

/// One lexical scope: a name map plus a parent link.
#[derive(Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    names: FxHashMap<String, SymbolId>,
}

/// Arena of lexical scopes. AST nodes hold [`ScopeId`]s into it.
#[derive(Debug, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope { parent, names: FxHashMap::default() });
        id
    }

    /// Parent of a scope, if it has one.
    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.0 as usize].parent
    }

    /// Add a binding to `scope`. Fails when the name is already bound in
    /// this exact scope (shadowing across scopes is fine).
    pub fn add(&mut self, scope: ScopeId, name: &str, sym: SymbolId) -> Result<(), String> {
        let s = &mut self.scopes[scope.0 as usize];
        if s.names.contains_key(name) {
            return Err(format!("redefinition of `{name}`"));
        }
        s.names.insert(name.to_string(), sym);
        Ok(())
    }

    /// Look up a name, walking parent scopes outward.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut cur = Some(scope);
        while let Some(id) = cur {
            let s = &self.scopes[id.0 as usize];
            if let Some(sym) = s.names.get(name) {
                return Some(*sym);
            }
            cur = s.parent;
        }
        None
    }

    /// Whether a name is bound in `scope` itself (no parent walk).
    pub fn exists(&self, scope: ScopeId, name: &str) -> bool {
        self.scopes[scope.0 as usize].names.contains_key(name)
    }

    /// Update the recorded type of an object bound at or above `scope`.
    /// Used when an inferred `let` learns its type.
    pub fn update_typ(&self, scope: ScopeId, name: &str, typ: Type, table: &mut SymbolTable) {
        if let Some(sym) = self.lookup(scope, name) {
            if let SymKind::Object(obj) = &mut table.get_mut(sym).kind {
                obj.typ = typ;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(name: &str) -> Symbol {
        Symbol {
            name: name.into(),
            vis: Visibility::Private,
            parent: None,
            kind: SymKind::Object(ObjectSym {
                is_mut: false,
                is_arg: false,
                typ: Type::Unknown { expr: Box::new(Expr::empty(Span::point(0))) },
            }),
        }
    }

    #[test]
    fn scope_lookup_walks_parents() {
        let mut table = SymbolTable::new();
        let mut scopes = ScopeArena::new();
        let outer = scopes.alloc(None);
        let inner = scopes.alloc(Some(outer));

        let x = table.alloc(object("x"));
        scopes.add(outer, "x", x).unwrap();

        assert_eq!(scopes.lookup(inner, "x"), Some(x));
        assert_eq!(scopes.lookup(inner, "y"), None);
        assert!(scopes.exists(outer, "x"));
        assert!(!scopes.exists(inner, "x"));
    }

    #[test]
    fn scope_add_rejects_same_scope_duplicates() {
        let mut table = SymbolTable::new();
        let mut scopes = ScopeArena::new();
        let scope = scopes.alloc(None);

        let a = table.alloc(object("x"));
        let b = table.alloc(object("x"));
        scopes.add(scope, "x", a).unwrap();
        assert!(scopes.add(scope, "x", b).is_err());

        // shadowing in a child scope is allowed
        let child = scopes.alloc(Some(scope));
        assert!(scopes.add(child, "x", b).is_ok());
        assert_eq!(scopes.lookup(child, "x"), Some(b));
    }

    #[test]
    fn member_tables_do_not_fall_through() {
        let mut table = SymbolTable::new();
        let pkg = table.alloc(Symbol {
            name: "main".into(),
            vis: Visibility::Public,
            parent: None,
            kind: SymKind::Pkg { members: FxHashMap::default() },
        });
        let m = table.alloc(Symbol {
            name: "inner".into(),
            vis: Visibility::Public,
            parent: None,
            kind: SymKind::Mod { members: FxHashMap::default() },
        });
        let c = table.alloc(Symbol {
            name: "MAX".into(),
            vis: Visibility::Public,
            parent: None,
            kind: SymKind::Const {
                typ: Type::Unknown { expr: Box::new(Expr::empty(Span::point(0))) },
            },
        });
        table.add_member(pkg, m).unwrap();
        table.add_member(pkg, c).unwrap();

        // direct member lookup stays local...
        assert_eq!(table.lookup_member(m, "MAX"), None);
        // ...while the walking lookup sees enclosing symbols.
        assert_eq!(table.lookup_walk(m, "MAX"), Some(c));
    }

    #[test]
    fn duplicate_member_is_a_redefinition() {
        let mut table = SymbolTable::new();
        let pkg = table.alloc(Symbol {
            name: "main".into(),
            vis: Visibility::Public,
            parent: None,
            kind: SymKind::Pkg { members: FxHashMap::default() },
        });
        let a = table.alloc(object("dup"));
        let b = table.alloc(object("dup"));
        table.add_member(pkg, a).unwrap();
        let err = table.add_member(pkg, b).unwrap_err();
        assert!(err.contains("redefinition of `dup`"));
    }
}
