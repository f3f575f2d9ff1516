//! The compiler context: preferences, the symbol and scope arenas, the
//! universe of top-level symbols, the well-known primitive types and the
//! structural-type interners.
//!
//! The context is created once per compilation and threaded through every
//! phase. Interning happens through `add_or_get_tuple`/`array`/`slice`:
//! equal shapes always come back as the same symbol id, which is what makes
//! structural type equality an identity check after resolution.

use rustc_hash::FxHashMap;

use crate::ast::expr::Expr;
use crate::ast::sym::{
    ScopeArena, SymKind, Symbol, SymbolId, SymbolTable, TypeInfo, TypeKind, Visibility,
};
use crate::ast::ty::Type;

/// User preferences relevant to the front-end.
#[derive(Debug, Clone, Default)]
pub struct Prefs {
    /// Source files to compile, in order.
    pub inputs: Vec<String>,
    /// Name of the package being compiled.
    pub pkg_name: String,
}

/// Process-wide compilation state.
pub struct CompilerContext {
    pub prefs: Prefs,
    pub symbols: SymbolTable,
    pub scopes: ScopeArena,
    /// Top-level names: primitives, the package under compilation, and any
    /// declared external packages.
    universe: FxHashMap<String, SymbolId>,
    /// Root symbol of the package under compilation.
    pub pkg_sym: SymbolId,

    // ── Well-known types ───────────────────────────────────────────────
    pub void_t: Type,
    pub none_t: Type,
    pub c_void_t: Type,
    pub bool_t: Type,
    pub rune_t: Type,
    pub str_t: Type,
    pub no_return_t: Type,
    pub ptr_t: Type,
    pub i8_t: Type,
    pub i16_t: Type,
    pub i32_t: Type,
    pub i64_t: Type,
    pub isize_t: Type,
    pub u8_t: Type,
    pub u16_t: Type,
    pub u32_t: Type,
    pub u64_t: Type,
    pub usize_t: Type,
    pub f32_t: Type,
    pub f64_t: Type,

    // ── Structural interners ───────────────────────────────────────────
    tuple_syms: FxHashMap<String, SymbolId>,
    array_syms: FxHashMap<String, SymbolId>,
    slice_syms: FxHashMap<String, SymbolId>,
}

const PRIMITIVES: &[(&str, TypeKind)] = &[
    ("void", TypeKind::Void),
    ("c_void", TypeKind::CVoid),
    ("none", TypeKind::None),
    ("bool", TypeKind::Bool),
    ("rune", TypeKind::Rune),
    ("i8", TypeKind::Int8),
    ("i16", TypeKind::Int16),
    ("i32", TypeKind::Int32),
    ("i64", TypeKind::Int64),
    ("isize", TypeKind::Isize),
    ("u8", TypeKind::Uint8),
    ("u16", TypeKind::Uint16),
    ("u32", TypeKind::Uint32),
    ("u64", TypeKind::Uint64),
    ("usize", TypeKind::Usize),
    ("f32", TypeKind::Float32),
    ("f64", TypeKind::Float64),
    ("str", TypeKind::Str),
    ("no_return", TypeKind::NoReturn),
    ("ptr", TypeKind::RawPtr),
];

impl CompilerContext {
    pub fn new(prefs: Prefs) -> Self {
        let mut symbols = SymbolTable::new();
        let mut universe = FxHashMap::default();

        let mut prim = |symbols: &mut SymbolTable,
                        universe: &mut FxHashMap<String, SymbolId>,
                        name: &str,
                        kind: TypeKind| {
            let id = symbols.alloc(Symbol {
                name: name.to_string(),
                vis: Visibility::Public,
                parent: None,
                kind: SymKind::Type { kind, members: FxHashMap::default(), info: TypeInfo::None },
            });
            universe.insert(name.to_string(), id);
            Type::Sym(id)
        };

        let mut handles = Vec::with_capacity(PRIMITIVES.len());
        for (name, kind) in PRIMITIVES {
            handles.push(prim(&mut symbols, &mut universe, name, *kind));
        }

        let pkg_name = if prefs.pkg_name.is_empty() { "main".to_string() } else { prefs.pkg_name.clone() };
        let pkg_sym = symbols.alloc(Symbol {
            name: pkg_name.clone(),
            vis: Visibility::Public,
            parent: None,
            kind: SymKind::Pkg { members: FxHashMap::default() },
        });
        universe.insert(pkg_name, pkg_sym);

        let mut it = handles.into_iter();
        Self {
            prefs,
            void_t: it.next().unwrap(),
            c_void_t: it.next().unwrap(),
            none_t: it.next().unwrap(),
            bool_t: it.next().unwrap(),
            rune_t: it.next().unwrap(),
            i8_t: it.next().unwrap(),
            i16_t: it.next().unwrap(),
            i32_t: it.next().unwrap(),
            i64_t: it.next().unwrap(),
            isize_t: it.next().unwrap(),
            u8_t: it.next().unwrap(),
            u16_t: it.next().unwrap(),
            u32_t: it.next().unwrap(),
            u64_t: it.next().unwrap(),
            usize_t: it.next().unwrap(),
            f32_t: it.next().unwrap(),
            f64_t: it.next().unwrap(),
            str_t: it.next().unwrap(),
            no_return_t: it.next().unwrap(),
            ptr_t: it.next().unwrap(),
            symbols,
            scopes: ScopeArena::new(),
            universe,
            pkg_sym,
            tuple_syms: FxHashMap::default(),
            array_syms: FxHashMap::default(),
            slice_syms: FxHashMap::default(),
        }
    }

    // ── Universe ───────────────────────────────────────────────────────

    /// Look up a top-level name (primitive, this package, external package).
    pub fn universe_lookup(&self, name: &str) -> Option<SymbolId> {
        self.universe.get(name).copied()
    }

    /// Register a top-level symbol (used for `extern pkg` declarations).
    pub fn universe_add(&mut self, name: &str, sym: SymbolId) {
        self.universe.insert(name.to_string(), sym);
    }

    /// The well-known type for a primitive keyword, if `name` is one.
    pub fn primitive_type(&self, name: &str) -> Option<Type> {
        match name {
            "void" => Some(self.void_t.clone()),
            "c_void" => Some(self.c_void_t.clone()),
            "none" => Some(self.none_t.clone()),
            "bool" => Some(self.bool_t.clone()),
            "rune" => Some(self.rune_t.clone()),
            "i8" => Some(self.i8_t.clone()),
            "i16" => Some(self.i16_t.clone()),
            "i32" => Some(self.i32_t.clone()),
            "i64" => Some(self.i64_t.clone()),
            "isize" => Some(self.isize_t.clone()),
            "u8" => Some(self.u8_t.clone()),
            "u16" => Some(self.u16_t.clone()),
            "u32" => Some(self.u32_t.clone()),
            "u64" => Some(self.u64_t.clone()),
            "usize" => Some(self.usize_t.clone()),
            "f32" => Some(self.f32_t.clone()),
            "f64" => Some(self.f64_t.clone()),
            "str" => Some(self.str_t.clone()),
            "ptr" => Some(self.ptr_t.clone()),
            _ => None,
        }
    }

    // ── Symbol helpers ─────────────────────────────────────────────────

    pub fn sym(&self, id: SymbolId) -> &Symbol {
        self.symbols.get(id)
    }

    /// The `TypeKind` of a type's underlying symbol, if any.
    pub fn type_kind_of(&self, typ: &Type) -> Option<TypeKind> {
        typ.sym_of().and_then(|id| self.sym(id).type_kind())
    }

    /// Render a type for diagnostics.
    pub fn typ_display(&self, typ: &Type) -> String {
        typ.display(&self.symbols)
    }

    // ── Type predicates ────────────────────────────────────────────────

    pub fn is_int(&self, typ: &Type) -> bool {
        self.is_signed_int(typ) || self.is_unsigned_int(typ)
    }

    pub fn is_signed_int(&self, typ: &Type) -> bool {
        matches!(
            self.direct_type_kind(typ),
            Some(
                TypeKind::Int8
                    | TypeKind::Int16
                    | TypeKind::Int32
                    | TypeKind::Int64
                    | TypeKind::Isize
            )
        )
    }

    pub fn is_unsigned_int(&self, typ: &Type) -> bool {
        matches!(
            self.direct_type_kind(typ),
            Some(
                TypeKind::Uint8
                    | TypeKind::Uint16
                    | TypeKind::Uint32
                    | TypeKind::Uint64
                    | TypeKind::Usize
            )
        )
    }

    pub fn is_float(&self, typ: &Type) -> bool {
        matches!(self.direct_type_kind(typ), Some(TypeKind::Float32 | TypeKind::Float64))
    }

    /// Kind of a bare named type (no wrapper look-through): `&i32` is not
    /// an integer.
    fn direct_type_kind(&self, typ: &Type) -> Option<TypeKind> {
        match typ {
            Type::Sym(id) => self.sym(*id).type_kind(),
            _ => None,
        }
    }

    // ── Structural interners ───────────────────────────────────────────

    /// Intern a tuple shape; equal shapes return the same symbol.
    pub fn add_or_get_tuple(&mut self, types: Vec<Type>) -> SymbolId {
        let keys: Vec<String> = types.iter().map(Type::key).collect();
        let key = format!("({})", keys.join(", "));
        if let Some(id) = self.tuple_syms.get(&key) {
            return *id;
        }
        let parts: Vec<String> = types.iter().map(|t| t.display(&self.symbols)).collect();
        let name = format!("({})", parts.join(", "));
        let id = self.symbols.alloc(Symbol {
            name,
            vis: Visibility::Public,
            parent: None,
            kind: SymKind::Type {
                kind: TypeKind::Tuple,
                members: FxHashMap::default(),
                info: TypeInfo::Tuple { types },
            },
        });
        self.tuple_syms.insert(key, id);
        id
    }

    /// Intern an array shape (element type + size expression).
    pub fn add_or_get_array(&mut self, elem_typ: Type, size: &Expr) -> SymbolId {
        let size_key = size.repr();
        let key = format!("[{}; {}]", elem_typ.key(), size_key);
        if let Some(id) = self.array_syms.get(&key) {
            return *id;
        }
        let name = format!("[{}; {}]", elem_typ.display(&self.symbols), size_key);
        let id = self.symbols.alloc(Symbol {
            name,
            vis: Visibility::Public,
            parent: None,
            kind: SymKind::Type {
                kind: TypeKind::Array,
                members: FxHashMap::default(),
                info: TypeInfo::Array { elem_typ, size_key },
            },
        });
        self.array_syms.insert(key, id);
        id
    }

    /// Intern a slice shape.
    pub fn add_or_get_slice(&mut self, elem_typ: Type) -> SymbolId {
        let key = format!("[{}]", elem_typ.key());
        if let Some(id) = self.slice_syms.get(&key) {
            return *id;
        }
        let name = format!("[{}]", elem_typ.display(&self.symbols));
        let id = self.symbols.alloc(Symbol {
            name,
            vis: Visibility::Public,
            parent: None,
            kind: SymKind::Type {
                kind: TypeKind::Slice,
                members: FxHashMap::default(),
                info: TypeInfo::Slice { elem_typ },
            },
        });
        self.slice_syms.insert(key, id);
        id
    }
}
