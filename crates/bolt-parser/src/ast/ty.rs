//! Semantic types.
//!
//! A type is either structural (`Ref`, `Ptr`, `Array`, `Slice`, `Tuple`,
//! `Optional`, `Result`, `Fn`), a resolved named type (`Sym`), or a not yet
//! resolved syntactic reference (`Unknown`, holding the expression that
//! names it). The resolver rewrites `Unknown` nodes to `Sym` and fills the
//! interned-symbol slots on `Array`/`Slice`/`Tuple`, after which equal
//! shapes share one symbol identity.

use super::expr::Expr;
use super::sym::{SymbolId, SymbolTable};

#[derive(Debug, Clone)]
pub enum Type {
    /// `&T`
    Ref(Box<Type>),
    /// `*T`
    Ptr(Box<Type>),
    /// `[T; N]` -- `sym` is the interned array symbol once resolved.
    Array { elem: Box<Type>, size: Box<Expr>, sym: Option<SymbolId> },
    /// `[T]`
    Slice { elem: Box<Type>, sym: Option<SymbolId> },
    /// `(T1, .., Tn)`, n <= 8
    Tuple { types: Vec<Type>, sym: Option<SymbolId> },
    /// `?T`
    Optional(Box<Type>),
    /// `!T` -- fallible return type
    Result(Box<Type>),
    /// function type, produced when a function is referenced as a value
    Fn { args: Vec<Type>, ret: Box<Type> },
    /// a resolved named type
    Sym(SymbolId),
    /// a syntactic type reference the resolver has not bound yet
    Unknown { expr: Box<Expr> },
}

impl Type {
    /// The symbol this exact node denotes, without dereferencing wrappers.
    /// `None` for unresolved or wrapper variants.
    fn shallow_sym(&self) -> Option<SymbolId> {
        match self {
            Type::Sym(id) => Some(*id),
            Type::Array { sym, .. } | Type::Slice { sym, .. } | Type::Tuple { sym, .. } => *sym,
            _ => None,
        }
    }

    /// The underlying named symbol, looking through `Ref`/`Ptr`/`Optional`/
    /// `Result` wrappers. This is what member lookup and kind checks use.
    pub fn sym_of(&self) -> Option<SymbolId> {
        match self {
            Type::Ref(inner)
            | Type::Ptr(inner)
            | Type::Optional(inner)
            | Type::Result(inner) => inner.sym_of(),
            _ => self.shallow_sym(),
        }
    }

    pub fn is_ref(&self) -> bool {
        matches!(self, Type::Ref(_))
    }

    pub fn is_ptr(&self) -> bool {
        matches!(self, Type::Ptr(_))
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Type::Optional(_))
    }

    pub fn is_result(&self) -> bool {
        matches!(self, Type::Result(_))
    }

    /// The wrapped type of a `Ref`/`Ptr`/`Optional`/`Result`, or the type
    /// itself.
    pub fn inner(&self) -> &Type {
        match self {
            Type::Ref(inner)
            | Type::Ptr(inner)
            | Type::Optional(inner)
            | Type::Result(inner) => inner,
            other => other,
        }
    }

    /// Stable structural key used by the universe interners. Named types
    /// contribute their symbol id, so two differently-named-but-equal
    /// aliases cannot collide.
    pub fn key(&self) -> String {
        match self {
            Type::Ref(inner) => format!("&{}", inner.key()),
            Type::Ptr(inner) => format!("*{}", inner.key()),
            Type::Array { elem, size, .. } => format!("[{}; {}]", elem.key(), size.repr()),
            Type::Slice { elem, .. } => format!("[{}]", elem.key()),
            Type::Tuple { types, .. } => {
                let keys: Vec<String> = types.iter().map(Type::key).collect();
                format!("({})", keys.join(", "))
            }
            Type::Optional(inner) => format!("?{}", inner.key()),
            Type::Result(inner) => format!("!{}", inner.key()),
            Type::Fn { args, ret } => {
                let keys: Vec<String> = args.iter().map(Type::key).collect();
                format!("fn ({}) {}", keys.join(", "), ret.key())
            }
            Type::Sym(id) => format!("#{}", id.0),
            Type::Unknown { expr } => format!("?unknown({})", expr.repr()),
        }
    }

    /// Render the type for diagnostics.
    pub fn display(&self, table: &SymbolTable) -> String {
        match self {
            Type::Ref(inner) => format!("&{}", inner.display(table)),
            Type::Ptr(inner) => format!("*{}", inner.display(table)),
            Type::Array { sym: Some(id), .. } => table.get(*id).name.clone(),
            Type::Array { elem, size, .. } => {
                format!("[{}; {}]", elem.display(table), size.repr())
            }
            Type::Slice { sym: Some(id), .. } => table.get(*id).name.clone(),
            Type::Slice { elem, .. } => format!("[{}]", elem.display(table)),
            Type::Tuple { sym: Some(id), .. } => table.get(*id).name.clone(),
            Type::Tuple { types, .. } => {
                let parts: Vec<String> = types.iter().map(|t| t.display(table)).collect();
                format!("({})", parts.join(", "))
            }
            Type::Optional(inner) => format!("?{}", inner.display(table)),
            Type::Result(inner) => format!("!{}", inner.display(table)),
            Type::Fn { args, ret } => {
                let parts: Vec<String> = args.iter().map(|t| t.display(table)).collect();
                format!("fn ({}) {}", parts.join(", "), ret.display(table))
            }
            Type::Sym(id) => table.get(*id).name.clone(),
            Type::Unknown { expr } => expr.repr(),
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        // interned/named identity wins when both sides have it
        if let (Some(a), Some(b)) = (self.shallow_sym(), other.shallow_sym()) {
            return a == b;
        }
        match (self, other) {
            (Type::Ref(a), Type::Ref(b)) => a == b,
            (Type::Ptr(a), Type::Ptr(b)) => a == b,
            (Type::Optional(a), Type::Optional(b)) => a == b,
            (Type::Result(a), Type::Result(b)) => a == b,
            (Type::Fn { args: a, ret: ar }, Type::Fn { args: b, ret: br }) => {
                a == b && ar == br
            }
            (
                Type::Array { elem: a, size: sa, .. },
                Type::Array { elem: b, size: sb, .. },
            ) => a == b && sa.repr() == sb.repr(),
            (Type::Slice { elem: a, .. }, Type::Slice { elem: b, .. }) => a == b,
            (Type::Tuple { types: a, .. }, Type::Tuple { types: b, .. }) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bolt_common::span::Span;

    #[test]
    fn sym_identity_beats_structure() {
        let a = Type::Sym(SymbolId(3));
        let b = Type::Sym(SymbolId(3));
        let c = Type::Sym(SymbolId(4));
        assert_eq!(a, b);
        assert_ne!(a, c);

        let t1 = Type::Tuple { types: vec![a.clone()], sym: Some(SymbolId(9)) };
        let t2 = Type::Tuple { types: vec![c.clone()], sym: Some(SymbolId(9)) };
        // same interned symbol -> equal even if the recorded element lists
        // differ (they cannot in practice)
        assert_eq!(t1, t2);
    }

    #[test]
    fn wrappers_compare_structurally() {
        let inner = Type::Sym(SymbolId(1));
        assert_eq!(Type::Ref(Box::new(inner.clone())), Type::Ref(Box::new(inner.clone())));
        assert_ne!(Type::Ref(Box::new(inner.clone())), Type::Ptr(Box::new(inner.clone())));
        assert_ne!(Type::Optional(Box::new(inner.clone())), inner);
    }

    #[test]
    fn unknown_is_never_equal() {
        let u = Type::Unknown { expr: Box::new(Expr::empty(Span::point(0))) };
        assert_ne!(u, u.clone());
    }

    #[test]
    fn keys_are_structural() {
        let i32_t = Type::Sym(SymbolId(7));
        let slice = Type::Slice { elem: Box::new(i32_t.clone()), sym: None };
        assert_eq!(slice.key(), "[#7]");
        let tup = Type::Tuple { types: vec![i32_t.clone(), slice], sym: None };
        assert_eq!(tup.key(), "(#7, [#7])");
    }
}
