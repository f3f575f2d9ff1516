//! Type compatibility.
//!
//! `check_compatible_types` applies the assignability rules in a fixed
//! order; `check_types` wraps a failure into the user-facing
//! `expected type X, found Y` message (rendering `none` against an
//! expected pointer/optional as the optional form).
//!
//! The rules are intentionally asymmetric in two places: a pointer accepts
//! `none` (rule 1), and an optional accepts its own wrapped type, `none`
//! and `no_return` (rule 7). Everything else is symmetric.

use bolt_parser::ast::sym::{SymKind, TypeInfo, TypeKind};
use bolt_parser::ast::ty::Type;

use crate::check::Checker;

impl Checker<'_> {
    /// Verify assignability, producing the diagnostic message on failure.
    pub fn check_types(&self, got: &Type, expected: &Type) -> Result<(), String> {
        if self.check_compatible_types(got, expected) {
            return Ok(());
        }
        let got_str = if *got == self.ctx.none_t {
            if expected.is_optional() {
                self.ctx.typ_display(expected)
            } else {
                format!("?{}", self.ctx.typ_display(expected))
            }
        } else {
            self.ctx.typ_display(got)
        };
        Err(format!(
            "expected type `{}`, found `{got_str}`",
            self.ctx.typ_display(expected)
        ))
    }

    /// The assignability rules, applied in order.
    pub fn check_compatible_types(&self, got: &Type, expected: &Type) -> bool {
        // 1. pointers are nullable: *T accepts `none`
        if expected.is_ptr() && *got == self.ctx.none_t {
            return true;
        }
        // 2. references and non-references never mix; same for pointers
        if expected.is_ref() != got.is_ref() {
            return false;
        }
        if expected.is_ptr() != got.is_ptr() {
            return false;
        }
        // 3. function types compare structurally
        if let (Type::Fn { .. }, Type::Fn { .. }) = (expected, got) {
            return expected == got;
        }
        // 4. &A vs &B: A == B
        if let (Type::Ref(a), Type::Ref(b)) = (expected, got) {
            return a == b;
        }
        // 5. *A vs *B: equal, or A == c_void (opaque pointer accepts any)
        if let (Type::Ptr(a), Type::Ptr(b)) = (expected, got) {
            if **a == self.ctx.c_void_t {
                return true;
            }
            return a == b;
        }
        // 6 + 7. optionals
        if let Type::Optional(a) = expected {
            if let Type::Optional(b) = got {
                return a == b;
            }
            if *got == self.ctx.none_t || *got == self.ctx.no_return_t {
                return true;
            }
            return **a == *got;
        }
        // 8-11. underlying symbols
        let (Some(exp_sym), Some(got_sym)) = (expected.sym_of(), got.sym_of()) else {
            return false;
        };
        let exp_kind = self.ctx.sym(exp_sym).type_kind();
        let got_kind = self.ctx.sym(got_sym).type_kind();
        match (exp_kind, got_kind) {
            (Some(TypeKind::Array), Some(TypeKind::Array)) => {
                let (ee, es) = self.array_info(exp_sym);
                let (ge, gs) = self.array_info(got_sym);
                ee == ge && es == gs
            }
            (Some(TypeKind::Slice), Some(TypeKind::Slice)) => {
                self.slice_elem(exp_sym) == self.slice_elem(got_sym)
            }
            (Some(TypeKind::Tuple), Some(TypeKind::Tuple)) => {
                let e = self.tuple_types(exp_sym);
                let g = self.tuple_types(got_sym);
                e.len() == g.len() && e.iter().zip(g.iter()).all(|(a, b)| a == b)
            }
            _ => exp_sym == got_sym,
        }
    }

    fn array_info(&self, sym: bolt_parser::ast::sym::SymbolId) -> (Option<&Type>, Option<&str>) {
        match &self.ctx.sym(sym).kind {
            SymKind::Type { info: TypeInfo::Array { elem_typ, size_key }, .. } => {
                (Some(elem_typ), Some(size_key.as_str()))
            }
            _ => (None, None),
        }
    }

    fn slice_elem(&self, sym: bolt_parser::ast::sym::SymbolId) -> Option<&Type> {
        match &self.ctx.sym(sym).kind {
            SymKind::Type { info: TypeInfo::Slice { elem_typ }, .. } => Some(elem_typ),
            _ => None,
        }
    }

    fn tuple_types(&self, sym: bolt_parser::ast::sym::SymbolId) -> &[Type] {
        match &self.ctx.sym(sym).kind {
            SymKind::Type { info: TypeInfo::Tuple { types }, .. } => types,
            _ => &[],
        }
    }
}
