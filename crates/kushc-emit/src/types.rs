//! Kush type -> C type-name mapping.
//!
//! Grounded in the file-organization convention of the teacher's
//! `faxc-gen::types` module (a dedicated type-mapping file alongside the
//! generator), but mapping to C type names instead of an LLVM context.
//!
//! Structure values are always represented as a pointer to the generated
//! `struct`, never by value: `new` is the only constructor and always
//! heap-allocates (see `prelude::RUNTIME_PRELUDE`'s allocator include),
//! so every Kush structure-typed local, field, or parameter is a C
//! pointer. This also means every member access lowers to `->`, never
//! `.` — the analyzer already rejects member access on anything but a
//! structure type, so no further inspection is needed at the access site
//! itself.

use kushc_par::ast::{PrimitiveKeyword, TypeExpr};
use kushc_sem::types::Type;

/// The `Type` an explicit `TypeExpr` names, mirroring
/// `kushc_sem::analysis::Analyzer::resolve_type_expr` without its
/// diagnostic branches — by emission time every `Named` type is already
/// known to resolve to a structure.
pub fn type_of_type_expr(ty: &TypeExpr) -> Type {
    match ty {
        TypeExpr::Primitive(kw, _) => Type::from_primitive_keyword(*kw),
        TypeExpr::Named(name, _) => Type::Structure(*name),
        TypeExpr::Array(base, dims, _) => Type::Array {
            base: Box::new(type_of_type_expr(base)),
            dims: *dims,
        },
    }
}

/// Maps a primitive keyword straight from the parsed `TypeExpr`, used for
/// function signatures and structure fields, which always carry an
/// explicit syntactic type.
pub fn c_type_of_type_expr(ty: &TypeExpr) -> String {
    match ty {
        TypeExpr::Primitive(kw, _) => c_primitive(*kw).to_string(),
        TypeExpr::Named(name, _) => format!("{}*", name.as_str()),
        TypeExpr::Array(base, _, _) => format!("{}*", c_type_of_type_expr(base)),
    }
}

/// Maps a resolved `Type`, used for `let`/`var` declarations whose C type
/// has to be recovered from the analyzer's inferred type rather than from
/// any syntax the declaration itself carries.
pub fn c_type_of(ty: &Type) -> String {
    match ty {
        Type::Boolean => "bool".to_string(),
        Type::Integer { signed, size } => c_integer(*signed, *size).to_string(),
        Type::Decimal { size: 4 } => "float".to_string(),
        Type::Decimal { .. } => "double".to_string(),
        Type::String => "String*".to_string(),
        Type::Void => "void".to_string(),
        Type::Null => "void*".to_string(),
        Type::Array { base, .. } => format!("{}*", c_type_of(base)),
        Type::Structure(name) => format!("{}*", name.as_str()),
        Type::Unknown => "void*".to_string(),
    }
}

fn c_primitive(kw: PrimitiveKeyword) -> &'static str {
    match kw {
        PrimitiveKeyword::Boolean => "bool",
        PrimitiveKeyword::I8 => "int8_t",
        PrimitiveKeyword::I16 => "int16_t",
        PrimitiveKeyword::I32 => "int32_t",
        PrimitiveKeyword::I64 => "int64_t",
        PrimitiveKeyword::Ui8 => "uint8_t",
        PrimitiveKeyword::Ui16 => "uint16_t",
        PrimitiveKeyword::Ui32 => "uint32_t",
        PrimitiveKeyword::Ui64 => "uint64_t",
        PrimitiveKeyword::F32 => "float",
        PrimitiveKeyword::F64 => "double",
        PrimitiveKeyword::Void => "void",
        PrimitiveKeyword::String => "String*",
    }
}

fn c_integer(signed: bool, size: u8) -> &'static str {
    match (signed, size) {
        (true, 1) => "int8_t",
        (true, 2) => "int16_t",
        (true, 4) => "int32_t",
        (true, 8) => "int64_t",
        (false, 1) => "uint8_t",
        (false, 2) => "uint16_t",
        (false, 4) => "uint32_t",
        (false, 8) => "uint64_t",
        _ => "int32_t",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kushc_util::Symbol;

    #[test]
    fn primitive_integer_widths_map_to_stdint_names() {
        assert_eq!(c_integer(true, 4), "int32_t");
        assert_eq!(c_integer(false, 8), "uint64_t");
    }

    #[test]
    fn structure_type_is_always_a_pointer() {
        assert_eq!(c_type_of(&Type::Structure(Symbol::intern("Point"))), "Point*");
    }

    #[test]
    fn decimal_size_picks_float_or_double() {
        assert_eq!(c_type_of(&Type::Decimal { size: 4 }), "float");
        assert_eq!(c_type_of(&Type::Decimal { size: 8 }), "double");
    }
}
