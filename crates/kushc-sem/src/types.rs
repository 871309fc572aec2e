//! The Kush type model: a closed set of value-type tags plus the
//! `indexable`/`accessible`/`callable` capability flags the analyzer
//! consults when walking a postfix chain.
//!
//! Unlike the teacher's open-ended `Type` enum (tuples, slices, futures,
//! generics), Kush's tag set is exactly the nine kinds spec.md names:
//! structure, integer, decimal, array, void, null, string, boolean, unknown.
//! There is no function type — a bare identifier that names a function is
//! resolved against the symbol table at the point it is called, never
//! reduced to a `Type` (see `analysis.rs`'s `Callee`).

use kushc_par::ast::PrimitiveKeyword;
use kushc_util::Symbol;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// A Kush value type.
///
/// Primitive variants are cheap to clone; `Array`'s element type is boxed
/// because it can nest arbitrarily (`i32[][]`). `Structure` carries only
/// the declaring structure's interned name — looking up its fields goes
/// through the scope tree rather than a raw AST pointer, per spec.md §9's
/// "model symbols as an index ... never as raw back-pointers" guidance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Structure(Symbol),
    Integer { signed: bool, size: u8 },
    Decimal { size: u8 },
    Array { base: Box<Type>, dims: u32 },
    Void,
    Null,
    String,
    Boolean,
    Unknown,
}

impl Type {
    pub fn indexable(&self) -> bool {
        matches!(self, Type::Array { .. } | Type::String)
    }

    pub fn accessible(&self) -> bool {
        matches!(self, Type::Structure(_))
    }

    /// No `Type` variant is ever directly callable — see module docs.
    /// Carried anyway so the three spec.md flags all exist on `Type`.
    pub fn callable(&self) -> bool {
        false
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Integer { .. })
    }

    pub fn is_decimal(&self) -> bool {
        matches!(self, Type::Decimal { .. })
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_decimal()
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Type::Boolean)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    /// Default integer literal type: `i32`.
    pub fn default_integer() -> Type {
        Type::Integer {
            signed: true,
            size: 4,
        }
    }

    /// Default floating-point literal type: `f64`.
    pub fn default_decimal() -> Type {
        Type::Decimal { size: 8 }
    }

    pub fn from_primitive_keyword(kw: PrimitiveKeyword) -> Type {
        match kw {
            PrimitiveKeyword::Boolean => Type::Boolean,
            PrimitiveKeyword::I8 => Type::Integer {
                signed: true,
                size: 1,
            },
            PrimitiveKeyword::I16 => Type::Integer {
                signed: true,
                size: 2,
            },
            PrimitiveKeyword::I32 => Type::Integer {
                signed: true,
                size: 4,
            },
            PrimitiveKeyword::I64 => Type::Integer {
                signed: true,
                size: 8,
            },
            PrimitiveKeyword::Ui8 => Type::Integer {
                signed: false,
                size: 1,
            },
            PrimitiveKeyword::Ui16 => Type::Integer {
                signed: false,
                size: 2,
            },
            PrimitiveKeyword::Ui32 => Type::Integer {
                signed: false,
                size: 4,
            },
            PrimitiveKeyword::Ui64 => Type::Integer {
                signed: false,
                size: 8,
            },
            PrimitiveKeyword::F32 => Type::Decimal { size: 4 },
            PrimitiveKeyword::F64 => Type::Decimal { size: 8 },
            PrimitiveKeyword::Void => Type::Void,
            PrimitiveKeyword::String => Type::String,
        }
    }

    /// Structural equality used by the analyzer's compatibility checks.
    /// Two numeric types of different signedness/size are *not*
    /// compatible; `Unknown` is compatible with everything so a single
    /// unresolved sub-expression does not cascade into unrelated errors.
    pub fn compatible_with(&self, other: &Type) -> bool {
        if self.is_unknown() || other.is_unknown() {
            return true;
        }
        self == other
    }
}

/// The process-wide table of primitive type names, pre-populated exactly
/// once, mirroring the teacher's `STRING_TABLE` `LazyLock` pre-interning
/// pattern (`kushc-util::symbol::interner`).
pub static PRIMITIVES: Lazy<HashMap<&'static str, Type>> = Lazy::new(|| {
    let mut table = HashMap::new();
    table.insert("boolean", Type::Boolean);
    table.insert(
        "i8",
        Type::Integer {
            signed: true,
            size: 1,
        },
    );
    table.insert(
        "i16",
        Type::Integer {
            signed: true,
            size: 2,
        },
    );
    table.insert(
        "i32",
        Type::Integer {
            signed: true,
            size: 4,
        },
    );
    table.insert(
        "i64",
        Type::Integer {
            signed: true,
            size: 8,
        },
    );
    table.insert(
        "ui8",
        Type::Integer {
            signed: false,
            size: 1,
        },
    );
    table.insert(
        "ui16",
        Type::Integer {
            signed: false,
            size: 2,
        },
    );
    table.insert(
        "ui32",
        Type::Integer {
            signed: false,
            size: 4,
        },
    );
    table.insert(
        "ui64",
        Type::Integer {
            signed: false,
            size: 8,
        },
    );
    table.insert("f32", Type::Decimal { size: 4 });
    table.insert("f64", Type::Decimal { size: 8 });
    table.insert("void", Type::Void);
    table.insert("null", Type::Null);
    table.insert("string", Type::String);
    table.insert("unknown", Type::Unknown);
    table
});

pub fn lookup_primitive(name: &str) -> Option<Type> {
    PRIMITIVES.get(name).cloned()
}
