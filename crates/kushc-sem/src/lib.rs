//! Semantic analysis: declares every structure and function in a
//! compilation unit, then resolves and types every expression against
//! that symbol table (spec.md §4.6).
//!
//! Grounded in the teacher's `faxc-sem` crate (two-pass name
//! resolution over a `ScopeTree`, diagnostics routed through a shared
//! `Handler`), generalized from the teacher's open-ended HIR type
//! system to Kush's closed nine-tag `Type` and from the teacher's
//! trait/generic resolution to Kush's much smaller structure/function
//! model.

pub mod analysis;
pub mod scope;
pub mod types;

pub use analysis::Analyzer;
pub use scope::{
    DeclareConflict, Modifiers, RedeclarationKind, Scope, ScopeArena, ScopeId, ScopeKind,
    SymbolData, SymbolKind,
};
pub use types::{lookup_primitive, Type, PRIMITIVES};
