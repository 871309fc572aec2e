//! kushc-util - Core utilities and foundation types shared by every stage
//! of the Kush compiler pipeline.
//!
//! This crate has no dependency on any other `kushc-*` crate. It provides:
//!
//! - [`symbol`]: global string interning (`Symbol`, `STRING_TABLE`).
//! - [`span`]: source location tracking (`Span`, `FileId`, `SourceMap`).
//! - [`diagnostic`]: error/warning collection and formatting (`Handler`,
//!   `DiagnosticBuilder`, `DiagnosticCode`).
//! - [`index_vec`]: typed-index collections (`IndexVec<I, T>`, `Idx`,
//!   `define_idx!`).
//! - [`symbol_id`]: `SymbolId`, the identifier assigned to every declared
//!   name by the semantic analyzer.
//! - [`error`]: `thiserror`-based error types for the above.

pub mod diagnostic;
pub mod error;
pub mod index_vec;
pub mod span;
pub mod symbol;
pub mod symbol_id;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use index_vec::{Idx, IndexVec};
pub use span::{FileId, Span};
pub use symbol::Symbol;
pub use symbol_id::{SymbolId, SymbolIdGenerator};

pub use rustc_hash::{FxHashMap, FxHashSet};
