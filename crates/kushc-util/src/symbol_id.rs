use std::sync::atomic::{AtomicU32, Ordering};
use crate::Idx;

/// Global unique identifier for a declared symbol (variable, function,
/// structure, parameter, label, ...). Assigned once per declaration by
/// the semantic analyzer and carried through the type context and the
/// scope tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(pub u32);

impl Idx for SymbolId {
    fn from_usize(idx: usize) -> Self {
        SymbolId(idx as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl SymbolId {
    /// Reserved SymbolId for error recovery: assigned when a declaration
    /// could not be bound to a real id (e.g. resolving against a name
    /// that failed to declare).
    pub const DUMMY: SymbolId = SymbolId(u32::MAX);

    pub fn is_dummy(self) -> bool {
        self == Self::DUMMY
    }
}

/// Generator for unique SymbolIds, shared by reference across a single
/// compilation's semantic analysis pass.
pub struct SymbolIdGenerator {
    counter: AtomicU32,
}

impl SymbolIdGenerator {
    /// Create a new generator starting from 0.
    pub fn new() -> Self {
        Self {
            counter: AtomicU32::new(0),
        }
    }

    /// Generate a new unique SymbolId.
    pub fn next(&self) -> SymbolId {
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        if id == u32::MAX {
            panic!("SymbolId overflow: program declares more symbols than the compiler can track.");
        }
        SymbolId(id)
    }
}

impl Default for SymbolIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
