//! Re-deriving the analyzer's scope topology during emission.
//!
//! `kushc-sem::analysis::Analyzer` opens one `Local` scope per `Block`, a
//! dedicated scope per `for` statement, and a dedicated scope per `catch`
//! clause — always in the same left-to-right order it visits those AST
//! nodes (see `analysis.rs`'s `analyze_block`/`analyze_stmt`). Nothing on
//! the AST records which `ScopeId` got created for which node, so a second
//! traversal that visits statements in the same order can recover the
//! matching id by walking `ScopeArena::children_in_order` with a cursor:
//! pop the next child every time emission reaches a node kind that the
//! analyzer would have opened a scope for.
use kushc_sem::scope::{ScopeArena, ScopeId};

pub struct ScopeCursor {
    children: std::vec::IntoIter<ScopeId>,
}

impl ScopeCursor {
    pub fn new(scopes: &ScopeArena, parent: ScopeId) -> Self {
        ScopeCursor {
            children: scopes.children_in_order(parent).into_iter(),
        }
    }

    /// Advances to the next child scope in creation order. Panics if the
    /// emitter's traversal visited a scope-opening node the analyzer
    /// didn't — which would mean the two passes have drifted out of sync.
    pub fn next(&mut self) -> ScopeId {
        self.children
            .next()
            .expect("emitter scope walk desynced from analyzer scope tree")
    }
}
