//! Nested lexical scopes and the symbol table they carry.
//!
//! Grounded in the teacher's `Rib`/`RibId`/`ScopeTree` pattern
//! (`faxc-sem/src/scope.rs`), renamed to spec.md's vocabulary
//! (`Scope`/`ScopeId`/`Symbol`) and generalized with the `external` alias
//! kind spec.md §4.5 requires for module-loader imports, which the teacher
//! has no counterpart for.
//!
//! Scopes and symbols both live in arenas (`IndexVec`) rather than behind
//! raw pointers, per spec.md §9's "never raw back-pointers" guidance; a
//! `Scope`'s parent and a `Symbol`'s declaring scope are both plain
//! `ScopeId`/indices.

use kushc_util::{FxHashMap, Idx, IndexVec, Symbol, SymbolId};

use crate::types::Type;

/// Identifies a scope within one compilation's `ScopeArena`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(pub u32);

impl Idx for ScopeId {
    fn from_usize(idx: usize) -> Self {
        ScopeId(idx as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The syntactic region a scope was opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    CompilationUnit,
    Structure,
    Function,
    Local,
}

/// A single lexical scope: a hashed symbol table plus a parent link.
/// Scopes form a tree rooted at the compilation-unit scope; the parent
/// chain is acyclic by construction (every scope is created by the
/// analyzer walking down into nested syntax, never sideways).
#[derive(Debug)]
pub struct Scope {
    pub name: Option<Symbol>,
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// Usually one entry per name; functions may carry several when
    /// overloaded by parameter signature (spec.md's `DUPLICATE_FUNCTION_OVERLOAD`
    /// only fires when two signatures collide, implying distinct ones coexist).
    members: FxHashMap<Symbol, Vec<SymbolId>>,
    next_ticket: u32,
    /// The symbol (function or structure) that owns this scope, if any.
    pub owner: Option<SymbolId>,
}

impl Scope {
    fn new(name: Option<Symbol>, kind: ScopeKind, parent: Option<ScopeId>, owner: Option<SymbolId>) -> Self {
        Self {
            name,
            kind,
            parent,
            members: FxHashMap::default(),
            next_ticket: 0,
            owner,
        }
    }

    /// The first (or only) binding for `name`, if any.
    pub fn lookup_local(&self, name: Symbol) -> Option<SymbolId> {
        self.members.get(&name).and_then(|v| v.first().copied())
    }

    /// Every binding declared under `name` in this scope — length 1 for
    /// every kind except an overloaded function name.
    pub fn lookup_local_all(&self, name: Symbol) -> &[SymbolId] {
        self.members.get(&name).map(Vec::as_slice).unwrap_or(&[])
    }

    fn reserve_ticket(&mut self) -> u32 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }
}

/// A bitset of modifiers carried on a declared symbol. Plain `u8` flags
/// rather than a `bitflags`-crate type — the teacher's own modifier sets
/// (`faxc-sem`'s `FnFlags`-equivalents) are hand-rolled the same way, and
/// four bits do not earn a new dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers(pub u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    /// Declared with `let` (or otherwise immutable after initialization).
    pub const CONST: Modifiers = Modifiers(1 << 0);
    /// Declared via a module import, aliasing a symbol this compilation
    /// unit does not itself define.
    pub const EXTERNAL: Modifiers = Modifiers(1 << 1);
    /// The trailing `... T rest` parameter of a function.
    pub const VARIADIC: Modifiers = Modifiers(1 << 2);
    /// `native` keyword: body supplied by the linked runtime, not emitted.
    pub const NATIVE: Modifiers = Modifiers(1 << 3);

    pub fn contains(self, flag: Modifiers) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub fn with(self, flag: Modifiers) -> Modifiers {
        Modifiers(self.0 | flag.0)
    }
}

/// The declaration category of a symbol, with the data the analyzer and
/// emitter need once the symbol is resolved. Spec.md's "a symbol may be
/// consulted polymorphically: lookups return the symbol; the caller
/// inspects its tag before use" maps directly onto matching this enum.
#[derive(Debug, Clone)]
pub enum SymbolKind {
    Variable { ty: Type },
    Constant { ty: Type },
    Function {
        params: Vec<Type>,
        variadic: Option<Type>,
        ret: Type,
        /// Scope containing this function's parameters and body locals.
        scope: ScopeId,
    },
    Structure {
        fields: Vec<(Symbol, Type)>,
        /// Scope used for member-access lookups on values of this type.
        scope: ScopeId,
    },
    Label,
    /// An external alias: a symbol resolved from an imported `.am`
    /// module. Wraps the real declaration's kind so the resolver can
    /// return the alias directly while still letting callers match on
    /// the underlying category with one deref (spec.md §4.5).
    External {
        inner: Box<SymbolKind>,
        module: Symbol,
    },
}

impl SymbolKind {
    /// Unwraps through an `External` alias to the real declaration kind.
    pub fn unwrap_external(&self) -> &SymbolKind {
        match self {
            SymbolKind::External { inner, .. } => inner.unwrap_external(),
            other => other,
        }
    }

    pub fn is_structure(&self) -> bool {
        matches!(self.unwrap_external(), SymbolKind::Structure { .. })
    }

    pub fn is_function(&self) -> bool {
        matches!(self.unwrap_external(), SymbolKind::Function { .. })
    }

    /// The value type this symbol has when referenced as a primary
    /// expression. Functions have no value type (see `types.rs` module
    /// docs); callers must special-case `Function` before calling this.
    pub fn value_type(&self) -> Option<Type> {
        match self.unwrap_external() {
            SymbolKind::Variable { ty } | SymbolKind::Constant { ty } => Some(ty.clone()),
            SymbolKind::Structure { .. } => None,
            SymbolKind::Function { .. } => None,
            SymbolKind::Label => None,
            SymbolKind::External { .. } => unreachable!("unwrap_external already recurses"),
        }
    }

    /// Whether an assignment may target a symbol of this kind (part of
    /// the l-value/placeholder rule, spec.md §4.6).
    pub fn is_assignable(&self) -> bool {
        matches!(
            self.unwrap_external(),
            SymbolKind::Variable { .. }
        )
    }

    /// Two function declarations overload cleanly unless their parameter
    /// lists (including variadic tail) match exactly — that collision is
    /// `DUPLICATE_FUNCTION_OVERLOAD`, not an ordinary redeclaration.
    pub fn has_same_signature_as(&self, other: &SymbolKind) -> bool {
        match (self.unwrap_external(), other.unwrap_external()) {
            (
                SymbolKind::Function { params: p1, variadic: v1, .. },
                SymbolKind::Function { params: p2, variadic: v2, .. },
            ) => p1 == p2 && v1 == v2,
            _ => false,
        }
    }
}

/// A declared name: identity (name/ticket) plus its category and
/// modifiers. This is spec.md §3 "Symbol".
#[derive(Debug, Clone)]
pub struct SymbolData {
    pub name: Symbol,
    pub ticket: u32,
    pub modifiers: Modifiers,
    pub kind: SymbolKind,
    pub scope: ScopeId,
}

impl SymbolData {
    pub fn name_size(&self) -> usize {
        self.name.len()
    }
}

/// Why a redeclaration was rejected, one of the seven kinds spec.md §7
/// distinguishes (plus an eighth, `Structure`, this implementation adds
/// for completeness — the closed diagnostic taxonomy otherwise had no
/// code for a structure name colliding with another top-level name).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeclarationKind {
    Function,
    Parameter,
    VariadicParameter,
    Variable,
    Constant,
    Label,
    LoopParameter,
    Structure,
}

/// The result of a rejected `declare()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclareConflict {
    /// A plain name clash; the caller picks a `RedeclarationKind` from
    /// the kind it was trying to declare and reports `E_SEM_REDECLARATION_*`.
    Redeclaration(SymbolId),
    /// Two function declarations share an identical parameter signature —
    /// `E_SEM_DUPLICATE_FUNCTION_OVERLOAD`.
    DuplicateOverload(SymbolId),
}

/// Owns every scope and every symbol created during one analysis run.
/// A single `ScopeArena` is built per compilation unit; it is never
/// shared across compilations (spec.md §9 "error list sharing" applies
/// equally here — no process-global symbol table).
#[derive(Debug, Default)]
pub struct ScopeArena {
    scopes: IndexVec<ScopeId, Scope>,
    symbols: IndexVec<SymbolId, SymbolData>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_scope(
        &mut self,
        name: Option<Symbol>,
        kind: ScopeKind,
        parent: Option<ScopeId>,
        owner: Option<SymbolId>,
    ) -> ScopeId {
        self.scopes.push(Scope::new(name, kind, parent, owner))
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        self.scopes.get(id).expect("ScopeId always refers to a live scope")
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        self.scopes
            .get_mut(id)
            .expect("ScopeId always refers to a live scope")
    }

    pub fn symbol(&self, id: SymbolId) -> &SymbolData {
        self.symbols
            .get(id)
            .expect("SymbolId always refers to a live symbol")
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut SymbolData {
        self.symbols
            .get_mut(id)
            .expect("SymbolId always refers to a live symbol")
    }

    /// Declares `name` in `scope`. On success, returns the new
    /// `SymbolId`. On collision, classifies the conflict: two functions
    /// with distinct signatures overload rather than collide, so only a
    /// matching signature (or a non-function participant) is rejected.
    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: Symbol,
        modifiers: Modifiers,
        kind: SymbolKind,
    ) -> Result<SymbolId, DeclareConflict> {
        let existing = self.scope(scope).lookup_local_all(name).to_vec();
        if !existing.is_empty() {
            let new_is_function = kind.is_function();
            let all_existing_functions = existing.iter().all(|id| self.symbol(*id).kind.is_function());
            if new_is_function && all_existing_functions {
                if let Some(clash) = existing
                    .iter()
                    .copied()
                    .find(|id| self.symbol(*id).kind.has_same_signature_as(&kind))
                {
                    return Err(DeclareConflict::DuplicateOverload(clash));
                }
                // Distinct signature: falls through and is added as a new overload.
            } else {
                return Err(DeclareConflict::Redeclaration(existing[0]));
            }
        }
        let ticket = self.scope_mut(scope).reserve_ticket();
        let id = self.symbols.push(SymbolData {
            name,
            ticket,
            modifiers,
            kind,
            scope,
        });
        self.scope_mut(scope)
            .members
            .entry(name)
            .or_default()
            .push(id);
        Ok(id)
    }

    /// Every overload declared under `name` directly in `scope` (no walk
    /// up the parent chain) — used when resolving a call against a set
    /// of candidate signatures.
    pub fn overloads_local(&self, scope: ScopeId, name: Symbol) -> &[SymbolId] {
        self.scope(scope).lookup_local_all(name)
    }

    /// Walks the parent chain starting at `scope`, returning the first
    /// symbol named `name` found. Terminates because the parent chain is
    /// acyclic and ends at the compilation-unit scope (spec.md §3 "Scope"
    /// invariant).
    pub fn resolve(&self, scope: ScopeId, name: Symbol) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(sym) = self.scope(id).lookup_local(name) {
                return Some(sym);
            }
            current = self.scope(id).parent;
        }
        None
    }

    /// Resolves a member name within a structure's own scope only (no
    /// walk up the lexical parent chain) — spec.md §4.5's "dedicated
    /// routine" for structure/class scopes, degenerate here since Kush
    /// structures have no superclass chain to continue into.
    pub fn resolve_member(&self, structure_scope: ScopeId, name: Symbol) -> Option<SymbolId> {
        self.scope(structure_scope).lookup_local(name)
    }

    /// Every scope directly nested under `parent`, in creation order.
    /// `kushc-emit` uses this to re-walk the same block/for/catch scopes
    /// the analyzer opened, without the AST carrying scope ids itself.
    pub fn children_in_order(&self, parent: ScopeId) -> Vec<ScopeId> {
        self.scopes
            .iter_enumerated()
            .filter(|(_, scope)| scope.parent == Some(parent))
            .map(|(id, _)| id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_walks_parent_chain() {
        let mut arena = ScopeArena::new();
        let root = arena.create_scope(None, ScopeKind::CompilationUnit, None, None);
        let child = arena.create_scope(None, ScopeKind::Function, Some(root), None);

        let x = Symbol::intern("x");
        arena
            .declare(root, x, Modifiers::NONE, SymbolKind::Variable { ty: Type::Boolean })
            .unwrap();

        assert_eq!(arena.resolve(child, x), arena.scope(root).lookup_local(x));
    }

    #[test]
    fn redeclaration_in_same_scope_is_reported_as_existing() {
        let mut arena = ScopeArena::new();
        let root = arena.create_scope(None, ScopeKind::CompilationUnit, None, None);
        let x = Symbol::intern("x");
        let first = arena
            .declare(root, x, Modifiers::NONE, SymbolKind::Variable { ty: Type::Boolean })
            .unwrap();
        let second = arena.declare(root, x, Modifiers::NONE, SymbolKind::Variable { ty: Type::Boolean });
        assert_eq!(second, Err(DeclareConflict::Redeclaration(first)));
    }

    #[test]
    fn functions_overload_by_distinct_signature() {
        let mut arena = ScopeArena::new();
        let root = arena.create_scope(None, ScopeKind::CompilationUnit, None, None);
        let f = Symbol::intern("f");
        let inner_scope = arena.create_scope(None, ScopeKind::Function, Some(root), None);
        arena
            .declare(
                root,
                f,
                Modifiers::NONE,
                SymbolKind::Function {
                    params: vec![Type::Boolean],
                    variadic: None,
                    ret: Type::Void,
                    scope: inner_scope,
                },
            )
            .unwrap();
        let second = arena.declare(
            root,
            f,
            Modifiers::NONE,
            SymbolKind::Function {
                params: vec![Type::default_integer()],
                variadic: None,
                ret: Type::Void,
                scope: inner_scope,
            },
        );
        assert!(second.is_ok());
        assert_eq!(arena.overloads_local(root, f).len(), 2);
    }

    #[test]
    fn identical_function_signatures_are_duplicate_overloads() {
        let mut arena = ScopeArena::new();
        let root = arena.create_scope(None, ScopeKind::CompilationUnit, None, None);
        let f = Symbol::intern("f");
        let inner_scope = arena.create_scope(None, ScopeKind::Function, Some(root), None);
        let make_fn = || SymbolKind::Function {
            params: vec![Type::Boolean],
            variadic: None,
            ret: Type::Void,
            scope: inner_scope,
        };
        let first = arena.declare(root, f, Modifiers::NONE, make_fn()).unwrap();
        let second = arena.declare(root, f, Modifiers::NONE, make_fn());
        assert_eq!(second, Err(DeclareConflict::DuplicateOverload(first)));
    }

    #[test]
    fn shadowing_in_a_nested_scope_is_allowed() {
        let mut arena = ScopeArena::new();
        let root = arena.create_scope(None, ScopeKind::CompilationUnit, None, None);
        let child = arena.create_scope(None, ScopeKind::Local, Some(root), None);
        let x = Symbol::intern("x");
        arena
            .declare(root, x, Modifiers::NONE, SymbolKind::Variable { ty: Type::Boolean })
            .unwrap();
        assert!(arena
            .declare(child, x, Modifiers::NONE, SymbolKind::Variable { ty: Type::Boolean })
            .is_ok());
    }

    #[test]
    fn external_symbol_unwraps_to_real_kind() {
        let aliased = SymbolKind::Function {
            params: vec![],
            variadic: None,
            ret: Type::Void,
            scope: ScopeId::from_usize(0),
        };
        let alias = SymbolKind::External {
            inner: Box::new(aliased),
            module: Symbol::intern("kush.core"),
        };
        assert!(alias.is_function());
    }
}
