//! A second, diagnostic-free pass over expression types.
//!
//! `kushc-sem::Analyzer` already computed every expression's type once,
//! but it reports that type as a transient return value of its recursive
//! walk rather than attaching it to the AST (spec.md's AST has no slot
//! for one — see `kushc-par::ast`'s module docs on no back-pointers).
//! Emission needs a handful of those types back (an array literal's
//! element type, a `let`/`var` declaration's inferred type, whether `**`
//! should lower to an integer or floating-point power call), so this
//! module re-derives them from the same `ScopeArena` the analyzer built,
//! grounded directly on `kushc-sem::analysis::Analyzer::analyze_expr` and
//! its helpers. Every diagnostic branch from that original pass is
//! dropped here: by the time emission runs the driver has already
//! confirmed the handler reported no errors, so every expression this
//! module is asked about is well-typed.

use kushc_lex::TokenKind;
use kushc_par::ast::*;
use kushc_sem::scope::{ScopeArena, ScopeId, SymbolKind};
use kushc_sem::types::Type;
use kushc_util::Symbol;

pub fn infer_expr(scopes: &ScopeArena, root: ScopeId, scope: ScopeId, expr: &Expr) -> Type {
    match expr {
        Expr::Assignment(e) => infer_expr(scopes, root, scope, &e.target),
        Expr::Conditional(e) => {
            let then_ty = infer_expr(scopes, root, scope, &e.then_expr);
            if then_ty.is_unknown() {
                infer_expr(scopes, root, scope, &e.else_expr)
            } else {
                then_ty
            }
        }
        Expr::Binary(e) => infer_binary(scopes, root, scope, e),
        Expr::Unary(e) => match e.op {
            UnaryOp::Bang => Type::Boolean,
            _ => infer_expr(scopes, root, scope, &e.operand),
        },
        Expr::Postfix(e) => infer_postfix(scopes, root, scope, e),
        Expr::New(e) => Type::Structure(e.type_name),
        Expr::ArrayLiteral(e) => {
            let element_ty = e
                .elements
                .iter()
                .map(|el| infer_expr(scopes, root, scope, el))
                .find(|ty| !ty.is_unknown())
                .unwrap_or(Type::Unknown);
            Type::Array {
                base: Box::new(element_ty),
                dims: 1,
            }
        }
        Expr::Initializer(_) => Type::Unknown,
    }
}

fn infer_binary(scopes: &ScopeArena, root: ScopeId, scope: ScopeId, expr: &BinaryExpr) -> Type {
    match expr.level {
        BinaryLevel::LogicalOr
        | BinaryLevel::LogicalAnd
        | BinaryLevel::Equality
        | BinaryLevel::Relational => Type::Boolean,
        _ => {
            let left = infer_expr(scopes, root, scope, &expr.left);
            if !left.is_unknown() {
                return left;
            }
            expr.others
                .last()
                .map(|(_, rhs)| infer_expr(scopes, root, scope, rhs))
                .unwrap_or(Type::Unknown)
        }
    }
}

fn infer_postfix(scopes: &ScopeArena, root: ScopeId, scope: ScopeId, expr: &PostfixExpr) -> Type {
    if let (Primary::Terminal(tok), Some((PostfixPart::Call(_, _), rest))) =
        (&expr.primary, expr.parts.split_first())
    {
        if tok.kind == TokenKind::Identifier {
            let name = Symbol::intern(&tok.text);
            if let Some(id) = scopes.resolve(scope, name) {
                if let SymbolKind::Function { ret, .. } = scopes.symbol(id).kind.unwrap_external() {
                    let mut current = ret.clone();
                    for part in rest {
                        current = infer_postfix_part(scopes, root, scope, current, part);
                    }
                    return current;
                }
            }
        }
    }

    let mut current = infer_primary(scopes, root, scope, &expr.primary);
    for part in &expr.parts {
        current = infer_postfix_part(scopes, root, scope, current, part);
    }
    current
}

fn infer_postfix_part(
    scopes: &ScopeArena,
    root: ScopeId,
    scope: ScopeId,
    current: Type,
    part: &PostfixPart,
) -> Type {
    match part {
        PostfixPart::Subscript(_, _) => match &current {
            Type::Array { base, dims } if *dims > 1 => Type::Array {
                base: base.clone(),
                dims: dims - 1,
            },
            Type::Array { base, .. } => (**base).clone(),
            Type::String => Type::Integer {
                signed: false,
                size: 1,
            },
            _ => Type::Unknown,
        },
        PostfixPart::Call(_, _) => Type::Unknown,
        PostfixPart::Member(name, _) => resolve_member_type(scopes, root, &current, *name),
        // These are inferred already at the surrounding `infer_postfix`
        // call site's special-case; reachable only if a call ever
        // appears after the first postfix part, which the grammar never
        // produces on an already-resolved function value.
    }
}

fn resolve_member_type(scopes: &ScopeArena, root: ScopeId, ty: &Type, name: Symbol) -> Type {
    let Type::Structure(struct_name) = ty else {
        return Type::Unknown;
    };
    let Some(struct_id) = scopes.resolve(root, *struct_name) else {
        return Type::Unknown;
    };
    let SymbolKind::Structure { scope, .. } = scopes.symbol(struct_id).kind.unwrap_external() else {
        return Type::Unknown;
    };
    match scopes.resolve_member(*scope, name) {
        Some(field_id) => scopes.symbol(field_id).kind.value_type().unwrap_or(Type::Unknown),
        None => Type::Unknown,
    }
}

fn infer_primary(scopes: &ScopeArena, root: ScopeId, scope: ScopeId, primary: &Primary) -> Type {
    match primary {
        Primary::Nested(inner) => infer_expr(scopes, root, scope, inner),
        Primary::Terminal(tok) => match tok.kind {
            TokenKind::Identifier => {
                let name = Symbol::intern(&tok.text);
                scopes
                    .resolve(scope, name)
                    .map(|id| scopes.symbol(id).kind.value_type().unwrap_or(Type::Unknown))
                    .unwrap_or(Type::Unknown)
            }
            TokenKind::IntegerLiteral => Type::default_integer(),
            TokenKind::FloatingPointLiteral => Type::default_decimal(),
            TokenKind::StringLiteral => Type::String,
            TokenKind::KeywordTrue | TokenKind::KeywordFalse => Type::Boolean,
            TokenKind::KeywordNull => Type::Null,
            _ => Type::Unknown,
        },
    }
}
