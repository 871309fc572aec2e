//! Expression lowering: Kush `Expr` nodes to C expression text.
//!
//! Most binary/unary operator spellings are copied straight from the
//! token that produced them (`Token::text`), since Kush's operator set
//! matches C's except for two gaps C has no native spelling for: `**`
//! (exponentiation) and `>>>` (Kush's distinct unsigned right shift).
//! Both are resolved as documented limitations rather than solved in
//! full generality — see `kush_ipow` in `prelude.rs` for the first, and
//! the `>>`-collapse below for the second (C's own `>>` on a signed
//! operand is implementation-defined, same as it always was).
//!
//! A structure value is always a C pointer (see `types.rs`), so
//! `PostfixPart::Member` always lowers to `->`; the analyzer already
//! rejected member access on anything that isn't a structure, so no
//! further type inspection is needed at that access site.

use std::cell::RefCell;

use kushc_lex::{Token, TokenKind};
use kushc_par::ast::*;
use kushc_sem::scope::{ScopeArena, ScopeId, SymbolKind};
use kushc_sem::types::Type;
use kushc_util::{FxHashSet, Symbol};

use crate::error::{EmitError, EmitResult};
use crate::infer::infer_expr;
use crate::types::c_type_of;

/// A declaration from another compilation unit (resolved through an
/// `import`) that this module's C text needs a forward declaration for —
/// spec.md §4.8's "every function called has a prior prototype" and
/// "every structure referenced ... has a prior forward typedef" extend
/// across the module boundary the same way they do within one file.
#[derive(Debug, Clone)]
pub enum ExternItem {
    Function {
        name: Symbol,
        params: Vec<Type>,
        variadic: Option<Type>,
        ret: Type,
    },
    Structure {
        name: Symbol,
        fields: Vec<(Symbol, Type)>,
    },
}

/// Shared read-only context threaded through every emission call, plus
/// the one piece of write state: the set of imported declarations this
/// module actually touched, discovered lazily as emission walks calls
/// and `new` expressions (see `note_external_*` below).
pub struct Ctx<'a> {
    pub scopes: &'a ScopeArena,
    pub root: ScopeId,
    pub module: &'a Module,
    externs: RefCell<Vec<ExternItem>>,
    seen_externs: RefCell<FxHashSet<Symbol>>,
}

impl<'a> Ctx<'a> {
    pub fn new(scopes: &'a ScopeArena, root: ScopeId, module: &'a Module) -> Self {
        Ctx {
            scopes,
            root,
            module,
            externs: RefCell::new(Vec::new()),
            seen_externs: RefCell::new(FxHashSet::default()),
        }
    }

    pub fn into_externs(self) -> Vec<ExternItem> {
        self.externs.into_inner()
    }

    fn note_external_function(&self, name: Symbol, params: Vec<Type>, variadic: Option<Type>, ret: Type) {
        if self.seen_externs.borrow_mut().insert(name) {
            self.externs
                .borrow_mut()
                .push(ExternItem::Function { name, params, variadic, ret });
        }
    }

    fn note_external_structure(&self, name: Symbol, fields: Vec<(Symbol, Type)>) {
        if self.seen_externs.borrow_mut().insert(name) {
            self.externs.borrow_mut().push(ExternItem::Structure { name, fields });
        }
    }
}

/// `expected` is only consulted by the one expression form whose C
/// lowering depends on context: a brace initializer has no type of its
/// own (`analyze_initializer` always returns `Type::Unknown`), so the
/// emitter must be told, or must guess from the field names used, which
/// structure it is constructing.
pub fn emit_expr(ctx: &Ctx, scope: ScopeId, expected: Option<&Type>, expr: &Expr) -> EmitResult<String> {
    match expr {
        Expr::Assignment(e) => emit_assignment(ctx, scope, e),
        Expr::Conditional(e) => {
            let cond = emit_expr(ctx, scope, None, &e.cond)?;
            let then_expr = emit_expr(ctx, scope, expected, &e.then_expr)?;
            let else_expr = emit_expr(ctx, scope, expected, &e.else_expr)?;
            Ok(format!("({} ? {} : {})", cond, then_expr, else_expr))
        }
        Expr::Binary(e) => emit_binary(ctx, scope, e),
        Expr::Unary(e) => {
            let operand = emit_expr(ctx, scope, None, &e.operand)?;
            Ok(format!("({}{})", unary_op_text(e.op), operand))
        }
        Expr::Postfix(e) => emit_postfix(ctx, scope, e),
        Expr::New(e) => emit_new(ctx, scope, e),
        Expr::ArrayLiteral(e) => emit_array_literal(ctx, scope, expected, e),
        Expr::Initializer(e) => emit_initializer(ctx, scope, expected, e),
    }
}

fn emit_assignment(ctx: &Ctx, scope: ScopeId, expr: &AssignmentExpr) -> EmitResult<String> {
    let target_ty = infer_expr(ctx.scopes, ctx.root, scope, &expr.target);
    let target = emit_expr(ctx, scope, None, &expr.target)?;
    let value = emit_expr(ctx, scope, Some(&target_ty), &expr.value)?;

    if matches!(expr.op, AssignOp::Star2) {
        let value_ty = infer_expr(ctx.scopes, ctx.root, scope, &expr.value);
        let helper = if target_ty.is_decimal() || value_ty.is_decimal() {
            "pow"
        } else {
            "kush_ipow"
        };
        return Ok(format!("{} = {}({}, {})", target, helper, target, value));
    }

    Ok(format!("{} {} {}", target, assign_op_text(expr.op), value))
}

fn assign_op_text(op: AssignOp) -> &'static str {
    match op {
        AssignOp::Assign => "=",
        AssignOp::Percent => "%=",
        AssignOp::Amp => "&=",
        AssignOp::Star => "*=",
        AssignOp::Plus => "+=",
        AssignOp::Minus => "-=",
        AssignOp::LShift => "<<=",
        AssignOp::RShift => ">>=",
        AssignOp::RShift3 => ">>=",
        AssignOp::Pipe => "|=",
        AssignOp::Caret => "^=",
        AssignOp::Slash => "/=",
        AssignOp::Star2 => unreachable!("Star2 lowers via kush_ipow/pow above, never as a C compound operator"),
    }
}

fn unary_op_text(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Plus => "+",
        UnaryOp::Minus => "-",
        UnaryOp::Tilde => "~",
        UnaryOp::Bang => "!",
    }
}

fn emit_binary(ctx: &Ctx, scope: ScopeId, expr: &BinaryExpr) -> EmitResult<String> {
    let mut text = emit_expr(ctx, scope, None, &expr.left)?;
    for (tok, rhs) in &expr.others {
        let rhs_text = emit_expr(ctx, scope, None, rhs)?;
        text = format!("{} {} {}", text, binary_op_text(tok), rhs_text);
    }
    Ok(format!("({})", text))
}

/// `>>>` has no native C spelling; it collapses onto `>>`, same as its
/// compound-assignment counterpart in `assign_op_text`.
fn binary_op_text(tok: &Token) -> String {
    if tok.kind == TokenKind::RAngle3 {
        ">>".to_string()
    } else {
        tok.text.clone()
    }
}

fn emit_postfix(ctx: &Ctx, scope: ScopeId, expr: &PostfixExpr) -> EmitResult<String> {
    if let (Primary::Terminal(tok), Some((PostfixPart::Call(args, _), rest))) =
        (&expr.primary, expr.parts.split_first())
    {
        if tok.kind == TokenKind::Identifier {
            let name = Symbol::intern(&tok.text);
            if let Some(fn_id) = ctx.scopes.resolve(scope, name) {
                if ctx.scopes.symbol(fn_id).kind.is_function() {
                    let mut text = emit_call(ctx, scope, fn_id, name, args)?;
                    for part in rest {
                        text = emit_postfix_part(ctx, scope, text, part)?;
                    }
                    return Ok(text);
                }
            }
        }
    }

    let mut text = emit_primary(ctx, scope, &expr.primary)?;
    for part in &expr.parts {
        text = emit_postfix_part(ctx, scope, text, part)?;
    }
    Ok(text)
}

/// Matches the exact function the analyzer resolved and validated a call
/// against (`scopes.resolve`, which returns the first binding under that
/// name reachable from `scope`), then mangles it by that binding's
/// position among its overload siblings so the emitted call targets the
/// same declaration, never a best-argument-match across overloads.
fn emit_call(
    ctx: &Ctx,
    scope: ScopeId,
    fn_id: kushc_util::SymbolId,
    name: Symbol,
    args: &[Expr],
) -> EmitResult<String> {
    let symbol = ctx.scopes.symbol(fn_id);
    let (params, variadic, ret) = match symbol.kind.unwrap_external() {
        SymbolKind::Function { params, variadic, ret, .. } => (params.clone(), variadic.clone(), ret.clone()),
        _ => return Err(EmitError::Internal(format!("{} resolved to a non-function symbol", name.as_str()))),
    };
    if matches!(symbol.kind, SymbolKind::External { .. }) {
        ctx.note_external_function(name, params.clone(), variadic, ret);
    }

    let mangled = mangled_function_name(ctx, fn_id, name);

    let mut parts = Vec::with_capacity(args.len());
    for (i, arg) in args.iter().enumerate() {
        let expected = params.get(i);
        parts.push(emit_expr(ctx, scope, expected, arg)?);
    }
    Ok(format!("{}({})", mangled, parts.join(", ")))
}

/// Mangles an overloaded function's C name by its position among same-name
/// siblings declared in `scope` (module scope for a module-local function,
/// or the root scope for an extern one), so a call always targets the exact
/// overload the analyzer resolved it against rather than a best-fit match.
pub fn mangled_function_name(ctx: &Ctx, fn_id: kushc_util::SymbolId, name: Symbol) -> String {
    let declaring_scope = ctx.scopes.symbol(fn_id).scope;
    let overloads = ctx.scopes.overloads_local(declaring_scope, name);
    if overloads.len() > 1 {
        let idx = overloads.iter().position(|id| *id == fn_id).unwrap_or(0);
        format!("{}_{}", name.as_str(), idx)
    } else {
        name.as_str().to_string()
    }
}

fn emit_postfix_part(ctx: &Ctx, scope: ScopeId, current: String, part: &PostfixPart) -> EmitResult<String> {
    match part {
        PostfixPart::Subscript(index, _) => {
            let index_text = emit_expr(ctx, scope, None, index)?;
            Ok(format!("{}[{}]", current, index_text))
        }
        PostfixPart::Call(args, _) => {
            let mut parts = Vec::with_capacity(args.len());
            for arg in args {
                parts.push(emit_expr(ctx, scope, None, arg)?);
            }
            Ok(format!("{}({})", current, parts.join(", ")))
        }
        PostfixPart::Member(name, _) => Ok(format!("{}->{}", current, name.as_str())),
    }
}

fn emit_primary(ctx: &Ctx, scope: ScopeId, primary: &Primary) -> EmitResult<String> {
    match primary {
        Primary::Nested(inner) => {
            let text = emit_expr(ctx, scope, None, inner)?;
            Ok(format!("({})", text))
        }
        Primary::Terminal(tok) => Ok(match tok.kind {
            TokenKind::IntegerLiteral => normalize_integer_literal(&tok.text),
            TokenKind::KeywordNull => "NULL".to_string(),
            _ => tok.text.clone(),
        }),
    }
}

/// Kush integers allow `_` digit separators and `0o`/`0b` prefixes C99
/// doesn't accept; both are rewritten here so the literal text drops in
/// as valid C. Decimal and `0x` literals pass through unchanged — C and
/// Kush agree on both spellings (modulo the stripped separators).
fn normalize_integer_literal(text: &str) -> String {
    let stripped: String = text.chars().filter(|c| *c != '_').collect();
    if let Some(rest) = stripped.strip_prefix("0o").or_else(|| stripped.strip_prefix("0O")) {
        return format!("0{}", rest);
    }
    if let Some(rest) = stripped.strip_prefix("0b").or_else(|| stripped.strip_prefix("0B")) {
        let value = u64::from_str_radix(rest, 2).unwrap_or(0);
        return value.to_string();
    }
    stripped
}

fn emit_new(ctx: &Ctx, scope: ScopeId, expr: &NewExpr) -> EmitResult<String> {
    let struct_id = ctx
        .scopes
        .resolve(ctx.root, expr.type_name)
        .ok_or_else(|| EmitError::Internal(format!("undeclared structure {}", expr.type_name.as_str())))?;
    let symbol = ctx.scopes.symbol(struct_id);
    let fields = match symbol.kind.unwrap_external() {
        SymbolKind::Structure { fields, .. } => fields.clone(),
        _ => return Err(EmitError::Internal(format!("{} is not a structure", expr.type_name.as_str()))),
    };
    if matches!(symbol.kind, SymbolKind::External { .. }) {
        ctx.note_external_structure(expr.type_name, fields.clone());
    }

    let mut parts = Vec::with_capacity(expr.args.len());
    for (i, arg) in expr.args.iter().enumerate() {
        let expected = fields.get(i).map(|(_, ty)| ty);
        parts.push(emit_expr(ctx, scope, expected, arg)?);
    }
    Ok(format!("{}_new({})", expr.type_name.as_str(), parts.join(", ")))
}

fn emit_array_literal(ctx: &Ctx, scope: ScopeId, expected: Option<&Type>, expr: &ArrayLiteralExpr) -> EmitResult<String> {
    let base_ty = match expected {
        Some(Type::Array { base, .. }) => (**base).clone(),
        _ => expr
            .elements
            .iter()
            .map(|el| infer_expr(ctx.scopes, ctx.root, scope, el))
            .find(|ty| !ty.is_unknown())
            .unwrap_or(Type::Unknown),
    };
    let element_c_ty = c_type_of(&base_ty);

    let mut parts = Vec::with_capacity(expr.elements.len());
    for el in &expr.elements {
        parts.push(emit_expr(ctx, scope, Some(&base_ty), el)?);
    }
    Ok(format!("({}[]){{{}}}", element_c_ty, parts.join(", ")))
}

/// A brace initializer carries no type of its own, so the structure it
/// constructs comes from `expected` when the surrounding declaration
/// supplies one, falling back to the unique declared structure whose
/// field-name set matches the entries exactly.
fn emit_initializer(ctx: &Ctx, scope: ScopeId, expected: Option<&Type>, expr: &InitializerExpr) -> EmitResult<String> {
    let struct_name = match expected {
        Some(Type::Structure(name)) => *name,
        _ => find_matching_structure(ctx.module, expr)?,
    };

    let structure = ctx
        .module
        .structures
        .iter()
        .find(|s| s.name == struct_name)
        .ok_or_else(|| EmitError::Internal(format!("no structure named {}", struct_name.as_str())))?;

    let mut parts = Vec::with_capacity(structure.fields.len());
    for field in &structure.fields {
        let entry = expr
            .entries
            .iter()
            .find(|(name, _, _)| *name == field.name)
            .ok_or_else(|| EmitError::Internal(format!("initializer is missing field {}", field.name.as_str())))?;
        parts.push(emit_expr(ctx, scope, None, &entry.2)?);
    }
    Ok(format!("{}_new({})", struct_name.as_str(), parts.join(", ")))
}

fn find_matching_structure(module: &Module, expr: &InitializerExpr) -> EmitResult<Symbol> {
    let entry_names: Vec<Symbol> = expr.entries.iter().map(|(name, _, _)| *name).collect();
    let mut matches = module.structures.iter().filter(|s| {
        s.fields.len() == entry_names.len() && s.fields.iter().all(|f| entry_names.contains(&f.name))
    });
    let first = matches.next().ok_or_else(|| {
        EmitError::Internal("brace initializer matches no declared structure's field set".to_string())
    })?;
    if matches.next().is_some() {
        return Err(EmitError::Internal(
            "brace initializer's field set is ambiguous between multiple structures".to_string(),
        ));
    }
    Ok(first.name)
}
