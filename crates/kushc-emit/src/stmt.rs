//! Statement lowering: Kush `Stmt` nodes to C statement text.
//!
//! Every node that the analyzer opens a `Local` scope for (`Block`,
//! `for`, `catch`) must be visited in exactly the order the analyzer
//! visited it, so this module's recursive walk threads a `ScopeCursor`
//! alongside the AST the same way `analysis.rs`'s `analyze_stmt` threads
//! a `ScopeId` — see `scope_walk.rs`'s module docs for why that's enough
//! to recover the right scope without the AST carrying one itself.
//!
//! `throw`/`try`/`catch` have no C equivalent, so they lower onto
//! `setjmp`/`longjmp` bookkeeping kept in `prelude.rs`'s runtime shim.
//! A `try` with no `catch` (only a `finally`, the grammar's other legal
//! shape) is emitted as a plain sequential block — this emitter does not
//! re-propagate an exception past a finally-only frame, a known gap
//! left for a deeper implementation.

use kushc_par::ast::*;
use kushc_sem::scope::ScopeId;
use kushc_sem::types::Type;

use crate::error::EmitResult;
use crate::expr::{emit_expr, Ctx};
use crate::infer::infer_expr;
use crate::scope_walk::ScopeCursor;
use crate::types::{c_type_of, c_type_of_type_expr, type_of_type_expr};

pub(crate) fn pad(indent: usize) -> String {
    "    ".repeat(indent)
}

/// Emits a function's body. `analyze_function_body` opens exactly one
/// child scope under the function's own scope (the body block's Local
/// scope), so the cursor here only ever yields that single entry.
pub fn emit_function_body(ctx: &Ctx, fn_scope: ScopeId, body: &Block, indent: usize) -> EmitResult<String> {
    let mut cursor = ScopeCursor::new(ctx.scopes, fn_scope);
    emit_block(ctx, &mut cursor, body, indent)
}

/// Emits a braced block, consuming the next child of `cursor` (the Local
/// scope `analyze_block` opened for this exact block) and recursing with
/// a fresh cursor over that scope's own children.
fn emit_block(ctx: &Ctx, cursor: &mut ScopeCursor, block: &Block, indent: usize) -> EmitResult<String> {
    let scope = cursor.next();
    let mut inner = ScopeCursor::new(ctx.scopes, scope);
    let mut lines = Vec::with_capacity(block.statements.len());
    for stmt in &block.statements {
        lines.push(emit_stmt(ctx, scope, &mut inner, stmt, indent + 1)?);
    }
    let body = if lines.is_empty() {
        String::new()
    } else {
        format!("{}\n", lines.join("\n"))
    };
    Ok(format!("{{\n{}{}}}", body, pad(indent)))
}

fn emit_stmt(ctx: &Ctx, scope: ScopeId, cursor: &mut ScopeCursor, stmt: &Stmt, indent: usize) -> EmitResult<String> {
    let p = pad(indent);
    match stmt {
        Stmt::VarDecl(decl) => emit_var_decl(ctx, scope, decl, indent),
        Stmt::If(s) => emit_if(ctx, scope, cursor, s, indent, true),
        Stmt::While(s) => emit_while(ctx, scope, cursor, s, indent),
        Stmt::For(s) => emit_for(ctx, scope, cursor, s, indent),
        Stmt::Return(s) => match &s.value {
            Some(v) => Ok(format!("{}return {};", p, emit_expr(ctx, scope, None, v)?)),
            None => Ok(format!("{}return;", p)),
        },
        Stmt::Break(s) => Ok(match s.label {
            Some(label) => format!("{}goto __{}Exit;", p, label.as_str()),
            None => format!("{}break;", p),
        }),
        Stmt::Throw(s) => {
            let value = emit_expr(ctx, scope, None, &s.value)?;
            Ok(format!("{}kush_throw((void*){});", p, value))
        }
        Stmt::Try(s) => emit_try(ctx, scope, cursor, s, indent),
        Stmt::Block(b) => Ok(format!("{}{}", p, emit_block(ctx, cursor, b, indent)?)),
        Stmt::Expr(e, _) => Ok(format!("{}{};", p, emit_expr(ctx, scope, None, e)?)),
    }
}

fn emit_var_decl(ctx: &Ctx, scope: ScopeId, decl: &VarDeclStmt, indent: usize) -> EmitResult<String> {
    let p = pad(indent);
    let mut lines = Vec::with_capacity(decl.declarators.len());
    for declarator in &decl.declarators {
        let (c_ty, expected) = match &decl.keyword {
            VarDeclKeyword::Typed(type_expr) => {
                (c_type_of_type_expr(type_expr), Some(type_of_type_expr(type_expr)))
            }
            VarDeclKeyword::Let | VarDeclKeyword::Var => {
                let inferred = declarator
                    .init
                    .as_ref()
                    .map(|init| infer_expr(ctx.scopes, ctx.root, scope, init))
                    .unwrap_or(Type::Unknown);
                (c_type_of(&inferred), None)
            }
        };
        let init_text = match &declarator.init {
            Some(init) => format!(" = {}", emit_expr(ctx, scope, expected.as_ref(), init)?),
            None => String::new(),
        };
        lines.push(format!("{}{} {}{};", p, c_ty, declarator.name.as_str(), init_text));
    }
    Ok(lines.join("\n"))
}

fn emit_if(
    ctx: &Ctx,
    scope: ScopeId,
    cursor: &mut ScopeCursor,
    s: &IfStmt,
    indent: usize,
    with_leading_pad: bool,
) -> EmitResult<String> {
    let p = if with_leading_pad { pad(indent) } else { String::new() };
    let cond = emit_expr(ctx, scope, None, &s.cond)?;
    let then_text = emit_block(ctx, cursor, &s.then_branch, indent)?;
    let mut text = format!("{}if ({}) {}", p, cond, then_text);
    if let Some(else_branch) = &s.else_branch {
        text.push_str(" else ");
        match else_branch.as_ref() {
            Stmt::If(inner) => text.push_str(&emit_if(ctx, scope, cursor, inner, indent, false)?),
            Stmt::Block(b) => text.push_str(&emit_block(ctx, cursor, b, indent)?),
            _ => unreachable!("an if's else-branch is always a Block or a nested If"),
        }
    }
    Ok(text)
}

fn emit_while(ctx: &Ctx, scope: ScopeId, cursor: &mut ScopeCursor, s: &WhileStmt, indent: usize) -> EmitResult<String> {
    let p = pad(indent);
    let cond = emit_expr(ctx, scope, None, &s.cond)?;
    let body = emit_block(ctx, cursor, &s.body, indent)?;
    let mut text = format!("{}while ({}) {}", p, cond, body);
    if let Some(label) = s.label {
        text.push_str(&format!("\n{}__{}Exit: ;", p, label.as_str()));
    }
    Ok(text)
}

fn emit_for(ctx: &Ctx, scope: ScopeId, cursor: &mut ScopeCursor, s: &ForStmt, indent: usize) -> EmitResult<String> {
    let p = pad(indent);
    let for_scope = cursor.next();

    let init_text = match &s.init {
        Some(init) => emit_for_init(ctx, for_scope, init)?,
        None => String::new(),
    };
    let cond_text = match &s.cond {
        Some(cond) => emit_expr(ctx, for_scope, None, cond)?,
        None => String::new(),
    };
    let update_text = match &s.update {
        Some(update) => emit_expr(ctx, for_scope, None, update)?,
        None => String::new(),
    };

    let mut body_cursor = ScopeCursor::new(ctx.scopes, for_scope);
    let body_text = emit_block(ctx, &mut body_cursor, &s.body, indent)?;

    let mut text = format!("{}for ({}; {}; {}) {}", p, init_text, cond_text, update_text, body_text);
    if let Some(label) = s.label {
        text.push_str(&format!("\n{}__{}Exit: ;", p, label.as_str()));
    }
    Ok(text)
}

/// The for-header's init clause: always a single-statement var-decl or
/// expression statement (`parse_for_stmt` never produces anything else),
/// emitted inline without its own trailing semicolon or indentation.
fn emit_for_init(ctx: &Ctx, scope: ScopeId, stmt: &Stmt) -> EmitResult<String> {
    match stmt {
        Stmt::Expr(e, _) => emit_expr(ctx, scope, None, e),
        Stmt::VarDecl(decl) => {
            let (c_ty, expected) = match &decl.keyword {
                VarDeclKeyword::Typed(type_expr) => {
                    (c_type_of_type_expr(type_expr), Some(type_of_type_expr(type_expr)))
                }
                VarDeclKeyword::Let | VarDeclKeyword::Var => {
                    let inferred = decl
                        .declarators
                        .first()
                        .and_then(|d| d.init.as_ref())
                        .map(|init| infer_expr(ctx.scopes, ctx.root, scope, init))
                        .unwrap_or(Type::Unknown);
                    (c_type_of(&inferred), None)
                }
            };
            let mut parts = Vec::with_capacity(decl.declarators.len());
            for declarator in &decl.declarators {
                let init_text = match &declarator.init {
                    Some(init) => format!(" = {}", emit_expr(ctx, scope, expected.as_ref(), init)?),
                    None => String::new(),
                };
                parts.push(format!("{}{}", declarator.name.as_str(), init_text));
            }
            Ok(format!("{} {}", c_ty, parts.join(", ")))
        }
        _ => unreachable!("a for-loop's init clause is always a var-decl or an expression statement"),
    }
}

/// `try`/`catch` lowers onto the `setjmp`/`longjmp` stack in
/// `prelude.rs`: entering the guarded region pushes a jump target,
/// `kush_throw` pops back to the most recent one on a `throw`. A
/// `try`/`finally` with no `catch` skips the jump-buffer dance entirely
/// (see this module's docs) since nothing here would ever observe it.
fn emit_try(ctx: &Ctx, scope: ScopeId, cursor: &mut ScopeCursor, s: &TryStmt, indent: usize) -> EmitResult<String> {
    let p = pad(indent);
    let inner = pad(indent + 1);

    let Some(catch) = &s.catch else {
        let mut text = format!("{}{}", p, emit_block(ctx, cursor, &s.body, indent)?);
        if let Some(finally) = &s.finally {
            text.push_str(&format!("\n{}{}", p, emit_block(ctx, cursor, finally, indent)?));
        }
        return Ok(text);
    };

    let body_scope = cursor.next();
    let mut body_cursor = ScopeCursor::new(ctx.scopes, body_scope);
    let mut body_lines = Vec::with_capacity(s.body.statements.len() + 1);
    for stmt in &s.body.statements {
        body_lines.push(emit_stmt(ctx, body_scope, &mut body_cursor, stmt, indent + 1)?);
    }
    body_lines.push(format!("{}kush_jmp_depth--;", inner));

    let catch_scope = cursor.next();
    let mut catch_cursor = ScopeCursor::new(ctx.scopes, catch_scope);
    let mut catch_lines = vec![
        format!("{}kush_jmp_depth--;", inner),
        format!("{}void *{} = kush_exception;", inner, catch.param.as_str()),
    ];
    for stmt in &catch.body.statements {
        catch_lines.push(emit_stmt(ctx, catch_scope, &mut catch_cursor, stmt, indent + 1)?);
    }

    let mut text = format!(
        "{}if (setjmp(kush_jmp_stack[kush_jmp_depth++]) == 0) {{\n{}\n{}}} else {{\n{}\n{}}}",
        p,
        body_lines.join("\n"),
        p,
        catch_lines.join("\n"),
        p,
    );

    if let Some(finally) = &s.finally {
        text.push_str(&format!("\n{}{}", p, emit_block(ctx, cursor, finally, indent)?));
    }

    Ok(text)
}
