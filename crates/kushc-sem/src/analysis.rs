//! Two-pass semantic analyzer: declare every structure and function in
//! the compilation unit, then resolve and type every statement and
//! expression against the resulting symbol table (spec.md §4.6).
//!
//! Pass one ("declare") walks the module twice itself: first it lays
//! down a skeleton entry for every structure and the full signature of
//! every function, which is what lets one function call another
//! declared later in the same file, and lets a structure's field
//! reference a structure declared later. Only once every name exists
//! does pass one fill in structure field types. Pass two ("resolve")
//! then walks every function body with the complete table already
//! built.

use kushc_loader::ModuleLoader;
use kushc_par::ast::*;
use kushc_util::diagnostic::{DiagnosticBuilder, DiagnosticCode};
use kushc_util::{Handler, Span, Symbol};

use crate::scope::{DeclareConflict, Modifiers, RedeclarationKind, ScopeArena, ScopeId, ScopeKind, SymbolKind};
use crate::types::Type;

/// Functions with more parameters than this are rejected outright
/// (`E_SEM_PARAMETER_THRESHOLD_EXCEEDED`) rather than left to overflow
/// whatever fixed-width counter the emitter or a linked runtime uses.
const MAX_PARAMETERS: usize = 255;

/// The descriptor auto-imported into every compilation unit unless the
/// driver passes `--core-api` (spec.md §6).
const IMPLICIT_CORE_MODULE: &str = "kush.core";

#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    /// `--core-api`: suppresses the implicit `import kush.core.*`.
    pub suppress_core_import: bool,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            suppress_core_import: false,
        }
    }
}

pub struct Analyzer<'a> {
    pub scopes: ScopeArena,
    handler: &'a Handler,
    loader: &'a ModuleLoader,
    options: AnalyzerOptions,
    root: ScopeId,
}

impl<'a> Analyzer<'a> {
    pub fn new(handler: &'a Handler, loader: &'a ModuleLoader, options: AnalyzerOptions) -> Self {
        let mut scopes = ScopeArena::new();
        let root = scopes.create_scope(None, ScopeKind::CompilationUnit, None, None);
        Self {
            scopes,
            handler,
            loader,
            options,
            root,
        }
    }

    pub fn root_scope(&self) -> ScopeId {
        self.root
    }

    /// Runs both passes over `module`. Errors are emitted to the shared
    /// `Handler`; the caller (the driver) decides whether to proceed to
    /// emission based on `handler.has_errors()`.
    pub fn analyze(&mut self, module: &Module) {
        if !self.options.suppress_core_import {
            self.import_module(IMPLICIT_CORE_MODULE, None, None);
        }
        for import in &module.imports {
            self.declare_import(import);
        }

        for structure in &module.structures {
            self.declare_structure_skeleton(structure);
        }
        for function in &module.functions {
            self.declare_function_signature(function);
        }
        for structure in &module.structures {
            self.resolve_structure_fields(structure);
        }

        for function in &module.functions {
            self.analyze_function_body(function);
        }
    }

    fn error(&self, code: DiagnosticCode, span: Span, message: impl Into<String>) {
        DiagnosticBuilder::error(message.into())
            .code(code)
            .span(span)
            .emit(self.handler);
    }

    fn redeclaration_code(kind: RedeclarationKind) -> DiagnosticCode {
        match kind {
            RedeclarationKind::Function => DiagnosticCode::E_SEM_REDECLARATION_AS_FUNCTION,
            RedeclarationKind::Parameter => DiagnosticCode::E_SEM_REDECLARATION_AS_PARAMETER,
            RedeclarationKind::VariadicParameter => {
                DiagnosticCode::E_SEM_REDECLARATION_AS_VARIABLE_PARAMETER
            }
            RedeclarationKind::Variable => DiagnosticCode::E_SEM_REDECLARATION_AS_VARIABLE,
            RedeclarationKind::Constant => DiagnosticCode::E_SEM_REDECLARATION_AS_CONSTANT,
            RedeclarationKind::Label => DiagnosticCode::E_SEM_REDECLARATION_AS_LABEL,
            RedeclarationKind::LoopParameter => {
                DiagnosticCode::E_SEM_REDECLARATION_AS_LOOP_PARAMETER
            }
            RedeclarationKind::Structure => DiagnosticCode::E_SEM_REDECLARATION_AS_STRUCTURE,
        }
    }

    fn report_declare_conflict(&self, conflict: DeclareConflict, kind: RedeclarationKind, name: Symbol, span: Span) {
        match conflict {
            DeclareConflict::Redeclaration(_) => self.error(
                Self::redeclaration_code(kind),
                span,
                format!("'{}' is already declared in this scope", name.as_str()),
            ),
            DeclareConflict::DuplicateOverload(_) => self.error(
                DiagnosticCode::E_SEM_DUPLICATE_FUNCTION_OVERLOAD,
                span,
                format!(
                    "'{}' is already declared with an identical parameter signature",
                    name.as_str()
                ),
            ),
        }
    }

    // -----------------------------------------------------------------
    // Imports
    // -----------------------------------------------------------------

    fn declare_import(&mut self, import: &Import) {
        if import.path.is_empty() {
            return;
        }
        if import.wildcard {
            let descriptor = import
                .path
                .iter()
                .map(|(s, _)| s.as_str().to_string())
                .collect::<Vec<_>>()
                .join(".");
            self.import_module(&descriptor, None, Some(import.span));
        } else {
            let (last_name, last_span) = *import.path.last().unwrap();
            let descriptor = import.path[..import.path.len() - 1]
                .iter()
                .map(|(s, _)| s.as_str().to_string())
                .collect::<Vec<_>>()
                .join(".");
            self.import_module(&descriptor, Some((last_name, last_span)), Some(import.span));
        }
    }

    /// Resolves `descriptor` via the module loader and binds either
    /// every top-level declaration it exports (`only = None`, used for
    /// wildcard imports and the implicit core import) or just the one
    /// named declaration (`only = Some((name, span))`).
    ///
    /// A module missing from disk is not itself an error for the
    /// implicit core import (a freestanding compile with no linked
    /// standard library is legitimate); for an explicit `import`
    /// statement it is `E_UNKNOWN_MODULE`.
    fn import_module(&mut self, descriptor: &str, only: Option<(Symbol, Span)>, statement_span: Option<Span>) {
        let loaded = match self.loader.resolve(descriptor) {
            Ok(Some(module)) => module,
            Ok(None) => {
                if let Some(span) = statement_span {
                    self.error(
                        DiagnosticCode::E_UNKNOWN_MODULE,
                        span,
                        format!("no module found for '{descriptor}'"),
                    );
                }
                return;
            }
            Err(err) => {
                if let Some(span) = statement_span {
                    self.error(DiagnosticCode::E_UNKNOWN_MODULE, span, err.to_string());
                }
                return;
            }
        };

        let module_symbol = Symbol::intern(descriptor);

        for structure in &loaded.structures {
            let name = Symbol::intern(&structure.name);
            if let Some((only_name, _)) = only {
                if only_name != name {
                    continue;
                }
            }
            let struct_scope = self.scopes.create_scope(Some(name), ScopeKind::Structure, Some(self.root), None);
            let fields = structure
                .attributes
                .iter()
                .map(|attr| (Symbol::intern(attr), Type::Unknown))
                .collect::<Vec<_>>();
            for (field_name, field_ty) in &fields {
                let _ = self.scopes.declare(
                    struct_scope,
                    *field_name,
                    Modifiers::NONE,
                    SymbolKind::Variable { ty: field_ty.clone() },
                );
            }
            let inner = SymbolKind::Structure {
                fields,
                scope: struct_scope,
            };
            let _ = self.scopes.declare(
                self.root,
                name,
                Modifiers::EXTERNAL,
                SymbolKind::External {
                    inner: Box::new(inner),
                    module: module_symbol,
                },
            );
        }

        for function in &loaded.functions {
            let name = Symbol::intern(&function.name);
            if let Some((only_name, _)) = only {
                if only_name != name {
                    continue;
                }
            }
            let (params, variadic, ret) = parse_signature_text(&function.signature);
            let fn_scope = self.scopes.create_scope(Some(name), ScopeKind::Function, Some(self.root), None);
            let inner = SymbolKind::Function {
                params,
                variadic,
                ret,
                scope: fn_scope,
            };
            let _ = self.scopes.declare(
                self.root,
                name,
                Modifiers::EXTERNAL,
                SymbolKind::External {
                    inner: Box::new(inner),
                    module: module_symbol,
                },
            );
        }

        if let Some((only_name, only_span)) = only {
            let found = self.scopes.resolve(self.root, only_name).is_some();
            if !found {
                self.error(
                    DiagnosticCode::E_UNKNOWN_MODULE,
                    only_span,
                    format!(
                        "module '{descriptor}' has no exported declaration named '{}'",
                        only_name.as_str()
                    ),
                );
            }
        }
    }

    // -----------------------------------------------------------------
    // Declaration pass
    // -----------------------------------------------------------------

    fn declare_structure_skeleton(&mut self, structure: &Structure) {
        let struct_scope = self.scopes.create_scope(Some(structure.name), ScopeKind::Structure, Some(self.root), None);
        let kind = SymbolKind::Structure {
            fields: Vec::new(),
            scope: struct_scope,
        };
        match self.scopes.declare(self.root, structure.name, Modifiers::NONE, kind) {
            Ok(id) => self.scopes.scope_mut(struct_scope).owner = Some(id),
            Err(conflict) => self.report_declare_conflict(
                conflict,
                RedeclarationKind::Structure,
                structure.name,
                structure.name_span,
            ),
        }
    }

    fn resolve_structure_fields(&mut self, structure: &Structure) {
        let Some(struct_id) = self.scopes.resolve(self.root, structure.name) else {
            return;
        };
        let struct_scope = match &self.scopes.symbol(struct_id).kind {
            SymbolKind::Structure { scope, .. } => *scope,
            _ => return,
        };

        let mut fields = Vec::with_capacity(structure.fields.len());
        for field in &structure.fields {
            let ty = self.resolve_type_expr(&field.ty);
            fields.push((field.name, ty.clone()));
            if let Err(conflict) = self.scopes.declare(
                struct_scope,
                field.name,
                Modifiers::NONE,
                SymbolKind::Variable { ty },
            ) {
                self.report_declare_conflict(conflict, RedeclarationKind::Variable, field.name, field.span);
            }
        }

        if let SymbolKind::Structure { fields: slot, .. } = &mut self.scopes.symbol_mut(struct_id).kind {
            *slot = fields;
        }
    }

    fn declare_function_signature(&mut self, function: &Function) {
        let ret = self.resolve_type_expr(&function.return_type);

        let total_params = function.params.len() + function.variadic.is_some() as usize;
        if total_params > MAX_PARAMETERS {
            self.error(
                DiagnosticCode::E_SEM_PARAMETER_THRESHOLD_EXCEEDED,
                function.span,
                format!(
                    "function '{}' declares {total_params} parameters, exceeding the maximum of {MAX_PARAMETERS}",
                    function.name.as_str()
                ),
            );
        }

        let fn_scope = self.scopes.create_scope(Some(function.name), ScopeKind::Function, Some(self.root), None);

        let mut params = Vec::with_capacity(function.params.len());
        for param in &function.params {
            let ty = self.resolve_type_expr(&param.ty);
            params.push(ty.clone());
            if let Err(conflict) =
                self.scopes
                    .declare(fn_scope, param.name, Modifiers::NONE, SymbolKind::Variable { ty })
            {
                self.report_declare_conflict(conflict, RedeclarationKind::Parameter, param.name, param.span);
            }
        }

        let variadic = function.variadic.as_ref().map(|param| {
            let element_ty = self.resolve_type_expr(&param.ty);
            let array_ty = Type::Array {
                base: Box::new(element_ty.clone()),
                dims: 1,
            };
            if let Err(conflict) = self.scopes.declare(
                fn_scope,
                param.name,
                Modifiers::VARIADIC,
                SymbolKind::Variable { ty: array_ty },
            ) {
                self.report_declare_conflict(conflict, RedeclarationKind::VariadicParameter, param.name, param.span);
            }
            element_ty
        });

        let kind = SymbolKind::Function {
            params,
            variadic,
            ret,
            scope: fn_scope,
        };
        match self.scopes.declare(self.root, function.name, Modifiers::NONE, kind) {
            Ok(id) => self.scopes.scope_mut(fn_scope).owner = Some(id),
            Err(conflict) => {
                self.report_declare_conflict(conflict, RedeclarationKind::Function, function.name, function.name_span)
            }
        }
    }

    fn resolve_type_expr(&mut self, ty: &TypeExpr) -> Type {
        match ty {
            TypeExpr::Primitive(kw, _) => Type::from_primitive_keyword(*kw),
            TypeExpr::Named(name, span) => match self.scopes.resolve(self.root, *name) {
                Some(id) if self.scopes.symbol(id).kind.is_structure() => Type::Structure(*name),
                Some(_) => {
                    self.error(
                        DiagnosticCode::E_SEM_UNDECLARED_CLASS,
                        *span,
                        format!("'{}' does not name a structure", name.as_str()),
                    );
                    Type::Unknown
                }
                None => {
                    self.error(
                        DiagnosticCode::E_SEM_UNDECLARED_CLASS,
                        *span,
                        format!("undeclared structure '{}'", name.as_str()),
                    );
                    Type::Unknown
                }
            },
            TypeExpr::Array(base, dims, _) => {
                let base_ty = self.resolve_type_expr(base);
                Type::Array {
                    base: Box::new(base_ty),
                    dims: *dims,
                }
            }
        }
    }

    // -----------------------------------------------------------------
    // Resolution / typing pass
    // -----------------------------------------------------------------

    fn analyze_function_body(&mut self, function: &Function) {
        let Some(fn_id) = self.scopes.resolve(self.root, function.name) else {
            return;
        };
        let (fn_scope, ret) = match &self.scopes.symbol(fn_id).kind {
            SymbolKind::Function { scope, ret, .. } => (*scope, ret.clone()),
            _ => return,
        };
        let mut ctx = FunctionCtx {
            return_type: ret,
            loop_labels: Vec::new(),
        };
        self.analyze_block(&function.body, fn_scope, &mut ctx);
    }

    fn analyze_block(&mut self, block: &Block, parent: ScopeId, ctx: &mut FunctionCtx) -> ScopeId {
        let scope = self.scopes.create_scope(None, ScopeKind::Local, Some(parent), None);
        for stmt in &block.statements {
            self.analyze_stmt(stmt, scope, ctx);
        }
        scope
    }

    fn analyze_stmt(&mut self, stmt: &Stmt, scope: ScopeId, ctx: &mut FunctionCtx) {
        match stmt {
            Stmt::VarDecl(decl) => self.analyze_var_decl(decl, scope),
            Stmt::If(s) => {
                let cond_ty = self.analyze_expr(&s.cond, scope, ctx);
                self.expect_boolean(&cond_ty, s.cond.span());
                self.analyze_block(&s.then_branch, scope, ctx);
                if let Some(else_branch) = &s.else_branch {
                    self.analyze_stmt(else_branch, scope, ctx);
                }
            }
            Stmt::While(s) => {
                let cond_ty = self.analyze_expr(&s.cond, scope, ctx);
                self.expect_boolean(&cond_ty, s.cond.span());
                if let Some(label) = s.label {
                    self.declare_loop_label(scope, label, s.span);
                    ctx.loop_labels.push(label);
                }
                self.analyze_block(&s.body, scope, ctx);
                if s.label.is_some() {
                    ctx.loop_labels.pop();
                }
            }
            Stmt::For(s) => {
                let for_scope = self.scopes.create_scope(None, ScopeKind::Local, Some(scope), None);
                if let Some(init) = &s.init {
                    self.analyze_stmt(init, for_scope, ctx);
                }
                if let Some(cond) = &s.cond {
                    let cond_ty = self.analyze_expr(cond, for_scope, ctx);
                    self.expect_boolean(&cond_ty, cond.span());
                }
                if let Some(update) = &s.update {
                    self.analyze_expr(update, for_scope, ctx);
                }
                if let Some(label) = s.label {
                    self.declare_loop_label(scope, label, s.span);
                    ctx.loop_labels.push(label);
                }
                self.analyze_block(&s.body, for_scope, ctx);
                if s.label.is_some() {
                    ctx.loop_labels.pop();
                }
            }
            Stmt::Return(s) => {
                let actual = s
                    .value
                    .as_ref()
                    .map(|v| self.analyze_expr(v, scope, ctx))
                    .unwrap_or(Type::Void);
                if !actual.compatible_with(&ctx.return_type) {
                    self.error(
                        DiagnosticCode::E_SEM_INCOMPATIBLE_TYPES,
                        s.span,
                        "return value's type is incompatible with the function's declared return type",
                    );
                }
            }
            Stmt::Break(s) => {
                if let Some(label) = s.label {
                    if !ctx.loop_labels.contains(&label) {
                        self.error(
                            DiagnosticCode::E_SEM_UNDECLARED_IDENTIFIER,
                            s.span,
                            format!("'{}' does not name an enclosing loop", label.as_str()),
                        );
                    }
                }
            }
            Stmt::Throw(s) => {
                self.analyze_expr(&s.value, scope, ctx);
            }
            Stmt::Try(s) => {
                self.analyze_block(&s.body, scope, ctx);
                if let Some(catch) = &s.catch {
                    let catch_scope = self.scopes.create_scope(None, ScopeKind::Local, Some(scope), None);
                    let _ = self.scopes.declare(
                        catch_scope,
                        catch.param,
                        Modifiers::NONE,
                        SymbolKind::Variable { ty: Type::Unknown },
                    );
                    for inner in &catch.body.statements {
                        self.analyze_stmt(inner, catch_scope, ctx);
                    }
                }
                if let Some(finally) = &s.finally {
                    self.analyze_block(finally, scope, ctx);
                }
            }
            Stmt::Block(b) => {
                self.analyze_block(b, scope, ctx);
            }
            Stmt::Expr(e, _) => {
                self.analyze_expr(e, scope, ctx);
            }
        }
    }

    fn analyze_var_decl(&mut self, decl: &VarDeclStmt, scope: ScopeId) {
        let declared_ty = match &decl.keyword {
            VarDeclKeyword::Typed(ty) => Some(self.resolve_type_expr(ty)),
            VarDeclKeyword::Let | VarDeclKeyword::Var => None,
        };
        let is_const = matches!(decl.keyword, VarDeclKeyword::Let);

        for declarator in &decl.declarators {
            let init_ty = declarator.init.as_ref().map(|init| {
                // `ctx` is only needed for return/loop-label tracking, neither
                // reachable from inside an initializer expression, so a
                // throwaway context is enough here.
                let mut throwaway = FunctionCtx {
                    return_type: Type::Unknown,
                    loop_labels: Vec::new(),
                };
                self.analyze_expr(init, scope, &mut throwaway)
            });

            let ty = match (&declared_ty, &init_ty) {
                (Some(declared), Some(actual)) => {
                    if !actual.compatible_with(declared) {
                        self.error(
                            DiagnosticCode::E_SEM_INCOMPATIBLE_TYPES,
                            declarator.span,
                            format!(
                                "initializer's type is incompatible with declared type of '{}'",
                                declarator.name.as_str()
                            ),
                        );
                    }
                    declared.clone()
                }
                (Some(declared), None) => declared.clone(),
                (None, Some(actual)) => actual.clone(),
                (None, None) => Type::Unknown,
            };

            let modifiers = if is_const { Modifiers::CONST } else { Modifiers::NONE };
            let kind = if is_const {
                SymbolKind::Constant { ty }
            } else {
                SymbolKind::Variable { ty }
            };
            let redeclaration_kind = if is_const {
                RedeclarationKind::Constant
            } else {
                RedeclarationKind::Variable
            };
            if let Err(conflict) = self.scopes.declare(scope, declarator.name, modifiers, kind) {
                self.report_declare_conflict(conflict, redeclaration_kind, declarator.name, declarator.span);
            }
        }
    }

    /// Declares a `while`/`for` label as a `Label` symbol in the loop's
    /// enclosing scope, the first point it is introduced, so a label
    /// reused within the same scope is caught as a redeclaration instead
    /// of silently shadowing.
    fn declare_loop_label(&mut self, scope: ScopeId, label: Symbol, span: Span) {
        if let Err(conflict) = self.scopes.declare(scope, label, Modifiers::NONE, SymbolKind::Label) {
            self.report_declare_conflict(conflict, RedeclarationKind::Label, label, span);
        }
    }

    fn expect_boolean(&self, ty: &Type, span: Span) {
        if !ty.is_unknown() && !ty.is_boolean() {
            self.error(DiagnosticCode::E_SEM_EXPECTED_BOOLEAN, span, "expected a boolean-valued expression");
        }
    }

    fn analyze_expr(&mut self, expr: &Expr, scope: ScopeId, ctx: &mut FunctionCtx) -> Type {
        match expr {
            Expr::Assignment(e) => self.analyze_assignment(e, scope, ctx),
            Expr::Conditional(e) => self.analyze_conditional(e, scope, ctx),
            Expr::Binary(e) => self.analyze_binary(e, scope, ctx),
            Expr::Unary(e) => self.analyze_unary(e, scope, ctx),
            Expr::Postfix(e) => self.analyze_postfix(e, scope, ctx),
            Expr::New(e) => self.analyze_new(e, scope, ctx),
            Expr::ArrayLiteral(e) => self.analyze_array_literal(e, scope, ctx),
            Expr::Initializer(e) => self.analyze_initializer(e, scope, ctx),
        }
    }

    fn analyze_assignment(&mut self, expr: &AssignmentExpr, scope: ScopeId, ctx: &mut FunctionCtx) -> Type {
        let target_ty = self.analyze_expr(&expr.target, scope, ctx);
        if !self.is_lvalue(&expr.target, scope) {
            self.error(
                DiagnosticCode::E_SEM_INVALID_LVALUE,
                expr.target.span(),
                "left-hand side of an assignment must be a variable, subscript, or member access",
            );
        }
        let value_ty = self.analyze_expr(&expr.value, scope, ctx);
        if !value_ty.compatible_with(&target_ty) {
            self.error(
                DiagnosticCode::E_SEM_INCOMPATIBLE_TYPES,
                expr.span,
                "assigned value's type is incompatible with its target",
            );
        }
        target_ty
    }

    /// An l-value is a bare identifier naming a variable, or a postfix
    /// chain whose last step is a subscript or member access (never a
    /// call) — spec.md §4.6's l-value/placeholder rule.
    fn is_lvalue(&self, expr: &Expr, scope: ScopeId) -> bool {
        match expr {
            Expr::Postfix(p) => match p.parts.last() {
                Some(PostfixPart::Subscript(_, _)) | Some(PostfixPart::Member(_, _)) => true,
                Some(PostfixPart::Call(_, _)) => false,
                None => match &p.primary {
                    Primary::Terminal(tok) if tok.kind == kushc_lex::TokenKind::Identifier => {
                        let name = Symbol::intern(&tok.text);
                        self.scopes
                            .resolve(scope, name)
                            .map(|id| self.scopes.symbol(id).kind.is_assignable())
                            .unwrap_or(false)
                    }
                    Primary::Terminal(_) => false,
                    Primary::Nested(inner) => self.is_lvalue(inner, scope),
                },
            },
            _ => false,
        }
    }

    fn analyze_conditional(&mut self, expr: &ConditionalExpr, scope: ScopeId, ctx: &mut FunctionCtx) -> Type {
        let cond_ty = self.analyze_expr(&expr.cond, scope, ctx);
        self.expect_boolean(&cond_ty, expr.cond.span());
        let then_ty = self.analyze_expr(&expr.then_expr, scope, ctx);
        let else_ty = self.analyze_expr(&expr.else_expr, scope, ctx);
        if !then_ty.compatible_with(&else_ty) {
            self.error(
                DiagnosticCode::E_SEM_INCOMPATIBLE_TYPES,
                expr.span,
                "the two branches of a conditional expression must have compatible types",
            );
            Type::Unknown
        } else if then_ty.is_unknown() {
            else_ty
        } else {
            then_ty
        }
    }

    /// Walks a `BinaryExpr` strictly left to right, exactly as parsed
    /// (`left` then each `(op, rhs)` pair in order) — this chain is
    /// never reassociated, per spec.md's binary-expression invariant.
    /// At the equality and relational levels, a chain longer than one
    /// operator is rejected (`a == b == c` without parentheses).
    fn analyze_binary(&mut self, expr: &BinaryExpr, scope: ScopeId, ctx: &mut FunctionCtx) -> Type {
        let mut left_ty = self.analyze_expr(&expr.left, scope, ctx);

        if matches!(expr.level, BinaryLevel::Equality | BinaryLevel::Relational) && expr.others.len() > 1 {
            self.error(
                DiagnosticCode::E_SEM_COMBINING_EQUALITY_OPERATORS,
                expr.span,
                "chained comparison operators must be parenthesized",
            );
        }

        let mut result = Type::Boolean;
        for (_op_token, rhs_expr) in &expr.others {
            let rhs_ty = self.analyze_expr(rhs_expr, scope, ctx);
            result = match expr.level {
                BinaryLevel::LogicalOr | BinaryLevel::LogicalAnd => {
                    self.expect_boolean(&left_ty, expr.left.span());
                    self.expect_boolean(&rhs_ty, rhs_expr.span());
                    Type::Boolean
                }
                BinaryLevel::Equality => {
                    if !left_ty.compatible_with(&rhs_ty) {
                        self.error(
                            DiagnosticCode::E_SEM_INCOMPATIBLE_TYPES,
                            expr.span,
                            "operands of an equality operator must have compatible types",
                        );
                    }
                    Type::Boolean
                }
                BinaryLevel::Relational => {
                    if !left_ty.is_numeric() && !left_ty.is_unknown() {
                        self.error(
                            DiagnosticCode::E_SEM_INVALID_OPERAND,
                            expr.left.span(),
                            "relational operators require a numeric operand",
                        );
                    }
                    if !rhs_ty.is_numeric() && !rhs_ty.is_unknown() {
                        self.error(
                            DiagnosticCode::E_SEM_INVALID_OPERAND,
                            rhs_expr.span(),
                            "relational operators require a numeric operand",
                        );
                    }
                    Type::Boolean
                }
                BinaryLevel::InclusiveOr | BinaryLevel::ExclusiveOr | BinaryLevel::And | BinaryLevel::Shift => {
                    if !left_ty.is_integer() && !left_ty.is_unknown() {
                        self.error(
                            DiagnosticCode::E_SEM_INVALID_OPERAND,
                            expr.left.span(),
                            "bitwise operators require an integer operand",
                        );
                    }
                    if !rhs_ty.is_integer() && !rhs_ty.is_unknown() {
                        self.error(
                            DiagnosticCode::E_SEM_INVALID_OPERAND,
                            rhs_expr.span(),
                            "bitwise operators require an integer operand",
                        );
                    }
                    if left_ty.is_unknown() {
                        rhs_ty.clone()
                    } else {
                        left_ty.clone()
                    }
                }
                BinaryLevel::Additive | BinaryLevel::Multiplicative => {
                    let left_ok = left_ty.is_numeric()
                        || left_ty.is_unknown()
                        || (expr.level == BinaryLevel::Additive && left_ty == Type::String);
                    let rhs_ok = rhs_ty.is_numeric()
                        || rhs_ty.is_unknown()
                        || (expr.level == BinaryLevel::Additive && rhs_ty == Type::String);
                    if !left_ok {
                        self.error(
                            DiagnosticCode::E_SEM_INVALID_OPERAND,
                            expr.left.span(),
                            "arithmetic operators require a numeric (or, for `+`, string) operand",
                        );
                    }
                    if !rhs_ok {
                        self.error(
                            DiagnosticCode::E_SEM_INVALID_OPERAND,
                            rhs_expr.span(),
                            "arithmetic operators require a numeric (or, for `+`, string) operand",
                        );
                    }
                    if left_ty.is_unknown() {
                        rhs_ty.clone()
                    } else {
                        left_ty.clone()
                    }
                }
            };
            left_ty = result.clone();
        }
        result
    }

    fn analyze_unary(&mut self, expr: &UnaryExpr, scope: ScopeId, ctx: &mut FunctionCtx) -> Type {
        let operand_ty = self.analyze_expr(&expr.operand, scope, ctx);
        match expr.op {
            UnaryOp::Bang => {
                self.expect_boolean(&operand_ty, expr.operand.span());
                Type::Boolean
            }
            UnaryOp::Plus | UnaryOp::Minus => {
                if !operand_ty.is_numeric() && !operand_ty.is_unknown() {
                    self.error(
                        DiagnosticCode::E_SEM_INVALID_OPERAND,
                        expr.operand.span(),
                        "unary +/- require a numeric operand",
                    );
                }
                operand_ty
            }
            UnaryOp::Tilde => {
                if !operand_ty.is_integer() && !operand_ty.is_unknown() {
                    self.error(
                        DiagnosticCode::E_SEM_INVALID_OPERAND,
                        expr.operand.span(),
                        "unary ~ requires an integer operand",
                    );
                }
                operand_ty
            }
        }
    }

    fn analyze_postfix(&mut self, expr: &PostfixExpr, scope: ScopeId, ctx: &mut FunctionCtx) -> Type {
        // A bare identifier immediately followed by a call is resolved as a
        // function invocation directly, since functions have no `Type` for
        // `analyze_primary` to return (see `types.rs` module docs).
        if let (Primary::Terminal(tok), Some((PostfixPart::Call(args, call_span), rest))) =
            (&expr.primary, expr.parts.split_first())
        {
            if tok.kind == kushc_lex::TokenKind::Identifier {
                let name = Symbol::intern(&tok.text);
                if let Some(id) = self.scopes.resolve(scope, name) {
                    if self.scopes.symbol(id).kind.is_function() {
                        let mut current = self.analyze_function_call(id, args, scope, ctx, *call_span);
                        for part in rest {
                            current = self.analyze_postfix_part(current, part, scope, ctx);
                        }
                        return current;
                    }
                }
            }
        }

        let mut current = self.analyze_primary(&expr.primary, scope, ctx, expr.span);
        for part in &expr.parts {
            current = self.analyze_postfix_part(current, part, scope, ctx);
        }
        current
    }

    fn analyze_postfix_part(&mut self, current: Type, part: &PostfixPart, scope: ScopeId, ctx: &mut FunctionCtx) -> Type {
        match part {
            PostfixPart::Subscript(index, span) => {
                let index_ty = self.analyze_expr(index, scope, ctx);
                if !index_ty.is_integer() && !index_ty.is_unknown() {
                    self.error(DiagnosticCode::E_SEM_INVALID_OPERAND, index.span(), "array subscript must be an integer");
                }
                if current.indexable() {
                    match &current {
                        Type::Array { base, dims } if *dims > 1 => Type::Array {
                            base: base.clone(),
                            dims: dims - 1,
                        },
                        Type::Array { base, .. } => (**base).clone(),
                        Type::String => Type::Integer { signed: false, size: 1 },
                        _ => Type::Unknown,
                    }
                } else {
                    self.error(DiagnosticCode::E_SEM_INVALID_LEFT_OPERAND, *span, "this value's type cannot be subscripted");
                    Type::Unknown
                }
            }
            PostfixPart::Call(args, span) => {
                for arg in args {
                    self.analyze_expr(arg, scope, ctx);
                }
                if current.is_unknown() {
                    Type::Unknown
                } else {
                    self.error(DiagnosticCode::E_SEM_INVALID_FUNCTION_INVOCATION, *span, "this value's type is not callable");
                    Type::Unknown
                }
            }
            PostfixPart::Member(name, span) => {
                if current.accessible() {
                    self.resolve_member_type(&current, *name, *span)
                } else {
                    self.error(
                        DiagnosticCode::E_SEM_INVALID_MEMBER_ACCESS,
                        *span,
                        format!("'{}' is not a member of this value's type", name.as_str()),
                    );
                    Type::Unknown
                }
            }
        }
    }

    /// Checks a direct call against a resolved function symbol's declared
    /// signature — arity, then per-parameter compatibility, then the
    /// trailing variadic slot if the callee declares one.
    fn analyze_function_call(
        &mut self,
        fn_id: kushc_util::SymbolId,
        args: &[Expr],
        scope: ScopeId,
        ctx: &mut FunctionCtx,
        span: Span,
    ) -> Type {
        let (params, variadic, ret) = match self.scopes.symbol(fn_id).kind.unwrap_external() {
            SymbolKind::Function { params, variadic, ret, .. } => (params.clone(), variadic.clone(), ret.clone()),
            _ => return Type::Unknown,
        };

        let arg_types: Vec<Type> = args.iter().map(|a| self.analyze_expr(a, scope, ctx)).collect();

        let min_arity = params.len();
        let arity_ok = if variadic.is_some() {
            arg_types.len() >= min_arity
        } else {
            arg_types.len() == min_arity
        };
        if !arity_ok {
            self.error(DiagnosticCode::E_SEM_INVALID_FUNCTION_INVOCATION, span, "wrong number of arguments supplied to this call");
            return ret;
        }

        for (param_ty, arg_ty) in params.iter().zip(arg_types.iter()) {
            if !arg_ty.compatible_with(param_ty) {
                self.error(DiagnosticCode::E_SEM_INCOMPATIBLE_TYPES, span, "argument type is incompatible with the parameter it is passed to");
            }
        }
        if let Some(variadic_ty) = &variadic {
            for arg_ty in &arg_types[min_arity..] {
                if !arg_ty.compatible_with(variadic_ty) {
                    self.error(
                        DiagnosticCode::E_SEM_INCOMPATIBLE_TYPES,
                        span,
                        "variadic argument type is incompatible with the declared variadic parameter",
                    );
                }
            }
        }

        ret
    }

    fn resolve_member_type(&self, ty: &Type, name: Symbol, span: Span) -> Type {
        let Type::Structure(struct_name) = ty else {
            return Type::Unknown;
        };
        let Some(struct_id) = self.scopes.resolve(self.root, *struct_name) else {
            return Type::Unknown;
        };
        let struct_scope = match self.scopes.symbol(struct_id).kind.unwrap_external() {
            SymbolKind::Structure { scope, .. } => *scope,
            _ => return Type::Unknown,
        };
        match self.scopes.resolve_member(struct_scope, name) {
            Some(field_id) => self.scopes.symbol(field_id).kind.value_type().unwrap_or(Type::Unknown),
            None => {
                self.error(
                    DiagnosticCode::E_SEM_INVALID_ACCESS,
                    span,
                    format!("'{}' is not a member of this structure", name.as_str()),
                );
                Type::Unknown
            }
        }
    }

    fn analyze_primary(&mut self, primary: &Primary, scope: ScopeId, ctx: &mut FunctionCtx, span: Span) -> Type {
        match primary {
            Primary::Nested(inner) => self.analyze_expr(inner, scope, ctx),
            Primary::Terminal(tok) => match tok.kind {
                kushc_lex::TokenKind::Identifier => {
                    let name = Symbol::intern(&tok.text);
                    match self.scopes.resolve(scope, name) {
                        Some(id) => {
                            let kind = self.scopes.symbol(id).kind.clone();
                            if kind.is_function() {
                                // A function name with no following call has no value
                                // type (see `types.rs` module docs); `analyze_postfix`
                                // already special-cases the call-immediately-after-name
                                // shape, so reaching this means the name stands alone.
                                self.error(
                                    DiagnosticCode::E_SEM_INVALID_ACCESS,
                                    span,
                                    format!("'{}' names a function and cannot be used as a value", name.as_str()),
                                );
                                Type::Unknown
                            } else {
                                kind.value_type().unwrap_or(Type::Unknown)
                            }
                        }
                        None => {
                            self.error(
                                DiagnosticCode::E_SEM_UNDECLARED_IDENTIFIER,
                                span,
                                format!("undeclared identifier '{}'", name.as_str()),
                            );
                            Type::Unknown
                        }
                    }
                }
                kushc_lex::TokenKind::IntegerLiteral => Type::default_integer(),
                kushc_lex::TokenKind::FloatingPointLiteral => Type::default_decimal(),
                kushc_lex::TokenKind::StringLiteral => Type::String,
                kushc_lex::TokenKind::KeywordTrue | kushc_lex::TokenKind::KeywordFalse => Type::Boolean,
                kushc_lex::TokenKind::KeywordNull => Type::Null,
                kushc_lex::TokenKind::KeywordThis => Type::Unknown,
                _ => Type::Unknown,
            },
        }
    }

    fn analyze_new(&mut self, expr: &NewExpr, scope: ScopeId, ctx: &mut FunctionCtx) -> Type {
        let arg_types: Vec<Type> = expr.args.iter().map(|a| self.analyze_expr(a, scope, ctx)).collect();

        let Some(struct_id) = self.scopes.resolve(self.root, expr.type_name) else {
            self.error(
                DiagnosticCode::E_SEM_UNDECLARED_CLASS,
                expr.type_name_span,
                format!("undeclared structure '{}'", expr.type_name.as_str()),
            );
            return Type::Unknown;
        };
        let kind = self.scopes.symbol(struct_id).kind.clone();
        let fields = match kind.unwrap_external() {
            SymbolKind::Structure { fields, .. } => fields.clone(),
            _ => {
                self.error(
                    DiagnosticCode::E_SEM_INSTANTIATION_OF_NON_CLASS_SYMBOL,
                    expr.type_name_span,
                    format!("'{}' is not a structure", expr.type_name.as_str()),
                );
                return Type::Unknown;
            }
        };

        let matches = fields.len() == arg_types.len()
            && fields
                .iter()
                .zip(arg_types.iter())
                .all(|((_, field_ty), arg_ty)| arg_ty.compatible_with(field_ty));
        if !matches {
            self.error(
                DiagnosticCode::E_SEM_NO_SUITABLE_CONSTRUCTOR,
                expr.span,
                format!("no constructor of '{}' accepts the supplied arguments", expr.type_name.as_str()),
            );
        }

        Type::Structure(expr.type_name)
    }

    fn analyze_array_literal(&mut self, expr: &ArrayLiteralExpr, scope: ScopeId, ctx: &mut FunctionCtx) -> Type {
        if expr.elements.is_empty() {
            return Type::Array {
                base: Box::new(Type::Unknown),
                dims: 1,
            };
        }
        let mut element_ty = Type::Unknown;
        for element in &expr.elements {
            let ty = self.analyze_expr(element, scope, ctx);
            if !ty.is_unknown() {
                if element_ty.is_unknown() {
                    element_ty = ty;
                } else if !ty.compatible_with(&element_ty) {
                    self.error(
                        DiagnosticCode::E_SEM_INCOMPATIBLE_TYPES,
                        expr.span,
                        "every element of an array literal must share a type",
                    );
                }
            }
        }
        Type::Array {
            base: Box::new(element_ty),
            dims: 1,
        }
    }

    fn analyze_initializer(&mut self, expr: &InitializerExpr, scope: ScopeId, ctx: &mut FunctionCtx) -> Type {
        for (_, _, value) in &expr.entries {
            self.analyze_expr(value, scope, ctx);
        }
        Type::Unknown
    }
}

struct FunctionCtx {
    return_type: Type,
    loop_labels: Vec<Symbol>,
}

/// Decodes the loader's invented signature text (`"i32,string->boolean"`,
/// `"i32,...->void"`) into `Type`s. An unrecognized name falls back to
/// `Type::Structure`, matching how an ordinary `TypeExpr::Named` would
/// resolve had the declaration come from source instead of an artifact.
fn parse_signature_text(signature: &str) -> (Vec<Type>, Option<Type>, Type) {
    let (params_part, ret_part) = signature.split_once("->").unwrap_or((signature, "void"));
    let ret = type_from_name(ret_part.trim());

    let mut params = Vec::new();
    let mut variadic = None;
    for raw in params_part.split(',') {
        let name = raw.trim();
        if name.is_empty() {
            continue;
        }
        if name == "..." {
            variadic = Some(Type::Unknown);
            continue;
        }
        params.push(type_from_name(name));
    }
    (params, variadic, ret)
}

fn type_from_name(name: &str) -> Type {
    crate::types::lookup_primitive(name).unwrap_or_else(|| Type::Structure(Symbol::intern(name)))
}
