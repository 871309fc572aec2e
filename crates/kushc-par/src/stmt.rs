//! Statement parsing: variable declarations, control flow, and the
//! structured error-handling forms (`throw`/`try`/`catch`/`finally`).

use kushc_lex::TokenKind;
use kushc_util::diagnostic::{DiagnosticBuilder, DiagnosticCode};
use kushc_util::span::Span;
use kushc_util::Symbol;

use crate::ast::*;
use crate::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_block(&mut self) -> Block {
        let start = self.expect(TokenKind::LBrace);
        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            statements.push(self.parse_stmt());
        }
        let end = self.expect(TokenKind::RBrace);
        Block {
            statements,
            span: self.span_between(&start, &end),
        }
    }

    pub(crate) fn parse_stmt(&mut self) -> Stmt {
        if self.tokens.la(1) == TokenKind::Identifier && self.tokens.la(2) == TokenKind::Colon {
            return self.parse_labelled_stmt();
        }

        match self.tokens.la(1) {
            TokenKind::LBrace => Stmt::Block(self.parse_block()),
            TokenKind::KeywordIf => self.parse_if_stmt(),
            TokenKind::KeywordWhile => {
                let start = self.tokens.lt(1).clone();
                let span = self.span_of(&start);
                self.parse_while_stmt(None, span)
            }
            TokenKind::KeywordFor => {
                let start = self.tokens.lt(1).clone();
                let span = self.span_of(&start);
                self.parse_for_stmt(None, span)
            }
            TokenKind::KeywordReturn => self.parse_return_stmt(),
            TokenKind::KeywordBreak => self.parse_break_stmt(),
            TokenKind::KeywordThrow => self.parse_throw_stmt(),
            TokenKind::KeywordTry => self.parse_try_stmt(),
            _ if self.at_var_decl_start() => self.parse_var_decl_stmt(),
            _ => {
                let expr = self.parse_expr();
                let expr_span = expr.span();
                if self.check(TokenKind::Semicolon) {
                    let semi = self.tokens.lt(1).clone();
                    self.tokens.consume();
                    Stmt::Expr(expr, expr_span.merge(self.span_of(&semi)))
                } else {
                    self.error_unexpected(TokenKind::Semicolon);
                    self.synchronize_statement();
                    Stmt::Expr(expr, expr_span)
                }
            }
        }
    }

    /// Parses `name: while (...) { }` / `name: for (...) { }`. Labels may
    /// only decorate loops; anything else after the colon is an error.
    fn parse_labelled_stmt(&mut self) -> Stmt {
        let label_tok = self.expect(TokenKind::Identifier);
        self.expect(TokenKind::Colon);
        let label = Symbol::intern(&label_tok.text);
        let start_span = self.span_of(&label_tok);

        match self.tokens.la(1) {
            TokenKind::KeywordWhile => self.parse_while_stmt(Some(label), start_span),
            TokenKind::KeywordFor => self.parse_for_stmt(Some(label), start_span),
            _ => {
                self.error_unexpected(TokenKind::KeywordWhile);
                self.synchronize_statement();
                Stmt::Block(Block {
                    statements: Vec::new(),
                    span: start_span,
                })
            }
        }
    }

    /// True if the upcoming tokens start a variable declaration: `let`,
    /// `var`, a primitive keyword, or a structure name (an identifier,
    /// optionally array-dimensioned, followed by another identifier - the
    /// same two-token lookahead [`Parser::parse_type`] relies on).
    fn at_var_decl_start(&mut self) -> bool {
        match self.tokens.la(1) {
            TokenKind::KeywordLet | TokenKind::KeywordVar => true,
            TokenKind::KeywordBoolean
            | TokenKind::KeywordI8
            | TokenKind::KeywordI16
            | TokenKind::KeywordI32
            | TokenKind::KeywordI64
            | TokenKind::KeywordUi8
            | TokenKind::KeywordUi16
            | TokenKind::KeywordUi32
            | TokenKind::KeywordUi64
            | TokenKind::KeywordF32
            | TokenKind::KeywordF64
            | TokenKind::KeywordVoid => true,
            TokenKind::Identifier => {
                let mut k = 2;
                while self.tokens.la(k) == TokenKind::LBracket
                    && self.tokens.la(k + 1) == TokenKind::RBracket
                {
                    k += 2;
                }
                self.tokens.la(k) == TokenKind::Identifier
            }
            _ => false,
        }
    }

    pub(crate) fn parse_var_decl_stmt(&mut self) -> Stmt {
        let start = self.tokens.lt(1).clone();
        let keyword = match self.tokens.la(1) {
            TokenKind::KeywordLet => {
                self.tokens.consume();
                VarDeclKeyword::Let
            }
            TokenKind::KeywordVar => {
                self.tokens.consume();
                VarDeclKeyword::Var
            }
            _ => VarDeclKeyword::Typed(self.parse_type()),
        };

        let mut declarators = Vec::new();
        loop {
            let name_tok = self.expect(TokenKind::Identifier);
            let name_span = self.span_of(&name_tok);
            let init = if self.check(TokenKind::Equal) {
                self.tokens.consume();
                Some(self.parse_expr())
            } else {
                None
            };
            let span = match &init {
                Some(e) => name_span.merge(e.span()),
                None => name_span,
            };
            declarators.push(Declarator {
                name: Symbol::intern(&name_tok.text),
                name_span,
                init,
                span,
            });
            if self.check(TokenKind::Comma) {
                self.tokens.consume();
                continue;
            }
            break;
        }

        let semi = self.expect(TokenKind::Semicolon);
        Stmt::VarDecl(VarDeclStmt {
            keyword,
            declarators,
            span: self.span_between(&start, &semi),
        })
    }

    fn parse_if_stmt(&mut self) -> Stmt {
        let start = self.expect(TokenKind::KeywordIf);
        self.expect(TokenKind::LParen);
        let cond = self.parse_expr();
        self.expect(TokenKind::RParen);
        let then_branch = self.parse_block();
        let mut span = self.span_of(&start).merge(then_branch.span);

        let else_branch = if self.check(TokenKind::KeywordElse) {
            self.tokens.consume();
            let stmt = if self.check(TokenKind::KeywordIf) {
                self.parse_if_stmt()
            } else {
                Stmt::Block(self.parse_block())
            };
            span = span.merge(stmt.span());
            Some(Box::new(stmt))
        } else {
            None
        };

        Stmt::If(IfStmt {
            cond,
            then_branch,
            else_branch,
            span,
        })
    }

    fn parse_while_stmt(&mut self, label: Option<Symbol>, start_span: Span) -> Stmt {
        self.expect(TokenKind::KeywordWhile);
        self.expect(TokenKind::LParen);
        let cond = self.parse_expr();
        self.expect(TokenKind::RParen);
        let body = self.parse_block();
        let span = start_span.merge(body.span);
        Stmt::While(WhileStmt {
            label,
            cond,
            body,
            span,
        })
    }

    fn parse_for_stmt(&mut self, label: Option<Symbol>, start_span: Span) -> Stmt {
        self.expect(TokenKind::KeywordFor);
        self.expect(TokenKind::LParen);

        let init = if self.check(TokenKind::Semicolon) {
            self.tokens.consume();
            None
        } else if self.at_var_decl_start() {
            Some(Box::new(self.parse_var_decl_stmt()))
        } else {
            let expr = self.parse_expr();
            let expr_span = expr.span();
            let semi = self.expect(TokenKind::Semicolon);
            Some(Box::new(Stmt::Expr(
                expr,
                expr_span.merge(self.span_of(&semi)),
            )))
        };

        let cond = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr())
        };
        self.expect(TokenKind::Semicolon);

        let update = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expr())
        };
        self.expect(TokenKind::RParen);

        let body = self.parse_block();
        let span = start_span.merge(body.span);
        Stmt::For(ForStmt {
            label,
            init,
            cond,
            update,
            body,
            span,
        })
    }

    fn parse_return_stmt(&mut self) -> Stmt {
        let start = self.expect(TokenKind::KeywordReturn);
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr())
        };
        let semi = self.expect(TokenKind::Semicolon);
        Stmt::Return(ReturnStmt {
            value,
            span: self.span_between(&start, &semi),
        })
    }

    fn parse_break_stmt(&mut self) -> Stmt {
        let start = self.expect(TokenKind::KeywordBreak);
        let label = if self.check(TokenKind::Identifier) {
            let tok = self.tokens.lt(1).clone();
            self.tokens.consume();
            Some(Symbol::intern(&tok.text))
        } else {
            None
        };
        let semi = self.expect(TokenKind::Semicolon);
        Stmt::Break(BreakStmt {
            label,
            span: self.span_between(&start, &semi),
        })
    }

    fn parse_throw_stmt(&mut self) -> Stmt {
        let start = self.expect(TokenKind::KeywordThrow);
        let value = self.parse_expr();
        let semi = self.expect(TokenKind::Semicolon);
        Stmt::Throw(ThrowStmt {
            value,
            span: self.span_between(&start, &semi),
        })
    }

    fn parse_try_stmt(&mut self) -> Stmt {
        let start = self.expect(TokenKind::KeywordTry);
        let body = self.parse_block();
        let mut span = self.span_of(&start).merge(body.span);

        let catch = if self.check(TokenKind::KeywordCatch) {
            let catch_start = self.tokens.lt(1).clone();
            self.tokens.consume();
            self.expect(TokenKind::LParen);
            let param_tok = self.expect(TokenKind::Identifier);
            self.expect(TokenKind::RParen);
            let catch_body = self.parse_block();
            let catch_span = self.span_of(&catch_start).merge(catch_body.span);
            span = span.merge(catch_span);
            Some(CatchClause {
                param: Symbol::intern(&param_tok.text),
                param_span: self.span_of(&param_tok),
                body: catch_body,
                span: catch_span,
            })
        } else {
            None
        };

        let finally = if self.check(TokenKind::KeywordFinally) {
            self.tokens.consume();
            let block = self.parse_block();
            span = span.merge(block.span);
            Some(block)
        } else {
            None
        };

        if catch.is_none() && finally.is_none() {
            DiagnosticBuilder::error("a try statement expects a catch or finally clause")
                .code(DiagnosticCode::E_PARSE_TRY_STATEMENT_EXPECTS_CATCH_OR_FINALLY)
                .span(span)
                .emit(self.handler);
        }

        Stmt::Try(TryStmt {
            body,
            catch,
            finally,
            span,
        })
    }
}
