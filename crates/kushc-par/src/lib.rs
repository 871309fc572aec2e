//! kushc-par — recursive-descent parser producing the Kush AST.
//!
//! Syntax errors never abort parsing: a production that cannot match
//! `la(1)` reports `UNEXPECTED_TOKEN` and synchronizes by consuming tokens
//! until one in the current rule's follow set appears, then returns a
//! best-effort node. [`Parser::parse_module`] always returns a `Module`.

pub mod ast;
mod expr;
mod items;
mod stmt;
mod types;

use kushc_lex::{Token, TokenKind, TokenStream};
use kushc_util::diagnostic::{DiagnosticBuilder, DiagnosticCode};
use kushc_util::span::{FileId, Span};
use kushc_util::Handler;

use ast::Module;

pub struct Parser<'a> {
    tokens: TokenStream<'a>,
    handler: &'a Handler,
    file_id: FileId,
}

/// Tokens that end a statement or item, used to resynchronize after a
/// syntax error so later declarations are still parsed and checked.
const ITEM_FOLLOW: &[TokenKind] = &[
    TokenKind::KeywordImport,
    TokenKind::KeywordStruct,
    TokenKind::Eof,
];
const STATEMENT_FOLLOW: &[TokenKind] = &[TokenKind::Semicolon, TokenKind::RBrace, TokenKind::Eof];

impl<'a> Parser<'a> {
    pub fn new(tokens: TokenStream<'a>, handler: &'a Handler) -> Self {
        Self::with_file(tokens, handler, FileId::DUMMY)
    }

    pub fn with_file(tokens: TokenStream<'a>, handler: &'a Handler, file_id: FileId) -> Self {
        Self {
            tokens,
            handler,
            file_id,
        }
    }

    pub fn parse_module(&mut self) -> Module {
        let start = self.tokens.lt(1).clone();
        let mut imports = Vec::new();
        let mut structures = Vec::new();
        let mut functions = Vec::new();

        while self.tokens.la(1) == TokenKind::KeywordImport {
            imports.push(self.parse_import());
        }

        loop {
            match self.tokens.la(1) {
                TokenKind::KeywordStruct => structures.push(self.parse_structure()),
                TokenKind::Eof => break,
                kind if self.at_type_start() || kind == TokenKind::Identifier => {
                    functions.push(self.parse_function())
                }
                _ => {
                    self.error_unexpected(TokenKind::KeywordStruct);
                    self.synchronize(ITEM_FOLLOW);
                    if self.tokens.la(1) == TokenKind::Eof {
                        break;
                    }
                }
            }
        }

        let end = self.tokens.lt(0).clone();
        Module {
            imports,
            structures,
            functions,
            span: self.span_between(&start, &end),
        }
    }

    // -- shared helpers -------------------------------------------------

    pub(crate) fn span_of(&self, tok: &Token) -> Span {
        Span::with_file(
            tok.start_index,
            tok.stop_index + 1,
            self.file_id,
            tok.start_line,
            tok.start_column,
        )
    }

    pub(crate) fn span_between(&self, start: &Token, end: &Token) -> Span {
        Span::with_file(
            start.start_index,
            end.stop_index + 1,
            self.file_id,
            start.start_line,
            start.start_column,
        )
    }

    /// Reports `UNEXPECTED_TOKEN` for the current `la(1)` against an
    /// `expected` kind, using the spec's exact message format.
    pub(crate) fn error_unexpected(&mut self, expected: TokenKind) {
        let found = self.tokens.lt(1).clone();
        let message = format!(
            "Expected token '{:?}', encountered token '{:?}'",
            expected, found.kind
        );
        DiagnosticBuilder::error(message)
            .code(DiagnosticCode::E_PARSE_UNEXPECTED_TOKEN)
            .span(self.span_of(&found))
            .emit(self.handler);
    }

    /// Consumes and returns the current token if it matches `kind`;
    /// otherwise reports `UNEXPECTED_TOKEN` and returns the unmatched token
    /// without consuming it, so the caller's synchronization can proceed.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Token {
        let tok = self.tokens.lt(1).clone();
        if tok.kind == kind {
            self.tokens.consume();
            tok
        } else {
            self.error_unexpected(kind);
            tok
        }
    }

    pub(crate) fn check(&mut self, kind: TokenKind) -> bool {
        self.tokens.la(1) == kind
    }

    /// Consumes tokens until `la(1)` is in `follow` or end-of-stream.
    pub(crate) fn synchronize(&mut self, follow: &[TokenKind]) {
        while !follow.contains(&self.tokens.la(1)) && self.tokens.la(1) != TokenKind::Eof {
            self.tokens.consume();
        }
    }

    pub(crate) fn synchronize_statement(&mut self) {
        self.synchronize(STATEMENT_FOLLOW);
        if self.tokens.la(1) == TokenKind::Semicolon {
            self.tokens.consume();
        }
    }
}
