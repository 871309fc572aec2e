//! Top-level item parsing: imports, structures, and functions.

use kushc_lex::TokenKind;
use kushc_util::Symbol;

use crate::ast::{FieldDecl, Function, Import, Param, Structure};
use crate::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_import(&mut self) -> Import {
        let start = self.expect(TokenKind::KeywordImport);
        let mut path = Vec::new();
        loop {
            let seg = self.expect(TokenKind::Identifier);
            path.push((Symbol::intern(&seg.text), self.span_of(&seg)));
            if self.check(TokenKind::Dot) {
                self.tokens.consume();
                if self.check(TokenKind::Star) {
                    self.tokens.consume();
                    let semi = self.expect(TokenKind::Semicolon);
                    return Import {
                        path,
                        wildcard: true,
                        span: self.span_between(&start, &semi),
                    };
                }
                continue;
            }
            break;
        }
        let semi = self.expect(TokenKind::Semicolon);
        Import {
            path,
            wildcard: false,
            span: self.span_between(&start, &semi),
        }
    }

    pub(crate) fn parse_structure(&mut self) -> Structure {
        let start = self.expect(TokenKind::KeywordStruct);
        let name_tok = self.expect(TokenKind::Identifier);
        self.expect(TokenKind::LBrace);
        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            let ty = self.parse_type();
            let field_name = self.expect(TokenKind::Identifier);
            let semi = self.expect(TokenKind::Semicolon);
            let field_span = ty.span().merge(self.span_of(&semi));
            fields.push(FieldDecl {
                span: field_span,
                ty,
                name: Symbol::intern(&field_name.text),
            });
        }
        let end = self.expect(TokenKind::RBrace);
        Structure {
            name: Symbol::intern(&name_tok.text),
            name_span: self.span_of(&name_tok),
            fields,
            span: self.span_between(&start, &end),
        }
    }

    pub(crate) fn parse_function(&mut self) -> Function {
        let return_type = self.parse_type();
        let name_tok = self.expect(TokenKind::Identifier);
        self.expect(TokenKind::LParen);

        let mut params = Vec::new();
        let mut variadic = None;
        if !self.check(TokenKind::RParen) {
            loop {
                if self.check(TokenKind::Ellipsis) {
                    self.tokens.consume();
                    variadic = Some(self.parse_param());
                    break;
                }
                params.push(self.parse_param());
                if self.check(TokenKind::Comma) {
                    self.tokens.consume();
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RParen);

        let body = self.parse_block();
        let span = return_type.span().merge(body.span);
        Function {
            return_type,
            name: Symbol::intern(&name_tok.text),
            name_span: self.span_of(&name_tok),
            params,
            variadic,
            body,
            span,
        }
    }

    fn parse_param(&mut self) -> Param {
        let ty = self.parse_type();
        let name_tok = self.expect(TokenKind::Identifier);
        let span = ty.span().merge(self.span_of(&name_tok));
        Param {
            ty,
            name: Symbol::intern(&name_tok.text),
            span,
        }
    }
}
