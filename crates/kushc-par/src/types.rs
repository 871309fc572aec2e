//! Type reference parsing: primitive keywords, structure names, and array
//! dimensions (`T[]`, `T[][]`, ...).

use kushc_lex::TokenKind;
use kushc_util::Symbol;

use crate::ast::{PrimitiveKeyword, TypeExpr};
use crate::Parser;

impl<'a> Parser<'a> {
    /// True if `la(1)` starts a type reference: a primitive keyword or an
    /// identifier (a structure name, or `string`).
    pub(crate) fn at_type_start(&mut self) -> bool {
        matches!(
            self.tokens.la(1),
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
                | TokenKind::KeywordVoid
                | TokenKind::Identifier
        )
    }

    pub(crate) fn parse_type(&mut self) -> TypeExpr {
        let tok = self.tokens.lt(1).clone();
        let mut base = if let Some(prim) = primitive_for(tok.kind) {
            self.tokens.consume();
            TypeExpr::Primitive(prim, self.span_of(&tok))
        } else if tok.kind == TokenKind::Identifier && tok.text == "string" {
            self.tokens.consume();
            TypeExpr::Primitive(PrimitiveKeyword::String, self.span_of(&tok))
        } else if tok.kind == TokenKind::Identifier {
            self.tokens.consume();
            TypeExpr::Named(Symbol::intern(&tok.text), self.span_of(&tok))
        } else {
            self.error_unexpected(TokenKind::Identifier);
            TypeExpr::Named(Symbol::intern("<error>"), self.span_of(&tok))
        };

        let mut dims = 0u32;
        while self.tokens.la(1) == TokenKind::LBracket && self.tokens.la(2) == TokenKind::RBracket
        {
            self.tokens.consume();
            self.tokens.consume();
            dims += 1;
        }
        if dims > 0 {
            let span = base.span();
            base = TypeExpr::Array(Box::new(base), dims, span);
        }
        base
    }
}

fn primitive_for(kind: TokenKind) -> Option<PrimitiveKeyword> {
    Some(match kind {
        TokenKind::KeywordBoolean => PrimitiveKeyword::Boolean,
        TokenKind::KeywordI8 => PrimitiveKeyword::I8,
        TokenKind::KeywordI16 => PrimitiveKeyword::I16,
        TokenKind::KeywordI32 => PrimitiveKeyword::I32,
        TokenKind::KeywordI64 => PrimitiveKeyword::I64,
        TokenKind::KeywordUi8 => PrimitiveKeyword::Ui8,
        TokenKind::KeywordUi16 => PrimitiveKeyword::Ui16,
        TokenKind::KeywordUi32 => PrimitiveKeyword::Ui32,
        TokenKind::KeywordUi64 => PrimitiveKeyword::Ui64,
        TokenKind::KeywordF32 => PrimitiveKeyword::F32,
        TokenKind::KeywordF64 => PrimitiveKeyword::F64,
        TokenKind::KeywordVoid => PrimitiveKeyword::Void,
        _ => return None,
    })
}
