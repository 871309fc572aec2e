//! Identifier and keyword recognition.

use crate::token::{Token, TokenKind};
use crate::unicode::is_ascii_ident_continue;

use super::Lexer;

impl<'a> Lexer<'a> {
    /// Scans `[A-Za-z_][A-Za-z0-9_]*` starting at the cursor, then replaces
    /// the kind with the matching keyword kind if the lexeme is reserved.
    pub(super) fn lex_identifier(&mut self) -> Token {
        let start = self.cursor.position();
        while is_ascii_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start).to_string();
        let kind = TokenKind::keyword_from_text(&text).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, text, start)
    }
}
