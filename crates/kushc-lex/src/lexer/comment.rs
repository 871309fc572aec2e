//! Whitespace, newline and comment tokens — always hidden-channel.

use kushc_util::diagnostic::DiagnosticCode;

use crate::token::{Token, TokenKind};

use super::Lexer;

impl<'a> Lexer<'a> {
    /// One contiguous run of space/tab/carriage-return.
    pub(super) fn lex_whitespace(&mut self, start: usize) -> Token {
        while matches!(self.cursor.current_char(), ' ' | '\t' | '\r') {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start).to_string();
        self.make_token(TokenKind::Whitespace, text, start)
    }

    /// A single `\n`. Emitted on its own so a caller reconstructing source
    /// text from the token stream reproduces line breaks exactly.
    pub(super) fn lex_newline(&mut self, start: usize) -> Token {
        self.cursor.advance();
        self.make_token(TokenKind::Newline, "\n".to_string(), start)
    }

    /// `// ... <EOL>`. The terminating newline is not consumed; it is lexed
    /// as its own `Newline` token on the next call.
    pub(super) fn lex_single_line_comment(&mut self, start: usize) -> Token {
        self.cursor.advance();
        self.cursor.advance();
        while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start).to_string();
        self.make_token(TokenKind::SingleLineComment, text, start)
    }

    /// `/* ... */`, possibly spanning multiple lines. An unterminated
    /// comment reports an error but still returns a best-effort token
    /// covering the remainder of the file.
    pub(super) fn lex_multi_line_comment(&mut self, start: usize) -> Token {
        self.cursor.advance();
        self.cursor.advance();
        let mut closed = false;
        while !self.cursor.is_at_end() {
            if self.cursor.current_char() == '*' && self.cursor.peek_char(1) == '/' {
                self.cursor.advance();
                self.cursor.advance();
                closed = true;
                break;
            }
            self.cursor.advance();
        }
        if !closed {
            self.report_lex_error(
                DiagnosticCode::E_LEX_UNTERMINATED_MULTI_LINE_COMMENT,
                "unterminated multi-line comment",
                start,
            );
        }
        let text = self.cursor.slice_from(start).to_string();
        self.make_token(TokenKind::MultiLineComment, text, start)
    }
}
