//! String literal recognition: `"..."` with `\n \t \r \\ \" \'` and
//! `\uXXXX` escapes.

use kushc_util::diagnostic::DiagnosticCode;

use crate::token::{Token, TokenKind};
use crate::unicode::hex_digit_to_value;

use super::Lexer;

impl<'a> Lexer<'a> {
    pub(super) fn lex_string(&mut self, start: usize) -> Token {
        self.cursor.advance(); // opening quote

        loop {
            if self.cursor.is_at_end() {
                self.report_lex_error(
                    DiagnosticCode::E_LEX_UNTERMINATED_STRING_LITERAL,
                    "unterminated string literal",
                    start,
                );
                break;
            }
            match self.cursor.current_char() {
                '"' => {
                    self.cursor.advance();
                    break;
                }
                '\n' => {
                    self.report_lex_error(
                        DiagnosticCode::E_LEX_UNTERMINATED_STRING_LITERAL,
                        "unterminated string literal",
                        start,
                    );
                    break;
                }
                '\\' => {
                    self.cursor.advance();
                    self.lex_escape_sequence(start);
                }
                _ => {
                    self.cursor.advance();
                }
            }
        }

        let text = self.cursor.slice_from(start).to_string();
        self.make_token(TokenKind::StringLiteral, text, start)
    }

    fn lex_escape_sequence(&mut self, token_start: usize) {
        if self.cursor.is_at_end() {
            self.report_lex_error(
                DiagnosticCode::E_LEX_UNTERMINATED_STRING_LITERAL,
                "unterminated string literal",
                token_start,
            );
            return;
        }
        match self.cursor.current_char() {
            'n' | 't' | 'r' | '\\' | '"' | '\'' => {
                self.cursor.advance();
            }
            'u' => {
                self.cursor.advance();
                let mut digits = 0;
                while digits < 4 {
                    if hex_digit_to_value(self.cursor.current_char()).is_none() {
                        break;
                    }
                    self.cursor.advance();
                    digits += 1;
                }
                if digits != 4 {
                    self.report_lex_error(
                        DiagnosticCode::E_LEX_MALFORMED_UNICODE_CHARACTER_SEQUENCE,
                        "malformed \\u escape: expected exactly four hex digits",
                        token_start,
                    );
                }
            }
            other => {
                self.cursor.advance();
                self.report_lex_error(
                    DiagnosticCode::E_LEX_INVALID_ESCAPE_SEQUENCE,
                    format!("invalid escape sequence '\\{}'", other),
                    token_start,
                );
            }
        }
    }
}
