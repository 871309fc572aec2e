//! Integer and floating-point literal recognition.

use kushc_util::diagnostic::DiagnosticCode;

use crate::token::{Token, TokenKind};
use crate::unicode::is_digit_in_base;

use super::Lexer;

impl<'a> Lexer<'a> {
    /// Decimal, `0x`/`0X` hex, `0o`/`0O` octal, `0b`/`0B` binary integers,
    /// and floating-point literals with a decimal point and/or exponent.
    /// Underscores may separate digits; each must be followed by a digit.
    pub(super) fn lex_number(&mut self, start: usize) -> Token {
        let base = if self.cursor.current_char() == '0' {
            match self.cursor.peek_char(1) {
                'x' | 'X' => Some(16),
                'o' | 'O' => Some(8),
                'b' | 'B' => Some(2),
                c if c.is_alphabetic() => {
                    self.cursor.advance();
                    self.cursor.advance();
                    self.report_lex_error(
                        DiagnosticCode::E_LEX_INVALID_INTEGER_LITERAL_PREFIX,
                        format!("invalid integer literal prefix '0{}'", c),
                        start,
                    );
                    let text = self.cursor.slice_from(start).to_string();
                    return self.make_token(TokenKind::IntegerLiteral, text, start);
                }
                _ => None,
            }
        } else {
            None
        };

        if let Some(base) = base {
            self.cursor.advance();
            self.cursor.advance();
            self.consume_digits_with_underscores(base, start);
            let text = self.cursor.slice_from(start).to_string();
            return self.make_token(TokenKind::IntegerLiteral, text, start);
        }

        self.consume_digits_with_underscores(10, start);

        let mut is_float = false;
        if self.cursor.current_char() == '.' && self.cursor.peek_char(1).is_ascii_digit() {
            is_float = true;
            self.cursor.advance();
            self.consume_digits_with_underscores(10, start);
        }
        if matches!(self.cursor.current_char(), 'e' | 'E') {
            let save = self.cursor.snapshot();
            self.cursor.advance();
            if matches!(self.cursor.current_char(), '+' | '-') {
                self.cursor.advance();
            }
            if self.cursor.current_char().is_ascii_digit() {
                is_float = true;
                self.consume_digits_with_underscores(10, start);
            } else {
                self.cursor.restore(save);
            }
        }

        let text = self.cursor.slice_from(start).to_string();
        let kind = if is_float {
            TokenKind::FloatingPointLiteral
        } else {
            TokenKind::IntegerLiteral
        };
        self.make_token(kind, text, start)
    }

    fn consume_digits_with_underscores(&mut self, base: u32, token_start: usize) {
        while is_digit_in_base(self.cursor.current_char(), base) {
            self.cursor.advance();
            if self.cursor.current_char() == '_' {
                self.cursor.advance();
                if !is_digit_in_base(self.cursor.current_char(), base) {
                    self.report_lex_error(
                        DiagnosticCode::E_LEX_EXPECTED_DIGIT_AFTER_UNDERSCORE,
                        "expected a digit after '_' in numeric literal",
                        token_start,
                    );
                    return;
                }
            }
        }
    }
}
