//! Main lexer dispatch: the `Lexer` struct and `next_token`.

use kushc_util::diagnostic::{DiagnosticBuilder, DiagnosticCode};
use kushc_util::span::{FileId, Span};
use kushc_util::Handler;

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};
use crate::unicode::is_ascii_ident_start;

/// Transforms one source file into a stream of [`Token`]s, one per call to
/// [`Lexer::next_token`]. Every character of the input is accounted for in
/// some token: whitespace, newlines and comments are emitted as
/// hidden-channel tokens rather than silently discarded.
pub struct Lexer<'a> {
    pub(super) cursor: Cursor<'a>,
    pub(super) handler: &'a Handler,
    pub(super) file_id: FileId,
    pub(super) token_start_line: u32,
    pub(super) token_start_column: u32,
    pub(super) stream_index: usize,
    pub(super) eof_emitted: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, handler: &'a Handler) -> Self {
        Self::with_file(source, handler, FileId::DUMMY)
    }

    pub fn with_file(source: &'a str, handler: &'a Handler, file_id: FileId) -> Self {
        Self {
            cursor: Cursor::new(source),
            handler,
            file_id,
            token_start_line: 0,
            token_start_column: 0,
            stream_index: 0,
            eof_emitted: false,
        }
    }

    /// Produces the next token, including hidden-channel trivia. Once the
    /// end-of-stream token has been returned, every subsequent call returns
    /// it again without touching the cursor.
    pub fn next_token(&mut self) -> Token {
        if self.eof_emitted {
            return self.eof_token();
        }

        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();
        let start = self.cursor.position();

        if self.cursor.is_at_end() {
            self.eof_emitted = true;
            return self.eof_token();
        }

        let c = self.cursor.current_char();
        match c {
            ' ' | '\t' | '\r' => self.lex_whitespace(start),
            '\n' => self.lex_newline(start),
            '/' if self.cursor.peek_char(1) == '/' => self.lex_single_line_comment(start),
            '/' if self.cursor.peek_char(1) == '*' => self.lex_multi_line_comment(start),
            '"' => self.lex_string(start),
            '_' if !is_ascii_ident_start(self.cursor.peek_char(1))
                && !self.cursor.peek_char(1).is_ascii_digit() =>
            {
                self.cursor.advance();
                self.make_token(TokenKind::Identifier, "_".to_string(), start)
            }
            c if is_ascii_ident_start(c) => self.lex_identifier(),
            c if c.is_ascii_digit() => self.lex_number(start),
            c if is_operator_start(c) => self.lex_operator(start),
            _ => {
                self.cursor.advance();
                let text = c.to_string();
                self.report_lex_error(
                    DiagnosticCode::E_LEX_UNKNOWN_CHARACTER,
                    format!("unknown character '{}'", c),
                    start,
                );
                self.make_token(TokenKind::Unknown, text, start)
            }
        }
    }

    fn eof_token(&mut self) -> Token {
        let pos = self.cursor.position();
        let index = self.next_stream_index();
        Token {
            kind: TokenKind::Eof,
            channel: TokenKind::Eof.channel(),
            text: String::new(),
            start_index: pos,
            stop_index: pos,
            start_line: self.cursor.line(),
            stop_line: self.cursor.line(),
            start_column: self.cursor.column(),
            stop_column: self.cursor.column(),
            file_id: self.file_id,
            stream_index: index,
        }
    }

    pub(super) fn make_token(&mut self, kind: TokenKind, text: String, start: usize) -> Token {
        let stop = self.cursor.position().saturating_sub(1).max(start);
        let index = self.next_stream_index();
        Token {
            kind,
            channel: kind.channel(),
            text,
            start_index: start,
            stop_index: stop,
            start_line: self.token_start_line,
            stop_line: self.cursor.line(),
            start_column: self.token_start_column,
            stop_column: self.cursor.column().saturating_sub(1).max(0),
            file_id: self.file_id,
            stream_index: index,
        }
    }

    pub(super) fn next_stream_index(&mut self) -> usize {
        let index = self.stream_index;
        self.stream_index += 1;
        index
    }

    pub(super) fn report_lex_error(
        &self,
        code: DiagnosticCode,
        message: impl Into<String>,
        start: usize,
    ) {
        let span = Span::with_file(
            start,
            self.cursor.position(),
            self.file_id,
            self.token_start_line,
            self.token_start_column,
        );
        DiagnosticBuilder::error(message)
            .code(code)
            .span(span)
            .emit(self.handler);
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.eof_emitted {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

fn is_operator_start(c: char) -> bool {
    matches!(
        c,
        '!' | '@'
            | '#'
            | '%'
            | '&'
            | '('
            | ')'
            | '*'
            | '+'
            | ','
            | '-'
            | '.'
            | '/'
            | ':'
            | ';'
            | '<'
            | '>'
            | '='
            | '?'
            | '{'
            | '}'
            | '['
            | ']'
            | '^'
            | '|'
            | '~'
    )
}
