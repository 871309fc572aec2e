//! Operator and punctuation recognition by maximal munch: at each position
//! the longest matching lexeme wins (e.g. `>>>=` lexes as one token, never
//! as `>`, `>`, `>`, `=`).

use crate::token::{Token, TokenKind};

use super::Lexer;

impl<'a> Lexer<'a> {
    pub(super) fn lex_operator(&mut self, start: usize) -> Token {
        let c = self.cursor.current_char();
        let kind = match c {
            '!' => self.munch(start, &[("!=", TokenKind::BangEqual)], TokenKind::Bang),
            '@' => self.munch1(TokenKind::At),
            '#' => self.munch1(TokenKind::Hash),
            '%' => self.munch(start, &[("%=", TokenKind::PercentEqual)], TokenKind::Percent),
            '&' => self.munch(
                start,
                &[("&&", TokenKind::Amp2), ("&=", TokenKind::AmpEqual)],
                TokenKind::Amp,
            ),
            '(' => self.munch1(TokenKind::LParen),
            ')' => self.munch1(TokenKind::RParen),
            '*' => self.munch(
                start,
                &[
                    ("**=", TokenKind::Star2Equal),
                    ("**", TokenKind::Star2),
                    ("*=", TokenKind::StarEqual),
                ],
                TokenKind::Star,
            ),
            '+' => self.munch(
                start,
                &[("++", TokenKind::Plus2), ("+=", TokenKind::PlusEqual)],
                TokenKind::Plus,
            ),
            ',' => self.munch1(TokenKind::Comma),
            '-' => self.munch(
                start,
                &[
                    ("->", TokenKind::Arrow),
                    ("--", TokenKind::Minus2),
                    ("-=", TokenKind::MinusEqual),
                ],
                TokenKind::Minus,
            ),
            '.' => self.munch(
                start,
                &[("...", TokenKind::Ellipsis), ("..", TokenKind::DotDot)],
                TokenKind::Dot,
            ),
            '/' => self.munch(start, &[("/=", TokenKind::SlashEqual)], TokenKind::Slash),
            ':' => self.munch(start, &[("::", TokenKind::ColonColon)], TokenKind::Colon),
            ';' => self.munch1(TokenKind::Semicolon),
            '<' => self.munch(
                start,
                &[
                    ("<<=", TokenKind::LAngle2Equal),
                    ("<<", TokenKind::LAngle2),
                    ("<=", TokenKind::LAngleEqual),
                ],
                TokenKind::LAngle,
            ),
            '>' => self.munch(
                start,
                &[
                    (">>>=", TokenKind::RAngle3Equal),
                    (">>>", TokenKind::RAngle3),
                    (">>=", TokenKind::RAngle2Equal),
                    (">>", TokenKind::RAngle2),
                    (">=", TokenKind::RAngleEqual),
                ],
                TokenKind::RAngle,
            ),
            '=' => self.munch(start, &[("==", TokenKind::Equal2)], TokenKind::Equal),
            '?' => self.munch1(TokenKind::Hook),
            '{' => self.munch1(TokenKind::LBrace),
            '}' => self.munch1(TokenKind::RBrace),
            '[' => self.munch1(TokenKind::LBracket),
            ']' => self.munch1(TokenKind::RBracket),
            '^' => self.munch(start, &[("^=", TokenKind::CaretEqual)], TokenKind::Caret),
            '|' => self.munch(
                start,
                &[("||", TokenKind::Pipe2), ("|=", TokenKind::PipeEqual)],
                TokenKind::Pipe,
            ),
            '~' => self.munch(start, &[("~=", TokenKind::TildeEqual)], TokenKind::Tilde),
            _ => unreachable!("lex_operator called on non-operator character '{}'", c),
        };
        let text = self.cursor.slice_from(start).to_string();
        self.make_token(kind, text, start)
    }

    fn munch1(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.advance();
        kind
    }

    /// Tries each `(lexeme, kind)` candidate longest-first (callers must
    /// already order `candidates` by descending length), falling back to
    /// the single-character `default` kind.
    fn munch(
        &mut self,
        _start: usize,
        candidates: &[(&str, TokenKind)],
        default: TokenKind,
    ) -> TokenKind {
        for (lexeme, kind) in candidates {
            if self.matches_ahead(lexeme) {
                self.cursor.advance_n(lexeme.chars().count());
                return *kind;
            }
        }
        self.cursor.advance();
        default
    }

    fn matches_ahead(&self, lexeme: &str) -> bool {
        lexeme
            .chars()
            .enumerate()
            .all(|(i, ch)| self.cursor.peek_char(i) == ch)
    }
}
