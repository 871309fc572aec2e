//! Token stream: a lookahead/seek view over lexer output, channel-filtered.

use kushc_util::Handler;

use crate::lexer::Lexer;
use crate::token::{Channel, Token, TokenKind};

/// Buffers tokens from a [`Lexer`] on demand and exposes channel-filtered
/// lookahead to the parser. Once the end-of-stream token has been fetched
/// into the buffer, the underlying lexer is never called again.
pub struct TokenStream<'a> {
    lexer: Lexer<'a>,
    buffer: Vec<Token>,
    /// Index into `buffer` of the current (most recently consumed) token.
    cursor: usize,
    /// The channel lookahead and lookback are restricted to.
    channel: Channel,
    eof_index: Option<usize>,
}

impl<'a> TokenStream<'a> {
    pub fn new(source: &'a str, handler: &'a Handler) -> Self {
        Self::from_lexer(Lexer::new(source, handler))
    }

    pub fn from_lexer(lexer: Lexer<'a>) -> Self {
        let mut stream = Self {
            lexer,
            buffer: Vec::new(),
            cursor: 0,
            channel: Channel::Default,
            eof_index: None,
        };
        stream.fill(1);
        stream
    }

    /// Ensures the buffer holds at least `count` tokens (or has reached EOF).
    fn fill(&mut self, count: usize) {
        while self.buffer.len() < count && self.eof_index.is_none() {
            let token = self.lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            self.buffer.push(token);
            if is_eof {
                self.eof_index = Some(self.buffer.len() - 1);
            }
        }
    }

    /// Returns the token at absolute buffer index `i`, filling as needed.
    /// Past the end-of-stream token, the end-of-stream token is returned.
    pub fn get(&mut self, i: usize) -> &Token {
        self.fill(i + 1);
        let last = self.buffer.len() - 1;
        &self.buffer[i.min(last)]
    }

    fn next_on_channel(&mut self, mut i: usize, channel: Channel) -> usize {
        loop {
            let tok = self.get(i);
            if tok.kind == TokenKind::Eof || tok.channel == channel {
                return i;
            }
            i += 1;
        }
    }

    fn prev_on_channel(&self, mut i: usize, channel: Channel) -> usize {
        while i > 0 {
            i -= 1;
            if self.buffer[i].channel == channel {
                return i;
            }
        }
        0
    }

    /// Lookahead `k` tokens on the configured channel from the cursor.
    /// `la(1)` is the next unconsumed token; `la(0)` is invalid by
    /// convention and treated as `la(1)`.
    pub fn la(&mut self, k: i32) -> TokenKind {
        self.lt(k).kind
    }

    /// Same as [`TokenStream::la`] but returns the full token.
    pub fn lt(&mut self, k: i32) -> &Token {
        if k == 0 {
            return self.get(self.cursor);
        }
        if k > 0 {
            let mut idx = self.next_on_channel(self.cursor, self.channel);
            for _ in 1..k {
                if self.get(idx).kind == TokenKind::Eof {
                    break;
                }
                idx = self.next_on_channel(idx + 1, self.channel);
            }
            self.get(idx)
        } else {
            let mut idx = self.cursor;
            for _ in 0..(-k) {
                idx = self.prev_on_channel(idx, self.channel);
            }
            &self.buffer[idx]
        }
    }

    /// Advances the cursor to the next token on the configured channel.
    /// A no-op once the end-of-stream token has been reached.
    pub fn consume(&mut self) {
        let current = self.get(self.cursor);
        if current.kind == TokenKind::Eof {
            return;
        }
        self.cursor = self.next_on_channel(self.cursor + 1, self.channel);
    }

    /// The token the cursor currently sits on.
    pub fn current(&mut self) -> &Token {
        self.get(self.cursor)
    }

    pub fn is_at_eof(&mut self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    /// All tokens buffered so far, including hidden-channel ones, in
    /// stream order. Used to reconstruct source text exactly.
    pub fn buffered_tokens(&self) -> &[Token] {
        &self.buffer
    }

    /// Drains the remainder of the lexer into the buffer and returns every
    /// token (default and hidden channel) in order.
    pub fn drain_all(mut self) -> Vec<Token> {
        loop {
            let last = self.buffer.last();
            if matches!(last, Some(t) if t.kind == TokenKind::Eof) {
                break;
            }
            self.fill(self.buffer.len() + 1);
        }
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn la_skips_hidden_channel_tokens() {
        let handler = Handler::new();
        let mut stream = TokenStream::new("a /* c */ b", &handler);
        assert_eq!(stream.la(1), TokenKind::Identifier);
        assert_eq!(stream.lt(1).text, "a");
        assert_eq!(stream.la(2), TokenKind::Identifier);
        assert_eq!(stream.lt(2).text, "b");
    }

    #[test]
    fn consume_advances_past_hidden_tokens() {
        let handler = Handler::new();
        let mut stream = TokenStream::new("a b", &handler);
        assert_eq!(stream.lt(1).text, "a");
        stream.consume();
        assert_eq!(stream.current().text, "a");
        assert_eq!(stream.la(1), TokenKind::Identifier);
        assert_eq!(stream.lt(1).text, "b");
    }

    #[test]
    fn eof_is_observable_but_not_consumed_past() {
        let handler = Handler::new();
        let mut stream = TokenStream::new("a", &handler);
        stream.consume();
        assert_eq!(stream.la(1), TokenKind::Eof);
        stream.consume();
        stream.consume();
        assert!(stream.is_at_eof());
    }

    #[test]
    fn negative_lookahead_walks_backwards() {
        let handler = Handler::new();
        let mut stream = TokenStream::new("a b c", &handler);
        stream.consume();
        stream.consume();
        assert_eq!(stream.current().text, "b");
        assert_eq!(stream.lt(-1).text, "a");
    }

    #[test]
    fn hidden_tokens_remain_indexable_after_being_skipped() {
        let handler = Handler::new();
        let mut stream = TokenStream::new("a b", &handler);
        stream.fill(10);
        assert_eq!(stream.get(1).kind, TokenKind::Whitespace);
    }
}
