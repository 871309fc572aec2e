//! kushc-lex — the Kush lexer and token stream.
//!
//! Turns UTF-8 source bytes into a stream of [`Token`]s. The lexer itself
//! ([`Lexer`]) emits exactly one token per call, including hidden-channel
//! trivia (whitespace, newlines, comments); [`TokenStream`] buffers that
//! output and gives the parser channel-filtered lookahead.

pub mod cursor;
pub mod lexer;
pub mod stream;
pub mod token;
pub mod unicode;

pub use cursor::Cursor;
pub use lexer::Lexer;
pub use stream::TokenStream;
pub use token::{Channel, Token, TokenKind};

#[cfg(test)]
mod tests {
    use super::*;
    use kushc_util::Handler;

    fn lex_default_channel(source: &str) -> Vec<Token> {
        let handler = Handler::new();
        let lexer = Lexer::new(source, &handler);
        lexer
            .filter(|t| t.channel == Channel::Default)
            .collect()
    }

    #[test]
    fn identity_function_tokenizes() {
        let tokens = lex_default_channel("i32 identity(i32 x) { return x; }");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::KeywordI32,
                TokenKind::Identifier,
                TokenKind::LParen,
                TokenKind::KeywordI32,
                TokenKind::Identifier,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::KeywordReturn,
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::RBrace,
            ]
        );
    }

    #[test]
    fn maximal_munch_prefers_longest_operator() {
        let tokens = lex_default_channel(">>>=");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::RAngle3Equal);

        let tokens = lex_default_channel(">>= =");
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![TokenKind::RAngle2Equal, TokenKind::Equal]
        );

        let tokens = lex_default_channel(">>> =");
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![TokenKind::RAngle3, TokenKind::Equal]
        );
    }

    #[test]
    fn keyword_vs_identifier_boundary() {
        let tokens = lex_default_channel("iffy if");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "iffy");
        assert_eq!(tokens[1].kind, TokenKind::KeywordIf);
    }

    #[test]
    fn underscore_digit_separators() {
        let handler = Handler::new();
        let tokens: Vec<_> = Lexer::new("1_000_000", &handler).collect();
        assert_eq!(tokens[0].kind, TokenKind::IntegerLiteral);
        assert_eq!(tokens[0].text, "1_000_000");
        assert!(!handler.has_errors());

        let handler = Handler::new();
        let _ = Lexer::new("1__0", &handler).next_token();
        assert!(handler.has_errors());

        let tokens = lex_default_channel("_10");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
    }

    #[test]
    fn empty_string_literal_has_length_two() {
        let tokens = lex_default_channel("\"\"");
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].text.len(), 2);
    }

    #[test]
    fn unicode_escape_length_is_source_length_not_decoded_length() {
        let tokens = lex_default_channel("\"\\u0041\"");
        assert_eq!(tokens[0].text, "\"\\u0041\"");
        assert_eq!(tokens[0].text.len(), 8);
    }

    #[test]
    fn unknown_character_is_reported_and_consumed() {
        let handler = Handler::new();
        let tokens: Vec<_> = Lexer::new("a ` b", &handler).collect();
        assert!(handler.has_errors());
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Unknown));
    }

    #[test]
    fn token_text_reconstructs_source_exactly() {
        let source = "i32 f(i32 x) {\n  // comment\n  return x; /* trailing */\n}\n";
        let handler = Handler::new();
        let lexer = Lexer::new(source, &handler);
        let mut rebuilt = String::new();
        for token in lexer {
            rebuilt.push_str(&token.text);
        }
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn every_token_position_invariant_holds() {
        let source = "struct Point { i32 x; i32 y; }\nimport kush.core.*;\n";
        let handler = Handler::new();
        for token in Lexer::new(source, &handler) {
            if token.kind == TokenKind::Eof {
                continue;
            }
            assert!(token.start_index <= token.stop_index);
            assert!(token.start_line <= token.stop_line);
            assert_eq!(token.text.len(), token.stop_index - token.start_index + 1);
        }
    }
}
