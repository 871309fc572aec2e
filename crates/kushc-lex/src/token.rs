//! Token model: the fixed [`TokenKind`] taxonomy and the owning [`Token`]
//! struct produced by the lexer.

use kushc_util::span::FileId;

/// Which channel a token belongs to.
///
/// Parsers only see [`Channel::Default`] tokens by default; hidden-channel
/// tokens (whitespace, newlines, comments) are still buffered so source text
/// can be reconstructed exactly from the token stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Default,
    Hidden,
}

/// The closed set of token kinds recognized by the Kush lexer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Trivia / structural
    Whitespace,
    Newline,
    Eof,
    Unknown,

    // Literals and names
    Identifier,
    IntegerLiteral,
    FloatingPointLiteral,
    StringLiteral,

    // Comments
    SingleLineComment,
    MultiLineComment,

    // Operators and punctuation (maximal munch)
    BangEqual,
    Bang,
    At,
    Hash,
    PercentEqual,
    Percent,
    Amp2,
    AmpEqual,
    Amp,
    LParen,
    RParen,
    Star2Equal,
    Star2,
    StarEqual,
    Star,
    Plus2,
    PlusEqual,
    Plus,
    Comma,
    Minus2,
    Arrow,
    MinusEqual,
    Minus,
    Ellipsis,
    DotDot,
    Dot,
    SlashEqual,
    Slash,
    ColonColon,
    Colon,
    Semicolon,
    LAngle2Equal,
    LAngle2,
    LAngleEqual,
    LAngle,
    RAngle3Equal,
    RAngle3,
    RAngle2Equal,
    RAngle2,
    RAngleEqual,
    RAngle,
    Equal2,
    Equal,
    Hook,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    CaretEqual,
    Caret,
    Pipe2,
    PipeEqual,
    Pipe,
    TildeEqual,
    Tilde,

    // Keywords, alphabetical per the closed taxonomy
    KeywordBoolean,
    KeywordBreak,
    KeywordCatch,
    KeywordElse,
    KeywordF32,
    KeywordF64,
    KeywordFalse,
    KeywordFinally,
    KeywordFor,
    KeywordI16,
    KeywordI32,
    KeywordI64,
    KeywordI8,
    KeywordIf,
    KeywordImport,
    KeywordLet,
    KeywordNative,
    KeywordNew,
    KeywordNull,
    KeywordReturn,
    KeywordStruct,
    KeywordThis,
    KeywordThrow,
    KeywordTrue,
    KeywordTry,
    KeywordUi16,
    KeywordUi32,
    KeywordUi64,
    KeywordUi8,
    KeywordVar,
    KeywordVoid,
    KeywordWhile,
    KeywordWith,
}

impl TokenKind {
    /// Returns the channel this kind is always produced on.
    pub fn channel(self) -> Channel {
        match self {
            TokenKind::Whitespace
            | TokenKind::Newline
            | TokenKind::SingleLineComment
            | TokenKind::MultiLineComment => Channel::Hidden,
            _ => Channel::Default,
        }
    }

    /// Looks up the keyword kind for an already-scanned identifier lexeme.
    /// Returns `None` if `text` is an ordinary identifier (including the
    /// special-cased `string` type name, which is not a reserved word).
    pub fn keyword_from_text(text: &str) -> Option<TokenKind> {
        Some(match text {
            "boolean" => TokenKind::KeywordBoolean,
            "break" => TokenKind::KeywordBreak,
            "catch" => TokenKind::KeywordCatch,
            "else" => TokenKind::KeywordElse,
            "f32" => TokenKind::KeywordF32,
            "f64" => TokenKind::KeywordF64,
            "false" => TokenKind::KeywordFalse,
            "finally" => TokenKind::KeywordFinally,
            "for" => TokenKind::KeywordFor,
            "i16" => TokenKind::KeywordI16,
            "i32" => TokenKind::KeywordI32,
            "i64" => TokenKind::KeywordI64,
            "i8" => TokenKind::KeywordI8,
            "if" => TokenKind::KeywordIf,
            "import" => TokenKind::KeywordImport,
            "let" => TokenKind::KeywordLet,
            "native" => TokenKind::KeywordNative,
            "new" => TokenKind::KeywordNew,
            "null" => TokenKind::KeywordNull,
            "return" => TokenKind::KeywordReturn,
            "struct" => TokenKind::KeywordStruct,
            "this" => TokenKind::KeywordThis,
            "throw" => TokenKind::KeywordThrow,
            "true" => TokenKind::KeywordTrue,
            "try" => TokenKind::KeywordTry,
            "ui16" => TokenKind::KeywordUi16,
            "ui32" => TokenKind::KeywordUi32,
            "ui64" => TokenKind::KeywordUi64,
            "ui8" => TokenKind::KeywordUi8,
            "var" => TokenKind::KeywordVar,
            "void" => TokenKind::KeywordVoid,
            "while" => TokenKind::KeywordWhile,
            "with" => TokenKind::KeywordWith,
            _ => return None,
        })
    }

    /// True for any of the 32 reserved keyword kinds.
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::KeywordBoolean
                | TokenKind::KeywordBreak
                | TokenKind::KeywordCatch
                | TokenKind::KeywordElse
                | TokenKind::KeywordF32
                | TokenKind::KeywordF64
                | TokenKind::KeywordFalse
                | TokenKind::KeywordFinally
                | TokenKind::KeywordFor
                | TokenKind::KeywordI16
                | TokenKind::KeywordI32
                | TokenKind::KeywordI64
                | TokenKind::KeywordI8
                | TokenKind::KeywordIf
                | TokenKind::KeywordImport
                | TokenKind::KeywordLet
                | TokenKind::KeywordNative
                | TokenKind::KeywordNew
                | TokenKind::KeywordNull
                | TokenKind::KeywordReturn
                | TokenKind::KeywordStruct
                | TokenKind::KeywordThis
                | TokenKind::KeywordThrow
                | TokenKind::KeywordTrue
                | TokenKind::KeywordTry
                | TokenKind::KeywordUi16
                | TokenKind::KeywordUi32
                | TokenKind::KeywordUi64
                | TokenKind::KeywordUi8
                | TokenKind::KeywordVar
                | TokenKind::KeywordVoid
                | TokenKind::KeywordWhile
                | TokenKind::KeywordWith
        )
    }
}

/// A single lexed token: kind plus the lexeme text and its exact source
/// position. Immutable once produced by the lexer.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub channel: Channel,
    pub text: String,
    pub start_index: usize,
    pub stop_index: usize,
    pub start_line: u32,
    pub stop_line: u32,
    pub start_column: u32,
    pub stop_column: u32,
    pub file_id: FileId,
    /// Position of this token within the stream that produced it.
    pub stream_index: usize,
}

impl Token {
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}
