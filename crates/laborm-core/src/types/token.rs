use std::fmt;

use serde::{Deserialize, Serialize};

/// Byte range into the source text, used to point diagnostics at a token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Where a token was read from. Lines and columns are 1-based.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
    pub column: usize,
    #[serde(default)]
    pub span: Span,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: usize, column: usize, span: Span) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            span,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// The lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Invalid,
    Identifier,
    KeywordModel,
    KeywordEngine,
    KeywordRelation,
    String,
    Int,
    Float,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LSquare,
    RSquare,
    Comma,
    Colon,
    Eof,
}

impl TokenKind {
    /// Human-readable description used in diagnostics.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Invalid => "invalid token",
            Self::Identifier => "identifier",
            Self::KeywordModel => "'model'",
            Self::KeywordEngine => "'@engine'",
            Self::KeywordRelation => "'@relation'",
            Self::String => "string literal",
            Self::Int => "integer literal",
            Self::Float => "float literal",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LSquare => "'['",
            Self::RSquare => "']'",
            Self::Comma => "','",
            Self::Colon => "':'",
            Self::Eof => "end of file",
        }
    }

    /// Returns true for literal kinds that can carry a value (`STRING`, `INT`, `FLOAT`).
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::String | Self::Int | Self::Float)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A lexeme read from a schema source file.
///
/// Tokens are produced once by the lexer and never mutated. Schema types keep
/// the original tokens so that later stages can type-check raw values and
/// point diagnostics at the right place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            text: text.into(),
            location,
        }
    }

    /// Builds a token with no meaningful source position.
    pub fn synthetic(kind: TokenKind, text: impl Into<String>) -> Self {
        Self::new(kind, text, SourceLocation::default())
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Compares kind and text, ignoring where either token came from.
    pub fn same_lexeme(&self, other: &Token) -> bool {
        self.kind == other.kind && self.text == other.text
    }

    /// Case-insensitive comparison of the token text against `s`.
    pub fn text_eq_ignore_case(&self, s: &str) -> bool {
        self.text.eq_ignore_ascii_case(s)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of file"),
            TokenKind::String => write!(f, "\"{}\"", self.text),
            _ => write!(f, "'{}'", self.text),
        }
    }
}
