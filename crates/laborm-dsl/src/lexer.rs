use logos::Logos;

use laborm_core::types::{SourceLocation, Span, Token, TokenKind};

use crate::token::RawToken;

/// Maps byte offsets to 1-based line and column numbers.
struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self {
            source,
            line_starts,
        }
    }

    fn position(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let start = self.line_starts[line];
        let column = self.source[start..offset].chars().count() + 1;
        (line + 1, column)
    }
}

/// Tokenizes schema source text.
///
/// Never fails: text that matches no rule becomes an `INVALID` token and
/// scanning continues. The result always ends with an `EOF` token.
pub fn lex(filename: &str, source: &str) -> Vec<Token> {
    let index = LineIndex::new(source);
    let location = |start: usize, end: usize| {
        let (line, column) = index.position(start);
        SourceLocation::new(filename, line, column, Span::new(start, end))
    };

    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(source);
    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let slice = lexer.slice();
        let (kind, text) = match result {
            Ok(raw) => classify(raw, slice),
            Err(()) => (TokenKind::Invalid, slice),
        };
        tokens.push(Token::new(kind, text, location(range.start, range.end)));
    }

    tokens.push(Token::new(
        TokenKind::Eof,
        "",
        location(source.len(), source.len()),
    ));
    tokens
}

/// Resolves a raw lexeme into its token kind and text.
fn classify(raw: RawToken, slice: &str) -> (TokenKind, &str) {
    match raw {
        RawToken::LBrace => (TokenKind::LBrace, slice),
        RawToken::RBrace => (TokenKind::RBrace, slice),
        RawToken::LParen => (TokenKind::LParen, slice),
        RawToken::RParen => (TokenKind::RParen, slice),
        RawToken::LSquare => (TokenKind::LSquare, slice),
        RawToken::RSquare => (TokenKind::RSquare, slice),
        RawToken::Comma => (TokenKind::Comma, slice),
        RawToken::Colon => (TokenKind::Colon, slice),
        RawToken::Int => (TokenKind::Int, slice),
        RawToken::Float => (TokenKind::Float, slice),
        // Delimiters are stripped, escapes are kept verbatim.
        RawToken::Str => (TokenKind::String, &slice[1..slice.len() - 1]),
        RawToken::Word if slice.eq_ignore_ascii_case("model") => (TokenKind::KeywordModel, slice),
        RawToken::Word => (TokenKind::Identifier, slice),
        RawToken::Sigil if slice.eq_ignore_ascii_case("@engine") => {
            (TokenKind::KeywordEngine, slice)
        }
        RawToken::Sigil if slice.eq_ignore_ascii_case("@relation") => {
            (TokenKind::KeywordRelation, slice)
        }
        RawToken::Sigil => (TokenKind::Invalid, slice),
    }
}
