use logos::Logos;

/// Raw lexemes recognized by the LabORM schema lexer.
///
/// Whitespace and comments are skipped automatically by logos. Keywords are
/// not distinguished here: they are case-insensitive, so the lexer resolves
/// `Word` and `Sigil` lexemes into keyword kinds afterwards.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum RawToken {
    // -- Punctuation --
    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LSquare,

    #[token("]")]
    RSquare,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    // -- Literals --
    /// A quoted string. Any of `"`, `'` or `` ` `` delimits it, and a
    /// backslash escapes the following character.
    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"'([^'\\]|\\.)*'")]
    #[regex(r"`([^`\\]|\\.)*`")]
    Str,

    /// Digits without a decimal point, e.g. `42`.
    #[regex(r"[0-9]+")]
    Int,

    /// Digits with one decimal point, e.g. `3.14` or `1.`.
    #[regex(r"[0-9]+\.[0-9]*")]
    Float,

    // -- Words --
    /// `@` followed by a word, e.g. `@engine`.
    #[regex(r"@[a-zA-Z][a-zA-Z0-9]*")]
    Sigil,

    /// A letter followed by letters or digits.
    #[regex(r"[a-zA-Z][a-zA-Z0-9]*")]
    Word,
}

impl RawToken {
    /// Returns a human-readable description of this lexeme.
    pub fn description(&self) -> &'static str {
        match self {
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LSquare => "'['",
            Self::RSquare => "']'",
            Self::Comma => "','",
            Self::Colon => "':'",
            Self::Str => "string literal",
            Self::Int => "integer literal",
            Self::Float => "float literal",
            Self::Sigil => "annotation",
            Self::Word => "word",
        }
    }
}

impl std::fmt::Display for RawToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}
