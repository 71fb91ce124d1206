use laborm_core::types::{
    ColumnDefinition, EngineOptions, ModelDefinition, Relationship, SchemaDocument, Token,
    TokenKind,
};
use tracing::debug;

use crate::error::DslError;

/// Recursive descent parser for the LabORM schema grammar.
///
/// Errors are recorded and parsing continues, so a single pass can report
/// several independent problems. The parser never backtracks.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<DslError>,
}

impl Parser {
    fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(|t| t.is(TokenKind::Eof)) {
            let location = tokens
                .last()
                .map(|t| t.location.clone())
                .unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, "", location));
        }
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    // -- Cursor helpers --

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    /// Consumes the current token. Stays on `EOF` once it is reached.
    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    /// Tokens that close or open a block. A mismatch on one of these is
    /// reported without consuming it so the enclosing production can resync.
    fn at_boundary(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Eof | TokenKind::RBrace | TokenKind::KeywordModel | TokenKind::KeywordEngine
        )
    }

    /// Consumes a token of `kind`. On mismatch, records an error and returns
    /// the offending token as a placeholder.
    fn expect(&mut self, kind: TokenKind, what: &str) -> Token {
        if self.peek_kind() == kind {
            return self.advance();
        }
        let found = self.peek().clone();
        self.unexpected(&found, what);
        if !self.at_boundary() {
            self.advance();
        }
        found
    }

    /// Consumes a literal value. Invalid tokens are reported but still returned.
    fn value(&mut self, what: &str) -> Token {
        let tok = self.advance();
        if tok.is(TokenKind::Invalid) {
            self.unexpected(&tok, what);
        }
        tok
    }

    fn unexpected(&mut self, found: &Token, expected: &str) {
        let error = if found.is(TokenKind::Invalid) {
            DslError::InvalidToken {
                text: found.text.clone(),
                location: found.location.clone(),
            }
        } else {
            DslError::UnexpectedToken {
                expected: expected.to_string(),
                found: describe(found),
                location: found.location.clone(),
            }
        };
        self.errors.push(error);
    }

    // -- Grammar productions --

    /// file = (engine_block | model_block)* EOF
    fn parse_file(&mut self) -> SchemaDocument {
        let mut doc = SchemaDocument::default();

        loop {
            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::KeywordEngine => {
                    let keyword = self.peek().location.clone();
                    let engine = self.parse_engine();
                    if doc.engine.is_some() {
                        self.errors
                            .push(DslError::DuplicateEngine { location: keyword });
                    } else {
                        doc.engine = Some(engine);
                    }
                }
                TokenKind::KeywordModel => {
                    let model = self.parse_model();
                    debug!(model = model.name(), columns = model.columns.len(), "parsed model");
                    doc.models.push(model);
                }
                _ => {
                    let found = self.advance();
                    self.unexpected(&found, "'model' or '@engine'");
                }
            }
        }

        doc
    }

    /// engine_block = "@engine" IDENT "{" (IDENT ":" any)* "}"
    fn parse_engine(&mut self) -> EngineOptions {
        self.advance();
        let name = self.expect(TokenKind::Identifier, "engine name");
        let mut engine = EngineOptions::new(name);
        self.expect(TokenKind::LBrace, "'{'");

        while !self.at_boundary() {
            let key = self.expect(TokenKind::Identifier, "option name");
            self.expect(TokenKind::Colon, "':'");
            if self.at_boundary() {
                self.errors.push(DslError::MissingOptionValue {
                    option: key.text.clone(),
                    location: self.peek().location.clone(),
                });
                continue;
            }
            let value = self.value("option value");
            engine.options.insert(key.text, value);
        }

        self.expect(TokenKind::RBrace, "'}'");
        engine
    }

    /// model_block = "model" IDENT "{" column* "}"
    fn parse_model(&mut self) -> ModelDefinition {
        self.advance();
        let name = self.expect(TokenKind::Identifier, "model name");
        self.expect(TokenKind::LBrace, "'{'");

        let mut columns = Vec::new();
        while !self.at_boundary() {
            columns.push(self.parse_column(&name.text));
        }

        self.expect(TokenKind::RBrace, "'}'");
        ModelDefinition::new(name, columns)
    }

    /// column = IDENT IDENT ("[" "]" | "@relation" "(" IDENT "," IDENT ")")? modifier*
    fn parse_column(&mut self, model: &str) -> ColumnDefinition {
        let name = self.expect(TokenKind::Identifier, "column name");
        let type_name = self.expect(TokenKind::Identifier, "column type");
        let mut column = ColumnDefinition::new(model, name.clone(), type_name.clone());

        match self.peek_kind() {
            TokenKind::LSquare => {
                self.advance();
                self.expect(TokenKind::RSquare, "']'");
                column = column.with_relationship(Relationship::Array {
                    target_model: type_name,
                });
            }
            TokenKind::KeywordRelation => {
                self.advance();
                self.expect(TokenKind::LParen, "'('");
                let local_field = self.expect(TokenKind::Identifier, "local field name");
                self.expect(TokenKind::Comma, "','");
                let remote_field = self.expect(TokenKind::Identifier, "remote field name");
                self.expect(TokenKind::RParen, "')'");
                column = column.with_relationship(Relationship::Field {
                    target_model: type_name,
                    local_field,
                    remote_field,
                });
            }
            _ => {}
        }

        self.parse_modifiers(&mut column, name.location.line);
        column
    }

    /// modifier = "nullable" | "primary" | "autoincrement" | "default" any
    ///
    /// Only tokens on the same line as the column name are modifiers.
    fn parse_modifiers(&mut self, column: &mut ColumnDefinition, line: usize) {
        while !self.at_boundary() && self.peek().location.line == line {
            let tok = self.advance();
            if !tok.is(TokenKind::Identifier) {
                self.unexpected(&tok, "column modifier");
                continue;
            }
            match tok.text.to_ascii_lowercase().as_str() {
                "nullable" => column.nullable = true,
                "primary" => column.primary_key = true,
                "autoincrement" => column.auto_increment = true,
                "default" => {
                    if self.at_boundary() {
                        self.errors.push(DslError::MissingDefaultValue {
                            column: column.name().to_string(),
                            location: tok.location.clone(),
                        });
                    } else {
                        column.default_value = Some(self.value("default value"));
                    }
                }
                _ => self.errors.push(DslError::UnknownModifier {
                    modifier: tok.text.clone(),
                    column: column.name().to_string(),
                    location: tok.location.clone(),
                }),
            }
        }
    }
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Eof => "end of file".to_string(),
        kind => format!("{} ('{}')", kind.description(), token.text),
    }
}

/// Parses an already lexed token stream.
///
/// Always returns a document, together with every syntax error found. The
/// document may be partial when errors are present.
pub fn parse_tokens(tokens: Vec<Token>) -> (SchemaDocument, Vec<DslError>) {
    let mut parser = Parser::new(tokens);
    let doc = parser.parse_file();
    (doc, parser.errors)
}

/// Parses LabORM schema source text into a `SchemaDocument`.
///
/// `filename` is recorded in every token for diagnostics.
///
/// # Errors
///
/// Returns all syntax errors found. The parser recovers from each error and
/// keeps going, so several independent problems can be reported at once.
pub fn parse(filename: &str, source: &str) -> Result<SchemaDocument, Vec<DslError>> {
    let tokens = crate::lexer::lex(filename, source);
    match parse_tokens(tokens) {
        (doc, errors) if errors.is_empty() => Ok(doc),
        (_, errors) => Err(errors),
    }
}
