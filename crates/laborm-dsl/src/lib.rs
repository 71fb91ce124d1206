//! # laborm-dsl
//!
//! Lexer, parser and printer for the LabORM schema language.
//!
//! This crate provides:
//! - A total lexer: unknown input becomes `INVALID` tokens, never a panic
//! - A recovering recursive descent parser producing a `SchemaDocument`
//! - A printer that turns a `SchemaDocument` back into DSL text
//!
//! # Example
//!
//! ```
//! use laborm_dsl::{parse, print};
//!
//! let source = r#"
//! @engine sqlite3 { file: "test.db" }
//!
//! model User {
//!     id INT primary autoincrement
//!     name STRING
//! }
//! "#;
//!
//! let doc = parse("schema.labORM", source).expect("parse failed");
//! assert_eq!(doc.models.len(), 1);
//! assert_eq!(doc.models[0].name(), "User");
//!
//! let text = print(&doc);
//! assert!(text.contains("model User {"));
//! ```

pub mod error;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod token;

pub use error::DslError;
pub use laborm_core::types::{SourceLocation, Span};
pub use lexer::lex;
pub use parser::{parse, parse_tokens};
pub use printer::{print, print_model_block};
