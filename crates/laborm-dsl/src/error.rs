use std::fmt;

use laborm_core::types::SourceLocation;

/// Syntax errors found while parsing a schema file.
///
/// The parser recovers after each of these, so one run can report several.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DslError {
    /// The lexer met text that does not match any token rule.
    InvalidToken {
        text: String,
        location: SourceLocation,
    },

    /// The parser met a token other than the one the grammar requires.
    UnexpectedToken {
        expected: String,
        found: String,
        location: SourceLocation,
    },

    /// A word after a column that is not a known modifier.
    UnknownModifier {
        modifier: String,
        column: String,
        location: SourceLocation,
    },

    /// `default` with nothing after it.
    MissingDefaultValue {
        column: String,
        location: SourceLocation,
    },

    /// An engine option key with no value.
    MissingOptionValue {
        option: String,
        location: SourceLocation,
    },

    /// A second `@engine` block. The first one is kept.
    DuplicateEngine { location: SourceLocation },
}

impl DslError {
    pub fn location(&self) -> &SourceLocation {
        match self {
            Self::InvalidToken { location, .. }
            | Self::UnexpectedToken { location, .. }
            | Self::UnknownModifier { location, .. }
            | Self::MissingDefaultValue { location, .. }
            | Self::MissingOptionValue { location, .. }
            | Self::DuplicateEngine { location } => location,
        }
    }

    /// The message without the location prefix.
    pub fn message(&self) -> String {
        match self {
            Self::InvalidToken { text, .. } => format!("invalid token '{text}'"),
            Self::UnexpectedToken {
                expected, found, ..
            } => format!("expected {expected}, found {found}"),
            Self::UnknownModifier {
                modifier, column, ..
            } => format!("unknown modifier '{modifier}' on column '{column}'"),
            Self::MissingDefaultValue { column, .. } => {
                format!("missing value after 'default' on column '{column}'")
            }
            Self::MissingOptionValue { option, .. } => {
                format!("missing value for engine option '{option}'")
            }
            Self::DuplicateEngine { .. } => "duplicate @engine block".to_string(),
        }
    }
}

impl fmt::Display for DslError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location(), self.message())
    }
}

impl std::error::Error for DslError {}
