use laborm_core::types::SourceLocation;
use laborm_core::{MigrationError, ValidationError};
use laborm_dsl::DslError;
use miette::{Diagnostic, NamedSource, SourceSpan};

/// A diagnostic wrapping a schema error for rich miette rendering.
///
/// Provides source code highlighting, span labels, and actionable suggestions
/// when rendering errors in human-readable mode.
///
/// The module-level `#[allow(unused_assignments)]` in main.rs is required
/// because miette's derive macro generates assignment patterns that rustc
/// flags as unused.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct SchemaDiagnostic {
    #[source_code]
    src: NamedSource<String>,

    #[label("{label}")]
    span: SourceSpan,

    message: String,
    label: String,

    #[help]
    suggestion: Option<String>,
}

fn span_of(location: &SourceLocation) -> SourceSpan {
    (location.span.start, location.span.len()).into()
}

/// Convert a `DslError` into a miette `SchemaDiagnostic`.
pub fn dsl_error_to_diagnostic(error: &DslError, source: &str, filename: &str) -> SchemaDiagnostic {
    let (label, suggestion) = match error {
        DslError::InvalidToken { .. } => (
            "unrecognized token".to_string(),
            Some("Check for typos, unsupported characters or an unclosed comment.".to_string()),
        ),
        DslError::UnexpectedToken { expected, .. } => (format!("expected {expected}"), None),
        DslError::UnknownModifier { .. } => (
            "not a column modifier".to_string(),
            Some("Known modifiers: nullable, primary, autoincrement, default <value>.".to_string()),
        ),
        DslError::MissingDefaultValue { .. } => (
            "value missing".to_string(),
            Some("Write the value on the same line, e.g. default \"none\".".to_string()),
        ),
        DslError::MissingOptionValue { option, .. } => (
            "value missing".to_string(),
            Some(format!("Give the option a value, e.g. {option}: \"value\".")),
        ),
        DslError::DuplicateEngine { .. } => (
            "second engine block".to_string(),
            Some("Keep a single @engine block; the first one is used.".to_string()),
        ),
        // Catch future non_exhaustive variants
        _ => ("error".to_string(), None),
    };

    SchemaDiagnostic {
        src: NamedSource::new(filename, source.to_string()),
        span: span_of(error.location()),
        message: error.message(),
        label,
        suggestion,
    }
}

/// Convert a `ValidationError` into a miette `SchemaDiagnostic`.
///
/// Errors without a source position point at the start of the file.
pub fn validation_error_to_diagnostic(
    error: &ValidationError,
    source: &str,
    filename: &str,
) -> SchemaDiagnostic {
    let (label, suggestion) = match error {
        ValidationError::MissingEngine => (
            "no engine block".to_string(),
            Some("Start the file with e.g. @engine sqlite3 { file: \"app.sqlite\" }.".to_string()),
        ),
        ValidationError::UnknownEngine { .. } => ("unknown engine".to_string(), None),
        ValidationError::MissingPrimaryKey { .. } => (
            "no primary key".to_string(),
            Some("Mark exactly one column with 'primary'.".to_string()),
        ),
        ValidationError::MultiplePrimaryKeys { columns, .. } => (
            format!("primary keys: {}", columns.join(", ")),
            Some("Composite keys are not supported; keep one 'primary' column.".to_string()),
        ),
        ValidationError::DefaultTypeMismatch { column_type, .. } => (
            format!("not a {column_type} value"),
            None,
        ),
        ValidationError::MissingBackReference { target, .. } => (
            format!("{target} has no relation back"),
            Some(format!(
                "Add a column on {target} that points back, as an array (T[]) or with @relation."
            )),
        ),
        ValidationError::OneToOneRelation { other_column, .. } => (
            format!("pairs with '{other_column}' of the same kind"),
            Some("One side must be an array (T[]) and the other use @relation.".to_string()),
        ),
        ValidationError::AmbiguousRelation { candidates, .. } => (
            format!("candidates: {}", candidates.join(", ")),
            None,
        ),
        ValidationError::LocalFieldConflict { field, .. } => (
            format!("'{field}' already exists"),
            Some("The local field is created by the relation; pick an unused name.".to_string()),
        ),
        _ => ("invalid".to_string(), None),
    };

    SchemaDiagnostic {
        src: NamedSource::new(filename, source.to_string()),
        span: error.location().map(span_of).unwrap_or_else(|| (0, 0).into()),
        message: error.to_string(),
        label,
        suggestion,
    }
}

/// Convert a `MigrationError` into a miette `SchemaDiagnostic`.
pub fn migration_error_to_diagnostic(
    error: &MigrationError,
    source: &str,
    filename: &str,
) -> SchemaDiagnostic {
    let (label, suggestion) = match error {
        MigrationError::NewColumnWithoutDefault { .. } => (
            "new column".to_string(),
            Some("Existing rows need a value: add 'default <value>' or make it a relation.".to_string()),
        ),
        MigrationError::RelationshipChanged { detail, .. } => (
            detail.clone(),
            Some("Remove the column in one migration and add a renamed one in the next.".to_string()),
        ),
        _ => ("unsafe change".to_string(), None),
    };

    SchemaDiagnostic {
        src: NamedSource::new(filename, source.to_string()),
        span: span_of(error.location()),
        message: error.to_string(),
        label,
        suggestion,
    }
}

/// Render all syntax errors for a file using miette.
///
/// Returns a vector of `miette::Report` that can be printed to stderr.
pub fn render_diagnostics(
    errors: &[DslError],
    source: &str,
    filename: &str,
) -> Vec<miette::Report> {
    errors
        .iter()
        .map(|e| {
            let diagnostic = dsl_error_to_diagnostic(e, source, filename);
            miette::Report::new(diagnostic)
        })
        .collect()
}
