use laborm_core::types::{
    ColumnDefinition, EngineOptions, ModelDefinition, Relationship, SchemaDocument, Token,
    TokenKind,
};

/// Print a schema document to DSL text.
///
/// The engine block comes first, then every model separated by blank lines,
/// with 4-space indentation. Parsing the output yields a document with the
/// same shape.
pub fn print(doc: &SchemaDocument) -> String {
    let mut output = String::new();
    if let Some(engine) = &doc.engine {
        print_engine(engine, &mut output);
    }
    for (i, model) in doc.models.iter().enumerate() {
        if i > 0 || doc.engine.is_some() {
            output.push('\n');
        }
        print_model(model, &mut output);
    }
    output
}

/// Print a single model block.
pub fn print_model_block(model: &ModelDefinition) -> String {
    let mut output = String::new();
    print_model(model, &mut output);
    output
}

fn print_engine(engine: &EngineOptions, output: &mut String) {
    output.push_str("@engine ");
    output.push_str(&engine.driver_name.text);
    output.push_str(" {\n");
    for (name, value) in &engine.options {
        output.push_str("    ");
        output.push_str(name);
        output.push_str(": ");
        print_token(value, output);
        output.push('\n');
    }
    output.push_str("}\n");
}

fn print_model(model: &ModelDefinition, output: &mut String) {
    output.push_str("model ");
    output.push_str(model.name());
    output.push_str(" {\n");
    for column in &model.columns {
        output.push_str("    ");
        print_column(column, output);
        output.push('\n');
    }
    output.push_str("}\n");
}

fn print_column(column: &ColumnDefinition, output: &mut String) {
    output.push_str(column.name());
    output.push(' ');
    output.push_str(&column.type_name.text);

    match &column.relationship {
        Some(Relationship::Array { .. }) => output.push_str("[]"),
        Some(Relationship::Field {
            local_field,
            remote_field,
            ..
        }) => {
            output.push_str(&format!(
                " @relation({}, {})",
                local_field.text, remote_field.text
            ));
        }
        None => {}
    }

    if column.nullable {
        output.push_str(" nullable");
    }
    if column.primary_key {
        output.push_str(" primary");
    }
    if column.auto_increment {
        output.push_str(" autoincrement");
    }
    if let Some(value) = &column.default_value {
        output.push_str(" default ");
        print_token(value, output);
    }
}

fn print_token(token: &Token, output: &mut String) {
    if token.kind != TokenKind::String {
        output.push_str(&token.text);
        return;
    }
    let quote = ['"', '\'', '`']
        .into_iter()
        .find(|q| !contains_unescaped(&token.text, *q))
        .unwrap_or('"');
    output.push(quote);
    output.push_str(&token.text);
    output.push(quote);
}

/// Returns true if `quote` appears in `text` without a preceding backslash.
fn contains_unescaped(text: &str, quote: char) -> bool {
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == quote {
            return true;
        }
    }
    false
}
