//! Pure functions for compiling schema types to SQLite statements.
//!
//! No I/O. No side effects. Identifiers are always double-quoted.

use laborm_core::types::{ColumnDefinition, ColumnType, ModelDefinition, Token, TokenKind};
use laborm_driver::naming::{RelationTable, RELATION_ID_COLUMN};

/// Table holding the schema snapshot.
pub const KEY_VALUE_TABLE: &str = "labORMKeyValue";

/// Quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal, doubling embedded single quotes.
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// SQLite type for a stored column. Relation columns have no physical type.
pub fn sql_type(column_type: ColumnType) -> Option<&'static str> {
    match column_type {
        ColumnType::String => Some("TEXT"),
        ColumnType::Int => Some("INTEGER"),
        ColumnType::Float => Some("REAL"),
        ColumnType::Relation => None,
    }
}

/// Literal for a default value token.
pub fn default_literal(value: &Token) -> String {
    match value.kind {
        TokenKind::Int | TokenKind::Float => value.text.clone(),
        _ => quote_literal(&value.text),
    }
}

/// Literal used to fill a non-null column that declares no default.
pub fn fallback_literal(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Int => "0",
        ColumnType::Float => "0.0",
        ColumnType::String | ColumnType::Relation => "''",
    }
}

/// Column definition clause, e.g. `"id" INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL`.
///
/// With `fill_not_null`, a non-null column without a default gets the type's
/// fallback default so it can be added to a populated table.
pub fn column_sql(column: &ColumnDefinition, fill_not_null: bool) -> String {
    let ty = sql_type(column.column_type).unwrap_or("TEXT");
    let mut sql = format!("{} {ty}", quote_ident(column.name()));
    if column.primary_key {
        sql.push_str(" PRIMARY KEY");
        if column.auto_increment && column.column_type == ColumnType::Int {
            sql.push_str(" AUTOINCREMENT");
        }
    }
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    match &column.default_value {
        Some(value) => {
            sql.push_str(" DEFAULT ");
            sql.push_str(&default_literal(value));
        }
        None if fill_not_null && !column.nullable && !column.primary_key => {
            sql.push_str(" DEFAULT ");
            sql.push_str(fallback_literal(column.column_type));
        }
        None => {}
    }
    sql
}

/// `CREATE TABLE` for a model's stored columns. Relation columns are omitted.
pub fn create_table_sql(model: &ModelDefinition) -> String {
    let columns: Vec<String> = model
        .stored_columns()
        .map(|c| column_sql(c, false))
        .collect();
    format!(
        "CREATE TABLE {} ({})",
        quote_ident(model.name()),
        columns.join(", ")
    )
}

/// `CREATE TABLE` for the link table of a field relation.
pub fn create_relation_table_sql(table: &RelationTable) -> String {
    let ty = sql_type(table.column_type).unwrap_or("TEXT");
    format!(
        "CREATE TABLE {} ({} INTEGER PRIMARY KEY AUTOINCREMENT, {} {ty} NOT NULL, {} {ty} NOT NULL)",
        quote_ident(&table.name),
        quote_ident(RELATION_ID_COLUMN),
        quote_ident(&table.local_column),
        quote_ident(&table.remote_column),
    )
}

pub fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE {}", quote_ident(table))
}

pub fn drop_table_if_exists_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_ident(table))
}

pub fn add_column_sql(table: &str, column: &ColumnDefinition, fill_not_null: bool) -> String {
    format!(
        "ALTER TABLE {} ADD COLUMN {}",
        quote_ident(table),
        column_sql(column, fill_not_null)
    )
}

pub fn drop_column_sql(table: &str, column: &str) -> String {
    format!(
        "ALTER TABLE {} DROP COLUMN {}",
        quote_ident(table),
        quote_ident(column)
    )
}

pub fn rename_column_sql(table: &str, from: &str, to: &str) -> String {
    format!(
        "ALTER TABLE {} RENAME COLUMN {} TO {}",
        quote_ident(table),
        quote_ident(from),
        quote_ident(to)
    )
}

/// Copies `from` into the column described by `to`. NULLs become the default
/// when the target column is not nullable.
pub fn copy_column_sql(table: &str, from: &str, to: &ColumnDefinition) -> String {
    let source = if to.nullable {
        quote_ident(from)
    } else {
        let fill = to
            .default_value
            .as_ref()
            .map(default_literal)
            .unwrap_or_else(|| fallback_literal(to.column_type).to_string());
        format!("COALESCE({}, {fill})", quote_ident(from))
    };
    format!(
        "UPDATE {} SET {} = {source}",
        quote_ident(table),
        quote_ident(to.name())
    )
}

/// The full statement sequence for replacing a column definition in place.
///
/// Rename to the temporary column, add the new definition, copy the data,
/// drop the temporary column.
pub fn update_column_sql(table: &str, column: &ColumnDefinition, temp: &str) -> Vec<String> {
    vec![
        rename_column_sql(table, column.name(), temp),
        add_column_sql(table, column, true),
        copy_column_sql(table, temp, column),
        drop_column_sql(table, temp),
    ]
}

pub fn create_key_value_table_sql() -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({} TEXT PRIMARY KEY, {} TEXT NOT NULL)",
        quote_ident(KEY_VALUE_TABLE),
        quote_ident("key"),
        quote_ident("data")
    )
}

pub fn upsert_key_value_sql() -> String {
    format!(
        "INSERT INTO {} (\"key\", \"data\") VALUES (?1, ?2) ON CONFLICT(\"key\") DO UPDATE SET \"data\" = excluded.\"data\"",
        quote_ident(KEY_VALUE_TABLE)
    )
}

pub fn select_key_value_sql() -> String {
    format!(
        "SELECT \"data\" FROM {} WHERE \"key\" = ?1",
        quote_ident(KEY_VALUE_TABLE)
    )
}
