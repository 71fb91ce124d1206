//! SQLite storage driver.
//!
//! `codegen` turns schema types into SQL text with no I/O; `driver` owns the
//! connection and implements [`SchemaDriver`](laborm_driver::SchemaDriver).

pub mod codegen;
pub mod driver;

pub use driver::{SqliteDriver, SQLITE3};
