//! modelc ddl - SQL script generation
//!
//! This crate turns a checked semantic graph into SQL scripts:
//! - Dialect capabilities for SqlServer-like and Oracle-like targets
//! - Tables, unique keys, indexes, foreign keys, history tables and types
//! - Static and reference list content, in dependency order
//! - Identifier length enforcement

pub mod dialect;
pub mod error;
pub mod init;
pub mod schema;
pub mod script;
pub mod table;

pub use dialect::{dialect_for, KeyGeneration, OracleDialect, SqlDialect, SqlServerDialect};
pub use error::GenerateError;
pub use init::order_init_tables;
pub use schema::{GeneratorOptions, SchemaGenerator};
pub use script::{InitScripts, SchemaScripts, ScriptSet, ScriptWriter};
pub use table::{ColumnDef, ForeignKeyDef, TableDef};
