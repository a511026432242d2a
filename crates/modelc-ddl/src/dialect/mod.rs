//! SQL dialect capabilities
//!
//! The generators never spell dialect-specific SQL themselves; they ask a
//! [`SqlDialect`] for separators, quoting, type names, key generation and the
//! few statements whose shape differs between engines.

mod oracle;
mod sqlserver;

pub use oracle::OracleDialect;
pub use sqlserver::SqlServerDialect;

use crate::table::TableDef;
use modelc_core::DialectConfig;
use modelc_model::InitValue;

/// How generated primary keys get their values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyGeneration {
    /// Identity column, values assigned by the engine on insert
    Identity,

    /// Sequence object queried explicitly on insert
    Sequence,
}

/// Capabilities and spelling of a target SQL engine
pub trait SqlDialect {
    /// Dialect name
    fn name(&self) -> &'static str;

    /// Line terminating each batch
    fn batch_separator(&self) -> &'static str;

    /// Maximum identifier length
    fn identifier_limit(&self) -> usize;

    /// Whether primary keys can be declared clustered
    fn supports_clustered_key(&self) -> bool;

    /// String concatenation operator
    fn concat_operator(&self) -> &'static str;

    /// Quote an identifier
    fn quote(&self, identifier: &str) -> String;

    /// Column type from a persistent type with optional length and precision
    fn column_type(&self, persistent_type: &str, length: Option<u32>, precision: Option<u32>) -> String;

    /// Key generation strategy; identity and sequence are never both used
    fn key_generation(&self) -> KeyGeneration;

    /// Column clause of an identity key
    fn identity_clause(&self) -> Option<&'static str>;

    /// Table storage clause (filegroup or tablespace)
    fn storage_clause(&self, storage: &str) -> String;

    /// Index storage clause
    fn index_storage_clause(&self, storage: &str) -> String;

    /// Current timestamp expression
    fn now_expression(&self) -> &'static str;

    /// Type of boolean columns
    fn boolean_type(&self) -> &'static str;

    /// Type of timestamp columns
    fn timestamp_type(&self) -> &'static str;

    /// Convert an expression to text
    fn to_text(&self, expression: &str) -> String;

    /// SQL literal of an initializer value
    fn literal(&self, value: &InitValue) -> String {
        match value {
            InitValue::Null => "null".to_string(),
            InitValue::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
            InitValue::Integer(i) => i.to_string(),
            InitValue::Float(f) => f.to_string(),
            InitValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }

    /// Insert and update triggers feeding the history table of `table`
    fn history_trigger(&self, table: &TableDef, history: &TableDef) -> Vec<String>;

    /// Names of the types created for `table`
    fn table_type_names(&self, table: &str) -> Vec<String>;

    /// Statements creating the table types of `table`
    fn table_type(&self, table: &TableDef) -> Vec<String>;

    /// Statement switching explicit identity inserts on or off
    fn identity_insert(&self, table: &str, on: bool) -> Option<String>;

    /// Sequence name of a table
    fn sequence_name(&self, table: &str) -> String {
        format!("SEQ_{}", table)
    }

    /// Statement creating the sequence of a table
    fn sequence_statement(&self, table: &str) -> Option<String>;

    /// Expression producing the next key value of a table
    fn next_value(&self, table: &str) -> Option<String>;
}

/// Select the dialect of a configuration
pub fn dialect_for(config: DialectConfig) -> Box<dyn SqlDialect> {
    match config {
        DialectConfig::SqlServer => Box::new(SqlServerDialect),
        DialectConfig::Oracle => Box::new(OracleDialect),
    }
}

/// `type`, `type(length)` or `type(length, precision)`
pub(crate) fn sized_type(name: &str, length: Option<u32>, precision: Option<u32>) -> String {
    match (length, precision) {
        (Some(l), Some(p)) => format!("{}({}, {})", name, l, p),
        (Some(l), None) => format!("{}({})", name, l),
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_and_sequence_are_exclusive() {
        for config in [DialectConfig::SqlServer, DialectConfig::Oracle] {
            let dialect = dialect_for(config);
            match dialect.key_generation() {
                KeyGeneration::Identity => {
                    assert!(dialect.identity_clause().is_some());
                    assert!(dialect.identity_insert("T", true).is_some());
                    assert!(dialect.sequence_statement("T").is_none());
                    assert!(dialect.next_value("T").is_none());
                }
                KeyGeneration::Sequence => {
                    assert!(dialect.identity_clause().is_none());
                    assert!(dialect.identity_insert("T", true).is_none());
                    assert!(dialect.sequence_statement("T").is_some());
                    assert!(dialect.next_value("T").is_some());
                }
            }
        }
    }

    #[test]
    fn dialect_selection() {
        assert_eq!(dialect_for(DialectConfig::SqlServer).name(), "sqlserver");
        assert_eq!(dialect_for(DialectConfig::Oracle).identifier_limit(), 30);
        assert_eq!(dialect_for(DialectConfig::SqlServer).identifier_limit(), 128);
    }

    #[test]
    fn literals() {
        let dialect = SqlServerDialect;
        assert_eq!(dialect.literal(&InitValue::Text("O'Brien".to_string())), "'O''Brien'");
        assert_eq!(dialect.literal(&InitValue::Bool(true)), "1");
        assert_eq!(dialect.literal(&InitValue::Null), "null");
        assert_eq!(dialect.literal(&InitValue::Integer(42)), "42");
    }
}
