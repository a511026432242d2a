//! Oracle-like dialect

use super::{sized_type, KeyGeneration, SqlDialect};
use crate::table::{trigger_name, TableDef};

/// Sequence keys, `/` batches, unquoted 30-character identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleDialect;

impl OracleDialect {
    fn history_insert(&self, table: &TableDef, history: &TableDef, is_creation: bool, event: &str) -> String {
        let columns: Vec<&str> = history.columns.iter().map(|c| c.name.as_str()).collect();
        let values: Vec<String> = table.columns.iter().map(|c| format!(":new.{}", c.name)).collect();

        format!(
            "create or replace trigger {} after {} on {} for each row\nbegin\n\tinsert into {} ({})\n\tvalues ({}, {}, {});\nend;",
            trigger_name(&table.name, &event[..3].to_ascii_uppercase()),
            event,
            table.name,
            history.name,
            columns.join(", "),
            values.join(", "),
            self.now_expression(),
            if is_creation { 1 } else { 0 },
        )
    }
}

impl SqlDialect for OracleDialect {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn batch_separator(&self) -> &'static str {
        "/"
    }

    fn identifier_limit(&self) -> usize {
        30
    }

    fn supports_clustered_key(&self) -> bool {
        false
    }

    fn concat_operator(&self) -> &'static str {
        "||"
    }

    fn quote(&self, identifier: &str) -> String {
        identifier.to_string()
    }

    fn column_type(&self, persistent_type: &str, length: Option<u32>, precision: Option<u32>) -> String {
        match persistent_type.to_ascii_lowercase().as_str() {
            "varchar" | "varchar2" => sized_type("VARCHAR2", length, None),
            "nvarchar" | "nvarchar2" => sized_type("NVARCHAR2", length, None),
            "char" => sized_type("CHAR", length, None),
            "int" | "integer" => "NUMBER(10)".to_string(),
            "bigint" => "NUMBER(19)".to_string(),
            "smallint" => "NUMBER(5)".to_string(),
            "tinyint" => "NUMBER(3)".to_string(),
            "bit" | "bool" | "boolean" => "NUMBER(1)".to_string(),
            "decimal" | "numeric" | "number" => sized_type("NUMBER", length, precision),
            "float" | "real" => "FLOAT".to_string(),
            "date" => "DATE".to_string(),
            "datetime" | "datetime2" | "timestamp" => "TIMESTAMP".to_string(),
            "text" | "ntext" | "clob" => "CLOB".to_string(),
            "varbinary" | "image" | "blob" => "BLOB".to_string(),
            "uniqueidentifier" => "RAW(16)".to_string(),
            other => sized_type(&other.to_ascii_uppercase(), length, precision),
        }
    }

    fn key_generation(&self) -> KeyGeneration {
        KeyGeneration::Sequence
    }

    fn identity_clause(&self) -> Option<&'static str> {
        None
    }

    fn storage_clause(&self, storage: &str) -> String {
        format!(" tablespace {}", storage)
    }

    fn index_storage_clause(&self, storage: &str) -> String {
        self.storage_clause(storage)
    }

    fn now_expression(&self) -> &'static str {
        "sysdate"
    }

    fn boolean_type(&self) -> &'static str {
        "NUMBER(1)"
    }

    fn timestamp_type(&self) -> &'static str {
        "TIMESTAMP"
    }

    fn to_text(&self, expression: &str) -> String {
        format!("to_char({})", expression)
    }

    fn history_trigger(&self, table: &TableDef, history: &TableDef) -> Vec<String> {
        vec![
            self.history_insert(table, history, true, "insert"),
            self.history_insert(table, history, false, "update"),
        ]
    }

    fn table_type_names(&self, table: &str) -> Vec<String> {
        vec![format!("{}_OBJ", table), format!("{}_TAB", table)]
    }

    fn table_type(&self, table: &TableDef) -> Vec<String> {
        let attributes: Vec<String> = table
            .columns
            .iter()
            .map(|c| format!("\t{} {}", c.name, c.sql_type))
            .collect();

        let object = format!("{}_OBJ", table.name);
        vec![
            format!("create or replace type {} as object (\n{}\n)", object, attributes.join(",\n")),
            format!("create or replace type {}_TAB as table of {}", table.name, object),
        ]
    }

    fn identity_insert(&self, _table: &str, _on: bool) -> Option<String> {
        None
    }

    fn sequence_statement(&self, table: &str) -> Option<String> {
        Some(format!(
            "create sequence {} start with 1000 cache 20",
            self.sequence_name(table)
        ))
    }

    fn next_value(&self, table: &str) -> Option<String> {
        Some(format!("{}.nextval", self.sequence_name(table)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnDef;

    #[test]
    fn column_types_are_mapped() {
        let dialect = OracleDialect;
        assert_eq!(dialect.column_type("varchar", Some(50), None), "VARCHAR2(50)");
        assert_eq!(dialect.column_type("decimal", Some(12), Some(2)), "NUMBER(12, 2)");
        assert_eq!(dialect.column_type("int", None, None), "NUMBER(10)");
        assert_eq!(dialect.column_type("datetime2", None, None), "TIMESTAMP");
        assert_eq!(dialect.column_type("xmltype", None, None), "XMLTYPE");
    }

    #[test]
    fn sequence_statements() {
        let dialect = OracleDialect;
        assert_eq!(
            dialect.sequence_statement("ORDERS").as_deref(),
            Some("create sequence SEQ_ORDERS start with 1000 cache 20")
        );
        assert_eq!(dialect.next_value("ORDERS").as_deref(), Some("SEQ_ORDERS.nextval"));
    }

    #[test]
    fn history_triggers_use_new_row() {
        let dialect = OracleDialect;
        let table = TableDef {
            name: "ORDERS".to_string(),
            class: "Order".to_string(),
            trigram: Some("ORD".to_string()),
            columns: vec![ColumnDef {
                name: "ORD_ID".to_string(),
                sql_type: "NUMBER(10)".to_string(),
                not_null: true,
                is_identity: false,
                default: None,
            }],
            primary_key: vec!["ORD_ID".to_string()],
            unique_columns: Vec::new(),
            composite_unique: Vec::new(),
            foreign_keys: Vec::new(),
            indexed_columns: Vec::new(),
            generated_key: true,
            storage: None,
        };

        let triggers = dialect.history_trigger(&table, &table.history(&dialect));
        assert!(triggers[0].starts_with("create or replace trigger TRG_ORDERS_INS after insert on ORDERS for each row"));
        assert!(triggers[0].contains("values (:new.ORD_ID, sysdate, 1);"));
        assert!(triggers[1].contains("values (:new.ORD_ID, sysdate, 0);"));
    }
}
