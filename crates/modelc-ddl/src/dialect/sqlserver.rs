//! SqlServer-like dialect

use super::{sized_type, KeyGeneration, SqlDialect};
use crate::table::{trigger_name, TableDef};

/// Identity keys, `go` batches, bracket quoting, 128-character identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDialect;

impl SqlServerDialect {
    fn history_insert(&self, table: &TableDef, history: &TableDef, is_creation: bool, event: &str) -> String {
        let columns: Vec<String> = history.columns.iter().map(|c| self.quote(&c.name)).collect();
        let values: Vec<String> = table.columns.iter().map(|c| self.quote(&c.name)).collect();

        format!(
            "create trigger {} on {} after {} as\nbegin\n\tset nocount on;\n\tinsert into {} ({})\n\tselect {}, {}, {} from inserted;\nend",
            self.quote(&trigger_name(&table.name, &event[..3].to_ascii_uppercase())),
            self.quote(&table.name),
            event,
            self.quote(&history.name),
            columns.join(", "),
            values.join(", "),
            self.now_expression(),
            if is_creation { 1 } else { 0 },
        )
    }
}

impl SqlDialect for SqlServerDialect {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn batch_separator(&self) -> &'static str {
        "go"
    }

    fn identifier_limit(&self) -> usize {
        128
    }

    fn supports_clustered_key(&self) -> bool {
        true
    }

    fn concat_operator(&self) -> &'static str {
        "+"
    }

    fn quote(&self, identifier: &str) -> String {
        format!("[{}]", identifier)
    }

    fn column_type(&self, persistent_type: &str, length: Option<u32>, precision: Option<u32>) -> String {
        sized_type(persistent_type, length, precision)
    }

    fn key_generation(&self) -> KeyGeneration {
        KeyGeneration::Identity
    }

    fn identity_clause(&self) -> Option<&'static str> {
        Some("identity(1, 1)")
    }

    fn storage_clause(&self, storage: &str) -> String {
        format!(" on {}", self.quote(storage))
    }

    fn index_storage_clause(&self, storage: &str) -> String {
        self.storage_clause(storage)
    }

    fn now_expression(&self) -> &'static str {
        "getdate()"
    }

    fn boolean_type(&self) -> &'static str {
        "bit"
    }

    fn timestamp_type(&self) -> &'static str {
        "datetime2"
    }

    fn to_text(&self, expression: &str) -> String {
        format!("cast({} as varchar(50))", expression)
    }

    fn history_trigger(&self, table: &TableDef, history: &TableDef) -> Vec<String> {
        vec![
            self.history_insert(table, history, true, "insert"),
            self.history_insert(table, history, false, "update"),
        ]
    }

    fn table_type_names(&self, table: &str) -> Vec<String> {
        vec![format!("{}_TABLE_TYPE", table)]
    }

    fn table_type(&self, table: &TableDef) -> Vec<String> {
        let columns: Vec<String> = table
            .columns
            .iter()
            .map(|c| format!("\t{} {}", self.quote(&c.name), c.sql_type))
            .collect();

        self.table_type_names(&table.name)
            .into_iter()
            .map(|name| format!("create type {} as table (\n{}\n)", self.quote(&name), columns.join(",\n")))
            .collect()
    }

    fn identity_insert(&self, table: &str, on: bool) -> Option<String> {
        Some(format!(
            "set identity_insert {} {}",
            self.quote(table),
            if on { "on" } else { "off" }
        ))
    }

    fn sequence_statement(&self, _table: &str) -> Option<String> {
        None
    }

    fn next_value(&self, _table: &str) -> Option<String> {
        None
    }
}
