//! Schema generator
//!
//! Tables are written in one pass over the persistent classes; indexes and
//! foreign keys follow in a second pass so every referenced table already
//! exists when its constraints are created.

use crate::dialect::{KeyGeneration, SqlDialect};
use crate::error::GenerateError;
use crate::script::{SchemaScripts, ScriptSet};
use crate::table::{composite_unique_name, fk_name, index_name, pk_name, unique_name, ColumnDef, TableDef};
use modelc_core::{Config, Diagnostic, DiagnosticCode, DiagnosticSink, StorageConfig};
use modelc_model::{ClassId, Graph};
use std::collections::HashSet;
use std::io::Write;
use tracing::{debug, info};

/// Settings shared by the generators
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorOptions {
    /// Application name (banners)
    pub application: String,

    /// Default storage hints
    pub storage: StorageConfig,

    /// Table receiving reference list translations
    pub translation_table: String,
}

impl GeneratorOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            application: config.application.clone(),
            storage: config.storage.clone(),
            translation_table: config.translation_table.clone(),
        }
    }
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Emits the schema and initializer scripts of a graph
pub struct SchemaGenerator {
    pub(crate) dialect: Box<dyn SqlDialect>,
    pub(crate) options: GeneratorOptions,
}

impl SchemaGenerator {
    /// Create a generator for a dialect
    pub fn new(dialect: Box<dyn SqlDialect>, options: GeneratorOptions) -> Self {
        Self { dialect, options }
    }

    /// Target dialect
    pub fn dialect(&self) -> &dyn SqlDialect {
        self.dialect.as_ref()
    }

    /// Table of a persistent class
    pub fn table(&self, graph: &Graph, id: ClassId) -> Result<TableDef, GenerateError> {
        TableDef::from_class(
            graph,
            graph.class(id),
            self.dialect(),
            self.options.storage.data.as_deref(),
        )
    }

    /// Report every identifier longer than the dialect allows
    ///
    /// Classes whose table cannot be derived are skipped; the validator chain
    /// reports their missing domains. Returns the number of overflows.
    pub fn check_identifiers(&self, graph: &Graph, sink: &mut DiagnosticSink) -> usize {
        let limit = self.dialect.identifier_limit();
        let mut overflows = 0;

        for id in graph.persistent_classes() {
            let class = graph.class(id);
            let table = match self.table(graph, id) {
                Ok(table) => table,
                Err(err) => {
                    debug!("Skipping identifiers of {}: {}", class.name, err);
                    continue;
                }
            };

            for identifier in table.identifiers(self.dialect(), class.is_historized) {
                let length = identifier.chars().count();
                if length > limit {
                    overflows += 1;
                    sink.push(
                        Diagnostic::new(
                            DiagnosticCode::IdentifierTooLong,
                            format!(
                                "Identifier {} of class {} is {} characters long, {} allows {}",
                                identifier,
                                class.name,
                                length,
                                self.dialect.name(),
                                limit
                            ),
                        )
                        .in_file(class.file.clone())
                        .with_comparison(format!("<= {}", limit), length.to_string()),
                    );
                }
            }
        }

        overflows
    }

    /// Write the table, unique key, index and type scripts
    pub fn generate_schema<W: Write>(
        &self,
        graph: &Graph,
        scripts: &mut SchemaScripts<W>,
    ) -> Result<(), GenerateError> {
        let mut tables = Vec::new();

        for id in graph.persistent_classes() {
            let class = graph.class(id);
            let table = self.table(graph, id)?;
            self.ensure_identifiers(table.identifiers(self.dialect(), class.is_historized))?;

            scripts.create.comment(&format!("{} ({})", class.name, table.name))?;
            scripts.create.statement(&self.create_table(&table))?;
            if table.generated_key {
                if let Some(sequence) = self.dialect.sequence_statement(&table.name) {
                    scripts.create.statement(&sequence)?;
                }
            }

            if class.is_historized {
                let history = table.history(self.dialect());
                scripts.create.statement(&self.create_table(&history))?;
                for trigger in self.dialect.history_trigger(&table, &history) {
                    scripts.create.statement(&trigger)?;
                }
            }

            for statement in self.unique_keys(&table) {
                scripts.unique_keys.statement(&statement)?;
            }

            for statement in self.dialect.table_type(&table) {
                scripts.types.statement(&statement)?;
            }

            debug!("Table {} written for class {}", table.name, class.name);
            tables.push(table);
        }

        for table in &tables {
            for statement in self.indexes(table) {
                scripts.indexes.statement(&statement)?;
            }
        }

        info!(
            tables = tables.len(),
            dialect = self.dialect.name(),
            "Schema scripts written"
        );

        Ok(())
    }

    /// Write every script of a set
    pub fn generate<W: Write>(&self, graph: &Graph, scripts: &mut ScriptSet<W>) -> Result<(), GenerateError> {
        self.generate_schema(graph, &mut scripts.schema)?;
        self.generate_init(graph, &mut scripts.init.data, &mut scripts.init.translations)?;
        scripts.finish()?;
        Ok(())
    }

    fn ensure_identifiers(&self, identifiers: Vec<String>) -> Result<(), GenerateError> {
        let limit = self.dialect.identifier_limit();
        match identifiers.into_iter().find(|i| i.chars().count() > limit) {
            Some(identifier) => Err(GenerateError::IdentifierTooLong {
                identifier,
                limit,
                dialect: self.dialect.name().to_string(),
            }),
            None => Ok(()),
        }
    }

    fn column_declaration(&self, column: &ColumnDef) -> String {
        let mut declaration = format!("\t{} {}", self.dialect.quote(&column.name), column.sql_type);

        if column.is_identity {
            if let Some(identity) = self.dialect.identity_clause() {
                declaration.push(' ');
                declaration.push_str(identity);
            }
        }
        if let Some(default) = &column.default {
            declaration.push_str(" default ");
            declaration.push_str(default);
        }
        declaration.push_str(if column.not_null { " not null" } else { " null" });
        declaration
    }

    fn create_table(&self, table: &TableDef) -> String {
        let mut lines: Vec<String> = table.columns.iter().map(|c| self.column_declaration(c)).collect();

        if !table.primary_key.is_empty() {
            let keys: Vec<String> = table.primary_key.iter().map(|c| self.dialect.quote(c)).collect();
            lines.push(format!(
                "\tconstraint {} primary key{} ({})",
                self.dialect.quote(&pk_name(&table.name)),
                if self.dialect.supports_clustered_key() { " clustered" } else { "" },
                keys.join(", ")
            ));
        }

        let storage = table
            .storage
            .as_deref()
            .map(|s| self.dialect.storage_clause(s))
            .unwrap_or_default();

        format!(
            "create table {} (\n{}\n){}",
            self.dialect.quote(&table.name),
            lines.join(",\n"),
            storage
        )
    }

    fn unique_keys(&self, table: &TableDef) -> Vec<String> {
        let quoted = self.dialect.quote(&table.name);
        let mut statements: Vec<String> = table
            .unique_columns
            .iter()
            .map(|column| {
                format!(
                    "alter table {} add constraint {} unique ({})",
                    quoted,
                    self.dialect.quote(&unique_name(&table.name, column)),
                    self.dialect.quote(column)
                )
            })
            .collect();

        if table.composite_unique.len() > 1 {
            let columns: Vec<String> = table.composite_unique.iter().map(|c| self.dialect.quote(c)).collect();
            statements.push(format!(
                "alter table {} add constraint {} unique ({})",
                quoted,
                self.dialect.quote(&composite_unique_name(&table.name)),
                columns.join(", ")
            ));
        }

        statements
    }

    fn indexes(&self, table: &TableDef) -> Vec<String> {
        let quoted = self.dialect.quote(&table.name);
        let storage = self
            .options
            .storage
            .index
            .as_deref()
            .map(|s| self.dialect.index_storage_clause(s))
            .unwrap_or_default();

        let mut seen = HashSet::new();
        let mut statements = Vec::new();

        let fk_columns = table.foreign_keys.iter().map(|fk| &fk.column);
        for column in fk_columns.chain(table.indexed_columns.iter()) {
            if seen.insert(column.as_str()) {
                statements.push(format!(
                    "create index {} on {} ({}){}",
                    self.dialect.quote(&index_name(&table.name, column)),
                    quoted,
                    self.dialect.quote(column),
                    storage
                ));
            }
        }

        for fk in &table.foreign_keys {
            statements.push(format!(
                "alter table {} add constraint {} foreign key ({}) references {} ({})",
                quoted,
                self.dialect.quote(&fk_name(&table.name, &fk.column)),
                self.dialect.quote(&fk.column),
                self.dialect.quote(&fk.target_table),
                self.dialect.quote(&fk.target_column)
            ));
        }

        statements
    }

    pub(crate) fn uses_identity(&self, table: &TableDef) -> bool {
        table.generated_key && self.dialect.key_generation() == KeyGeneration::Identity
    }

    pub(crate) fn uses_sequence(&self, table: &TableDef) -> bool {
        table.generated_key && self.dialect.key_generation() == KeyGeneration::Sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{OracleDialect, SqlServerDialect};
    use crate::script::ScriptSet;
    use modelc_model::{
        DataContract, DataMember, Domain, ModelClass, ModelProperty, NamespaceId, PropertyKind, Stereotype,
    };

    fn column(name: &str, column: &str, domain: &str) -> ModelProperty {
        let mut property = ModelProperty::primitive(name, Some(domain.to_string()));
        property.is_persistent = true;
        property.data_member = DataMember {
            name: Some(column.to_string()),
            is_required: true,
        };
        property
    }

    fn class(name: &str, table: &str, trigram: &str, properties: Vec<ModelProperty>) -> ModelClass {
        ModelClass {
            name: name.to_string(),
            label: None,
            comment: None,
            stereotype: Stereotype::None,
            data_contract: DataContract {
                name: table.to_string(),
                is_persistent: true,
            },
            properties,
            parent: None,
            trigram: Some(trigram.to_string()),
            storage: None,
            is_historized: false,
            is_audited: false,
            is_export_delta_tracked: false,
            namespace: NamespaceId(0),
            file: "Shop.oom".to_string(),
            constant_values: Vec::new(),
        }
    }

    fn graph(table: &str) -> Graph {
        let mut graph = Graph::new();
        graph.domains.insert("DO_ID".to_string(), Domain::new("DO_ID", "int", "int"));

        let mut id = column("Id", "CUS_ID", "DO_ID");
        id.is_primary_key = true;
        graph.classes.push(class("Customer", "CUSTOMER", "CUS", vec![id]));

        let mut id = column("Id", "ORD_ID", "DO_ID");
        id.is_primary_key = true;
        let mut customer = column("CustomerId", "CUS_ID", "DO_ID");
        customer.kind = PropertyKind::Reference { target: ClassId(0) };
        graph.classes.push(class("Order", table, "ORD", vec![id, customer]));
        graph
    }

    fn generator(dialect: Box<dyn SqlDialect>) -> SchemaGenerator {
        SchemaGenerator::new(dialect, GeneratorOptions::default())
    }

    #[test]
    fn oracle_identifier_limit() {
        let generator = generator(Box::new(OracleDialect));

        // IDX_ + table + _CUS_ID is the longest identifier: 11 + table
        let graph = graph(&"O".repeat(19));
        let mut sink = DiagnosticSink::new();
        assert_eq!(generator.check_identifiers(&graph, &mut sink), 0);

        let graph = self::graph(&"O".repeat(20));
        let mut sink = DiagnosticSink::new();
        assert_eq!(generator.check_identifiers(&graph, &mut sink), 1);
        assert_eq!(sink.diagnostics()[0].code, DiagnosticCode::IdentifierTooLong);
        assert!(sink.diagnostics()[0].message.contains("31 characters"));
        assert!(sink.has_blocking());

        let mut scripts = ScriptSet::in_memory("Shop", "/").unwrap();
        let err = generator.generate_schema(&graph, &mut scripts.schema).unwrap_err();
        assert!(matches!(err, GenerateError::IdentifierTooLong { limit: 30, .. }));
    }

    #[test]
    fn identifier_limit_counts_characters() {
        let generator = generator(Box::new(OracleDialect));

        // 19 characters, 38 bytes
        let graph = graph(&"Ö".repeat(19));
        let mut sink = DiagnosticSink::new();
        assert_eq!(generator.check_identifiers(&graph, &mut sink), 0);

        let mut scripts = ScriptSet::in_memory("Shop", "/").unwrap();
        generator.generate_schema(&graph, &mut scripts.schema).unwrap();

        let graph = self::graph(&"Ö".repeat(20));
        let mut sink = DiagnosticSink::new();
        assert_eq!(generator.check_identifiers(&graph, &mut sink), 1);
        assert_eq!(sink.diagnostics()[0].actual.as_deref(), Some("31"));
    }

    #[test]
    fn sqlserver_identifier_limit() {
        let generator = generator(Box::new(SqlServerDialect));

        // Index name and table type both reach 128
        let graph = graph(&"O".repeat(117));
        let mut sink = DiagnosticSink::new();
        assert_eq!(generator.check_identifiers(&graph, &mut sink), 0);

        let graph = self::graph(&"O".repeat(118));
        let mut sink = DiagnosticSink::new();
        assert_eq!(generator.check_identifiers(&graph, &mut sink), 2);
        assert!(sink.iter().all(|d| d.message.contains("129 characters")));
    }

    #[test]
    fn sqlserver_schema_uses_identity() {
        let generator = generator(Box::new(SqlServerDialect));
        let graph = graph("ORDERS");
        let mut scripts = ScriptSet::in_memory("Shop", "go").unwrap();
        generator.generate_schema(&graph, &mut scripts.schema).unwrap();

        let create = scripts.schema.create.contents();
        assert!(create.contains("[ORD_ID] int identity(1, 1) not null"));
        assert!(create.contains("constraint [PK_ORDERS] primary key clustered ([ORD_ID])"));
        assert!(!create.contains("sequence"));

        let indexes = scripts.schema.indexes.contents();
        assert!(indexes.contains("create index [IDX_ORDERS_CUS_ID] on [ORDERS] ([CUS_ID])"));
        assert!(indexes.contains(
            "alter table [ORDERS] add constraint [FK_ORDERS_CUS_ID] foreign key ([CUS_ID]) references [CUSTOMER] ([CUS_ID])"
        ));
    }

    #[test]
    fn oracle_schema_uses_sequence() {
        let generator = generator(Box::new(OracleDialect));
        let graph = graph("ORDERS");
        let mut scripts = ScriptSet::in_memory("Shop", "/").unwrap();
        generator.generate_schema(&graph, &mut scripts.schema).unwrap();

        let create = scripts.schema.create.contents();
        assert!(create.contains("\tORD_ID NUMBER(10) not null"));
        assert!(!create.contains("identity"));
        assert!(!create.contains("clustered"));
        assert!(create.contains("create sequence SEQ_ORDERS start with 1000 cache 20\n/\n"));

        let types = scripts.schema.types.contents();
        assert!(types.contains("create or replace type ORDERS_TAB as table of ORDERS_OBJ"));
    }

    #[test]
    fn foreign_keys_follow_all_tables() {
        let generator = generator(Box::new(SqlServerDialect));
        let graph = graph("ORDERS");
        let mut scripts = ScriptSet::in_memory("Shop", "go").unwrap();
        generator.generate_schema(&graph, &mut scripts.schema).unwrap();

        assert!(!scripts.schema.create.contents().contains("foreign key"));
        assert_eq!(scripts.schema.indexes.statement_count(), 2);
    }

    #[test]
    fn unique_keys_and_history() {
        let mut graph = graph("ORDERS");
        {
            let order = graph.class_mut(ClassId(1));
            order.is_historized = true;
            order.storage = Some("DATA".to_string());
            let mut number = column("Number", "ORD_NUMBER", "DO_ID");
            number.is_unique_many = true;
            order.properties[1].is_unique_many = true;
            order.properties.push(number);
        }

        let generator = generator(Box::new(SqlServerDialect));
        let mut scripts = ScriptSet::in_memory("Shop", "go").unwrap();
        generator.generate_schema(&graph, &mut scripts.schema).unwrap();

        let create = scripts.schema.create.contents();
        assert!(create.contains("create table [ORDERS_HISTO]"));
        assert!(create.contains(") on [DATA]"));
        assert!(create.contains("[TRG_ORDERS_INS]"));

        let unique_keys = scripts.schema.unique_keys.contents();
        assert!(unique_keys.contains(
            "alter table [ORDERS] add constraint [UK_ORDERS_MULTIPLE] unique ([CUS_ID], [ORD_NUMBER])"
        ));
    }
}
