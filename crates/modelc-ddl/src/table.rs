//! Relational view of a persistent class

use crate::dialect::{KeyGeneration, SqlDialect};
use crate::error::GenerateError;
use modelc_model::{Graph, ModelClass, ModelProperty, Stereotype};

/// One column of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub sql_type: String,
    pub not_null: bool,
    pub is_identity: bool,
    pub default: Option<String>,
}

/// A foreign key column and the key it points to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyDef {
    pub column: String,
    pub target_table: String,
    pub target_column: String,
}

/// Table derived from a persistent class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    /// Table name
    pub name: String,

    /// Class name
    pub class: String,

    /// Trigram, prefix of the technical columns
    pub trigram: Option<String>,

    pub columns: Vec<ColumnDef>,

    /// Primary key columns
    pub primary_key: Vec<String>,

    /// Columns with a single-column unique key
    pub unique_columns: Vec<String>,

    /// Columns of the composite unique key
    pub composite_unique: Vec<String>,

    pub foreign_keys: Vec<ForeignKeyDef>,

    /// Non-key columns getting their own index (ordering, export tracking)
    pub indexed_columns: Vec<String>,

    /// Whether the single primary key column is generated
    pub generated_key: bool,

    /// Storage hint
    pub storage: Option<String>,
}

impl TableDef {
    /// Build the table of a persistent class
    pub fn from_class(
        graph: &Graph,
        class: &ModelClass,
        dialect: &dyn SqlDialect,
        default_storage: Option<&str>,
    ) -> Result<Self, GenerateError> {
        let mut table = TableDef {
            name: class.table_name().to_string(),
            class: class.name.clone(),
            trigram: class.trigram.clone(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            unique_columns: Vec::new(),
            composite_unique: Vec::new(),
            foreign_keys: Vec::new(),
            indexed_columns: Vec::new(),
            generated_key: false,
            storage: class.storage.clone().or_else(|| default_storage.map(str::to_string)),
        };

        let keys: Vec<&ModelProperty> = class.primary_keys().filter(|p| p.is_column()).collect();
        let generated_key = keys.len() == 1
            && class.stereotype != Stereotype::Static
            && is_integral(graph, keys[0]);
        table.generated_key = generated_key;

        for property in class.properties.iter().filter(|p| p.is_column()) {
            let column = match property.column_name() {
                Some(column) => column.to_string(),
                None => continue,
            };

            let is_identity = generated_key
                && property.is_primary_key
                && dialect.key_generation() == KeyGeneration::Identity;

            table.columns.push(ColumnDef {
                name: column.clone(),
                sql_type: column_type(graph, class, property, dialect)?,
                not_null: property.is_primary_key || property.data_member.is_required,
                is_identity,
                default: None,
            });

            if property.is_primary_key {
                table.primary_key.push(column.clone());
            }
            if property.is_unique && !property.is_primary_key {
                table.unique_columns.push(column.clone());
            }
            if property.is_unique_many {
                table.composite_unique.push(column.clone());
            }
            if property.is_ordered && property.reference_target().is_none() {
                table.indexed_columns.push(column.clone());
            }

            if let Some(target) = property.reference_target() {
                let target = graph.class(target);
                let target_column = target
                    .primary_key()
                    .filter(|pk| target.is_persistent())
                    .and_then(|pk| pk.column_name());
                if let Some(target_column) = target_column {
                    table.foreign_keys.push(ForeignKeyDef {
                        column: column.clone(),
                        target_table: target.table_name().to_string(),
                        target_column: target_column.to_string(),
                    });
                }
            }
        }

        if class.is_audited {
            table.columns.push(ColumnDef {
                name: table.technical_column("CREATED_AT"),
                sql_type: dialect.timestamp_type().to_string(),
                not_null: true,
                is_identity: false,
                default: Some(dialect.now_expression().to_string()),
            });
            table.columns.push(ColumnDef {
                name: table.technical_column("UPDATED_AT"),
                sql_type: dialect.timestamp_type().to_string(),
                not_null: false,
                is_identity: false,
                default: None,
            });
        }

        if class.is_export_delta_tracked {
            let column = table.technical_column("LAST_EXPORT");
            table.columns.push(ColumnDef {
                name: column.clone(),
                sql_type: dialect.timestamp_type().to_string(),
                not_null: false,
                is_identity: false,
                default: None,
            });
            table.indexed_columns.push(column);
        }

        Ok(table)
    }

    /// History table receiving a copy of every inserted or updated row
    pub fn history(&self, dialect: &dyn SqlDialect) -> TableDef {
        let mut columns: Vec<ColumnDef> = self
            .columns
            .iter()
            .map(|c| ColumnDef {
                name: c.name.clone(),
                sql_type: c.sql_type.clone(),
                not_null: false,
                is_identity: false,
                default: None,
            })
            .collect();

        columns.push(ColumnDef {
            name: self.technical_column("HISTO_DATE"),
            sql_type: dialect.timestamp_type().to_string(),
            not_null: true,
            is_identity: false,
            default: None,
        });
        columns.push(ColumnDef {
            name: self.technical_column("HISTO_IS_CREATION"),
            sql_type: dialect.boolean_type().to_string(),
            not_null: true,
            is_identity: false,
            default: None,
        });

        TableDef {
            name: format!("{}_HISTO", self.name),
            class: self.class.clone(),
            trigram: self.trigram.clone(),
            columns,
            primary_key: Vec::new(),
            unique_columns: Vec::new(),
            composite_unique: Vec::new(),
            foreign_keys: Vec::new(),
            indexed_columns: Vec::new(),
            generated_key: false,
            storage: self.storage.clone(),
        }
    }

    /// `TRI_SUFFIX`, or bare `SUFFIX` without trigram
    pub fn technical_column(&self, suffix: &str) -> String {
        match &self.trigram {
            Some(trigram) => format!("{}_{}", trigram, suffix),
            None => suffix.to_string(),
        }
    }

    /// Every identifier the generators derive from this table
    pub fn identifiers(&self, dialect: &dyn SqlDialect, historized: bool) -> Vec<String> {
        let mut identifiers = vec![self.name.clone()];
        identifiers.extend(self.columns.iter().map(|c| c.name.clone()));

        if !self.primary_key.is_empty() {
            identifiers.push(pk_name(&self.name));
        }
        identifiers.extend(self.unique_columns.iter().map(|c| unique_name(&self.name, c)));
        if self.composite_unique.len() > 1 {
            identifiers.push(composite_unique_name(&self.name));
        }
        for fk in &self.foreign_keys {
            identifiers.push(index_name(&self.name, &fk.column));
            identifiers.push(fk_name(&self.name, &fk.column));
        }
        identifiers.extend(self.indexed_columns.iter().map(|c| index_name(&self.name, c)));

        if historized {
            let history = self.history(dialect);
            identifiers.push(history.name.clone());
            identifiers.extend(history.columns.iter().skip(self.columns.len()).map(|c| c.name.clone()));
            identifiers.push(trigger_name(&self.name, "INS"));
            identifiers.push(trigger_name(&self.name, "UPD"));
        }

        if self.generated_key && dialect.key_generation() == KeyGeneration::Sequence {
            identifiers.push(dialect.sequence_name(&self.name));
        }

        identifiers.extend(dialect.table_type_names(&self.name));
        identifiers
    }
}

pub fn pk_name(table: &str) -> String {
    format!("PK_{}", table)
}

pub fn unique_name(table: &str, column: &str) -> String {
    format!("UK_{}_{}", table, column)
}

pub fn composite_unique_name(table: &str) -> String {
    format!("UK_{}_MULTIPLE", table)
}

pub fn index_name(table: &str, column: &str) -> String {
    format!("IDX_{}_{}", table, column)
}

pub fn fk_name(table: &str, column: &str) -> String {
    format!("FK_{}_{}", table, column)
}

pub fn trigger_name(table: &str, event: &str) -> String {
    format!("TRG_{}_{}", table, event)
}

fn column_type(
    graph: &Graph,
    class: &ModelClass,
    property: &ModelProperty,
    dialect: &dyn SqlDialect,
) -> Result<String, GenerateError> {
    let domain = graph.property_domain(property);

    let persistent_type = property
        .persistent_type
        .as_deref()
        .or_else(|| domain.and_then(|d| d.persistent_type.as_deref()))
        .ok_or_else(|| GenerateError::MissingDomain {
            class: class.name.clone(),
            property: property.name.clone(),
        })?;

    // An explicit persistent type on the property carries its own size
    let (length, precision) = match (&property.persistent_type, domain) {
        (None, Some(d)) => (d.length, d.precision),
        _ => (None, None),
    };

    Ok(dialect.column_type(persistent_type, length, precision))
}

fn is_integral(graph: &Graph, property: &ModelProperty) -> bool {
    let persistent_type = property
        .persistent_type
        .clone()
        .or_else(|| graph.property_domain(property).and_then(|d| d.persistent_type.clone()))
        .unwrap_or_default()
        .to_ascii_lowercase();

    matches!(
        persistent_type.as_str(),
        "int" | "integer" | "bigint" | "smallint" | "number"
    )
}
