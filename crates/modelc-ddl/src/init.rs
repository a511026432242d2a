//! Static and reference list content
//!
//! List tables are filled in dependency order: a table whose rows reference
//! another list must come after it. Ordering is a swap-and-restart pass with
//! no cycle detection; the initializer checker rejects static cycles and a
//! swap budget stops anything it missed.

use crate::error::GenerateError;
use crate::schema::SchemaGenerator;
use crate::script::ScriptWriter;
use crate::table::TableDef;
use modelc_model::{ClassId, Graph, ItemInit, ModelClass, Stereotype};
use std::io::Write;
use tracing::{info, warn};

/// Order list classes so that referenced classes come first
///
/// Self references are ignored. Fails with
/// [`GenerateError::UnorderableInit`] once `n²` swaps have not settled the
/// order.
pub fn order_init_tables(graph: &Graph, ids: &[ClassId]) -> Result<Vec<ClassId>, GenerateError> {
    let mut order = ids.to_vec();
    let budget = order.len() * order.len();
    let mut swaps = 0;

    'restart: loop {
        for i in 0..order.len() {
            for j in (i + 1)..order.len() {
                if references(graph, order[i], order[j]) {
                    if swaps == budget {
                        let names: Vec<&str> = order.iter().map(|id| graph.class(*id).name.as_str()).collect();
                        return Err(GenerateError::UnorderableInit(names.join(", ")));
                    }
                    order.swap(i, j);
                    swaps += 1;
                    continue 'restart;
                }
            }
        }

        return Ok(order);
    }
}

fn references(graph: &Graph, from: ClassId, to: ClassId) -> bool {
    from != to
        && graph
            .class(from)
            .properties
            .iter()
            .any(|p| p.reference_target() == Some(to))
}

impl SchemaGenerator {
    /// Write the list content and reference translation scripts
    ///
    /// Returns the number of rows inserted.
    pub fn generate_init<W: Write>(
        &self,
        graph: &Graph,
        data: &mut ScriptWriter<W>,
        translations: &mut ScriptWriter<W>,
    ) -> Result<usize, GenerateError> {
        let lists: Vec<ClassId> = graph
            .persistent_classes()
            .filter(|id| {
                let class = graph.class(*id);
                class.stereotype.is_list() && !class.constant_values.is_empty()
            })
            .collect();

        let mut rows = 0;
        for id in order_init_tables(graph, &lists)? {
            let class = graph.class(id);
            let table = self.table(graph, id)?;
            rows += self.insert_items(class, &table, data)?;

            if class.stereotype == Stereotype::Reference {
                self.insert_translations(class, &table, translations)?;
            }
        }

        info!(tables = lists.len(), rows, "Initializer scripts written");
        Ok(rows)
    }

    /// Insert every item of a list, in declaration order
    ///
    /// Under identity key generation, explicit key values are only accepted
    /// between `identity_insert on` and `off`, so the toggle brackets each run
    /// of items that supply their key. Items that end up with no column at
    /// all are skipped. Returns the number of rows written.
    fn insert_items<W: Write>(
        &self,
        class: &ModelClass,
        table: &TableDef,
        data: &mut ScriptWriter<W>,
    ) -> Result<usize, GenerateError> {
        let key = class.primary_key().map(|k| k.name.as_str());
        let uses_identity = self.uses_identity(table);
        let mut identity_on = false;
        let mut rows = 0;

        data.comment(&format!("{} ({})", class.name, table.name))?;

        for item in &class.constant_values {
            let (columns, values) = self.item_columns(class, table, item);
            if columns.is_empty() {
                warn!("Item {} of {} sets no column, insert skipped", item.name, class.name);
                continue;
            }

            let supplies_key = key.map_or(false, |k| item.values.contains_key(k));
            if uses_identity && supplies_key != identity_on {
                if let Some(statement) = self.dialect.identity_insert(&table.name, supplies_key) {
                    data.statement(&statement)?;
                }
                identity_on = supplies_key;
            }

            data.statement(&format!(
                "insert into {} ({}) values ({})",
                self.dialect.quote(&table.name),
                columns.join(", "),
                values.join(", ")
            ))?;
            rows += 1;
        }

        if identity_on {
            if let Some(statement) = self.dialect.identity_insert(&table.name, false) {
                data.statement(&statement)?;
            }
        }

        Ok(rows)
    }

    fn item_columns(
        &self,
        class: &ModelClass,
        table: &TableDef,
        item: &ItemInit,
    ) -> (Vec<String>, Vec<String>) {
        let mut columns = Vec::new();
        let mut values = Vec::new();

        for property in class.properties.iter().filter(|p| p.is_column()) {
            let column = match property.column_name() {
                Some(column) => column,
                None => continue,
            };

            match item.values.get(&property.name) {
                Some(value) => {
                    columns.push(self.dialect.quote(column));
                    values.push(self.dialect.literal(value));
                }
                None if property.is_primary_key && self.uses_sequence(table) => {
                    if let Some(next) = self.dialect.next_value(&table.name) {
                        columns.push(self.dialect.quote(column));
                        values.push(next);
                    }
                }
                None => {}
            }
        }

        (columns, values)
    }

    fn insert_translations<W: Write>(
        &self,
        class: &ModelClass,
        table: &TableDef,
        translations: &mut ScriptWriter<W>,
    ) -> Result<(), GenerateError> {
        let key_column = match class.primary_key().and_then(|k| k.column_name()) {
            Some(column) => column,
            None => return Ok(()),
        };

        let concat = self.dialect.concat_operator();
        let resource_key = format!(
            "'{}' {} '.' {} {}",
            class.name,
            concat,
            concat,
            self.dialect.to_text(&self.dialect.quote(key_column))
        );

        for item in &class.constant_values {
            if item.translations.is_empty() {
                continue;
            }

            let filter = match self.item_filter(class, item) {
                Some(filter) => filter,
                None => {
                    warn!(
                        "Item {} of {} has neither key nor unique value, translations skipped",
                        item.name, class.name
                    );
                    continue;
                }
            };

            for (lang, label) in &item.translations {
                translations.statement(&format!(
                    "insert into {} ({}, {}, {}) select {}, {}, {} from {} where {}",
                    self.dialect.quote(&self.options.translation_table),
                    self.dialect.quote("RESOURCE_KEY"),
                    self.dialect.quote("LANG_CODE"),
                    self.dialect.quote("LABEL"),
                    resource_key,
                    self.dialect.literal(&lang.as_str().into()),
                    self.dialect.literal(&label.as_str().into()),
                    self.dialect.quote(&table.name),
                    filter
                ))?;
            }
        }

        Ok(())
    }

    /// `COLUMN = literal` on the key, or on the first unique column supplied
    fn item_filter(&self, class: &ModelClass, item: &ItemInit) -> Option<String> {
        let key = class.primary_keys().chain(class.properties.iter().filter(|p| p.is_unique));

        for property in key {
            if let (Some(column), Some(value)) = (property.column_name(), item.values.get(&property.name)) {
                return Some(format!("{} = {}", self.dialect.quote(column), self.dialect.literal(value)));
            }
        }

        None
    }
}
