//! Static and reference list initializer data
//!
//! Initializers are supplied outside the model files (JSON), keyed by class
//! name. They are checked against the graph, then folded into the classes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Kind of list an initializer fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    /// Closed, enumeration-like list
    Static,

    /// Business reference list
    Reference,
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Reference => write!(f, "reference"),
        }
    }
}

/// A constant value of an initializer item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InitValue {
    /// SQL null
    Null,

    /// Boolean
    Bool(bool),

    /// Integer
    Integer(i64),

    /// Decimal number
    Float(f64),

    /// Text
    Text(String),
}

impl From<&str> for InitValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for InitValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// One row of a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemInit {
    /// Name of the item (constant name in generated code)
    pub name: String,

    /// Values by property name
    #[serde(default)]
    pub values: BTreeMap<String, InitValue>,

    /// Translated labels by language code
    #[serde(default)]
    pub translations: BTreeMap<String, String>,
}

impl ItemInit {
    /// Create an item without values
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
            translations: BTreeMap::new(),
        }
    }

    /// Add a value
    pub fn with_value(mut self, property: impl Into<String>, value: impl Into<InitValue>) -> Self {
        self.values.insert(property.into(), value.into());
        self
    }

    /// Add a translation
    pub fn with_translation(mut self, lang: impl Into<String>, label: impl Into<String>) -> Self {
        self.translations.insert(lang.into(), label.into());
        self
    }
}

/// Initializer batch of one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInit {
    /// Name of the supplying factory
    pub factory: String,

    /// Expected list kind
    pub kind: ListKind,

    /// Rows
    #[serde(default)]
    pub items: Vec<ItemInit>,
}

impl TableInit {
    /// Create an empty batch
    pub fn new(factory: impl Into<String>, kind: ListKind) -> Self {
        Self {
            factory: factory.into(),
            kind,
            items: Vec::new(),
        }
    }

    /// Add an item
    pub fn with_item(mut self, item: ItemInit) -> Self {
        self.items.push(item);
        self
    }
}

/// All initializer batches, keyed by class name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InitMap {
    tables: BTreeMap<String, TableInit>,

    /// File the batches were loaded from
    #[serde(skip)]
    source: Option<String>,
}

impl InitMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Load initializers from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, InitError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| InitError::IoError(path.display().to_string(), e.to_string()))?;

        Ok(Self::from_json(&contents)?.with_source(path.display().to_string()))
    }

    /// Parse initializers from a JSON string
    pub fn from_json(json: &str) -> Result<Self, InitError> {
        serde_json::from_str(json)
            .map_err(|e| InitError::ParseError(e.to_string()))
    }

    /// Record the file the batches come from
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// File the batches were loaded from, if any
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Add a batch
    pub fn insert(&mut self, class: impl Into<String>, table: TableInit) {
        self.tables.insert(class.into(), table);
    }

    /// Batch of a class
    pub fn get(&self, class: &str) -> Option<&TableInit> {
        self.tables.get(class)
    }

    /// Batches in class name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TableInit)> {
        self.tables.iter()
    }

    /// Number of batches
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether there is no batch
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Initializer loading errors
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Failed to read initializer file {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse initializer JSON: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init_json() {
        let init = InitMap::from_json(
            r#"{
                "Country": {
                    "factory": "CountryFactory",
                    "kind": "reference",
                    "items": [
                        {
                            "name": "France",
                            "values": { "Code": "FR", "Label": "France", "Rank": 1, "IsEu": true, "Vat": 20.5, "Comment": null },
                            "translations": { "en": "France" }
                        }
                    ]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(init.len(), 1);
        let country = init.get("Country").unwrap();
        assert_eq!(country.kind, ListKind::Reference);
        let item = &country.items[0];
        assert_eq!(item.values["Code"], InitValue::Text("FR".to_string()));
        assert_eq!(item.values["Rank"], InitValue::Integer(1));
        assert_eq!(item.values["IsEu"], InitValue::Bool(true));
        assert_eq!(item.values["Vat"], InitValue::Float(20.5));
        assert_eq!(item.values["Comment"], InitValue::Null);
        assert_eq!(item.translations["en"], "France");
    }

    #[test]
    fn loaded_map_remembers_its_file() {
        let path = Path::new("../../fixtures/shop/init.json");
        let init = InitMap::from_file(path).unwrap();

        assert_eq!(init.source(), Some(path.display().to_string().as_str()));
        assert_eq!(InitMap::from_json("{}").unwrap().source(), None);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let result = InitMap::from_json(r#"{ "Country": { "factory": "F", "kind": "dynamic" } }"#);
        assert!(matches!(result, Err(InitError::ParseError(_))));
    }
}
