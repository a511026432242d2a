//! Semantic graph produced by the model readers
//!
//! Classes and namespaces live in arenas and refer to each other through
//! [`ClassId`] / [`NamespaceId`] indices, so cross-file references resolved by
//! the readers stay cheap to copy and trivially serialisable.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::init::{InitMap, ItemInit};

/// Index of a class in [`Graph::classes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClassId(pub usize);

/// Index of a namespace in [`Graph::namespaces`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NamespaceId(pub usize);

/// Class stereotype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stereotype {
    /// Plain entity
    #[default]
    None,

    /// Business reference list
    Reference,

    /// Closed, enumeration-like list
    Static,
}

impl Stereotype {
    /// Parse a stereotype tag; `Err` carries the unknown value
    pub fn parse(value: Option<&str>) -> Result<Self, String> {
        match value.map(str::trim) {
            None | Some("") => Ok(Self::None),
            Some(v) if v.eq_ignore_ascii_case("reference") => Ok(Self::Reference),
            Some(v) if v.eq_ignore_ascii_case("static") => Ok(Self::Static),
            Some(v) => Err(v.to_string()),
        }
    }

    /// Whether the class is a Reference or Static list
    pub fn is_list(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for Stereotype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Reference => write!(f, "Reference"),
            Self::Static => write!(f, "Static"),
        }
    }
}

/// Reusable scalar type descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    /// Domain code (e.g. `DO_ID`)
    pub code: String,

    /// Human label
    pub label: Option<String>,

    /// Logical data type (e.g. `int`, `string`)
    pub data_type: Option<String>,

    /// Persistent column type (e.g. `varchar`)
    pub persistent_type: Option<String>,

    /// Length of the persistent type
    pub length: Option<u32>,

    /// Precision of the persistent type
    pub precision: Option<u32>,

    /// Declaring file
    pub file: String,
}

impl Domain {
    /// Create a domain with a logical and a persistent type
    pub fn new(code: impl Into<String>, data_type: impl Into<String>, persistent_type: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: None,
            data_type: Some(data_type.into()),
            persistent_type: Some(persistent_type.into()),
            length: None,
            precision: None,
            file: String::new(),
        }
    }

    /// Set length and precision
    pub fn with_length(mut self, length: u32, precision: Option<u32>) -> Self {
        self.length = Some(length);
        self.precision = precision;
        self
    }

    /// Set the declaring file
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }
}

/// One model file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRoot {
    /// Model name
    pub name: String,

    /// Model label
    pub label: Option<String>,

    /// Source file
    pub file: String,

    /// Codes of the domains declared by this file
    pub domains: Vec<String>,

    /// Namespaces declared by this file
    pub namespaces: Vec<NamespaceId>,
}

/// Grouping of classes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    /// Namespace code
    pub name: String,

    /// Label
    pub label: Option<String>,

    /// Comment
    pub comment: Option<String>,

    /// Creator
    pub creator: Option<String>,

    /// Whether the namespace holds persistent entities (persistent suffix)
    pub is_persistent: bool,

    /// Source file
    pub file: String,

    /// Classes, in declaration order
    pub classes: Vec<ClassId>,

    /// Namespaces this one depends on
    pub uses: BTreeSet<String>,
}

/// Persistence descriptor of a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataContract {
    /// Persisted (table) name
    pub name: String,

    /// Whether the class is persisted
    pub is_persistent: bool,
}

/// Persisted column descriptor of a property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataMember {
    /// Column name, set for persistent properties
    pub name: Option<String>,

    /// Whether a value is required (not null)
    pub is_required: bool,
}

/// What a property is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropertyKind {
    /// Scalar value typed by a domain
    Primitive,

    /// Scalar foreign key to another class
    Reference { target: ClassId },

    /// List of foreign keys to another class
    ReferenceList { target: ClassId },

    /// Composed child class
    Composition { target: ClassId, is_collection: bool },
}

/// A property of a class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProperty {
    /// Property name
    pub name: String,

    /// Comment
    pub comment: Option<String>,

    /// Logical type declared by the property
    pub data_type: Option<String>,

    /// Domain code
    pub domain: Option<String>,

    /// Persisted column
    pub data_member: DataMember,

    /// Part of the primary key
    pub is_primary_key: bool,

    /// Single-column unique key
    pub is_unique: bool,

    /// Part of the composite unique key
    pub is_unique_many: bool,

    /// Persisted as a column
    pub is_persistent: bool,

    /// Default ordering property of the class
    pub is_ordered: bool,

    /// Persistent type overriding the domain's
    pub persistent_type: Option<String>,

    /// Association role
    pub role: Option<String>,

    /// Primitive or association-derived
    pub kind: PropertyKind,
}

impl ModelProperty {
    /// Create a primitive property
    pub fn primitive(name: impl Into<String>, domain: Option<String>) -> Self {
        Self {
            name: name.into(),
            comment: None,
            data_type: None,
            domain,
            data_member: DataMember {
                name: None,
                is_required: false,
            },
            is_primary_key: false,
            is_unique: false,
            is_unique_many: false,
            is_persistent: false,
            is_ordered: false,
            persistent_type: None,
            role: None,
            kind: PropertyKind::Primitive,
        }
    }

    /// Whether this property is a primitive value
    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, PropertyKind::Primitive)
    }

    /// Target of a scalar foreign key
    pub fn reference_target(&self) -> Option<ClassId> {
        match self.kind {
            PropertyKind::Reference { target } => Some(target),
            _ => None,
        }
    }

    /// Whether this property becomes a table column
    pub fn is_column(&self) -> bool {
        self.is_persistent
            && self.data_member.name.is_some()
            && matches!(self.kind, PropertyKind::Primitive | PropertyKind::Reference { .. })
    }

    /// Column name, for persistent properties
    pub fn column_name(&self) -> Option<&str> {
        self.data_member.name.as_deref()
    }
}

/// An entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelClass {
    /// Class name
    pub name: String,

    /// Label
    pub label: Option<String>,

    /// Comment
    pub comment: Option<String>,

    /// Stereotype
    pub stereotype: Stereotype,

    /// Persistence descriptor
    pub data_contract: DataContract,

    /// Properties, in declaration then resolution order
    pub properties: Vec<ModelProperty>,

    /// Parent class (single inheritance)
    pub parent: Option<ClassId>,

    /// Three-letter persistence prefix
    pub trigram: Option<String>,

    /// Storage hint (filegroup / tablespace)
    pub storage: Option<String>,

    /// Keeps a history table
    pub is_historized: bool,

    /// Carries audit columns
    pub is_audited: bool,

    /// Tracks rows for delta exports
    pub is_export_delta_tracked: bool,

    /// Owning namespace
    pub namespace: NamespaceId,

    /// Source file
    pub file: String,

    /// Folded initializer items
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constant_values: Vec<ItemInit>,
}

impl ModelClass {
    /// Whether the class is persisted
    pub fn is_persistent(&self) -> bool {
        self.data_contract.is_persistent
    }

    /// Table name
    pub fn table_name(&self) -> &str {
        &self.data_contract.name
    }

    /// Primary key properties
    pub fn primary_keys(&self) -> impl Iterator<Item = &ModelProperty> {
        self.properties.iter().filter(|p| p.is_primary_key)
    }

    /// First primary key property
    pub fn primary_key(&self) -> Option<&ModelProperty> {
        self.primary_keys().next()
    }

    /// Find a property by name
    pub fn property(&self, name: &str) -> Option<&ModelProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Result of walking a class's parent chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ancestry {
    /// Ancestors, nearest first
    pub chain: Vec<ClassId>,

    /// Whether the chain loops back onto an already visited class
    pub cycle: bool,
}

/// The semantic graph of one model set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    /// Model files, in reading order
    pub models: Vec<ModelRoot>,

    /// Namespace arena
    pub namespaces: Vec<Namespace>,

    /// Class arena
    pub classes: Vec<ModelClass>,

    /// Domains by code
    pub domains: BTreeMap<String, Domain>,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a class
    pub fn class(&self, id: ClassId) -> &ModelClass {
        &self.classes[id.0]
    }

    /// Get a class mutably
    pub fn class_mut(&mut self, id: ClassId) -> &mut ModelClass {
        &mut self.classes[id.0]
    }

    /// All class ids, in arena order
    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> {
        (0..self.classes.len()).map(ClassId)
    }

    /// Find the first class with a name
    pub fn class_by_name(&self, name: &str) -> Option<ClassId> {
        self.classes.iter().position(|c| c.name == name).map(ClassId)
    }

    /// Persistent class ids, in arena order
    pub fn persistent_classes(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.class_ids().filter(|id| self.class(*id).is_persistent())
    }

    /// Get a namespace
    pub fn namespace(&self, id: NamespaceId) -> &Namespace {
        &self.namespaces[id.0]
    }

    /// Namespace of a class
    pub fn namespace_of(&self, class: ClassId) -> &Namespace {
        self.namespace(self.class(class).namespace)
    }

    /// Record that `from` depends on the namespace of class `to`
    pub fn add_namespace_use(&mut self, from: ClassId, to: ClassId) {
        let from_ns = self.class(from).namespace;
        let to_ns = self.class(to).namespace;
        if from_ns != to_ns {
            let name = self.namespace(to_ns).name.clone();
            self.namespaces[from_ns.0].uses.insert(name);
        }
    }

    /// Get a domain by code
    pub fn domain(&self, code: &str) -> Option<&Domain> {
        self.domains.get(code)
    }

    /// Domain of a property, if declared and known
    pub fn property_domain(&self, property: &ModelProperty) -> Option<&Domain> {
        property.domain.as_deref().and_then(|code| self.domain(code))
    }

    /// Walk the parent chain of a class
    ///
    /// The walk is iterative and stops on the first class visited twice, so a
    /// malformed cyclic chain is reported instead of looping.
    pub fn ancestors(&self, id: ClassId) -> Ancestry {
        let mut visited = HashSet::new();
        visited.insert(id);

        let mut chain = Vec::new();
        let mut current = self.class(id).parent;

        while let Some(parent) = current {
            if !visited.insert(parent) {
                return Ancestry { chain, cycle: true };
            }
            chain.push(parent);
            current = self.class(parent).parent;
        }

        Ancestry { chain, cycle: false }
    }

    /// Fold initializer items into their classes
    ///
    /// Returns the number of classes that received items. Batches naming an
    /// unknown class are ignored; the initializer checker reports them.
    pub fn fold_init(&mut self, init: &InitMap) -> usize {
        let mut folded = 0;
        for (class_name, table) in init.iter() {
            if let Some(id) = self.class_by_name(class_name) {
                self.class_mut(id).constant_values = table.items.clone();
                folded += 1;
            }
        }
        folded
    }

    /// SHA-256 of the canonical JSON form of the graph (hex)
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(Sha256::digest(&json))
    }
}
