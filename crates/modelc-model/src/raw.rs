//! Intermediate records extracted from a model document
//!
//! Both interchange dialects are mapped onto these records before any symbol
//! is resolved. Every reference is still a raw id or code string here.

/// How a property names its domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainRef {
    /// Id of a domain or domain shortcut declared in the same file
    Id(String),

    /// Domain code, looked up in the shared domain set
    Code(String),
}

/// A domain declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDomain {
    pub id: String,
    pub code: String,
    pub label: Option<String>,
    pub data_type: Option<String>,
    pub persistent_type: Option<String>,
    pub length: Option<u32>,
    pub precision: Option<u32>,
}

/// A shortcut to a domain or class declared in another model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawShortcut {
    pub id: String,
    pub code: String,
}

/// A property (attribute) declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawProperty {
    pub id: String,
    pub code: String,
    pub comment: Option<String>,
    pub data_type: Option<String>,
    pub persistent: bool,
    pub multiplicity: Option<String>,
    pub domain: Option<DomainRef>,
    pub primary_key: bool,
    pub unique: bool,
    pub unique_many: bool,
    pub ordered: bool,
    pub persistent_code: Option<String>,
    pub persistent_type: Option<String>,
}

/// A class declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawClass {
    pub id: String,
    pub code: String,
    pub label: Option<String>,
    pub comment: Option<String>,
    pub stereotype: Option<String>,
    pub persistent: bool,
    pub persistent_code: Option<String>,
    pub trigram: Option<String>,
    pub storage: Option<String>,
    pub historized: bool,
    pub audited: bool,
    pub export_delta: bool,
    pub properties: Vec<RawProperty>,
}

/// A namespace (package) declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawNamespace {
    pub id: String,
    pub code: String,
    pub label: Option<String>,
    pub comment: Option<String>,
    pub creator: Option<String>,
    pub classes: Vec<RawClass>,
}

/// A generalization connector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGeneralization {
    pub id: String,
    pub parent: String,
    pub child: String,
}

/// Which end of an association owns the other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Composition {
    /// Plain association
    #[default]
    None,

    /// End A is the whole, end B the part
    OwnedByA,

    /// End B is the whole, end A the part
    OwnedByB,
}

/// An association connector
///
/// `multiplicity_b` is the number of B instances one A links to (the
/// multiplicity written at B's end), and `role_b` is the role B plays for A.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAssociation {
    pub id: String,
    pub code: Option<String>,
    pub name: Option<String>,
    pub class_a: String,
    pub class_b: String,
    pub multiplicity_a: String,
    pub multiplicity_b: String,
    pub role_a: Option<String>,
    pub role_b: Option<String>,
    pub composition: Composition,
}

/// Everything extracted from one model document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawModel {
    pub name: String,
    pub label: Option<String>,
    pub domains: Vec<RawDomain>,
    pub domain_shortcuts: Vec<RawShortcut>,
    pub namespaces: Vec<RawNamespace>,
    pub class_shortcuts: Vec<RawShortcut>,
    pub generalizations: Vec<RawGeneralization>,
    pub associations: Vec<RawAssociation>,
}
