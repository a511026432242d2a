//! Interchange dialect adapters
//!
//! A [`ModelDialect`] knows where a dialect keeps each kind of element and how
//! its attributes are spelled. [`extract`] is the single walk shared by all
//! dialects; it turns a parsed document into a [`RawModel`].

mod oom;
mod xmi;

pub use oom::OomDialect;
pub use xmi::XmiDialect;

use crate::raw::{
    RawAssociation, RawClass, RawDomain, RawGeneralization, RawModel, RawNamespace, RawProperty,
    RawShortcut,
};
use crate::reader::ReadError;
use modelc_core::ModelFormat;
use roxmltree::{Document, Node};

/// A required field missing from an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingField {
    pub element: &'static str,
    pub field: &'static str,
}

impl MissingField {
    pub fn new(element: &'static str, field: &'static str) -> Self {
        Self { element, field }
    }
}

/// A domain slot holds either a declaration or a shortcut to a shared domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEntry {
    Domain(RawDomain),
    Shortcut(RawShortcut),
}

/// A class slot holds either a declaration or a shortcut to another model's class
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassEntry {
    Class(RawClass),
    Shortcut(RawShortcut),
}

/// Node and attribute naming of one interchange dialect
pub trait ModelDialect {
    /// Dialect name, for logs
    fn name(&self) -> &'static str;

    /// The model element of a document
    fn model_node<'a, 'input>(&self, doc: &'a Document<'input>) -> Option<Node<'a, 'input>>;

    /// Model name and label
    fn read_header(&self, model: &Node) -> Result<(String, Option<String>), MissingField>;

    /// Domain and domain shortcut elements
    fn domain_nodes<'a, 'input>(&self, model: &Node<'a, 'input>) -> Vec<Node<'a, 'input>>;

    fn read_domain(&self, node: &Node) -> Result<DomainEntry, MissingField>;

    /// Namespace elements
    fn namespace_nodes<'a, 'input>(&self, model: &Node<'a, 'input>) -> Vec<Node<'a, 'input>>;

    /// Namespace fields, classes excluded
    fn read_namespace(&self, node: &Node) -> Result<RawNamespace, MissingField>;

    /// Class and class shortcut elements of a namespace
    fn class_nodes<'a, 'input>(&self, namespace: &Node<'a, 'input>) -> Vec<Node<'a, 'input>>;

    /// Class fields, properties excluded
    fn read_class(&self, node: &Node) -> Result<ClassEntry, MissingField>;

    /// Class shortcuts declared outside any namespace
    fn model_shortcut_nodes<'a, 'input>(&self, model: &Node<'a, 'input>) -> Vec<Node<'a, 'input>>;

    /// Property elements of a class
    fn property_nodes<'a, 'input>(&self, class: &Node<'a, 'input>) -> Vec<Node<'a, 'input>>;

    fn read_property(&self, node: &Node) -> Result<RawProperty, MissingField>;

    /// Generalization elements
    fn generalization_nodes<'a, 'input>(&self, model: &Node<'a, 'input>) -> Vec<Node<'a, 'input>>;

    fn read_generalization(&self, node: &Node) -> Result<RawGeneralization, MissingField>;

    /// Association elements
    fn association_nodes<'a, 'input>(&self, model: &Node<'a, 'input>) -> Vec<Node<'a, 'input>>;

    fn read_association(&self, node: &Node) -> Result<RawAssociation, MissingField>;
}

/// Select the adapter of a model format
pub fn dialect_for(format: ModelFormat) -> Box<dyn ModelDialect> {
    match format {
        ModelFormat::Oom => Box::new(OomDialect),
        ModelFormat::Xmi => Box::new(XmiDialect),
    }
}

/// Normalise the multiplicity spellings of modeling tools to `0..1`, `1..1`, `0..N`, `1..N`
///
/// Unknown spellings are returned unchanged so the reader can report them.
pub fn normalize_multiplicity(value: &str) -> String {
    let value = value.trim();
    let (lower, upper) = match value.split_once("..") {
        Some((l, u)) => (l.trim(), u.trim()),
        None => (value, value),
    };

    let upper = match upper {
        "*" | "n" | "N" => "N",
        other => other,
    };
    let lower = match lower {
        "*" | "n" | "N" => "0",
        other => other,
    };

    format!("{}..{}", lower, upper)
}

/// Walk a parsed document with a dialect adapter
pub fn extract(dialect: &dyn ModelDialect, doc: &Document, path: &str) -> Result<RawModel, ReadError> {
    let missing = |m: MissingField| ReadError::MissingAttribute {
        path: path.to_string(),
        element: m.element.to_string(),
        field: m.field.to_string(),
    };

    let model = dialect
        .model_node(doc)
        .ok_or_else(|| ReadError::MissingModel(path.to_string()))?;

    let (name, label) = dialect.read_header(&model).map_err(missing)?;
    let mut raw = RawModel {
        name,
        label,
        ..RawModel::default()
    };

    for node in dialect.domain_nodes(&model) {
        match dialect.read_domain(&node).map_err(missing)? {
            DomainEntry::Domain(domain) => raw.domains.push(domain),
            DomainEntry::Shortcut(shortcut) => raw.domain_shortcuts.push(shortcut),
        }
    }

    for node in dialect.model_shortcut_nodes(&model) {
        if let ClassEntry::Shortcut(shortcut) = dialect.read_class(&node).map_err(missing)? {
            raw.class_shortcuts.push(shortcut);
        }
    }

    for ns_node in dialect.namespace_nodes(&model) {
        let mut namespace = dialect.read_namespace(&ns_node).map_err(missing)?;

        for class_node in dialect.class_nodes(&ns_node) {
            match dialect.read_class(&class_node).map_err(missing)? {
                ClassEntry::Class(mut class) => {
                    for prop_node in dialect.property_nodes(&class_node) {
                        class.properties.push(dialect.read_property(&prop_node).map_err(missing)?);
                    }
                    namespace.classes.push(class);
                }
                ClassEntry::Shortcut(shortcut) => raw.class_shortcuts.push(shortcut),
            }
        }

        raw.namespaces.push(namespace);
    }

    for node in dialect.generalization_nodes(&model) {
        raw.generalizations.push(dialect.read_generalization(&node).map_err(missing)?);
    }

    for node in dialect.association_nodes(&model) {
        raw.associations.push(dialect.read_association(&node).map_err(missing)?);
    }

    tracing::debug!(
        dialect = dialect.name(),
        path,
        namespaces = raw.namespaces.len(),
        domains = raw.domains.len(),
        associations = raw.associations.len(),
        "Extracted model"
    );

    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplicity_spellings() {
        assert_eq!(normalize_multiplicity("0..*"), "0..N");
        assert_eq!(normalize_multiplicity("1..*"), "1..N");
        assert_eq!(normalize_multiplicity("*"), "0..N");
        assert_eq!(normalize_multiplicity("1"), "1..1");
        assert_eq!(normalize_multiplicity("0..n"), "0..N");
        assert_eq!(normalize_multiplicity("0..1"), "0..1");
        assert_eq!(normalize_multiplicity("2..5"), "2..5");
    }

    #[test]
    fn format_selects_dialect() {
        assert_eq!(dialect_for(ModelFormat::Oom).name(), "oom");
        assert_eq!(dialect_for(ModelFormat::Xmi).name(), "xmi");
    }
}
