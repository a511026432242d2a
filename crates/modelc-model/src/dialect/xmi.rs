//! XMI 1.1 dialect
//!
//! Elements carry `xmi.id` and `name` attributes. Model-specific fields are
//! tagged values (`UML:TaggedValue tag=".." value=".."`). Domains are
//! `UML:DataType` elements; a `shortcut` stereotype turns a data type or a
//! class into a shortcut to a declaration living in another model.
//!
//! Associations list two `UML:AssociationEnd` elements: the first is end A,
//! the second end B. An end whose `aggregation` is `composite` owns the other.

use super::{ClassEntry, DomainEntry, MissingField, ModelDialect};
use crate::raw::{
    Composition, DomainRef, RawAssociation, RawClass, RawDomain, RawGeneralization, RawNamespace,
    RawProperty, RawShortcut,
};
use crate::xml;
use roxmltree::{Document, Node};
use std::collections::HashMap;

const SHORTCUT: &str = "shortcut";

/// Enterprise-Architect-style XMI adapter
#[derive(Debug, Clone, Copy, Default)]
pub struct XmiDialect;

impl XmiDialect {
    fn id(node: &Node, element: &'static str) -> Result<String, MissingField> {
        xml::attr(node, "xmi.id").ok_or(MissingField::new(element, "xmi.id"))
    }

    fn element_name(node: &Node, element: &'static str) -> Result<String, MissingField> {
        xml::attr(node, "name").ok_or(MissingField::new(element, "name"))
    }

    /// Stereotype from the stereotype element, or the `stereotype` tag
    fn stereotype(node: &Node, tags: &HashMap<String, String>) -> Option<String> {
        xml::child(node, "ModelElement.stereotype")
            .and_then(|s| xml::child(&s, "Stereotype"))
            .and_then(|s| xml::attr(&s, "name"))
            .or_else(|| tags.get("stereotype").cloned())
            .filter(|s| !s.is_empty())
    }

    fn is_shortcut(node: &Node, tags: &HashMap<String, String>) -> bool {
        Self::stereotype(node, tags).map_or(false, |s| s.eq_ignore_ascii_case(SHORTCUT))
    }

    fn persistent(tags: &HashMap<String, String>) -> bool {
        tags.get("persistence")
            .map_or(false, |p| p.eq_ignore_ascii_case("persistent"))
    }

    fn tag_flag(tags: &HashMap<String, String>, name: &str) -> bool {
        xml::flag(tags.get(name).map(String::as_str))
    }

    fn tag(tags: &HashMap<String, String>, name: &str) -> Option<String> {
        tags.get(name).filter(|v| !v.is_empty()).cloned()
    }

    /// Declared descendants with a local name
    fn declarations<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Vec<Node<'a, 'input>> {
        node.descendants()
            .filter(|n| xml::is(n, name) && n.attribute("xmi.id").is_some())
            .collect()
    }

    /// Direct owned elements of a model or package
    fn owned<'a, 'input>(node: &Node<'a, 'input>, name: &'a str) -> Vec<Node<'a, 'input>> {
        xml::nested(node, "Namespace.ownedElement", name)
    }
}

impl ModelDialect for XmiDialect {
    fn name(&self) -> &'static str {
        "xmi"
    }

    fn model_node<'a, 'input>(&self, doc: &'a Document<'input>) -> Option<Node<'a, 'input>> {
        doc.descendants()
            .find(|n| xml::is(n, "Model") && n.attribute("name").is_some())
    }

    fn read_header(&self, model: &Node) -> Result<(String, Option<String>), MissingField> {
        let tags = xml::tagged_values(model);
        Ok((Self::element_name(model, "Model")?, Self::tag(&tags, "alias")))
    }

    fn domain_nodes<'a, 'input>(&self, model: &Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
        Self::declarations(model, "DataType")
    }

    fn read_domain(&self, node: &Node) -> Result<DomainEntry, MissingField> {
        let tags = xml::tagged_values(node);
        let id = Self::id(node, "DataType")?;
        let code = Self::element_name(node, "DataType")?;

        if Self::is_shortcut(node, &tags) {
            return Ok(DomainEntry::Shortcut(RawShortcut { id, code }));
        }

        Ok(DomainEntry::Domain(RawDomain {
            id,
            code,
            label: Self::tag(&tags, "alias"),
            data_type: Self::tag(&tags, "type"),
            persistent_type: Self::tag(&tags, "persistenttype"),
            length: xml::number(tags.get("length").map(String::as_str)),
            precision: xml::number(tags.get("precision").map(String::as_str)),
        }))
    }

    fn namespace_nodes<'a, 'input>(&self, model: &Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
        Self::declarations(model, "Package")
    }

    fn read_namespace(&self, node: &Node) -> Result<RawNamespace, MissingField> {
        let tags = xml::tagged_values(node);
        Ok(RawNamespace {
            id: Self::id(node, "Package")?,
            code: Self::element_name(node, "Package")?,
            label: Self::tag(&tags, "alias"),
            comment: Self::tag(&tags, "documentation"),
            creator: Self::tag(&tags, "author"),
            classes: Vec::new(),
        })
    }

    fn class_nodes<'a, 'input>(&self, namespace: &Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
        Self::owned(namespace, "Class")
    }

    fn read_class(&self, node: &Node) -> Result<ClassEntry, MissingField> {
        let tags = xml::tagged_values(node);
        let id = Self::id(node, "Class")?;
        let code = Self::element_name(node, "Class")?;

        if Self::is_shortcut(node, &tags) {
            return Ok(ClassEntry::Shortcut(RawShortcut { id, code }));
        }

        Ok(ClassEntry::Class(RawClass {
            id,
            code,
            label: Self::tag(&tags, "alias"),
            comment: Self::tag(&tags, "documentation"),
            stereotype: Self::stereotype(node, &tags),
            persistent: Self::persistent(&tags),
            persistent_code: Self::tag(&tags, "tablename"),
            trigram: Self::tag(&tags, "trigram"),
            storage: Self::tag(&tags, "storage"),
            historized: Self::tag_flag(&tags, "historized"),
            audited: Self::tag_flag(&tags, "audited"),
            export_delta: Self::tag_flag(&tags, "exportdelta"),
            properties: Vec::new(),
        }))
    }

    fn model_shortcut_nodes<'a, 'input>(&self, model: &Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
        Self::owned(model, "Class")
    }

    fn property_nodes<'a, 'input>(&self, class: &Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
        xml::nested(class, "Classifier.feature", "Attribute")
    }

    fn read_property(&self, node: &Node) -> Result<RawProperty, MissingField> {
        let tags = xml::tagged_values(node);

        let multiplicity = match (tags.get("lowerbound"), tags.get("upperbound")) {
            (Some(lower), Some(upper)) => Some(format!("{}..{}", lower, upper)),
            (Some(bound), None) | (None, Some(bound)) => Some(bound.clone()),
            (None, None) => None,
        }
        .map(|m| super::normalize_multiplicity(&m));

        Ok(RawProperty {
            id: Self::id(node, "Attribute")?,
            code: Self::element_name(node, "Attribute")?,
            comment: Self::tag(&tags, "documentation"),
            data_type: Self::tag(&tags, "type"),
            persistent: Self::persistent(&tags),
            multiplicity,
            domain: Self::tag(&tags, "domain").map(DomainRef::Code),
            primary_key: Self::tag_flag(&tags, "isid"),
            unique: Self::tag_flag(&tags, "unique"),
            unique_many: Self::tag_flag(&tags, "uniquemany"),
            ordered: Self::tag_flag(&tags, "ordered"),
            persistent_code: Self::tag(&tags, "columnname"),
            persistent_type: Self::tag(&tags, "columntype"),
        })
    }

    fn generalization_nodes<'a, 'input>(&self, model: &Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
        Self::declarations(model, "Generalization")
    }

    fn read_generalization(&self, node: &Node) -> Result<RawGeneralization, MissingField> {
        Ok(RawGeneralization {
            id: Self::id(node, "Generalization")?,
            parent: xml::attr(node, "supertype")
                .ok_or(MissingField::new("Generalization", "supertype"))?,
            child: xml::attr(node, "subtype")
                .ok_or(MissingField::new("Generalization", "subtype"))?,
        })
    }

    fn association_nodes<'a, 'input>(&self, model: &Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
        Self::declarations(model, "Association")
    }

    fn read_association(&self, node: &Node) -> Result<RawAssociation, MissingField> {
        let tags = xml::tagged_values(node);
        let ends = xml::nested(node, "Association.connection", "AssociationEnd");
        let (a, b) = match ends.as_slice() {
            [a, b] => (*a, *b),
            _ => return Err(MissingField::new("Association", "AssociationEnd")),
        };

        let composite = |end: &Node| {
            end.attribute("aggregation")
                .map_or(false, |v| v.eq_ignore_ascii_case("composite"))
        };
        let composition = if composite(&a) {
            Composition::OwnedByA
        } else if composite(&b) {
            Composition::OwnedByB
        } else {
            Composition::None
        };

        let class = |end: &Node| {
            xml::attr(end, "type").ok_or(MissingField::new("AssociationEnd", "type"))
        };
        let multiplicity = |end: &Node| {
            xml::attr(end, "multiplicity")
                .map(|m| super::normalize_multiplicity(&m))
                .unwrap_or_default()
        };

        Ok(RawAssociation {
            id: Self::id(node, "Association")?,
            code: Self::tag(&tags, "code"),
            name: xml::attr(node, "name"),
            class_a: class(&a)?,
            class_b: class(&b)?,
            multiplicity_a: multiplicity(&a),
            multiplicity_b: multiplicity(&b),
            role_a: xml::attr(&a, "name"),
            role_b: xml::attr(&b, "name"),
            composition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::extract;

    const MODEL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<XMI xmi.version="1.1" xmlns:UML="omg.org/UML1.3">
<XMI.content>
<UML:Model name="Catalog" xmi.id="m1">
<UML:Namespace.ownedElement>
<UML:DataType xmi.id="dt1" name="DO_CODE">
<UML:ModelElement.taggedValue>
<UML:TaggedValue tag="type" value="string"/>
<UML:TaggedValue tag="persistenttype" value="varchar"/>
<UML:TaggedValue tag="length" value="10"/>
</UML:ModelElement.taggedValue>
</UML:DataType>
<UML:Package xmi.id="p1" name="Catalog.CatalogDataContract">
<UML:Namespace.ownedElement>
<UML:Class xmi.id="c1" name="Category">
<UML:ModelElement.stereotype><UML:Stereotype name="Static"/></UML:ModelElement.stereotype>
<UML:ModelElement.taggedValue>
<UML:TaggedValue tag="persistence" value="Persistent"/>
<UML:TaggedValue tag="Trigram" value="CAT"/>
</UML:ModelElement.taggedValue>
<UML:Classifier.feature>
<UML:Attribute xmi.id="a1" name="Code">
<UML:ModelElement.taggedValue>
<UML:TaggedValue tag="domain" value="DO_CODE"/>
<UML:TaggedValue tag="isID" value="true"/>
<UML:TaggedValue tag="lowerBound" value="1"/>
<UML:TaggedValue tag="upperBound" value="1"/>
</UML:ModelElement.taggedValue>
</UML:Attribute>
</UML:Classifier.feature>
</UML:Class>
<UML:Class xmi.id="c2" name="Product"/>
<UML:Association xmi.id="as1" name="Product category">
<UML:Association.connection>
<UML:AssociationEnd type="c2" multiplicity="0..*"/>
<UML:AssociationEnd type="c1" multiplicity="1" name="Family"/>
</UML:Association.connection>
</UML:Association>
<UML:Generalization xmi.id="g1" subtype="c2" supertype="c1"/>
</UML:Namespace.ownedElement>
</UML:Package>
</UML:Namespace.ownedElement>
</UML:Model>
</XMI.content>
</XMI>"#;

    #[test]
    fn extracts_xmi_model() {
        let doc = Document::parse(MODEL).unwrap();
        let raw = extract(&XmiDialect, &doc, "Catalog.xmi").unwrap();

        assert_eq!(raw.name, "Catalog");
        assert_eq!(raw.domains[0].code, "DO_CODE");
        assert_eq!(raw.domains[0].length, Some(10));

        let classes = &raw.namespaces[0].classes;
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0].stereotype.as_deref(), Some("Static"));
        assert!(classes[0].persistent);
        assert_eq!(classes[0].trigram.as_deref(), Some("CAT"));

        let code = &classes[0].properties[0];
        assert!(code.primary_key);
        assert_eq!(code.multiplicity.as_deref(), Some("1..1"));
        assert_eq!(code.domain, Some(DomainRef::Code("DO_CODE".to_string())));

        let association = &raw.associations[0];
        assert_eq!(association.class_a, "c2");
        assert_eq!(association.multiplicity_a, "0..N");
        assert_eq!(association.multiplicity_b, "1..1");
        assert_eq!(association.role_b.as_deref(), Some("Family"));

        assert_eq!(raw.generalizations[0].parent, "c1");
    }

    #[test]
    fn association_needs_two_ends() {
        let doc = Document::parse(
            r#"<XMI xmlns:UML="omg.org/UML1.3"><UML:Model name="M" xmi.id="m">
                <UML:Association xmi.id="as1" name="Broken"/>
            </UML:Model></XMI>"#,
        )
        .unwrap();

        assert!(extract(&XmiDialect, &doc, "M.xmi").is_err());
    }

    #[test]
    fn association_end_without_multiplicity_is_kept() {
        let doc = Document::parse(
            r#"<XMI xmlns:UML="omg.org/UML1.3"><UML:Model name="M" xmi.id="m">
                <UML:Association xmi.id="as1" name="Loose">
                    <UML:Association.connection>
                        <UML:AssociationEnd type="c1"/>
                        <UML:AssociationEnd type="c2" multiplicity="0..1"/>
                    </UML:Association.connection>
                </UML:Association>
            </UML:Model></XMI>"#,
        )
        .unwrap();

        let raw = extract(&XmiDialect, &doc, "M.xmi").unwrap();
        assert_eq!(raw.associations[0].multiplicity_a, "");
        assert_eq!(raw.associations[0].multiplicity_b, "0..1");
    }
}
