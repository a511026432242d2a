//! Object model (`.oom`) dialect
//!
//! Elements are declared with an `Id` attribute and referenced elsewhere with
//! a `Ref` attribute. Scalar fields are `a:*` child elements, collections are
//! `c:*` containers of `o:*` objects.
//!
//! Associations link `c:Object1` (end A) and `c:Object2` (end B).
//! `a:RoleAMultiplicity` / `a:RoleAName` describe end A, and an
//! `a:RoleAIndicator` of `C` marks end A as the composite owner.

use super::{ClassEntry, DomainEntry, MissingField, ModelDialect};
use crate::raw::{
    Composition, DomainRef, RawAssociation, RawClass, RawDomain, RawGeneralization, RawNamespace,
    RawProperty, RawShortcut,
};
use crate::xml;
use roxmltree::{Document, Node};

/// PowerDesigner-style object model adapter
#[derive(Debug, Clone, Copy, Default)]
pub struct OomDialect;

impl OomDialect {
    fn id(node: &Node, element: &'static str) -> Result<String, MissingField> {
        xml::attr(node, "Id").ok_or(MissingField::new(element, "Id"))
    }

    fn code(node: &Node, element: &'static str) -> Result<String, MissingField> {
        xml::child_text(node, "Code").ok_or(MissingField::new(element, "Code"))
    }

    fn flag(node: &Node, name: &str) -> bool {
        xml::flag(xml::child_text(node, name).as_deref())
    }

    /// `Ref` of the first object inside a reference container
    fn reference(node: &Node, container: &str) -> Option<String> {
        xml::child(node, container)?
            .children()
            .filter(|n| n.is_element())
            .find_map(|n| xml::attr(&n, "Ref"))
    }

    /// Declared (not referenced) descendants with a local name
    fn declarations<'a, 'input>(model: &Node<'a, 'input>, name: &str) -> Vec<Node<'a, 'input>> {
        model
            .descendants()
            .filter(|n| xml::is(n, name) && n.attribute("Id").is_some())
            .collect()
    }
}

impl ModelDialect for OomDialect {
    fn name(&self) -> &'static str {
        "oom"
    }

    fn model_node<'a, 'input>(&self, doc: &'a Document<'input>) -> Option<Node<'a, 'input>> {
        doc.descendants()
            .find(|n| xml::is(n, "Model") && xml::child(n, "Code").is_some())
    }

    fn read_header(&self, model: &Node) -> Result<(String, Option<String>), MissingField> {
        let name = Self::code(model, "Model")?;
        Ok((name, xml::child_text(model, "Name")))
    }

    fn domain_nodes<'a, 'input>(&self, model: &Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
        match xml::child(model, "Domains") {
            Some(container) => container
                .children()
                .filter(|n| xml::is(n, "Domain") || xml::is(n, "Shortcut"))
                .collect(),
            None => Vec::new(),
        }
    }

    fn read_domain(&self, node: &Node) -> Result<DomainEntry, MissingField> {
        if xml::is(node, "Shortcut") {
            return Ok(DomainEntry::Shortcut(RawShortcut {
                id: Self::id(node, "Shortcut")?,
                code: Self::code(node, "Shortcut")?,
            }));
        }

        Ok(DomainEntry::Domain(RawDomain {
            id: Self::id(node, "Domain")?,
            code: Self::code(node, "Domain")?,
            label: xml::child_text(node, "Name"),
            data_type: xml::child_text(node, "DataType"),
            persistent_type: xml::child_text(node, "PersistentDataType"),
            length: xml::number(xml::child_text(node, "Length").as_deref()),
            precision: xml::number(xml::child_text(node, "Precision").as_deref()),
        }))
    }

    fn namespace_nodes<'a, 'input>(&self, model: &Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
        Self::declarations(model, "Package")
    }

    fn read_namespace(&self, node: &Node) -> Result<RawNamespace, MissingField> {
        Ok(RawNamespace {
            id: Self::id(node, "Package")?,
            code: Self::code(node, "Package")?,
            label: xml::child_text(node, "Name"),
            comment: xml::child_text(node, "Comment"),
            creator: xml::child_text(node, "Creator"),
            classes: Vec::new(),
        })
    }

    fn class_nodes<'a, 'input>(&self, namespace: &Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
        match xml::child(namespace, "Classes") {
            Some(container) => container
                .children()
                .filter(|n| xml::is(n, "Class") || xml::is(n, "Shortcut"))
                .collect(),
            None => Vec::new(),
        }
    }

    fn read_class(&self, node: &Node) -> Result<ClassEntry, MissingField> {
        if xml::is(node, "Shortcut") {
            return Ok(ClassEntry::Shortcut(RawShortcut {
                id: Self::id(node, "Shortcut")?,
                code: Self::code(node, "Shortcut")?,
            }));
        }

        Ok(ClassEntry::Class(RawClass {
            id: Self::id(node, "Class")?,
            code: Self::code(node, "Class")?,
            label: xml::child_text(node, "Name"),
            comment: xml::child_text(node, "Comment"),
            stereotype: xml::child_text(node, "Stereotype"),
            persistent: Self::flag(node, "Persistent"),
            persistent_code: xml::child_text(node, "PersistentCode"),
            trigram: xml::child_text(node, "Trigram"),
            storage: xml::child_text(node, "Storage"),
            historized: Self::flag(node, "Historized"),
            audited: Self::flag(node, "Audited"),
            export_delta: Self::flag(node, "ExportDelta"),
            properties: Vec::new(),
        }))
    }

    fn model_shortcut_nodes<'a, 'input>(&self, model: &Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
        xml::nested(model, "Classes", "Shortcut")
    }

    fn property_nodes<'a, 'input>(&self, class: &Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
        xml::nested(class, "Attributes", "Attribute")
    }

    fn read_property(&self, node: &Node) -> Result<RawProperty, MissingField> {
        Ok(RawProperty {
            id: Self::id(node, "Attribute")?,
            code: Self::code(node, "Attribute")?,
            comment: xml::child_text(node, "Comment"),
            data_type: xml::child_text(node, "DataType"),
            persistent: Self::flag(node, "Persistent"),
            multiplicity: xml::child_text(node, "Multiplicity")
                .map(|m| super::normalize_multiplicity(&m)),
            domain: Self::reference(node, "Domain").map(DomainRef::Id),
            primary_key: Self::flag(node, "PrimaryIdentifier"),
            unique: Self::flag(node, "Unique"),
            unique_many: Self::flag(node, "UniqueMany"),
            ordered: Self::flag(node, "Ordered"),
            persistent_code: xml::child_text(node, "PersistentCode"),
            persistent_type: xml::child_text(node, "PersistentDataType"),
        })
    }

    fn generalization_nodes<'a, 'input>(&self, model: &Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
        Self::declarations(model, "Generalization")
    }

    fn read_generalization(&self, node: &Node) -> Result<RawGeneralization, MissingField> {
        Ok(RawGeneralization {
            id: Self::id(node, "Generalization")?,
            parent: Self::reference(node, "Object1")
                .ok_or(MissingField::new("Generalization", "Object1"))?,
            child: Self::reference(node, "Object2")
                .ok_or(MissingField::new("Generalization", "Object2"))?,
        })
    }

    fn association_nodes<'a, 'input>(&self, model: &Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
        Self::declarations(model, "Association")
    }

    fn read_association(&self, node: &Node) -> Result<RawAssociation, MissingField> {
        let composition = if Self::indicator(node, "RoleAIndicator") {
            Composition::OwnedByA
        } else if Self::indicator(node, "RoleBIndicator") {
            Composition::OwnedByB
        } else {
            Composition::None
        };

        // Absent multiplicities fail the multiplicity check later, not the read
        let multiplicity = |name: &str| {
            xml::child_text(node, name)
                .map(|m| super::normalize_multiplicity(&m))
                .unwrap_or_default()
        };

        Ok(RawAssociation {
            id: Self::id(node, "Association")?,
            code: xml::child_text(node, "Code"),
            name: xml::child_text(node, "Name"),
            class_a: Self::reference(node, "Object1")
                .ok_or(MissingField::new("Association", "Object1"))?,
            class_b: Self::reference(node, "Object2")
                .ok_or(MissingField::new("Association", "Object2"))?,
            multiplicity_a: multiplicity("RoleAMultiplicity"),
            multiplicity_b: multiplicity("RoleBMultiplicity"),
            role_a: xml::child_text(node, "RoleAName"),
            role_b: xml::child_text(node, "RoleBName"),
            composition,
        })
    }
}

impl OomDialect {
    fn indicator(node: &Node, name: &str) -> bool {
        xml::child_text(node, name).map_or(false, |v| v.eq_ignore_ascii_case("C"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::extract;

    const MODEL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Model xmlns:a="attribute" xmlns:c="collection" xmlns:o="object">
<o:RootObject Id="o1">
<c:Children>
<o:Model Id="o2">
<a:Name>Sales model</a:Name>
<a:Code>Sales</a:Code>
<c:Domains>
<o:Domain Id="d1"><a:Code>DO_ID</a:Code><a:DataType>int</a:DataType><a:PersistentDataType>int</a:PersistentDataType></o:Domain>
<o:Shortcut Id="d2"><a:Code>DO_LABEL</a:Code></o:Shortcut>
</c:Domains>
<c:Packages>
<o:Package Id="p1">
<a:Code>Sales.SalesDataContract</a:Code>
<c:Classes>
<o:Class Id="c1">
<a:Name>Order</a:Name>
<a:Code>Order</a:Code>
<a:Persistent>1</a:Persistent>
<a:Trigram>ORD</a:Trigram>
<c:Attributes>
<o:Attribute Id="a1">
<a:Code>Id</a:Code>
<a:Persistent>1</a:Persistent>
<a:PrimaryIdentifier>1</a:PrimaryIdentifier>
<a:Multiplicity>1</a:Multiplicity>
<c:Domain><o:Domain Ref="d1"/></c:Domain>
</o:Attribute>
</c:Attributes>
</o:Class>
<o:Shortcut Id="s1"><a:Code>Customer</a:Code></o:Shortcut>
</c:Classes>
</o:Package>
</c:Packages>
<c:Associations>
<o:Association Id="as1">
<a:Name>Order customer</a:Name>
<a:Code>ORDER_CUSTOMER</a:Code>
<a:RoleAMultiplicity>0..*</a:RoleAMultiplicity>
<a:RoleBMultiplicity>1..1</a:RoleBMultiplicity>
<a:RoleBName>Buyer</a:RoleBName>
<c:Object1><o:Class Ref="c1"/></c:Object1>
<c:Object2><o:Shortcut Ref="s1"/></c:Object2>
</o:Association>
</c:Associations>
</o:Model>
</c:Children>
</o:RootObject>
</Model>"#;

    #[test]
    fn extracts_object_model() {
        let doc = Document::parse(MODEL).unwrap();
        let raw = extract(&OomDialect, &doc, "Sales.oom").unwrap();

        assert_eq!(raw.name, "Sales");
        assert_eq!(raw.label.as_deref(), Some("Sales model"));
        assert_eq!(raw.domains.len(), 1);
        assert_eq!(raw.domain_shortcuts[0].code, "DO_LABEL");
        assert_eq!(raw.class_shortcuts[0].id, "s1");

        let order = &raw.namespaces[0].classes[0];
        assert_eq!(order.code, "Order");
        assert!(order.persistent);
        assert_eq!(order.trigram.as_deref(), Some("ORD"));

        let id = &order.properties[0];
        assert!(id.primary_key);
        assert_eq!(id.multiplicity.as_deref(), Some("1..1"));
        assert_eq!(id.domain, Some(DomainRef::Id("d1".to_string())));

        let association = &raw.associations[0];
        assert_eq!(association.class_a, "c1");
        assert_eq!(association.class_b, "s1");
        assert_eq!(association.multiplicity_a, "0..N");
        assert_eq!(association.role_b.as_deref(), Some("Buyer"));
        assert_eq!(association.composition, Composition::None);
    }

    #[test]
    fn missing_code_is_reported() {
        let doc = Document::parse(
            r#"<Model xmlns:a="attribute" xmlns:c="collection" xmlns:o="object">
                <o:Model Id="o1"><a:Code>M</a:Code>
                <c:Packages><o:Package Id="p1"><a:Name>No code</a:Name></o:Package></c:Packages>
                </o:Model></Model>"#,
        )
        .unwrap();

        let err = extract(&OomDialect, &doc, "M.oom").unwrap_err();
        assert!(err.to_string().contains("Package"));
    }
}
