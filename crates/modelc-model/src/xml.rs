//! Small helpers over `roxmltree` nodes
//!
//! Both dialects qualify their element names with namespace prefixes. The
//! helpers match on local names only so documents using other prefixes for
//! the same namespaces are still accepted.

use roxmltree::Node;
use std::collections::HashMap;

/// Whether a node is an element with the given local name
pub fn is(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

/// First child element with a local name
pub fn child<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is(n, name))
}

/// Child elements with a local name
pub fn children<'a, 'input: 'a>(
    node: &Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |n| is(n, name))
}

/// Element children of the child container `container`, restricted to `name`
///
/// `c:Classes/o:Class` is read as `nested(node, "Classes", "Class")`.
pub fn nested<'a, 'input: 'a>(
    node: &Node<'a, 'input>,
    container: &str,
    name: &'a str,
) -> Vec<Node<'a, 'input>> {
    match child(node, container) {
        Some(c) => children(&c, name).collect(),
        None => Vec::new(),
    }
}

/// Trimmed text of a child element; `None` when missing or blank
pub fn child_text(node: &Node, name: &str) -> Option<String> {
    child(node, name)
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Trimmed, non-blank attribute value
pub fn attr(node: &Node, name: &str) -> Option<String> {
    node.attribute(name)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Interpret a flag value (`1`, `true`, `yes`)
pub fn flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}

/// Parse an unsigned number, ignoring blanks and garbage
pub fn number(value: Option<&str>) -> Option<u32> {
    value.and_then(|v| v.trim().parse().ok())
}

/// First descendant element with a local name
pub fn descendant<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants().find(|n| is(n, name))
}

/// Tagged values under a node, keyed by lower-cased tag name
///
/// Reads `TaggedValue tag=".." value=".."` elements from the node's
/// `ModelElement.taggedValue` container.
pub fn tagged_values(node: &Node) -> HashMap<String, String> {
    let mut tags = HashMap::new();
    if let Some(container) = child(node, "ModelElement.taggedValue") {
        for tagged in children(&container, "TaggedValue") {
            if let (Some(tag), Some(value)) = (tagged.attribute("tag"), tagged.attribute("value")) {
                tags.insert(tag.to_ascii_lowercase(), value.trim().to_string());
            }
        }
    }
    tags
}
