//! `DataSourceNode` adapter over `roxmltree`, the engine's concrete XML tree.
//!
//! Generalizes the teacher's `xslt::datasources::xml` adapter: same
//! `Element`/`Attribute` split (roxmltree has no attribute nodes of its
//! own), same document-order comparison, extended with the `id()` accessor
//! spec.md §3/§6 requires for `<<`/`>>`/`is` and for the union/intersect/
//! except dedup path in [`crate::operators`].

use std::hash::{Hash, Hasher};

use roxmltree::Node;
use xpath_core::{DataSourceNode, NodeType, QName};

/// A parsed XML document, owning the `roxmltree::Document` the engine
/// navigates. `root_node()` is the document node required as the initial
/// focus of an absolute path (`/...`).
pub struct XmlDocument<'input> {
    doc: roxmltree::Document<'input>,
}

impl<'input> XmlDocument<'input> {
    pub fn parse(text: &'input str) -> Result<Self, roxmltree::Error> {
        let doc = roxmltree::Document::parse(text)?;
        Ok(Self { doc })
    }

    pub fn root_node(&self) -> XmlNode<'_, 'input> {
        XmlNode::Element(self.doc.root())
    }
}

/// Either a regular roxmltree node (element, text, comment, PI, document) or
/// an attribute, addressed by its owning element plus an index — roxmltree
/// does not model attributes as navigable nodes, so they are synthesized here.
#[derive(Debug, Clone, Copy)]
pub enum XmlNode<'a, 'input> {
    Element(Node<'a, 'input>),
    Attribute {
        parent: Node<'a, 'input>,
        index: usize,
    },
}

impl<'a, 'input> PartialEq for XmlNode<'a, 'input> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<'a, 'input> Eq for XmlNode<'a, 'input> {}

impl<'a, 'input> PartialOrd for XmlNode<'a, 'input> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<'a, 'input> Ord for XmlNode<'a, 'input> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id().cmp(&other.id())
    }
}

impl<'a, 'input> Hash for XmlNode<'a, 'input> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl<'a> DataSourceNode<'a> for XmlNode<'a, 'a> {
    fn node_type(&self) -> NodeType {
        match self {
            XmlNode::Element(node) => {
                if node.is_root() {
                    NodeType::Root
                } else if node.is_element() {
                    NodeType::Element
                } else if node.is_text() {
                    NodeType::Text
                } else if node.is_comment() {
                    NodeType::Comment
                } else if node.is_pi() {
                    NodeType::ProcessingInstruction
                } else {
                    NodeType::Element
                }
            }
            XmlNode::Attribute { .. } => NodeType::Attribute,
        }
    }

    fn name(&self) -> Option<QName<'a>> {
        match self {
            XmlNode::Element(node) => {
                if node.is_element() {
                    let tag = node.tag_name();
                    let prefix = tag.namespace().and_then(|uri| node.lookup_prefix(uri));
                    Some(QName {
                        prefix,
                        local_part: tag.name(),
                    })
                } else if node.is_pi() {
                    node.pi().map(|pi| QName {
                        prefix: None,
                        local_part: pi.target,
                    })
                } else {
                    None
                }
            }
            XmlNode::Attribute { parent, index } => parent.attributes().nth(*index).map(|attr| {
                let prefix = if attr.namespace() == Some("http://www.w3.org/XML/1998/namespace") {
                    Some("xml")
                } else {
                    None
                };
                QName {
                    prefix,
                    local_part: attr.name(),
                }
            }),
        }
    }

    fn string_value(&self) -> String {
        match self {
            XmlNode::Element(node) => {
                if node.is_text() {
                    node.text().unwrap_or("").to_string()
                } else if node.is_element() || node.is_root() {
                    node.descendants()
                        .filter(|n| n.is_text())
                        .filter_map(|n| n.text())
                        .collect::<Vec<_>>()
                        .join("")
                } else if node.is_comment() {
                    node.text().unwrap_or("").to_string()
                } else if node.is_pi() {
                    node.pi().and_then(|pi| pi.value).unwrap_or("").to_string()
                } else {
                    String::new()
                }
            }
            XmlNode::Attribute { parent, index } => parent
                .attributes()
                .nth(*index)
                .map(|attr| attr.value().to_string())
                .unwrap_or_default(),
        }
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XmlNode::Element(node) => {
                let parent = *node;
                let attr_count = node.attributes().len();
                Box::new((0..attr_count).map(move |index| XmlNode::Attribute { parent, index }))
            }
            XmlNode::Attribute { .. } => Box::new(std::iter::empty()),
        }
    }

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XmlNode::Element(node) => Box::new(node.children().map(XmlNode::Element)),
            XmlNode::Attribute { .. } => Box::new(std::iter::empty()),
        }
    }

    fn parent(&self) -> Option<Self> {
        match self {
            XmlNode::Element(node) => node.parent().map(XmlNode::Element),
            XmlNode::Attribute { parent, .. } => Some(XmlNode::Element(*parent)),
        }
    }

    /// roxmltree's own `NodeId` is already monotonic in document order; an
    /// attribute sorts immediately after its owning element and before the
    /// element's children, by packing `(node_id, 1 + attr_index)` into the
    /// low digits. Document trees with >= 10,000 attributes on one element
    /// would collide here, which is far beyond any realistic document.
    fn id(&self) -> u64 {
        match self {
            XmlNode::Element(node) => node.id().get() as u64 * 10_000,
            XmlNode::Attribute { parent, index } => {
                parent.id().get() as u64 * 10_000 + 1 + *index as u64
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_sort_after_their_element_and_before_its_children() {
        let xml = r#"<root><item id="123" status="active">Text</item></root>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let root = doc.root_node();
        let item = root
            .children()
            .find(|n| n.name().map(|q| q.local_part == "item").unwrap_or(false))
            .unwrap();

        let attrs: Vec<_> = item.attributes().collect();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].name().unwrap().local_part, "id");
        assert_eq!(attrs[0].string_value(), "123");
        assert_eq!(attrs[1].name().unwrap().local_part, "status");
        assert_eq!(attrs[1].string_value(), "active");
        assert_eq!(attrs[0].parent(), Some(item));

        let text = item.children().next().unwrap();
        assert!(item.id() < attrs[0].id());
        assert!(attrs[1].id() < text.id());
    }

    #[test]
    fn navigates_parent_child_chain() {
        let xml = r#"<data><users><user status="active">Alice</user></users></data>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let root = doc.root_node();
        let data = root
            .children()
            .find(|n| n.name().map(|q| q.local_part == "data").unwrap_or(false))
            .unwrap();
        let users = data.children().next().unwrap();
        let user = users.children().next().unwrap();

        let status = user
            .attributes()
            .find(|a| a.name().map(|q| q.local_part == "status").unwrap_or(false))
            .unwrap();
        assert_eq!(status.string_value(), "active");
        assert_eq!(status.parent(), Some(user));
    }
}
