//! Owned XML element tree with tag-name queries.
//!
//! A `roxmltree::Document` borrows the response text, so records that must
//! outlive their page are copied into [`Element`]s. Queries match on local
//! names only; namespace prefixes are ignored unless asked for explicitly.

use roxmltree::{Document, Node};

use crate::error::Result;

/// Namespace of the `xml:` prefix (`xml:lang`).
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// An attribute with its optional namespace URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub namespace: Option<String>,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Content {
    Element(Element),
    Text(String),
}

/// An owned XML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    namespace: Option<String>,
    attributes: Vec<Attribute>,
    content: Vec<Content>,
}

impl Element {
    /// Parse an XML string and return its root element.
    ///
    /// # Examples
    /// ```
    /// use oaipmh_harvester::xml::Element;
    ///
    /// let root = Element::parse(r#"<titles><title>A</title><title>B</title></titles>"#).unwrap();
    /// assert_eq!(root.children_named("title").count(), 2);
    /// ```
    pub fn parse(xml: &str) -> Result<Self> {
        let doc = Document::parse(xml)?;
        Ok(Self::from_node(doc.root_element()))
    }

    /// Copy a borrowed element node into an owned tree.
    #[must_use]
    pub fn from_node(node: Node<'_, '_>) -> Self {
        let attributes = node
            .attributes()
            .map(|a| Attribute {
                namespace: a.namespace().map(str::to_string),
                name: a.name().to_string(),
                value: a.value().to_string(),
            })
            .collect();

        let content = node
            .children()
            .filter_map(|child| {
                if child.is_element() {
                    Some(Content::Element(Self::from_node(child)))
                } else if child.is_text() {
                    child.text().map(|t| Content::Text(t.to_string()))
                } else {
                    None
                }
            })
            .collect();

        Self {
            name: node.tag_name().name().to_string(),
            namespace: node.tag_name().namespace().map(str::to_string),
            attributes,
            content,
        }
    }

    /// Local tag name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace URI of the tag, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// All attributes in document order.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Value of an attribute without namespace.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.is_none() && a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Value of a namespaced attribute.
    #[must_use]
    pub fn attribute_ns(&self, namespace: &str, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.as_deref() == Some(namespace) && a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Non-empty, trimmed attribute value.
    #[must_use]
    pub fn attribute_value(&self, name: &str) -> Option<String> {
        self.attribute(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// The `xml:lang` attribute.
    #[must_use]
    pub fn lang(&self) -> Option<String> {
        self.attribute_ns(XML_NAMESPACE, "lang")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Child elements in document order.
    pub fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.content.iter().filter_map(|c| match c {
            Content::Element(e) => Some(e),
            Content::Text(_) => None,
        })
    }

    /// First child element with the given tag name.
    #[must_use]
    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.element_children().find(|e| e.name == tag)
    }

    /// All child elements with the given tag name.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> {
        self.element_children().filter(move |e| e.name == tag)
    }

    /// All descendant elements (excluding `self`) with the given tag name,
    /// in document order.
    #[must_use]
    pub fn descendants(&self, tag: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_descendants(tag, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, tag: &str, found: &mut Vec<&'a Element>) {
        for child in self.element_children() {
            if child.name == tag {
                found.push(child);
            }
            child.collect_descendants(tag, found);
        }
    }

    /// First descendant element (excluding `self`) with the given tag name.
    #[must_use]
    pub fn descendant(&self, tag: &str) -> Option<&Element> {
        for child in self.element_children() {
            if child.name == tag {
                return Some(child);
            }
            if let Some(found) = child.descendant(tag) {
                return Some(found);
            }
        }
        None
    }

    /// Element at a slash-separated path of child tag names.
    #[must_use]
    pub fn find_by_path(&self, path: &str) -> Option<&Element> {
        let mut current = self;
        for part in path.split('/') {
            current = current.child(part)?;
        }
        Some(current)
    }

    /// Concatenated text of this element and all descendants, trimmed.
    #[must_use]
    pub fn text(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text.trim().to_string()
    }

    fn collect_text(&self, out: &mut String) {
        for c in &self.content {
            match c {
                Content::Text(t) => out.push_str(t),
                Content::Element(e) => e.collect_text(out),
            }
        }
    }

    /// Non-empty trimmed text of this element.
    #[must_use]
    pub fn non_empty_text(&self) -> Option<String> {
        Some(self.text()).filter(|t| !t.is_empty())
    }

    /// Non-empty trimmed text of the first child with the given tag name.
    #[must_use]
    pub fn child_text(&self, tag: &str) -> Option<String> {
        self.child(tag).and_then(Element::non_empty_text)
    }

    /// Non-empty trimmed text of the element at `path`.
    #[must_use]
    pub fn path_text(&self, path: &str) -> Option<String> {
        self.find_by_path(path).and_then(Element::non_empty_text)
    }

    /// Non-empty trimmed texts of all children with the given tag name.
    #[must_use]
    pub fn children_texts(&self, tag: &str) -> Vec<String> {
        self.children_named(tag)
            .filter_map(Element::non_empty_text)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESOURCE: &str = r#"<resource xmlns="http://datacite.org/schema/kernel-4"
        xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
        xsi:schemaLocation="http://datacite.org/schema/kernel-4 http://schema.datacite.org/meta/kernel-4/metadata.xsd">
        <titles>
            <title xml:lang="en">Main <i>title</i></title>
            <title titleType="Subtitle">Sub</title>
        </titles>
        <creators><creator><creatorName>Doe, Jane</creatorName></creator></creators>
        <empty>   </empty>
    </resource>"#;

    #[test]
    fn test_names_ignore_namespace() {
        let root = Element::parse(RESOURCE).unwrap();
        assert_eq!(root.name(), "resource");
        assert_eq!(root.namespace(), Some("http://datacite.org/schema/kernel-4"));
    }

    #[test]
    fn test_namespaced_attribute() {
        let root = Element::parse(RESOURCE).unwrap();
        assert!(root
            .attribute_ns("http://www.w3.org/2001/XMLSchema-instance", "schemaLocation")
            .is_some());
        assert_eq!(root.attribute("schemaLocation"), None);
    }

    #[test]
    fn test_text_includes_descendants() {
        let root = Element::parse(RESOURCE).unwrap();
        let title = root.find_by_path("titles/title").unwrap();
        assert_eq!(title.text(), "Main title");
        assert_eq!(title.lang(), Some("en".to_string()));
    }

    #[test]
    fn test_descendants_in_document_order() {
        let root = Element::parse(RESOURCE).unwrap();
        let titles: Vec<String> = root.descendants("title").iter().map(|t| t.text()).collect();
        assert_eq!(titles, vec!["Main title", "Sub"]);
        assert_eq!(
            root.descendant("creatorName").and_then(Element::non_empty_text),
            Some("Doe, Jane".to_string())
        );
    }

    #[test]
    fn test_empty_text_is_none() {
        let root = Element::parse(RESOURCE).unwrap();
        assert_eq!(root.child_text("empty"), None);
        assert_eq!(root.child_text("missing"), None);
        assert_eq!(
            root.path_text("creators/creator/creatorName"),
            Some("Doe, Jane".to_string())
        );
    }

    #[test]
    fn test_attribute_value_trims() {
        let root = Element::parse(r#"<a type=" DOI " blank=""/>"#).unwrap();
        assert_eq!(root.attribute_value("type"), Some("DOI".to_string()));
        assert_eq!(root.attribute_value("blank"), None);
    }
}
