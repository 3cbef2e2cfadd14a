//! Helpers for navigating borrowed `roxmltree` documents by local tag name.
//!
//! Used for the protocol envelopes (`Identify`, `ListMetadataFormats`,
//! `ListRecords`) before records are copied into owned [`super::Element`]s.

use roxmltree::{Document, Node};

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use oaipmh_harvester::xml::get_tag_name;
///
/// let xml = r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/"><Identify/></OAI-PMH>"#;
/// let doc = Document::parse(xml).unwrap();
/// let identify = doc.root_element().first_element_child().unwrap();
/// assert_eq!(get_tag_name(identify), "Identify");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Find the first child element with the given tag name.
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && get_tag_name(*child) == tag)
}

/// Find all child elements with the given tag name.
pub fn find_children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && get_tag_name(*child) == tag)
}

/// Find the first element anywhere in the document with the given tag name.
pub fn find_descendant<'a, 'input>(
    doc: &'a Document<'input>,
    tag: &str,
) -> Option<Node<'a, 'input>> {
    doc.descendants()
        .find(|n| n.is_element() && get_tag_name(*n) == tag)
}

/// Get the text content of a node, trimmed.
pub fn get_text(node: Node<'_, '_>) -> String {
    node.text()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Get the trimmed text of a child element, if present and non-empty.
pub fn child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    find_child(node, tag)
        .map(get_text)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_tag_name_with_namespace() {
        let xml = r#"<ns:root xmlns:ns="http://example.com"><ns:child/></ns:root>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_tag_name(doc.root_element()), "root");
    }

    #[test]
    fn test_find_child() {
        let xml = r#"<root><a/><b/><c/></root>"#;
        let doc = Document::parse(xml).unwrap();
        let root = doc.root_element();

        assert!(find_child(root, "a").is_some());
        assert!(find_child(root, "d").is_none());
    }

    #[test]
    fn test_find_children() {
        let xml = r#"<root><record>1</record><other/><record>2</record></root>"#;
        let doc = Document::parse(xml).unwrap();

        let records: Vec<_> = find_children(doc.root_element(), "record").collect();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_find_descendant() {
        let xml = r#"<a><b><c>deep</c></b></a>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_text(find_descendant(&doc, "c").unwrap()), "deep");
        assert!(find_descendant(&doc, "d").is_none());
    }

    #[test]
    fn test_child_text_skips_empty() {
        let xml = r#"<root><empty>  </empty><full> x </full></root>"#;
        let doc = Document::parse(xml).unwrap();
        let root = doc.root_element();

        assert_eq!(child_text(root, "empty"), None);
        assert_eq!(child_text(root, "full"), Some("x".to_string()));
    }
}
