//! Raw OAI-PMH records and `ListRecords` page parsing.

use roxmltree::{Document, Node};

use crate::error::Result;
use crate::xml::{child_text, find_child, find_children, get_tag_name, get_text, Element};

/// Header of an OAI-PMH record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordHeader {
    pub identifier: String,
    pub datestamp: Option<String>,
    pub set_specs: Vec<String>,
    pub deleted: bool,
}

/// One `<record>` of a `ListRecords` response.
///
/// `metadata` holds the root element inside `<metadata>`; it is `None` for
/// deleted records, which carry no payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub header: RecordHeader,
    pub metadata: Option<Element>,
}

impl RawRecord {
    /// Build a record from a borrowed `<record>` node.
    #[must_use]
    pub fn from_node(record: Node<'_, '_>) -> Self {
        let header = find_child(record, "header")
            .map(parse_header)
            .unwrap_or_default();

        let metadata = find_child(record, "metadata")
            .and_then(|m| m.children().find(|c| c.is_element()))
            .map(Element::from_node);

        Self { header, metadata }
    }

    /// Parse a standalone `<record>` document.
    pub fn parse(xml: &str) -> Result<Self> {
        let doc = Document::parse(xml)?;
        Ok(Self::from_node(doc.root_element()))
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.header.identifier
    }

    #[must_use]
    pub fn datestamp(&self) -> Option<&str> {
        self.header.datestamp.as_deref()
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.header.deleted
    }
}

fn parse_header(header: Node<'_, '_>) -> RecordHeader {
    RecordHeader {
        identifier: find_child(header, "identifier")
            .map(get_text)
            .unwrap_or_default(),
        datestamp: child_text(header, "datestamp"),
        set_specs: find_children(header, "setSpec")
            .map(get_text)
            .filter(|s| !s.is_empty())
            .collect(),
        deleted: header.attribute("status") == Some("deleted"),
    }
}

/// The `<resumptionToken>` of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumptionToken {
    /// Token text; empty on the last page.
    pub value: String,
    /// The `completeListSize` attribute, if reported.
    pub complete_list_size: Option<u64>,
}

/// An OAI-PMH `<error>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolError {
    pub code: String,
    pub message: String,
}

/// A parsed `ListRecords` response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRecordsPage {
    pub records: Vec<RawRecord>,
    pub resumption_token: Option<ResumptionToken>,
    pub error: Option<ProtocolError>,
}

impl ListRecordsPage {
    /// Parse a `ListRecords` response body.
    pub fn parse(xml: &str) -> Result<Self> {
        let doc = Document::parse(xml)?;
        let root = doc.root_element();

        let error = find_child(root, "error").map(|e| ProtocolError {
            code: e.attribute("code").unwrap_or_default().to_string(),
            message: get_text(e),
        });

        let Some(list) = find_child(root, "ListRecords") else {
            return Ok(Self {
                error,
                ..Self::default()
            });
        };

        let records = find_children(list, "record")
            .map(RawRecord::from_node)
            .collect();

        let resumption_token = list
            .children()
            .find(|c| c.is_element() && get_tag_name(*c) == "resumptionToken")
            .map(|token| ResumptionToken {
                value: get_text(token),
                complete_list_size: token
                    .attribute("completeListSize")
                    .and_then(|s| s.trim().parse().ok()),
            });

        Ok(Self {
            records,
            resumption_token,
            error,
        })
    }

    /// Token of the next page, if the list continues.
    #[must_use]
    pub fn next_token(&self) -> Option<&str> {
        self.resumption_token
            .as_ref()
            .map(|t| t.value.as_str())
            .filter(|v| !v.is_empty())
    }
}
