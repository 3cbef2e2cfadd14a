//! Mapping helpers shared by all schema transformers.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::DOI_RESOLVER_URL;
use crate::document::{
    CanonicalDocument, DateType, DateValue, DocumentDate, Identifier, RelatedIdentifier, WebLink,
    WebLinkType,
};
use crate::transform::TransformContext;

/// Separators that turn a date value into a range (`2004-03-02/2005-06-02`).
const DATE_RANGE_SEPARATORS: [&str; 2] = ["/", " - "];

/// Leading four-digit year of a date value.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{4})").expect("valid regex"));

/// Name of the link every document gets when a logo is configured.
pub const LOGO_LINK_NAME: &str = "Logo";

/// Name of the link pointing at the record itself.
pub const VIEW_LINK_NAME: &str = "View the Resource";

/// Default name of links synthesized from related identifiers.
pub const RELATED_LINK_NAME: &str = "Related Resource";

/// Placeholder replaced by the record identifier in a configured view URL.
pub const VIEW_URL_PLACEHOLDER: &str = "{identifier}";

/// Parse a date value, detecting ranges.
///
/// # Examples
/// ```
/// use oaipmh_harvester::document::DateValue;
/// use oaipmh_harvester::transform::common::parse_date_value;
///
/// assert_eq!(
///     parse_date_value("2004-03-02/2005-06-02"),
///     DateValue::Range { start: Some("2004-03-02".into()), end: Some("2005-06-02".into()) }
/// );
/// assert_eq!(parse_date_value("2010"), DateValue::Point { value: "2010".into() });
/// ```
#[must_use]
pub fn parse_date_value(text: &str) -> DateValue {
    let text = text.trim();

    for separator in DATE_RANGE_SEPARATORS {
        if let Some((start, end)) = text.split_once(separator) {
            let part = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
            return DateValue::Range {
                start: part(start),
                end: part(end),
            };
        }
    }

    DateValue::Point {
        value: text.to_string(),
    }
}

/// Leading year of a date string.
#[must_use]
pub fn year_of(date: &str) -> Option<i32> {
    YEAR_PATTERN
        .captures(date)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Year of a date value; ranges use their start.
#[must_use]
pub fn date_value_year(value: &DateValue) -> Option<i32> {
    match value {
        DateValue::Point { value } => year_of(value),
        DateValue::Range { start, .. } => start.as_deref().and_then(year_of),
    }
}

/// Publication year derived from the first `Issued` date.
#[must_use]
pub fn publication_year_from_dates(dates: &[DocumentDate]) -> Option<i32> {
    dates
        .iter()
        .find(|d| d.date_type == DateType::Issued)
        .and_then(|d| date_value_year(&d.date))
}

/// Fill in the publication year from the dates when none was given.
pub fn derive_publication_year(doc: &mut CanonicalDocument) {
    if doc.publication_year.is_none() {
        doc.publication_year = publication_year_from_dates(&doc.dates);
    }
}

/// Expand a DOI into a resolver URL unless it is already absolute.
///
/// # Examples
/// ```
/// use oaipmh_harvester::transform::common::doi_url;
///
/// assert_eq!(doi_url("10.1234/abc"), "https://doi.org/10.1234/abc");
/// assert_eq!(doi_url("doi:10.1234/abc"), "https://doi.org/10.1234/abc");
/// assert_eq!(doi_url("https://doi.org/10.1234/abc"), "https://doi.org/10.1234/abc");
/// ```
#[must_use]
pub fn doi_url(doi: &str) -> String {
    let doi = doi.trim();
    if is_absolute_url(doi) {
        return doi.to_string();
    }
    let bare = doi
        .strip_prefix("doi:")
        .or_else(|| doi.strip_prefix("DOI:"))
        .unwrap_or(doi);
    format!("{DOI_RESOLVER_URL}{bare}")
}

#[must_use]
pub fn is_absolute_url(value: &str) -> bool {
    let lower = value.trim_start().to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Whether a free-text identifier looks like a DOI.
#[must_use]
pub fn looks_like_doi(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("10.") || value.to_lowercase().starts_with("doi:")
}

/// Type of a free-text identifier, when it is a DOI or a URL.
#[must_use]
pub fn infer_identifier_type(value: &str) -> Option<&'static str> {
    if looks_like_doi(value) || value.contains("doi.org/10.") {
        Some("DOI")
    } else if is_absolute_url(value) {
        Some("URL")
    } else {
        None
    }
}

/// Resolvable URL of a typed identifier; only DOI and URL identifiers resolve.
#[must_use]
pub fn identifier_url(value: &str, identifier_type: Option<&str>) -> Option<String> {
    match identifier_type.map(str::to_uppercase).as_deref() {
        Some("DOI") => Some(doi_url(value)),
        Some("URL") => Some(value.trim().to_string()),
        _ => None,
    }
}

/// Links to related resources identified by DOI or URL.
#[must_use]
pub fn related_links(related: &[RelatedIdentifier]) -> Vec<WebLink> {
    related
        .iter()
        .filter_map(|r| {
            let url = identifier_url(&r.value, Some(&r.identifier_type))?;
            let name = r
                .relation_type
                .clone()
                .unwrap_or_else(|| RELATED_LINK_NAME.to_string());
            Some(WebLink::new(name, url, WebLinkType::Related))
        })
        .collect()
}

/// Link to the record itself.
///
/// A configured view URL wins; otherwise the resource identifier is used
/// when it resolves.
#[must_use]
pub fn view_link(
    record_identifier: &str,
    resource_identifier: Option<&Identifier>,
    view_url: Option<&str>,
) -> Option<WebLink> {
    let url = match view_url {
        Some(template) if template.contains(VIEW_URL_PLACEHOLDER) => {
            template.replace(VIEW_URL_PLACEHOLDER, record_identifier)
        }
        Some(prefix) => format!("{prefix}{record_identifier}"),
        None => {
            let id = resource_identifier?;
            identifier_url(&id.value, id.identifier_type.as_deref())?
        }
    };

    Some(WebLink::new(VIEW_LINK_NAME, url, WebLinkType::ViewUrl))
}

/// Append related links followed by the view link.
pub fn add_web_links(doc: &mut CanonicalDocument, context: &TransformContext) {
    let related = related_links(&doc.related_identifiers);
    doc.web_links.extend(related);

    if let Some(view) = view_link(
        &doc.identifier,
        doc.resource_identifier.as_ref(),
        context.view_url.as_deref(),
    ) {
        doc.web_links.push(view);
    }
}

/// Parse a decimal coordinate.
#[must_use]
pub fn parse_coordinate(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a whitespace-separated list of exactly `N` coordinates.
#[must_use]
pub fn parse_coordinates<const N: usize>(text: &str) -> Option<[f64; N]> {
    let values: Vec<f64> = text
        .split_whitespace()
        .map(parse_coordinate)
        .collect::<Option<_>>()?;
    values.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn related(value: &str, kind: &str, relation: Option<&str>) -> RelatedIdentifier {
        RelatedIdentifier {
            value: value.to_string(),
            identifier_type: kind.to_string(),
            relation_type: relation.map(str::to_string),
            resource_type_general: None,
        }
    }

    #[test]
    fn test_parse_open_range() {
        assert_eq!(
            parse_date_value("2004/"),
            DateValue::Range {
                start: Some("2004".to_string()),
                end: None
            }
        );
        assert_eq!(
            parse_date_value("2001-01-01 - 2002-01-01"),
            DateValue::Range {
                start: Some("2001-01-01".to_string()),
                end: Some("2002-01-01".to_string())
            }
        );
    }

    #[test]
    fn test_year_of() {
        assert_eq!(year_of("2019-05-01"), Some(2019));
        assert_eq!(year_of(" 1999"), Some(1999));
        assert_eq!(year_of("May 2019"), None);
    }

    #[test]
    fn test_publication_year_uses_issued_range_start() {
        let dates = vec![
            DocumentDate::point("2001-01-01", DateType::Created),
            DocumentDate {
                date: parse_date_value("2005-01-01/2007-01-01"),
                date_type: DateType::Issued,
                information: None,
            },
        ];
        assert_eq!(publication_year_from_dates(&dates), Some(2005));
    }

    #[test]
    fn test_publication_year_without_issued() {
        let dates = vec![DocumentDate::point("2001-01-01", DateType::Created)];
        assert_eq!(publication_year_from_dates(&dates), None);
    }

    #[test]
    fn test_infer_identifier_type() {
        assert_eq!(infer_identifier_type("10.1234/x"), Some("DOI"));
        assert_eq!(infer_identifier_type("https://doi.org/10.1234/x"), Some("DOI"));
        assert_eq!(infer_identifier_type("http://example.org/x"), Some("URL"));
        assert_eq!(infer_identifier_type("urn:nbn:de:1"), None);
    }

    #[test]
    fn test_related_links_only_doi_and_url() {
        let links = related_links(&[
            related("10.1/a", "DOI", Some("IsCitedBy")),
            related("https://example.org/b", "URL", None),
            related("ISBN-123", "ISBN", Some("IsPartOf")),
        ]);

        assert_eq!(
            links,
            vec![
                WebLink::new("IsCitedBy", "https://doi.org/10.1/a", WebLinkType::Related),
                WebLink::new(
                    RELATED_LINK_NAME,
                    "https://example.org/b",
                    WebLinkType::Related
                ),
            ]
        );
    }

    #[test]
    fn test_view_link_from_doi() {
        let id = Identifier::new("10.5880/abc", Some("DOI".to_string()));
        assert_eq!(
            view_link("oai:x:1", Some(&id), None).map(|l| l.url),
            Some("https://doi.org/10.5880/abc".to_string())
        );
    }

    #[test]
    fn test_view_link_from_template() {
        assert_eq!(
            view_link("oai:x:1", None, Some("https://example.org/record?id={identifier}"))
                .map(|l| l.url),
            Some("https://example.org/record?id=oai:x:1".to_string())
        );
        assert_eq!(
            view_link("oai:x:1", None, Some("https://example.org/record/")).map(|l| l.url),
            Some("https://example.org/record/oai:x:1".to_string())
        );
    }

    #[test]
    fn test_view_link_unresolvable() {
        let id = Identifier::new("hdl:1/2", Some("Handle".to_string()));
        assert_eq!(view_link("oai:x:1", Some(&id), None), None);
        assert_eq!(view_link("oai:x:1", None, None), None);
    }

    #[test]
    fn test_parse_coordinates() {
        assert_eq!(parse_coordinates::<2>("12.5 45.0"), Some([12.5, 45.0]));
        assert_eq!(parse_coordinates::<2>("12.5"), None);
        assert_eq!(parse_coordinates::<4>("1 2 3 x"), None);
        assert_eq!(parse_coordinates::<2>("NaN 1"), None);
    }
}
