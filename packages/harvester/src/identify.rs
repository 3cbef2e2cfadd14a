//! Repository identification via the `Identify` verb.

use roxmltree::Document;

use crate::config::{identify_url, UNKNOWN_PROVIDER};
use crate::error::Result;
use crate::http::Fetcher;
use crate::xml::{find_descendant, get_text};

/// Extract the `repositoryName` from an `Identify` response.
pub fn parse_repository_name(xml: &str) -> Result<Option<String>> {
    let doc = Document::parse(xml)?;
    Ok(find_descendant(&doc, "repositoryName")
        .map(get_text)
        .filter(|name| !name.is_empty()))
}

/// Look up the display name of a repository.
///
/// Falls back to [`UNKNOWN_PROVIDER`] when the repository cannot be reached
/// or does not report a name.
pub fn fetch_repository_name(fetcher: &dyn Fetcher, host_url: &str) -> String {
    let url = identify_url(host_url);

    let name = fetcher
        .fetch(&url)
        .and_then(|body| parse_repository_name(&body));

    match name {
        Ok(Some(name)) => name,
        Ok(None) => {
            tracing::warn!(url = %url, "Identify response has no repository name");
            UNKNOWN_PROVIDER.to_string()
        }
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Could not identify repository");
            UNKNOWN_PROVIDER.to_string()
        }
    }
}
