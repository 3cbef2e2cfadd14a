//! Error types for the harvester.
//!
//! A single `HarvesterError` covers configuration, extraction, transport and
//! per-record failures. Which of them end a run is decided by the caller:
//! configuration and extraction errors propagate, per-record errors are logged
//! and the record is skipped.

use thiserror::Error;

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// Invalid or incomplete harvest configuration.
    #[error("{message}. Supported metadata prefixes: {}", format_prefixes(.supported_prefixes))]
    Config {
        message: String,
        supported_prefixes: Vec<String>,
    },

    /// Invalid OAI-PMH date value.
    #[error("Invalid date: '{0}'. Expected YYYY-MM-DD or YYYY-MM-DDThh:mm:ssZ")]
    InvalidDate(String),

    /// Record extraction cannot make progress.
    #[error(
        "Could not harvest records from {url}: {reason}{}",
        .last_datestamp.as_ref().map(|d| format!(" (last harvested record datestamp: {d})")).unwrap_or_default()
    )]
    Extraction {
        url: String,
        last_datestamp: Option<String>,
        reason: String,
    },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// All retry attempts failed.
    #[error("Request failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// Missing required XML element.
    #[error("Missing required XML element: {element} in {context}")]
    MissingElement { element: String, context: String },

    /// Record whose metadata schema could not be determined.
    #[error("Unknown metadata schema for record {identifier}{}", .schema_location.as_ref().map(|s| format!(" (schema location: {s})")).unwrap_or_default())]
    UnknownSchema {
        identifier: String,
        schema_location: Option<String>,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML (de)serialization error.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

fn format_prefixes(prefixes: &[String]) -> String {
    if prefixes.is_empty() {
        "none".to_string()
    } else {
        prefixes.join(", ")
    }
}

impl HarvesterError {
    /// Create a configuration error listing the supported prefixes.
    pub fn config(message: impl Into<String>, supported_prefixes: Vec<String>) -> Self {
        Self::Config {
            message: message.into(),
            supported_prefixes,
        }
    }
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvesterError>;
