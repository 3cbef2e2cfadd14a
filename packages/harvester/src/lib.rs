//! OAI-PMH Harvester - Harvest metadata records and map them to canonical documents.
//!
//! This crate harvests records from repositories speaking the OAI-PMH
//! protocol and converts each record into a [`CanonicalDocument`],
//! whatever metadata standard (DataCite 2/3/4, Dublin Core, ISO 19139) it
//! was published in.
//!
//! # Example
//!
//! ```
//! use oaipmh_harvester::config::{list_records_url, validate_date};
//! use oaipmh_harvester::MetadataSchema;
//!
//! assert!(validate_date("2025-01-01").is_ok());
//! assert_eq!(
//!     list_records_url("https://example.org/oai", None, None, Some("physics"), "oai_dc"),
//!     "https://example.org/oai?verb=ListRecords&set=physics&metadataPrefix=oai_dc"
//! );
//! assert_eq!(
//!     MetadataSchema::from_url("http://schema.datacite.org/meta/kernel-4.1/metadata.xsd"),
//!     Some(MetadataSchema::DataCite4)
//! );
//! ```
//!
//! # Architecture
//!
//! The harvester is organized into several modules:
//!
//! - [`config`]: Harvest configuration, date validation and request URLs
//! - [`error`]: Error types and Result alias
//! - [`http`]: The [`Fetcher`] seam with HTTP and caching implementations
//! - [`xml`]: XML utilities and the owned element tree records are kept in
//! - [`schema`]: Metadata schemas the harvester implements
//! - [`formats`]: Metadata format registry (`ListMetadataFormats`)
//! - [`identify`]: Repository display name (`Identify`)
//! - [`record`]: Raw records and `ListRecords` pages
//! - [`extraction`]: Paginated record extraction with date fallback
//! - [`classifier`]: Schema detection for mixed repositories
//! - [`document`]: The canonical document model
//! - [`transform`]: Schema transformers
//! - [`harvester`]: Harvest orchestrator
//! - [`output`]: JSON and YAML output
//! - [`cli`]: Command-line interface

pub mod classifier;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod harvester;
pub mod http;
pub mod identify;
pub mod output;
pub mod record;
pub mod schema;
pub mod transform;
pub mod xml;

// Re-export commonly used items
pub use config::{DeletionPolicy, HarvestConfig};
pub use document::CanonicalDocument;
pub use error::{HarvesterError, Result};
pub use extraction::{ListRecordsQuery, RecordExtractor};
pub use formats::MetadataFormatRegistry;
pub use harvester::{HarvestOutput, HarvestReport, Harvester};
pub use http::{CachingFetcher, Fetcher, HttpFetcher};
pub use record::RawRecord;
pub use schema::MetadataSchema;
pub use transform::{RecordTransformer, TransformContext};
