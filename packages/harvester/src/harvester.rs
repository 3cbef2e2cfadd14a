//! Harvest orchestrator that ties all components together.
//!
//! A [`Harvester`] owns the configuration of one repository, the metadata
//! format registry resolved for it and the transformer bound to the
//! configured prefix. Changing the host URL or prefix through
//! [`Harvester::set_config`] rebuilds both.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::config::{HarvestConfig, UNKNOWN_PROVIDER};
use crate::document::CanonicalDocument;
use crate::error::{HarvesterError, Result};
use crate::extraction::{ListRecordsQuery, RecordExtractor};
use crate::formats::MetadataFormatRegistry;
use crate::http::Fetcher;
use crate::identify::fetch_repository_name;
use crate::schema::MetadataSchema;
use crate::transform::{RecordTransformer, TransformContext};

/// Summary of a harvest run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HarvestReport {
    /// Documents handed to the sink, tombstones included.
    pub documents: usize,
    /// Records the repository marked as deleted.
    pub deleted: usize,
    /// Records dropped because they could not be transformed.
    pub skipped: usize,
    /// Record count announced by the repository, if any.
    pub expected_size: Option<u64>,
    /// Identifier of the first record, identifying the repository content.
    pub version: Option<String>,
    /// Datestamp of the last processed record.
    pub last_datestamp: Option<String>,
    /// Pages fetched, fallback pages included.
    pub pages: usize,
    pub aborted: bool,
}

/// Documents of a harvest run with its report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HarvestOutput {
    pub documents: Vec<CanonicalDocument>,
    pub report: HarvestReport,
}

/// Harvests one repository.
pub struct Harvester<F> {
    fetcher: F,
    config: HarvestConfig,
    registry: MetadataFormatRegistry,
    provider_name: String,
    transformer: Option<RecordTransformer>,
    abort: Arc<AtomicBool>,
}

impl<F: Fetcher> Harvester<F> {
    /// Create a harvester and resolve the repository's metadata formats.
    ///
    /// Unreachable repositories do not fail here; validation reports them.
    pub fn new(fetcher: F, config: HarvestConfig) -> Self {
        let config = config.normalized();
        let (registry, provider_name) = Self::resolve_repository(&fetcher, &config);

        Self {
            fetcher,
            config,
            registry,
            provider_name,
            transformer: None,
            abort: Arc::new(AtomicBool::new(false)),
        }
    }

    fn resolve_repository(fetcher: &F, config: &HarvestConfig) -> (MetadataFormatRegistry, String) {
        match config.host() {
            Some(host) => (
                MetadataFormatRegistry::load(fetcher, host),
                fetch_repository_name(fetcher, host),
            ),
            None => (
                MetadataFormatRegistry::default(),
                UNKNOWN_PROVIDER.to_string(),
            ),
        }
    }

    #[must_use]
    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &MetadataFormatRegistry {
        &self.registry
    }

    /// Display name of the repository, or `"Unknown"`.
    #[must_use]
    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    /// Flag that stops a running harvest between records and pages.
    ///
    /// Every run clears the flag when it starts.
    #[must_use]
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    /// Replace the configuration.
    ///
    /// A new host URL re-resolves the format registry and provider name. Any
    /// change drops the bound transformer so the next run binds a new one.
    pub fn set_config(&mut self, config: HarvestConfig) {
        let config = config.normalized();

        if self.config.host() != config.host() {
            tracing::info!(host = ?config.host(), "Host URL changed, reloading metadata formats");
            let (registry, provider_name) = Self::resolve_repository(&self.fetcher, &config);
            self.registry = registry;
            self.provider_name = provider_name;
        } else if self.config.requires_rebuild(&config) {
            tracing::info!(prefix = ?config.prefix(), "Metadata prefix changed, rebinding transformer");
        }

        if self.config != config {
            self.transformer = None;
        }
        self.config = config;
    }

    /// Validate the configuration against the repository.
    ///
    /// Returns the schema bound to the configured prefix; `None` only in
    /// mixed-schema mode for a prefix whose schema is not implemented.
    pub fn validate(&self) -> Result<Option<MetadataSchema>> {
        self.config.validate_dates()?;
        self.registry.validate(
            self.config.host(),
            self.config.prefix(),
            self.config.mixed_schemas,
        )
    }

    /// Bind a transformer to the validated configuration.
    pub fn create_transformer(&self) -> Result<RecordTransformer> {
        let schema = self.validate()?;
        let context = TransformContext::from_config(&self.provider_name, &self.config);

        if self.config.mixed_schemas {
            return Ok(RecordTransformer::flexible(context));
        }

        let schema = schema.ok_or_else(|| {
            HarvesterError::config(
                "Metadata prefix has no supported schema",
                self.registry.supported_prefixes(),
            )
        })?;
        tracing::debug!(schema = %schema, "Bound transformer");
        Ok(RecordTransformer::for_schema(schema, context))
    }

    /// Harvest all records into memory.
    pub fn harvest(&mut self) -> Result<HarvestOutput> {
        let mut documents = Vec::new();
        let report = self.harvest_each(|doc| {
            documents.push(doc);
            Ok(())
        })?;
        Ok(HarvestOutput { documents, report })
    }

    /// Harvest all records, handing each document to `sink` as it is produced.
    ///
    /// Records that fail to transform are logged and skipped. Extraction
    /// errors and sink errors end the run.
    pub fn harvest_each(
        &mut self,
        mut sink: impl FnMut(CanonicalDocument) -> Result<()>,
    ) -> Result<HarvestReport> {
        self.abort.store(false, Ordering::SeqCst);

        let transformer = match self.transformer.take() {
            Some(transformer) => transformer,
            None => self.create_transformer()?,
        };

        let result = self.run(&transformer, &mut sink);
        self.transformer = Some(transformer);
        result
    }

    fn run(
        &self,
        transformer: &RecordTransformer,
        sink: &mut impl FnMut(CanonicalDocument) -> Result<()>,
    ) -> Result<HarvestReport> {
        let query = ListRecordsQuery::from_config(&self.config)?;
        tracing::info!(
            url = %query.url(),
            provider = %self.provider_name,
            mapper = transformer.mapper_name(),
            "Starting harvest"
        );

        let mut extractor =
            RecordExtractor::new(&self.fetcher, query).with_abort_flag(self.abort_handle());
        let mut report = HarvestReport::default();

        extractor.start()?;
        report.expected_size = extractor.expected_size();
        report.version = extractor.version().map(str::to_string);

        for item in extractor.by_ref() {
            let record = match item {
                Ok(record) => record,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        last_datestamp = ?report.last_datestamp,
                        "Harvest failed"
                    );
                    return Err(e);
                }
            };

            if record.is_deleted() {
                report.deleted += 1;
            }

            match transformer.transform(&record) {
                Ok(Some(doc)) => {
                    report.documents += 1;
                    sink(doc)?;
                }
                Ok(None) => {
                    tracing::debug!(identifier = %record.identifier(), "Dropped deleted record");
                }
                Err(e) => {
                    report.skipped += 1;
                    tracing::error!(identifier = %record.identifier(), error = %e, "Skipping record");
                }
            }

            if let Some(datestamp) = record.datestamp() {
                report.last_datestamp = Some(datestamp.to_string());
            }
        }

        report.pages = extractor.pages_fetched();
        report.aborted = self.abort.load(Ordering::SeqCst);

        if report.aborted {
            tracing::warn!(
                documents = report.documents,
                last_datestamp = ?report.last_datestamp,
                "Harvest aborted"
            );
        } else {
            tracing::info!(
                documents = report.documents,
                deleted = report.deleted,
                skipped = report.skipped,
                pages = report.pages,
                "Harvest finished"
            );
        }

        Ok(report)
    }
}
