//! Record extraction engine.
//!
//! Turns one `ListRecords` request into a lazy sequence of [`RawRecord`]s by
//! following resumption tokens. When a page yields no records (an expired
//! token, a failed request, an OAI-PMH error), the engine retries once with
//! the original query anchored at the datestamp of the last record it
//! yielded. If that retry is empty too, or no record has been yielded yet,
//! extraction fails.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{list_records_url, resumption_url, HarvestConfig};
use crate::error::{HarvesterError, Result};
use crate::http::Fetcher;
use crate::record::{ListRecordsPage, RawRecord};

/// The `ListRecords` request a harvest starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRecordsQuery {
    pub host_url: String,
    pub metadata_prefix: String,
    pub from: Option<String>,
    pub until: Option<String>,
    pub set: Option<String>,
}

impl ListRecordsQuery {
    #[must_use]
    pub fn new(host_url: impl Into<String>, metadata_prefix: impl Into<String>) -> Self {
        Self {
            host_url: host_url.into(),
            metadata_prefix: metadata_prefix.into(),
            from: None,
            until: None,
            set: None,
        }
    }

    /// Build the query from a harvest configuration.
    pub fn from_config(config: &HarvestConfig) -> Result<Self> {
        let host_url = config
            .host()
            .ok_or_else(|| HarvesterError::config("No host URL configured", Vec::new()))?;
        let prefix = config
            .prefix()
            .ok_or_else(|| HarvesterError::config("No metadata prefix configured", Vec::new()))?;

        Ok(Self {
            host_url: host_url.to_string(),
            metadata_prefix: prefix.to_string(),
            from: config.from.clone(),
            until: config.until.clone(),
            set: config.set.clone(),
        })
    }

    /// URL of the first page.
    #[must_use]
    pub fn url(&self) -> String {
        self.url_from(self.from.as_deref())
    }

    /// URL of the first page with a different `from` date.
    #[must_use]
    pub fn url_from(&self, from: Option<&str>) -> String {
        list_records_url(
            &self.host_url,
            from,
            self.until.as_deref(),
            self.set.as_deref(),
            &self.metadata_prefix,
        )
    }

    /// URL continuing the list at a resumption token.
    #[must_use]
    pub fn resumption_url(&self, token: &str) -> String {
        resumption_url(&self.host_url, token)
    }
}

/// Pagination state owned by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumptionState {
    /// URL of the next page to fetch; `None` once the list is exhausted.
    pub current_url: Option<String>,
    /// Datestamp of the last record handed out, the anchor for recovery.
    pub last_record_datestamp: Option<String>,
}

/// Lazy, paginated sequence of raw records.
///
/// Yields `Err` at most once; the sequence ends after an error, after
/// exhaustion, or when the abort flag is raised.
pub struct RecordExtractor<F> {
    fetcher: F,
    query: ListRecordsQuery,
    state: ResumptionState,
    queue: VecDeque<RawRecord>,
    pages_fetched: usize,
    expected_size: Option<u64>,
    version: Option<String>,
    abort: Arc<AtomicBool>,
    finished: bool,
}

impl<F: Fetcher> RecordExtractor<F> {
    /// Create an extractor; nothing is fetched until the first record is requested.
    pub fn new(fetcher: F, query: ListRecordsQuery) -> Self {
        let state = ResumptionState {
            current_url: Some(query.url()),
            last_record_datestamp: None,
        };

        Self {
            fetcher,
            query,
            state,
            queue: VecDeque::new(),
            pages_fetched: 0,
            expected_size: None,
            version: None,
            abort: Arc::new(AtomicBool::new(false)),
            finished: false,
        }
    }

    /// Share an abort flag with the caller.
    #[must_use]
    pub fn with_abort_flag(mut self, abort: Arc<AtomicBool>) -> Self {
        self.abort = abort;
        self
    }

    /// Fetch the first page if that has not happened yet, so that
    /// [`expected_size`](Self::expected_size) and [`version`](Self::version)
    /// are available.
    pub fn start(&mut self) -> Result<()> {
        if self.pages_fetched > 0 || self.finished || self.is_aborted() {
            return Ok(());
        }
        if let Some(url) = self.state.current_url.take() {
            if let Err(e) = self.fetch_page(url) {
                self.finished = true;
                return Err(e);
            }
        }
        Ok(())
    }

    /// Total number of records announced by the first page, if any.
    #[must_use]
    pub fn expected_size(&self) -> Option<u64> {
        self.expected_size
    }

    /// Identifier of the first record fetched; identifies the repository
    /// content for incremental re-harvesting.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Current pagination state.
    #[must_use]
    pub fn state(&self) -> &ResumptionState {
        &self.state
    }

    /// Datestamp of the last record handed out.
    #[must_use]
    pub fn last_record_datestamp(&self) -> Option<&str> {
        self.state.last_record_datestamp.as_deref()
    }

    /// Number of pages fetched so far, fallback pages included.
    #[must_use]
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.abort.load(Ordering::SeqCst)
    }

    /// Fetch and parse a page. Transport and parse failures count as an
    /// empty page; the reason is returned for error reporting.
    fn load_page(&mut self, url: &str) -> (ListRecordsPage, Option<String>) {
        tracing::debug!(url, "Fetching records page");
        self.pages_fetched += 1;

        let page = self
            .fetcher
            .fetch(url)
            .and_then(|body| ListRecordsPage::parse(&body));

        match page {
            Ok(page) => {
                let reason = page.error.as_ref().map(|e| {
                    tracing::warn!(url, code = %e.code, message = %e.message, "Repository returned an error");
                    format!("repository error '{}': {}", e.code, e.message)
                });
                (page, reason)
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "Could not retrieve records page");
                (ListRecordsPage::default(), Some(e.to_string()))
            }
        }
    }

    fn fetch_page(&mut self, url: String) -> Result<()> {
        let (page, reason) = self.load_page(&url);
        if self.is_aborted() {
            return Ok(());
        }

        if !page.records.is_empty() {
            self.accept(page);
            return Ok(());
        }

        let Some(last_datestamp) = self.state.last_record_datestamp.clone() else {
            return Err(HarvesterError::Extraction {
                url,
                last_datestamp: None,
                reason: reason.unwrap_or_else(|| "no records returned".to_string()),
            });
        };

        let fallback_url = self.query.url_from(Some(&last_datestamp));
        tracing::info!(
            failed_url = %url,
            fallback_url = %fallback_url,
            from = %last_datestamp,
            "No records returned, resuming from last harvested datestamp"
        );

        let (page, reason) = self.load_page(&fallback_url);
        if self.is_aborted() {
            return Ok(());
        }

        if page.records.is_empty() {
            return Err(HarvesterError::Extraction {
                url: fallback_url,
                last_datestamp: Some(last_datestamp),
                reason: reason.unwrap_or_else(|| "no records returned".to_string()),
            });
        }

        self.accept(page);
        Ok(())
    }

    fn accept(&mut self, page: ListRecordsPage) {
        if self.version.is_none() {
            self.version = page.records.first().map(|r| r.identifier().to_string());
            self.expected_size = page
                .resumption_token
                .as_ref()
                .and_then(|t| t.complete_list_size);
        }

        self.state.current_url = page.next_token().map(|t| self.query.resumption_url(t));
        tracing::debug!(
            records = page.records.len(),
            has_next = self.state.current_url.is_some(),
            "Page received"
        );
        self.queue.extend(page.records);
    }
}

impl<F: Fetcher> Iterator for RecordExtractor<F> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }

            if self.is_aborted() {
                tracing::info!("Record extraction aborted");
                self.finished = true;
                self.queue.clear();
                return None;
            }

            if let Some(record) = self.queue.pop_front() {
                if let Some(datestamp) = record.datestamp() {
                    self.state.last_record_datestamp = Some(datestamp.to_string());
                }
                return Some(Ok(record));
            }

            let Some(url) = self.state.current_url.take() else {
                self.finished = true;
                return None;
            };

            if let Err(e) = self.fetch_page(url) {
                self.finished = true;
                return Some(Err(e));
            }
        }
    }
}
