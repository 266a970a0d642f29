//! The content directory: full scan, sort, paginate.
//!
//! The store has no query engine, so every page request lists the whole
//! domain prefix (up to `listLimit` keys), fetches and parses every body,
//! sorts the survivors newest first, and slices out the page. Only the
//! visible rows are enriched with view counts.
//!
//! A single unreadable record never fails a page; it is dropped and the
//! page is flagged `partial`. Only a failed listing call fails the page.

use tracing::{debug, instrument, warn};

use vitrine_core::error::InvalidInputError;
use vitrine_core::record::decode_record;
use vitrine_core::{
    Domain, Error, ObjectStore, PageResult, PageRow, Record, RecordKey, Result, SearchScope,
    SortKey,
};

use crate::batch::BatchScheduler;
use crate::config::DirectoryConfig;
use crate::counter::CounterStore;
use crate::retry::ResilientFetcher;

/// Largest page a caller may ask for.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Page coordinates plus optional filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    /// Case-insensitive substring to search for; blank matches everything.
    pub search: Option<String>,
    pub scope: SearchScope,
    /// Case-insensitive category to keep.
    pub category: Option<String>,
}

impl PageQuery {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            search: None,
            scope: SearchScope::default(),
            category: None,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>, scope: SearchScope) -> Self {
        self.search = Some(search.into());
        self.scope = scope;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Check page bounds.
    pub fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(InvalidInputError::Page {
                reason: "page must be at least 1".to_string(),
            }
            .into());
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(InvalidInputError::Page {
                reason: format!("pageSize must be between 1 and {}", MAX_PAGE_SIZE),
            }
            .into());
        }
        Ok(())
    }

    /// Whether a record passes the search and category filters.
    pub fn matches(&self, record: &Record) -> bool {
        let searched = self
            .search
            .as_deref()
            .is_none_or(|q| record.matches(q, self.scope));
        let categorised = self
            .category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .is_none_or(|c| record.in_category(c));
        searched && categorised
    }

    /// Index range of this page within the sorted set.
    fn window(&self) -> (usize, usize) {
        let size = self.page_size as usize;
        let start = (self.page as usize - 1).saturating_mul(size);
        (start, size)
    }
}

/// Paginated, sorted views over the records of a domain.
#[derive(Debug, Clone)]
pub struct ContentDirectory<S> {
    fetcher: ResilientFetcher<S>,
    counters: CounterStore<S>,
    batch: BatchScheduler,
    list_limit: usize,
}

impl<S: ObjectStore + Clone> ContentDirectory<S> {
    /// Build a directory over `store` with the given tunables.
    pub fn new(store: S, config: &DirectoryConfig) -> Self {
        let fetcher = ResilientFetcher::new(store, config.retry.clone());
        let counters = CounterStore::new(
            fetcher.clone(),
            BatchScheduler::new(config.counter_batch_size),
        );
        Self {
            fetcher,
            counters,
            batch: BatchScheduler::new(config.batch_size),
            list_limit: config.list_limit.max(1),
        }
    }
}

impl<S: ObjectStore> ContentDirectory<S> {
    pub fn counters(&self) -> &CounterStore<S> {
        &self.counters
    }

    pub fn store(&self) -> &S {
        self.fetcher.store()
    }

    /// One page of a domain's records, newest first.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] for out-of-range page coordinates
    /// - [`Error::Unavailable`] when the listing call fails
    pub async fn list_page(&self, domain: &Domain, query: &PageQuery) -> Result<PageResult> {
        self.list_page_with(domain, query, |_| true).await
    }

    /// Like [`list_page`](Self::list_page), keeping only records for which
    /// `predicate` also holds. `total` counts records after filtering.
    #[instrument(skip(self, predicate), fields(domain = %domain, page = query.page, page_size = query.page_size))]
    pub async fn list_page_with<P>(
        &self,
        domain: &Domain,
        query: &PageQuery,
        predicate: P,
    ) -> Result<PageResult>
    where
        P: Fn(&Record) -> bool,
    {
        query.validate()?;

        let records = domain.records();
        let listed = self
            .fetcher
            .store()
            .list(records.prefix(), self.list_limit)
            .await
            .map_err(|e| {
                warn!(error = %e, "listing failed");
                Error::unavailable(e)
            })?;

        if listed.len() >= self.list_limit {
            warn!(limit = self.list_limit, "listing reached the key cap; older records are not visible");
        }

        let candidates: Vec<(RecordKey, String)> = listed
            .into_iter()
            .filter_map(|entry| match domain.validate_key(&entry.key) {
                Ok(key) => Some((key, entry.url)),
                Err(_) => {
                    debug!(key = %entry.key, "ignoring foreign key");
                    None
                }
            })
            .collect();
        let listed_count = candidates.len();

        let loaded = self
            .batch
            .run(candidates, |(key, url)| async move { self.load(key, &url).await })
            .await;
        let skipped = loaded.iter().filter(|r| r.is_none()).count();

        let mut sorted: Vec<(SortKey, Record)> = loaded
            .into_iter()
            .flatten()
            .filter(|record| query.matches(record) && predicate(record))
            .map(|record| (SortKey::resolve(&record), record))
            .collect();
        sorted.sort_by(|a, b| SortKey::newest_first(&a.0, &b.0));

        let total = sorted.len();
        let (start, size) = query.window();

        let visible: Vec<Record> = sorted
            .into_iter()
            .skip(start)
            .take(size)
            .map(|(_, record)| record)
            .collect();

        let rows = self.enrich(domain, visible).await;

        debug!(listed = listed_count, total, skipped, rows = rows.len(), "page assembled");

        Ok(PageResult {
            page: query.page,
            page_size: query.page_size,
            total,
            rows,
            partial: skipped > 0,
        })
    }

    /// A single record with its view count.
    ///
    /// Unlike listing, a single read surfaces what went wrong.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] for a key outside the domain
    /// - [`Error::NotFound`] when no object exists at the key
    /// - [`Error::Corrupted`] when the body is not a record
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn get_record(&self, domain: &Domain, raw_key: &str) -> Result<PageRow> {
        let key = domain.validate_key(raw_key)?;

        let store = self.fetcher.store();
        let entry = self
            .fetcher
            .retry(|| store.head(key.as_str()))
            .await?
            .ok_or_else(|| Error::NotFound {
                key: key.to_string(),
            })?;

        let raw = self.fetcher.fetch(&entry.url).await?;
        let record = decode_record(&key, &raw)?;

        let view_count = self
            .counters
            .read(domain, &key)
            .await
            .unwrap_or(record.legacy_view_count);

        Ok(PageRow { record, view_count })
    }

    /// Fetch and parse one listed record; any failure makes it absent.
    async fn load(&self, key: RecordKey, url: &str) -> Option<Record> {
        let raw = match self.fetcher.fetch(url).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "skipping record that could not be fetched");
                return None;
            }
        };

        match decode_record(&key, &raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(key = %key, error = %e, "skipping unreadable record");
                None
            }
        }
    }

    /// Attach view counts: the counter when one exists, else the record's
    /// legacy embedded count.
    async fn enrich(&self, domain: &Domain, records: Vec<Record>) -> Vec<PageRow> {
        if records.is_empty() {
            return Vec::new();
        }

        let keys: Vec<RecordKey> = records.iter().map(|r| r.key.clone()).collect();
        let counts = self.counters.read_many(domain, &keys).await;

        records
            .into_iter()
            .map(|record| {
                let view_count = counts
                    .get(&record.key)
                    .copied()
                    .unwrap_or(record.legacy_view_count);
                PageRow { record, view_count }
            })
            .collect()
    }
}
