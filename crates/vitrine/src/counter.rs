//! Per-record view counters.
//!
//! Each record key maps to one counter object in the domain's counter
//! namespace (`notices/x.json` -> `notices-views/x.json`). Counters live
//! apart from records so a view never rewrites the record body.
//!
//! Increments are read-then-write with no compare-and-swap. Two concurrent
//! increments of the same key can both read `n` and both write `n + 1`; one
//! view is then lost. Counts are best-effort.

use std::collections::HashMap;

use tracing::{debug, instrument, warn};

use vitrine_core::error::InvalidInputError;
use vitrine_core::record::decode_counter;
use vitrine_core::{
    CounterRecord, Domain, Error, ObjectStore, PutOptions, RecordKey, Result,
};

use crate::batch::BatchScheduler;
use crate::retry::ResilientFetcher;

/// View counters for records in any domain.
#[derive(Debug, Clone)]
pub struct CounterStore<S> {
    fetcher: ResilientFetcher<S>,
    batch: BatchScheduler,
}

impl<S: ObjectStore> CounterStore<S> {
    pub fn new(fetcher: ResilientFetcher<S>, batch: BatchScheduler) -> Self {
        Self { fetcher, batch }
    }

    /// Count one view of a record and return the new count.
    ///
    /// A missing or unreadable counter counts as zero, so the first
    /// increment of any record yields `1`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] for a key outside the domain
    /// - [`Error::NotFound`] when no record exists at the key
    /// - store errors from reading or writing the counter
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn increment(&self, domain: &Domain, raw_key: &str) -> Result<u64> {
        let key = domain.validate_key(raw_key)?;

        let store = self.fetcher.store();
        if self
            .fetcher
            .retry(|| store.head(key.as_str()))
            .await?
            .is_none()
        {
            return Err(Error::NotFound {
                key: key.to_string(),
            });
        }

        let counter_key = domain.counter_key(&key)?;
        let current = match self.load(&counter_key).await {
            Ok(counter) => counter.view_count,
            Err(e) if e.is_not_found() => 0,
            Err(e @ Error::Corrupted { .. }) => {
                warn!(key = %counter_key, error = %e, "resetting unreadable counter");
                0
            }
            Err(e) => return Err(e),
        };

        let next = current.saturating_add(1);
        let body = serde_json::to_string(&CounterRecord::now(next, &key)).map_err(|e| {
            InvalidInputError::Other {
                message: format!("cannot encode counter: {}", e),
            }
        })?;

        self.fetcher
            .retry(|| store.put(counter_key.as_str(), &body, PutOptions::json_overwrite()))
            .await?;

        debug!(key = %key, view_count = next, "counted view");
        Ok(next)
    }

    /// Current count of one record, or `None` when it has no readable
    /// counter yet.
    pub async fn read(&self, domain: &Domain, key: &RecordKey) -> Option<u64> {
        let counter_key = domain.counter_key(key).ok()?;
        match self.load(&counter_key).await {
            Ok(counter) => Some(counter.view_count),
            Err(e) => {
                if !e.is_not_found() {
                    debug!(key = %counter_key, error = %e, "counter unavailable");
                }
                None
            }
        }
    }

    /// Counts for many records, read `batch_size` at a time.
    ///
    /// Keys without a readable counter are absent from the map; callers fall
    /// back to the record's embedded legacy count for those.
    #[instrument(skip(self, keys), fields(domain = %domain, count = keys.len()))]
    pub async fn read_many(&self, domain: &Domain, keys: &[RecordKey]) -> HashMap<RecordKey, u64> {
        let mut unique: Vec<&RecordKey> = keys.iter().collect();
        unique.sort();
        unique.dedup();

        self.batch
            .run(unique, |key| async move {
                self.read(domain, key).await.map(|count| (key.clone(), count))
            })
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// Read and decode the counter object at `counter_key`.
    async fn load(&self, counter_key: &RecordKey) -> Result<CounterRecord> {
        let store = self.fetcher.store();
        let entry = self
            .fetcher
            .retry(|| store.head(counter_key.as_str()))
            .await?
            .ok_or_else(|| Error::NotFound {
                key: counter_key.to_string(),
            })?;

        let raw = self.fetcher.fetch(&entry.url).await?;
        decode_counter(counter_key, &raw)
    }
}
