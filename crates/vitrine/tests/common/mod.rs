#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use vitrine::{
    ContentDirectory, DirectoryConfig, Error, ObjectEntry, ObjectStore, PutOptions, Result,
    RetryPolicy,
};
use vitrine_core::error::{ProtocolError, TransportError};

const URL_SCHEME: &str = "mem://";

/// A misbehaviour injected for reads of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The body read answers with an HTML error page.
    Html,
    /// The body read answers with a plain-text rate-limit notice.
    RateLimitNotice,
    /// The next `n` body reads are rate-limited, then reads succeed.
    RateLimited(usize),
    /// Every body read is rate-limited.
    AlwaysRateLimited,
    /// The listing includes the key but the body has vanished.
    Vanished,
    /// The body read fails with a connection reset.
    Reset,
}

/// In-memory object store with fault injection.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, String>>,
    faults: Mutex<HashMap<String, Fault>>,
    listing_fails: AtomicBool,
    fetches: AtomicUsize,
    puts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, key: &str, body: impl Into<String>) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), body.into());
    }

    pub fn insert_json(&self, key: &str, value: Value) {
        self.insert(key, value.to_string());
    }

    pub fn body(&self, key: &str) -> Option<String> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn fault(&self, key: &str, fault: Fault) {
        self.faults.lock().unwrap().insert(key.to_string(), fault);
    }

    pub fn fail_listing(&self) {
        self.listing_fails.store(true, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    fn entry(key: &str) -> ObjectEntry {
        ObjectEntry {
            key: key.to_string(),
            url: format!("{}{}", URL_SCHEME, key),
        }
    }

    /// Apply the fault registered for `key`, if any.
    fn injected(&self, key: &str) -> Option<Result<String>> {
        let mut faults = self.faults.lock().unwrap();
        let fault = *faults.get(key)?;
        let limited = || -> Result<String> {
            Err(ProtocolError::new(429, None, Some("slow down".into())).into())
        };

        Some(match fault {
            Fault::Html => Ok("<!DOCTYPE html><html><body>502 Bad Gateway</body></html>".into()),
            Fault::RateLimitNotice => Ok("Too Many Requests".into()),
            Fault::AlwaysRateLimited => limited(),
            Fault::RateLimited(0) => {
                faults.remove(key);
                return None;
            }
            Fault::RateLimited(n) => {
                faults.insert(key.to_string(), Fault::RateLimited(n - 1));
                limited()
            }
            Fault::Vanished => Err(Error::NotFound {
                key: key.to_string(),
            }),
            Fault::Reset => Err(TransportError::Reset {
                message: "connection reset by peer".into(),
            }
            .into()),
        })
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<ObjectEntry>> {
        if self.listing_fails.load(Ordering::SeqCst) {
            return Err(ProtocolError::new(500, Some("InternalError".into()), None).into());
        }
        Ok(self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .take(limit)
            .map(|k| Self::entry(k))
            .collect())
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectEntry>> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .contains_key(key)
            .then(|| Self::entry(key)))
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let key = url.strip_prefix(URL_SCHEME).unwrap_or(url);

        if let Some(result) = self.injected(key) {
            return result;
        }
        self.body(key).ok_or_else(|| Error::NotFound {
            key: key.to_string(),
        })
    }

    async fn put(&self, key: &str, body: &str, options: PutOptions) -> Result<ObjectEntry> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        let mut objects = self.objects.lock().unwrap();
        if !options.allow_overwrite && objects.contains_key(key) {
            return Err(ProtocolError::new(409, Some("Conflict".into()), None).into());
        }
        objects.insert(key.to_string(), body.to_string());
        Ok(Self::entry(key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Retries that finish in milliseconds.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 3,
        initial_delay_ms: 1,
        max_delay_ms: 4,
        backoff_multiplier: 2.0,
    }
}

pub fn test_config() -> DirectoryConfig {
    DirectoryConfig {
        batch_size: 3,
        counter_batch_size: 2,
        retry: fast_retry(),
        ..DirectoryConfig::default()
    }
}

pub fn directory(store: &Arc<MemoryStore>) -> ContentDirectory<Arc<MemoryStore>> {
    ContentDirectory::new(store.clone(), &test_config())
}

/// Seed `n` notices `notices/n00.json..` with strictly increasing
/// `createdAt` dates, so `notices/n00.json` is the oldest.
pub fn seed_notices(store: &MemoryStore, n: usize) {
    for i in 0..n {
        store.insert_json(
            &format!("notices/n{:02}.json", i),
            serde_json::json!({
                "title": format!("Notice {}", i),
                "content": format!("Body of notice {}", i),
                "createdAt": format!("2024-01-{:02}T09:00:00Z", i + 1),
            }),
        );
    }
}
