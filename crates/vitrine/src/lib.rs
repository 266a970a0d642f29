//! vitrine - A paginated, sorted content directory over a primitive object store.
//!
//! The backing store offers only list-by-prefix, get, put, and delete. This
//! crate layers on top of it:
//!
//! - [`ResilientFetcher`]: bounded exponential backoff on rate limiting
//! - [`BatchScheduler`]: order-preserving, bounded-concurrency fan-out
//! - [`ContentDirectory`]: full scan, sort, and paginate
//! - [`CounterStore`]: per-record view counters in a sibling keyspace
//!
//! # Example
//!
//! ```no_run
//! use vitrine::{ContentDirectory, DirectoryConfig, PageQuery, Store, StoreUrl};
//!
//! # async fn example() -> Result<(), vitrine::Error> {
//! let config = DirectoryConfig::default();
//! let store = Store::open(StoreUrl::new("https://blob.example.com")?, None, config.request_timeout())?;
//! let directory = ContentDirectory::new(store, &config);
//!
//! for domain in config.domains()? {
//!     let page = directory.list_page(&domain, &PageQuery::new(1, 10)).await?;
//!     println!("{}: {} records", domain, page.total);
//! }
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod counter;
pub mod directory;
pub mod retry;
pub mod store;

pub use batch::BatchScheduler;
pub use config::{DirectoryConfig, DomainConfig};
pub use counter::CounterStore;
pub use directory::{ContentDirectory, MAX_PAGE_SIZE, PageQuery};
pub use retry::{ResilientFetcher, RetryPolicy};
pub use store::Store;

pub use vitrine_core::{
    CounterRecord, Domain, Error, ObjectEntry, ObjectStore, PageResult, PageRow, PutOptions,
    Record, RecordKey, Result, SearchScope, SortKey, StoreUrl,
};
