//! vitrine-core - Core types and traits for vitrine.
//!
//! Validated keys and domains, the [`ObjectStore`] trait, and the pure
//! record pipeline: payload sniffing, defensive decoding, sort keys.

pub mod error;
pub mod record;
pub mod traits;
pub mod types;

pub use error::Error;
pub use record::{CounterRecord, PageResult, PageRow, Record, SortKey};
pub use traits::{ObjectEntry, ObjectStore, PutOptions};
pub use types::{Domain, Namespace, RecordKey, SearchScope, StoreUrl};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
