//! Validated vitrine types.
//!
//! These types enforce namespace and URL rules at construction time, so a
//! key that reaches the object store has already been checked.

mod domain;
mod key;
mod store_url;

pub use domain::{Domain, JSON_SUFFIX, SearchScope};
pub use key::{Namespace, RecordKey};
pub use store_url::StoreUrl;
