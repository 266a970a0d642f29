//! vitrine-file - Filesystem-backed object store.
//!
//! Objects are plain files under a root directory, one file per key, so a
//! content tree can be seeded and inspected with ordinary tools.

mod store;

pub use store::FileStore;
