//! Core traits for object store behavior.

mod store;

pub use store::{ObjectEntry, ObjectStore, PutOptions};
