//! vitrine-http - HTTP object store client for vitrine.

mod client;
mod endpoints;
mod store;

pub use client::{StoreClient, classify};
pub use store::HttpStore;
