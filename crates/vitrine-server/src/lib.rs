//! vitrine-server - HTTP directory API.
//!
//! Serves paginated listings, single-record reads, and view counters for
//! each configured domain:
//!
//! - `GET  /health`
//! - `GET  /api/{domain}?page&pageSize&q&scope&category`
//! - `GET  /api/{domain}/record?key=`
//! - `POST /api/{domain}/views` with `{ "key" }`
//! - `POST /api/{domain}/views/lookup` with `{ "keys": [...] }`
//!
//! Failures answer `{ "ok": false, "code", "message" }`.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
