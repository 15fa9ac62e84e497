//! Gerrit review-service client: query composition, paginated fetching and
//! the no-expiry disk cache

pub mod cache;
pub mod fetch;
pub mod query;
pub mod types;

pub use cache::{CacheError, CacheStore};
pub use fetch::{fetch_changes, FetchError, GerritTransport, SshTransport};
pub use query::build_query;
pub use types::RawChange;
