//! Content-addressed response cache.
//!
//! Maps a fingerprint of (diff text, provider, model, sampling parameters)
//! to a previously generated commit message, bounded by a freshness window.
//! There is deliberately no capacity bound: eviction is time-based only, via
//! lazy deletes on lookup and the bulk purge surface. Long-lived installs
//! that never purge will grow the store; `cache purge` is the maintenance
//! path.
//!
//! The store is shared across all invocations for a user. Byte-identical
//! staged diffs with identical parameters share an entry regardless of the
//! originating repository; same input, same output.

pub mod fingerprint;
pub mod store;

pub use fingerprint::fingerprint;
pub use store::{CacheStatistics, ResponseCache};
