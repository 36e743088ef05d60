//! # limitstream
//!
//! Bounded, concurrency-safe event aggregation for streaming
//! producer/consumer pipelines.
//!
//! A producer emits [`Event`]s (a batch of results plus a statistics
//! summary) into a [`Sink`]. This crate provides the plumbing between the
//! producer and its consumer:
//!
//! - [`with_limit`] forwards every event unchanged, counts results across the
//!   whole stream and, once a limit is exceeded, sends a terminal limit-hit
//!   event and cancels the producer's [`Scope`].
//! - [`collect`] drains an entire stream into one list of results, one
//!   merged [`Stats`] summary and the producer's own result.
//! - [`sink_fn`] turns any closure into a sink.
//!
//! Everything is synchronous and in-process. Sinks may be called from many
//! producer threads at once.
//!
//! ## Quick Example
//!
//! ```rust
//! use limitstream::{collect, with_limit, Event, ResultItem, Scope, Sink, Stats};
//!
//! #[derive(Debug, Clone)]
//! struct FileMatch {
//!     path: String,
//!     lines: usize,
//! }
//!
//! impl ResultItem for FileMatch {
//!     fn result_count(&self) -> usize {
//!         self.lines
//!     }
//! }
//!
//! fn search(scope: &Scope, sink: &dyn Sink<FileMatch>) -> Result<(), String> {
//!     for i in 0..100 {
//!         if scope.is_cancelled() {
//!             break;
//!         }
//!         sink.send(&Event::from_results(vec![FileMatch {
//!             path: format!("src/{}.rs", i),
//!             lines: 2,
//!         }]));
//!     }
//!     Ok(())
//! }
//!
//! let root = Scope::new();
//! let (results, stats, result): (Vec<FileMatch>, Stats, Result<(), String>) = collect(|sink| {
//!     let (scope, limited, _release) = with_limit(&root, sink, 5);
//!     search(&scope, &limited)
//! });
//!
//! // Three batches of two lines each pass before the limit trips.
//! assert_eq!(results.len(), 3);
//! assert!(stats.is_limit_hit);
//! assert!(result.is_ok());
//! assert!(!root.is_cancelled());
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod collect;
pub mod event;
pub mod limit;
pub mod scope;
pub mod semigroup;
pub mod sink;
pub mod stats;
pub mod testing;

// Re-exports
pub use collect::{collect, CollectingSink};
#[cfg(feature = "async")]
pub use collect::{collect_async, collect_blocking};
pub use event::{Event, ResultItem};
pub use limit::{with_limit, LimitSink};
pub use scope::{ReleaseGuard, Scope};
pub use semigroup::{Monoid, Semigroup};
pub use sink::{sink_fn, Discard, Sink, SinkFn};
pub use stats::{RepoStatus, Stats, StatsSummary};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::collect::{collect, CollectingSink};
    pub use crate::event::{Event, ResultItem};
    pub use crate::limit::{with_limit, LimitSink};
    pub use crate::scope::{ReleaseGuard, Scope};
    pub use crate::semigroup::{Monoid, Semigroup};
    pub use crate::sink::{sink_fn, Sink};
    pub use crate::stats::{Stats, StatsSummary};
}
