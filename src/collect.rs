//! Drain a whole stream into one aggregated result.
//!
//! [`collect`] is for callers that do not want incremental delivery. It runs
//! a producer against a [`CollectingSink`], blocks until the producer
//! returns, and hands back every result, the merged statistics and the
//! producer's own result untouched.
//!
//! # Example
//!
//! ```
//! use limitstream::{collect, Event, ResultItem, Sink, Stats};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Hit(&'static str);
//! impl ResultItem for Hit {
//!     fn result_count(&self) -> usize { 1 }
//! }
//!
//! let (results, stats, result): (Vec<Hit>, Stats, Result<(), String>) = collect(|sink| {
//!     sink.send(&Event::from_results(vec![Hit("a")]));
//!     sink.send(&Event::from_results(vec![Hit("b")]));
//!     sink.send(&Event::from_results(vec![Hit("c")]));
//!     Ok(())
//! });
//!
//! assert_eq!(results.len(), 3);
//! assert!(!stats.is_limit_hit);
//! assert_eq!(result, Ok(()));
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::event::Event;
use crate::semigroup::{Monoid, Semigroup};
use crate::sink::Sink;
use crate::stats::Stats;

/// A sink that accumulates every event into one result list and one merged
/// statistics summary.
///
/// Clones share the same accumulator, so a producer can hand a clone to each
/// worker thread or task. Across threads, results land in whatever order the
/// workers acquire the lock.
#[derive(Debug)]
pub struct CollectingSink<R, S = Stats> {
    acc: Arc<Mutex<Event<R, S>>>,
}

impl<R, S> Clone for CollectingSink<R, S> {
    fn clone(&self) -> Self {
        CollectingSink {
            acc: Arc::clone(&self.acc),
        }
    }
}

impl<R, S: Monoid> CollectingSink<R, S> {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        CollectingSink {
            acc: Arc::new(Mutex::new(Event::default())),
        }
    }

    /// Take everything accumulated so far, leaving the accumulator empty.
    ///
    /// Events sent after this call are kept for the next one.
    pub fn into_parts(self) -> (Vec<R>, S) {
        let Event { results, stats } = std::mem::take(&mut *self.lock());
        (results, stats)
    }
}

impl<R, S> CollectingSink<R, S> {
    fn lock(&self) -> MutexGuard<'_, Event<R, S>> {
        // Appends and merges leave the accumulator consistent even if a
        // holder panicked.
        self.acc.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R: Clone, S: Clone> CollectingSink<R, S> {
    /// A copy of what has been accumulated so far.
    pub fn snapshot(&self) -> Event<R, S> {
        self.lock().clone()
    }
}

impl<R, S: Monoid> Default for CollectingSink<R, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, S> Sink<R, S> for CollectingSink<R, S>
where
    R: Clone,
    S: Monoid + Clone,
{
    fn send(&self, event: &Event<R, S>) {
        let event = event.clone();
        self.lock().update(event);
    }
}

/// Run `producer` against a fresh [`CollectingSink`] and return everything
/// it sent.
///
/// Returns the accumulated results, the merged statistics and exactly what
/// the producer returned. A panic in the producer propagates.
///
/// Producers that fan out to threads can borrow the sink inside
/// [`std::thread::scope`] or clone it:
///
/// ```
/// use limitstream::{collect, Event, ResultItem, Sink, Stats};
///
/// #[derive(Debug, Clone)]
/// struct Hit(usize);
/// impl ResultItem for Hit {
///     fn result_count(&self) -> usize { 1 }
/// }
///
/// let (results, _stats, result): (Vec<Hit>, Stats, Result<(), ()>) = collect(|sink| {
///     std::thread::scope(|s| {
///         for worker in 0..4 {
///             s.spawn(move || sink.send(&Event::from_results(vec![Hit(worker)])));
///         }
///     });
///     Ok(())
/// });
///
/// assert_eq!(results.len(), 4);
/// assert!(result.is_ok());
/// ```
pub fn collect<R, S, E, F>(producer: F) -> (Vec<R>, S, Result<(), E>)
where
    R: Clone,
    S: Monoid + Clone,
    F: FnOnce(&CollectingSink<R, S>) -> Result<(), E>,
{
    let sink = CollectingSink::new();
    let result = producer(&sink);
    finish(sink, result)
}

fn finish<R, S: Monoid, E>(
    sink: CollectingSink<R, S>,
    result: Result<(), E>,
) -> (Vec<R>, S, Result<(), E>) {
    let (results, stats) = sink.into_parts();

    #[cfg(feature = "tracing")]
    tracing::debug!(
        results = results.len(),
        failed = result.is_err(),
        "collected stream"
    );

    (results, stats, result)
}

/// Await an async producer and return everything it sent.
///
/// The producer receives an owned [`CollectingSink`] it can clone into
/// spawned tasks.
///
/// ```
/// use limitstream::{collect_async, Event, ResultItem, Sink, Stats};
///
/// #[derive(Debug, Clone)]
/// struct Hit;
/// impl ResultItem for Hit {
///     fn result_count(&self) -> usize { 1 }
/// }
///
/// # tokio_test::block_on(async {
/// let (results, _stats, result): (Vec<Hit>, Stats, Result<(), String>) =
///     collect_async(|sink| async move {
///         sink.send(&Event::from_results(vec![Hit]));
///         Err("backend unavailable".to_string())
///     })
///     .await;
///
/// assert_eq!(results.len(), 1);
/// assert_eq!(result, Err("backend unavailable".to_string()));
/// # });
/// ```
#[cfg(feature = "async")]
pub async fn collect_async<R, S, E, F, Fut>(producer: F) -> (Vec<R>, S, Result<(), E>)
where
    R: Clone,
    S: Monoid + Clone,
    F: FnOnce(CollectingSink<R, S>) -> Fut,
    Fut: std::future::Future<Output = Result<(), E>>,
{
    let sink = CollectingSink::new();
    let result = producer(sink.clone()).await;
    finish(sink, result)
}

/// Run a blocking producer on tokio's blocking pool and return everything
/// it sent, without stalling the async caller.
///
/// # Panics
///
/// A panic in the producer is resumed on the caller. Panics if the blocking
/// task is cancelled because the runtime is shutting down.
#[cfg(feature = "async")]
pub async fn collect_blocking<R, S, E, F>(producer: F) -> (Vec<R>, S, Result<(), E>)
where
    R: Clone + Send + 'static,
    S: Monoid + Clone + Send + 'static,
    E: Send + 'static,
    F: FnOnce(&CollectingSink<R, S>) -> Result<(), E> + Send + 'static,
{
    let sink = CollectingSink::new();
    let worker = sink.clone();

    let result = match tokio::task::spawn_blocking(move || producer(&worker)).await {
        Ok(result) => result,
        Err(err) => match err.try_into_panic() {
            Ok(payload) => std::panic::resume_unwind(payload),
            Err(err) => panic!("blocking producer did not complete: {}", err),
        },
    };

    finish(sink, result)
}
