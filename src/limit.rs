//! Limiting sink: forward everything, cancel the producer past a budget.
//!
//! [`with_limit`] wraps a downstream [`Sink`] in a [`LimitSink`] bound to a
//! child [`Scope`]. Every event is forwarded unchanged. Once more than
//! `limit` results (by [`ResultItem::result_count`]) have passed through,
//! the limiting sink forwards one synthetic event flagged as limit hit and
//! cancels the child scope so the producer can stop.
//!
//! # Duplicate limit-hit events
//!
//! The budget is a single atomic counter. The "crossed zero" check reads the
//! counter and then subtracts from it in two steps, so sends racing on
//! different threads can each see the crossing and each emit a limit-hit
//! event and cancel the scope. Downstream sinks must treat a repeated
//! limit-hit event as a no-op; merging [`Stats`](crate::Stats) does so
//! already. Cancelling twice is harmless. On a single thread the event is
//! emitted exactly once.
//!
//! # Example
//!
//! ```
//! use limitstream::{sink_fn, with_limit, Event, ResultItem, Scope, Sink};
//! use std::sync::Mutex;
//!
//! #[derive(Clone)]
//! struct Hit;
//! impl ResultItem for Hit {
//!     fn result_count(&self) -> usize { 1 }
//! }
//!
//! let seen = Mutex::new(Vec::new());
//! let downstream = sink_fn(|e: &Event<Hit>| seen.lock().unwrap().push(e.is_limit_hit()));
//!
//! let root = Scope::new();
//! let (scope, sink, _release) = with_limit(&root, &downstream, 1);
//!
//! sink.send(&Event::from_results(vec![Hit]));
//! assert!(!scope.is_cancelled());
//!
//! sink.send(&Event::from_results(vec![Hit]));
//! assert!(scope.is_cancelled());
//!
//! // Two forwarded events, then the limit-hit signal.
//! assert_eq!(*seen.lock().unwrap(), vec![false, false, true]);
//! ```

use std::marker::PhantomData;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::event::{Event, ResultItem};
use crate::scope::{ReleaseGuard, Scope};
use crate::sink::Sink;
use crate::stats::{Stats, StatsSummary};

/// A [`Sink`] that forwards events and enforces a cumulative result budget.
///
/// Created by [`with_limit`]. Lives for one bounded stream operation.
pub struct LimitSink<D, R, S = Stats> {
    downstream: D,
    scope: Scope,
    limit: usize,
    remaining: AtomicI64,
    _phantom: PhantomData<fn(&Event<R, S>)>,
}

impl<D, R, S> std::fmt::Debug for LimitSink<D, R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LimitSink")
            .field("downstream", &"<sink>")
            .field("limit", &self.limit)
            .field("remaining", &self.remaining())
            .field("cancelled", &self.scope.is_cancelled())
            .finish()
    }
}

impl<D, R, S> LimitSink<D, R, S> {
    /// Budget still available. Negative once the limit has been exceeded.
    pub fn remaining(&self) -> i64 {
        self.remaining.load(Ordering::SeqCst)
    }

    /// The configured limit.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Whether more than `limit` results have been sent.
    pub fn is_limit_hit(&self) -> bool {
        self.remaining() < 0
    }

    /// The scope this sink cancels when the limit trips.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// The wrapped sink.
    pub fn downstream(&self) -> &D {
        &self.downstream
    }
}

impl<D, R, S> Sink<R, S> for LimitSink<D, R, S>
where
    D: Sink<R, S>,
    R: ResultItem,
    S: StatsSummary,
{
    fn send(&self, event: &Event<R, S>) {
        self.downstream.send(event);

        let count = clamp_count(event.result_count());

        // Stats-only events never spend budget, so they never re-signal.
        if count == 0 {
            return;
        }

        let old = self.remaining.load(Ordering::SeqCst);

        // Far past the limit the counter stops moving so it cannot wrap.
        if old < FLOOR {
            return;
        }

        let now = self
            .remaining
            .fetch_sub(count, Ordering::SeqCst)
            .wrapping_sub(count);

        if old >= 0 && now < 0 {
            #[cfg(feature = "tracing")]
            tracing::debug!(limit = self.limit, remaining = now, "result limit hit");

            self.downstream.send(&Event::limit_hit());
            self.scope.cancel();
        }
    }
}

// Largest amount a single send subtracts. Together with FLOOR this keeps
// `old - count` inside i64 for any counter value that still gets updated.
const MAX_COUNT: i64 = i64::MAX / 2;

// Below this the limit has long tripped and the counter is left alone.
const FLOOR: i64 = i64::MIN / 2;

fn clamp_count(count: usize) -> i64 {
    i64::try_from(count).map_or(MAX_COUNT, |count| count.min(MAX_COUNT))
}

fn clamp_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Wrap `downstream` in a sink that cancels a child of `parent` once more
/// than `limit` results have been sent through it.
///
/// Returns the child scope to hand to the producer, the limiting sink, and
/// a guard that releases the child scope when dropped. Keep the guard alive
/// for as long as the producer runs, whether or not the limit fires.
///
/// A `limit` of zero means the first event carrying any result trips the
/// limit.
///
/// ```
/// use limitstream::{with_limit, Discard, Event, ResultItem, Scope, Sink};
///
/// struct Hit;
/// impl ResultItem for Hit {
///     fn result_count(&self) -> usize { 1 }
/// }
///
/// let (scope, sink, release) = with_limit(&Scope::new(), Discard, 0);
/// sink.send(&Event::<Hit>::from_results(vec![Hit]));
/// assert!(scope.is_cancelled());
/// release.release();
/// ```
pub fn with_limit<D, R, S>(
    parent: &Scope,
    downstream: D,
    limit: usize,
) -> (Scope, LimitSink<D, R, S>, ReleaseGuard)
where
    D: Sink<R, S>,
{
    let (scope, release) = parent.child();
    let sink = LimitSink {
        downstream,
        scope: scope.clone(),
        limit,
        remaining: AtomicI64::new(clamp_limit(limit)),
        _phantom: PhantomData,
    };
    (scope, sink, release)
}
