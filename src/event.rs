//! Events: one unit of streamed data.
//!
//! An [`Event`] is a batch of result items plus a statistics summary. Events
//! are immutable once built; sinks receive them by reference and clone what
//! they need to keep.

use crate::semigroup::{Monoid, Semigroup};
use crate::stats::{Stats, StatsSummary};

/// A single item in a result batch.
///
/// The crate never inspects results beyond how many budget units they
/// account for. An item may stand for several logical results, for example a
/// file match carrying many line matches.
pub trait ResultItem {
    /// Number of budget units this item counts as.
    fn result_count(&self) -> usize;
}

impl<T: ResultItem + ?Sized> ResultItem for &T {
    fn result_count(&self) -> usize {
        (**self).result_count()
    }
}

impl<T: ResultItem + ?Sized> ResultItem for Box<T> {
    fn result_count(&self) -> usize {
        (**self).result_count()
    }
}

impl<T: ResultItem + ?Sized> ResultItem for std::sync::Arc<T> {
    fn result_count(&self) -> usize {
        (**self).result_count()
    }
}

/// A batch of results and the statistics that accompany it.
///
/// # Example
///
/// ```
/// use limitstream::{Event, ResultItem, Stats};
///
/// #[derive(Clone)]
/// struct FileMatch { lines: usize }
///
/// impl ResultItem for FileMatch {
///     fn result_count(&self) -> usize { self.lines }
/// }
///
/// let event: Event<FileMatch> = Event::from_results(vec![
///     FileMatch { lines: 2 },
///     FileMatch { lines: 3 },
/// ]);
/// assert_eq!(event.result_count(), 5);
/// assert!(!event.stats.is_limit_hit);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event<R, S = Stats> {
    /// Result items, in the order the producer found them.
    pub results: Vec<R>,
    /// Statistics accompanying this batch.
    pub stats: S,
}

impl<R, S> Event<R, S> {
    /// Create an event from results and statistics.
    pub fn new(results: Vec<R>, stats: S) -> Self {
        Event { results, stats }
    }

    /// Whether the event carries no results.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl<R: ResultItem, S> Event<R, S> {
    /// Total budget units of all results in this event.
    ///
    /// Saturates instead of overflowing.
    pub fn result_count(&self) -> usize {
        self.results
            .iter()
            .fold(0usize, |acc, r| acc.saturating_add(r.result_count()))
    }
}

impl<R, S: Monoid> Event<R, S> {
    /// An event with results and empty statistics.
    pub fn from_results(results: Vec<R>) -> Self {
        Event::new(results, S::empty())
    }
}

impl<R, S> Event<R, S> {
    /// A statistics-only event.
    pub fn from_stats(stats: S) -> Self {
        Event::new(Vec::new(), stats)
    }
}

impl<R, S: StatsSummary> Event<R, S> {
    /// The synthetic terminal event: no results, statistics flagged as
    /// limit hit.
    pub fn limit_hit() -> Self {
        Event::from_stats(S::limit_hit())
    }

    /// Whether this event carries the limit-hit flag.
    pub fn is_limit_hit(&self) -> bool {
        self.stats.is_limit_hit()
    }
}

impl<R, S: Monoid> Default for Event<R, S> {
    fn default() -> Self {
        Event::new(Vec::new(), S::empty())
    }
}

/// Results concatenate and statistics merge.
impl<R, S: Semigroup> Semigroup for Event<R, S> {
    fn combine(self, other: Self) -> Self {
        Event {
            results: self.results.combine(other.results),
            stats: self.stats.combine(other.stats),
        }
    }
}

impl<R, S: Monoid> Monoid for Event<R, S> {
    fn empty() -> Self {
        Event::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Batch(usize);

    impl ResultItem for Batch {
        fn result_count(&self) -> usize {
            self.0
        }
    }

    #[test]
    fn test_result_count_sums_items() {
        let event: Event<Batch> = Event::from_results(vec![Batch(1), Batch(4), Batch(0)]);
        assert_eq!(event.result_count(), 5);
    }

    #[test]
    fn test_result_count_saturates() {
        let event: Event<Batch> = Event::from_results(vec![Batch(usize::MAX), Batch(1)]);
        assert_eq!(event.result_count(), usize::MAX);
    }

    #[test]
    fn test_stats_only_event_counts_zero() {
        let event: Event<Batch> = Event::from_stats(Stats::default().with_excluded_forks(1));
        assert!(event.is_empty());
        assert_eq!(event.result_count(), 0);
    }

    #[test]
    fn test_limit_hit_event() {
        let event: Event<Batch> = Event::limit_hit();
        assert!(event.is_empty());
        assert!(event.is_limit_hit());
    }

    #[test]
    fn test_events_combine() {
        let a: Event<Batch> = Event::from_results(vec![Batch(1)]);
        let b: Event<Batch> = Event::new(vec![Batch(2)], Stats::limit_hit());

        let merged = a.combine(b);

        assert_eq!(merged.results, vec![Batch(1), Batch(2)]);
        assert!(merged.is_limit_hit());
    }

    #[test]
    fn test_shared_items_count_through_pointers() {
        let item = std::sync::Arc::new(Batch(3));
        let event: Event<std::sync::Arc<Batch>> = Event::from_results(vec![item.clone(), item]);
        assert_eq!(event.result_count(), 6);
    }
}
