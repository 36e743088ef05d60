//! Testing utilities for code that produces or consumes event streams
//!
//! This module provides a recording sink that keeps every event it receives,
//! plus assertion macros for the limit-hit signal.
//!
//! # Examples
//!
//! ## RecordingSink
//!
//! ```rust
//! use limitstream::testing::RecordingSink;
//! use limitstream::{with_limit, Event, ResultItem, Scope, Sink};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Hit;
//! impl ResultItem for Hit {
//!     fn result_count(&self) -> usize { 1 }
//! }
//!
//! let recorder = RecordingSink::<Hit>::new();
//! let (_scope, sink, _release) = with_limit(&Scope::new(), &recorder, 1);
//!
//! sink.send(&Event::from_results(vec![Hit, Hit]));
//!
//! assert_eq!(recorder.results(), vec![Hit, Hit]);
//! assert_eq!(recorder.limit_hits(), 1);
//! ```
//!
//! ## Assertion Macros
//!
//! ```rust
//! use limitstream::testing::RecordingSink;
//! use limitstream::{assert_limit_hit, assert_no_limit_hit, Event, ResultItem, Sink};
//!
//! #[derive(Debug, Clone)]
//! struct Hit;
//! impl ResultItem for Hit {
//!     fn result_count(&self) -> usize { 1 }
//! }
//!
//! let recorder = RecordingSink::<Hit>::new();
//! recorder.send(&Event::from_results(vec![Hit]));
//! assert_no_limit_hit!(recorder);
//!
//! recorder.send(&Event::limit_hit());
//! assert_limit_hit!(recorder);
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::event::Event;
use crate::sink::Sink;
use crate::stats::{Stats, StatsSummary};

/// A sink that records a copy of every event it receives, in arrival order.
///
/// Safe to share between producer threads.
#[derive(Debug)]
pub struct RecordingSink<R, S = Stats> {
    events: Mutex<Vec<Event<R, S>>>,
}

impl<R, S> RecordingSink<R, S> {
    /// Create an empty recorder.
    pub fn new() -> Self {
        RecordingSink {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Number of events received, including limit-hit events.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no event has been received.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Take all recorded events, leaving the recorder empty.
    pub fn take(&self) -> Vec<Event<R, S>> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Event<R, S>>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R: Clone, S: Clone> RecordingSink<R, S> {
    /// A copy of every event received so far.
    pub fn events(&self) -> Vec<Event<R, S>> {
        self.lock().clone()
    }

    /// All result items received so far, flattened in arrival order.
    pub fn results(&self) -> Vec<R> {
        self.lock()
            .iter()
            .flat_map(|event| event.results.iter().cloned())
            .collect()
    }
}

impl<R, S: StatsSummary> RecordingSink<R, S> {
    /// Number of limit-hit events received.
    pub fn limit_hits(&self) -> usize {
        self.lock()
            .iter()
            .filter(|event| event.stats.is_limit_hit())
            .count()
    }
}

impl<R, S> Default for RecordingSink<R, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Clone, S: Clone> Sink<R, S> for RecordingSink<R, S> {
    fn send(&self, event: &Event<R, S>) {
        self.lock().push(event.clone());
    }
}

/// Assert that a [`RecordingSink`] received at least one limit-hit event.
///
/// # Example
///
/// ```rust
/// use limitstream::testing::RecordingSink;
/// use limitstream::{assert_limit_hit, Event, Sink};
///
/// let recorder = RecordingSink::<u32>::new();
/// recorder.send(&Event::limit_hit());
/// assert_limit_hit!(recorder);
/// ```
#[macro_export]
macro_rules! assert_limit_hit {
    ($recorder:expr) => {
        match $recorder.limit_hits() {
            0 => panic!(
                "Expected a limit-hit event, got none in {} events",
                $recorder.len()
            ),
            _ => {}
        }
    };
}

/// Assert that a [`RecordingSink`] received no limit-hit event.
///
/// # Example
///
/// ```rust
/// use limitstream::testing::RecordingSink;
/// use limitstream::assert_no_limit_hit;
///
/// let recorder = RecordingSink::<u32>::new();
/// assert_no_limit_hit!(recorder);
/// ```
#[macro_export]
macro_rules! assert_no_limit_hit {
    ($recorder:expr) => {
        match $recorder.limit_hits() {
            0 => {}
            n => panic!("Expected no limit-hit event, got {}", n),
        }
    };
}
