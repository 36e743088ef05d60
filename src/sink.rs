//! The Sink capability: synchronously accept one event.
//!
//! A [`Sink`] is the consumer end of a stream. Producers call
//! [`Sink::send`] zero or more times, possibly from many threads at once,
//! so sinks take `&self` and use interior synchronization when they keep
//! state.
//!
//! Any closure taking `&Event` can be used as a sink through [`sink_fn`]:
//!
//! ```
//! use limitstream::{sink_fn, Event, ResultItem, Sink};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct Hit;
//! impl ResultItem for Hit {
//!     fn result_count(&self) -> usize { 1 }
//! }
//!
//! let seen = AtomicUsize::new(0);
//! let sink = sink_fn(|event: &Event<Hit>| {
//!     seen.fetch_add(event.results.len(), Ordering::Relaxed);
//! });
//!
//! sink.send(&Event::from_results(vec![Hit, Hit]));
//! assert_eq!(seen.load(Ordering::Relaxed), 2);
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use crate::event::Event;
use crate::stats::Stats;

/// A consumer of events.
///
/// `send` must not fail and must not mutate the event. It may be called
/// concurrently from any number of threads.
pub trait Sink<R, S = Stats> {
    /// Accept one event.
    fn send(&self, event: &Event<R, S>);
}

impl<R, S, T: Sink<R, S> + ?Sized> Sink<R, S> for &T {
    fn send(&self, event: &Event<R, S>) {
        (**self).send(event)
    }
}

impl<R, S, T: Sink<R, S> + ?Sized> Sink<R, S> for Box<T> {
    fn send(&self, event: &Event<R, S>) {
        (**self).send(event)
    }
}

impl<R, S, T: Sink<R, S> + ?Sized> Sink<R, S> for Arc<T> {
    fn send(&self, event: &Event<R, S>) {
        (**self).send(event)
    }
}

/// Adapts a function into a [`Sink`].
///
/// Created by [`sink_fn`].
pub struct SinkFn<F, R, S = Stats> {
    f: F,
    _phantom: PhantomData<fn(&Event<R, S>)>,
}

impl<F, R, S> std::fmt::Debug for SinkFn<F, R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkFn").field("f", &"<function>").finish()
    }
}

impl<F: Clone, R, S> Clone for SinkFn<F, R, S> {
    fn clone(&self) -> Self {
        SinkFn {
            f: self.f.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<F, R, S> Sink<R, S> for SinkFn<F, R, S>
where
    F: Fn(&Event<R, S>),
{
    fn send(&self, event: &Event<R, S>) {
        (self.f)(event)
    }
}

/// Use a function wherever a [`Sink`] is expected.
pub fn sink_fn<F, R, S>(f: F) -> SinkFn<F, R, S>
where
    F: Fn(&Event<R, S>),
{
    SinkFn {
        f,
        _phantom: PhantomData,
    }
}

/// A sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl<R, S> Sink<R, S> for Discard {
    fn send(&self, _event: &Event<R, S>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Line(&'static str);

    #[test]
    fn test_sink_fn_receives_event_unchanged() {
        let seen = Mutex::new(Vec::new());
        let sink = sink_fn(|event: &Event<Line>| {
            seen.lock().unwrap().push(event.clone());
        });

        let event = Event::from_results(vec![Line("a"), Line("b")]);
        sink.send(&event);

        assert_eq!(seen.into_inner().unwrap(), vec![event]);
    }

    #[test]
    fn test_boxed_dyn_sink() {
        let seen = Arc::new(Mutex::new(0));
        let seen_clone = Arc::clone(&seen);
        let sink: Box<dyn Sink<Line> + Send + Sync> = Box::new(sink_fn(move |e: &Event<Line>| {
            *seen_clone.lock().unwrap() += e.results.len();
        }));

        sink.send(&Event::from_results(vec![Line("x")]));
        sink.send(&Event::from_results(vec![Line("y"), Line("z")]));

        assert_eq!(*seen.lock().unwrap(), 3);
    }

    #[test]
    fn test_shared_sink_across_threads() {
        let seen = Mutex::new(0usize);
        let sink = sink_fn(|e: &Event<Line>| {
            *seen.lock().unwrap() += e.results.len();
        });

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..10 {
                        sink.send(&Event::from_results(vec![Line("hit")]));
                    }
                });
            }
        });

        assert_eq!(seen.into_inner().unwrap(), 40);
    }

    #[test]
    fn test_discard_accepts_anything() {
        Discard.send(&Event::<Line>::limit_hit());
    }
}
