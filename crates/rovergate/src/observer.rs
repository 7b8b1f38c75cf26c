//! Observation hooks fired at the gateway boundary.
//!
//! The gateway reports what happened (a join was attempted, a move finished,
//! a request failed) to an [`Observer`] and then carries on. Observers can't
//! change the outcome of a request: every hook returns `()`.
//!
//! Two implementations ship with the crate:
//! - [`TracingObserver`]: emits structured `tracing` events
//! - [`CountingObserver`]: keeps atomic counters you can read back

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rovergate_protocol::{ErrorKind, SessionId};

/// Receives boundary events from the [`Gateway`](crate::Gateway).
///
/// Every method has a no-op default, so an implementation only overrides
/// what it cares about. `Send + Sync` because all connection tasks share
/// one observer.
pub trait Observer: Send + Sync + 'static {
    /// A player asked to join `session_id`.
    fn join_attempted(&self, _session_id: &SessionId) {}

    /// A player was admitted to `session_id`.
    fn join_succeeded(&self, _session_id: &SessionId) {}

    /// A move finished successfully. `agent` is `"ground"` or `"aerial"`;
    /// `latency` covers token resolution through the simulation's answer.
    fn move_completed(&self, _agent: &'static str, _latency: Duration) {}

    /// An operator started `session_id`.
    fn session_started(&self, _session_id: &SessionId) {}

    /// A request failed with `kind`.
    fn request_failed(&self, _kind: ErrorKind) {}
}

impl<O: Observer> Observer for Arc<O> {
    fn join_attempted(&self, session_id: &SessionId) {
        (**self).join_attempted(session_id);
    }

    fn join_succeeded(&self, session_id: &SessionId) {
        (**self).join_succeeded(session_id);
    }

    fn move_completed(&self, agent: &'static str, latency: Duration) {
        (**self).move_completed(agent, latency);
    }

    fn session_started(&self, session_id: &SessionId) {
        (**self).session_started(session_id);
    }

    fn request_failed(&self, kind: ErrorKind) {
        (**self).request_failed(kind);
    }
}

// ---------------------------------------------------------------------------
// TracingObserver
// ---------------------------------------------------------------------------

/// Emits one `tracing` event per hook under the `rovergate::observe` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn join_attempted(&self, session_id: &SessionId) {
        tracing::debug!(target: "rovergate::observe", %session_id, "join attempted");
    }

    fn join_succeeded(&self, session_id: &SessionId) {
        tracing::debug!(target: "rovergate::observe", %session_id, "join succeeded");
    }

    fn move_completed(&self, agent: &'static str, latency: Duration) {
        tracing::debug!(
            target: "rovergate::observe",
            agent,
            latency_us = latency.as_micros() as u64,
            "move completed"
        );
    }

    fn session_started(&self, session_id: &SessionId) {
        tracing::info!(target: "rovergate::observe", %session_id, "session started");
    }

    fn request_failed(&self, kind: ErrorKind) {
        tracing::debug!(
            target: "rovergate::observe",
            %kind,
            code = kind.code(),
            "request failed"
        );
    }
}

// ---------------------------------------------------------------------------
// CountingObserver
// ---------------------------------------------------------------------------

/// A point-in-time copy of a [`CountingObserver`]'s counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObservedCounts {
    pub join_attempts: u64,
    pub join_successes: u64,
    pub moves: u64,
    /// Sum of every completed move's latency, in microseconds.
    pub move_latency_us: u64,
    pub sessions_started: u64,
    pub errors: u64,
}

/// Counts boundary events with relaxed atomics.
///
/// Share it as `Arc<CountingObserver>` to keep reading the counters while
/// the gateway owns its copy.
#[derive(Debug, Default)]
pub struct CountingObserver {
    join_attempts: AtomicU64,
    join_successes: AtomicU64,
    moves: AtomicU64,
    move_latency_us: AtomicU64,
    sessions_started: AtomicU64,
    errors: AtomicU64,
}

impl CountingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every counter.
    pub fn counts(&self) -> ObservedCounts {
        ObservedCounts {
            join_attempts: self.join_attempts.load(Ordering::Relaxed),
            join_successes: self.join_successes.load(Ordering::Relaxed),
            moves: self.moves.load(Ordering::Relaxed),
            move_latency_us: self.move_latency_us.load(Ordering::Relaxed),
            sessions_started: self.sessions_started.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

impl Observer for CountingObserver {
    fn join_attempted(&self, _session_id: &SessionId) {
        self.join_attempts.fetch_add(1, Ordering::Relaxed);
    }

    fn join_succeeded(&self, _session_id: &SessionId) {
        self.join_successes.fetch_add(1, Ordering::Relaxed);
    }

    fn move_completed(&self, _agent: &'static str, latency: Duration) {
        self.moves.fetch_add(1, Ordering::Relaxed);
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        self.move_latency_us.fetch_add(micros, Ordering::Relaxed);
    }

    fn session_started(&self, _session_id: &SessionId) {
        self.sessions_started.fetch_add(1, Ordering::Relaxed);
    }

    fn request_failed(&self, _kind: ErrorKind) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_observer_starts_at_zero() {
        assert_eq!(CountingObserver::new().counts(), ObservedCounts::default());
    }

    #[test]
    fn test_counting_observer_counts_each_hook() {
        let observer = CountingObserver::new();
        let session = SessionId::new("mars-1");

        observer.join_attempted(&session);
        observer.join_attempted(&session);
        observer.join_succeeded(&session);
        observer.move_completed("ground", Duration::from_micros(40));
        observer.move_completed("aerial", Duration::from_micros(2));
        observer.session_started(&session);
        observer.request_failed(ErrorKind::UnknownToken);

        assert_eq!(
            observer.counts(),
            ObservedCounts {
                join_attempts: 2,
                join_successes: 1,
                moves: 2,
                move_latency_us: 42,
                sessions_started: 1,
                errors: 1,
            }
        );
    }

    #[test]
    fn test_arc_observer_forwards_to_inner() {
        let inner = Arc::new(CountingObserver::new());
        let shared: Arc<CountingObserver> = Arc::clone(&inner);

        shared.request_failed(ErrorKind::WrongState);

        assert_eq!(inner.counts().errors, 1);
    }
}
