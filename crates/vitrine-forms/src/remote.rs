#![forbid(unsafe_code)]

//! Request-lifecycle management for the remote redemption-code check.
//!
//! Nothing here performs I/O. The caller's HTTP layer runs the actual
//! `GET /validate?product_id&secret_code` request; this module supplies
//! the surrounding discipline:
//!
//! - [`RemoteCheckCoordinator`] issues a monotonic [`CheckToken`] per input
//!   change, supersedes in-flight checks, and discards stale results. Every
//!   transition lands in a [`CheckTrace`] whose checksum is stable for a
//!   fixed operation sequence, so regressions show up in tests.
//! - [`Debouncer`] gates the check behind a quiet period, driven by an
//!   explicit `now: Instant` so tests control the clock.
//! - [`CodeCache`] remembers recent backend verdicts per
//!   `(product_id, code)` with a TTL and a bounded capacity.

use std::collections::VecDeque;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// CheckToken
// ---------------------------------------------------------------------------

/// A monotonically increasing token identifying one remote-check request.
///
/// Tokens detect staleness: a result computed for an older token than the
/// coordinator's current one is discarded, never applied. Token 0 is
/// reserved for "no check yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CheckToken(u64);

impl CheckToken {
    /// The null token representing no check.
    pub const NONE: Self = Self(0);

    /// Create a token from a raw value (for tests).
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw token value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Check if this is the null token.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl Default for CheckToken {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for CheckToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// CheckOutcome
// ---------------------------------------------------------------------------

/// The backend's verdict for a redemption code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckOutcome {
    /// The code is valid for the product.
    Accepted,
    /// The code was rejected.
    Rejected,
}

impl CheckOutcome {
    /// Returns `true` for [`Accepted`](Self::Accepted).
    #[must_use]
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

// ---------------------------------------------------------------------------
// CheckEvent / CheckTrace
// ---------------------------------------------------------------------------

/// An event in the remote-check lifecycle, recorded for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckEvent {
    /// A check was started for a token.
    Started {
        /// The issued token.
        token: CheckToken,
    },
    /// An in-flight check was superseded by newer input.
    Superseded {
        /// The stale token.
        token: CheckToken,
        /// The newer token that replaced it.
        by: CheckToken,
    },
    /// A result arrived for a token (applied or not).
    Completed {
        /// The token the result was computed for.
        token: CheckToken,
        /// The backend's verdict.
        outcome: CheckOutcome,
    },
    /// A result was applied as the current verdict.
    Applied {
        /// The applied token.
        token: CheckToken,
        /// The applied verdict.
        outcome: CheckOutcome,
    },
    /// A result was discarded as stale.
    StaleDiscarded {
        /// The stale token.
        token: CheckToken,
        /// The coordinator's current token at arrival.
        current: CheckToken,
    },
}

impl CheckEvent {
    /// The token this event concerns.
    #[must_use]
    pub fn token(&self) -> CheckToken {
        match self {
            Self::Started { token }
            | Self::Superseded { token, .. }
            | Self::Completed { token, .. }
            | Self::Applied { token, .. }
            | Self::StaleDiscarded { token, .. } => *token,
        }
    }

    /// The event type name for logging.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::Superseded { .. } => "superseded",
            Self::Completed { .. } => "completed",
            Self::Applied { .. } => "applied",
            Self::StaleDiscarded { .. } => "stale_discarded",
        }
    }
}

/// A trace of lifecycle events for debugging and regression tests.
#[derive(Debug, Clone, Default)]
pub struct CheckTrace {
    events: Vec<CheckEvent>,
}

impl CheckTrace {
    /// Create a new empty trace.
    #[must_use]
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the trace.
    pub fn push(&mut self, event: CheckEvent) {
        self.events.push(event);
    }

    /// All events in arrival order.
    #[must_use]
    pub fn events(&self) -> &[CheckEvent] {
        &self.events
    }

    /// Whether the trace holds an event of `event_type` for `token`.
    #[must_use]
    pub fn contains_event_type(&self, token: CheckToken, event_type: &str) -> bool {
        self.events
            .iter()
            .any(|e| e.token() == token && e.event_type() == event_type)
    }

    /// Checksum of all event data and ordering, for golden comparison.
    #[must_use]
    pub fn checksum(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for event in &self.events {
            event.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the trace is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clear all events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

// ---------------------------------------------------------------------------
// RemoteCheckCoordinator
// ---------------------------------------------------------------------------

/// Coordinates remote checks with token-based staleness prevention.
///
/// One coordinator per code field. Each input change calls
/// [`begin_check`](Self::begin_check); the transport reports back through
/// [`try_apply`](Self::try_apply) with the token it was handed, and only a
/// result for the current token becomes the applied verdict.
#[derive(Debug, Default)]
pub struct RemoteCheckCoordinator {
    next_token: u64,
    current: CheckToken,
    in_flight: Vec<CheckToken>,
    trace: CheckTrace,
    applied: Option<CheckOutcome>,
}

impl RemoteCheckCoordinator {
    /// Create a new coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_token: 1,
            ..Self::default()
        }
    }

    /// Start a new check, superseding any in-flight ones.
    ///
    /// Returns the token the transport must echo back with its result.
    pub fn begin_check(&mut self) -> CheckToken {
        self.next_token = self.next_token.max(1);
        let token = CheckToken(self.next_token);
        self.next_token += 1;

        for stale in self.in_flight.drain(..) {
            #[cfg(feature = "tracing")]
            tracing::trace!(stale = %stale, by = %token, "remote check superseded");
            self.trace.push(CheckEvent::Superseded { token: stale, by: token });
        }

        self.in_flight.push(token);
        self.current = token;
        #[cfg(feature = "tracing")]
        tracing::trace!(%token, "remote check started");
        self.trace.push(CheckEvent::Started { token });
        token
    }

    /// The most recently issued token.
    #[must_use]
    pub fn current_token(&self) -> CheckToken {
        self.current
    }

    /// Report a result for `token`.
    ///
    /// Returns `true` if the result became the applied verdict, `false`
    /// if it was discarded as stale.
    pub fn try_apply(&mut self, token: CheckToken, outcome: CheckOutcome) -> bool {
        self.trace.push(CheckEvent::Completed { token, outcome });
        self.in_flight.retain(|&t| t != token);

        if token < self.current {
            #[cfg(feature = "tracing")]
            tracing::trace!(%token, current = %self.current, "stale remote result discarded");
            self.trace.push(CheckEvent::StaleDiscarded {
                token,
                current: self.current,
            });
            return false;
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(%token, ?outcome, "remote result applied");
        self.applied = Some(outcome);
        self.trace.push(CheckEvent::Applied { token, outcome });
        true
    }

    /// The currently applied verdict, if any.
    #[must_use]
    pub fn applied_outcome(&self) -> Option<CheckOutcome> {
        self.applied
    }

    /// Forget the applied verdict (input cleared).
    pub fn reset_outcome(&mut self) {
        self.applied = None;
    }

    /// Number of checks awaiting a result.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Whether any check is awaiting a result.
    #[must_use]
    pub fn has_in_flight(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// The lifecycle trace.
    #[must_use]
    pub fn trace(&self) -> &CheckTrace {
        &self.trace
    }

    /// Clear the trace (for reuse).
    pub fn clear_trace(&mut self) {
        self.trace.clear();
    }
}

// ---------------------------------------------------------------------------
// Debouncer
// ---------------------------------------------------------------------------

/// Quiet-period gate for scheduling the remote check.
///
/// Every keystroke calls [`record_input`](Self::record_input); the caller
/// polls with its clock, and [`poll`](Self::poll) fires exactly once when
/// the quiet period has passed with no newer input.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period.
    #[must_use]
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Record an input change at `now`, restarting the quiet period.
    pub fn record_input(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    /// Returns `true` once the quiet period has elapsed, then re-arms off.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Whether a fire is pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Cancel any pending fire.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

// ---------------------------------------------------------------------------
// CodeCache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct CacheEntry {
    product_id: String,
    code: String,
    outcome: CheckOutcome,
    inserted_at: Instant,
}

/// TTL cache of backend verdicts keyed by `(product_id, code)`.
///
/// Bounded capacity with oldest-insertion eviction; expiry is checked
/// against the explicit `now` passed by the caller.
#[derive(Debug, Clone)]
pub struct CodeCache {
    ttl: Duration,
    capacity: usize,
    entries: VecDeque<CacheEntry>,
}

impl CodeCache {
    /// Create a cache with the given TTL and capacity.
    #[must_use]
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            entries: VecDeque::new(),
        }
    }

    /// Store a verdict, replacing any entry for the same key.
    ///
    /// A zero-capacity cache stores nothing.
    pub fn insert(&mut self, product_id: &str, code: &str, outcome: CheckOutcome, now: Instant) {
        if self.capacity == 0 {
            return;
        }
        self.entries
            .retain(|e| !(e.product_id == product_id && e.code == code));
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(CacheEntry {
            product_id: product_id.to_string(),
            code: code.to_string(),
            outcome,
            inserted_at: now,
        });
    }

    /// Look up a fresh verdict; entries at or past the TTL are misses.
    #[must_use]
    pub fn get(&self, product_id: &str, code: &str, now: Instant) -> Option<CheckOutcome> {
        self.entries
            .iter()
            .find(|e| e.product_id == product_id && e.code == code)
            .filter(|e| now.duration_since(e.inserted_at) < self.ttl)
            .map(|e| e.outcome)
    }

    /// Drop every expired entry.
    pub fn purge_expired(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.entries
            .retain(|e| now.duration_since(e.inserted_at) < ttl);
    }

    /// Number of stored entries, including not-yet-purged expired ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// RemoteCheckConfig
// ---------------------------------------------------------------------------

/// Tunables for the remote-check lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteCheckConfig {
    /// Quiet period before a check is scheduled.
    pub debounce: Duration,
    /// How long a cached verdict stays fresh.
    pub cache_ttl: Duration,
    /// Maximum cached verdicts.
    pub cache_capacity: usize,
}

impl Default for RemoteCheckConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            cache_ttl: Duration::from_secs(30),
            cache_capacity: 32,
        }
    }
}

impl RemoteCheckConfig {
    /// Set the debounce quiet period.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the cache TTL.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set the cache capacity.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Build the debouncer this config describes.
    #[must_use]
    pub fn debouncer(&self) -> Debouncer {
        Debouncer::new(self.debounce)
    }

    /// Build the cache this config describes.
    #[must_use]
    pub fn cache(&self) -> CodeCache {
        CodeCache::new(self.cache_ttl, self.cache_capacity)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- CheckToken tests --

    #[test]
    fn token_none_is_zero() {
        assert_eq!(CheckToken::NONE.raw(), 0);
        assert!(CheckToken::NONE.is_none());
        assert!(!CheckToken::from_raw(1).is_none());
    }

    #[test]
    fn token_ordering() {
        assert!(CheckToken::from_raw(1) < CheckToken::from_raw(2));
        assert_eq!(format!("{}", CheckToken::from_raw(7)), "Token(7)");
    }

    // -- Coordinator tests --

    #[test]
    fn tokens_strictly_increase() {
        let mut coord = RemoteCheckCoordinator::new();
        let tokens: Vec<CheckToken> = (0..10).map(|_| coord.begin_check()).collect();
        for pair in tokens.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn initial_state() {
        let coord = RemoteCheckCoordinator::new();
        assert_eq!(coord.current_token(), CheckToken::NONE);
        assert!(coord.applied_outcome().is_none());
        assert!(!coord.has_in_flight());
    }

    #[test]
    fn stale_result_never_applies() {
        let mut coord = RemoteCheckCoordinator::new();
        let t1 = coord.begin_check();
        let t2 = coord.begin_check();

        assert!(!coord.try_apply(t1, CheckOutcome::Accepted));
        assert!(coord.applied_outcome().is_none());
        assert!(coord.trace().contains_event_type(t1, "stale_discarded"));

        assert!(coord.try_apply(t2, CheckOutcome::Rejected));
        assert_eq!(coord.applied_outcome(), Some(CheckOutcome::Rejected));
    }

    #[test]
    fn supersede_recorded_in_trace() {
        let mut coord = RemoteCheckCoordinator::new();
        let t1 = coord.begin_check();
        let _t2 = coord.begin_check();
        assert!(coord.trace().contains_event_type(t1, "superseded"));
        assert_eq!(coord.in_flight_count(), 1);
    }

    #[test]
    fn apply_clears_in_flight() {
        let mut coord = RemoteCheckCoordinator::new();
        let token = coord.begin_check();
        assert_eq!(coord.in_flight_count(), 1);
        coord.try_apply(token, CheckOutcome::Accepted);
        assert_eq!(coord.in_flight_count(), 0);
        assert!(coord.trace().contains_event_type(token, "applied"));
    }

    #[test]
    fn reset_outcome_forgets_verdict() {
        let mut coord = RemoteCheckCoordinator::new();
        let token = coord.begin_check();
        coord.try_apply(token, CheckOutcome::Accepted);
        coord.reset_outcome();
        assert!(coord.applied_outcome().is_none());
    }

    #[test]
    fn trace_checksum_stable_for_fixed_sequence() {
        let run = || {
            let mut coord = RemoteCheckCoordinator::new();
            let t1 = coord.begin_check();
            let t2 = coord.begin_check();
            coord.try_apply(t1, CheckOutcome::Accepted);
            coord.try_apply(t2, CheckOutcome::Rejected);
            coord.trace().checksum()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn trace_checksum_differs_for_different_sequences() {
        let mut a = RemoteCheckCoordinator::new();
        let ta = a.begin_check();
        a.try_apply(ta, CheckOutcome::Accepted);

        let mut b = RemoteCheckCoordinator::new();
        let tb = b.begin_check();
        b.try_apply(tb, CheckOutcome::Rejected);

        assert_ne!(a.trace().checksum(), b.trace().checksum());
    }

    // -- Debouncer tests --

    #[test]
    fn debouncer_fires_once_after_quiet_period() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let start = Instant::now();

        debouncer.record_input(start);
        assert!(!debouncer.poll(start + Duration::from_millis(100)));
        assert!(debouncer.poll(start + Duration::from_millis(300)));
        assert!(!debouncer.poll(start + Duration::from_millis(400)), "fires once");
    }

    #[test]
    fn debouncer_restarts_on_new_input() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let start = Instant::now();

        debouncer.record_input(start);
        debouncer.record_input(start + Duration::from_millis(200));
        assert!(!debouncer.poll(start + Duration::from_millis(300)));
        assert!(debouncer.poll(start + Duration::from_millis(500)));
    }

    #[test]
    fn debouncer_cancel() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        let start = Instant::now();
        debouncer.record_input(start);
        assert!(debouncer.is_pending());
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert!(!debouncer.poll(start + Duration::from_secs(1)));
    }

    // -- CodeCache tests --

    #[test]
    fn cache_hit_within_ttl() {
        let mut cache = CodeCache::new(Duration::from_secs(30), 4);
        let now = Instant::now();
        cache.insert("p1", "CODE", CheckOutcome::Accepted, now);

        let later = now + Duration::from_secs(29);
        assert_eq!(cache.get("p1", "CODE", later), Some(CheckOutcome::Accepted));
        assert_eq!(cache.get("p1", "OTHER", later), None);
        assert_eq!(cache.get("p2", "CODE", later), None);
    }

    #[test]
    fn cache_expires_at_ttl_boundary() {
        let mut cache = CodeCache::new(Duration::from_secs(30), 4);
        let now = Instant::now();
        cache.insert("p1", "CODE", CheckOutcome::Accepted, now);
        assert_eq!(cache.get("p1", "CODE", now + Duration::from_secs(30)), None);
    }

    #[test]
    fn cache_evicts_oldest_at_capacity() {
        let mut cache = CodeCache::new(Duration::from_secs(30), 2);
        let now = Instant::now();
        cache.insert("p", "a", CheckOutcome::Accepted, now);
        cache.insert("p", "b", CheckOutcome::Rejected, now);
        cache.insert("p", "c", CheckOutcome::Accepted, now);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("p", "a", now), None, "oldest evicted");
        assert!(cache.get("p", "b", now).is_some());
        assert!(cache.get("p", "c", now).is_some());
    }

    #[test]
    fn cache_replaces_same_key() {
        let mut cache = CodeCache::new(Duration::from_secs(30), 4);
        let now = Instant::now();
        cache.insert("p", "a", CheckOutcome::Rejected, now);
        cache.insert("p", "a", CheckOutcome::Accepted, now + Duration::from_secs(1));
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get("p", "a", now + Duration::from_secs(2)),
            Some(CheckOutcome::Accepted)
        );
    }

    #[test]
    fn cache_zero_capacity_stores_nothing() {
        let mut cache = CodeCache::new(Duration::from_secs(30), 0);
        let now = Instant::now();
        cache.insert("p", "a", CheckOutcome::Accepted, now);
        assert!(cache.is_empty());
        assert_eq!(cache.get("p", "a", now), None);
    }

    #[test]
    fn cache_purge_expired() {
        let mut cache = CodeCache::new(Duration::from_secs(10), 4);
        let now = Instant::now();
        cache.insert("p", "a", CheckOutcome::Accepted, now);
        cache.insert("p", "b", CheckOutcome::Accepted, now + Duration::from_secs(8));

        cache.purge_expired(now + Duration::from_secs(12));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("p", "b", now + Duration::from_secs(12)).is_some());
    }

    // -- Config tests --

    #[test]
    fn config_defaults_and_builders() {
        let config = RemoteCheckConfig::default();
        assert_eq!(config.debounce, Duration::from_millis(300));
        assert_eq!(config.cache_ttl, Duration::from_secs(30));
        assert_eq!(config.cache_capacity, 32);

        let custom = RemoteCheckConfig::default()
            .with_debounce(Duration::from_millis(150))
            .with_cache_ttl(Duration::from_secs(5))
            .with_cache_capacity(8);
        assert_eq!(custom.debounce, Duration::from_millis(150));
        assert_eq!(custom.cache_ttl, Duration::from_secs(5));
        assert_eq!(custom.cache_capacity, 8);
    }

    #[test]
    fn config_builds_components() {
        let config = RemoteCheckConfig::default().with_debounce(Duration::from_millis(50));
        let mut debouncer = config.debouncer();
        let start = Instant::now();
        debouncer.record_input(start);
        assert!(debouncer.poll(start + Duration::from_millis(50)));

        let cache = config.cache();
        assert!(cache.is_empty());
    }
}
