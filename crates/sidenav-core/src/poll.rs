//! Bounded polling for an external identity.
//!
//! Pages link to the cloud console with the visitor's analytics id attached
//! once the analytics script has loaded. The script may load late or never,
//! so the lookup is retried a fixed number of times at a fixed interval and
//! then given up. [`BoundedPoll`] owns that schedule; [`CloudUrl`] applies it.

use std::time::{Duration, Instant};

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

/// Default number of lookup attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay between lookup attempts.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(200);

/// Source of the visitor's analytics distinct id.
pub trait IdentityProvider {
    /// Distinct id, or `None` if the analytics client is not available yet.
    fn distinct_id(&self) -> Option<String>;
}

impl<F> IdentityProvider for F
where
    F: Fn() -> Option<String>,
{
    fn distinct_id(&self) -> Option<String> {
        self()
    }
}

/// Outcome of a poll step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollStatus<T> {
    /// Not due yet, or the attempt found nothing and more remain.
    Pending,
    /// The lookup succeeded.
    Resolved(T),
    /// An earlier attempt already succeeded.
    Done,
    /// All attempts were used without success.
    Exhausted,
    /// Polling was cancelled.
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PollPhase {
    Running,
    Resolved,
    Exhausted,
    Cancelled,
}

/// Fixed-interval retry schedule with a maximum number of attempts.
#[derive(Debug)]
pub struct BoundedPoll {
    max_attempts: u32,
    interval: Duration,
    attempts: u32,
    next_due: Instant,
    phase: PollPhase,
}

impl BoundedPoll {
    /// Start a schedule whose first attempt is due one interval after `start`.
    #[must_use]
    pub fn new(max_attempts: u32, interval: Duration, start: Instant) -> Self {
        Self {
            max_attempts,
            interval,
            attempts: 0,
            next_due: start + interval,
            phase: if max_attempts == 0 {
                PollPhase::Exhausted
            } else {
                PollPhase::Running
            },
        }
    }

    /// Number of attempts made so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// When the next attempt is due, if polling is still running.
    #[must_use]
    pub fn next_due(&self) -> Option<Instant> {
        (self.phase == PollPhase::Running).then_some(self.next_due)
    }

    /// Whether polling has stopped for any reason.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase != PollPhase::Running
    }

    /// Stop polling; later calls to [`poll`](Self::poll) report [`PollStatus::Cancelled`].
    pub fn cancel(&mut self) {
        if self.phase == PollPhase::Running {
            self.phase = PollPhase::Cancelled;
        }
    }

    /// Run the lookup if an attempt is due at `now`.
    pub fn poll<T, F>(&mut self, now: Instant, lookup: F) -> PollStatus<T>
    where
        F: FnOnce() -> Option<T>,
    {
        match self.phase {
            PollPhase::Running => {}
            PollPhase::Resolved => return PollStatus::Done,
            PollPhase::Exhausted => return PollStatus::Exhausted,
            PollPhase::Cancelled => return PollStatus::Cancelled,
        }
        if now < self.next_due {
            return PollStatus::Pending;
        }

        self.attempts += 1;
        self.next_due = now + self.interval;

        if let Some(value) = lookup() {
            self.phase = PollPhase::Resolved;
            tracing::debug!(attempts = self.attempts, "Identity lookup succeeded");
            return PollStatus::Resolved(value);
        }
        if self.attempts >= self.max_attempts {
            self.phase = PollPhase::Exhausted;
            tracing::debug!(attempts = self.attempts, "Identity lookup gave up");
            return PollStatus::Exhausted;
        }
        PollStatus::Pending
    }
}

/// Cloud console URL, tagged with the visitor's analytics id once known.
#[derive(Debug)]
pub struct CloudUrl {
    base: String,
    resolved: Option<String>,
    poll: BoundedPoll,
}

impl CloudUrl {
    /// Start resolving the URL for `base`.
    #[must_use]
    pub fn new(base: impl Into<String>, max_attempts: u32, interval: Duration, start: Instant) -> Self {
        Self {
            base: base.into(),
            resolved: None,
            poll: BoundedPoll::new(max_attempts, interval, start),
        }
    }

    /// Current URL: tagged if the id was found, the base URL otherwise.
    #[must_use]
    pub fn url(&self) -> &str {
        self.resolved.as_deref().unwrap_or(&self.base)
    }

    /// Next time [`poll`](Self::poll) should be called, if any.
    #[must_use]
    pub fn next_due(&self) -> Option<Instant> {
        self.poll.next_due()
    }

    /// Try the identity lookup if due. Returns `true` if the URL changed.
    pub fn poll(&mut self, now: Instant, identity: &dyn IdentityProvider) -> bool {
        match self.poll.poll(now, || identity.distinct_id()) {
            PollStatus::Resolved(id) => {
                self.resolved = Some(tag_url(&self.base, &id));
                true
            }
            PollStatus::Pending
            | PollStatus::Done
            | PollStatus::Exhausted
            | PollStatus::Cancelled => false,
        }
    }

    /// Stop resolving (the consuming page went away).
    pub fn cancel(&mut self) {
        self.poll.cancel();
    }
}

fn tag_url(base: &str, id: &str) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!(
        "{base}{separator}utm_id={}",
        utf8_percent_encode(id, NON_ALPHANUMERIC)
    )
}
