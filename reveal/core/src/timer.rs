//! Timers
//!
//! The cooperative scheduling capability the reveal clock and the auto-close
//! logic are built on. [`Scheduler`] is the narrow interface; [`TimerQueue`]
//! is the single-threaded implementation the event loop owns.
//!
//! Timers never call back into anything themselves. The loop asks the queue
//! which timer is due next, and hands its [`TimerId`] to the lifecycle
//! controller. A timer cancelled before that point is simply never returned,
//! so no stale callback can run after teardown.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use std::time::{Duration, Instant};

use thiserror::Error;

/// Smallest interval a periodic timer will use
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a scheduled timer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Errors from scheduling a timer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// The deadline cannot be represented
    #[error("timer deadline overflows the clock ({0:?} from now)")]
    Overflow(Duration),

    /// The scheduler has been shut down
    #[error("scheduler is closed")]
    Closed,
}

/// Timer primitives offered by the event loop
pub trait Scheduler {
    /// Current loop time
    fn now(&self) -> Instant;

    /// Fire once after `delay`
    ///
    /// # Errors
    ///
    /// Fails if the deadline overflows or the scheduler is closed.
    fn schedule_once(&mut self, delay: Duration) -> Result<TimerId, TimerError>;

    /// Fire every `interval` until cancelled
    ///
    /// # Errors
    ///
    /// Fails if the first deadline overflows or the scheduler is closed.
    fn schedule_periodic(&mut self, interval: Duration) -> Result<TimerId, TimerError>;

    /// Stop a timer; returns false if it was not live
    fn cancel(&mut self, id: TimerId) -> bool;
}

#[derive(Debug, Clone, Copy)]
enum TimerKind {
    Once,
    Periodic { interval: Duration, fired: u64 },
}

#[derive(Debug, Clone, Copy)]
struct TimerEntry {
    origin: Instant,
    deadline: Instant,
    kind: TimerKind,
}

/// Deadline-ordered timer queue driven by an external clock
///
/// Periodic deadlines are computed as `origin + interval * k`, so they
/// never drift. When the loop falls behind, missed periods collapse into
/// a single firing.
#[derive(Debug)]
pub struct TimerQueue {
    now: Instant,
    next_id: u64,
    /// Live timers; the heap may still hold entries for cancelled ids
    live: HashMap<TimerId, TimerEntry>,
    heap: BinaryHeap<Reverse<(Instant, TimerId)>>,
    closed: bool,
}

impl TimerQueue {
    /// Create a queue whose clock starts at `now`
    #[must_use]
    pub fn new(now: Instant) -> Self {
        Self {
            now,
            next_id: 1,
            live: HashMap::new(),
            heap: BinaryHeap::new(),
            closed: false,
        }
    }

    /// Move the queue clock forward; earlier instants are ignored
    pub fn advance(&mut self, now: Instant) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Deadline of the earliest live timer
    pub fn next_deadline(&mut self) -> Option<Instant> {
        self.discard_stale();
        self.heap.peek().map(|Reverse((deadline, _))| *deadline)
    }

    /// Pop the earliest timer that is due at the current clock
    ///
    /// Periodic timers are re-armed before being returned. Call repeatedly
    /// until `None`; cancelling inside the handler is honoured immediately.
    pub fn pop_due(&mut self) -> Option<TimerId> {
        self.discard_stale();
        let Reverse((deadline, id)) = *self.heap.peek()?;
        if deadline > self.now {
            return None;
        }
        self.heap.pop();

        let entry = self.live.remove(&id)?;
        if let TimerKind::Periodic { interval, fired } = entry.kind {
            if let Some(rearmed) = self.rearm(entry.origin, interval, fired + 1) {
                self.heap.push(Reverse((rearmed.deadline, id)));
                self.live.insert(id, rearmed);
            } else {
                tracing::warn!(timer = %id, "Periodic timer cannot be re-armed, dropping it");
            }
        }
        Some(id)
    }

    /// Whether a timer is still scheduled
    #[must_use]
    pub fn is_live(&self, id: TimerId) -> bool {
        self.live.contains_key(&id)
    }

    /// Number of live timers
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// True when no timers are scheduled
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Cancel everything and refuse further scheduling
    pub fn close(&mut self) {
        self.closed = true;
        self.live.clear();
        self.heap.clear();
    }

    /// Whether [`TimerQueue::close`] has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn discard_stale(&mut self) {
        while let Some(&Reverse((deadline, id))) = self.heap.peek() {
            match self.live.get(&id) {
                Some(entry) if entry.deadline == deadline => break,
                _ => {
                    self.heap.pop();
                }
            }
        }
    }

    fn allocate(&mut self) -> Result<TimerId, TimerError> {
        if self.closed {
            return Err(TimerError::Closed);
        }
        let id = TimerId(self.next_id);
        self.next_id += 1;
        Ok(id)
    }

    /// Entry for the first period at or after `min_fired` whose deadline
    /// lies in the future of the current clock
    fn rearm(&self, origin: Instant, interval: Duration, min_fired: u64) -> Option<TimerEntry> {
        let elapsed = self.now.saturating_duration_since(origin).as_nanos();
        let step = interval.as_nanos().max(1);
        let behind = u64::try_from(elapsed / step).unwrap_or(u64::MAX).saturating_add(1);
        let fired = min_fired.max(behind);

        let offset = u64::try_from(step.checked_mul(u128::from(fired))?).ok()?;
        let deadline = origin.checked_add(Duration::from_nanos(offset))?;
        Some(TimerEntry {
            origin,
            deadline,
            kind: TimerKind::Periodic { interval, fired },
        })
    }
}

impl Scheduler for TimerQueue {
    fn now(&self) -> Instant {
        self.now
    }

    fn schedule_once(&mut self, delay: Duration) -> Result<TimerId, TimerError> {
        let id = self.allocate()?;
        let deadline = self
            .now
            .checked_add(delay)
            .ok_or(TimerError::Overflow(delay))?;
        self.live.insert(
            id,
            TimerEntry {
                origin: self.now,
                deadline,
                kind: TimerKind::Once,
            },
        );
        self.heap.push(Reverse((deadline, id)));
        tracing::trace!(timer = %id, ?delay, "Scheduled one-shot timer");
        Ok(id)
    }

    fn schedule_periodic(&mut self, interval: Duration) -> Result<TimerId, TimerError> {
        let interval = interval.max(MIN_INTERVAL);
        let id = self.allocate()?;
        let deadline = self
            .now
            .checked_add(interval)
            .ok_or(TimerError::Overflow(interval))?;
        self.live.insert(
            id,
            TimerEntry {
                origin: self.now,
                deadline,
                kind: TimerKind::Periodic { interval, fired: 1 },
            },
        );
        self.heap.push(Reverse((deadline, id)));
        tracing::trace!(timer = %id, ?interval, "Scheduled periodic timer");
        Ok(id)
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        let removed = self.live.remove(&id).is_some();
        if removed {
            tracing::trace!(timer = %id, "Cancelled timer");
        }
        removed
    }
}
