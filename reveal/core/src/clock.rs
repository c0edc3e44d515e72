//! Reveal Clock
//!
//! Advances the number of revealed units at a constant rate. The clock owns
//! one scheduler timer while it runs: a periodic tick of `1 / speed`
//! seconds, or a single immediate tick when the speed is not positive.
//!
//! # Real-time synchronization
//!
//! On every tick the clock recomputes how many units *should* be visible
//! and moves to that count. The due count is measured on the same
//! whole-nanosecond grid the tick timer fires on (`elapsed / interval`), so
//! an on-time tick `k` always shows exactly `k` units. If the loop was
//! delayed, the first tick after the delay catches up in one step. When the
//! interval is clamped to [`MIN_INTERVAL`], a tick reveals every unit due by
//! `floor(elapsed * speed)`. The count never goes backwards.

use std::time::{Duration, Instant};

use crate::config::RevealMode;
use crate::timer::{Scheduler, TimerError, TimerId, MIN_INTERVAL};

/// Absorbs float rounding when a clamped tick lands on a unit boundary
const BOUNDARY_EPSILON: f64 = 1e-6;

/// Longest tick interval; speeds below 0.01 units/s reveal at that rate
pub const MAX_INTERVAL: Duration = Duration::from_secs(100);

/// Reveal progress, mutated only by [`RevealClock`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealState {
    /// Units currently visible, in `[0, total]`
    pub revealed_count: usize,
    /// Total units (N)
    pub total: usize,
    /// Tokenization mode
    pub mode: RevealMode,
    /// When the clock started
    pub started_at: Instant,
}

impl RevealState {
    /// Fresh state with nothing revealed
    #[must_use]
    pub fn new(total: usize, mode: RevealMode, started_at: Instant) -> Self {
        Self {
            revealed_count: 0,
            total,
            mode,
            started_at,
        }
    }

    /// Whether every unit is visible
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.revealed_count >= self.total
    }
}

/// What a single tick did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The count moved forward
    Advanced {
        /// Count before the tick
        from: usize,
        /// Count after the tick
        to: usize,
    },
    /// The tick fired before the next unit was due
    Unchanged,
    /// The last unit became visible; the clock has stopped
    Completed {
        /// Count before the tick
        from: usize,
    },
}

/// Timer-driven progress counter
#[derive(Debug)]
pub struct RevealClock {
    state: RevealState,
    speed: f64,
    timer: Option<TimerId>,
    ticks: u64,
}

impl RevealClock {
    /// Create a stopped clock for `total` units
    #[must_use]
    pub fn new(total: usize, mode: RevealMode, speed: f64, now: Instant) -> Self {
        Self {
            state: RevealState::new(total, mode, now),
            speed,
            timer: None,
            ticks: 0,
        }
    }

    /// Whether the speed means "reveal everything at once"
    #[must_use]
    pub fn is_instant(&self) -> bool {
        !(self.speed > 0.0 && self.speed.is_finite())
    }

    /// Tick interval: `1 / speed`, clamped to [`MIN_INTERVAL`]..=[`MAX_INTERVAL`]
    #[must_use]
    pub fn interval(&self) -> Duration {
        if self.is_instant() {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(1.0 / self.speed)
            .unwrap_or(MAX_INTERVAL)
            .clamp(MIN_INTERVAL, MAX_INTERVAL)
    }

    /// Start ticking from the scheduler's current time
    ///
    /// # Errors
    ///
    /// Returns the scheduler error if the tick timer cannot be created.
    pub fn start(&mut self, scheduler: &mut dyn Scheduler) -> Result<(), TimerError> {
        self.state = RevealState::new(self.state.total, self.state.mode, scheduler.now());
        let timer = if self.is_instant() {
            scheduler.schedule_once(Duration::ZERO)?
        } else {
            scheduler.schedule_periodic(self.interval())?
        };
        tracing::debug!(
            total = self.state.total,
            speed = self.speed,
            interval = ?self.interval(),
            timer = %timer,
            "Reveal clock started"
        );
        self.timer = Some(timer);
        Ok(())
    }

    /// Whether `id` is this clock's tick timer
    #[must_use]
    pub fn owns(&self, id: TimerId) -> bool {
        self.timer == Some(id)
    }

    /// Whether the clock currently holds a timer
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Current progress
    #[must_use]
    pub fn state(&self) -> &RevealState {
        &self.state
    }

    /// Number of ticks handled so far
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Units that should be visible `elapsed` after the start
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn expected_at(&self, elapsed: Duration) -> usize {
        if self.is_instant() {
            return self.state.total;
        }
        let on_grid = elapsed.as_nanos() / self.interval().as_nanos();
        let by_rate = (elapsed.as_secs_f64() * self.speed + BOUNDARY_EPSILON).floor();
        // `as` saturates, so huge values simply clamp to N below
        let due = usize::try_from(on_grid)
            .unwrap_or(usize::MAX)
            .max(by_rate as usize);
        due.min(self.state.total)
    }

    /// Handle one firing of the tick timer
    pub fn on_tick(&mut self, scheduler: &mut dyn Scheduler) -> TickOutcome {
        if self.state.is_complete() {
            self.stop(scheduler);
            return TickOutcome::Unchanged;
        }

        self.ticks += 1;
        let from = self.state.revealed_count;
        let elapsed = scheduler.now().saturating_duration_since(self.state.started_at);
        let to = self.expected_at(elapsed).max(from);
        self.state.revealed_count = to;

        if to > from + 1 {
            tracing::debug!(from, to, ?elapsed, "Reveal clock caught up after a delayed tick");
        }

        if self.state.is_complete() {
            self.stop(scheduler);
            tracing::debug!(ticks = self.ticks, ?elapsed, "Reveal complete");
            TickOutcome::Completed { from }
        } else if to > from {
            TickOutcome::Advanced { from, to }
        } else {
            TickOutcome::Unchanged
        }
    }

    /// Release the tick timer; safe to call more than once
    pub fn stop(&mut self, scheduler: &mut dyn Scheduler) {
        if let Some(timer) = self.timer.take() {
            scheduler.cancel(timer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerQueue;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Drive the clock until it completes, delaying each firing by `lag(k)`
    fn drive(
        clock: &mut RevealClock,
        queue: &mut TimerQueue,
        lag: impl Fn(usize) -> Duration,
    ) -> Vec<(Duration, usize)> {
        let start = clock.state().started_at;
        let mut seen = Vec::new();
        let mut k = 0;
        while let Some(deadline) = queue.next_deadline() {
            queue.advance(deadline + lag(k));
            k += 1;
            while let Some(id) = queue.pop_due() {
                assert!(clock.owns(id));
                clock.on_tick(queue);
                seen.push((queue.now() - start, clock.state().revealed_count));
            }
            if !clock.is_running() {
                break;
            }
        }
        seen
    }

    #[test]
    fn test_one_unit_per_tick_on_schedule() {
        let start = Instant::now();
        let mut queue = TimerQueue::new(start);
        let mut clock = RevealClock::new(5, RevealMode::Char, 20.0, start);
        clock.start(&mut queue).unwrap();

        let seen = drive(&mut clock, &mut queue, |_| Duration::ZERO);
        assert_eq!(
            seen,
            vec![(ms(50), 1), (ms(100), 2), (ms(150), 3), (ms(200), 4), (ms(250), 5)]
        );
        assert!(!clock.is_running());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_catch_up_after_stall() {
        let start = Instant::now();
        let mut queue = TimerQueue::new(start);
        let mut clock = RevealClock::new(10, RevealMode::Char, 10.0, start);
        clock.start(&mut queue).unwrap();

        // First tick is 320ms late
        queue.advance(start + ms(420));
        let id = queue.pop_due().unwrap();
        assert!(clock.owns(id));
        assert_eq!(clock.on_tick(&mut queue), TickOutcome::Advanced { from: 0, to: 4 });

        // Next deadline is back on the 100ms grid
        assert_eq!(queue.next_deadline(), Some(start + ms(500)));
    }

    #[test]
    fn test_instant_when_speed_not_positive() {
        for speed in [0.0, -4.0] {
            let start = Instant::now();
            let mut queue = TimerQueue::new(start);
            let mut clock = RevealClock::new(7, RevealMode::Word, speed, start);
            clock.start(&mut queue).unwrap();

            assert!(clock.is_instant());
            assert_eq!(queue.next_deadline(), Some(start));
            let id = queue.pop_due().unwrap();
            assert!(clock.owns(id));
            assert_eq!(clock.on_tick(&mut queue), TickOutcome::Completed { from: 0 });
            assert_eq!(clock.ticks(), 1);
            assert!(queue.is_empty());
        }
    }

    #[test]
    fn test_fast_speed_clamps_interval_and_batches() {
        let start = Instant::now();
        let mut queue = TimerQueue::new(start);
        let mut clock = RevealClock::new(100, RevealMode::Char, 10_000.0, start);
        assert_eq!(clock.interval(), MIN_INTERVAL);
        clock.start(&mut queue).unwrap();

        let seen = drive(&mut clock, &mut queue, |_| Duration::ZERO);
        assert_eq!(seen.first(), Some(&(ms(1), 10)));
        assert_eq!(seen.last(), Some(&(ms(10), 100)));
    }

    #[test]
    fn test_on_time_ticks_never_stall() {
        for speed in [3.0, 15.0, 30.0] {
            let start = Instant::now();
            let mut queue = TimerQueue::new(start);
            let mut clock = RevealClock::new(1_500, RevealMode::Char, speed, start);
            clock.start(&mut queue).unwrap();

            let mut k = 0;
            while let Some(deadline) = queue.next_deadline() {
                queue.advance(deadline);
                let id = queue.pop_due().unwrap();
                assert!(clock.owns(id));
                let from = clock.state().revealed_count;
                let outcome = clock.on_tick(&mut queue);
                k += 1;
                if k == 1_500 {
                    assert_eq!(outcome, TickOutcome::Completed { from: 1_499 });
                    break;
                }
                assert_eq!(
                    outcome,
                    TickOutcome::Advanced { from, to: from + 1 },
                    "speed {speed}, tick {k}"
                );
            }
            assert_eq!(k, 1_500, "speed {speed}");
            assert_eq!(queue.now() - start, clock.interval() * 1_500);
        }
    }

    #[test]
    fn test_tiny_speed_clamps_interval() {
        let start = Instant::now();
        let mut queue = TimerQueue::new(start);
        let mut clock = RevealClock::new(2, RevealMode::Char, 1e-300, start);
        assert!(!clock.is_instant());
        assert_eq!(clock.interval(), MAX_INTERVAL);
        clock.start(&mut queue).unwrap();

        assert_eq!(queue.next_deadline(), Some(start + MAX_INTERVAL));
        queue.advance(start + MAX_INTERVAL);
        queue.pop_due().unwrap();
        assert_eq!(clock.on_tick(&mut queue), TickOutcome::Advanced { from: 0, to: 1 });
    }

    #[test]
    fn test_start_fails_on_closed_scheduler() {
        let start = Instant::now();
        let mut queue = TimerQueue::new(start);
        queue.close();
        let mut clock = RevealClock::new(3, RevealMode::Char, 5.0, start);
        assert_eq!(clock.start(&mut queue), Err(TimerError::Closed));
        assert!(!clock.is_running());
    }

    proptest! {
        #[test]
        fn prop_progress_tracks_wall_clock(
            total in 1usize..80,
            speed in 0.5f64..400.0,
            lags in proptest::collection::vec(0u64..300, 1..40),
        ) {
            let start = Instant::now();
            let mut queue = TimerQueue::new(start);
            let mut clock = RevealClock::new(total, RevealMode::Char, speed, start);
            clock.start(&mut queue).unwrap();

            let seen = drive(&mut clock, &mut queue, |k| ms(lags[k % lags.len()]));

            let mut previous = 0;
            for (elapsed, count) in &seen {
                prop_assert!(*count >= previous);
                prop_assert!(*count <= total);
                prop_assert_eq!(*count, clock.expected_at(*elapsed));
                let grid = usize::try_from(elapsed.as_nanos() / clock.interval().as_nanos())
                    .unwrap_or(usize::MAX)
                    .min(total);
                prop_assert!(*count >= grid, "stalled: {} < {}", count, grid);
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let exact = ((elapsed.as_secs_f64() * speed).floor() as usize).min(total);
                prop_assert!(count.abs_diff(exact) <= 1);
                previous = *count;
            }
            prop_assert_eq!(seen.last().map(|(_, c)| *c), Some(total));
        }
    }
}
