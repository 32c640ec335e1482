//! One-shot timers for tap release
//!
//! Controllers arm timers through the [`Scheduler`] trait and get a
//! [`TimerToken`] back. The host polls its scheduler for due tokens and
//! hands each one back to the key that armed it, so a timer never runs
//! code on its own.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::{Duration, Instant};

/// Handle to an armed timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

impl TimerToken {
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Delayed one-shot timer source
pub trait Scheduler {
    /// Arm a timer that becomes due after `delay`
    fn schedule_after(&mut self, delay: Duration) -> TimerToken;

    /// Disarm a timer. Returns false if it already fired or never existed.
    fn cancel(&mut self, token: TimerToken) -> bool;
}

/// Scheduler driven by a simulated clock
///
/// Time only moves when [`ManualScheduler::advance`] is called, which makes
/// release timing exactly reproducible in tests.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    /// Armed timers by (deadline, token); the token breaks ties in arming order
    pending: BTreeSet<(Duration, TimerToken)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time since creation
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of armed timers
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Move the clock forward and return every timer that became due,
    /// ordered by deadline
    pub fn advance(&mut self, by: Duration) -> Vec<TimerToken> {
        self.now += by;
        let first_not_due = (self.now + Duration::from_nanos(1), TimerToken(0));
        let still_pending = self.pending.split_off(&first_not_due);
        let due = std::mem::replace(&mut self.pending, still_pending);
        due.into_iter().map(|(_, token)| token).collect()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_after(&mut self, delay: Duration) -> TimerToken {
        let token = TimerToken(self.next_id);
        self.next_id += 1;
        self.pending.insert((self.now + delay, token));
        log::trace!("Armed {} at {:?}", token, self.now + delay);
        token
    }

    fn cancel(&mut self, token: TimerToken) -> bool {
        let key = self.pending.iter().find(|(_, t)| *t == token).copied();
        match key {
            Some(key) => {
                self.pending.remove(&key);
                log::trace!("Cancelled {}", token);
                true
            }
            None => false,
        }
    }
}

/// Scheduler backed by the wall clock, polled from an event loop
#[derive(Debug, Default)]
pub struct WallClockScheduler {
    next_id: u64,
    pending: BTreeMap<TimerToken, Instant>,
}

impl WallClockScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timers due now
    pub fn due(&mut self) -> Vec<TimerToken> {
        self.due_at(Instant::now())
    }

    /// Timers due at `now`, ordered by deadline; they are disarmed
    pub fn due_at(&mut self, now: Instant) -> Vec<TimerToken> {
        let mut due: Vec<(Instant, TimerToken)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(token, deadline)| (*deadline, *token))
            .collect();
        due.sort();

        for (_, token) in &due {
            self.pending.remove(token);
        }
        due.into_iter().map(|(_, token)| token).collect()
    }

    /// Earliest armed deadline, for sizing the event loop's poll timeout
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Number of armed timers
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Scheduler for WallClockScheduler {
    fn schedule_after(&mut self, delay: Duration) -> TimerToken {
        let token = TimerToken(self.next_id);
        self.next_id += 1;
        self.pending.insert(token, Instant::now() + delay);
        token
    }

    fn cancel(&mut self, token: TimerToken) -> bool {
        self.pending.remove(&token).is_some()
    }
}
