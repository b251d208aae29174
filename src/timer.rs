//! Single-shot deferred tasks on the host's serial event loop.
//!
//! The host delivers all notifications on one logical thread and exposes no
//! background timers, so deferred work is modeled as payloads with a
//! deadline. The owner advances the clock explicitly ([`Timers::advance`])
//! and handles whatever came due. Tasks are plain values rather than
//! closures so the owner can hold `&mut` state while handling them.

use std::fmt;
use std::time::Duration;

/// Handle to a scheduled task, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

struct Entry<T> {
    handle: TimerHandle,
    deadline: Duration,
    task: T,
}

/// A queue of single-shot deferred tasks.
///
/// Time only moves when [`advance`](Self::advance) is called; there is no
/// background thread. Due tasks are returned in deadline order (insertion
/// order breaks ties).
pub struct Timers<T> {
    entries: Vec<Entry<T>>,
    now: Duration,
    next_handle: u64,
}

impl<T> Timers<T> {
    /// Creates an empty timer queue at time zero.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            now: Duration::ZERO,
            next_handle: 0,
        }
    }

    /// Schedules `task` to come due after `delay` from the current time.
    pub fn schedule_once(&mut self, delay: Duration, task: T) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(Entry {
            handle,
            deadline: self.now + delay,
            task,
        });
        handle
    }

    /// Cancels a scheduled task. Returns `false` if it already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    /// Advances the clock by `dt` and returns all tasks that came due,
    /// in deadline order.
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        self.now += dt;
        let now = self.now;
        let (mut due, remaining): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| e.deadline <= now);
        self.entries = remaining;
        due.sort_by_key(|e| (e.deadline, e.handle.0));
        due.into_iter().map(|e| e.task).collect()
    }

    /// Number of tasks still pending.
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Current clock value.
    pub fn now(&self) -> Duration {
        self.now
    }
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Timers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timers")
            .field("pending", &self.entries.len())
            .field("now", &self.now)
            .finish()
    }
}
