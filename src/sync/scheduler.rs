//! Cancellable timers on a monotonic session clock.
//!
//! Time is a `Duration` since the session started. The scheduler never reads
//! a wall clock itself: the event loop advances it with the elapsed time of a
//! `tokio::time::Instant`, and tests advance it by hand. Firing is strictly
//! ordered by deadline, then by scheduling order.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Timer queue carrying a task payload `T`.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_id: u64,
    queue: BinaryHeap<Reverse<(Duration, TimerId)>>,
    tasks: HashMap<TimerId, T>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            queue: BinaryHeap::new(),
            tasks: HashMap::new(),
        }
    }

    /// Current session time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `task` to fire `delay` from now.
    pub fn schedule(&mut self, delay: Duration, task: T) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.queue.push(Reverse((self.now + delay, id)));
        self.tasks.insert(id, task);
        id
    }

    /// Cancel a timer. Returns its task if it had not fired yet.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        self.tasks.remove(&id)
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.tasks.contains_key(&id)
    }

    /// Number of live (not fired, not cancelled) timers.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Deadline of the earliest live timer.
    pub fn next_deadline(&mut self) -> Option<Duration> {
        self.discard_cancelled();
        self.queue.peek().map(|Reverse((deadline, _))| *deadline)
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its deadline. Once nothing is due the clock moves to `until`.
    ///
    /// Call in a loop: a task handled between pops may schedule follow-up
    /// timers relative to the popped deadline, and those fire in the same
    /// sweep if they are due too.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, T)> {
        match self.next_deadline() {
            Some(deadline) if deadline <= until => {
                let Reverse((deadline, id)) = self.queue.pop()?;
                self.now = self.now.max(deadline);
                let task = self.tasks.remove(&id)?;
                Some((id, task))
            }
            _ => {
                self.now = self.now.max(until);
                None
            }
        }
    }

    fn discard_cancelled(&mut self) {
        while let Some(Reverse((_, id))) = self.queue.peek() {
            if self.tasks.contains_key(id) {
                break;
            }
            self.queue.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn drain(s: &mut Scheduler<&'static str>, until: Duration) -> Vec<&'static str> {
        let mut fired = Vec::new();
        while let Some((_, task)) = s.pop_due(until) {
            fired.push(task);
        }
        fired
    }

    #[test]
    fn test_fires_in_deadline_then_insertion_order() {
        let mut s = Scheduler::new();
        s.schedule(ms(300), "late");
        s.schedule(ms(100), "first");
        s.schedule(ms(100), "second");
        assert_eq!(s.next_deadline(), Some(ms(100)));
        assert_eq!(drain(&mut s, ms(1000)), vec!["first", "second", "late"]);
        assert_eq!(s.now(), ms(1000));
    }

    #[test]
    fn test_not_due_yet() {
        let mut s = Scheduler::new();
        s.schedule(ms(400), "flash");
        assert!(drain(&mut s, ms(399)).is_empty());
        assert_eq!(s.now(), ms(399));
        assert_eq!(drain(&mut s, ms(400)), vec!["flash"]);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut s = Scheduler::new();
        let id = s.schedule(ms(100), "cancelled");
        s.schedule(ms(200), "kept");
        assert_eq!(s.cancel(id), Some("cancelled"));
        assert!(!s.is_pending(id));
        assert_eq!(s.cancel(id), None);
        assert_eq!(s.next_deadline(), Some(ms(200)));
        assert_eq!(drain(&mut s, ms(500)), vec!["kept"]);
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn test_follow_up_scheduled_from_popped_deadline() {
        let mut s = Scheduler::new();
        s.schedule(ms(400), "flash_end");
        let (_, task) = s.pop_due(ms(1000)).unwrap();
        assert_eq!(task, "flash_end");
        assert_eq!(s.now(), ms(400));
        s.schedule(ms(300), "collapse_end");
        assert_eq!(s.next_deadline(), Some(ms(700)));
        assert_eq!(drain(&mut s, ms(1000)), vec!["collapse_end"]);
    }

    #[test]
    fn test_clock_never_moves_backwards() {
        let mut s: Scheduler<&str> = Scheduler::new();
        assert!(s.pop_due(ms(50)).is_none());
        assert!(s.pop_due(ms(10)).is_none());
        assert_eq!(s.now(), ms(50));
    }
}
