//! Deferred continuations on a virtual timeline.
//!
//! Time is a `Duration` since the presentation started. The front end feeds
//! wall-clock time; tests feed whatever they like. Nothing here blocks.

use std::time::Duration;

/// `n` steps of `step`, saturating at `Duration::MAX`.
pub fn steps(step: Duration, n: usize) -> Duration {
    step.saturating_mul(u32::try_from(n).unwrap_or(u32::MAX))
}

/// Identifies one scheduled task so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Pending<T> {
    id: u64,
    due: Duration,
    task: T,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }

    pub fn schedule(&mut self, now: Duration, delay: Duration, task: T) -> TaskHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due: now + delay,
            task,
        });
        TaskHandle(id)
    }

    /// Returns false if the task already ran or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != handle.0);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.pending.iter().any(|p| p.id == handle.0)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest due time, for repaint pacing.
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.iter().map(|p| p.due).min()
    }

    /// Remove and return every task due at or before `now`, ordered by due
    /// time and then by scheduling order.
    pub fn drain_due(&mut self, now: Duration) -> Vec<T> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pending)
                .into_iter()
                .partition(|p| p.due <= now);
        self.pending = rest;
        due.sort_by_key(|p| (p.due, p.id));
        due.into_iter().map(|p| p.task).collect()
    }
}

/// A continuation that reschedules itself every display frame until
/// cancelled.
#[derive(Debug, Default)]
pub struct FrameLoop {
    running: bool,
    frames: u64,
}

impl FrameLoop {
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn cancel(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Consume one frame. Returns false once cancelled.
    pub fn frame(&mut self) -> bool {
        if self.running {
            self.frames += 1;
        }
        self.running
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn steps_saturate_instead_of_wrapping() {
        assert_eq!(steps(ms(45), 3), ms(135));
        assert_eq!(steps(ms(45), 0), Duration::ZERO);
        // 2^32 would wrap to zero with a plain cast.
        assert_eq!(steps(ms(45), 1usize << 32), Duration::MAX);
    }

    #[test]
    fn tasks_fire_in_due_order() {
        let mut s = Scheduler::new();
        s.schedule(ms(0), ms(300), "late");
        s.schedule(ms(0), ms(100), "early");
        s.schedule(ms(0), ms(100), "early-second");
        assert!(s.drain_due(ms(99)).is_empty());
        assert_eq!(s.drain_due(ms(100)), vec!["early", "early-second"]);
        assert_eq!(s.next_due(), Some(ms(300)));
        assert_eq!(s.drain_due(ms(1_000)), vec!["late"]);
        assert!(s.is_empty());
    }

    #[test]
    fn cancelled_task_never_fires() {
        let mut s = Scheduler::new();
        let h = s.schedule(ms(0), ms(50), 1);
        assert!(s.is_pending(h));
        assert!(s.cancel(h));
        assert!(!s.cancel(h));
        assert!(s.drain_due(ms(100)).is_empty());
    }

    #[test]
    fn cancel_all_reports_count() {
        let mut s = Scheduler::new();
        s.schedule(ms(0), ms(1), ());
        s.schedule(ms(0), ms(2), ());
        assert_eq!(s.cancel_all(), 2);
        assert_eq!(s.next_due(), None);
    }

    #[test]
    fn frame_loop_stops_after_cancel() {
        let mut f = FrameLoop::default();
        assert!(!f.frame());
        f.start();
        assert!(f.frame());
        assert!(f.frame());
        f.cancel();
        assert!(!f.frame());
        assert_eq!(f.frames(), 2);
    }
}
