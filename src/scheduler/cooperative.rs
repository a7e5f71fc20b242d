//! Default cooperative task runner.

use super::{DisableReason, Poll, Scheduler, TaskId};
use crate::core::{Cadence, Iterations};

#[derive(Debug)]
struct Task {
    cadence: Cadence,
    enabled: bool,
    enabled_at_ms: u64,
    last_run_ms: Option<u64>,
    remaining: Option<u32>,
}

impl Task {
    fn new(cadence: Cadence) -> Self {
        Self {
            cadence,
            enabled: false,
            enabled_at_ms: 0,
            last_run_ms: None,
            remaining: None,
        }
    }

    fn restart(&mut self, now_ms: u64) {
        self.enabled = true;
        self.enabled_at_ms = now_ms;
        self.last_run_ms = None;
        self.remaining = match self.cadence.iterations {
            Iterations::Forever => None,
            Iterations::Count(n) => Some(n),
        };
    }
}

/// Runs every enabled unit whose interval has elapsed.
///
/// A freshly enabled unit is due on the very next poll. Each poll checks,
/// in order, iteration exhaustion, the timeout window (strictly longer than
/// the limit), and finally whether the interval has elapsed since the last
/// run. Cost per poll is constant.
///
/// # Example
///
/// ```rust
/// use coop_fsm::core::{Cadence, Iterations};
/// use coop_fsm::scheduler::{CooperativeScheduler, DisableReason, Poll, Scheduler};
///
/// let mut scheduler = CooperativeScheduler::new();
/// let task = scheduler.register(Cadence {
///     interval_ms: 10,
///     iterations: Iterations::Count(1),
///     timeout_ms: None,
/// });
///
/// scheduler.enable(task, 0);
/// assert_eq!(scheduler.poll(task, 0), Poll::Run);
/// assert_eq!(scheduler.poll(task, 5), Poll::Disabled(DisableReason::Exhausted));
/// assert!(!scheduler.is_enabled(task));
/// ```
#[derive(Debug, Default)]
pub struct CooperativeScheduler {
    tasks: Vec<Task>,
}

impl CooperativeScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for CooperativeScheduler {
    fn register(&mut self, cadence: Cadence) -> TaskId {
        self.tasks.push(Task::new(cadence));
        TaskId(self.tasks.len() - 1)
    }

    fn len(&self) -> usize {
        self.tasks.len()
    }

    fn enable(&mut self, task: TaskId, now_ms: u64) -> bool {
        match self.tasks.get_mut(task.0) {
            Some(task) => {
                task.restart(now_ms);
                true
            }
            None => false,
        }
    }

    fn disable(&mut self, task: TaskId) -> bool {
        match self.tasks.get_mut(task.0) {
            Some(task) => std::mem::replace(&mut task.enabled, false),
            None => false,
        }
    }

    fn is_enabled(&self, task: TaskId) -> bool {
        self.tasks.get(task.0).is_some_and(|t| t.enabled)
    }

    fn poll(&mut self, task: TaskId, now_ms: u64) -> Poll {
        let Some(task) = self.tasks.get_mut(task.0) else {
            return Poll::Idle;
        };
        if !task.enabled {
            return Poll::Idle;
        }

        if task.remaining == Some(0) {
            task.enabled = false;
            return Poll::Disabled(DisableReason::Exhausted);
        }

        if let Some(timeout) = task.cadence.timeout_ms {
            if now_ms.saturating_sub(task.enabled_at_ms) > timeout {
                task.enabled = false;
                return Poll::Disabled(DisableReason::TimedOut);
            }
        }

        let due = match task.last_run_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= task.cadence.interval_ms,
        };
        if !due {
            return Poll::Idle;
        }

        task.last_run_ms = Some(now_ms);
        if let Some(remaining) = task.remaining.as_mut() {
            *remaining -= 1;
        }
        Poll::Run
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cadence(interval_ms: u64, iterations: Iterations, timeout_ms: Option<u64>) -> Cadence {
        Cadence {
            interval_ms,
            iterations,
            timeout_ms,
        }
    }

    #[test]
    fn registered_tasks_start_disabled() {
        let mut scheduler = CooperativeScheduler::new();
        let task = scheduler.register(Cadence::default());

        assert_eq!(scheduler.len(), 1);
        assert!(!scheduler.is_enabled(task));
        assert_eq!(scheduler.poll(task, 100), Poll::Idle);
    }

    #[test]
    fn enabled_task_runs_immediately_then_every_interval() {
        let mut scheduler = CooperativeScheduler::new();
        let task = scheduler.register(cadence(10, Iterations::Forever, None));
        scheduler.enable(task, 0);

        assert_eq!(scheduler.poll(task, 0), Poll::Run);
        assert_eq!(scheduler.poll(task, 5), Poll::Idle);
        assert_eq!(scheduler.poll(task, 9), Poll::Idle);
        assert_eq!(scheduler.poll(task, 10), Poll::Run);
        assert_eq!(scheduler.poll(task, 15), Poll::Idle);
        assert_eq!(scheduler.poll(task, 25), Poll::Run);
    }

    #[test]
    fn finite_iterations_exhaust() {
        let mut scheduler = CooperativeScheduler::new();
        let task = scheduler.register(cadence(1, Iterations::Count(2), None));
        scheduler.enable(task, 0);

        assert_eq!(scheduler.poll(task, 0), Poll::Run);
        assert_eq!(scheduler.poll(task, 1), Poll::Run);
        assert_eq!(
            scheduler.poll(task, 2),
            Poll::Disabled(DisableReason::Exhausted)
        );
        assert_eq!(scheduler.poll(task, 3), Poll::Idle);
    }

    #[test]
    fn timeout_is_strictly_greater_than_limit() {
        let mut scheduler = CooperativeScheduler::new();
        let task = scheduler.register(cadence(1000, Iterations::Forever, Some(5000)));
        scheduler.enable(task, 100);

        assert_eq!(scheduler.poll(task, 100), Poll::Run);
        assert_eq!(scheduler.poll(task, 5100), Poll::Run);
        assert_eq!(
            scheduler.poll(task, 5101),
            Poll::Disabled(DisableReason::TimedOut)
        );
        assert!(!scheduler.is_enabled(task));
    }

    #[test]
    fn exhaustion_is_checked_before_timeout() {
        let mut scheduler = CooperativeScheduler::new();
        let task = scheduler.register(cadence(1, Iterations::Count(1), Some(10)));
        scheduler.enable(task, 0);

        assert_eq!(scheduler.poll(task, 0), Poll::Run);
        assert_eq!(
            scheduler.poll(task, 50),
            Poll::Disabled(DisableReason::Exhausted)
        );
    }

    #[test]
    fn disable_reports_previous_status() {
        let mut scheduler = CooperativeScheduler::new();
        let task = scheduler.register(Cadence::default());

        assert!(!scheduler.disable(task));
        scheduler.enable(task, 0);
        assert!(scheduler.disable(task));
        assert!(!scheduler.disable(task));
    }

    #[test]
    fn re_enable_restarts_cadence() {
        let mut scheduler = CooperativeScheduler::new();
        let task = scheduler.register(cadence(100, Iterations::Count(1), Some(50)));

        scheduler.enable(task, 0);
        assert_eq!(scheduler.poll(task, 0), Poll::Run);
        scheduler.disable(task);

        scheduler.enable(task, 1000);
        assert_eq!(scheduler.poll(task, 1000), Poll::Run);
        assert_eq!(
            scheduler.poll(task, 1001),
            Poll::Disabled(DisableReason::Exhausted)
        );
    }

    #[test]
    fn unknown_handles_are_ignored() {
        let mut scheduler = CooperativeScheduler::new();
        let bogus = TaskId(3);

        assert!(!scheduler.enable(bogus, 0));
        assert!(!scheduler.disable(bogus));
        assert!(!scheduler.is_enabled(bogus));
        assert_eq!(scheduler.poll(bogus, 0), Poll::Idle);
    }
}
