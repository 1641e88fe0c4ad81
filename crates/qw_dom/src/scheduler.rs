//! Timers: the [`Scheduler`] trait and a virtual-time implementation.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use crate::error::Result;

/// Shortest repeat period a scheduler will honour. Browsers clamp
/// `setInterval(f, 0)` the same way.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Handle returned by [`Scheduler::set_timeout`] and [`Scheduler::set_interval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(i32);

impl TimerId {
    pub fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> i32 {
        self.0
    }
}

/// Single-threaded timer source.
///
/// Tasks run later on the same thread, never from inside the call that
/// scheduled them.
pub trait Scheduler: Clone + 'static {
    fn set_timeout<F>(&self, delay: Duration, task: F) -> Result<TimerId>
    where
        F: FnOnce() + 'static;

    fn set_interval<F>(&self, period: Duration, task: F) -> Result<TimerId>
    where
        F: FnMut() + 'static;

    /// Cancel a timeout or interval. Unknown or already-fired ids are ignored.
    fn clear(&self, id: TimerId);
}

// ============================================================================
// Manual (virtual time) scheduler
// ============================================================================

enum Task {
    Once(Box<dyn FnOnce()>),
    Repeat(Box<dyn FnMut()>, Duration),
}

struct Pending {
    due: Duration,
    task: Task,
}

#[derive(Default)]
struct ClockState {
    now: Duration,
    next_id: i32,
    pending: BTreeMap<i32, Pending>,
    /// Timer whose task is executing right now
    running: Option<i32>,
    /// Set when the running timer cleared itself
    running_cleared: bool,
}

/// Scheduler driven by an explicit virtual clock.
///
/// Nothing happens until [`ManualScheduler::advance`] is called, which runs
/// every task falling due in order of due time (ties broken by creation).
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<ClockState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since creation.
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Number of timers still armed.
    pub fn pending(&self) -> usize {
        self.state.borrow().pending.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.state.borrow().pending.contains_key(&id.raw())
    }

    /// Move the clock forward by `by`, running everything that falls due.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;

        while let Some((id, Pending { due, task })) = self.take_next_due(target) {
            {
                let mut state = self.state.borrow_mut();
                state.now = due;
                state.running = Some(id);
                state.running_cleared = false;
            }

            match task {
                Task::Once(task) => task(),
                Task::Repeat(mut task, period) => {
                    task();
                    let mut state = self.state.borrow_mut();
                    if !state.running_cleared {
                        state.pending.insert(
                            id,
                            Pending {
                                due: due + period,
                                task: Task::Repeat(task, period),
                            },
                        );
                    }
                }
            }

            self.state.borrow_mut().running = None;
        }

        let mut state = self.state.borrow_mut();
        if state.now < target {
            state.now = target;
        }
    }

    /// Advance in `step` increments until `done` holds or `limit` has
    /// elapsed. Returns whether `done` was reached.
    pub fn advance_until<F>(&self, step: Duration, limit: Duration, done: F) -> bool
    where
        F: Fn() -> bool,
    {
        let deadline = self.now() + limit;
        while !done() {
            if self.now() >= deadline {
                return false;
            }
            self.advance(step);
        }
        true
    }

    fn take_next_due(&self, target: Duration) -> Option<(i32, Pending)> {
        let mut state = self.state.borrow_mut();
        let id = state
            .pending
            .iter()
            .filter(|(_, pending)| pending.due <= target)
            .min_by_key(|(id, pending)| (pending.due, **id))
            .map(|(id, _)| *id)?;
        state.pending.remove(&id).map(|pending| (id, pending))
    }

    fn insert(&self, due_in: Duration, task: Task) -> TimerId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        let due = state.now + due_in;
        state.pending.insert(id, Pending { due, task });
        TimerId(id)
    }
}

impl Scheduler for ManualScheduler {
    fn set_timeout<F>(&self, delay: Duration, task: F) -> Result<TimerId>
    where
        F: FnOnce() + 'static,
    {
        Ok(self.insert(delay, Task::Once(Box::new(task))))
    }

    fn set_interval<F>(&self, period: Duration, task: F) -> Result<TimerId>
    where
        F: FnMut() + 'static,
    {
        let period = period.max(MIN_INTERVAL);
        Ok(self.insert(period, Task::Repeat(Box::new(task), period)))
    }

    fn clear(&self, id: TimerId) {
        let mut state = self.state.borrow_mut();
        state.pending.remove(&id.raw());
        if state.running == Some(id.raw()) {
            state.running_cleared = true;
        }
    }
}
