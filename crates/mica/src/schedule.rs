//! Timed deferred actions
//!
//! Two-phase state transitions (animate-then-switch, switch-then-animate)
//! schedule their second phase at the animation's known duration instead of
//! blocking. The queue holds a closed set of actions rather than closures so
//! a pending phase can be cancelled when a newer operation supersedes it.

use crate::animate::AnimationHandle;
use crate::scene::{Display, ElementId};

/// An action the stage applies when its delay elapses
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeferredAction {
    /// Flip an element's display switch
    SetDisplay(ElementId, Display),
    /// Trigger a registered animation
    Trigger(AnimationHandle),
}

/// Handle to a scheduled task, used for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

struct Task {
    id: TaskId,
    /// Seconds until due
    remaining: f32,
    action: DeferredAction,
}

/// Delay queue for deferred actions
pub struct Scheduler {
    tasks: Vec<Task>,
    next_id: u64,
}

impl Scheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 0,
        }
    }

    /// Schedule `action` to fire after `delay` seconds
    pub fn schedule(&mut self, delay: f32, action: DeferredAction) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            remaining: delay.max(0.0),
            action,
        });
        id
    }

    /// Cancel a pending task; no-op if it already fired or was cancelled
    pub fn cancel(&mut self, id: TaskId) {
        self.tasks.retain(|t| t.id != id);
    }

    /// Whether a task is still pending
    pub fn is_pending(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    /// Advance the clock by `dt` seconds and collect the actions that came
    /// due, in scheduling order
    pub fn advance(&mut self, dt: f32) -> Vec<DeferredAction> {
        let mut due = Vec::new();
        for task in &mut self.tasks {
            task.remaining -= dt;
        }
        self.tasks.retain(|task| {
            if task.remaining <= 0.0 {
                due.push(task.action);
                false
            } else {
                true
            }
        });
        due
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
