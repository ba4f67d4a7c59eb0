//! Task status state machine and the derived completion timestamp.
//!
//! `completed_at` is never written directly. Every create, update and toggle
//! goes through [`Completion`], which keeps the invariant
//! `completed_at.is_some() == status.is_completed()`.

use crate::task_status::TaskStatus;
use crate::types::Timestamp;

/// A task's status together with its completion timestamp, as last written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub status: TaskStatus,
    pub completed_at: Option<Timestamp>,
}

impl Completion {
    /// State for a newly created task.
    pub fn initial(status: TaskStatus, now: Timestamp) -> Self {
        Self {
            status,
            completed_at: status.is_completed().then_some(now),
        }
    }

    /// Move to `next`, stamping or clearing `completed_at`.
    ///
    /// Re-completing a task that is already completed keeps the original
    /// timestamp; an unset timestamp on a completed task is repaired.
    pub fn transition(self, next: TaskStatus, now: Timestamp) -> Self {
        let completed_at = match (next.is_completed(), self.status.is_completed()) {
            (false, _) => None,
            (true, true) => self.completed_at.or(Some(now)),
            (true, false) => Some(now),
        };
        Self {
            status: next,
            completed_at,
        }
    }

    /// Apply an optional status from an update request. `None` means there
    /// is nothing to write: the stored status and stamp stay as they are.
    pub fn apply(self, requested: Option<TaskStatus>, now: Timestamp) -> Option<Self> {
        requested.map(|next| self.transition(next, now))
    }

    /// Advance one step along the fixed cycle.
    pub fn toggle(self, now: Timestamp) -> Self {
        self.transition(self.status.next(), now)
    }

    pub fn is_consistent(&self) -> bool {
        self.completed_at.is_some() == self.status.is_completed()
    }
}

/// Percentage (0-100, rounded half up) of the given tasks that are completed.
/// An empty project reports 0.
pub fn progress_percent<I>(statuses: I) -> u32
where
    I: IntoIterator<Item = TaskStatus>,
{
    let (completed, total) = statuses
        .into_iter()
        .fold((0u64, 0u64), |(done, total), status| {
            (done + u64::from(status.is_completed()), total + 1)
        });
    if total == 0 {
        return 0;
    }
    ((completed * 200 + total) / (total * 2)) as u32
}
