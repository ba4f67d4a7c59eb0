//! Task workflow states.
//!
//! The wire and storage representation uses the human-readable labels
//! (`"To Do"`, `"Doing"`, `"Testing"`, `"Completed"`). Any state may be set
//! directly by an update; only [`TaskStatus::next`] follows the fixed cycle.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const STATUS_TODO: &str = "To Do";
pub const STATUS_DOING: &str = "Doing";
pub const STATUS_TESTING: &str = "Testing";
pub const STATUS_COMPLETED: &str = "Completed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To Do")]
    ToDo,
    Doing,
    Testing,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task status: {0}")]
pub struct UnknownStatus(pub String);

impl TaskStatus {
    /// All states in cycle order.
    pub const CYCLE: [TaskStatus; 4] = [
        TaskStatus::ToDo,
        TaskStatus::Doing,
        TaskStatus::Testing,
        TaskStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => STATUS_TODO,
            TaskStatus::Doing => STATUS_DOING,
            TaskStatus::Testing => STATUS_TESTING,
            TaskStatus::Completed => STATUS_COMPLETED,
        }
    }

    /// The state the toggle operation moves to: `ToDo → Doing → Testing →
    /// Completed → ToDo`.
    pub fn next(self) -> TaskStatus {
        match self {
            TaskStatus::ToDo => TaskStatus::Doing,
            TaskStatus::Doing => TaskStatus::Testing,
            TaskStatus::Testing => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::ToDo,
        }
    }

    pub fn is_completed(self) -> bool {
        self == TaskStatus::Completed
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_TODO => Ok(TaskStatus::ToDo),
            STATUS_DOING => Ok(TaskStatus::Doing),
            STATUS_TESTING => Ok(TaskStatus::Testing),
            STATUS_COMPLETED => Ok(TaskStatus::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
