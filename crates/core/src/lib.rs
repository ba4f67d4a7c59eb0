//! Domain core for Taskflow: roles, the authorization policy, and the task
//! lifecycle rules. No I/O lives here.

pub mod error;
pub mod lifecycle;
pub mod policy;
pub mod roles;
pub mod task_status;
pub mod types;
pub mod validation;
