//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the authenticated caller from a Bearer token.
//! - [`rbac::Permitted`] -- an authenticated caller the policy allows one
//!   (action, resource) pair, e.g. `Permitted<ProjectCreate>`.

pub mod auth;
pub mod rbac;
