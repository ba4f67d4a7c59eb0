//! Role-based authorization policy.
//!
//! [`decide`] is a pure function over (principal, action, resource). It has no
//! knowledge of individual records: owner scoping of single-project lookups is
//! a store concern and happens after the policy has allowed the action.
//!
//! | Action             | Resource        | Allowed roles            |
//! |--------------------|-----------------|--------------------------|
//! | create/update/delete | `Project`     | admin, manager           |
//! | read               | `Project`       | any authenticated        |
//! | any                | `Task`          | any authenticated        |
//! | read               | `UserList`      | any authenticated        |
//! | read               | `AdminOverview` | admin                    |
//!
//! Anonymous callers are denied everything.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

/// The authenticated identity behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: DbId,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Project,
    Task,
    UserList,
    /// All projects with their tasks and assignees.
    AdminOverview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

/// Decide whether `principal` may perform `action` on `resource`.
pub fn decide(principal: Option<&Principal>, action: Action, resource: Resource) -> Decision {
    let Some(principal) = principal else {
        return Decision::Deny;
    };

    let allowed = match (resource, action) {
        (Resource::Project, Action::Read) => true,
        (Resource::Project, Action::Create | Action::Update | Action::Delete) => {
            matches!(principal.role, Role::Admin | Role::Manager)
        }
        (Resource::Task, _) => true,
        (Resource::UserList, Action::Read) => true,
        (Resource::UserList, _) => false,
        (Resource::AdminOverview, Action::Read) => principal.role == Role::Admin,
        (Resource::AdminOverview, _) => false,
    };

    if allowed {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// [`decide`] for an authenticated principal, mapping a denial to
/// [`CoreError::Forbidden`].
pub fn authorize(principal: &Principal, action: Action, resource: Resource) -> Result<(), CoreError> {
    match decide(Some(principal), action, resource) {
        Decision::Allow => Ok(()),
        Decision::Deny => Err(CoreError::Forbidden(denial_message(resource).into())),
    }
}

fn denial_message(resource: Resource) -> &'static str {
    match resource {
        Resource::Project => "Admin or manager role required",
        Resource::AdminOverview => "Admin role required",
        Resource::Task | Resource::UserList => "Forbidden: insufficient permissions",
    }
}
