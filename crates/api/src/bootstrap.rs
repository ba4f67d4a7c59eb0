//! Startup seeding of the first admin account.
//!
//! Signup only ever creates `user` accounts, so without this there is no way
//! to obtain an admin.

use taskflow_core::roles::Role;
use taskflow_db::models::user::CreateUser;
use taskflow_db::{Store, StoreError};

use crate::auth::password::hash_password;
use crate::config::BootstrapAdmin;
use crate::error::AppResult;

/// What [`ensure_admin`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created,
    AlreadyAdmin,
    /// The email belongs to a non-admin account, which is left untouched.
    EmailTaken,
}

/// Create the configured admin unless an account with that email exists.
pub async fn ensure_admin(store: &dyn Store, admin: &BootstrapAdmin) -> AppResult<BootstrapOutcome> {
    if let Some(existing) = store.find_user_by_email(&admin.email).await? {
        if existing.role == Role::Admin {
            tracing::debug!(user_id = existing.id, "Bootstrap admin already present");
            return Ok(BootstrapOutcome::AlreadyAdmin);
        }
        tracing::warn!(
            user_id = existing.id,
            role = %existing.role,
            "Bootstrap admin email belongs to a non-admin account; not promoting"
        );
        return Ok(BootstrapOutcome::EmailTaken);
    }

    let password_hash = hash_password(&admin.password)?;

    match store
        .create_user(&CreateUser {
            email: admin.email.clone(),
            name: admin.name.clone(),
            password_hash,
            role: Role::Admin,
        })
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = user.id, "Bootstrap admin created");
            Ok(BootstrapOutcome::Created)
        }
        // Another instance seeded it between the lookup and the insert.
        Err(StoreError::Duplicate(_)) => Ok(BootstrapOutcome::AlreadyAdmin),
        Err(e) => Err(e.into()),
    }
}
