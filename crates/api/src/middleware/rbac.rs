//! Role-based access control extractors.
//!
//! [`Permitted`] wraps [`AuthUser`] and asks the authorization policy about
//! one (action, resource) pair before the handler (and its body extractor)
//! runs, so a caller without the role gets 403 regardless of what they sent.

use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use taskflow_core::policy::{Action, Resource};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// A single row of the policy table, checked by [`Permitted`].
pub trait Permission {
    const ACTION: Action;
    const RESOURCE: Resource;
}

/// `POST /projects` (admin or manager).
pub struct ProjectCreate;

/// `PUT /projects/{id}` (admin or manager).
pub struct ProjectUpdate;

/// `DELETE /projects/{id}` (admin or manager).
pub struct ProjectDelete;

/// `GET /projects/with-users-tasks` (admin).
pub struct OverviewRead;

impl Permission for ProjectCreate {
    const ACTION: Action = Action::Create;
    const RESOURCE: Resource = Resource::Project;
}

impl Permission for ProjectUpdate {
    const ACTION: Action = Action::Update;
    const RESOURCE: Resource = Resource::Project;
}

impl Permission for ProjectDelete {
    const ACTION: Action = Action::Delete;
    const RESOURCE: Resource = Resource::Project;
}

impl Permission for OverviewRead {
    const ACTION: Action = Action::Read;
    const RESOURCE: Resource = Resource::AdminOverview;
}

/// An authenticated caller the policy allows to perform `P`. Rejects with 403
/// Forbidden otherwise.
///
/// ```ignore
/// async fn create(Permitted(user, _): Permitted<ProjectCreate>) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct Permitted<P>(pub AuthUser, pub PhantomData<P>);

impl<P> FromRequestParts<AppState> for Permitted<P>
where
    P: Permission + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        user.authorize(P::ACTION, P::RESOURCE)?;
        Ok(Permitted(user, PhantomData))
    }
}
