//! Handlers for the `/users` resource.

use axum::extract::State;
use axum::Json;
use taskflow_core::policy::{Action, Resource};
use taskflow_db::models::user::UserSummary;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/users
pub async fn list(user: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<UserSummary>>> {
    user.authorize(Action::Read, Resource::UserList)?;

    let users = state.store.list_users().await?;
    Ok(Json(users.iter().map(UserSummary::from).collect()))
}
