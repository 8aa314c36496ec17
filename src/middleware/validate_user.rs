use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::database::models::User;
use crate::database::UserStore;
use crate::error::ApiError;
use crate::state::AppState;

/// The caller's user row, injected for handlers behind the session middleware
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }
}

/// Middleware that loads the user named by the session. Must run after
/// [`super::auth::jwt_auth_middleware`]. A session for a user that no longer
/// exists is answered with 404.
pub async fn validate_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Unauthorized - invalid session"))?;

    let user = state.store.find_user(auth_user.user_id).await?.ok_or_else(|| {
        tracing::warn!(
            "Session for user {} ({}) references a missing user",
            auth_user.user_id,
            auth_user.email
        );
        ApiError::not_found("User not found")
    })?;

    tracing::debug!("Session resolved to user {} ({})", user.id, user.email);

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}
