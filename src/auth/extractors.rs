use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use tracing::{error, warn};

use crate::{
    auth::repo_types::{Session, User},
    state::AppState,
};

/// Resolves `Authorization: Bearer <session_token>` to its user.
pub struct SessionUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let db = state.db.as_ref().ok_or((
            StatusCode::SERVICE_UNAVAILABLE,
            "auth store not configured".to_string(),
        ))?;

        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "missing Authorization header".into()))?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or((StatusCode::UNAUTHORIZED, "invalid auth scheme".into()))?;

        let session = match Session::find_active(db, token).await {
            Ok(Some(s)) => s,
            Ok(None) => {
                warn!("unknown or expired session");
                return Err((StatusCode::UNAUTHORIZED, "invalid or expired session".into()));
            }
            Err(e) => {
                error!(error = %e, "session lookup failed");
                return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
            }
        };

        match User::find_by_id(db, session.user_id).await {
            Ok(Some(user)) => Ok(SessionUser(user)),
            Ok(None) => {
                warn!(user_id = session.user_id, "session without user");
                Err((StatusCode::UNAUTHORIZED, "User not found".into()))
            }
            Err(e) => {
                error!(error = %e, user_id = session.user_id, "user lookup failed");
                Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
            }
        }
    }
}
