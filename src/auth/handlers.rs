use axum::{extract::State, routing::get, Json, Router};
use tracing::{error, instrument};

use crate::{
    auth::{dto::PublicUser, extractors::SessionUser, repo_types::Account},
    state::AppState,
};

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_me(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
) -> Result<Json<PublicUser>, (axum::http::StatusCode, String)> {
    // the extractor only succeeds when a pool is configured
    let Some(db) = state.db.as_ref() else {
        return Err((
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            "auth store not configured".into(),
        ));
    };
    let accounts = Account::list_by_user(db, user.id).await.map_err(|e| {
        error!(error = %e, "list accounts failed");
        (axum::http::StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(Json(PublicUser::new(user, accounts)))
}
