use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Row of `e-comm-site_user`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub name: Option<String>,
    pub email: String,
    pub image: Option<String>,
    pub cart: Option<serde_json::Value>,
    pub favorites: Option<serde_json::Value>,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
}

/// OAuth provider link, row of `e-comm-site_account`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: i32,
    pub user_id: i32,
    pub provider: String,
    pub provider_account_id: String,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub expires_at: Option<PrimitiveDateTime>,
}

/// Row of `e-comm-site_session`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: i32,
    #[serde(skip_serializing)]
    pub session_token: String, // opaque bearer value
    pub user_id: i32,
    pub expires: PrimitiveDateTime, // UTC
}
