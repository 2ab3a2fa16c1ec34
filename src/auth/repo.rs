use sqlx::PgPool;

use crate::auth::repo_types::{Account, Session, User};

impl User {
    /// Find a user by primary key.
    pub async fn find_by_id(db: &PgPool, id: i32) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, name, email, image, cart, favorites, created_at, updated_at
            FROM "e-comm-site_user"
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}

impl Session {
    /// Find a session by token, ignoring expired ones.
    pub async fn find_active(db: &PgPool, session_token: &str) -> anyhow::Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, session_token, user_id, expires
            FROM "e-comm-site_session"
            WHERE session_token = $1
              AND expires > (now() AT TIME ZONE 'UTC')
            "#,
        )
        .bind(session_token)
        .fetch_optional(db)
        .await?;
        Ok(session)
    }
}

impl Account {
    /// Provider links of a user, oldest first.
    pub async fn list_by_user(db: &PgPool, user_id: i32) -> anyhow::Result<Vec<Account>> {
        let rows = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, user_id, provider, provider_account_id,
                   access_token, refresh_token, expires_at
            FROM "e-comm-site_account"
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
