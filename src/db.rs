use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, Executor, PgPool};
use tracing::info;

use crate::schema::TABLES;

pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("connect to database")
}

/// Creates any missing auth tables, referenced tables first, and installs
/// their update triggers.
pub async fn migrate(db: &PgPool) -> anyhow::Result<()> {
    let mut tx = db.begin().await.context("begin tx")?;
    for table in TABLES {
        tx.execute(table.create_sql().as_str())
            .await
            .with_context(|| format!("create table {}", table.qualified_name()))?;
        for stmt in table.touch_sql() {
            tx.execute(stmt.as_str())
                .await
                .with_context(|| format!("install update trigger on {}", table.qualified_name()))?;
        }
    }
    tx.commit().await.context("commit tx")?;
    info!(tables = TABLES.len(), "auth schema ready");
    Ok(())
}
