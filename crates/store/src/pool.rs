use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::StoreError;

/// Connects to Postgres and runs the crate's own migrations (§6). The
/// broader analytics schema is externally owned; this only creates what
/// the indexing core itself reads and writes.
pub async fn connect(database_url: &str) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    tracing::info!("connected to postgres, running migrations");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("migrations up to date");
    Ok(pool)
}
