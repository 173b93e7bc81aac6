use crate::cli::actions::Action;
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// Handle the migrate action
pub async fn handle(action: Action) -> Result<()> {
    if let Action::Migrate { dsn } = action {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(&dsn)
            .await
            .context("Failed to connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        info!("Migrations applied");
    }

    Ok(())
}
