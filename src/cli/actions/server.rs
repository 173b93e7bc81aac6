use crate::{cli::actions::Action, config::Config, wink};
use anyhow::{anyhow, Result};
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    if let Action::Server { port, dsn, config } = action {
        let parsed = Url::parse(&dsn)?;
        if !parsed.scheme().starts_with("postgres") {
            return Err(anyhow!("unsupported DSN scheme: {}", parsed.scheme()));
        }

        let config = Config::load(config.as_deref())?;

        wink::new(port, dsn, config).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_non_postgres_dsn() {
        let result = handle(Action::Server {
            port: 8080,
            dsn: "mysql://localhost:3306/wink".to_string(),
            config: None,
        })
        .await;

        assert!(result.is_err());
    }
}
