use anyhow::Result;
use wink::cli::{actions, actions::Action, start};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse arguments, initialize logging, return the action to run
    let action = start()?;

    // Handle the action
    match action {
        Action::Server { .. } => actions::server::handle(action).await?,
        Action::Migrate { .. } => actions::migrate::handle(action).await?,
        Action::Publish { .. } => actions::publish::handle(action)?,
    }

    Ok(())
}
