//! Maps validated CLI matches to the action the binary executes.

use crate::cli::actions::Action;
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some(("server", sub)) => Ok(Action::Server {
            port: sub.get_one::<u16>("port").copied().unwrap_or(8080),
            dsn: sub
                .get_one::<String>("dsn")
                .cloned()
                .context("missing required argument: --dsn")?,
            config: sub.get_one::<String>("config").map(PathBuf::from),
        }),
        Some(("migrate", sub)) => Ok(Action::Migrate {
            dsn: sub
                .get_one::<String>("dsn")
                .cloned()
                .context("missing required argument: --dsn")?,
        }),
        Some(("publish", sub)) => Ok(Action::Publish {
            tag: sub.get_one::<String>("tag").cloned(),
            public_dir: sub
                .get_one::<String>("public-dir")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            config_dir: sub
                .get_one::<String>("config-dir")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("config")),
            force: sub.get_flag("force"),
        }),
        _ => Err(anyhow!("missing subcommand")),
    }
}
