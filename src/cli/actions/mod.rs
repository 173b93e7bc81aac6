pub mod migrate;
pub mod publish;
pub mod server;

use std::path::PathBuf;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        config: Option<PathBuf>,
    },
    Migrate {
        dsn: String,
    },
    Publish {
        tag: Option<String>,
        public_dir: PathBuf,
        config_dir: PathBuf,
        force: bool,
    },
}
