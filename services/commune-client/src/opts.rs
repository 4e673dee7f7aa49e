use std::{fmt, path::PathBuf};

use common::config;
use common::settings::ClientSettings;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

#[derive(Debug)]
pub enum Error {
    Merging {
        context: String,
        source: config::Error,
    },
    Deserializing {
        context: String,
        source: ::config::ConfigError,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Merging { context, source } => {
                write!(fmt, "Could not merge configuration: {context} | {source}")
            }
            Error::Deserializing { context, source } => {
                write!(
                    fmt,
                    "Could not deserialize configuration: {context} | {source}"
                )
            }
        }
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, clap::Parser)]
#[clap(
    name = "commune-client",
    about = "Command line client for the commune REST API",
    version = VERSION,
    author = AUTHORS
    )]
pub struct Opts {
    /// Defines the config directory
    ///
    #[arg(value_parser = clap::value_parser!(PathBuf), short = 'c', long = "config-dir")]
    pub config_dir: PathBuf,

    /// Defines the run mode in {testing, dev, prod, ...}
    ///
    /// If no run mode is provided, a default behavior will be used.
    #[arg(short = 'm', long = "run-mode")]
    pub run_mode: Option<String>,

    /// Override settings values using key=value
    #[arg(short = 's', long = "setting")]
    pub settings: Vec<String>,

    #[clap(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Clone, clap::Parser)]
pub enum Command {
    /// Create a post out of a title and a content
    CreatePost { title: String, content: String },
    /// Activate the account behind an invitation token
    Activate { token: String },
    /// Prints the client's configuration
    Config,
}

impl TryInto<ClientSettings> for Opts {
    type Error = Error;

    fn try_into(self) -> Result<ClientSettings, Self::Error> {
        config::merge_configuration(
            self.config_dir.as_ref(),
            &["client"],
            self.run_mode.as_deref(),
            "COMMUNE",
            self.settings.clone(),
        )
        .map_err(|err| Error::Merging {
            context: "Commune Client Settings: Could not merge configuration".to_string(),
            source: err,
        })?
        .get::<ClientSettings>("client")
        .map_err(|err| Error::Deserializing {
            context: "Commune Client Settings: Could not deserialize configuration".to_string(),
            source: err,
        })
    }
}
