use clap::Parser;
use std::fmt;

use common::err_context::{ErrorContext, ErrorContextExt};
use common::settings::ClientSettings;
use commune_client::api::{ApiClient, Error as ApiError};
use commune_client::form::CreatePostForm;
use commune_client::opts::{Command, Error as OptsError, Opts};

#[derive(Debug)]
pub enum Error {
    Options { context: String, source: OptsError },
    Api { context: String, source: ApiError },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Options { context, source } => {
                write!(fmt, "Options Error: {context} | {source}")
            }
            Error::Api { context, source } => {
                write!(fmt, "API Error: {context} | {source}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorContext<OptsError>> for Error {
    fn from(err: ErrorContext<OptsError>) -> Self {
        Error::Options {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<ApiError>> for Error {
    fn from(err: ErrorContext<ApiError>) -> Self {
        Error::Api {
            context: err.0,
            source: err.1,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    common::tracing::init_tracing(common::settings::tracing_dev_settings());

    let opts = Opts::parse();

    let cmd = opts.cmd.clone();

    let settings: ClientSettings = opts.try_into().context("Compiling Client Settings")?;

    match cmd {
        Command::Config => {
            println!(
                "{}",
                serde_json::to_string_pretty(&settings).expect("serialize settings")
            );
        }
        Command::CreatePost { title, content } => {
            let api = ApiClient::new(settings).context("Could not build API client")?;
            let mut form = CreatePostForm::new();
            form.set_title(title);
            form.set_content(content);
            let post = form.submit(&api).await.context("Could not create post")?;
            println!("Created post {}", post.id);
        }
        Command::Activate { token } => {
            let api = ApiClient::new(settings).context("Could not build API client")?;
            api.activate(&token)
                .await
                .context("Could not activate account")?;
            println!("Account activated");
        }
    }
    Ok(())
}
