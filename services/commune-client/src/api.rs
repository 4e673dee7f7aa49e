use common::err_context::{ErrorContext, ErrorContextExt};
use common::settings::ClientSettings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// HTTP client for the commune REST API.
///
/// The base URL and the bearer token come from the client settings, and
/// every call reports its outcome instead of discarding it.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    api_url: String,
    authorization_token: String,
}

impl ApiClient {
    pub fn new(settings: ClientSettings) -> Result<ApiClient, Error> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout))
            .build()
            .map_err(|err| Error::Configuration {
                context: format!("Could not build HTTP client: {err}"),
            })?;
        Ok(ApiClient {
            http_client,
            api_url: settings.api_url,
            authorization_token: settings.authorization_token,
        })
    }

    /// Create a post. One request per call, carrying exactly the title
    /// and the content as a JSON body.
    #[tracing::instrument(name = "Create Post Request", skip(self))]
    pub async fn create_post(&self, title: &str, content: &str) -> Result<CreatedPost, Error> {
        let url = format!("{}/v1/posts", self.api_url);
        let request = CreatePostRequest {
            title: title.to_string(),
            content: content.to_string(),
        };
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.authorization_token)
            .json(&request)
            .send()
            .await
            .context("Could not send post")?;

        if response.status().is_success() {
            let resp: CreatePostResp = response
                .json()
                .await
                .context("Could not read post response")?;
            Ok(resp.data)
        } else {
            Err(Error::from_failure(response).await)
        }
    }

    /// Activate the account behind an invitation token.
    #[tracing::instrument(name = "Activate Request", skip(self))]
    pub async fn activate(&self, token: &str) -> Result<(), Error> {
        let url = format!("{}/v1/users/activate/{}", self.api_url, token);
        let response = self
            .http_client
            .put(&url)
            .send()
            .await
            .context("Could not send activation")?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::from_failure(response).await)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CreatePostRequest {
    title: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CreatePostResp {
    #[allow(dead_code)]
    status: String,
    data: CreatedPost,
}

/// The slice of the API's post representation the client cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedPost {
    pub id: String,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct FailResp {
    message: String,
    code: String,
}

#[derive(Debug, Clone)]
pub enum Error {
    /// The request could not be carried out.
    Connection {
        context: String,
        source: String,
    },
    /// The API turned the request down.
    Api {
        status: u16,
        message: String,
        code: String,
    },
    Configuration {
        context: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Connection { context, source } => {
                write!(fmt, "Connection: {context} | {source}")
            }
            Error::Api {
                status,
                message,
                code,
            } => {
                write!(fmt, "API: {status} {code} {message}")
            }
            Error::Configuration { context } => {
                write!(fmt, "Configuration: {context}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorContext<reqwest::Error>> for Error {
    fn from(err: ErrorContext<reqwest::Error>) -> Self {
        Error::Connection {
            context: err.0,
            source: err.1.to_string(),
        }
    }
}

impl Error {
    async fn from_failure(response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        match response.json::<FailResp>().await {
            Ok(fail) => Error::Api {
                status,
                message: fail.message,
                code: fail.code,
            },
            Err(_) => Error::Api {
                status,
                message: "The API did not explain the failure".to_string(),
                code: "unknown".to_string(),
            },
        }
    }
}
