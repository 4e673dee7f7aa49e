mod error;
mod listener;
pub mod opts;
pub mod server;

pub use self::error::Error;

use common::err_context::ErrorContextExt;
use common::settings::{
    ApplicationSettings, AuthSettings, CacheSettings, DatabaseSettings, EmailClientSettings,
    RateLimiterSettings, Settings,
};
use secrecy::Secret;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use self::listener::listen_with_host_port;
use self::server::{AppState, ApplicationBaseUrl, DynCache, DynEmail, DynPosts, DynUsers};
use crate::services::cache::InMemoryUserCache;
use crate::services::email::EmailClient;
use crate::services::postgres::PostgresStorage;

pub struct Application {
    port: u16,
    server: server::AppServer,
}

impl Application {
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::default()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), Error> {
        self.server.await.context("server execution error")?;
        Ok(())
    }
}

#[derive(Default)]
pub struct ApplicationBuilder {
    pub users: Option<DynUsers>,
    pub posts: Option<DynPosts>,
    pub email: Option<DynEmail>,
    pub cache: Option<DynCache>,
    pub listener: Option<TcpListener>,
    pub port: Option<u16>,
    pub base_url: Option<String>,
    pub frontend_url: Option<String>,
    pub cors_origin: Option<String>,
    pub secret: Option<Secret<String>>,
    pub issuer: Option<String>,
    pub token_expiration_minutes: Option<i64>,
    pub rate_limiter: Option<RateLimiterSettings>,
    pub mode: Option<String>,
}

impl ApplicationBuilder {
    pub async fn new(settings: Settings) -> Result<Self, Error> {
        let Settings {
            application,
            database,
            email_client,
            auth,
            rate_limiter,
            cache,
            tracing: _,
            mode,
        } = settings;
        let builder = Self::default()
            .storage(database)
            .await?
            .email(email_client)
            .await?
            .cache(cache)
            .listener(application.clone())?
            .port(application.port)
            .base_url(application.base_url)
            .frontend_url(application.frontend_url)
            .cors_origin(application.cors_origin)
            .auth(auth)
            .rate_limiter(rate_limiter)
            .mode(mode);

        Ok(builder)
    }

    pub async fn storage(mut self, settings: DatabaseSettings) -> Result<Self, Error> {
        let storage = Arc::new(
            PostgresStorage::new(settings)
                .await
                .context("Establishing a database connection")?,
        );
        self.users = Some(storage.clone());
        self.posts = Some(storage);
        Ok(self)
    }

    pub async fn email(mut self, settings: EmailClientSettings) -> Result<Self, Error> {
        let email = Arc::new(
            EmailClient::new(settings)
                .await
                .context("Establishing an email service connection")?,
        );
        self.email = Some(email);
        Ok(self)
    }

    pub fn cache(mut self, settings: CacheSettings) -> Self {
        if settings.enabled {
            let ttl = Duration::from_secs(settings.ttl_seconds);
            self.cache = Some(Arc::new(InMemoryUserCache::new(ttl)) as DynCache);
        }
        self
    }

    pub fn listener(mut self, settings: ApplicationSettings) -> Result<Self, Error> {
        let listener =
            listen_with_host_port(settings.host.as_str(), settings.port).context(format!(
                "Could not create listener for {}:{}",
                settings.host, settings.port
            ))?;
        self.listener = Some(listener);
        Ok(self)
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn base_url(mut self, url: String) -> Self {
        self.base_url = Some(url);
        self
    }

    pub fn frontend_url(mut self, url: String) -> Self {
        self.frontend_url = Some(url);
        self
    }

    pub fn cors_origin(mut self, origin: String) -> Self {
        self.cors_origin = Some(origin);
        self
    }

    pub fn auth(mut self, settings: AuthSettings) -> Self {
        self.secret = Some(Secret::new(settings.secret));
        self.issuer = Some(settings.issuer);
        self.token_expiration_minutes = Some(settings.token_expiration_minutes);
        self
    }

    pub fn rate_limiter(mut self, settings: RateLimiterSettings) -> Self {
        self.rate_limiter = Some(settings);
        self
    }

    pub fn mode(mut self, mode: String) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn build(self) -> Application {
        let ApplicationBuilder {
            users,
            posts,
            email,
            cache,
            listener,
            port,
            base_url,
            frontend_url,
            cors_origin,
            secret,
            issuer,
            token_expiration_minutes,
            rate_limiter,
            mode,
        } = self;
        let state = AppState {
            users: users.expect("users"),
            posts: posts.expect("posts"),
            email: email.expect("email"),
            cache,
            base_url: ApplicationBaseUrl(base_url.expect("base url")),
            frontend_url: frontend_url.expect("frontend url"),
            secret: secret.expect("secret"),
            issuer: issuer.expect("issuer"),
            token_expiration_minutes: token_expiration_minutes.expect("token expiration"),
            mode: mode.expect("mode"),
        };
        let server = server::new(
            listener.expect("listener"),
            state,
            cors_origin.expect("cors origin"),
            rate_limiter.expect("rate limiter"),
        );
        Application {
            port: port.expect("port"),
            server,
        }
    }
}
