pub mod context;
pub mod cookies;
pub mod middleware;
pub mod routes;

use axum::{
    error_handling::HandleErrorLayer,
    extract::connect_info::IntoMakeServiceWithConnectInfo,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{from_fn_with_state, map_response},
    routing::Router,
    BoxError,
};
use common::settings::RateLimiterSettings;
use hyper::server::conn::AddrIncoming;
use secrecy::Secret;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;
use std::{fmt, fmt::Display};
use tower::ServiceBuilder;
use tower::{buffer::BufferLayer, timeout::TimeoutLayer};
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use self::middleware::rate_limit::{rate_limit, FixedWindowLimiter};
use self::middleware::resolve_context::resolve_context;
use self::middleware::response_map::error;
use crate::domain::ports::secondary::{EmailService, PostStorage, UserCache, UserStorage};

pub fn new(
    listener: TcpListener,
    state: AppState,
    cors_origin: String,
    rate_limiter: RateLimiterSettings,
) -> AppServer {
    let cors = CorsLayer::new()
        .allow_origin(
            cors_origin
                .parse::<HeaderValue>()
                .expect("valid cors origin"),
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_credentials(true)
        .allow_headers([header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE]);

    let mut router = Router::new()
        .nest("/v1", routes::routes(state.clone()))
        .layer(map_response(error))
        .layer(from_fn_with_state(state.clone(), resolve_context))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CookieManagerLayer::new());

    if rate_limiter.enabled {
        let limiter = Arc::new(FixedWindowLimiter::new(
            rate_limiter.requests_per_frame,
            Duration::from_secs(rate_limiter.frame_seconds),
        ));
        router = router.layer(from_fn_with_state(limiter, rate_limit));
    }

    let router = router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_timeout_error))
            .layer(BufferLayer::new(1024))
            .layer(TimeoutLayer::new(Duration::from_secs(30))),
    );

    axum::Server::from_tcp(listener)
        .expect("tcp listener")
        .serve(router.into_make_service_with_connect_info::<SocketAddr>())
}

pub type DynUsers = Arc<dyn UserStorage + Send + Sync>;
pub type DynPosts = Arc<dyn PostStorage + Send + Sync>;
pub type DynEmail = Arc<dyn EmailService + Send + Sync>;
pub type DynCache = Arc<dyn UserCache + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub users: DynUsers,
    pub posts: DynPosts,
    pub email: DynEmail,
    /// None when the cache is disabled in the settings.
    pub cache: Option<DynCache>,
    pub base_url: ApplicationBaseUrl,
    pub frontend_url: String,
    pub secret: Secret<String>,
    pub issuer: String,
    pub token_expiration_minutes: i64,
    /// Run mode the settings were compiled for, eg "default" or "prod".
    pub mode: String,
}

pub type AppServer =
    axum::Server<AddrIncoming, IntoMakeServiceWithConnectInfo<Router, SocketAddr>>;

#[derive(Clone)]
pub struct ApplicationBaseUrl(pub String);

impl Display for ApplicationBaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

async fn handle_timeout_error(err: BoxError) -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Unhandled internal error: {}", err),
    )
}
