mod error;

pub use self::error::Error;

use axum::extract::State;
use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::Response;
use common::err_context::ErrorContextExt;
use std::fmt;
use tower_cookies::{Cookie, Cookies};

use crate::application::server::context::Context;
use crate::application::server::cookies::JWT;
use crate::application::server::routes::Error as RoutesError;
use crate::application::server::AppState;
use crate::authentication::jwt::validate_token;

/// Resolve the caller's identity once, up front, and stash the outcome
/// in a request extension. Handlers that require authentication pull a
/// `Context` back out through its extractor.
#[tracing::instrument(
    name = "Context Resolution",
    skip(state, cookies, req, next)
)]
pub async fn resolve_context<B: fmt::Debug>(
    state: State<AppState>,
    cookies: Cookies,
    mut req: Request<B>,
    next: Next<B>,
) -> Result<Response, RoutesError> {
    let context = resolve(&cookies, state, &req);

    if context.is_err() && !matches!(context, Err(Error::TokenNotFound)) {
        cookies.remove(Cookie::named(JWT))
    }

    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}

fn resolve<B: fmt::Debug>(
    cookies: &Cookies,
    State(state): State<AppState>,
    req: &Request<B>,
) -> Result<Context, Error> {
    let token = cookies
        .get(JWT)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(|auth_value| {
                    auth_value
                        .strip_prefix("Bearer ")
                        .map(|token| token.to_owned())
                })
        });

    let token = token.ok_or(Error::TokenNotFound)?;

    let id = validate_token(&token, &state.secret, &state.issuer)
        .context("Could not validate token")?;

    Ok(Context::new(id))
}
