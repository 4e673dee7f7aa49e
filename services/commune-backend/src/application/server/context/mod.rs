use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert;
use uuid::Uuid;

use crate::application::server::middleware::resolve_context::Error as ResolveError;
use crate::application::server::routes::Error as RoutesError;

/// The authenticated caller, resolved once per request by the context
/// middleware and handed to handlers through a request extension.
#[derive(Clone, Debug)]
pub struct Context {
    user_id: Uuid,
}

impl Context {
    pub fn new(user_id: Uuid) -> Self {
        Context { user_id }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Context {
    type Rejection = RoutesError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Result<Context, ResolveError>>()
            .ok_or(ResolveError::TokenNotFound)
            .map(|r| r.clone())
            .and_then(convert::identity)
            .map_err(|e| RoutesError::Context {
                context: "Could not extract Context".to_string(),
                source: e,
            })
    }
}
