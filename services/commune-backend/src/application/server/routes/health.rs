use axum::extract::{Json, State};
use serde::{Deserialize, Serialize};

use crate::application::server::AppState;

/// GET handler for health requests by an application platform
///
/// Intended for use in environments such as Amazon ECS or Kubernetes which want
/// to validate that the HTTP service is available for traffic, by returning a
/// 200 OK response with any content.
#[allow(clippy::unused_async)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResp> {
    let resp = HealthResp {
        status: "OK".to_string(),
        environment: state.mode,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    Json(resp)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResp {
    pub status: String,
    pub environment: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::{get, Router},
    };
    use secrecy::Secret;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::{
        application::server::{AppState, ApplicationBaseUrl},
        domain::ports::secondary::{MockEmailService, MockPostStorage, MockUserStorage},
    };

    use super::*;

    fn app_state() -> AppState {
        AppState {
            users: Arc::new(MockUserStorage::new()),
            posts: Arc::new(MockPostStorage::new()),
            email: Arc::new(MockEmailService::new()),
            cache: None,
            base_url: ApplicationBaseUrl("http://127.0.0.1:8081".to_string()),
            frontend_url: "http://localhost:4000".to_string(),
            secret: Secret::new("secret".to_string()),
            issuer: "commune".to_string(),
            token_expiration_minutes: 60,
            mode: "testing".to_string(),
        }
    }

    #[tokio::test]
    async fn health_should_return_ok_with_the_environment() {
        let app = Router::new()
            .route("/health", get(health))
            .with_state(app_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);

        let body = hyper::body::to_bytes(response.into_body())
            .await
            .expect("body");
        let resp: HealthResp = serde_json::from_slice(&body).expect("json");
        assert_eq!(resp.status, "OK");
        assert_eq!(resp.environment, "testing");
    }
}
