use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Duration;
use tower_cookies::Cookies;
use uuid::Uuid;

use super::Error;
use crate::application::server::cookies;
use crate::application::server::AppState;
use crate::authentication::jwt::build_token;
use crate::authentication::password::Authenticator;
use crate::domain::Credentials;

/// POST handler for token creation (login)
/// The user submits their email and password, and receives a signed
/// bearer token when they check out.
/// We don't instrument the request for security purpose.
#[tracing::instrument(
    name = "Token Creation",
    skip(state, cookies, credentials),
    fields(
        request_id = %Uuid::new_v4(),
    )
)]
pub async fn token(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(credentials): Json<Credentials>,
) -> Result<impl IntoResponse, Error> {
    let authenticator = Authenticator {
        storage: state.users.clone(),
    };

    let id = authenticator
        .validate_credentials(&credentials)
        .await
        .map_err(|err| Error::Credentials {
            context: "Could not validate credentials".to_string(),
            source: err,
        })?;

    let token = build_token(
        id,
        &state.secret,
        &state.issuer,
        Duration::minutes(state.token_expiration_minutes),
    )
    .map_err(|err| Error::Token {
        context: "Could not build token".to_string(),
        source: err,
    })?;

    cookies::set_token_cookie(&cookies, &token);

    Ok::<_, Error>((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "token": token,
        })),
    ))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        routing::{post, Router},
    };
    use fake::faker::internet::en::{Password, SafeEmail};
    use fake::Fake;
    use hyper::body::HttpBody;
    use mockall::predicate::*;
    use secrecy::Secret;
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;
    use tower::ServiceExt;
    use tower_cookies::CookieManagerLayer;

    use crate::{
        application::server::{AppState, ApplicationBaseUrl},
        authentication::jwt::validate_token,
        authentication::password::compute_password_hash,
        domain::ports::secondary::{MockEmailService, MockPostStorage, MockUserStorage},
    };

    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TokenResp {
        pub status: String,
        pub token: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct FailedTokenResp {
        pub status: String,
        pub message: String,
        pub code: String,
    }

    fn app_state(users: MockUserStorage) -> AppState {
        AppState {
            users: Arc::new(users),
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

    fn token_route(state: AppState) -> Router {
        Router::new()
            .route("/v1/authentication/token", post(token))
            .layer(CookieManagerLayer::new())
            .with_state(state)
    }

    fn send_token_request(uri: &str, email: &str, password: &str) -> Request<Body> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });
        Request::builder()
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .method("POST")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn token_should_be_issued_for_valid_credentials() {
        let email = SafeEmail().fake::<String>();
        let password = Password(12..32).fake::<String>();
        let password_hash =
            compute_password_hash(Secret::new(password.clone())).expect("password hash");

        let id = Uuid::new_v4();

        let mut users_mock = MockUserStorage::new();
        users_mock
            .expect_get_credentials()
            .return_once(move |_| Ok(Some((id, password_hash))));

        let app = token_route(app_state(users_mock));

        let mut response = app
            .oneshot(send_token_request(
                "/v1/authentication/token",
                &email,
                &password,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::CREATED);

        let mut data = Vec::new();
        while let Some(chunk) = response.data().await {
            data.extend(&chunk.unwrap());
        }
        let response: TokenResp = serde_json::from_slice(&data).expect("json");
        assert_eq!(response.status, "success");

        // The token should validate against the same secret and issuer.
        let validated = validate_token(
            &response.token,
            &Secret::new("secret".to_string()),
            "commune",
        )
        .expect("valid token");
        assert_eq!(validated, id);
    }

    #[tokio::test]
    async fn token_should_be_refused_for_invalid_credentials() {
        let email = SafeEmail().fake::<String>();
        let password = Password(12..32).fake::<String>();
        let password_hash =
            compute_password_hash(Secret::new("a different password".to_string()))
                .expect("password hash");

        let id = Uuid::new_v4();

        let mut users_mock = MockUserStorage::new();
        users_mock
            .expect_get_credentials()
            .return_once(move |_| Ok(Some((id, password_hash))));

        let app = token_route(app_state(users_mock));

        let mut response = app
            .oneshot(send_token_request(
                "/v1/authentication/token",
                &email,
                &password,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let mut data = Vec::new();
        while let Some(chunk) = response.data().await {
            data.extend(&chunk.unwrap());
        }
        let response: FailedTokenResp = serde_json::from_slice(&data).expect("json");
        assert_eq!(response.status, "fail");
        assert_eq!(response.code, "auth/invalid_credentials");
    }
}
