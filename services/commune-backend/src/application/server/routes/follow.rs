use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::err_context::ErrorContextExt;
use uuid::Uuid;

use super::Error;
use crate::application::server::context::Context;
use crate::application::server::AppState;
use crate::domain::ports::secondary::UserError;

/// PUT handler to start following another user
#[tracing::instrument(
    name = "Follow User",
    skip(state, context),
    fields(
        request_id = %Uuid::new_v4(),
    )
)]
pub async fn follow(
    State(state): State<AppState>,
    context: Context,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, Error> {
    if state
        .users
        .get_by_id(&id)
        .await
        .context("Could not get user to follow")?
        .is_none()
    {
        return Err(Error::NotFound {
            context: format!("No user with id {id}"),
        });
    }

    state
        .users
        .follow(&id, &context.user_id())
        .await
        .map_err(|err| match err {
            UserError::Duplicate { .. } => Error::Conflict {
                context: "Already following this user".to_string(),
            },
            err => Error::Data {
                context: "Could not store follower".to_string(),
                source: err,
            },
        })?;

    Ok::<_, Error>(StatusCode::NO_CONTENT)
}

/// PUT handler to stop following another user
#[tracing::instrument(
    name = "Unfollow User",
    skip(state, context),
    fields(
        request_id = %Uuid::new_v4(),
    )
)]
pub async fn unfollow(
    State(state): State<AppState>,
    context: Context,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, Error> {
    state
        .users
        .unfollow(&id, &context.user_id())
        .await
        .context("Could not delete follower")?;

    Ok::<_, Error>(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        middleware::{from_fn_with_state, map_response},
        routing::{put, Router},
    };
    use chrono::{Duration, Utc};
    use mockall::predicate::*;
    use secrecy::Secret;
    use std::sync::Arc;
    use tower::ServiceExt;
    use tower_cookies::CookieManagerLayer;

    use crate::{
        application::server::middleware::resolve_context::resolve_context,
        application::server::middleware::response_map::error,
        application::server::{AppState, ApplicationBaseUrl},
        authentication::jwt::build_token,
        domain::ports::secondary::{MockEmailService, MockPostStorage, MockUserStorage},
        domain::{Role, User, UserEmail, Username},
    };

    use super::*;

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

    fn follow_routes(state: AppState) -> Router {
        Router::new()
            .route("/v1/users/:id/follow", put(follow))
            .route("/v1/users/:id/unfollow", put(unfollow))
            .layer(map_response(error))
            .layer(from_fn_with_state(state.clone(), resolve_context))
            .layer(CookieManagerLayer::new())
            .with_state(state)
    }

    fn bearer_token(id: Uuid) -> String {
        build_token(
            id,
            &Secret::new("secret".to_string()),
            "commune",
            Duration::minutes(5),
        )
        .expect("token")
    }

    fn some_user(id: Uuid) -> User {
        User {
            id,
            username: Username::parse("carol".to_string()).unwrap(),
            email: UserEmail::parse("carol@example.com".to_string()).unwrap(),
            is_active: true,
            role: Role {
                id: Uuid::new_v4(),
                name: "user".to_string(),
                description: String::new(),
                level: 1,
            },
            created_at: Utc::now(),
        }
    }

    fn send_follow_request(id: Uuid, action: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(format!("/v1/users/{id}/{action}"))
            .method("PUT")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn follow_should_store_the_follower() {
        let follower = Uuid::new_v4();
        let followed = Uuid::new_v4();

        let mut users_mock = MockUserStorage::new();
        users_mock
            .expect_get_by_id()
            .return_once(move |_| Ok(Some(some_user(followed))));
        users_mock
            .expect_follow()
            .withf(move |user: &Uuid, other: &Uuid| *user == followed && *other == follower)
            .return_once(|_, _| Ok(()));

        let app = follow_routes(app_state(users_mock));

        let response = app
            .oneshot(send_follow_request(
                followed,
                "follow",
                &bearer_token(follower),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn follow_should_conflict_when_already_following() {
        let follower = Uuid::new_v4();
        let followed = Uuid::new_v4();

        let mut users_mock = MockUserStorage::new();
        users_mock
            .expect_get_by_id()
            .return_once(move |_| Ok(Some(some_user(followed))));
        users_mock.expect_follow().return_once(|_, _| {
            Err(UserError::Duplicate {
                context: "followers_pkey".to_string(),
            })
        });

        let app = follow_routes(app_state(users_mock));

        let response = app
            .oneshot(send_follow_request(
                followed,
                "follow",
                &bearer_token(follower),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn follow_should_fail_for_an_unknown_user() {
        let follower = Uuid::new_v4();

        let mut users_mock = MockUserStorage::new();
        users_mock.expect_get_by_id().return_once(|_| Ok(None));
        users_mock.expect_follow().never();

        let app = follow_routes(app_state(users_mock));

        let response = app
            .oneshot(send_follow_request(
                Uuid::new_v4(),
                "follow",
                &bearer_token(follower),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unfollow_should_delete_the_follower() {
        let follower = Uuid::new_v4();
        let followed = Uuid::new_v4();

        let mut users_mock = MockUserStorage::new();
        users_mock
            .expect_unfollow()
            .withf(move |user: &Uuid, other: &Uuid| *user == followed && *other == follower)
            .return_once(|_, _| Ok(()));

        let app = follow_routes(app_state(users_mock));

        let response = app
            .oneshot(send_follow_request(
                followed,
                "unfollow",
                &bearer_token(follower),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
