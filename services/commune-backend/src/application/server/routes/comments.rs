use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use common::err_context::ErrorContextExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Error;
use crate::application::server::context::Context;
use crate::application::server::AppState;
use crate::domain::{Comment, NewComment};

/// POST handler to add a comment to a post
#[tracing::instrument(
    name = "Create Comment",
    skip(state, context, request),
    fields(
        request_id = %Uuid::new_v4(),
    )
)]
pub async fn create_comment(
    State(state): State<AppState>,
    context: Context,
    Path(id): Path<Uuid>,
    Json(request): Json<NewComment>,
) -> Result<impl IntoResponse, Error> {
    request.validate().map_err(|err| Error::InvalidRequest {
        context: "Invalid comment".to_string(),
        source: err,
    })?;

    if state
        .posts
        .get_post_by_id(&id)
        .await
        .context("Could not retrieve post")?
        .is_none()
    {
        return Err(Error::NotFound {
            context: format!("No post with id {id}"),
        });
    }

    let comment = state
        .posts
        .create_comment(&id, &context.user_id(), &request.content)
        .await
        .context("Could not store comment")?;

    Ok::<_, Error>((StatusCode::CREATED, Json(CommentResp::new(comment))))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentResp {
    pub status: String,
    pub data: Comment,
}

impl CommentResp {
    fn new(data: Comment) -> Self {
        Self {
            status: "success".to_string(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        middleware::{from_fn_with_state, map_response},
        routing::{post, Router},
    };
    use chrono::{Duration, Utc};
    use secrecy::Secret;
    use speculoos::prelude::*;
    use std::sync::Arc;
    use tower::ServiceExt;
    use tower_cookies::CookieManagerLayer;

    use crate::{
        application::server::middleware::resolve_context::resolve_context,
        application::server::middleware::response_map::error,
        application::server::{AppState, ApplicationBaseUrl},
        authentication::jwt::build_token,
        domain::ports::secondary::{MockEmailService, MockPostStorage, MockUserStorage},
        domain::Post,
    };

    use super::*;

    fn app_state(posts: MockPostStorage) -> AppState {
        AppState {
            users: Arc::new(MockUserStorage::new()),
            posts: Arc::new(posts),
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

    fn comment_route(state: AppState) -> Router {
        Router::new()
            .route("/v1/posts/:id/comments", post(create_comment))
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

    fn some_post(id: Uuid, user_id: Uuid) -> Post {
        Post {
            id,
            user_id,
            title: "a title".to_string(),
            content: "some content".to_string(),
            tags: vec![],
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn send_comment_request(post_id: Uuid, token: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .uri(format!("/v1/posts/{post_id}/comments"))
            .method("POST")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn a_comment_should_be_stored_on_an_existing_post() {
        let user_id = Uuid::new_v4();
        let post_id = Uuid::new_v4();

        let mut posts_mock = MockPostStorage::new();
        posts_mock
            .expect_get_post_by_id()
            .return_once(move |id| Ok(Some(some_post(*id, Uuid::new_v4()))));
        posts_mock
            .expect_create_comment()
            .withf(move |post: &Uuid, user: &Uuid, content: &str| {
                *post == post_id && *user == user_id && content == "nice"
            })
            .return_once(|post, user, content| {
                Ok(Comment {
                    id: Uuid::new_v4(),
                    post_id: *post,
                    user_id: *user,
                    content: content.to_string(),
                    author: "carol".to_string(),
                    created_at: Utc::now(),
                })
            });

        let app = comment_route(app_state(posts_mock));

        let response = app
            .oneshot(send_comment_request(
                post_id,
                &bearer_token(user_id),
                serde_json::json!({"content": "nice"}),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::CREATED);

        let body = hyper::body::to_bytes(response.into_body())
            .await
            .expect("body");
        let resp: CommentResp = serde_json::from_slice(&body).expect("comment response");
        assert_that(&resp.data.author).is_equal_to("carol".to_string());
    }

    #[tokio::test]
    async fn a_comment_on_an_unknown_post_should_fail() {
        let mut posts_mock = MockPostStorage::new();
        posts_mock.expect_get_post_by_id().return_once(|_| Ok(None));
        posts_mock.expect_create_comment().never();

        let app = comment_route(app_state(posts_mock));

        let response = app
            .oneshot(send_comment_request(
                Uuid::new_v4(),
                &bearer_token(Uuid::new_v4()),
                serde_json::json!({"content": "nice"}),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn an_empty_comment_should_be_rejected() {
        let mut posts_mock = MockPostStorage::new();
        posts_mock.expect_get_post_by_id().never();
        posts_mock.expect_create_comment().never();

        let app = comment_route(app_state(posts_mock));

        let response = app
            .oneshot(send_comment_request(
                Uuid::new_v4(),
                &bearer_token(Uuid::new_v4()),
                serde_json::json!({"content": " "}),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
