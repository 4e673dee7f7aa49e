use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use common::err_context::ErrorContextExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Error;
use crate::application::server::context::Context;
use crate::application::server::AppState;
use crate::domain::{FeedQuery, PostWithMetadata};

/// GET handler for the authenticated user's feed.
///
/// The feed contains the user's own posts and the posts of every user
/// they follow, filtered and paginated by the query parameters.
#[tracing::instrument(
    name = "User Feed",
    skip(state, context),
    fields(
        request_id = %Uuid::new_v4(),
    )
)]
pub async fn feed(
    State(state): State<AppState>,
    context: Context,
    query: Result<Query<FeedQuery>, QueryRejection>,
) -> Result<impl IntoResponse, Error> {
    let Query(query) = query.map_err(|err| Error::InvalidRequest {
        context: "Invalid feed query".to_string(),
        source: err.to_string(),
    })?;

    let posts = state
        .posts
        .get_user_feed(&context.user_id(), &query)
        .await
        .context("Could not retrieve feed")?;

    Ok::<_, Error>((StatusCode::OK, Json(FeedResp::new(posts))))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedResp {
    pub status: String,
    pub data: Vec<PostWithMetadata>,
}

impl FeedResp {
    fn new(data: Vec<PostWithMetadata>) -> Self {
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
        routing::{get, Router},
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
        domain::{FeedSort, Post, PostWithMetadata},
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

    fn feed_route(state: AppState) -> Router {
        Router::new()
            .route("/v1/users/feed", get(feed))
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

    fn some_post(user_id: Uuid) -> PostWithMetadata {
        PostWithMetadata {
            post: Post {
                id: Uuid::new_v4(),
                user_id,
                title: "hello".to_string(),
                content: "world".to_string(),
                tags: vec![],
                version: 0,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            author: "carol".to_string(),
            comment_count: 2,
        }
    }

    fn send_feed_request(query: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(format!("/v1/users/feed{query}"))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn feed_should_use_default_pagination() {
        let user_id = Uuid::new_v4();

        let mut posts_mock = MockPostStorage::new();
        posts_mock
            .expect_get_user_feed()
            .withf(move |id: &Uuid, query: &FeedQuery| {
                *id == user_id
                    && query.limit == 10
                    && query.offset == 0
                    && query.sort == FeedSort::Desc
            })
            .return_once(move |_, _| Ok(vec![some_post(user_id)]));

        let app = feed_route(app_state(posts_mock));

        let response = app
            .oneshot(send_feed_request("", &bearer_token(user_id)))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);

        let body = hyper::body::to_bytes(response.into_body())
            .await
            .expect("body");
        let resp: FeedResp = serde_json::from_slice(&body).expect("feed response");
        assert_that(&resp.data).has_length(1);
        assert_that(&resp.data[0].author).is_equal_to("carol".to_string());
    }

    #[tokio::test]
    async fn feed_should_forward_filters_to_storage() {
        let user_id = Uuid::new_v4();

        let mut posts_mock = MockPostStorage::new();
        posts_mock
            .expect_get_user_feed()
            .withf(|_, query: &FeedQuery| {
                query.limit == 5
                    && query.offset == 20
                    && query.sort == FeedSort::Asc
                    && query.tags == vec!["rust".to_string(), "axum".to_string()]
                    && query.search.as_deref() == Some("hello")
            })
            .return_once(|_, _| Ok(vec![]));

        let app = feed_route(app_state(posts_mock));

        let response = app
            .oneshot(send_feed_request(
                "?limit=5&offset=20&sort=asc&tags=rust,axum&search=hello",
                &bearer_token(user_id),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn feed_should_reject_an_out_of_range_limit() {
        let mut posts_mock = MockPostStorage::new();
        posts_mock.expect_get_user_feed().never();

        let app = feed_route(app_state(posts_mock));

        let response = app
            .oneshot(send_feed_request(
                "?limit=100",
                &bearer_token(Uuid::new_v4()),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn feed_should_require_authentication() {
        let app = feed_route(app_state(MockPostStorage::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/users/feed")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
