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
use crate::domain::{Comment, NewPost, Post, PostPatch};

/// POST handler to create a new post authored by the authenticated user
#[tracing::instrument(
    name = "Create Post",
    skip(state, context, request),
    fields(
        request_id = %Uuid::new_v4(),
    )
)]
pub async fn create_post(
    State(state): State<AppState>,
    context: Context,
    Json(request): Json<NewPost>,
) -> Result<impl IntoResponse, Error> {
    request.validate().map_err(|err| Error::InvalidRequest {
        context: "Invalid post".to_string(),
        source: err,
    })?;

    let post = state
        .posts
        .create_post(&context.user_id(), &request)
        .await
        .context("Could not store post")?;

    Ok::<_, Error>((StatusCode::CREATED, Json(PostResp::new(post))))
}

/// GET handler for a single post, along with its comments
#[tracing::instrument(
    name = "Get Post",
    skip(state, _context),
    fields(
        request_id = %Uuid::new_v4(),
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    _context: Context,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, Error> {
    let post = state
        .posts
        .get_post_by_id(&id)
        .await
        .context("Could not retrieve post")?
        .ok_or_else(|| Error::NotFound {
            context: format!("No post with id {id}"),
        })?;

    let comments = state
        .posts
        .get_comments_by_post_id(&id)
        .await
        .context("Could not retrieve comments")?;

    Ok::<_, Error>((StatusCode::OK, Json(PostDetailResp::new(post, comments))))
}

/// PATCH handler to update a post's title or content.
///
/// Only the author or a moderator may update a post. The update is
/// conditional on the version the caller last saw, and a stale version
/// is reported as a conflict.
#[tracing::instrument(
    name = "Update Post",
    skip(state, context, request),
    fields(
        request_id = %Uuid::new_v4(),
    )
)]
pub async fn update_post(
    State(state): State<AppState>,
    context: Context,
    Path(id): Path<Uuid>,
    Json(request): Json<PostPatch>,
) -> Result<impl IntoResponse, Error> {
    request.validate().map_err(|err| Error::InvalidRequest {
        context: "Invalid post update".to_string(),
        source: err,
    })?;

    let mut post = state
        .posts
        .get_post_by_id(&id)
        .await
        .context("Could not retrieve post")?
        .ok_or_else(|| Error::NotFound {
            context: format!("No post with id {id}"),
        })?;

    authorize(&state, &post, &context, "moderator").await?;

    if let Some(title) = request.title {
        post.title = title;
    }
    if let Some(content) = request.content {
        post.content = content;
    }

    let post = state
        .posts
        .update_post(&post)
        .await
        .context("Could not update post")?
        .ok_or_else(|| Error::Conflict {
            context: "The post was modified concurrently".to_string(),
        })?;

    Ok::<_, Error>((StatusCode::OK, Json(PostResp::new(post))))
}

/// DELETE handler for a post. Only the author or an admin may delete.
#[tracing::instrument(
    name = "Delete Post",
    skip(state, context),
    fields(
        request_id = %Uuid::new_v4(),
    )
)]
pub async fn delete_post(
    State(state): State<AppState>,
    context: Context,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, Error> {
    let post = state
        .posts
        .get_post_by_id(&id)
        .await
        .context("Could not retrieve post")?
        .ok_or_else(|| Error::NotFound {
            context: format!("No post with id {id}"),
        })?;

    authorize(&state, &post, &context, "admin").await?;

    let deleted = state
        .posts
        .delete_post(&id)
        .await
        .context("Could not delete post")?;
    if !deleted {
        return Err(Error::NotFound {
            context: format!("No post with id {id}"),
        });
    }

    Ok::<_, Error>(StatusCode::NO_CONTENT)
}

/// The author may always touch their own post. Anyone else needs a
/// role at or above `role_name`.
async fn authorize(
    state: &AppState,
    post: &Post,
    context: &Context,
    role_name: &str,
) -> Result<(), Error> {
    if post.user_id == context.user_id() {
        return Ok(());
    }

    let caller = state
        .users
        .get_by_id(&context.user_id())
        .await
        .context("Could not retrieve caller")?
        .ok_or_else(|| Error::Forbidden {
            context: "Unknown caller".to_string(),
        })?;

    let required = state
        .users
        .get_role_by_name(role_name)
        .await
        .context("Could not retrieve role")?;

    if caller.role.outranks(&required) {
        Ok(())
    } else {
        Err(Error::Forbidden {
            context: "You may not modify someone else's post".to_string(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostResp {
    pub status: String,
    pub data: Post,
}

impl PostResp {
    fn new(data: Post) -> Self {
        Self {
            status: "success".to_string(),
            data,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostDetailResp {
    pub status: String,
    pub data: PostDetail,
}

impl PostDetailResp {
    fn new(post: Post, comments: Vec<Comment>) -> Self {
        Self {
            status: "success".to_string(),
            data: PostDetail { post, comments },
        }
    }
}
