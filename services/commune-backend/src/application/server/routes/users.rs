use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;
use common::err_context::ErrorContextExt;
use uuid::Uuid;

use super::Error;
use crate::application::server::context::Context;
use crate::application::server::AppState;
use crate::domain::User;

/// GET handler for user profiles
/// Lookups go through the user cache when one is configured.
#[tracing::instrument(
    name = "User Profile",
    skip(state, context),
    fields(
        request_id = %Uuid::new_v4(),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    context: Context,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, Error> {
    tracing::debug!("User {} requested profile {id}", context.user_id());
    let user = get_cached_user(&state, &id).await?;

    match user {
        None => Err(Error::NotFound {
            context: format!("No user with id {id}"),
        }),
        Some(user) => Ok::<_, Error>(Json(serde_json::json!({
            "status": "success",
            "data": user,
        }))),
    }
}

async fn get_cached_user(state: &AppState, id: &Uuid) -> Result<Option<User>, Error> {
    let Some(cache) = &state.cache else {
        return state
            .users
            .get_by_id(id)
            .await
            .context("Could not get user")
            .map_err(Into::into);
    };

    if let Some(user) = cache.get(id).await.context("Could not query user cache")? {
        return Ok(Some(user));
    }

    let user = state
        .users
        .get_by_id(id)
        .await
        .context("Could not get user")?;

    if let Some(user) = &user {
        cache.set(user).await.context("Could not fill user cache")?;
    }

    Ok(user)
}
