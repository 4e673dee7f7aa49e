use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::err_context::ErrorContextExt;
use uuid::Uuid;

use super::Error;
use crate::application::server::AppState;

/// PUT handler for account activation
/// The activation link mailed at registration points the frontend to
/// its confirmation page, which calls this endpoint with the token.
#[tracing::instrument(
    name = "User Activation",
    skip(state, token),
    fields(
        request_id = %Uuid::new_v4(),
    )
)]
pub async fn activate(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, Error> {
    match state
        .users
        .activate_by_token(&token)
        .await
        .context("Could not activate user")?
    {
        None => Err(Error::NotFound {
            context: "No invitation matches this token".to_string(),
        }),
        Some(user) => {
            tracing::info!("Activated user {}", user.id);
            // A cached snapshot from before activation would keep the
            // user looking inactive until the TTL runs out.
            if let Some(cache) = &state.cache {
                cache
                    .invalidate(&user.id)
                    .await
                    .context("Could not invalidate cached user")?;
            }
            Ok::<_, Error>(StatusCode::NO_CONTENT)
        }
    }
}
