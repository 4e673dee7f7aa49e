use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{Duration, Utc};
use common::err_context::ErrorContextExt;
use passwords::{analyzer, scorer};
use secrecy::ExposeSecret;
use uuid::Uuid;

use super::Error;
use crate::application::server::AppState;
use crate::authentication::password::compute_password_hash;
use crate::domain::ports::secondary::Email;
use crate::domain::{NewUser, RegistrationRequest, User};
use crate::telemetry::spawn_blocking_with_tracing;

/// How long an invitation token stays valid.
const INVITATION_EXPIRY_HOURS: i64 = 72;

/// POST handler for user registration
/// The user submits a username, an email and a password. A new,
/// inactive account is stored along with an invitation token, and an
/// activation link is mailed out. If the mail cannot be delivered the
/// account is removed again, so the registration can be retried.
#[tracing::instrument(
    name = "User Registration",
    skip(state, request),
    fields(
        request_id = %Uuid::new_v4(),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegistrationRequest>,
) -> Result<impl IntoResponse, Error> {
    let new_user = NewUser::try_from(request).map_err(|err| Error::InvalidRequest {
        context: "Unable to register new user".to_string(),
        source: err,
    })?;

    // Check for duplicates
    if state
        .users
        .email_exists(new_user.email.as_ref())
        .await
        .context("Could not check if the email exists")?
    {
        return Err(Error::DuplicateEmail {
            context: "Unable to register new user".to_string(),
        });
    }

    if state
        .users
        .username_exists(new_user.username.as_ref())
        .await
        .context("Could not check if the username exists")?
    {
        return Err(Error::DuplicateUsername {
            context: "Unable to register new user".to_string(),
        });
    }

    let password_score = scorer::score(&analyzer::analyze(new_user.password.expose_secret()));
    if password_score < 90f64 {
        return Err(Error::WeakPassword {
            context: "Unable to register new user".to_string(),
        });
    }

    let password = new_user.password.clone();
    let password_hash = spawn_blocking_with_tracing(move || compute_password_hash(password))
        .await
        .map_err(|err| Error::InvalidRequest {
            context: "Could not spawn task to compute password hash".to_string(),
            source: err.to_string(),
        })?
        .map_err(|err| Error::InvalidRequest {
            context: "Could not compute password hash".to_string(),
            source: err.to_string(),
        })?;

    let token = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::hours(INVITATION_EXPIRY_HOURS);

    let user = state
        .users
        .create_and_invite(&new_user, password_hash.expose_secret(), &token, expires_at)
        .await
        .context("Could not store new user")?;

    if let Err(err) = state
        .email
        .send_email(activation_email(&user, &token, &state.frontend_url))
        .await
    {
        // Saga: the activation email could not go out, so take the
        // stored user back out and let the caller retry.
        tracing::warn!("Could not send activation email, removing user: {err}");
        state
            .users
            .delete(&user.id)
            .await
            .context("Could not remove user after failed activation email")?;
        return Err(Error::Email {
            context: "Could not send activation email".to_string(),
            source: err,
        });
    }

    let resp = RegistrationResp {
        status: "success".to_string(),
        data: user,
        token,
    };

    Ok::<_, Error>((StatusCode::CREATED, Json(resp)))
}

fn activation_email(user: &User, token: &str, frontend_url: &str) -> Email {
    let activation_url = format!("{frontend_url}/confirm/{token}");
    let html_content = format!(
        "Welcome to commune, {}!<br/>\
         Click <a href=\"{activation_url}\">here</a> to activate your account.",
        user.username.as_ref()
    );
    let text_content = format!(
        "Welcome to commune, {}! Visit {activation_url} to activate your account.",
        user.username.as_ref()
    );
    Email {
        to: user.email.clone(),
        subject: "Activate your commune account".to_string(),
        html_content,
        text_content,
    }
}

/// What we return on a successful registration: the stored user and
/// the plain invitation token.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RegistrationResp {
    pub status: String,
    pub data: User,
    pub token: String,
}
