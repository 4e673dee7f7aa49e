mod error;
pub mod activate;
pub mod comments;
pub mod feed;
pub mod follow;
pub mod health;
pub mod posts;
pub mod register;
pub mod token;
pub mod users;

use axum::routing::{get, post, put, Router};

use super::AppState;
pub use self::error::Error;
use self::{
    activate::activate, comments::create_comment, feed::feed, follow::follow, follow::unfollow,
    health::health, posts::create_post, posts::delete_post, posts::get_post, posts::update_post,
    register::register, token::token, users::get_user,
};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/authentication/user", post(register))
        .route("/authentication/token", post(token))
        .route("/users/activate/:token", put(activate))
        .route("/users/feed", get(feed))
        .route("/users/:id", get(get_user))
        .route("/users/:id/follow", put(follow))
        .route("/users/:id/unfollow", put(unfollow))
        .route("/posts", post(create_post))
        .route(
            "/posts/:id",
            get(get_post).patch(update_post).delete(delete_post),
        )
        .route("/posts/:id/comments", post(create_comment))
        .with_state(state)
}
