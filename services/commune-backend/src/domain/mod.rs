pub mod comment;
pub mod credentials;
pub mod feed;
pub mod new_user;
pub mod ports;
pub mod post;
pub mod role;
pub mod user;
pub mod user_email;
pub mod username;

pub use comment::{Comment, NewComment};
pub use credentials::Credentials;
pub use feed::{FeedQuery, FeedSort};
pub use new_user::{NewUser, RegistrationRequest};
pub use post::{NewPost, Post, PostPatch, PostWithMetadata};
pub use role::Role;
pub use user::User;
pub use user_email::UserEmail;
pub use username::Username;
