pub mod email_service;
pub mod post_storage;
pub mod user_cache;
pub mod user_storage;

pub use email_service::{Email, EmailService, Error as EmailError};
pub use post_storage::{Error as PostError, PostStorage};
pub use user_cache::{Error as CacheError, UserCache};
pub use user_storage::{Error as UserError, UserStorage};

#[cfg(test)]
pub use email_service::MockEmailService;

#[cfg(test)]
pub use post_storage::MockPostStorage;

#[cfg(test)]
pub use user_cache::MockUserCache;

#[cfg(test)]
pub use user_storage::MockUserStorage;
