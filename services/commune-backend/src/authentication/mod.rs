pub mod jwt;
pub mod password;

pub use jwt::{build_token, validate_token, TokenClaims};
pub use password::{compute_password_hash, Authenticator, Error as PasswordError};
