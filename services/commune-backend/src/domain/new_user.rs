use secrecy::Secret;
use serde::Deserialize;

use crate::domain::{UserEmail, Username};

/// What the registration route receives.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: Secret<String>,
}

/// A registration request whose fields have been validated.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub email: UserEmail,
    pub password: Secret<String>,
}

impl TryFrom<RegistrationRequest> for NewUser {
    type Error = String;

    fn try_from(request: RegistrationRequest) -> Result<Self, Self::Error> {
        let username = Username::parse(request.username)?;
        let email = UserEmail::parse(request.email)?;
        Ok(NewUser {
            username,
            email,
            password: request.password,
        })
    }
}
