use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

/// Build a signed bearer token for the given user. The issuer doubles
/// as the audience.
pub fn build_token(
    id: Uuid,
    secret: &Secret<String>,
    issuer: &str,
    expiration: Duration,
) -> Result<String, Error> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: id.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + expiration).timestamp() as usize,
        iss: issuer.to_string(),
        aud: issuer.to_string(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|err| Error::Encoding {
        context: "Could not sign token".to_string(),
        source: err,
    })?;

    Ok(token)
}

/// Check signature, expiry, issuer and audience, and extract the
/// user id from the sub claim.
pub fn validate_token(
    token: &str,
    secret: &Secret<String>,
    issuer: &str,
) -> Result<Uuid, Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[issuer]);
    validation.set_audience(&[issuer]);

    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    )
    .map_err(|err| Error::Invalid {
        context: "Could not validate token".to_string(),
        source: err,
    })?;

    Uuid::parse_str(&data.claims.sub).map_err(|_| Error::Malformed {
        context: "Token sub claim is not a user id".to_string(),
    })
}

#[serde_as]
#[derive(Debug, Serialize)]
pub enum Error {
    Encoding {
        context: String,
        #[serde_as(as = "DisplayFromStr")]
        source: jsonwebtoken::errors::Error,
    },
    Invalid {
        context: String,
        #[serde_as(as = "DisplayFromStr")]
        source: jsonwebtoken::errors::Error,
    },
    Malformed {
        context: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Encoding { context, source } => {
                write!(fmt, "Token Encoding: {context} | {source}")
            }
            Error::Invalid { context, source } => {
                write!(fmt, "Invalid Token: {context} | {source}")
            }
            Error::Malformed { context } => {
                write!(fmt, "Malformed Token: {context}")
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;

    fn secret() -> Secret<String> {
        Secret::new("a-secret-no-one-knows".to_string())
    }

    #[test]
    fn a_token_round_trips_back_to_the_user_id() {
        let id = Uuid::new_v4();
        let token = build_token(id, &secret(), "commune", Duration::minutes(5)).unwrap();
        let validated = validate_token(&token, &secret(), "commune").unwrap();
        assert_that(&validated).is_equal_to(id);
    }

    #[test]
    fn a_token_signed_with_another_secret_is_rejected() {
        let id = Uuid::new_v4();
        let other = Secret::new("a-different-secret".to_string());
        let token = build_token(id, &other, "commune", Duration::minutes(5)).unwrap();
        let validated = validate_token(&token, &secret(), "commune");
        assert_that(&validated).is_err();
    }

    #[test]
    fn a_token_for_another_issuer_is_rejected() {
        let id = Uuid::new_v4();
        let token = build_token(id, &secret(), "someone-else", Duration::minutes(5)).unwrap();
        let validated = validate_token(&token, &secret(), "commune");
        assert_that(&validated).is_err();
    }

    #[test]
    fn an_expired_token_is_rejected() {
        let id = Uuid::new_v4();
        let token = build_token(id, &secret(), "commune", Duration::minutes(-5)).unwrap();
        let validated = validate_token(&token, &secret(), "commune");
        assert_that(&validated).is_err();
    }
}
