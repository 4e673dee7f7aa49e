use fake::locales::Data;
use fake::Dummy;
use rand::prelude::SliceRandom;
use secrecy::Secret;
use serde::Deserialize;

/// What the login route receives.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: Secret<String>,
}

pub struct CredentialsGenerator<L>(pub L);

impl<L: Data> Dummy<CredentialsGenerator<L>> for Credentials {
    fn dummy_with_rng<R: rand::Rng + ?Sized>(
        _config: &CredentialsGenerator<L>,
        rng: &mut R,
    ) -> Self {
        let name = *L::NAME_FIRST_NAME.choose(rng).unwrap();
        let password = *L::LOREM_WORD.choose(rng).unwrap();
        Credentials {
            email: format!("{}@example.com", name.to_lowercase()),
            password: Secret::new(password.to_string()),
        }
    }
}
