/// Implementation of the user and post storage ports using postgres
mod error;
mod posts;
mod users;

pub use self::error::Error;

use common::postgres::connect_with_options;
use common::settings::DatabaseSettings;
use sqlx::postgres::{PgConnectOptions, PgPool};

#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pub pool: PgPool,
    pub config: DatabaseSettings,
    pub conn_options: PgConnectOptions,
}

impl PostgresStorage {
    pub async fn new(config: DatabaseSettings) -> Result<PostgresStorage, Error> {
        let pool = connect_with_options(&config)
            .await
            .map_err(|err| Error::Connection {
                context: format!("Could not connect to {}", config.connection_string()),
                source: err.to_string(),
            })?;
        tracing::debug!("Connected Postgres Pool to {}", config.connection_string());
        let conn_options = config.connect_options();
        Ok(PostgresStorage {
            pool,
            config,
            conn_options,
        })
    }
}
