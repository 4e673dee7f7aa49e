use std::process::Command;

use common::config::merge_configuration;
use common::settings::DatabaseSettings;

use crate::{check_docker_exists, project_root};

fn database_settings() -> Result<DatabaseSettings, anyhow::Error> {
    let config_dir = project_root().join("config");
    println!(
        "Reading database configuration from {}",
        config_dir.display()
    );
    let settings = merge_configuration(&config_dir, &["database"], "root", "COMMUNE", vec![])
        .map_err(|err| anyhow::anyhow!("Could not merge database configuration: {err}"))?
        .get::<DatabaseSettings>("database")
        .map_err(|err| anyhow::anyhow!("Could not deserialize database configuration: {err}"))?;
    Ok(settings)
}

pub fn postgres_db() -> Result<(), anyhow::Error> {
    check_docker_exists()?;

    let settings = database_settings()?;

    println!("Starting docker image (postgres:15) ...");
    let status = Command::new("docker")
        .current_dir(project_root())
        .args([
            "run",
            "--name",
            "commune",
            "-e",
            &format!("POSTGRES_USER={}", settings.username),
            "-e",
            &format!("POSTGRES_PASSWORD={}", settings.password),
            "-p",
            &format!("{}:5432", settings.port),
            "-d",
            "postgres:15",
        ])
        .status();

    if status.is_err() {
        anyhow::bail!("Could not run docker image");
    }

    println!("Docker Postgres server online");
    println!("Set DATABASE_URL=\"{}\"", settings.connection_string());

    Ok(())
}

/// Run the SQL files under database/sql against the container started
/// by the postgres task.
pub async fn init_db() -> Result<(), anyhow::Error> {
    common::postgres::init_dev_db()
        .await
        .map_err(|err| anyhow::anyhow!("Could not initialize the database: {err}"))?;
    Ok(())
}
