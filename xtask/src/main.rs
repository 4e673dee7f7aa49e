use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

mod tasks;

use tasks::ci::ci;
use tasks::database::{init_db, postgres_db};
use tasks::test::xtest;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    common::tracing::init_tracing(common::settings::tracing_dev_settings());
    try_main().await
}

async fn try_main() -> Result<(), anyhow::Error> {
    let task = env::args().nth(1);
    match task.as_deref() {
        Some("ci") => ci(),
        Some("test") => xtest(),
        Some("postgres") => postgres_db(),
        Some("initdb") => init_db().await,
        _ => print_help(),
    }
}

fn print_help() -> anyhow::Result<()> {
    eprintln!(
        r#"
Usage: cargo xtask <task>

Tasks:
  ci              runs all necessary checks to avoid CI errors when git pushed
  test            runs unit and integration tests
  postgres        starts up a postgres docker container
  initdb          creates the database and its schema in the running container
"#
    );

    Ok(())
}

pub fn project_root() -> PathBuf {
    Path::new(&env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(1)
        .unwrap()
        .to_path_buf()
}

pub fn check_docker_exists() -> Result<(), anyhow::Error> {
    let status = Command::new("docker").arg("--version").status()?;
    if !status.success() {
        anyhow::bail!("docker is required for this task");
    }
    Ok(())
}
