mod cli;
mod commands;
mod display;

use std::time::Duration;

use clap::Parser;

use codehub_api::Client;
use codehub_models::errors::SendableError;
use codehub_utilities::startup;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), SendableError> {
    let cli = Cli::parse();
    startup::startup("Codehub Console", &cli.log_file)?;

    let timeout = Duration::from_secs(cli.api_timeout_seconds);
    let client = Client::new(&cli.base_url, timeout)?;

    match cli.command {
        Commands::Containers => commands::list_containers(&client).await?,
        Commands::Logs {
            dir_name,
            follow,
            interval_seconds,
        } => commands::show_logs(&client, &dir_name, follow, interval_seconds).await?,
        Commands::Exec { dir_name } => commands::execute_startup(&client, &dir_name).await?,
        Commands::CodeServer { dir_name } => {
            commands::start_code_server(&client, &dir_name).await?
        }
        Commands::Rollback {
            dir_name,
            commit_id,
        } => commands::rollback(&client, &dir_name, &commit_id).await?,
        Commands::Stop { dir_name, ides } => {
            commands::stop_process(&client, &dir_name, ides).await?
        }
        Commands::Upload { file } => commands::upload_artifact(&client, &file).await?,
        Commands::Schedule {
            name,
            codebase,
            action,
            commit_id,
            at,
        } => {
            commands::schedule_task(
                client,
                &cli.store,
                name,
                codebase,
                action.into(),
                commit_id,
                &at,
            )
            .await?
        }
        Commands::Tasks => commands::list_tasks(&cli.store)?,
        Commands::Delete { id, yes } => {
            commands::delete_task(client, &cli.store, &id, yes).await?
        }
        Commands::Agent => commands::run_agent(client, &cli.store).await?,
    }

    Ok(())
}
