use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeZone, Utc};
use log::{error, info, warn};
use tokio::sync::mpsc;

use codehub_api::{Client, ControlPlane};
use codehub_models::core::{Action, TaskDraft, TaskStatus};
use codehub_models::errors::SendableError;
use codehub_scheduler::{Scheduler, SchedulerEvent};
use codehub_store::TaskStore;

use crate::display;

pub async fn list_containers(client: &Client) -> Result<(), SendableError> {
    let containers = client.list_containers().await?;
    display::render_containers(&containers);
    Ok(())
}

pub async fn show_logs(
    client: &Client,
    dir_name: &str,
    follow: bool,
    interval_seconds: u64,
) -> Result<(), SendableError> {
    loop {
        let response = client.fetch_logs(dir_name).await?;
        print!("{}", response.logs);
        if !response.logs.ends_with('\n') {
            println!();
        }

        if !follow {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_secs(interval_seconds.max(1))).await;
    }
}

pub async fn execute_startup(client: &Client, dir_name: &str) -> Result<(), SendableError> {
    let ack = client.execute_codebase(dir_name).await?;
    info!("{}", ack.message);
    Ok(())
}

pub async fn start_code_server(client: &Client, dir_name: &str) -> Result<(), SendableError> {
    let ack = client.start_code_server(dir_name).await?;
    info!("{}", ack.message);
    Ok(())
}

pub async fn rollback(
    client: &Client,
    dir_name: &str,
    commit_id: &str,
) -> Result<(), SendableError> {
    let ack = client.rollback_server(dir_name, commit_id).await?;
    info!("{}", ack.message);
    Ok(())
}

pub async fn stop_process(client: &Client, dir_name: &str, ides: bool) -> Result<(), SendableError> {
    let ack = client.stop_process(dir_name, ides).await?;
    info!("{}", ack.message);
    Ok(())
}

pub async fn upload_artifact(client: &Client, file: &Path) -> Result<(), SendableError> {
    let ack = client.upload_artifact(file).await?;
    info!("{} ({})", ack.message, ack.filename);
    Ok(())
}

pub async fn schedule_task(
    client: Client,
    store_path: &Path,
    name: String,
    codebase: String,
    action: Action,
    commit_id: Option<String>,
    at: &str,
) -> Result<(), SendableError> {
    let schedule_time = parse_schedule_time(at)?;

    // Only containers known to the control plane are valid targets.
    let containers = client.list_containers().await?;
    if !containers.iter().any(|c| c.dir_name == codebase) {
        let known: Vec<&str> = containers.iter().map(|c| c.dir_name.as_str()).collect();
        return Err(format!(
            "unknown codebase '{}'; known codebases: {}",
            codebase,
            known.join(", ")
        )
        .into());
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let scheduler = Scheduler::new(TaskStore::open(store_path)?, client, tx);

    let task = scheduler
        .create(TaskDraft {
            name,
            codebase,
            action,
            parameter: commit_id,
            schedule_time,
        })
        .await?;
    render_pending_events(&mut rx);

    match task.status {
        TaskStatus::Pending => {
            println!(
                "Task '{}' ({}) scheduled for {}.",
                task.name,
                task.id,
                task.schedule_time.with_timezone(&Local)
            );
            println!("Run `codehub agent` to keep its timer live.");
            scheduler.shutdown().await;
        }
        status => {
            println!(
                "Task '{}' ({}) was due immediately and finished as {}.",
                task.name, task.id, status
            );
        }
    }
    Ok(())
}

pub fn list_tasks(store_path: &Path) -> Result<(), SendableError> {
    let store = TaskStore::open(store_path)?;
    display::render_tasks(store.tasks());
    Ok(())
}

pub async fn delete_task(
    client: Client,
    store_path: &Path,
    id: &str,
    yes: bool,
) -> Result<(), SendableError> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let scheduler = Scheduler::new(TaskStore::open(store_path)?, client, tx);

    let Some(task) = scheduler.get_task(id).await else {
        return Err(format!("no scheduled task with id {id}").into());
    };

    let confirmed = yes || confirm(&format!("Delete task '{}'?", task.name))?;
    let deleted = scheduler.delete(id, confirmed).await?;
    render_pending_events(&mut rx);

    if deleted {
        println!("Task '{}' deleted.", task.name);
    } else {
        println!("Delete aborted.");
    }
    Ok(())
}

pub async fn run_agent(client: Client, store_path: &Path) -> Result<(), SendableError> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let scheduler = Scheduler::new(TaskStore::open(store_path)?, client, tx);

    let event_log = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            render_event(&event);
        }
    });

    let restored = scheduler.restore().await;
    info!(
        "Agent serving {} pending task(s) from {}",
        restored,
        store_path.display()
    );

    tokio::signal::ctrl_c()
        .await
        .map_err(|err| -> SendableError { Box::new(err) })?;
    info!("Received shutdown signal. Shutting down...");

    scheduler.shutdown().await;
    drop(scheduler);
    let _ = event_log.await;
    info!("Agent shutdown complete.");
    Ok(())
}

fn confirm(question: &str) -> Result<bool, SendableError> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn render_pending_events(rx: &mut mpsc::UnboundedReceiver<SchedulerEvent>) {
    while let Ok(event) = rx.try_recv() {
        render_event(&event);
    }
}

fn render_event(event: &SchedulerEvent) {
    match event {
        SchedulerEvent::Scheduled {
            name,
            schedule_time,
            ..
        } => info!(
            "Task '{}' scheduled for {}",
            name,
            schedule_time.with_timezone(&Local)
        ),
        SchedulerEvent::Started { name, .. } => info!("Executing scheduled task '{}'...", name),
        SchedulerEvent::Completed { name, .. } => info!("Task '{}' completed successfully", name),
        SchedulerEvent::Failed { name, message, .. } => {
            error!("Task '{}' failed: {}", name, message)
        }
        SchedulerEvent::Deleted { name, .. } => info!("Task '{}' deleted", name),
        SchedulerEvent::StorageDegraded { message } => {
            warn!("Task store write failed: {}", message)
        }
    }
}

/// Accepts RFC 3339 (`2026-08-05T22:00:00Z`) or a local wall-clock time
/// without offset (`2026-08-05T22:00`).
pub fn parse_schedule_time(raw: &str) -> Result<DateTime<Utc>, SendableError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            match Local.from_local_datetime(&naive) {
                LocalResult::Single(local) | LocalResult::Ambiguous(local, _) => {
                    return Ok(local.with_timezone(&Utc));
                }
                LocalResult::None => {}
            }
        }
    }

    Err(format!(
        "unrecognized schedule time '{raw}'; use RFC 3339 or YYYY-MM-DDTHH:MM"
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_schedule_times() {
        let parsed = parse_schedule_time("2026-08-05T22:00:00Z").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-08-05T22:00:00+00:00");

        let offset = parse_schedule_time("2026-08-05T22:00:00+02:00").unwrap();
        assert_eq!(offset.to_rfc3339(), "2026-08-05T20:00:00+00:00");
    }

    #[test]
    fn parses_local_times_without_an_offset() {
        let parsed = parse_schedule_time("2026-08-05T22:15").unwrap();
        let expected = Local
            .with_ymd_and_hms(2026, 8, 5, 22, 15, 0)
            .single()
            .unwrap();
        assert_eq!(parsed, expected.with_timezone(&Utc));
    }

    #[test]
    fn rejects_garbage_schedule_times() {
        assert!(parse_schedule_time("next tuesday").is_err());
        assert!(parse_schedule_time("").is_err());
    }
}
