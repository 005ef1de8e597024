use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Remote action a scheduled task performs against its codebase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    RunStartupScript,
    StartServer,
    Rollback,
    StopProcess,
}

impl Action {
    /// Rollback is the only action that carries a commit id parameter.
    pub fn requires_commit(&self) -> bool {
        matches!(self, Action::Rollback)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::RunStartupScript => "run-startup-script",
            Action::StartServer => "start-server",
            Action::Rollback => "rollback",
            Action::StopProcess => "stop-process",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Completed and failed tasks are never re-armed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// One deferred remote action invocation, as persisted in the task store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub codebase: String,
    pub action: Action,
    /// Commit id, present iff `action == Rollback`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    pub schedule_time: DateTime<Utc>,
    pub status: TaskStatus,
    #[serde(default)]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default)]
    pub run_count: u32,
}

/// User-supplied task definition, before an id is allocated.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub name: String,
    pub codebase: String,
    pub action: Action,
    pub parameter: Option<String>,
    pub schedule_time: DateTime<Utc>,
}

impl TaskDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.codebase.trim().is_empty() {
            return Err(ValidationError::EmptyCodebase);
        }
        if self.action.requires_commit()
            && self.parameter.as_deref().map_or(true, |c| c.trim().is_empty())
        {
            return Err(ValidationError::MissingCommitId);
        }
        Ok(())
    }

    /// Commit id for rollback drafts; cleared for every other action.
    pub fn normalized_parameter(&self) -> Option<String> {
        if self.action.requires_commit() {
            self.parameter.clone()
        } else {
            None
        }
    }
}
