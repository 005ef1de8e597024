use thiserror::Error;

pub type SendableError = Box<dyn std::error::Error + Send + Sync>;

/// Rejection of a task draft, one variant per offending field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("task name must not be empty")]
    EmptyName,

    #[error("target codebase must not be empty")]
    EmptyCodebase,

    #[error("rollback tasks require a commit id")]
    MissingCommitId,
}
