use chrono::{DateTime, Utc};

/// One task state transition, emitted for every observable change so the
/// console can surface it to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    Scheduled {
        id: String,
        name: String,
        schedule_time: DateTime<Utc>,
    },
    Started {
        id: String,
        name: String,
    },
    Completed {
        id: String,
        name: String,
    },
    Failed {
        id: String,
        name: String,
        message: String,
    },
    Deleted {
        id: String,
        name: String,
    },
    /// A store write failed; the in-memory list remains authoritative.
    StorageDegraded {
        message: String,
    },
}
