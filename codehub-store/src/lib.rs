use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use codehub_models::core::Task;

/// Persistence read/write failure. Never fatal to the scheduler: the
/// in-memory task list stays authoritative for the session.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot read task store {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write task store {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("task store {path} contains invalid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot serialize task store: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// The persisted task list: an ordered in-memory collection mirrored to a
/// single JSON file. The file is read in full at startup and rewritten in
/// full after every mutation; the scheduler is the sole mutator.
#[derive(Debug)]
pub struct TaskStore {
    path: Option<PathBuf>,
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Load the store backing `path`. A missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let tasks = match fs::read_to_string(&path) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|source| StorageError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(StorageError::Read { path, source }),
        };
        Ok(Self {
            path: Some(path),
            tasks,
        })
    }

    /// A store with no backing file; `save` is a no-op. Used in tests and
    /// anywhere durability is not wanted.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            tasks: Vec::new(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn insert(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Apply `mutate` to the task with the given id. Returns whether the id
    /// was present; a missing id is a no-op, not a fault.
    pub fn update<F>(&mut self, id: &str, mutate: F) -> bool
    where
        F: FnOnce(&mut Task),
    {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                mutate(task);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(index))
    }

    /// Rewrite the whole backing file, via a temp file renamed into place so
    /// a crash mid-write never truncates the previous state.
    pub fn save(&self) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StorageError::Write {
                    path: path.clone(),
                    source,
                })?;
            }
        }

        let body = serde_json::to_vec_pretty(&self.tasks).map_err(StorageError::Serialize)?;
        let temp = path.with_extension("json.tmp");
        fs::write(&temp, body).map_err(|source| StorageError::Write {
            path: temp.clone(),
            source,
        })?;
        fs::rename(&temp, path).map_err(|source| StorageError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use codehub_models::core::{Action, TaskStatus};

    fn task(id: &str, status: TaskStatus) -> Task {
        Task {
            id: id.to_string(),
            name: format!("task {id}"),
            codebase: "backend-service".to_string(),
            action: Action::StartServer,
            parameter: None,
            schedule_time: Utc::now(),
            status,
            last_run: None,
            run_count: 0,
        }
    }

    #[test]
    fn missing_file_opens_as_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::open(dir.path().join("tasks.json")).unwrap();
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn save_and_reopen_round_trips_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");

        let mut store = TaskStore::open(&path).unwrap();
        let mut rollback = task("a", TaskStatus::Pending);
        rollback.action = Action::Rollback;
        rollback.parameter = Some("abc123".to_string());
        store.insert(rollback);
        let mut done = task("b", TaskStatus::Completed);
        done.last_run = Some(Utc::now());
        done.run_count = 3;
        store.insert(done);
        store.save().unwrap();

        let reopened = TaskStore::open(&path).unwrap();
        assert_eq!(reopened.tasks().len(), 2);
        let a = reopened.get("a").unwrap();
        assert_eq!(a.action, Action::Rollback);
        assert_eq!(a.parameter.as_deref(), Some("abc123"));
        assert_eq!(a.status, TaskStatus::Pending);
        let b = reopened.get("b").unwrap();
        assert_eq!(b.status, TaskStatus::Completed);
        assert_eq!(b.run_count, 3);
        assert!(b.last_run.is_some());
    }

    #[test]
    fn update_reports_whether_the_id_was_found() {
        let mut store = TaskStore::in_memory();
        store.insert(task("a", TaskStatus::Pending));

        assert!(store.update("a", |t| t.run_count += 1));
        assert_eq!(store.get("a").unwrap().run_count, 1);
        assert!(!store.update("ghost", |t| t.run_count += 1));
    }

    #[test]
    fn remove_deletes_and_preserves_order_of_the_rest() {
        let mut store = TaskStore::in_memory();
        store.insert(task("a", TaskStatus::Pending));
        store.insert(task("b", TaskStatus::Pending));
        store.insert(task("c", TaskStatus::Pending));

        let removed = store.remove("b").unwrap();
        assert_eq!(removed.id, "b");
        let ids: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(store.remove("b").is_none());
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, "{ not json").unwrap();

        let err = TaskStore::open(&path).unwrap_err();
        assert!(matches!(err, StorageError::Parse { .. }));
    }
}
