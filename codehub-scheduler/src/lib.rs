mod events;
mod timers;

pub use events::SchedulerEvent;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, error, warn};
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use codehub_api::{ApiError, ControlPlane};
use codehub_models::core::{Action, Task, TaskDraft, TaskStatus};
use codehub_models::errors::ValidationError;
use codehub_models::web::ActionResponse;
use codehub_store::TaskStore;

use crate::timers::TimerMap;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no scheduled task with id {id}")]
    TaskNotFound { id: String },
}

/// The task scheduler: owns the persisted task store, arms one-shot timers
/// for pending tasks and dispatches the remote action when they fire.
///
/// Cheap to clone; timer tasks hold a clone so the scheduler stays alive
/// while any timer is pending.
pub struct Scheduler<C: ControlPlane> {
    inner: Arc<Inner<C>>,
}

impl<C: ControlPlane> Clone for Scheduler<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<C> {
    store: Mutex<TaskStore>,
    control: C,
    timers: TimerMap,
    events: mpsc::UnboundedSender<SchedulerEvent>,
}

impl<C: ControlPlane> Scheduler<C> {
    /// Wrap an already-loaded store. Events for every task transition are
    /// sent on `events`; a closed receiver is tolerated.
    pub fn new(store: TaskStore, control: C, events: mpsc::UnboundedSender<SchedulerEvent>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store: Mutex::new(store),
                control,
                timers: TimerMap::new(),
                events,
            }),
        }
    }

    /// Validate a draft, persist it as a pending task and arm its timer.
    ///
    /// A draft whose schedule time has already passed is executed before
    /// this returns; the returned task then carries its terminal status.
    pub async fn create(&self, draft: TaskDraft) -> Result<Task, SchedulerError> {
        draft.validate()?;

        let task = Task {
            id: Uuid::new_v4().to_string(),
            name: draft.name.clone(),
            codebase: draft.codebase.clone(),
            action: draft.action,
            parameter: draft.normalized_parameter(),
            schedule_time: draft.schedule_time,
            status: TaskStatus::Pending,
            last_run: None,
            run_count: 0,
        };
        let id = task.id.clone();

        {
            let mut store = self.inner.store.lock().await;
            store.insert(task.clone());
            self.persist(&store);
        }
        self.emit(SchedulerEvent::Scheduled {
            id: id.clone(),
            name: task.name.clone(),
            schedule_time: task.schedule_time,
        });

        self.arm(&task).await;

        let store = self.inner.store.lock().await;
        Ok(store.get(&id).cloned().unwrap_or(task))
    }

    /// Re-arm every pending task against the current wall clock. Tasks left
    /// `running` by a previous session stay untouched until deleted.
    pub async fn restore(&self) -> usize {
        let pending: Vec<Task> = {
            let store = self.inner.store.lock().await;
            store
                .tasks()
                .iter()
                .filter(|t| t.status == TaskStatus::Pending)
                .cloned()
                .collect()
        };

        let count = pending.len();
        for task in pending {
            self.arm(&task).await;
        }
        count
    }

    /// Arm the timer for a task: overdue tasks execute immediately, future
    /// tasks get a one-shot timer. At most one timer is live per task id;
    /// re-arming replaces the previous one.
    async fn arm(&self, task: &Task) {
        let now = Utc::now();
        if task.schedule_time <= now {
            self.execute(&task.id).await;
            return;
        }

        let delay = (task.schedule_time - now)
            .to_std()
            .unwrap_or(Duration::ZERO);
        debug!("arming task {} to fire in {:?}", task.id, delay);

        let scheduler = self.clone();
        let id = task.id.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            scheduler.inner.timers.complete(&id).await;
            scheduler.execute(&id).await;
        });
        self.inner.timers.insert(task.id.clone(), handle).await;
    }

    /// Run one execution attempt for the task with the given id.
    ///
    /// The `running` transition is persisted before the remote call goes
    /// out; the terminal transition, `last_run` and `run_count` are
    /// persisted once it settles. An id deleted while the call was in
    /// flight makes the final update a no-op.
    pub async fn execute(&self, id: &str) {
        let snapshot = {
            let mut store = self.inner.store.lock().await;
            let found = store.update(id, |t| t.status = TaskStatus::Running);
            if !found {
                debug!("skipping execution of deleted task {id}");
                return;
            }
            self.persist(&store);
            match store.get(id) {
                Some(task) => task.clone(),
                None => return,
            }
        };
        self.emit(SchedulerEvent::Started {
            id: snapshot.id.clone(),
            name: snapshot.name.clone(),
        });

        let outcome = dispatch(&self.inner.control, &snapshot).await;
        let finished_at = Utc::now();

        let (status, failure) = match outcome {
            Ok(response) => {
                debug!("task {} acknowledged: {}", snapshot.id, response.message);
                (TaskStatus::Completed, None)
            }
            Err(err) => {
                error!("task {} failed: {}", snapshot.id, err);
                (TaskStatus::Failed, Some(err.to_string()))
            }
        };

        {
            let mut store = self.inner.store.lock().await;
            let found = store.update(id, |t| {
                t.status = status;
                t.last_run = Some(finished_at);
                t.run_count += 1;
            });
            if found {
                self.persist(&store);
            } else {
                debug!("task {id} was deleted while its action was in flight");
            }
        }

        match failure {
            None => self.emit(SchedulerEvent::Completed {
                id: snapshot.id,
                name: snapshot.name,
            }),
            Some(message) => self.emit(SchedulerEvent::Failed {
                id: snapshot.id,
                name: snapshot.name,
                message,
            }),
        }
    }

    /// Delete a task. The confirmation decision belongs to the caller; an
    /// unconfirmed delete changes nothing and returns `Ok(false)`.
    pub async fn delete(&self, id: &str, confirmed: bool) -> Result<bool, SchedulerError> {
        if !confirmed {
            return Ok(false);
        }

        self.inner.timers.cancel(id).await;

        let removed = {
            let mut store = self.inner.store.lock().await;
            let Some(task) = store.remove(id) else {
                return Err(SchedulerError::TaskNotFound { id: id.to_string() });
            };
            self.persist(&store);
            task
        };

        self.emit(SchedulerEvent::Deleted {
            id: removed.id,
            name: removed.name,
        });
        Ok(true)
    }

    /// Snapshot of the current task list, in creation order.
    pub async fn tasks(&self) -> Vec<Task> {
        let store = self.inner.store.lock().await;
        store.tasks().to_vec()
    }

    pub async fn get_task(&self, id: &str) -> Option<Task> {
        let store = self.inner.store.lock().await;
        store.get(id).cloned()
    }

    /// Abort every pending timer. In-flight remote calls are not cancelled;
    /// their completion settles against whatever is left in the store.
    pub async fn shutdown(&self) {
        self.inner.timers.shutdown().await;
    }

    fn persist(&self, store: &TaskStore) {
        if let Err(err) = store.save() {
            warn!("task store write failed, continuing in memory: {err}");
            self.emit(SchedulerEvent::StorageDegraded {
                message: err.to_string(),
            });
        }
    }

    fn emit(&self, event: SchedulerEvent) {
        if self.inner.events.send(event).is_err() {
            debug!("scheduler event receiver closed");
        }
    }
}

/// The action mapping table: each variant dispatches exactly one remote
/// call signature.
async fn dispatch<C: ControlPlane>(control: &C, task: &Task) -> Result<ActionResponse, ApiError> {
    match task.action {
        Action::RunStartupScript => control.execute_codebase(&task.codebase).await,
        Action::StartServer => control.start_code_server(&task.codebase).await,
        Action::Rollback => {
            let commit_id = task.parameter.as_deref().unwrap_or_default();
            control.rollback_server(&task.codebase, commit_id).await
        }
        Action::StopProcess => control.stop_process(&task.codebase, false).await,
    }
}
