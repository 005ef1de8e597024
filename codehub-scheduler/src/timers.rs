use std::collections::HashMap;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Pending one-shot timers, at most one per task id.
///
/// Arming, cancellation and shutdown are the only operations; a timer task
/// removes its own entry when it fires.
#[derive(Debug, Default)]
pub(crate) struct TimerMap {
    handles: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl TimerMap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register the timer for a task id, aborting any previous one.
    pub(crate) async fn insert(&self, id: String, handle: JoinHandle<()>) {
        let mut handles = self.handles.lock().await;
        if let Some(previous) = handles.insert(id, handle) {
            previous.abort();
        }
    }

    /// Abort and forget the timer for a task id, if one is pending.
    pub(crate) async fn cancel(&self, id: &str) -> bool {
        let mut handles = self.handles.lock().await;
        match handles.remove(id) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Drop the entry for a timer that has fired.
    pub(crate) async fn complete(&self, id: &str) {
        let mut handles = self.handles.lock().await;
        handles.remove(id);
    }

    /// Abort every pending timer.
    pub(crate) async fn shutdown(&self) {
        let mut handles = self.handles.lock().await;
        for (_, handle) in handles.drain() {
            handle.abort();
        }
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.handles.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn rearming_aborts_the_previous_timer() {
        let timers = TimerMap::new();

        let first = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        timers.insert("t1".to_string(), first).await;

        let second = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        timers.insert("t1".to_string(), second).await;

        assert_eq!(timers.len().await, 1);
    }

    #[tokio::test]
    async fn cancel_reports_whether_a_timer_was_pending() {
        let timers = TimerMap::new();
        let handle = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        timers.insert("t1".to_string(), handle).await;

        assert!(timers.cancel("t1").await);
        assert!(!timers.cancel("t1").await);
        assert_eq!(timers.len().await, 0);
    }
}
